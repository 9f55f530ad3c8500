// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::StatePatch;

pub const FUNCTION_CALL_EVENT: &str = "function_call";

/// Custom message received from the kernel.
///
/// `arguments` is kept as raw JSON so that a call with a malformed argument list still decodes
/// far enough to be answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InboundMessage {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,
    /// Opaque correlation token, echoed back unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl InboundMessage {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            function_name: None,
            arguments: None,
            call_id: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn function_call(
        function_name: impl Into<String>,
        arguments: Vec<serde_json::Value>,
        call_id: serde_json::Value,
    ) -> Self {
        Self {
            function_name: Some(function_name.into()),
            arguments: Some(serde_json::Value::Array(arguments)),
            call_id: Some(call_id),
            ..Self::new(FUNCTION_CALL_EVENT)
        }
    }

    pub fn is_function_call(&self) -> bool {
        self.event == FUNCTION_CALL_EVENT
    }
}

/// Custom message sent to the kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OutboundMessage {
    Ready,
    FunctionDone {
        call_id: Option<serde_json::Value>,
        result: serde_json::Value,
        function_name: String,
    },
    FunctionFailed {
        call_id: Option<serde_json::Value>,
        error: String,
        function_name: String,
    },
}

/// Channel frame received from the kernel.
///
/// Custom content stays raw JSON until the dispatcher has logged it; it is read as an
/// [`InboundMessage`] afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum InboundFrame {
    Custom {
        #[schemars(with = "InboundMessage")]
        content: serde_json::Value,
    },
    Update { state: StatePatch },
}

/// Channel frame sent to the kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum OutboundFrame {
    Custom { content: OutboundMessage },
    Update { state: StatePatch },
}

impl From<OutboundMessage> for OutboundFrame {
    fn from(content: OutboundMessage) -> Self {
        Self::Custom { content }
    }
}

/// JSON schemas of both frame directions, keyed by `inbound`/`outbound`.
pub fn message_schemas() -> Result<serde_json::Value, serde_json::Error> {
    Ok(serde_json::json!({
        "inbound": serde_json::to_value(schemars::schema_for!(InboundFrame))?,
        "outbound": serde_json::to_value(schemars::schema_for!(OutboundFrame))?,
    }))
}
