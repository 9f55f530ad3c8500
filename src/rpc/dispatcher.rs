// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::Deserialize;
use smol_str::SmolStr;
use thiserror::Error;
use tracing::{debug, trace, warn};

use super::call::{CallError, ViewCall, UPDATE_HIGHLIGHT_ATOMS};
use super::types::{InboundMessage, OutboundMessage, FUNCTION_CALL_EVENT};
use crate::comm::{Comm, CommError};
use crate::config::ViewConfig;
use crate::layout::LayoutEngine;
use crate::render::{MolView, ViewError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotAFunctionCall,
    Suppressed,
    /// Not a readable message and not recognizably a function call.
    Malformed,
}

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    Ignored(IgnoreReason),
    Done { function_name: String, result: serde_json::Value },
    Failed { function_name: String, error: String },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Call(#[from] CallError),
    #[error(transparent)]
    View(#[from] ViewError),
}

/// Routes `function_call` messages to the view and answers them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatcher {
    suppressed: Vec<SmolStr>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self { suppressed: vec![SmolStr::new_static(UPDATE_HIGHLIGHT_ATOMS)] }
    }
}

impl Dispatcher {
    pub fn new(suppressed: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self { suppressed: suppressed.into_iter().map(|name| SmolStr::new(name.as_ref())).collect() }
    }

    pub fn from_config(config: &ViewConfig) -> Self {
        Self::new(&config.suppressed_functions)
    }

    pub fn is_suppressed(&self, function_name: &str) -> bool {
        self.suppressed.iter().any(|name| name == function_name)
    }

    /// Logs `content` on the view, then runs it if it is a function call.
    ///
    /// Every dispatched call is answered with `function_done` or `function_failed` before this
    /// returns, including calls whose envelope does not read as an [`InboundMessage`]. Only a
    /// failure to send that answer is returned as an error.
    pub fn dispatch<L: LayoutEngine>(
        &self,
        view: &mut MolView<L>,
        comm: Option<&mut dyn Comm>,
        content: serde_json::Value,
    ) -> Result<Disposition, CommError> {
        let parsed = InboundMessage::deserialize(&content);
        let envelope = Envelope::read(&content);
        view.record_message(content);

        let message = match parsed {
            Ok(message) => message,
            Err(err) => {
                if !envelope.is_function_call {
                    debug!(error = %err, "ignoring malformed message");
                    return Ok(Disposition::Ignored(IgnoreReason::Malformed));
                }
                let function_name = envelope.function_name.unwrap_or_default();
                if self.is_suppressed(&function_name) {
                    trace!(function = %function_name, "suppressed call");
                    return Ok(Disposition::Ignored(IgnoreReason::Suppressed));
                }
                let error = format!("malformed function call: {err}");
                return respond(comm, envelope.call_id, function_name, Err(error));
            }
        };

        if !message.is_function_call() {
            debug!(event = %message.event, "ignoring non-call message");
            return Ok(Disposition::Ignored(IgnoreReason::NotAFunctionCall));
        }

        let function_name = message.function_name.clone().unwrap_or_default();
        if self.is_suppressed(&function_name) {
            trace!(function = %function_name, "suppressed call");
            return Ok(Disposition::Ignored(IgnoreReason::Suppressed));
        }

        let outcome = invoke(view, message.function_name.as_deref(), message.arguments.as_ref())
            .map_err(|err| err.to_string());
        respond(comm, message.call_id, function_name, outcome)
    }
}

/// The parts of a message needed to answer it, read without a schema.
struct Envelope {
    is_function_call: bool,
    function_name: Option<String>,
    call_id: Option<serde_json::Value>,
}

impl Envelope {
    fn read(content: &serde_json::Value) -> Self {
        Self {
            is_function_call: content.get("event").and_then(serde_json::Value::as_str)
                == Some(FUNCTION_CALL_EVENT),
            function_name: content
                .get("function_name")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned),
            call_id: content.get("call_id").cloned(),
        }
    }
}

fn respond(
    comm: Option<&mut dyn Comm>,
    call_id: Option<serde_json::Value>,
    function_name: String,
    outcome: Result<serde_json::Value, String>,
) -> Result<Disposition, CommError> {
    let (response, disposition) = match outcome {
        Ok(result) => {
            debug!(function = %function_name, "call done");
            (
                OutboundMessage::FunctionDone {
                    call_id,
                    result: result.clone(),
                    function_name: function_name.clone(),
                },
                Disposition::Done { function_name, result },
            )
        }
        Err(error) => {
            warn!(function = %function_name, error = %error, "call failed");
            (
                OutboundMessage::FunctionFailed {
                    call_id,
                    error: error.clone(),
                    function_name: function_name.clone(),
                },
                Disposition::Failed { function_name, error },
            )
        }
    };

    if let Some(comm) = comm {
        comm.send(response.into())?;
    }
    Ok(disposition)
}

fn invoke<L: LayoutEngine>(
    view: &mut MolView<L>,
    function_name: Option<&str>,
    arguments: Option<&serde_json::Value>,
) -> Result<serde_json::Value, DispatchError> {
    let name = function_name.ok_or(CallError::MissingFunctionName)?;
    let call = ViewCall::decode(name, arguments)?;
    Ok(view.apply_call(call)?)
}
