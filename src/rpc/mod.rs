// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Request/response calls layered over the one-directional notebook channel.
//!
//! The kernel sends `{ "event": "function_call", "function_name", "arguments", "call_id" }`; the
//! [`Dispatcher`] decodes it into a [`ViewCall`], runs it against the view and answers with
//! `function_done` (or `function_failed`) carrying the same `call_id`.

mod call;
mod dispatcher;
mod types;

pub use call::{
    Bond, CallError, ViewCall, SET_ATOM_LABEL, SET_ATOM_STYLE, SET_BOND_LABEL, SET_BOND_STYLE,
    UPDATE_HIGHLIGHT_ATOMS,
};
pub use dispatcher::{DispatchError, Dispatcher, Disposition, IgnoreReason};
pub use types::{
    message_schemas, InboundFrame, InboundMessage, OutboundFrame, OutboundMessage,
    FUNCTION_CALL_EVENT,
};

#[cfg(test)]
mod tests;
