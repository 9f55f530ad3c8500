// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! The widget model mirrors the kernel's state; its graph holds node and link records as shared,
//! mutable objects so identity survives incremental updates.

#[cfg(test)]
pub(crate) mod fixtures;
pub mod graph;
pub mod ids;
pub mod selection;
pub mod value;
pub mod widget;

pub use graph::{Collection, Graph, GraphError, GraphReconcile};
pub use ids::RecordId;
pub use selection::SelectionModel;
pub use value::{deep_copy, shared, Object, SharedObject, Value};
pub use widget::{Attribute, ChangeEvent, ModelError, StatePatch, Subscription, WidgetModel};
