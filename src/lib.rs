// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! molsync: interactive 2D molecule graph view kept in sync with a notebook kernel.
//!
//! The kernel owns the authoritative [`model::WidgetModel`]. Incoming snapshots are merged into
//! it by [`reconcile`], the [`render::MolView`] re-renders from it and runs the force layout, and
//! [`rpc::Dispatcher`] answers the kernel's function calls against the rendered scene.

pub mod comm;
pub mod config;
pub mod host;
pub mod layout;
pub mod model;
pub mod reconcile;
pub mod render;
pub mod rpc;
pub mod scene;
