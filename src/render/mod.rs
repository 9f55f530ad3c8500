// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Rendering of the molecule graph into the scene.
//!
//! [`MolView`] owns the scene and re-renders it wholesale from the widget model; the
//! [`VisualIndex`] built after each render resolves atoms and bonds to their elements so the
//! style and label calls arriving over the channel can reach them.

mod controller;
mod index;
pub mod views;

pub use controller::{MolView, ViewError};
pub use index::VisualIndex;
pub use views::{LinksView, NodesView};
