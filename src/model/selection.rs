// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Click-selection state owned by the view.
//!
//! This narrow model only tracks which atom was clicked last. The view seeds it from the widget
//! model on every render and pushes local changes back into the widget model.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    rev: u64,
    clicked_atom_index: Option<usize>,
}

impl SelectionModel {
    pub fn new(clicked_atom_index: Option<usize>) -> Self {
        Self { rev: 0, clicked_atom_index }
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn clicked_atom_index(&self) -> Option<usize> {
        self.clicked_atom_index
    }

    /// Returns `true` when the selection actually changed.
    pub fn set_clicked_atom_index(&mut self, clicked_atom_index: Option<usize>) -> bool {
        if self.clicked_atom_index == clicked_atom_index {
            return false;
        }
        self.clicked_atom_index = clicked_atom_index;
        self.rev = self.rev.wrapping_add(1);
        true
    }
}
