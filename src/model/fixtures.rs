// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::json;

use super::widget::{StatePatch, WidgetModel};

fn state(value: serde_json::Value) -> StatePatch {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("fixture state must be an object, got {other}"),
    }
}

/// Water: O bonded to two H atoms.
pub(crate) fn water_state() -> StatePatch {
    state(json!({
        "id": "water",
        "width": 400,
        "height": 300,
        "clicked_atom_index": null,
        "graph": {
            "nodes": [
                {"id": 0, "atom": "O", "color": "red", "size": 12},
                {"id": 1, "atom": "H", "color": "white"},
                {"id": 2, "atom": "H", "color": "white"},
            ],
            "links": [
                {"id": "0-1", "source": 0, "target": 1, "distance": 30},
                {"id": "0-2", "source": 0, "target": 2, "strength": 0.5},
            ],
        },
    }))
}

/// Formaldehyde: C=O plus two C-H bonds; one bond carries a label.
pub(crate) fn formaldehyde_state() -> StatePatch {
    state(json!({
        "id": "formaldehyde",
        "width": 500,
        "height": 500,
        "graph": {
            "nodes": [
                {"id": 0, "atom": "C"},
                {"id": 1, "atom": "O", "color": "red"},
                {"id": 2, "atom": "H"},
                {"id": 3, "atom": "H"},
            ],
            "links": [
                {"id": "c=o", "source": 0, "target": 1, "label": "2"},
                {"id": "c-h1", "source": 0, "target": 2},
                {"id": "c-h2", "source": 0, "target": 3},
            ],
        },
    }))
}

pub(crate) fn water_model() -> WidgetModel {
    WidgetModel::from_state(&water_state()).expect("water fixture")
}

pub(crate) fn formaldehyde_model() -> WidgetModel {
    WidgetModel::from_state(&formaldehyde_state()).expect("formaldehyde fixture")
}
