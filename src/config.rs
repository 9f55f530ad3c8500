// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! View configuration.
//!
//! Every field has a default, so a config file only needs to name what it overrides:
//!
//! ```json
//! { "link_distance": 30, "tick_interval_ms": 33 }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::{LinkDefaults, SimulationParams, DEFAULT_LINK_DISTANCE, DEFAULT_LINK_STRENGTH};
use crate::rpc::UPDATE_HIGHLIGHT_ATOMS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    /// Rest length for links without a `distance` field.
    pub link_distance: f64,
    /// Spring strength for links without a `strength` field.
    pub link_strength: f64,
    pub charge_strength: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub alpha_target: f64,
    pub velocity_decay: f64,
    pub tick_interval_ms: u64,
    /// Function calls that are accepted but never answered.
    pub suppressed_functions: Vec<String>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        let simulation = SimulationParams::default();
        Self {
            link_distance: DEFAULT_LINK_DISTANCE,
            link_strength: DEFAULT_LINK_STRENGTH,
            charge_strength: simulation.charge_strength,
            alpha_min: simulation.alpha_min,
            alpha_decay: simulation.alpha_decay,
            alpha_target: simulation.alpha_target,
            velocity_decay: simulation.velocity_decay,
            tick_interval_ms: 16,
            suppressed_functions: vec![UPDATE_HIGHLIGHT_ATOMS.to_owned()],
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config {}: {source}", path.display())]
    Parse { path: PathBuf, source: serde_json::Error },
}

impl ViewConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        serde_json::from_str(&raw)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn link_defaults(&self) -> LinkDefaults {
        LinkDefaults { distance: self.link_distance, strength: self.link_strength }
    }

    pub fn simulation(&self) -> SimulationParams {
        SimulationParams {
            charge_strength: self.charge_strength,
            alpha_min: self.alpha_min,
            alpha_decay: self.alpha_decay,
            alpha_target: self.alpha_target,
            velocity_decay: self.velocity_decay,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}
