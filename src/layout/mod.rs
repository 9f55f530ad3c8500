// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Force-directed layout.
//!
//! The view talks to the solver through [`LayoutEngine`]: it binds the current node records and
//! link forces, then calls [`LayoutEngine::tick`] once per frame. The engine writes positions
//! (`x`, `y`) straight into the node records, which is why those records must keep their identity
//! while bound.

pub mod force;

use thiserror::Error;

use crate::model::{SharedObject, Value};

pub use force::{ForceSimulation, SimulationParams};

pub const DEFAULT_LINK_DISTANCE: f64 = 20.0;
pub const DEFAULT_LINK_STRENGTH: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Spring between two nodes, addressed by their position in the bound node list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkForce {
    pub source: usize,
    pub target: usize,
    pub distance: f64,
    pub strength: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkDefaults {
    pub distance: f64,
    pub strength: f64,
}

impl Default for LinkDefaults {
    fn default() -> Self {
        Self { distance: DEFAULT_LINK_DISTANCE, strength: DEFAULT_LINK_STRENGTH }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("link {position} has no numeric `{field}` endpoint")]
    MissingEndpoint { position: usize, field: &'static str },
    #[error("link {position} points at node {endpoint}, but only {node_count} nodes exist")]
    DanglingLink { position: usize, endpoint: usize, node_count: usize },
}

pub trait LayoutEngine {
    /// Replaces the bound nodes and links and reheats the simulation around `center`.
    fn bind(&mut self, nodes: &[SharedObject], links: Vec<LinkForce>, center: Point);

    /// Runs one iteration and writes the new positions into the bound node records.
    ///
    /// Returns `false` without touching anything once the simulation has cooled down.
    fn tick(&mut self) -> bool;

    fn is_settled(&self) -> bool;
}

pub fn with_default(value: Option<f64>, default: f64) -> f64 {
    value.filter(|value| value.is_finite()).unwrap_or(default)
}

/// Builds the link forces for `links`, resolving `source`/`target` against `node_count` nodes.
/// `distance` and `strength` fall back to `defaults` when a link omits them.
pub fn link_forces(
    links: &[SharedObject],
    node_count: usize,
    defaults: LinkDefaults,
) -> Result<Vec<LinkForce>, LayoutError> {
    links
        .iter()
        .enumerate()
        .map(|(position, link)| {
            let link = link.borrow();
            let endpoint = |field: &'static str| {
                let endpoint = link
                    .get(field)
                    .and_then(Value::as_u64)
                    .and_then(|endpoint| usize::try_from(endpoint).ok())
                    .ok_or(LayoutError::MissingEndpoint { position, field })?;
                if endpoint >= node_count {
                    return Err(LayoutError::DanglingLink { position, endpoint, node_count });
                }
                Ok(endpoint)
            };

            Ok(LinkForce {
                source: endpoint("source")?,
                target: endpoint("target")?,
                distance: with_default(link.get_f64("distance"), defaults.distance),
                strength: with_default(link.get_f64("strength"), defaults.strength),
            })
        })
        .collect()
}

/// Reads the position the layout engine stored in a node record; unplaced nodes sit at the origin.
pub fn node_position(node: &SharedObject) -> Point {
    let node = node.borrow();
    Point::new(node.get_f64("x").unwrap_or(0.0), node.get_f64("y").unwrap_or(0.0))
}
