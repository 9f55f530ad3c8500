// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use super::views::{INDEX_ATTR, LINK_CLASS, NODE_CLASS, SOURCE_ATTR, TARGET_ATTR};
use crate::scene::{ElementId, Scene};

/// Lookup from atom index and bond endpoints to the rendered elements.
///
/// Links are stored under both `(p, q)` and `(q, p)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualIndex {
    nodes: BTreeMap<usize, ElementId>,
    links: HashMap<(usize, usize), ElementId>,
}

impl VisualIndex {
    /// Scans the direct children of `svg` for node and link groups.
    pub fn build(scene: &Scene, svg: ElementId) -> Self {
        let mut index = Self::default();
        for &child in scene.children(svg) {
            let Some(element) = scene.get(child) else {
                continue;
            };
            match element.class() {
                Some(NODE_CLASS) => {
                    if let Some(atom) = element.attr(INDEX_ATTR).and_then(parse_index) {
                        index.nodes.insert(atom, child);
                    }
                }
                Some(LINK_CLASS) => {
                    let endpoints = scene.child(child, 0).and_then(|line| scene.get(line)).and_then(
                        |line| {
                            let source = line.attr(SOURCE_ATTR).and_then(parse_index)?;
                            let target = line.attr(TARGET_ATTR).and_then(parse_index)?;
                            Some((source, target))
                        },
                    );
                    if let Some((source, target)) = endpoints {
                        index.links.insert((source, target), child);
                        index.links.insert((target, source), child);
                    }
                }
                _ => {}
            }
        }
        trace!(nodes = index.nodes.len(), links = index.links.len(), "visual index rebuilt");
        index
    }

    pub fn node(&self, atom: usize) -> Option<ElementId> {
        self.nodes.get(&atom).copied()
    }

    pub fn link(&self, p: usize, q: usize) -> Option<ElementId> {
        self.links.get(&(p, q)).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct link keys (each link is stored twice unless it is a self-loop).
    pub fn link_key_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

fn parse_index(raw: &str) -> Option<usize> {
    raw.parse().ok()
}
