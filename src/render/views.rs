// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Sub-views turning node and link records into scene elements.
//!
//! A node becomes `g.node[index]` with children `[circle, text]`; a link becomes `g.link` with
//! children `[line[source, target], text]`. The mutators in the controller rely on that order.

use tracing::trace;

use crate::layout::{node_position, Point};
use crate::model::{Object, SharedObject, Value};
use crate::scene::{ElementId, Scene, CLASS_ATTR};

pub const NODE_CLASS: &str = "node";
pub const LINK_CLASS: &str = "link";
pub const INDEX_ATTR: &str = "index";
pub const SOURCE_ATTR: &str = "source";
pub const TARGET_ATTR: &str = "target";
pub const SELECTED_ATTR: &str = "selected";
pub const HIGHLIGHTED_ATTR: &str = "highlighted";

const DEFAULT_RADIUS: f64 = 8.0;
const DEFAULT_FILL: &str = "silver";
const DEFAULT_STROKE: &str = "black";

#[derive(Debug, Clone, Default)]
pub struct NodesView {
    groups: Vec<ElementId>,
}

impl NodesView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one group per node to `svg`; the group's `index` is the node's position.
    pub fn render(&mut self, scene: &mut Scene, svg: ElementId, nodes: &[SharedObject]) {
        self.groups.clear();
        for (position, node) in nodes.iter().enumerate() {
            let node = node.borrow();
            let Some(group) = scene.append(svg, "g") else {
                return;
            };
            if let Some(element) = scene.get_mut(group) {
                element.set_attr(CLASS_ATTR, NODE_CLASS);
                element.set_attr(INDEX_ATTR, itoa::Buffer::new().format(position));
            }

            if let Some(circle) = scene.append(group, "circle").and_then(|id| scene.get_mut(id)) {
                let radius = node.get_f64("size").filter(|size| size.is_finite() && *size > 0.0);
                circle.set_attr("r", format_number(radius.unwrap_or(DEFAULT_RADIUS)));
                circle.set_style("fill", node.get_str("color").unwrap_or(DEFAULT_FILL));
            }
            if let Some(text) = scene.append(group, "text").and_then(|id| scene.get_mut(id)) {
                text.set_attr("text-anchor", "middle");
                if let Some(label) = node_label(&node) {
                    text.set_text(label);
                }
            }
            self.groups.push(group);
        }
        trace!(nodes = self.groups.len(), "nodes rendered");
    }

    pub fn groups(&self) -> &[ElementId] {
        &self.groups
    }

    /// Moves every node group to its record's current position.
    pub fn render_transform(&self, scene: &mut Scene, nodes: &[SharedObject]) {
        for (group, node) in self.groups.iter().zip(nodes) {
            let Point { x, y } = node_position(node);
            if let Some(element) = scene.get_mut(*group) {
                element.set_attr(
                    "transform",
                    format!("translate({},{})", format_number(x), format_number(y)),
                );
            }
        }
    }

    pub fn mark_selected(&self, scene: &mut Scene, selected: Option<usize>) {
        self.mark(scene, SELECTED_ATTR, |position| Some(position) == selected);
    }

    pub fn mark_highlighted(&self, scene: &mut Scene, atoms: &[usize]) {
        self.mark(scene, HIGHLIGHTED_ATTR, |position| atoms.contains(&position));
    }

    fn mark(&self, scene: &mut Scene, attr: &str, on: impl Fn(usize) -> bool) {
        for (position, group) in self.groups.iter().enumerate() {
            let Some(element) = scene.get_mut(*group) else {
                continue;
            };
            if on(position) {
                element.set_attr(attr, "true");
            } else {
                element.remove_attr(attr);
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinksView {
    groups: Vec<(ElementId, usize, usize)>,
}

impl LinksView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one group per link. Endpoints must already be resolved against the node list.
    pub fn render(
        &mut self,
        scene: &mut Scene,
        svg: ElementId,
        links: &[SharedObject],
        endpoints: &[(usize, usize)],
    ) {
        self.groups.clear();
        for (link, &(source, target)) in links.iter().zip(endpoints) {
            let link = link.borrow();
            let Some(group) = scene.append(svg, "g") else {
                return;
            };
            if let Some(element) = scene.get_mut(group) {
                element.set_attr(CLASS_ATTR, LINK_CLASS);
            }

            if let Some(line) = scene.append(group, "line").and_then(|id| scene.get_mut(id)) {
                let mut buffer = itoa::Buffer::new();
                line.set_attr(SOURCE_ATTR, buffer.format(source));
                line.set_attr(TARGET_ATTR, buffer.format(target));
                line.set_style("stroke", link.get_str("color").unwrap_or(DEFAULT_STROKE));
            }
            if let Some(text) = scene.append(group, "text").and_then(|id| scene.get_mut(id)) {
                text.set_attr("text-anchor", "middle");
                if let Some(label) = link.get_str("label") {
                    text.set_text(label);
                }
            }
            self.groups.push((group, source, target));
        }
        trace!(links = self.groups.len(), "links rendered");
    }

    /// Stretches each line between its endpoints and centers its label.
    pub fn render_position(&self, scene: &mut Scene, nodes: &[SharedObject]) {
        for &(group, source, target) in &self.groups {
            let (Some(source), Some(target)) = (nodes.get(source), nodes.get(target)) else {
                continue;
            };
            let (from, to) = (node_position(source), node_position(target));

            if let Some(line) = scene.child(group, 0).and_then(|id| scene.get_mut(id)) {
                line.set_attr("x1", format_number(from.x));
                line.set_attr("y1", format_number(from.y));
                line.set_attr("x2", format_number(to.x));
                line.set_attr("y2", format_number(to.y));
            }
            if let Some(text) = scene.child(group, 1).and_then(|id| scene.get_mut(id)) {
                text.set_attr("x", format_number((from.x + to.x) / 2.0));
                text.set_attr("y", format_number((from.y + to.y) / 2.0));
            }
        }
    }
}

fn node_label(node: &Object) -> Option<String> {
    ["label", "name", "atom"].into_iter().find_map(|field| match node.get(field)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// Rounds to two decimals and drops trailing zeros.
fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_owned();
    }
    let mut text = format!("{rounded:.2}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text
}
