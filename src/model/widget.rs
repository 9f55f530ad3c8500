// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The authoritative widget model mirrored from the kernel.
//!
//! Remote state arrives through [`WidgetModel::apply_state`]; local writes are tracked as dirty
//! until [`WidgetModel::save`] turns them into a state patch for the kernel. Every effective change
//! is announced to the subscribers registered with [`WidgetModel::on_change`].

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;
use tracing::{debug, trace};

use super::graph::{Graph, GraphError};

pub const DEFAULT_WIDTH: f64 = 500.0;
pub const DEFAULT_HEIGHT: f64 = 500.0;

/// Attribute patch exchanged with the kernel (`{ attr: value }`).
pub type StatePatch = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Graph,
    Id,
    Width,
    Height,
    ClickedAtomIndex,
    HighlightAtoms,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Graph,
        Attribute::Id,
        Attribute::Width,
        Attribute::Height,
        Attribute::ClickedAtomIndex,
        Attribute::HighlightAtoms,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Id => "id",
            Self::Width => "width",
            Self::Height => "height",
            Self::ClickedAtomIndex => "clicked_atom_index",
            Self::HighlightAtoms => "highlight_atoms",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attribute| attribute.as_str() == name)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid `{attribute}`: {reason}")]
    InvalidAttribute { attribute: Attribute, reason: &'static str },
    #[error("invalid `graph`: {0}")]
    Graph(#[from] GraphError),
}

/// The set of attributes touched by one `set`/`apply_state` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    changed: Vec<Attribute>,
}

impl ChangeEvent {
    pub fn changed(&self) -> &[Attribute] {
        &self.changed
    }

    pub fn touches(&self, attribute: Attribute) -> bool {
        self.changed.contains(&attribute)
    }
}

/// Handle returned by [`WidgetModel::on_change`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type ChangeHandler = Box<dyn FnMut(&ChangeEvent)>;

pub struct WidgetModel {
    id: String,
    width: f64,
    height: f64,
    graph: Graph,
    clicked_atom_index: Option<usize>,
    highlight_atoms: Vec<usize>,
    dirty: BTreeSet<Attribute>,
    listeners: Vec<(Subscription, ChangeHandler)>,
    next_subscription: u64,
}

impl fmt::Debug for WidgetModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetModel")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("graph", &self.graph)
            .field("clicked_atom_index", &self.clicked_atom_index)
            .field("highlight_atoms", &self.highlight_atoms)
            .field("dirty", &self.dirty)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl WidgetModel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            graph: Graph::default(),
            clicked_atom_index: None,
            highlight_atoms: Vec::new(),
            dirty: BTreeSet::new(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Builds a model from a full kernel state. Unknown attributes are ignored.
    pub fn from_state(state: &StatePatch) -> Result<Self, ModelError> {
        let mut model = Self::new(String::new());
        model.apply_state(state)?;
        Ok(model)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn clicked_atom_index(&self) -> Option<usize> {
        self.clicked_atom_index
    }

    pub fn highlight_atoms(&self) -> &[usize] {
        &self.highlight_atoms
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn on_change(&mut self, handler: impl FnMut(&ChangeEvent) + 'static) -> Subscription {
        let subscription = Subscription(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((subscription, Box::new(handler)));
        subscription
    }

    /// Returns `false` if the subscription was not registered (or already removed).
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != subscription);
        self.listeners.len() != before
    }

    /// Applies a state patch received from the kernel.
    ///
    /// The patch is validated completely before anything is written. An incoming `graph` is
    /// merged into the existing records by id, so records keep their identity when the id sets
    /// agree. Returns the change event that was emitted, if any attribute actually changed.
    pub fn apply_state(&mut self, state: &StatePatch) -> Result<Option<ChangeEvent>, ModelError> {
        let update = StateUpdate::parse(state)?;
        let mut changed = Vec::new();

        if let Some(id) = update.id {
            if id != self.id {
                self.id = id;
                changed.push(Attribute::Id);
            }
        }
        if let Some(width) = update.width {
            if width != self.width {
                self.width = width;
                changed.push(Attribute::Width);
            }
        }
        if let Some(height) = update.height {
            if height != self.height {
                self.height = height;
                changed.push(Attribute::Height);
            }
        }
        if let Some(graph) = update.graph {
            if graph != self.graph {
                let outcome = self.graph.reconcile_from(graph);
                debug!(nodes = ?outcome.nodes, links = ?outcome.links, "graph reconciled");
                changed.push(Attribute::Graph);
            }
        }
        if let Some(clicked_atom_index) = update.clicked_atom_index {
            if clicked_atom_index != self.clicked_atom_index {
                self.clicked_atom_index = clicked_atom_index;
                self.dirty.remove(&Attribute::ClickedAtomIndex);
                changed.push(Attribute::ClickedAtomIndex);
            }
        }
        if let Some(highlight_atoms) = update.highlight_atoms {
            if highlight_atoms != self.highlight_atoms {
                self.highlight_atoms = highlight_atoms;
                changed.push(Attribute::HighlightAtoms);
            }
        }

        Ok(self.emit(changed))
    }

    /// Local write of the click selection; marks the attribute dirty until the next save.
    pub fn set_clicked_atom_index(&mut self, clicked_atom_index: Option<usize>) -> bool {
        if self.clicked_atom_index == clicked_atom_index {
            return false;
        }
        self.clicked_atom_index = clicked_atom_index;
        self.dirty.insert(Attribute::ClickedAtomIndex);
        self.emit(vec![Attribute::ClickedAtomIndex]);
        true
    }

    /// Drains dirty attributes into a patch for the kernel.
    pub fn save(&mut self) -> Option<StatePatch> {
        if self.dirty.is_empty() {
            return None;
        }
        let dirty = std::mem::take(&mut self.dirty);
        let patch = dirty
            .into_iter()
            .map(|attribute| (attribute.as_str().to_owned(), self.attribute_value(attribute)))
            .collect::<StatePatch>();
        debug!(attributes = patch.len(), "saving widget state");
        Some(patch)
    }

    /// Full state, as it would be sent to a freshly opened kernel comm.
    pub fn state(&self) -> StatePatch {
        Attribute::ALL
            .into_iter()
            .map(|attribute| (attribute.as_str().to_owned(), self.attribute_value(attribute)))
            .collect()
    }

    fn attribute_value(&self, attribute: Attribute) -> serde_json::Value {
        match attribute {
            Attribute::Graph => self.graph.to_json(),
            Attribute::Id => serde_json::Value::String(self.id.clone()),
            Attribute::Width => serde_json::json!(self.width),
            Attribute::Height => serde_json::json!(self.height),
            Attribute::ClickedAtomIndex => match self.clicked_atom_index {
                Some(index) => serde_json::json!(index),
                None => serde_json::Value::Null,
            },
            Attribute::HighlightAtoms => serde_json::json!(self.highlight_atoms),
        }
    }

    fn emit(&mut self, changed: Vec<Attribute>) -> Option<ChangeEvent> {
        if changed.is_empty() {
            return None;
        }
        let event = ChangeEvent { changed };
        trace!(changed = ?event.changed, listeners = self.listeners.len(), "model changed");
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
        Some(event)
    }
}

#[derive(Debug, Default)]
struct StateUpdate {
    id: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
    graph: Option<Graph>,
    clicked_atom_index: Option<Option<usize>>,
    highlight_atoms: Option<Vec<usize>>,
}

impl StateUpdate {
    fn parse(state: &StatePatch) -> Result<Self, ModelError> {
        let mut update = Self::default();
        for (name, value) in state {
            let Some(attribute) = Attribute::from_name(name) else {
                trace!(attribute = %name, "ignoring unknown model attribute");
                continue;
            };
            match attribute {
                Attribute::Graph => update.graph = Some(Graph::from_json(value)?),
                Attribute::Id => update.id = Some(parse_id(value)?),
                Attribute::Width => update.width = Some(parse_dimension(attribute, value)?),
                Attribute::Height => update.height = Some(parse_dimension(attribute, value)?),
                Attribute::ClickedAtomIndex => {
                    update.clicked_atom_index = Some(parse_clicked_atom_index(value)?);
                }
                Attribute::HighlightAtoms => {
                    update.highlight_atoms = Some(parse_atom_list(attribute, value)?);
                }
            }
        }
        Ok(update)
    }
}

fn parse_id(value: &serde_json::Value) -> Result<String, ModelError> {
    match value {
        serde_json::Value::String(id) => Ok(id.clone()),
        serde_json::Value::Number(id) => Ok(id.to_string()),
        _ => Err(ModelError::InvalidAttribute {
            attribute: Attribute::Id,
            reason: "expected a string",
        }),
    }
}

fn parse_dimension(attribute: Attribute, value: &serde_json::Value) -> Result<f64, ModelError> {
    value
        .as_f64()
        .filter(|dimension| dimension.is_finite() && *dimension >= 0.0)
        .ok_or(ModelError::InvalidAttribute { attribute, reason: "expected a non-negative number" })
}

/// `null` and negative indices both mean "nothing clicked".
fn parse_clicked_atom_index(value: &serde_json::Value) -> Result<Option<usize>, ModelError> {
    if value.is_null() {
        return Ok(None);
    }
    if let Some(index) = value.as_u64() {
        return usize::try_from(index).map(Some).map_err(|_| ModelError::InvalidAttribute {
            attribute: Attribute::ClickedAtomIndex,
            reason: "index out of range",
        });
    }
    if value.as_i64().is_some_and(|index| index < 0) {
        return Ok(None);
    }
    Err(ModelError::InvalidAttribute {
        attribute: Attribute::ClickedAtomIndex,
        reason: "expected an integer or null",
    })
}

fn parse_atom_list(attribute: Attribute, value: &serde_json::Value) -> Result<Vec<usize>, ModelError> {
    let invalid = ModelError::InvalidAttribute { attribute, reason: "expected an array of atom indices" };
    match value {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| item.as_u64().and_then(|index| usize::try_from(index).ok()))
            .collect::<Option<Vec<_>>>()
            .ok_or(invalid),
        _ => Err(invalid),
    }
}
