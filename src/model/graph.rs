// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::ids::RecordId;
use super::value::{deep_copy, SharedObject, Value};

use crate::reconcile::{reconcile_collection, CollectionOutcome, Identified};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Nodes,
    Links,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nodes => f.write_str("nodes"),
            Self::Links => f.write_str("links"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("graph must be a JSON object")]
    NotAnObject,
    #[error("graph `{collection}` must be an array")]
    NotAnArray { collection: Collection },
    #[error("graph {collection}[{position}] must be an object")]
    RecordNotAnObject { collection: Collection, position: usize },
    #[error("graph {collection}[{position}] has no valid `id`")]
    MissingId { collection: Collection, position: usize },
}

/// Node and link records of a molecule graph.
///
/// `Clone` shares the record handles; use [`Graph::deep_copy`] for an independent snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: Vec<SharedObject>,
    links: Vec<SharedObject>,
}

/// Per-collection result of merging an incoming graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphReconcile {
    pub nodes: CollectionOutcome,
    pub links: CollectionOutcome,
}

impl Graph {
    pub fn new(nodes: Vec<SharedObject>, links: Vec<SharedObject>) -> Self {
        Self { nodes, links }
    }

    /// Parses `{ "nodes": [...], "links": [...] }`. Missing collections are empty. Every record
    /// must be an object; nodes also need an integer or string `id`, links may leave it out.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, GraphError> {
        let serde_json::Value::Object(map) = value else {
            return Err(GraphError::NotAnObject);
        };

        Ok(Self {
            nodes: parse_records(map.get("nodes"), Collection::Nodes, true)?,
            links: parse_records(map.get("links"), Collection::Links, false)?,
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        let to_array = |records: &[SharedObject]| {
            serde_json::Value::Array(
                records
                    .iter()
                    .map(|record| serde_json::Value::Object(record.borrow().to_json()))
                    .collect(),
            )
        };
        serde_json::json!({
            "nodes": to_array(&self.nodes),
            "links": to_array(&self.links),
        })
    }

    pub fn deep_copy(&self) -> Self {
        Self {
            nodes: self.nodes.iter().map(deep_copy).collect(),
            links: self.links.iter().map(deep_copy).collect(),
        }
    }

    pub fn nodes(&self) -> &[SharedObject] {
        &self.nodes
    }

    pub fn links(&self) -> &[SharedObject] {
        &self.links
    }

    pub fn nodes_mut(&mut self) -> &mut Vec<SharedObject> {
        &mut self.nodes
    }

    pub fn links_mut(&mut self) -> &mut Vec<SharedObject> {
        &mut self.links
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Merges `incoming` into this graph, keeping record identities wherever the id sets agree.
    ///
    /// Links without an id cannot be matched, so their collection is replaced wholesale.
    pub fn reconcile_from(&mut self, incoming: Graph) -> GraphReconcile {
        let anonymous_links =
            self.links.iter().chain(&incoming.links).any(|link| link.record_id().is_none());
        let links = if anonymous_links {
            debug!(links = incoming.links.len(), "links without ids; replacing collection");
            self.links = incoming.links;
            CollectionOutcome::Replaced
        } else {
            reconcile_collection(&mut self.links, incoming.links)
        };

        GraphReconcile { nodes: reconcile_collection(&mut self.nodes, incoming.nodes), links }
    }
}

fn parse_records(
    value: Option<&serde_json::Value>,
    collection: Collection,
    require_id: bool,
) -> Result<Vec<SharedObject>, GraphError> {
    let items = match value {
        None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(serde_json::Value::Array(items)) => items,
        Some(_) => return Err(GraphError::NotAnArray { collection }),
    };

    items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let Value::Object(record) = Value::from_json(item) else {
                return Err(GraphError::RecordNotAnObject { collection, position });
            };
            if require_id && record.borrow().get("id").and_then(RecordId::from_value).is_none() {
                return Err(GraphError::MissingId { collection, position });
            }
            Ok(record)
        })
        .collect()
}
