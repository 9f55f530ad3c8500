// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! A minimal retained scene graph (DOM/SVG-like).
//!
//! Elements live in an arena and are addressed by [`ElementId`]. Each element has a tag, string
//! attributes, a style map, optional text content and ordered children. Removed slots are reused.

use std::collections::BTreeMap;

use smallvec::SmallVec;
use smol_str::SmolStr;

pub const CLASS_ATTR: &str = "class";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    tag: SmolStr,
    attrs: BTreeMap<SmolStr, String>,
    style: BTreeMap<SmolStr, String>,
    text: Option<String>,
    children: SmallVec<[ElementId; 2]>,
    parent: Option<ElementId>,
}

impl Element {
    fn new(tag: &str, parent: Option<ElementId>) -> Self {
        Self { tag: SmolStr::new(tag), parent, ..Self::default() }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attrs.insert(SmolStr::new(name), value.into());
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attrs.remove(name)
    }

    pub fn class(&self) -> Option<&str> {
        self.attr(CLASS_ATTR)
    }

    pub fn style(&self) -> &BTreeMap<SmolStr, String> {
        &self.style
    }

    pub fn style_value(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, property: &str, value: impl Into<String>) {
        self.style.insert(SmolStr::new(property), value.into());
    }

    pub fn apply_style(&mut self, spec: &StyleSpec) {
        for (property, value) in spec.iter() {
            self.style.insert(property.clone(), value.to_owned());
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    slots: Vec<Option<Element>>,
    free: Vec<usize>,
    root: ElementId,
}

impl Scene {
    pub fn new(root_tag: &str) -> Self {
        Self { slots: vec![Some(Element::new(root_tag, None))], free: Vec::new(), root: ElementId(0) }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Number of live elements, including the root.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(Element::children).unwrap_or(&[])
    }

    pub fn child(&self, id: ElementId, position: usize) -> Option<ElementId> {
        self.children(id).get(position).copied()
    }

    pub fn find_child(&self, parent: ElementId, tag: &str) -> Option<ElementId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.get(*child).is_some_and(|element| element.tag() == tag))
    }

    /// Appends a new element as the last child of `parent`. Returns `None` if `parent` is gone.
    pub fn append(&mut self, parent: ElementId, tag: &str) -> Option<ElementId> {
        self.get(parent)?;

        let element = Element::new(tag, Some(parent));
        let id = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(element);
                ElementId(slot)
            }
            None => {
                self.slots.push(Some(element));
                ElementId(self.slots.len() - 1)
            }
        };

        if let Some(parent) = self.get_mut(parent) {
            parent.children.push(id);
        }
        Some(id)
    }

    /// Removes every descendant of `id`, keeping `id` itself.
    pub fn clear_children(&mut self, id: ElementId) {
        let Some(element) = self.get_mut(id) else {
            return;
        };
        let mut pending = std::mem::take(&mut element.children).into_vec();
        while let Some(child) = pending.pop() {
            if let Some(removed) = self.slots.get_mut(child.0).and_then(Option::take) {
                pending.extend(removed.children);
                self.free.push(child.0);
            }
        }
    }
}

/// Style properties to apply to an element, e.g. `{ "fill": "red", "opacity": "0.5" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSpec(BTreeMap<SmolStr, String>);

impl StyleSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts a JSON object into a style map. Strings are taken as-is, numbers and booleans
    /// are stringified, `null` values are skipped. Returns `None` for anything but an object.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let serde_json::Value::Object(map) = value else {
            return None;
        };
        let mut spec = Self::new();
        for (property, value) in map {
            let value = match value {
                serde_json::Value::String(value) => value.clone(),
                serde_json::Value::Number(value) => value.to_string(),
                serde_json::Value::Bool(value) => value.to_string(),
                _ => continue,
            };
            spec.insert(property, value);
        }
        Some(spec)
    }

    pub fn insert(&mut self, property: &str, value: impl Into<String>) {
        self.0.insert(SmolStr::new(property), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &str)> {
        self.0.iter().map(|(property, value)| (property, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
