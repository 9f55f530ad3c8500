// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::Cell;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, info, trace};

use super::index::VisualIndex;
use super::views::{LinksView, NodesView};
use crate::comm::{Comm, CommError};
use crate::config::ViewConfig;
use crate::layout::{link_forces, LayoutEngine, LayoutError, Point};
use crate::model::{Graph, SelectionModel, StatePatch, Subscription, WidgetModel};
use crate::rpc::{Bond, OutboundMessage, ViewCall};
use crate::scene::{ElementId, Scene, StyleSpec};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("no atom {atom} in the view")]
    UnknownAtom { atom: usize },
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("the view container is gone")]
    DetachedScene,
    #[error("failed to notify the kernel: {0}")]
    Comm(#[from] CommError),
}

/// The 2D molecule view.
///
/// Owns the scene, the per-render graph snapshot and the visual index. A full re-render happens
/// on every model change (see [`MolView::attach`] and [`MolView::render_if_stale`]); layout ticks
/// only move existing elements.
pub struct MolView<L> {
    config: ViewConfig,
    layout: L,
    scene: Scene,
    svg: Option<ElementId>,
    graph: Graph,
    index: VisualIndex,
    nodes_view: NodesView,
    links_view: LinksView,
    selection: SelectionModel,
    messages: Vec<serde_json::Value>,
    stale: Rc<Cell<bool>>,
    subscription: Option<Subscription>,
    renders: u64,
}

impl<L: LayoutEngine> MolView<L> {
    pub fn new(config: ViewConfig, layout: L) -> Self {
        Self {
            config,
            layout,
            scene: Scene::new("div"),
            svg: None,
            graph: Graph::default(),
            index: VisualIndex::default(),
            nodes_view: NodesView::new(),
            links_view: LinksView::new(),
            selection: SelectionModel::new(None),
            messages: Vec::new(),
            stale: Rc::new(Cell::new(true)),
            subscription: None,
            renders: 0,
        }
    }

    /// Subscribes to `model` so that any change marks the view for re-rendering.
    pub fn attach(&mut self, model: &mut WidgetModel) {
        self.detach(model);
        let stale = Rc::clone(&self.stale);
        self.subscription = Some(model.on_change(move |_| stale.set(true)));
        self.stale.set(true);
    }

    pub fn detach(&mut self, model: &mut WidgetModel) {
        if let Some(subscription) = self.subscription.take() {
            model.unsubscribe(subscription);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn is_stale(&self) -> bool {
        self.stale.get()
    }

    /// Rebuilds the whole scene from `model` and re-seeds the layout.
    ///
    /// Link endpoints are validated before the scene is touched, so a failed render leaves the
    /// previous scene in place.
    pub fn render(
        &mut self,
        model: &WidgetModel,
        comm: Option<&mut dyn Comm>,
    ) -> Result<(), ViewError> {
        let graph = model.graph().deep_copy();
        let forces = link_forces(graph.links(), graph.nodes().len(), self.config.link_defaults())?;
        let endpoints = forces.iter().map(|force| (force.source, force.target)).collect::<Vec<_>>();

        let root = self.scene.root();
        if let Some(container) = self.scene.get_mut(root) {
            container.set_attr("id", model.id());
            container.set_style("width", format!("{}px", model.width()));
            container.set_style("height", format!("{}px", model.height()));
            container.set_style("position", "relative");
        }

        let svg = match self.scene.find_child(root, "svg") {
            Some(svg) => svg,
            None => self.scene.append(root, "svg").ok_or(ViewError::DetachedScene)?,
        };
        self.scene.clear_children(svg);
        if let Some(element) = self.scene.get_mut(svg) {
            element.set_attr("width", model.width().to_string());
            element.set_attr("height", model.height().to_string());
            element.set_attr("border", "1");
        }

        self.links_view.render(&mut self.scene, svg, graph.links(), &endpoints);
        self.nodes_view.render(&mut self.scene, svg, graph.nodes());

        self.selection = SelectionModel::new(model.clicked_atom_index());
        self.nodes_view.mark_selected(&mut self.scene, self.selection.clicked_atom_index());
        self.nodes_view.mark_highlighted(&mut self.scene, model.highlight_atoms());

        self.index = VisualIndex::build(&self.scene, svg);
        self.svg = Some(svg);

        let center = Point::new(model.width() / 2.0, model.height() / 2.0);
        self.layout.bind(graph.nodes(), forces, center);
        self.graph = graph;
        self.redraw();

        self.stale.set(false);
        self.renders += 1;
        info!(
            view = model.id(),
            nodes = self.graph.nodes().len(),
            links = self.graph.links().len(),
            render = self.renders,
            "view rendered"
        );

        if let Some(comm) = comm {
            comm.send(OutboundMessage::Ready.into())?;
        }
        Ok(())
    }

    /// Re-renders if a model change arrived since the last render. Returns whether it rendered.
    pub fn render_if_stale(
        &mut self,
        model: &WidgetModel,
        comm: Option<&mut dyn Comm>,
    ) -> Result<bool, ViewError> {
        if !self.is_stale() {
            return Ok(false);
        }
        self.render(model, comm)?;
        Ok(true)
    }

    /// Advances the layout by one iteration and moves the elements. Returns `false` once settled.
    pub fn tick(&mut self) -> bool {
        if !self.layout.tick() {
            return false;
        }
        self.redraw();
        true
    }

    fn redraw(&mut self) {
        self.nodes_view.render_transform(&mut self.scene, self.graph.nodes());
        self.links_view.render_position(&mut self.scene, self.graph.nodes());
    }

    /// Local click on an atom: updates the selection and, if it changed, writes it back into the
    /// model. Returns the saved patch that must be sent to the kernel.
    pub fn click_atom(
        &mut self,
        model: &mut WidgetModel,
        atom: usize,
    ) -> Result<Option<StatePatch>, ViewError> {
        if self.index.node(atom).is_none() {
            return Err(ViewError::UnknownAtom { atom });
        }
        if !self.selection.set_clicked_atom_index(Some(atom)) {
            return Ok(None);
        }
        self.nodes_view.mark_selected(&mut self.scene, Some(atom));
        model.set_clicked_atom_index(Some(atom));
        debug!(atom, "atom clicked");
        Ok(model.save())
    }

    /// Appends a raw inbound message to the log. The log is never pruned, not even by a render.
    pub fn record_message(&mut self, message: serde_json::Value) {
        self.messages.push(message);
    }

    pub(crate) fn apply_call(&mut self, call: ViewCall) -> Result<serde_json::Value, ViewError> {
        match call {
            ViewCall::SetAtomStyle { atoms, spec } => self.set_atom_style(&atoms, &spec)?,
            ViewCall::SetBondStyle { bonds, spec } => self.set_bond_style(&bonds, &spec),
            ViewCall::SetAtomLabel { atom, text, spec } => {
                self.set_atom_label(atom, text.as_deref(), &spec)?;
            }
            ViewCall::SetBondLabel { bond, text, spec } => {
                self.set_bond_label(bond, text.as_deref(), &spec);
            }
        }
        Ok(serde_json::Value::Null)
    }

    /// Styles the circle of every listed atom. Fails before writing anything if an atom is
    /// missing.
    pub fn set_atom_style(&mut self, atoms: &[usize], spec: &StyleSpec) -> Result<(), ViewError> {
        let groups = atoms
            .iter()
            .map(|&atom| self.index.node(atom).ok_or(ViewError::UnknownAtom { atom }))
            .collect::<Result<Vec<_>, _>>()?;
        for group in groups {
            self.style_child(group, 0, spec);
        }
        Ok(())
    }

    /// Styles the line of every listed bond; unknown bonds are skipped.
    pub fn set_bond_style(&mut self, bonds: &[Bond], spec: &StyleSpec) {
        for &Bond(p, q) in bonds {
            match self.index.link(p, q) {
                Some(group) => self.style_child(group, 0, spec),
                None => trace!(p, q, "no bond to style"),
            }
        }
    }

    pub fn set_atom_label(
        &mut self,
        atom: usize,
        text: Option<&str>,
        spec: &StyleSpec,
    ) -> Result<(), ViewError> {
        let group = self.index.node(atom).ok_or(ViewError::UnknownAtom { atom })?;
        self.label_child(group, text, spec);
        Ok(())
    }

    /// Labels a bond; an unknown bond is a no-op.
    pub fn set_bond_label(&mut self, bond: Bond, text: Option<&str>, spec: &StyleSpec) {
        let Bond(p, q) = bond;
        match self.index.link(p, q) {
            Some(group) => self.label_child(group, text, spec),
            None => trace!(p, q, "no bond to label"),
        }
    }

    fn style_child(&mut self, group: ElementId, position: usize, spec: &StyleSpec) {
        if let Some(element) = self.scene.child(group, position).and_then(|id| self.scene.get_mut(id)) {
            element.apply_style(spec);
        }
    }

    fn label_child(&mut self, group: ElementId, text: Option<&str>, spec: &StyleSpec) {
        let Some(label) = self.scene.child(group, 1).and_then(|id| self.scene.get_mut(id)) else {
            return;
        };
        if let Some(text) = text {
            label.set_text(text);
        }
        label.apply_style(spec);
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn svg(&self) -> Option<ElementId> {
        self.svg
    }

    /// The snapshot taken by the last render.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn index(&self) -> &VisualIndex {
        &self.index
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn message_log(&self) -> &[serde_json::Value] {
        &self.messages
    }

    pub fn render_count(&self) -> u64 {
        self.renders
    }
}
