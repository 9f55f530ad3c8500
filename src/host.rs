// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! One widget instance: authoritative model, view, dispatcher and the channel back to the kernel.

use thiserror::Error;
use tracing::{debug, warn};

use crate::comm::{Comm, CommError};
use crate::config::ViewConfig;
use crate::layout::LayoutEngine;
use crate::model::{Attribute, ModelError, WidgetModel};
use crate::render::{MolView, ViewError};
use crate::rpc::{Dispatcher, Disposition, InboundFrame, OutboundFrame};

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    View(#[from] ViewError),
    #[error(transparent)]
    Comm(#[from] CommError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Dispatched(Disposition),
    StateApplied { changed: Vec<Attribute> },
}

pub struct WidgetHost<L, C> {
    model: WidgetModel,
    view: MolView<L>,
    dispatcher: Dispatcher,
    comm: C,
}

impl<L: LayoutEngine, C: Comm> WidgetHost<L, C> {
    /// Attaches a view to `model` and performs the first render.
    pub fn new(
        mut model: WidgetModel,
        config: ViewConfig,
        layout: L,
        mut comm: C,
    ) -> Result<Self, HostError> {
        let dispatcher = Dispatcher::from_config(&config);
        let mut view = MolView::new(config, layout);
        view.attach(&mut model);
        view.render(&model, Some(&mut comm))?;
        Ok(Self { model, view, dispatcher, comm })
    }

    /// Handles one frame from the kernel. State updates re-render the view before returning.
    pub fn handle_frame(&mut self, frame: InboundFrame) -> Result<FrameOutcome, HostError> {
        match frame {
            InboundFrame::Custom { content } => {
                let disposition =
                    self.dispatcher.dispatch(&mut self.view, Some(&mut self.comm), content)?;
                Ok(FrameOutcome::Dispatched(disposition))
            }
            InboundFrame::Update { state } => {
                let changed = self
                    .model
                    .apply_state(&state)?
                    .map(|event| event.changed().to_vec())
                    .unwrap_or_default();
                debug!(changed = ?changed, "kernel state applied");
                self.pump()?;
                Ok(FrameOutcome::StateApplied { changed })
            }
        }
    }

    /// Re-renders if the model changed since the last render.
    pub fn pump(&mut self) -> Result<bool, HostError> {
        Ok(self.view.render_if_stale(&self.model, Some(&mut self.comm))?)
    }

    /// One layout iteration. Returns `false` once the layout has settled.
    pub fn tick(&mut self) -> bool {
        self.view.tick()
    }

    /// Local click on an atom; a changed selection is saved and sent to the kernel.
    pub fn click_atom(&mut self, atom: usize) -> Result<bool, HostError> {
        let Some(state) = self.view.click_atom(&mut self.model, atom)? else {
            return Ok(false);
        };
        self.comm.send(OutboundFrame::Update { state })?;
        if let Err(err) = self.pump() {
            warn!(error = %err, "re-render after click failed");
        }
        Ok(true)
    }

    pub fn model(&self) -> &WidgetModel {
        &self.model
    }

    pub fn view(&self) -> &MolView<L> {
        &self.view
    }

    pub fn comm(&self) -> &C {
        &self.comm
    }

    pub fn comm_mut(&mut self) -> &mut C {
        &mut self.comm
    }

    /// Detaches the view and hands back the model and the channel.
    pub fn shutdown(mut self) -> (WidgetModel, C) {
        self.view.detach(&mut self.model);
        (self.model, self.comm)
    }
}
