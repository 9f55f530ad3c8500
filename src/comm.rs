// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Outbound side of the notebook channel.

use std::io::{self, Write};

use thiserror::Error;
use tracing::trace;

use crate::rpc::{OutboundFrame, OutboundMessage};

#[derive(Debug, Error)]
pub enum CommError {
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write frame: {0}")]
    Io(#[from] io::Error),
}

/// One-directional, fire-and-forget sender towards the kernel.
pub trait Comm {
    fn send(&mut self, frame: OutboundFrame) -> Result<(), CommError>;
}

/// Writes one JSON frame per line.
#[derive(Debug)]
pub struct JsonLinesComm<W> {
    writer: W,
}

impl<W: Write> JsonLinesComm<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Comm for JsonLinesComm<W> {
    fn send(&mut self, frame: OutboundFrame) -> Result<(), CommError> {
        let mut line = serde_json::to_vec(&frame)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        trace!(bytes = line.len(), "frame sent");
        Ok(())
    }
}

/// Keeps every sent frame in memory.
#[derive(Debug, Default)]
pub struct RecordingComm {
    frames: Vec<OutboundFrame>,
}

impl RecordingComm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[OutboundFrame] {
        &self.frames
    }

    /// Custom messages only, in send order.
    pub fn messages(&self) -> impl Iterator<Item = &OutboundMessage> {
        self.frames.iter().filter_map(|frame| match frame {
            OutboundFrame::Custom { content } => Some(content),
            OutboundFrame::Update { .. } => None,
        })
    }

    pub fn take(&mut self) -> Vec<OutboundFrame> {
        std::mem::take(&mut self.frames)
    }
}

impl Comm for RecordingComm {
    fn send(&mut self, frame: OutboundFrame) -> Result<(), CommError> {
        self.frames.push(frame);
        Ok(())
    }
}
