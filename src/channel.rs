//! One-way messages from the page-side pipeline to the host panel.
//!
//! Publishing is fire-and-forget: there is no acknowledgement and a failed
//! delivery is logged and dropped. Callers that need reliability layer it on
//! top of a [`Publisher`].

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::extractor::ExtractedTable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PanelMessage {
    /// Sent right before a click extraction runs.
    ExtractionStarted,
    TableData {
        headers: Vec<String>,
        data: Vec<Vec<String>>,
    },
    /// Coarse count of native and ARIA tables on the page.
    TableCount { count: usize },
}

impl From<ExtractedTable> for PanelMessage {
    fn from(table: ExtractedTable) -> Self {
        PanelMessage::TableData {
            headers: table.headers,
            data: table.rows,
        }
    }
}

pub trait Publisher {
    fn publish(&self, message: PanelMessage);
}

impl<P: Publisher + ?Sized> Publisher for &P {
    fn publish(&self, message: PanelMessage) {
        (**self).publish(message)
    }
}

/// Publishes into an in-process channel read by the panel side.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: UnboundedSender<PanelMessage>,
}

impl ChannelPublisher {
    pub fn new(sender: UnboundedSender<PanelMessage>) -> Self {
        Self { sender }
    }

    /// Publisher plus the receiving end for the panel.
    pub fn pair() -> (Self, UnboundedReceiver<PanelMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl Publisher for ChannelPublisher {
    fn publish(&self, message: PanelMessage) {
        if let Err(e) = self.sender.send(message) {
            debug!("panel channel closed, dropping message: {:?}", e.0);
        }
    }
}

/// Writes each message as one JSON object per line.
pub struct JsonLinesPublisher<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write> JsonLinesPublisher<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write> Publisher for JsonLinesPublisher<W> {
    fn publish(&self, message: PanelMessage) {
        let line = match serde_json::to_string(&message) {
            Ok(line) => line,
            Err(e) => {
                debug!("could not encode panel message: {}", e);
                return;
            }
        };

        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            debug!("panel write failed, dropping message: {}", e);
        }
    }
}
