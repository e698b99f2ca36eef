use tracing::{debug, info};
use uuid::Uuid;

use super::count_table_elements;
use super::walker::{AncestorWalker, Selection};
use crate::channel::{PanelMessage, Publisher};
use crate::config::{GridflowConfig, SessionConfig};
use crate::dom::GridNode;
use crate::extractor::{ExtractedTable, Extractor};

/// One hover-to-extract gesture loop bound to a page.
///
/// Owns the current [`Selection`] and the pending extraction target. The
/// caller's event loop serializes the handlers; each one runs to completion
/// and the latest pointer-move always supersedes earlier ones. While the
/// session is stopped every handler is a no-op.
pub struct DetectorSession<N: GridNode, P: Publisher> {
    id: Uuid,
    walker: AncestorWalker,
    extractor: Extractor,
    settings: SessionConfig,
    publisher: P,
    active: bool,
    selection: Option<Selection<N>>,
    pending: Option<N>,
}

impl<N: GridNode, P: Publisher> DetectorSession<N, P> {
    pub fn new(config: &GridflowConfig, publisher: P) -> Self {
        Self {
            id: Uuid::new_v4(),
            walker: AncestorWalker::new(config.detection.clone()),
            extractor: Extractor::new(config.detection.header_policy),
            settings: config.session.clone(),
            publisher,
            active: false,
            selection: None,
            pending: None,
        }
    }

    /// Begin listening. With a page root, the initial table count is
    /// published right away.
    pub fn start(&mut self, root: Option<&N>) {
        if self.active {
            return;
        }
        self.active = true;
        info!(session = %self.id, "detector session started");
        if let Some(root) = root {
            self.rescan(root);
        }
    }

    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.selection = None;
        self.pending = None;
        info!(session = %self.id, "detector session stopped");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn selection(&self) -> Option<&Selection<N>> {
        self.selection.as_ref()
    }

    pub fn pending_target(&self) -> Option<&N> {
        self.pending.as_ref()
    }

    /// Re-evaluate the selection for the element under the pointer.
    pub fn on_pointer_move(&mut self, target: &N) -> Option<&Selection<N>> {
        if !self.active {
            return None;
        }

        match self.walker.find_candidate(target) {
            Some(selection) => {
                self.pending = Some(selection.target.clone());
                self.selection = Some(selection);
            }
            None => {
                self.selection = None;
                self.pending = None;
            }
        }
        self.selection.as_ref()
    }

    /// Hide the overlay. The pending target is kept so a click that lands
    /// just after the pointer leaves still extracts.
    pub fn on_mouse_leave(&mut self) {
        if self.active {
            self.selection = None;
        }
    }

    /// Extract the pending target and hand it to the panel.
    pub fn on_click(&mut self) -> Option<ExtractedTable> {
        if !self.active {
            return None;
        }
        let target = self.pending.take()?;

        if self.settings.revalidate_on_click && !self.walker.classifier().qualifies(&target) {
            debug!(session = %self.id, tag = target.tag_name(), "pending target no longer qualifies");
            self.selection = None;
            return None;
        }

        self.publisher.publish(PanelMessage::ExtractionStarted);
        let mut table = self.extractor.extract(&target);
        if self.settings.anonymize {
            table = table.anonymized();
        }
        info!(
            session = %self.id,
            headers = table.headers.len(),
            rows = table.rows.len(),
            "table extracted"
        );
        self.publisher.publish(PanelMessage::from(table.clone()));
        self.selection = None;
        Some(table)
    }

    /// Publish the coarse table count for the badge.
    pub fn rescan(&mut self, root: &N) -> usize {
        if !self.active {
            return 0;
        }
        let count = count_table_elements(root);
        debug!(session = %self.id, count, "rescan");
        self.publisher.publish(PanelMessage::TableCount { count });
        count
    }
}
