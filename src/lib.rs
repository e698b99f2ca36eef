//! Hover-to-extract table detection.
//!
//! A hovered element is walked up to the nearest table-like region
//! ([`detector`]), a click turns that region into headers and rows
//! ([`extractor`]), and the result goes to the host panel ([`channel`]),
//! optionally with PII masked ([`anonymizer`]). Everything runs over the
//! [`dom::GridNode`] abstraction.

pub mod anonymizer;
pub mod channel;
pub mod cli;
pub mod config;
pub mod detector;
pub mod dom;
pub mod error;
pub mod export;
pub mod extractor;
pub mod logging;

pub use channel::{ChannelPublisher, PanelMessage, Publisher};
pub use config::{DetectionConfig, GridflowConfig, HeaderPolicy};
pub use detector::{AncestorWalker, Classifier, DetectorSession, Selection};
pub use dom::{GridNode, Rect};
pub use error::{GridflowError, GridflowResult};
pub use extractor::{clean_text, ExtractedTable, Extractor};
