//! IDM Queue Library
//!
//! Turns a JSON config describing a multipart RAR release into validated
//! entries in the Internet Download Manager queue.
//!
//! # Architecture
//!
//! The run is a straight line through these modules:
//! - [`config`] - JSON config loading, defaults and validation
//! - [`input`] - Input selection (paste, URLs, IDs, generated parts)
//! - [`resolver`] - Landing-page resolution to direct download links
//! - [`validator`] - HEAD/GET probing and RAR acceptance rules
//! - [`queue`] - Enqueue loop with resume and existing-file handling
//! - [`idm`] - IDM command-line integration and state reconciliation
//! - [`resume`] - Persisted set of already-queued URLs
//! - [`summary`] - End-of-run summary block
//!
//! [`pipeline`] wires them together.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod idm;
pub mod input;
pub mod logging;
pub mod pipeline;
pub mod queue;
pub mod report;
pub mod resolver;
pub mod resume;
pub mod summary;
pub mod validator;

mod user_agent;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError, ConfigLoader, load_config};
pub use idm::{DownloadManager, IdmController, IdmError};
pub use input::{InputMode, SelectedInput};
pub use pipeline::{Pipeline, PipelineError};
pub use queue::{ExistingFileAction, QueueOutcome};
pub use report::{FilePart, GenerationReport};
pub use summary::RunSummary;
pub use validator::{HttpLinkValidator, LinkValidator, ValidationPolicy};
