//! Viewer session orchestration for jewelviz
//!
//! This crate ties the geometry, I/O and visualization crates together into
//! a multi-document viewer:
//! - Document sets for design references and meshes, each with one active entry
//! - A layout controller for tabbed, split and triple-pane arrangements
//! - Per-viewport zoom, page, camera and material state
//! - Generation-guarded asynchronous loads
//! - Upload screening, banners and configuration
//! - Collaborator interfaces for persistence, storage, identity and comments

pub mod banner;
pub mod collab;
pub mod config;
pub mod document;
pub mod document_set;
pub mod intake;
pub mod layout;
pub mod loader;
pub mod resource;
pub mod session;
pub mod viewport;

pub use banner::{Banner, Severity};
pub use collab::Collaborators;
pub use config::ViewerConfig;
pub use document::{DocumentHandle, DocumentId, DocumentKind, GeometryStatus};
pub use document_set::{DocumentEntry, DocumentSet};
pub use intake::{IncomingFile, IntakeReport, RejectReason};
pub use layout::{LayoutController, LayoutMode, LayoutState, Tab, TabRejected, ViewportId, ViewportKind};
pub use loader::{LoadStatus, LoadTicket};
pub use resource::{PreviewHandle, PreviewResources};
pub use session::ViewerSession;
pub use viewport::{Pane, ViewportFrame, ViewportStatus};
