//! Visualization state for jewelviz viewports
//!
//! Nothing here talks to a GPU. This crate decides where cameras go, which
//! material a mesh is drawn with, what the uniform buffers contain and how
//! 2D documents are zoomed and paged; a host renderer consumes the results.

pub mod camera;
pub mod material;
pub mod scene;
pub mod document_view;

pub use camera::*;
pub use material::*;
pub use scene::*;
pub use document_view::*;
