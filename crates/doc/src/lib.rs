//! engross-doc: canonical contract document tree.
//!
//! Provides the node model stored templates normalize into, the
//! tolerant content normalizer, and the HTML ingestion path. Downstream
//! crates rewrite these trees (placeholder assignment/resolution) but
//! the structural model lives here.
//!
//! # Public API
//!
//! - [`Node`] / [`Mark`] -- the document model
//! - [`normalize()`] -- any accepted stored shape → canonical `doc`
//! - [`html_to_doc()`] -- HTML string → canonical `doc`
//! - [`infer_direction()`] -- script-direction fallback for alignment

pub mod direction;
pub mod html;
pub mod node;
pub mod normalize;

pub use direction::{infer_direction, Direction};
pub use html::html_to_doc;
pub use node::{BlockAttrs, HeadingAttrs, Mark, Node};
pub use normalize::{normalize, NormalizeWarning, TemplateInput};
