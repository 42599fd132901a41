//! Output stage for a finished build context.
//!
//! # Submodules
//!
//! - [`writer`]: the [`Writer`](writer::Writer) seam and the filesystem writer
//! - [`pages`]: Markdown rendering and generation of aggregate pages
//! - [`json`]: JSON snapshot of the merged context

pub mod json;
pub mod pages;
pub mod writer;
