//! A reader for Hy source that never runs code.
//!
//! [`reader::Reader`] reads the Hy surface grammar. [`SafeReader`] reads the
//! same grammar but turns `#tag` forms into plain symbols and keeps `;`
//! comments as nodes, so untrusted source can be read, inspected and
//! re-rendered without side effects.

pub mod data;
pub mod reader;
pub mod repl;

#[cfg(feature = "render")]
mod render;
#[cfg(feature = "render")]
pub use render::{render_graphviz, render_svg};

#[cfg(feature = "web")]
pub mod web;

pub use data::{to_source, Comment, Model};
pub use reader::{read_all, read_all_safe, ReadErr, ReadResult, Reader, ReaderOptions, SafeReader};
