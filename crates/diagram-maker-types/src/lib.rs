//! Pure data types for diagram-maker: output formats, tool descriptors,
//! the error taxonomy and render results.
//!
//! This crate is a leaf dependency with no async runtime and no I/O. The
//! server crate builds its registry, resolver and dispatcher on top of it.

pub mod error;
pub mod format;
pub mod request;
pub mod result;
pub mod tool;

// Flat re-exports for convenience
pub use error::*;
pub use format::*;
pub use request::*;
pub use result::*;
pub use tool::*;
