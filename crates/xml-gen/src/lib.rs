//! # xml-gen
//! A lightweight streaming XML emitter for Rust. A fluent generator writes
//! the declaration, tags, attributes, namespaces and text nodes straight to
//! an in-memory buffer or an output stream, tracking open tags on a stack so
//! elements can be closed automatically in reverse order.
mod generator;
mod sink;
mod value;

pub use self::generator::*;
pub use self::sink::*;
pub use self::value::*;

#[derive(Debug, thiserror::Error)]
pub enum XmlGenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No open tag left to close")]
    NoOpenTag,
}
