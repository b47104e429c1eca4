//! # rays
//!
//! Foreign-call boundary for parsed Director containers.
//!
//! A host runtime that cannot hold native objects talks to a parsed
//! container through this crate:
//! - Opaque handles owning the parsed container and its input bytes
//! - Structured (JSON) and compact (binary) chunk dumps
//! - Per-script and bulk script exports with decompiled text
//! - Re-serialization of a mutated container into a self-growing buffer
//! - Escape normalisation so every JSON payload is strict
//!
//! Parsing, chunk rendering and decompiling are supplied by the host crate
//! through the [`Container`] trait; [`export_boundary!`] then emits the
//! `extern "C"` symbols for that implementation.
//!
//! ## Example
//!
//! ```ignore
//! use rays::{Config, Handle};
//!
//! let mut handle = Handle::<MyContainer>::read(&bytes)?;
//! let chunks = rays::decode_chunk_dump(&handle.dump_chunks()?)?;
//! let rewritten = handle.write_to_buffer(&Config::default())?;
//! ```

pub mod buffer;
pub mod config;
pub mod container;
pub mod escape;
pub mod export;
mod fault;
pub mod ffi;
pub mod fourcc;
pub mod handle;
pub mod scripts;
pub mod stream;
pub mod writer;

use std::collections::TryReserveError;

use container::ContainerError;

#[doc(inline)]
pub use buffer::OutputBuffer;
#[doc(inline)]
pub use config::Config;
#[doc(inline)]
pub use container::{Cast, CastMember, ChunkEntry, Container, MemberKind, Script, ScriptKind};
#[doc(inline)]
pub use escape::standardize as standardize_json_escapes;
#[doc(inline)]
pub use export::{decode_chunk_dump, dump_chunks, dump_json, ChunkRecord};
#[doc(inline)]
pub use fourcc::FourCC;
#[doc(inline)]
pub use handle::{decompile, Handle};
#[doc(inline)]
pub use scripts::{ScriptDetail, ScriptDump, ScriptEntry, ScriptType};
#[doc(inline)]
pub use stream::{Endianness, ReadStream, WriteStream};
#[doc(inline)]
pub use writer::write_with_growth;

/// Errors from boundary operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("Failed to parse container: {0}")]
    Parse(#[source] ContainerError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to render {tag} {id}: {source}")]
    Render {
        tag: FourCC,
        id: i32,
        #[source]
        source: Box<Error>,
    },

    #[error("Container collaborator failed: {0}")]
    Container(#[from] ContainerError),

    #[error("Serialization did not fit in {attempts} attempts (estimate {estimate} bytes)")]
    SerializationOverflow { estimate: usize, attempts: u32 },

    #[error("Container reports an estimated size of zero")]
    Empty,

    #[error("Allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("Invalid FourCC {0:?}: expected exactly 4 bytes")]
    InvalidFourCC(String),

    #[error("Invalid chunk dump (truncated {0})")]
    Truncated(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Internal fault: {0}")]
    Fault(String),
}

pub type Result<T> = std::result::Result<T, Error>;
