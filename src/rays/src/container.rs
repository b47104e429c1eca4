//! Interface to the container collaborators
//!
//! The boundary does not parse, render or decompile anything itself. A
//! format implementation plugs in by implementing [`Container`] (plus
//! [`Cast`] and [`Script`] for its script tables); everything in this crate
//! is generic over it.

use crate::fourcc::FourCC;
use crate::stream::{Endianness, ReadStream, WriteStream};

/// Errors reported by a container implementation
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("Container rejected input: {0}")]
    Rejected(String),

    #[error("Write stream out of space: need {needed} bytes, {available} available")]
    OutOfSpace { needed: usize, available: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// One entry of the chunk directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkEntry {
    pub tag: FourCC,
    pub id: i32,
}

impl ChunkEntry {
    /// Id 0 is reserved and never exported
    pub const SENTINEL_ID: i32 = 0;

    pub fn new(tag: FourCC, id: i32) -> Self {
        Self { tag, id }
    }

    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.id == Self::SENTINEL_ID
    }
}

/// Script sub-kind of a script cast member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Score,
    Movie,
    Parent,
    Unknown(u16),
}

/// Declared type of a cast member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Script(ScriptKind),
    /// Any non-script member, with its raw type code
    Other(u32),
}

/// The cast member that owns a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastMember {
    pub id: i32,
    pub name: String,
    pub kind: MemberKind,
}

/// A compiled script resolved from a cast's script context
pub trait Script {
    /// Owning cast member, if the script is attached to one
    fn member(&self) -> Option<&CastMember>;

    /// Reconstructed source text
    fn source_text(&self, line_ending: &str, dot_syntax: bool) -> Result<String, ContainerError>;

    /// Disassembly text
    fn bytecode_text(&self, line_ending: &str, dot_syntax: bool)
        -> Result<String, ContainerError>;
}

/// A named cast library inside the container
pub trait Cast {
    fn name(&self) -> &str;

    /// Resolved script table in ascending id order, or `None` when the cast
    /// has no script context.
    fn scripts(&self) -> Option<Vec<(i32, &dyn Script)>>;

    fn script(&self, id: i32) -> Option<&dyn Script> {
        self.scripts()?
            .into_iter()
            .find_map(|(script_id, script)| (script_id == id).then_some(script))
    }
}

/// A parsed multi-chunk container
pub trait Container: Sized {
    /// Parse a container from the stream
    fn read(stream: &mut ReadStream<'_>) -> Result<Self, ContainerError>;

    /// Chunk directory in native order
    fn directory(&self) -> Vec<ChunkEntry>;

    fn chunk_exists(&self, tag: FourCC, id: i32) -> bool;

    /// Raw chunk bytes. `Some(&[])` is an existing, empty chunk.
    fn chunk_data(&self, tag: FourCC, id: i32) -> Option<&[u8]>;

    /// Structural JSON text for one chunk, `None` if the chunk has no
    /// structural form. The text may use `\v` and `\xNN` escapes.
    fn render_chunk(&self, tag: FourCC, id: i32) -> Result<Option<String>, ContainerError>;

    /// True for an external cast library rather than a movie
    fn is_cast(&self) -> bool;

    fn version(&self) -> u32;

    /// Whether scripts should be decompiled with dot syntax
    fn dot_syntax(&self) -> bool;

    fn endianness(&self) -> Endianness;

    /// Predicted serialized size. May be smaller than what `write` needs.
    fn estimated_size(&self) -> usize;

    fn casts(&self) -> Vec<&dyn Cast>;

    /// Lift edit protection
    fn unprotect(&mut self);

    /// Resolve script contexts for every cast
    fn parse_scripts(&mut self) -> Result<(), ContainerError>;

    /// Stage decompiled source back into the script chunks
    fn restore_script_text(&mut self) -> Result<(), ContainerError>;

    /// Rebuild the internal offset maps ahead of `write`
    fn prepare_write(&mut self) -> Result<(), ContainerError>;

    fn write(&self, stream: &mut WriteStream<'_>) -> Result<(), ContainerError>;
}
