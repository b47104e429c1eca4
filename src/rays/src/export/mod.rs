//! Chunk directory exports
//!
//! Two independent encodings of the chunk directory, both walked in native
//! order and both skipping the reserved id 0:
//! - [`dump_json`]: `[{"fourCC", "id", "data"}, ...]` with each chunk's
//!   structural JSON
//! - [`dump_chunks`]: the compact binary layout, decoded by
//!   [`decode_chunk_dump`]

mod binary;
mod json;

pub use binary::{decode_chunk_dump, dump_chunks, ChunkRecord};
pub use json::dump_json;

use crate::container::{ChunkEntry, Container};

/// Directory entries eligible for export
fn exported_entries<C: Container>(container: &C) -> Vec<ChunkEntry> {
    container
        .directory()
        .into_iter()
        .filter(|entry| !entry.is_sentinel())
        .collect()
}
