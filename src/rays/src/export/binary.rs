//! Compact binary export
//!
//! Layout (all fields little-endian u32, no padding):
//!
//! ```text
//! count
//! count × [ fourCC | id (i32 bit pattern) | length | length bytes ]
//! ```

use byteorder::{ByteOrder, LittleEndian};

use crate::container::Container;
use crate::fourcc::FourCC;
use crate::{Error, Result};

const COUNT_SIZE: usize = 4;
const RECORD_HEADER_SIZE: usize = 12;

/// One decoded record of a compact dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRecord {
    pub tag: FourCC,
    pub id: i32,
    pub data: Vec<u8>,
}

/// Encode every exported chunk's raw bytes.
///
/// The count header is taken from the same filtered entry list that drives
/// the body, so the two always agree. An empty directory yields the 4-byte
/// header alone.
pub fn dump_chunks<C: Container>(container: &C) -> Result<Vec<u8>> {
    let entries = super::exported_entries(container);

    let payloads: Vec<&[u8]> = entries
        .iter()
        .map(|entry| {
            container.chunk_data(entry.tag, entry.id).unwrap_or_else(|| {
                tracing::warn!("{} {} listed but has no data", entry.tag, entry.id);
                &[][..]
            })
        })
        .collect();

    let count = u32::try_from(entries.len())
        .map_err(|_| Error::InvalidInput("too many chunks for compact dump"))?;
    let total = payloads
        .iter()
        .fold(COUNT_SIZE, |acc, data| acc + RECORD_HEADER_SIZE + data.len());

    let mut out = Vec::new();
    out.try_reserve_exact(total)?;
    out.extend_from_slice(&count.to_le_bytes());

    for (entry, data) in entries.iter().zip(&payloads) {
        let len = u32::try_from(data.len())
            .map_err(|_| Error::InvalidInput("chunk too large for compact dump"))?;
        out.extend_from_slice(&entry.tag.value().to_le_bytes());
        out.extend_from_slice(&(entry.id as u32).to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(data);
    }

    tracing::debug!(records = count, bytes = out.len(), "compact dump");
    Ok(out)
}

/// Decode a compact dump back into records
pub fn decode_chunk_dump(data: &[u8]) -> Result<Vec<ChunkRecord>> {
    if data.len() < COUNT_SIZE {
        return Err(Error::Truncated("count"));
    }
    let count = LittleEndian::read_u32(data) as usize;
    let mut offset = COUNT_SIZE;

    // Each record needs at least a header, so a count beyond that is bogus.
    let mut records = Vec::with_capacity(count.min(data.len() / RECORD_HEADER_SIZE));

    for _ in 0..count {
        if offset + RECORD_HEADER_SIZE > data.len() {
            return Err(Error::Truncated("header"));
        }
        let header = &data[offset..offset + RECORD_HEADER_SIZE];
        let tag = FourCC(LittleEndian::read_u32(&header[0..4]));
        let id = LittleEndian::read_i32(&header[4..8]);
        let len = LittleEndian::read_u32(&header[8..12]) as usize;
        offset += RECORD_HEADER_SIZE;

        if len > data.len() - offset {
            return Err(Error::Truncated("data"));
        }
        records.push(ChunkRecord {
            tag,
            id,
            data: data[offset..offset + len].to_vec(),
        });
        offset += len;
    }

    Ok(records)
}
