//! Structured-record export

use serde::Serialize;
use serde_json::value::RawValue;

use crate::container::{ChunkEntry, Container};
use crate::escape::{standardize, to_json};
use crate::fault;
use crate::{Error, Result};

#[derive(Serialize)]
struct Record {
    #[serde(rename = "fourCC")]
    four_cc: String,
    id: i32,
    data: Box<RawValue>,
}

/// Render every exported chunk as `{"fourCC", "id", "data"}`.
///
/// A chunk whose renderer fails (or produces invalid JSON) is skipped; an
/// empty directory yields `[]`.
pub fn dump_json<C: Container>(container: &C) -> Result<Vec<u8>> {
    let mut records = Vec::new();

    for entry in super::exported_entries(container) {
        match fault::catch(|| render(container, entry)) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => {
                let e = Error::Render {
                    tag: entry.tag,
                    id: entry.id,
                    source: Box::new(e),
                };
                tracing::warn!("Skipping chunk: {}", e);
            }
        }
    }

    tracing::debug!(records = records.len(), "structured dump");
    to_json(&records)
}

fn render<C: Container>(container: &C, entry: ChunkEntry) -> Result<Option<Record>> {
    let Some(text) = container.render_chunk(entry.tag, entry.id)? else {
        return Ok(None);
    };

    let text = standardize(&text);
    if text.is_empty() {
        return Ok(None);
    }

    Ok(Some(Record {
        four_cc: entry.tag.to_string(),
        id: entry.id,
        data: RawValue::from_string(text)?,
    }))
}

