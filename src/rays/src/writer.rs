//! Buffer growth writer
//!
//! A container's serialized size is only known once its offset tables have
//! been rebuilt during the write itself, so the estimate it reports may be
//! short. The writer retries into geometrically larger zeroed buffers
//! (`estimate << attempt`) and keeps the first one that fits, truncated to
//! the bytes actually written.

use crate::container::Container;
use crate::fault;
use crate::stream::WriteStream;
use crate::{Error, Result};

/// Serialize `container`, growing the output buffer up to `attempts` times
pub fn write_with_growth<C: Container>(container: &mut C, attempts: u32) -> Result<Vec<u8>> {
    container.prepare_write()?;

    let estimate = container.estimated_size();
    if estimate == 0 {
        return Err(Error::Empty);
    }

    for attempt in 0..attempts {
        let Some(size) = 1usize
            .checked_shl(attempt)
            .and_then(|factor| estimate.checked_mul(factor))
        else {
            break;
        };

        let mut buffer = Vec::new();
        buffer.try_reserve_exact(size)?;
        buffer.resize(size, 0);

        let container = &*container;
        let written = fault::catch(|| {
            let mut stream = WriteStream::new(&mut buffer, container.endianness());
            container.write(&mut stream)?;
            Ok(stream.pos())
        });

        match written {
            Ok(0) => return Err(Error::Empty),
            Ok(len) => {
                tracing::debug!(attempt, capacity = size, written = len, "container written");
                buffer.truncate(len);
                return Ok(buffer);
            }
            Err(e) => tracing::debug!(attempt, capacity = size, "write attempt failed: {}", e),
        }
    }

    Err(Error::SerializationOverflow { estimate, attempts })
}
