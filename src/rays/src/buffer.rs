//! Caller-owned output buffers
//!
//! Every buffer handed across the boundary is an [`OutputBuffer`] leaked with
//! [`OutputBuffer::into_raw`]. The allocation carries its own length in a
//! hidden prefix, so the single release path ([`OutputBuffer::from_raw`])
//! can rebuild it from the data pointer alone.

use std::mem::size_of;
use std::ops::Deref;
use std::ptr;

use crate::{Error, Result};

const PREFIX: usize = size_of::<usize>();

/// Owned output bytes with a hidden length prefix
pub struct OutputBuffer {
    storage: Box<[u8]>,
}

impl OutputBuffer {
    /// Copy `data` into a new buffer. Empty input still allocates.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(PREFIX + data.len())
            .map_err(Error::Allocation)?;
        storage.extend_from_slice(&data.len().to_ne_bytes());
        storage.extend_from_slice(data);
        tracing::trace!(len = data.len(), "allocated output buffer");
        Ok(Self {
            storage: storage.into_boxed_slice(),
        })
    }

    /// Payload length, excluding the prefix
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len() - PREFIX
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.storage[PREFIX..].to_vec()
    }

    /// Hand ownership to the caller. Returns a non-null pointer to the
    /// payload; the length is also written to `len`.
    pub fn into_raw(self, len: &mut usize) -> *mut u8 {
        *len = self.len();
        let storage = Box::into_raw(self.storage) as *mut u8;
        // SAFETY: storage holds at least PREFIX bytes.
        unsafe { storage.add(PREFIX) }
    }

    /// Reclaim a buffer produced by [`OutputBuffer::into_raw`].
    ///
    /// # Safety
    /// `data` must come from `into_raw` and must not have been reclaimed
    /// already.
    pub unsafe fn from_raw(data: *mut u8) -> Self {
        let storage = data.sub(PREFIX);
        let len = usize::from_ne_bytes(ptr::read_unaligned(storage as *const [u8; PREFIX]));
        let slice = ptr::slice_from_raw_parts_mut(storage, PREFIX + len);
        Self {
            storage: Box::from_raw(slice),
        }
    }
}

impl Deref for OutputBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.storage[PREFIX..]
    }
}

impl std::fmt::Debug for OutputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputBuffer").field("len", &self.len()).finish()
    }
}
