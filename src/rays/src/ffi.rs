//! C ABI boundary
//!
//! Generic, fault-contained implementations of every exported entry point.
//! [`export_boundary!`](crate::export_boundary) instantiates them for one
//! container type as `#[no_mangle] extern "C"` symbols.
//!
//! Conventions shared by every entry point:
//! - Handles are `usize` tokens from `Box::into_raw`; 0 is never valid.
//! - Nothing unwinds or returns an error across the boundary. Failures are
//!   logged and mapped to a sentinel: 0, false, or a null buffer.
//! - Buffer results take an out-length pointer. It is zeroed on entry and
//!   set only when a buffer is returned; a null out-length yields null.
//! - Returned buffers belong to the caller and must be released with
//!   [`free`], exactly once.
//!
//! # Safety
//!
//! Callers must pass either 0 or a live handle created by [`read`] for the
//! same container type, input pointers valid for the given length, and
//! buffer pointers that came from this module. A handle must not be used
//! from two threads at once, nor after [`free_handle`].

#![allow(clippy::missing_safety_doc)]

use std::ptr;
use std::sync::OnceLock;

use crate::buffer::OutputBuffer;
use crate::config::Config;
use crate::container::Container;
use crate::escape::to_json;
use crate::fault;
use crate::fourcc::FourCC;
use crate::handle::{self, Handle};
use crate::{Error, Result};

/// Opaque handle token
pub type HandleId = usize;

/// The reserved invalid handle
pub const INVALID_HANDLE: HandleId = 0;

/// Process-wide configuration, read from the environment on first use
pub fn config() -> &'static Config {
    static CONFIG: OnceLock<Config> = OnceLock::new();
    CONFIG.get_or_init(Config::from_env)
}

/// Run `f` and map any error or panic to `sentinel`
pub fn contain<T>(op: &'static str, sentinel: T, f: impl FnOnce() -> Result<T>) -> T {
    tracing::debug!(op, "boundary call");
    match fault::catch(f) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(op, "{}", e);
            sentinel
        }
    }
}

unsafe fn handle_mut<'a, C: Container>(id: HandleId) -> Result<&'a mut Handle<C>> {
    (id as *mut Handle<C>)
        .as_mut()
        .ok_or(Error::InvalidInput("null handle"))
}

unsafe fn input_slice<'a>(data: *const u8, len: usize) -> Result<&'a [u8]> {
    if data.is_null() || len == 0 {
        return Err(Error::InvalidInput("null or empty input"));
    }
    Ok(std::slice::from_raw_parts(data, len))
}

/// Shared tail for buffer-returning entry points
unsafe fn buffer_result(
    op: &'static str,
    out_len: *mut usize,
    f: impl FnOnce() -> Result<Option<OutputBuffer>>,
) -> *mut u8 {
    let Some(out_len) = out_len.as_mut() else {
        return ptr::null_mut();
    };
    *out_len = 0;

    match contain(op, None, f) {
        Some(buffer) => buffer.into_raw(out_len),
        None => ptr::null_mut(),
    }
}

fn owned(bytes: Vec<u8>) -> Result<Option<OutputBuffer>> {
    OutputBuffer::from_slice(&bytes).map(Some)
}

pub unsafe fn read<C: Container>(input: *const u8, len: usize) -> HandleId {
    contain("read", INVALID_HANDLE, || {
        let bytes = input_slice(input, len)?;
        let handle = Handle::<C>::read(bytes)?;
        Ok(Box::into_raw(Box::new(handle)) as HandleId)
    })
}

/// Release a handle. Calling this twice on one handle is undefined.
pub unsafe fn free_handle<C: Container>(id: HandleId) {
    if id == INVALID_HANDLE {
        return;
    }
    contain("free_handle", (), || {
        drop(Box::from_raw(id as *mut Handle<C>));
        Ok(())
    })
}

pub unsafe fn chunk_exists<C: Container>(id: HandleId, four_cc: u32, chunk_id: i32) -> i32 {
    contain("chunk_exists", 0, || {
        let handle = handle_mut::<C>(id)?;
        Ok(i32::from(handle.chunk_exists(FourCC(four_cc), chunk_id)))
    })
}

pub unsafe fn is_cast<C: Container>(id: HandleId) -> i32 {
    contain("is_cast", 0, || {
        let handle = handle_mut::<C>(id)?;
        Ok(i32::from(handle.is_cast()))
    })
}

/// Estimated serialized size, or 0 if it does not fit an `i32`
pub unsafe fn size<C: Container>(id: HandleId) -> i32 {
    contain("size", 0, || {
        let handle = handle_mut::<C>(id)?;
        i32::try_from(handle.estimated_size())
            .map_err(|_| Error::InvalidInput("size exceeds i32"))
    })
}

/// Copy of a chunk's bytes. An existing empty chunk yields a non-null buffer
/// of length 0; a missing chunk yields null.
pub unsafe fn get_chunk<C: Container>(
    id: HandleId,
    four_cc: u32,
    chunk_id: i32,
    out_len: *mut usize,
) -> *mut u8 {
    buffer_result("get_chunk", out_len, || {
        let handle = handle_mut::<C>(id)?;
        match handle.chunk_payload(FourCC(four_cc), chunk_id) {
            Some(data) => OutputBuffer::from_slice(data).map(Some),
            None => Ok(None),
        }
    })
}

/// JSON for one script, null if no cast resolves `script_id`
pub unsafe fn get_script<C: Container>(
    id: HandleId,
    script_id: i32,
    out_len: *mut usize,
) -> *mut u8 {
    buffer_result("get_script", out_len, || {
        let handle = handle_mut::<C>(id)?;
        match handle.script(script_id, config())? {
            Some(detail) => owned(to_json(&detail)?),
            None => Ok(None),
        }
    })
}

pub unsafe fn dump_json<C: Container>(id: HandleId, out_len: *mut usize) -> *mut u8 {
    buffer_result("dump_json", out_len, || {
        let handle = handle_mut::<C>(id)?;
        owned(handle.dump_json()?)
    })
}

pub unsafe fn dump_chunks<C: Container>(id: HandleId, out_len: *mut usize) -> *mut u8 {
    buffer_result("dump_chunks", out_len, || {
        let handle = handle_mut::<C>(id)?;
        owned(handle.dump_chunks()?)
    })
}

pub unsafe fn write_to_buffer<C: Container>(id: HandleId, out_len: *mut usize) -> *mut u8 {
    buffer_result("write_to_buffer", out_len, || {
        let handle = handle_mut::<C>(id)?;
        owned(handle.write_to_buffer(config())?)
    })
}

pub unsafe fn dump_scripts<C: Container>(id: HandleId, out_len: *mut usize) -> *mut u8 {
    buffer_result("dump_scripts", out_len, || {
        let handle = handle_mut::<C>(id)?;
        owned(to_json(&handle.dump_scripts(config())?)?)
    })
}

/// Parse, rewrite and release in one call, without handing out a handle
pub unsafe fn decompile<C: Container>(
    input: *const u8,
    len: usize,
    out_len: *mut usize,
) -> *mut u8 {
    buffer_result("decompile", out_len, || {
        let bytes = input_slice(input, len)?;
        owned(handle::decompile::<C>(bytes, config())?)
    })
}

/// Release a buffer returned by any entry point. Null is ignored.
pub unsafe fn free(buffer: *mut u8) {
    if buffer.is_null() {
        return;
    }
    drop(OutputBuffer::from_raw(buffer));
}

/// Emit the `rays_*` C symbols for a [`Container`](crate::Container) type.
///
/// ```ignore
/// rays::export_boundary!(my_format::DirectorFile);
/// ```
#[macro_export]
macro_rules! export_boundary {
    ($container:ty) => {
        #[no_mangle]
        pub unsafe extern "C" fn rays_read(input: *const u8, input_size: usize) -> usize {
            $crate::ffi::read::<$container>(input, input_size)
        }

        #[no_mangle]
        pub unsafe extern "C" fn rays_free_handle(handle: usize) {
            $crate::ffi::free_handle::<$container>(handle)
        }

        #[no_mangle]
        pub unsafe extern "C" fn rays_chunk_exists(handle: usize, four_cc: u32, id: i32) -> i32 {
            $crate::ffi::chunk_exists::<$container>(handle, four_cc, id)
        }

        #[no_mangle]
        pub unsafe extern "C" fn rays_is_cast(handle: usize) -> i32 {
            $crate::ffi::is_cast::<$container>(handle)
        }

        #[no_mangle]
        pub unsafe extern "C" fn rays_size(handle: usize) -> i32 {
            $crate::ffi::size::<$container>(handle)
        }

        #[no_mangle]
        pub unsafe extern "C" fn rays_get_chunk(
            handle: usize,
            four_cc: u32,
            id: i32,
            output_size: *mut usize,
        ) -> *mut u8 {
            $crate::ffi::get_chunk::<$container>(handle, four_cc, id, output_size)
        }

        #[no_mangle]
        pub unsafe extern "C" fn rays_get_script(
            handle: usize,
            id: i32,
            output_size: *mut usize,
        ) -> *mut u8 {
            $crate::ffi::get_script::<$container>(handle, id, output_size)
        }

        #[no_mangle]
        pub unsafe extern "C" fn rays_dump_json(handle: usize, output_size: *mut usize) -> *mut u8 {
            $crate::ffi::dump_json::<$container>(handle, output_size)
        }

        #[no_mangle]
        pub unsafe extern "C" fn rays_dump_chunks(
            handle: usize,
            output_size: *mut usize,
        ) -> *mut u8 {
            $crate::ffi::dump_chunks::<$container>(handle, output_size)
        }

        #[no_mangle]
        pub unsafe extern "C" fn rays_write_to_buffer(
            handle: usize,
            output_size: *mut usize,
        ) -> *mut u8 {
            $crate::ffi::write_to_buffer::<$container>(handle, output_size)
        }

        #[no_mangle]
        pub unsafe extern "C" fn rays_dump_scripts(
            handle: usize,
            output_size: *mut usize,
        ) -> *mut u8 {
            $crate::ffi::dump_scripts::<$container>(handle, output_size)
        }

        #[no_mangle]
        pub unsafe extern "C" fn rays_decompile(
            input: *const u8,
            input_size: usize,
            output_size: *mut usize,
        ) -> *mut u8 {
            $crate::ffi::decompile::<$container>(input, input_size, output_size)
        }

        #[no_mangle]
        pub unsafe extern "C" fn rays_free(buffer: *mut u8) {
            $crate::ffi::free(buffer)
        }
    };
}
