//! Panic containment for collaborator calls

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::{Error, Result};

/// Run `f`, turning an unwinding panic into [`Error::Fault`].
///
/// Collaborators are foreign code as far as the boundary is concerned; a
/// panic inside one must end up as an ordinary error value.
pub fn catch<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(Error::Fault(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
