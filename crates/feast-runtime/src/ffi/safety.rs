//! Checks applied to pointers coming back from native code

use crate::error::{FeastError, FeastResult};

/// Reject a null pointer returned by `routine`
pub fn check_null<T>(ptr: *const T, routine: &str) -> FeastResult<*const T> {
    if ptr.is_null() {
        Err(FeastError::DecodeError(format!(
            "{} returned a null pointer",
            routine
        )))
    } else {
        Ok(ptr)
    }
}

/// Require `returned` to be the start of `buffer`
///
/// Every routine returns the output-indices pointer it was given. Any other
/// address means the routine and the adapter disagree on the contract.
pub fn ensure_returns_buffer(
    returned: *const (),
    buffer: *const (),
    routine: &str,
) -> FeastResult<()> {
    check_null(returned, routine)?;
    if returned != buffer {
        return Err(FeastError::DecodeError(format!(
            "{} returned {:p}, expected its output buffer at {:p}",
            routine, returned, buffer
        )));
    }
    Ok(())
}
