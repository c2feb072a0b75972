//! Opaque Handles
//!
//! Terms and types are identified by 32-bit signed integers, the same width the
//! managed side stores in its `int` arrays. Non-negative values index the
//! engine's term and type tables. Negative values never name an object; `-1` is
//! the sentinel every constructor returns on failure.
//!
//! A handle does not own memory. The engine reclaims unreferenced entries during
//! collection and may reuse the same number for a later allocation, so a handle
//! kept across a collection without a reference count or root is dangling.

/// Generic handle as it crosses the boundary
pub type Handle = i32;

/// Handle of a native term
pub type TermHandle = Handle;

/// Handle of a native type
pub type TypeHandle = Handle;

/// Failure sentinel for term constructors
pub const NULL_TERM: TermHandle = -1;

/// Failure sentinel for type constructors
pub const NULL_TYPE: TypeHandle = -1;

/// Table index for a handle, or `None` for negative values
pub fn handle_index(handle: Handle) -> Option<usize> {
    if handle >= 0 {
        Some(handle as usize)
    } else {
        None
    }
}

/// Handle for a table index
///
/// Returns `None` if the index does not fit in the 32-bit handle space.
pub fn index_handle(index: usize) -> Option<Handle> {
    i32::try_from(index).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_index() {
        assert_eq!(handle_index(0), Some(0));
        assert_eq!(handle_index(41), Some(41));
        assert_eq!(handle_index(NULL_TERM), None);
        assert_eq!(handle_index(i32::MIN), None);
    }

    #[test]
    fn test_index_handle() {
        assert_eq!(index_handle(7), Some(7));
        assert_eq!(index_handle(i32::MAX as usize), Some(i32::MAX));
        assert_eq!(index_handle(i32::MAX as usize + 1), None);
    }
}
