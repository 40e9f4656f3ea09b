//! Per-thread scratch column buffer
//!
//! Heap pruning and sorted-mode addition both need a temporary column.
//! Allocating one per call would dominate the cost of small columns, so a
//! single buffer is kept per thread and lent out for the duration of one
//! operation. The buffer arrives cleared; the `RefCell` guard releases it on
//! every exit path, including unwinding.

use std::cell::RefCell;

thread_local! {
    static SCRATCH: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Run `f` with exclusive access to this thread's cleared scratch buffer.
///
/// Acquisitions must not nest: `f` must not call back into an operation that
/// itself takes the scratch buffer.
pub(crate) fn with_scratch<R>(f: impl FnOnce(&mut Vec<usize>) -> R) -> R {
    SCRATCH.with(|cell| {
        let mut buf = cell.borrow_mut();
        buf.clear();
        f(&mut buf)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_arrives_cleared() {
        with_scratch(|buf| {
            buf.extend([1, 2, 3]);
        });
        with_scratch(|buf| {
            assert!(buf.is_empty());
        });
    }

    #[test]
    fn test_released_after_panic() {
        let caught = std::panic::catch_unwind(|| {
            with_scratch(|_| panic!("boom"));
        });
        assert!(caught.is_err());
        // the guard dropped during unwinding, so the buffer is available again
        with_scratch(|buf| assert!(buf.is_empty()));
    }
}
