use core::alloc::Layout;

use thiserror::Error;

use crate::heap_block::HeapBlock;

/// Errors surfaced by [`FastVecData`](crate::FastVecData) and [`FastVec`](crate::FastVec).
///
/// Allocation failures never leave a container half-mutated: when an operation returns
/// [`Error::CapacityOverflow`] or [`Error::AllocFailed`], the container still holds exactly
/// the elements and capacity it had before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Checked element access outside of `[0, len)`.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The requested capacity exceeds [`max_size`](crate::FastVecData::max_size).
    #[error("capacity overflow: requested {requested} elements, maximum is {max}")]
    CapacityOverflow { requested: usize, max: usize },

    /// The system allocator could not satisfy the request.
    #[error("memory allocation of {} bytes (align {}) failed", layout.size(), layout.align())]
    AllocFailed { layout: Layout },

    /// A [`HeapBlock`](crate::HeapBlock) whose layout cannot back this element type.
    #[error("block of {len} bytes with layout {size}/{align} cannot hold elements of size {elem_size}/{elem_align}", size = layout.size(), align = layout.align())]
    IncompatibleBlock {
        len: usize,
        layout: Layout,
        elem_size: usize,
        elem_align: usize,
    },
}

impl Error {
    pub fn index_out_of_bounds(index: usize, len: usize) -> Error {
        Error::IndexOutOfBounds { index, len }
    }

    pub fn capacity_overflow(requested: usize, max: usize) -> Error {
        Error::CapacityOverflow { requested, max }
    }

    pub fn alloc_failed(layout: Layout) -> Error {
        Error::AllocFailed { layout }
    }

    /// Returns `true` for both flavours of allocation failure.
    pub fn is_alloc_failure(&self) -> bool {
        matches!(
            self,
            Error::CapacityOverflow { .. } | Error::AllocFailed { .. }
        )
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A block that [`attach`](crate::FastVecData::attach) refused, handed back with the reason.
///
/// ```
/// # use fast_vector::{Error, FastVecData, HeapBlock};
/// let mut vec: FastVecData<u32> = FastVecData::new();
/// let refused = vec.attach(HeapBlock::from(b"abc".to_vec())).unwrap_err();
/// assert!(matches!(refused.error, Error::IncompatibleBlock { .. }));
/// assert_eq!(refused.into_block().as_bytes(), b"abc");
/// ```
#[derive(Debug, Error)]
#[error("{error}")]
pub struct AttachError {
    pub error: Error,
    pub block: HeapBlock,
}

impl AttachError {
    /// Gives the block back to the caller.
    pub fn into_block(self) -> HeapBlock {
        self.block
    }
}

impl From<AttachError> for Error {
    fn from(err: AttachError) -> Error {
        err.error
    }
}
