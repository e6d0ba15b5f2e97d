use alloc::{
    alloc::{Layout, alloc, alloc_zeroed, dealloc},
    vec::Vec,
};
use core::{fmt, mem::ManuallyDrop, ptr::NonNull, slice};

use crate::error::{Error, Result};

/// An owned block of memory obtained from the global allocator.
///
/// This is what [`FastVecData::detach`](crate::FastVecData::detach) hands out and what
/// [`FastVecData::attach`](crate::FastVecData::attach) takes back. The block remembers the
/// layout it was allocated with, so dropping it always releases the memory through the
/// matching deallocation path.
///
/// `len` counts the leading bytes that are initialized; the rest of the allocation
/// (`layout.size() - len` bytes) is spare capacity.
///
/// # Examples
///
/// ```
/// # use fast_vector::{FastVec, HeapBlock};
/// let mut vec: FastVec<u8, 4> = FastVec::from_slice(b"hello world").unwrap();
/// let block: HeapBlock = vec.detach();
/// assert_eq!(block.as_bytes(), b"hello world");
/// assert!(vec.is_empty());
///
/// let bytes: Vec<u8> = block.into_vec().unwrap();
/// assert_eq!(bytes, b"hello world");
/// ```
pub struct HeapBlock {
    ptr: NonNull<u8>,
    len: usize,
    layout: Layout,
}

unsafe impl Send for HeapBlock {}
unsafe impl Sync for HeapBlock {}

impl HeapBlock {
    /// A block that owns nothing.
    #[inline]
    pub const fn empty() -> HeapBlock {
        HeapBlock {
            ptr: NonNull::dangling(),
            len: 0,
            // SAFETY: size 0, align 1 is always a valid layout.
            layout: unsafe { Layout::from_size_align_unchecked(0, 1) },
        }
    }

    /// Allocates a block for `layout`, optionally zero-filled.
    ///
    /// `layout.size()` must be non-zero.
    pub(crate) fn allocate(layout: Layout, zeroed: bool) -> Result<HeapBlock> {
        debug_assert!(layout.size() > 0, "zero sized allocation");
        // SAFETY: layout has a non-zero size.
        let ptr = unsafe {
            if zeroed {
                alloc_zeroed(layout)
            } else {
                alloc(layout)
            }
        };
        match NonNull::new(ptr) {
            Some(ptr) => Ok(HeapBlock {
                ptr,
                len: 0,
                layout,
            }),
            None => {
                log::debug!("allocation of {} bytes failed", layout.size());
                Err(Error::alloc_failed(layout))
            }
        }
    }

    /// Takes ownership of a raw allocation.
    ///
    /// # Safety
    /// - `ptr` was returned by the global allocator for exactly `layout`,
    ///   or `layout.size() == 0` and nothing is owned.
    /// - The first `len` bytes are initialized and `len <= layout.size()`.
    /// - Nobody else releases the allocation.
    #[inline]
    pub(crate) const unsafe fn from_raw_parts(ptr: NonNull<u8>, len: usize, layout: Layout) -> Self {
        debug_assert!(len <= layout.size());
        HeapBlock { ptr, len, layout }
    }

    /// Releases ownership without freeing; returns the pointer, live length and layout.
    #[inline]
    pub(crate) fn into_raw_parts(self) -> (NonNull<u8>, usize, Layout) {
        let this = ManuallyDrop::new(self);
        (this.ptr, this.len, this.layout)
    }

    /// Number of initialized bytes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no bytes are initialized.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the underlying allocation in bytes.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.layout.size()
    }

    /// The layout the block was allocated with.
    #[inline]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns `true` if the block owns an allocation.
    #[inline]
    pub const fn is_allocated(&self) -> bool {
        self.layout.size() != 0
    }

    /// Start of the allocation; dangling for an unallocated block.
    #[inline]
    pub const fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// The initialized bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8] {
        // SAFETY: the first `len` bytes are initialized.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The initialized bytes, mutably.
    #[inline]
    pub const fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: the first `len` bytes are initialized and uniquely owned.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Returns `true` if a vector of `T` can adopt this block through
    /// [`attach`](crate::FastVecData::attach).
    ///
    /// The layout must be exactly the one such a vector allocates for some capacity,
    /// and the live bytes must be a whole number of elements.
    ///
    /// ```
    /// # use fast_vector::HeapBlock;
    /// let block = HeapBlock::from(vec![0u8; 6]);
    /// assert!(block.can_hold::<u8>());
    /// assert!(!block.can_hold::<u16>()); // alignment differs
    /// ```
    pub fn can_hold<T>(&self) -> bool {
        if !self.is_allocated() {
            return true;
        }
        let size = size_of::<T>();
        size != 0
            && self.len % size == 0
            && crate::utils::block_layout::<T>(self.layout.size() / size)
                .is_ok_and(|layout| layout == self.layout)
    }

    /// Converts the block into a [`Vec<u8>`] without copying.
    ///
    /// Only byte-aligned blocks can become a `Vec<u8>`; any other block is returned unchanged.
    pub fn into_vec(self) -> Result<Vec<u8>, HeapBlock> {
        if self.layout.align() != 1 {
            return Err(self);
        }
        if !self.is_allocated() {
            return Ok(Vec::new());
        }
        let (ptr, len, layout) = self.into_raw_parts();
        // SAFETY: allocated by the global allocator with align 1 and `layout.size()` bytes.
        Ok(unsafe { Vec::from_raw_parts(ptr.as_ptr(), len, layout.size()) })
    }
}

impl Drop for HeapBlock {
    fn drop(&mut self) {
        if self.is_allocated() {
            // SAFETY: allocated with exactly this layout and owned by us.
            unsafe { dealloc(self.ptr.as_ptr(), self.layout) }
        }
    }
}

impl Default for HeapBlock {
    #[inline]
    fn default() -> Self {
        HeapBlock::empty()
    }
}

impl From<Vec<u8>> for HeapBlock {
    /// Adopts the vector's allocation without copying.
    fn from(vec: Vec<u8>) -> HeapBlock {
        let capacity = vec.capacity();
        if capacity == 0 {
            return HeapBlock::empty();
        }
        let mut vec = ManuallyDrop::new(vec);
        let len = vec.len();
        // SAFETY: a `Vec<u8>` with non-zero capacity owns a global allocation
        // of `capacity` bytes with align 1.
        unsafe {
            let ptr = NonNull::new_unchecked(vec.as_mut_ptr());
            HeapBlock::from_raw_parts(ptr, len, Layout::from_size_align_unchecked(capacity, 1))
        }
    }
}

impl fmt::Debug for HeapBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapBlock")
            .field("len", &self.len)
            .field("capacity", &self.layout.size())
            .field("align", &self.layout.align())
            .finish()
    }
}
