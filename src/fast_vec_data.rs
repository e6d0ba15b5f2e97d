use alloc::alloc::{Layout, realloc};
use core::{
    cmp,
    marker::PhantomData,
    ptr::{self, NonNull},
    slice,
};

use bytemuck::{AnyBitPattern, NoUninit, Zeroable};

use crate::error::{AttachError, Error, Result};
use crate::heap_block::HeapBlock;
use crate::utils::{self, cold_path};

/// Where a container's elements currently live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Residency {
    /// No backing memory at all: capacity is zero and nothing is owned.
    Empty,
    /// The inline region embedded in a [`FastVec`](crate::FastVec).
    Inline,
    /// A block obtained from the global allocator and owned by the container.
    Heap,
}

/// The storage core shared by every vector in this crate.
///
/// [`FastVecData`] owns the size and capacity bookkeeping, the pointer to the current
/// backing memory and the flag that says whether that memory is a heap block it must free.
/// Every algorithm (growth, relocation, ownership transfer) lives here;
/// [`FastVec`](crate::FastVec) only lends it an inline region.
///
/// On its own it is the zero-inline-capacity configuration: it starts
/// [`Empty`](Residency::Empty) and allocates on the first growth.
///
/// # Examples
///
/// ```
/// # use fast_vector::{FastVecData, Residency};
/// let mut vec: FastVecData<i32> = FastVecData::new();
/// assert_eq!(vec.residency(), Residency::Empty);
///
/// vec.push(1).unwrap();
/// vec.push(2).unwrap();
/// assert_eq!(vec, [1, 2]);
/// assert!(vec.is_heap());
/// ```
///
/// # Initialization policy
///
/// With `INIT = true` (the default), slots exposed by [`resize`](FastVecData::resize)
/// are filled with `T::default()`.
///
/// With `INIT = false`, growth inside the current capacity writes nothing and re-exposes
/// whatever values the slots held before. This is only offered for `T: Zeroable + Copy`:
/// every slot of the capacity always holds a valid value, because fresh memory is
/// zero-filled when it is acquired.
///
/// ```
/// # use fast_vector::FastVecData;
/// let mut scratch: FastVecData<u32, false> = FastVecData::with_len(4).unwrap();
/// scratch[0] = 13;
/// scratch.resize(0).unwrap();
/// scratch.resize(4).unwrap();
/// assert_eq!(scratch[0], 13); // stale, not re-initialized
/// ```
///
/// # Reallocation
///
/// Any call that can grow or shrink the capacity may move the elements; slices and
/// pointers obtained earlier must not be kept across it. The borrow checker enforces
/// this for safe code.
pub struct FastVecData<T, const INIT: bool = true> {
    ptr: NonNull<T>,
    len: usize,
    cap: usize,
    owns_heap: bool,
    _marker: PhantomData<T>,
}

unsafe impl<T, const INIT: bool> Send for FastVecData<T, INIT> where T: Send {}
unsafe impl<T, const INIT: bool> Sync for FastVecData<T, INIT> where T: Sync {}

impl<T, const INIT: bool> Drop for FastVecData<T, INIT> {
    fn drop(&mut self) {
        // Declared first, so the block is released after the elements,
        // also when an element's destructor unwinds.
        let _block = self.take_block();
        // SAFETY: [0, len) are initialized.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.len));
        }
    }
}

pub(crate) mod sealed {
    /// Proof of being inside this crate. It cannot be named or built elsewhere, so the
    /// trait methods that take it cannot be called or implemented downstream.
    pub struct Token(pub(crate) ());

    pub trait Storage<T, const INIT: bool> {
        /// The storage, with its pointer valid for the duration of the borrow.
        fn storage(&mut self, _: Token) -> &mut super::FastVecData<T, INIT>;
    }
}

/// Containers whose storage can be handed over by
/// [`transfer_from`](FastVecData::transfer_from).
///
/// Implemented by [`FastVecData`] and [`FastVec`](crate::FastVec); sealed. The storage of
/// a [`FastVec`](crate::FastVec) is never reachable from outside the crate:
///
/// ```compile_fail
/// # use fast_vector::{FastVecData, Transferable};
/// fn storage_of<S: Transferable<i32, true>>(vec: &mut S) -> &mut FastVecData<i32> {
///     vec.storage()
/// }
/// ```
pub trait Transferable<T, const INIT: bool>: sealed::Storage<T, INIT> {}

impl<T, const INIT: bool> sealed::Storage<T, INIT> for FastVecData<T, INIT> {
    #[inline(always)]
    fn storage(&mut self, _: sealed::Token) -> &mut FastVecData<T, INIT> {
        self
    }
}

impl<T, const INIT: bool> Transferable<T, INIT> for FastVecData<T, INIT> {}

/// Storage configurations that can expose new slots when [`resize`](FastVecData::resize) grows.
///
/// - `FastVecData<T, true>` for `T: Default` fills new slots with `T::default()`.
/// - `FastVecData<T, false>` for `T: Zeroable + Copy` re-exposes the slots as they are.
///
/// Sealed: the length only moves through [`resize`](FastVecData::resize).
///
/// ```compile_fail
/// # use fast_vector::{FastVecData, Resizable};
/// let mut vec: FastVecData<u8, false> = FastVecData::with_capacity(4).unwrap();
/// vec.expose_tail(4);
/// ```
pub trait Resizable {
    /// Makes `[len, new_len)` live. Panics unless `len <= new_len <= capacity`.
    #[doc(hidden)]
    fn expose_tail(&mut self, new_len: usize, _: sealed::Token);
}

impl<T: Default> Resizable for FastVecData<T, true> {
    fn expose_tail(&mut self, new_len: usize, _: sealed::Token) {
        assert!(self.len <= new_len && new_len <= self.cap);
        while self.len < new_len {
            // SAFETY: len < cap. `len` is bumped per element so a panicking
            // `default()` leaves only constructed elements behind.
            unsafe {
                ptr::write(self.ptr.as_ptr().add(self.len), T::default());
            }
            self.len += 1;
        }
    }
}

impl<T: Zeroable + Copy> Resizable for FastVecData<T, false> {
    #[inline]
    fn expose_tail(&mut self, new_len: usize, _: sealed::Token) {
        assert!(self.len <= new_len && new_len <= self.cap);
        // Every slot below `cap` holds a valid value in lazy storage.
        self.len = new_len;
    }
}

impl<T, const INIT: bool> FastVecData<T, INIT> {
    /// Constructs a new, empty [`FastVecData`] without allocating.
    #[inline]
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: 0,
            owns_heap: false,
            _marker: PhantomData,
        }
    }

    /// Storage that will live in a caller-supplied region of `capacity` elements.
    ///
    /// # Safety
    /// The owner must [`bind`](FastVecData::bind) the region before any other method
    /// is called, and re-bind it whenever the region may have moved.
    #[inline]
    pub(crate) const unsafe fn with_backing(capacity: usize) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: capacity,
            owns_heap: false,
            _marker: PhantomData,
        }
    }

    /// Returns `true` if the pointer refers to a caller-supplied region.
    #[inline(always)]
    pub(crate) const fn is_borrowed(&self) -> bool {
        !self.owns_heap && self.cap != 0
    }

    /// Points the storage at its caller-supplied region.
    #[inline(always)]
    pub(crate) fn bind(&mut self, region: NonNull<T>) {
        if self.is_borrowed() {
            self.ptr = region;
        }
    }

    /// Constructs an empty vector with room for at least `capacity` elements.
    ///
    /// `with_capacity(0)` does not allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fast_vector::FastVecData;
    /// let vec: FastVecData<u64> = FastVecData::with_capacity(10).unwrap();
    /// assert_eq!(vec.capacity(), 10);
    /// assert!(vec.is_empty());
    ///
    /// assert!(FastVecData::<u64>::with_capacity(usize::MAX).is_err());
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut vec = Self::new();
        vec.reserve(capacity)?;
        Ok(vec)
    }

    /// Constructs a vector of `len` elements, initialized per the `INIT` policy.
    ///
    /// ```
    /// # use fast_vector::FastVecData;
    /// let vec: FastVecData<i32> = FastVecData::with_len(3).unwrap();
    /// assert_eq!(vec, [0, 0, 0]);
    /// ```
    pub fn with_len(len: usize) -> Result<Self>
    where
        Self: Resizable,
    {
        let mut vec = Self::new();
        vec.resize(len)?;
        Ok(vec)
    }

    /// Constructs a vector holding clones of `values`.
    pub fn from_slice(values: &[T]) -> Result<Self>
    where
        T: Clone,
    {
        let mut vec = Self::new();
        vec.assign(values)?;
        Ok(vec)
    }

    /// Returns the number of elements in the vector.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of elements the vector can hold without reallocating.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns `true` if the vector holds no elements.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The largest capacity that can ever be requested for `T`.
    ///
    /// The byte size of a block may not exceed `isize::MAX`.
    #[inline(always)]
    pub const fn max_size() -> usize {
        utils::max_size::<T>()
    }

    /// Where the elements live right now.
    ///
    /// ```
    /// # use fast_vector::{FastVecData, Residency};
    /// let mut vec: FastVecData<u8> = FastVecData::new();
    /// assert_eq!(vec.residency(), Residency::Empty);
    /// vec.push(1).unwrap();
    /// assert_eq!(vec.residency(), Residency::Heap);
    /// ```
    #[inline]
    pub const fn residency(&self) -> Residency {
        if self.owns_heap {
            Residency::Heap
        } else if self.cap == 0 {
            Residency::Empty
        } else {
            Residency::Inline
        }
    }

    /// Returns `true` if the elements live in an inline region.
    #[inline(always)]
    pub const fn is_inline(&self) -> bool {
        self.is_borrowed()
    }

    /// Returns `true` if the vector owns a heap block.
    #[inline(always)]
    pub const fn is_heap(&self) -> bool {
        self.owns_heap
    }

    /// Returns a raw pointer to the vector's buffer, or a dangling pointer
    /// if there is no backing memory.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns a raw mutable pointer to the vector's buffer.
    #[inline(always)]
    pub const fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Extracts a slice containing the live elements.
    #[inline(always)]
    pub const fn as_slice(&self) -> &[T] {
        // SAFETY: [0, len) are initialized.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Extracts a mutable slice of the live elements.
    #[inline(always)]
    pub const fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: [0, len) are initialized.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Checked element access.
    ///
    /// Unchecked access is available through the slice API (`get_unchecked`).
    ///
    /// # Examples
    ///
    /// ```
    /// # use fast_vector::{Error, FastVecData};
    /// let vec: FastVecData<char> = FastVecData::from_slice(&['a', 'b']).unwrap();
    /// assert_eq!(vec.at(1), Ok(&'b'));
    /// assert_eq!(vec.at(2), Err(Error::IndexOutOfBounds { index: 2, len: 2 }));
    /// assert_eq!(unsafe { *vec.get_unchecked(0) }, 'a');
    /// ```
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T> {
        self.as_slice()
            .get(index)
            .ok_or_else(|| Error::index_out_of_bounds(index, self.len))
    }

    /// Checked mutable element access.
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or_else(|| Error::index_out_of_bounds(index, len))
    }

    /// The first element, or `None` if the vector is empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// The last element, or `None` if the vector is empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Replaces the contents with clones of `values`.
    ///
    /// The capacity is ensured first, so on failure the old contents are untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fast_vector::FastVecData;
    /// let mut vec: FastVecData<i32> = FastVecData::from_slice(&[1, 2]).unwrap();
    /// vec.assign(&[10, 20, 30]).unwrap();
    /// assert_eq!(vec, [10, 20, 30]);
    /// ```
    pub fn assign(&mut self, values: &[T]) -> Result<()>
    where
        T: Clone,
    {
        self.reserve(values.len())?;
        self.clear();
        for value in values {
            // SAFETY: capacity reserved above.
            unsafe {
                self.push_unchecked(value.clone());
            }
        }
        Ok(())
    }

    /// Replaces the contents by moving in the values of `values`.
    ///
    /// ```
    /// # use fast_vector::FastVecData;
    /// let mut vec: FastVecData<String> = FastVecData::new();
    /// vec.assign_move(vec!["a".to_string(), "b".to_string()]).unwrap();
    /// assert_eq!(vec, ["a", "b"]);
    /// ```
    pub fn assign_move<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        self.reserve(values.len())?;
        self.clear();
        for value in values {
            self.push(value)?;
        }
        Ok(())
    }

    /// Drops all elements. The capacity and any heap block are kept.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drops the elements past `len`. The capacity is unchanged.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            let tail = self.len - len;
            self.len = len;
            // SAFETY: [len, len + tail) were initialized and are no longer reachable.
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                    self.ptr.as_ptr().add(len),
                    tail,
                ));
            }
        }
    }

    /// Resizes the vector to `new_len` elements.
    ///
    /// Growing past the capacity reserves `max(len * 3 / 2, new_len)`, then exposes the new
    /// slots per the `INIT` policy. Shrinking drops the tail and keeps the capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fast_vector::FastVecData;
    /// let mut vec: FastVecData<i32> = FastVecData::from_slice(&[1, 2, 3, 4, 5]).unwrap();
    /// let capacity = vec.capacity();
    ///
    /// vec.resize(2).unwrap();
    /// assert_eq!(vec, [1, 2]);
    /// assert_eq!(vec.capacity(), capacity);
    ///
    /// vec.resize(4).unwrap();
    /// assert_eq!(vec, [1, 2, 0, 0]);
    /// ```
    pub fn resize(&mut self, new_len: usize) -> Result<()>
    where
        Self: Resizable,
    {
        if new_len > self.len {
            if new_len > self.cap {
                self.reserve_amortized(new_len)?;
            }
            self.expose_tail(new_len, sealed::Token(()));
        } else {
            self.truncate(new_len);
        }
        Ok(())
    }

    /// Ensures the capacity is at least `capacity` elements.
    ///
    /// Unlike [`Vec::reserve`](alloc::vec::Vec::reserve) the argument is the total capacity,
    /// and the vector grows to exactly that size.
    ///
    /// # Errors
    /// - [`Error::CapacityOverflow`] if `capacity > max_size()`.
    /// - [`Error::AllocFailed`] if the allocator refuses.
    ///
    /// The vector is unchanged in both cases.
    ///
    /// ```
    /// # use fast_vector::FastVecData;
    /// let mut vec: FastVecData<u8> = FastVecData::from_slice(b"abc").unwrap();
    /// assert!(vec.reserve(FastVecData::<u8>::max_size() + 1).is_err());
    /// assert_eq!(vec, b"abc");
    ///
    /// vec.reserve(40).unwrap();
    /// assert_eq!(vec.capacity(), 40);
    /// ```
    pub fn reserve(&mut self, capacity: usize) -> Result<()> {
        if capacity <= self.cap {
            return Ok(());
        }
        if capacity > Self::max_size() {
            cold_path();
            return Err(Error::capacity_overflow(capacity, Self::max_size()));
        }
        self.reallocate(capacity)
    }

    /// Reallocates an owned heap block down to exactly `len` elements.
    ///
    /// Does nothing for inline storage or when the capacity is already tight.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        if !self.owns_heap || self.cap == self.len {
            return Ok(());
        }
        self.reallocate(self.len)
    }

    /// Appends an element.
    ///
    /// A full vector grows by half its length (at least one slot), so a run of pushes
    /// reallocates a logarithmic number of times.
    ///
    /// On error the value is dropped and the vector is unchanged.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<()> {
        if self.len == self.cap {
            cold_path();
            let required = self
                .len
                .checked_add(1)
                .ok_or_else(|| Error::capacity_overflow(usize::MAX, Self::max_size()))?;
            self.reserve_amortized(required)?;
        }
        // SAFETY: len < cap.
        unsafe {
            self.push_unchecked(value);
        }
        Ok(())
    }

    /// Appends clones of `values`, growing with the same rule as [`push`](FastVecData::push).
    ///
    /// ```
    /// # use fast_vector::FastVecData;
    /// let mut vec: FastVecData<u8> = FastVecData::new();
    /// vec.extend_from_slice(b"abc").unwrap();
    /// vec.extend_from_slice(b"de").unwrap();
    /// assert_eq!(vec, b"abcde");
    /// ```
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<()>
    where
        T: Clone,
    {
        let required = self
            .len
            .checked_add(values.len())
            .ok_or_else(|| Error::capacity_overflow(usize::MAX, Self::max_size()))?;
        if required > self.cap {
            self.reserve_amortized(required)?;
        }
        for value in values {
            // SAFETY: capacity reserved above.
            unsafe {
                self.push_unchecked(value.clone());
            }
        }
        Ok(())
    }

    /// Removes the last element and returns it.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot was initialized and is no longer reachable.
        unsafe { Some(ptr::read(self.ptr.as_ptr().add(self.len))) }
    }

    /// # Safety
    /// `len < cap`.
    #[inline(always)]
    pub(crate) unsafe fn push_unchecked(&mut self, value: T) {
        debug_assert!(self.len < self.cap, "push_unchecked without capacity");
        unsafe {
            ptr::write(self.ptr.as_ptr().add(self.len), value);
        }
        self.len += 1;
    }

    /// Hands the heap block over to the caller as raw bytes.
    ///
    /// A heap-resident vector gives up its block (the live elements are its first
    /// `len * size_of::<T>()` bytes) and becomes [`Empty`](Residency::Empty).
    /// Inline or empty storage has nothing to detach: an empty block is returned
    /// and the contents stay where they are.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fast_vector::{FastVecData, Residency};
    /// let mut vec: FastVecData<i32> = FastVecData::from_slice(&[1, 2, 3]).unwrap();
    /// let block = vec.detach();
    /// assert_eq!(block.len(), 12);
    /// assert_eq!(vec.capacity(), 0);
    /// assert_eq!(vec.residency(), Residency::Empty);
    ///
    /// let mut other: FastVecData<i32> = FastVecData::new();
    /// other.attach(block).unwrap();
    /// assert_eq!(other, [1, 2, 3]);
    /// ```
    pub fn detach(&mut self) -> HeapBlock
    where
        T: NoUninit,
    {
        if !self.owns_heap {
            return HeapBlock::empty();
        }
        let layout = self.heap_layout();
        let len = self.len * size_of::<T>();
        let ptr = self.ptr.cast::<u8>();
        self.reset();
        log::trace!("detached heap block of {} bytes ({len} live)", layout.size());
        // SAFETY: we owned the block, allocated with `layout`; the first `len` bytes
        // are initialized `NoUninit` values.
        unsafe { HeapBlock::from_raw_parts(ptr, len, layout) }
    }

    /// Adopts `block` as the new heap-owned backing store.
    ///
    /// The current elements are dropped and the current heap block, if any, is released.
    /// The block's live bytes become the elements; its spare bytes become capacity.
    /// An unallocated block just clears the vector.
    ///
    /// # Errors
    /// [`Error::IncompatibleBlock`] if the block's layout is not the layout this vector
    /// would allocate for some capacity (see [`HeapBlock::can_hold`]), or its live length is
    /// not a whole number of elements. The vector is left unchanged and the block comes
    /// back inside the [`AttachError`].
    pub fn attach(&mut self, block: HeapBlock) -> Result<(), AttachError>
    where
        T: AnyBitPattern,
    {
        if !block.is_allocated() {
            self.clear();
            return Ok(());
        }
        if !block.can_hold::<T>() {
            cold_path();
            log::debug!(
                "refused a block of {} bytes for elements of {} bytes",
                block.layout().size(),
                size_of::<T>()
            );
            return Err(AttachError {
                error: Error::IncompatibleBlock {
                    len: block.len(),
                    layout: block.layout(),
                    elem_size: size_of::<T>(),
                    elem_align: align_of::<T>(),
                },
                block,
            });
        }

        let (ptr, len, layout) = block.into_raw_parts();
        self.clear();
        drop(self.take_block());

        self.ptr = ptr.cast();
        self.len = len / size_of::<T>();
        self.cap = layout.size() / size_of::<T>();
        self.owns_heap = true;
        if !INIT {
            // SAFETY: [len, cap) lies inside the adopted block.
            unsafe {
                ptr::write_bytes(self.ptr.as_ptr().add(self.len), 0, self.cap - self.len);
            }
        }
        log::trace!("attached heap block of {} bytes ({len} live)", layout.size());
        Ok(())
    }

    /// Takes over the elements of `other`, leaving it empty.
    ///
    /// - If `other` owns a heap block, the block itself changes hands in O(1):
    ///   this vector drops its elements, releases its own block and adopts `other`'s.
    ///   `other` becomes [`Empty`](Residency::Empty).
    /// - Otherwise `other`'s elements live in its inline region, which cannot change
    ///   owner. They are moved over one by one in O(n), which may make this vector
    ///   reallocate. `other` keeps its inline region with length zero.
    ///
    /// On error neither vector is modified.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fast_vector::{FastVec, FastVecData};
    /// let mut source: FastVecData<i32> = FastVecData::from_slice(&[1, 2, 3]).unwrap();
    /// let block = source.as_ptr();
    ///
    /// let mut target: FastVecData<i32> = FastVecData::new();
    /// target.transfer_from(&mut source).unwrap();
    /// assert_eq!(target, [1, 2, 3]);
    /// assert_eq!(target.as_ptr(), block);
    /// assert!(source.is_empty());
    ///
    /// let mut inline: FastVec<i32, 4> = FastVec::from_slice(&[4, 5]).unwrap();
    /// target.transfer_from(&mut inline).unwrap();
    /// assert_eq!(target, [4, 5]);
    /// assert!(inline.is_empty() && inline.is_inline());
    /// ```
    pub fn transfer_from<S>(&mut self, other: &mut S) -> Result<()>
    where
        S: Transferable<T, INIT> + ?Sized,
    {
        let other = other.storage(sealed::Token(()));
        if other.owns_heap {
            self.clear();
            drop(self.take_block());

            self.ptr = other.ptr;
            self.len = other.len;
            self.cap = other.cap;
            self.owns_heap = true;
            other.reset();
            log::trace!("took over a heap block of {} elements", self.cap);
        } else {
            let len = other.len;
            self.reserve(len)?;
            self.clear();
            // SAFETY: capacity reserved; the regions belong to different vectors.
            // `other.len` is zeroed right after, so each element has one owner.
            unsafe {
                ptr::copy_nonoverlapping(other.ptr.as_ptr(), self.ptr.as_ptr(), len);
            }
            other.len = 0;
            self.len = len;
        }
        Ok(())
    }

    /// Grows with the 1.5x rule, to at least `required` elements.
    #[inline(never)]
    fn reserve_amortized(&mut self, required: usize) -> Result<()> {
        let grown = self
            .len
            .saturating_add(self.len / 2)
            .min(Self::max_size());
        self.reserve(cmp::max(grown, required))
    }

    /// Moves the elements into a block of exactly `new_capacity` elements.
    ///
    /// An owned block is resized in place by the allocator (Rust values are always
    /// relocatable by a byte copy). Inline or empty storage gets a fresh block and the
    /// elements are copied over. The old state is untouched until the new block exists.
    #[inline(never)]
    fn reallocate(&mut self, new_capacity: usize) -> Result<()> {
        debug_assert!(new_capacity >= self.len, "reallocation would lose elements");
        let new_layout = utils::block_layout::<T>(new_capacity)?;
        let old_capacity = self.cap;

        if self.owns_heap {
            let old_layout = self.heap_layout();
            // SAFETY: the block was allocated with `old_layout`; the alignment is the same
            // and `new_layout.size()` is non-zero and fits `isize`.
            let new_ptr =
                unsafe { realloc(self.ptr.as_ptr().cast(), old_layout, new_layout.size()) };
            let Some(new_ptr) = NonNull::new(new_ptr) else {
                cold_path();
                log::debug!(
                    "resizing heap block from {} to {} bytes failed",
                    old_layout.size(),
                    new_layout.size()
                );
                return Err(Error::alloc_failed(new_layout));
            };
            self.ptr = new_ptr.cast();
            if !INIT && new_capacity > old_capacity {
                // SAFETY: the grown tail lies inside the new block.
                unsafe {
                    ptr::write_bytes(
                        self.ptr.as_ptr().add(old_capacity),
                        0,
                        new_capacity - old_capacity,
                    );
                }
            }
            log::trace!("resized heap block from {old_capacity} to {new_capacity} elements");
        } else {
            let block = HeapBlock::allocate(new_layout, !INIT)?;
            let new_ptr = block.as_ptr().cast_mut().cast::<T>();
            // SAFETY: the new block holds `new_capacity >= len` elements and is disjoint
            // from the current region.
            unsafe {
                ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr, self.len);
            }
            let (new_ptr, _, _) = block.into_raw_parts();
            if old_capacity != 0 {
                log::trace!(
                    "spilled {} elements from inline storage to a heap block of {new_capacity}",
                    self.len
                );
            }
            self.ptr = new_ptr.cast();
            self.owns_heap = true;
        }

        self.cap = new_capacity;
        Ok(())
    }

    /// Layout of the owned heap block.
    #[inline(always)]
    fn heap_layout(&self) -> Layout {
        debug_assert!(self.owns_heap);
        // SAFETY: the same computation succeeded when the block was allocated.
        unsafe {
            Layout::from_size_align_unchecked(
                (self.cap * size_of::<T>()).max(1),
                align_of::<T>(),
            )
        }
    }

    /// Moves the owned block, if any, into a guard. Elements are left in place.
    #[inline]
    fn take_block(&mut self) -> HeapBlock {
        if !self.owns_heap {
            return HeapBlock::empty();
        }
        let layout = self.heap_layout();
        self.owns_heap = false;
        // SAFETY: we owned the block and no longer do.
        unsafe { HeapBlock::from_raw_parts(self.ptr.cast(), 0, layout) }
    }

    /// Forgets all storage. The caller has taken care of elements and block.
    #[inline]
    fn reset(&mut self) {
        self.ptr = NonNull::dangling();
        self.len = 0;
        self.cap = 0;
        self.owns_heap = false;
    }
}

impl<T, const INIT: bool> Default for FastVecData<T, INIT> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const INIT: bool> Clone for FastVecData<T, INIT> {
    fn clone(&self) -> Self {
        utils::infallible(Self::from_slice(self.as_slice()))
    }

    fn clone_from(&mut self, source: &Self) {
        utils::infallible(self.assign(source.as_slice()));
    }
}

impl<T, const INIT: bool> Extend<T> for FastVecData<T, INIT> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (hint, _) = iter.size_hint();
        utils::infallible(self.reserve(self.len.saturating_add(hint)));
        for item in iter {
            utils::infallible(self.push(item));
        }
    }
}

impl<T, const INIT: bool> FromIterator<T> for FastVecData<T, INIT> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = Self::new();
        vec.extend(iter);
        vec
    }
}

impl<T, const INIT: bool, const P: usize> From<[T; P]> for FastVecData<T, INIT> {
    fn from(values: [T; P]) -> Self {
        let mut vec = utils::infallible(Self::with_capacity(P));
        for value in values {
            // SAFETY: capacity reserved above.
            unsafe {
                vec.push_unchecked(value);
            }
        }
        vec
    }
}

impl<T: Clone, const INIT: bool> From<&[T]> for FastVecData<T, INIT> {
    #[inline]
    fn from(values: &[T]) -> Self {
        utils::infallible(Self::from_slice(values))
    }
}

crate::utils::impl_slice_traits!([const INIT: bool] FastVecData<T, INIT>);

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{
        rc::Rc,
        string::{String, ToString},
        vec,
        vec::Vec,
    };
    use core::cell::Cell;

    /// Counts how many times values of this type were dropped.
    #[derive(Clone)]
    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_new_is_empty_without_allocation() {
        let vec: FastVecData<i32> = FastVecData::new();
        assert_eq!(vec.len(), 0);
        assert_eq!(vec.capacity(), 0);
        assert_eq!(vec.residency(), Residency::Empty);
        assert!(!vec.is_heap());
        assert!(!vec.is_inline());
    }

    #[test]
    fn test_push_reallocates_logarithmically() {
        let mut vec: FastVecData<u64> = FastVecData::new();
        let mut reallocations = 0;
        let mut capacity = vec.capacity();
        for i in 0..10_000u64 {
            vec.push(i).unwrap();
            if vec.capacity() != capacity {
                capacity = vec.capacity();
                reallocations += 1;
            }
            assert!(vec.len() <= vec.capacity());
        }
        assert_eq!(vec.len(), 10_000);
        assert!(vec.iter().copied().eq(0..10_000));
        // 1.5x growth from one element: about log(10000) / log(1.5) steps.
        assert!(reallocations <= 30, "{reallocations} reallocations");
    }

    #[test]
    fn test_resize_growth_rule() {
        let mut vec: FastVecData<i32> = FastVecData::with_len(10).unwrap();
        assert_eq!(vec.capacity(), 10);

        // 10 * 3 / 2 = 15 beats the requested 11.
        vec.resize(11).unwrap();
        assert_eq!(vec.capacity(), 15);

        // The request beats 11 * 3 / 2.
        vec.resize(40).unwrap();
        assert_eq!(vec.capacity(), 40);
        assert!(vec.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_resize_shrink_keeps_prefix_and_capacity() {
        let mut vec: FastVecData<i32> = FastVecData::from_slice(&[1, 2, 3, 4, 5]).unwrap();
        let capacity = vec.capacity();
        vec.resize(2).unwrap();
        assert_eq!(vec, [1, 2]);
        assert_eq!(vec.capacity(), capacity);
    }

    #[test]
    fn test_reserve_exact_and_overflow() {
        let mut vec: FastVecData<i32> = FastVecData::from_slice(&[7, 8]).unwrap();
        vec.reserve(1).unwrap();
        assert_eq!(vec.capacity(), 2);

        vec.reserve(33).unwrap();
        assert_eq!(vec.capacity(), 33);

        let max = FastVecData::<i32>::max_size();
        let err = vec.reserve(max + 1).unwrap_err();
        assert_eq!(
            err,
            Error::CapacityOverflow {
                requested: max + 1,
                max
            }
        );
        assert!(err.is_alloc_failure());
        assert_eq!(vec, [7, 8]);
        assert_eq!(vec.capacity(), 33);
    }

    #[test]
    fn test_refused_reallocation_keeps_state() {
        let mut vec: FastVecData<u64> = FastVecData::from_slice(&[1, 2, 3]).unwrap();
        let ptr = vec.as_ptr();
        let capacity = vec.capacity();

        // Within max_size, but no allocator can provide that many bytes.
        let err = vec.reserve(FastVecData::<u64>::max_size() - 1).unwrap_err();
        assert!(matches!(err, Error::AllocFailed { .. }));
        assert!(err.is_alloc_failure());
        assert_eq!(vec, [1, 2, 3]);
        assert_eq!(vec.capacity(), capacity);
        assert_eq!(vec.as_ptr(), ptr);
        assert!(vec.is_heap());

        vec.push(4).unwrap();
        assert_eq!(vec, [1, 2, 3, 4]);
    }

    #[test]
    fn test_shrink_to_fit() {
        let mut vec: FastVecData<i32> = FastVecData::with_capacity(40).unwrap();
        vec.extend([13, 14, 15]);
        vec.shrink_to_fit().unwrap();
        assert_eq!(vec.capacity(), 3);
        assert_eq!(vec, [13, 14, 15]);

        vec.clear();
        vec.shrink_to_fit().unwrap();
        assert_eq!(vec.capacity(), 0);
        assert!(vec.is_heap());

        vec.push(1).unwrap();
        assert_eq!(vec, [1]);
    }

    #[test]
    fn test_assign_drops_old_elements_once() {
        let drops = Rc::new(Cell::new(0));
        let mut vec: FastVecData<Tracked> = FastVecData::new();
        vec.push(Tracked(drops.clone())).unwrap();
        vec.push(Tracked(drops.clone())).unwrap();

        let fresh = vec![Tracked(drops.clone()), Tracked(drops.clone()), Tracked(drops.clone())];
        vec.assign(&fresh).unwrap();
        assert_eq!(drops.get(), 2);
        assert_eq!(vec.len(), 3);

        vec.assign_move(fresh).unwrap();
        assert_eq!(drops.get(), 5);
        assert_eq!(vec.len(), 3);

        vec.truncate(1);
        assert_eq!(drops.get(), 7);

        drop(vec);
        assert_eq!(drops.get(), 8);
    }

    #[test]
    fn test_checked_and_unchecked_access() {
        let mut vec: FastVecData<i32> = FastVecData::from_slice(&[1, 2, 3]).unwrap();
        assert_eq!(vec.at(0), Ok(&1));
        assert_eq!(vec.at(3), Err(Error::index_out_of_bounds(3, 3)));
        *vec.at_mut(2).unwrap() = 30;
        assert!(vec.at_mut(5).is_err());
        assert_eq!(unsafe { *vec.get_unchecked(2) }, 30);
        assert_eq!(vec.front(), Some(&1));
        assert_eq!(vec.back(), Some(&30));
        assert_eq!(vec[1], 2);

        vec.clear();
        assert_eq!(vec.front(), None);
        assert_eq!(vec.back(), None);
    }

    #[test]
    fn test_strings_survive_reallocation() {
        let mut vec: FastVecData<String> = FastVecData::new();
        for i in 0..100 {
            vec.push(i.to_string()).unwrap();
        }
        vec.reserve(1000).unwrap();
        vec.truncate(10);
        vec.shrink_to_fit().unwrap();
        assert_eq!(vec.capacity(), 10);
        let expected: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        assert_eq!(vec, expected.as_slice());
        assert_eq!(vec.pop().as_deref(), Some("9"));
    }

    #[test]
    fn test_clone_is_independent() {
        let original: FastVecData<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        let mut copy = original.clone();
        assert_eq!(copy, original);
        assert_ne!(copy.as_ptr(), original.as_ptr());

        copy[0].push('!');
        assert_eq!(original[0], "a");

        let mut target: FastVecData<String> = FastVecData::from_slice(&["x".to_string()]).unwrap();
        target.clone_from(&original);
        assert_eq!(target, ["a", "b"]);
    }

    #[test]
    fn test_detach_attach_round_trip() {
        let mut vec: FastVecData<i32> = FastVecData::from_slice(&[1, 2, 3]).unwrap();
        let ptr = vec.as_ptr();
        let block = vec.detach();
        assert_eq!(block.len(), 12);
        assert_eq!(block.as_ptr(), ptr.cast());
        assert_eq!(vec.len(), 0);
        assert_eq!(vec.capacity(), 0);
        assert_eq!(vec.residency(), Residency::Empty);

        let mut other: FastVecData<i32> = FastVecData::from_slice(&[9]).unwrap();
        other.attach(block).unwrap();
        assert_eq!(other, [1, 2, 3]);
        assert_eq!(other.as_ptr(), ptr);
        assert!(other.is_heap());

        // The detached vector is still usable.
        vec.push(4).unwrap();
        assert_eq!(vec, [4]);
    }

    #[test]
    fn test_detach_empty_storage() {
        let mut vec: FastVecData<u8> = FastVecData::new();
        let block = vec.detach();
        assert!(!block.is_allocated());
        assert!(block.is_empty());
    }

    #[test]
    fn test_attach_keeps_spare_capacity() {
        let mut bytes = Vec::with_capacity(16);
        bytes.extend_from_slice(b"abcd");
        let mut vec: FastVecData<u8> = FastVecData::new();
        vec.attach(HeapBlock::from(bytes)).unwrap();
        assert_eq!(vec, b"abcd");
        assert_eq!(vec.capacity(), 16);
    }

    #[test]
    fn test_attach_rejects_incompatible_block() {
        let mut vec: FastVecData<u32> = FastVecData::from_slice(&[5, 6]).unwrap();
        let err = vec.attach(HeapBlock::from(b"abcdefgh".to_vec())).unwrap_err();
        assert!(matches!(err.error, Error::IncompatibleBlock { elem_size: 4, .. }));
        assert_eq!(vec, [5, 6]);

        // The caller gets the block back and can put it to other use.
        let block = err.into_block();
        assert_eq!(block.as_bytes(), b"abcdefgh");
        let mut bytes: FastVecData<u8> = FastVecData::new();
        bytes.attach(block).unwrap();
        assert_eq!(bytes, b"abcdefgh");
    }

    #[test]
    fn test_attach_empty_block_clears() {
        let mut vec: FastVecData<u16> = FastVecData::from_slice(&[1, 2]).unwrap();
        vec.attach(HeapBlock::empty()).unwrap();
        assert!(vec.is_empty());
        assert!(vec.is_heap());
    }

    #[test]
    fn test_transfer_steals_heap_block() {
        let drops = Rc::new(Cell::new(0));
        let mut source: FastVecData<Tracked> = FastVecData::new();
        source.push(Tracked(drops.clone())).unwrap();
        let ptr = source.as_ptr();

        let mut target: FastVecData<Tracked> = FastVecData::new();
        target.push(Tracked(drops.clone())).unwrap();
        target.transfer_from(&mut source).unwrap();

        assert_eq!(drops.get(), 1);
        assert_eq!(target.len(), 1);
        assert_eq!(target.as_ptr(), ptr);
        assert_eq!(source.residency(), Residency::Empty);
        assert_eq!(source.len(), 0);

        drop(source);
        assert_eq!(drops.get(), 1);
        drop(target);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn test_transfer_from_empty_source() {
        let mut source: FastVecData<i32> = FastVecData::new();
        let mut target: FastVecData<i32> = FastVecData::from_slice(&[1]).unwrap();
        target.transfer_from(&mut source).unwrap();
        assert!(target.is_empty());
        assert!(target.is_heap());
    }

    #[test]
    fn test_lazy_storage_keeps_stale_values() {
        let mut vec: FastVecData<u32, false> = FastVecData::with_len(8).unwrap();
        assert!(vec.iter().all(|&v| v == 0));
        vec[0] = 13;
        vec[7] = 99;
        vec.resize(2).unwrap();
        vec.resize(8).unwrap();
        assert_eq!(vec[0], 13);
        assert_eq!(vec[7], 99);

        // Slots gained by reallocation start zeroed.
        vec.reserve(64).unwrap();
        vec.resize(64).unwrap();
        assert_eq!(vec[7], 99);
        assert!(vec[8..].iter().all(|&v| v == 0));
    }

    #[test]
    fn test_lazy_attach_zeroes_spare_capacity() {
        let mut bytes = Vec::with_capacity(8);
        bytes.push(1u8);
        let mut vec: FastVecData<u8, false> = FastVecData::new();
        vec.attach(HeapBlock::from(bytes)).unwrap();
        vec.resize(8).unwrap();
        assert_eq!(vec, [1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_zero_sized_elements() {
        let mut vec: FastVecData<()> = FastVecData::new();
        for _ in 0..100 {
            vec.push(()).unwrap();
        }
        assert_eq!(vec.len(), 100);
        assert_eq!(FastVecData::<()>::max_size(), usize::MAX);
        vec.shrink_to_fit().unwrap();
        assert_eq!(vec.pop(), Some(()));
    }

    #[test]
    fn test_trait_surface() {
        let vec: FastVecData<i32> = [3, 1, 2].into();
        let mut sorted = vec.clone();
        sorted.sort();
        assert_eq!(sorted, [1, 2, 3]);
        assert!(vec > sorted);
        assert_eq!(alloc::format!("{vec:?}"), "[3, 1, 2]");

        let from_slice: FastVecData<i32> = FastVecData::from(&[1, 2][..]);
        assert_eq!(from_slice, &[1, 2]);
        assert_eq!(from_slice.iter().sum::<i32>(), 3);
    }
}
