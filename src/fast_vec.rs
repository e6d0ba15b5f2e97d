use core::{
    mem::MaybeUninit,
    ptr::NonNull,
    slice,
};

use bytemuck::{AnyBitPattern, NoUninit};

use crate::error::{AttachError, Error, Result};
use crate::fast_vec_data::{FastVecData, Resizable, Residency, Transferable, sealed};
use crate::heap_block::HeapBlock;
use crate::utils;

/// A vector that keeps up to `N` elements inline and spills to one heap block beyond that.
///
/// [`FastVec`] embeds an `N`-element region in the object itself. While the elements fit,
/// no allocation happens at all; once they do not, they move to a single heap block that
/// the vector owns, and they stay there (shrinking never moves them back).
///
/// All algorithms live in [`FastVecData`], which [`FastVec`] wraps together with the
/// inline region. The two share the same method set.
///
/// # Quick Start
///
/// ```
/// # use fast_vector::FastVec;
/// // Default inline capacity is 8 elements
/// let mut vec = FastVec::<i32>::new();
/// assert_eq!(vec.capacity(), 8);
/// assert!(vec.is_inline());
///
/// for i in 0..8 {
///     vec.push(i).unwrap();
/// }
/// assert!(vec.is_inline());
///
/// vec.push(8).unwrap(); // spills
/// assert!(vec.is_heap());
/// assert_eq!(vec.len(), 9);
/// ```
///
/// Every growing operation returns a [`Result`](crate::Result): running out of memory is a
/// value, not an abort. The trait surfaces ([`Clone`], [`Extend`], [`FromIterator`],
/// [`From`], [`fastvec!`](crate::fastvec)) cannot report errors and behave like [`Vec`]
/// instead.
///
/// # Moves
///
/// While inline, the storage pointer refers into the object itself, and a Rust move
/// leaves it pointing at the old location. [`FastVec`] therefore re-points it before
/// every `&mut self` operation, and `&self` views locate the region directly. Moving a
/// [`FastVec`] is always safe; for large `N` it copies the whole region, so prefer
/// passing it by reference.
///
/// # Initialization
///
/// `INIT` selects what [`resize`](FastVec::resize) puts into new slots; see
/// [`FastVecData`]. [`ScratchVec`] is the lazy configuration.
///
/// ```
/// # use fast_vector::ScratchVec;
/// let mut vec: ScratchVec<u8, 16> = ScratchVec::new();
/// vec.resize(4).unwrap();
/// assert_eq!(vec, [0, 0, 0, 0]);
/// vec[1] = 7;
/// vec.clear();
/// vec.resize(2).unwrap();
/// assert_eq!(vec, [0, 7]);
/// ```
pub struct FastVec<T, const N: usize = 8, const INIT: bool = true> {
    cache: [MaybeUninit<T>; N],
    data: FastVecData<T, INIT>,
}

/// A [`FastVec`] with the default inline capacity of eight elements.
pub type MiniVec<T> = FastVec<T, 8>;

/// A [`FastVec`] whose [`resize`](FastVec::resize) does not initialize the slots it exposes.
pub type ScratchVec<T, const N: usize> = FastVec<T, N, false>;

/// Creates a [`FastVec`] containing the arguments.
///
/// The syntax is similar to [`vec!`](https://doc.rust-lang.org/std/macro.vec.html).
///
/// # Examples
///
/// ```
/// # use fast_vector::{fastvec, FastVec};
/// let vec: FastVec<String, 10> = fastvec![];
/// let vec: FastVec<i64, 10> = fastvec![1; 5]; // Need to support Clone.
/// let vec: FastVec<_, 10> = fastvec![1, 2, 3, 4];
/// ```
#[macro_export]
macro_rules! fastvec {
    [] => { $crate::FastVec::new() };
    [$elem:expr; $n:expr] => { $crate::FastVec::from_elem($elem, $n) };
    [$($item:expr),+ $(,)?] => { $crate::FastVec::from_buf([ $($item),+ ]) };
}

impl<T, const N: usize, const INIT: bool> Drop for FastVec<T, N, INIT> {
    fn drop(&mut self) {
        // The core drops right after, through the current location of the region.
        self.bind();
    }
}

impl<T, const N: usize, const INIT: bool> FastVec<T, N, INIT> {
    /// Constructs a new, empty [`FastVec`] using its inline region.
    ///
    /// With `N == 0` there is no region and the vector starts
    /// [`Empty`](Residency::Empty).
    ///
    /// # Examples
    ///
    /// ```
    /// # use fast_vector::{FastVec, Residency};
    /// let vec: FastVec<i32, 4> = FastVec::new();
    /// assert_eq!(vec.capacity(), 4);
    /// assert_eq!(vec.residency(), Residency::Inline);
    ///
    /// let vec: FastVec<i32, 0> = FastVec::new();
    /// assert_eq!(vec.residency(), Residency::Empty);
    /// ```
    #[inline]
    pub const fn new() -> Self {
        Self {
            cache: if INIT {
                [const { MaybeUninit::uninit() }; N]
            } else {
                [const { MaybeUninit::zeroed() }; N]
            },
            // SAFETY: `bind` runs before every use of the core.
            data: unsafe { FastVecData::with_backing(N) },
        }
    }

    /// Re-points the core at the inline region and hands it out.
    #[inline(always)]
    fn bind(&mut self) -> &mut FastVecData<T, INIT> {
        let region = NonNull::from(&mut self.cache).cast::<T>();
        self.data.bind(region);
        &mut self.data
    }

    /// Constructs an empty vector with room for at least `capacity` elements.
    ///
    /// Stays inline if `capacity <= N`.
    ///
    /// ```
    /// # use fast_vector::FastVec;
    /// let vec: FastVec<i32, 5> = FastVec::with_capacity(4).unwrap();
    /// assert!(vec.is_inline());
    ///
    /// let vec: FastVec<i32, 5> = FastVec::with_capacity(10).unwrap();
    /// assert!(vec.is_heap());
    /// assert_eq!(vec.capacity(), 10);
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut vec = Self::new();
        vec.reserve(capacity)?;
        Ok(vec)
    }

    /// Constructs a vector of `len` elements, initialized per the `INIT` policy.
    pub fn with_len(len: usize) -> Result<Self>
    where
        FastVecData<T, INIT>: Resizable,
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

    /// Creates a vector of `len` clones of `value`.
    ///
    /// # Panics
    /// Panics if `len` exceeds [`max_size`](FastVec::max_size); aborts if the allocator fails.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fast_vector::FastVec;
    /// let vec = FastVec::<i32, 5>::from_elem(1, 3);
    ///
    /// assert_eq!(vec, [1, 1, 1]);
    /// ```
    pub fn from_elem(value: T, len: usize) -> Self
    where
        T: Clone,
    {
        let mut vec = utils::infallible(Self::with_capacity(len));
        if len > 0 {
            let data = vec.bind();
            // SAFETY: capacity reserved above.
            unsafe {
                for _ in 1..len {
                    data.push_unchecked(value.clone());
                }
                data.push_unchecked(value);
            }
        }
        vec
    }

    /// Initialize values from a fixed-length array.
    ///
    /// ```
    /// # use fast_vector::FastVec;
    /// let vec: FastVec<_> = FastVec::from_buf([1, 2, 3]);
    ///
    /// assert_eq!(vec, [1, 2, 3]);
    /// ```
    #[inline(always)]
    pub fn from_buf<const P: usize>(values: [T; P]) -> Self {
        Self::from(values)
    }

    /// Returns the number of elements in the vector.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Inline capacity `N`, the heap block's capacity, or zero after the block was given away.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Returns `true` if the vector holds no elements.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The largest capacity that can ever be requested for `T`.
    #[inline(always)]
    pub const fn max_size() -> usize {
        FastVecData::<T, INIT>::max_size()
    }

    /// Where the elements live right now: the inline region, a heap block, or nowhere.
    #[inline(always)]
    pub const fn residency(&self) -> Residency {
        self.data.residency()
    }

    /// Returns `true` while the elements live in the inline region.
    #[inline(always)]
    pub const fn is_inline(&self) -> bool {
        self.data.is_inline()
    }

    /// Returns `true` once the vector owns a heap block.
    #[inline(always)]
    pub const fn is_heap(&self) -> bool {
        self.data.is_heap()
    }

    /// Address of the first element slot, inline or on the heap.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        if self.data.is_borrowed() {
            self.cache.as_ptr().cast()
        } else {
            self.data.as_ptr()
        }
    }

    /// Raw mutable pointer to the first element slot.
    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.bind().as_mut_ptr()
    }

    /// Extracts a slice containing the live elements.
    #[inline(always)]
    pub const fn as_slice(&self) -> &[T] {
        // SAFETY: [0, len) of the current region are initialized.
        unsafe { slice::from_raw_parts(self.as_ptr(), self.data.len()) }
    }

    /// Extracts a mutable slice of the live elements.
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.bind().as_mut_slice()
    }

    /// Checked element access; see [`FastVecData::at`].
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T> {
        self.as_slice()
            .get(index)
            .ok_or_else(|| Error::index_out_of_bounds(index, self.len()))
    }

    /// Checked mutable element access.
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        self.bind().at_mut(index)
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
    /// Also covers assignment from another [`FastVec`] (of any `N`) or a [`FastVecData`],
    /// which both dereference to slices.
    ///
    /// ```
    /// # use fast_vector::{FastVec, FastVecData};
    /// let source: FastVecData<i32> = FastVecData::from_slice(&[1, 2, 3]).unwrap();
    /// let mut vec: FastVec<i32, 2> = FastVec::new();
    /// vec.assign(&source).unwrap();
    /// assert_eq!(vec, [1, 2, 3]);
    /// ```
    #[inline]
    pub fn assign(&mut self, values: &[T]) -> Result<()>
    where
        T: Clone,
    {
        self.bind().assign(values)
    }

    /// Replaces the contents by moving in `values`; see [`FastVecData::assign_move`].
    #[inline]
    pub fn assign_move<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        self.bind().assign_move(values)
    }

    /// Drops all elements. Heap-resident vectors keep their block.
    #[inline]
    pub fn clear(&mut self) {
        self.bind().clear();
    }

    /// Drops the elements past `len`. The capacity is unchanged.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.bind().truncate(len);
    }

    /// Resizes the vector; see [`FastVecData::resize`].
    ///
    /// ```
    /// # use fast_vector::FastVec;
    /// let mut vec: FastVec<i32, 4> = FastVec::from_slice(&[1, 2, 3, 4, 5]).unwrap();
    /// let capacity = vec.capacity();
    /// vec.resize(2).unwrap();
    /// assert_eq!(vec, [1, 2]);
    /// assert_eq!(vec.capacity(), capacity);
    /// assert!(vec.is_heap());
    /// ```
    #[inline]
    pub fn resize(&mut self, new_len: usize) -> Result<()>
    where
        FastVecData<T, INIT>: Resizable,
    {
        self.bind().resize(new_len)
    }

    /// Ensures a total capacity of at least `capacity`, spilling to the heap if needed.
    ///
    /// ```
    /// # use fast_vector::FastVec;
    /// let mut vec: FastVec<i32, 4> = FastVec::from_slice(&[1, 2]).unwrap();
    /// vec.reserve(3).unwrap();
    /// assert!(vec.is_inline());
    /// vec.reserve(10).unwrap();
    /// assert!(vec.is_heap());
    /// assert_eq!(vec.capacity(), 10);
    /// ```
    #[inline]
    pub fn reserve(&mut self, capacity: usize) -> Result<()> {
        self.bind().reserve(capacity)
    }

    /// Tightens an owned heap block. Elements never move back inline.
    #[inline]
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        self.bind().shrink_to_fit()
    }

    /// Appends an element, spilling to the heap when the inline region is full.
    ///
    /// On error the value is dropped and the vector is unchanged.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<()> {
        self.bind().push(value)
    }

    /// Appends clones of `values`.
    #[inline]
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<()>
    where
        T: Clone,
    {
        self.bind().extend_from_slice(values)
    }

    /// Removes the last element and returns it.
    ///
    /// ```
    /// # use fast_vector::fastvec;
    /// let mut vec: fast_vector::FastVec<i32, 4> = fastvec![1, 2];
    /// assert_eq!(vec.pop(), Some(2));
    /// assert_eq!(vec, [1]);
    /// ```
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.bind().pop()
    }

    /// Gives away the heap block; see [`FastVecData::detach`].
    ///
    /// Inline contents cannot leave the object: an empty block is returned and
    /// the vector is left as it was.
    ///
    /// ```
    /// # use fast_vector::FastVec;
    /// let mut vec: FastVec<u16, 4> = FastVec::from_slice(&[1, 2]).unwrap();
    /// assert!(!vec.detach().is_allocated());
    /// assert_eq!(vec, [1, 2]);
    /// ```
    #[inline]
    pub fn detach(&mut self) -> HeapBlock
    where
        T: NoUninit,
    {
        self.bind().detach()
    }

    /// Adopts a heap block; see [`FastVecData::attach`].
    #[inline]
    pub fn attach(&mut self, block: HeapBlock) -> Result<(), AttachError>
    where
        T: AnyBitPattern,
    {
        self.bind().attach(block)
    }

    /// Takes over the elements of `other`; see [`FastVecData::transfer_from`].
    #[inline]
    pub fn transfer_from<S>(&mut self, other: &mut S) -> Result<()>
    where
        S: Transferable<T, INIT> + ?Sized,
    {
        self.bind().transfer_from(other)
    }
}

impl<T, const N: usize, const INIT: bool> sealed::Storage<T, INIT> for FastVec<T, N, INIT> {
    #[inline(always)]
    fn storage(&mut self, _: sealed::Token) -> &mut FastVecData<T, INIT> {
        self.bind()
    }
}

impl<T, const N: usize, const INIT: bool> Transferable<T, INIT> for FastVec<T, N, INIT> {}

impl<T, const N: usize, const INIT: bool> Default for FastVec<T, N, INIT> {
    /// Equivalent to [`FastVec::new`].
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const N: usize, const INIT: bool> Clone for FastVec<T, N, INIT> {
    fn clone(&self) -> Self {
        utils::infallible(Self::from_slice(self.as_slice()))
    }

    fn clone_from(&mut self, source: &Self) {
        utils::infallible(self.assign(source.as_slice()));
    }
}

impl<T, const N: usize, const INIT: bool> Extend<T> for FastVec<T, N, INIT> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.bind().extend(iter);
    }
}

impl<T, const N: usize, const INIT: bool> FromIterator<T> for FastVec<T, N, INIT> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = Self::new();
        vec.extend(iter);
        vec
    }
}

impl<T, const N: usize, const INIT: bool, const P: usize> From<[T; P]> for FastVec<T, N, INIT> {
    fn from(values: [T; P]) -> Self {
        let mut vec = utils::infallible(Self::with_capacity(P));
        let data = vec.bind();
        for value in values {
            // SAFETY: capacity reserved above.
            unsafe {
                data.push_unchecked(value);
            }
        }
        vec
    }
}

impl<T: Clone, const N: usize, const INIT: bool> From<&[T]> for FastVec<T, N, INIT> {
    #[inline]
    fn from(values: &[T]) -> Self {
        utils::infallible(Self::from_slice(values))
    }
}

crate::utils::impl_slice_traits!([const N: usize, const INIT: bool] FastVec<T, N, INIT>);

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{
        rc::Rc,
        string::{String, ToString},
        vec::Vec,
    };
    use core::cell::Cell;

    #[derive(Clone)]
    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn inline_addr<T, const N: usize, const INIT: bool>(vec: &FastVec<T, N, INIT>) -> *const T {
        vec.cache.as_ptr().cast()
    }

    #[test]
    fn test_spill_on_fifth_push() {
        let mut vec: FastVec<i32, 4> = FastVec::new();
        for i in 1..=4 {
            vec.push(i).unwrap();
        }
        assert_eq!(vec.residency(), Residency::Inline);
        assert_eq!(vec.as_ptr(), inline_addr(&vec));

        vec.push(5).unwrap();
        assert!(vec.capacity() >= 5);
        assert_eq!(vec.residency(), Residency::Heap);
        assert_ne!(vec.as_ptr(), inline_addr(&vec));
        assert_eq!(vec, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_assign_destroys_prior_elements_once() {
        let drops = Rc::new(Cell::new(0));
        let mut vec: FastVec<Tracked, 4> = FastVec::new();
        vec.push(Tracked(drops.clone())).unwrap();
        vec.push(Tracked(drops.clone())).unwrap();

        let fresh: Vec<Tracked> = (0..3).map(|_| Tracked(drops.clone())).collect();
        vec.assign(&fresh).unwrap();
        assert_eq!(vec.len(), 3);
        assert_eq!(drops.get(), 2);

        let values: FastVec<i32, 4> = {
            let mut v = FastVec::from_slice(&[1, 2]).unwrap();
            v.assign(&[10, 20, 30]).unwrap();
            v
        };
        assert_eq!(values, [10, 20, 30]);
    }

    #[test]
    fn test_resize_down_keeps_heap_capacity() {
        let mut vec: FastVec<i32, 4> = FastVec::from_slice(&[1, 2, 3, 4, 5]).unwrap();
        assert!(vec.is_heap());
        let capacity = vec.capacity();
        assert!(capacity >= 5);

        vec.resize(2).unwrap();
        assert_eq!(vec, [1, 2]);
        assert_eq!(vec.len(), 2);
        assert_eq!(vec.capacity(), capacity);
    }

    #[test]
    fn test_transfer_steals_heap_block() {
        let mut a: FastVec<i32, 4> = FastVec::with_capacity(8).unwrap();
        a.extend([1, 2, 3]);
        assert!(a.is_heap());
        let block = a.as_ptr();

        let mut b: FastVec<i32, 4> = FastVec::from_slice(&[9]).unwrap();
        assert!(b.is_inline());
        b.transfer_from(&mut a).unwrap();

        assert_eq!(b, [1, 2, 3]);
        assert_eq!(b.as_ptr(), block);
        assert!(b.is_heap());
        assert!(a.is_empty());
        assert_eq!(a.residency(), Residency::Empty);

        // An emptied source still works, now from the heap.
        a.push(7).unwrap();
        assert_eq!(a, [7]);
        assert!(a.is_heap());
    }

    #[test]
    fn test_transfer_moves_inline_elements() {
        let mut a: FastVec<i32, 4> = FastVec::from_slice(&[1, 2, 3]).unwrap();
        let mut b: FastVec<i32, 4> = FastVec::new();
        b.transfer_from(&mut a).unwrap();

        assert_eq!(b, [1, 2, 3]);
        assert_ne!(b.as_ptr(), a.as_ptr());
        assert!(a.is_empty());
        assert!(a.is_inline());

        // Into a smaller inline region the elements have to spill.
        let mut small: FastVec<i32, 2> = FastVec::new();
        small.transfer_from(&mut b).unwrap();
        assert_eq!(small, [1, 2, 3]);
        assert!(small.is_heap());
    }

    #[test]
    fn test_transfer_drop_accounting() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut a: FastVec<Tracked, 4> = FastVec::new();
            a.push(Tracked(drops.clone())).unwrap();
            a.push(Tracked(drops.clone())).unwrap();

            let mut b: FastVec<Tracked, 4> = FastVec::new();
            b.push(Tracked(drops.clone())).unwrap();
            b.transfer_from(&mut a).unwrap();
            assert_eq!(drops.get(), 1);
            assert_eq!(b.len(), 2);
        }
        assert_eq!(drops.get(), 3);
    }

    #[test]
    fn test_detach_by_residency() {
        let mut heap: FastVec<i32, 2> = FastVec::from_slice(&[1, 2, 3]).unwrap();
        let block = heap.detach();
        assert_eq!(block.len(), 12);
        assert_eq!(heap.len(), 0);
        assert_eq!(heap.capacity(), 0);

        let mut inline: FastVec<i32, 4> = FastVec::from_slice(&[1, 2, 3]).unwrap();
        let empty = inline.detach();
        assert!(empty.is_empty());
        assert!(!empty.is_allocated());
        assert_eq!(inline, [1, 2, 3]);

        inline.attach(block).unwrap();
        assert!(inline.is_heap());
        assert_eq!(inline, [1, 2, 3]);
    }

    #[test]
    fn test_reserve_overflow_keeps_state() {
        let mut vec: FastVec<i32, 4> = FastVec::from_slice(&[1, 2]).unwrap();
        let err = vec.reserve(FastVec::<i32, 4>::max_size() + 1).unwrap_err();
        assert!(err.is_alloc_failure());
        assert_eq!(vec, [1, 2]);
        assert_eq!(vec.capacity(), 4);
        assert!(vec.is_inline());
    }

    #[test]
    fn test_refused_spill_keeps_inline_state() {
        let mut vec: FastVec<u64, 4> = FastVec::from_slice(&[1, 2]).unwrap();
        let err = vec.reserve(FastVec::<u64, 4>::max_size() - 1).unwrap_err();
        assert!(matches!(err, Error::AllocFailed { .. }));
        assert_eq!(vec, [1, 2]);
        assert_eq!(vec.capacity(), 4);
        assert!(vec.is_inline());
        assert_eq!(vec.as_ptr(), inline_addr(&vec));
    }

    #[test]
    fn test_generic_transfer_outlives_boxed_source() {
        fn take_all<S: Transferable<i32, true>>(source: &mut S) -> FastVecData<i32> {
            let mut target = FastVecData::new();
            target.transfer_from(source).unwrap();
            target
        }

        let mut boxed: alloc::boxed::Box<FastVec<i32, 4>> =
            alloc::boxed::Box::new(FastVec::from_slice(&[1, 2]).unwrap());
        let taken = take_all(&mut *boxed);
        assert!(boxed.is_empty() && boxed.is_inline());
        drop(boxed);

        // The elements were moved out of the region before it was freed.
        assert!(taken.is_heap());
        assert_eq!(taken, [1, 2]);
    }

    #[test]
    fn test_moved_vector_rebinds() {
        fn relocate<T>(value: T) -> T {
            let boxed = alloc::boxed::Box::new(value);
            *boxed
        }

        let mut vec: FastVec<String, 4> = FastVec::new();
        vec.push("a".to_string()).unwrap();
        vec.push("b".to_string()).unwrap();

        let mut vec = relocate(vec);
        assert_eq!(vec.as_ptr(), inline_addr(&vec));
        assert_eq!(vec, ["a", "b"]);
        vec.push("c".to_string()).unwrap();
        assert_eq!(vec[2], "c");

        let mut other: FastVec<String, 4> = FastVec::from_slice(&["x".to_string()]).unwrap();
        core::mem::swap(&mut vec, &mut other);
        assert_eq!(other, ["a", "b", "c"]);
        assert_eq!(vec, ["x"]);
        other.push("d".to_string()).unwrap();
        vec.truncate(0);
        assert_eq!(other.len(), 4);
        assert!(other.is_inline());
    }

    #[test]
    fn test_strings_spill_and_grow() {
        let mut vec: FastVec<String, 2> = FastVec::new();
        for i in 0..50 {
            vec.push(i.to_string()).unwrap();
        }
        vec.reserve(200).unwrap();
        assert!(vec.iter().enumerate().all(|(i, s)| *s == i.to_string()));
    }

    #[test]
    fn test_clone_is_independent() {
        let original: FastVec<String, 2> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let mut copy = original.clone();
        assert_eq!(copy, original);
        copy[0].push('!');
        assert_eq!(original[0], "a");

        let mut target: FastVec<String, 2> = FastVec::new();
        target.clone_from(&original);
        assert_eq!(target, original);
        assert_ne!(target.as_ptr(), original.as_ptr());
    }

    #[test]
    fn test_checked_access() {
        let mut vec: FastVec<i32, 4> = fastvec![1, 2, 3];
        assert_eq!(vec.at(2), Ok(&3));
        assert_eq!(vec.at(3), Err(Error::IndexOutOfBounds { index: 3, len: 3 }));
        *vec.at_mut(0).unwrap() = 10;
        assert_eq!(vec.front(), Some(&10));
        assert_eq!(vec.back(), Some(&3));
        assert_eq!(vec.pop(), Some(3));
    }

    #[test]
    fn test_lazy_inline_region_is_zeroed() {
        let mut vec: ScratchVec<u32, 4> = ScratchVec::new();
        vec.resize(4).unwrap();
        assert_eq!(vec, [0, 0, 0, 0]);
        vec[3] = 13;
        vec.resize(1).unwrap();
        vec.resize(4).unwrap();
        assert_eq!(vec[3], 13);

        vec.resize(20).unwrap();
        assert!(vec.is_heap());
        assert_eq!(vec[3], 13);
        assert!(vec[4..].iter().all(|&v| v == 0));
    }

    #[repr(C)]
    #[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    struct Point {
        x: f32,
        y: f32,
    }

    #[test]
    fn test_pod_elements_through_blocks() {
        let mut points: ScratchVec<Point, 2> = ScratchVec::new();
        points.resize(3).unwrap();
        assert_eq!(points[2], Point { x: 0.0, y: 0.0 });
        points[1] = Point { x: 1.5, y: -2.0 };

        let block = points.detach();
        assert_eq!(block.len(), 3 * size_of::<Point>());
        assert!(block.can_hold::<Point>());
        assert!(!block.can_hold::<u64>());

        let mut other: ScratchVec<Point, 8> = ScratchVec::new();
        other.attach(block).unwrap();
        assert_eq!(other[1], Point { x: 1.5, y: -2.0 });
        assert_eq!(points.residency(), Residency::Empty);
    }

    #[test]
    fn test_macro_and_aliases() {
        let empty: MiniVec<u8> = fastvec![];
        assert_eq!(empty.capacity(), 8);

        let filled: FastVec<String, 2> = fastvec!["x".to_string(); 3];
        assert_eq!(filled, ["x", "x", "x"]);

        let none: FastVec<String, 2> = fastvec!["x".to_string(); 0];
        assert!(none.is_empty() && none.is_inline());
    }

    #[test]
    fn test_zero_inline_capacity() {
        let mut vec: FastVec<i32, 0> = FastVec::new();
        assert_eq!(vec.residency(), Residency::Empty);
        vec.push(1).unwrap();
        assert!(vec.is_heap());
        assert_eq!(vec, [1]);
    }

    #[test]
    fn test_zero_sized_elements() {
        let mut vec: FastVec<(), 4> = FastVec::new();
        for _ in 0..10 {
            vec.push(()).unwrap();
        }
        assert_eq!(vec.len(), 10);
        assert!(vec.is_heap());
        vec.clear();
        assert!(vec.is_empty());
    }
}
