//! ## Intro
//!
//! A vector that keeps small collections in an inline region and spills to
//! one owned heap block when they outgrow it.
//!
//! Many workloads build collections that are usually tiny but occasionally large.
//! [`FastVec`] serves the tiny case without touching the allocator, and once the
//! elements no longer fit it moves them to a single heap block that it owns exclusively.
//!
//! Unlike [`Vec`], every operation that can allocate returns a [`Result`]: a refused
//! allocation is reported as [`Error::AllocFailed`] or [`Error::CapacityOverflow`],
//! and the vector is left exactly as it was.
//!
//! ## Containers
//!
//! ### `FastVecData`
//!
//! - The storage core: length, capacity, pointer, heap ownership
//! - **No inline region**: starts empty, allocates on first growth
//! - Holds every algorithm (growth, relocation, ownership transfer)
//!
//! ```
//! # use fast_vector::FastVecData;
//! let mut vec: FastVecData<i32> = FastVecData::new();
//! vec.push(1).unwrap();
//! assert!(vec.is_heap());
//! ```
//!
//! ### `FastVec`
//!
//! - A [`FastVecData`] plus an `N`-element inline region
//! - **Inline first**, heap when needed
//! - Same method set as the core
//!
//! ```
//! # use fast_vector::{fastvec, FastVec};
//! let mut vec: FastVec<i32, 4> = fastvec![1, 2, 3];
//! assert!(vec.is_inline());
//!
//! vec.extend([4, 5]);
//! assert!(vec.is_heap());
//! ```
//!
//! ### Alias
//!
//! - [`MiniVec<T>`] = `FastVec<T, 8>`, for tiny collections
//! - [`ScratchVec<T, N>`] = `FastVec<T, N, false>`, scratch buffers whose `resize`
//!   does not initialize
//!
//! ## Ownership transfer
//!
//! Heap blocks can change hands without copying:
//!
//! - [`transfer_from`](FastVecData::transfer_from) steals another vector's block in O(1),
//!   or moves its inline elements over in O(n).
//! - [`detach`](FastVecData::detach) releases the block as a [`HeapBlock`] of raw bytes,
//!   and [`attach`](FastVecData::attach) adopts one.
//!
//! ```
//! # use fast_vector::{FastVec, HeapBlock};
//! let mut vec: FastVec<u8, 4> = FastVec::new();
//! vec.attach(HeapBlock::from(b"payload".to_vec())).unwrap();
//! assert_eq!(vec, b"payload");
//! ```
//!
//! ## `no_std` support
//!
//! This crate requires only `core` and `alloc`.
//!
//! ## Optional features
//!
//! ### `std` (default)
//!
//! [`std::io::Write`] for byte vectors, and the [`fs`] helpers that read
//! files into [`HeapBlock`]s.
//!
//! ### `serde`
//!
//! When this optional dependency is enabled,
//! [`FastVecData`] and [`FastVec`] implement the [`serde::Serialize`] and [`serde::Deserialize`] traits.
//!
//! ## Logging
//!
//! Storage transitions (spill to heap, reallocation, block hand-over) are reported
//! through the [`log`] facade at `trace` level, allocation failures at `debug` level.
//!
//! [`serde::Serialize`]: https://docs.rs/serde/latest/serde/trait.Serialize.html
//! [`serde::Deserialize`]: https://docs.rs/serde/latest/serde/trait.Deserialize.html
//! [`Vec`]: alloc::vec::Vec
#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod utils;

pub mod error;
#[doc(inline)]
pub use error::{AttachError, Error, Result};

pub mod heap_block;
#[doc(inline)]
pub use heap_block::HeapBlock;

pub mod fast_vec_data;
#[doc(inline)]
pub use fast_vec_data::{FastVecData, Resizable, Residency, Transferable};

pub mod fast_vec;
#[doc(inline)]
pub use fast_vec::{FastVec, MiniVec, ScratchVec};

#[cfg(feature = "std")]
pub mod fs;

#[cfg(feature = "serde")]
mod serde;

#[cfg(feature = "std")]
mod std_io;
