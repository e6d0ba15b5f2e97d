use core::{fmt, marker::PhantomData};

use serde_core::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, SeqAccess, Visitor},
    ser::SerializeSeq,
};

use crate::{FastVec, FastVecData};

fn serialize_seq<T: Serialize, S: Serializer>(values: &[T], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for element in values {
        seq.serialize_element(element)?;
    }
    seq.end()
}

impl<T: Serialize, const INIT: bool> Serialize for FastVecData<T, INIT> {
    /// Serialize a `FastVecData` as a sequence.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_seq(self.as_slice(), serializer)
    }
}

impl<T: Serialize, const N: usize, const INIT: bool> Serialize for FastVec<T, N, INIT> {
    /// Serialize a `FastVec` as a sequence.
    ///
    /// The serialization format is identical whether the data is inline or on the heap.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_seq(self.as_slice(), serializer)
    }
}

const MAX_PREALLOC_BYTES: usize = 1024 * 1024;

/// Sequence visitor shared by both containers; `V` is the vector being built.
struct SeqVisitor<V> {
    _marker: PhantomData<V>,
}

/// What the visitor needs from a container.
trait SeqTarget: Sized {
    type Item;

    fn empty() -> Self;
    fn reserve(&mut self, capacity: usize) -> crate::Result<()>;
    fn push(&mut self, value: Self::Item) -> crate::Result<()>;
}

impl<T, const INIT: bool> SeqTarget for FastVecData<T, INIT> {
    type Item = T;

    fn empty() -> Self {
        Self::new()
    }

    fn reserve(&mut self, capacity: usize) -> crate::Result<()> {
        FastVecData::reserve(self, capacity)
    }

    fn push(&mut self, value: T) -> crate::Result<()> {
        FastVecData::push(self, value)
    }
}

impl<T, const N: usize, const INIT: bool> SeqTarget for FastVec<T, N, INIT> {
    type Item = T;

    fn empty() -> Self {
        Self::new()
    }

    fn reserve(&mut self, capacity: usize) -> crate::Result<()> {
        FastVec::reserve(self, capacity)
    }

    fn push(&mut self, value: T) -> crate::Result<()> {
        FastVec::push(self, value)
    }
}

impl<'de, V> Visitor<'de> for SeqVisitor<V>
where
    V: SeqTarget,
    V::Item: Deserialize<'de>,
{
    type Value = V;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut vec = V::empty();
        if let Some(hint) = seq.size_hint() {
            // Trust the hint only up to 1 MiB of elements.
            let hint = hint.min(MAX_PREALLOC_BYTES / size_of::<V::Item>().max(1));
            vec.reserve(hint).map_err(<A::Error as de::Error>::custom)?;
        }

        while let Some(element) = seq.next_element()? {
            vec.push(element).map_err(<A::Error as de::Error>::custom)?;
        }

        Ok(vec)
    }
}

impl<'de, T: Deserialize<'de>, const INIT: bool> Deserialize<'de> for FastVecData<T, INIT> {
    /// Deserialize a `FastVecData` from a sequence.
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(SeqVisitor::<Self> {
            _marker: PhantomData,
        })
    }
}

impl<'de, T: Deserialize<'de>, const N: usize, const INIT: bool> Deserialize<'de>
    for FastVec<T, N, INIT>
{
    /// Deserialize a `FastVec` from a sequence.
    ///
    /// If the sequence length exceeds the inline capacity `N`, the data will be stored on the heap.
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(SeqVisitor::<Self> {
            _marker: PhantomData,
        })
    }
}
