use std::io::{self, IoSlice, Write};

use crate::{Error, FastVec, FastVecData};

impl From<Error> for io::Error {
    /// Allocation failures become [`io::ErrorKind::OutOfMemory`].
    fn from(err: Error) -> io::Error {
        let kind = match err {
            Error::CapacityOverflow { .. } | Error::AllocFailed { .. } => io::ErrorKind::OutOfMemory,
            Error::IndexOutOfBounds { .. } => io::ErrorKind::InvalidInput,
            Error::IncompatibleBlock { .. } => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}

/// Room for `len + additional` bytes, as one amortized reservation.
fn total_len(len: usize, bufs: &[IoSlice<'_>]) -> io::Result<(usize, usize)> {
    let num = bufs
        .iter()
        .try_fold(0usize, |acc, b| acc.checked_add(b.len()))
        .and_then(|num| len.checked_add(num).map(|total| (num, total)));
    num.ok_or_else(|| io::Error::from(Error::capacity_overflow(usize::MAX, usize::MAX)))
}

/// Write is implemented for `FastVecData<u8>` by appending to the vector.
/// The vector will grow as needed.
impl<const INIT: bool> Write for FastVecData<u8, INIT> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(buf)?;
        Ok(buf.len())
    }

    #[inline(always)]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        let (num, total) = total_len(self.len(), bufs)?;
        if total > self.capacity() {
            // Same growth as a single large write.
            self.reserve(total.max(self.len() + self.len() / 2))?;
        }
        for buf in bufs {
            self.extend_from_slice(buf)?;
        }
        Ok(num)
    }

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.extend_from_slice(buf)?;
        Ok(())
    }
}

/// Write is implemented for `FastVec<u8, N>` by appending to the vector.
/// The vector will grow as needed.
impl<const N: usize, const INIT: bool> Write for FastVec<u8, N, INIT> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(buf)?;
        Ok(buf.len())
    }

    #[inline(always)]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        let (num, total) = total_len(self.len(), bufs)?;
        if total > self.capacity() {
            self.reserve(total.max(self.len() + self.len() / 2))?;
        }
        for buf in bufs {
            self.extend_from_slice(buf)?;
        }
        Ok(num)
    }

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.extend_from_slice(buf)?;
        Ok(())
    }
}
