//! Exact-width little-endian reads and writes with position tracking.
//!
//! Every multi-byte value in a las file is little-endian, regardless of the host. A
//! [ByteCursor] wraps a stream and keeps count of where it is, so that a short read can be
//! reported as [Error::UnexpectedEof] along with the offset where it started:
//!
//! ```
//! use std::io::Cursor;
//! use lasfile::ByteCursor;
//!
//! let mut cursor = ByteCursor::new(Cursor::new(vec![1, 0, 2]));
//! assert_eq!(1, cursor.read_u16().unwrap());
//! assert_eq!(2, cursor.position());
//! assert!(cursor.read_u16().is_err());
//! ```

use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

/// A stream wrapper that reads and writes little-endian values and tracks its byte offset.
#[derive(Debug)]
pub struct ByteCursor<T> {
    inner: T,
    position: u64,
}

macro_rules! read_values {
    ($($(#[$meta:meta])* $name:ident -> $ty:ty = $read:expr, $width:expr;)+) => {
        $(
            $(#[$meta])*
            pub fn $name(&mut self) -> Result<$ty> {
                let position = self.position;
                let value = $read(&mut self.inner).map_err(|err| eof(err, position))?;
                self.position += $width;
                Ok(value)
            }
        )+
    };
}

macro_rules! write_values {
    ($($(#[$meta:meta])* $name:ident($ty:ty) = $write:expr, $width:expr;)+) => {
        $(
            $(#[$meta])*
            pub fn $name(&mut self, value: $ty) -> Result<()> {
                $write(&mut self.inner, value)?;
                self.position += $width;
                Ok(())
            }
        )+
    };
}

impl<T> ByteCursor<T> {
    /// Wraps a stream, assuming it is positioned at offset zero.
    pub fn new(inner: T) -> ByteCursor<T> {
        ByteCursor { inner, position: 0 }
    }

    /// Returns the current byte offset.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Unwraps the stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Seek> ByteCursor<T> {
    /// Wraps a stream at its current position.
    pub fn at_current_position(mut inner: T) -> Result<ByteCursor<T>> {
        let position = inner.stream_position()?;
        Ok(ByteCursor { inner, position })
    }

    /// Seeks to an absolute byte offset.
    pub fn seek(&mut self, position: u64) -> Result<()> {
        self.position = self.inner.seek(SeekFrom::Start(position))?;
        Ok(())
    }
}

impl<R: Read> ByteCursor<R> {
    read_values! {
        /// Reads one byte.
        read_u8 -> u8 = |r: &mut R| r.read_u8(), 1;
        /// Reads one signed byte.
        read_i8 -> i8 = |r: &mut R| r.read_i8(), 1;
        /// Reads a little-endian `u16`.
        read_u16 -> u16 = |r: &mut R| r.read_u16::<LittleEndian>(), 2;
        /// Reads a little-endian `u32`.
        read_u32 -> u32 = |r: &mut R| r.read_u32::<LittleEndian>(), 4;
        /// Reads a little-endian `i32`.
        read_i32 -> i32 = |r: &mut R| r.read_i32::<LittleEndian>(), 4;
        /// Reads a little-endian `u64`.
        read_u64 -> u64 = |r: &mut R| r.read_u64::<LittleEndian>(), 8;
        /// Reads a little-endian `f64`.
        read_f64 -> f64 = |r: &mut R| r.read_f64::<LittleEndian>(), 8;
    }

    /// Reads exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0; n];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Fills a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut bytes = [0; N];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let position = self.position;
        self.inner
            .read_exact(buf)
            .map_err(|err| eof(err, position))?;
        self.position += buf.len() as u64;
        Ok(())
    }
}

impl<W: Write> ByteCursor<W> {
    write_values! {
        /// Writes one byte.
        write_u8(u8) = |w: &mut W, n| w.write_u8(n), 1;
        /// Writes one signed byte.
        write_i8(i8) = |w: &mut W, n| w.write_i8(n), 1;
        /// Writes a little-endian `u16`.
        write_u16(u16) = |w: &mut W, n| w.write_u16::<LittleEndian>(n), 2;
        /// Writes a little-endian `u32`.
        write_u32(u32) = |w: &mut W, n| w.write_u32::<LittleEndian>(n), 4;
        /// Writes a little-endian `i32`.
        write_i32(i32) = |w: &mut W, n| w.write_i32::<LittleEndian>(n), 4;
        /// Writes a little-endian `u64`.
        write_u64(u64) = |w: &mut W, n| w.write_u64::<LittleEndian>(n), 8;
        /// Writes a little-endian `f64`.
        write_f64(f64) = |w: &mut W, n| w.write_f64::<LittleEndian>(n), 8;
    }

    /// Writes all of the bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    /// Flushes the wrapped stream.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(Error::from)
    }
}

fn eof(err: std::io::Error, position: u64) -> Error {
    if err.kind() == ErrorKind::UnexpectedEof {
        Error::UnexpectedEof { position }
    } else {
        Error::from(err)
    }
}
