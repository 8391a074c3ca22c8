//! Raw variable length records.

use crate::{ByteCursor, Result};
use std::io::{Read, Write};

/// The number of bytes in a vlr header, i.e. before the data.
pub const HEADER_SIZE: usize = 54;

/// A raw variable length record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vlr {
    /// Reserved, should be zero.
    pub reserved: u16,

    /// The ASCII user id, nul filled.
    pub user_id: [u8; 16],

    /// The record id, whose meaning depends on the user id.
    pub record_id: u16,

    /// The number of bytes in the data that follow the vlr header.
    pub record_length_after_header: u16,

    /// A nul filled textual description of the data.
    pub description: [u8; 32],

    /// The data themselves.
    pub data: Vec<u8>,
}

impl Vlr {
    /// Reads a raw vlr.
    ///
    /// Exactly `record_length_after_header` bytes of data are read, and a short stream is an
    /// error.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasfile::{ByteCursor, raw::Vlr};
    /// let mut cursor = ByteCursor::new(Cursor::new(Vec::new()));
    /// Vlr::default().write_to(&mut cursor).unwrap();
    /// let mut cursor = ByteCursor::new(Cursor::new(cursor.into_inner().into_inner()));
    /// let vlr = Vlr::read_from(&mut cursor).unwrap();
    /// ```
    pub fn read_from<R: Read>(read: &mut ByteCursor<R>) -> Result<Vlr> {
        let reserved = read.read_u16()?;
        let user_id = read.read_array::<16>()?;
        let record_id = read.read_u16()?;
        let record_length_after_header = read.read_u16()?;
        let description = read.read_array::<32>()?;
        let data = read.read_bytes(usize::from(record_length_after_header))?;
        Ok(Vlr {
            reserved,
            user_id,
            record_id,
            record_length_after_header,
            description,
            data,
        })
    }

    /// Writes a raw vlr.
    ///
    /// The data are written as-is; `record_length_after_header` is not checked against them.
    pub fn write_to<W: Write>(&self, write: &mut ByteCursor<W>) -> Result<()> {
        write.write_u16(self.reserved)?;
        write.write_bytes(&self.user_id)?;
        write.write_u16(self.record_id)?;
        write.write_u16(self.record_length_after_header)?;
        write.write_bytes(&self.description)?;
        write.write_bytes(&self.data)?;
        Ok(())
    }

    /// Returns the number of bytes this vlr occupies in a file, header included.
    pub fn len(&self) -> u64 {
        (HEADER_SIZE + self.data.len()) as u64
    }

    /// Returns true if this vlr has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
