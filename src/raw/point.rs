//! Raw point records, one struct per point format.
//!
//! Every format starts with the same twenty bytes, described by [Base]. Formats 1 and 3 append
//! an eight byte GPS time, and formats 2 and 3 append a six byte color. A [Record] is tagged by
//! its format, so a record can only carry the fields its format stores:
//!
//! ```
//! use lasfile::{Color, point::Format, raw::point::{Base, Record}};
//!
//! let record = Record::new(Format::new(2).unwrap(), Base::default(), 0., Color::new(1, 2, 3));
//! assert_eq!(Some(Color::new(1, 2, 3)), record.color());
//! assert_eq!(None, record.gps_time());
//! ```

use crate::{ByteCursor, Color, Result, point::Format};
use std::io::{Read, Write};

/// The number of bytes in the base record shared by every point format.
pub const BASE_LEN: u16 = 20;

const RETURN_NUMBER_MASK: u8 = 0b0000_0111;
const NUMBER_OF_RETURNS_MASK: u8 = 0b0011_1000;
const SCAN_DIRECTION_MASK: u8 = 0b0100_0000;
const EDGE_OF_FLIGHT_LINE_MASK: u8 = 0b1000_0000;
const CLASS_MASK: u8 = 0b0001_1111;
const SYNTHETIC_MASK: u8 = 0b0010_0000;
const KEY_POINT_MASK: u8 = 0b0100_0000;
const WITHHELD_MASK: u8 = 0b1000_0000;

/// The fields present in every point format, as stored.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Base {
    /// The X, Y, and Z values are stored as long integers, and are used with the header's scale
    /// and offset to compute the real coordinates.
    pub x: i32,
    #[allow(missing_docs)]
    pub y: i32,
    #[allow(missing_docs)]
    pub z: i32,

    /// The integer representation of the pulse return magnitude.
    pub intensity: u16,

    /// Return number (bits 0-2), number of returns (bits 3-5), scan direction flag (bit 6), and
    /// edge of flight line (bit 7).
    pub flags: u8,

    /// Classification (bits 0-4), synthetic (bit 5), key-point (bit 6), and withheld (bit 7).
    pub classification: u8,

    /// The scan angle, in degrees, rounded to an integer between -90 and +90.
    pub scan_angle_rank: i8,

    /// Free for the user's use.
    pub user_data: u8,

    /// The file source id of the file from which this point originated.
    pub point_source_id: u16,
}

/// A format 1 record, which adds GPS time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Format1 {
    #[allow(missing_docs)]
    pub base: Base,
    /// The time at which the point was acquired.
    pub gps_time: f64,
}

/// A format 2 record, which adds color.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Format2 {
    #[allow(missing_docs)]
    pub base: Base,
    /// The red, green, and blue channels.
    pub color: Color,
}

/// A format 3 record, which adds GPS time and color.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Format3 {
    #[allow(missing_docs)]
    pub base: Base,
    /// The time at which the point was acquired.
    pub gps_time: f64,
    /// The red, green, and blue channels.
    pub color: Color,
}

/// A point record, tagged by its point format.
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Record {
    Format0(Base),
    Format1(Format1),
    Format2(Format2),
    Format3(Format3),
}

impl Base {
    /// Returns the return number from the flag byte.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasfile::raw::point::Base;
    /// let base = Base { flags: 0b0000_1010, ..Default::default() };
    /// assert_eq!(2, base.return_number());
    /// ```
    pub fn return_number(&self) -> u8 {
        self.flags & RETURN_NUMBER_MASK
    }

    /// Returns the number of returns from the flag byte.
    pub fn number_of_returns(&self) -> u8 {
        (self.flags & NUMBER_OF_RETURNS_MASK) >> 3
    }

    /// Returns the scan direction flag.
    pub fn scan_direction_flag(&self) -> bool {
        self.flags & SCAN_DIRECTION_MASK == SCAN_DIRECTION_MASK
    }

    /// Returns the edge of flight line flag.
    pub fn is_edge_of_flight_line(&self) -> bool {
        self.flags & EDGE_OF_FLIGHT_LINE_MASK == EDGE_OF_FLIGHT_LINE_MASK
    }

    /// Returns the five-bit class code.
    pub fn class(&self) -> u8 {
        self.classification & CLASS_MASK
    }

    #[allow(missing_docs)]
    pub fn is_synthetic(&self) -> bool {
        self.classification & SYNTHETIC_MASK == SYNTHETIC_MASK
    }

    #[allow(missing_docs)]
    pub fn is_key_point(&self) -> bool {
        self.classification & KEY_POINT_MASK == KEY_POINT_MASK
    }

    #[allow(missing_docs)]
    pub fn is_withheld(&self) -> bool {
        self.classification & WITHHELD_MASK == WITHHELD_MASK
    }

    fn read_from<R: Read>(read: &mut ByteCursor<R>) -> Result<Base> {
        Ok(Base {
            x: read.read_i32()?,
            y: read.read_i32()?,
            z: read.read_i32()?,
            intensity: read.read_u16()?,
            flags: read.read_u8()?,
            classification: read.read_u8()?,
            scan_angle_rank: read.read_i8()?,
            user_data: read.read_u8()?,
            point_source_id: read.read_u16()?,
        })
    }

    fn write_to<W: Write>(&self, write: &mut ByteCursor<W>) -> Result<()> {
        write.write_i32(self.x)?;
        write.write_i32(self.y)?;
        write.write_i32(self.z)?;
        write.write_u16(self.intensity)?;
        write.write_u8(self.flags)?;
        write.write_u8(self.classification)?;
        write.write_i8(self.scan_angle_rank)?;
        write.write_u8(self.user_data)?;
        write.write_u16(self.point_source_id)?;
        Ok(())
    }
}

impl Record {
    /// Builds the record for a format from the base fields and the optional fields.
    ///
    /// Optional fields that the format does not store are not kept.
    pub fn new(format: Format, base: Base, gps_time: f64, color: Color) -> Record {
        match (format.has_gps_time(), format.has_color()) {
            (false, false) => Record::Format0(base),
            (true, false) => Record::Format1(Format1 { base, gps_time }),
            (false, true) => Record::Format2(Format2 { base, color }),
            (true, true) => Record::Format3(Format3 {
                base,
                gps_time,
                color,
            }),
        }
    }

    /// Returns this record's point format.
    pub fn format(&self) -> Format {
        let n = match self {
            Record::Format0(_) => 0,
            Record::Format1(_) => 1,
            Record::Format2(_) => 2,
            Record::Format3(_) => 3,
        };
        Format::from_id(n)
    }

    /// Returns the base fields.
    pub fn base(&self) -> &Base {
        match self {
            Record::Format0(base) => base,
            Record::Format1(record) => &record.base,
            Record::Format2(record) => &record.base,
            Record::Format3(record) => &record.base,
        }
    }

    /// Returns the GPS time, if this format stores one.
    pub fn gps_time(&self) -> Option<f64> {
        match self {
            Record::Format1(record) => Some(record.gps_time),
            Record::Format3(record) => Some(record.gps_time),
            Record::Format0(_) | Record::Format2(_) => None,
        }
    }

    /// Returns the color, if this format stores one.
    pub fn color(&self) -> Option<Color> {
        match self {
            Record::Format2(record) => Some(record.color),
            Record::Format3(record) => Some(record.color),
            Record::Format0(_) | Record::Format1(_) => None,
        }
    }

    /// Reads a record in the given format.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasfile::{ByteCursor, point::Format, raw::point::Record};
    /// let mut cursor = ByteCursor::new(Cursor::new(vec![0; 28]));
    /// let record = Record::read_from(&mut cursor, Format::new(1).unwrap()).unwrap();
    /// assert_eq!(Some(0.), record.gps_time());
    /// ```
    pub fn read_from<R: Read>(read: &mut ByteCursor<R>, format: Format) -> Result<Record> {
        let base = Base::read_from(read)?;
        let gps_time = if format.has_gps_time() {
            read.read_f64()?
        } else {
            0.
        };
        let color = if format.has_color() {
            Color {
                red: read.read_u16()?,
                green: read.read_u16()?,
                blue: read.read_u16()?,
            }
        } else {
            Color::default()
        };
        Ok(Record::new(format, base, gps_time, color))
    }

    /// Writes this record.
    ///
    /// Exactly `self.format().len()` bytes are written.
    pub fn write_to<W: Write>(&self, write: &mut ByteCursor<W>) -> Result<()> {
        self.base().write_to(write)?;
        if let Some(gps_time) = self.gps_time() {
            write.write_f64(gps_time)?;
        }
        if let Some(color) = self.color() {
            write.write_u16(color.red)?;
            write.write_u16(color.green)?;
            write.write_u16(color.blue)?;
        }
        Ok(())
    }
}
