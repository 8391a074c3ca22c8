//! Raw file metadata.

use crate::{
    ByteCursor, Error, Result, Version,
    feature::{Evlrs, LargeFiles, Waveforms},
    raw::LASF,
};
use std::io::{Read, Write};

/// A las header, field for field.
///
/// Only the layouts of las 1.0 through 1.4 are known. Fields that were added after las 1.2 are
/// `Option`s and are only read or written when the version has them.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    /// The file signature must contain the four characters “LASF”.
    pub file_signature: [u8; 4],

    /// A value between 1 and 65,535 identifying the flight line or source of this file.
    ///
    /// Zero means an id has not been assigned. Reserved in las 1.0.
    pub file_source_id: u16,

    /// A bit field of global properties.
    ///
    /// | Bits | Field name | las versions |
    /// | ---- | ---------- | ------------ |
    /// | 0 | GPS time type (set means adjusted standard GPS time) | 1.2 and above |
    /// | 1 | Waveform data packets internal | 1.3 |
    /// | 2 | Waveform data packets external | 1.3 and above |
    /// | 3 | Return numbers are synthetic | 1.3 and above |
    /// | 4 | WKT coordinate reference system | 1.4 |
    pub global_encoding: u16,

    /// The project identifier, stored as the four parts of a GUID.
    ///
    /// The first three parts are little-endian integers and the last eight bytes are stored
    /// as-is, which is the same layout as `Uuid::to_bytes_le`.
    pub guid: [u8; 16],

    /// The las version.
    pub version: Version,

    /// The hardware system or the operation that generated this file.
    pub system_identifier: [u8; 32],

    /// The software that generated this file.
    pub generating_software: [u8; 32],

    /// The GMT day of the year on which the file was created, where January 1 is day 1.
    pub file_creation_day_of_year: u16,

    /// The four digit year in which the file was created.
    pub file_creation_year: u16,

    /// The size, in bytes, of the header block itself.
    pub header_size: u16,

    /// The number of bytes from the beginning of the file to the first point record.
    pub offset_to_point_data: u32,

    /// The number of variable length records.
    pub number_of_variable_length_records: u32,

    /// The point data record format id.
    pub point_data_record_format: u8,

    /// The size, in bytes, of one point data record.
    pub point_data_record_length: u16,

    /// The total number of point records (legacy 32-bit field in las 1.4).
    pub number_of_point_records: u32,

    /// The number of point records by return, for returns one through five.
    pub number_of_points_by_return: [u32; 5],

    /// The scale factors used to convert the integer coordinates in the point records.
    pub x_scale_factor: f64,
    #[allow(missing_docs)]
    pub y_scale_factor: f64,
    #[allow(missing_docs)]
    pub z_scale_factor: f64,

    /// The offsets applied after scaling the integer coordinates.
    ///
    /// Xcoordinate = (Xrecord * Xscale) + Xoffset
    pub x_offset: f64,
    #[allow(missing_docs)]
    pub y_offset: f64,
    #[allow(missing_docs)]
    pub z_offset: f64,

    /// The actual extents of the point data, in real coordinates.
    pub max_x: f64,
    #[allow(missing_docs)]
    pub min_x: f64,
    #[allow(missing_docs)]
    pub max_y: f64,
    #[allow(missing_docs)]
    pub min_y: f64,
    #[allow(missing_docs)]
    pub max_z: f64,
    #[allow(missing_docs)]
    pub min_z: f64,

    /// **las 1.3 and 1.4**: The offset to the waveform data packet record.
    pub start_of_waveform_data_packet_record: Option<u64>,

    /// **las 1.4**: The location and number of the extended variable length records.
    pub evlr: Option<Evlr>,

    /// **las 1.4**: 64-bit point counts.
    pub large_file: Option<LargeFile>,

    /// Bytes after the version's fixed header fields, counted in `header_size`.
    pub padding: Vec<u8>,
}

/// **las 1.4**: Extended variable length record bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Evlr {
    /// The offset from the beginning of the file to the first EVLR.
    pub start_of_first_evlr: u64,

    /// The number of EVLRs.
    pub number_of_evlrs: u32,
}

/// **las 1.4**: 64-bit point counts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LargeFile {
    /// The total number of point records.
    pub number_of_point_records: u64,

    /// The number of point records by return, for returns one through fifteen.
    pub number_of_points_by_return: [u64; 15],
}

impl Header {
    /// Reads a raw header.
    ///
    /// The signature and version are checked as soon as they are read, since the rest of the
    /// layout depends on them.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasfile::{ByteCursor, raw::Header};
    ///
    /// let mut cursor = ByteCursor::new(Cursor::new(Vec::new()));
    /// Header::default().write_to(&mut cursor).unwrap();
    /// let mut cursor = ByteCursor::new(Cursor::new(cursor.into_inner().into_inner()));
    /// let header = Header::read_from(&mut cursor).unwrap();
    /// ```
    pub fn read_from<R: Read>(read: &mut ByteCursor<R>) -> Result<Header> {
        let file_signature = read.read_array::<4>()?;
        if file_signature != LASF {
            return Err(Error::MalformedHeader(format!(
                "file signature must be LASF, found {:?}",
                String::from_utf8_lossy(&file_signature)
            )));
        }
        let file_source_id = read.read_u16()?;
        let global_encoding = read.read_u16()?;
        let guid = read.read_array::<16>()?;
        let version_major = read.read_u8()?;
        let version_minor = read.read_u8()?;
        let version = Version::new(version_major, version_minor);
        version.verify_supported()?;
        let system_identifier = read.read_array::<32>()?;
        let generating_software = read.read_array::<32>()?;
        let file_creation_day_of_year = read.read_u16()?;
        let file_creation_year = read.read_u16()?;
        let header_size = read.read_u16()?;
        let offset_to_point_data = read.read_u32()?;
        let number_of_variable_length_records = read.read_u32()?;
        let point_data_record_format = read.read_u8()?;
        let point_data_record_length = read.read_u16()?;
        let number_of_point_records = read.read_u32()?;
        let mut number_of_points_by_return = [0; 5];
        for n in &mut number_of_points_by_return {
            *n = read.read_u32()?;
        }
        let x_scale_factor = read.read_f64()?;
        let y_scale_factor = read.read_f64()?;
        let z_scale_factor = read.read_f64()?;
        let x_offset = read.read_f64()?;
        let y_offset = read.read_f64()?;
        let z_offset = read.read_f64()?;
        let max_x = read.read_f64()?;
        let min_x = read.read_f64()?;
        let max_y = read.read_f64()?;
        let min_y = read.read_f64()?;
        let max_z = read.read_f64()?;
        let min_z = read.read_f64()?;
        let start_of_waveform_data_packet_record = if version.supports::<Waveforms>() {
            Some(read.read_u64()?)
        } else {
            None
        };
        let evlr = if version.supports::<Evlrs>() {
            Some(Evlr {
                start_of_first_evlr: read.read_u64()?,
                number_of_evlrs: read.read_u32()?,
            })
        } else {
            None
        };
        let large_file = if version.supports::<LargeFiles>() {
            let number_of_point_records = read.read_u64()?;
            let mut number_of_points_by_return = [0; 15];
            for n in &mut number_of_points_by_return {
                *n = read.read_u64()?;
            }
            Some(LargeFile {
                number_of_point_records,
                number_of_points_by_return,
            })
        } else {
            None
        };
        let padding = match header_size.checked_sub(version.header_size()) {
            Some(0) => Vec::new(),
            Some(n) => read.read_bytes(usize::from(n))?,
            None => {
                return Err(Error::MalformedHeader(format!(
                    "header size {} is smaller than the {} bytes required by las {}",
                    header_size,
                    version.header_size(),
                    version
                )));
            }
        };
        Ok(Header {
            file_signature,
            file_source_id,
            global_encoding,
            guid,
            version,
            system_identifier,
            generating_software,
            file_creation_day_of_year,
            file_creation_year,
            header_size,
            offset_to_point_data,
            number_of_variable_length_records,
            point_data_record_format,
            point_data_record_length,
            number_of_point_records,
            number_of_points_by_return,
            x_scale_factor,
            y_scale_factor,
            z_scale_factor,
            x_offset,
            y_offset,
            z_offset,
            max_x,
            min_x,
            max_y,
            min_y,
            max_z,
            min_z,
            start_of_waveform_data_packet_record,
            evlr,
            large_file,
            padding,
        })
    }

    /// Writes a raw header.
    ///
    /// Version-dependent fields that are `None` are written as zeros if the version has them.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasfile::{ByteCursor, raw::Header};
    /// let mut cursor = ByteCursor::new(Cursor::new(Vec::new()));
    /// Header::default().write_to(&mut cursor).unwrap();
    /// assert_eq!(227, cursor.position());
    /// ```
    pub fn write_to<W: Write>(&self, write: &mut ByteCursor<W>) -> Result<()> {
        write.write_bytes(&self.file_signature)?;
        write.write_u16(self.file_source_id)?;
        write.write_u16(self.global_encoding)?;
        write.write_bytes(&self.guid)?;
        write.write_u8(self.version.major)?;
        write.write_u8(self.version.minor)?;
        write.write_bytes(&self.system_identifier)?;
        write.write_bytes(&self.generating_software)?;
        write.write_u16(self.file_creation_day_of_year)?;
        write.write_u16(self.file_creation_year)?;
        write.write_u16(self.header_size)?;
        write.write_u32(self.offset_to_point_data)?;
        write.write_u32(self.number_of_variable_length_records)?;
        write.write_u8(self.point_data_record_format)?;
        write.write_u16(self.point_data_record_length)?;
        write.write_u32(self.number_of_point_records)?;
        for n in &self.number_of_points_by_return {
            write.write_u32(*n)?;
        }
        write.write_f64(self.x_scale_factor)?;
        write.write_f64(self.y_scale_factor)?;
        write.write_f64(self.z_scale_factor)?;
        write.write_f64(self.x_offset)?;
        write.write_f64(self.y_offset)?;
        write.write_f64(self.z_offset)?;
        write.write_f64(self.max_x)?;
        write.write_f64(self.min_x)?;
        write.write_f64(self.max_y)?;
        write.write_f64(self.min_y)?;
        write.write_f64(self.max_z)?;
        write.write_f64(self.min_z)?;
        if self.version.supports::<Waveforms>() {
            write.write_u64(self.start_of_waveform_data_packet_record.unwrap_or(0))?;
        }
        if self.version.supports::<Evlrs>() {
            let evlr = self.evlr.unwrap_or_default();
            write.write_u64(evlr.start_of_first_evlr)?;
            write.write_u32(evlr.number_of_evlrs)?;
        }
        if self.version.supports::<LargeFiles>() {
            let large_file = self.large_file.unwrap_or_default();
            write.write_u64(large_file.number_of_point_records)?;
            for n in &large_file.number_of_points_by_return {
                write.write_u64(*n)?;
            }
        }
        write.write_bytes(&self.padding)?;
        Ok(())
    }
}

impl Default for Header {
    fn default() -> Header {
        let version = Version::new(1, 2);
        Header {
            file_signature: LASF,
            file_source_id: 0,
            global_encoding: 0,
            guid: [0; 16],
            version,
            system_identifier: [0; 32],
            generating_software: [0; 32],
            file_creation_day_of_year: 0,
            file_creation_year: 0,
            header_size: version.header_size(),
            offset_to_point_data: u32::from(version.header_size()),
            number_of_variable_length_records: 0,
            point_data_record_format: 0,
            point_data_record_length: 20,
            number_of_point_records: 0,
            number_of_points_by_return: [0; 5],
            x_scale_factor: 0.,
            y_scale_factor: 0.,
            z_scale_factor: 0.,
            x_offset: 0.,
            y_offset: 0.,
            z_offset: 0.,
            max_x: 0.,
            min_x: 0.,
            max_y: 0.,
            min_y: 0.,
            max_z: 0.,
            min_z: 0.,
            start_of_waveform_data_packet_record: None,
            evlr: None,
            large_file: None,
            padding: Vec::new(),
        }
    }
}
