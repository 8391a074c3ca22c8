//! Work with las headers and the information contained therein.
//!
//! A [Header] describes the layout of the points in a file, the scaling and offset of their
//! coordinates, and owns the file's vlrs. Its fields are private and every setter can fail: once
//! the first point of a write has been written the header is frozen, and changing it would
//! invalidate the bytes already on disk.
//!
//! ```
//! use lasfile::{Header, point::Format};
//!
//! let mut header = Header::default();
//! header.set_point_format(Format::new(1).unwrap()).unwrap();
//! header.set_scale(0.001, 0.001, 0.001).unwrap();
//! assert_eq!(28, header.point_record_len());
//! ```
//!
//! The project id is a GUID, readable and writable as a [Uuid] or as its hyphenated string:
//!
//! ```
//! use lasfile::Header;
//!
//! let mut header = Header::default();
//! header.set_project_id("6f1d3a2c-9e4b-4b8e-a1d2-33c0ffee0042").unwrap();
//! assert_eq!("6f1d3a2c-9e4b-4b8e-a1d2-33c0ffee0042", header.guid().to_string());
//! ```

use crate::{
    Bounds, ByteCursor, Error, GpsTimeType, Result, Transform, Vector, Version,
    feature::{
        Evlrs, FileSourceId, GpsStandardTime, LargeFiles, SyntheticReturnNumbers, Waveforms,
    },
    point::Format,
    raw::{
        self,
        header::{Evlr, LargeFile},
    },
    utils::{AsLasStr, FromLasStr},
    vlr::VlrStore,
};
use chrono::{Datelike, NaiveDate, Utc};
use log::{Level, log};
use std::{
    collections::HashMap,
    io::{Cursor, Read, Write},
};
use uuid::Uuid;

const SYNTHETIC_RETURN_NUMBERS_BIT: u16 = 0b1000;
const LEGACY_RETURNS: u8 = 5;
const LARGE_FILE_RETURNS: u8 = 15;

/// Metadata describing the layout, source, and interpretation of the points.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    bounds: Bounds,
    date: Option<NaiveDate>,
    file_source_id: u16,
    frozen: bool,
    generating_software: String,
    gps_time_type: GpsTimeType,
    guid: Uuid,
    has_synthetic_return_numbers: bool,
    number_of_points: u64,
    number_of_points_by_return: HashMap<u8, u64>,
    padding: Vec<u8>,
    point_format: Format,
    system_identifier: String,
    transforms: Vector<Transform>,
    version: Version,
    vlr_gap: u64,
    vlrs: VlrStore,
}

impl Header {
    /// Creates a header from a raw header and the vlrs that followed it.
    ///
    /// The point format must be supported, the declared record length must be exactly the
    /// format's length, and every scale factor must be usable.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::{Header, raw, vlr::VlrStore};
    /// let raw_header = raw::Header {
    ///     x_scale_factor: 0.01,
    ///     y_scale_factor: 0.01,
    ///     z_scale_factor: 0.01,
    ///     ..Default::default()
    /// };
    /// let header = Header::from_raw(raw_header, VlrStore::new()).unwrap();
    /// ```
    pub fn from_raw(raw_header: raw::Header, vlrs: VlrStore) -> Result<Header> {
        raw_header.version.verify_supported()?;
        let point_format = Format::new(raw_header.point_data_record_format)?;
        if raw_header.point_data_record_length != point_format.len() {
            return Err(Error::FormatLengthMismatch {
                format: point_format,
                expected: point_format.len(),
                found: raw_header.point_data_record_length,
            });
        }
        let transforms = Vector {
            x: Transform {
                scale: raw_header.x_scale_factor,
                offset: raw_header.x_offset,
            },
            y: Transform {
                scale: raw_header.y_scale_factor,
                offset: raw_header.y_offset,
            },
            z: Transform {
                scale: raw_header.z_scale_factor,
                offset: raw_header.z_offset,
            },
        };
        check_transforms(&transforms)?;
        let large_file = raw_header
            .large_file
            .filter(|large_file| large_file.number_of_point_records > 0);
        let (number_of_points, number_of_points_by_return) = match large_file {
            Some(large_file) => (
                large_file.number_of_point_records,
                number_of_points_hash_map(&large_file.number_of_points_by_return),
            ),
            None => (
                u64::from(raw_header.number_of_point_records),
                number_of_points_hash_map(&raw_header.number_of_points_by_return),
            ),
        };
        let vlr_len = u64::from(raw_header.header_size) + vlrs.total_len();
        let vlr_gap = u64::from(raw_header.offset_to_point_data).saturating_sub(vlr_len);
        if vlr_gap > 0 {
            log!(
                Level::Warn,
                "{} bytes between the vlrs and the point data will be skipped",
                vlr_gap
            );
        }
        Ok(Header {
            bounds: Bounds {
                min: Vector {
                    x: raw_header.min_x,
                    y: raw_header.min_y,
                    z: raw_header.min_z,
                },
                max: Vector {
                    x: raw_header.max_x,
                    y: raw_header.max_y,
                    z: raw_header.max_z,
                },
            },
            date: NaiveDate::from_yo_opt(
                i32::from(raw_header.file_creation_year),
                u32::from(raw_header.file_creation_day_of_year),
            ),
            file_source_id: raw_header.file_source_id,
            frozen: false,
            generating_software: raw_header.generating_software.as_las_str()?.to_string(),
            gps_time_type: raw_header.global_encoding.into(),
            guid: Uuid::from_bytes_le(raw_header.guid),
            has_synthetic_return_numbers: raw_header.global_encoding
                & SYNTHETIC_RETURN_NUMBERS_BIT
                == SYNTHETIC_RETURN_NUMBERS_BIT,
            number_of_points,
            number_of_points_by_return,
            padding: raw_header.padding,
            point_format,
            system_identifier: raw_header.system_identifier.as_las_str()?.to_string(),
            transforms,
            version: raw_header.version,
            vlr_gap,
            vlrs,
        })
    }

    /// Reads a header and its vlrs.
    ///
    /// The vlrs must fit between the end of the header and the start of the point data.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasfile::{ByteCursor, Header};
    /// let bytes = Header::default().serialize().unwrap();
    /// let header = Header::read_from(&mut ByteCursor::new(Cursor::new(bytes))).unwrap();
    /// ```
    pub fn read_from<R: Read>(read: &mut ByteCursor<R>) -> Result<Header> {
        let raw_header = raw::Header::read_from(read)?;
        let declared = u64::from(raw_header.offset_to_point_data)
            .checked_sub(u64::from(raw_header.header_size))
            .ok_or_else(|| {
                Error::MalformedHeader(format!(
                    "offset to point data ({}) is before the end of the header ({})",
                    raw_header.offset_to_point_data, raw_header.header_size
                ))
            })?;
        let vlrs = VlrStore::read_from(
            read,
            raw_header.number_of_variable_length_records,
            declared,
        )?;
        Header::from_raw(raw_header, vlrs)
    }

    /// Parses a header and its vlrs from bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::{Error, Header};
    /// let mut bytes = Header::default().serialize().unwrap();
    /// assert!(Header::parse(&bytes).is_ok());
    /// bytes[0] = b'X';
    /// assert!(matches!(Header::parse(&bytes), Err(Error::MalformedHeader(_))));
    /// ```
    pub fn parse(bytes: &[u8]) -> Result<Header> {
        Header::read_from(&mut ByteCursor::new(Cursor::new(bytes)))
    }

    /// Writes this header and its vlrs.
    pub fn write_to<W: Write>(&self, write: &mut ByteCursor<W>) -> Result<()> {
        self.to_raw()?.write_to(write)?;
        self.vlrs.write_to(write)?;
        Ok(())
    }

    /// Serializes this header and its vlrs.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::Header;
    /// assert_eq!(227, Header::default().serialize().unwrap().len());
    /// ```
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut cursor = ByteCursor::new(Cursor::new(Vec::new()));
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner().into_inner())
    }

    /// Converts this header into a raw header.
    ///
    /// Fails if the version cannot count this header's points.
    pub fn to_raw(&self) -> Result<raw::Header> {
        let mut system_identifier = [0; 32];
        system_identifier.from_las_str(&self.system_identifier)?;
        let mut generating_software = [0; 32];
        generating_software.from_las_str(&self.generating_software)?;
        let large_files = self.version.supports::<LargeFiles>();
        let number_of_point_records = match u32::try_from(self.number_of_points) {
            Ok(n) => n,
            Err(_) if large_files => 0,
            Err(_) => return Err(self.too_many_points(self.number_of_points)),
        };
        let mut number_of_points_by_return = [0; LEGACY_RETURNS as usize];
        for (i, n) in number_of_points_by_return.iter_mut().enumerate() {
            let count = self.number_of_points_by_return(i as u8 + 1);
            *n = match u32::try_from(count) {
                Ok(n) => n,
                Err(_) if large_files => 0,
                Err(_) => return Err(self.too_many_points(count)),
            };
        }
        let large_file = if large_files {
            let mut number_of_points_by_return = [0; LARGE_FILE_RETURNS as usize];
            for (i, n) in number_of_points_by_return.iter_mut().enumerate() {
                *n = self.number_of_points_by_return(i as u8 + 1);
            }
            Some(LargeFile {
                number_of_point_records: self.number_of_points,
                number_of_points_by_return,
            })
        } else {
            None
        };
        let header_size = self.header_size()?;
        let offset_to_point_data = u32::try_from(self.offset_to_point_data()).map_err(|_| {
            Error::MalformedHeader(format!(
                "offset to point data does not fit in 32 bits: {}",
                self.offset_to_point_data()
            ))
        })?;
        let number_of_variable_length_records = u32::try_from(self.vlrs.len()).map_err(|_| {
            Error::MalformedHeader(format!("too many vlrs: {}", self.vlrs.len()))
        })?;
        let mut global_encoding = u16::from(self.gps_time_type);
        if self.has_synthetic_return_numbers {
            global_encoding |= SYNTHETIC_RETURN_NUMBERS_BIT;
        }
        let (file_creation_day_of_year, file_creation_year) =
            self.date.map_or(Ok((0, 0)), date_fields)?;
        Ok(raw::Header {
            file_signature: raw::LASF,
            file_source_id: self.file_source_id,
            global_encoding,
            guid: self.guid.to_bytes_le(),
            version: self.version,
            system_identifier,
            generating_software,
            file_creation_day_of_year,
            file_creation_year,
            header_size,
            offset_to_point_data,
            number_of_variable_length_records,
            point_data_record_format: self.point_format.to_u8(),
            point_data_record_length: self.point_format.len(),
            number_of_point_records,
            number_of_points_by_return,
            x_scale_factor: self.transforms.x.scale,
            y_scale_factor: self.transforms.y.scale,
            z_scale_factor: self.transforms.z.scale,
            x_offset: self.transforms.x.offset,
            y_offset: self.transforms.y.offset,
            z_offset: self.transforms.z.offset,
            max_x: self.bounds.max.x,
            min_x: self.bounds.min.x,
            max_y: self.bounds.max.y,
            min_y: self.bounds.min.y,
            max_z: self.bounds.max.z,
            min_z: self.bounds.min.z,
            start_of_waveform_data_packet_record: self.version.supports::<Waveforms>().then_some(0),
            evlr: self.version.supports::<Evlrs>().then(Evlr::default),
            large_file,
            padding: self.padding.clone(),
        })
    }

    /// Checks that this header can be written.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::Header;
    /// let mut header = Header::default();
    /// assert!(header.validate().is_ok());
    /// header.set_file_source_id(42).unwrap();
    /// header.set_version((1, 0).into()).unwrap();
    /// assert!(header.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        self.version.verify_supported()?;
        check_transforms(&self.transforms)?;
        if self.file_source_id != 0 {
            self.version.verify_support_for::<FileSourceId>()?;
        }
        if self.gps_time_type.is_standard() {
            self.version.verify_support_for::<GpsStandardTime>()?;
        }
        if self.has_synthetic_return_numbers {
            self.version.verify_support_for::<SyntheticReturnNumbers>()?;
        }
        let _ = self.header_size()?;
        Ok(())
    }

    /// Returns true if this header can no longer be changed.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
        self.vlrs.freeze();
    }

    /// Returns a copy of this header that is ready to start a new file.
    ///
    /// The copy is not frozen, has no points, and drops any gap between the vlrs and the point
    /// data. Everything else, including the bounds, is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::Header;
    /// let header = Header::default().into_template();
    /// assert!(!header.is_frozen());
    /// assert_eq!(0, header.number_of_points());
    /// ```
    pub fn into_template(mut self) -> Header {
        self.frozen = false;
        self.vlrs.thaw();
        self.number_of_points = 0;
        self.number_of_points_by_return.clear();
        self.vlr_gap = 0;
        self
    }

    pub(crate) fn set_point_statistics(
        &mut self,
        number_of_points: u64,
        number_of_points_by_return: HashMap<u8, u64>,
        bounds: Option<Bounds>,
    ) {
        self.number_of_points = number_of_points;
        self.number_of_points_by_return = number_of_points_by_return;
        if let Some(bounds) = bounds {
            self.bounds = bounds;
        }
    }

    pub(crate) fn too_many_points(&self, count: u64) -> Error {
        Error::TooManyPoints {
            version: self.version,
            count,
        }
    }

    fn check_unfrozen(&self) -> Result<()> {
        if self.frozen {
            Err(Error::HeaderFrozen)
        } else {
            Ok(())
        }
    }

    /// Returns this header's version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Sets the version.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::{Header, Version};
    /// let mut header = Header::default();
    /// header.set_version(Version::new(1, 4)).unwrap();
    /// assert_eq!(375, header.header_size().unwrap());
    /// assert!(header.set_version(Version::new(1, 5)).is_err());
    /// ```
    pub fn set_version(&mut self, version: Version) -> Result<()> {
        self.check_unfrozen()?;
        version.verify_supported()?;
        self.version = version;
        Ok(())
    }

    /// Sets the minor version, keeping the major version.
    pub fn set_minor_version(&mut self, minor: u8) -> Result<()> {
        self.set_version(Version::new(self.version.major, minor))
    }

    /// Returns the point format.
    pub fn point_format(&self) -> Format {
        self.point_format
    }

    /// Sets the point format.
    pub fn set_point_format(&mut self, point_format: Format) -> Result<()> {
        self.check_unfrozen()?;
        self.point_format = point_format;
        Ok(())
    }

    /// Returns the length, in bytes, of one point record.
    ///
    /// This is always the length of the point format.
    pub fn point_record_len(&self) -> u16 {
        self.point_format.len()
    }

    /// Returns the scales and offsets.
    pub fn transforms(&self) -> &Vector<Transform> {
        &self.transforms
    }

    /// Sets the scales and offsets.
    ///
    /// Every scale must be finite and non-zero.
    pub fn set_transforms(&mut self, transforms: Vector<Transform>) -> Result<()> {
        self.check_unfrozen()?;
        check_transforms(&transforms)?;
        self.transforms = transforms;
        Ok(())
    }

    /// Sets the scale factors, keeping the offsets.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::{Error, Header};
    /// let mut header = Header::default();
    /// header.set_scale(0.1, 0.1, 0.01).unwrap();
    /// assert!(matches!(header.set_scale(0., 0.1, 0.1), Err(Error::InvalidScale { axis: 'x', .. })));
    /// ```
    pub fn set_scale(&mut self, x: f64, y: f64, z: f64) -> Result<()> {
        let mut transforms = self.transforms;
        transforms.x.scale = x;
        transforms.y.scale = y;
        transforms.z.scale = z;
        self.set_transforms(transforms)
    }

    /// Sets the offsets, keeping the scale factors.
    pub fn set_offset(&mut self, x: f64, y: f64, z: f64) -> Result<()> {
        let mut transforms = self.transforms;
        transforms.x.offset = x;
        transforms.y.offset = y;
        transforms.z.offset = z;
        self.set_transforms(transforms)
    }

    /// Returns the bounds of the points.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Sets the bounds.
    ///
    /// Bounds are recomputed when a write session with points is closed, so this only sticks for
    /// files without points.
    pub fn set_bounds(&mut self, bounds: Bounds) -> Result<()> {
        self.check_unfrozen()?;
        self.bounds = bounds;
        Ok(())
    }

    /// Returns the project id.
    pub fn guid(&self) -> Uuid {
        self.guid
    }

    /// Sets the project id.
    pub fn set_guid(&mut self, guid: Uuid) -> Result<()> {
        self.check_unfrozen()?;
        self.guid = guid;
        Ok(())
    }

    /// Returns the project id as a lowercase, hyphenated string.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::Header;
    /// assert_eq!("00000000-0000-0000-0000-000000000000", Header::default().project_id());
    /// ```
    pub fn project_id(&self) -> String {
        self.guid.hyphenated().to_string()
    }

    /// Sets the project id from its string form.
    pub fn set_project_id(&mut self, project_id: &str) -> Result<()> {
        self.set_guid(Uuid::parse_str(project_id)?)
    }

    /// Returns the file source id.
    pub fn file_source_id(&self) -> u16 {
        self.file_source_id
    }

    /// Sets the file source id.
    pub fn set_file_source_id(&mut self, file_source_id: u16) -> Result<()> {
        self.check_unfrozen()?;
        self.file_source_id = file_source_id;
        Ok(())
    }

    /// Returns the gps time type.
    pub fn gps_time_type(&self) -> GpsTimeType {
        self.gps_time_type
    }

    /// Sets the gps time type.
    pub fn set_gps_time_type(&mut self, gps_time_type: GpsTimeType) -> Result<()> {
        self.check_unfrozen()?;
        self.gps_time_type = gps_time_type;
        Ok(())
    }

    /// Are the return numbers synthetic?
    pub fn has_synthetic_return_numbers(&self) -> bool {
        self.has_synthetic_return_numbers
    }

    #[allow(missing_docs)]
    pub fn set_has_synthetic_return_numbers(&mut self, value: bool) -> Result<()> {
        self.check_unfrozen()?;
        self.has_synthetic_return_numbers = value;
        Ok(())
    }

    /// Returns the system identifier.
    pub fn system_identifier(&self) -> &str {
        &self.system_identifier
    }

    /// Sets the system identifier, which must fit in 32 bytes.
    pub fn set_system_identifier(&mut self, system_identifier: &str) -> Result<()> {
        self.check_unfrozen()?;
        [0u8; 32].from_las_str(system_identifier)?;
        self.system_identifier = system_identifier.to_string();
        Ok(())
    }

    /// Returns the generating software.
    pub fn generating_software(&self) -> &str {
        &self.generating_software
    }

    /// Sets the generating software, which must fit in 32 bytes.
    pub fn set_generating_software(&mut self, generating_software: &str) -> Result<()> {
        self.check_unfrozen()?;
        [0u8; 32].from_las_str(generating_software)?;
        self.generating_software = generating_software.to_string();
        Ok(())
    }

    /// Returns the file creation date.
    ///
    /// `None` if the header's day of year and year are not a date, e.g. if they are zero.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Sets the file creation date.
    ///
    /// The year must fit in two bytes, so dates before year 0 or after year 65535 are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use lasfile::Header;
    /// let mut header = Header::default();
    /// assert!(header.set_date(NaiveDate::from_ymd_opt(2024, 2, 29)).is_ok());
    /// assert!(header.set_date(NaiveDate::from_ymd_opt(-1, 1, 1)).is_err());
    /// ```
    pub fn set_date<D: Into<Option<NaiveDate>>>(&mut self, date: D) -> Result<()> {
        self.check_unfrozen()?;
        let date = date.into();
        if let Some(date) = date {
            let _ = date_fields(date)?;
        }
        self.date = date;
        Ok(())
    }

    /// Returns the number of points.
    pub fn number_of_points(&self) -> u64 {
        self.number_of_points
    }

    /// Returns the number of points with this return number.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::Header;
    /// assert_eq!(0, Header::default().number_of_points_by_return(1));
    /// ```
    pub fn number_of_points_by_return(&self, n: u8) -> u64 {
        self.number_of_points_by_return
            .get(&n)
            .copied()
            .unwrap_or(0)
    }

    /// Returns the bytes after the version's fixed header fields.
    pub fn padding(&self) -> &[u8] {
        &self.padding
    }

    /// Sets the header padding.
    pub fn set_padding(&mut self, padding: Vec<u8>) -> Result<()> {
        self.check_unfrozen()?;
        self.padding = padding;
        Ok(())
    }

    /// Returns the vlrs.
    pub fn vlrs(&self) -> &VlrStore {
        &self.vlrs
    }

    /// Returns the vlrs, for appending.
    ///
    /// The store refuses changes once this header is frozen.
    pub fn vlrs_mut(&mut self) -> &mut VlrStore {
        &mut self.vlrs
    }

    /// Returns the size of the header block, padding included.
    pub fn header_size(&self) -> Result<u16> {
        u16::try_from(self.padding.len())
            .ok()
            .and_then(|n| self.version.header_size().checked_add(n))
            .ok_or_else(|| {
                Error::MalformedHeader(format!(
                    "{} bytes of padding do not fit in the header",
                    self.padding.len()
                ))
            })
    }

    /// Returns the offset from the start of the file to the first point record.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::{Header, Vlr};
    /// let mut header = Header::default();
    /// header.vlrs_mut().append(Vlr { data: vec![1, 2, 3], ..Default::default() }).unwrap();
    /// assert_eq!(227 + 54 + 3, header.offset_to_point_data());
    /// ```
    pub fn offset_to_point_data(&self) -> u64 {
        u64::from(self.version.header_size())
            + self.padding.len() as u64
            + self.vlrs.total_len()
            + self.vlr_gap
    }
}

impl Default for Header {
    fn default() -> Header {
        Header {
            bounds: Bounds::new(Vector::default(), Vector::default()),
            date: Some(Utc::now().date_naive()),
            file_source_id: 0,
            frozen: false,
            generating_software: format!("lasfile {}", env!("CARGO_PKG_VERSION")),
            gps_time_type: GpsTimeType::Week,
            guid: Uuid::nil(),
            has_synthetic_return_numbers: false,
            number_of_points: 0,
            number_of_points_by_return: HashMap::new(),
            padding: Vec::new(),
            point_format: Format::default(),
            system_identifier: String::new(),
            transforms: Vector::new(
                Transform::default(),
                Transform::default(),
                Transform::default(),
            ),
            version: Version::default(),
            vlr_gap: 0,
            vlrs: VlrStore::new(),
        }
    }
}

fn date_fields(date: NaiveDate) -> Result<(u16, u16)> {
    let invalid = |_| Error::InvalidDate(date);
    let day_of_year = u16::try_from(date.ordinal()).map_err(invalid)?;
    let year = u16::try_from(date.year()).map_err(invalid)?;
    Ok((day_of_year, year))
}

fn check_transforms(transforms: &Vector<Transform>) -> Result<()> {
    for (axis, transform) in [
        ('x', &transforms.x),
        ('y', &transforms.y),
        ('z', &transforms.z),
    ] {
        if !transform.has_valid_scale() {
            return Err(Error::InvalidScale {
                axis,
                scale: transform.scale,
            });
        }
        if transform.scale < 0. {
            log!(Level::Warn, "negative {} scale factor: {}", axis, transform.scale);
        }
    }
    Ok(())
}

fn number_of_points_hash_map<T: Copy + Into<u64>>(slice: &[T]) -> HashMap<u8, u64> {
    slice
        .iter()
        .enumerate()
        .filter_map(|(i, &n)| {
            let n = n.into();
            (n > 0).then_some((i as u8 + 1, n))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Vlr, crs::SpatialReference};

    fn roundtrip(header: &Header) -> Header {
        Header::parse(&header.serialize().unwrap()).unwrap()
    }

    macro_rules! version {
        ($name:ident, $minor:expr, $size:expr) => {
            #[test]
            fn $name() {
                let mut header = Header::default();
                header.set_minor_version($minor).unwrap();
                let bytes = header.serialize().unwrap();
                assert_eq!($size, bytes.len());
                assert_eq!(header, Header::parse(&bytes).unwrap());
            }
        };
    }

    version!(las_1_0, 0, 227);
    version!(las_1_1, 1, 227);
    version!(las_1_2, 2, 227);
    version!(las_1_3, 3, 235);
    version!(las_1_4, 4, 375);

    #[test]
    fn defaults() {
        let header = Header::default();
        assert_eq!(Version::new(1, 2), header.version());
        assert_eq!(0, header.point_format().to_u8());
        assert_eq!(0.01, header.transforms().x.scale);
        assert_eq!(0., header.transforms().z.offset);
        assert!(header.guid().is_nil());
        assert!(header.generating_software().starts_with("lasfile "));
        assert!(header.date().is_some());
        assert!(header.validate().is_ok());
    }

    #[test]
    fn fields_roundtrip() {
        let mut header = Header::default();
        header.set_minor_version(3).unwrap();
        header.set_point_format(Format::new(3).unwrap()).unwrap();
        header.set_scale(0.001, 0.002, 0.003).unwrap();
        header.set_offset(1., 2., 3.).unwrap();
        header
            .set_bounds(Bounds::new(Vector::new(1., 2., 3.), Vector::new(4., 5., 6.)))
            .unwrap();
        header.set_file_source_id(7).unwrap();
        header.set_gps_time_type(GpsTimeType::Standard).unwrap();
        header.set_has_synthetic_return_numbers(true).unwrap();
        header.set_system_identifier("lidar").unwrap();
        header.set_generating_software("tests").unwrap();
        header
            .set_date(NaiveDate::from_ymd_opt(2024, 2, 29))
            .unwrap();
        header.set_padding(vec![1, 2]).unwrap();
        header
            .set_project_id("936dda0d-7fd3-4e7b-9a4c-5c1e8d1e2f3a")
            .unwrap();
        header
            .vlrs_mut()
            .append(Vlr {
                user_id: "lasfile".to_string(),
                record_id: 1,
                description: "a vlr".to_string(),
                data: vec![3, 2, 1],
            })
            .unwrap();
        assert_eq!(header, roundtrip(&header));
    }

    #[test]
    fn guid_views() {
        let mut header = Header::default();
        let guid = Uuid::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);
        header.set_guid(guid).unwrap();
        assert_eq!("01234567-89ab-cdef-fedc-ba9876543210", header.project_id());
        header
            .set_project_id("FEDCBA98-7654-3210-0123-456789ABCDEF")
            .unwrap();
        assert_eq!(
            Uuid::from_u128(0xfedc_ba98_7654_3210_0123_4567_89ab_cdef),
            header.guid()
        );
        assert_eq!("fedcba98-7654-3210-0123-456789abcdef", header.project_id());
        assert!(matches!(
            header.set_project_id("not a guid"),
            Err(Error::InvalidGuid(_))
        ));
    }

    #[test]
    fn guid_byte_layout() {
        let mut header = Header::default();
        header
            .set_guid(Uuid::from_u128(0x0001_0203_0405_0607_0809_0a0b_0c0d_0e0f))
            .unwrap();
        let bytes = header.serialize().unwrap();
        assert_eq!(
            [3, 2, 1, 0, 5, 4, 7, 6, 8, 9, 10, 11, 12, 13, 14, 15],
            bytes[8..24]
        );
        assert_eq!(header.guid(), roundtrip(&header).guid());
    }

    #[test]
    fn frozen() {
        let mut header = Header::default();
        header.freeze();
        assert!(matches!(header.set_scale(1., 1., 1.), Err(Error::HeaderFrozen)));
        assert!(matches!(header.set_offset(1., 1., 1.), Err(Error::HeaderFrozen)));
        assert!(matches!(
            header.set_point_format(Format::new(1).unwrap()),
            Err(Error::HeaderFrozen)
        ));
        assert!(matches!(header.set_minor_version(4), Err(Error::HeaderFrozen)));
        assert!(matches!(header.set_guid(Uuid::nil()), Err(Error::HeaderFrozen)));
        assert!(matches!(
            header.set_bounds(Bounds::default()),
            Err(Error::HeaderFrozen)
        ));
        assert!(matches!(
            header.vlrs_mut().append(Vlr::default()),
            Err(Error::HeaderFrozen)
        ));
        assert_eq!(0.01, header.transforms().x.scale);
        let mut template = header.into_template();
        assert!(template.set_scale(1., 1., 1.).is_ok());
        assert!(template.vlrs_mut().append(Vlr::default()).is_ok());
    }

    #[test]
    fn format_length_mismatch() {
        let mut raw_header = Header::default().to_raw().unwrap();
        raw_header.point_data_record_length = 21;
        assert!(matches!(
            Header::from_raw(raw_header, VlrStore::new()),
            Err(Error::FormatLengthMismatch {
                expected: 20,
                found: 21,
                ..
            })
        ));
    }

    #[test]
    fn invalid_point_format() {
        let mut raw_header = Header::default().to_raw().unwrap();
        raw_header.point_data_record_format = 6;
        assert!(matches!(
            Header::from_raw(raw_header, VlrStore::new()),
            Err(Error::InvalidPointFormat(6))
        ));
    }

    #[test]
    fn zero_scale() {
        let mut raw_header = Header::default().to_raw().unwrap();
        raw_header.y_scale_factor = 0.;
        assert!(matches!(
            Header::from_raw(raw_header, VlrStore::new()),
            Err(Error::InvalidScale { axis: 'y', .. })
        ));
        let mut header = Header::default();
        assert!(matches!(
            header.set_scale(0.01, 0.01, f64::NAN),
            Err(Error::InvalidScale { axis: 'z', .. })
        ));
    }

    #[test]
    fn negative_scale_is_allowed() {
        let mut header = Header::default();
        header.set_scale(-0.01, 0.01, 0.01).unwrap();
        assert!(header.validate().is_ok());
    }

    #[test]
    fn vlr_offset() {
        let mut header = Header::default();
        header
            .vlrs_mut()
            .append(SpatialReference::wkt("GEOGCS[]").into())
            .unwrap();
        header.vlrs_mut().append(Vlr::default()).unwrap();
        let bytes = header.serialize().unwrap();
        assert_eq!(227 + 54 + 8 + 54, bytes.len() as u64);
        assert_eq!(bytes.len() as u64, header.offset_to_point_data());
        let read = Header::parse(&bytes).unwrap();
        assert_eq!(header.vlrs(), read.vlrs());
    }

    #[test]
    fn vlr_length_mismatch() {
        let mut header = Header::default();
        header
            .vlrs_mut()
            .append(Vlr {
                data: vec![0; 10],
                ..Default::default()
            })
            .unwrap();
        let mut bytes = header.serialize().unwrap();
        bytes[96..100].copy_from_slice(&(227u32 + 54 + 5).to_le_bytes());
        assert!(matches!(
            Header::parse(&bytes),
            Err(Error::VlrLengthMismatch {
                declared: 59,
                actual: 64
            })
        ));
    }

    #[test]
    fn vlr_gap() {
        let mut bytes = Header::default().serialize().unwrap();
        bytes[96..100].copy_from_slice(&231u32.to_le_bytes());
        bytes.extend([0; 4]);
        let header = Header::parse(&bytes).unwrap();
        assert_eq!(231, header.offset_to_point_data());
        assert_eq!(227, header.into_template().offset_to_point_data());
    }

    #[test]
    fn point_counts() {
        let mut header = Header::default();
        header.set_point_statistics(
            42,
            [(1, 40), (2, 2)].into_iter().collect(),
            None,
        );
        let read = roundtrip(&header);
        assert_eq!(42, read.number_of_points());
        assert_eq!(40, read.number_of_points_by_return(1));
        assert_eq!(2, read.number_of_points_by_return(2));
        assert_eq!(0, read.number_of_points_by_return(3));
    }

    #[test]
    fn too_many_points_legacy() {
        let mut header = Header::default();
        header.set_point_statistics(u64::from(u32::MAX) + 1, HashMap::new(), None);
        assert!(matches!(
            header.to_raw(),
            Err(Error::TooManyPoints { .. })
        ));
    }

    #[test]
    fn large_file() {
        let mut header = Header::default();
        header.set_minor_version(4).unwrap();
        let count = u64::from(u32::MAX) + 1;
        header.set_point_statistics(count, [(7, count)].into_iter().collect(), None);
        let raw_header = header.to_raw().unwrap();
        assert_eq!(0, raw_header.number_of_point_records);
        let large_file = raw_header.large_file.unwrap();
        assert_eq!(count, large_file.number_of_point_records);
        assert_eq!(count, large_file.number_of_points_by_return[6]);
        let read = roundtrip(&header);
        assert_eq!(count, read.number_of_points());
        assert_eq!(count, read.number_of_points_by_return(7));
    }

    #[test]
    fn unsupported_features() {
        let mut header = Header::default();
        header.set_minor_version(1).unwrap();
        header.set_gps_time_type(GpsTimeType::Standard).unwrap();
        assert!(matches!(
            header.validate(),
            Err(Error::UnsupportedFeature { .. })
        ));
    }

    #[test]
    fn date_out_of_range() {
        let mut header = Header::default();
        header.set_date(NaiveDate::from_ymd_opt(2017, 10, 30)).unwrap();
        let date = NaiveDate::from_ymd_opt(65536, 1, 1).unwrap();
        assert!(matches!(header.set_date(date), Err(Error::InvalidDate(_))));
        assert!(matches!(
            header.set_date(NaiveDate::from_ymd_opt(-1, 12, 31)),
            Err(Error::InvalidDate(_))
        ));
        assert_eq!(NaiveDate::from_ymd_opt(2017, 10, 30), header.date());

        let date = NaiveDate::from_ymd_opt(65535, 12, 31).unwrap();
        header.set_date(date).unwrap();
        let raw = header.to_raw().unwrap();
        assert_eq!(65535, raw.file_creation_year);
        assert_eq!(365, raw.file_creation_day_of_year);
        assert_eq!(Some(date), roundtrip(&header).date());
    }

    #[test]
    fn strings_too_long() {
        let mut header = Header::default();
        assert!(matches!(
            header.set_system_identifier(&"x".repeat(33)),
            Err(Error::StringTooLong { max: 32, .. })
        ));
        assert!(header.set_generating_software(&"x".repeat(32)).is_ok());
    }
}
