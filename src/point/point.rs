use crate::{
    Color, Error, Result, Transform, Vector,
    point::{Format, ScanDirection},
    raw::point::{Base, Record},
};

const THREE_BITS: u8 = 0b111;
const FIVE_BITS: u8 = 0b1_1111;

/// A point is the basic unit of information in las data.
///
/// Every field is a plain value. Fields that a point format does not store read as their
/// placeholders, zero for `gps_time` and black for `color`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// The x coordinate, as a float.
    pub x: f64,
    /// The y coordinate, as a float.
    pub y: f64,
    /// The z coordinate, as a float.
    pub z: f64,

    /// The integer representation of the pulse return magnitude.
    ///
    /// Zero could be a valid intensity, so there is no way to tell if this was left unset.
    pub intensity: u16,

    /// The pulse return number for a given output pulse, zero through seven.
    pub return_number: u8,

    /// The total number of returns for a given pulse, zero through seven.
    pub number_of_returns: u8,

    /// The direction at which the scanner mirror was traveling at the time of the output pulse.
    pub scan_direction: ScanDirection,

    /// True if the point is at the end of a scan.
    pub is_edge_of_flight_line: bool,

    /// The ASPRS classification code, zero through thirty-one.
    ///
    /// Codes are moved between files as-is and are not interpreted.
    pub classification: u8,

    /// This point was created by a technique other than lidar collection.
    pub is_synthetic: bool,

    /// The point should be considered a model key-point.
    pub is_key_point: bool,

    /// The point should be considered withheld (i.e. it's deleted).
    pub is_withheld: bool,

    /// The angle, rounded to the nearest integer, of the output of the laser pulse.
    ///
    /// Zero degrees is nadir, -90° is to the left.
    pub scan_angle_rank: i8,

    /// Used at the user's discretion.
    pub user_data: u8,

    /// The file from which this point originated.
    pub point_source_id: u16,

    /// The time at which the point was acquired.
    pub gps_time: f64,

    /// This point's color.
    pub color: Color,
}

impl Point {
    /// Creates a point from a raw record.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::{Point, Transform, Vector, raw::point::{Base, Record}};
    /// let transforms = Vector::new(Transform::default(), Transform::default(), Transform::default());
    /// let record = Record::Format0(Base { x: 100, flags: 0b1001, ..Default::default() });
    /// let point = Point::new(record, &transforms);
    /// assert_eq!(1., point.x);
    /// assert_eq!(1, point.return_number);
    /// assert_eq!(1, point.number_of_returns);
    /// ```
    pub fn new(record: Record, transforms: &Vector<Transform>) -> Point {
        let base = record.base();
        Point {
            x: transforms.x.direct(base.x),
            y: transforms.y.direct(base.y),
            z: transforms.z.direct(base.z),
            intensity: base.intensity,
            return_number: base.return_number(),
            number_of_returns: base.number_of_returns(),
            scan_direction: base.scan_direction_flag().into(),
            is_edge_of_flight_line: base.is_edge_of_flight_line(),
            classification: base.class(),
            is_synthetic: base.is_synthetic(),
            is_key_point: base.is_key_point(),
            is_withheld: base.is_withheld(),
            scan_angle_rank: base.scan_angle_rank,
            user_data: base.user_data,
            point_source_id: base.point_source_id,
            gps_time: record.gps_time().unwrap_or(0.),
            color: record.color().unwrap_or_default(),
        }
    }

    /// Converts this point into a raw record in the given format.
    ///
    /// Fails if a bit field is out of range, if a coordinate cannot be quantized with its
    /// transform, or if the point sets a gps time or a color that the format cannot store.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::{Point, Transform, Vector, point::Format};
    /// let transforms = Vector::new(Transform::default(), Transform::default(), Transform::default());
    /// let point = Point { x: 1., gps_time: 42., ..Default::default() };
    /// let record = point.into_raw(Format::new(1).unwrap(), &transforms).unwrap();
    /// assert_eq!(100, record.base().x);
    /// assert!(point.into_raw(Format::new(0).unwrap(), &transforms).is_err());
    /// ```
    pub fn into_raw(&self, format: Format, transforms: &Vector<Transform>) -> Result<Record> {
        if self.return_number > THREE_BITS {
            return Err(Error::InvalidReturnNumber(self.return_number));
        }
        if self.number_of_returns > THREE_BITS {
            return Err(Error::InvalidNumberOfReturns(self.number_of_returns));
        }
        if self.classification > FIVE_BITS {
            return Err(Error::InvalidClassification(self.classification));
        }
        if !format.has_gps_time() && self.gps_time != 0. {
            return Err(Error::FieldNotInFormat {
                field: "gps time",
                format,
            });
        }
        if !format.has_color() && !self.color.is_black() {
            return Err(Error::FieldNotInFormat {
                field: "color",
                format,
            });
        }
        let base = Base {
            x: transforms.x.inverse(self.x)?,
            y: transforms.y.inverse(self.y)?,
            z: transforms.z.inverse(self.z)?,
            intensity: self.intensity,
            flags: self.flags(),
            classification: self.classification_byte(),
            scan_angle_rank: self.scan_angle_rank,
            user_data: self.user_data,
            point_source_id: self.point_source_id,
        };
        Ok(Record::new(format, base, self.gps_time, self.color))
    }

    fn flags(&self) -> u8 {
        let mut flags = self.return_number | (self.number_of_returns << 3);
        if bool::from(self.scan_direction) {
            flags |= 0b0100_0000;
        }
        if self.is_edge_of_flight_line {
            flags |= 0b1000_0000;
        }
        flags
    }

    fn classification_byte(&self) -> u8 {
        let mut byte = self.classification;
        if self.is_synthetic {
            byte |= 0b0010_0000;
        }
        if self.is_key_point {
            byte |= 0b0100_0000;
        }
        if self.is_withheld {
            byte |= 0b1000_0000;
        }
        byte
    }
}
