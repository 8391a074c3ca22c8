/// The meaning of gps time in the point records, stored in bit 0 of the global encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GpsTimeType {
    /// Gps week time, the only choice before las 1.2.
    #[default]
    Week,

    /// Standard gps time minus 1e9.
    Standard,
}

const STANDARD_BIT: u16 = 1;

impl GpsTimeType {
    /// Returns true if this time type is gps standard time.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::GpsTimeType;
    /// assert!(!GpsTimeType::Week.is_standard());
    /// assert!(GpsTimeType::Standard.is_standard());
    /// ```
    pub fn is_standard(&self) -> bool {
        *self == GpsTimeType::Standard
    }
}

impl From<u16> for GpsTimeType {
    fn from(global_encoding: u16) -> GpsTimeType {
        if global_encoding & STANDARD_BIT == STANDARD_BIT {
            GpsTimeType::Standard
        } else {
            GpsTimeType::Week
        }
    }
}

impl From<GpsTimeType> for u16 {
    fn from(gps_time_type: GpsTimeType) -> u16 {
        match gps_time_type {
            GpsTimeType::Week => 0,
            GpsTimeType::Standard => STANDARD_BIT,
        }
    }
}
