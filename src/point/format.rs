use crate::{Error, Result, raw::point::BASE_LEN};
use std::fmt;

const GPS_TIME_LEN: u16 = 8;
const COLOR_LEN: u16 = 6;

/// Point data record format.
///
/// Only formats zero through three are supported, so a `Format` always holds one of those ids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Format(u8);

impl Format {
    /// Creates a new point format from its id.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasfile::point::Format;
    /// let format = Format::new(1).unwrap();
    /// assert!(format.has_gps_time());
    /// assert!(Format::new(4).is_err());
    /// ```
    pub fn new(n: u8) -> Result<Format> {
        if n <= 3 {
            Ok(Format(n))
        } else {
            Err(Error::InvalidPointFormat(n))
        }
    }

    pub(crate) fn from_id(n: u8) -> Format {
        debug_assert!(n <= 3);
        Format(n)
    }

    /// Does this point format have a gps time?
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasfile::point::Format;
    /// assert!(!Format::new(0).unwrap().has_gps_time());
    /// assert!(Format::new(3).unwrap().has_gps_time());
    /// ```
    pub fn has_gps_time(&self) -> bool {
        self.0 == 1 || self.0 == 3
    }

    /// Does this point format have red, green, and blue channels?
    pub fn has_color(&self) -> bool {
        self.0 >= 2
    }

    /// Returns the length, in bytes, of one point record in this format.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasfile::point::Format;
    /// assert_eq!(20, Format::new(0).unwrap().len());
    /// assert_eq!(34, Format::new(3).unwrap().len());
    /// ```
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u16 {
        let mut len = BASE_LEN;
        if self.has_gps_time() {
            len += GPS_TIME_LEN;
        }
        if self.has_color() {
            len += COLOR_LEN;
        }
        len
    }

    /// Returns this format's id.
    pub fn to_u8(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Format {
    type Error = Error;

    fn try_from(n: u8) -> Result<Format> {
        Format::new(n)
    }
}

impl From<Format> for u8 {
    fn from(format: Format) -> u8 {
        format.0
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! point_format {
        ($name:ident, $id:expr, $gps_time:expr, $color:expr, $len:expr) => {
            #[test]
            fn $name() {
                let format = Format::new($id).unwrap();
                assert_eq!($gps_time, format.has_gps_time());
                assert_eq!($color, format.has_color());
                assert_eq!($len, format.len());
                assert_eq!($id, u8::from(format));
            }
        };
    }

    point_format!(format_0, 0, false, false, 20);
    point_format!(format_1, 1, true, false, 28);
    point_format!(format_2, 2, false, true, 26);
    point_format!(format_3, 3, true, true, 34);

    #[test]
    fn unsupported() {
        for n in 4..=u8::MAX {
            assert!(matches!(Format::new(n), Err(Error::InvalidPointFormat(m)) if m == n));
        }
    }
}
