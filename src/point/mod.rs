//! Three-dimensional points with additional attributes.
//!
//! [decode] and [encode] move a single point between its typed form and the bytes of one
//! record. The point format is never stored in the record itself, so the caller supplies it
//! (usually from the header) along with the coordinate transforms:
//!
//! ```
//! use lasfile::{Point, Transform, Vector, point::{self, Format}};
//!
//! let transforms = Vector::new(Transform::default(), Transform::default(), Transform::default());
//! let format = Format::new(3).unwrap();
//! let point = Point { x: 2., gps_time: 7., ..Default::default() };
//! let bytes = point::encode(&point, format, &transforms).unwrap();
//! assert_eq!(34, bytes.len());
//! assert_eq!(point, point::decode(&bytes, format, &transforms).unwrap());
//! ```

mod format;
#[allow(clippy::module_inception)]
mod point;
mod scan_direction;

pub use self::format::Format;
pub use self::point::Point;
pub use self::scan_direction::ScanDirection;

use crate::{ByteCursor, Error, Result, Transform, Vector, raw::point::Record};
use std::io::Cursor;

/// Decodes one point record.
///
/// `bytes` must hold exactly one record of the given format.
pub fn decode(bytes: &[u8], format: Format, transforms: &Vector<Transform>) -> Result<Point> {
    let found = u16::try_from(bytes.len()).unwrap_or(u16::MAX);
    if found > format.len() {
        return Err(Error::FormatLengthMismatch {
            format,
            expected: format.len(),
            found,
        });
    }
    let mut cursor = ByteCursor::new(Cursor::new(bytes));
    let record = Record::read_from(&mut cursor, format)?;
    Ok(Point::new(record, transforms))
}

/// Encodes one point record.
pub fn encode(point: &Point, format: Format, transforms: &Vector<Transform>) -> Result<Vec<u8>> {
    let record = point.into_raw(format, transforms)?;
    let mut cursor = ByteCursor::new(Cursor::new(Vec::with_capacity(usize::from(format.len()))));
    record.write_to(&mut cursor)?;
    Ok(cursor.into_inner().into_inner())
}
