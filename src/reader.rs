//! Read las points.
//!
//! A [Reader] works over anything that is `Read + Seek`. If you're reading any significant number
//! of points, you'll want to make sure that's a `BufRead`, which `Reader::from_path` does for you.
//!
//! Use `Reader::read_point` to read one point, and `Reader::points` to get an iterator over
//! `Result<Point>`:
//!
//! ```
//! use std::io::Cursor;
//! use lasfile::{Point, Reader, Writer};
//!
//! let mut writer = Writer::new(Cursor::new(Vec::new()), Default::default()).unwrap();
//! for i in 0..3 {
//!     writer.write_point(&Point { x: f64::from(i), ..Default::default() }).unwrap();
//! }
//! let mut reader = Reader::new(writer.into_inner().unwrap()).unwrap();
//! let first_point = reader.read_point().unwrap().unwrap();
//! let the_rest = reader.points().collect::<Result<Vec<_>, _>>().unwrap();
//! assert_eq!(2, the_rest.len());
//! ```
//!
//! Sequential reads go strictly in file order. `Reader::read_point_at` reads any single point
//! without moving the sequential position.

use crate::{ByteCursor, Error, Header, Point, Result, raw::point::Record};
use log::{Level, log};
use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
};

/// No more than this many points are reserved up front by a bulk read.
const MAX_RESERVED_POINTS: u64 = 1 << 16;

/// Reads las data.
#[derive(Debug)]
pub struct Reader<R: Read + Seek> {
    header: Header,
    index: u64,
    read: ByteCursor<R>,
    start: u64,
}

/// An iterator over of the points in a `Reader`.
///
/// This struct is generally created by calling `points()` on `Reader`.
#[derive(Debug)]
pub struct PointIterator<'a, R: Read + Seek> {
    reader: &'a mut Reader<R>,
}

impl Reader<BufReader<File>> {
    /// Creates a new reader from a path.
    ///
    /// The underlying `File` is wrapped in a `BufReader` for performance reasons.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Reader<BufReader<File>>> {
        File::open(path)
            .map_err(Error::from)
            .and_then(|file| Reader::new(BufReader::new(file)))
    }
}

impl<R: Read + Seek> Reader<R> {
    /// Creates a new reader.
    ///
    /// The header is read from the stream's current position, and the reader is left at the first
    /// point. The header is frozen.
    pub fn new(read: R) -> Result<Reader<R>> {
        let mut read = ByteCursor::at_current_position(read)?;
        let origin = read.position();
        let mut header = Header::read_from(&mut read)?;
        header.freeze();
        let start = origin + header.offset_to_point_data();
        read.seek(start)?;
        log!(
            Level::Debug,
            "read las {} header with {} points in format {}",
            header.version(),
            header.number_of_points(),
            header.point_format()
        );
        Ok(Reader {
            header,
            index: 0,
            read,
            start,
        })
    }

    /// Returns a reference to this reader's header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the index of the next point that `read_point` will return.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Reads a point.
    ///
    /// Returns `None` once every point has been read. A read that fails leaves the reader at the
    /// start of the same point, so it can be retried.
    pub fn read_point(&mut self) -> Result<Option<Point>> {
        if self.index >= self.header.number_of_points() {
            return Ok(None);
        }
        match Record::read_from(&mut self.read, self.header.point_format()) {
            Ok(record) => {
                self.index += 1;
                Ok(Some(Point::new(record, self.header.transforms())))
            }
            Err(err) => {
                let rewind = self
                    .offset_of(self.index)
                    .and_then(|offset| self.read.seek(offset));
                if let Err(rewind_err) = rewind {
                    log!(Level::Warn, "could not rewind after a failed read: {rewind_err}");
                }
                Err(err)
            }
        }
    }

    /// Reads up to `n` points into a vector.
    pub fn read_points(&mut self, n: u64) -> Result<Vec<Point>> {
        let mut points = Vec::new();
        let _ = self.read_points_into(n, &mut points)?;
        Ok(points)
    }

    /// Reads up to `n` points into a provided vector, returning the number of points read.
    pub fn read_points_into(&mut self, n: u64, points: &mut Vec<Point>) -> Result<u64> {
        let points_left = self.header.number_of_points() - self.index;
        let n = points_left.min(n);
        if let Ok(reserve) = usize::try_from(n.min(MAX_RESERVED_POINTS)) {
            points.reserve(reserve);
        }
        let mut count = 0;
        while count < n {
            match self.read_point()? {
                Some(point) => points.push(point),
                None => break,
            }
            count += 1;
        }
        Ok(count)
    }

    /// Reads all remaining points into a vector, returning the number of points read.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasfile::{Reader, Writer};
    /// let mut writer = Writer::new(Cursor::new(Vec::new()), Default::default()).unwrap();
    /// writer.write_point(&Default::default()).unwrap();
    /// let mut reader = Reader::new(writer.into_inner().unwrap()).unwrap();
    /// let mut points = Vec::new();
    /// assert_eq!(1, reader.read_all_points_into(&mut points).unwrap());
    /// ```
    pub fn read_all_points_into(&mut self, points: &mut Vec<Point>) -> Result<u64> {
        let point_count = self.header.number_of_points();
        self.read_points_into(point_count, points)
    }

    /// Seeks to the given point number, zero-indexed.
    ///
    /// Seeking to the number of points is allowed, and leaves nothing to read.
    pub fn seek(&mut self, index: u64) -> Result<()> {
        let number_of_points = self.header.number_of_points();
        if index > number_of_points {
            return Err(Error::IndexOutOfRange {
                index,
                number_of_points,
            });
        }
        self.read.seek(self.offset_of(index)?)?;
        self.index = index;
        Ok(())
    }

    /// Reads the point at the given index, zero-indexed.
    ///
    /// The next sequential read is not affected.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasfile::{Point, Reader, Writer};
    /// let mut writer = Writer::new(Cursor::new(Vec::new()), Default::default()).unwrap();
    /// writer.write_point(&Point { x: 1., ..Default::default() }).unwrap();
    /// writer.write_point(&Point { x: 2., ..Default::default() }).unwrap();
    /// let mut reader = Reader::new(writer.into_inner().unwrap()).unwrap();
    /// assert_eq!(2., reader.read_point_at(1).unwrap().x);
    /// assert_eq!(1., reader.read_point().unwrap().unwrap().x);
    /// assert!(reader.read_point_at(2).is_err());
    /// ```
    pub fn read_point_at(&mut self, index: u64) -> Result<Point> {
        let number_of_points = self.header.number_of_points();
        if index >= number_of_points {
            return Err(Error::IndexOutOfRange {
                index,
                number_of_points,
            });
        }
        let offset = self.offset_of(index)?;
        let position = self.read.position();
        self.read.seek(offset)?;
        let record = Record::read_from(&mut self.read, self.header.point_format());
        self.read.seek(position)?;
        Ok(Point::new(record?, self.header.transforms()))
    }

    /// Returns an iterator over this reader's remaining points.
    pub fn points(&mut self) -> PointIterator<'_, R> {
        PointIterator { reader: self }
    }

    /// Consumes this reader, returning the underlying stream.
    pub fn into_inner(self) -> R {
        self.read.into_inner()
    }

    fn offset_of(&self, index: u64) -> Result<u64> {
        index
            .checked_mul(u64::from(self.header.point_record_len()))
            .and_then(|offset| offset.checked_add(self.start))
            .ok_or_else(|| {
                Error::MalformedHeader(format!(
                    "point {index} of {} lies past the largest addressable offset",
                    self.header.number_of_points()
                ))
            })
    }
}

impl<R: Read + Seek> Iterator for PointIterator<'_, R> {
    type Item = Result<Point>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_point().transpose()
    }
}
