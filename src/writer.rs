//! Write las points.
//!
//! A [Writer] uses a [Header] for its configuration. The header can still be changed through
//! `Writer::header_mut` until the first point is written. Then it is validated, frozen, and
//! written to the stream, and `header_mut` fails from then on:
//!
//! ```
//! use std::io::Cursor;
//! use lasfile::{Error, Point, Writer, point::Format};
//!
//! let mut writer = Writer::new(Cursor::new(Vec::new()), Default::default()).unwrap();
//! writer.header_mut().unwrap().set_point_format(Format::new(1).unwrap()).unwrap();
//! writer.write_point(&Point { gps_time: 42., ..Default::default() }).unwrap();
//! assert!(matches!(writer.header_mut(), Err(Error::HeaderFrozen)));
//! ```
//!
//! A point may not set a field that the point format cannot store:
//!
//! ```
//! use std::io::Cursor;
//! use lasfile::{Color, Point, Writer};
//!
//! let mut writer = Writer::new(Cursor::new(Vec::new()), Default::default()).unwrap();
//! let point = Point { color: Color::new(1, 2, 3), ..Default::default() };
//! assert!(writer.write_point(&point).is_err()); // point format 0 has no color
//! ```
//!
//! The point count, the points by return, and the bounds are only known once every point is
//! written, so `Writer::close` goes back and rewrites the header. A writer that is dropped without
//! being closed leaves a stale header behind.

use crate::{Bounds, ByteCursor, Error, Header, Point, Result, feature::LargeFiles};
use log::{Level, log};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufWriter, Seek, Write},
    path::Path,
};

/// Writes las data.
#[derive(Debug)]
pub struct Writer<W: Write + Seek> {
    bounds: Bounds,
    closed: bool,
    header: Header,
    header_written: bool,
    number_of_points: u64,
    number_of_points_by_return: HashMap<u8, u64>,
    start: u64,
    write: Option<ByteCursor<W>>,
}

impl Writer<BufWriter<File>> {
    /// Creates a new writer for a path, truncating any existing file.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::Writer;
    /// let writer = Writer::from_path("/dev/null", Default::default());
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P, header: Header) -> Result<Writer<BufWriter<File>>> {
        File::create(path)
            .map_err(Error::from)
            .and_then(|file| Writer::new(BufWriter::new(file), header))
    }
}

impl<W: Write + Seek> Writer<W> {
    /// Creates a new writer.
    ///
    /// The header that is passed in is used as a template: its point counts are cleared and it is
    /// not frozen. Nothing is written until the first point, or until the writer is closed.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasfile::Writer;
    /// let writer = Writer::new(Cursor::new(Vec::new()), Default::default()).unwrap();
    /// ```
    pub fn new(write: W, header: Header) -> Result<Writer<W>> {
        let write = ByteCursor::at_current_position(write)?;
        Ok(Writer {
            bounds: Bounds::default(),
            closed: false,
            header: header.into_template(),
            header_written: false,
            number_of_points: 0,
            number_of_points_by_return: HashMap::new(),
            start: write.position(),
            write: Some(write),
        })
    }

    /// Returns a reference to this writer's header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns a mutable reference to this writer's header.
    ///
    /// Fails with [Error::HeaderFrozen] once the header has been written, and with
    /// [Error::ClosedSession] once the writer is closed.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasfile::{Error, Header, Writer};
    /// let mut writer = Writer::new(Cursor::new(Vec::new()), Default::default()).unwrap();
    /// *writer.header_mut().unwrap() = Header::default();
    /// writer.write_point(&Default::default()).unwrap();
    /// assert!(matches!(writer.header_mut(), Err(Error::HeaderFrozen)));
    /// ```
    pub fn header_mut(&mut self) -> Result<&mut Header> {
        if self.closed {
            Err(Error::ClosedSession)
        } else if self.header_written {
            Err(Error::HeaderFrozen)
        } else {
            Ok(&mut self.header)
        }
    }

    /// Returns true once the header has been written, after which it can no longer change.
    pub fn is_header_written(&self) -> bool {
        self.header_written
    }

    /// Returns the number of points written so far.
    pub fn number_of_points(&self) -> u64 {
        self.number_of_points
    }

    /// Returns true if this writer has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Writes a point.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasfile::Writer;
    /// let mut writer = Writer::new(Cursor::new(Vec::new()), Default::default()).unwrap();
    /// writer.write_point(&Default::default()).unwrap();
    /// ```
    pub fn write_point(&mut self, point: &Point) -> Result<()> {
        if self.closed {
            return Err(Error::ClosedSession);
        }
        if !self.header_written {
            self.write_header()?;
        }
        if !self.header.version().supports::<LargeFiles>()
            && self.number_of_points >= u64::from(u32::MAX)
        {
            return Err(self.header.too_many_points(self.number_of_points + 1));
        }
        let record = point.into_raw(self.header.point_format(), self.header.transforms())?;
        record.write_to(self.stream()?)?;
        self.number_of_points += 1;
        if point.return_number > 0 {
            *self
                .number_of_points_by_return
                .entry(point.return_number)
                .or_insert(0) += 1;
        }
        self.bounds
            .grow(&Point::new(record, self.header.transforms()));
        Ok(())
    }

    /// Writes all the points, in order.
    ///
    /// Stops at the first point that fails. The points before it stay written.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasfile::{Point, Writer};
    /// let mut writer = Writer::new(Cursor::new(Vec::new()), Default::default()).unwrap();
    /// writer.write_points(&[Point::default(), Point::default()]).unwrap();
    /// assert_eq!(2, writer.number_of_points());
    /// ```
    pub fn write_points(&mut self, points: &[Point]) -> Result<()> {
        for point in points {
            self.write_point(point)?;
        }
        Ok(())
    }

    /// Closes this writer.
    ///
    /// The header is rewritten with the final point counts and bounds, and the stream is flushed.
    /// Closing a closed writer does nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasfile::Writer;
    /// let mut writer = Writer::new(Cursor::new(Vec::new()), Default::default()).unwrap();
    /// writer.close().unwrap();
    /// writer.close().unwrap();
    /// assert!(writer.write_point(&Default::default()).is_err());
    /// ```
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if !self.header_written {
            self.write_header()?;
        }
        let bounds = (self.number_of_points > 0).then_some(self.bounds);
        self.header.set_point_statistics(
            self.number_of_points,
            self.number_of_points_by_return.clone(),
            bounds,
        );
        let start = self.start;
        let raw_header = self.header.to_raw()?;
        let write = self.stream()?;
        let end = write.position();
        write.seek(start)?;
        raw_header.write_to(write)?;
        write.seek(end)?;
        write.flush()?;
        self.closed = true;
        log!(
            Level::Debug,
            "closed writer after {} points",
            self.number_of_points
        );
        Ok(())
    }

    /// Closes this writer and returns its inner stream, seeked to the beginning of the las data.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasfile::Writer;
    /// let writer = Writer::new(Cursor::new(Vec::new()), Default::default()).unwrap();
    /// let cursor = writer.into_inner().unwrap();
    /// assert_eq!(227, cursor.get_ref().len());
    /// ```
    pub fn into_inner(mut self) -> Result<W> {
        self.close()?;
        let mut write = self.write.take().ok_or(Error::ClosedSession)?;
        write.seek(self.start)?;
        Ok(write.into_inner())
    }

    fn stream(&mut self) -> Result<&mut ByteCursor<W>> {
        self.write.as_mut().ok_or(Error::ClosedSession)
    }

    fn write_header(&mut self) -> Result<()> {
        self.header.validate()?;
        self.header.freeze();
        let start = self.start;
        let write = self.write.as_mut().ok_or(Error::ClosedSession)?;
        write.seek(start)?;
        self.header.write_to(write)?;
        self.header_written = true;
        log!(
            Level::Debug,
            "wrote las {} header for point format {}",
            self.header.version(),
            self.header.point_format()
        );
        Ok(())
    }
}

impl<W: Write + Seek> Drop for Writer<W> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Some(write) = self.write.as_mut() {
            log!(
                Level::Warn,
                "writer dropped without being closed, so the header does not count its {} points",
                self.number_of_points
            );
            if let Err(err) = write.flush() {
                log!(Level::Warn, "could not flush dropped writer: {err}");
            }
        }
    }
}
