//! Read and write [ASPRS LAS](https://www.asprs.org/committee-general/laser-las-file-format-exchange-activities.html)
//! point cloud data, versions 1.0 through 1.4 with point formats 0 through 3.
//!
//! # Sessions
//!
//! A [Session] opens a las file by path, either for reading or for writing. A path that is open
//! for writing can't be opened again, in either mode, until that session is closed:
//!
//! ```
//! use lasfile::{Mode, Point, Session};
//!
//! let dir = tempfile::TempDir::new().unwrap();
//! let path = dir.path().join("points.las");
//!
//! let mut session = Session::open(&path, Mode::Write, None).unwrap();
//! session.header_mut().unwrap().set_scale(0.001, 0.001, 0.001).unwrap();
//! session.write(&Point { x: 1., y: 2., z: 3., ..Default::default() }).unwrap();
//! session.close().unwrap();
//!
//! let mut session = Session::open(&path, Mode::Read, None).unwrap();
//! let point = session.read(None).unwrap().unwrap();
//! assert_eq!(3., point.z);
//! ```
//!
//! The header of a write session can change until the first point is written. After that it is
//! frozen, and the point counts and bounds are filled in when the session closes.
//!
//! # Reading
//!
//! A [Reader] works over anything that is `Read + Seek`:
//!
//! ```
//! use std::io::Cursor;
//! use lasfile::{Reader, Writer};
//!
//! let mut writer = Writer::new(Cursor::new(Vec::new()), Default::default()).unwrap();
//! writer.write_point(&Default::default()).unwrap();
//! let mut reader = Reader::new(writer.into_inner().unwrap()).unwrap();
//! for wrapped_point in reader.points() {
//!     let point = wrapped_point.unwrap();
//!     println!("Point coordinates: ({}, {}, {})", point.x, point.y, point.z);
//! }
//! ```
//!
//! ## Prefer `BufRead`
//!
//! Your performance will be better if your `Read` is actually a `BufRead`. `Reader::from_path`
//! and `Session` take care of this for you, but `Reader::new` doesn't.
//!
//! # Writing
//!
//! A [Writer] works over anything that is `Write + Seek`, since the header is rewritten once every
//! point is known:
//!
//! ```
//! use std::io::Cursor;
//! use lasfile::{Header, Point, Writer, point::Format};
//!
//! let mut header = Header::default();
//! header.set_version((1, 4).into()).unwrap();
//! header.set_point_format(Format::new(2).unwrap()).unwrap();
//! let mut writer = Writer::new(Cursor::new(Vec::new()), header).unwrap();
//! writer.write_point(&Point { x: 1., y: 2., z: 3., ..Default::default() }).unwrap();
//! writer.close().unwrap();
//! ```
//!
//! # Spatial reference
//!
//! Projection information lives in vlrs, and this crate never interprets it. Give a session a
//! [CrsService] to turn those vlrs into projection strings, see the [crs] module.

#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

pub mod crs;
pub mod feature;
pub mod header;
pub mod point;
pub mod raw;
pub mod reader;
pub mod registry;
pub mod session;
pub mod vlr;
pub mod writer;

mod bounds;
mod color;
mod cursor;
mod error;
mod gps_time_type;
mod transform;
mod utils;
mod vector;
mod version;

pub use bounds::Bounds;
pub use color::Color;
pub use crs::CrsService;
pub use cursor::ByteCursor;
pub use error::Error;
pub use feature::Feature;
pub use gps_time_type::GpsTimeType;
pub use header::Header;
pub use point::Point;
pub use reader::Reader;
pub use registry::Registry;
pub use session::{Mode, Session, SessionOptions, SessionState};
pub use transform::Transform;
pub use vector::Vector;
pub use version::Version;
pub use vlr::Vlr;
pub use writer::Writer;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;
