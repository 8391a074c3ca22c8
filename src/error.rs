use crate::{Transform, Version, point::Format, session::Mode};
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-specific error enum.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The header bytes could not be a las header.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// This version pair is not one we know how to read or write.
    #[error("unsupported las version: {0}")]
    UnsupportedVersion(Version),

    /// This version does not support the feature.
    #[error("las {version} does not support {feature}")]
    UnsupportedFeature {
        /// The las version.
        version: Version,
        /// The name of the feature.
        feature: &'static str,
    },

    /// The point data format id is not 0, 1, 2, or 3.
    #[error("invalid point format: {0}")]
    InvalidPointFormat(u8),

    /// The declared point data record length does not match the point format.
    #[error("point format {format} requires records of {expected} bytes, but the header declares {found}")]
    FormatLengthMismatch {
        /// The point format.
        format: Format,
        /// The length implied by the format.
        expected: u16,
        /// The length declared in the header.
        found: u16,
    },

    /// A scale factor is zero or not finite.
    #[error("invalid {axis} scale factor: {scale}")]
    InvalidScale {
        /// The axis, `x`, `y`, or `z`.
        axis: char,
        /// The offending scale factor.
        scale: f64,
    },

    /// The header cannot change because points have already been written.
    #[error("the header is frozen")]
    HeaderFrozen,

    /// The vlr region does not add up to what was declared.
    #[error("vlr length mismatch: declared {declared} bytes, found {actual}")]
    VlrLengthMismatch {
        /// The number of bytes declared.
        declared: u64,
        /// The number of bytes actually present.
        actual: u64,
    },

    /// The vlr data are too long to fit in a (non-extended) vlr.
    #[error("the vlr data are too long: {0} bytes")]
    VlrDataTooLong(usize),

    /// The stream ended before a value could be read.
    #[error("unexpected end of stream at byte {position}")]
    UnexpectedEof {
        /// The offset at which the read started.
        position: u64,
    },

    /// The path is already open in another session.
    #[error("file is already open: {}", .0.display())]
    FileAlreadyOpen(PathBuf),

    /// The point index is past the end of the points.
    #[error("point index {index} is out of range (number of points: {number_of_points})")]
    IndexOutOfRange {
        /// The requested index.
        index: u64,
        /// The number of points in the file.
        number_of_points: u64,
    },

    /// The session (or writer) is closed.
    #[error("the session is closed")]
    ClosedSession,

    /// The operation is not available for this session's mode.
    #[error("cannot {operation} in {mode:?} mode")]
    InvalidMode {
        /// The session's mode.
        mode: Mode,
        /// What was attempted.
        operation: &'static str,
    },

    /// The point has a value for a field that the point format cannot store.
    #[error("point format {format} has no {field}, but the point sets it")]
    FieldNotInFormat {
        /// The field name.
        field: &'static str,
        /// The point format.
        format: Format,
    },

    /// The return number does not fit in three bits.
    #[error("invalid return number: {0}")]
    InvalidReturnNumber(u8),

    /// The number of returns does not fit in three bits.
    #[error("invalid number of returns: {0}")]
    InvalidNumberOfReturns(u8),

    /// The classification does not fit in five bits.
    #[error("invalid classification: {0}")]
    InvalidClassification(u8),

    /// The value cannot be represented as an `i32` with this transform.
    #[error("the transform {transform} cannot be inversely applied to {value}")]
    InverseTransform {
        /// The float value.
        value: f64,
        /// The transform.
        transform: Transform,
    },

    /// A string is too long for its fixed-size field.
    #[error("string is longer than {max} bytes: {value}")]
    StringTooLong {
        /// The string.
        value: String,
        /// The size of the field.
        max: usize,
    },

    /// A file creation date whose year does not fit the header's two-byte field.
    #[error("file creation date is outside the years 0 through 65535: {0}")]
    InvalidDate(NaiveDate),

    /// This version cannot count this many points.
    #[error("las {version} cannot hold {count} points")]
    TooManyPoints {
        /// The las version.
        version: Version,
        /// The number of points.
        count: u64,
    },

    /// The project id could not be parsed as a GUID.
    #[error(transparent)]
    InvalidGuid(#[from] uuid::Error),

    /// The coordinate reference system service failed.
    #[error("crs service error: {0}")]
    Crs(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// [std::str::Utf8Error]
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),

    /// [std::io::Error]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
