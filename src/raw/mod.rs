//! Raw structures that map directly onto structures as defined in the las format specifications.
//!
//! In general, these structures are "dumb", meaning that they do the least amount of validity
//! checking needed to get the bytes in and out. For example:
//!
//! ```
//! let raw_header = lasfile::raw::Header::default();
//! assert_eq!(0., raw_header.x_scale_factor);
//!
//! let header = lasfile::Header::default();
//! assert_eq!(0.01, header.transforms().x.scale);
//! ```
//!
//! Users should prefer the non-raw versions, e.g. `lasfile::Header` over `lasfile::raw::Header`,
//! since those enforce the rules.

pub mod header;
pub mod point;
pub mod vlr;

pub use self::header::Header;
pub use self::point::Record;
pub use self::vlr::Vlr;

/// The file magic number used for all las files.
pub const LASF: [u8; 4] = *b"LASF";
