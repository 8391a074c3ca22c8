//! Spatial reference records and the service that interprets them.
//!
//! Las stores its coordinate reference system in vlrs with the user id `LASF_Projection`, either
//! as [WKT](https://en.wikipedia.org/wiki/Well-known_text_representation_of_geometry) or as
//! [GeoTiff keys](https://docs.ogc.org/is/19-008r4/19-008r4.html). This crate never parses those
//! payloads. A [CrsService] turns a [SpatialReference] into a projection string and back, and a
//! session without one simply reports that no projection is available.
//!
//! [WktCrsService] is the simplest possible service, which passes WKT text through unchanged:
//!
//! ```
//! use lasfile::crs::{CrsService, SpatialReference, WktCrsService};
//! let spatial_reference = WktCrsService.proj_string_to_blob("GEOGCS[\"WGS 84\"]").unwrap();
//! assert_eq!(2112, spatial_reference.record_id);
//! assert_eq!("GEOGCS[\"WGS 84\"]", WktCrsService.blob_to_proj_string(&spatial_reference).unwrap());
//! ```

use crate::{Error, Result, vlr::VlrStore};
use log::{Level, log};
use std::fmt::Debug;

/// The user id of every spatial reference vlr.
pub const PROJECTION_USER_ID: &str = "LASF_Projection";

/// OGC coordinate system WKT.
pub const WKT_RECORD_ID: u16 = 2112;

/// GeoTiff GeoKeyDirectoryTag.
pub const GEO_KEY_DIRECTORY_RECORD_ID: u16 = 34735;

/// GeoTiff GeoDoubleParamsTag.
pub const GEO_DOUBLE_PARAMS_RECORD_ID: u16 = 34736;

/// GeoTiff GeoAsciiParamsTag.
pub const GEO_ASCII_PARAMS_RECORD_ID: u16 = 34737;

/// Every record id that marks a spatial reference vlr.
pub const RECORD_IDS: [u16; 4] = [
    WKT_RECORD_ID,
    GEO_KEY_DIRECTORY_RECORD_ID,
    GEO_DOUBLE_PARAMS_RECORD_ID,
    GEO_ASCII_PARAMS_RECORD_ID,
];

/// The error type a [CrsService] may return.
pub type ServiceError = Box<dyn std::error::Error + Send + Sync>;

/// An opaque spatial reference payload and the record id it is stored under.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpatialReference {
    /// The record id of the vlr, which tells the service how to read `data`.
    pub record_id: u16,

    /// The vlr data.
    pub data: Vec<u8>,
}

/// Converts spatial reference payloads to and from projection strings.
pub trait CrsService: Debug + Send + Sync {
    /// Describes a stored spatial reference as a projection string.
    fn blob_to_proj_string(
        &self,
        spatial_reference: &SpatialReference,
    ) -> std::result::Result<String, ServiceError>;

    /// Builds the spatial reference payload for a projection string.
    fn proj_string_to_blob(
        &self,
        proj_string: &str,
    ) -> std::result::Result<SpatialReference, ServiceError>;
}

/// Stores projection strings as WKT records, byte for byte.
///
/// GeoTiff keys cannot be described, so asking for their projection string is an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct WktCrsService;

impl SpatialReference {
    /// Creates a WKT spatial reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::crs::SpatialReference;
    /// let spatial_reference = SpatialReference::wkt("GEOGCS[]");
    /// assert!(spatial_reference.is_wkt());
    /// ```
    pub fn wkt(wkt: &str) -> SpatialReference {
        SpatialReference {
            record_id: WKT_RECORD_ID,
            data: wkt.as_bytes().to_vec(),
        }
    }

    /// Is this a WKT record?
    pub fn is_wkt(&self) -> bool {
        self.record_id == WKT_RECORD_ID
    }
}

impl CrsService for WktCrsService {
    fn blob_to_proj_string(
        &self,
        spatial_reference: &SpatialReference,
    ) -> std::result::Result<String, ServiceError> {
        if !spatial_reference.is_wkt() {
            return Err(format!(
                "cannot describe a spatial reference with record id {}",
                spatial_reference.record_id
            )
            .into());
        }
        let wkt = std::str::from_utf8(&spatial_reference.data)?;
        Ok(wkt.trim_end_matches('\0').to_string())
    }

    fn proj_string_to_blob(
        &self,
        proj_string: &str,
    ) -> std::result::Result<SpatialReference, ServiceError> {
        Ok(SpatialReference::wkt(proj_string))
    }
}

/// Returns the projection string of the vlrs' spatial reference.
///
/// Without a service, or without a spatial reference, there is no projection string.
pub(crate) fn proj_string(
    service: Option<&dyn CrsService>,
    vlrs: &VlrStore,
) -> Result<Option<String>> {
    let Some(spatial_reference) = vlrs.find_spatial_reference() else {
        return Ok(None);
    };
    let Some(service) = service else {
        log!(
            Level::Warn,
            "spatial reference record {} found, but there is no crs service to read it",
            spatial_reference.record_id
        );
        return Ok(None);
    };
    service
        .blob_to_proj_string(&spatial_reference)
        .map(Some)
        .map_err(|err| {
            log!(Level::Warn, "crs service could not read spatial reference: {err}");
            Error::Crs(err)
        })
}

/// Replaces the vlrs' spatial reference with the one for this projection string.
///
/// Returns false, and leaves the vlrs alone, if there is no service.
pub(crate) fn set_proj_string(
    service: Option<&dyn CrsService>,
    vlrs: &mut VlrStore,
    proj_string: &str,
) -> Result<bool> {
    let Some(service) = service else {
        log!(
            Level::Warn,
            "no crs service, so the projection string was not stored"
        );
        return Ok(false);
    };
    if vlrs.is_frozen() {
        return Err(Error::HeaderFrozen);
    }
    let spatial_reference = service.proj_string_to_blob(proj_string).map_err(|err| {
        log!(Level::Warn, "crs service could not store \"{proj_string}\": {err}");
        Error::Crs(err)
    })?;
    vlrs.set_spatial_reference(spatial_reference)?;
    Ok(true)
}
