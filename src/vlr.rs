//! Variable length records are used to store additional metadata not defined in the header.
//!
//! Vlrs sit right after the header, before the point records, and contain arbitrary data:
//!
//! ```
//! use lasfile::Vlr;
//! let vlr = Vlr {
//!     user_id: "lasfile".to_string(),
//!     record_id: 42,
//!     description: "Some really important data".to_string(),
//!     data: vec![1, 2, 3],
//! };
//! assert_eq!(57, vlr.len());
//! ```
//!
//! A header keeps its vlrs in a [VlrStore], which only accepts new records until the header is
//! frozen.

use crate::{
    ByteCursor, Error, Result,
    crs::{self, SpatialReference},
    raw,
    utils::{AsLasStr, FromLasStr},
};
use std::io::{Read, Write};

/// A variable length record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vlr {
    /// The user that created this record.
    ///
    /// This value is often an official, "registered" user_id, such as "LASF_Spec" or
    /// "LASF_Projection".
    pub user_id: String,

    /// This value specifies the type of record, and depends on the user id.
    pub record_id: u16,

    /// Textual description of these data.
    pub description: String,

    /// The data themselves.
    pub data: Vec<u8>,
}

/// The ordered variable length records of a header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VlrStore {
    vlrs: Vec<Vlr>,
    frozen: bool,
}

impl Vlr {
    /// Creates a vlr from a raw vlr.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::{Vlr, raw};
    /// let vlr = Vlr::new(raw::Vlr::default()).unwrap();
    /// assert!(vlr.user_id.is_empty());
    /// ```
    pub fn new(raw_vlr: raw::Vlr) -> Result<Vlr> {
        Ok(Vlr {
            user_id: raw_vlr.user_id.as_las_str()?.to_string(),
            record_id: raw_vlr.record_id,
            description: raw_vlr.description.as_las_str()?.to_string(),
            data: raw_vlr.data,
        })
    }

    /// Converts this vlr to a raw vlr.
    ///
    /// Fails if the data are longer than a vlr can declare, or if a string does not fit in its
    /// field.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::Vlr;
    /// let raw_vlr = Vlr::default().into_raw().unwrap();
    /// assert_eq!(0, raw_vlr.record_length_after_header);
    /// ```
    pub fn into_raw(&self) -> Result<raw::Vlr> {
        let record_length_after_header =
            u16::try_from(self.data.len()).map_err(|_| Error::VlrDataTooLong(self.data.len()))?;
        let mut user_id = [0; 16];
        user_id.from_las_str(&self.user_id)?;
        let mut description = [0; 32];
        description.from_las_str(&self.description)?;
        Ok(raw::Vlr {
            reserved: 0,
            user_id,
            record_id: self.record_id,
            record_length_after_header,
            description,
            data: self.data.clone(),
        })
    }

    /// Returns the total length of this vlr, header and data.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::Vlr;
    /// assert_eq!(54, Vlr::default().len());
    /// ```
    pub fn len(&self) -> u64 {
        (raw::vlr::HEADER_SIZE + self.data.len()) as u64
    }

    /// Returns true if the data of this vlr are empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if this vlr holds spatial reference data.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::Vlr;
    /// let mut vlr = Vlr { user_id: "LASF_Projection".to_string(), record_id: 2112, ..Default::default() };
    /// assert!(vlr.is_spatial_reference());
    /// vlr.record_id = 1;
    /// assert!(!vlr.is_spatial_reference());
    /// ```
    pub fn is_spatial_reference(&self) -> bool {
        self.user_id == crs::PROJECTION_USER_ID && crs::RECORD_IDS.contains(&self.record_id)
    }
}

impl From<SpatialReference> for Vlr {
    fn from(spatial_reference: SpatialReference) -> Vlr {
        Vlr {
            user_id: crs::PROJECTION_USER_ID.to_string(),
            record_id: spatial_reference.record_id,
            description: String::new(),
            data: spatial_reference.data,
        }
    }
}

impl VlrStore {
    /// Creates a new, empty, unfrozen store.
    pub fn new() -> VlrStore {
        VlrStore::default()
    }

    /// Appends a vlr.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::{Vlr, vlr::VlrStore};
    /// let mut store = VlrStore::new();
    /// store.append(Vlr::default()).unwrap();
    /// assert_eq!(54, store.total_len());
    /// ```
    pub fn append(&mut self, vlr: Vlr) -> Result<()> {
        if self.frozen {
            return Err(Error::HeaderFrozen);
        }
        if vlr.data.len() > usize::from(u16::MAX) {
            return Err(Error::VlrDataTooLong(vlr.data.len()));
        }
        self.vlrs.push(vlr);
        Ok(())
    }

    /// Returns copies of the vlrs, in order.
    pub fn list(&self) -> Vec<Vlr> {
        self.vlrs.clone()
    }

    /// Returns an iterator over the vlrs, in order.
    pub fn iter(&self) -> impl Iterator<Item = &Vlr> {
        self.vlrs.iter()
    }

    /// Returns the number of vlrs.
    pub fn len(&self) -> usize {
        self.vlrs.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.vlrs.is_empty()
    }

    /// Returns the number of bytes the vlrs occupy in a file.
    pub fn total_len(&self) -> u64 {
        self.vlrs.iter().map(Vlr::len).sum()
    }

    /// Returns true if no more vlrs can be added or removed.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Returns a copy of the spatial reference record, if there is one.
    ///
    /// A WKT record is preferred over a GeoTIFF key directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::{crs::SpatialReference, vlr::VlrStore};
    /// let mut store = VlrStore::new();
    /// assert!(store.find_spatial_reference().is_none());
    /// store.append(SpatialReference::wkt("GEOGCS[]").into()).unwrap();
    /// assert_eq!(b"GEOGCS[]", store.find_spatial_reference().unwrap().data.as_slice());
    /// ```
    pub fn find_spatial_reference(&self) -> Option<SpatialReference> {
        let find = |record_id| {
            self.vlrs
                .iter()
                .find(|vlr| vlr.user_id == crs::PROJECTION_USER_ID && vlr.record_id == record_id)
        };
        find(crs::WKT_RECORD_ID)
            .or_else(|| find(crs::GEO_KEY_DIRECTORY_RECORD_ID))
            .map(|vlr| SpatialReference {
                record_id: vlr.record_id,
                data: vlr.data.clone(),
            })
    }

    /// Removes every spatial reference record, then appends this one.
    pub fn set_spatial_reference(&mut self, spatial_reference: SpatialReference) -> Result<()> {
        if self.frozen {
            return Err(Error::HeaderFrozen);
        }
        let vlr = Vlr::from(spatial_reference);
        if vlr.data.len() > usize::from(u16::MAX) {
            return Err(Error::VlrDataTooLong(vlr.data.len()));
        }
        self.vlrs.retain(|vlr| !vlr.is_spatial_reference());
        self.vlrs.push(vlr);
        Ok(())
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    pub(crate) fn thaw(&mut self) {
        self.frozen = false;
    }

    /// Reads `n` vlrs, which must fit into `declared` bytes.
    pub(crate) fn read_from<R: Read>(
        read: &mut ByteCursor<R>,
        n: u32,
        declared: u64,
    ) -> Result<VlrStore> {
        let mut vlrs = Vec::new();
        let mut actual = 0;
        for _ in 0..n {
            let vlr = Vlr::new(raw::Vlr::read_from(read)?)?;
            actual += vlr.len();
            if actual > declared {
                return Err(Error::VlrLengthMismatch { declared, actual });
            }
            vlrs.push(vlr);
        }
        Ok(VlrStore {
            vlrs,
            frozen: false,
        })
    }

    pub(crate) fn write_to<W: Write>(&self, write: &mut ByteCursor<W>) -> Result<()> {
        for vlr in &self.vlrs {
            vlr.into_raw()?.write_to(write)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn vlr(record_id: u16, len: usize) -> Vlr {
        Vlr {
            user_id: "lasfile".to_string(),
            record_id,
            description: "test".to_string(),
            data: vec![42; len],
        }
    }

    fn projection(record_id: u16) -> Vlr {
        Vlr {
            user_id: crs::PROJECTION_USER_ID.to_string(),
            record_id,
            description: String::new(),
            data: record_id.to_le_bytes().to_vec(),
        }
    }

    #[test]
    fn len() {
        assert_eq!(55, vlr(1, 1).len());
    }

    #[test]
    fn too_long() {
        let vlr = vlr(1, usize::from(u16::MAX) + 1);
        assert!(matches!(vlr.into_raw(), Err(Error::VlrDataTooLong(_))));
        let mut store = VlrStore::new();
        assert!(matches!(store.append(vlr), Err(Error::VlrDataTooLong(_))));
    }

    #[test]
    fn user_id_too_long() {
        let vlr = Vlr {
            user_id: "a user id longer than sixteen".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            vlr.into_raw(),
            Err(Error::StringTooLong { max: 16, .. })
        ));
    }

    #[test]
    fn append_keeps_order() {
        let mut store = VlrStore::new();
        for i in 0..3 {
            store.append(vlr(i, usize::from(i))).unwrap();
        }
        let ids: Vec<u16> = store.list().iter().map(|vlr| vlr.record_id).collect();
        assert_eq!(vec![0, 1, 2], ids);
        assert_eq!(3 * 54 + 3, store.total_len());
    }

    #[test]
    fn frozen() {
        let mut store = VlrStore::new();
        store.freeze();
        assert!(matches!(store.append(vlr(1, 1)), Err(Error::HeaderFrozen)));
        assert!(matches!(
            store.set_spatial_reference(SpatialReference::wkt("")),
            Err(Error::HeaderFrozen)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn list_is_a_copy() {
        let mut store = VlrStore::new();
        store.append(vlr(1, 1)).unwrap();
        let mut list = store.list();
        list[0].data.push(1);
        assert_eq!(1, store.iter().next().unwrap().data.len());
    }

    #[test]
    fn wkt_preferred() {
        let mut store = VlrStore::new();
        store
            .append(projection(crs::GEO_KEY_DIRECTORY_RECORD_ID))
            .unwrap();
        assert_eq!(
            crs::GEO_KEY_DIRECTORY_RECORD_ID,
            store.find_spatial_reference().unwrap().record_id
        );
        store.append(projection(crs::WKT_RECORD_ID)).unwrap();
        assert_eq!(
            crs::WKT_RECORD_ID,
            store.find_spatial_reference().unwrap().record_id
        );
    }

    #[test]
    fn ascii_params_alone_is_not_a_spatial_reference() {
        let mut store = VlrStore::new();
        store.append(projection(crs::GEO_ASCII_PARAMS_RECORD_ID)).unwrap();
        assert!(store.find_spatial_reference().is_none());
    }

    #[test]
    fn set_spatial_reference_replaces() {
        let mut store = VlrStore::new();
        store.append(vlr(1, 1)).unwrap();
        store
            .append(projection(crs::GEO_KEY_DIRECTORY_RECORD_ID))
            .unwrap();
        store
            .append(projection(crs::GEO_DOUBLE_PARAMS_RECORD_ID))
            .unwrap();
        store
            .set_spatial_reference(SpatialReference::wkt("PROJCS[]"))
            .unwrap();
        assert_eq!(2, store.len());
        assert_eq!(
            SpatialReference::wkt("PROJCS[]"),
            store.find_spatial_reference().unwrap()
        );
    }

    #[test]
    fn read_write() {
        let mut store = VlrStore::new();
        store.append(vlr(1, 3)).unwrap();
        store.append(projection(crs::WKT_RECORD_ID)).unwrap();
        let mut cursor = ByteCursor::new(Cursor::new(Vec::new()));
        store.write_to(&mut cursor).unwrap();
        assert_eq!(store.total_len(), cursor.position());
        let mut cursor = ByteCursor::new(Cursor::new(cursor.into_inner().into_inner()));
        let read = VlrStore::read_from(&mut cursor, 2, store.total_len()).unwrap();
        assert_eq!(store, read);
    }

    #[test]
    fn read_past_declared() {
        let mut store = VlrStore::new();
        store.append(vlr(1, 3)).unwrap();
        let mut cursor = ByteCursor::new(Cursor::new(Vec::new()));
        store.write_to(&mut cursor).unwrap();
        let mut cursor = ByteCursor::new(Cursor::new(cursor.into_inner().into_inner()));
        assert!(matches!(
            VlrStore::read_from(&mut cursor, 1, 56),
            Err(Error::VlrLengthMismatch {
                declared: 56,
                actual: 57
            })
        ));
    }
}
