use crate::{Error, Result, feature::Feature};
use std::fmt;

/// LAS version.
///
/// Only versions 1.0 through 1.4 are supported. A `Version` can hold any pair of numbers, so that
/// a header can report the version it found before rejecting it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// The major version.
    ///
    /// For now, always 1.
    pub major: u8,

    /// The minor version.
    pub minor: u8,
}

impl Version {
    /// Creates a new version.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasfile::Version;
    /// let version = Version::new(1, 2);
    /// ```
    pub fn new(major: u8, minor: u8) -> Version {
        Version { major, minor }
    }

    /// Is this version one that can be read and written?
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasfile::Version;
    /// assert!(Version::new(1, 2).is_supported());
    /// assert!(!Version::new(1, 5).is_supported());
    /// assert!(!Version::new(2, 0).is_supported());
    /// ```
    pub fn is_supported(&self) -> bool {
        self.major == 1 && self.minor <= 4
    }

    /// Returns an error if this version cannot be read or written.
    pub fn verify_supported(&self) -> Result<()> {
        if self.is_supported() {
            Ok(())
        } else {
            Err(Error::UnsupportedVersion(*self))
        }
    }

    /// Checks whether this version supports the feature.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasfile::{Version, feature::Waveforms};
    /// assert!(!Version::new(1, 2).supports::<Waveforms>());
    /// assert!(Version::new(1, 3).supports::<Waveforms>());
    /// ```
    pub fn supports<F: Feature>(&self) -> bool {
        F::is_supported_by(*self)
    }

    /// Returns an error if this version does not support the feature.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasfile::{Version, feature::FileSourceId};
    /// assert!(Version::new(1, 0).verify_support_for::<FileSourceId>().is_err());
    /// assert!(Version::new(1, 1).verify_support_for::<FileSourceId>().is_ok());
    /// ```
    pub fn verify_support_for<F: Feature>(&self) -> Result<()> {
        if self.supports::<F>() {
            Ok(())
        } else {
            Err(Error::UnsupportedFeature {
                version: *self,
                feature: F::name(),
            })
        }
    }

    /// Returns the size of the fixed header block for this version.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasfile::Version;
    /// assert_eq!(227, Version::new(1, 2).header_size());
    /// assert_eq!(235, Version::new(1, 3).header_size());
    /// assert_eq!(375, Version::new(1, 4).header_size());
    /// ```
    pub fn header_size(&self) -> u16 {
        match (self.major, self.minor) {
            (1, 3) => 235,
            (1, 4) => 375,
            _ => 227,
        }
    }
}

impl Default for Version {
    fn default() -> Version {
        Version::new(1, 2)
    }
}

impl From<(u8, u8)> for Version {
    fn from((major, minor): (u8, u8)) -> Version {
        Version::new(major, minor)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
