//! Programmatically determine whether a las version supports a feature.
//!
//! Features are structures that implement the [Feature] trait, and are usually queried via
//! [Version::supports]:
//!
//! ```
//! use lasfile::feature::LargeFiles;
//! use lasfile::Version;
//!
//! assert!(!Version::new(1, 2).supports::<LargeFiles>());
//! assert!(Version::new(1, 4).supports::<LargeFiles>());
//! ```

use crate::Version;

const MAJOR: u8 = 1;

/// A trait implemented by each feature.
pub trait Feature {
    /// Is this feature supported by this version?
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::feature::{Waveforms, Feature};
    /// use lasfile::Version;
    /// assert!(!Waveforms::is_supported_by(Version::new(1, 2)));
    /// assert!(Waveforms::is_supported_by(Version::new(1, 3)));
    /// ```
    fn is_supported_by(version: Version) -> bool;

    /// Returns the name of this feature.
    fn name() -> &'static str;
}

macro_rules! features {
    (   $(
            $(#[$meta:meta])*
            $name:ident ($($versions:expr),+);
        )+
    ) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug)]
            pub struct $name {}

            impl Feature for $name {
                fn is_supported_by(version: Version) -> bool {
                    version.major == MAJOR && [$($versions),+].contains(&version.minor)
                }

                fn name() -> &'static str {
                    stringify!($name)
                }
            }
        )+
    }
}

features! {
    /// Does the header allow a file source id, or is that field reserved?
    FileSourceId(1, 2, 3, 4);
    /// Is there a bit flag to set the type of time value in each point?
    GpsStandardTime(2, 3, 4);
    /// Does the header carry the start of the waveform data packet record?
    Waveforms(3, 4);
    /// Is there a bit flag to indicate synthetic return numbers?
    SyntheticReturnNumbers(3, 4);
    /// Does the header carry 64-bit point counts?
    LargeFiles(4);
    /// Does the header locate extended variable length records?
    Evlrs(4);
}
