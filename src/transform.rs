use crate::{Error, Result};
use num_traits::ToPrimitive;
use std::fmt;

/// A scale and an offset that transforms xyz coordinates.
///
/// Stored coordinates are integers, and the real coordinate is `raw * scale + offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// The scale.
    pub scale: f64,

    /// The offset.
    pub offset: f64,
}

impl Transform {
    /// Applies this transform to an i32, returning a float.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasfile::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(3., transform.direct(1));
    /// ```
    pub fn direct(&self, n: i32) -> f64 {
        self.scale * f64::from(n) + self.offset
    }

    /// Applies the inverse transform, and rounds the result to the nearest integer.
    ///
    /// Returns an error if the resultant value can't be represented as an i32.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasfile::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(1, transform.inverse(2.9).unwrap());
    /// assert!(transform.inverse(f64::MAX).is_err());
    /// ```
    pub fn inverse(&self, n: f64) -> Result<i32> {
        ((n - self.offset) / self.scale)
            .round()
            .to_i32()
            .ok_or(Error::InverseTransform {
                value: n,
                transform: *self,
            })
    }

    /// Is the scale usable, i.e. finite and non-zero?
    pub fn has_valid_scale(&self) -> bool {
        self.scale.is_finite() && self.scale != 0.
    }
}

impl Default for Transform {
    fn default() -> Transform {
        Transform {
            scale: 0.01,
            offset: 0.,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{} * x + {}`", self.scale, self.offset)
    }
}
