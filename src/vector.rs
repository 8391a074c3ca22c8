/// An xyz collection.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector<T> {
    /// X
    pub x: T,
    /// Y
    pub y: T,
    /// Z
    pub z: T,
}

impl<T> Vector<T> {
    /// Creates a new vector.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasfile::Vector;
    /// let vector = Vector::new(1., 2., 3.);
    /// assert_eq!(2., vector.y);
    /// ```
    pub fn new(x: T, y: T, z: T) -> Vector<T> {
        Vector { x, y, z }
    }
}
