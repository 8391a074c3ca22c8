use crate::{Error, Result};

/// Reads a nul-filled las string field.
pub(crate) trait AsLasStr {
    /// Interprets the bytes up to the first nul as a `&str`.
    ///
    /// Bytes after the first nul are ignored, since not all las writers nul-fill their strings.
    fn as_las_str(&self) -> Result<&str>;
}

/// Fills a fixed-size las string field.
pub(crate) trait FromLasStr {
    /// Copies the string into the buffer and nul-fills the rest.
    fn from_las_str(&mut self, s: &str) -> Result<()>;
}

impl AsLasStr for [u8] {
    fn as_las_str(&self) -> Result<&str> {
        let end = self.iter().position(|&n| n == 0).unwrap_or(self.len());
        std::str::from_utf8(&self[..end]).map_err(Error::from)
    }
}

impl<T: AsMut<[u8]>> FromLasStr for T {
    fn from_las_str(&mut self, s: &str) -> Result<()> {
        let buffer = self.as_mut();
        if s.len() > buffer.len() {
            return Err(Error::StringTooLong {
                value: s.to_string(),
                max: buffer.len(),
            });
        }
        for (a, b) in buffer
            .iter_mut()
            .zip(s.bytes().chain(std::iter::repeat(0)))
        {
            *a = b;
        }
        Ok(())
    }
}
