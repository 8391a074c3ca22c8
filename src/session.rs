//! Path-based las sessions.
//!
//! A [Session] is a las file opened by path for either reading or writing. It registers the path
//! with a [Registry] so that a file being written is never opened a second time:
//!
//! ```
//! use lasfile::{Error, Mode, Point, Session};
//!
//! let dir = tempfile::TempDir::new().unwrap();
//! let path = dir.path().join("session.las");
//! let mut session = Session::open(&path, Mode::Write, None).unwrap();
//! assert!(matches!(Session::open(&path, Mode::Read, None), Err(Error::FileAlreadyOpen(_))));
//! session.write(&Point { x: 1., y: 2., z: 3., ..Default::default() }).unwrap();
//! session.close().unwrap();
//!
//! let mut session = Session::open(&path, Mode::Read, None).unwrap();
//! assert_eq!(1, session.header().unwrap().number_of_points());
//! let point = session.read(None).unwrap().unwrap();
//! assert_eq!(2., point.y);
//! ```
//!
//! Everything a session returns is a copy. Change a write session's header with
//! `Session::header_mut` or `Session::set_header`, which work until the first point is written.

use crate::{
    Error, Header, Point, Reader, Registry, Result, Vlr, Writer,
    crs::{self, CrsService, SpatialReference},
    registry::PathLock,
};
use log::{Level, log};
use std::{
    fmt,
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
    sync::Arc,
};

/// The default capacity of a session's buffered reader or writer.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// How a session accesses its file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Read an existing file.
    Read,

    /// Create or truncate a file and write to it.
    Write,
}

/// Where a session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Closed, either explicitly or because opening failed partway.
    Closed,

    /// Open for reading, with a frozen header.
    OpenForRead,

    /// Open for writing.
    OpenForWrite {
        /// Has the first point been written?
        frozen: bool,
    },
}

/// Options for opening a session.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use lasfile::{Registry, SessionOptions, crs::WktCrsService};
/// let options = SessionOptions::default()
///     .with_registry(Registry::new())
///     .with_crs_service(Arc::new(WktCrsService))
///     .with_buffer_capacity(1 << 16);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    buffer_capacity: Option<usize>,
    crs_service: Option<Arc<dyn CrsService>>,
    registry: Option<Registry>,
}

/// A las file opened by path.
#[derive(Debug)]
pub struct Session {
    crs_service: Option<Arc<dyn CrsService>>,
    inner: Inner,
    lock: Option<PathLock>,
    path: PathBuf,
}

#[derive(Debug)]
enum Inner {
    Closed,
    Read(Reader<BufReader<File>>),
    Write(Writer<BufWriter<File>>),
}

impl SessionOptions {
    /// Sets the registry that tracks open paths.
    ///
    /// Defaults to `Registry::global()`.
    pub fn with_registry(mut self, registry: Registry) -> SessionOptions {
        self.registry = Some(registry);
        self
    }

    /// Sets the service that reads and writes projection strings.
    ///
    /// Without a service, a session's projection string is always `None`.
    pub fn with_crs_service(mut self, crs_service: Arc<dyn CrsService>) -> SessionOptions {
        self.crs_service = Some(crs_service);
        self
    }

    /// Sets the capacity of the buffered reader or writer.
    pub fn with_buffer_capacity(mut self, buffer_capacity: usize) -> SessionOptions {
        self.buffer_capacity = Some(buffer_capacity);
        self
    }
}

impl Session {
    /// Opens a session with the default options.
    ///
    /// A write session starts from `header`, or from `Header::default()` if none is given. A read
    /// session takes its header from the file, so passing one is an error.
    pub fn open<P, H>(path: P, mode: Mode, header: H) -> Result<Session>
    where
        P: AsRef<Path>,
        H: Into<Option<Header>>,
    {
        Session::open_with_options(path, mode, header, SessionOptions::default())
    }

    /// Opens a session.
    ///
    /// The path is registered before the file is touched, so a conflicting open fails without
    /// changing anything on disk.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::{Error, Mode, Registry, Session, SessionOptions};
    /// let dir = tempfile::TempDir::new().unwrap();
    /// let path = dir.path().join("options.las");
    /// let registry = Registry::new();
    /// let options = SessionOptions::default().with_registry(registry.clone());
    /// let session = Session::open_with_options(&path, Mode::Write, None, options).unwrap();
    /// assert!(registry.is_open(&path));
    /// ```
    pub fn open_with_options<P, H>(
        path: P,
        mode: Mode,
        header: H,
        options: SessionOptions,
    ) -> Result<Session>
    where
        P: AsRef<Path>,
        H: Into<Option<Header>>,
    {
        let path = path.as_ref();
        let header = header.into();
        if mode == Mode::Read && header.is_some() {
            return Err(Error::InvalidMode {
                mode,
                operation: "open with a header",
            });
        }
        let registry = options.registry.unwrap_or_else(Registry::global);
        let lock = registry.lock(path, mode)?;
        let capacity = options.buffer_capacity.unwrap_or(DEFAULT_BUFFER_CAPACITY);
        let inner = match mode {
            Mode::Read => {
                let file = File::open(lock.path())?;
                Inner::Read(Reader::new(BufReader::with_capacity(capacity, file))?)
            }
            Mode::Write => {
                let file = File::create(lock.path())?;
                Inner::Write(Writer::new(
                    BufWriter::with_capacity(capacity, file),
                    header.unwrap_or_default(),
                )?)
            }
        };
        log!(
            Level::Debug,
            "opened {} for {:?}",
            lock.path().display(),
            mode
        );
        Ok(Session {
            crs_service: options.crs_service,
            inner,
            path: lock.path().to_path_buf(),
            lock: Some(lock),
        })
    }

    /// Returns the canonical path of this session's file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns this session's state.
    pub fn state(&self) -> SessionState {
        match &self.inner {
            Inner::Closed => SessionState::Closed,
            Inner::Read(_) => SessionState::OpenForRead,
            Inner::Write(writer) => SessionState::OpenForWrite {
                frozen: writer.is_header_written(),
            },
        }
    }

    /// Returns this session's mode, or `None` if it is closed.
    pub fn mode(&self) -> Option<Mode> {
        match self.inner {
            Inner::Closed => None,
            Inner::Read(_) => Some(Mode::Read),
            Inner::Write(_) => Some(Mode::Write),
        }
    }

    /// Reads a point.
    ///
    /// Without an index this is the next point in file order, or `None` after the last one. With
    /// an index this is that point, and the next sequential read is unaffected.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::{Mode, Point, Session};
    /// let dir = tempfile::TempDir::new().unwrap();
    /// let path = dir.path().join("read.las");
    /// let mut session = Session::open(&path, Mode::Write, None).unwrap();
    /// session.write(&Point { x: 1., ..Default::default() }).unwrap();
    /// session.write(&Point { x: 2., ..Default::default() }).unwrap();
    /// session.close().unwrap();
    ///
    /// let mut session = Session::open(&path, Mode::Read, None).unwrap();
    /// assert_eq!(2., session.read(1_u64).unwrap().unwrap().x);
    /// assert_eq!(1., session.read(None).unwrap().unwrap().x);
    /// ```
    pub fn read<I: Into<Option<u64>>>(&mut self, index: I) -> Result<Option<Point>> {
        let reader = match &mut self.inner {
            Inner::Read(reader) => reader,
            Inner::Write(_) => {
                return Err(Error::InvalidMode {
                    mode: Mode::Write,
                    operation: "read",
                });
            }
            Inner::Closed => return Err(Error::ClosedSession),
        };
        match index.into() {
            Some(index) => reader.read_point_at(index).map(Some),
            None => reader.read_point(),
        }
    }

    /// Writes a point, freezing the header if this is the first one.
    pub fn write(&mut self, point: &Point) -> Result<()> {
        self.writer("write")?.write_point(point)
    }

    /// Returns a copy of this session's header.
    ///
    /// A write session's header has no point counts until it is closed.
    pub fn header(&self) -> Result<Header> {
        match &self.inner {
            Inner::Read(reader) => Ok(reader.header().clone()),
            Inner::Write(writer) => Ok(writer.header().clone()),
            Inner::Closed => Err(Error::ClosedSession),
        }
    }

    /// Returns a mutable reference to a write session's header.
    ///
    /// Fails with [Error::HeaderFrozen] once the first point is written, so the header can be
    /// neither changed nor replaced after that.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasfile::{Mode, Session};
    /// let dir = tempfile::TempDir::new().unwrap();
    /// let path = dir.path().join("header_mut.las");
    /// let mut session = Session::open(&path, Mode::Write, None).unwrap();
    /// session.header_mut().unwrap().set_scale(0.001, 0.001, 0.001).unwrap();
    /// session.write(&Default::default()).unwrap();
    /// assert!(session.header_mut().is_err());
    /// ```
    pub fn header_mut(&mut self) -> Result<&mut Header> {
        match &mut self.inner {
            Inner::Write(writer) => writer.header_mut(),
            Inner::Read(_) => Err(Error::HeaderFrozen),
            Inner::Closed => Err(Error::ClosedSession),
        }
    }

    /// Replaces a write session's header.
    ///
    /// The new header is used as a template, as in `Writer::new`.
    pub fn set_header(&mut self, header: Header) -> Result<()> {
        *self.header_mut()? = header.into_template();
        Ok(())
    }

    /// Appends a vlr to a write session's header.
    pub fn add_vlr(&mut self, vlr: Vlr) -> Result<()> {
        self.header_mut()?.vlrs_mut().append(vlr)
    }

    /// Returns copies of the header's vlrs.
    pub fn vlrs(&self) -> Result<Vec<Vlr>> {
        self.with_header(|header| header.vlrs().list())
    }

    /// Returns the spatial reference vlr payload, if there is one.
    pub fn spatial_reference(&self) -> Result<Option<SpatialReference>> {
        self.with_header(|header| header.vlrs().find_spatial_reference())
    }

    /// Returns the projection string of the spatial reference.
    ///
    /// Without a crs service this is always `None`, and a service that fails returns
    /// `Error::Crs`.
    pub fn proj_string(&self) -> Result<Option<String>> {
        let service = self.crs_service.as_deref();
        match &self.inner {
            Inner::Read(reader) => crs::proj_string(service, reader.header().vlrs()),
            Inner::Write(writer) => crs::proj_string(service, writer.header().vlrs()),
            Inner::Closed => Err(Error::ClosedSession),
        }
    }

    /// Stores a projection string as the write session's spatial reference.
    ///
    /// Returns false, and stores nothing, if there is no crs service.
    pub fn set_proj_string(&mut self, proj_string: &str) -> Result<bool> {
        let service = self.crs_service.clone();
        let header = self.header_mut()?;
        crs::set_proj_string(service.as_deref(), header.vlrs_mut(), proj_string)
    }

    /// Closes this session.
    ///
    /// A write session's header is rewritten with the final point counts and bounds before the
    /// path is released. Closing a closed session does nothing.
    pub fn close(&mut self) -> Result<()> {
        if let Inner::Write(writer) = &mut self.inner {
            writer.close()?;
        }
        if let Inner::Closed = self.inner {
            return Ok(());
        }
        self.inner = Inner::Closed;
        if let Some(lock) = self.lock.take() {
            lock.release();
        }
        log!(Level::Debug, "closed {}", self.path.display());
        Ok(())
    }

    fn writer(&mut self, operation: &'static str) -> Result<&mut Writer<BufWriter<File>>> {
        match &mut self.inner {
            Inner::Write(writer) => Ok(writer),
            Inner::Read(_) => Err(Error::InvalidMode {
                mode: Mode::Read,
                operation,
            }),
            Inner::Closed => Err(Error::ClosedSession),
        }
    }

    fn with_header<T, F: FnOnce(&Header) -> T>(&self, f: F) -> Result<T> {
        match &self.inner {
            Inner::Read(reader) => Ok(f(reader.header())),
            Inner::Write(writer) => Ok(f(writer.header())),
            Inner::Closed => Err(Error::ClosedSession),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Read => write!(f, "read"),
            Mode::Write => write!(f, "write"),
        }
    }
}
