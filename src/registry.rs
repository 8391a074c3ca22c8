//! Process-wide bookkeeping of which las files are open.
//!
//! A path may be open in any number of read sessions at once, or in exactly one write session.
//! The [Registry] hands out a [PathLock] for each open path, and the lock is released when it is
//! dropped:
//!
//! ```
//! use lasfile::{Error, Mode, Registry};
//!
//! let registry = Registry::new();
//! let dir = std::env::temp_dir();
//! let path = dir.join("lasfile-registry-doctest.las");
//! let lock = registry.lock(&path, Mode::Write).unwrap();
//! assert!(matches!(registry.lock(&path, Mode::Read), Err(Error::FileAlreadyOpen(_))));
//! drop(lock);
//! let _ = registry.lock(&path, Mode::Write).unwrap();
//! ```
//!
//! Registries are cheap to clone, and clones share their state. Sessions use
//! `Registry::global()` unless they're given another one.

use crate::{Error, Mode, Result};
use lazy_static::lazy_static;
use log::{Level, log};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

lazy_static! {
    static ref GLOBAL: Registry = Registry::new();
}

/// A shared table of open paths.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    open: Arc<Mutex<HashMap<PathBuf, Holders>>>,
}

/// Proof that a path is registered as open.
///
/// Dropping the lock, or calling `PathLock::release`, unregisters it.
#[derive(Debug)]
pub struct PathLock {
    path: PathBuf,
    registry: Registry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Holders {
    Readers(usize),
    Writer,
}

impl Registry {
    /// Creates a new, empty registry.
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Returns the process-wide registry.
    pub fn global() -> Registry {
        GLOBAL.clone()
    }

    /// Registers a path as open in the given mode.
    ///
    /// Paths are canonicalized first, so two spellings of one file collide. A path opened for
    /// reading must exist.
    pub fn lock<P: AsRef<Path>>(&self, path: P, mode: Mode) -> Result<PathLock> {
        let path = canonicalize(path.as_ref(), mode)?;
        let mut open = self.open();
        let holders = match (open.get(&path).copied(), mode) {
            (None, Mode::Read) => Holders::Readers(1),
            (Some(Holders::Readers(n)), Mode::Read) => Holders::Readers(n + 1),
            (None, Mode::Write) => Holders::Writer,
            (Some(_), _) => return Err(Error::FileAlreadyOpen(path)),
        };
        let _ = open.insert(path.clone(), holders);
        log!(Level::Debug, "registered {} for {:?}", path.display(), mode);
        Ok(PathLock {
            path,
            registry: self.clone(),
        })
    }

    /// Returns true if the path is open in any mode.
    pub fn is_open<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        let path = canonicalize(path, Mode::Write).unwrap_or_else(|_| path.to_path_buf());
        self.open().contains_key(&path)
    }

    /// Returns the number of open paths.
    pub fn len(&self) -> usize {
        self.open().len()
    }

    /// Returns true if no path is open.
    pub fn is_empty(&self) -> bool {
        self.open().is_empty()
    }

    fn release(&self, path: &Path) {
        let mut open = self.open();
        match open.get(path).copied() {
            Some(Holders::Readers(n)) if n > 1 => {
                let _ = open.insert(path.to_path_buf(), Holders::Readers(n - 1));
            }
            Some(_) => {
                let _ = open.remove(path);
            }
            None => {}
        }
        log!(Level::Debug, "released {}", path.display());
    }

    fn open(&self) -> MutexGuard<'_, HashMap<PathBuf, Holders>> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PathLock {
    /// Returns the canonical path that is locked.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Releases this lock.
    pub fn release(self) {}
}

impl Drop for PathLock {
    fn drop(&mut self) {
        self.registry.release(&self.path);
    }
}

fn canonicalize(path: &Path, mode: Mode) -> Result<PathBuf> {
    match mode {
        Mode::Read => fs::canonicalize(path).map_err(Error::from),
        Mode::Write => {
            if path.exists() {
                return fs::canonicalize(path).map_err(Error::from);
            }
            let file_name = path.file_name().ok_or_else(|| {
                Error::from(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file path: {}", path.display()),
                ))
            })?;
            let parent = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            Ok(fs::canonicalize(parent)?.join(file_name))
        }
    }
}
