//! Host-side collaborators of a resource: its description and the package
//! its files are read from.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{EngineError, ResourceError};

/// Name and entry file of a host resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    pub name: String,
    pub main: String,
}

impl ResourceInfo {
    pub fn new(name: impl Into<String>, main: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            main: main.into(),
        }
    }
}

/// Handle to a file opened through a [`Package`]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PackageFile(pub u32);

/// File access for one resource, provided by the host
pub trait Package {
    fn file_exists(&self, path: &str) -> bool;
    fn open_file(&self, path: &str) -> Option<PackageFile>;
    fn file_size(&self, file: &PackageFile) -> u64;
    /// Read up to `buf.len()` bytes, returning how many were read
    fn read_file(&self, file: &mut PackageFile, buf: &mut [u8]) -> u64;
    fn close_file(&self, file: PackageFile);
}

/// Read a whole package file as UTF-8
pub fn read_file_to_string(package: &dyn Package, path: &str) -> Result<String, ResourceError> {
    let read_error = |reason: &str| ResourceError::ReadSource {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let mut file = package
        .open_file(path)
        .ok_or_else(|| read_error("file could not be opened"))?;

    let size = package.file_size(&file) as usize;
    let mut buf = vec![0u8; size];
    let mut filled = 0;
    while filled < size {
        let read = package.read_file(&mut file, &mut buf[filled..]) as usize;
        if read == 0 {
            break;
        }
        filled += read;
    }
    package.close_file(file);

    if filled < size {
        return Err(read_error("unexpected end of file"));
    }
    String::from_utf8(buf).map_err(|_| read_error("file is not valid UTF-8"))
}

/// Resolve an `#include` path against the section that includes it
///
/// Paths starting with `/` are relative to the package root, everything else
/// to the directory of `from`.
pub fn include_path(include: &str, from: &str) -> String {
    let base = if let Some(stripped) = include.strip_prefix('/') {
        PathBuf::from(stripped)
    } else {
        Path::new(from)
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(include)
    };

    let mut parts: Vec<String> = Vec::new();
    for component in base.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => {
                parts.pop();
            }
            _ => {}
        }
    }
    parts.join("/")
}

/// Load the source of an included file through `package`
pub fn resolve_include(
    package: &dyn Package,
    include: &str,
    from: &str,
) -> Result<String, EngineError> {
    let path = include_path(include, from);
    debug!(target: "scripting", "Including {} from {}", path, from);
    read_file_to_string(package, &path)
        .map_err(|e| EngineError::new("Include", format!("{} ({})", include, e)))
}

/// A [`Package`] backed by a directory on disk
#[derive(Debug)]
pub struct DirPackage {
    root: PathBuf,
    open_files: RefCell<HashMap<u32, File>>,
    next_id: Cell<u32>,
}

impl DirPackage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            open_files: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a package path onto the directory, refusing to leave it
    fn full_path(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl Package for DirPackage {
    fn file_exists(&self, path: &str) -> bool {
        self.full_path(path).is_some_and(|p| p.is_file())
    }

    fn open_file(&self, path: &str) -> Option<PackageFile> {
        let file = File::open(self.full_path(path)?).ok()?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.open_files.borrow_mut().insert(id, file);
        Some(PackageFile(id))
    }

    fn file_size(&self, file: &PackageFile) -> u64 {
        self.open_files
            .borrow()
            .get(&file.0)
            .and_then(|f| f.metadata().ok())
            .map(|m| m.len())
            .unwrap_or(0)
    }

    fn read_file(&self, file: &mut PackageFile, buf: &mut [u8]) -> u64 {
        self.open_files
            .borrow_mut()
            .get_mut(&file.0)
            .and_then(|f| f.read(buf).ok())
            .unwrap_or(0) as u64
    }

    fn close_file(&self, file: PackageFile) {
        self.open_files.borrow_mut().remove(&file.0);
    }
}
