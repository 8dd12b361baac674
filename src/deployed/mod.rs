//! Deployed (compiled) MATLAB packages.
//!
//! A package is a directory holding a `.ctf` archive and, usually, the
//! shared library the compiler generated for it. Packages are located
//! by path or by name, checked against the active runtime release and
//! their library is opened so entry points can be looked up.
//!
//! Loading goes through the runtime session, which caches handles per
//! canonical path; see [`crate::sdk::import_deployed`].

pub mod library;
pub mod manifest;

pub use library::LoadedLibrary;
pub use manifest::{read_ctf_release, MANIFEST_SUFFIX};

use std::ffi::c_void;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use crate::catalog::Release;
use crate::error::{Result, RuntimeError};
use crate::platform::Platform;
use crate::sdk::ActiveRuntime;

/// How a caller names a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageRef {
    /// A package directory or `.ctf` file.
    Path(PathBuf),
    /// A bare name, searched for in the default directories.
    Name(String),
}

impl From<&str> for PackageRef {
    fn from(s: &str) -> Self {
        let looks_like_path = s.contains('/')
            || s.contains('\\')
            || s.to_ascii_lowercase().ends_with(".ctf")
            || Path::new(s).is_absolute();
        if looks_like_path {
            Self::Path(PathBuf::from(s))
        } else {
            Self::Name(s.to_string())
        }
    }
}

impl From<String> for PackageRef {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<PathBuf> for PackageRef {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for PackageRef {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Where a package lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocation {
    pub name: String,
    /// Canonical path the caller pointed at (directory or ctf).
    pub path: PathBuf,
    /// Directory holding the package files.
    pub dir: PathBuf,
    pub ctf: Option<PathBuf>,
}

impl PackageRef {
    /// Find the package on disk. Names are looked up in `search_dirs`,
    /// first as a directory then as `<name>.ctf`.
    pub fn locate(&self, search_dirs: &[PathBuf]) -> Result<PackageLocation> {
        let found = match self {
            Self::Path(path) => location_of(path),
            Self::Name(name) => search_dirs.iter().find_map(|dir| {
                location_of(&dir.join(name))
                    .or_else(|| location_of(&dir.join(format!("{}.ctf", name))))
            }),
        };
        found.ok_or_else(|| RuntimeError::DeploymentLoad {
            package: self.to_string(),
            message: match self {
                Self::Path(_) => "no package directory or .ctf file at this path".to_string(),
                Self::Name(_) => format!(
                    "not found in {}",
                    search_dirs
                        .iter()
                        .map(|d| d.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            },
        })
    }
}

fn location_of(path: &Path) -> Option<PackageLocation> {
    let path = fs::canonicalize(path).ok()?;
    if path.is_dir() {
        let name = path.file_name()?.to_string_lossy().into_owned();
        let ctf = find_ctf(&path, &name);
        Some(PackageLocation {
            name,
            dir: path.clone(),
            ctf,
            path,
        })
    } else if is_ctf(&path) {
        let name = path.file_stem()?.to_string_lossy().into_owned();
        let dir = path.parent()?.to_path_buf();
        Some(PackageLocation {
            name,
            dir,
            ctf: Some(path.clone()),
            path,
        })
    } else {
        None
    }
}

fn is_ctf(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ctf"))
}

/// `<dir>/<name>.ctf`, else the first ctf in `dir` by file name.
fn find_ctf(dir: &Path, name: &str) -> Option<PathBuf> {
    let preferred = dir.join(format!("{}.ctf", name));
    if preferred.is_file() {
        return Some(preferred);
    }
    let mut found: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| is_ctf(p))
        .collect();
    found.sort();
    found.into_iter().next()
}

/// Directories searched for packages given by name: the directory of the
/// running executable, then the current directory.
pub fn default_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(dir);
    }
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.contains(&cwd) {
            dirs.push(cwd);
        }
    }
    dirs
}

/// A package loaded against the active runtime.
#[derive(Debug)]
pub struct DeployedPackage {
    location: PackageLocation,
    release: Option<Release>,
    library: Option<LoadedLibrary>,
}

impl DeployedPackage {
    /// Check `location` against `active` and open its shared library.
    pub fn load(location: PackageLocation, active: &ActiveRuntime, platform: Platform) -> Result<Self> {
        let release = match &location.ctf {
            Some(ctf) => read_ctf_release(ctf)?,
            None => None,
        };
        match release {
            Some(built_for) if built_for != active.release => {
                return Err(RuntimeError::DeploymentLoad {
                    package: location.name,
                    message: format!(
                        "built for MATLAB Runtime {} but {} is active",
                        built_for, active.release
                    ),
                });
            }
            Some(_) => {}
            None => tracing::warn!(
                "No runtime release recorded for {}; assuming {}",
                location.name,
                active.release
            ),
        }

        let library_path = location
            .dir
            .join(platform.ops().shared_library_name(&location.name));
        let library = if library_path.is_file() {
            Some(LoadedLibrary::open(&library_path)?)
        } else {
            tracing::debug!("{} has no shared library", location.name);
            None
        };

        tracing::info!("Loaded deployed package {} from {}", location.name, location.dir.display());
        Ok(Self {
            location,
            release,
            library,
        })
    }

    pub fn name(&self) -> &str {
        &self.location.name
    }

    /// Canonical path the package was loaded from.
    pub fn path(&self) -> &Path {
        &self.location.path
    }

    pub fn dir(&self) -> &Path {
        &self.location.dir
    }

    pub fn ctf(&self) -> Option<&Path> {
        self.location.ctf.as_deref()
    }

    /// Release recorded in the ctf manifest.
    pub fn release(&self) -> Option<Release> {
        self.release
    }

    pub fn library(&self) -> Option<&LoadedLibrary> {
        self.library.as_ref()
    }

    /// Address of an entry point exported by the package library.
    pub fn symbol(&self, name: &str) -> Option<NonNull<c_void>> {
        self.library.as_ref().and_then(|lib| lib.symbol(name))
    }
}
