//! Locating a runtime (or a full MATLAB) outside the managed prefix.

use std::path::{Path, PathBuf};

use crate::catalog::Release;
use crate::error::Result;
use crate::platform::OsFamily;
use crate::prefix::resolve_prefix;

use super::version_info::{VersionInfo, VERSION_INFO};

/// Environment variable pointing at a MATLAB installation.
pub const MATLAB_PATH_ENV: &str = "MATLAB_PATH";

/// Well-known install locations for `release` on `family`, in search order.
pub fn candidate_locations(family: OsFamily, release: Release) -> Vec<PathBuf> {
    let templates: &[&str] = match family {
        OsFamily::Windows => &[
            "C:\\Program Files (x86)\\MATLAB\\MATLAB Runtime\\{release}",
            "C:\\Program Files\\MATLAB\\MATLAB Runtime\\{release}",
            "C:\\Program Files\\MATLAB\\{release}",
            "C:\\Program Files (x86)\\MATLAB\\{release}",
        ],
        OsFamily::Linux => &[
            "/usr/local/MATLAB/MATLAB_Runtime/{release}",
            "/usr/local/MATLAB/{release}",
        ],
        OsFamily::MacOs => &[
            "/Applications/MATLAB/MATLAB_Runtime/{release}",
            "/Applications/MATLAB_{release}.app",
            "/Applications/MATLAB_{release}",
            "/Applications/MATLAB/{release}",
        ],
    };
    let name = release.to_string();
    templates
        .iter()
        .map(|t| PathBuf::from(t.replace("{release}", &name)))
        .collect()
}

/// Release of the MATLAB installation rooted at `root`, from its
/// `VersionInfo.xml`.
pub fn release_at(root: &Path) -> Option<Release> {
    VersionInfo::load(root).ok()?.parsed_release()
}

/// Find an installed runtime of `release`.
///
/// Searches, in order: `<prefix>/<release>`, the `MATLAB_PATH` installation,
/// the platform's well-known locations, and the installation owning the
/// `matlab` executable on `PATH`. Returns the installation root.
pub fn find_runtime(release: Release, prefix: Option<&Path>) -> Result<Option<PathBuf>> {
    let family = OsFamily::detect()?;
    let prefix = resolve_prefix(prefix)?;
    let matlab_path = std::env::var(MATLAB_PATH_ENV).ok();
    let matlab_exe = which::which("matlab").ok();
    Ok(find_runtime_in(
        release,
        &prefix,
        matlab_path.as_deref(),
        &candidate_locations(family, release),
        matlab_exe.as_deref(),
    ))
}

/// [`find_runtime`] with every lookup source passed in.
pub fn find_runtime_in(
    release: Release,
    prefix: &Path,
    matlab_path: Option<&str>,
    candidates: &[PathBuf],
    matlab_exe: Option<&Path>,
) -> Option<PathBuf> {
    let managed = prefix.join(release.to_string());
    if managed.join(VERSION_INFO).is_file() {
        return Some(managed);
    }

    if let Some(path) = matlab_path.filter(|p| !p.is_empty()) {
        let path = PathBuf::from(path.trim_end_matches(['/', '\\']));
        if release_at(&path) == Some(release) {
            tracing::debug!("Using {} from {}", release, MATLAB_PATH_ENV);
            return Some(path);
        }
    }

    if let Some(found) = candidates
        .iter()
        .find(|base| base.join(VERSION_INFO).is_file())
    {
        return Some(found.clone());
    }

    // <root>/bin/matlab
    let exe = matlab_exe?.canonicalize().ok()?;
    let root = exe.parent()?.parent()?.to_path_buf();
    (release_at(&root) == Some(release)).then_some(root)
}
