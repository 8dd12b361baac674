//! Installed-release discovery under a prefix.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::Release;
use crate::error::{Result, RuntimeError};

use super::version_info::VERSION_INFO;

/// License file the installer drops next to `VersionInfo.xml`.
pub const LICENSE_FILE: &str = "matlabruntime_license_agreement.pdf";

/// Directory of `release` under `prefix`.
pub fn runtime_root(prefix: &Path, release: Release) -> PathBuf {
    prefix.join(release.to_string())
}

/// Whether `dir` holds an installation record.
pub fn has_installation_record(dir: &Path) -> bool {
    dir.join(VERSION_INFO).is_file() || dir.join(LICENSE_FILE).is_file()
}

/// Whether `release` is installed under `prefix`.
pub fn is_installed(prefix: &Path, release: Release) -> bool {
    has_installation_record(&runtime_root(prefix, release))
}

/// Releases installed under one prefix at the time of the scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledSet {
    prefix: PathBuf,
    releases: BTreeSet<Release>,
}

impl InstalledSet {
    /// Scan `prefix` for installed releases.
    ///
    /// A missing prefix is an empty set. Directories whose names are not
    /// release names, or that lack an installation record, are ignored.
    pub fn scan(prefix: &Path) -> Result<Self> {
        let mut releases = BTreeSet::new();

        let entries = match fs::read_dir(prefix) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Prefix {} does not exist", prefix.display());
                return Ok(Self::empty(prefix));
            }
            Err(e) => return Err(RuntimeError::from_io(e, prefix)),
        };

        for entry in entries {
            let entry = entry.map_err(|e| RuntimeError::from_io(e, prefix))?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            let Ok(release) = name.parse::<Release>() else {
                continue;
            };
            // Only canonical directory names count; `r2024B` is not ours.
            if release.to_string() != name {
                continue;
            }
            if has_installation_record(&entry.path()) {
                releases.insert(release);
            }
        }

        tracing::debug!(
            "Found {} installed release(s) under {}",
            releases.len(),
            prefix.display()
        );
        Ok(Self {
            prefix: prefix.to_path_buf(),
            releases,
        })
    }

    /// A set with nothing installed.
    pub fn empty(prefix: &Path) -> Self {
        Self {
            prefix: prefix.to_path_buf(),
            releases: BTreeSet::new(),
        }
    }

    /// Build a set from known releases, without touching the filesystem.
    pub fn from_releases(prefix: &Path, releases: impl IntoIterator<Item = Release>) -> Self {
        Self {
            prefix: prefix.to_path_buf(),
            releases: releases.into_iter().collect(),
        }
    }

    /// The scanned prefix.
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Installed releases, ascending.
    pub fn releases(&self) -> impl DoubleEndedIterator<Item = Release> + '_ {
        self.releases.iter().copied()
    }

    /// Whether `release` was found.
    pub fn contains(&self, release: Release) -> bool {
        self.releases.contains(&release)
    }

    /// Highest installed release.
    pub fn latest(&self) -> Option<Release> {
        self.releases.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn r(name: &str) -> Release {
        name.parse().unwrap()
    }

    fn fake_install(prefix: &Path, name: &str, marker: &str) {
        let dir = prefix.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(marker), "").unwrap();
    }

    #[test]
    fn missing_prefix_is_empty() {
        let temp = TempDir::new().unwrap();
        let set = InstalledSet::scan(&temp.path().join("nope")).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.latest(), None);
    }

    #[test]
    fn detects_either_marker() {
        let temp = TempDir::new().unwrap();
        fake_install(temp.path(), "R2022b", VERSION_INFO);
        fake_install(temp.path(), "R2024a", LICENSE_FILE);

        let set = InstalledSet::scan(temp.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(r("R2022b")));
        assert!(set.contains(r("R2024a")));
        assert_eq!(set.latest(), Some(r("R2024a")));
    }

    #[test]
    fn ignores_unmarked_and_foreign_directories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("R2023b")).unwrap();
        fake_install(temp.path(), "notes", VERSION_INFO);
        fake_install(temp.path(), "r2021a", VERSION_INFO);
        fs::write(temp.path().join("R2020a"), "a file, not a directory").unwrap();

        let set = InstalledSet::scan(temp.path()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn releases_are_ascending() {
        let temp = TempDir::new().unwrap();
        for name in ["R2024b", "R2019a", "R2015aSP1", "R2015a"] {
            fake_install(temp.path(), name, VERSION_INFO);
        }
        let set = InstalledSet::scan(temp.path()).unwrap();
        let names: Vec<String> = set.releases().map(|r| r.to_string()).collect();
        assert_eq!(names, ["R2015a", "R2015aSP1", "R2019a", "R2024b"]);
    }

    #[test]
    fn is_installed_checks_record() {
        let temp = TempDir::new().unwrap();
        assert!(!is_installed(temp.path(), r("R2024b")));
        fake_install(temp.path(), "R2024b", LICENSE_FILE);
        assert!(is_installed(temp.path(), r("R2024b")));
        assert_eq!(runtime_root(temp.path(), r("R2024b")), temp.path().join("R2024b"));
    }
}
