//! The bundled catalog of MATLAB Runtime releases.
//!
//! The catalog knows which releases exist, where their installers are
//! published for each architecture, and how release names relate to numeric
//! runtime versions. It is compiled into the binary; nothing is fetched to
//! answer "which release is the latest".

mod release;

pub use release::{Half, Release};

use std::collections::BTreeMap;

use crate::error::{Result, RuntimeError};
use crate::platform::Arch;

const BASE_URL: &str = "https://ssd.mathworks.com/supportfiles/downloads";

/// Update number of the complete installer published for each release since
/// R2019a.
const RELEASE_UPDATES: &[(&str, u8)] = &[
    ("R2024b", 5),
    ("R2024a", 7),
    ("R2023b", 10),
    ("R2023a", 7),
    ("R2022b", 10),
    ("R2022a", 8),
    ("R2021b", 7),
    ("R2021a", 8),
    ("R2020b", 8),
    ("R2020a", 8),
    ("R2019b", 9),
    ("R2019a", 9),
];

/// Releases published before the update-numbered installers.
const LEGACY_RELEASES: &[&str] = &[
    "R2018b", "R2018a", "R2017b", "R2017a", "R2016b", "R2016a", "R2015b", "R2015aSP1", "R2015a",
    "R2014b", "R2014a", "R2013b", "R2013a", "R2012b", "R2012a",
];

/// Releases available for Apple silicon.
const MACA64_RELEASES: &[&str] = &["R2024b", "R2024a", "R2023b"];

/// Packaging of an installer download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallerKind {
    /// Zip archive containing the installer.
    Zip,
    /// Self-extracting Windows executable.
    Exe,
}

impl InstallerKind {
    /// File extension used in download URLs.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Exe => "exe",
        }
    }
}

/// Where to download the installer of one release for one architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerSource {
    pub url: String,
    pub kind: InstallerKind,
}

#[derive(Debug, Clone)]
enum Packaging {
    /// `Release/<update>/.../MATLAB_Runtime_<release>_Update_<update>_<arch>.zip`
    Updated(u8),
    /// `<release>/installers/<arch>/MCR_<release>_<arch>_installer.<ext>`
    Legacy,
}

/// Releases known to this build and the architectures they ship for.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: BTreeMap<Release, Packaging>,
}

impl Catalog {
    /// The catalog compiled into this crate.
    pub fn bundled() -> Self {
        let mut entries = BTreeMap::new();
        for (name, update) in RELEASE_UPDATES {
            if let Ok(release) = name.parse() {
                entries.insert(release, Packaging::Updated(*update));
            }
        }
        for name in LEGACY_RELEASES {
            if let Ok(release) = name.parse() {
                entries.insert(release, Packaging::Legacy);
            }
        }
        Self { entries }
    }

    /// Every release in ascending order.
    pub fn releases(&self) -> impl Iterator<Item = Release> + '_ {
        self.entries.keys().copied()
    }

    /// Whether the catalog knows `release`.
    pub fn contains(&self, release: Release) -> bool {
        self.entries.contains_key(&release)
    }

    /// Installer download for `release` on `arch`, if one is published.
    pub fn installer(&self, release: Release, arch: Arch) -> Option<InstallerSource> {
        let packaging = self.entries.get(&release)?;
        match packaging {
            Packaging::Updated(update) => {
                let supported = match arch {
                    Arch::Win64 | Arch::Glnxa64 | Arch::Maci64 => true,
                    Arch::Maca64 => MACA64_RELEASES.contains(&release.to_string().as_str()),
                    Arch::Win32 | Arch::Glnx86 => false,
                };
                supported.then(|| InstallerSource {
                    url: format!(
                        "{BASE_URL}/{release}/Release/{update}/deployment_files/installer/complete/{arch}/MATLAB_Runtime_{release}_Update_{update}_{arch}.zip"
                    ),
                    kind: InstallerKind::Zip,
                })
            }
            Packaging::Legacy => {
                let kind = match arch {
                    Arch::Win64 => InstallerKind::Exe,
                    Arch::Glnxa64 | Arch::Maci64 => InstallerKind::Zip,
                    Arch::Win32 if release.year() <= 2015 => InstallerKind::Exe,
                    Arch::Glnx86 if release == Release::new(2012, Half::A) => InstallerKind::Zip,
                    _ => return None,
                };
                let ext = kind.extension();
                Some(InstallerSource {
                    url: format!(
                        "{BASE_URL}/{release}/deployment_files/{release}/installers/{arch}/MCR_{release}_{arch}_installer.{ext}"
                    ),
                    kind,
                })
            }
        }
    }

    /// Releases with an installer for `arch`, ascending.
    pub fn available(&self, arch: Arch) -> Vec<Release> {
        self.releases()
            .filter(|r| self.installer(*r, arch).is_some())
            .collect()
    }

    /// Highest release with an installer for `arch`.
    pub fn latest(&self, arch: Arch) -> Option<Release> {
        self.available(arch).into_iter().next_back()
    }

    /// Turn a release name or numeric version into a release of this
    /// catalog.
    ///
    /// Fails with [`RuntimeError::UnknownVersion`] when the token does not
    /// parse or names a release this catalog does not carry.
    pub fn canonicalize(&self, token: &str) -> Result<Release> {
        let release = Release::parse_token(token)?;
        if self.contains(release) {
            Ok(release)
        } else {
            Err(RuntimeError::UnknownVersion {
                version: token.trim().to_string(),
                message: format!("{} is not in the release catalog", release),
            })
        }
    }

    /// Numeric runtime version of a catalog release.
    pub fn numeric_version(&self, release: Release) -> Option<String> {
        if self.contains(release) {
            release.numeric_version()
        } else {
            None
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::bundled()
    }
}
