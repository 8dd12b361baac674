//! Version token resolution.
//!
//! Turns what the user asked for (`latest`, `R2022b`, `9.13`, `all`, ...)
//! into concrete releases, consulting the catalog and the set of releases
//! installed under the prefix.

use std::fmt;
use std::str::FromStr;

use crate::catalog::{Catalog, Release};
use crate::error::{Result, RuntimeError};
use crate::installed::InstalledSet;
use crate::platform::Arch;

/// A requested version, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionToken {
    /// Highest release in the catalog.
    Latest,
    /// Highest release installed under the prefix.
    LatestInstalled,
    /// Every installed release (uninstall only).
    All,
    /// A release name or numeric version, as typed.
    Literal(String),
}

impl VersionToken {
    /// Parse a list of tokens, splitting comma-separated entries.
    pub fn parse_list<S: AsRef<str>>(items: &[S]) -> Vec<Self> {
        items
            .iter()
            .flat_map(|item| item.as_ref().split(','))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::from)
            .collect()
    }
}

impl From<&str> for VersionToken {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Self::Latest,
            "latest_installed" => Self::LatestInstalled,
            "all" => Self::All,
            _ => Self::Literal(s.trim().to_string()),
        }
    }
}

impl FromStr for VersionToken {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::LatestInstalled => write!(f, "latest_installed"),
            Self::All => write!(f, "all"),
            Self::Literal(s) => write!(f, "{}", s),
        }
    }
}

/// What the resolved releases will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    Install,
    Uninstall,
    /// Initializing the process environment.
    Environment { install_if_missing: bool },
}

impl ResolveMode {
    /// Token used when the caller gives none.
    pub fn default_token(&self) -> VersionToken {
        match self {
            Self::Install => VersionToken::Latest,
            Self::Uninstall => VersionToken::All,
            Self::Environment { .. } => VersionToken::LatestInstalled,
        }
    }
}

/// Resolves tokens against a catalog for one architecture.
#[derive(Debug, Clone, Copy)]
pub struct VersionResolver<'a> {
    catalog: &'a Catalog,
    arch: Arch,
}

impl<'a> VersionResolver<'a> {
    pub fn new(catalog: &'a Catalog, arch: Arch) -> Self {
        Self { catalog, arch }
    }

    /// Resolve `tokens` element by element, keeping order and duplicates.
    ///
    /// An empty list resolves the mode's default token.
    pub fn resolve(
        &self,
        tokens: &[VersionToken],
        mode: ResolveMode,
        installed: &InstalledSet,
    ) -> Result<Vec<Release>> {
        let default = [mode.default_token()];
        let tokens = if tokens.is_empty() { &default[..] } else { tokens };

        let mut releases = Vec::new();
        for token in tokens {
            let resolved = self.resolve_one(token, mode, installed)?;
            tracing::debug!("Resolved '{}' to {:?}", token, resolved);
            releases.extend(resolved);
        }
        Ok(releases)
    }

    fn resolve_one(
        &self,
        token: &VersionToken,
        mode: ResolveMode,
        installed: &InstalledSet,
    ) -> Result<Vec<Release>> {
        match token {
            VersionToken::Latest => self.latest().map(|r| vec![r]),
            VersionToken::LatestInstalled => match installed.latest() {
                Some(release) => Ok(vec![release]),
                None => match mode {
                    ResolveMode::Install
                    | ResolveMode::Environment {
                        install_if_missing: true,
                    } => {
                        tracing::debug!("Nothing installed; falling back to latest");
                        self.latest().map(|r| vec![r])
                    }
                    ResolveMode::Uninstall => Ok(Vec::new()),
                    ResolveMode::Environment {
                        install_if_missing: false,
                    } => Err(RuntimeError::RuntimeNotFound {
                        release: "latest_installed".to_string(),
                        prefix: installed.prefix().to_path_buf(),
                    }),
                },
            },
            VersionToken::All => match mode {
                ResolveMode::Uninstall => Ok(installed.releases().collect()),
                _ => Err(RuntimeError::UnknownVersion {
                    version: "all".to_string(),
                    message: "'all' is only valid when uninstalling".to_string(),
                }),
            },
            VersionToken::Literal(text) => self.literal(text, mode, installed).map(|r| vec![r]),
        }
    }

    fn latest(&self) -> Result<Release> {
        self.catalog
            .latest(self.arch)
            .ok_or_else(|| RuntimeError::UnknownVersion {
                version: "latest".to_string(),
                message: format!("no release is published for {}", self.arch),
            })
    }

    fn literal(&self, text: &str, mode: ResolveMode, installed: &InstalledSet) -> Result<Release> {
        let release = Release::parse_token(text)?;
        match mode {
            ResolveMode::Install => {
                let release = self.catalog.canonicalize(text)?;
                if self.catalog.installer(release, self.arch).is_none() {
                    return Err(RuntimeError::UnknownVersion {
                        version: text.to_string(),
                        message: format!("no installer for {} is published for {}", release, self.arch),
                    });
                }
                Ok(release)
            }
            ResolveMode::Uninstall | ResolveMode::Environment { .. } => {
                if installed.contains(release) || self.catalog.contains(release) {
                    Ok(release)
                } else {
                    Err(RuntimeError::UnknownVersion {
                        version: text.to_string(),
                        message: format!(
                            "{} is neither installed nor in the release catalog",
                            release
                        ),
                    })
                }
            }
        }
    }
}
