//! Installation prefix resolution.
//!
//! Resolves the prefix using the priority chain:
//! 1. Explicit argument (`--prefix`)
//! 2. `MATLAB_RUNTIME_PATH` environment variable
//! 3. Platform default
//!
//! Nothing is created on disk here; the installer creates the prefix when
//! it needs it.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::platform::OsFamily;

/// Environment variable that overrides the default prefix.
pub const PREFIX_ENV: &str = "MATLAB_RUNTIME_PATH";

/// How the prefix was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixSource {
    /// Passed explicitly by the caller.
    Argument,
    /// Read from `MATLAB_RUNTIME_PATH`.
    Environment,
    /// The platform's default location.
    PlatformDefault,
}

impl std::fmt::Display for PrefixSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Argument => write!(f, "--prefix"),
            Self::Environment => write!(f, "{}", PREFIX_ENV),
            Self::PlatformDefault => write!(f, "platform default"),
        }
    }
}

/// A resolved prefix with the source it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrefix {
    /// The prefix path.
    pub path: PathBuf,
    /// How this prefix was determined.
    pub source: PrefixSource,
}

impl ResolvedPrefix {
    /// Resolve the prefix against the live process environment.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let env_value = std::env::var(PREFIX_ENV).ok();
        Self::resolve_with(explicit, env_value.as_deref(), OsFamily::detect)
    }

    /// Resolve with an explicit environment value and family detector.
    ///
    /// The detector only runs when neither the argument nor the variable
    /// is set, so an override works even on an unsupported OS.
    pub fn resolve_with(
        explicit: Option<&Path>,
        env_value: Option<&str>,
        detect: impl FnOnce() -> Result<OsFamily>,
    ) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self {
                path: path.to_path_buf(),
                source: PrefixSource::Argument,
            });
        }

        if let Some(value) = env_value.filter(|v| !v.is_empty()) {
            return Ok(Self {
                path: PathBuf::from(value),
                source: PrefixSource::Environment,
            });
        }

        let family = detect()?;
        Ok(Self {
            path: PathBuf::from(family.default_prefix()),
            source: PrefixSource::PlatformDefault,
        })
    }
}

/// Guess the installation prefix.
///
/// Returns `MATLAB_RUNTIME_PATH` verbatim when it is set, otherwise the
/// platform default:
///
/// * Windows: `C:\Program Files\MATLAB\MATLAB Runtime\`
/// * Linux: `/usr/local/MATLAB/MATLAB_Runtime`
/// * macOS: `/Applications/MATLAB/MATLAB_Runtime`
pub fn guess_prefix() -> Result<PathBuf> {
    ResolvedPrefix::resolve(None).map(|r| r.path)
}

/// Resolve the prefix to use: `explicit` if given, else [`guess_prefix`].
pub fn resolve_prefix(explicit: Option<&Path>) -> Result<PathBuf> {
    ResolvedPrefix::resolve(explicit).map(|r| r.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;

    fn unsupported() -> Result<OsFamily> {
        Err(RuntimeError::UnsupportedPlatform {
            platform: "plan9".into(),
        })
    }

    #[test]
    fn explicit_takes_highest_priority() {
        let resolved = ResolvedPrefix::resolve_with(
            Some(Path::new("/opt/mcr")),
            Some("/env/mcr"),
            || Ok(OsFamily::Linux),
        )
        .unwrap();
        assert_eq!(resolved.path, PathBuf::from("/opt/mcr"));
        assert_eq!(resolved.source, PrefixSource::Argument);
    }

    #[test]
    fn environment_second_priority() {
        let resolved =
            ResolvedPrefix::resolve_with(None, Some("/env/mcr"), || Ok(OsFamily::Linux)).unwrap();
        assert_eq!(resolved.path, PathBuf::from("/env/mcr"));
        assert_eq!(resolved.source, PrefixSource::Environment);
    }

    #[test]
    fn environment_value_is_returned_verbatim_on_every_family() {
        let odd = "  relative/../not a real path\\ ";
        for family in [OsFamily::Windows, OsFamily::Linux, OsFamily::MacOs] {
            let resolved = ResolvedPrefix::resolve_with(None, Some(odd), || Ok(family)).unwrap();
            assert_eq!(resolved.path.as_os_str(), odd);
        }
    }

    #[test]
    fn environment_override_skips_platform_detection() {
        let resolved = ResolvedPrefix::resolve_with(None, Some("/env/mcr"), unsupported).unwrap();
        assert_eq!(resolved.path, PathBuf::from("/env/mcr"));
    }

    #[test]
    fn empty_environment_value_is_ignored() {
        let resolved =
            ResolvedPrefix::resolve_with(None, Some(""), || Ok(OsFamily::MacOs)).unwrap();
        assert_eq!(resolved.source, PrefixSource::PlatformDefault);
    }

    #[test]
    fn platform_defaults_when_unset() {
        for (family, expected) in [
            (OsFamily::Windows, "C:\\Program Files\\MATLAB\\MATLAB Runtime\\"),
            (OsFamily::Linux, "/usr/local/MATLAB/MATLAB_Runtime"),
            (OsFamily::MacOs, "/Applications/MATLAB/MATLAB_Runtime"),
        ] {
            let resolved = ResolvedPrefix::resolve_with(None, None, || Ok(family)).unwrap();
            assert_eq!(resolved.path.as_os_str(), expected);
            assert_eq!(resolved.source, PrefixSource::PlatformDefault);
        }
    }

    #[test]
    fn unsupported_platform_without_override_fails() {
        let err = ResolvedPrefix::resolve_with(None, None, unsupported).unwrap_err();
        assert!(matches!(err, RuntimeError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn source_display() {
        assert_eq!(PrefixSource::Argument.to_string(), "--prefix");
        assert_eq!(PrefixSource::Environment.to_string(), "MATLAB_RUNTIME_PATH");
        assert_eq!(PrefixSource::PlatformDefault.to_string(), "platform default");
    }
}
