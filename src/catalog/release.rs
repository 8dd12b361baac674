//! Release names and numeric runtime versions.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{Result, RuntimeError};

static RELEASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^R(\d{4})([ab])(?:SP(\d+))?$").expect("release pattern is valid")
});

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)(?:\.(\d+))?$").expect("version pattern is valid"));

/// Numeric versions of releases older than R2023b, which did not follow the
/// `<yy>.<half>` scheme.
const LEGACY_VERSIONS: &[(&str, &str)] = &[
    ("9.14", "R2023a"),
    ("9.13", "R2022b"),
    ("9.12", "R2022a"),
    ("9.11", "R2021b"),
    ("9.10", "R2021a"),
    ("9.9", "R2020b"),
    ("9.8", "R2020a"),
    ("9.7", "R2019b"),
    ("9.6", "R2019a"),
    ("9.5", "R2018b"),
    ("9.4", "R2018a"),
    ("9.3", "R2017b"),
    ("9.2", "R2017a"),
    ("9.1", "R2016b"),
    ("9.0.1", "R2016a"),
    ("9.0", "R2015b"),
    ("8.5.1", "R2015aSP1"),
    ("8.5", "R2015a"),
    ("8.4", "R2014b"),
    ("8.3", "R2014a"),
    ("8.2", "R2013b"),
    ("8.1", "R2013a"),
    ("8.0", "R2012b"),
    ("7.17", "R2012a"),
];

/// First half (`a`) or second half (`b`) of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Half {
    A,
    B,
}

impl Half {
    fn letter(&self) -> char {
        match self {
            Self::A => 'a',
            Self::B => 'b',
        }
    }
}

/// A canonical MATLAB release, e.g. `R2024b` or `R2015aSP1`.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Release {
    year: u16,
    half: Half,
    service_pack: u8,
}

impl Release {
    /// Create a release without service pack.
    pub const fn new(year: u16, half: Half) -> Self {
        Self {
            year,
            half,
            service_pack: 0,
        }
    }

    /// Same release with a service pack number.
    pub const fn with_service_pack(self, service_pack: u8) -> Self {
        Self {
            service_pack,
            ..self
        }
    }

    /// Calendar year of the release.
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Half of the year.
    pub fn half(&self) -> Half {
        self.half
    }

    /// Service pack number, 0 when none.
    pub fn service_pack(&self) -> u8 {
        self.service_pack
    }

    /// Numeric runtime version of this release, e.g. `9.13` for R2022b or
    /// `24.2` for R2024b.
    ///
    /// Returns `None` for pre-R2023b releases missing from the legacy table.
    pub fn numeric_version(&self) -> Option<String> {
        let name = self.to_string();
        if let Some((version, _)) = LEGACY_VERSIONS.iter().find(|(_, r)| *r == name) {
            return Some((*version).to_string());
        }
        if *self >= Release::new(2023, Half::B) && self.service_pack == 0 {
            let half = match self.half {
                Half::A => 1,
                Half::B => 2,
            };
            return Some(format!("{}.{}", self.year % 100, half));
        }
        None
    }

    /// Convert a numeric runtime version to its release.
    pub fn from_numeric_version(version: &str) -> Option<Self> {
        if let Some((_, release)) = LEGACY_VERSIONS.iter().find(|(v, _)| *v == version) {
            return release.parse().ok();
        }

        let caps = VERSION_RE.captures(version)?;
        let major: u16 = caps[1].parse().ok().filter(|m| *m < 100)?;
        let minor: u8 = caps[2].parse().ok()?;
        let half = match minor {
            1 => Half::A,
            2 => Half::B,
            _ => return None,
        };
        let release = Release::new(2000 + major, half);
        // Anything older than R2023b must come from the legacy table.
        (release >= Release::new(2023, Half::B)).then_some(release)
    }

    /// Parse a release name (`R2022b`) or numeric version (`9.13`).
    pub fn parse_token(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.starts_with(['R', 'r']) {
            return token.parse();
        }
        Self::from_numeric_version(token).ok_or_else(|| RuntimeError::UnknownVersion {
            version: token.to_string(),
            message: "not a known runtime version".to_string(),
        })
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}{}", self.year, self.half.letter())?;
        if self.service_pack > 0 {
            write!(f, "SP{}", self.service_pack)?;
        }
        Ok(())
    }
}

impl FromStr for Release {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || RuntimeError::UnknownVersion {
            version: s.to_string(),
            message: "expected a release name such as R2024b".to_string(),
        };
        let caps = RELEASE_RE.captures(s.trim()).ok_or_else(invalid)?;
        let year = caps[1].parse().map_err(|_| invalid())?;
        let half = if caps[2].eq_ignore_ascii_case("a") {
            Half::A
        } else {
            Half::B
        };
        let service_pack = match caps.get(3) {
            Some(m) => m.as_str().parse().map_err(|_| invalid())?,
            None => 0,
        };
        Ok(Self {
            year,
            half,
            service_pack,
        })
    }
}

impl Serialize for Release {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_release_names() {
        let release: Release = "R2024b".parse().unwrap();
        assert_eq!(release, Release::new(2024, Half::B));
        assert_eq!("r2019a".parse::<Release>().unwrap(), Release::new(2019, Half::A));
        assert_eq!(
            "R2015aSP1".parse::<Release>().unwrap(),
            Release::new(2015, Half::A).with_service_pack(1)
        );
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in ["R24b", "R2024c", "2024b", "R2024bSP", ""] {
            assert!(bad.parse::<Release>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(Release::new(2022, Half::B).to_string(), "R2022b");
        assert_eq!(
            Release::new(2015, Half::A).with_service_pack(1).to_string(),
            "R2015aSP1"
        );
        assert_eq!("r2022B".parse::<Release>().unwrap().to_string(), "R2022b");
    }

    #[test]
    fn ordering_is_chronological() {
        let a: Release = "R2015a".parse().unwrap();
        let sp: Release = "R2015aSP1".parse().unwrap();
        let b: Release = "R2015b".parse().unwrap();
        let later: Release = "R2016a".parse().unwrap();
        assert!(a < sp && sp < b && b < later);
    }

    #[test]
    fn legacy_numeric_versions() {
        assert_eq!(Release::new(2022, Half::B).numeric_version().as_deref(), Some("9.13"));
        assert_eq!(Release::new(2012, Half::A).numeric_version().as_deref(), Some("7.17"));
        assert_eq!(
            Release::from_numeric_version("9.0.1"),
            Some(Release::new(2016, Half::A))
        );
        assert_eq!(
            Release::from_numeric_version("8.5.1"),
            Some(Release::new(2015, Half::A).with_service_pack(1))
        );
    }

    #[test]
    fn new_scheme_numeric_versions() {
        assert_eq!(Release::new(2023, Half::B).numeric_version().as_deref(), Some("23.2"));
        assert_eq!(Release::new(2024, Half::A).numeric_version().as_deref(), Some("24.1"));
        assert_eq!(Release::from_numeric_version("24.2"), Some(Release::new(2024, Half::B)));
        assert_eq!(Release::from_numeric_version("25.1"), Some(Release::new(2025, Half::A)));
    }

    #[test]
    fn numeric_versions_outside_both_schemes_are_rejected() {
        assert_eq!(Release::from_numeric_version("9.15"), None);
        assert_eq!(Release::from_numeric_version("22.2"), None);
        assert_eq!(Release::from_numeric_version("24.3"), None);
        assert_eq!(Release::from_numeric_version("latest"), None);
        assert_eq!(Release::from_numeric_version("64000.1"), None);
        assert_eq!(Release::from_numeric_version("124.1"), None);
        assert!(matches!(
            Release::parse_token("64000.1"),
            Err(RuntimeError::UnknownVersion { .. })
        ));
    }

    #[test]
    fn versions_and_releases_are_bijective_over_legacy_table() {
        for (version, name) in LEGACY_VERSIONS {
            let release: Release = name.parse().unwrap();
            assert_eq!(release.numeric_version().as_deref(), Some(*version));
            assert_eq!(Release::from_numeric_version(version), Some(release));
        }
    }

    #[test]
    fn parse_token_accepts_both_forms() {
        assert_eq!(Release::parse_token("9.13").unwrap(), Release::new(2022, Half::B));
        assert_eq!(Release::parse_token(" R2022b ").unwrap(), Release::new(2022, Half::B));
        assert!(matches!(
            Release::parse_token("banana"),
            Err(RuntimeError::UnknownVersion { .. })
        ));
    }

    #[test]
    fn serializes_as_name() {
        let json = serde_json::to_string(&Release::new(2024, Half::B)).unwrap();
        assert_eq!(json, "\"R2024b\"");
    }
}
