//! `VersionInfo.xml`, the version stamp at the root of every installation.
//!
//! ```xml
//! <MathWorks_version_info>
//!   <version>24.2.0.2712019</version>
//!   <release>R2024b</release>
//! </MathWorks_version_info>
//! ```

use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::catalog::Release;
use crate::error::{Result, RuntimeError};

/// File name of the version stamp.
pub const VERSION_INFO: &str = "VersionInfo.xml";

/// Parsed contents of a `VersionInfo.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Full build version, e.g. `24.2.0.2712019`.
    pub version: Option<String>,
    /// Release name as written in the file.
    pub release: Option<String>,
}

impl VersionInfo {
    /// Parse a `VersionInfo.xml` document.
    pub fn parse(doc: &str) -> Result<Self> {
        Ok(Self {
            version: element_text(doc, "version")?,
            release: element_text(doc, "release")?,
        })
    }

    /// Read and parse `<root>/VersionInfo.xml`.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(VERSION_INFO);
        let doc = fs::read_to_string(&path).map_err(|e| RuntimeError::from_io(e, &path))?;
        Self::parse(&doc)
    }

    /// The release as a typed value, when present and well formed.
    pub fn parsed_release(&self) -> Option<Release> {
        self.release.as_deref().and_then(|r| r.parse().ok())
    }
}

/// Text of the first `<tag>` element in `doc`, trimmed.
pub(crate) fn element_text(doc: &str, tag: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(doc);
    reader.trim_text(true);

    let mut inside = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                inside = e.local_name().as_ref() == tag.as_bytes();
            }
            Ok(Event::Text(e)) if inside => {
                let text = e.unescape().map_err(xml_error)?;
                return Ok(Some(text.trim().to_string()));
            }
            Ok(Event::End(_)) => inside = false,
            Ok(Event::Eof) => return Ok(None),
            Ok(_) => {}
            Err(e) => return Err(xml_error(e)),
        }
    }
}

fn xml_error(err: quick_xml::Error) -> RuntimeError {
    RuntimeError::Other(anyhow::anyhow!("malformed XML: {}", err))
}
