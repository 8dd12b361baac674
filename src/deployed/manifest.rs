//! Runtime release recorded in a `.ctf` archive.
//!
//! A ctf is a zip archive; the compiler writes an XML manifest into it
//! whose `<release>` element names the runtime the package was built for.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::ZipArchive;

use crate::catalog::Release;
use crate::error::{Result, RuntimeError};
use crate::installed::version_info::element_text;

/// Suffix of manifest entries inside a ctf archive.
pub const MANIFEST_SUFFIX: &str = "manifest.xml";

/// Runtime release the ctf at `path` was built for.
///
/// `Ok(None)` when the archive carries no manifest or is not a zip
/// archive at all.
pub fn read_ctf_release(path: &Path) -> Result<Option<Release>> {
    let file = File::open(path).map_err(|e| RuntimeError::from_io(e, path))?;
    let mut archive = match ZipArchive::new(file) {
        Ok(archive) => archive,
        Err(e) => {
            tracing::debug!("{} is not a zip archive: {}", path.display(), e);
            return Ok(None);
        }
    };

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| invalid(path, e))?;
        if !entry.name().to_ascii_lowercase().ends_with(MANIFEST_SUFFIX) {
            continue;
        }
        let name = entry.name().to_string();
        let mut doc = String::new();
        entry
            .read_to_string(&mut doc)
            .map_err(|e| RuntimeError::from_io(e, path))?;

        let Some(text) = element_text(&doc, "release")? else {
            tracing::debug!("{} in {} has no <release>", name, path.display());
            continue;
        };
        return text.parse::<Release>().map(Some).map_err(|_| RuntimeError::DeploymentLoad {
            package: path.display().to_string(),
            message: format!("{} names an unknown release '{}'", name, text),
        });
    }
    Ok(None)
}

fn invalid(path: &Path, err: zip::result::ZipError) -> RuntimeError {
    RuntimeError::DeploymentLoad {
        package: path.display().to_string(),
        message: format!("corrupt archive: {}", err),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::write_ctf;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reads_release_from_manifest() {
        let temp = TempDir::new().unwrap();
        let ctf = temp.path().join("magic.ctf");
        write_ctf(&ctf, "R2024b");
        assert_eq!(read_ctf_release(&ctf).unwrap(), Some("R2024b".parse().unwrap()));
    }

    #[test]
    fn non_zip_ctf_has_no_release() {
        let temp = TempDir::new().unwrap();
        let ctf = temp.path().join("magic.ctf");
        fs::write(&ctf, "encrypted payload").unwrap();
        assert_eq!(read_ctf_release(&ctf).unwrap(), None);
    }

    #[test]
    fn garbage_release_is_deployment_error() {
        let temp = TempDir::new().unwrap();
        let ctf = temp.path().join("magic.ctf");
        write_ctf(&ctf, "twenty-four");
        let err = read_ctf_release(&ctf).unwrap_err();
        assert!(matches!(err, RuntimeError::DeploymentLoad { .. }));
    }
}
