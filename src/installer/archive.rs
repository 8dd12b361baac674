//! Installer archive extraction.

use std::fs::File;
use std::path::Path;

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{Result, RuntimeError};

/// Unpack the zip archive at `archive` into `dest`.
///
/// Unix permissions stored in the archive are restored, so the `install`
/// script and its helpers stay executable.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    tracing::debug!("Extracting {} into {}", archive.display(), dest.display());
    let file = File::open(archive).map_err(|e| RuntimeError::from_io(e, archive))?;
    let mut zip = ZipArchive::new(file).map_err(|e| zip_error(e, archive))?;
    zip.extract(dest).map_err(|e| zip_error(e, dest))?;
    tracing::debug!("Extracted {} entries", zip.len());
    Ok(())
}

fn zip_error(err: ZipError, path: &Path) -> RuntimeError {
    match err {
        ZipError::Io(io) => RuntimeError::from_io(io, path),
        other => RuntimeError::InstallerFailed {
            message: format!("invalid installer archive {}: {}", path.display(), other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        writer
            .start_file("install", SimpleFileOptions::default().unix_permissions(0o755))
            .unwrap();
        writer.write_all(b"#!/bin/sh\nexit 0\n").unwrap();
        writer
            .start_file("bin/readme.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"hello").unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn extracts_files_and_directories() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("installer.zip");
        write_zip(&archive);

        let dest = temp.path().join("out");
        extract_zip(&archive, &dest).unwrap();

        assert!(dest.join("install").is_file());
        assert_eq!(fs::read_to_string(dest.join("bin/readme.txt")).unwrap(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn keeps_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("installer.zip");
        write_zip(&archive);
        let dest = temp.path().join("out");
        extract_zip(&archive, &dest).unwrap();

        let mode = fs::metadata(dest.join("install")).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0);
    }

    #[test]
    fn garbage_is_installer_failure() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.zip");
        fs::write(&archive, "not a zip at all").unwrap();

        let err = extract_zip(&archive, &temp.path().join("out")).unwrap_err();
        assert!(matches!(err, RuntimeError::InstallerFailed { .. }));
    }
}
