//! Installer backends.
//!
//! The orchestrator in [`super::Installer`] decides *what* to install or
//! remove; a backend does the work: fetching the vendor installer, running
//! it and removing an installation. Tests swap in a fake backend.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::catalog::{InstallerKind, InstallerSource};
use crate::error::{Result, RuntimeError};
use crate::platform::Platform;
use crate::ui::UserInterface;

use super::archive::extract_zip;
use super::download::{format_bytes, Downloader};

/// Does the platform-specific work of installing and removing runtimes.
pub trait InstallerBackend {
    /// Download and unpack the installer into `workdir`.
    ///
    /// Returns the path of the installer executable.
    fn fetch(
        &self,
        source: &InstallerSource,
        workdir: &Path,
        ui: &mut dyn UserInterface,
    ) -> Result<PathBuf>;

    /// Run the installer silently, installing into `prefix`.
    fn run(&self, installer: &Path, prefix: &Path, tmpdir: &Path) -> Result<()>;

    /// Remove the runtime installed at `root`.
    fn remove(&self, root: &Path) -> Result<()>;
}

/// Command-line arguments of a silent, license-accepted install.
pub fn silent_install_args(prefix: &Path, tmpdir: &Path) -> Vec<String> {
    vec![
        "-agreeToLicense".to_string(),
        "yes".to_string(),
        "-mode".to_string(),
        "silent".to_string(),
        "-destinationFolder".to_string(),
        prefix.display().to_string(),
        "-tmpdir".to_string(),
        tmpdir.display().to_string(),
    ]
}

/// The real backend: MathWorks installers fetched over HTTPS.
pub struct MathworksBackend {
    platform: Platform,
    downloader: Downloader,
}

impl MathworksBackend {
    /// Create a backend for `platform` with the default downloader.
    pub fn new(platform: Platform) -> Result<Self> {
        Ok(Self::with_downloader(platform, Downloader::new()?))
    }

    /// Create a backend with a custom downloader.
    pub fn with_downloader(platform: Platform, downloader: Downloader) -> Self {
        Self {
            platform,
            downloader,
        }
    }
}

impl InstallerBackend for MathworksBackend {
    fn fetch(
        &self,
        source: &InstallerSource,
        workdir: &Path,
        ui: &mut dyn UserInterface,
    ) -> Result<PathBuf> {
        let file_name = source
            .url
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("installer");
        let download = workdir.join(file_name);

        let mut spinner = ui.start_spinner(&format!("Downloading {}", file_name));
        let outcome = self
            .downloader
            .download(&source.url, &download, &mut |received, total| {
                let msg = match total {
                    Some(total) => format!(
                        "Downloading {} ({} / {})",
                        file_name,
                        format_bytes(received),
                        format_bytes(total)
                    ),
                    None => format!("Downloading {} ({})", file_name, format_bytes(received)),
                };
                spinner.set_message(&msg);
            });
        match outcome {
            Ok(bytes) => spinner.finish_success(&format!(
                "Downloaded {} ({})",
                file_name,
                format_bytes(bytes)
            )),
            Err(e) => {
                spinner.finish_error(&format!("Download of {} failed", file_name));
                return Err(e);
            }
        }

        let installer = match source.kind {
            InstallerKind::Exe => download,
            InstallerKind::Zip => {
                let unpacked = workdir.join("installer");
                extract_zip(&download, &unpacked)?;
                unpacked.join(self.platform.ops().installer_name())
            }
        };

        if !installer.is_file() {
            return Err(RuntimeError::InstallerFailed {
                message: format!("{} not found in the installer archive", installer.display()),
            });
        }

        if let Some(dir) = installer.parent() {
            self.platform.ops().prepare_installer(dir)?;
        }
        Ok(installer)
    }

    fn run(&self, installer: &Path, prefix: &Path, tmpdir: &Path) -> Result<()> {
        let args = silent_install_args(prefix, tmpdir);
        tracing::info!("Running {} {}", installer.display(), args.join(" "));

        let status = Command::new(installer)
            .args(&args)
            .status()
            .map_err(|e| RuntimeError::from_io(e, installer))?;

        if status.success() {
            Ok(())
        } else {
            Err(RuntimeError::InstallerFailed {
                message: format!(
                    "{} exited with code {}",
                    installer.display(),
                    status
                        .code()
                        .map_or_else(|| "none (killed by signal)".to_string(), |c| c.to_string())
                ),
            })
        }
    }

    fn remove(&self, root: &Path) -> Result<()> {
        self.platform.remove_runtime(root)
    }
}
