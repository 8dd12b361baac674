//! Per-family installer mechanics.
//!
//! Each OS family gets one [`PlatformOps`] implementation. [`Platform`]
//! picks the right one once and the rest of the crate talks to it instead
//! of checking `cfg!(target_os)` on its own.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, RuntimeError};

use super::arch::{Arch, OsFamily};

/// Platform-specific installer and loader behavior.
pub trait PlatformOps: Send + Sync {
    /// The family this implementation serves.
    fn family(&self) -> OsFamily;

    /// File name of the installer inside an unpacked installer archive.
    fn installer_name(&self) -> &'static str;

    /// Environment variable the dynamic loader searches for shared libraries.
    fn library_path_var(&self) -> &'static str;

    /// Directories of a runtime installation the loader must see.
    fn library_dirs(&self, root: &Path, arch: Arch) -> Vec<PathBuf>;

    /// File name of a deployed package's shared library.
    fn shared_library_name(&self, package: &str) -> String;

    /// Make an unpacked installer runnable. Nothing to do by default.
    fn prepare_installer(&self, _workdir: &Path) -> Result<()> {
        Ok(())
    }

    /// Remove the runtime installed at `root`.
    fn remove_runtime(&self, root: &Path, arch: Arch) -> Result<()>;
}

/// Windows: `setup.exe` installer, `PATH` lookup, vendor uninstaller.
#[derive(Debug)]
pub struct WindowsOps;

/// Linux: `install` script, `LD_LIBRARY_PATH`, plain directory removal.
#[derive(Debug)]
pub struct LinuxOps;

/// macOS: quarantined installer, `DYLD_FALLBACK_LIBRARY_PATH`.
#[derive(Debug)]
pub struct MacOps;

fn unix_library_dirs(root: &Path, arch: Arch) -> Vec<PathBuf> {
    let arch = arch.as_str();
    vec![
        root.join("runtime").join(arch),
        root.join("bin").join(arch),
        root.join("sys").join("os").join(arch),
        root.join("extern").join("bin").join(arch),
    ]
}

fn remove_tree(root: &Path) -> Result<()> {
    tracing::info!("Removing {}", root.display());
    fs::remove_dir_all(root).map_err(|e| RuntimeError::from_io(e, root))
}

impl PlatformOps for WindowsOps {
    fn family(&self) -> OsFamily {
        OsFamily::Windows
    }

    fn installer_name(&self) -> &'static str {
        "setup.exe"
    }

    fn library_path_var(&self) -> &'static str {
        "PATH"
    }

    fn library_dirs(&self, root: &Path, arch: Arch) -> Vec<PathBuf> {
        let arch = arch.as_str();
        vec![
            root.join("runtime").join(arch),
            root.join("bin").join(arch),
            root.join("extern").join("bin").join(arch),
        ]
    }

    fn shared_library_name(&self, package: &str) -> String {
        format!("{}.dll", package)
    }

    fn remove_runtime(&self, root: &Path, arch: Arch) -> Result<()> {
        let uninstaller = root
            .join("bin")
            .join(arch.as_str())
            .join("Uninstall_MATLAB_Runtime.exe");
        if !uninstaller.exists() {
            tracing::warn!(
                "No uninstaller at {}; removing files directly",
                uninstaller.display()
            );
            return remove_tree(root);
        }

        tracing::info!("Running {}", uninstaller.display());
        let status = Command::new(&uninstaller)
            .status()
            .map_err(|e| RuntimeError::from_io(e, &uninstaller))?;
        if status.success() {
            Ok(())
        } else {
            Err(RuntimeError::InstallerFailed {
                message: format!(
                    "{} exited with code {:?}",
                    uninstaller.display(),
                    status.code()
                ),
            })
        }
    }
}

impl PlatformOps for LinuxOps {
    fn family(&self) -> OsFamily {
        OsFamily::Linux
    }

    fn installer_name(&self) -> &'static str {
        "install"
    }

    fn library_path_var(&self) -> &'static str {
        "LD_LIBRARY_PATH"
    }

    fn library_dirs(&self, root: &Path, arch: Arch) -> Vec<PathBuf> {
        unix_library_dirs(root, arch)
    }

    fn shared_library_name(&self, package: &str) -> String {
        format!("lib{}.so", package)
    }

    fn remove_runtime(&self, root: &Path, _arch: Arch) -> Result<()> {
        remove_tree(root)
    }
}

impl PlatformOps for MacOps {
    fn family(&self) -> OsFamily {
        OsFamily::MacOs
    }

    fn installer_name(&self) -> &'static str {
        "install"
    }

    // The fallback variable keeps system libraries ahead of the runtime's
    // bundled copies.
    fn library_path_var(&self) -> &'static str {
        "DYLD_FALLBACK_LIBRARY_PATH"
    }

    fn library_dirs(&self, root: &Path, arch: Arch) -> Vec<PathBuf> {
        unix_library_dirs(root, arch)
    }

    fn shared_library_name(&self, package: &str) -> String {
        format!("lib{}.dylib", package)
    }

    fn prepare_installer(&self, workdir: &Path) -> Result<()> {
        tracing::debug!("Clearing quarantine attribute under {}", workdir.display());
        let outcome = Command::new("xattr")
            .args(["-r", "-d", "com.apple.quarantine"])
            .arg(workdir)
            .status();
        match outcome {
            Ok(status) if status.success() => {}
            Ok(status) => tracing::warn!(
                "xattr exited with code {:?}; the installer may be blocked by Gatekeeper",
                status.code()
            ),
            Err(e) => tracing::warn!("Could not run xattr: {}", e),
        }
        Ok(())
    }

    fn remove_runtime(&self, root: &Path, _arch: Arch) -> Result<()> {
        remove_tree(root)
    }
}

static WINDOWS: WindowsOps = WindowsOps;
static LINUX: LinuxOps = LinuxOps;
static MACOS: MacOps = MacOps;

/// The running platform: architecture plus its mechanics.
#[derive(Clone, Copy)]
pub struct Platform {
    arch: Arch,
    ops: &'static dyn PlatformOps,
}

impl Platform {
    /// Detect the running platform.
    pub fn current() -> Result<Self> {
        Ok(Self::for_arch(Arch::detect()?))
    }

    /// Platform for an explicit architecture.
    pub fn for_arch(arch: Arch) -> Self {
        let ops: &'static dyn PlatformOps = match arch.family() {
            OsFamily::Windows => &WINDOWS,
            OsFamily::Linux => &LINUX,
            OsFamily::MacOs => &MACOS,
        };
        Self { arch, ops }
    }

    /// Architecture of this platform.
    pub fn arch(&self) -> Arch {
        self.arch
    }

    /// OS family of this platform.
    pub fn family(&self) -> OsFamily {
        self.ops.family()
    }

    /// Family-specific mechanics.
    pub fn ops(&self) -> &'static dyn PlatformOps {
        self.ops
    }

    /// Library directories of the runtime installed at `root`.
    pub fn library_dirs(&self, root: &Path) -> Vec<PathBuf> {
        self.ops.library_dirs(root, self.arch)
    }

    /// Remove the runtime installed at `root`.
    pub fn remove_runtime(&self, root: &Path) -> Result<()> {
        self.ops.remove_runtime(root, self.arch)
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("arch", &self.arch)
            .field("family", &self.ops.family())
            .finish()
    }
}
