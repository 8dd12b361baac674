//! Install and uninstall orchestration.
//!
//! [`Installer`] resolves the requested versions, skips those already in
//! the desired state, gates every change behind a confirmation and hands
//! the actual work to an [`InstallerBackend`].
//!
//! Per-version failures do not stop the batch. They are gathered and
//! returned together as [`RuntimeError::PartialFailure`], except when a
//! single version was requested, in which case its own error is returned.
//! A declined confirmation aborts the whole call.

pub mod archive;
pub mod backend;
pub mod download;

pub use backend::{silent_install_args, InstallerBackend, MathworksBackend};
pub use download::Downloader;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::catalog::{Catalog, Release};
use crate::error::{Result, RuntimeError, VersionFailure};
use crate::installed::{is_installed, runtime_root, InstalledSet};
use crate::platform::{is_ci, Platform};
use crate::prefix::resolve_prefix;
use crate::ui::{create_ui, OutputMode, Prompt, UserInterface};
use crate::version::{ResolveMode, VersionResolver, VersionToken};

/// Prompt key of the download confirmation.
pub const DOWNLOAD_PROMPT: &str = "download";
/// Prompt key of the license agreement.
pub const LICENSE_PROMPT: &str = "license";
/// Prompt key of the removal confirmation.
pub const REMOVE_PROMPT: &str = "remove";

/// Outcome of an install call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    /// Prefix the runtimes were installed under.
    pub prefix: PathBuf,
    /// Releases installed by this call.
    pub installed: Vec<Release>,
    /// Releases that were already installed.
    pub skipped: Vec<Release>,
}

/// Outcome of an uninstall call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UninstallReport {
    /// Prefix the runtimes were removed from.
    pub prefix: PathBuf,
    /// Releases removed by this call.
    pub removed: Vec<Release>,
    /// Releases that were not installed.
    pub skipped: Vec<Release>,
}

/// Drives installs and removals for one platform.
pub struct Installer {
    platform: Platform,
    catalog: Catalog,
    backend: Box<dyn InstallerBackend>,
}

impl Installer {
    /// Installer for the running platform, using MathWorks downloads.
    pub fn new() -> Result<Self> {
        let platform = Platform::current()?;
        let backend = MathworksBackend::new(platform)?;
        Ok(Self::with_backend(platform, Catalog::bundled(), Box::new(backend)))
    }

    /// Installer with explicit parts.
    pub fn with_backend(
        platform: Platform,
        catalog: Catalog,
        backend: Box<dyn InstallerBackend>,
    ) -> Self {
        Self {
            platform,
            catalog,
            backend,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Install the releases named by `tokens` under `prefix`.
    pub fn install(
        &self,
        tokens: &[VersionToken],
        prefix: &Path,
        auto_answer: bool,
        ui: &mut dyn UserInterface,
    ) -> Result<InstallReport> {
        let installed = InstalledSet::scan(prefix)?;
        let releases = VersionResolver::new(&self.catalog, self.platform.arch()).resolve(
            tokens,
            ResolveMode::Install,
            &installed,
        )?;
        self.install_releases(&releases, prefix, auto_answer, ui)
    }

    /// Install already-resolved releases under `prefix`.
    pub fn install_releases(
        &self,
        releases: &[Release],
        prefix: &Path,
        auto_answer: bool,
        ui: &mut dyn UserInterface,
    ) -> Result<InstallReport> {
        let prefix = &absolute_prefix(prefix)?;
        let mut report = InstallReport {
            prefix: prefix.to_path_buf(),
            installed: Vec::new(),
            skipped: Vec::new(),
        };
        let mut failures = Vec::new();

        for &release in releases {
            if is_installed(prefix, release) {
                tracing::debug!("{} already installed under {}", release, prefix.display());
                ui.message(&format!("MATLAB Runtime {} is already installed", release));
                report.skipped.push(release);
                continue;
            }

            match self.install_one(release, prefix, auto_answer, ui) {
                Ok(()) => {
                    ui.success(&format!(
                        "Installed MATLAB Runtime {} in {}",
                        release,
                        runtime_root(prefix, release).display()
                    ));
                    report.installed.push(release);
                }
                Err(e @ RuntimeError::UserInterruption { .. }) => return Err(e),
                Err(error) => {
                    ui.error(&format!("Failed to install {}: {}", release, error));
                    failures.push(VersionFailure {
                        release: release.to_string(),
                        error,
                    });
                }
            }
        }

        let succeeded = report.installed.iter().map(Release::to_string).collect();
        finish_batch(releases.len(), failures, succeeded).map(|()| report)
    }

    fn install_one(
        &self,
        release: Release,
        prefix: &Path,
        auto_answer: bool,
        ui: &mut dyn UserInterface,
    ) -> Result<()> {
        let source = self
            .catalog
            .installer(release, self.platform.arch())
            .ok_or_else(|| RuntimeError::UnknownVersion {
                version: release.to_string(),
                message: format!("no installer is published for {}", self.platform.arch()),
            })?;

        confirm(
            ui,
            auto_answer,
            &Prompt::yes_by_default(
                DOWNLOAD_PROMPT,
                format!("Download installer from {}?", source.url),
            ),
        )?;

        let workdir = tempfile::Builder::new()
            .prefix("matlab-runtime-")
            .tempdir()
            .map_err(RuntimeError::Io)?;
        let installer = self.backend.fetch(&source, workdir.path(), ui)?;

        if auto_answer {
            tracing::info!("License agreement for {} accepted via auto-answer", release);
        } else {
            confirm(
                ui,
                false,
                &Prompt::explicit(
                    LICENSE_PROMPT,
                    format!(
                        "Do you agree to the terms of the MATLAB Runtime {} license agreement?",
                        release
                    ),
                ),
            )?;
        }

        fs::create_dir_all(prefix).map_err(|e| RuntimeError::from_io(e, prefix))?;
        // An existing prefix owned by another user passes create_dir_all.
        tempfile::tempfile_in(prefix).map_err(|e| RuntimeError::from_io(e, prefix))?;
        let tmpdir = workdir.path().join("tmp");
        fs::create_dir_all(&tmpdir).map_err(|e| RuntimeError::from_io(e, &tmpdir))?;

        let mut spinner = ui.start_spinner(&format!("Installing MATLAB Runtime {}", release));
        if let Err(e) = self.backend.run(&installer, prefix, &tmpdir) {
            spinner.finish_error(&format!("Installer for {} failed", release));
            return Err(e);
        }

        if !is_installed(prefix, release) {
            spinner.finish_error(&format!("Installer for {} failed", release));
            return Err(RuntimeError::InstallerFailed {
                message: format!(
                    "installer finished but {} has no installation record",
                    runtime_root(prefix, release).display()
                ),
            });
        }
        spinner.finish_success(&format!("Installed MATLAB Runtime {}", release));
        Ok(())
    }

    /// Remove the releases named by `tokens` from `prefix`.
    pub fn uninstall(
        &self,
        tokens: &[VersionToken],
        prefix: &Path,
        auto_answer: bool,
        ui: &mut dyn UserInterface,
    ) -> Result<UninstallReport> {
        let installed = InstalledSet::scan(prefix)?;
        let releases = VersionResolver::new(&self.catalog, self.platform.arch()).resolve(
            tokens,
            ResolveMode::Uninstall,
            &installed,
        )?;

        let mut report = UninstallReport {
            prefix: prefix.to_path_buf(),
            removed: Vec::new(),
            skipped: Vec::new(),
        };
        let mut failures = Vec::new();

        for &release in &releases {
            let root = runtime_root(prefix, release);
            if !is_installed(prefix, release) {
                tracing::debug!("{} is not installed under {}", release, prefix.display());
                ui.message(&format!("MATLAB Runtime {} is not installed", release));
                report.skipped.push(release);
                continue;
            }

            confirm(
                ui,
                auto_answer,
                &Prompt::yes_by_default(
                    REMOVE_PROMPT,
                    format!("Remove {} and its content?", root.display()),
                ),
            )?;

            let outcome = self.backend.remove(&root).and_then(|()| {
                if is_installed(prefix, release) {
                    Err(RuntimeError::InstallerFailed {
                        message: format!("{} is still present after removal", root.display()),
                    })
                } else {
                    Ok(())
                }
            });
            match outcome {
                Ok(()) => {
                    ui.success(&format!("Removed MATLAB Runtime {}", release));
                    report.removed.push(release);
                }
                Err(error) => {
                    ui.error(&format!("Failed to remove {}: {}", release, error));
                    failures.push(VersionFailure {
                        release: release.to_string(),
                        error,
                    });
                }
            }
        }

        let succeeded = report.removed.iter().map(Release::to_string).collect();
        finish_batch(releases.len(), failures, succeeded).map(|()| report)
    }
}

/// Ask `prompt` unless `auto_answer` is set; a "no" is a [`RuntimeError::UserInterruption`].
/// The vendor installer resolves `-destinationFolder` against its own
/// working directory, so it is always handed an absolute path.
fn absolute_prefix(prefix: &Path) -> Result<PathBuf> {
    std::path::absolute(prefix).map_err(|e| RuntimeError::from_io(e, prefix))
}

fn confirm(ui: &mut dyn UserInterface, auto_answer: bool, prompt: &Prompt) -> Result<()> {
    if auto_answer {
        tracing::debug!("Auto-answering yes: {}", prompt.question);
        return Ok(());
    }
    if ui.confirm(prompt)? {
        Ok(())
    } else {
        Err(RuntimeError::UserInterruption {
            question: prompt.question.clone(),
        })
    }
}

fn finish_batch(
    requested: usize,
    mut failures: Vec<VersionFailure>,
    succeeded: Vec<String>,
) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    if requested == 1 && failures.len() == 1 {
        if let Some(failure) = failures.pop() {
            return Err(failure.error);
        }
    }
    Err(RuntimeError::PartialFailure {
        failures,
        succeeded,
    })
}

fn default_ui() -> Box<dyn UserInterface> {
    create_ui(!is_ci(), OutputMode::Normal)
}

/// Install MATLAB Runtime versions.
///
/// `versions` may hold release names, numeric versions or `latest`; an
/// empty slice installs the latest release. The prefix defaults to
/// [`guess_prefix`](crate::prefix::guess_prefix). Returns the prefix used.
pub fn install<S: AsRef<str>>(
    versions: &[S],
    prefix: Option<&Path>,
    auto_answer: bool,
) -> Result<PathBuf> {
    let prefix = resolve_prefix(prefix)?;
    let tokens = VersionToken::parse_list(versions);
    let mut ui = default_ui();
    Installer::new()?
        .install(&tokens, &prefix, auto_answer, ui.as_mut())
        .map(|report| report.prefix)
}

/// Uninstall MATLAB Runtime versions.
///
/// An empty slice removes every installed version.
pub fn uninstall<S: AsRef<str>>(versions: &[S], prefix: Option<&Path>, auto_answer: bool) -> Result<()> {
    let prefix = resolve_prefix(prefix)?;
    let tokens = VersionToken::parse_list(versions);
    let mut ui = default_ui();
    Installer::new()?
        .uninstall(&tokens, &prefix, auto_answer, ui.as_mut())
        .map(|_| ())
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::ui::MockUI;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn r(name: &str) -> Release {
        name.parse().unwrap()
    }

    fn tokens(items: &[&str]) -> Vec<VersionToken> {
        VersionToken::parse_list(items)
    }

    fn setup() -> (TempDir, Rc<RefCell<Calls>>, Installer) {
        let temp = TempDir::new().unwrap();
        let calls = Rc::new(RefCell::new(Calls::default()));
        let installer = fake_installer(FakeBackend {
            calls: calls.clone(),
            ..Default::default()
        });
        (temp, calls, installer)
    }

    #[test]
    fn installs_latest_by_default() {
        let (temp, calls, installer) = setup();
        let prefix = temp.path().join("mcr");
        let mut ui = MockUI::new();

        let report = installer.install(&[], &prefix, true, &mut ui).unwrap();

        assert_eq!(report.installed, vec![r("R2024b")]);
        assert_eq!(report.prefix, prefix);
        assert!(is_installed(&prefix, r("R2024b")));
        assert_eq!(calls.borrow().fetched, ["R2024b"]);
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn second_install_is_a_noop() {
        let (temp, calls, installer) = setup();
        let mut ui = MockUI::new();

        installer
            .install(&tokens(&["R2023a"]), temp.path(), true, &mut ui)
            .unwrap();
        let report = installer
            .install(&tokens(&["9.14"]), temp.path(), true, &mut ui)
            .unwrap();

        assert!(report.installed.is_empty());
        assert_eq!(report.skipped, vec![r("R2023a")]);
        assert_eq!(calls.borrow().runs.len(), 1);
    }

    #[test]
    fn duplicate_tokens_install_once() {
        let (temp, calls, installer) = setup();
        let mut ui = MockUI::new();
        let report = installer
            .install(&tokens(&["R2022b", "9.13"]), temp.path(), true, &mut ui)
            .unwrap();
        assert_eq!(report.installed, vec![r("R2022b")]);
        assert_eq!(report.skipped, vec![r("R2022b")]);
        assert_eq!(calls.borrow().runs.len(), 1);
    }

    #[test]
    fn interactive_install_asks_download_then_license() {
        let (temp, _calls, installer) = setup();
        let mut ui = MockUI::new();
        ui.set_answer(LICENSE_PROMPT, true);

        installer
            .install(&tokens(&["R2024a"]), temp.path(), false, &mut ui)
            .unwrap();
        assert_eq!(ui.prompts_shown(), [DOWNLOAD_PROMPT, LICENSE_PROMPT]);
    }

    #[test]
    fn declining_download_aborts_without_touching_prefix() {
        let (temp, calls, installer) = setup();
        let prefix = temp.path().join("mcr");
        let mut ui = MockUI::new();
        ui.set_answer(DOWNLOAD_PROMPT, false);

        let err = installer
            .install(&tokens(&["R2024b"]), &prefix, false, &mut ui)
            .unwrap_err();

        assert!(matches!(err, RuntimeError::UserInterruption { .. }));
        assert!(!prefix.exists());
        assert!(calls.borrow().fetched.is_empty());
    }

    #[test]
    fn declining_license_aborts_whole_batch() {
        let (temp, calls, installer) = setup();
        let prefix = temp.path().join("mcr");
        let mut ui = MockUI::new();
        ui.set_answer(LICENSE_PROMPT, false);

        let err = installer
            .install(&tokens(&["R2024b", "R2024a"]), &prefix, false, &mut ui)
            .unwrap_err();

        assert!(matches!(err, RuntimeError::UserInterruption { .. }));
        assert!(!prefix.exists());
        assert!(calls.borrow().runs.is_empty());
        assert_eq!(calls.borrow().fetched.len(), 1);
    }

    #[test]
    fn license_without_answer_is_interruption() {
        let (temp, _calls, installer) = setup();
        let mut ui = MockUI::new();
        let err = installer
            .install(&tokens(&["R2024b"]), temp.path(), false, &mut ui)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::UserInterruption { .. }));
    }

    #[test]
    fn failures_are_collected_and_others_continue() {
        let temp = TempDir::new().unwrap();
        let calls = Rc::new(RefCell::new(Calls::default()));
        let installer = fake_installer(FakeBackend {
            calls: calls.clone(),
            failing: vec!["R2022b".into()],
            ..Default::default()
        });
        let mut ui = MockUI::new();

        let err = installer
            .install(&tokens(&["R2022b", "R2024b"]), temp.path(), true, &mut ui)
            .unwrap_err();

        match err {
            RuntimeError::PartialFailure {
                failures,
                succeeded,
            } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].release, "R2022b");
                assert_eq!(succeeded, ["R2024b"]);
            }
            other => panic!("expected PartialFailure, got {other:?}"),
        }
        assert!(is_installed(temp.path(), r("R2024b")));
        assert!(ui.has_error("R2022b"));
    }

    #[test]
    fn single_failure_returns_its_own_error() {
        let temp = TempDir::new().unwrap();
        let installer = fake_installer(FakeBackend {
            failing: vec!["R2022b".into()],
            ..Default::default()
        });
        let mut ui = MockUI::new();
        let err = installer
            .install(&tokens(&["R2022b"]), temp.path(), true, &mut ui)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::InstallerFailed { .. }));
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn missing_record_after_install_is_installer_failure() {
        let temp = TempDir::new().unwrap();
        let installer = fake_installer(FakeBackend {
            silent_noop: vec!["R2021a".into()],
            ..Default::default()
        });
        let mut ui = MockUI::new();
        let err = installer
            .install(&tokens(&["R2021a"]), temp.path(), true, &mut ui)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::InstallerFailed { .. }));
    }

    #[test]
    fn unknown_version_fails_before_any_work() {
        let (temp, calls, installer) = setup();
        let mut ui = MockUI::new();
        let err = installer
            .install(&tokens(&["R2099a"]), temp.path(), true, &mut ui)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownVersion { .. }));
        assert!(calls.borrow().fetched.is_empty());
    }

    #[test]
    fn install_then_uninstall_round_trips() {
        let (temp, _calls, installer) = setup();
        let mut ui = MockUI::new();
        installer
            .install(&tokens(&["R2019b"]), temp.path(), true, &mut ui)
            .unwrap();
        let before = InstalledSet::scan(temp.path()).unwrap();
        installer
            .install(&tokens(&["R2023b"]), temp.path(), true, &mut ui)
            .unwrap();
        installer
            .uninstall(&tokens(&["R2023b"]), temp.path(), true, &mut ui)
            .unwrap();
        assert_eq!(InstalledSet::scan(temp.path()).unwrap(), before);
    }

    #[test]
    fn uninstall_all_empties_prefix() {
        let (temp, calls, installer) = setup();
        let mut ui = MockUI::new();
        installer
            .install(&tokens(&["R2022b", "R2024b"]), temp.path(), true, &mut ui)
            .unwrap();

        let report = installer
            .uninstall(&tokens(&["all"]), temp.path(), true, &mut ui)
            .unwrap();

        assert_eq!(report.removed, vec![r("R2022b"), r("R2024b")]);
        assert!(InstalledSet::scan(temp.path()).unwrap().is_empty());
        assert_eq!(calls.borrow().removed.len(), 2);
    }

    #[test]
    fn uninstall_all_on_empty_prefix_is_noop() {
        let (temp, calls, installer) = setup();
        let mut ui = MockUI::new();
        let report = installer
            .uninstall(&[], &temp.path().join("missing"), false, &mut ui)
            .unwrap();
        assert!(report.removed.is_empty());
        assert!(calls.borrow().removed.is_empty());
    }

    #[test]
    fn uninstall_absent_release_is_skipped() {
        let (temp, _calls, installer) = setup();
        let mut ui = MockUI::new();
        let report = installer
            .uninstall(&tokens(&["R2020a"]), temp.path(), false, &mut ui)
            .unwrap();
        assert_eq!(report.skipped, vec![r("R2020a")]);
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn declining_removal_keeps_files() {
        let (temp, calls, installer) = setup();
        let mut ui = MockUI::new();
        installer
            .install(&tokens(&["R2024b"]), temp.path(), true, &mut ui)
            .unwrap();
        ui.set_answer(REMOVE_PROMPT, false);

        let err = installer
            .uninstall(&tokens(&["R2024b"]), temp.path(), false, &mut ui)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::UserInterruption { .. }));
        assert!(is_installed(temp.path(), r("R2024b")));
        assert!(calls.borrow().removed.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn unwritable_prefix_is_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        if crate::platform::is_elevated() {
            return;
        }
        let (temp, _calls, installer) = setup();
        let locked = temp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        let mut ui = MockUI::new();
        let err = installer
            .install(&tokens(&["R2024b"]), &locked.join("mcr"), true, &mut ui)
            .unwrap_err();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(err, RuntimeError::PermissionDenied { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn existing_read_only_prefix_is_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        if crate::platform::is_elevated() {
            return;
        }
        let (temp, calls, installer) = setup();
        let prefix = temp.path().join("mcr");
        fs::create_dir(&prefix).unwrap();
        fs::set_permissions(&prefix, fs::Permissions::from_mode(0o555)).unwrap();

        let mut ui = MockUI::new();
        let err = installer
            .install(&tokens(&["R2024b"]), &prefix, true, &mut ui)
            .unwrap_err();
        fs::set_permissions(&prefix, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(err, RuntimeError::PermissionDenied { .. }));
        assert_eq!(err.exit_code(), 5);
        assert!(calls.borrow().runs.is_empty());
    }

    #[test]
    fn installer_receives_absolute_prefix() {
        let (temp, calls, installer) = setup();
        let prefix = temp.path().join("mcr");
        let mut ui = MockUI::new();

        installer
            .install(&tokens(&["R2024b"]), &prefix, true, &mut ui)
            .unwrap();

        assert_eq!(calls.borrow().prefixes, [prefix]);
    }

    #[test]
    fn relative_prefix_is_made_absolute() {
        let absolute = absolute_prefix(Path::new("mcr")).unwrap();
        assert!(absolute.is_absolute());
        assert!(absolute.ends_with("mcr"));
        #[cfg(unix)]
        assert_eq!(absolute_prefix(Path::new("/opt/mcr")).unwrap(), Path::new("/opt/mcr"));
    }

    #[test]
    fn report_serializes_release_names() {
        let report = InstallReport {
            prefix: PathBuf::from("/opt/mcr"),
            installed: vec![r("R2024b")],
            skipped: vec![],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["installed"][0], "R2024b");
    }
}
