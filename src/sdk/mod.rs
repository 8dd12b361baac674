//! Process environment setup for using an installed runtime.
//!
//! One [`RuntimeSession`] owns every environment write the crate makes.
//! Initializing points `MCRROOT` at the selected runtime and puts its
//! library directories at the front of the loader search path; a second
//! initialization replaces the first one's directories instead of stacking
//! them, so two runtimes are never visible at once.
//!
//! The process-wide session sits behind a mutex and is reached through
//! [`init_sdk`], [`active_runtime`] and [`with_session`].

pub mod env;

pub use env::{EnvStore, MemoryEnv, ProcessEnv};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use serde::Serialize;

use crate::catalog::Release;
use crate::deployed::{default_search_dirs, DeployedPackage, PackageRef};
use crate::error::{Result, RuntimeError};
use crate::installed::{is_installed, runtime_root, InstalledSet, VersionInfo, VERSION_INFO};
use crate::installer::Installer;
use crate::platform::{is_ci, Platform};
use crate::prefix::{ResolvedPrefix, PREFIX_ENV};
use crate::ui::{create_ui, OutputMode, UserInterface};
use crate::version::{ResolveMode, VersionResolver, VersionToken};

/// Variable pointing at the root of the active runtime.
pub const MCRROOT: &str = "MCRROOT";

/// Options of [`init_sdk`].
#[derive(Debug, Clone, Default)]
pub struct SdkOptions {
    /// Version to activate; empty means `latest_installed`.
    pub versions: Vec<VersionToken>,
    /// Install the version when it is missing.
    pub install_if_missing: bool,
    /// Installation prefix; defaults to [`guess_prefix`](crate::prefix::guess_prefix).
    pub prefix: Option<PathBuf>,
    /// Answer yes to every prompt of an implied install.
    pub auto_answer: bool,
}

impl SdkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, token: &str) -> Self {
        self.versions.push(VersionToken::from(token));
        self
    }

    pub fn install_if_missing(mut self, install: bool) -> Self {
        self.install_if_missing = install;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn auto_answer(mut self, yes: bool) -> Self {
        self.auto_answer = yes;
        self
    }
}

/// The runtime a session has activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveRuntime {
    pub release: Release,
    /// Installation root, also exported as `MCRROOT`.
    pub root: PathBuf,
    /// Loader variable the library directories were prepended to.
    pub library_var: &'static str,
    /// Directories this session injected.
    pub library_dirs: Vec<PathBuf>,
}

/// Owner of the runtime-related environment state.
pub struct RuntimeSession<E: EnvStore> {
    env: E,
    platform: Option<Platform>,
    active: Option<ActiveRuntime>,
    deployed: HashMap<PathBuf, Arc<DeployedPackage>>,
}

impl<E: EnvStore> RuntimeSession<E> {
    pub fn new(env: E) -> Self {
        Self {
            env,
            platform: None,
            active: None,
            deployed: HashMap::new(),
        }
    }

    /// The environment this session writes to.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// The active runtime, if initialized.
    pub fn active(&self) -> Option<&ActiveRuntime> {
        self.active.as_ref()
    }

    /// Select a runtime and point the environment at it.
    ///
    /// Nothing is written when the selected release is missing and
    /// `install_if_missing` is off.
    pub fn initialize(
        &mut self,
        options: &SdkOptions,
        installer: &Installer,
        ui: &mut dyn UserInterface,
    ) -> Result<ActiveRuntime> {
        let platform = installer.platform();
        let env_prefix = self.env.get(PREFIX_ENV).and_then(|v| v.into_string().ok());
        let resolved = ResolvedPrefix::resolve_with(
            options.prefix.as_deref(),
            env_prefix.as_deref(),
            || Ok(platform.family()),
        )?;
        tracing::debug!("Using prefix {} ({})", resolved.path.display(), resolved.source);
        let prefix = resolved.path;

        let installed = InstalledSet::scan(&prefix)?;
        let mode = ResolveMode::Environment {
            install_if_missing: options.install_if_missing,
        };
        let releases = VersionResolver::new(installer.catalog(), platform.arch()).resolve(
            &options.versions,
            mode,
            &installed,
        )?;
        let release = match releases.as_slice() {
            [release] => *release,
            _ => {
                return Err(RuntimeError::UnknownVersion {
                    version: options
                        .versions
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(","),
                    message: "exactly one runtime can be active".to_string(),
                })
            }
        };

        if !is_installed(&prefix, release) {
            if !options.install_if_missing {
                return Err(RuntimeError::RuntimeNotFound {
                    release: release.to_string(),
                    prefix,
                });
            }
            installer.install_releases(&[release], &prefix, options.auto_answer, ui)?;
        }

        let root = runtime_root(&prefix, release);
        check_version_info(&root, release)?;
        self.activate(platform, release, root)
    }

    fn activate(&mut self, platform: Platform, release: Release, root: PathBuf) -> Result<ActiveRuntime> {
        let var = platform.ops().library_path_var();
        let dirs = platform.library_dirs(&root);
        let previous = self
            .active
            .as_ref()
            .map(|a| a.library_dirs.clone())
            .unwrap_or_default();

        let existing = self.env.get(var).unwrap_or_default();
        let kept: Vec<PathBuf> = std::env::split_paths(&existing)
            .filter(|p| !p.as_os_str().is_empty() && !previous.contains(p) && !dirs.contains(p))
            .collect();
        let joined = std::env::join_paths(dirs.iter().chain(kept.iter())).map_err(|e| {
            RuntimeError::Other(anyhow::anyhow!("Cannot update {}: {}", var, e))
        })?;

        self.env.set(var, &joined);
        self.env.set(MCRROOT, root.as_os_str());

        if self.active.as_ref().map(|a| a.release) != Some(release) && !self.deployed.is_empty() {
            tracing::debug!("Runtime changed; dropping {} cached packages", self.deployed.len());
            self.deployed.clear();
        }

        tracing::info!("Activated MATLAB Runtime {} at {}", release, root.display());
        let active = ActiveRuntime {
            release,
            root,
            library_var: var,
            library_dirs: dirs,
        };
        self.platform = Some(platform);
        self.active = Some(active.clone());
        Ok(active)
    }

    /// Undo [`initialize`](Self::initialize): remove the injected directories
    /// and `MCRROOT`, and forget loaded packages.
    pub fn deactivate(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        if let Some(existing) = self.env.get(active.library_var) {
            let kept: Vec<PathBuf> = std::env::split_paths(&existing)
                .filter(|p| !p.as_os_str().is_empty() && !active.library_dirs.contains(p))
                .collect();
            if kept.is_empty() {
                self.env.remove(active.library_var);
            } else if let Ok(joined) = std::env::join_paths(&kept) {
                self.env.set(active.library_var, &joined);
            }
        }
        self.env.remove(MCRROOT);
        self.deployed.clear();
        tracing::info!("Deactivated MATLAB Runtime {}", active.release);
    }

    /// Load `package` against the active runtime, reusing a cached handle.
    pub fn import(&mut self, package: &PackageRef, search_dirs: &[PathBuf]) -> Result<Arc<DeployedPackage>> {
        let (Some(active), Some(platform)) = (self.active.as_ref(), self.platform) else {
            return Err(RuntimeError::DeploymentLoad {
                package: package.to_string(),
                message: "no MATLAB Runtime is active".to_string(),
            });
        };

        let location = package.locate(search_dirs)?;
        if let Some(cached) = self.deployed.get(&location.path) {
            tracing::debug!("Reusing loaded package {}", location.name);
            return Ok(Arc::clone(cached));
        }

        let loaded = Arc::new(DeployedPackage::load(location, active, platform)?);
        self.deployed
            .insert(loaded.path().to_path_buf(), Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Number of packages currently cached.
    pub fn loaded_packages(&self) -> usize {
        self.deployed.len()
    }
}

fn check_version_info(root: &Path, release: Release) -> Result<()> {
    if !root.join(VERSION_INFO).is_file() {
        return Ok(());
    }
    match VersionInfo::load(root)?.parsed_release() {
        Some(found) if found != release => Err(RuntimeError::DeploymentLoad {
            package: root.display().to_string(),
            message: format!("{} reports {} but {} was selected", VERSION_INFO, found, release),
        }),
        _ => Ok(()),
    }
}

static SESSION: LazyLock<Mutex<RuntimeSession<ProcessEnv>>> =
    LazyLock::new(|| Mutex::new(RuntimeSession::new(ProcessEnv)));

/// Run `f` with exclusive access to the process-wide session.
pub fn with_session<T>(f: impl FnOnce(&mut RuntimeSession<ProcessEnv>) -> T) -> T {
    let mut session = SESSION.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut session)
}

/// Point the process environment at an installed MATLAB Runtime.
///
/// Calling it again replaces the previous runtime.
pub fn init_sdk(options: &SdkOptions) -> Result<ActiveRuntime> {
    let installer = Installer::new()?;
    let mut ui = create_ui(!is_ci(), OutputMode::Normal);
    with_session(|session| session.initialize(options, &installer, ui.as_mut()))
}

/// The runtime activated by [`init_sdk`], if any.
pub fn active_runtime() -> Option<ActiveRuntime> {
    with_session(|session| session.active().cloned())
}

/// Load deployed packages, initializing the runtime with defaults first
/// when nothing is active yet.
pub fn import_deployed<I, P>(packages: I) -> Result<Vec<Arc<DeployedPackage>>>
where
    I: IntoIterator<Item = P>,
    P: Into<PackageRef>,
{
    let search_dirs = default_search_dirs();
    with_session(|session| -> Result<Vec<Arc<DeployedPackage>>> {
        if session.active().is_none() {
            let installer = Installer::new()?;
            let mut ui = create_ui(!is_ci(), OutputMode::Normal);
            session.initialize(&SdkOptions::default(), &installer, ui.as_mut())?;
        }
        packages
            .into_iter()
            .map(|package| session.import(&package.into(), &search_dirs))
            .collect()
    })
}
