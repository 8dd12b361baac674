//! MATLAB Runtime installer.
//!
//! Locates, downloads, installs and uninstalls the MATLAB Runtime, and sets
//! up the process environment so compiled ("deployed") MATLAB packages can
//! be loaded against it.
//!
//! # Modules
//!
//! - [`catalog`] - Known releases, numeric versions and installer URLs
//! - [`cli`] - Command-line interface of `install_matlab_runtime`
//! - [`deployed`] - Locating and loading deployed packages
//! - [`error`] - Error types and result aliases
//! - [`installed`] - Installed-release discovery
//! - [`installer`] - Install/uninstall orchestration and backends
//! - [`platform`] - OS and architecture detection, per-family mechanics
//! - [`prefix`] - Installation prefix resolution
//! - [`sdk`] - Runtime session: library paths and `MCRROOT`
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//! - [`version`] - Version tokens and their resolution
//!
//! # Example
//!
//! ```
//! use matlab_runtime::catalog::Catalog;
//! use matlab_runtime::platform::Arch;
//!
//! let catalog = Catalog::bundled();
//! let release = catalog.canonicalize("9.13").unwrap();
//! assert_eq!(release.to_string(), "R2022b");
//! assert!(catalog.installer(release, Arch::Glnxa64).is_some());
//! ```

pub mod catalog;
pub mod cli;
pub mod deployed;
pub mod error;
pub mod installed;
pub mod installer;
pub mod platform;
pub mod prefix;
pub mod sdk;
pub mod ui;
pub mod version;

pub use deployed::{DeployedPackage, PackageRef};
pub use error::{Result, RuntimeError};
pub use installed::find_runtime;
pub use installer::{install, uninstall};
pub use prefix::{guess_prefix, resolve_prefix};
pub use sdk::{active_runtime, import_deployed, init_sdk, ActiveRuntime, SdkOptions};
