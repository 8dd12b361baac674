//! What is installed on this machine.
//!
//! - [`InstalledSet`] lists the releases under a prefix (never cached)
//! - [`VersionInfo`] reads the `VersionInfo.xml` stamp of an installation
//! - [`find_runtime`] also looks outside the prefix

pub mod locate;
pub mod scan;
pub mod version_info;

pub use locate::{candidate_locations, find_runtime, find_runtime_in, MATLAB_PATH_ENV};
pub use scan::{has_installation_record, is_installed, runtime_root, InstalledSet, LICENSE_FILE};
pub use version_info::{VersionInfo, VERSION_INFO};
