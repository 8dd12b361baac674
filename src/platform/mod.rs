//! Platform detection.
//!
//! - [`OsFamily`] and [`Arch`] describe the host
//! - [`Platform`] selects the [`PlatformOps`] implementation for the host
//!   once, so installer paths, library variables and uninstall mechanics
//!   are looked up in a single place

pub mod arch;
pub mod ops;
pub mod system;

pub use arch::{Arch, OsFamily};
pub use ops::{LinuxOps, MacOps, Platform, PlatformOps, WindowsOps};
pub use system::{is_ci, is_elevated, privilege_hint};
