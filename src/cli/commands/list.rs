//! List command implementation.
//!
//! `install_matlab_runtime --list [--json]` shows the releases published
//! for this platform and marks those installed under the prefix.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::catalog::Release;
use crate::error::{Result, RuntimeError};
use crate::installed::InstalledSet;
use crate::installer::Installer;
use crate::ui::{should_use_colors, RuntimeTheme, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// One row of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub release: Release,
    /// Numeric version, when known.
    pub version: Option<String>,
    pub installed: bool,
    /// Whether an installer is published for this platform.
    pub available: bool,
}

/// Full listing, as printed by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub prefix: PathBuf,
    pub arch: String,
    pub releases: Vec<ListEntry>,
}

/// Build the listing for `prefix`, newest release first.
pub fn build_listing(installer: &Installer, prefix: &Path) -> Result<Listing> {
    let arch = installer.platform().arch();
    let catalog = installer.catalog();
    let installed = InstalledSet::scan(prefix)?;

    let mut releases: BTreeSet<Release> = catalog.available(arch).into_iter().collect();
    releases.extend(installed.releases());

    let releases = releases
        .into_iter()
        .rev()
        .map(|release| ListEntry {
            release,
            version: catalog.numeric_version(release),
            installed: installed.contains(release),
            available: catalog.installer(release, arch).is_some(),
        })
        .collect();

    Ok(Listing {
        prefix: prefix.to_path_buf(),
        arch: arch.to_string(),
        releases,
    })
}

/// The list command implementation.
pub struct ListCommand {
    prefix: Option<PathBuf>,
    json: bool,
}

impl ListCommand {
    pub fn new(prefix: Option<PathBuf>, json: bool) -> Self {
        Self { prefix, json }
    }
}

impl Command for ListCommand {
    fn execute(&self, installer: &Installer, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let prefix = crate::prefix::resolve_prefix(self.prefix.as_deref())?;
        let listing = build_listing(installer, &prefix)?;

        if self.json {
            let output = serde_json::to_string_pretty(&listing)
                .map_err(|e| RuntimeError::Other(e.into()))?;
            println!("{}", output);
            return Ok(CommandResult::success());
        }

        let theme = if should_use_colors() {
            RuntimeTheme::new()
        } else {
            RuntimeTheme::plain()
        };
        ui.message(&format!(
            "  {} {}",
            theme.highlight.apply_to("Prefix:"),
            theme.dim.apply_to(listing.prefix.display())
        ));
        for entry in &listing.releases {
            let version = entry.version.as_deref().unwrap_or("-");
            let status = match (entry.installed, entry.available) {
                (true, _) => theme.success.apply_to("installed").to_string(),
                (false, true) => theme.dim.apply_to("available").to_string(),
                (false, false) => theme.dim.apply_to("unavailable").to_string(),
            };
            ui.message(&format!(
                "    {:<10} {:<8} {}",
                theme.release.apply_to(entry.release),
                version,
                status
            ));
        }
        Ok(CommandResult::success())
    }
}
