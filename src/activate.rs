// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Switching the system-wide active toolchain
//!
//! The active toolchain is a single symlink (the layout's `link_path`). It is
//! replaced by renaming a freshly created link over it, so readers see either
//! the old or the new target. The registration command runs against the new
//! target before the link moves, so a failed registration leaves the link
//! as it was.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{Catalog, ToolchainInstallation};
use crate::error::{ActivationError, SelectError};
use crate::platform::Layout;
use crate::resolver::resolve;

/// What is in effect after a successful switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationResult {
    pub version: String,
    #[serde(rename = "build")]
    pub build_identifier: String,
    #[serde(rename = "path")]
    pub install_path: PathBuf,
}

impl From<&ToolchainInstallation> for ActivationResult {
    fn from(installation: &ToolchainInstallation) -> Self {
        Self {
            version: installation.version().to_string(),
            build_identifier: installation.build_identifier().to_string(),
            install_path: installation.install_path().to_path_buf(),
        }
    }
}

/// Applies a selection to the host
pub struct Activator<'a> {
    layout: &'a Layout,
}

impl<'a> Activator<'a> {
    #[must_use]
    pub fn new(layout: &'a Layout) -> Self {
        Self { layout }
    }

    /// Make `installation` the active toolchain
    ///
    /// # Errors
    /// - [`ActivationError::TargetMissing`] if the installation directory or
    ///   its link subdirectory is gone
    /// - [`ActivationError::NotALink`] if something other than a symlink sits
    ///   at the link path
    /// - [`ActivationError::RegistrationFailed`] if the registration command
    ///   cannot be started or exits non-zero
    /// - [`ActivationError::PermissionDenied`] if the link cannot be written
    pub fn activate(
        &self,
        installation: &ToolchainInstallation,
    ) -> Result<ActivationResult, ActivationError> {
        let install_path = installation.install_path();
        if !install_path.is_dir() {
            return Err(ActivationError::TargetMissing(install_path.to_path_buf()));
        }

        let target = self.layout.link_target(install_path);
        if !target.is_dir() {
            return Err(ActivationError::TargetMissing(target));
        }

        let link = &self.layout.link_path;
        if let Ok(metadata) = fs::symlink_metadata(link)
            && !metadata.file_type().is_symlink()
        {
            return Err(ActivationError::NotALink(link.clone()));
        }

        // The link keeps its old target until registration has succeeded
        if let Some(command) = &self.layout.registration {
            run_registration(command, &target)?;
        }

        if let Some(parent) = link.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| ActivationError::from_io(parent.to_path_buf(), e))?;
        }

        replace_link(&target, link)?;
        debug!(link = %link.display(), target = %target.display(), "switched link");

        info!(
            version = %installation.version(),
            build = installation.build_identifier(),
            path = %install_path.display(),
            "activated toolchain"
        );
        Ok(ActivationResult::from(installation))
    }
}

/// Installation the active link currently points at, if any
#[must_use]
pub fn current(layout: &Layout) -> Option<PathBuf> {
    fs::read_link(&layout.link_path)
        .ok()
        .map(|target| layout.install_path_for_target(&target))
}

/// Resolve `spec` against `catalog` and activate the match
///
/// With `dry_run` set the match is reported without touching the host.
///
/// # Errors
/// [`SelectError::NoMatch`] carries the full catalog for diagnostics;
/// [`SelectError::Activation`] wraps any activation failure.
pub fn switch(
    spec: &str,
    catalog: &Catalog,
    dry_run: bool,
) -> Result<ActivationResult, SelectError> {
    let candidates = catalog.installations();
    let Some(selected) = resolve(spec, candidates) else {
        return Err(SelectError::NoMatch {
            spec: spec.to_string(),
            candidates: candidates.to_vec(),
        });
    };

    if dry_run {
        return Ok(ActivationResult::from(selected));
    }

    Ok(Activator::new(catalog.layout()).activate(selected)?)
}

/// Atomically point `link` at `target`
fn replace_link(target: &Path, link: &Path) -> Result<(), ActivationError> {
    let temp = temp_link_path(link);

    // Left over from an interrupted run
    let _ = fs::remove_file(&temp);

    std::os::unix::fs::symlink(target, &temp)
        .map_err(|e| ActivationError::from_io(temp.clone(), e))?;

    if let Err(e) = fs::rename(&temp, link) {
        let _ = fs::remove_file(&temp);
        return Err(ActivationError::from_io(link.to_path_buf(), e));
    }

    Ok(())
}

fn temp_link_path(link: &Path) -> PathBuf {
    let name = link
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    link.with_file_name(format!(".{name}.tcswitch-{}", std::process::id()))
}

/// Run the host registration command against a prospective target
fn run_registration(command: &[String], developer_dir: &Path) -> Result<(), ActivationError> {
    let command_line = command.join(" ");
    let Some((program, args)) = command.split_first() else {
        return Ok(());
    };

    let program = which::which(program).map_err(|e| ActivationError::RegistrationFailed {
        command: command_line.clone(),
        status: "not found".to_string(),
        output: e.to_string(),
    })?;

    debug!(command = %command_line, "running registration");
    let output = Command::new(&program)
        .args(args)
        .env("DEVELOPER_DIR", developer_dir)
        .output()
        .map_err(|e| ActivationError::RegistrationFailed {
            command: command_line.clone(),
            status: "could not start".to_string(),
            output: e.to_string(),
        })?;

    if output.status.success() {
        return Ok(());
    }

    let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
    captured.push_str(&String::from_utf8_lossy(&output.stderr));

    Err(ActivationError::RegistrationFailed {
        command: command_line,
        status: output.status.to_string(),
        output: captured,
    })
}
