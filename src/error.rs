// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Error types for discovery, resolution and activation

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::ToolchainInstallation;

/// Why a single installation was left out of the catalog
///
/// These never abort a scan; they are logged and the entry is skipped.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest {path} could not be read: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest {path} has no <string> value for key {key}")]
    MissingKey { path: PathBuf, key: &'static str },

    #[error("manifest {path} has an invalid version: {reason}")]
    InvalidVersion { path: PathBuf, reason: String },
}

/// Failure to switch the active toolchain
///
/// When any of these is returned the previously active toolchain is still in
/// effect.
#[derive(Debug, Error)]
pub enum ActivationError {
    /// The installation disappeared after the catalog was built
    #[error("toolchain at {0} no longer exists")]
    TargetMissing(PathBuf),

    /// Something other than a symlink occupies the link path
    #[error("{0} exists and is not a symlink; refusing to replace it")]
    NotALink(PathBuf),

    /// The indirection could not be written
    #[error("permission denied while updating {path}: {source}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registration command failed, so the link was not switched
    #[error("registration command '{command}' failed ({status}){}", format_output(.output))]
    RegistrationFailed {
        command: String,
        status: String,
        output: String,
    },

    #[error("failed to update {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ActivationError {
    /// Classify an I/O error raised while touching the indirection
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { path, source }
        } else {
            Self::Io { path, source }
        }
    }
}

/// Outcome of a full select run that did not end in an activated toolchain
#[derive(Debug, Error)]
pub enum SelectError {
    /// Nothing in the catalog satisfied the request
    #[error("no installed toolchain matches '{spec}' ({} installed)", .candidates.len())]
    NoMatch {
        spec: String,
        candidates: Vec<ToolchainInstallation>,
    },

    #[error(transparent)]
    Activation(#[from] ActivationError),
}

fn format_output(output: &str) -> String {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{trimmed}")
    }
}
