// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Discovery of installed toolchains
//!
//! Walks the layout's search roots, reads each installation's property-list
//! manifest and builds the candidate list handed to the resolver. A broken
//! installation is logged and skipped; it never hides the others.

use std::cell::OnceCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ManifestError;
use crate::platform::Layout;
use crate::version::ToolchainVersion;

/// Manifest key holding the marketing version
pub const VERSION_KEY: &str = "CFBundleShortVersionString";

/// Manifest key holding the vendor build tag
pub const BUILD_KEY: &str = "ProductBuildVersion";

/// One discovered installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainInstallation {
    version: ToolchainVersion,
    #[serde(rename = "build")]
    build_identifier: String,
    #[serde(rename = "path")]
    install_path: PathBuf,
}

impl ToolchainInstallation {
    pub fn new(
        version: ToolchainVersion,
        build_identifier: impl Into<String>,
        install_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            version,
            build_identifier: build_identifier.into(),
            install_path: install_path.into(),
        }
    }

    #[must_use]
    pub fn version(&self) -> &ToolchainVersion {
        &self.version
    }

    #[must_use]
    pub fn build_identifier(&self) -> &str {
        &self.build_identifier
    }

    #[must_use]
    pub fn install_path(&self) -> &Path {
        &self.install_path
    }
}

/// Installations found on this host, scanned at most once
///
/// The scan runs on first access and the result is reused for the rest of
/// the process; nothing is written to disk.
pub struct Catalog {
    layout: Layout,
    installations: OnceCell<Vec<ToolchainInstallation>>,
}

impl Catalog {
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            installations: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Installations in scan order
    pub fn installations(&self) -> &[ToolchainInstallation] {
        self.installations.get_or_init(|| scan(&self.layout))
    }
}

/// Scan every search root of `layout` for installations
///
/// Roots are visited in configured order and entries within a root in
/// file name order, so repeated scans of an unchanged tree agree. Missing
/// roots contribute nothing.
pub fn scan(layout: &Layout) -> Vec<ToolchainInstallation> {
    let mut installations = Vec::new();
    let mut seen = HashSet::new();

    for root in &layout.search_roots {
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(root = %root.display(), error = %e, "skipping search root");
                continue;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| layout.is_bundle_name(name))
            })
            .map(|entry| entry.path())
            .collect();
        paths.sort();

        for path in paths {
            if path == layout.link_path || !path.is_dir() {
                continue;
            }

            // Aliases of an install already seen would break path uniqueness
            let canonical = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
            if !seen.insert(canonical.clone()) {
                debug!(path = %path.display(), "skipping duplicate installation");
                continue;
            }

            // An alias is reported as the install it points at
            let install_path = if path.is_symlink() {
                canonical
            } else {
                std::path::absolute(&path).unwrap_or(path)
            };
            match read_installation(layout, &install_path) {
                Ok(installation) => {
                    debug!(
                        version = %installation.version,
                        build = %installation.build_identifier,
                        path = %installation.install_path.display(),
                        "found toolchain"
                    );
                    installations.push(installation);
                }
                Err(e) => warn!("skipping toolchain: {e}"),
            }
        }
    }

    installations
}

/// Read the manifest of a single installation
///
/// # Errors
/// Returns [`ManifestError`] if the manifest is missing, unreadable, lacks
/// the version or build keys, or carries a version that is not
/// `major.minor[.patch]`.
pub fn read_installation(
    layout: &Layout,
    install_path: &Path,
) -> Result<ToolchainInstallation, ManifestError> {
    let manifest = install_path.join(&layout.manifest_path);
    let content = fs::read_to_string(&manifest).map_err(|source| ManifestError::Unreadable {
        path: manifest.clone(),
        source,
    })?;

    let version_text =
        plist_string(&content, VERSION_KEY).ok_or_else(|| ManifestError::MissingKey {
            path: manifest.clone(),
            key: VERSION_KEY,
        })?;
    let build = plist_string(&content, BUILD_KEY).ok_or_else(|| ManifestError::MissingKey {
        path: manifest.clone(),
        key: BUILD_KEY,
    })?;

    let version = version_text
        .parse::<ToolchainVersion>()
        .map_err(|reason| ManifestError::InvalidVersion {
            path: manifest.clone(),
            reason,
        })?;

    Ok(ToolchainInstallation::new(version, build, install_path))
}

/// Find the `<string>` value that follows `<key>{key}</key>` in a plist
///
/// Only the flat top-level dictionary shape used by version manifests is
/// understood. The predefined XML entities are decoded; empty values count
/// as absent.
///
/// # Examples
/// ```
/// use tcswitch::catalog::plist_string;
/// let xml = "<dict>\n  <key>ProductBuildVersion</key>\n  <string>15A240d</string>\n</dict>";
/// assert_eq!(plist_string(xml, "ProductBuildVersion"), Some("15A240d".to_string()));
/// assert_eq!(plist_string(xml, "CFBundleVersion"), None);
/// ```
#[must_use]
pub fn plist_string(content: &str, key: &str) -> Option<String> {
    let needle = format!("<key>{key}</key>");
    let start = content.find(&needle)? + needle.len();
    let rest = content[start..].trim_start().strip_prefix("<string>")?;
    let end = rest.find("</string>")?;
    let value = unescape_xml(rest[..end].trim());

    if value.is_empty() { None } else { Some(value) }
}

fn unescape_xml(text: &str) -> String {
    const ENTITIES: [(&str, char); 5] = [
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&apos;", '\''),
        ("&amp;", '&'),
    ];

    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        decoded.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(*entity)) {
            Some((entity, ch)) => {
                decoded.push(*ch);
                rest = &rest[entity.len()..];
            }
            None => {
                decoded.push('&');
                rest = &rest[1..];
            }
        }
    }
    decoded.push_str(rest);
    decoded
}
