// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Platform install conventions
//!
//! A [`Layout`] describes where side-by-side toolchain installations live on a
//! host, how their manifest is named, which link acts as the system-wide
//! "current toolchain" indirection and what registration command the host
//! toolchain manager expects after a switch.

use std::path::{Path, PathBuf};

/// Environment variable overriding the search roots (colon-separated)
pub const ENV_SEARCH_PATH: &str = "TCSWITCH_SEARCH_PATH";

/// Environment variable overriding the active-toolchain link
pub const ENV_LINK: &str = "TCSWITCH_LINK";

/// Environment variable overriding the registration command (empty disables it)
pub const ENV_REGISTER: &str = "TCSWITCH_REGISTER";

/// Filesystem conventions for discovering and activating toolchains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Human-readable platform name (e.g. "macos")
    pub name: &'static str,
    /// Directories scanned for installations, in precedence order
    pub search_roots: Vec<PathBuf>,
    /// Required file name prefix for an installation entry
    pub bundle_prefix: String,
    /// Required file name suffix for an installation entry
    pub bundle_suffix: String,
    /// Manifest location relative to the installation
    pub manifest_path: PathBuf,
    /// Symlink that selects the active toolchain
    pub link_path: PathBuf,
    /// Subdirectory of the installation the link points at
    pub link_subdir: PathBuf,
    /// Program and arguments run after the link is switched
    pub registration: Option<Vec<String>>,
}

impl Layout {
    /// macOS: `Xcode*.app` bundles, managed through `xcode-select`'s link
    #[must_use]
    pub fn macos() -> Self {
        let mut search_roots = vec![PathBuf::from("/Applications")];
        if let Some(home) = home::home_dir() {
            search_roots.push(home.join("Applications"));
        }

        Self {
            name: "macos",
            search_roots,
            bundle_prefix: "Xcode".to_string(),
            bundle_suffix: ".app".to_string(),
            manifest_path: PathBuf::from("Contents/version.plist"),
            link_path: PathBuf::from("/var/db/xcode_select_link"),
            link_subdir: PathBuf::from("Contents/Developer"),
            registration: Some(vec![
                "xcodebuild".to_string(),
                "-runFirstLaunch".to_string(),
            ]),
        }
    }

    /// Linux: plain directories under `/opt/toolchains` with a `current` link
    #[must_use]
    pub fn linux() -> Self {
        Self {
            name: "linux",
            search_roots: vec![PathBuf::from("/opt/toolchains")],
            bundle_prefix: String::new(),
            bundle_suffix: String::new(),
            manifest_path: PathBuf::from("version.plist"),
            link_path: PathBuf::from("/opt/toolchains/current"),
            link_subdir: PathBuf::new(),
            registration: None,
        }
    }

    /// Pick the layout for the running OS
    ///
    /// Falls back to the Linux layout for any OS other than macOS.
    #[must_use]
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "macos" => Self::macos(),
            _ => Self::linux(),
        }
    }

    /// Detect the layout and apply `TCSWITCH_*` environment overrides
    #[must_use]
    pub fn from_env() -> Self {
        Self::detect().with_overrides(
            std::env::var(ENV_SEARCH_PATH).ok().as_deref(),
            std::env::var_os(ENV_LINK).map(PathBuf::from),
            std::env::var(ENV_REGISTER).ok().as_deref(),
        )
    }

    /// Replace parts of the layout
    ///
    /// `search_path` is colon-separated; empty entries are ignored. An empty
    /// `register` string disables the registration step.
    #[must_use]
    pub fn with_overrides(
        mut self,
        search_path: Option<&str>,
        link: Option<PathBuf>,
        register: Option<&str>,
    ) -> Self {
        if let Some(search_path) = search_path {
            self.search_roots = split_search_path(search_path);
        }
        if let Some(link) = link {
            self.link_path = link;
        }
        if let Some(register) = register {
            let words: Vec<String> = register.split_whitespace().map(String::from).collect();
            self.registration = if words.is_empty() { None } else { Some(words) };
        }
        self
    }

    /// Check whether a directory entry name follows the bundle convention
    #[must_use]
    pub fn is_bundle_name(&self, file_name: &str) -> bool {
        file_name.len() >= self.bundle_prefix.len() + self.bundle_suffix.len()
            && file_name.starts_with(&self.bundle_prefix)
            && file_name.ends_with(&self.bundle_suffix)
            && !file_name.starts_with('.')
    }

    /// Path the indirection should point at for a given installation
    #[must_use]
    pub fn link_target(&self, install_path: &Path) -> PathBuf {
        if self.link_subdir.as_os_str().is_empty() {
            install_path.to_path_buf()
        } else {
            install_path.join(&self.link_subdir)
        }
    }

    /// Map a link target back to the installation it belongs to
    #[must_use]
    pub fn install_path_for_target(&self, target: &Path) -> PathBuf {
        if !self.link_subdir.as_os_str().is_empty()
            && target.ends_with(&self.link_subdir)
            && let Some(root) = target.ancestors().nth(self.link_subdir.components().count())
        {
            return root.to_path_buf();
        }
        target.to_path_buf()
    }
}

fn split_search_path(search_path: &str) -> Vec<PathBuf> {
    search_path
        .split(':')
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}
