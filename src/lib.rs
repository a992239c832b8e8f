// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Toolchain Version Switching Library
//!
//! This library discovers toolchain installations that live side by side on a
//! machine (e.g. several `Xcode*.app` bundles), picks the best one for a
//! version request and makes it the system-wide active toolchain.

pub mod activate;
pub mod catalog;
pub mod error;
pub mod logging;
pub mod platform;
pub mod resolver;
pub mod version;

// Re-export commonly used items at the crate root for convenience
pub use activate::{ActivationResult, Activator, current, switch};
pub use catalog::{Catalog, ToolchainInstallation, scan};
pub use error::{ActivationError, ManifestError, SelectError};
pub use platform::Layout;
pub use resolver::resolve;
pub use version::{ToolchainVersion, VersionSpec};
