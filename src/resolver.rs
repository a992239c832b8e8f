// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Selection of the best installation for a version request

use tracing::debug;

use crate::catalog::ToolchainInstallation;
use crate::version::VersionSpec;

/// Find the best installation satisfying `spec`
///
/// Candidates that satisfy the request are ranked by version; when several
/// share the highest version the one that comes first in `candidates` wins.
/// An unparseable request is matched verbatim against version and build
/// labels, so the only outcomes are a match or `None`.
///
/// # Examples
/// ```
/// use tcswitch::catalog::ToolchainInstallation;
/// use tcswitch::resolver::resolve;
///
/// let catalog = vec![
///     ToolchainInstallation::new("14.2".parse().unwrap(), "14C18", "/A"),
///     ToolchainInstallation::new("14.3.1".parse().unwrap(), "14E222b", "/B"),
///     ToolchainInstallation::new("15.0".parse().unwrap(), "15A240d", "/C"),
/// ];
/// assert_eq!(resolve("14", &catalog).unwrap().build_identifier(), "14E222b");
/// assert_eq!(resolve("", &catalog).unwrap().build_identifier(), "15A240d");
/// assert!(resolve("16", &catalog).is_none());
/// ```
pub fn resolve<'a>(
    spec: &str,
    candidates: &'a [ToolchainInstallation],
) -> Option<&'a ToolchainInstallation> {
    let spec = VersionSpec::parse(spec);
    let selected = select(&spec, candidates);

    match selected {
        Some(installation) => debug!(
            %spec,
            version = %installation.version(),
            path = %installation.install_path().display(),
            "resolved toolchain"
        ),
        None => debug!(%spec, candidates = candidates.len(), "no toolchain matched"),
    }

    selected
}

/// Same as [`resolve`] for an already parsed request
pub fn select<'a>(
    spec: &VersionSpec,
    candidates: &'a [ToolchainInstallation],
) -> Option<&'a ToolchainInstallation> {
    let mut best: Option<&ToolchainInstallation> = None;

    // Only a strictly greater version replaces the current best, which keeps
    // the earliest entry among equals.
    for candidate in candidates
        .iter()
        .filter(|c| spec.matches(c.version(), c.build_identifier()))
    {
        if best.is_none_or(|b| candidate.version() > b.version()) {
            best = Some(candidate);
        }
    }

    best
}
