// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Version parsing, ordering and specification matching
//!
//! Installed toolchains report a dotted numeric version with two or three
//! components. Requests are parsed into a [`VersionSpec`], which never fails:
//! anything that is not a numeric prefix is kept as an opaque label.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A `major.minor[.patch]` version as reported by an installation manifest
///
/// The raw manifest text is kept for display and for verbatim label matching.
/// Ordering and equality treat a missing patch as `0`.
#[derive(Debug, Clone, Serialize)]
#[serde(into = "String")]
pub struct ToolchainVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
    raw: String,
}

impl ToolchainVersion {
    /// The version text exactly as it appeared in the manifest
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn key(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch.unwrap_or(0))
    }
}

impl FromStr for ToolchainVersion {
    type Err = String;

    /// Parse a manifest version
    ///
    /// # Examples
    /// ```
    /// use tcswitch::version::ToolchainVersion;
    /// let v: ToolchainVersion = "14.3.1".parse().unwrap();
    /// assert_eq!((v.major, v.minor, v.patch), (14, 3, Some(1)));
    /// assert!("14".parse::<ToolchainVersion>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let parts = parse_numeric_parts(raw)
            .ok_or_else(|| format!("'{raw}' is not a dotted numeric version"))?;

        match parts.as_slice() {
            [major, minor] => Ok(Self {
                major: *major,
                minor: *minor,
                patch: None,
                raw: raw.to_string(),
            }),
            [major, minor, patch] => Ok(Self {
                major: *major,
                minor: *minor,
                patch: Some(*patch),
                raw: raw.to_string(),
            }),
            _ => Err(format!(
                "'{raw}' must have two or three components (major.minor[.patch])"
            )),
        }
    }
}

impl PartialEq for ToolchainVersion {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ToolchainVersion {}

impl PartialOrd for ToolchainVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ToolchainVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for ToolchainVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<ToolchainVersion> for String {
    fn from(version: ToolchainVersion) -> Self {
        version.raw
    }
}

/// A parsed version request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// No constraint; the newest installation wins
    Empty,
    /// Numeric prefix; omitted components are unconstrained
    Exact {
        major: u32,
        minor: Option<u32>,
        patch: Option<u32>,
    },
    /// Anything else, compared verbatim against version and build labels
    Opaque(String),
}

impl VersionSpec {
    /// Parse a raw request string
    ///
    /// Surrounding whitespace is ignored and `latest` is an alias for an
    /// empty request.
    ///
    /// # Examples
    /// ```
    /// use tcswitch::version::VersionSpec;
    /// assert_eq!(VersionSpec::parse(""), VersionSpec::Empty);
    /// assert_eq!(
    ///     VersionSpec::parse("14.3"),
    ///     VersionSpec::Exact { major: 14, minor: Some(3), patch: None }
    /// );
    /// assert_eq!(VersionSpec::parse("15A240d"), VersionSpec::Opaque("15A240d".into()));
    /// ```
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("latest") {
            return Self::Empty;
        }

        match parse_numeric_parts(trimmed).as_deref() {
            Some([major]) => Self::Exact {
                major: *major,
                minor: None,
                patch: None,
            },
            Some([major, minor]) => Self::Exact {
                major: *major,
                minor: Some(*minor),
                patch: None,
            },
            Some([major, minor, patch]) => Self::Exact {
                major: *major,
                minor: Some(*minor),
                patch: Some(*patch),
            },
            _ => Self::Opaque(trimmed.to_string()),
        }
    }

    /// Check whether an installation with the given version and build label
    /// satisfies this request
    #[must_use]
    pub fn matches(&self, version: &ToolchainVersion, build_identifier: &str) -> bool {
        match self {
            Self::Empty => true,
            Self::Exact {
                major,
                minor,
                patch,
            } => {
                *major == version.major
                    && minor.is_none_or(|m| m == version.minor)
                    && patch.is_none_or(|p| p == version.patch.unwrap_or(0))
            }
            Self::Opaque(label) => version.as_str() == label || build_identifier == label,
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("latest"),
            Self::Exact {
                major,
                minor,
                patch,
            } => {
                write!(f, "{major}")?;
                if let Some(minor) = minor {
                    write!(f, ".{minor}")?;
                }
                if let Some(patch) = patch {
                    write!(f, ".{patch}")?;
                }
                Ok(())
            }
            Self::Opaque(label) => f.write_str(label),
        }
    }
}

/// Split a dotted string into numeric components
///
/// Returns `None` if any component is empty or not a plain decimal number.
fn parse_numeric_parts(s: &str) -> Option<Vec<u32>> {
    s.split('.')
        .map(|part| {
            if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
                part.parse::<u32>().ok()
            } else {
                None
            }
        })
        .collect()
}
