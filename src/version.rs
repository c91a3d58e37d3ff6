use std::fmt;

use crate::error::{ReleaseError, Result};

/// The version being released, as given on the command line (e.g. `v1.4.0`).
///
/// Only normalized versions are accepted: a leading `v` followed by a full
/// `MAJOR.MINOR.PATCH` core, optionally with pre-release and build metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
    tag: String,
    semver: semver::Version,
}

impl ReleaseVersion {
    /// Parses a `v`-prefixed semantic version.
    ///
    /// # Example
    /// ```
    /// # use changelog_release::version::ReleaseVersion;
    /// let v = ReleaseVersion::parse("v2.1.0").unwrap();
    /// assert_eq!(v.number(), "2.1.0");
    /// assert_eq!(v.major_alias(), "v2");
    /// assert_eq!(v.minor_alias(), "v2.1");
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || {
            ReleaseError::config(format!(
                "invalid semantic version '{}' (make sure to add a 'v' prefix: vX.X.X)",
                input
            ))
        };

        let number = input.strip_prefix('v').ok_or_else(invalid)?;
        let semver = semver::Version::parse(number).map_err(|_| invalid())?;

        Ok(ReleaseVersion {
            tag: input.to_string(),
            semver,
        })
    }

    /// The full tag name, including the `v` prefix.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The version without its `v` prefix.
    pub fn number(&self) -> &str {
        &self.tag[1..]
    }

    /// Major-only alias, e.g. `v2` for `v2.1.0`.
    pub fn major_alias(&self) -> String {
        format!("v{}", self.semver.major)
    }

    /// Major.minor alias, e.g. `v2.1` for `v2.1.0`.
    pub fn minor_alias(&self) -> String {
        format!("v{}.{}", self.semver.major, self.semver.minor)
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

/// Whether a reference pins one release or follows the latest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// The exact version tag. Never moved or force-pushed.
    Exact,
    /// A major or major.minor alias that is moved on every release.
    Floating,
}

/// One tag name the release produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRef {
    pub name: String,
    pub kind: RefKind,
}

impl VersionRef {
    pub fn is_floating(&self) -> bool {
        self.kind == RefKind::Floating
    }
}

/// Ordered set of tag names derived from a [`ReleaseVersion`].
///
/// The exact version always comes first, followed by the major and
/// major.minor aliases when floating tags are enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRefs {
    refs: Vec<VersionRef>,
}

impl VersionRefs {
    pub fn new(version: &ReleaseVersion, floating: bool) -> Self {
        let mut refs = vec![VersionRef {
            name: version.tag().to_string(),
            kind: RefKind::Exact,
        }];

        if floating {
            for alias in [version.major_alias(), version.minor_alias()] {
                refs.push(VersionRef {
                    name: alias,
                    kind: RefKind::Floating,
                });
            }
        }

        VersionRefs { refs }
    }

    /// The exact version reference.
    pub fn exact(&self) -> &VersionRef {
        &self.refs[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &VersionRef> {
        self.refs.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.refs.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

impl<'a> IntoIterator for &'a VersionRefs {
    type Item = &'a VersionRef;
    type IntoIter = std::slice::Iter<'a, VersionRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.refs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_version() {
        let v = ReleaseVersion::parse("v1.4.0").unwrap();
        assert_eq!(v.tag(), "v1.4.0");
        assert_eq!(v.number(), "1.4.0");
        assert_eq!(v.major_alias(), "v1");
    }

    #[test]
    fn test_parse_prerelease() {
        let v = ReleaseVersion::parse("v2.0.0-rc.1").unwrap();
        assert_eq!(v.number(), "2.0.0-rc.1");
        assert_eq!(v.major_alias(), "v2");
        assert_eq!(v.minor_alias(), "v2.0");
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        let err = ReleaseVersion::parse("1.2.3").unwrap_err();
        assert!(matches!(err, ReleaseError::Config(_)));
        assert!(err.to_string().contains("'v' prefix"));
    }

    #[test]
    fn test_parse_rejects_non_normalized() {
        for input in ["v1", "v1.2", "v01.2.3", "V1.2.3", "v1.2.3.4", "", "v"] {
            assert!(
                ReleaseVersion::parse(input).is_err(),
                "{} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_refs_without_floating() {
        let v = ReleaseVersion::parse("v1.3.2").unwrap();
        let refs = VersionRefs::new(&v, false);
        assert_eq!(refs.names(), vec!["v1.3.2"]);
        assert_eq!(refs.exact().kind, RefKind::Exact);
    }

    #[test]
    fn test_refs_with_floating() {
        let v = ReleaseVersion::parse("v1.3.2").unwrap();
        let refs = VersionRefs::new(&v, true);
        assert_eq!(refs.names(), vec!["v1.3.2", "v1", "v1.3"]);
        assert!(!refs.exact().is_floating());
        assert!(refs.iter().skip(1).all(VersionRef::is_floating));
    }

    #[test]
    fn test_refs_always_distinct() {
        for input in ["v0.0.0", "v1.0.0", "v10.20.30", "v3.3.3-beta"] {
            let v = ReleaseVersion::parse(input).unwrap();
            let refs = VersionRefs::new(&v, true);
            let mut names = refs.names();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), 3, "{} produced duplicate refs", input);
            assert_eq!(refs.exact().name, input);
        }
    }
}
