use std::cmp::Ordering;

use semver::Version;

use crate::error::{ReleaseError, Result};

/// In-memory changelog following the "Keep a Changelog" layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Changelog {
    /// Everything above the first second-level heading, kept verbatim.
    pub preamble: String,
    pub unreleased: Option<Unreleased>,
    /// Dated releases, newest first.
    pub releases: Vec<Release>,
    /// Link definitions that do not belong to any section.
    pub links: Vec<Link>,
}

/// The `## [Unreleased]` section.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Unreleased {
    pub body: String,
    pub url: Option<String>,
}

/// A `## [x.y.z] - date` section.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    /// Heading label as written, e.g. `1.2.3`.
    pub title: String,
    /// Parsed label; `None` when the label is not a semantic version.
    pub version: Option<Version>,
    pub date: Option<String>,
    pub yanked: bool,
    pub url: Option<String>,
    pub body: String,
}

/// A `[label]: url` reference definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub url: String,
}

impl Release {
    pub fn new(version: Version, date: impl Into<String>, url: impl Into<String>) -> Self {
        Release {
            title: version.to_string(),
            version: Some(version),
            date: Some(date.into()),
            yanked: false,
            url: Some(url.into()),
            body: String::new(),
        }
    }
}

/// Newest version first; releases without a version sort last.
fn newest_first(a: &Release, b: &Release) -> Ordering {
    match (&a.version, &b.version) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl Changelog {
    /// Returns the release with the highest version.
    pub fn latest_release(&self) -> Option<&Release> {
        self.releases.iter().min_by(|a, b| newest_first(a, b))
    }

    pub fn find_release(&self, version: &Version) -> Option<&Release> {
        self.releases
            .iter()
            .find(|r| r.version.as_ref() == Some(version))
    }

    /// Sorts releases newest first. Releases without a version keep their
    /// relative order at the end.
    pub fn sort_releases(&mut self) {
        self.releases.sort_by(newest_first);
    }

    /// Moves the unreleased notes into a new release entry.
    ///
    /// The entry is inserted in front of the first release older than
    /// `version`, so a newest-first document stays newest-first. The
    /// unreleased section is left in place with an empty body.
    pub fn promote_unreleased(
        &mut self,
        version: &str,
        date: &str,
        url: &str,
    ) -> Result<&Release> {
        let parsed = Version::parse(version).map_err(|e| {
            ReleaseError::promotion(format!("invalid release version '{}': {}", version, e))
        })?;

        if self.find_release(&parsed).is_some() {
            return Err(ReleaseError::promotion(format!(
                "release {} already exists",
                version
            )));
        }

        let unreleased = self
            .unreleased
            .as_mut()
            .ok_or_else(|| ReleaseError::promotion("changelog has no unreleased section"))?;

        if unreleased.body.trim().is_empty() {
            return Err(ReleaseError::promotion("unreleased section is empty"));
        }

        let mut release = Release::new(parsed.clone(), date, url);
        release.body = std::mem::take(&mut unreleased.body);

        let position = self
            .releases
            .iter()
            .position(|r| r.version.as_ref().map_or(true, |v| *v < parsed))
            .unwrap_or(self.releases.len());
        self.releases.insert(position, release);

        Ok(&self.releases[position])
    }

    /// Points the unreleased section's link at `url`.
    pub fn set_unreleased_url(&mut self, url: &str) -> Result<()> {
        let unreleased = self
            .unreleased
            .as_mut()
            .ok_or_else(|| ReleaseError::promotion("changelog has no unreleased section"))?;
        unreleased.url = Some(url.to_string());
        Ok(())
    }
}
