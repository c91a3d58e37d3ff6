use chrono::NaiveDate;
use tracing::{info, warn};

use crate::changelog::Changelog;
use crate::error::Result;
use crate::version::ReleaseVersion;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Web URLs of the hosted repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoUrls {
    base: String,
}

impl RepoUrls {
    /// Builds URLs for `slug` (`owner/name`) on `server_url`.
    pub fn new(server_url: &str, slug: &str) -> Self {
        RepoUrls {
            base: format!("{}/{}", server_url.trim_end_matches('/'), slug),
        }
    }

    /// Release page of a tag.
    pub fn release_url(&self, tag: &str) -> String {
        format!("{}/releases/tag/{}", self.base, tag)
    }

    /// Diff view between two revisions.
    pub fn compare_url(&self, from: &str, to: &str) -> String {
        format!("{}/compare/{}...{}", self.base, from, to)
    }
}

/// Picks the link for the new release entry.
///
/// The first release links to its tag page. Later releases link to a
/// comparison against the newest existing release.
pub fn release_url(changelog: &Changelog, version: &ReleaseVersion, urls: &RepoUrls) -> String {
    let Some(latest) = changelog.latest_release() else {
        return urls.release_url(version.tag());
    };

    match &latest.version {
        Some(previous) => urls.compare_url(&format!("v{}", previous), version.tag()),
        None => {
            warn!(
                release = %latest.title,
                "newest changelog release has no version, linking {} to its tag page",
                version
            );
            urls.release_url(version.tag())
        }
    }
}

/// Turns the unreleased notes into a dated release of `version` and points
/// the unreleased link at `compare/{version}...HEAD`.
///
/// Releases are sorted newest first before the new entry is inserted.
pub fn promote(
    changelog: &mut Changelog,
    version: &ReleaseVersion,
    urls: &RepoUrls,
    today: NaiveDate,
) -> Result<()> {
    changelog.sort_releases();
    let url = release_url(changelog, version, urls);
    let date = today.format(DATE_FORMAT).to_string();

    changelog.promote_unreleased(version.number(), &date, &url)?;
    changelog.set_unreleased_url(&urls.compare_url(version.tag(), "HEAD"))?;

    info!(version = %version, date, url, "promoted unreleased changes");
    Ok(())
}
