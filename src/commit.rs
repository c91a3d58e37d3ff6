use std::path::Path;

use git2::Oid;

use crate::error::Result;
use crate::git::Repository;
use crate::identity::IdentityPair;
use crate::version::ReleaseVersion;

/// Stages the changelog and commits it as `version` without its `v` prefix.
pub fn commit_changelog<R: Repository>(
    repo: &mut R,
    changelog: &Path,
    version: &ReleaseVersion,
    identities: &IdentityPair,
) -> Result<Oid> {
    repo.stage(changelog)?;
    repo.commit(
        version.number(),
        &identities.author,
        &identities.committer,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;
    use crate::identity::Identity;
    use chrono::Utc;

    fn identities() -> IdentityPair {
        let now = Utc::now();
        IdentityPair {
            committer: Identity::bot(now),
            author: Identity::new("octocat", "octo@example.com", now),
        }
    }

    #[test]
    fn test_commit_message_strips_prefix() {
        let mut repo = MockRepository::new();
        let version = ReleaseVersion::parse("v1.4.0").unwrap();

        let oid = commit_changelog(&mut repo, Path::new("CHANGELOG.md"), &version, &identities())
            .unwrap();

        let commit = &repo.commits()[0];
        assert_eq!(commit.oid, oid);
        assert_eq!(commit.message, "1.4.0");
        assert_eq!(commit.author.name, "octocat");
        assert_eq!(commit.committer.name, crate::identity::BOT_NAME);
    }
}
