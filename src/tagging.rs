use git2::Oid;
use tracing::{debug, info, warn};

use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::identity::Identity;
use crate::version::{VersionRef, VersionRefs};

/// Tags HEAD with every reference in `refs`.
///
/// The exact version must not exist yet; if it does, nothing is created.
/// Floating aliases that already exist are deleted and created again. A
/// failure stops the loop and leaves earlier tags in place.
pub fn create_tags<R: Repository>(
    repo: &mut R,
    refs: &VersionRefs,
    commit: Oid,
    tagger: &Identity,
) -> Result<()> {
    let exact = &refs.exact().name;
    if repo.list_tags()?.iter().any(|t| t == exact) {
        return Err(ReleaseError::TagConflict(exact.clone()));
    }

    let head = repo.head()?;
    if head != commit {
        warn!(%head, %commit, "HEAD moved after the release commit, tagging HEAD");
    }

    for reference in refs {
        create_tag(repo, reference, head, tagger)?;
    }

    Ok(())
}

fn create_tag<R: Repository>(
    repo: &mut R,
    reference: &VersionRef,
    target: Oid,
    tagger: &Identity,
) -> Result<()> {
    let name = reference.name.as_str();

    match repo.create_tag(name, target, name, tagger) {
        Ok(()) => Ok(()),
        Err(ReleaseError::TagExists(_)) if reference.is_floating() => {
            debug!(tag = name, "moving floating tag");
            repo.delete_tag(name)
                .map_err(|e| ReleaseError::tag(format!("error deleting tag ({}): {}", name, e)))?;
            repo.create_tag(name, target, name, tagger)
                .map_err(|e| ReleaseError::tag(format!("error tagging a commit ({}): {}", name, e)))?;
            info!(tag = name, %target, "moved floating tag");
            Ok(())
        }
        Err(e) => Err(ReleaseError::tag(format!(
            "error tagging a commit ({}): {}",
            name, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;
    use crate::version::ReleaseVersion;
    use chrono::Utc;

    fn oid(seed: u8) -> Oid {
        Oid::from_bytes(&[seed; 20]).unwrap()
    }

    fn refs(version: &str, floating: bool) -> VersionRefs {
        VersionRefs::new(&ReleaseVersion::parse(version).unwrap(), floating)
    }

    fn repo_at(head: Oid) -> MockRepository {
        let mut repo = MockRepository::new();
        repo.set_head(head);
        repo
    }

    #[test]
    fn test_creates_all_refs() {
        let mut repo = repo_at(oid(1));
        create_tags(&mut repo, &refs("v1.4.0", true), oid(1), &Identity::bot(Utc::now())).unwrap();

        let tags: Vec<_> = repo.tags().keys().cloned().collect();
        assert_eq!(tags, vec!["v1", "v1.4", "v1.4.0"]);
        assert!(repo.tags().values().all(|t| *t == oid(1)));
    }

    #[test]
    fn test_existing_exact_tag_is_conflict() {
        let mut repo = repo_at(oid(1));
        repo.add_tag("v1.0.0", oid(9));

        let err = create_tags(&mut repo, &refs("v1.0.0", true), oid(1), &Identity::bot(Utc::now()))
            .unwrap_err();

        assert!(matches!(err, ReleaseError::TagConflict(ref t) if t == "v1.0.0"));
        assert_eq!(repo.tags().len(), 1);
        assert_eq!(repo.tags()["v1.0.0"], oid(9));
    }

    #[test]
    fn test_existing_alias_is_moved() {
        let mut repo = repo_at(oid(2));
        repo.add_tag("v1", oid(1));

        create_tags(&mut repo, &refs("v1.3.2", true), oid(2), &Identity::bot(Utc::now())).unwrap();

        assert_eq!(repo.tags()["v1"], oid(2));
        assert_eq!(repo.tags()["v1.3.2"], oid(2));
        assert_eq!(repo.deleted_tags(), ["v1".to_string()]);
    }

    #[test]
    fn test_exact_failure_stops_before_aliases() {
        let mut repo = repo_at(oid(1));
        repo.fail_tag("v2.0.0");

        let err = create_tags(&mut repo, &refs("v2.0.0", true), oid(1), &Identity::bot(Utc::now()))
            .unwrap_err();

        assert!(matches!(err, ReleaseError::Tag(_)));
        assert!(err.to_string().contains("v2.0.0"));
        assert!(repo.tags().is_empty());
    }

    #[test]
    fn test_alias_failure_keeps_earlier_tags() {
        let mut repo = repo_at(oid(1));
        repo.fail_tag("v2");

        let err = create_tags(&mut repo, &refs("v2.1.0", true), oid(1), &Identity::bot(Utc::now()))
            .unwrap_err();

        assert!(err.to_string().contains("(v2)"));
        let tags: Vec<_> = repo.tags().keys().cloned().collect();
        assert_eq!(tags, vec!["v2.1.0"]);
    }

    #[test]
    fn test_alias_delete_failure_names_tag() {
        let mut repo = repo_at(oid(2));
        repo.add_tag("v3", oid(1));
        repo.fail_delete("v3");

        let err = create_tags(&mut repo, &refs("v3.0.1", true), oid(2), &Identity::bot(Utc::now()))
            .unwrap_err();

        assert!(matches!(err, ReleaseError::Tag(_)));
        assert!(err.to_string().contains("error deleting tag (v3)"), "{}", err);
        assert_eq!(repo.tags()["v3"], oid(1));
    }

    #[test]
    fn test_tags_follow_head() {
        let mut repo = repo_at(oid(3));
        create_tags(&mut repo, &refs("v0.1.0", false), oid(2), &Identity::bot(Utc::now())).unwrap();
        assert_eq!(repo.tags()["v0.1.0"], oid(3));
    }
}
