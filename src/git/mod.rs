//! Git operations abstraction layer
//!
//! The release steps only talk to the [Repository] trait. Two
//! implementations exist:
//!
//! - [repository::Git2Repository]: a working repository opened with `git2`
//! - [mock::MockRepository]: an in-memory stand-in for unit tests
//!
//! ```rust
//! # use changelog_release::git::{RefSpec, Repository};
//! # use changelog_release::identity::Credentials;
//! # fn example<R: Repository>(repo: &mut R, creds: &Credentials) -> changelog_release::Result<()> {
//! let head = repo.head()?;
//! println!("tagging {}", head);
//! repo.push("origin", &[RefSpec::tag("v1", true)], creds)?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use std::fmt;
use std::path::Path;

use git2::Oid;

use crate::error::Result;
use crate::identity::{Credentials, Identity};

/// Mapping of a local reference onto a remote one, e.g.
/// `+refs/tags/v1:refs/tags/v1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefSpec {
    pub src: String,
    pub dst: String,
    /// Allow the remote reference to be overwritten.
    pub force: bool,
}

impl RefSpec {
    pub fn new(src: impl Into<String>, dst: impl Into<String>, force: bool) -> Self {
        RefSpec {
            src: src.into(),
            dst: dst.into(),
            force,
        }
    }

    /// `refs/tags/{name}` onto itself.
    pub fn tag(name: &str, force: bool) -> Self {
        let reference = format!("refs/tags/{}", name);
        RefSpec::new(reference.clone(), reference, force)
    }

    /// A full reference name (e.g. `refs/heads/main`) onto itself, never forced.
    pub fn same(reference: &str) -> Self {
        RefSpec::new(reference, reference, false)
    }
}

impl fmt::Display for RefSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.force {
            f.write_str("+")?;
        }
        write!(f, "{}:{}", self.src, self.dst)
    }
}

/// Repository operations needed to commit, tag and publish a release.
///
/// Implementations map their underlying failures onto the matching
/// [crate::error::ReleaseError] variants. In particular `create_tag` must
/// report a name collision as [crate::error::ReleaseError::TagExists] so
/// callers can tell it apart from other failures.
pub trait Repository {
    /// Adds `path` to the index.
    ///
    /// Fails with `Stage` when the path does not exist or lies outside the
    /// working directory.
    fn stage(&mut self, path: &Path) -> Result<()>;

    /// Commits the index on top of HEAD and returns the new commit id.
    ///
    /// Fails with `Commit` when the index matches HEAD.
    fn commit(&mut self, message: &str, author: &Identity, committer: &Identity) -> Result<Oid>;

    /// Commit id HEAD currently points at.
    fn head(&self) -> Result<Oid>;

    /// Full reference name of the checked out branch, e.g. `refs/heads/main`.
    fn head_branch(&self) -> Result<String>;

    /// Names of every tag in the repository.
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Creates an annotated tag.
    fn create_tag(&mut self, name: &str, target: Oid, message: &str, tagger: &Identity)
        -> Result<()>;

    fn delete_tag(&mut self, name: &str) -> Result<()>;

    /// Pushes `refspecs` to `remote` in one request.
    fn push(&mut self, remote: &str, refspecs: &[RefSpec], credentials: &Credentials)
        -> Result<()>;
}
