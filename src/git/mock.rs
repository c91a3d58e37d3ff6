use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use git2::Oid;

use crate::error::{ReleaseError, Result};
use crate::git::{RefSpec, Repository};
use crate::identity::{Credentials, Identity};

/// A commit recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq)]
pub struct MockCommit {
    pub oid: Oid,
    pub message: String,
    pub author: Identity,
    pub committer: Identity,
}

/// A push recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq)]
pub struct MockPush {
    pub remote: String,
    pub refspecs: Vec<RefSpec>,
}

/// Mock repository for testing without actual git operations
pub struct MockRepository {
    head: Option<Oid>,
    branch: String,
    tags: BTreeMap<String, Oid>,
    staged: Vec<PathBuf>,
    commits: Vec<MockCommit>,
    pushes: Vec<MockPush>,
    deleted_tags: Vec<String>,
    failing_tags: HashSet<String>,
    failing_push: Option<String>,
    failing_deletes: HashSet<String>,
}

impl MockRepository {
    /// Create a new empty mock repository on branch `main`
    pub fn new() -> Self {
        MockRepository {
            head: None,
            branch: "refs/heads/main".to_string(),
            tags: BTreeMap::new(),
            staged: Vec::new(),
            commits: Vec::new(),
            pushes: Vec::new(),
            deleted_tags: Vec::new(),
            failing_tags: HashSet::new(),
            failing_push: None,
            failing_deletes: HashSet::new(),
        }
    }

    /// Add a tag pointing to an OID
    pub fn add_tag(&mut self, name: impl Into<String>, oid: Oid) {
        self.tags.insert(name.into(), oid);
    }

    pub fn set_head(&mut self, oid: Oid) {
        self.head = Some(oid);
    }

    /// Make every attempt to create `name` fail with a non-collision error
    pub fn fail_tag(&mut self, name: impl Into<String>) {
        self.failing_tags.insert(name.into());
    }

    /// Make deleting `name` fail
    pub fn fail_delete(&mut self, name: impl Into<String>) {
        self.failing_deletes.insert(name.into());
    }

    /// Make pushes fail when any refspec source equals `src`
    pub fn fail_push(&mut self, src: impl Into<String>) {
        self.failing_push = Some(src.into());
    }

    pub fn tags(&self) -> &BTreeMap<String, Oid> {
        &self.tags
    }

    pub fn commits(&self) -> &[MockCommit] {
        &self.commits
    }

    pub fn pushes(&self) -> &[MockPush] {
        &self.pushes
    }

    pub fn deleted_tags(&self) -> &[String] {
        &self.deleted_tags
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn stage(&mut self, path: &Path) -> Result<()> {
        self.staged.push(path.to_path_buf());
        Ok(())
    }

    fn commit(&mut self, message: &str, author: &Identity, committer: &Identity) -> Result<Oid> {
        if self.staged.is_empty() {
            return Err(ReleaseError::commit("nothing to commit"));
        }
        self.staged.clear();

        let seed = (self.commits.len() + 1) as u8;
        let oid = Oid::from_bytes(&[seed; 20])?;
        self.commits.push(MockCommit {
            oid,
            message: message.to_string(),
            author: author.clone(),
            committer: committer.clone(),
        });
        self.head = Some(oid);
        Ok(oid)
    }

    fn head(&self) -> Result<Oid> {
        self.head
            .ok_or_else(|| ReleaseError::Git(git2::Error::from_str("reference 'HEAD' not found")))
    }

    fn head_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.tags.keys().cloned().collect())
    }

    fn create_tag(
        &mut self,
        name: &str,
        target: Oid,
        _message: &str,
        _tagger: &Identity,
    ) -> Result<()> {
        if self.tags.contains_key(name) {
            return Err(ReleaseError::TagExists(name.to_string()));
        }
        if self.failing_tags.contains(name) {
            return Err(ReleaseError::tag(format!("cannot create tag {}", name)));
        }
        self.tags.insert(name.to_string(), target);
        Ok(())
    }

    fn delete_tag(&mut self, name: &str) -> Result<()> {
        if self.failing_deletes.contains(name) {
            return Err(ReleaseError::tag(format!("cannot delete tag {}", name)));
        }
        self.tags
            .remove(name)
            .ok_or_else(|| ReleaseError::tag(format!("tag {} not found", name)))?;
        self.deleted_tags.push(name.to_string());
        Ok(())
    }

    fn push(&mut self, remote: &str, refspecs: &[RefSpec], _credentials: &Credentials) -> Result<()> {
        if let Some(failing) = &self.failing_push {
            if refspecs.iter().any(|spec| &spec.src == failing) {
                return Err(ReleaseError::push(format!("remote rejected {}", failing)));
            }
        }
        self.pushes.push(MockPush {
            remote: remote.to_string(),
            refspecs: refspecs.to_vec(),
        });
        Ok(())
    }
}
