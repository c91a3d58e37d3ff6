use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use git2::{Cred, CredentialType, ErrorCode, Oid, PushOptions, RemoteCallbacks};
use tracing::{debug, info};

use crate::error::{ReleaseError, Result};
use crate::git::RefSpec;
use crate::identity::{Credentials, Identity};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: git2::Repository,
    workdir: PathBuf,
}

impl Git2Repository {
    /// Open the repository containing `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = git2::Repository::discover(path)?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| ReleaseError::Git(git2::Error::from_str("repository has no working directory")))?;
        let workdir = fs::canonicalize(workdir).map_err(|e| ReleaseError::io(workdir, e))?;

        Ok(Git2Repository { repo, workdir })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Path of `path` relative to the working directory.
    fn relative_path(&self, path: &Path) -> Result<PathBuf> {
        let absolute = fs::canonicalize(path)
            .map_err(|e| ReleaseError::stage(format!("{}: {}", path.display(), e)))?;

        absolute
            .strip_prefix(&self.workdir)
            .map(Path::to_path_buf)
            .map_err(|_| {
                ReleaseError::stage(format!(
                    "{} is outside of the repository {}",
                    path.display(),
                    self.workdir.display()
                ))
            })
    }
}

impl super::Repository for Git2Repository {
    fn stage(&mut self, path: &Path) -> Result<()> {
        let relative = self.relative_path(path)?;

        let mut index = self.repo.index()?;
        index.add_path(&relative).map_err(|e| {
            ReleaseError::stage(format!("error staging {}: {}", relative.display(), e))
        })?;
        index
            .write()
            .map_err(|e| ReleaseError::stage(format!("error writing index: {}", e)))?;

        debug!(path = %relative.display(), "staged file");
        Ok(())
    }

    fn commit(&mut self, message: &str, author: &Identity, committer: &Identity) -> Result<Oid> {
        let commit_err = |e: git2::Error| ReleaseError::commit(e.to_string());

        let mut index = self.repo.index().map_err(commit_err)?;
        let tree_id = index.write_tree().map_err(commit_err)?;
        let tree = self.repo.find_tree(tree_id).map_err(commit_err)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit().map_err(commit_err)?),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                None
            }
            Err(e) => return Err(commit_err(e)),
        };

        if parent.as_ref().is_some_and(|p| p.tree_id() == tree_id) {
            return Err(ReleaseError::commit("nothing to commit, working tree clean"));
        }

        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(
                Some("HEAD"),
                &author.to_signature()?,
                &committer.to_signature()?,
                message,
                &tree,
                &parents,
            )
            .map_err(commit_err)?;

        info!(%oid, message, "created commit");
        Ok(oid)
    }

    fn head(&self) -> Result<Oid> {
        Ok(self.repo.head()?.peel_to_commit()?.id())
    }

    fn head_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(ReleaseError::Git(git2::Error::from_str(
                "HEAD does not point at a branch",
            )));
        }
        head.name()
            .map(str::to_string)
            .ok_or_else(|| ReleaseError::Git(git2::Error::from_str("branch name is not valid utf-8")))
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn create_tag(
        &mut self,
        name: &str,
        target: Oid,
        message: &str,
        tagger: &Identity,
    ) -> Result<()> {
        let object = self
            .repo
            .find_object(target, None)
            .map_err(|e| ReleaseError::tag(format!("cannot find object {}: {}", target, e)))?;

        match self
            .repo
            .tag(name, &object, &tagger.to_signature()?, message, false)
        {
            Ok(_) => {
                info!(tag = name, %target, "created tag");
                Ok(())
            }
            Err(e) if e.code() == ErrorCode::Exists => Err(ReleaseError::TagExists(name.to_string())),
            Err(e) => Err(ReleaseError::tag(format!("cannot create tag {}: {}", name, e))),
        }
    }

    fn delete_tag(&mut self, name: &str) -> Result<()> {
        self.repo
            .tag_delete(name)
            .map_err(|e| ReleaseError::tag(format!("cannot delete tag {}: {}", name, e)))?;
        info!(tag = name, "deleted tag");
        Ok(())
    }

    fn push(&mut self, remote: &str, refspecs: &[RefSpec], credentials: &Credentials) -> Result<()> {
        let start = std::time::Instant::now();
        let mut remote_handle = self
            .repo
            .find_remote(remote)
            .map_err(|e| ReleaseError::push(format!("cannot find remote {}: {}", remote, e)))?;

        let attempts = Cell::new(0u32);
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(|_url, _username_from_url, allowed_types| {
            attempts.set(attempts.get() + 1);
            if attempts.get() > 1 {
                return Err(git2::Error::from_str("authentication failed"));
            }
            if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
                Cred::userpass_plaintext(&credentials.username, &credentials.token)
            } else {
                Cred::default()
            }
        });

        // The server reports per-ref rejections (e.g. non-fast-forward) here
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "remote rejected {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let specs: Vec<String> = refspecs.iter().map(ToString::to_string).collect();
        remote_handle
            .push(&specs, Some(&mut push_options))
            .map_err(|e| ReleaseError::push(format!("{}", e)))?;

        info!(
            remote,
            refspecs = ?specs,
            duration_ms = start.elapsed().as_millis(),
            "pushed"
        );
        Ok(())
    }
}
