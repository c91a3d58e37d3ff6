use tracing::debug;

use crate::error::{ReleaseError, Result};
use crate::git::{RefSpec, Repository};
use crate::identity::Credentials;
use crate::version::VersionRefs;

/// Refspecs for the release tags: the exact version pushes normally, the
/// floating aliases overwrite whatever the remote has.
pub fn tag_refspecs(refs: &VersionRefs) -> Vec<RefSpec> {
    refs.iter()
        .map(|r| RefSpec::tag(&r.name, r.is_floating()))
        .collect()
}

/// Pushes the current branch, then each tag in order.
///
/// Stops at the first failed push.
pub fn publish<R: Repository>(
    repo: &mut R,
    remote: &str,
    refs: &VersionRefs,
    credentials: &Credentials,
) -> Result<()> {
    let branch = repo
        .head_branch()
        .map_err(|e| ReleaseError::push(format!("error resolving the current branch: {}", e)))?;

    repo.push(remote, &[RefSpec::same(&branch)], credentials)
        .map_err(|e| ReleaseError::push(format!("error pushing the commit: {}", e)))?;

    for spec in tag_refspecs(refs) {
        debug!(refspec = %spec, "pushing tag");
        repo.push(remote, std::slice::from_ref(&spec), credentials)
            .map_err(|e| {
                ReleaseError::push(format!("error pushing the tag ({}): {}", spec.src, e))
            })?;
    }

    Ok(())
}
