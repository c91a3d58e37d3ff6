use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::error::{ReleaseError, Result};
use crate::version::{ReleaseVersion, VersionRefs};

pub const DEFAULT_CHANGELOG: &str = "CHANGELOG.md";
pub const DEFAULT_SERVER_URL: &str = "https://github.com";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REMOTE: &str = "origin";

/// Command line arguments, each backed by the environment variable a CI
/// runner provides.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "changelog-release",
    about = "Promote the unreleased changelog section, then commit, tag and push the release",
    version
)]
pub struct Args {
    #[arg(long, env = "VERSION", help = "Version to release (vX.Y.Z)")]
    pub release: String,

    #[arg(
        long,
        env = "UPDATE_TAGS",
        default_value = "false",
        action = ArgAction::Set,
        value_parser = parse_flag,
        help = "Also create and move the vX and vX.Y tags"
    )]
    pub update_tags: bool,

    #[arg(long, env = "CHANGELOG_FILE", default_value = DEFAULT_CHANGELOG, help = "Changelog file path")]
    pub changelog: PathBuf,

    #[arg(long, env = "GITHUB_REPOSITORY", help = "Repository slug (owner/name)")]
    pub repository: String,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, help = "Token used for the API and for pushing")]
    pub token: String,

    #[arg(long, env = "GITHUB_ACTOR", default_value = "", help = "User that triggered the run")]
    pub actor: String,

    #[arg(long, env = "GITHUB_OUTPUT", help = "File that receives the step outputs")]
    pub output_file: Option<PathBuf>,

    #[arg(long, env = "GITHUB_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    #[arg(long, env = "RELEASE_REMOTE", default_value = DEFAULT_REMOTE, help = "Remote to push to")]
    pub remote: String,

    #[arg(long, env = "RELEASE_WORKDIR", default_value = ".", help = "Repository working directory")]
    pub workdir: PathBuf,
}

/// Parses the boolean spellings accepted for `UPDATE_TAGS`. An empty value
/// means `false`.
pub fn parse_flag(value: &str) -> std::result::Result<bool, String> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "" | "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(format!("invalid boolean value '{}'", other)),
    }
}

/// Validated configuration for a single run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub version: ReleaseVersion,
    pub refs: VersionRefs,
    pub changelog: PathBuf,
    pub repository: String,
    pub token: String,
    pub actor: String,
    pub output_file: Option<PathBuf>,
    pub server_url: String,
    pub api_url: String,
    pub remote: String,
    pub workdir: PathBuf,
}

impl RunConfig {
    /// Changelog location resolved against the working directory.
    pub fn changelog_path(&self) -> PathBuf {
        if self.changelog.is_absolute() {
            self.changelog.clone()
        } else {
            self.workdir.join(&self.changelog)
        }
    }
}

impl TryFrom<Args> for RunConfig {
    type Error = ReleaseError;

    fn try_from(args: Args) -> Result<Self> {
        let version = ReleaseVersion::parse(args.release.trim())?;
        let refs = VersionRefs::new(&version, args.update_tags);

        match args.repository.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {}
            _ => {
                return Err(ReleaseError::config(format!(
                    "invalid repository '{}' (expected owner/name)",
                    args.repository
                )))
            }
        }

        if args.token.is_empty() {
            return Err(ReleaseError::config("missing authentication token"));
        }

        Ok(RunConfig {
            version,
            refs,
            changelog: args.changelog,
            repository: args.repository,
            token: args.token,
            actor: args.actor.trim().to_string(),
            output_file: args.output_file,
            server_url: args.server_url.trim_end_matches('/').to_string(),
            api_url: args.api_url.trim_end_matches('/').to_string(),
            remote: args.remote,
            workdir: args.workdir,
        })
    }
}
