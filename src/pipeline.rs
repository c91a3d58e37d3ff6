//! Release workflow orchestration
//!
//! A run is strictly linear:
//! 1. initialize: parse the changelog, open the repository, resolve identities
//! 2. promote the unreleased changelog section and save the file
//! 3. commit the changelog
//! 4. create the version tags
//! 5. push the branch and the tags
//!
//! The first failure ends the run. Nothing already written to the
//! repository or the remote is rolled back.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use git2::Oid;
use tracing::info;

use crate::changelog::ChangelogFile;
use crate::commit::commit_changelog;
use crate::config::RunConfig;
use crate::git::{Git2Repository, Repository};
use crate::identity::{self, Credentials, IdentityPair, ProfileClient};
use crate::output::RunOutputs;
use crate::promote::{promote, RepoUrls};
use crate::publish::publish;
use crate::tagging::create_tags;
use crate::ui;

/// State of a single release run.
pub struct Release<R: Repository> {
    config: RunConfig,
    changelog: ChangelogFile,
    repo: R,
    identities: IdentityPair,
    credentials: Credentials,
}

impl Release<Git2Repository> {
    /// Reads the changelog, opens the working repository and resolves the
    /// commit identities.
    pub async fn initialize(config: RunConfig) -> Result<Self> {
        let changelog = ChangelogFile::open(config.changelog_path())
            .context("error parsing changelog")?;

        let repo = Git2Repository::open(&config.workdir).context("error opening repository")?;

        let profiles = ProfileClient::new(&config.api_url, &config.token)?;
        let identities = identity::resolve(&config.actor, &profiles, Utc::now())
            .await
            .context("git configuration error")?;

        Ok(Release::new(config, changelog, repo, identities))
    }
}

impl<R: Repository> Release<R> {
    pub fn new(
        config: RunConfig,
        changelog: ChangelogFile,
        repo: R,
        identities: IdentityPair,
    ) -> Self {
        let credentials = Credentials::new(identities.committer.name.clone(), config.token.clone());
        Release {
            config,
            changelog,
            repo,
            identities,
            credentials,
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn changelog(&self) -> &ChangelogFile {
        &self.changelog
    }

    /// Promotes the unreleased section to a release dated `today` and
    /// rewrites the changelog file.
    pub fn update_changelog(&mut self, today: NaiveDate) -> crate::Result<()> {
        let urls = RepoUrls::new(&self.config.server_url, &self.config.repository);
        promote(&mut self.changelog.document, &self.config.version, &urls, today)?;
        self.changelog.save()
    }

    pub fn commit(&mut self) -> crate::Result<Oid> {
        commit_changelog(
            &mut self.repo,
            &self.changelog.path,
            &self.config.version,
            &self.identities,
        )
    }

    pub fn tag(&mut self, commit: Oid) -> crate::Result<()> {
        create_tags(
            &mut self.repo,
            &self.config.refs,
            commit,
            &self.identities.committer,
        )
    }

    pub fn push(&mut self) -> crate::Result<()> {
        publish(
            &mut self.repo,
            &self.config.remote,
            &self.config.refs,
            &self.credentials,
        )
    }

    /// Runs every stage after initialization.
    pub fn execute(&mut self, today: NaiveDate) -> Result<RunOutputs> {
        ui::display_step("updating changelog file");
        self.update_changelog(today)
            .context("error updating changelog file")?;

        ui::display_step("committing changes");
        let commit = self.commit().context("error committing changes")?;

        ui::display_step("creating tags");
        self.tag(commit).context("error creating tags")?;

        ui::display_step("pushing changes");
        self.push().context("error pushing changes")?;

        info!(%commit, tag = %self.config.version, "release published");
        Ok(RunOutputs {
            hash: commit.to_string(),
            tag: self.config.version.tag().to_string(),
        })
    }
}

/// Initializes and executes a release run.
pub async fn run(config: RunConfig, today: NaiveDate) -> Result<RunOutputs> {
    ui::display_step("initializing action");
    let mut release = Release::initialize(config)
        .await
        .context("initialization error")?;
    release.execute(today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::parse;
    use crate::error::ReleaseError;
    use crate::git::{MockRepository, RefSpec};
    use crate::identity::Identity;
    use crate::version::{ReleaseVersion, VersionRefs};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn config(version: &str, floating: bool) -> RunConfig {
        let version = ReleaseVersion::parse(version).unwrap();
        RunConfig {
            refs: VersionRefs::new(&version, floating),
            version,
            changelog: PathBuf::from("CHANGELOG.md"),
            repository: "acme/widgets".to_string(),
            token: "token".to_string(),
            actor: String::new(),
            output_file: None,
            server_url: "https://github.com".to_string(),
            api_url: "https://api.github.com".to_string(),
            remote: "origin".to_string(),
            workdir: PathBuf::from("."),
        }
    }

    fn release(dir: &TempDir, version: &str, floating: bool, repo: MockRepository) -> Release<MockRepository> {
        let path = dir.path().join("CHANGELOG.md");
        std::fs::write(&path, "# Changelog\n\n## [Unreleased]\n\n- new\n").unwrap();
        let changelog = ChangelogFile {
            path,
            document: parse("# Changelog\n\n## [Unreleased]\n\n- new\n").unwrap(),
        };
        let bot = Identity::bot(Utc::now());
        let identities = IdentityPair {
            committer: bot.clone(),
            author: bot,
        };
        Release::new(config(version, floating), changelog, repo, identities)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_execute_runs_every_stage() {
        let dir = TempDir::new().unwrap();
        let mut release = release(&dir, "v1.4.0", true, MockRepository::new());

        let outputs = release.execute(today()).unwrap();

        let repo = release.repo();
        assert_eq!(outputs.tag, "v1.4.0");
        assert_eq!(outputs.hash, repo.commits()[0].oid.to_string());
        assert_eq!(repo.tags().len(), 3);
        assert_eq!(repo.pushes().len(), 4);
        assert_eq!(release.credentials.username, crate::identity::BOT_NAME);

        let written = std::fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
        assert!(written.contains("## [1.4.0] - 2024-06-01"));
        assert!(written.contains("[1.4.0]: https://github.com/acme/widgets/releases/tag/v1.4.0"));
    }

    #[test]
    fn test_tag_conflict_stops_before_push() {
        let dir = TempDir::new().unwrap();
        let mut repo = MockRepository::new();
        repo.add_tag("v1.0.0", Oid::from_bytes(&[7; 20]).unwrap());
        let mut release = release(&dir, "v1.0.0", false, repo);

        let err = release.execute(today()).unwrap_err();

        assert!(err.to_string().starts_with("error creating tags"));
        assert!(matches!(
            err.downcast_ref::<ReleaseError>(),
            Some(ReleaseError::TagConflict(_))
        ));
        assert_eq!(release.repo().commits().len(), 1);
        assert!(release.repo().pushes().is_empty());
    }

    #[test]
    fn test_push_failure_is_wrapped() {
        let dir = TempDir::new().unwrap();
        let mut repo = MockRepository::new();
        repo.fail_push("refs/tags/v2.0.0");
        let mut release = release(&dir, "v2.0.0", false, repo);

        let err = release.execute(today()).unwrap_err();

        assert_eq!(
            format!("{:#}", err),
            "error pushing changes: Push error: error pushing the tag (refs/tags/v2.0.0): Push error: remote rejected refs/tags/v2.0.0"
        );
        assert_eq!(
            release.repo().pushes()[0].refspecs,
            vec![RefSpec::same("refs/heads/main")]
        );
    }

    async fn init_err(config: RunConfig) -> anyhow::Error {
        match Release::initialize(config).await {
            Ok(_) => panic!("initialization should fail"),
            Err(e) => e,
        }
    }

    fn repo_with_changelog(text: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let path = dir.path().join("CHANGELOG.md");
        std::fs::write(&path, text).unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn test_initialize_wraps_changelog_errors() {
        let dir = TempDir::new().unwrap();
        let mut config = config("v1.0.0", false);
        config.workdir = dir.path().to_path_buf();

        let err = init_err(config).await;

        assert!(format!("{:#}", err).starts_with("error parsing changelog: I/O error"));
    }

    #[tokio::test]
    async fn test_initialize_outside_repository() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        std::fs::write(&path, "## [Unreleased]\n- a\n").unwrap();
        let mut config = config("v1.0.0", false);
        config.changelog = path;
        config.workdir = dir.path().to_path_buf();

        let err = init_err(config).await;

        assert!(format!("{:#}", err).starts_with("error opening repository"));
    }

    #[tokio::test]
    async fn test_initialize_resolves_author_from_profile() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"email": "octo@example.com"})),
            )
            .mount(&server)
            .await;

        let (dir, _) = repo_with_changelog("## [Unreleased]\n- a\n");
        let mut config = config("v1.0.0", false);
        config.workdir = dir.path().to_path_buf();
        config.actor = "octocat".to_string();
        config.api_url = server.uri();

        let release = Release::initialize(config).await.unwrap();

        assert_eq!(release.identities.author.email, "octo@example.com");
        assert_eq!(release.identities.committer.name, crate::identity::BOT_NAME);
        assert!(release.changelog().document.unreleased.is_some());
    }

    #[tokio::test]
    async fn test_initialize_profile_failure_leaves_changelog() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let text = "## [Unreleased]\n- a\n";
        let (dir, path) = repo_with_changelog(text);
        let mut config = config("v1.0.0", false);
        config.workdir = dir.path().to_path_buf();
        config.actor = "ghost".to_string();
        config.api_url = server.uri();

        let err = init_err(config).await;

        let chain = format!("{:#}", err);
        assert!(chain.starts_with("git configuration error"), "{}", chain);
        assert!(chain.contains("http code 404"), "{}", chain);
        assert_eq!(std::fs::read_to_string(path).unwrap(), text);
    }

    #[test]
    fn test_empty_unreleased_fails_first_stage() {
        let dir = TempDir::new().unwrap();
        let mut release = release(&dir, "v1.0.0", false, MockRepository::new());
        release.changelog.document.unreleased.as_mut().unwrap().body.clear();

        let err = release.execute(today()).unwrap_err();

        assert!(err.to_string().starts_with("error updating changelog file"));
        assert!(release.repo().commits().is_empty());
    }
}
