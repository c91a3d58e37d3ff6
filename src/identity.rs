//! Commit author and committer identities
//!
//! The committer is always the CI bot. The author is the user that
//! triggered the run, with their public profile email when they have one.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ReleaseError, Result};

pub const BOT_NAME: &str = "github-actions[bot]";
pub const BOT_EMAIL: &str = "github-actions[bot]@users.noreply.github.com";

/// Upper bound for the profile request.
pub const PROFILE_TIMEOUT: Duration = Duration::from_secs(10);

/// A name/email pair stamped with a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
    pub when: DateTime<Utc>,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>, when: DateTime<Utc>) -> Self {
        Identity {
            name: name.into(),
            email: email.into(),
            when,
        }
    }

    /// The fixed bot identity used as committer and tagger.
    pub fn bot(when: DateTime<Utc>) -> Self {
        Identity::new(BOT_NAME, BOT_EMAIL, when)
    }

    pub fn to_signature(&self) -> Result<git2::Signature<'static>> {
        let time = git2::Time::new(self.when.timestamp(), 0);
        Ok(git2::Signature::new(&self.name, &self.email, &time)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPair {
    pub committer: Identity,
    pub author: Identity,
}

/// Username and token used to authenticate pushes.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Placeholder email for a user without a public address.
pub fn noreply_email(login: &str) -> String {
    format!("{}@users.noreply.github.com", login)
}

#[derive(Deserialize, Debug)]
struct Profile {
    #[serde(default)]
    email: Option<String>,
}

/// Client for the hosting API's user profile endpoint.
pub struct ProfileClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl ProfileClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(PROFILE_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReleaseError::profile_lookup(format!("error creating http client: {}", e)))?;

        Ok(ProfileClient {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Fetches the public email of `login`, if the profile has one.
    pub async fn email(&self, login: &str) -> Result<Option<String>> {
        let url = format!("{}/users/{}", self.api_url, login);
        debug!(%url, "fetching author profile");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| {
                ReleaseError::profile_lookup(format!("error fetching author information: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReleaseError::profile_lookup(format!(
                "error contacting api: http code {}",
                status.as_u16()
            )));
        }

        let profile: Profile = response.json().await.map_err(|e| {
            ReleaseError::profile_lookup(format!("error decoding response body: {}", e))
        })?;

        Ok(profile.email.filter(|email| !email.is_empty()))
    }
}

/// Builds the committer/author pair for `actor`.
///
/// An empty actor makes the author identical to the committer and skips
/// the profile request. Otherwise a failed lookup fails the resolution.
pub async fn resolve(
    actor: &str,
    profiles: &ProfileClient,
    when: DateTime<Utc>,
) -> Result<IdentityPair> {
    let committer = Identity::bot(when);

    if actor.is_empty() {
        return Ok(IdentityPair {
            author: committer.clone(),
            committer,
        });
    }

    let email = match profiles.email(actor).await? {
        Some(email) => email,
        None => noreply_email(actor),
    };
    info!(author = actor, %email, "resolved commit author");

    Ok(IdentityPair {
        committer,
        author: Identity::new(actor, email, when),
    })
}
