//! Pure Twitter API v2 REST client.
//!
//! A minimal client for the two endpoints the follow crawler needs:
//! user lookup by username and the paginated following list. Every
//! request is retried with exponential backoff up to a fixed ceiling;
//! a "resource not found" response is reported as an explicit absence,
//! never as an error.
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use twitter_client::TwitterClient;
//!
//! let client = TwitterClient::from_env()?;
//!
//! if let Some(user) = client.get_user_by_username("alice").await? {
//!     let follows: Vec<_> = client.following_stream(&user.id).try_collect().await?;
//! }
//! ```

pub mod error;
pub mod retry;
pub mod types;

pub use error::{Result, TwitterError};
pub use retry::{backoff_delay, API_RETRY_MAX};
pub use types::{ApiProblem, FollowingPage, PageMeta, TwitterUser, UserResponse, ERROR_NOT_FOUND};

use futures::stream::BoxStream;
use serde::de::DeserializeOwned;

const BASE_URL: &str = "https://api.twitter.com/2";

/// User fields requested on every lookup, so the persisted snapshot
/// carries the full profile rather than the default minimal one.
const USER_FIELDS: &str = "created_at,description,entities,id,location,name,pinned_tweet_id,\
                           profile_image_url,protected,public_metrics,url,username,verified,withheld";

/// Largest page size the following endpoint accepts.
const MAX_PAGE_SIZE: &str = "1000";

pub struct TwitterClient {
    client: reqwest::Client,
    bearer_token: String,
    base_url: String,
}

impl TwitterClient {
    /// Create a new client with the given bearer token.
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            bearer_token: bearer_token.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Create from the `TWITTER_API_BEARER_TOKEN` environment variable.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("TWITTER_API_BEARER_TOKEN")
            .map_err(|_| TwitterError::Config("TWITTER_API_BEARER_TOKEN not set".into()))?;
        Ok(Self::new(token))
    }

    /// Set a custom base URL (for proxies or a stand-in server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Look up a user's current profile by username.
    ///
    /// Returns `Ok(None)` when the API reports the resource as not
    /// found; that is a defined outcome of resolution, not a failure,
    /// and is never retried.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<TwitterUser>> {
        let path = format!("/users/by/username/{username}");
        let query = [("user.fields", USER_FIELDS.to_string())];

        let resp: UserResponse = self.get_json(&path, &query).await?;

        if resp.not_found() {
            return Ok(None);
        }
        match resp.data {
            Some(user) => Ok(Some(user)),
            None => Err(TwitterError::Decode("user response missing data".into())),
        }
    }

    /// Stream every account `user_id` currently follows.
    ///
    /// Pages are fetched on demand: each page's items are yielded before
    /// the next page is requested. The sequence is finite and cannot be
    /// restarted; collect it when the whole set is needed at once.
    pub fn following_stream(&self, user_id: &str) -> BoxStream<'_, Result<TwitterUser>> {
        let path = format!("/users/{user_id}/following");

        Box::pin(async_stream::stream! {
            let mut next_token: Option<String> = None;
            loop {
                let mut query = vec![
                    ("user.fields", USER_FIELDS.to_string()),
                    ("max_results", MAX_PAGE_SIZE.to_string()),
                ];
                if let Some(token) = &next_token {
                    query.push(("pagination_token", token.clone()));
                }

                let page: FollowingPage = match self.get_json(&path, &query).await {
                    Ok(page) => page,
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                };

                if page.meta.result_count > 0 {
                    for user in page.data {
                        yield Ok(user);
                    }
                }

                match page.meta.next_token {
                    Some(token) => next_token = Some(token),
                    None => break,
                }
            }
        })
    }

    /// Issue one GET with the retry policy and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let url = &url;

        retry::with_backoff(API_RETRY_MAX, move || async move {
            tracing::debug!(url = %url, "call api");

            let resp = self
                .client
                .get(url)
                .query(query)
                .bearer_auth(&self.bearer_token)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(TwitterError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            resp.json::<T>()
                .await
                .map_err(|e| TwitterError::Decode(e.to_string()))
        })
        .await
    }
}
