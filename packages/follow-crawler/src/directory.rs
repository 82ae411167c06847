//! Seam between the crawl cycle and the remote account directory.

use async_trait::async_trait;
use futures::stream::BoxStream;
use twitter_client::{Result as TwitterResult, TwitterClient, TwitterUser};

/// Read-only view of the remote social directory (to allow mocking).
///
/// Implementations never touch storage; the cycle is the only writer.
#[async_trait]
pub trait RemoteDirectory: Send + Sync {
    /// Current profile for a handle, or `None` when it no longer resolves.
    async fn resolve_by_handle(&self, handle: &str) -> TwitterResult<Option<TwitterUser>>;

    /// Lazy stream of every account `user_id` currently follows.
    fn list_outbound<'a>(&'a self, user_id: &'a str) -> BoxStream<'a, TwitterResult<TwitterUser>>;
}

#[async_trait]
impl RemoteDirectory for TwitterClient {
    async fn resolve_by_handle(&self, handle: &str) -> TwitterResult<Option<TwitterUser>> {
        self.get_user_by_username(handle).await
    }

    fn list_outbound<'a>(&'a self, user_id: &'a str) -> BoxStream<'a, TwitterResult<TwitterUser>> {
        self.following_stream(user_id)
    }
}
