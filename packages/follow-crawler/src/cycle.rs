//! One discovery step over the follow graph.

use futures::TryStreamExt;
use tracing::{debug, info};
use twitter_client::TwitterUser;

use crate::directory::RemoteDirectory;
use crate::error::{CrawlerError, Result};
use crate::storage::GraphStore;

/// What a completed cycle did to the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The account was refreshed and its outbound edges rewritten.
    Refreshed {
        id: String,
        handle: String,
        followings_written: usize,
    },
    /// The account no longer resolves and was removed with its edges.
    Deleted { id: String, handle: String },
}

/// Run one select-resolve-commit-stats cycle.
///
/// `seed_handle` is consulted only when the store has no frontier
/// candidate; a resolvable seed bootstraps the graph. A frontier account
/// that no longer resolves is removed; a seed that does not resolve is a
/// fatal error, since there is nothing to delete.
pub async fn run_cycle<S, D>(
    store: &S,
    directory: &D,
    seed_handle: Option<&str>,
) -> Result<CycleOutcome>
where
    S: GraphStore,
    D: RemoteDirectory,
{
    let outcome = match store.pick_frontier().await? {
        Some(current) => match directory.resolve_by_handle(&current.username).await? {
            Some(resolved) => refresh(store, directory, resolved).await?,
            None => {
                store.remove_user(&current.id).await?;
                info!(
                    id = %current.id,
                    handle = %current.username,
                    "account no longer resolves, removed with its edges"
                );
                CycleOutcome::Deleted {
                    id: current.id,
                    handle: current.username,
                }
            }
        },
        None => {
            let handle = seed_handle.ok_or(CrawlerError::NoSeed)?;
            let resolved = directory
                .resolve_by_handle(handle)
                .await?
                .ok_or_else(|| CrawlerError::SeedNotFound {
                    handle: handle.to_string(),
                })?;
            refresh(store, directory, resolved).await?
        }
    };

    // Recorded on the deletion path too, so the sample reflects the
    // post-deletion graph size.
    let stats = store.snapshot_stats().await?;
    debug!(
        user_count = stats.user_count,
        following_count = stats.following_count,
        "stats sample recorded"
    );

    Ok(outcome)
}

async fn refresh<S, D>(store: &S, directory: &D, user: TwitterUser) -> Result<CycleOutcome>
where
    S: GraphStore,
    D: RemoteDirectory,
{
    // A protected account's follow list is not observable. Refreshing it
    // with an empty set still clears any edges recorded before it went
    // private.
    let followings: Vec<TwitterUser> = if user.protected {
        Vec::new()
    } else {
        directory.list_outbound(&user.id).try_collect().await?
    };

    let written = store.commit_refresh(&user, &followings).await?;
    info!(
        id = %user.id,
        handle = %user.username,
        followings_written = written,
        "refreshed account"
    );

    Ok(CycleOutcome::Refreshed {
        id: user.id,
        handle: user.username,
        followings_written: written,
    })
}
