//! Blog and notice posts written by the admin.
//!
//! Reads are public. Every write checks the session first and touches
//! nothing when the check fails.

use crate::session::{CredentialVerifier, SessionGuard};
use crate::store::PostStore;
use crate::{LeagueError, NewPost, Post, PostKind, PostUpdate};
use chrono::{DateTime, Utc};
use log::info;

/// Store a new post. A post without an author is credited to the admin
/// whose session made the call.
pub async fn publish_post<V, S>(
    guard: &SessionGuard<V>,
    token: Option<&str>,
    store: &S,
    kind: PostKind,
    mut post: NewPost,
    now: DateTime<Utc>,
) -> Result<Post, LeagueError>
where
    V: CredentialVerifier,
    S: PostStore,
{
    guard.authorize(token, now)?;
    post.validate()?;
    if post.author_email.as_deref().is_none_or(|e| e.trim().is_empty()) {
        post.author_email = token.and_then(|t| guard.parse_token(t)).map(|s| s.email);
    }
    let stored = store.create_post(kind, &post).await?;
    info!("published {} {} ({})", kind.label(), stored.id, stored.title);
    Ok(stored)
}

pub async fn edit_post<V, S>(
    guard: &SessionGuard<V>,
    token: Option<&str>,
    store: &S,
    kind: PostKind,
    id: &str,
    update: &PostUpdate,
    now: DateTime<Utc>,
) -> Result<Post, LeagueError>
where
    V: CredentialVerifier,
    S: PostStore,
{
    guard.authorize(token, now)?;
    update.validate()?;
    let stored = store.update_post(kind, id, update, now).await?;
    info!("edited {} {id}", kind.label());
    Ok(stored)
}

pub async fn remove_post<V, S>(
    guard: &SessionGuard<V>,
    token: Option<&str>,
    store: &S,
    kind: PostKind,
    id: &str,
    now: DateTime<Utc>,
) -> Result<(), LeagueError>
where
    V: CredentialVerifier,
    S: PostStore,
{
    guard.authorize(token, now)?;
    store.delete_post(kind, id).await?;
    info!("deleted {} {id}", kind.label());
    Ok(())
}
