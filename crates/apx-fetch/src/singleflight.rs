//! # Single-Flight Claims
//!
//! Collapses concurrent work for the same key into one execution.
//!
//! The first caller for a key becomes the leader: it registers a one-shot
//! completion signal under the key and runs the work on a spawned task, so
//! the work finishes even if the leader's own caller goes away. Every caller
//! that arrives while the claim is registered becomes a follower and waits
//! for the leader's value.
//!
//! The claim table is guarded by a single mutex that is held only while
//! claiming or releasing, never across an `.await`. The claim is released
//! before the value is published, so a caller arriving after completion
//! starts a fresh claim (and, for cache population, finds the committed
//! asset). If the leader task dies without publishing, followers retry the
//! claim step.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

type Claims<K, T> = Arc<Mutex<HashMap<K, watch::Receiver<Option<T>>>>>;

/// Whether a call ran the work itself or shared another call's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Leader,
    Follower,
}

/// The task running the work terminated without producing a value.
#[derive(Debug, thiserror::Error)]
#[error("in-flight work for this key terminated without a result")]
pub struct Abandoned;

/// Per-key deduplication of concurrent work.
pub struct SingleFlight<K, T> {
    claims: Claims<K, T>,
}

impl<K, T> Clone for SingleFlight<K, T> {
    fn clone(&self) -> Self {
        Self {
            claims: Arc::clone(&self.claims),
        }
    }
}

impl<K, T> Default for SingleFlight<K, T> {
    fn default() -> Self {
        Self {
            claims: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, T> std::fmt::Debug for SingleFlight<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.claims.lock().len())
            .finish()
    }
}

enum Claim<T> {
    Lead(watch::Sender<Option<T>>),
    Follow(watch::Receiver<Option<T>>),
}

/// Removes the key from the claim table when dropped, including on panic.
struct ClaimGuard<K: Hash + Eq, T> {
    claims: Claims<K, T>,
    key: K,
}

impl<K: Hash + Eq, T> Drop for ClaimGuard<K, T> {
    fn drop(&mut self) {
        self.claims.lock().remove(&self.key);
    }
}

impl<K, T> SingleFlight<K, T>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently claimed.
    pub fn in_flight(&self) -> usize {
        self.claims.lock().len()
    }

    /// Run `work` for `key`, or wait for the call already running for it.
    ///
    /// `work` is only invoked when this call becomes the leader.
    pub async fn run<F, Fut>(&self, key: K, work: F) -> Result<(T, Role), Abandoned>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        loop {
            let claim = {
                let mut claims = self.claims.lock();
                match claims.get(&key) {
                    Some(rx) => Claim::Follow(rx.clone()),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        claims.insert(key.clone(), rx);
                        Claim::Lead(tx)
                    }
                }
            };

            match claim {
                Claim::Lead(tx) => {
                    let guard = ClaimGuard {
                        claims: Arc::clone(&self.claims),
                        key: key.clone(),
                    };
                    let fut = work();
                    let handle = tokio::spawn(async move {
                        let value = fut.await;
                        drop(guard);
                        // Followers may all be gone; that is fine.
                        let _ = tx.send(Some(value.clone()));
                        value
                    });
                    return match handle.await {
                        Ok(value) => Ok((value, Role::Leader)),
                        Err(e) => {
                            tracing::error!(error = %e, "single-flight leader task failed");
                            Err(Abandoned)
                        }
                    };
                }
                Claim::Follow(mut rx) => {
                    let shared = match rx.wait_for(Option::is_some).await {
                        Ok(value) => (*value).clone(),
                        Err(_) => None,
                    };
                    if let Some(value) = shared {
                        return Ok((value, Role::Follower));
                    }
                    tracing::debug!("single-flight leader vanished, re-claiming");
                    tokio::task::yield_now().await;
                }
            }
        }
    }
}
