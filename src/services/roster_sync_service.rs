use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tracing::{info, warn};

use crate::error::SyncError;
use crate::models::{Notice, Roster};
use crate::presenter::Presenter;
use crate::services::activities_api_service::ActivitiesClient;
use crate::services::notice_service::NoticeBoard;

pub const LOAD_FAILED_TEXT: &str = "Failed to load activities. Please try again later.";
pub const SIGNUP_FALLBACK_TEXT: &str = "An error occurred";
pub const SIGNUP_TRANSPORT_TEXT: &str = "Failed to sign up. Please try again.";
pub const REMOVAL_FAILED_TEXT: &str = "Failed to remove participant. Please try again.";

/// How enroll/unenroll calls issued close together relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionOrdering {
    /// Actions run as soon as they are issued. Their trailing refreshes can
    /// land in any order and the last one to land is what stays on screen.
    #[default]
    Overlapping,
    /// Actions on the same activity wait for each other, trailing refresh
    /// included. Different activities still overlap.
    PerActivity,
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub message_ttl: Duration,
    pub ordering: ActionOrdering,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            message_ttl: Duration::from_secs(5),
            ordering: ActionOrdering::Overlapping,
        }
    }
}

/// Owns the client-side roster and keeps it in step with the backend.
///
/// The roster is only ever replaced by a full listing; signups and removals
/// never touch it directly and become visible through the refresh that
/// follows a confirmed success.
pub struct RosterSync<P: Presenter> {
    api: ActivitiesClient,
    presenter: Arc<P>,
    notices: NoticeBoard<P>,
    roster: RwLock<Arc<Roster>>,
    ordering: ActionOrdering,
    activity_locks: ActivityLocks,
}

impl<P: Presenter> RosterSync<P> {
    pub fn new(api: ActivitiesClient, presenter: Arc<P>, options: SyncOptions) -> Self {
        Self {
            notices: NoticeBoard::new(Arc::clone(&presenter), options.message_ttl),
            api,
            presenter,
            roster: RwLock::new(Arc::new(Roster::empty())),
            ordering: options.ordering,
            activity_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The last roster swapped in. Empty before the first refresh and after a
    /// failed one.
    pub fn roster(&self) -> Arc<Roster> {
        Arc::clone(&self.roster.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn current_notice(&self) -> Option<Notice> {
        self.notices.current()
    }

    /// Fetches the full listing and replaces the roster with it.
    ///
    /// On failure the roster is cleared, the presenter is told the listing is
    /// unavailable and an error notice is shown.
    pub async fn refresh(&self) -> Result<Arc<Roster>, SyncError> {
        match self.api.list_activities().await {
            Ok(roster) => {
                let roster = Arc::new(roster);
                // Swap and render under one lock so the screen always shows
                // the roster that is stored.
                let mut slot = self.roster.write().unwrap_or_else(PoisonError::into_inner);
                *slot = Arc::clone(&roster);
                self.presenter.on_roster_changed(&roster);
                drop(slot);
                info!(activities = roster.len(), "roster refreshed");
                Ok(roster)
            }
            Err(e) => {
                warn!(error = %e, "roster refresh failed");
                {
                    let mut slot = self.roster.write().unwrap_or_else(PoisonError::into_inner);
                    *slot = Arc::new(Roster::empty());
                    self.presenter.on_roster_unavailable();
                }
                self.notices.show(Notice::error(LOAD_FAILED_TEXT));
                Err(e)
            }
        }
    }

    /// Signs `email` up for `activity`, then refreshes.
    ///
    /// `activity` is whatever the user picked from the last rendered roster;
    /// it is not checked against the current one. A rejected or failed signup
    /// leaves the roster untouched and skips the refresh.
    pub async fn enroll(&self, activity: &str, email: &str) -> Result<Arc<Roster>, SyncError> {
        let _turn = self.wait_for_turn(activity).await;

        match self.api.signup(activity, email).await {
            Ok(accepted) => {
                info!(activity = %activity, email = %email, "signup accepted");
                let text = accepted
                    .message
                    .unwrap_or_else(|| format!("Signed up for {}", activity));
                self.notices.show(Notice::success(text));
                self.refresh().await
            }
            Err(e) => {
                warn!(activity = %activity, email = %email, error = %e, "signup failed");
                let text = match &e {
                    SyncError::ActionRejected { detail, .. } => detail
                        .clone()
                        .unwrap_or_else(|| SIGNUP_FALLBACK_TEXT.to_string()),
                    SyncError::TransportFailure { .. } => SIGNUP_TRANSPORT_TEXT.to_string(),
                    SyncError::LoadFailure { .. } => SIGNUP_FALLBACK_TEXT.to_string(),
                };
                self.notices.show(Notice::error(text));
                Err(e)
            }
        }
    }

    /// Removes `email` from `activity`, then refreshes. Failures show a generic
    /// error and skip the refresh.
    pub async fn unenroll(&self, activity: &str, email: &str) -> Result<Arc<Roster>, SyncError> {
        let _turn = self.wait_for_turn(activity).await;

        match self.api.remove_participant(activity, email).await {
            Ok(()) => {
                info!(activity = %activity, email = %email, "participant removed");
                self.refresh().await
            }
            Err(e) => {
                warn!(activity = %activity, email = %email, error = %e, "participant removal failed");
                self.notices.show(Notice::error(REMOVAL_FAILED_TEXT));
                Err(e)
            }
        }
    }

    async fn wait_for_turn(&self, activity: &str) -> Option<ActivityTurn<'_>> {
        if self.ordering == ActionOrdering::Overlapping {
            return None;
        }
        let lock = {
            let mut locks = lock_map(&self.activity_locks);
            Arc::clone(locks.entry(activity.to_string()).or_default())
        };
        let guard = lock.lock_owned().await;
        Some(ActivityTurn {
            locks: &self.activity_locks,
            activity: activity.to_string(),
            guard: Some(guard),
        })
    }
}

type ActivityLocks = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

fn lock_map(locks: &ActivityLocks) -> MutexGuard<'_, HashMap<String, Arc<tokio::sync::Mutex<()>>>> {
    locks.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive turn on one activity. Releasing the last interest in a key
/// drops its entry from the lock map.
struct ActivityTurn<'a> {
    locks: &'a ActivityLocks,
    activity: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ActivityTurn<'_> {
    fn drop(&mut self) {
        // Waiters clone the Arc under the map lock, so the count is exact here.
        let mut locks = lock_map(self.locks);
        drop(self.guard.take());
        let idle = locks
            .get(&self.activity)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            locks.remove(&self.activity);
        }
    }
}
