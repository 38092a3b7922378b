use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::Notice;
use crate::presenter::Presenter;

#[derive(Default)]
struct NoticeState {
    // Bumped on every show; a hide task only acts while its generation is current.
    generation: u64,
    current: Option<Notice>,
    pending_hide: Option<JoinHandle<()>>,
}

/// Shows at most one notice at a time and hides it after `ttl`.
///
/// Showing a new notice aborts the previous hide task, so an earlier timer
/// can never clear a later notice.
pub struct NoticeBoard<P: Presenter> {
    presenter: Arc<P>,
    ttl: Duration,
    state: Arc<Mutex<NoticeState>>,
}

impl<P: Presenter> NoticeBoard<P> {
    pub fn new(presenter: Arc<P>, ttl: Duration) -> Self {
        Self {
            presenter,
            ttl,
            state: Arc::new(Mutex::new(NoticeState::default())),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn show(&self, notice: Notice) {
        let mut state = lock(&self.state);
        if let Some(previous) = state.pending_hide.take() {
            previous.abort();
        }
        state.generation = state.generation.wrapping_add(1);
        let generation = state.generation;

        debug!(kind = notice.kind.as_str(), text = %notice.text, "showing notice");
        self.presenter.on_message(&notice);
        state.current = Some(notice);

        let presenter = Arc::clone(&self.presenter);
        let shared = Arc::clone(&self.state);
        let ttl = self.ttl;
        state.pending_hide = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut state = lock(&shared);
            if state.generation != generation {
                return;
            }
            state.current = None;
            state.pending_hide = None;
            presenter.on_message_hidden();
        }));
    }

    /// The notice currently on screen, if any.
    pub fn current(&self) -> Option<Notice> {
        lock(&self.state).current.clone()
    }
}

impl<P: Presenter> Drop for NoticeBoard<P> {
    fn drop(&mut self) {
        if let Some(pending) = lock(&self.state).pending_hide.take() {
            pending.abort();
        }
    }
}

fn lock(state: &Mutex<NoticeState>) -> MutexGuard<'_, NoticeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
