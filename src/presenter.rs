use crate::models::{Notice, Roster};

/// Rendering side of the board.
///
/// Implementations re-render from the values they are handed and must not call
/// back into the synchronizer. Calls can arrive from any task.
pub trait Presenter: Send + Sync + 'static {
    /// A refresh succeeded; `roster` is the complete new snapshot.
    fn on_roster_changed(&self, roster: &Roster);

    /// A refresh failed. Stale activities must not stay on screen.
    fn on_roster_unavailable(&self);

    /// `notice` replaces whatever message was visible.
    fn on_message(&self, notice: &Notice);

    /// The visible message expired.
    fn on_message_hidden(&self);
}
