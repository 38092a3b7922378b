use askama::Template;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::models::{Notice, Roster};
use crate::presenter::Presenter;
use crate::services::roster_sync_service::LOAD_FAILED_TEXT;
use crate::web::board_view::BoardView;

const LOADING_TEXT: &str = "Loading activities...";

#[derive(Template)]
#[template(path = "board.html")]
struct BoardTemplate<'a> {
    board: &'a BoardView,
    notice: Option<&'a Notice>,
    placeholder: Option<&'a str>,
}

#[derive(Default)]
struct BoardState {
    view: BoardView,
    notice: Option<Notice>,
    load_failed: bool,
    loaded: bool,
}

/// Presenter that renders the whole board page and writes it to a file on
/// every change.
pub struct HtmlBoard {
    output_path: PathBuf,
    state: Mutex<BoardState>,
}

impl HtmlBoard {
    pub fn new(output_path: impl AsRef<Path>) -> Self {
        Self {
            output_path: output_path.as_ref().to_path_buf(),
            state: Mutex::new(BoardState::default()),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn view(&self) -> BoardView {
        self.lock().view.clone()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.lock().notice.clone()
    }

    pub fn render(&self) -> Result<String, askama::Error> {
        render_page(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, apply: impl FnOnce(&mut BoardState)) {
        let mut state = self.lock();
        apply(&mut state);
        let page = match render_page(&state) {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "board render failed");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.output_path, page) {
            warn!(path = %self.output_path.display(), error = %e, "board write failed");
            return;
        }
        debug!(path = %self.output_path.display(), "board written");
    }
}

fn render_page(state: &BoardState) -> Result<String, askama::Error> {
    let placeholder = if state.load_failed {
        Some(LOAD_FAILED_TEXT)
    } else if !state.loaded {
        Some(LOADING_TEXT)
    } else {
        None
    };
    BoardTemplate {
        board: &state.view,
        notice: state.notice.as_ref(),
        placeholder,
    }
    .render()
}

impl Presenter for HtmlBoard {
    fn on_roster_changed(&self, roster: &Roster) {
        let view = BoardView::from_roster(roster);
        self.update(|state| {
            state.view = view;
            state.load_failed = false;
            state.loaded = true;
        });
    }

    fn on_roster_unavailable(&self) {
        self.update(|state| {
            state.view = BoardView::default();
            state.load_failed = true;
            state.loaded = true;
        });
    }

    fn on_message(&self, notice: &Notice) {
        let notice = notice.clone();
        self.update(|state| state.notice = Some(notice));
    }

    fn on_message_hidden(&self) {
        self.update(|state| state.notice = None);
    }
}
