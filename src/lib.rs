//! Client-side controller for the Mergington High School activity sign-up
//! board.
//!
//! [`RosterSync`] keeps an in-memory roster in step with the activities
//! backend and reports changes to a [`Presenter`]. [`HtmlBoard`] is the
//! bundled presenter; it renders the board page to a file.

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod presenter;
pub mod services;
pub mod web;

pub use config::BoardConfig;
pub use error::{ConfigError, SyncError};
pub use models::{Activity, Notice, NoticeKind, Roster};
pub use presenter::Presenter;
pub use services::activities_api_service::ActivitiesClient;
pub use services::roster_sync_service::{ActionOrdering, RosterSync, SyncOptions};
pub use web::board_view::BoardView;
pub use web::html_board::HtmlBoard;
