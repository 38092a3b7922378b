use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::models::Roster;
use crate::presenter::Presenter;
use crate::services::roster_sync_service::RosterSync;

pub const USAGE: &str =
    "commands: refresh | signup <email> <activity> | remove <email> <activity> | list | quit";

/// One user gesture read from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Signup { email: String, activity: String },
    Remove { email: String, activity: String },
    List,
    Quit,
}

impl Command {
    /// Parses a line such as `signup jane@mergington.edu Chess Club`.
    /// Activity names may contain spaces; the email may not.
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        match (verb.to_lowercase().as_str(), rest.is_empty()) {
            ("refresh", true) => Some(Command::Refresh),
            ("list", true) => Some(Command::List),
            ("quit" | "exit", true) => Some(Command::Quit),
            ("signup", false) => {
                let (email, activity) = split_target(rest)?;
                Some(Command::Signup { email, activity })
            }
            ("remove", false) => {
                let (email, activity) = split_target(rest)?;
                Some(Command::Remove { email, activity })
            }
            _ => None,
        }
    }

    /// Runs an action command. `List` and `Quit` are handled by the caller.
    pub async fn run<P: Presenter>(self, sync: &RosterSync<P>) {
        // Outcomes were already reported through the presenter.
        let outcome = match self {
            Command::Refresh => sync.refresh().await.map(|_| ()),
            Command::Signup { email, activity } => {
                sync.enroll(&activity, &email).await.map(|_| ())
            }
            Command::Remove { email, activity } => {
                sync.unenroll(&activity, &email).await.map(|_| ())
            }
            Command::List | Command::Quit => Ok(()),
        };
        if let Err(e) = outcome {
            debug!(error = %e, "command finished with error");
        }
    }
}

/// Reads one command per line until `quit` or end of input.
///
/// Actions are spawned, not awaited, so a new one can start while an earlier
/// one is still in flight. Every spawned action is awaited before returning.
pub async fn run_lines<R, P>(input: R, sync: Arc<RosterSync<P>>)
where
    R: AsyncBufRead + Unpin,
    P: Presenter,
{
    let mut lines = input.lines();
    let mut actions = JoinSet::new();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "input read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match Command::parse(&line) {
            Some(Command::Quit) => break,
            Some(Command::List) => {
                println!("{}", format_roster(&sync.roster()).trim_end());
                if let Some(notice) = sync.current_notice() {
                    println!("[{}] {}", notice.kind.as_str(), notice.text);
                }
            }
            Some(command) => {
                let sync = Arc::clone(&sync);
                actions.spawn(async move { command.run(&*sync).await });
            }
            None => println!("{}", USAGE),
        }
        while let Some(done) = actions.try_join_next() {
            log_join(done);
        }
    }

    if !actions.is_empty() {
        info!(pending = actions.len(), "waiting for in-flight actions");
    }
    while let Some(done) = actions.join_next().await {
        log_join(done);
    }
}

fn log_join(done: Result<(), tokio::task::JoinError>) {
    if let Err(e) = done {
        warn!(error = %e, "action task did not finish");
    }
}

fn split_target(rest: &str) -> Option<(String, String)> {
    let (email, activity) = rest.split_once(char::is_whitespace)?;
    let activity = activity.trim();
    if email.is_empty() || activity.is_empty() {
        return None;
    }
    Some((email.to_string(), activity.to_string()))
}

/// Plain-text summary of a roster for the terminal.
pub fn format_roster(roster: &Roster) -> String {
    if roster.is_empty() {
        return "no activities loaded".to_string();
    }
    let mut out = String::new();
    for activity in roster.iter() {
        out.push_str(&format!(
            "{} ({} spots left) - {}\n",
            activity.name,
            activity.spots_left(),
            activity.schedule
        ));
        for email in &activity.participants {
            out.push_str(&format!("  - {}\n", email));
        }
    }
    out
}
