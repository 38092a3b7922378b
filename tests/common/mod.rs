//! Test harness: an in-process activities backend and a presenter that
//! records every notification.
//!
//! The fake backend applies the same rules as the school's API: unknown
//! activity is a 404, a full activity or a repeat signup is a 400, and
//! removing someone who is not enrolled is a 404.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use signup_board::{
    ActionOrdering, ActivitiesClient, Notice, Presenter, Roster, RosterSync, SyncOptions,
};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct FakeActivity {
    pub description: String,
    pub schedule: String,
    pub max_participants: i64,
    pub participants: Vec<String>,
}

impl FakeActivity {
    pub fn new(max_participants: i64, participants: &[&str]) -> Self {
        Self {
            description: "d".to_string(),
            schedule: "s".to_string(),
            max_participants,
            participants: participants.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub activities: Vec<(String, FakeActivity)>,
    /// Served instead of the listing when set.
    pub listing_override: Option<(StatusCode, String)>,
    /// Served instead of applying the signup when set.
    pub signup_override: Option<(StatusCode, String)>,
    pub signup_delay: Duration,
    pub list_calls: usize,
    pub signup_calls: usize,
    pub remove_calls: usize,
    pub signups_in_flight: usize,
    pub max_signups_in_flight: usize,
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeBackend {
    pub addr: SocketAddr,
    pub url: Url,
    state: Shared,
    server: JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start(activities: Vec<(&str, FakeActivity)>) -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState {
            activities: activities
                .into_iter()
                .map(|(name, a)| (name.to_string(), a))
                .collect(),
            ..FakeState::default()
        }));

        let app = Router::new()
            .route("/activities", get(list_activities))
            .route("/activities/:name/signup", post(signup))
            .route(
                "/activities/:name/participants/:email",
                delete(remove_participant),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("fake backend addr");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend");
        });
        let url = Url::parse(&format!("http://{}", addr)).expect("fake backend url");

        Self {
            addr,
            url,
            state,
            server,
        }
    }

    /// The nine Mergington High School activities.
    pub async fn mergington() -> Self {
        let seed = [
            ("Chess Club", "Learn strategies and compete in chess tournaments", "Fridays, 3:30 PM - 5:00 PM", 12, ["michael@mergington.edu", "daniel@mergington.edu"]),
            ("Programming Class", "Learn programming fundamentals and build software projects", "Tuesdays and Thursdays, 3:30 PM - 4:30 PM", 20, ["emma@mergington.edu", "sophia@mergington.edu"]),
            ("Gym Class", "Physical education and sports activities", "Mondays, Wednesdays, Fridays, 2:00 PM - 3:00 PM", 30, ["john@mergington.edu", "olivia@mergington.edu"]),
            ("Soccer Team", "Join the school soccer team and compete in local leagues", "Tuesdays and Thursdays, 4:00 PM - 5:30 PM", 18, ["lucas@mergington.edu", "mia@mergington.edu"]),
            ("Basketball Club", "Practice basketball skills and play friendly matches", "Wednesdays, 3:30 PM - 5:00 PM", 15, ["liam@mergington.edu", "ava@mergington.edu"]),
            ("Art Club", "Explore painting, drawing, and other visual arts", "Mondays, 3:30 PM - 5:00 PM", 16, ["noah@mergington.edu", "isabella@mergington.edu"]),
            ("Drama Society", "Participate in acting, stage production, and school plays", "Fridays, 4:00 PM - 5:30 PM", 20, ["charlotte@mergington.edu", "jackson@mergington.edu"]),
            ("Math Club", "Solve challenging math problems and prepare for competitions", "Thursdays, 3:30 PM - 4:30 PM", 14, ["amelia@mergington.edu", "benjamin@mergington.edu"]),
            ("Science Olympiad", "Engage in science experiments and academic competitions", "Wednesdays, 4:00 PM - 5:00 PM", 12, ["elijah@mergington.edu", "harper@mergington.edu"]),
        ];
        let activities = seed
            .into_iter()
            .map(|(name, description, schedule, max, participants)| {
                (
                    name,
                    FakeActivity {
                        description: description.to_string(),
                        schedule: schedule.to_string(),
                        max_participants: max,
                        participants: participants.iter().map(|p| p.to_string()).collect(),
                    },
                )
            })
            .collect();
        Self::start(activities).await
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn client(&self) -> ActivitiesClient {
        ActivitiesClient::new(self.url.clone())
    }

    pub fn sync<P: Presenter>(&self, presenter: Arc<P>) -> RosterSync<P> {
        self.sync_with(presenter, Duration::from_secs(5), ActionOrdering::Overlapping)
    }

    pub fn sync_with<P: Presenter>(
        &self,
        presenter: Arc<P>,
        message_ttl: Duration,
        ordering: ActionOrdering,
    ) -> RosterSync<P> {
        RosterSync::new(
            self.client(),
            presenter,
            SyncOptions {
                message_ttl,
                ordering,
            },
        )
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A base URL nothing listens on.
pub async fn unreachable_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind unused port");
    let addr = listener.local_addr().expect("unused port addr");
    drop(listener);
    Url::parse(&format!("http://{}", addr)).expect("unreachable url")
}

fn detail(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "detail": text }))).into_response()
}

async fn list_activities(State(state): State<Shared>) -> Response {
    let mut state = state.lock().unwrap();
    state.list_calls += 1;
    if let Some((status, body)) = state.listing_override.clone() {
        return (status, body).into_response();
    }

    let mut body = Map::new();
    for (name, a) in &state.activities {
        body.insert(
            name.clone(),
            json!({
                "description": a.description,
                "schedule": a.schedule,
                "max_participants": a.max_participants,
                "participants": a.participants,
            }),
        );
    }
    Json(Value::Object(body)).into_response()
}

#[derive(Deserialize)]
struct SignupQuery {
    email: String,
}

async fn signup(
    State(state): State<Shared>,
    Path(name): Path<String>,
    Query(query): Query<SignupQuery>,
) -> Response {
    let delay = {
        let mut s = state.lock().unwrap();
        s.signup_calls += 1;
        s.signups_in_flight += 1;
        s.max_signups_in_flight = s.max_signups_in_flight.max(s.signups_in_flight);
        s.signup_delay
    };
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let mut s = state.lock().unwrap();
    s.signups_in_flight -= 1;
    if let Some((status, body)) = s.signup_override.clone() {
        return (status, body).into_response();
    }
    let Some((_, activity)) = s.activities.iter_mut().find(|(n, _)| *n == name) else {
        return detail(StatusCode::NOT_FOUND, "Activity not found");
    };
    if activity.participants.len() as i64 >= activity.max_participants {
        return detail(StatusCode::BAD_REQUEST, "Activity is full");
    }
    if activity.participants.contains(&query.email) {
        return detail(StatusCode::BAD_REQUEST, "Already signed up for this activity");
    }
    activity.participants.push(query.email);
    Json(json!({ "message": format!("Successfully signed up for {}", name) })).into_response()
}

async fn remove_participant(
    State(state): State<Shared>,
    Path((name, email)): Path<(String, String)>,
) -> Response {
    let mut s = state.lock().unwrap();
    s.remove_calls += 1;
    let position = s
        .activities
        .iter_mut()
        .find(|(n, _)| *n == name)
        .and_then(|(_, a)| a.participants.iter().position(|p| *p == email).map(|i| (a, i)));
    let Some((activity, index)) = position else {
        return detail(StatusCode::NOT_FOUND, "Participant not found in activity");
    };
    activity.participants.remove(index);
    Json(json!({ "message": format!("Successfully removed from {}", name) })).into_response()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    RosterChanged(Roster),
    RosterUnavailable,
    Message(Notice),
    MessageHidden,
}

#[derive(Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<Event>>,
}

impl RecordingPresenter {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn rosters(&self) -> Vec<Roster> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::RosterChanged(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Message(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl Presenter for RecordingPresenter {
    fn on_roster_changed(&self, roster: &Roster) {
        self.push(Event::RosterChanged(roster.clone()));
    }

    fn on_roster_unavailable(&self) {
        self.push(Event::RosterUnavailable);
    }

    fn on_message(&self, notice: &Notice) {
        self.push(Event::Message(notice.clone()));
    }

    fn on_message_hidden(&self) {
        self.push(Event::MessageHidden);
    }
}
