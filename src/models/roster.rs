use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// One activity as projected by `GET /activities`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub max_participants: i64,
    // Server order; duplicates are kept as received.
    pub participants: Vec<String>,
}

impl Activity {
    /// Remaining capacity. Negative when the backend reports more participants
    /// than `max_participants`.
    pub fn spots_left(&self) -> i64 {
        let taken = i64::try_from(self.participants.len()).unwrap_or(i64::MAX);
        self.max_participants.saturating_sub(taken)
    }

}

#[derive(Debug, Deserialize)]
struct ActivityFields {
    description: String,
    schedule: String,
    max_participants: i64,
    participants: Vec<String>,
}

/// Snapshot of every activity, in the order the backend listed them.
///
/// A roster is never patched: each refresh builds a new one and swaps it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    activities: Vec<Activity>,
}

impl Roster {
    pub fn new(activities: Vec<Activity>) -> Self {
        Self { activities }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    pub fn get(&self, name: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.activities.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.activities.iter().map(|a| a.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

impl<'de> Deserialize<'de> for Roster {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RosterVisitor)
    }
}

struct RosterVisitor;

impl<'de> Visitor<'de> for RosterVisitor {
    type Value = Roster;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping activity names to activity details")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Roster, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut activities: Vec<Activity> = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((name, fields)) = map.next_entry::<String, ActivityFields>()? {
            // A repeated key replaces the earlier entry in place, like a JSON object would.
            let activity = Activity {
                name,
                description: fields.description,
                schedule: fields.schedule,
                max_participants: fields.max_participants,
                participants: fields.participants,
            };
            match activities.iter_mut().find(|a| a.name == activity.name) {
                Some(existing) => *existing = activity,
                None => activities.push(activity),
            }
        }
        Ok(Roster { activities })
    }
}
