use crate::models::Roster;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRowView {
    pub activity: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCardView {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub max_participants: i64,
    pub spots_left: i64,
    pub participants: Vec<ParticipantRowView>,
}

impl ActivityCardView {
    pub fn is_over_capacity(&self) -> bool {
        self.spots_left < 0
    }
}

/// Everything the board page shows for one roster snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardView {
    pub cards: Vec<ActivityCardView>,
    // Signup dropdown, in roster order.
    pub options: Vec<String>,
}

impl BoardView {
    pub fn from_roster(roster: &Roster) -> Self {
        let cards = roster
            .iter()
            .map(|activity| ActivityCardView {
                name: activity.name.clone(),
                description: activity.description.clone(),
                schedule: activity.schedule.clone(),
                max_participants: activity.max_participants,
                spots_left: activity.spots_left(),
                participants: activity
                    .participants
                    .iter()
                    .map(|email| ParticipantRowView {
                        activity: activity.name.clone(),
                        email: email.clone(),
                    })
                    .collect(),
            })
            .collect();
        let options = roster.names().map(|n| n.to_string()).collect();
        Self { cards, options }
    }

    pub fn card(&self, name: &str) -> Option<&ActivityCardView> {
        self.cards.iter().find(|c| c.name == name)
    }
}
