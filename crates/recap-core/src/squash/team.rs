//! Scoreboard team reconstruction.
//!
//! Player membership changes cancel pairwise: adding a player whose removal
//! is pending drops the removal, and vice versa. What is left is the
//! smallest set of team records that moves a client from the team state at
//! the start of the recording to the state at its end.

use std::collections::{BTreeMap, BTreeSet};

use crate::record::{Record, TeamAction, TeamData, TeamInfo, TimedRecord};

/// How a team entry came into existence during the recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamStatus {
    /// First seen being created: output is a single create record.
    Created,
    /// First seen being modified: the team predates the recording.
    Updated,
    /// Removed; it predated the recording.
    Removed,
    /// Removed, then created again under the same name.
    Recreated,
}

/// Pending state for one team name.
#[derive(Debug, Clone)]
pub struct TeamState {
    status: TeamStatus,
    info: Option<TeamInfo>,
    pending_add: BTreeSet<String>,
    pending_remove: BTreeSet<String>,
}

impl TeamState {
    const fn new(status: TeamStatus) -> Self {
        Self {
            status,
            info: None,
            pending_add: BTreeSet::new(),
            pending_remove: BTreeSet::new(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> TeamStatus {
        self.status
    }

    #[must_use]
    pub const fn info(&self) -> Option<&TeamInfo> {
        self.info.as_ref()
    }

    #[must_use]
    pub const fn pending_add(&self) -> &BTreeSet<String> {
        &self.pending_add
    }

    #[must_use]
    pub const fn pending_remove(&self) -> &BTreeSet<String> {
        &self.pending_remove
    }

    fn add_players(&mut self, players: Vec<String>) {
        for player in players {
            if !self.pending_remove.remove(&player) {
                self.pending_add.insert(player);
            }
        }
    }

    /// Removals only need replaying when the team predates the recording;
    /// a created team starts out empty.
    fn remove_players(&mut self, players: Vec<String>) {
        let predates = self.status == TeamStatus::Updated;
        for player in players {
            if !self.pending_add.remove(&player) && predates {
                self.pending_remove.insert(player);
            }
        }
    }

    fn reset(&mut self, status: TeamStatus) {
        *self = Self::new(status);
    }
}

/// Tracks every team touched by the recording, by name.
#[derive(Debug, Clone, Default)]
pub struct TeamTracker {
    teams: BTreeMap<String, TeamState>,
}

impl TeamTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TeamState> {
        self.teams.get(name)
    }

    pub fn on_team(&mut self, data: TeamData) {
        let TeamData { name, action } = data;
        let Some(team) = self.teams.get_mut(&name) else {
            let status = match action {
                TeamAction::Create { .. } => TeamStatus::Created,
                TeamAction::Remove => TeamStatus::Removed,
                _ => TeamStatus::Updated,
            };
            let mut team = TeamState::new(status);
            Self::apply(&mut team, action);
            self.teams.insert(name, team);
            return;
        };

        match (&action, team.status) {
            (TeamAction::Remove, TeamStatus::Created) => {
                self.teams.remove(&name);
                return;
            }
            (TeamAction::Remove, _) => team.reset(TeamStatus::Removed),
            (TeamAction::Create { .. }, TeamStatus::Removed) => team.reset(TeamStatus::Recreated),
            _ => {}
        }
        Self::apply(team, action);
    }

    fn apply(team: &mut TeamState, action: TeamAction) {
        match action {
            TeamAction::Create { info, players } => {
                team.info = Some(info);
                team.add_players(players);
            }
            TeamAction::Update { info } => team.info = Some(info),
            TeamAction::AddPlayers { players } => team.add_players(players),
            TeamAction::RemovePlayers { players } => team.remove_players(players),
            TeamAction::Remove => {}
        }
    }

    /// Emit the minimal team records, all at `time`.
    pub fn synthesize(self, time: i64, out: &mut Vec<TimedRecord>) {
        let emit = |out: &mut Vec<TimedRecord>, name: &str, action: TeamAction| {
            out.push(TimedRecord::new(
                time,
                Record::Team(TeamData {
                    name: name.to_string(),
                    action,
                }),
            ));
        };

        for (name, team) in self.teams {
            let TeamState {
                status,
                info,
                pending_add,
                pending_remove,
            } = team;
            match status {
                TeamStatus::Created | TeamStatus::Recreated => {
                    if status == TeamStatus::Recreated {
                        emit(out, &name, TeamAction::Remove);
                    }
                    let Some(info) = info else {
                        tracing::warn!(team = %name, "created team has no display info");
                        continue;
                    };
                    emit(
                        out,
                        &name,
                        TeamAction::Create {
                            info,
                            players: pending_add.into_iter().collect(),
                        },
                    );
                }
                TeamStatus::Updated => {
                    if let Some(info) = info {
                        emit(out, &name, TeamAction::Update { info });
                    }
                    if !pending_add.is_empty() {
                        emit(
                            out,
                            &name,
                            TeamAction::AddPlayers {
                                players: pending_add.into_iter().collect(),
                            },
                        );
                    }
                    if !pending_remove.is_empty() {
                        emit(
                            out,
                            &name,
                            TeamAction::RemovePlayers {
                                players: pending_remove.into_iter().collect(),
                            },
                        );
                    }
                }
                TeamStatus::Removed => emit(out, &name, TeamAction::Remove),
            }
        }
    }
}
