//! Session-wide state: game mode, dimension, difficulty, world type, and
//! the captured join/respawn/experience/abilities/map records.

use std::collections::BTreeMap;

use crate::record::{
    Difficulty, GameMode, JoinGameData, MapDataData, Notification, NotifyClientData,
    PlayerAbilitiesData, Record, RespawnData, SetExperienceData, TimedRecord, WorldType,
};

/// Last-writer-wins session scalars and captured records.
#[derive(Debug, Clone, Default)]
pub struct GlobalState {
    game_mode: Option<GameMode>,
    dimension: Option<i32>,
    difficulty: Option<Difficulty>,
    world_type: Option<WorldType>,
    join: Option<(i64, JoinGameData)>,
    respawn: Option<(i64, RespawnData)>,
    experience: Option<SetExperienceData>,
    abilities: Option<PlayerAbilitiesData>,
    maps: BTreeMap<i32, MapDataData>,
}

impl GlobalState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn game_mode(&self) -> Option<GameMode> {
        self.game_mode
    }

    #[must_use]
    pub const fn dimension(&self) -> Option<i32> {
        self.dimension
    }

    #[must_use]
    pub fn map_count(&self) -> usize {
        self.maps.len()
    }

    pub fn on_join(&mut self, time: i64, join: JoinGameData) {
        self.game_mode = Some(join.game_mode);
        self.dimension = Some(join.dimension);
        self.difficulty = Some(join.difficulty);
        self.world_type = Some(join.world_type);
        self.join = Some((time, join));
    }

    pub fn on_respawn(&mut self, time: i64, respawn: RespawnData) {
        self.game_mode = Some(respawn.game_mode);
        self.dimension = Some(respawn.dimension);
        self.difficulty = Some(respawn.difficulty);
        self.world_type = Some(respawn.world_type);
        self.respawn = Some((time, respawn));
    }

    pub const fn on_game_mode(&mut self, game_mode: GameMode) {
        self.game_mode = Some(game_mode);
    }

    pub fn on_experience(&mut self, experience: SetExperienceData) {
        self.experience = Some(experience);
    }

    pub fn on_abilities(&mut self, abilities: PlayerAbilitiesData) {
        self.abilities = Some(abilities);
    }

    pub fn on_map(&mut self, map: MapDataData) {
        self.maps.insert(map.map_id, map);
    }

    /// Emit one session record, then experience and abilities.
    ///
    /// The join record, merged with the latest scalars, takes precedence over
    /// the respawn record, which takes precedence over a bare game-mode
    /// notification. `last_time` stamps the records that have no capture
    /// time of their own.
    pub fn synthesize_session(&mut self, last_time: i64, out: &mut Vec<TimedRecord>) {
        if let Some((time, join)) = self.join.take() {
            let merged = JoinGameData {
                game_mode: self.game_mode.unwrap_or(join.game_mode),
                dimension: self.dimension.unwrap_or(join.dimension),
                difficulty: self.difficulty.unwrap_or(join.difficulty),
                world_type: self.world_type.unwrap_or(join.world_type),
                ..join
            };
            out.push(TimedRecord::new(time, Record::JoinGame(merged)));
        } else if let Some((time, respawn)) = self.respawn.take() {
            let merged = RespawnData {
                dimension: self.dimension.unwrap_or(respawn.dimension),
                difficulty: self.difficulty.unwrap_or(respawn.difficulty),
                game_mode: self.game_mode.unwrap_or(respawn.game_mode),
                world_type: self.world_type.unwrap_or(respawn.world_type),
            };
            out.push(TimedRecord::new(time, Record::Respawn(merged)));
        } else if let Some(game_mode) = self.game_mode {
            out.push(TimedRecord::new(
                last_time,
                Record::NotifyClient(NotifyClientData {
                    notification: Notification::ChangeGameMode { game_mode },
                }),
            ));
        }

        if let Some(experience) = self.experience.take() {
            out.push(TimedRecord::new(last_time, Record::SetExperience(experience)));
        }
        if let Some(abilities) = self.abilities.take() {
            out.push(TimedRecord::new(last_time, Record::PlayerAbilities(abilities)));
        }
    }

    /// Emit the latest record per map id, all at `time`.
    pub fn synthesize_maps(&mut self, time: i64, out: &mut Vec<TimedRecord>) {
        for map in std::mem::take(&mut self.maps).into_values() {
            out.push(TimedRecord::new(time, Record::MapData(map)));
        }
    }
}
