//! Replay verification.
//!
//! A [`ReplayView`] replays records linearly, the way a client would, and
//! keeps only the state a viewer can observe at the end: live entities and
//! where they stand, loaded chunks with their blocks, teams, session
//! scalars and the main inventory. Two record streams are equivalent when
//! they replay to equal views.
//!
//! Views follow the same block ordering rule as the squash engine: a block
//! change only replaces the stored change for its position if it is
//! strictly newer.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::coord::{SECTIONS_PER_CHUNK, chunk_key, chunk_of_block, section_of};
use crate::record::{
    BlockPos, ChunkColumn, Difficulty, GameMode, ItemStack, Location, MapDataData,
    Notification, Record, SectionPayload, TeamAction, TeamData, TeamInfo, TimedRecord, WorldType,
};
use crate::squash::entity::to_fixed;

/// Observable state of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityView {
    /// Position in fixed point (1/32 block).
    pub position: [i64; 3],
    /// Yaw and pitch, as raw bits so the view stays `Eq`.
    pub orientation: (u32, u32),
}

impl EntityView {
    fn at(location: &Location) -> Self {
        Self {
            position: [to_fixed(location.x), to_fixed(location.y), to_fixed(location.z)],
            orientation: (location.yaw.to_bits(), location.pitch.to_bits()),
        }
    }
}

/// Observable state of one loaded chunk column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChunkView {
    pub sections: Vec<Option<SectionPayload>>,
    pub biome: Option<Vec<u8>>,
    /// Block overrides by world position, with the time they were written.
    #[serde(skip)]
    pub blocks: BTreeMap<BlockPos, (i64, u32)>,
}

/// Observable state of one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamView {
    pub info: TeamInfo,
    pub players: BTreeSet<String>,
}

/// Session scalars.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub game_mode: Option<GameMode>,
    pub dimension: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub world_type: Option<WorldType>,
}

/// Final observable state after replaying a record stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayView {
    pub entities: BTreeMap<i32, EntityView>,
    pub chunks: BTreeMap<u64, ChunkView>,
    pub teams: BTreeMap<String, TeamView>,
    pub session: SessionView,
    pub inventory: BTreeMap<i16, Option<ItemStack>>,
    pub maps: BTreeMap<i32, MapDataData>,
}

impl ReplayView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay `records` in order from an empty view.
    #[must_use]
    pub fn replay<'a>(records: impl IntoIterator<Item = &'a TimedRecord>) -> Self {
        let mut view = Self::new();
        for record in records {
            view.apply(record);
        }
        view
    }

    /// Apply one record. Opaque records and kinds with no observable
    /// end state are ignored.
    pub fn apply(&mut self, timed: &TimedRecord) {
        let time = timed.time;
        match &timed.record {
            Record::SpawnPlayer(d) => self.spawn(d.entity_id, &d.location),
            Record::SpawnMob(d) => self.spawn(d.entity_id, &d.location),
            Record::SpawnObject(d) => self.spawn(d.entity_id, &d.location),
            Record::SpawnPainting(d) => {
                let p = d.position;
                self.spawn(
                    d.entity_id,
                    &Location::new(f64::from(p.x), f64::from(p.y), f64::from(p.z), 0.0, 0.0),
                );
            }
            Record::SpawnExpOrb(d) => {
                self.spawn(d.entity_id, &Location::new(d.x, d.y, d.z, 0.0, 0.0));
            }
            Record::SpawnGlobalEntity(d) => {
                self.spawn(d.entity_id, &Location::new(d.x, d.y, d.z, 0.0, 0.0));
            }
            Record::DestroyEntities(d) => {
                for id in &d.entity_ids {
                    self.entities.remove(id);
                }
            }
            Record::EntityTeleport(d) => {
                if let Some(entity) = self.entities.get_mut(&d.entity_id) {
                    *entity = EntityView::at(&d.location);
                }
            }
            Record::EntityMovement(d) => {
                if let Some(entity) = self.entities.get_mut(&d.entity_id) {
                    if d.kind.carries_position() {
                        entity.position[0] += to_fixed(d.dx);
                        entity.position[1] += to_fixed(d.dy);
                        entity.position[2] += to_fixed(d.dz);
                    }
                    if d.kind.carries_rotation() {
                        entity.orientation = (d.yaw.to_bits(), d.pitch.to_bits());
                    }
                }
            }
            Record::ChunkData(column) => self.column(column),
            Record::MultiChunkData(d) => {
                for column in &d.columns {
                    self.column(column);
                }
            }
            Record::BlockChange(change) => self.block(time, change.position, change.block),
            Record::MultiBlockChange(d) => {
                for change in &d.records {
                    self.block(time, change.position, change.block);
                }
            }
            Record::Team(d) => self.team(d),
            Record::JoinGame(d) => {
                self.session = SessionView {
                    game_mode: Some(d.game_mode),
                    dimension: Some(d.dimension),
                    difficulty: Some(d.difficulty),
                    world_type: Some(d.world_type),
                };
            }
            Record::Respawn(d) => {
                self.session = SessionView {
                    game_mode: Some(d.game_mode),
                    dimension: Some(d.dimension),
                    difficulty: Some(d.difficulty),
                    world_type: Some(d.world_type),
                };
                self.entities.clear();
                self.chunks.clear();
            }
            Record::NotifyClient(d) => {
                if let Notification::ChangeGameMode { game_mode } = d.notification {
                    self.session.game_mode = Some(game_mode);
                }
            }
            Record::WindowItems(d) if d.window_id == 0 => {
                self.inventory.clear();
                for (slot, item) in d.items.iter().enumerate() {
                    if let Ok(slot) = i16::try_from(slot) {
                        self.inventory.insert(slot, item.clone());
                    }
                }
            }
            Record::SetSlot(d) if d.is_main_inventory() => {
                self.inventory.insert(d.slot, d.item.clone());
            }
            Record::MapData(d) => {
                self.maps.insert(d.map_id, d.clone());
            }
            _ => {}
        }
    }

    fn spawn(&mut self, id: i32, location: &Location) {
        self.entities.insert(id, EntityView::at(location));
    }

    fn column(&mut self, column: &ChunkColumn) {
        let key = chunk_key(column.x, column.z);
        if column.is_unload() {
            self.chunks.remove(&key);
            return;
        }
        let chunk = self.chunks.entry(key).or_insert_with(|| ChunkView {
            sections: vec![None; SECTIONS_PER_CHUNK],
            ..ChunkView::default()
        });
        for (index, section) in column.sections.iter().enumerate() {
            if let Some(payload) = section {
                chunk.sections[index] = Some(payload.clone());
                chunk
                    .blocks
                    .retain(|pos, _| section_of(pos.y) != Some(index));
            }
        }
        if column.biome.is_some() {
            chunk.biome.clone_from(&column.biome);
        }
    }

    fn block(&mut self, time: i64, position: BlockPos, block: u32) {
        let (cx, cz) = chunk_of_block(position.x, position.z);
        if section_of(position.y).is_none() {
            return;
        }
        let Some(chunk) = self.chunks.get_mut(&chunk_key(cx, cz)) else {
            return;
        };
        if chunk
            .blocks
            .get(&position)
            .is_some_and(|(stored, _)| time <= *stored)
        {
            return;
        }
        chunk.blocks.insert(position, (time, block));
    }

    fn team(&mut self, data: &TeamData) {
        match &data.action {
            TeamAction::Create { info, players } => {
                self.teams.insert(
                    data.name.clone(),
                    TeamView {
                        info: info.clone(),
                        players: players.iter().cloned().collect(),
                    },
                );
            }
            TeamAction::Remove => {
                self.teams.remove(&data.name);
            }
            TeamAction::Update { info } => {
                if let Some(team) = self.teams.get_mut(&data.name) {
                    team.info = info.clone();
                }
            }
            TeamAction::AddPlayers { players } => {
                if let Some(team) = self.teams.get_mut(&data.name) {
                    team.players.extend(players.iter().cloned());
                }
            }
            TeamAction::RemovePlayers { players } => {
                if let Some(team) = self.teams.get_mut(&data.name) {
                    for player in players {
                        team.players.remove(player);
                    }
                }
            }
        }
    }

    /// Block overrides with their write times stripped.
    ///
    /// Write times differ legitimately between a stream and its squashed
    /// form only when equal-time writes collapse, so comparisons use this.
    #[must_use]
    pub fn block_values(&self) -> BTreeMap<BlockPos, u32> {
        self.chunks
            .values()
            .flat_map(|chunk| chunk.blocks.iter().map(|(pos, (_, block))| (*pos, *block)))
            .collect()
    }

    /// True when both views hold the same observable state. Block write
    /// times are not compared.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        views_match(self, other)
    }

    /// BLAKE3 digest of the canonical JSON form of this view.
    ///
    /// Block write times are left out, matching [`verify_squash`]. Digests
    /// are stable across runs and platforms.
    #[must_use]
    pub fn digest(&self) -> String {
        #[derive(Serialize)]
        struct Canonical<'a> {
            view: &'a ReplayView,
            blocks: Vec<(BlockPos, u32)>,
        }

        let canonical = Canonical {
            view: self,
            blocks: self.block_values().into_iter().collect(),
        };
        let mut hasher = blake3::Hasher::new();
        if let Err(e) = serde_json::to_writer(&mut hasher, &canonical) {
            tracing::warn!(error = %e, "replay view digest is incomplete");
        }
        format!("blake3:{}", hasher.finalize())
    }
}

/// Return `true` when `squashed` replays to the same view as `original`.
#[must_use]
pub fn verify_squash(original: &[TimedRecord], squashed: &[TimedRecord]) -> bool {
    ReplayView::replay(original).matches(&ReplayView::replay(squashed))
}

/// Compare two views field by field.
fn views_match(a: &ReplayView, b: &ReplayView) -> bool {
    a.entities == b.entities
        && a.chunks.len() == b.chunks.len()
        && a.chunks.iter().zip(&b.chunks).all(|((ka, ca), (kb, cb))| {
            ka == kb && ca.sections == cb.sections && ca.biome == cb.biome
        })
        && a.block_values() == b.block_values()
        && a.teams == b.teams
        && a.session == b.session
        && a.inventory == b.inventory
        && a.maps == b.maps
}
