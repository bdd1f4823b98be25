//! Typed payload structs for each record kind.
//!
//! Payloads mirror the decoded protocol records one-to-one. Opaque binary
//! blobs the engine never looks into (entity metadata, section payloads,
//! map pixels, NBT) are carried as raw bytes.

use serde::{Deserialize, Serialize};

use crate::coord::SECTIONS_PER_CHUNK;

// ---------------------------------------------------------------------------
// Shared value types
// ---------------------------------------------------------------------------

/// An absolute position with orientation, in blocks and degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
}

impl Location {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, yaw: f32, pitch: f32) -> Self {
        Self {
            x,
            y,
            z,
            yaw,
            pitch,
        }
    }
}

/// An integer block position in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: i32,
    pub amount: u8,
    #[serde(default)]
    pub damage: i16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbt: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Survival,
    Creative,
    Adventure,
    Spectator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Peaceful,
    Easy,
    Normal,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldType {
    Default,
    Flat,
    LargeBiomes,
    Amplified,
    Customized,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendlyFire {
    On,
    Off,
    FriendliesVisible,
}

/// Which components a relative movement record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Position,
    Rotation,
    PositionRotation,
}

impl MovementKind {
    #[must_use]
    pub const fn carries_position(self) -> bool {
        matches!(self, Self::Position | Self::PositionRotation)
    }

    #[must_use]
    pub const fn carries_rotation(self) -> bool {
        matches!(self, Self::Rotation | Self::PositionRotation)
    }
}

// ---------------------------------------------------------------------------
// Entity payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPlayerData {
    pub entity_id: i32,
    pub uuid: String,
    pub location: Location,
    #[serde(default)]
    pub current_item: i32,
    #[serde(default)]
    pub metadata: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnObjectData {
    pub entity_id: i32,
    pub object_type: i32,
    pub location: Location,
    #[serde(default)]
    pub data: i32,
    #[serde(default)]
    pub velocity: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnMobData {
    pub entity_id: i32,
    pub mob_type: i32,
    pub location: Location,
    #[serde(default)]
    pub head_yaw: f32,
    #[serde(default)]
    pub velocity: [f64; 3],
    #[serde(default)]
    pub metadata: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPaintingData {
    pub entity_id: i32,
    pub title: String,
    pub position: BlockPos,
    pub direction: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnExpOrbData {
    pub entity_id: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub exp: i32,
}

/// A lightning bolt or other globally visible entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnGlobalEntityData {
    pub entity_id: i32,
    pub global_type: u8,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationData {
    pub entity_id: i32,
    pub animation: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectItemData {
    pub collected_entity_id: i32,
    pub collector_entity_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyEntitiesData {
    pub entity_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAttachData {
    pub entity_id: i32,
    pub attached_to_id: i32,
    #[serde(default)]
    pub leash: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEffectData {
    pub entity_id: i32,
    pub effect: u8,
    pub amplifier: u8,
    pub duration: i32,
    #[serde(default)]
    pub hide_particles: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRemoveEffectData {
    pub entity_id: i32,
    pub effect: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEquipmentData {
    pub entity_id: i32,
    pub slot: u8,
    pub item: Option<ItemStack>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityHeadLookData {
    pub entity_id: i32,
    pub head_yaw: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadataData {
    pub entity_id: i32,
    pub metadata: Vec<u8>,
}

/// A relative movement and/or look update, in blocks and degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMovementData {
    pub entity_id: i32,
    pub kind: MovementKind,
    #[serde(default)]
    pub dx: f64,
    #[serde(default)]
    pub dy: f64,
    #[serde(default)]
    pub dz: f64,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
    #[serde(default)]
    pub on_ground: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTeleportData {
    pub entity_id: i32,
    pub location: Location,
    #[serde(default)]
    pub on_ground: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityVelocityData {
    pub entity_id: i32,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeModifier {
    pub uuid: String,
    pub amount: f64,
    pub operation: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityAttribute {
    pub key: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<AttributeModifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityPropertiesData {
    pub entity_id: i32,
    pub attributes: Vec<EntityAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStatusData {
    pub entity_id: i32,
    pub status: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseBedData {
    pub entity_id: i32,
    pub position: BlockPos,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockBreakAnimData {
    pub breaker_entity_id: i32,
    pub position: BlockPos,
    pub stage: i8,
}

// ---------------------------------------------------------------------------
// Chunk payloads
// ---------------------------------------------------------------------------

/// Raw payload of one 16-block section.
pub type SectionPayload = Vec<u8>;

/// A chunk column update. A column whose sections are all absent is an
/// unload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkColumn {
    pub x: i32,
    pub z: i32,
    pub sections: [Option<SectionPayload>; SECTIONS_PER_CHUNK],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biome: Option<Vec<u8>>,
}

impl ChunkColumn {
    /// Build the unload form of a column: no sections, no biome.
    #[must_use]
    pub fn unload(x: i32, z: i32) -> Self {
        Self {
            x,
            z,
            sections: Default::default(),
            biome: None,
        }
    }

    /// True when every section is absent.
    #[must_use]
    pub fn is_unload(&self) -> bool {
        self.sections.iter().all(Option::is_none)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiChunkData {
    pub columns: Vec<ChunkColumn>,
}

/// A single block state change at a world position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockChangeRecord {
    pub position: BlockPos,
    pub block: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiBlockChangeData {
    pub records: Vec<BlockChangeRecord>,
}

// ---------------------------------------------------------------------------
// Current-world payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPositionRotationData {
    pub location: Location,
    /// Bit flags marking which components are relative.
    #[serde(default)]
    pub relative: u8,
}

/// A block action such as a note block tone or chest lid movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockValueData {
    pub position: BlockPos,
    pub action_type: u8,
    pub action_param: u8,
    pub block_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplosionData {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub radius: f32,
    #[serde(default)]
    pub exploded: Vec<[i8; 3]>,
    #[serde(default)]
    pub push: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenTileEntityEditorData {
    pub position: BlockPos,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayEffectData {
    pub effect: i32,
    pub position: BlockPos,
    #[serde(default)]
    pub data: i32,
    #[serde(default)]
    pub broadcast: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaySoundData {
    pub sound: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub volume: f32,
    pub pitch: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnParticleData {
    pub particle: i32,
    #[serde(default)]
    pub long_distance: bool,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default)]
    pub offset: [f32; 3],
    #[serde(default)]
    pub speed: f32,
    #[serde(default)]
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPositionData {
    pub position: BlockPos,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSignData {
    pub position: BlockPos,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTileEntityData {
    pub position: BlockPos,
    pub action: u8,
    #[serde(default)]
    pub nbt: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTimeData {
    pub world_age: i64,
    pub time: i64,
}

// ---------------------------------------------------------------------------
// Window payloads
// ---------------------------------------------------------------------------

/// Window id of the player's own inventory.
pub const MAIN_INVENTORY: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenWindowData {
    pub window_id: u8,
    pub window_type: String,
    pub title: String,
    pub slots: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseWindowData {
    pub window_id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPropertyData {
    pub window_id: u8,
    pub property: i16,
    pub value: i16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowItemsData {
    pub window_id: u8,
    pub items: Vec<Option<ItemStack>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSlotData {
    /// `-1` addresses the cursor.
    pub window_id: i8,
    pub slot: i16,
    pub item: Option<ItemStack>,
}

impl SetSlotData {
    #[must_use]
    pub fn is_main_inventory(&self) -> bool {
        i16::from(self.window_id) == i16::from(MAIN_INVENTORY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmTransactionData {
    pub window_id: u8,
    pub action_id: i16,
    pub accepted: bool,
}

// ---------------------------------------------------------------------------
// Team payloads
// ---------------------------------------------------------------------------

/// Display properties of a scoreboard team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub display_name: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    pub friendly_fire: FriendlyFire,
}

/// What a team record does to the named team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TeamAction {
    Create { info: TeamInfo, players: Vec<String> },
    Remove,
    Update { info: TeamInfo },
    AddPlayers { players: Vec<String> },
    RemovePlayers { players: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamData {
    pub name: String,
    #[serde(flatten)]
    pub action: TeamAction,
}

// ---------------------------------------------------------------------------
// Session payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinGameData {
    pub entity_id: i32,
    #[serde(default)]
    pub hardcore: bool,
    pub game_mode: GameMode,
    pub dimension: i32,
    pub difficulty: Difficulty,
    pub max_players: u8,
    pub world_type: WorldType,
    #[serde(default)]
    pub reduced_debug_info: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespawnData {
    pub dimension: i32,
    pub difficulty: Difficulty,
    pub game_mode: GameMode,
    pub world_type: WorldType,
}

/// Client notifications; only game-mode changes carry session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Notification {
    InvalidBed,
    StartRain,
    StopRain,
    ChangeGameMode { game_mode: GameMode },
    EnterCredits,
    DemoMessage { value: f32 },
    ArrowHitPlayer,
    RainStrength { value: f32 },
    ThunderStrength { value: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyClientData {
    #[serde(flatten)]
    pub notification: Notification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetExperienceData {
    pub experience: f32,
    pub level: i32,
    pub total_experience: i32,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAbilitiesData {
    #[serde(default)]
    pub invincible: bool,
    #[serde(default)]
    pub can_fly: bool,
    #[serde(default)]
    pub flying: bool,
    #[serde(default)]
    pub creative: bool,
    pub fly_speed: f32,
    pub walk_speed: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDataData {
    pub map_id: i32,
    #[serde(default)]
    pub scale: u8,
    #[serde(default)]
    pub data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Other payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatData {
    pub message: String,
    #[serde(default)]
    pub position: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMessageData {
    pub channel: String,
    #[serde(default)]
    pub data: Vec<u8>,
}
