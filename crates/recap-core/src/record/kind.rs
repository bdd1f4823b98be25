//! Record kind catalog and the kind → domain lookup.
//!
//! Each kind has a stable dotted name (`<domain>.<verb>`) used in the
//! record log. The squash engine routes on [`RecordKind::domain`] once per
//! record instead of probing payload types one by one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every record kind the record log knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    SpawnPlayer,
    SpawnObject,
    SpawnMob,
    SpawnPainting,
    SpawnExpOrb,
    SpawnGlobalEntity,
    Animation,
    CollectItem,
    DestroyEntities,
    EntityAttach,
    EntityEffect,
    EntityRemoveEffect,
    EntityEquipment,
    EntityHeadLook,
    EntityMetadata,
    EntityMovement,
    EntityTeleport,
    EntityVelocity,
    EntityProperties,
    EntityStatus,
    UseBed,
    BlockBreakAnim,
    ChunkData,
    MultiChunkData,
    BlockChange,
    MultiBlockChange,
    PlayerPositionRotation,
    BlockValue,
    Explosion,
    OpenTileEntityEditor,
    PlayEffect,
    PlaySound,
    SpawnParticle,
    SpawnPosition,
    UpdateSign,
    UpdateTileEntity,
    UpdateTime,
    OpenWindow,
    CloseWindow,
    WindowProperty,
    WindowItems,
    SetSlot,
    ConfirmTransaction,
    Team,
    JoinGame,
    Respawn,
    NotifyClient,
    SetExperience,
    PlayerAbilities,
    MapData,
    Chat,
    PluginMessage,
}

/// The tracker family a record kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Entity lifecycle and movement.
    Entity,
    /// Chunk columns and block changes.
    Chunk,
    /// Miscellaneous per-world events, replayed verbatim until respawn.
    World,
    /// Inventory windows.
    Window,
    /// Scoreboard teams.
    Team,
    /// Session-wide state: join, respawn, game mode, experience, maps.
    Session,
    /// Anything the engine has no rule for.
    Other,
}

/// Error returned when parsing an unknown record kind string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRecordKind {
    /// The unrecognised input string.
    pub raw: String,
}

impl fmt::Display for UnknownRecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown record kind '{}': expected a dotted name such as entity.teleport or world.chunk_data",
            self.raw
        )
    }
}

impl std::error::Error for UnknownRecordKind {}

impl RecordKind {
    /// All known kinds in catalog order.
    pub const ALL: [Self; 52] = [
        Self::SpawnPlayer,
        Self::SpawnObject,
        Self::SpawnMob,
        Self::SpawnPainting,
        Self::SpawnExpOrb,
        Self::SpawnGlobalEntity,
        Self::Animation,
        Self::CollectItem,
        Self::DestroyEntities,
        Self::EntityAttach,
        Self::EntityEffect,
        Self::EntityRemoveEffect,
        Self::EntityEquipment,
        Self::EntityHeadLook,
        Self::EntityMetadata,
        Self::EntityMovement,
        Self::EntityTeleport,
        Self::EntityVelocity,
        Self::EntityProperties,
        Self::EntityStatus,
        Self::UseBed,
        Self::BlockBreakAnim,
        Self::ChunkData,
        Self::MultiChunkData,
        Self::BlockChange,
        Self::MultiBlockChange,
        Self::PlayerPositionRotation,
        Self::BlockValue,
        Self::Explosion,
        Self::OpenTileEntityEditor,
        Self::PlayEffect,
        Self::PlaySound,
        Self::SpawnParticle,
        Self::SpawnPosition,
        Self::UpdateSign,
        Self::UpdateTileEntity,
        Self::UpdateTime,
        Self::OpenWindow,
        Self::CloseWindow,
        Self::WindowProperty,
        Self::WindowItems,
        Self::SetSlot,
        Self::ConfirmTransaction,
        Self::Team,
        Self::JoinGame,
        Self::Respawn,
        Self::NotifyClient,
        Self::SetExperience,
        Self::PlayerAbilities,
        Self::MapData,
        Self::Chat,
        Self::PluginMessage,
    ];

    /// Return the dotted name used in the record log.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SpawnPlayer => "entity.spawn_player",
            Self::SpawnObject => "entity.spawn_object",
            Self::SpawnMob => "entity.spawn_mob",
            Self::SpawnPainting => "entity.spawn_painting",
            Self::SpawnExpOrb => "entity.spawn_exp_orb",
            Self::SpawnGlobalEntity => "entity.spawn_global",
            Self::Animation => "entity.animation",
            Self::CollectItem => "entity.collect_item",
            Self::DestroyEntities => "entity.destroy",
            Self::EntityAttach => "entity.attach",
            Self::EntityEffect => "entity.effect",
            Self::EntityRemoveEffect => "entity.remove_effect",
            Self::EntityEquipment => "entity.equipment",
            Self::EntityHeadLook => "entity.head_look",
            Self::EntityMetadata => "entity.metadata",
            Self::EntityMovement => "entity.movement",
            Self::EntityTeleport => "entity.teleport",
            Self::EntityVelocity => "entity.velocity",
            Self::EntityProperties => "entity.properties",
            Self::EntityStatus => "entity.status",
            Self::UseBed => "entity.use_bed",
            Self::BlockBreakAnim => "world.block_break_anim",
            Self::ChunkData => "world.chunk_data",
            Self::MultiChunkData => "world.multi_chunk_data",
            Self::BlockChange => "world.block_change",
            Self::MultiBlockChange => "world.multi_block_change",
            Self::PlayerPositionRotation => "player.position_rotation",
            Self::BlockValue => "world.block_value",
            Self::Explosion => "world.explosion",
            Self::OpenTileEntityEditor => "world.tile_entity_editor",
            Self::PlayEffect => "world.play_effect",
            Self::PlaySound => "world.play_sound",
            Self::SpawnParticle => "world.particle",
            Self::SpawnPosition => "world.spawn_position",
            Self::UpdateSign => "world.update_sign",
            Self::UpdateTileEntity => "world.tile_entity",
            Self::UpdateTime => "world.time",
            Self::OpenWindow => "window.open",
            Self::CloseWindow => "window.close",
            Self::WindowProperty => "window.property",
            Self::WindowItems => "window.items",
            Self::SetSlot => "window.set_slot",
            Self::ConfirmTransaction => "window.confirm_transaction",
            Self::Team => "scoreboard.team",
            Self::JoinGame => "session.join",
            Self::Respawn => "session.respawn",
            Self::NotifyClient => "session.notify",
            Self::SetExperience => "player.experience",
            Self::PlayerAbilities => "player.abilities",
            Self::MapData => "world.map_data",
            Self::Chat => "chat.message",
            Self::PluginMessage => "plugin.message",
        }
    }

    /// Which tracker family handles this kind.
    ///
    /// `BlockBreakAnim` is grouped with entities: it names the breaking
    /// entity and lives and dies with it.
    #[must_use]
    pub const fn domain(self) -> Domain {
        match self {
            Self::SpawnPlayer
            | Self::SpawnObject
            | Self::SpawnMob
            | Self::SpawnPainting
            | Self::SpawnExpOrb
            | Self::SpawnGlobalEntity
            | Self::Animation
            | Self::CollectItem
            | Self::DestroyEntities
            | Self::EntityAttach
            | Self::EntityEffect
            | Self::EntityRemoveEffect
            | Self::EntityEquipment
            | Self::EntityHeadLook
            | Self::EntityMetadata
            | Self::EntityMovement
            | Self::EntityTeleport
            | Self::EntityVelocity
            | Self::EntityProperties
            | Self::EntityStatus
            | Self::UseBed
            | Self::BlockBreakAnim => Domain::Entity,
            Self::ChunkData | Self::MultiChunkData | Self::BlockChange | Self::MultiBlockChange => {
                Domain::Chunk
            }
            Self::PlayerPositionRotation
            | Self::BlockValue
            | Self::Explosion
            | Self::OpenTileEntityEditor
            | Self::PlayEffect
            | Self::PlaySound
            | Self::SpawnParticle
            | Self::SpawnPosition
            | Self::UpdateSign
            | Self::UpdateTileEntity
            | Self::UpdateTime => Domain::World,
            Self::OpenWindow
            | Self::CloseWindow
            | Self::WindowProperty
            | Self::WindowItems
            | Self::SetSlot
            | Self::ConfirmTransaction => Domain::Window,
            Self::Team => Domain::Team,
            Self::JoinGame
            | Self::Respawn
            | Self::NotifyClient
            | Self::SetExperience
            | Self::PlayerAbilities
            | Self::MapData => Domain::Session,
            Self::Chat | Self::PluginMessage => Domain::Other,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Entity => "entity",
            Self::Chunk => "chunk",
            Self::World => "world",
            Self::Window => "window",
            Self::Team => "team",
            Self::Session => "session",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = UnknownRecordKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownRecordKind { raw: s.to_string() })
    }
}

// Custom serde: serialize as the dotted name.
impl Serialize for RecordKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
