//! Record model for recorded sessions.
//!
//! A recorded session is an ordered list of [`TimedRecord`]s: a millisecond
//! timestamp plus one decoded protocol [`Record`]. The payload discriminant
//! is the [`RecordKind`], which lives outside the JSON payload in the record
//! log (it is an external tag, like the event type in a TSJSON line).
//!
//! Kinds that the consumer never declared for decoding stay
//! [`Record::Opaque`]: the raw JSON payload is carried through untouched.

pub mod data;
pub mod kind;

pub use data::*;
pub use kind::{Domain, RecordKind, UnknownRecordKind};

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

/// Error returned when a JSON payload does not match its kind's schema.
#[derive(Debug, thiserror::Error)]
#[error("invalid {kind} payload: {source}")]
pub struct RecordParseError {
    /// The kind that was being decoded.
    pub kind: RecordKind,
    /// The underlying JSON error.
    #[source]
    pub source: serde_json::Error,
}

/// A record of a kind that was not declared for decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpaqueRecord {
    pub kind: RecordKind,
    pub data: serde_json::Value,
}

impl OpaqueRecord {
    /// Decode the carried payload into its typed form.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordParseError`] if the payload does not match the
    /// kind's schema.
    pub fn decode(&self) -> Result<Record, RecordParseError> {
        Record::from_value(self.kind, self.data.clone())
    }
}

/// Entities a record is associated with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    /// The record concerns no entity.
    None,
    /// The record concerns exactly one entity.
    Single(i32),
    /// The record names several entities (collect, destroy, attach).
    Multiple(Vec<i32>),
}

// One table drives the enum, the kind lookup, typed decoding and
// serialization. Variant names match `RecordKind` variant names.
macro_rules! records {
    ($($variant:ident($data:ty)),+ $(,)?) => {
        /// A decoded protocol record. The variant always agrees with
        /// [`Record::kind`].
        ///
        /// **Serde note:** `Record` serializes as its bare payload and has no
        /// `Deserialize` impl; decode with [`Record::deserialize_for`] given
        /// the externally known kind.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Record {
            $($variant($data),)+
            /// A payload kept as raw JSON.
            Opaque(OpaqueRecord),
        }

        impl Record {
            /// The kind of this record, opaque or not.
            #[must_use]
            pub const fn kind(&self) -> RecordKind {
                match self {
                    $(Self::$variant(_) => RecordKind::$variant,)+
                    Self::Opaque(opaque) => opaque.kind,
                }
            }

            /// Decode a JSON payload into the typed variant for `kind`.
            ///
            /// # Errors
            ///
            /// Returns a [`RecordParseError`] if the JSON is malformed or does
            /// not match the schema for `kind`.
            pub fn deserialize_for(kind: RecordKind, json: &str) -> Result<Self, RecordParseError> {
                let result = match kind {
                    $(RecordKind::$variant => serde_json::from_str::<$data>(json).map(Self::$variant),)+
                };
                result.map_err(|source| RecordParseError { kind, source })
            }

            /// Like [`Record::deserialize_for`], from an already parsed value.
            ///
            /// # Errors
            ///
            /// Returns a [`RecordParseError`] if the value does not match the
            /// schema for `kind`.
            pub fn from_value(kind: RecordKind, value: serde_json::Value) -> Result<Self, RecordParseError> {
                let result = match kind {
                    $(RecordKind::$variant => serde_json::from_value::<$data>(value).map(Self::$variant),)+
                };
                result.map_err(|source| RecordParseError { kind, source })
            }

            /// Serialize the payload to a [`serde_json::Value`].
            ///
            /// # Errors
            ///
            /// Returns an error if the payload fails to serialize.
            pub fn to_json_value(&self) -> Result<serde_json::Value, serde_json::Error> {
                match self {
                    $(Self::$variant(d) => serde_json::to_value(d),)+
                    Self::Opaque(opaque) => Ok(opaque.data.clone()),
                }
            }
        }

        impl Serialize for Record {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self {
                    $(Self::$variant(d) => d.serialize(serializer),)+
                    Self::Opaque(opaque) => opaque.data.serialize(serializer),
                }
            }
        }
    };
}

records! {
    SpawnPlayer(SpawnPlayerData),
    SpawnObject(SpawnObjectData),
    SpawnMob(SpawnMobData),
    SpawnPainting(SpawnPaintingData),
    SpawnExpOrb(SpawnExpOrbData),
    SpawnGlobalEntity(SpawnGlobalEntityData),
    Animation(AnimationData),
    CollectItem(CollectItemData),
    DestroyEntities(DestroyEntitiesData),
    EntityAttach(EntityAttachData),
    EntityEffect(EntityEffectData),
    EntityRemoveEffect(EntityRemoveEffectData),
    EntityEquipment(EntityEquipmentData),
    EntityHeadLook(EntityHeadLookData),
    EntityMetadata(EntityMetadataData),
    EntityMovement(EntityMovementData),
    EntityTeleport(EntityTeleportData),
    EntityVelocity(EntityVelocityData),
    EntityProperties(EntityPropertiesData),
    EntityStatus(EntityStatusData),
    UseBed(UseBedData),
    BlockBreakAnim(BlockBreakAnimData),
    ChunkData(ChunkColumn),
    MultiChunkData(MultiChunkData),
    BlockChange(BlockChangeRecord),
    MultiBlockChange(MultiBlockChangeData),
    PlayerPositionRotation(PlayerPositionRotationData),
    BlockValue(BlockValueData),
    Explosion(ExplosionData),
    OpenTileEntityEditor(OpenTileEntityEditorData),
    PlayEffect(PlayEffectData),
    PlaySound(PlaySoundData),
    SpawnParticle(SpawnParticleData),
    SpawnPosition(SpawnPositionData),
    UpdateSign(UpdateSignData),
    UpdateTileEntity(UpdateTileEntityData),
    UpdateTime(UpdateTimeData),
    OpenWindow(OpenWindowData),
    CloseWindow(CloseWindowData),
    WindowProperty(WindowPropertyData),
    WindowItems(WindowItemsData),
    SetSlot(SetSlotData),
    ConfirmTransaction(ConfirmTransactionData),
    Team(TeamData),
    JoinGame(JoinGameData),
    Respawn(RespawnData),
    NotifyClient(NotifyClientData),
    SetExperience(SetExperienceData),
    PlayerAbilities(PlayerAbilitiesData),
    MapData(MapDataData),
    Chat(ChatData),
    PluginMessage(PluginMessageData),
}

impl Record {
    /// True for records kept as raw JSON.
    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }

    /// Which entities this record is associated with.
    ///
    /// Opaque records report [`EntityRef::None`]; their payload is not
    /// inspected.
    #[must_use]
    pub fn entity_ref(&self) -> EntityRef {
        let id = match self {
            Self::CollectItem(d) => {
                return EntityRef::Multiple(vec![d.collected_entity_id, d.collector_entity_id]);
            }
            Self::DestroyEntities(d) => return EntityRef::Multiple(d.entity_ids.clone()),
            Self::EntityAttach(d) => {
                return EntityRef::Multiple(vec![d.entity_id, d.attached_to_id]);
            }
            Self::SpawnPlayer(d) => d.entity_id,
            Self::SpawnObject(d) => d.entity_id,
            Self::SpawnMob(d) => d.entity_id,
            Self::SpawnPainting(d) => d.entity_id,
            Self::SpawnExpOrb(d) => d.entity_id,
            Self::SpawnGlobalEntity(d) => d.entity_id,
            Self::Animation(d) => d.entity_id,
            Self::EntityEffect(d) => d.entity_id,
            Self::EntityRemoveEffect(d) => d.entity_id,
            Self::EntityEquipment(d) => d.entity_id,
            Self::EntityHeadLook(d) => d.entity_id,
            Self::EntityMetadata(d) => d.entity_id,
            Self::EntityMovement(d) => d.entity_id,
            Self::EntityTeleport(d) => d.entity_id,
            Self::EntityVelocity(d) => d.entity_id,
            Self::EntityProperties(d) => d.entity_id,
            Self::EntityStatus(d) => d.entity_id,
            Self::UseBed(d) => d.entity_id,
            Self::BlockBreakAnim(d) => d.breaker_entity_id,
            _ => return EntityRef::None,
        };
        EntityRef::Single(id)
    }
}

/// A record at its position in the session timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedRecord {
    /// Milliseconds since the start of the recording.
    pub time: i64,
    pub record: Record,
}

impl TimedRecord {
    #[must_use]
    pub const fn new(time: i64, record: Record) -> Self {
        Self { time, record }
    }

    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        self.record.kind()
    }
}

impl Serialize for TimedRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TimedRecord", 3)?;
        state.serialize_field("time", &self.time)?;
        state.serialize_field("kind", &self.record.kind())?;
        state.serialize_field("data", &self.record)?;
        state.end()
    }
}
