use serde::{Deserialize, Serialize};
use strum_macros::{Display, IntoStaticStr};

/// Kind of host object an [`Entity`] refers to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize, Deserialize,
)]
pub enum EntityKind {
    Player,
    Vehicle,
    Blip,
    Colshape,
    Object,
}

impl EntityKind {
    /// Script-side handle type for this kind of entity
    pub fn script_type(&self) -> &'static str {
        match self {
            EntityKind::Player => "IPlayer",
            EntityKind::Vehicle => "IVehicle",
            EntityKind::Blip => "IBlip",
            EntityKind::Colshape => "IColShape",
            EntityKind::Object => "IEntity",
        }
    }
}

/// Reference to an object owned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub id: u16,
}

impl Entity {
    pub fn new(kind: EntityKind, id: u16) -> Self {
        Self { kind, id }
    }

    pub fn player(id: u16) -> Self {
        Self::new(EntityKind::Player, id)
    }

    pub fn vehicle(id: u16) -> Self {
        Self::new(EntityKind::Vehicle, id)
    }

    pub fn colshape(id: u16) -> Self {
        Self::new(EntityKind::Colshape, id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}
