use serde::{Deserialize, Serialize};

use crate::{Entity, EventType, Value, Vector3};

/// An event emitted by the host, carrying its category-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostEvent {
    PlayerConnect {
        player: Entity,
    },
    PlayerDisconnect {
        player: Entity,
        reason: String,
    },
    PlayerDamage {
        victim: Entity,
        /// Missing when the damage has no attributable source (e.g. falling)
        attacker: Option<Entity>,
        health_damage: u16,
        armour_damage: u16,
        weapon: u32,
    },
    PlayerDeath {
        victim: Entity,
        killer: Option<Entity>,
        weapon: u32,
    },
    PlayerEnterVehicle {
        player: Entity,
        vehicle: Entity,
        seat: u8,
    },
    PlayerLeaveVehicle {
        player: Entity,
        vehicle: Entity,
        seat: u8,
    },
    PlayerChangeVehicleSeat {
        player: Entity,
        vehicle: Entity,
        old_seat: u8,
        new_seat: u8,
    },
    ConsoleCommand {
        name: String,
        args: Vec<String>,
    },
    ColshapeEvent {
        colshape: Entity,
        entity: Entity,
        entered: bool,
    },
    WeaponDamage {
        source: Entity,
        target: Entity,
        weapon: u32,
        damage: u16,
        offset: Vector3,
        body_part: i8,
    },
    Explosion {
        source: Entity,
        explosion_type: i8,
        position: Vector3,
        fx: u32,
        target: Option<Entity>,
    },
    RemoveEntity {
        entity: Entity,
    },
    ResourceStart {
        resource: String,
    },
    ResourceStop {
        resource: String,
    },
    /// Custom event emitted by a script on this side
    LocalScriptEvent {
        name: String,
        args: Vec<Value>,
    },
    /// Custom event sent by a remote player
    RemoteScriptEvent {
        name: String,
        player: Entity,
        args: Vec<Value>,
    },
    Tick,
}

impl HostEvent {
    /// Category of this event
    pub fn event_type(&self) -> EventType {
        match self {
            HostEvent::PlayerConnect { .. } => EventType::PlayerConnect,
            HostEvent::PlayerDisconnect { .. } => EventType::PlayerDisconnect,
            HostEvent::PlayerDamage { .. } => EventType::PlayerDamage,
            HostEvent::PlayerDeath { .. } => EventType::PlayerDeath,
            HostEvent::PlayerEnterVehicle { .. } => EventType::PlayerEnterVehicle,
            HostEvent::PlayerLeaveVehicle { .. } => EventType::PlayerLeaveVehicle,
            HostEvent::PlayerChangeVehicleSeat { .. } => EventType::PlayerChangeVehicleSeat,
            HostEvent::ConsoleCommand { .. } => EventType::ConsoleCommand,
            HostEvent::ColshapeEvent { .. } => EventType::ColshapeEvent,
            HostEvent::WeaponDamage { .. } => EventType::WeaponDamage,
            HostEvent::Explosion { .. } => EventType::Explosion,
            HostEvent::RemoveEntity { .. } => EventType::RemoveEntity,
            HostEvent::ResourceStart { .. } => EventType::ResourceStart,
            HostEvent::ResourceStop { .. } => EventType::ResourceStop,
            HostEvent::LocalScriptEvent { .. } => EventType::LocalScriptEvent,
            HostEvent::RemoteScriptEvent { .. } => EventType::RemoteScriptEvent,
            HostEvent::Tick => EventType::Tick,
        }
    }
}
