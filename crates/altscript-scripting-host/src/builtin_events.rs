use altscript_events::{EntityKind, EventType, HostEvent};

use crate::arrays::ArrayTypes;
use crate::marshal::{Arg, ArrayKind, ObjectRef, ParamDecl, ParamType, Primitive, ReturnType};
use crate::registry::{EventDescriptor, EventRegistry};

const PLAYER: ParamType = ParamType::Entity(EntityKind::Player);
const VEHICLE: ParamType = ParamType::Entity(EntityKind::Vehicle);
const COLSHAPE: ParamType = ParamType::Entity(EntityKind::Colshape);
const ENTITY: ParamType = ParamType::Entity(EntityKind::Object);

fn entity(value: &altscript_events::Entity) -> Arg {
    ObjectRef::Entity(*value).into()
}

fn string(value: &str) -> Arg {
    ObjectRef::String(value.to_string()).into()
}

fn player_connect(event: &HostEvent, _: &ArrayTypes) -> Vec<Arg> {
    let HostEvent::PlayerConnect { player } = event else {
        return Vec::new();
    };
    vec![entity(player)]
}

fn player_disconnect(event: &HostEvent, _: &ArrayTypes) -> Vec<Arg> {
    let HostEvent::PlayerDisconnect { player, reason } = event else {
        return Vec::new();
    };
    vec![entity(player), string(reason)]
}

fn player_damage(event: &HostEvent, _: &ArrayTypes) -> Vec<Arg> {
    let HostEvent::PlayerDamage {
        victim,
        attacker,
        health_damage,
        armour_damage,
        weapon,
    } = event
    else {
        return Vec::new();
    };
    vec![
        entity(victim),
        ObjectRef::entity_or_null(*attacker).into(),
        Primitive::UInt16(*health_damage).into(),
        Primitive::UInt16(*armour_damage).into(),
        Primitive::UInt32(*weapon).into(),
    ]
}

fn player_death(event: &HostEvent, _: &ArrayTypes) -> Vec<Arg> {
    let HostEvent::PlayerDeath {
        victim,
        killer,
        weapon,
    } = event
    else {
        return Vec::new();
    };
    vec![
        entity(victim),
        ObjectRef::entity_or_null(*killer).into(),
        Primitive::UInt32(*weapon).into(),
    ]
}

fn player_vehicle(event: &HostEvent, _: &ArrayTypes) -> Vec<Arg> {
    match event {
        HostEvent::PlayerEnterVehicle {
            player,
            vehicle,
            seat,
        }
        | HostEvent::PlayerLeaveVehicle {
            player,
            vehicle,
            seat,
        } => vec![entity(player), entity(vehicle), Primitive::UInt8(*seat).into()],
        _ => Vec::new(),
    }
}

fn player_change_vehicle_seat(event: &HostEvent, _: &ArrayTypes) -> Vec<Arg> {
    let HostEvent::PlayerChangeVehicleSeat {
        player,
        vehicle,
        old_seat,
        new_seat,
    } = event
    else {
        return Vec::new();
    };
    vec![
        entity(player),
        entity(vehicle),
        Primitive::UInt8(*old_seat).into(),
        Primitive::UInt8(*new_seat).into(),
    ]
}

fn console_command(event: &HostEvent, arrays: &ArrayTypes) -> Vec<Arg> {
    let HostEvent::ConsoleCommand { name, args } = event else {
        return Vec::new();
    };
    vec![string(name), arrays.create_strings(args).into()]
}

fn colshape_event(event: &HostEvent, _: &ArrayTypes) -> Vec<Arg> {
    let HostEvent::ColshapeEvent {
        colshape,
        entity: target,
        entered,
    } = event
    else {
        return Vec::new();
    };
    vec![entity(colshape), entity(target), Primitive::Bool(*entered).into()]
}

fn weapon_damage(event: &HostEvent, _: &ArrayTypes) -> Vec<Arg> {
    let HostEvent::WeaponDamage {
        source,
        target,
        weapon,
        damage,
        offset,
        body_part,
    } = event
    else {
        return Vec::new();
    };
    vec![
        entity(source),
        entity(target),
        Primitive::UInt32(*weapon).into(),
        Primitive::UInt16(*damage).into(),
        ObjectRef::Vector3(*offset).into(),
        Primitive::Int8(*body_part).into(),
    ]
}

fn explosion(event: &HostEvent, _: &ArrayTypes) -> Vec<Arg> {
    let HostEvent::Explosion {
        source,
        explosion_type,
        position,
        fx,
        target,
    } = event
    else {
        return Vec::new();
    };
    vec![
        entity(source),
        Primitive::Int8(*explosion_type).into(),
        ObjectRef::Vector3(*position).into(),
        Primitive::UInt32(*fx).into(),
        ObjectRef::entity_or_null(*target).into(),
    ]
}

fn remove_entity(event: &HostEvent, _: &ArrayTypes) -> Vec<Arg> {
    let HostEvent::RemoveEntity { entity: removed } = event else {
        return Vec::new();
    };
    vec![entity(removed)]
}

fn resource_event(event: &HostEvent, _: &ArrayTypes) -> Vec<Arg> {
    match event {
        HostEvent::ResourceStart { resource } | HostEvent::ResourceStop { resource } => {
            vec![string(resource)]
        }
        _ => Vec::new(),
    }
}

/// Descriptors for every host event category with a script subscription
pub fn builtin_descriptors() -> Vec<EventDescriptor> {
    use ParamType::*;

    let seat_change = [
        ParamDecl::new(PLAYER, "player"),
        ParamDecl::new(VEHICLE, "vehicle"),
        ParamDecl::new(UInt8, "seat"),
    ];

    vec![
        EventDescriptor::new(
            EventType::PlayerConnect,
            &[ParamDecl::new(PLAYER, "player")],
            player_connect,
        ),
        EventDescriptor::new(
            EventType::PlayerDisconnect,
            &[
                ParamDecl::new(PLAYER, "player"),
                ParamDecl::new(String, "reason"),
            ],
            player_disconnect,
        ),
        EventDescriptor::new(
            EventType::PlayerDamage,
            &[
                ParamDecl::new(PLAYER, "victim"),
                ParamDecl::new(ENTITY, "attacker"),
                ParamDecl::new(UInt16, "healthDamage"),
                ParamDecl::new(UInt16, "armourDamage"),
                ParamDecl::new(UInt32, "weapon"),
            ],
            player_damage,
        ),
        EventDescriptor::new(
            EventType::PlayerDeath,
            &[
                ParamDecl::new(PLAYER, "victim"),
                ParamDecl::new(ENTITY, "killer"),
                ParamDecl::new(UInt32, "weapon"),
            ],
            player_death,
        ),
        EventDescriptor::new(EventType::PlayerEnterVehicle, &seat_change, player_vehicle),
        EventDescriptor::new(EventType::PlayerLeaveVehicle, &seat_change, player_vehicle),
        EventDescriptor::new(
            EventType::PlayerChangeVehicleSeat,
            &[
                ParamDecl::new(PLAYER, "player"),
                ParamDecl::new(VEHICLE, "vehicle"),
                ParamDecl::new(UInt8, "oldSeat"),
                ParamDecl::new(UInt8, "newSeat"),
            ],
            player_change_vehicle_seat,
        ),
        EventDescriptor::new(
            EventType::ConsoleCommand,
            &[
                ParamDecl::new(String, "name"),
                ParamDecl::new(Array(ArrayKind::String), "args"),
            ],
            console_command,
        ),
        EventDescriptor::new(
            EventType::ColshapeEvent,
            &[
                ParamDecl::new(COLSHAPE, "colshape"),
                ParamDecl::new(ENTITY, "entity"),
                ParamDecl::new(Bool, "state"),
            ],
            colshape_event,
        ),
        EventDescriptor::new(
            EventType::WeaponDamage,
            &[
                ParamDecl::new(PLAYER, "source"),
                ParamDecl::new(ENTITY, "target"),
                ParamDecl::new(UInt32, "weapon"),
                ParamDecl::new(UInt16, "damage"),
                ParamDecl::new(Vector3, "offset"),
                ParamDecl::new(Int8, "bodyPart"),
            ],
            weapon_damage,
        )
        .returning(ReturnType::Bool),
        EventDescriptor::new(
            EventType::Explosion,
            &[
                ParamDecl::new(PLAYER, "source"),
                ParamDecl::new(Int8, "type"),
                ParamDecl::new(Vector3, "position"),
                ParamDecl::new(UInt32, "explosionFX"),
                ParamDecl::new(ENTITY, "target"),
            ],
            explosion,
        )
        .returning(ReturnType::Bool),
        EventDescriptor::new(
            EventType::RemoveEntity,
            &[ParamDecl::new(ENTITY, "entity")],
            remove_entity,
        ),
        EventDescriptor::new(
            EventType::ResourceStart,
            &[ParamDecl::new(String, "resource")],
            resource_event,
        ),
        EventDescriptor::new(
            EventType::ResourceStop,
            &[ParamDecl::new(String, "resource")],
            resource_event,
        ),
    ]
}

/// Build the registry of builtin categories
///
/// # Panics
///
/// If two builtin descriptors share a category.
pub fn build_registry() -> EventRegistry {
    let mut registry = EventRegistry::new();
    for descriptor in builtin_descriptors() {
        if let Err(e) = registry.register(descriptor) {
            panic!("invalid builtin event table: {e}");
        }
    }
    registry
}
