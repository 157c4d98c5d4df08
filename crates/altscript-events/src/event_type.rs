use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// Categories of events the host application can emit
///
/// The discriminants are stable and shared with the host; new categories may
/// be added on the host side before the scripting layer knows about them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
pub enum EventType {
    // Player events (1-99)
    PlayerConnect = 1,
    PlayerDisconnect = 2,
    PlayerDamage = 3,
    PlayerDeath = 4,
    PlayerEnterVehicle = 5,
    PlayerLeaveVehicle = 6,
    PlayerChangeVehicleSeat = 7,

    // World events (100-199)
    ConsoleCommand = 100,
    ColshapeEvent = 101,
    WeaponDamage = 102,
    Explosion = 103,
    RemoveEntity = 104,

    // Resource events (200-299)
    ResourceStart = 200,
    ResourceStop = 201,

    // Script events (300-399)
    LocalScriptEvent = 300,
    RemoteScriptEvent = 301,

    // Host lifecycle (900+)
    Tick = 900,
}

impl EventType {
    /// Name used to derive script-side declarations (e.g. `onPlayerConnect`)
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Get the discriminant value for this event type
    pub fn to_discriminant(&self) -> u16 {
        *self as u16
    }

    /// Convert a u16 discriminant to an EventType
    pub fn from_discriminant(id: u16) -> Option<Self> {
        use strum::IntoEnumIterator;

        Self::iter().find(|event_type| event_type.to_discriminant() == id)
    }
}
