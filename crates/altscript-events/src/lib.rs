//! Host event model for altscript
//!
//! This crate provides the event categories and payloads the host application
//! emits, so the scripting layer and the host can share them without depending
//! on each other.

mod entity;
mod event_type;
mod host_event;
mod value;

pub use entity::{Entity, EntityKind, Vector3};
pub use event_type::EventType;
pub use host_event::HostEvent;
pub use value::Value;
