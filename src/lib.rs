//! Station interlocking core for a simplified railway yard.
//! Contains:
//!
//!  * topology (track segments, point machines, signals, level crossings),
//!  * the point machine operate/complete protocol with its occupancy
//!    interlock,
//!  * signal aspect validation and the committing aspect setter,
//!  * station file load/save,
//!  * a built-in demo layout and a scripted occupancy driver.
//!
//! Rendering, coordinate conversion and route setting live elsewhere;
//! this crate only models the state machines and the safety rules that
//! guard them.

pub mod model;
pub mod topology;
pub mod interlocking;
pub mod signal;
pub mod file;
pub mod demo;
pub mod train;

pub use model::*;
pub use topology::Station;
pub use interlocking::{InterlockingError, EntityKind, Operated};
