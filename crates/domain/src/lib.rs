//! # evesim-domain
//!
//! Pure domain model for the evesim accessory emulator.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **device kinds** (Eve Motion, Eve Door) and their fixed identity
//! - Define **clusters** and typed attribute values written to the host
//! - Define **readings** and **device state** produced each tick
//! - Define **history entries** retained by the history store
//! - Define the **lifecycle** state machine of a platform instance
//! - Host the **telemetry generator** and the illuminance encoding
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod cluster;
pub mod device;
pub mod history;
pub mod illuminance;
pub mod lifecycle;
pub mod reading;
pub mod telemetry;
pub mod version;
