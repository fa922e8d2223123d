//! # evesim-app
//!
//! Application layer: the emulation engine and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define the **host port** the emulator drives (`HostPlatform`, `VersionGate`)
//! - Own the bounded **history store** of recorded samples
//! - Push readings into the host through the **attribute sync** bridge
//! - Run the repeating **timer** that drives ticks
//! - Orchestrate initialize → start → configure → tick → shutdown in
//!   [`platform::AccessoryPlatform`]
//!
//! ## Dependency rule
//! Depends on `evesim-domain` only (plus `tokio` for the timer and locks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod attribute_sync;
pub mod config;
pub mod history_store;
pub mod platform;
pub mod ports;
pub mod timer;
