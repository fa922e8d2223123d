//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the emulation engine and the host
//! platform. They are defined here (in `app`) so that both the engine and
//! the adapter layer can depend on them without creating circular
//! dependencies.

pub mod host;

pub use host::{
    Command, CommandFuture, CommandHandler, CommandRequest, HostPlatform, VersionGate,
};
