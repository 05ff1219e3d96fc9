//! Workspace placeholder crate.
//!
//! This crate exposes feature flags that map to the individual workspace
//! crates (`core-service`, `core-metadata`, `core-playback`). Hosts can depend
//! on `mp3-ingest-workspace` and enable the documented features without wiring
//! each crate individually.

#[cfg(feature = "service")]
pub use core_service as service;

#[cfg(feature = "metadata")]
pub use core_metadata as metadata;

#[cfg(feature = "playback")]
pub use core_playback as playback;
