//! Narrative timeline orchestration.
//!
//! # Architecture
//!
//! - [`timeline`] - the orchestrator: validates a [`TimelineRequest`], walks
//!   its years strictly in order, and emits [`takeoff_types::TimelineEvent`]s
//!   through a `tokio::sync::mpsc` channel
//! - [`prompt`] - narrative prompt construction
//! - [`config`] - the `~/.takeoff/config.toml` layer
//!
//! The orchestrator is generic over [`takeoff_types::TextGenerator`], so it
//! never touches the network directly and tests drive it with scripted
//! fakes.

pub mod config;
pub mod prompt;
pub mod timeline;

pub use config::{ConfigError, TakeoffConfig};
pub use prompt::build_narrative_prompt;
pub use timeline::{
    TIMELINE_EVENT_CHANNEL_CAPACITY, TimelineError, TimelineRequest, stream_timeline,
};
