//! Search a YouTube video's transcript for a word and jump the player to it.

pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod identity;
pub mod queues;
pub mod routes;
pub mod search;
pub mod session;
pub mod transcript;
pub mod types;
pub mod workers;

pub use uuid;

pub use bridge::{HostBridge, LocalHost, PageAgent, PageState, PlayerProxy, SeekOutcome, UnavailableHost};
pub use config::WordjumpConfig;
pub use error::{Result, WordjumpError};
pub use format::{format_match, format_time};
pub use identity::VideoIdentityResolver;
pub use search::search;
pub use session::{SearchOutcome, SearchReport, SessionAlert, SessionController, SessionPhase};
pub use transcript::{FallbackTranscripts, FixtureTranscripts, RemoteTranscripts, TranscriptSource};
pub use types::{SearchMatch, TranscriptSegment, VideoIdentity};
