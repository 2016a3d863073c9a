//! Live playback and the generate pipeline.

pub mod command;
pub mod generate;
pub mod handles;
pub mod playback;
pub mod session;

pub use command::{CommandReceiver, SessionCommand};
pub use generate::{GenerateRequest, Generation, GenerationSource, Generator, Rendered};
pub use handles::{HandleStore, PlaybackHandle};
pub use playback::{start_with_retry, PlaybackDevice, PlaybackGuard, RetryPolicy, Scheduler, ThreadScheduler};
pub use session::{AudioSession, SessionState, SourceId, SourceStatus, DEFAULT_MASTER_GAIN};
