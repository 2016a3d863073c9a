use std::{collections::VecDeque, sync::mpsc};

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::engine::session::SourceId;

/// Control messages applied by the audio thread between blocks.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SessionCommand {
    Play(SourceId),
    Pause(SourceId),
    TogglePause(SourceId),
    ToggleMute(SourceId),
    ToggleSolo(SourceId),
    /// Seek to the start and play.
    Restart(SourceId),
    /// Absolute position in seconds.
    Seek { source: SourceId, seconds: f64 },
    /// Relative seek; negative moves backwards.
    SeekBy { source: SourceId, seconds: f64 },
    SetVolume { source: SourceId, volume: f32 },
    SetMasterGain(f32),
    Suspend,
    Resume,
}

pub trait CommandReceiver {
    fn pop(&mut self) -> Option<SessionCommand>;
}

#[cfg(feature = "rtrb")]
impl CommandReceiver for Consumer<SessionCommand> {
    fn pop(&mut self) -> Option<SessionCommand> {
        Consumer::pop(self).ok()
    }
}

impl CommandReceiver for mpsc::Receiver<SessionCommand> {
    fn pop(&mut self) -> Option<SessionCommand> {
        self.try_recv().ok()
    }
}

impl CommandReceiver for VecDeque<SessionCommand> {
    fn pop(&mut self) -> Option<SessionCommand> {
        self.pop_front()
    }
}
