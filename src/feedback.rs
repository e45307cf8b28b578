//! Feedback cues for haptics and sound.
//!
//! The engine only announces events. Whatever sits behind a
//! [`FeedbackSink`] decides what to buzz or play, and must not block.

use noughts_core::Mark;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Something the player should feel or hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackEvent {
    /// A mark was placed and play continues.
    MoveMade,
    /// A mark completed a line.
    Win(Mark),
    /// The board filled without a winner.
    Draw,
    /// A move was refused.
    InvalidMove,
}

/// An event together with the sound preference in force when it fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cue {
    /// What happened.
    pub event: FeedbackEvent,
    /// Whether audio cues are wanted.
    pub sound_enabled: bool,
}

/// Receives feedback cues.
pub trait FeedbackSink: Send + Sync + Debug {
    /// Handles one cue. Must return promptly.
    fn notify(&self, cue: Cue);
}

/// Drops every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeedback;

impl FeedbackSink for NoFeedback {
    fn notify(&self, _cue: Cue) {}
}

/// Writes cues to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn notify(&self, cue: Cue) {
        info!(event = ?cue.event, sound = cue.sound_enabled, "Feedback");
    }
}

/// Forwards cues over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelFeedback {
    tx: mpsc::UnboundedSender<Cue>,
}

impl ChannelFeedback {
    /// Creates a sink and the receiver that drains it.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Cue>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl FeedbackSink for ChannelFeedback {
    fn notify(&self, cue: Cue) {
        if self.tx.send(cue).is_err() {
            debug!(event = ?cue.event, "Feedback receiver gone, cue dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_delivers_in_order() {
        let (sink, mut rx) = ChannelFeedback::channel();
        sink.notify(Cue {
            event: FeedbackEvent::MoveMade,
            sound_enabled: true,
        });
        sink.notify(Cue {
            event: FeedbackEvent::Win(Mark::O),
            sound_enabled: false,
        });
        assert_eq!(rx.try_recv().map(|cue| cue.event), Ok(FeedbackEvent::MoveMade));
        assert_eq!(
            rx.try_recv().map(|cue| cue.event),
            Ok(FeedbackEvent::Win(Mark::O))
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_channel_does_not_panic() {
        let (sink, rx) = ChannelFeedback::channel();
        drop(rx);
        sink.notify(Cue {
            event: FeedbackEvent::Draw,
            sound_enabled: true,
        });
    }
}
