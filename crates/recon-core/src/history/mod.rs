//! Offline replay of recorded games through both sides' trackers.

mod record;
mod replay;

pub use record::{Action, GameRecord, HistoryError, NO_SENSE_TOKEN};
pub use replay::{ActionKind, Replay, ReplayFrame, ReplayOptions, WinReason};
