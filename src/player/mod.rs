//! Playback: the embedded player seam, the view-model that mirrors it, and
//! the bottom sheet the player lives in.

pub mod embed;
pub mod sheet;
pub mod view_model;

pub use embed::{EmbedState, EmbeddedPlayer, PlayerError};
pub use sheet::{BottomSheet, SheetState};
pub use view_model::{PlaybackSnapshot, PlayerViewModel, RepeatMode, TickOutcome};
