pub mod controls;

pub use controls::{PlaybackControls, PlaybackState, MAX_POSITION, MAX_SPEED, MIN_SPEED};
