//! Simulation playback state.
//!
//! State only: transport (play/pause/step/jump), a speed percentage,
//! a timeline position, and the finish/restart pair. The replay loop
//! that would consume this state and advance market data lives behind
//! the quote source, outside the terminal core.

use serde::{Deserialize, Serialize};

/// Slider bounds for playback speed.
pub const MIN_SPEED: u32 = 1;
pub const MAX_SPEED: u32 = 100;

/// Timeline position runs from 0 to this.
pub const MAX_POSITION: u32 = 100;

/// Positions skipped by the jump buttons.
const JUMP_STEP: u32 = 10;

/// Transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Paused,
    Playing,
    Finished,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paused => "Paused",
            Self::Playing => "Playing",
            Self::Finished => "Finished",
        }
    }
}

/// State of the simulation-controls panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackControls {
    state: PlaybackState,
    speed: u32,
    position: u32,
}

impl Default for PlaybackControls {
    fn default() -> Self {
        Self {
            state: PlaybackState::Paused,
            speed: 50,
            position: 0,
        }
    }
}

impl PlaybackControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_speed(speed: u32) -> Self {
        let mut controls = Self::new();
        controls.set_speed(speed);
        controls
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Start playback. A finished run stays finished until restart.
    pub fn play(&mut self) {
        if self.state != PlaybackState::Finished {
            self.state = PlaybackState::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Set playback speed, clamped to the slider bounds. Replay delay
    /// scales inversely with this value.
    pub fn set_speed(&mut self, speed: u32) {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    /// Jump the timeline to an absolute position, clamped to the end.
    pub fn seek(&mut self, position: u32) {
        self.position = position.min(MAX_POSITION);
    }

    pub fn step_forward(&mut self) {
        self.seek(self.position.saturating_add(1));
    }

    pub fn step_back(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    pub fn jump_forward(&mut self) {
        self.seek(self.position.saturating_add(JUMP_STEP));
    }

    pub fn jump_back(&mut self) {
        self.position = self.position.saturating_sub(JUMP_STEP);
    }

    /// End the run: transport stops and the timeline pins to the end.
    pub fn finish(&mut self) {
        self.state = PlaybackState::Finished;
        self.position = MAX_POSITION;
    }

    /// Rewind to the start, paused. Speed is left alone.
    pub fn restart(&mut self) {
        self.state = PlaybackState::Paused;
        self.position = 0;
    }
}
