use std::fmt;

use bevy::log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::Host;

/// Host-side name of an animation clip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ClipId(String);

impl ClipId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClipId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Clips used by the locomotion states. Any slot may be left empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationSet {
    pub idle: Option<ClipId>,
    pub walk: Option<ClipId>,
    pub run: Option<ClipId>,
    pub jump_start: Option<ClipId>,
    pub jump_fall: Option<ClipId>,
    pub landing: Option<ClipId>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnimationError {
    #[error("no animation clip configured")]
    MissingClip,
    #[error("no animation player bound")]
    NoPlayer,
}

/// Tracks which clip the controller last started.
#[derive(Debug, Default)]
pub struct AnimationDriver {
    current: Option<ClipId>,
}

impl AnimationDriver {
    pub fn current(&self) -> Option<&ClipId> {
        self.current.as_ref()
    }

    /// Plays `clip` looping at normal rate.
    pub fn play(&mut self, host: &mut Host<'_>, clip: Option<&ClipId>) -> Result<(), AnimationError> {
        self.play_with_speed(host, clip, 1.0)
    }

    /// Stops the current clip, if any, then plays `clip` looping at `rate`.
    pub fn play_with_speed(
        &mut self,
        host: &mut Host<'_>,
        clip: Option<&ClipId>,
        rate: f32,
    ) -> Result<(), AnimationError> {
        let clip = clip.ok_or(AnimationError::MissingClip)?;
        let player = host.animator.as_deref_mut().ok_or(AnimationError::NoPlayer)?;

        if self.current.is_some() {
            player.stop();
        }
        player.play(clip, true, rate);
        self.current = Some(clip.clone());
        Ok(())
    }

    /// Plays a state clip. Animation is cosmetic, so failures are only logged.
    pub fn play_state_clip(&mut self, host: &mut Host<'_>, clip: Option<&ClipId>) {
        if let Err(err) = self.play(host, clip) {
            debug!("skipping state animation: {err}");
        }
    }

    /// Stops playback and forgets the current clip.
    pub fn stop(&mut self, host: &mut Host<'_>) {
        if let Some(player) = host.animator.as_deref_mut() {
            player.stop();
            self.current = None;
        }
    }
}
