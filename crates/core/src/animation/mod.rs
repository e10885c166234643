use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::Rgbw;

/// Closed set of animation behaviours, selected by the mode and specifier
/// bits of a container mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationKind {
    /// Whole zone swells from black to its color and back.
    Breathe,
    /// Whole zone fades in from black.
    FadeIn,
    /// Zone fills pixel by pixel.
    Wipe,
    /// A bright head with a fading tail runs around the zone.
    Comet,
}

impl AnimationKind {
    pub fn from_flags(animation_mode: bool, mode_specifier: bool) -> Self {
        match (animation_mode, mode_specifier) {
            (false, false) => AnimationKind::Breathe,
            (false, true) => AnimationKind::FadeIn,
            (true, false) => AnimationKind::Wipe,
            (true, true) => AnimationKind::Comet,
        }
    }

    pub fn flags(self) -> (bool, bool) {
        match self {
            AnimationKind::Breathe => (false, false),
            AnimationKind::FadeIn => (false, true),
            AnimationKind::Wipe => (true, false),
            AnimationKind::Comet => (true, true),
        }
    }

    /// Color of the pixel at `position` within a zone of `length` pixels.
    ///
    /// Pure in all its inputs; `progress` is clamped to `[0, 1]`.
    pub fn pixel_color(self, color: Rgbw, position: usize, length: usize, progress: f32) -> Rgbw {
        let progress = progress.clamp(0.0, 1.0);
        let length = length.max(1);
        match self {
            AnimationKind::Breathe => color.scaled((PI * progress).sin()),
            AnimationKind::FadeIn => color.scaled(progress),
            AnimationKind::Wipe => {
                let lit = (progress * length as f32).ceil() as usize;
                if position < lit {
                    color
                } else {
                    Rgbw::BLACK
                }
            }
            AnimationKind::Comet => {
                let head = ((progress * length as f32).floor() as usize).min(length - 1);
                let tail = (length / 4).max(1);
                let behind = (head + length - position % length) % length;
                if behind < tail {
                    color.scaled(1.0 - behind as f32 / tail as f32)
                } else {
                    Rgbw::BLACK
                }
            }
        }
    }
}
