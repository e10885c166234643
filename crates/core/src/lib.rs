//! Core library for NeoZones.
//!
//! An addressable LED strip is split into logical zones (containers). Each
//! zone is either a solid color or a looping animation; overlapping zones are
//! resolved at render time, newest on top. A compact binary protocol, optionally
//! wrapped in base64, lets a host define zones and drive the strip through
//! [`NeoPixels`].

pub mod animation;
pub mod codec;
pub mod color;
pub mod config;
pub mod container;
pub mod controller;
pub mod error;
pub mod protocol;
pub mod render;
pub mod timeline;
pub mod wire;
pub mod zones;

pub use animation::AnimationKind;
pub use codec::Base64Codec;
pub use color::{ColorFeature, Rgbw};
pub use config::StripConfig;
pub use container::{Container, ContainerMask, CustomWindow};
pub use controller::NeoPixels;
pub use error::{NeoZoneError, Result};
pub use protocol::{Cmd, CmdHeader, CmdResult, Command, Experimental, StatusReport};
pub use render::{MemoryStrip, StripDriver};
pub use timeline::{AnimationScheduler, Animator, Clock, ManualClock, MonotonicClock};
pub use zones::{in_range, led_in_range, ZoneRegistry};
