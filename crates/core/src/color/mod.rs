use serde::{Deserialize, Serialize};

/// Channel layout of the physical strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFeature {
    Rgb,
    #[default]
    Rgbw,
}

impl ColorFeature {
    pub fn channel_count(self) -> usize {
        match self {
            ColorFeature::Rgb => 3,
            ColorFeature::Rgbw => 4,
        }
    }
}

/// A single pixel color. RGB strips ignore the white channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgbw {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}

impl Rgbw {
    pub const BLACK: Rgbw = Rgbw::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, w: u8) -> Self {
        Self { r, g, b, w }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0)
    }

    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.w]
    }

    pub const fn with_white(self, w: u8) -> Self {
        Self { w, ..self }
    }

    pub fn is_black(&self) -> bool {
        *self == Self::BLACK
    }

    /// Channels in wire order for the given strip layout.
    pub fn channels(&self, feature: ColorFeature) -> Vec<u8> {
        let bytes = self.to_bytes();
        bytes[..feature.channel_count()].to_vec()
    }

    /// Linear blend from `a` to `b`; `t` is clamped to `[0, 1]`.
    pub fn lerp(a: Rgbw, b: Rgbw, t: f32) -> Rgbw {
        fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
            let a = f32::from(a);
            let b = f32::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }

        let t = t.clamp(0.0, 1.0);
        Rgbw {
            r: lerp_u8(a.r, b.r, t),
            g: lerp_u8(a.g, b.g, t),
            b: lerp_u8(a.b, b.b, t),
            w: lerp_u8(a.w, b.w, t),
        }
    }

    /// Brightness scaling towards black.
    pub fn scaled(self, factor: f32) -> Rgbw {
        Rgbw::lerp(Rgbw::BLACK, self, factor)
    }
}
