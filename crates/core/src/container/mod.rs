use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{wire::ByteReader, AnimationKind, NeoZoneError, Result};

pub const MASK_CUSTOM: u8 = 0x01;
pub const MASK_ANIMATED: u8 = 0x02;
pub const MASK_ANIMATION_MODE: u8 = 0x04;
pub const MASK_MODE_SPECIFIER: u8 = 0x08;
const MASK_KNOWN: u8 = MASK_CUSTOM | MASK_ANIMATED | MASK_ANIMATION_MODE | MASK_MODE_SPECIFIER;

/// Flags carried by the mask byte of a container record. Every bit is
/// independent of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContainerMask {
    pub is_custom: bool,
    pub is_animated: bool,
    pub animation_mode: bool,
    pub mode_specifier: bool,
}

impl ContainerMask {
    pub fn decode(mask: u8) -> Result<Self> {
        if mask & !MASK_KNOWN != 0 {
            return Err(NeoZoneError::decode(format!(
                "unrecognized container mask {mask:#04x}"
            )));
        }
        Ok(Self {
            is_custom: mask & MASK_CUSTOM != 0,
            is_animated: mask & MASK_ANIMATED != 0,
            animation_mode: mask & MASK_ANIMATION_MODE != 0,
            mode_specifier: mask & MASK_MODE_SPECIFIER != 0,
        })
    }

    pub fn encode(&self) -> u8 {
        let mut mask = 0;
        if self.is_custom {
            mask |= MASK_CUSTOM;
        }
        if self.is_animated {
            mask |= MASK_ANIMATED;
        }
        if self.animation_mode {
            mask |= MASK_ANIMATION_MODE;
        }
        if self.mode_specifier {
            mask |= MASK_MODE_SPECIFIER;
        }
        mask
    }
}

/// Secondary physical sub-window of a custom container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomWindow {
    pub led_start: u16,
    pub led_length: u16,
    pub led_offset: u16,
}

impl CustomWindow {
    pub fn first_pixel(&self) -> usize {
        usize::from(self.led_start) + usize::from(self.led_offset)
    }
}

/// One logical zone of the strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub start_index: u16,
    pub index_length: u16,
    pub custom: Option<CustomWindow>,
    pub is_animated: bool,
    pub animation_mode: bool,
    pub mode_specifier: bool,
    /// Animation period in scheduler time units.
    pub time: u16,
}

impl Container {
    /// Plain static zone covering `[start, start + length)`.
    pub fn new(start_index: u16, index_length: u16) -> Self {
        Self {
            start_index,
            index_length,
            custom: None,
            is_animated: false,
            animation_mode: false,
            mode_specifier: false,
            time: 0,
        }
    }

    pub fn with_custom(mut self, led_start: u16, led_length: u16, led_offset: u16) -> Self {
        self.custom = Some(CustomWindow {
            led_start,
            led_length,
            led_offset,
        });
        self
    }

    pub fn with_animation(mut self, kind: AnimationKind, time: u16) -> Self {
        let (mode, specifier) = kind.flags();
        self.is_animated = true;
        self.animation_mode = mode;
        self.mode_specifier = specifier;
        self.time = time;
        self
    }

    pub fn is_custom(&self) -> bool {
        self.custom.is_some()
    }

    pub fn mask(&self) -> ContainerMask {
        ContainerMask {
            is_custom: self.is_custom(),
            is_animated: self.is_animated,
            animation_mode: self.animation_mode,
            mode_specifier: self.mode_specifier,
        }
    }

    pub fn animation(&self) -> Option<AnimationKind> {
        self.is_animated
            .then(|| AnimationKind::from_flags(self.animation_mode, self.mode_specifier))
    }

    /// Logical range in the zone address space.
    pub fn logical_range(&self) -> Range<usize> {
        let start = usize::from(self.start_index);
        start..start + usize::from(self.index_length)
    }

    /// Physical pixels this zone may paint.
    pub fn footprint(&self) -> Range<usize> {
        match &self.custom {
            Some(window) => {
                let start = window.first_pixel();
                start..start + usize::from(window.led_length)
            }
            None => self.logical_range(),
        }
    }

    /// Consumes one record from `reader`. Nothing is returned for malformed or
    /// truncated input, so a failed record can never reach a registry.
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let start_index = reader.u16("container start")?;
        let index_length = reader.u16("container length")?;
        let mask = ContainerMask::decode(reader.u8("container mask")?)?;

        let custom = if mask.is_custom {
            Some(CustomWindow {
                led_start: reader.u16("custom led start")?,
                led_length: reader.u16("custom led length")?,
                led_offset: reader.u16("custom led offset")?,
            })
        } else {
            None
        };
        let time = if mask.is_animated {
            reader.u16("animation time")?
        } else {
            0
        };

        Ok(Self {
            start_index,
            index_length,
            custom,
            is_animated: mask.is_animated,
            animation_mode: mask.animation_mode,
            mode_specifier: mask.mode_specifier,
            time,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(13);
        out.extend_from_slice(&self.start_index.to_be_bytes());
        out.extend_from_slice(&self.index_length.to_be_bytes());
        out.push(self.mask().encode());
        if let Some(window) = &self.custom {
            out.extend_from_slice(&window.led_start.to_be_bytes());
            out.extend_from_slice(&window.led_length.to_be_bytes());
            out.extend_from_slice(&window.led_offset.to_be_bytes());
        }
        if self.is_animated {
            out.extend_from_slice(&self.time.to_be_bytes());
        }
        out
    }

    /// Checks the zone is usable on a strip of `pixel_count` pixels.
    pub fn validate(&self, pixel_count: usize) -> Result<()> {
        if self.index_length == 0 {
            return Err(NeoZoneError::decode("container length must be non-zero"));
        }
        let logical = self.logical_range();
        if logical.end > pixel_count {
            return Err(NeoZoneError::range(logical.end - 1, pixel_count));
        }
        if let Some(window) = &self.custom {
            if window.led_length == 0 {
                return Err(NeoZoneError::decode("custom window length must be non-zero"));
            }
            let footprint = self.footprint();
            if footprint.end > pixel_count {
                return Err(NeoZoneError::range(footprint.end - 1, pixel_count));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_record() {
        let bytes = Container::new(10, 5).encode();
        assert_eq!(bytes, vec![0x00, 0x0A, 0x00, 0x05, 0x00]);

        let mut reader = ByteReader::new(&bytes);
        let container = Container::decode(&mut reader).unwrap();
        assert_eq!(container.start_index, 10);
        assert_eq!(container.index_length, 5);
        assert!(!container.is_custom());
        assert!(reader.is_empty());
    }

    #[test]
    fn decodes_custom_animated_record() {
        let bytes = [
            0x00, 0x00, 0x00, 0x04, 0x0F, // start 0, length 4, all flags
            0x00, 0x14, 0x00, 0x04, 0x00, 0x02, // led start 20, length 4, offset 2
            0x00, 0x0A, // time
        ];
        let container = Container::decode(&mut ByteReader::new(&bytes)).unwrap();
        assert_eq!(
            container.custom,
            Some(CustomWindow {
                led_start: 20,
                led_length: 4,
                led_offset: 2
            })
        );
        assert_eq!(container.footprint(), 22..26);
        assert_eq!(container.time, 10);
        assert_eq!(container.animation(), Some(AnimationKind::Comet));
    }

    #[test]
    fn mask_bits_are_independent() {
        let mask = ContainerMask::decode(MASK_MODE_SPECIFIER).unwrap();
        assert!(mask.mode_specifier);
        assert!(!mask.is_animated && !mask.is_custom && !mask.animation_mode);
        assert_eq!(mask.encode(), MASK_MODE_SPECIFIER);
    }

    #[test]
    fn rejects_unknown_mask_bits() {
        let err = Container::decode(&mut ByteReader::new(&[0, 0, 0, 1, 0x10])).unwrap_err();
        assert!(matches!(err, NeoZoneError::Decode(_)));
    }

    #[test]
    fn rejects_truncated_custom_window() {
        let bytes = [0x00, 0x00, 0x00, 0x04, MASK_CUSTOM, 0x00, 0x01];
        assert!(Container::decode(&mut ByteReader::new(&bytes)).is_err());
    }

    #[test]
    fn validates_against_strip_length() {
        assert!(Container::new(0, 10).validate(10).is_ok());
        assert!(Container::new(5, 6).validate(10).is_err());
        assert!(Container::new(0, 0).validate(10).is_err());
        assert!(Container::new(0, 2).with_custom(8, 2, 1).validate(10).is_err());
        assert!(Container::new(0, 2).with_custom(7, 2, 1).validate(10).is_ok());
    }
}
