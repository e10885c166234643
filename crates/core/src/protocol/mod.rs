//! Binary command protocol spoken between a host and the strip controller.
//!
//! A message is `[opcode][payload...]`, optionally preceded by one framing
//! header byte. Multi-byte fields are big-endian. Decoding is purely
//! syntactic; range checks against the strip happen in the controller before
//! anything is applied.

use serde::{Deserialize, Serialize};

use crate::{wire::ByteReader, Container, NeoZoneError, Result, Rgbw};

/// Command opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cmd {
    Active = 0xC0,
    Off = 0xC1,
    On = 0xC2,
    Rgbw = 0xC3,
    Status = 0xC4,
    RgbwRange = 0xC5,
    White = 0xC6,
    Experimental = 0xCF,
}

impl TryFrom<u8> for Cmd {
    type Error = NeoZoneError;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            0xC0 => Cmd::Active,
            0xC1 => Cmd::Off,
            0xC2 => Cmd::On,
            0xC3 => Cmd::Rgbw,
            0xC4 => Cmd::Status,
            0xC5 => Cmd::RgbwRange,
            0xC6 => Cmd::White,
            0xCF => Cmd::Experimental,
            other => {
                return Err(NeoZoneError::decode(format!("unknown opcode {other:#04x}")));
            }
        })
    }
}

/// Optional framing byte in front of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CmdHeader {
    MessageStart = 0xF0,
    LedDataCompressed = 0xDC,
    LedData = 0xDD,
}

impl CmdHeader {
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0xF0 => Some(CmdHeader::MessageStart),
            0xDC => Some(CmdHeader::LedDataCompressed),
            0xDD => Some(CmdHeader::LedData),
            _ => None,
        }
    }
}

/// Sub-opcodes of [`Cmd::Experimental`].
pub const EXPERIMENTAL_CLEAR_CONTAINERS: u8 = 0x00;
pub const EXPERIMENTAL_CLEAR_TO: u8 = 0x01;
pub const EXPERIMENTAL_SET_COLORS: u8 = 0x02;

#[derive(Debug, Clone, PartialEq)]
pub enum Experimental {
    ClearContainers,
    ClearTo(Rgbw),
    /// Whole color list, one entry per registered container.
    SetColors(Vec<Rgbw>),
}

/// A fully decoded host message.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Active,
    Off,
    On,
    Status,
    Rgbw { index: u16, color: Rgbw },
    White { index: u16, white: u8 },
    RgbwRange { container: Container, color: Rgbw },
    Experimental(Experimental),
    /// Raw colors for consecutive pixels starting at `start`.
    LedData { start: u16, colors: Vec<Rgbw> },
    /// Zones with solid colors, added as one batch.
    LedDataCompressed(Vec<(Container, Rgbw)>),
}

impl Command {
    pub fn decode(msg: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(msg);
        let first = reader.u8("opcode")?;

        let command = match CmdHeader::from_byte(first) {
            Some(CmdHeader::MessageStart) => {
                let opcode = Cmd::try_from(reader.u8("opcode")?)?;
                Self::decode_payload(opcode, &mut reader)?
            }
            Some(CmdHeader::LedData) => Self::decode_led_data(&mut reader)?,
            Some(CmdHeader::LedDataCompressed) => Self::decode_compressed(&mut reader)?,
            None => Self::decode_payload(Cmd::try_from(first)?, &mut reader)?,
        };

        reader.finish("message")?;
        Ok(command)
    }

    fn decode_payload(opcode: Cmd, reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(match opcode {
            Cmd::Active => Command::Active,
            Cmd::Off => Command::Off,
            Cmd::On => Command::On,
            Cmd::Status => Command::Status,
            Cmd::Rgbw => Command::Rgbw {
                index: reader.u16("pixel index")?,
                color: Rgbw::from_bytes(reader.array4("color")?),
            },
            Cmd::White => Command::White {
                index: reader.u16("pixel index")?,
                white: reader.u8("white level")?,
            },
            Cmd::RgbwRange => Command::RgbwRange {
                container: Container::decode(reader)?,
                color: Rgbw::from_bytes(reader.array4("zone color")?),
            },
            Cmd::Experimental => Command::Experimental(Self::decode_experimental(reader)?),
        })
    }

    fn decode_experimental(reader: &mut ByteReader<'_>) -> Result<Experimental> {
        Ok(match reader.u8("experimental sub-opcode")? {
            EXPERIMENTAL_CLEAR_CONTAINERS => Experimental::ClearContainers,
            EXPERIMENTAL_CLEAR_TO => {
                Experimental::ClearTo(Rgbw::from_bytes(reader.array4("clear color")?))
            }
            EXPERIMENTAL_SET_COLORS => Experimental::SetColors(Self::decode_colors(reader)?),
            other => {
                return Err(NeoZoneError::decode(format!(
                    "unknown experimental sub-opcode {other:#04x}"
                )));
            }
        })
    }

    fn decode_led_data(reader: &mut ByteReader<'_>) -> Result<Self> {
        let start = reader.u16("led data start")?;
        let colors = Self::decode_colors(reader)?;
        if colors.is_empty() {
            return Err(NeoZoneError::decode("led data frame carries no pixels"));
        }
        Ok(Command::LedData { start, colors })
    }

    fn decode_compressed(reader: &mut ByteReader<'_>) -> Result<Self> {
        let mut zones = Vec::new();
        while !reader.is_empty() {
            let container = Container::decode(reader)?;
            let color = Rgbw::from_bytes(reader.array4("zone color")?);
            zones.push((container, color));
        }
        if zones.is_empty() {
            return Err(NeoZoneError::decode("compressed frame carries no zones"));
        }
        Ok(Command::LedDataCompressed(zones))
    }

    fn decode_colors(reader: &mut ByteReader<'_>) -> Result<Vec<Rgbw>> {
        if reader.remaining() % 4 != 0 {
            return Err(NeoZoneError::decode(format!(
                "color list of {} bytes is not a whole number of pixels",
                reader.remaining()
            )));
        }
        let mut colors = Vec::with_capacity(reader.remaining() / 4);
        while !reader.is_empty() {
            colors.push(Rgbw::from_bytes(reader.array4("color")?));
        }
        Ok(colors)
    }

    /// Wire form of the command, as a host would send it.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Command::Active => out.push(Cmd::Active as u8),
            Command::Off => out.push(Cmd::Off as u8),
            Command::On => out.push(Cmd::On as u8),
            Command::Status => out.push(Cmd::Status as u8),
            Command::Rgbw { index, color } => {
                out.push(Cmd::Rgbw as u8);
                out.extend_from_slice(&index.to_be_bytes());
                out.extend_from_slice(&color.to_bytes());
            }
            Command::White { index, white } => {
                out.push(Cmd::White as u8);
                out.extend_from_slice(&index.to_be_bytes());
                out.push(*white);
            }
            Command::RgbwRange { container, color } => {
                out.push(Cmd::RgbwRange as u8);
                out.extend(container.encode());
                out.extend_from_slice(&color.to_bytes());
            }
            Command::Experimental(experimental) => {
                out.push(Cmd::Experimental as u8);
                match experimental {
                    Experimental::ClearContainers => out.push(EXPERIMENTAL_CLEAR_CONTAINERS),
                    Experimental::ClearTo(color) => {
                        out.push(EXPERIMENTAL_CLEAR_TO);
                        out.extend_from_slice(&color.to_bytes());
                    }
                    Experimental::SetColors(colors) => {
                        out.push(EXPERIMENTAL_SET_COLORS);
                        colors
                            .iter()
                            .for_each(|color| out.extend_from_slice(&color.to_bytes()));
                    }
                }
            }
            Command::LedData { start, colors } => {
                out.push(CmdHeader::LedData as u8);
                out.extend_from_slice(&start.to_be_bytes());
                colors
                    .iter()
                    .for_each(|color| out.extend_from_slice(&color.to_bytes()));
            }
            Command::LedDataCompressed(zones) => {
                out.push(CmdHeader::LedDataCompressed as u8);
                for (container, color) in zones {
                    out.extend(container.encode());
                    out.extend_from_slice(&color.to_bytes());
                }
            }
        }
        out
    }
}

/// Snapshot returned for [`Cmd::Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub is_on: bool,
    pub pixel_count: u16,
    pub containers: u16,
    pub animated: u16,
    pub active_animations: u16,
}

impl StatusReport {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![u8::from(self.is_on)];
        out.extend_from_slice(&self.pixel_count.to_be_bytes());
        out.extend_from_slice(&self.containers.to_be_bytes());
        out.extend_from_slice(&self.animated.to_be_bytes());
        out.extend_from_slice(&self.active_animations.to_be_bytes());
        out
    }
}

/// Reply to a host message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmdResult {
    Ok,
    Status(StatusReport),
    Error,
}

impl CmdResult {
    pub const OK_CODE: u8 = 0xA0;
    pub const STATUS_CODE: u8 = 0xA1;
    pub const ERROR_CODE: u8 = 0xAF;

    pub fn code(&self) -> u8 {
        match self {
            CmdResult::Ok => Self::OK_CODE,
            CmdResult::Status(_) => Self::STATUS_CODE,
            CmdResult::Error => Self::ERROR_CODE,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CmdResult::Error)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.code()];
        if let CmdResult::Status(report) = self {
            out.extend(report.encode());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_bare_and_framed_opcodes() {
        assert_eq!(Command::decode(&[0xC0]).unwrap(), Command::Active);
        assert_eq!(Command::decode(&[0xF0, 0xC2]).unwrap(), Command::On);
        assert_eq!(
            Command::decode(&[0xC3, 0x00, 0x07, 1, 2, 3, 4]).unwrap(),
            Command::Rgbw {
                index: 7,
                color: Rgbw::new(1, 2, 3, 4)
            }
        );
    }

    #[test]
    fn rejects_short_and_overlong_messages() {
        assert!(Command::decode(&[]).is_err());
        assert!(Command::decode(&[0xF0]).is_err());
        assert!(Command::decode(&[0xC3, 0x00, 0x07, 1, 2]).is_err());
        assert!(Command::decode(&[0xC6, 0x00]).is_err());
        assert!(Command::decode(&[0xC0, 0x00]).is_err());
        assert!(Command::decode(&[0xC7]).is_err());
    }

    #[test]
    fn unknown_experimental_sub_opcode_is_an_error() {
        let err = Command::decode(&[0xCF, 0x7E]).unwrap_err();
        assert!(format!("{err}").contains("0x7e"));
        assert!(Command::decode(&[0xCF]).is_err());
    }

    #[test]
    fn decodes_range_with_zone_record() {
        let msg = Command::RgbwRange {
            container: Container::new(10, 5),
            color: Rgbw::rgb(255, 0, 0),
        }
        .encode();
        assert_eq!(msg, vec![0xC5, 0, 10, 0, 5, 0, 255, 0, 0, 0]);

        match Command::decode(&msg).unwrap() {
            Command::RgbwRange { container, color } => {
                assert_eq!(container.start_index, 10);
                assert_eq!(container.index_length, 5);
                assert!(!container.is_custom());
                assert_eq!(color, Rgbw::rgb(255, 0, 0));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn led_data_frames_need_whole_pixels() {
        let frame = [0xDD, 0x00, 0x02, 1, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(
            Command::decode(&frame).unwrap(),
            Command::LedData {
                start: 2,
                colors: vec![Rgbw::new(1, 2, 3, 4), Rgbw::new(5, 6, 7, 8)]
            }
        );
        assert!(Command::decode(&frame[..frame.len() - 1]).is_err());
        assert!(Command::decode(&[0xDD, 0x00, 0x02]).is_err());
    }

    #[test]
    fn compressed_frame_carries_several_zones() {
        let frame = [
            0xDC, 0, 0, 0, 2, 0, 9, 9, 9, 9, // zone 0..2
            0, 4, 0, 2, 0, 8, 8, 8, 8, // zone 4..6
        ];
        match Command::decode(&frame).unwrap() {
            Command::LedDataCompressed(zones) => {
                assert_eq!(zones.len(), 2);
                assert_eq!(zones[1].0.start_index, 4);
                assert_eq!(zones[1].1, Rgbw::new(8, 8, 8, 8));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Command::decode(&frame[..frame.len() - 2]).is_err());
    }

    #[test]
    fn status_reply_layout() {
        let reply = CmdResult::Status(StatusReport {
            is_on: true,
            pixel_count: 300,
            containers: 2,
            animated: 1,
            active_animations: 1,
        });
        assert_eq!(
            reply.to_bytes(),
            vec![0xA1, 1, 0x01, 0x2C, 0, 2, 0, 1, 0, 1]
        );
        assert_eq!(CmdResult::Error.to_bytes(), vec![0xAF]);
    }
}
