use crate::{NeoZoneError, Result};

/// Forward-only cursor over a big-endian binary payload.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fails without consuming anything when fewer than `len` bytes remain.
    pub fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(NeoZoneError::decode(format!(
                "truncated {what}: need {len} bytes at offset {}, {} left",
                self.position,
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    pub fn u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    pub fn u16(&mut self, what: &str) -> Result<u16> {
        let bytes = self.take(2, what)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn array4(&mut self, what: &str) -> Result<[u8; 4]> {
        let bytes = self.take(4, what)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Rejects trailing garbage after a fixed-size payload.
    pub fn finish(&self, what: &str) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(NeoZoneError::decode(format!(
                "{} unexpected trailing bytes after {what}",
                self.remaining()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_fields() {
        let mut reader = ByteReader::new(&[0x01, 0x02, 0xAB]);
        assert_eq!(reader.u16("field").unwrap(), 0x0102);
        assert_eq!(reader.u8("field").unwrap(), 0xAB);
        assert!(reader.finish("payload").is_ok());
    }

    #[test]
    fn short_read_does_not_advance() {
        let mut reader = ByteReader::new(&[0x01]);
        assert!(reader.u16("index").is_err());
        assert_eq!(reader.position(), 0);
        assert!(reader.finish("payload").is_err());
    }
}
