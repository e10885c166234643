use base64::{
    alphabet::Alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

use crate::{NeoZoneError, Result};

const ALPHABET_HEAD: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Base64 text transport whose last two alphabet characters are configurable.
#[derive(Debug, Clone)]
pub struct Base64Codec {
    engine: GeneralPurpose,
}

impl Base64Codec {
    /// `last_chars` is `"+/"` for the standard alphabet or `"-_"` for URL-safe.
    pub fn new(last_chars: &str) -> Result<Self> {
        let symbols = format!("{ALPHABET_HEAD}{last_chars}");
        let alphabet = Alphabet::new(&symbols).map_err(|err| {
            NeoZoneError::msg(format!("invalid base64 alphabet suffix `{last_chars}`: {err}"))
        })?;
        let config = GeneralPurposeConfig::new()
            .with_encode_padding(true)
            .with_decode_padding_mode(DecodePaddingMode::Indifferent);

        Ok(Self {
            engine: GeneralPurpose::new(&alphabet, config),
        })
    }

    pub fn encode(&self, bytes: &[u8]) -> String {
        self.engine.encode(bytes)
    }

    pub fn decode(&self, text: &str) -> Result<Vec<u8>> {
        Ok(self.engine.decode(text.trim())?)
    }
}
