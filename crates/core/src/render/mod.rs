use crate::{NeoZoneError, Result, Rgbw};

/// Hardware side of the strip. Implementations latch pixels with
/// [`StripDriver::write_pixel`] and push them out on [`StripDriver::flush`].
pub trait StripDriver {
    fn pixel_count(&self) -> usize;

    fn write_pixel(&mut self, index: usize, color: Rgbw) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

/// In-memory driver that records what reached the "hardware".
#[derive(Debug, Clone, Default)]
pub struct MemoryStrip {
    latched: Vec<Rgbw>,
    flushed: Vec<Rgbw>,
    flush_count: usize,
}

impl MemoryStrip {
    pub fn new(pixel_count: usize) -> Self {
        Self {
            latched: vec![Rgbw::BLACK; pixel_count],
            flushed: vec![Rgbw::BLACK; pixel_count],
            flush_count: 0,
        }
    }

    /// Last frame pushed out by [`StripDriver::flush`].
    pub fn flushed(&self) -> &[Rgbw] {
        &self.flushed
    }

    pub fn flush_count(&self) -> usize {
        self.flush_count
    }
}

impl StripDriver for MemoryStrip {
    fn pixel_count(&self) -> usize {
        self.latched.len()
    }

    fn write_pixel(&mut self, index: usize, color: Rgbw) -> Result<()> {
        let limit = self.latched.len();
        let slot = self
            .latched
            .get_mut(index)
            .ok_or_else(|| NeoZoneError::range(index, limit))?;
        *slot = color;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushed.copy_from_slice(&self.latched);
        self.flush_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_flush_publishes_pixels() {
        let mut strip = MemoryStrip::new(3);
        strip.write_pixel(1, Rgbw::rgb(1, 2, 3)).unwrap();
        assert!(strip.flushed().iter().all(Rgbw::is_black));

        strip.flush().unwrap();
        assert_eq!(strip.flushed()[1], Rgbw::rgb(1, 2, 3));
        assert_eq!(strip.flush_count(), 1);
    }

    #[test]
    fn rejects_pixels_past_the_end() {
        let mut strip = MemoryStrip::new(3);
        assert!(strip.write_pixel(3, Rgbw::BLACK).is_err());
    }
}
