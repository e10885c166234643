use std::io::Write;

use neozones_core::{ColorFeature, NeoZoneError, Result, Rgbw, StripDriver};

/// Strip driver that prints every flushed frame to stdout as hex channel groups.
#[derive(Debug)]
pub struct ConsoleStrip {
    feature: ColorFeature,
    pixels: Vec<Rgbw>,
    frames: usize,
}

impl ConsoleStrip {
    pub fn new(pixel_count: usize, feature: ColorFeature) -> Self {
        Self {
            feature,
            pixels: vec![Rgbw::BLACK; pixel_count],
            frames: 0,
        }
    }

    pub fn render_line(&self) -> String {
        self.pixels
            .iter()
            .map(|pixel| {
                pixel
                    .channels(self.feature)
                    .iter()
                    .map(|channel| format!("{channel:02x}"))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl StripDriver for ConsoleStrip {
    fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    fn write_pixel(&mut self, index: usize, color: Rgbw) -> Result<()> {
        let limit = self.pixels.len();
        let slot = self
            .pixels
            .get_mut(index)
            .ok_or_else(|| NeoZoneError::range(index, limit))?;
        *slot = color;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let line = self.render_line();
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "frame {:>4}: {line}", self.frames)?;
        self.frames += 1;
        tracing::trace!(frame = self.frames, "flushed frame");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_channels_per_feature() {
        let mut strip = ConsoleStrip::new(2, ColorFeature::Rgb);
        strip.write_pixel(1, Rgbw::new(0xff, 0x10, 0x00, 0x7f)).unwrap();
        assert_eq!(strip.render_line(), "000000 ff1000");

        let mut strip = ConsoleStrip::new(1, ColorFeature::Rgbw);
        strip.write_pixel(0, Rgbw::new(1, 2, 3, 4)).unwrap();
        assert_eq!(strip.render_line(), "01020304");
    }
}
