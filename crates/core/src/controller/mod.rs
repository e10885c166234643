use std::time::Duration;

use crate::{
    Animator, AnimationScheduler, Base64Codec, CmdResult, Command, Container, Experimental,
    MonotonicClock, NeoZoneError, Result, Rgbw, StatusReport, StripConfig, StripDriver,
    ZoneRegistry,
};

/// Drives one strip: decodes host messages, keeps the zone registry and
/// pushes rendered frames to the driver.
///
/// While the strip is off, [`NeoPixels::update`] flushes an all-black frame.
/// The internal frame buffer is kept, so switching back on restores it.
#[derive(Debug)]
pub struct NeoPixels<D, S> {
    driver: D,
    scheduler: S,
    codec: Base64Codec,
    registry: ZoneRegistry,
    frame: Vec<Rgbw>,
    max_animations: usize,
    is_on: bool,
}

impl<D: StripDriver> NeoPixels<D, Animator<MonotonicClock>> {
    /// Controller with a wall-clock animator sized from `config`.
    pub fn from_config(driver: D, config: &StripConfig) -> Result<Self> {
        let animator = Animator::new(
            MonotonicClock::start(),
            usize::from(config.max_animations),
            Duration::from_millis(u64::from(config.animation_timescale_ms)),
        );
        Self::new(driver, animator, config)
    }
}

impl<D: StripDriver, S: AnimationScheduler> NeoPixels<D, S> {
    pub fn new(driver: D, scheduler: S, config: &StripConfig) -> Result<Self> {
        config.validate()?;
        let pixel_count = usize::from(config.pixel_count);
        if driver.pixel_count() < pixel_count {
            return Err(NeoZoneError::msg(format!(
                "driver exposes {} pixels, configuration needs {pixel_count}",
                driver.pixel_count()
            )));
        }

        Ok(Self {
            driver,
            scheduler,
            codec: Base64Codec::new(&config.base64_last_chars)?,
            registry: ZoneRegistry::new(),
            frame: vec![Rgbw::BLACK; pixel_count],
            max_animations: usize::from(config.max_animations),
            is_on: false,
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.frame.len()
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    pub fn frame(&self) -> &[Rgbw] {
        &self.frame
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn codec(&self) -> &Base64Codec {
        &self.codec
    }

    pub fn toggle_on(&mut self) {
        self.toggle_to(true);
    }

    pub fn toggle_off(&mut self) {
        self.toggle_to(false);
    }

    pub fn toggle_to(&mut self, on: bool) {
        if self.is_on != on {
            tracing::debug!(on, "strip toggled");
        }
        self.is_on = on;
    }

    pub fn toggle(&mut self) {
        self.toggle_to(!self.is_on);
    }

    pub fn status(&self) -> StatusReport {
        let clamp = |value: usize| u16::try_from(value).unwrap_or(u16::MAX);
        StatusReport {
            is_on: self.is_on,
            pixel_count: clamp(self.frame.len()),
            containers: clamp(self.registry.len()),
            animated: clamp(self.registry.animated_count()),
            active_animations: clamp(self.scheduler.active_count()),
        }
    }

    /// Decodes and applies one binary message. Either the whole message takes
    /// effect or, on [`CmdResult::Error`], nothing does.
    pub fn binary_command(&mut self, msg: &[u8]) -> CmdResult {
        let outcome = Command::decode(msg).and_then(|command| self.apply(command));
        match outcome {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(error = %err, len = msg.len(), "rejected command");
                CmdResult::Error
            }
        }
    }

    /// Base64 front end for [`NeoPixels::binary_command`].
    pub fn b64_command(&mut self, text: &str) -> CmdResult {
        match self.codec.decode(text) {
            Ok(bytes) => self.binary_command(&bytes),
            Err(err) => {
                tracing::warn!(error = %err, "rejected base64 command");
                CmdResult::Error
            }
        }
    }

    pub fn apply(&mut self, command: Command) -> Result<CmdResult> {
        tracing::debug!(?command, "applying command");
        match command {
            Command::Active => {}
            Command::Off => self.toggle_off(),
            Command::On => self.toggle_on(),
            Command::Status => return Ok(CmdResult::Status(self.status())),
            Command::Rgbw { index, color } => {
                let index = self.check_pixel(index)?;
                self.frame[index] = color;
            }
            Command::White { index, white } => {
                let index = self.check_pixel(index)?;
                self.frame[index] = self.frame[index].with_white(white);
            }
            Command::RgbwRange { container, color } => {
                self.commit_zones(vec![(container, color)])?;
            }
            Command::LedDataCompressed(zones) => self.commit_zones(zones)?,
            Command::LedData { start, colors } => {
                let start = usize::from(start);
                let end = start + colors.len();
                if end > self.frame.len() {
                    return Err(NeoZoneError::range(end - 1, self.frame.len()));
                }
                self.frame[start..end].copy_from_slice(&colors);
            }
            Command::Experimental(Experimental::ClearContainers) => {
                self.registry.clear_containers();
                self.scheduler.stop_all();
            }
            Command::Experimental(Experimental::ClearTo(color)) => self.clear_to(color),
            Command::Experimental(Experimental::SetColors(colors)) => {
                self.registry.add_colors(&colors)?;
            }
        }
        Ok(CmdResult::Ok)
    }

    /// Drops every zone and paints the whole strip `color`.
    pub fn clear_to(&mut self, color: Rgbw) {
        self.registry.clear_containers();
        self.scheduler.stop_all();
        self.frame.fill(color);
    }

    /// Renders the next frame and flushes it to the driver.
    pub fn update(&mut self) -> Result<()> {
        if !self.is_on {
            for index in 0..self.frame.len() {
                self.driver.write_pixel(index, Rgbw::BLACK)?;
            }
            return self.driver.flush();
        }

        self.registry.write_static(&mut self.frame);
        if self.registry.is_animate() {
            let registry = &self.registry;
            let frame = &mut self.frame;
            self.scheduler.tick(&mut |slot: usize, progress: f32| {
                if let Err(err) = registry.write_animate(slot, progress, &mut frame[..]) {
                    tracing::warn!(slot, error = %err, "animation slot out of sync");
                }
            });
        }

        for (index, color) in self.frame.iter().enumerate() {
            self.driver.write_pixel(index, *color)?;
        }
        self.driver.flush()
    }

    fn check_pixel(&self, index: u16) -> Result<usize> {
        let index = usize::from(index);
        if index >= self.frame.len() {
            return Err(NeoZoneError::range(index, self.frame.len()));
        }
        Ok(index)
    }

    /// Most animated zones this controller can run: the configured limit or
    /// the scheduler's own capacity, whichever is smaller.
    pub fn animation_limit(&self) -> usize {
        self.max_animations.min(self.scheduler.capacity())
    }

    /// Validates every zone against a scratch copy of the registry and swaps
    /// it in only when the whole batch fits.
    fn commit_zones(&mut self, zones: Vec<(Container, Rgbw)>) -> Result<()> {
        for (container, _) in &zones {
            container.validate(self.frame.len())?;
        }

        let (containers, colors): (Vec<Container>, Vec<Rgbw>) = zones.into_iter().unzip();
        let mut staged = self.registry.clone();
        staged.add_containers(containers, true);
        let mut staged_colors = self.registry.colors().to_vec();
        staged_colors.extend(colors);
        staged.add_colors(&staged_colors)?;

        let limit = self.animation_limit();
        if staged.animated_count() > limit {
            return Err(NeoZoneError::Capacity(limit));
        }

        let previous = std::mem::replace(&mut self.registry, staged);
        if previous.is_animate() || self.registry.is_animate() {
            if let Err(err) = self.restart_animations() {
                self.registry = previous;
                if let Err(restore) = self.restart_animations() {
                    tracing::warn!(error = %restore, "could not restore previous animations");
                }
                return Err(err);
            }
        }
        tracing::debug!(zones = self.registry.len(), "zone registry updated");
        Ok(())
    }

    fn restart_animations(&mut self) -> Result<()> {
        self.scheduler.stop_all();
        let animated: Vec<(usize, u16)> = self
            .registry
            .animated_indices()
            .map(|index| (index, self.registry.containers()[index].time))
            .collect();
        for (slot, time) in animated {
            self.scheduler.start(slot, time)?;
        }
        Ok(())
    }
}
