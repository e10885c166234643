use crate::{Container, NeoZoneError, Result, Rgbw};

/// Maps a physical pixel to its offset inside a custom window starting at
/// `start + offset` and spanning `length` pixels.
pub fn led_in_range(start: u16, offset: u16, length: u16, index: usize) -> Option<usize> {
    let first = usize::from(start) + usize::from(offset);
    in_range(index, first, usize::from(length)).then(|| index - first)
}

/// `[start, start + len)` membership.
pub fn in_range(value: usize, start: usize, len: usize) -> bool {
    value >= start && value - start < len
}

/// Ordered set of zones and their colors.
///
/// `containers` and `colors` are parallel: entry `i` of one always belongs to
/// entry `i` of the other. Later entries take precedence over earlier ones.
#[derive(Debug, Default, Clone)]
pub struct ZoneRegistry {
    containers: Vec<Container>,
    colors: Vec<Rgbw>,
    animated_count: usize,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn colors(&self) -> &[Rgbw] {
        &self.colors
    }

    pub fn animated_count(&self) -> usize {
        self.animated_count
    }

    pub fn is_animate(&self) -> bool {
        self.animated_count > 0
    }

    /// Indices of the animated containers, in precedence order.
    pub fn animated_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.containers
            .iter()
            .enumerate()
            .filter(|(_, container)| container.is_animated)
            .map(|(index, _)| index)
    }

    /// Appends `container` with a black color and returns its index.
    ///
    /// Earlier containers are never touched: the render passes scan newest
    /// first, so the new zone owns every pixel it shares with older ones. With
    /// `resolve_overlap` the overlaps are reported; without it the caller
    /// asserts there are none.
    pub fn add_container(&mut self, container: Container, resolve_overlap: bool) -> usize {
        if resolve_overlap {
            let cover = container.footprint();
            let overlapped = self
                .containers
                .iter()
                .map(Container::footprint)
                .filter(|footprint| footprint.start < cover.end && cover.start < footprint.end)
                .count();
            if overlapped > 0 {
                tracing::debug!(overlapped, "new container takes precedence over older zones");
            }
        }

        self.containers.push(container);
        self.colors.push(Rgbw::BLACK);
        self.recount_animated();
        self.containers.len() - 1
    }

    /// Adds every container in order, with the same semantics as
    /// [`ZoneRegistry::add_container`].
    pub fn add_containers(
        &mut self,
        containers: impl IntoIterator<Item = Container>,
        resolve_overlap: bool,
    ) {
        for container in containers {
            self.add_container(container, resolve_overlap);
        }
    }

    pub fn clear_containers(&mut self) {
        self.containers.clear();
        self.colors.clear();
        self.animated_count = 0;
    }

    pub fn add_color(&mut self, index: usize, color: Rgbw) -> Result<()> {
        let slot = self
            .colors
            .get_mut(index)
            .ok_or_else(|| NeoZoneError::range(index, self.containers.len()))?;
        *slot = color;
        Ok(())
    }

    /// Replaces the whole color list; `colors` must match the container count.
    pub fn add_colors(&mut self, colors: &[Rgbw]) -> Result<()> {
        if colors.len() != self.containers.len() {
            return Err(NeoZoneError::msg(format!(
                "expected {} colors, got {}",
                self.containers.len(),
                colors.len()
            )));
        }
        self.colors.copy_from_slice(colors);
        Ok(())
    }

    /// Offset of `index` inside a custom container's window.
    pub fn led_in_container(container: &Container, index: usize) -> Option<usize> {
        container
            .custom
            .as_ref()
            .and_then(|w| led_in_range(w.led_start, w.led_offset, w.led_length, index))
    }

    /// Whether physical pixel `index` belongs to `container`.
    pub fn in_container(index: usize, container: &Container) -> bool {
        match &container.custom {
            Some(_) => Self::led_in_container(container, index).is_some(),
            None => in_range(
                index,
                usize::from(container.start_index),
                usize::from(container.index_length),
            ),
        }
    }

    /// Topmost container covering physical pixel `index`.
    pub fn owner_of(&self, index: usize) -> Option<usize> {
        self.containers
            .iter()
            .rposition(|container| Self::in_container(index, container))
    }

    /// Paints every static zone into `buffer`, newest zone first wins.
    /// Pixels not covered by any static zone are left alone.
    pub fn write_static(&self, buffer: &mut [Rgbw]) {
        for (index, pixel) in buffer.iter_mut().enumerate() {
            let owner = self
                .containers
                .iter()
                .zip(&self.colors)
                .rev()
                .filter(|(container, _)| !container.is_animated)
                .find(|(container, _)| Self::in_container(index, container));
            if let Some((_, color)) = owner {
                *pixel = *color;
            }
        }
    }

    /// Paints animated container `index` at `progress` into the pixels it owns.
    pub fn write_animate(&self, index: usize, progress: f32, buffer: &mut [Rgbw]) -> Result<()> {
        let container = self
            .containers
            .get(index)
            .ok_or_else(|| NeoZoneError::range(index, self.containers.len()))?;
        let Some(kind) = container.animation() else {
            return Err(NeoZoneError::msg(format!("container {index} is not animated")));
        };
        let color = self.colors[index];

        let footprint = container.footprint();
        let length = footprint.len();
        let end = footprint.end.min(buffer.len());
        for pixel in footprint.start..end {
            if self.owner_of(pixel) != Some(index) {
                continue;
            }
            let position = match &container.custom {
                Some(_) => Self::led_in_container(container, pixel),
                None => Some(pixel - footprint.start),
            };
            if let Some(position) = position {
                buffer[pixel] = kind.pixel_color(color, position, length, progress);
            }
        }
        Ok(())
    }

    fn recount_animated(&mut self) {
        self.animated_count = self.animated_indices().count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnimationKind;

    const RED: Rgbw = Rgbw::rgb(255, 0, 0);
    const BLUE: Rgbw = Rgbw::rgb(0, 0, 255);
    const GREY: Rgbw = Rgbw::rgb(9, 9, 9);
    const GREEN: Rgbw = Rgbw::rgb(0, 255, 0);

    fn registry_with(zones: &[(Container, Rgbw)], resolve_overlap: bool) -> ZoneRegistry {
        let mut registry = ZoneRegistry::new();
        for (container, color) in zones {
            let index = registry.add_container(container.clone(), resolve_overlap);
            registry.add_color(index, *color).unwrap();
        }
        registry
    }

    #[test]
    fn led_in_range_maps_window_offsets() {
        assert_eq!(led_in_range(10, 2, 3, 12), Some(0));
        assert_eq!(led_in_range(10, 2, 3, 14), Some(2));
        assert_eq!(led_in_range(10, 2, 3, 15), None);
        assert_eq!(led_in_range(10, 2, 3, 11), None);
    }

    #[test]
    fn disjoint_zones_paint_only_their_pixels() {
        let registry = registry_with(
            &[(Container::new(0, 2), RED), (Container::new(4, 2), BLUE)],
            true,
        );
        let mut buffer = vec![GREY; 7];
        registry.write_static(&mut buffer);
        assert_eq!(buffer, vec![RED, RED, GREY, GREY, BLUE, BLUE, GREY]);
    }

    #[test]
    fn later_zone_wins_the_overlap() {
        for resolve_overlap in [true, false] {
            let registry = registry_with(
                &[(Container::new(0, 10), RED), (Container::new(5, 10), BLUE)],
                resolve_overlap,
            );
            let mut buffer = vec![Rgbw::BLACK; 15];
            registry.write_static(&mut buffer);
            assert!(buffer[..5].iter().all(|p| *p == RED));
            assert!(buffer[5..].iter().all(|p| *p == BLUE));
        }
    }

    #[test]
    fn covered_zones_are_kept_but_hidden() {
        for resolve_overlap in [true, false] {
            let mut registry = registry_with(
                &[
                    (Container::new(2, 3), RED),
                    (Container::new(0, 4), GREY),
                    (Container::new(0, 10), BLUE),
                ],
                resolve_overlap,
            );
            assert_eq!(registry.len(), 3);
            assert_eq!(registry.colors(), &[RED, GREY, BLUE]);
            assert_eq!(registry.containers()[0], Container::new(2, 3));

            let mut buffer = vec![Rgbw::BLACK; 10];
            registry.write_static(&mut buffer);
            assert_eq!(buffer, vec![BLUE; 10]);

            registry.add_colors(&[RED, GREY, GREEN]).unwrap();
            registry.write_static(&mut buffer);
            assert_eq!(buffer, vec![GREEN; 10]);
        }
    }

    #[test]
    fn batch_add_appends_in_order() {
        let mut registry = registry_with(&[(Container::new(0, 6), RED)], true);
        registry.add_containers(
            vec![
                Container::new(4, 4),
                Container::new(1, 2).with_animation(AnimationKind::Wipe, 3),
            ],
            true,
        );
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.colors(), &[RED, Rgbw::BLACK, Rgbw::BLACK]);
        assert_eq!(registry.animated_count(), 1);
        assert_eq!(registry.animated_indices().collect::<Vec<_>>(), vec![2]);
        assert_eq!(registry.owner_of(1), Some(2));
        assert_eq!(registry.owner_of(5), Some(1));
        assert_eq!(registry.owner_of(0), Some(0));
        assert_eq!(registry.owner_of(8), None);
    }

    #[test]
    fn cleared_registry_leaves_buffer_untouched() {
        let mut registry = registry_with(&[(Container::new(0, 4), RED)], true);
        registry.clear_containers();
        assert!(registry.colors().is_empty());
        assert!(!registry.is_animate());

        let mut buffer = vec![GREY; 4];
        registry.write_static(&mut buffer);
        assert_eq!(buffer, vec![GREY; 4]);
    }

    #[test]
    fn custom_zone_paints_its_window() {
        let registry = registry_with(&[(Container::new(0, 2).with_custom(4, 2, 1), RED)], true);
        let mut buffer = vec![Rgbw::BLACK; 8];
        registry.write_static(&mut buffer);
        assert_eq!(registry.owner_of(5), Some(0));
        assert_eq!(registry.owner_of(0), None);
        assert_eq!(&buffer[5..7], &[RED, RED]);
        assert!(buffer[..5].iter().chain(&buffer[7..]).all(Rgbw::is_black));
    }

    #[test]
    fn static_pass_skips_animated_zones() {
        let registry = registry_with(
            &[
                (Container::new(0, 4), RED),
                (Container::new(2, 4).with_animation(AnimationKind::FadeIn, 5), BLUE),
            ],
            true,
        );
        assert!(registry.is_animate());
        assert_eq!(registry.animated_count(), 1);

        let mut buffer = vec![GREY; 6];
        registry.write_static(&mut buffer);
        assert_eq!(buffer, vec![RED, RED, RED, RED, GREY, GREY]);

        registry.write_animate(1, 1.0, &mut buffer).unwrap();
        assert_eq!(buffer, vec![RED, RED, BLUE, BLUE, BLUE, BLUE]);
    }

    #[test]
    fn animation_yields_to_newer_static_zone() {
        let registry = registry_with(
            &[
                (Container::new(0, 4).with_animation(AnimationKind::FadeIn, 5), BLUE),
                (Container::new(2, 2), RED),
            ],
            true,
        );
        let mut buffer = vec![Rgbw::BLACK; 4];
        registry.write_static(&mut buffer);
        registry.write_animate(0, 1.0, &mut buffer).unwrap();
        assert_eq!(buffer, vec![BLUE, BLUE, RED, RED]);

        let snapshot = buffer.clone();
        registry.write_animate(0, 1.0, &mut buffer).unwrap();
        assert_eq!(buffer, snapshot);
    }

    #[test]
    fn write_animate_rejects_static_or_missing_zone() {
        let registry = registry_with(&[(Container::new(0, 4), RED)], true);
        let mut buffer = vec![Rgbw::BLACK; 4];
        assert!(registry.write_animate(0, 0.5, &mut buffer).is_err());
        assert!(registry.write_animate(3, 0.5, &mut buffer).is_err());
    }

    #[test]
    fn color_batch_must_match_container_count() {
        let mut registry = registry_with(&[(Container::new(0, 4), RED)], true);
        assert!(registry.add_colors(&[BLUE, BLUE]).is_err());
        assert_eq!(registry.colors(), &[RED]);
        registry.add_colors(&[BLUE]).unwrap();
        assert_eq!(registry.colors(), &[BLUE]);
        assert!(registry.add_color(1, RED).is_err());
    }
}
