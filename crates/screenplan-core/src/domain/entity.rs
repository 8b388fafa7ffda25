//! A reference to any selectable entity of a [`Layout`].

use std::fmt;

use super::geometry::Rect;
use super::layout::{DisplayId, Layout, PrimeId, ScreenId};

/// One of the three kinds of entity that can be hit-tested and selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Display(DisplayId),
    Screen(ScreenId),
    Prime(PrimeId),
}

impl EntityRef {
    /// The rectangle used for hit testing and as the drag anchor.
    ///
    /// - Display: the panning domain of its current mode.
    /// - Screen: its bounding box, grown to cover associated prime displays.
    /// - Prime display: its fixed rectangle.
    ///
    /// Returns `None` when the id is stale or the display has no current mode.
    pub fn rect(self, layout: &Layout) -> Option<Rect> {
        match self {
            EntityRef::Display(id) => layout.display(id)?.current_mode().map(|m| m.pan),
            EntityRef::Screen(id) => {
                let screen = layout.screen(id)?;
                Some(
                    layout
                        .prime_displays()
                        .filter(|(_, p)| p.screen == Some(id))
                        .fold(screen.dim, |acc, (_, p)| acc.union(&p.rect)),
                )
            }
            EntityRef::Prime(id) => layout.prime_display(id).map(|p| p.rect),
        }
    }

    /// Screen whose group this entity belongs to in the Z-order.
    pub fn group(self, layout: &Layout) -> Option<ScreenId> {
        match self {
            EntityRef::Display(id) => layout.display(id)?.screen,
            EntityRef::Screen(id) => Some(id),
            EntityRef::Prime(id) => layout.prime_display(id)?.screen,
        }
    }

    /// Human-readable name of the entity, if it still exists.
    pub fn name(self, layout: &Layout) -> Option<&str> {
        match self {
            EntityRef::Display(id) => layout.display(id).map(|d| d.name.as_str()),
            EntityRef::Screen(id) => layout.screen(id).map(|s| s.name.as_str()),
            EntityRef::Prime(id) => layout.prime_display(id).map(|p| p.name.as_str()),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Display(id) => write!(f, "{id}"),
            EntityRef::Screen(id) => write!(f, "{id}"),
            EntityRef::Prime(id) => write!(f, "{id}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layout::{Gpu, Mode, PrimeDisplay, Screen};

    #[test]
    fn test_screen_rect_covers_associated_prime_displays() {
        // Arrange
        let mut layout = Layout::new();
        let mut screen = Screen::new("Screen-0", 1);
        screen.dim = Rect::new(0, 0, 1920, 1080);
        let sid = layout.add_screen(screen);
        layout.add_prime_display(PrimeDisplay {
            name: "PRIME-0".into(),
            rect: Rect::new(1920, 0, 1280, 1024),
            screen: Some(sid),
        });
        layout.add_prime_display(PrimeDisplay {
            name: "PRIME-1".into(),
            rect: Rect::new(-5000, 0, 10, 10),
            screen: None,
        });

        // Act
        let rect = EntityRef::Screen(sid).rect(&layout);

        // Assert
        assert_eq!(rect, Some(Rect::new(0, 0, 3200, 1080)));
    }

    #[test]
    fn test_display_rect_is_current_pan() {
        let mut layout = Layout::new();
        let gpu = layout.add_gpu(Gpu::new("GPU-0"));
        let d = layout.add_display(gpu, None, "DP-0", vec![Mode::new(800, 600).at(10, 20)]);
        assert_eq!(EntityRef::Display(d).rect(&layout), Some(Rect::new(10, 20, 800, 600)));
        assert_eq!(EntityRef::Display(d).group(&layout), None);
    }

    #[test]
    fn test_stale_id_has_no_rect() {
        let layout = Layout::new();
        assert_eq!(EntityRef::Prime(PrimeId(3)).rect(&layout), None);
    }
}
