//! Dirty-rectangle tracking over the framebuffer.

/// Inclusive bounding box of framebuffer words written since the last
/// [`Damage::take`], in word-column and scanline units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DamageRect {
    /// Leftmost word column.
    pub x1: u32,
    /// Top scanline.
    pub y1: u32,
    /// Rightmost word column.
    pub x2: u32,
    /// Bottom scanline.
    pub y2: u32,
}

impl DamageRect {
    /// True when the rectangle covers nothing (`x1 > x2` or `y1 > y2`).
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.x1 > self.x2 || self.y1 > self.y2
    }
}

/// Damage tracker owned by the memory bus.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Damage {
    rect: DamageRect,
    width: u32,
    height: u32,
}

impl Damage {
    /// Creates a tracker for a framebuffer of `width` words by `height` rows.
    ///
    /// The whole framebuffer starts out damaged so the first frame is drawn in full.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            rect: DamageRect {
                x1: 0,
                y1: 0,
                x2: width.saturating_sub(1),
                y2: height.saturating_sub(1),
            },
            width,
            height,
        }
    }

    const fn empty_rect(&self) -> DamageRect {
        DamageRect {
            x1: self.width,
            y1: self.height,
            x2: 0,
            y2: 0,
        }
    }

    /// Grows the rectangle to include `(col, row)`. Rows past the framebuffer are ignored.
    pub const fn mark(&mut self, col: u32, row: u32) {
        if row >= self.height {
            return;
        }
        let rect = &mut self.rect;
        if col < rect.x1 {
            rect.x1 = col;
        }
        if col > rect.x2 {
            rect.x2 = col;
        }
        if row < rect.y1 {
            rect.y1 = row;
        }
        if row > rect.y2 {
            rect.y2 = row;
        }
    }

    /// Current rectangle without resetting it.
    #[must_use]
    pub const fn rect(&self) -> DamageRect {
        self.rect
    }

    /// Returns the current rectangle and resets the tracker to empty.
    pub const fn take(&mut self) -> DamageRect {
        let rect = self.rect;
        self.rect = self.empty_rect();
        rect
    }

    /// True when nothing has been marked since the last [`Self::take`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Damage, DamageRect};

    #[test]
    fn starts_covering_the_whole_framebuffer() {
        let damage = Damage::new(32, 768);
        assert_eq!(
            damage.rect(),
            DamageRect {
                x1: 0,
                y1: 0,
                x2: 31,
                y2: 767
            }
        );
        assert!(!damage.is_empty());
    }

    #[test]
    fn take_resets_to_empty() {
        let mut damage = Damage::new(32, 768);
        let first = damage.take();
        assert_eq!(first.x2, 31);
        assert!(damage.is_empty());
        assert!(damage.take().is_empty());
    }

    #[test]
    fn marks_collapse_then_expand_in_both_directions() {
        let mut damage = Damage::new(32, 768);
        let _ = damage.take();

        damage.mark(10, 100);
        assert_eq!(
            damage.rect(),
            DamageRect {
                x1: 10,
                y1: 100,
                x2: 10,
                y2: 100
            }
        );

        damage.mark(3, 200);
        damage.mark(20, 50);
        assert_eq!(
            damage.rect(),
            DamageRect {
                x1: 3,
                y1: 50,
                x2: 20,
                y2: 200
            }
        );
    }

    #[test]
    fn rows_past_the_framebuffer_are_ignored() {
        let mut damage = Damage::new(32, 768);
        let _ = damage.take();
        damage.mark(0, 768);
        assert!(damage.is_empty());
    }
}
