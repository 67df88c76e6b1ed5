use pix_engine::{Buffer, Color, PenColor, PixelFormat, Position, Rectangle, blit::blit_matte, draw::draw_filled_ellipse};

use crate::Result;

/// Round brush tip. The mask is an indexed buffer, non zero pixels are painted.
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    mask: Buffer,
}

impl Brush {
    /// Round brush `size` pixels across. Even sizes are built from four
    /// overlapping copies of the next smaller odd circle.
    ///
    /// # Errors
    ///
    /// Fails if the mask can't be allocated.
    ///
    /// # Panics
    ///
    /// Panics if `size` is less than 1.
    pub fn round(size: i32) -> Result<Self> {
        assert!(size >= 1, "brush size must be at least 1, got {size}");
        let mut mask = Buffer::new(PixelFormat::Indexed8, size, size)?;
        let pen = PenColor::indexed(Color::WHITE, 1);
        let r = (size - 1) / 2;
        let extra = (size - 1) % 2;
        for dy in 0..=extra {
            for dx in 0..=extra {
                draw_filled_ellipse(&mut mask, Position::new(r + dx, r + dy), r, r, &pen);
            }
        }
        Ok(Self { mask })
    }

    pub fn from_mask(mask: Buffer) -> Self {
        assert!(mask.format() == PixelFormat::Indexed8, "brush masks are indexed, got {}", mask.format());
        Self { mask }
    }

    pub fn size(&self) -> i32 {
        self.mask.width()
    }

    pub fn mask(&self) -> &Buffer {
        &self.mask
    }

    pub fn covers(&self, x: i32, y: i32) -> bool {
        self.mask.is_inside(x, y) && self.mask.index_at(x, y) != 0
    }

    /// Rectangle the brush touches when centered on `pos`.
    pub fn area(&self, pos: Position) -> Rectangle {
        let half = Position::new(self.mask.width() / 2, self.mask.height() / 2);
        Rectangle::new(pos - half, self.mask.size())
    }

    /// Paints the brush centered on `pos`. Returns the brush area clipped to `dest`.
    pub fn stamp(&self, dest: &mut Buffer, pos: Position, pen: &PenColor) -> Rectangle {
        let mut src_rect = self.mask.bounds();
        let mut dest_rect = self.area(pos);
        blit_matte(&self.mask, &mut src_rect, dest, &mut dest_rect, &PenColor::indexed(Color::BLACK, 0), pen);
        dest_rect
    }
}
