use crate::{Color, EngineError, PenColor, PixelFormat, Position, Rectangle, Result, Size};

/// Format tagged 2D pixel grid that owns its storage.
///
/// The format is fixed at construction; converting produces a new buffer (see
/// [`crate::convert`]). Rows are stored top to bottom without padding.
#[derive(Clone, PartialEq, Eq)]
pub struct Buffer {
    format: PixelFormat,
    width: i32,
    height: i32,
    data: Vec<u8>,
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

fn data_len(format: PixelFormat, width: i32, height: i32) -> Result<usize> {
    if width < 0 || height < 0 {
        return Err(EngineError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
        .ok_or(EngineError::AllocationFailed {
            width,
            height,
            format,
            bytes: usize::MAX,
        })
}

impl Buffer {
    /// Allocates a cleared buffer: index 0, opaque black for RGB, transparent black for RGBA.
    ///
    /// # Errors
    ///
    /// `InvalidDimensions` for negative sizes, `AllocationFailed` if the memory can't be reserved.
    pub fn new(format: PixelFormat, width: i32, height: i32) -> Result<Self> {
        let len = data_len(format, width, height)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| EngineError::AllocationFailed {
            width,
            height,
            format,
            bytes: len,
        })?;
        data.resize(len, 0);
        if format == PixelFormat::Rgb8 {
            for px in data.chunks_exact_mut(4) {
                px[3] = 255;
            }
        }
        Ok(Self { format, width, height, data })
    }

    /// Wraps raw row major pixel data. `data` must hold exactly `height * bytes_per_row` bytes.
    /// The padding byte of RGB pixels is forced to 255.
    ///
    /// # Errors
    ///
    /// `InvalidDataLength` if the length doesn't match the dimensions.
    pub fn from_raw(format: PixelFormat, width: i32, height: i32, mut data: Vec<u8>) -> Result<Self> {
        let expected = data_len(format, width, height)?;
        if data.len() != expected {
            return Err(EngineError::InvalidDataLength {
                expected,
                actual: data.len(),
            });
        }
        if format == PixelFormat::Rgb8 {
            for px in data.chunks_exact_mut(4) {
                px[3] = 255;
            }
        }
        Ok(Self { format, width, height, data })
    }

    /// Copies the pixels of `src` inside `rect` into a new, tightly sized buffer.
    /// The rectangle is clipped to the source bounds first.
    ///
    /// # Errors
    ///
    /// `AllocationFailed` if the new buffer can't be allocated.
    pub fn from_region(src: &Buffer, rect: Rectangle) -> Result<Self> {
        let rect = rect.clip(&src.bounds());
        if rect.is_empty() {
            return Buffer::new(src.format, 0, 0);
        }
        let mut res = Buffer::new(src.format, rect.width(), rect.height())?;
        let bpp = src.format.bytes_per_pixel();
        let len = rect.width() as usize * bpp;
        for y in 0..rect.height() {
            let from = src.pixel_offset(rect.left(), rect.top() + y);
            res.row_mut(y).copy_from_slice(&src.data[from..from + len]);
        }
        Ok(res)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn bounds(&self) -> Rectangle {
        Rectangle::from(0, 0, self.width, self.height)
    }

    pub fn bytes_per_row(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn is_inside(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    #[inline]
    pub(crate) fn pixel_offset(&self, x: i32, y: i32) -> usize {
        debug_assert!(self.is_inside(x, y), "pixel ({x}, {y}) outside {}x{} buffer", self.width, self.height);
        (y as usize * self.width as usize + x as usize) * self.format.bytes_per_pixel()
    }

    pub fn row(&self, y: i32) -> &[u8] {
        let start = self.pixel_offset(0, y);
        &self.data[start..start + self.bytes_per_row()]
    }

    pub(crate) fn row_mut(&mut self, y: i32) -> &mut [u8] {
        let len = self.bytes_per_row();
        let start = y as usize * len;
        &mut self.data[start..start + len]
    }

    pub fn pixel_bytes(&self, x: i32, y: i32) -> &[u8] {
        let o = self.pixel_offset(x, y);
        &self.data[o..o + self.format.bytes_per_pixel()]
    }

    fn assert_format(&self, expected: PixelFormat) {
        assert!(
            self.format == expected,
            "pixel format mismatch: buffer is {}, accessed as {expected}",
            self.format
        );
    }

    // === Typed access ===

    pub fn index_at(&self, x: i32, y: i32) -> u8 {
        self.assert_format(PixelFormat::Indexed8);
        self.data[self.pixel_offset(x, y)]
    }

    pub fn set_index(&mut self, x: i32, y: i32, index: u8) {
        self.assert_format(PixelFormat::Indexed8);
        let o = self.pixel_offset(x, y);
        self.data[o] = index;
    }

    pub fn rgb_at(&self, x: i32, y: i32) -> Color {
        self.assert_format(PixelFormat::Rgb8);
        let o = self.pixel_offset(x, y);
        Color::new(self.data[o], self.data[o + 1], self.data[o + 2])
    }

    /// Alpha of `color` is ignored.
    pub fn set_rgb(&mut self, x: i32, y: i32, color: Color) {
        self.assert_format(PixelFormat::Rgb8);
        let o = self.pixel_offset(x, y);
        self.data[o..o + 4].copy_from_slice(&[color.r, color.g, color.b, 255]);
    }

    pub fn rgba_at(&self, x: i32, y: i32) -> Color {
        self.assert_format(PixelFormat::Rgba8);
        let o = self.pixel_offset(x, y);
        Color::rgba(self.data[o], self.data[o + 1], self.data[o + 2], self.data[o + 3])
    }

    pub fn set_rgba(&mut self, x: i32, y: i32, color: Color) {
        self.assert_format(PixelFormat::Rgba8);
        let o = self.pixel_offset(x, y);
        self.data[o..o + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
    }

    // === Format neutral access ===

    /// Pixel value packed into a `u32`: the index for indexed buffers, otherwise
    /// the little endian RGBA bytes (RGB padding reads as 255).
    #[inline]
    pub fn raw_pixel(&self, x: i32, y: i32) -> u32 {
        let o = self.pixel_offset(x, y);
        match self.format {
            PixelFormat::Indexed8 => self.data[o] as u32,
            PixelFormat::Rgb8 => u32::from_le_bytes([self.data[o], self.data[o + 1], self.data[o + 2], 255]),
            PixelFormat::Rgba8 => u32::from_le_bytes([self.data[o], self.data[o + 1], self.data[o + 2], self.data[o + 3]]),
        }
    }

    #[inline]
    pub fn set_raw_pixel(&mut self, x: i32, y: i32, value: u32) {
        let o = self.pixel_offset(x, y);
        write_raw(self.format, &mut self.data[o..], value);
    }

    // === Drawing primitives ===

    /// Fills `rect` clipped to the buffer and returns the area that was filled.
    pub fn fill_rect(&mut self, rect: Rectangle, pen: &PenColor) -> Rectangle {
        let rect = rect.clip(&self.bounds());
        if rect.is_empty() {
            return rect;
        }
        let value = pen.encode(self.format);
        for y in rect.y_range() {
            self.fill_span(rect.left(), rect.right(), y, value);
        }
        rect
    }

    /// Fills the whole buffer.
    pub fn clear(&mut self, pen: &PenColor) {
        let bounds = self.bounds();
        self.fill_rect(bounds, pen);
    }

    /// Draws the horizontal line `x0..=x1` on row `y`, clipped. Returns the drawn area.
    pub fn hline(&mut self, x0: i32, x1: i32, y: i32, pen: &PenColor) -> Rectangle {
        let (x0, x1) = (x0.min(x1), x0.max(x1));
        self.fill_rect(Rectangle::from(x0, y, x1 - x0 + 1, 1), pen)
    }

    /// Draws the border of `rect` (one pixel wide) and returns the clipped damage.
    pub fn outline_rect(&mut self, rect: Rectangle, pen: &PenColor) -> Rectangle {
        if rect.is_empty() {
            return Rectangle::empty();
        }
        let mut damage = self.fill_rect(Rectangle::from(rect.left(), rect.top(), rect.width(), 1), pen);
        damage = damage.merge(&self.fill_rect(Rectangle::from(rect.left(), rect.bottom() - 1, rect.width(), 1), pen));
        if rect.height() > 2 {
            let inner = Rectangle::from(rect.left(), rect.top() + 1, 1, rect.height() - 2);
            damage = damage.merge(&self.fill_rect(inner, pen));
            damage = damage.merge(&self.fill_rect(inner + Position::new(rect.width() - 1, 0), pen));
        }
        damage
    }

    /// Fills the half open span `x0..x1` of row `y`. The span must be inside the buffer.
    pub(crate) fn fill_span(&mut self, x0: i32, x1: i32, y: i32, value: u32) {
        if x1 <= x0 {
            return;
        }
        let start = self.pixel_offset(x0, y);
        let end = start + (x1 - x0) as usize * self.format.bytes_per_pixel();
        let span = &mut self.data[start..end];
        match self.format {
            PixelFormat::Indexed8 => span.fill(value as u8),
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => {
                let bytes = value.to_le_bytes();
                for px in span.chunks_exact_mut(4) {
                    px.copy_from_slice(&bytes);
                }
            }
        }
    }

    /// Copies row `src_y` over row `dest_y`.
    pub fn copy_row(&mut self, src_y: i32, dest_y: i32) {
        let len = self.bytes_per_row();
        let from = src_y as usize * len;
        self.data.copy_within(from..from + len, dest_y as usize * len);
    }

    /// Mirrors a single row left to right.
    pub fn mirror_row(&mut self, y: i32) {
        let bpp = self.format.bytes_per_pixel();
        let row = self.row_mut(y);
        match bpp {
            1 => row.reverse(),
            _ => {
                let pixels = row.len() / bpp;
                for i in 0..pixels / 2 {
                    let j = pixels - 1 - i;
                    for b in 0..bpp {
                        row.swap(i * bpp + b, j * bpp + b);
                    }
                }
            }
        }
    }

    /// Horizontal mirror of the whole buffer.
    pub fn flip_horizontal(&mut self) {
        for y in 0..self.height {
            self.mirror_row(y);
        }
    }

    /// Vertical mirror of the whole buffer, swapping row pairs.
    pub fn flip_vertical(&mut self) {
        let len = self.bytes_per_row();
        let mut top = 0;
        let mut bottom = self.height - 1;
        while top < bottom {
            let (upper, lower) = self.data.split_at_mut(bottom as usize * len);
            upper[top as usize * len..(top as usize + 1) * len].swap_with_slice(&mut lower[..len]);
            top += 1;
            bottom -= 1;
        }
    }
}

#[inline]
pub(crate) fn write_raw(format: PixelFormat, dest: &mut [u8], value: u32) {
    match format {
        PixelFormat::Indexed8 => dest[0] = value as u8,
        PixelFormat::Rgb8 => {
            let [r, g, b, _] = value.to_le_bytes();
            dest[..4].copy_from_slice(&[r, g, b, 255]);
        }
        PixelFormat::Rgba8 => dest[..4].copy_from_slice(&value.to_le_bytes()),
    }
}
