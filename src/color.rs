//! The color domain: RGB/HSV representations and the fixed-length pixel
//! buffer effects render into.

pub use smart_leds::RGB8;

use crate::math::scale;

/// HSV with a 16-bit hue in degrees (0-359), as spec'd, as opposed to
/// [`smart_leds::hsv::Hsv`] which packs an 8-bit hue. Effects that want to
/// hand off to `smart-leds`' `hsv2rgb` convert the hue down to its 8-bit
/// range first, in [`Hsv::to_rgb8`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hsv {
    pub hue: u16,
    pub sat: u8,
    pub val: u8,
}

impl Hsv {
    pub const fn new(hue: u16, sat: u8, val: u8) -> Self {
        Self { hue, sat, val }
    }

    /// Convert to RGB8 via `smart-leds`' `hsv2rgb`, folding the 16-bit degree
    /// hue down into the crate's 8-bit hue wheel.
    pub fn to_rgb8(self) -> RGB8 {
        let hue8 = ((self.hue % 360) as u32 * 255 / 359) as u8;
        smart_leds::hsv::hsv2rgb(smart_leds::hsv::Hsv {
            hue: hue8,
            sat: self.sat,
            val: self.val,
        })
    }

    /// Post-multiply the value channel by a master brightness (0-255 scale).
    pub fn scaled_by(self, brightness: u8) -> Self {
        Self {
            val: scale(self.val, brightness),
            ..self
        }
    }
}

/// Which representation the current frame's pixel data is encoded in. The
/// downstream LED wire driver converts HSV to RGB and applies the static
/// color-correction triple; see spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRepr {
    Rgb,
    Hsv,
}

/// A fixed-length, singly-tagged pixel buffer: the whole buffer is either
/// all-RGB or all-HSV for a given frame, never mixed (spec §3).
#[derive(Debug, Clone, Copy)]
pub enum PixelBuffer<const N: usize> {
    Rgb([RGB8; N]),
    Hsv([Hsv; N]),
}

impl<const N: usize> PixelBuffer<N> {
    pub const fn black() -> Self {
        PixelBuffer::Rgb([RGB8::new(0, 0, 0); N])
    }

    pub fn repr(&self) -> ColorRepr {
        match self {
            PixelBuffer::Rgb(_) => ColorRepr::Rgb,
            PixelBuffer::Hsv(_) => ColorRepr::Hsv,
        }
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }

    /// Fill every pixel with a flat RGB color, switching representation if
    /// necessary.
    pub fn fill_rgb(&mut self, color: RGB8) {
        *self = PixelBuffer::Rgb([color; N]);
    }

    /// Fill every pixel with a flat HSV color, switching representation if
    /// necessary.
    pub fn fill_hsv(&mut self, color: Hsv) {
        *self = PixelBuffer::Hsv([color; N]);
    }

    /// Switch to the HSV representation if not already, and return a
    /// per-pixel handle. Used by effects that write HSV frames pixel by
    /// pixel rather than as a flat fill.
    pub fn ensure_hsv(&mut self) -> &mut [Hsv; N] {
        if !matches!(self, PixelBuffer::Hsv(_)) {
            *self = PixelBuffer::Hsv([Hsv::default(); N]);
        }
        match self {
            PixelBuffer::Hsv(buf) => buf,
            PixelBuffer::Rgb(_) => unreachable!(),
        }
    }

    /// Switch to the RGB representation if not already, and return a
    /// per-pixel handle.
    pub fn ensure_rgb(&mut self) -> &mut [RGB8; N] {
        if !matches!(self, PixelBuffer::Rgb(_)) {
            *self = PixelBuffer::Rgb([RGB8::new(0, 0, 0); N]);
        }
        match self {
            PixelBuffer::Rgb(buf) => buf,
            PixelBuffer::Hsv(_) => unreachable!(),
        }
    }

    /// Post-multiply the master brightness onto every pixel: the V channel
    /// for HSV frames, each RGB channel for RGB frames (spec §4.8 step 4).
    pub fn apply_master_brightness(&mut self, brightness: u8) {
        match self {
            PixelBuffer::Rgb(buf) => {
                for pixel in buf.iter_mut() {
                    pixel.r = scale(pixel.r, brightness);
                    pixel.g = scale(pixel.g, brightness);
                    pixel.b = scale(pixel.b, brightness);
                }
            }
            PixelBuffer::Hsv(buf) => {
                for pixel in buf.iter_mut() {
                    *pixel = pixel.scaled_by(brightness);
                }
            }
        }
    }
}

impl<const N: usize> Default for PixelBuffer<N> {
    fn default() -> Self {
        Self::black()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsv_to_rgb8_at_red() {
        let rgb = Hsv::new(0, 255, 255).to_rgb8();
        assert_eq!(rgb, RGB8::new(255, 0, 0));
    }

    #[test]
    fn brightness_scales_every_channel() {
        let mut buf: PixelBuffer<3> = PixelBuffer::Rgb([RGB8::new(200, 200, 200); 3]);
        buf.apply_master_brightness(128);
        if let PixelBuffer::Rgb(pixels) = buf {
            for p in pixels {
                assert_eq!(p.r, scale(200, 128));
                assert_eq!(p, RGB8::new(p.r, p.r, p.r));
            }
        } else {
            panic!("expected rgb buffer");
        }
    }

    #[test]
    fn brightness_zero_is_black() {
        let mut buf: PixelBuffer<4> = PixelBuffer::Hsv([Hsv::new(120, 255, 255); 4]);
        buf.apply_master_brightness(0);
        if let PixelBuffer::Hsv(pixels) = buf {
            assert!(pixels.iter().all(|p| p.val == 0));
        } else {
            panic!("expected hsv buffer");
        }
    }
}
