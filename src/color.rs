//! Packed colour helpers and the HSV round trip used to build the light ramp.
//!
//! Colours are packed as `0xAARRGGBB`, which is also the layout softbuffer
//! expects (it ignores the alpha byte).

pub const OPAQUE: u32 = 0xFF00_0000;

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    OPAQUE | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

#[inline]
pub fn unpack_rgb(color: u32) -> (u8, u8, u8) {
    (
        ((color >> 16) & 0xFF) as u8,
        ((color >> 8) & 0xFF) as u8,
        (color & 0xFF) as u8,
    )
}

/// Rec. 601 luma in 0..=255, used for brightness comparisons.
#[inline]
pub fn luma(color: u32) -> f32 {
    let (r, g, b) = unpack_rgb(color);
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Hsv {
    pub const BLACK: Hsv = Hsv {
        h: 0.0,
        s: 0.0,
        v: 0.0,
    };

    pub fn from_argb(color: u32) -> Self {
        let (r, g, b) = unpack_rgb(color);
        Self::from_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        if max <= 0.0 {
            return Self::BLACK;
        }

        let delta = max - min;
        let s = delta / max;
        if delta <= 0.0 {
            // grey: hue is undefined, keep it at 0
            return Self { h: 0.0, s, v: max };
        }

        let mut h = if r >= max {
            (g - b) / delta
        } else if g >= max {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };
        h *= 60.0;
        if h < 0.0 {
            h += 360.0;
        }

        Self { h, s, v: max }
    }

    /// Shift hue and scale saturation/value, clamping back into range.
    pub fn adjust(self, hue_shift: f32, saturation_scale: f32, value_scale: f32) -> Self {
        Self {
            h: (self.h + hue_shift).rem_euclid(360.0),
            s: (self.s * saturation_scale).clamp(0.0, 1.0),
            v: (self.v * value_scale).clamp(0.0, 1.0),
        }
    }

    pub fn to_argb(self) -> u32 {
        let v = self.v.clamp(0.0, 1.0);
        let s = self.s.clamp(0.0, 1.0);
        if s <= 0.0 {
            return pack_unit(v, v, v);
        }

        let hh = self.h.rem_euclid(360.0) / 60.0;
        let sector = hh as u32;
        let ff = hh - sector as f32;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * ff);
        let t = v * (1.0 - s * (1.0 - ff));

        let (r, g, b) = match sector {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        pack_unit(r, g, b)
    }
}

#[inline]
fn pack_unit(r: f32, g: f32, b: f32) -> u32 {
    let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    pack_rgb(byte(r), byte(g), byte(b))
}
