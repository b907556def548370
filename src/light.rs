//! Discrete light levels and the brightness curve behind them.

/// Number of light levels per palette entry. A power of two so a ramp lookup
/// is a shift and an add.
pub const LIGHT_LEVELS: usize = 1 << LIGHT_LEVEL_BITS;
pub const LIGHT_LEVEL_BITS: u32 = 4;

/// The level at which a texture is shown with its source colours.
pub const FULL_BRIGHT: LightLevel = LightLevel(12);

// Levels below FULL_BRIGHT only darken. Levels above push value and
// saturation past the source colour for glowing areas.
const VALUE_FACTORS: [f32; LIGHT_LEVELS] = [
    0.10, 0.16, 0.22, 0.29, 0.36, 0.44, 0.52, 0.60, 0.68, 0.77, 0.85, 0.93, 1.00, 1.12, 1.26, 1.45,
];
const SATURATION_FACTORS: [f32; LIGHT_LEVELS] = [
    1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.08, 1.16, 1.30,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LightLevel(u8);

impl LightLevel {
    pub const DARKEST: LightLevel = LightLevel(0);
    pub const BRIGHTEST: LightLevel = LightLevel((LIGHT_LEVELS - 1) as u8);

    pub fn new(level: u32) -> Option<Self> {
        (level < LIGHT_LEVELS as u32).then_some(Self(level as u8))
    }

    /// Parses a single hex digit, the encoding used by map light grids.
    pub fn from_hex_digit(c: char) -> Option<Self> {
        c.to_digit(16).and_then(Self::new)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn darken(self, steps: u32) -> Self {
        Self(self.0.saturating_sub(steps.min(u8::MAX as u32) as u8))
    }

    #[inline]
    pub fn value_factor(self) -> f32 {
        VALUE_FACTORS[self.index()]
    }

    #[inline]
    pub fn saturation_factor(self) -> f32 {
        SATURATION_FACTORS[self.index()]
    }
}

impl Default for LightLevel {
    fn default() -> Self {
        FULL_BRIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_bright_is_identity() {
        assert_eq!(FULL_BRIGHT.value_factor(), 1.0);
        assert_eq!(FULL_BRIGHT.saturation_factor(), 1.0);
    }

    #[test]
    fn curve_never_decreases() {
        for pair in VALUE_FACTORS.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        for pair in SATURATION_FACTORS.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn parses_hex_levels() {
        assert_eq!(LightLevel::from_hex_digit('0'), Some(LightLevel::DARKEST));
        assert_eq!(LightLevel::from_hex_digit('c'), Some(FULL_BRIGHT));
        assert_eq!(LightLevel::from_hex_digit('F'), Some(LightLevel::BRIGHTEST));
        assert_eq!(LightLevel::from_hex_digit('g'), None);
        assert_eq!(LightLevel::new(16), None);
    }

    #[test]
    fn darken_saturates_at_zero() {
        assert_eq!(FULL_BRIGHT.darken(3).index(), 9);
        assert_eq!(FULL_BRIGHT.darken(400), LightLevel::DARKEST);
    }
}
