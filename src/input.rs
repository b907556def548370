//! Per-frame movement input as a small bitmask.
//!
//! The host translates whatever devices it polls into these flags; the
//! engine never reads devices itself.

use std::ops::{BitOr, BitOrAssign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MovementInputs(pub u8);

impl MovementInputs {
    pub const NONE: Self = Self(0);
    pub const FORWARD: Self = Self(1 << 0);
    pub const BACKWARD: Self = Self(1 << 1);
    pub const TURN_LEFT: Self = Self(1 << 2);
    pub const TURN_RIGHT: Self = Self(1 << 3);
    pub const STRAFE_LEFT: Self = Self(1 << 4);
    pub const STRAFE_RIGHT: Self = Self(1 << 5);

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for MovementInputs {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for MovementInputs {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
