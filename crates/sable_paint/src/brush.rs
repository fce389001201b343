//! Fill/stroke descriptors and update change flags

use std::ops::{BitOr, BitOrAssign};

use crate::color::Color;
use crate::gradient::Gradient;

/// How a shape's fill or stroke is shaded
#[derive(Clone, Debug)]
pub enum Brush {
    Solid(Color),
    Gradient(Gradient),
}

impl From<Color> for Brush {
    fn from(color: Color) -> Self {
        Brush::Solid(color)
    }
}

impl From<Gradient> for Brush {
    fn from(gradient: Gradient) -> Self {
        Brush::Gradient(gradient)
    }
}

/// Interior test for path rasterization
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// Bitmask of paint fields that changed since the last update
///
/// Consumers use this to skip redundant GPU uploads: a settings update only
/// rewrites the solid-color uniform when `COLOR` is set, and only rebuilds
/// the gradient lookup texture when `GRADIENT` is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateFlags(u32);

impl UpdateFlags {
    pub const NONE: UpdateFlags = UpdateFlags(0);
    pub const PATH: UpdateFlags = UpdateFlags(1 << 0);
    pub const COLOR: UpdateFlags = UpdateFlags(1 << 1);
    pub const GRADIENT: UpdateFlags = UpdateFlags(1 << 2);
    pub const TRANSFORM: UpdateFlags = UpdateFlags(1 << 3);
    pub const IMAGE: UpdateFlags = UpdateFlags(1 << 4);
    pub const STROKE: UpdateFlags = UpdateFlags(1 << 5);
    pub const ALL: UpdateFlags = UpdateFlags(u32::MAX);

    pub fn contains(self, other: UpdateFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: UpdateFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for UpdateFlags {
    type Output = UpdateFlags;

    fn bitor(self, rhs: UpdateFlags) -> UpdateFlags {
        UpdateFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for UpdateFlags {
    fn bitor_assign(&mut self, rhs: UpdateFlags) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_contains() {
        let flags = UpdateFlags::COLOR | UpdateFlags::TRANSFORM;
        assert!(flags.contains(UpdateFlags::COLOR));
        assert!(flags.contains(UpdateFlags::TRANSFORM));
        assert!(!flags.contains(UpdateFlags::GRADIENT));
        assert!(flags.intersects(UpdateFlags::COLOR | UpdateFlags::GRADIENT));
        assert!(UpdateFlags::ALL.contains(flags));
        assert!(UpdateFlags::NONE.is_empty());
    }
}
