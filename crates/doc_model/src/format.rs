//! Text format flags
//!
//! Text runs carry their inline formatting as a bitmask. The bit values match
//! the portable document format, so the mask is stored and exchanged as a
//! plain integer. Bits without a named effect are kept as-is.

use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Bitmask of inline text effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextFormat(u32);

impl TextFormat {
    pub const NONE: TextFormat = TextFormat(0);
    pub const BOLD: TextFormat = TextFormat(1);
    pub const ITALIC: TextFormat = TextFormat(1 << 1);
    pub const STRIKETHROUGH: TextFormat = TextFormat(1 << 2);
    pub const UNDERLINE: TextFormat = TextFormat(1 << 3);
    pub const CODE: TextFormat = TextFormat(1 << 4);
    pub const SUBSCRIPT: TextFormat = TextFormat(1 << 5);
    pub const SUPERSCRIPT: TextFormat = TextFormat(1 << 6);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set in `self`
    pub const fn contains(self, other: TextFormat) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: TextFormat) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: TextFormat) {
        self.0 &= !other.0;
    }

    pub fn has(self, effect: TextEffect) -> bool {
        self.contains(effect.flag())
    }

    /// Set effects in ascending bit order
    pub fn effects(self) -> impl Iterator<Item = TextEffect> {
        TextEffect::ALL.into_iter().filter(move |e| self.has(*e))
    }
}

impl BitOr for TextFormat {
    type Output = TextFormat;

    fn bitor(self, rhs: TextFormat) -> TextFormat {
        TextFormat(self.0 | rhs.0)
    }
}

impl BitOrAssign for TextFormat {
    fn bitor_assign(&mut self, rhs: TextFormat) {
        self.0 |= rhs.0;
    }
}

impl From<u32> for TextFormat {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

/// A single named inline effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEffect {
    Bold,
    Italic,
    Strikethrough,
    Underline,
    Code,
    Subscript,
    Superscript,
}

impl TextEffect {
    pub const ALL: [TextEffect; 7] = [
        TextEffect::Bold,
        TextEffect::Italic,
        TextEffect::Strikethrough,
        TextEffect::Underline,
        TextEffect::Code,
        TextEffect::Subscript,
        TextEffect::Superscript,
    ];

    pub const fn flag(self) -> TextFormat {
        match self {
            TextEffect::Bold => TextFormat::BOLD,
            TextEffect::Italic => TextFormat::ITALIC,
            TextEffect::Strikethrough => TextFormat::STRIKETHROUGH,
            TextEffect::Underline => TextFormat::UNDERLINE,
            TextEffect::Code => TextFormat::CODE,
            TextEffect::Subscript => TextFormat::SUBSCRIPT,
            TextEffect::Superscript => TextFormat::SUPERSCRIPT,
        }
    }
}
