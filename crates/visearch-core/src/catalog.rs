#![forbid(unsafe_code)]

//! Fixed stimulus categories and experimental conditions.
//!
//! Category order is part of the reproducibility contract: balanced
//! category indices are positions in [`Color::CATEGORIES`] and
//! [`Shape::CATEGORIES`], so reordering either array changes every plan.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// Number of clickable items in every trial grid.
pub const GRID_SIZE: usize = 8;

/// Item color. Eight categories plus the neutral ink for shape-only grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Brown,
    Black,
}

impl Color {
    /// Target categories, in balancing-index order.
    pub const CATEGORIES: [Color; GRID_SIZE] = [
        Color::Red,
        Color::Orange,
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::Purple,
        Color::Pink,
        Color::Brown,
    ];

    /// Fixed color of every item in a shape-only grid.
    pub const NEUTRAL: Color = Color::Black;

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Pink => "pink",
            Self::Brown => "brown",
            Self::Black => "black",
        }
    }

    /// Display color as `#rrggbb`.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Red => "#e53935",
            Self::Orange => "#fb8c00",
            Self::Yellow => "#fdd835",
            Self::Green => "#43a047",
            Self::Blue => "#1e88e5",
            Self::Purple => "#8e24aa",
            Self::Pink => "#ec407a",
            Self::Brown => "#6d4c41",
            Self::Black => "#111111",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Item shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Diamond,
    Star,
    Hexagon,
    Cross,
    Heart,
}

impl Shape {
    /// Target categories, in balancing-index order.
    pub const CATEGORIES: [Shape; GRID_SIZE] = [
        Shape::Circle,
        Shape::Square,
        Shape::Triangle,
        Shape::Diamond,
        Shape::Star,
        Shape::Hexagon,
        Shape::Cross,
        Shape::Heart,
    ];

    /// Fixed shape of every item in a color-only grid.
    pub const NEUTRAL: Shape = Shape::Circle;

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Diamond => "diamond",
            Self::Star => "star",
            Self::Hexagon => "hexagon",
            Self::Cross => "cross",
            Self::Heart => "heart",
        }
    }

    /// Glyph the UI renders for this shape.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Circle => "●",
            Self::Square => "■",
            Self::Triangle => "▲",
            Self::Diamond => "◆",
            Self::Star => "★",
            Self::Hexagon => "⬢",
            Self::Cross => "✚",
            Self::Heart => "♥",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Experimental encoding condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    ColorOnly,
    ShapeOnly,
    Combined,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Self::ColorOnly, Self::ShapeOnly, Self::Combined];

    /// Wire name (`color-only`, `shape-only`, `combined`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ColorOnly => "color-only",
            Self::ShapeOnly => "shape-only",
            Self::Combined => "combined",
        }
    }

    /// Short name used in condition orders (`color`, `shape`, `combined`).
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::ColorOnly => "color",
            Self::ShapeOnly => "shape",
            Self::Combined => "combined",
        }
    }

    /// Letter used in persisted order labels.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::ColorOnly => 'A',
            Self::ShapeOnly => 'B',
            Self::Combined => 'C',
        }
    }

    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.letter() == letter)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == trimmed || c.short_name() == trimmed)
            .ok_or_else(|| PlanError::InvalidCondition {
                value: s.to_string(),
            })
    }
}
