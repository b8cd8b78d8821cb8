//! Identifier newtypes and the display color palette.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a habit.
///
/// A wrapper around UUID for type safety, so a habit id can never be passed
/// where a completion id is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a habit id from its string form (used when loading from the
    /// database).
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a completion record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionId(pub Uuid);

impl CompletionId {
    /// Generate a new random completion id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a completion id from its string form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for CompletionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CompletionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display colors a habit can be assigned.
///
/// The palette is fixed at eight entries; a habit's `color_index` maps onto
/// it modulo the palette size, so any stored index resolves to a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HabitColor {
    Coral,
    Amber,
    Lime,
    Teal,
    Sky,
    Indigo,
    Purple,
    Pink,
}

impl HabitColor {
    /// All palette entries in index order.
    pub const ALL: [HabitColor; 8] = [
        HabitColor::Coral,
        HabitColor::Amber,
        HabitColor::Lime,
        HabitColor::Teal,
        HabitColor::Sky,
        HabitColor::Indigo,
        HabitColor::Purple,
        HabitColor::Pink,
    ];

    /// Resolve an arbitrary index onto the palette, wrapping modulo its size.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Get the display name for this color.
    pub fn display_name(&self) -> &'static str {
        match self {
            HabitColor::Coral => "Coral",
            HabitColor::Amber => "Amber",
            HabitColor::Lime => "Lime",
            HabitColor::Teal => "Teal",
            HabitColor::Sky => "Sky",
            HabitColor::Indigo => "Indigo",
            HabitColor::Purple => "Purple",
            HabitColor::Pink => "Pink",
        }
    }

    /// The accent color used for checked days and highlights, as RGB.
    pub fn accent_rgb(&self) -> (u8, u8, u8) {
        match self {
            HabitColor::Coral => (255, 107, 107),
            HabitColor::Amber => (255, 171, 94),
            HabitColor::Lime => (126, 214, 135),
            HabitColor::Teal => (78, 205, 196),
            HabitColor::Sky => (116, 185, 255),
            HabitColor::Indigo => (124, 122, 232),
            HabitColor::Purple => (179, 136, 235),
            HabitColor::Pink => (255, 143, 177),
        }
    }

    /// A soft pastel background that complements the accent, as RGB.
    pub fn background_rgb(&self) -> (u8, u8, u8) {
        match self {
            HabitColor::Coral => (255, 235, 235),
            HabitColor::Amber => (255, 245, 230),
            HabitColor::Lime => (235, 250, 238),
            HabitColor::Teal => (230, 250, 248),
            HabitColor::Sky => (232, 244, 255),
            HabitColor::Indigo => (238, 238, 252),
            HabitColor::Purple => (245, 238, 252),
            HabitColor::Pink => (255, 238, 244),
        }
    }
}
