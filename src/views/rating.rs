use std::fmt;

use super::stats::NOT_AVAILABLE;

/// Direction marker for a server-supplied rating delta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingGlyph {
    Up(u32),
    Down(u32),
    Neutral,
}

impl RatingGlyph {
    pub fn from_delta(delta: i32) -> Self {
        match delta {
            d if d > 0 => RatingGlyph::Up(d.unsigned_abs()),
            d if d < 0 => RatingGlyph::Down(d.unsigned_abs()),
            _ => RatingGlyph::Neutral,
        }
    }

    pub fn magnitude(&self) -> u32 {
        match self {
            RatingGlyph::Up(m) | RatingGlyph::Down(m) => *m,
            RatingGlyph::Neutral => 0,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            RatingGlyph::Up(_) => "▲",
            RatingGlyph::Down(_) => "▼",
            RatingGlyph::Neutral => "=",
        }
    }
}

impl fmt::Display for RatingGlyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol(), self.magnitude())
    }
}

/// Rating, or `N/A` until the player is rated
pub fn rating_label(rating: Option<i32>) -> String {
    rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
