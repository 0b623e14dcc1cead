//! Display-ready structures derived from cached collections.
//!
//! Everything here is pure: no I/O, no store access, and the current date is
//! always passed in.

mod names;
mod ordering;
mod ranking;
mod rating;
mod stats;

pub use crate::pagination::{Page, paginate, total_pages};
pub use names::{MatchSides, NotFound, Side, SideView, match_headline, resolve_sides, set_line, short_name};
pub use ordering::{recency_sort, trim_seconds};
pub use ranking::{RankRow, Standing, rank_rows};
pub use rating::{RatingGlyph, rating_label};
pub use stats::{NOT_AVAILABLE, Ratio, age_label, age_on, win_loss_ratio};
