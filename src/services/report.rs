use std::fmt::Write as _;

use chrono::NaiveDate;
use colored::*;

use crate::domain::{Match, PlayerProfile, Roster, RosterEntry, Tournament};
use crate::errors::GatewayError;
use crate::pagination::Page;
use crate::views::{
    RankRow, RatingGlyph, Side, age_label, match_headline, rating_label, resolve_sides, set_line, trim_seconds,
    win_loss_ratio,
};

pub fn success(message: &str) -> String {
    format!("{} {}", "✓".green(), message)
}

/// User-facing line for a failed call
pub fn failure(error: &GatewayError) -> String {
    let hint = match error {
        GatewayError::Auth { .. } => " Run `tennis-club login` to sign in again.",
        GatewayError::Network { .. } => " Check your connection and retry.",
        _ => "",
    };
    format!("{} {}{}", "✗".red(), error, hint)
}

pub fn profile(player: &PlayerProfile, today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", player.full_name().bold());
    let _ = writeln!(out, "  Email:    {}{}", player.email, verified_mark(player.is_email_verified));
    let _ = writeln!(out, "  Age:      {}", age_label(player.dob, today));
    if let Some(gender) = &player.gender {
        let _ = writeln!(out, "  Gender:   {}", gender);
    }
    if let Some(height) = player.height_cm {
        let _ = writeln!(out, "  Height:   {} cm", height);
    }
    if let Some(weight) = player.weight_kg {
        let _ = writeln!(out, "  Weight:   {} kg", weight);
    }
    let _ = writeln!(out, "  Rating:   {}", rating_label(player.rating).bold());
    let _ = write!(
        out,
        "  Record:   {} played, {} won, {} lost ({})",
        player.match_played,
        player.win,
        player.lose,
        win_loss_ratio(player.win, player.lose)
    );
    out
}

pub fn rank_table(title: &str, rows: &[RankRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title.bold());
    let _ = writeln!(
        out,
        "{:>4}  {:<28} {:>4} {:>7} {:>6} {:>6} {:>4} {:>4}",
        "Rank", "Player", "Age", "Rating", "W/L", "Played", "Win", "Lose"
    );
    let _ = write!(out, "{}", "─".repeat(72));

    for row in rows {
        let _ = write!(
            out,
            "\n{:>4}  {:<28} {:>4} {:>7} {:>6} {:>6} {:>4} {:>4}",
            row.rank,
            truncate(&row.name, 28),
            row.age,
            row.rating,
            row.ratio.to_string(),
            row.match_played,
            row.win,
            row.lose
        );
    }
    out
}

/// One match card; players missing from the roster get a fallback line
pub fn match_card<P: RosterEntry>(m: &Match, roster: &Roster<'_, P>) -> String {
    let mut out = String::new();
    let court = m.court.as_deref().unwrap_or("Unknown court");
    let when = match m.time.as_deref() {
        Some(time) => format!("{} | {}", m.date, trim_seconds(time)),
        None => m.date.to_string(),
    };
    let _ = writeln!(out, "{}  {}", court.bold(), when.dimmed());

    let sides = match resolve_sides(m, roster) {
        Ok(sides) => sides,
        Err(missing) => {
            let _ = write!(out, "  {}", format!("Players not found ({})", missing.player_id).yellow());
            return out;
        }
    };

    for (side, view, delta) in [
        (Side::Player1, &sides.player1, m.player1_rating_change),
        (Side::Player2, &sides.player2, m.player2_rating_change),
    ] {
        let mark = if view.is_winner { " ✔".green().to_string() } else { String::new() };
        let glyph = delta.map(rating_delta).unwrap_or_default();
        let _ = writeln!(
            out,
            "  {:<24} {:<14} {}",
            format!("{}{}", view.short_name(), mark),
            set_line(&m.sets, side, " "),
            glyph
        );
    }
    let _ = write!(out, "  {}", match_headline(m, &sides).italic());
    out
}

pub fn match_page<P: RosterEntry>(page: &Page<'_, Match>, roster: &Roster<'_, P>) -> String {
    if page.items.is_empty() {
        return "No matches recorded.".dimmed().to_string();
    }

    let cards: Vec<String> = page.items.iter().map(|m| match_card(m, roster)).collect();
    format!(
        "{}\n\n{}",
        cards.join("\n\n"),
        format!("Page {} of {} ({} matches)", page.page, page.total_pages, page.total_items).dimmed()
    )
}

pub fn tournaments(list: &[Tournament]) -> String {
    if list.is_empty() {
        return "No tournaments yet.".dimmed().to_string();
    }

    list.iter().map(tournament_line).collect::<Vec<_>>().join("\n")
}

pub fn tournament_line(t: &Tournament) -> String {
    let dates = match t.date_range() {
        Some((start, end)) => format!("{} - {}", start.format("%d %b %y"), end.format("%d %b %y")),
        None => "open-ended".to_string(),
    };
    format!(
        "{}  {}  {}  {}  {} participants",
        t.id.dimmed(),
        t.title.bold(),
        t.status.as_str(),
        dates,
        t.participant_ids.len()
    )
}

fn rating_delta(delta: i32) -> String {
    let glyph = RatingGlyph::from_delta(delta);
    match glyph {
        RatingGlyph::Up(_) => glyph.to_string().green().to_string(),
        RatingGlyph::Down(_) => glyph.to_string().red().to_string(),
        RatingGlyph::Neutral => glyph.to_string(),
    }
}

fn verified_mark(verified: bool) -> String {
    if verified {
        format!(" {}", "(verified)".green())
    } else {
        format!(" {}", "(unverified)".yellow())
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
