use std::fmt;

use chrono::{Datelike, NaiveDate};

pub const NOT_AVAILABLE: &str = "N/A";

/// Share of decided matches won
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ratio {
    NotAvailable,
    Percent(u32),
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::NotAvailable => f.write_str(NOT_AVAILABLE),
            Ratio::Percent(p) => write!(f, "{}%", p),
        }
    }
}

/// Win percentage rounded half up; `N/A` before any result
pub fn win_loss_ratio(wins: u32, losses: u32) -> Ratio {
    let total = u64::from(wins) + u64::from(losses);
    if total == 0 {
        return Ratio::NotAvailable;
    }
    if losses == 0 {
        return Ratio::Percent(100);
    }

    let percent = (u64::from(wins) * 200 + total) / (total * 2);
    Ratio::Percent(percent as u32)
}

/// Full years between `dob` and `today`; `None` for a future birth date
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> Option<u32> {
    if dob > today {
        return None;
    }

    let mut years = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

pub fn age_label(dob: Option<NaiveDate>, today: NaiveDate) -> String {
    dob.and_then(|dob| age_on(dob, today))
        .map(|age| age.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ratio_rules() {
        assert_eq!(win_loss_ratio(0, 0), Ratio::NotAvailable);
        assert_eq!(win_loss_ratio(3, 0), Ratio::Percent(100));
        assert_eq!(win_loss_ratio(0, 4), Ratio::Percent(0));
        assert_eq!(win_loss_ratio(1, 2), Ratio::Percent(33));
        assert_eq!(win_loss_ratio(2, 1), Ratio::Percent(67));
        assert_eq!(win_loss_ratio(1, 1), Ratio::Percent(50));
        assert_eq!(win_loss_ratio(1, 7), Ratio::Percent(13));
    }

    #[test]
    fn ratio_matches_rounded_percentage() {
        for wins in 0..30u32 {
            for losses in 1..30u32 {
                let exact = 100.0 * f64::from(wins) / f64::from(wins + losses);
                assert_eq!(
                    win_loss_ratio(wins, losses),
                    Ratio::Percent((exact + 0.5).floor() as u32),
                    "{}/{}",
                    wins,
                    losses
                );
            }
        }
    }

    #[test]
    fn ratio_display() {
        assert_eq!(win_loss_ratio(0, 0).to_string(), "N/A");
        assert_eq!(win_loss_ratio(2, 1).to_string(), "67%");
    }

    #[test]
    fn age_counts_full_years() {
        let dob = date(1990, 6, 15);
        assert_eq!(age_on(dob, date(2024, 6, 14)), Some(33));
        assert_eq!(age_on(dob, date(2024, 6, 15)), Some(34));
        assert_eq!(age_on(dob, date(1989, 1, 1)), None);
    }

    #[test]
    fn missing_dob_is_not_available() {
        assert_eq!(age_label(None, date(2024, 1, 1)), "N/A");
        assert_eq!(age_label(Some(date(2000, 1, 1)), date(2024, 1, 1)), "24");
    }
}
