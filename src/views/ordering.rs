use crate::domain::Match;

/// Newest first by `created_at`; equal timestamps keep their fetch order
pub fn recency_sort(matches: &mut [Match]) {
    matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// `HH:MM:SS` shortened to `HH:MM`; anything else is returned as is
pub fn trim_seconds(time: &str) -> &str {
    let mut parts = time.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(hours), Some(minutes), Some(_)) => &time[..hours.len() + 1 + minutes.len()],
        _ => time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(id: &str, created_at: &str) -> Match {
        serde_json::from_value(json!({
            "id": id,
            "date": "2024-06-01",
            "player1Id": "p1",
            "player2Id": "p2",
            "winnerId": "p1",
            "createdAt": created_at
        }))
        .unwrap()
    }

    fn ids(matches: &[Match]) -> Vec<&str> {
        matches.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn newest_first_with_stable_ties() {
        let mut matches = vec![
            at("a", "2024-06-01T10:00:00Z"),
            at("b", "2024-06-03T10:00:00Z"),
            at("c", "2024-06-01T10:00:00Z"),
            at("d", "2024-06-02T10:00:00Z"),
        ];

        recency_sort(&mut matches);

        assert_eq!(ids(&matches), ["b", "d", "a", "c"]);
    }

    #[test]
    fn sorting_twice_changes_nothing() {
        let mut matches = vec![
            at("a", "2024-06-01T10:00:00Z"),
            at("b", "2024-06-01T10:00:00Z"),
            at("c", "2024-05-01T10:00:00Z"),
            at("d", "2024-07-01T10:00:00Z"),
        ];

        recency_sort(&mut matches);
        let once = ids(&matches).into_iter().map(String::from).collect::<Vec<_>>();
        recency_sort(&mut matches);

        assert_eq!(ids(&matches), once);
    }

    #[test]
    fn trims_seconds() {
        assert_eq!(trim_seconds("18:30:00"), "18:30");
        assert_eq!(trim_seconds("18:30"), "18:30");
        assert_eq!(trim_seconds(""), "");
    }
}
