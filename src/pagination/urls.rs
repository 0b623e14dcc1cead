use urlencoding::encode;

/// Append `key=value` pairs to a path, skipping absent values
pub fn build_query_url(base_url: &str, params: &[(&str, Option<String>)]) -> String {
    let mut url = base_url.to_string();

    for (key, value) in params {
        if let Some(value) = value {
            let separator = determine_separator(&url);
            url.push(separator);
            url.push_str(key);
            url.push('=');
            url.push_str(&encode(value));
        }
    }

    url
}

fn determine_separator(url: &str) -> char {
    if url.contains('?') { '&' } else { '?' }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_absent_params() {
        let url = build_query_url(
            "/api/v1/match/matches",
            &[
                ("playerId", None),
                ("tournamentId", Some("t1".to_string())),
                ("page", Some("2".to_string())),
            ],
        );
        assert_eq!(url, "/api/v1/match/matches?tournamentId=t1&page=2");
    }

    #[test]
    fn encodes_values() {
        let url = build_query_url("/api/v1/auth/verify-email", &[("token", Some("a b&c".to_string()))]);
        assert_eq!(url, "/api/v1/auth/verify-email?token=a%20b%26c");
    }

    #[test]
    fn keeps_existing_query() {
        let url = build_query_url("/x?a=1", &[("b", Some("2".to_string()))]);
        assert_eq!(url, "/x?a=1&b=2");
    }
}
