use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::domain::TournamentPrivacy;

#[derive(Parser, Debug)]
#[command(author, version, about = "tennis club client", name = "tennis-club")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

/// Games won by each side in one set, written `6-2`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetScore {
    pub player1: u32,
    pub player2: u32,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Sign in and remember the session
    Login {
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Create an account
    Register {
        email: String,
        #[arg(long)]
        firstname: String,
        #[arg(long)]
        lastname: String,
        #[arg(long)]
        password: String,
        /// Must repeat the password
        #[arg(long)]
        confirm_password: String,
    },
    /// Confirm an email address with the token from the confirmation mail
    VerifyEmail { token: String },
    /// Ask for a password reset mail
    ResetPassword { email: String },
    /// Send the confirmation mail again
    ResendConfirmation { email: String },
    /// Show the signed-in player's profile
    Profile,
    /// Change the signed-in player's details
    UpdateProfile {
        #[arg(long)]
        firstname: String,
        #[arg(long)]
        lastname: String,
        #[arg(long)]
        gender: Option<String>,
        /// Date of birth, YYYY-MM-DD
        #[arg(long)]
        dob: Option<NaiveDate>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long)]
        weight: Option<f64>,
    },
    /// Upload a profile photo (jpg, png or heic)
    UploadAvatar { path: PathBuf },
    /// Club ranking of all players
    Players,
    /// Recent matches, newest first
    Matches {
        #[arg(long)]
        player: Option<String>,
        #[arg(long)]
        tournament: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// One player's matches in a tournament
    PlayerMatches {
        #[arg(long)]
        tournament: String,
        #[arg(long)]
        player: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Skip the local match cache
        #[arg(long)]
        refresh: bool,
    },
    /// List tournaments
    Tournaments,
    /// Ranking table and recent matches of one tournament
    Tournament {
        id: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Record a match result
    SubmitMatch {
        /// Opponent player id
        #[arg(long)]
        opponent: String,
        /// First player id; defaults to the signed-in player
        #[arg(long)]
        player: Option<String>,
        #[arg(long)]
        court: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// HH:MM
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        tournament: Option<String>,
        /// Set score as `6-2`; repeat once per set
        #[arg(long = "set", value_parser = parse_set, required = true)]
        sets: Vec<SetScore>,
    },
    /// Create a tournament owned by the signed-in player
    CreateTournament {
        title: String,
        #[arg(long, default_value = "")]
        info: String,
        /// public, members-private, private or user-network
        #[arg(long, default_value = "public")]
        privacy: TournamentPrivacy,
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
        /// Participant player id; repeatable
        #[arg(long = "participant")]
        participants: Vec<String>,
        /// Manager player id; repeatable
        #[arg(long = "manager")]
        managers: Vec<String>,
    },
    /// Print a shell completion script
    Completions { shell: Shell },
}

fn parse_set(raw: &str) -> Result<SetScore, String> {
    let (left, right) = raw
        .split_once('-')
        .ok_or_else(|| format!("expected a set like 6-2, got {}", raw))?;
    let games = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid games count: {}", s))
    };

    Ok(SetScore {
        player1: games(left)?,
        player2: games(right)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_set_scores() {
        assert_eq!(parse_set("6-2"), Ok(SetScore { player1: 6, player2: 2 }));
        assert_eq!(parse_set(" 7 - 6 "), Ok(SetScore { player1: 7, player2: 6 }));
        assert!(parse_set("6:2").is_err());
        assert!(parse_set("six-2").is_err());
    }

    #[test]
    fn submit_match_collects_every_set() {
        let cli = Cli::try_parse_from([
            "tennis-club",
            "submit-match",
            "--opponent",
            "p2",
            "--court",
            "Court 1",
            "--date",
            "2024-06-01",
            "--set",
            "6-2",
            "--set",
            "3-6",
        ])
        .unwrap();

        match cli.command {
            Command::SubmitMatch { sets, player, .. } => {
                assert_eq!(sets.len(), 2);
                assert_eq!(player, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn tournament_dates_come_in_pairs() {
        let result = Cli::try_parse_from(["tennis-club", "create-tournament", "Open", "--start", "2024-06-01"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
