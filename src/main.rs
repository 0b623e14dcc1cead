use anyhow::Result;

use tennis_club::cli::Command;
use tennis_club::domain::ProfileUpdate;
use tennis_club::errors::GatewayError;
use tennis_club::services::report;
use tennis_club::{
    MatchInput, TournamentInput, handle_completions, handle_create_tournament, handle_login, handle_logout,
    handle_matches, handle_player_matches, handle_players, handle_profile, handle_register, handle_resend_confirmation,
    handle_reset_password, handle_submit_match, handle_tournament, handle_tournaments, handle_update_profile,
    handle_upload_avatar, handle_verify_email, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        match e.downcast_ref::<GatewayError>() {
            Some(failure) => eprintln!("{}", report::failure(failure)),
            None => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Login { email, password } => handle_login(email, password),
        Command::Logout => handle_logout(),
        Command::Register {
            email,
            firstname,
            lastname,
            password,
            confirm_password,
        } => handle_register(email, firstname, lastname, password, confirm_password),
        Command::VerifyEmail { token } => handle_verify_email(token),
        Command::ResetPassword { email } => handle_reset_password(email),
        Command::ResendConfirmation { email } => handle_resend_confirmation(email),
        Command::Profile => handle_profile(),
        Command::UpdateProfile {
            firstname,
            lastname,
            gender,
            dob,
            height,
            weight,
        } => handle_update_profile(ProfileUpdate {
            firstname: firstname.clone(),
            lastname: lastname.clone(),
            gender: gender.clone(),
            dob: *dob,
            height_cm: *height,
            weight_kg: *weight,
        }),
        Command::UploadAvatar { path } => handle_upload_avatar(path),
        Command::Players => handle_players(),
        Command::Matches { player, tournament, page } => {
            handle_matches(player.as_deref(), tournament.as_deref(), *page)
        }
        Command::PlayerMatches {
            tournament,
            player,
            page,
            refresh,
        } => handle_player_matches(tournament, player, *page, *refresh),
        Command::Tournaments => handle_tournaments(),
        Command::Tournament { id, page } => handle_tournament(id, *page),
        Command::SubmitMatch {
            opponent,
            player,
            court,
            date,
            time,
            tournament,
            sets,
        } => handle_submit_match(MatchInput {
            player: player.as_deref(),
            opponent,
            court,
            date: *date,
            time: time.as_deref(),
            tournament: tournament.as_deref(),
            sets,
        }),
        Command::CreateTournament {
            title,
            info,
            privacy,
            start,
            end,
            participants,
            managers,
        } => handle_create_tournament(TournamentInput {
            title,
            info,
            privacy: *privacy,
            start: *start,
            end: *end,
            participants,
            managers,
        }),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
