pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod pagination;
pub mod services;
pub mod session;
pub mod store;
pub mod views;

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use log::{info, warn};

use crate::api::{ClubClient, MatchFilter};
use crate::cli::{Command, SetScore};
use crate::config::AppConfig;
use crate::domain::{
    AvatarUpload, Credentials, DateRange, MatchDraft, ProfileUpdate, Registration, Roster, TournamentDraft,
    TournamentPrivacy,
};
use crate::errors::with_fetch_context;
use crate::services::{SyncService, report};
use crate::session::{MatchCache, TokenStorage};
use crate::store::ClientStore;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_login(email: &str, password: &str) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (_, sync) = connect()?;
        let profile = sync.login(&Credentials::new(email, password)).await?;
        println!("{}", report::success(&format!("Signed in as {}", profile.full_name())));
        Ok(())
    })
}

pub fn handle_logout() -> Result<()> {
    let (_, sync) = connect()?;
    sync.logout()?;
    println!("{}", report::success("Signed out"));
    Ok(())
}

pub fn handle_register(email: &str, firstname: &str, lastname: &str, password: &str, confirmation: &str) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (_, sync) = connect()?;
        let registration = Registration {
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
            password_confirmation: confirmation.to_string(),
        };
        let confirmation = sync.register(&registration).await?;
        println!("{}", report::success(&confirmation.message));
        Ok(())
    })
}

pub fn handle_verify_email(token: &str) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (_, sync) = connect()?;
        let confirmation = sync.verify_email(token).await?;
        println!("{}", report::success(&confirmation.message));
        Ok(())
    })
}

pub fn handle_reset_password(email: &str) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (_, sync) = connect()?;
        let confirmation = sync.request_password_reset(email).await?;
        println!("{}", report::success(&confirmation.message));
        Ok(())
    })
}

pub fn handle_resend_confirmation(email: &str) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (_, sync) = connect()?;
        let confirmation = sync.resend_confirmation_email(email).await?;
        println!("{}", report::success(&confirmation.message));
        Ok(())
    })
}

pub fn handle_profile() -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (_, sync) = connect()?;
        let profile = with_fetch_context(sync.refresh_own_profile().await, "profile")?;
        println!("{}", report::profile(&profile, today()));
        Ok(())
    })
}

pub fn handle_update_profile(update: ProfileUpdate) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (_, sync) = connect()?;
        let profile = sync.update_profile(&update).await?;
        println!("{}", report::success("Profile updated"));
        println!("{}", report::profile(&profile, today()));
        Ok(())
    })
}

pub fn handle_upload_avatar(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .context("Avatar path has no file name")?;
    let upload = AvatarUpload::new(file_name, bytes);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (_, sync) = connect()?;
        let url = sync.upload_avatar(&upload).await?;
        println!("{}", report::success(&format!("Avatar uploaded to {}", url.0)));
        Ok(())
    })
}

pub fn handle_players() -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (_, sync) = connect()?;
        sync.enter_view();
        with_fetch_context(sync.refresh_players().await, "players")?;

        let rows = views::rank_rows(&sync.store().players(), today());
        println!("{}", report::rank_table("Players", &rows));
        Ok(())
    })
}

pub fn handle_matches(player: Option<&str>, tournament: Option<&str>, page: usize) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (config, sync) = connect()?;
        sync.enter_view();

        let mut filter = MatchFilter::all();
        if let Some(player) = player {
            filter = filter.for_player(player);
        }
        if let Some(tournament) = tournament {
            filter = filter.in_tournament(tournament);
        }

        let (players, matches) = tokio::join!(sync.refresh_players(), sync.refresh_matches(&filter));
        if let Err(e) = players {
            warn!("Player names unavailable: {}", e);
        }
        with_fetch_context(matches, "matches")?;

        let players = sync.store().players();
        let mut matches = sync.store().matches();
        views::recency_sort(&mut matches);

        let page = views::paginate(&matches, page, config.view.page_size);
        println!("{}", report::match_page(&page, &Roster::new(&players)));
        Ok(())
    })
}

pub fn handle_player_matches(tournament: &str, player: &str, page: usize, refresh: bool) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (config, sync) = connect()?;
        sync.enter_view();

        let (players, matches) =
            tokio::join!(sync.refresh_players(), sync.player_matches(tournament, player, refresh));
        if let Err(e) = players {
            warn!("Player names unavailable: {}", e);
        }
        let mut matches = with_fetch_context(matches, "player matches")?;
        views::recency_sort(&mut matches);

        let players = sync.store().players();
        let page = views::paginate(&matches, page, config.view.page_size);
        println!("{}", report::match_page(&page, &Roster::new(&players)));
        Ok(())
    })
}

pub fn handle_tournaments() -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (_, sync) = connect()?;
        sync.enter_view();
        with_fetch_context(sync.refresh_tournaments().await, "tournaments")?;

        println!("{}", report::tournaments(&sync.store().tournaments()));
        Ok(())
    })
}

pub fn handle_tournament(id: &str, page: usize) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (config, sync) = connect()?;
        sync.enter_view();

        let filter = MatchFilter::all().in_tournament(id);
        let (tournament, standings, matches) = tokio::join!(
            sync.tournament(id),
            sync.refresh_tournament_players(id),
            sync.refresh_matches(&filter)
        );
        let tournament = with_fetch_context(tournament, "tournament")?;
        with_fetch_context(standings, "tournament players")?;
        with_fetch_context(matches, "tournament matches")?;

        let standings = sync.store().tournament_players();
        let mut matches = sync.store().matches();
        views::recency_sort(&mut matches);

        println!("{}\n", report::tournament_line(&tournament));
        println!("{}\n", report::rank_table(&tournament.title, &views::rank_rows(&standings, today())));

        let page = views::paginate(&matches, page, config.view.page_size);
        println!("{}", report::match_page(&page, &Roster::new(&standings)));
        Ok(())
    })
}

pub struct MatchInput<'a> {
    pub player: Option<&'a str>,
    pub opponent: &'a str,
    pub court: &'a str,
    pub date: NaiveDate,
    pub time: Option<&'a str>,
    pub tournament: Option<&'a str>,
    pub sets: &'a [SetScore],
}

pub fn handle_submit_match(input: MatchInput<'_>) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (_, sync) = connect()?;

        let player = match input.player {
            Some(player) => player.to_string(),
            None => sync.refresh_own_profile().await?.id,
        };

        let mut draft = MatchDraft::new(&player, input.opponent, input.date).on_court(input.court);
        if let Some(time) = input.time {
            draft = draft.at_time(time);
        }
        if let Some(tournament) = input.tournament {
            draft = draft.in_tournament(tournament);
        }
        for set in input.sets {
            draft = draft.with_set(set.player1, set.player2);
        }

        let saved = sync.submit_match(&draft).await?;
        let players = sync.store().players();

        println!("{}", report::success(&format!("Match {} recorded", saved.id)));
        println!("{}", report::match_card(&saved, &Roster::new(&players)));
        Ok(())
    })
}

pub struct TournamentInput<'a> {
    pub title: &'a str,
    pub info: &'a str,
    pub privacy: TournamentPrivacy,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub participants: &'a [String],
    pub managers: &'a [String],
}

pub fn handle_create_tournament(input: TournamentInput<'_>) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (_, sync) = connect()?;
        let creator = sync.refresh_own_profile().await?;

        let mut draft = TournamentDraft::new(input.title, &creator.id);
        draft.info = input.info.to_string();
        draft.privacy = input.privacy;
        draft.participant_ids = input.participants.to_vec();
        draft.manager_ids = input.managers.to_vec();
        draft.dates = match (input.start, input.end) {
            (Some(start), Some(end)) => Some(DateRange { start, end }),
            (None, None) => None,
            _ => bail!("Tournament dates need both --start and --end"),
        };

        let saved = sync.submit_tournament(&draft).await?;
        println!("{}", report::success("Tournament created"));
        println!("{}", report::tournament_line(&saved));
        Ok(())
    })
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "tennis-club", &mut std::io::stdout());
    Ok(())
}

// --- Helper Methods ---

fn connect() -> Result<(AppConfig, SyncService<ClubClient>)> {
    let config = AppConfig::from_env();
    info!("Using club API at {}", config.api.base_url);

    let client = ClubClient::new(&config.api)?;
    let tokens = TokenStorage::from_settings(&config.session)?;
    let match_cache = MatchCache::new(&config.session.data_dir)?;

    let store = ClientStore::new(config.sync.stale_policy).with_token_storage(tokens);
    store.restore_session()?;

    let sync = SyncService::new(client, store).with_match_cache(match_cache);
    Ok((config, sync))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
