use std::time::Duration;

use chrono::NaiveDate;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tennis_club::api::{ClubClient, MatchFilter};
use tennis_club::config::ApiSettings;
use tennis_club::domain::{Credentials, MatchDraft, SessionToken, Winner};
use tennis_club::errors::GatewayError;
use tennis_club::services::SyncService;
use tennis_club::session::{MatchCache, TokenStorage};
use tennis_club::store::{ClientStore, Phase, StalePolicy};

struct Harness {
    server: MockServer,
    sync: SyncService<ClubClient>,
    tokens: TokenStorage,
    _dir: TempDir,
}

async fn harness(policy: StalePolicy) -> Harness {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let settings = ApiSettings {
        base_url: server.uri(),
        timeout_secs: 5,
        ..ApiSettings::default()
    };
    let client = ClubClient::new(&settings).unwrap();
    let tokens = TokenStorage::new(dir.path(), "token").unwrap();
    let store = ClientStore::new(policy).with_token_storage(tokens.clone());
    let sync = SyncService::new(client, store).with_match_cache(MatchCache::new(dir.path()).unwrap());

    Harness {
        server,
        sync,
        tokens,
        _dir: dir,
    }
}

async fn signed_in(policy: StalePolicy) -> Harness {
    let h = harness(policy).await;
    h.sync.store().establish_session(SessionToken::new("jwt-1")).unwrap();
    h
}

fn player(id: &str, firstname: &str, lastname: &str) -> Value {
    json!({ "id": id, "email": format!("{}@club.test", id), "firstname": firstname, "lastname": lastname })
}

fn match_json(id: &str, winner: &str) -> Value {
    json!({
        "id": id,
        "court": "Court 1",
        "date": "2024-06-01",
        "time": "18:30:00",
        "player1Id": "p1",
        "player2Id": "p2",
        "score": [{ "player1Id": "p1", "player1Score": 6, "player2Id": "p2", "player2Score": 2 }],
        "winnerId": winner,
        "createdAt": "2024-06-01T19:45:00Z",
        "player1RatingChange": 12,
        "player2RatingChange": -12
    })
}

fn envelope(data: Value) -> Value {
    json!({ "code": 200, "message": "OK", "data": data })
}

fn draft() -> MatchDraft {
    MatchDraft::new("p1", "p2", NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).on_court("Court 1")
}

fn match_ids(h: &Harness) -> Vec<String> {
    h.sync.store().matches().into_iter().map(|m| m.id).collect()
}

#[tokio::test]
async fn submitted_match_is_appended_and_stats_refetched() {
    let h = signed_in(StalePolicy::default()).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/match/save"))
        .and(header("authorization", "Bearer jwt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(match_json("m1", "p1"))))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/player/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            player("p1", "Ana", "Ivanovic"),
            player("p2", "Serena", "Williams")
        ])))
        .expect(1)
        .mount(&h.server)
        .await;

    let draft = draft().with_set(6, 2);
    let saved = h.sync.submit_match(&draft).await.unwrap();

    assert_eq!(saved.winner_id, Winner::Player("p1".to_string()));
    assert_eq!(saved.winner_id, draft.projected_winner());
    assert_eq!(match_ids(&h), ["m1"]);
    assert_eq!(h.sync.store().players().len(), 2);
}

#[tokio::test]
async fn tournament_match_also_refetches_tournament_players() {
    let h = signed_in(StalePolicy::default()).await;

    let mut saved = match_json("m1", "p1");
    saved["tournamentId"] = json!("t1");
    Mock::given(method("POST"))
        .and(path("/api/v1/match/save"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(saved)))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/player/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tournament-player/t1/players"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "tp1", "playerId": "p1", "firstname": "Ana", "lastname": "Ivanovic", "rank": 1, "win": 1 }
        ])))
        .expect(1)
        .mount(&h.server)
        .await;

    h.sync.submit_match(&draft().in_tournament("t1").with_set(6, 2)).await.unwrap();

    let state = h.sync.store().snapshot();
    assert_eq!(state.tournament_players.items().len(), 1);
    assert_eq!(state.tournament_players_of.as_deref(), Some("t1"));
}

#[tokio::test]
async fn blank_set_is_rejected_before_any_request() {
    let h = signed_in(StalePolicy::default()).await;

    let err = h.sync.submit_match(&draft().with_set(0, 0)).await.unwrap_err();

    match err {
        GatewayError::Validation { fields, .. } => {
            assert_eq!(fields.get("score").map(String::as_str), Some("All sets must have valid scores"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(h.server.received_requests().await.unwrap().is_empty());
    assert!(h.sync.store().is_authenticated());
}

#[tokio::test]
async fn server_rejection_keeps_session_and_message() {
    let h = signed_in(StalePolicy::default()).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/match/save"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1021, "message": "Match date cannot be in the future", "data": null
        })))
        .mount(&h.server)
        .await;

    let err = h.sync.submit_match(&draft().with_set(6, 2)).await.unwrap_err();

    assert_eq!(err.to_string(), "Match date cannot be in the future");
    assert_eq!(err.code(), Some(1021));
    assert!(h.sync.store().is_authenticated());
    assert!(match_ids(&h).is_empty());
}

#[tokio::test]
async fn auth_failure_from_any_call_ends_the_session() {
    for call in ["profile", "tournament-players", "submit-match", "players"] {
        let h = signed_in(StalePolicy::default()).await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(401))
            .mount(&h.server)
            .await;
        assert!(h.tokens.is_present());

        let err = match call {
            "profile" => h.sync.refresh_own_profile().await.map(|_| ()).unwrap_err(),
            "tournament-players" => h.sync.refresh_tournament_players("t1").await.unwrap_err(),
            "submit-match" => h.sync.submit_match(&draft().with_set(6, 2)).await.map(|_| ()).unwrap_err(),
            _ => h.sync.refresh_players().await.unwrap_err(),
        };

        assert!(err.is_auth(), "{}: {:?}", call, err);
        assert!(!h.sync.store().is_authenticated(), "{}", call);
        assert_eq!(h.sync.store().token(), None, "{}", call);
        assert!(!h.tokens.is_present(), "{}", call);
    }
}

#[tokio::test]
async fn session_call_without_token_is_auth_error() {
    let h = harness(StalePolicy::default()).await;

    let err = h.sync.refresh_own_profile().await.unwrap_err();

    assert!(err.is_auth());
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn login_persists_token_and_loads_profile() {
    let h = harness(StalePolicy::default()).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!("jwt-2"))))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/player/profile"))
        .and(header("authorization", "Bearer jwt-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(player("p1", "Ana", "Ivanovic")))
        .mount(&h.server)
        .await;

    let profile = h.sync.login(&Credentials::new("p1@club.test", "secret")).await.unwrap();

    assert_eq!(profile.firstname, "Ana");
    assert!(h.sync.store().is_authenticated());
    assert_eq!(h.tokens.load().unwrap(), Some(SessionToken::new("jwt-2")));
    assert_eq!(h.sync.store().logged_in_profile().map(|p| p.id), Some("p1".to_string()));
}

#[tokio::test]
async fn rejected_login_is_auth_error() {
    let h = harness(StalePolicy::default()).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1003, "message": "Invalid email or password", "data": null
        })))
        .mount(&h.server)
        .await;

    let err = h.sync.login(&Credentials::new("p1@club.test", "wrong")).await.unwrap_err();
    let gateway = err.downcast_ref::<GatewayError>().unwrap();

    assert!(gateway.is_auth());
    assert_eq!(gateway.to_string(), "Invalid email or password");
    assert!(!h.tokens.is_present());
}

#[tokio::test]
async fn failed_refresh_keeps_previous_items() {
    let h = harness(StalePolicy::default()).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/match/matches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([match_json("m1", "p1")])))
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/match/matches"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.server)
        .await;

    h.sync.refresh_matches(&MatchFilter::all()).await.unwrap();
    let err = h.sync.refresh_matches(&MatchFilter::all()).await.unwrap_err();

    assert!(matches!(err, GatewayError::Unexpected { .. }));
    let state = h.sync.store().snapshot();
    assert!(state.matches.phase().error().is_some());
    assert_eq!(match_ids(&h), ["m1"]);
}

#[tokio::test]
async fn slower_earlier_fetch_overwrites_faster_later_one() {
    let h = harness(StalePolicy::LastCompletedWins).await;
    mount_race(&h.server).await;

    let slow = MatchFilter::all().for_player("a");
    let fast = MatchFilter::all().for_player("b");

    let (a, b) = tokio::join!(h.sync.refresh_matches(&slow), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let result = h.sync.refresh_matches(&fast).await;

        let state = h.sync.store().snapshot();
        assert_eq!(state.matches.items()[0].id, "b-match");
        assert_eq!(state.matches.phase(), &Phase::Loaded);
        result
    });
    a.unwrap();
    b.unwrap();

    let state = h.sync.store().snapshot();
    assert_eq!(match_ids(&h), ["a-match"]);
    assert_eq!(state.matches.phase(), &Phase::Loaded);
}

#[tokio::test]
async fn discard_stale_keeps_the_newer_fetch() {
    let h = harness(StalePolicy::DiscardStale).await;
    mount_race(&h.server).await;

    let slow = MatchFilter::all().for_player("a");
    let fast = MatchFilter::all().for_player("b");

    let (a, b) = tokio::join!(h.sync.refresh_matches(&slow), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        h.sync.refresh_matches(&fast).await
    });
    a.unwrap();
    b.unwrap();

    assert_eq!(match_ids(&h), ["b-match"]);
    assert_eq!(h.sync.store().snapshot().matches.phase(), &Phase::Loaded);
}

async fn mount_race(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/match/matches"))
        .and(query_param("playerId", "a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([match_json("a-match", "p1")]))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/match/matches"))
        .and(query_param("playerId", "b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([match_json("b-match", "p2")])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn leaving_a_view_cancels_its_fetches() {
    let h = harness(StalePolicy::default()).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/player/profiles"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([player("p1", "Ana", "Ivanovic")]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&h.server)
        .await;

    h.sync.enter_view();
    let (result, _) = tokio::join!(h.sync.refresh_players(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        h.sync.enter_view();
    });

    assert_eq!(result.unwrap_err(), GatewayError::Cancelled);
    let state = h.sync.store().snapshot();
    assert_eq!(state.players.phase(), &Phase::Idle);
    assert!(state.players.items().is_empty());
}

#[tokio::test]
async fn player_matches_are_served_from_cache_until_refresh() {
    let h = harness(StalePolicy::default()).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/match/matches"))
        .and(query_param("tournamentId", "t1"))
        .and(query_param("playerId", "p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([match_json("m1", "p1")])))
        .expect(2)
        .mount(&h.server)
        .await;

    let first = h.sync.player_matches("t1", "p1", false).await.unwrap();
    let cached = h.sync.player_matches("t1", "p1", false).await.unwrap();
    let refreshed = h.sync.player_matches("t1", "p1", true).await.unwrap();

    assert_eq!(first, cached);
    assert_eq!(refreshed.len(), 1);
}

fn sync_against(base_url: &str, timeout_secs: u64) -> SyncService<ClubClient> {
    let settings = ApiSettings {
        base_url: base_url.to_string(),
        timeout_secs,
        ..ApiSettings::default()
    };
    SyncService::new(ClubClient::new(&settings).unwrap(), ClientStore::new(StalePolicy::default()))
}

#[tokio::test]
async fn timed_out_refresh_is_retriable_and_keeps_items() {
    let server = MockServer::start().await;
    let sync = sync_against(&server.uri(), 1);

    Mock::given(method("GET"))
        .and(path("/api/v1/player/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([player("p1", "Ana", "Ivanovic")])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/player/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    sync.refresh_players().await.unwrap();
    let err = sync.refresh_players().await.unwrap_err();

    assert!(matches!(err, GatewayError::Network { .. }));
    assert!(err.is_retriable());
    let state = sync.store().snapshot();
    assert!(state.players.phase().error().is_some());
    assert_eq!(state.players.items()[0].id, "p1");
}

#[tokio::test]
async fn refused_connection_is_retriable() {
    let sync = sync_against("http://127.0.0.1:1", 2);

    let err = sync.refresh_players().await.unwrap_err();

    assert!(matches!(err, GatewayError::Network { .. }));
    assert!(err.is_retriable());
    assert!(sync.store().snapshot().players.phase().error().is_some());
}
