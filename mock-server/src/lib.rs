//! In-process imitation of the leaderboard API.
//!
//! Serves `/api/series.php`, `/api/games.php` and `/api/runs.php` from a
//! fixed set of fixtures. Responses reproduce the upstream quirk of escaping
//! every apostrophe as `\'`, so bodies are not valid JSON until a client
//! repairs them.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Series {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub series_id: i64,
    pub name: String,
    pub short_name: String,
    pub has_gametime: i64,
    pub uses_gametime: i64,
    pub forum: String,
    pub categories: Vec<Category>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub user_level: i64,
    pub country: String,
    pub twitter: String,
    pub twitch: String,
    pub hitbot: String,
    pub youtube: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Run {
    pub id: i64,
    pub runner: Option<String>,
    pub user_id: Option<i64>,
    pub game_id: i64,
    pub category: String,
    pub version: String,
    pub version_detail: Option<String>,
    pub time: i64,
    pub game_time: Option<i64>,
    pub converted_time: i64,
    pub video: String,
    pub verified: i64,
    pub verified_by: String,
    pub notes: String,
    pub submitted_by: String,
    pub rank: i64,
}

/// A run with its game and user inlined, as served for `ex=1`.
#[derive(Serialize)]
struct ExpandedRun<'a> {
    #[serde(flatten)]
    run: &'a Run,
    game: Option<&'a Game>,
    user: Option<&'a User>,
}

#[derive(Default, Serialize)]
struct Envelope<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    series: Option<&'a [Series]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    games: Option<Vec<&'a Game>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    runs: Option<Vec<serde_json::Value>>,
}

/// Everything the server knows about.
#[derive(Clone, Debug, Default)]
pub struct Fixtures {
    pub series: Vec<Series>,
    pub games: Vec<Game>,
    pub users: Vec<User>,
    pub runs: Vec<Run>,
}

fn category(id: i64, name: &str) -> Category {
    Category {
        id,
        name: name.to_string(),
    }
}

fn game(id: i64, series_id: i64, name: &str, short_name: &str, categories: Vec<Category>) -> Game {
    Game {
        id,
        series_id,
        name: name.to_string(),
        short_name: short_name.to_string(),
        has_gametime: 0,
        uses_gametime: 0,
        forum: format!("forum/{short_name}"),
        categories,
    }
}

fn user(id: i64, name: &str, country: &str) -> User {
    User {
        id,
        name: name.to_string(),
        user_level: 1,
        country: country.to_string(),
        twitter: String::new(),
        twitch: name.to_lowercase(),
        hitbot: String::new(),
        youtube: String::new(),
    }
}

fn sample_run(id: i64, game_id: i64, category: &str, time: i64) -> Run {
    Run {
        id,
        runner: None,
        user_id: None,
        game_id,
        category: category.to_string(),
        version: "NES".to_string(),
        version_detail: None,
        time,
        game_time: None,
        converted_time: time,
        video: format!("https://example.com/videos/{id}"),
        verified: 0,
        verified_by: String::new(),
        notes: String::new(),
        submitted_by: String::new(),
        rank: 0,
    }
}

impl Fixtures {
    /// Two series, four games, two users and four runs, one of them
    /// already verified. Several strings contain apostrophes.
    pub fn sample() -> Self {
        let series = vec![
            Series {
                id: 1,
                name: "Classic".to_string(),
            },
            Series {
                id: 2,
                name: "X".to_string(),
            },
        ];

        let mut mmx = game(3, 2, "Mega Man X", "mmx", vec![category(5, "Mega Man X 100%")]);
        mmx.has_gametime = 1;
        mmx.uses_gametime = 1;
        let games = vec![
            game(1, 1, "Mega Man", "mm1", vec![category(1, "Mega Man Any%")]),
            game(
                2,
                1,
                "Mega Man 2",
                "mm2",
                vec![category(3, "Mega Man 2 Any%"), category(4, "Mega Man 2 Buster Only")],
            ),
            mmx,
            game(
                4,
                1,
                "Mega Man: Dr. Wily's Revenge",
                "mmgb1",
                vec![category(6, "Wily's Revenge Any%")],
            ),
        ];

        let users = vec![user(1, "Alice", "us"), user(2, "O'Brien", "ie")];

        let mut alice_run = sample_run(101, 2, "Mega Man 2 Any%", 152_345);
        alice_run.user_id = Some(1);
        alice_run.submitted_by = "Alice".to_string();

        let mut guest_run = sample_run(102, 3, "Mega Man X 100%", 366_000);
        guest_run.runner = Some("Guest Runner".to_string());
        guest_run.version = "SNES".to_string();
        guest_run.version_detail = Some("US 1.1".to_string());
        guest_run.game_time = Some(360_000);
        guest_run.notes = "Didn't use zips".to_string();
        guest_run.submitted_by = "Alice".to_string();

        let mut verified_run = sample_run(103, 4, "Wily's Revenge Any%", 98_765);
        verified_run.user_id = Some(2);
        verified_run.verified = 1;
        verified_run.verified_by = "Alice".to_string();
        verified_run.rank = 1;

        let mut obrien_run = sample_run(104, 1, "Mega Man Any%", 12_345);
        obrien_run.user_id = Some(2);
        obrien_run.notes = "O'Brien's first run".to_string();
        obrien_run.submitted_by = "O'Brien".to_string();

        Self {
            series,
            games,
            users,
            runs: vec![alice_run, guest_run, verified_run, obrien_run],
        }
    }
}

pub type Db = Arc<Fixtures>;

#[derive(Debug, Deserialize)]
pub struct GamesQuery {
    pub game: Option<i64>,
    pub series: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RunsQuery {
    pub ex: Option<i64>,
}

pub fn app() -> Router {
    app_with(Fixtures::sample())
}

pub fn app_with(fixtures: Fixtures) -> Router {
    let db: Db = Arc::new(fixtures);
    Router::new()
        .route("/api/series.php", get(list_series))
        .route("/api/games.php", get(list_games))
        .route("/api/runs.php", get(list_runs))
        .fallback(not_found)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Fixtures::sample()).await
}

pub async fn run_with(listener: TcpListener, fixtures: Fixtures) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(fixtures)).await
}

/// Serialize like the upstream PHP backend: valid JSON, then every
/// apostrophe escaped as `\'`.
pub fn php_json<T: Serialize>(value: &T) -> Response {
    match serde_json::to_string(value) {
        Ok(json) => (
            [(header::CONTENT_TYPE, "application/json")],
            json.replace('\'', "\\'"),
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn list_series(State(db): State<Db>) -> Response {
    tracing::debug!("series.php");
    php_json(&Envelope {
        series: Some(&db.series),
        ..Default::default()
    })
}

async fn list_games(State(db): State<Db>, Query(query): Query<GamesQuery>) -> Response {
    tracing::debug!(?query, "games.php");
    let games = db
        .games
        .iter()
        .filter(|g| query.game.is_none_or(|id| g.id == id))
        .filter(|g| query.series.is_none_or(|id| g.series_id == id))
        .collect();
    php_json(&Envelope {
        games: Some(games),
        ..Default::default()
    })
}

async fn list_runs(State(db): State<Db>, Query(query): Query<RunsQuery>) -> Response {
    tracing::debug!(?query, "runs.php");
    let expanded = query.ex == Some(1);

    let mut runs = Vec::new();
    for run in db.runs.iter().filter(|r| r.verified == 0) {
        let value = if expanded {
            serde_json::to_value(ExpandedRun {
                run,
                game: db.games.iter().find(|g| g.id == run.game_id),
                user: run
                    .user_id
                    .and_then(|id| db.users.iter().find(|u| u.id == id)),
            })
        } else {
            serde_json::to_value(run)
        };
        match value {
            Ok(value) => runs.push(value),
            Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        }
    }

    php_json(&Envelope {
        runs: Some(runs),
        ..Default::default()
    })
}

async fn not_found() -> (StatusCode, [(header::HeaderName, &'static str); 1], &'static str) {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/html")],
        "<html><body><h1>404 Not Found</h1></body></html>",
    )
}
