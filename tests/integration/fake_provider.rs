//! Fake Odds API for integration testing.
//!
//! Serves canned `/sports/{sport}/odds` responses on a loopback port so
//! the real `OddsGateway` can be exercised end to end.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

pub const API_KEY: &str = "test-key";

/// Sport that never answers within the gateway timeout used in tests.
pub const SLOW_SPORT: &str = "tennis_slow";

/// Start the fake provider and return its base URL.
pub async fn spawn() -> String {
    let app = Router::new().route("/sports/:sport/odds", get(odds));

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

async fn odds(Path(sport): Path<String>, Query(params): Query<HashMap<String, String>>) -> Response {
    let expected = [
        ("apiKey", API_KEY),
        ("regions", "us"),
        ("markets", "h2h"),
        ("oddsFormat", "decimal"),
    ];
    for (key, value) in expected {
        if params.get(key).map(String::as_str) != Some(value) {
            return (StatusCode::UNAUTHORIZED, format!("bad {key}")).into_response();
        }
    }

    match sport.as_str() {
        "basketball_nba" => Json(json!([
            {
                "id": "nba-1",
                "sport_key": "basketball_nba",
                "commence_time": "2026-10-21T23:30:00Z",
                "home_team": "Boston Celtics",
                "away_team": "New York Knicks",
                "bookmakers": [{
                    "key": "draftkings",
                    "markets": [{
                        "key": "h2h",
                        "outcomes": [
                            { "name": "Boston Celtics", "price": 1.80 },
                            { "name": "New York Knicks", "price": 2.00 }
                        ]
                    }]
                }]
            },
            {
                "id": "nba-2",
                "sport_key": "basketball_nba",
                "commence_time": "2026-10-22T02:00:00Z",
                "home_team": "Los Angeles Lakers",
                "away_team": "Golden State Warriors",
                "bookmakers": []
            }
        ]))
        .into_response(),
        "baseball_mlb" => Json(json!([
            {
                "id": "mlb-1",
                "commence_time": "2026-10-23T00:05:00Z",
                "home_team": "Los Angeles Dodgers",
                "away_team": "New York Yankees",
                "bookmakers": [{
                    "key": "fanduel",
                    "markets": [{ "key": "h2h", "outcomes": [{ "name": "Dodgers", "price": "off" }] }]
                }]
            }
        ]))
        .into_response(),
        "soccer_epl" => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        "garbled" => (StatusCode::OK, "<html>maintenance</html>").into_response(),
        SLOW_SPORT => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!([{ "id": "late", "home_team": "A", "away_team": "B" }])).into_response()
        }
        _ => (StatusCode::NOT_FOUND, "Unknown sport").into_response(),
    }
}
