//! Placing and listing bets through the HTTP API.

use rust_decimal_macros::dec;
use serde_json::{json, Value};

use betdesk::config::FeeConfig;

use crate::TestApp;

fn bet_body(event_id: &str, stake: Value) -> Value {
    json!({
        "eventId": event_id,
        "teamA": "Al Ahly",
        "teamB": "Zamalek",
        "sport": "soccer_egypt_premier_league",
        "odds": 1.85,
        "stake": stake
    })
}

#[tokio::test]
async fn test_place_then_list() {
    let app = TestApp::offline().await;

    let (status, placed) = app.post_json("/bets", &bet_body("evt-1", json!(100))).await;
    assert_eq!(status, 201);
    assert_eq!(placed["success"], true);
    assert_eq!(placed["stake"].as_f64(), Some(100.0));
    assert_eq!(placed["placementFee"].as_f64(), Some(2.0));
    assert_eq!(placed["totalCharged"].as_f64(), Some(102.0));

    let (status, bets) = app.get("/bets").await;
    assert_eq!(status, 200);
    let bets = bets.as_array().unwrap();
    assert_eq!(bets.len(), 1);

    let bet = &bets[0];
    assert_eq!(bet["id"], placed["id"]);
    assert_eq!(bet["eventId"], "evt-1");
    assert_eq!(bet["teamA"], "Al Ahly");
    assert_eq!(bet["teamB"], "Zamalek");
    assert_eq!(bet["sport"], "soccer_egypt_premier_league");
    assert_eq!(bet["odds"].as_f64(), Some(1.85));
    assert_eq!(bet["placementFee"].as_f64(), Some(2.0));
    assert_eq!(bet["totalCharged"].as_f64(), Some(102.0));
    assert_eq!(bet["winFeeRate"].as_f64(), Some(0.05));
    assert_eq!(bet["vipXp"], 1);
    assert_eq!(bet["vipMultiplier"].as_f64(), Some(1.0));
    assert_eq!(bet["status"], "pending");
    assert_eq!(bet["createdAt"], placed["createdAt"]);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let app = TestApp::offline().await;
    let mut ids = Vec::new();
    for i in 0..4 {
        let (status, placed) = app
            .post_json("/bets", &bet_body(&format!("evt-{i}"), json!(10 + i)))
            .await;
        assert_eq!(status, 201);
        ids.push(placed["id"].as_str().unwrap().to_string());
    }

    let (_, bets) = app.get("/bets").await;
    let listed: Vec<&str> = bets
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    ids.reverse();
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn test_repeated_list_is_identical() {
    let app = TestApp::offline().await;
    app.post_json("/bets", &bet_body("evt-a", json!("12.5"))).await;
    app.post_json("/bets", &bet_body("evt-b", json!(7))).await;

    let (_, first) = app.get("/bets").await;
    let (_, second) = app.get("/bets").await;
    assert_eq!(first, second);
    assert_eq!(first.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_requests_create_nothing() {
    let app = TestApp::offline().await;

    let mut missing_sport = bet_body("evt-1", json!(100));
    missing_sport.as_object_mut().unwrap().remove("sport");

    let cases = vec![
        missing_sport,
        bet_body("", json!(100)),
        bet_body("evt-1", json!(0)),
        bet_body("evt-1", json!(-3.5)),
        bet_body("evt-1", json!("ten")),
        bet_body("evt-1", json!([1])),
        bet_body("evt-1", json!(0.001)),
        bet_body("evt-1", json!(0.005)),
        bet_body("evt-1", json!(1e30)),
        json!("just a string"),
    ];

    for body in cases {
        let (status, err) = app.post_json("/bets", &body).await;
        assert_eq!(status, 400, "body={body}");
        assert!(err["error"].is_string());
        assert!(err["message"].is_string());
    }

    assert_eq!(app.state.store.count().await.unwrap(), 0);
    let (_, bets) = app.get("/bets").await;
    assert_eq!(bets, json!([]));
}

#[tokio::test]
async fn test_configured_rates_are_snapshotted() {
    let app = TestApp::new(
        "http://127.0.0.1:9",
        FeeConfig {
            placement_rate: dec!(0.10),
            win_fee_rate: dec!(0.07),
        },
    )
    .await;

    let (status, placed) = app.post_json("/bets", &bet_body("evt-1", json!(55.55))).await;
    assert_eq!(status, 201);
    // 55.55 * 0.10 = 5.555 -> 5.56
    assert_eq!(placed["placementFee"].as_f64(), Some(5.56));
    assert_eq!(placed["totalCharged"].as_f64(), Some(61.11));
    assert_eq!(placed["winFeeRate"].as_f64(), Some(0.07));

    // Rates are stored on the bet itself.
    let stored = app.state.store.list().await.unwrap();
    assert_eq!(stored[0].placement_fee, dec!(5.56));
    assert_eq!(stored[0].win_fee_rate, dec!(0.07));
}

#[tokio::test]
async fn test_vip_fields_are_stored() {
    let app = TestApp::offline().await;
    let mut body = bet_body("evt-vip", json!(20));
    body["vipXp"] = json!(5);
    body["vipMultiplier"] = json!(1.25);
    body["odds"] = Value::Null;

    let (status, placed) = app.post_json("/bets", &body).await;
    assert_eq!(status, 201);
    assert_eq!(placed["vipXp"], 5);
    assert_eq!(placed["vipMultiplier"].as_f64(), Some(1.25));

    let (_, bets) = app.get("/bets").await;
    assert!(bets[0]["odds"].is_null());
    assert_eq!(bets[0]["vipXp"], 5);
}

#[tokio::test]
async fn test_storage_failure_is_server_error() {
    let app = TestApp::offline().await;
    app.state.store.close().await;

    let (status, err) = app.post_json("/bets", &bet_body("evt-1", json!(10))).await;
    assert_eq!(status, 500);
    assert_eq!(err["error"], "internal_error");

    let (status, _) = app.get("/bets").await;
    assert_eq!(status, 500);
}

#[tokio::test]
async fn test_stake_errors_explain_the_limit() {
    let app = TestApp::offline().await;

    let (status, err) = app.post_json("/bets", &bet_body("evt-1", json!(0.001))).await;
    assert_eq!(status, 400);
    assert_eq!(err["error"], "invalid_stake");
    assert_eq!(err["message"], "Stake must be a whole number of cents");

    let (status, err) = app.post_json("/bets", &bet_body("evt-1", json!(1e30))).await;
    assert_eq!(status, 400);
    assert_eq!(err["error"], "invalid_stake");
    assert_eq!(err["message"], "Stake too large");

    assert_eq!(app.state.store.count().await.unwrap(), 0);
}
