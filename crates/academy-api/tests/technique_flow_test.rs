//! Integration tests for virtual technique training.

mod common;

use axum::http::StatusCode;
use serde_json::json;

fn start_body(technique: &str) -> serde_json::Value {
    json!({
        "user": common::candidate(),
        "technique": technique,
        "narration": { "voices": [
            { "name": "Alex", "lang": "en-US" },
            { "name": "Samantha", "lang": "en-US" }
        ] }
    })
}

#[tokio::test]
async fn test_technique_round_trip_records_each_step_duration() {
    let app = common::build_test_app();

    // POST /api/v1/sessions/techniques
    let (status, json) =
        common::post_json(&app.router, "/api/v1/sessions/techniques", &start_body("Long Layers"))
            .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = json["session"]["session_id"].as_str().unwrap().to_owned();
    assert_eq!(json["session"]["routine_id"], "long-layers");
    assert_eq!(json["session"]["step_count"], 4);
    assert_eq!(json["narration_commands"][1]["voice"], "Samantha");

    // Walk A, B, back to A, B again, C, D.
    app.clock.advance_millis(2000);
    common::request(&app.router, "POST", &format!("/api/v1/sessions/{id}/next")).await;
    app.clock.advance_millis(500);
    let (_, json) =
        common::request(&app.router, "POST", &format!("/api/v1/sessions/{id}/prev")).await;
    assert_eq!(json["step"]["position"], 0);
    assert_eq!(json["session"]["step_timings"], json!([2000]));
    for millis in [1000, 1500, 3000, 2500] {
        app.clock.advance_millis(millis);
        common::request(&app.router, "POST", &format!("/api/v1/sessions/{id}/next")).await;
    }

    // GET /api/v1/sessions/{id} shows the completion screen.
    let (status, json) = common::get_json(&app.router, &format!("/api/v1/sessions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["session"]["status"], "completed");
    assert_eq!(json["completion"]["persisted"], true);
    assert_eq!(json["completion"]["record"]["kind"], "technique");
    assert_eq!(
        json["completion"]["record"]["step_timings"],
        json!([2000, 1000, 1500, 3000, 2500])
    );
    assert_eq!(json["completion"]["record"]["total_time_ms"], 10_000);

    let saved = app.records.saved_techniques();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].user_id, "u-7");
    assert_eq!(saved[0].technique_id, "long-layers");

    // Further navigation after completion changes nothing.
    let (_, json) =
        common::request(&app.router, "POST", &format!("/api/v1/sessions/{id}/next")).await;
    assert_eq!(json["step"]["outcome"], "unchanged");
    assert_eq!(app.records.saved_techniques().len(), 1);
}

#[tokio::test]
async fn test_abort_at_second_of_four_steps_keeps_one_timing() {
    let app = common::build_test_app();
    let (_, json) =
        common::post_json(&app.router, "/api/v1/sessions/techniques", &start_body("skin-fade"))
            .await;
    let id = json["session"]["session_id"].as_str().unwrap().to_owned();

    app.clock.advance_millis(4000);
    common::request(&app.router, "POST", &format!("/api/v1/sessions/{id}/next")).await;
    app.clock.advance_millis(9000);
    let (status, json) =
        common::request(&app.router, "POST", &format!("/api/v1/sessions/{id}/abort")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["session"]["status"], "aborted");
    assert_eq!(json["session"]["position"], 1);
    assert_eq!(json["session"]["step_timings"], json!([4000]));
    assert!(json.get("completion").is_none());
    assert!(app.records.saved_techniques().is_empty());

    // DELETE dismisses the screen.
    let (status, _) =
        common::request(&app.router, "DELETE", &format!("/api/v1/sessions/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, json) = common::get_json(&app.router, &format!("/api/v1/sessions/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "session_not_found");
}

#[tokio::test]
async fn test_narration_controls_follow_the_state_machine() {
    let app = common::build_test_app();
    let (_, json) =
        common::post_json(&app.router, "/api/v1/sessions/techniques", &start_body("classic-bob"))
            .await;
    let id = json["session"]["session_id"].as_str().unwrap().to_owned();
    let utterance = json["narration_commands"][1]["utterance"].as_u64().unwrap();
    let narration = |action: &str| format!("/api/v1/sessions/{id}/narration/{action}");

    let (_, json) = common::request(&app.router, "POST", &narration("toggle")).await;
    assert_eq!(json["session"]["narration"], "paused");
    assert_eq!(json["narration_commands"], json!([{ "command": "pause" }]));

    let (_, json) = common::request(&app.router, "POST", &narration("toggle")).await;
    assert_eq!(json["session"]["narration"], "speaking");

    let (_, json) = common::request(
        &app.router,
        "POST",
        &format!("{}?utterance={utterance}", narration("finished")),
    )
    .await;
    assert_eq!(json["session"]["narration"], "idle");

    let (_, json) = common::request(&app.router, "POST", &narration("mute")).await;
    assert_eq!(json["session"]["narration"], "muted");

    let (_, json) = common::request(&app.router, "POST", &narration("replay")).await;
    assert_eq!(json["narration_commands"], json!([]));

    let (_, json) = common::request(&app.router, "POST", &narration("unmute")).await;
    assert_eq!(json["session"]["narration"], "idle");

    let (_, json) = common::request(&app.router, "POST", &narration("replay")).await;
    assert_eq!(json["session"]["narration"], "speaking");
    let commands = json["narration_commands"].as_array().unwrap();
    assert_eq!(commands[0]["command"], "cancel");
    assert_eq!(commands[1]["command"], "speak");

    // Commands are delivered once.
    let (status, json) = common::get_json(&app.router, &narration("commands")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn test_session_without_speech_synthesis_disables_narration() {
    let app = common::build_test_app();
    let body = json!({ "user": common::candidate(), "technique": "classic-bob" });

    let (status, json) =
        common::post_json(&app.router, "/api/v1/sessions/techniques", &body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["session"]["narration_available"], false);

    let id = json["session"]["session_id"].as_str().unwrap();
    let (status, json) = common::request(
        &app.router,
        "POST",
        &format!("/api/v1/sessions/{id}/narration/toggle"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["session"]["narration"], "idle");
}

#[tokio::test]
async fn test_technique_without_steps_is_unavailable() {
    let app = common::build_test_app();

    let (status, json) =
        common::post_json(&app.router, "/api/v1/sessions/techniques", &start_body("balayage"))
            .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "routine_unavailable");
}
