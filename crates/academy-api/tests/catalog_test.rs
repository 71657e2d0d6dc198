//! Integration tests for health and catalog browsing.

mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_health_check() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(&app.router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["catalog"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_catalog_lists_techniques_and_services() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(&app.router, "/api/v1/catalog").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = json["routines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"classic-bob"));
    assert!(ids.contains(&"beard-trim"));

    let (_, json) = common::get_json(&app.router, "/api/v1/catalog?kind=technique").await;
    let balayage = json["routines"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["id"] == "balayage")
        .unwrap();
    assert_eq!(balayage["step_count"], 0);
}

#[tokio::test]
async fn test_catalog_entry_carries_step_media() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(&app.router, "/api/v1/catalog/classic-bob").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Classic Bob");
    assert_eq!(json["steps"][0]["title"], "Consultation and preparation");
    assert_eq!(
        json["steps"][0]["image_ref"],
        "techniques/classic-bob/01-consult.jpg"
    );
    assert_eq!(
        json["steps"][2]["video_ref"],
        "techniques/classic-bob/03-guideline.mp4"
    );
}
