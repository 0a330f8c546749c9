mod common;

use axum::http::StatusCode;
use serde_json::json;

use bike_share::models::BikeStatus;
use bike_share::utils::jwt::UserRole;
use common::{TestApp, OTHER_RIDER_ID, RIDER_ID};

#[tokio::test]
async fn test_rent_and_return_round_trip() {
    let app = TestApp::new().await;
    let rider = app.rider();

    let (status, body) = app.post("/api/rentals", &rider, json!({ "station_id": 1 })).await;
    assert_eq!(status, StatusCode::OK);
    let rental = &body["data"];
    assert_eq!(rental["id"], 1);
    assert_eq!(rental["user_id"], RIDER_ID);
    assert_eq!(rental["bike_id"], 1);
    assert_eq!(rental["start_station"], 1);
    assert_eq!(rental["status"], "rented");
    assert_eq!(app.service.get_station(1).await.unwrap().bike_count, 1);
    assert_eq!(app.service.get_bike(1).await.unwrap().status, BikeStatus::Rented);

    let (status, body) = app.get("/api/rentals/current", &rider).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], 1);

    let (status, body) = app
        .post("/api/rentals/1/return", &rider, json!({ "end_station_id": 2 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let returned = &body["data"];
    assert_eq!(returned["status"], "returned");
    assert_eq!(returned["end_station"], 2);
    assert_eq!(returned["duration"], 0);
    let distance = returned["distance"].as_f64().unwrap();
    assert!(distance > 1.0 && distance < 1.1, "distance {}", distance);

    let bike = app.service.get_bike(1).await.unwrap();
    assert_eq!(bike.status, BikeStatus::Available);
    assert_eq!(bike.current_station, Some(2));
    assert_eq!(bike.use_count, 1);
    assert_eq!(app.service.get_station(1).await.unwrap().bike_count, 1);
    assert_eq!(app.service.get_station(2).await.unwrap().bike_count, 1);
    assert_eq!(app.store.commit_count(), 2);

    let (status, body) = app.get("/api/rentals/current", &rider).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());
    assert_eq!(body["message"], "No active rental");

    let (status, body) = app.get("/api/rentals", &rider).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_rental_is_rejected_while_one_is_open() {
    let app = TestApp::new().await;
    let rider = app.rider();

    app.post("/api/rentals", &rider, json!({ "station_id": 1 })).await;
    let (status, body) = app.post("/api/rentals", &rider, json!({ "station_id": 1 })).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_RENTING");
    assert_eq!(app.service.get_station(1).await.unwrap().bike_count, 1);
}

#[tokio::test]
async fn test_rent_at_unavailable_station() {
    let app = TestApp::new().await;
    let rider = app.rider();

    // Inactiva
    let (status, body) = app.post("/api/rentals", &rider, json!({ "station_id": 3 })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "STATION_UNAVAILABLE");

    // Vacía
    let (status, body) = app.post("/api/rentals", &rider, json!({ "station_id": 2 })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "STATION_UNAVAILABLE");

    let (status, body) = app.post("/api/rentals", &rider, json!({ "station_id": 77 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "UNKNOWN_STATION");

    assert_eq!(app.store.commit_count(), 0);
}

#[tokio::test]
async fn test_double_return_is_rejected() {
    let app = TestApp::new().await;
    let rider = app.rider();

    app.post("/api/rentals", &rider, json!({ "station_id": 1 })).await;
    let (status, _) = app
        .post("/api/rentals/1/return", &rider, json!({ "end_station_id": 1 }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post("/api/rentals/1/return", &rider, json!({ "end_station_id": 2 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "RENTAL_ALREADY_RETURNED");
    assert_eq!(app.service.get_station(1).await.unwrap().bike_count, 2);
    assert_eq!(app.service.get_station(2).await.unwrap().bike_count, 0);
}

#[tokio::test]
async fn test_only_owner_or_admin_may_return() {
    let app = TestApp::new().await;
    app.post("/api/rentals", &app.rider(), json!({ "station_id": 1 })).await;

    let intruder = app.token(OTHER_RIDER_ID, UserRole::User);
    let (status, body) = app
        .post("/api/rentals/1/return", &intruder, json!({ "end_station_id": 1 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    assert!(app.service.current_rental(RIDER_ID).await.is_some());

    let (status, body) = app
        .post("/api/rentals/1/return", &app.admin(), json!({ "end_station_id": 1 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], RIDER_ID);

    let (status, body) = app
        .post("/api/rentals/99/return", &app.admin(), json!({ "end_station_id": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "RENTAL_NOT_FOUND");
}

#[tokio::test]
async fn test_return_to_inactive_or_full_station() {
    let app = TestApp::new().await;
    let rider = app.rider();
    let admin = app.admin();
    app.post("/api/rentals", &rider, json!({ "station_id": 1 })).await;

    let (status, body) = app
        .post("/api/rentals/1/return", &rider, json!({ "end_station_id": 3 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "STATION_INACTIVE");

    for _ in 0..5 {
        let (status, _) = app.post("/api/bikes", &admin, json!({ "station_id": 2 })).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = app.post("/api/bikes", &admin, json!({ "station_id": 2 })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "STATION_FULL");

    let (status, body) = app
        .post("/api/rentals/1/return", &rider, json!({ "end_station_id": 2 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "STATION_FULL");

    // Sin cambios: el alquiler sigue abierto
    assert!(app.service.current_rental(RIDER_ID).await.is_some());
    assert_eq!(app.service.get_station(2).await.unwrap().bike_count, 5);
}

#[tokio::test]
async fn test_return_with_reported_metrics() {
    let app = TestApp::new().await;
    let rider = app.rider();
    app.post("/api/rentals", &rider, json!({ "station_id": 1 })).await;

    let (status, body) = app
        .post(
            "/api/rentals/1/return",
            &rider,
            json!({ "end_station_id": 2, "distance_km": -1.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .post(
            "/api/rentals/1/return",
            &rider,
            json!({ "end_station_id": 2, "distance_km": 3.5, "duration_minutes": 22 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["distance"], 3.5);
    assert_eq!(body["data"]["duration"], 22);
}

#[tokio::test]
async fn test_repair_lifecycle_over_http() {
    let app = TestApp::new().await;
    let rider = app.rider();
    let admin = app.admin();

    let (status, body) = app
        .post(
            "/api/repairs",
            &rider,
            json!({
                "target_type": "bike",
                "target_id": 1,
                "category": "brakes",
                "description": "Front brake does not engage"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["reporter_id"], RIDER_ID);
    let id = body["data"]["id"].as_i64().unwrap();

    let (_, body) = app.get("/api/repairs/mine", &rider).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let other = app.token(OTHER_RIDER_ID, UserRole::User);
    let (status, _) = app.get(&format!("/api/repairs/{}", id), &other).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let advance = format!("/api/repairs/{}/advance", id);
    let (status, _) = app.post(&advance, &rider, json!({ "action": "start" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(&advance, &admin, json!({ "action": "complete", "admin_note": "Pads replaced" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let (status, body) = app.post(&advance, &admin, json!({ "action": "start" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in-progress");

    let (status, body) = app.post(&advance, &admin, json!({ "action": "complete" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_NOTE");

    let (status, body) = app
        .post(&advance, &admin, json!({ "action": "complete", "admin_note": "Pads replaced" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["admin_note"], "Pads replaced");
    assert!(!body["data"]["completed_at"].is_null());

    let (status, body) = app.get("/api/repairs?status=completed", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = app.get(&format!("/api/repairs/{}", id), &rider).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
}

#[tokio::test]
async fn test_repair_against_unknown_target() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/repairs",
            &app.rider(),
            json!({
                "target_type": "station",
                "target_id": 99,
                "category": "dock",
                "description": "Dock 4 is jammed"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "UNKNOWN_STATION");
}
