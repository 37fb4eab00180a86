#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test;
use civic_connect::entity::profile::{self, UserRole};
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use serde_json::{Value, json};
use uuid::Uuid;

use common::test_state;

/// Signs up and returns `(access_token, user_id)`.
macro_rules! sign_up {
    ($app:expr, $email:expr, $name:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth/sign-up")
            .set_json(json!({ "email": $email, "password": "secret123", "fullName": $name }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        (
            body["token"].as_str().unwrap().to_string(),
            body["userId"].as_str().unwrap().parse::<Uuid>().unwrap(),
        )
    }};
}

macro_rules! sign_in {
    ($app:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth/sign-in")
            .set_json(json!({ "email": $email, "password": "secret123" }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        body["token"].as_str().unwrap().to_string()
    }};
}

macro_rules! create_report {
    ($app:expr, $token:expr, $title:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/reports")
            .insert_header((AUTHORIZATION, format!("Bearer {}", $token)))
            .set_json(json!({
                "title": $title,
                "description": "Needs attention",
                "issueType": "pothole",
                "department": "roads_transport",
                "locationLat": 12.97,
                "locationLng": 77.59,
                "mediaUrls": ["https://cdn.example.com/photo.jpg"]
            }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body["id"].as_str().unwrap().to_string()
    }};
}

fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

async fn promote(db: &sea_orm::DatabaseConnection, id: Uuid, role: UserRole) {
    let profile = profile::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .unwrap();
    let mut active = profile.into_active_model();
    active.role = Set(role);
    active.update(db).await.unwrap();
}

#[actix_web::test]
async fn health_check_answers_without_a_token() {
    let state = test_state().await;
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/health-check").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"OK");
}

#[actix_web::test]
async fn sign_up_then_sign_in_with_same_credentials() {
    let state = test_state().await;
    let app = test_app!(state);

    let (token, user_id) = sign_up!(app, "Asha@Example.com", "Asha Rao");

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["user"]["id"], user_id.to_string());
    assert_eq!(me["user"]["email"], "asha@example.com");
    assert_eq!(me["profile"]["fullName"], "Asha Rao");
    assert_eq!(me["profile"]["role"], "user");

    sign_in!(app, "asha@example.com");
}

#[actix_web::test]
async fn duplicate_sign_up_is_a_conflict() {
    let state = test_state().await;
    let app = test_app!(state);

    sign_up!(app, "ravi@example.com", "Ravi");

    let req = test::TestRequest::post()
        .uri("/auth/sign-up")
        .set_json(json!({ "email": "ravi@example.com", "password": "another1", "fullName": "Ravi K" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "DuplicateAccountEmail");
}

#[actix_web::test]
async fn wrong_password_is_rejected() {
    let state = test_state().await;
    let app = test_app!(state);

    sign_up!(app, "meera@example.com", "Meera");

    let req = test::TestRequest::post()
        .uri("/auth/sign-in")
        .set_json(json!({ "email": "meera@example.com", "password": "wrong-pass" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "InvalidEmailPwd");
}

#[actix_web::test]
async fn invalid_sign_up_fields_are_reported_per_field() {
    let state = test_state().await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/sign-up")
        .set_json(json!({ "email": "not-an-email", "password": "123", "fullName": "A" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    let mut fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    fields.sort();
    assert_eq!(fields, vec!["email", "fullName", "password"]);
}

#[actix_web::test]
async fn api_routes_require_a_token() {
    let state = test_state().await;
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/dashboard").to_request();
    let resp = test::try_call_service(&app, req).await;
    let status = match resp {
        Ok(resp) => resp.status(),
        Err(err) => err.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn dashboard_counts_and_orders_recent_reports() {
    let state = test_state().await;
    let app = test_app!(state);

    let (token, _) = sign_up!(app, "citizen@example.com", "Kiran Das");
    let (_, admin_id) = sign_up!(app, "admin@example.com", "Admin");
    promote(state.db.get_ref(), admin_id, UserRole::Admin).await;
    let admin_token = sign_in!(app, "admin@example.com");

    let mut ids = Vec::new();
    for n in 1..=6 {
        ids.push(create_report!(app, token, format!("Report {n}")));
    }

    for (id, status) in [
        (&ids[0], "processing"),
        (&ids[1], "completed"),
        (&ids[2], "forwarded"),
    ] {
        let req = test::TestRequest::patch()
            .uri(&format!("/api/admin/reports/{id}/status"))
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "status": status }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/api/dashboard")
        .insert_header(bearer(&token))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(view["greetingName"], "Kiran Das");
    assert_eq!(
        view["summary"],
        json!({ "total": 6, "pending": 3, "processing": 1, "completed": 1 })
    );

    let titles: Vec<&str> = view["recentReports"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec!["Report 6", "Report 5", "Report 4", "Report 3", "Report 2"]
    );
}

#[actix_web::test]
async fn status_change_appends_history_and_tracks_resolution() {
    let state = test_state().await;
    let app = test_app!(state);

    let (token, _) = sign_up!(app, "owner@example.com", "Owner");
    let (_, admin_id) = sign_up!(app, "triage@example.com", "Triage");
    promote(state.db.get_ref(), admin_id, UserRole::Admin).await;
    let admin_token = sign_in!(app, "triage@example.com");

    let id = create_report!(app, token, "Streetlight out");

    let req = test::TestRequest::patch()
        .uri(&format!("/api/admin/reports/{id}/status"))
        .insert_header(bearer(&admin_token))
        .set_json(json!({ "status": "completed", "notes": "Bulb replaced" }))
        .to_request();
    let report: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(report["status"], "completed");
    assert_eq!(report["processingNotes"], "Bulb replaced");
    assert!(report["resolvedAt"].is_string());

    let req = test::TestRequest::patch()
        .uri(&format!("/api/admin/reports/{id}/status"))
        .insert_header(bearer(&admin_token))
        .set_json(json!({ "status": "processing" }))
        .to_request();
    let report: Value = test::call_and_read_body_json(&app, req).await;
    assert!(report["resolvedAt"].is_null());

    let req = test::TestRequest::get()
        .uri(&format!("/api/reports/{id}/history"))
        .insert_header(bearer(&token))
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    let transitions: Vec<(Value, Value)> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|h| (h["oldStatus"].clone(), h["newStatus"].clone()))
        .collect();
    assert_eq!(
        transitions,
        vec![
            (Value::Null, json!("pending")),
            (json!("pending"), json!("completed")),
            (json!("completed"), json!("processing")),
        ]
    );
    assert_eq!(history[1]["notes"], "Bulb replaced");
    assert_eq!(history[1]["changedBy"], admin_id.to_string());

    // changes landing in the same instant still come back in write order
    let seqs: Vec<i64> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["seq"].as_i64().unwrap())
        .collect();
    assert_eq!(seqs, vec![0, 1, 2]);
}

#[actix_web::test]
async fn demoted_admin_loses_access_before_token_expiry() {
    let state = test_state().await;
    let app = test_app!(state);

    let (citizen_token, _) = sign_up!(app, "resident@example.com", "Resident");
    let (_, admin_id) = sign_up!(app, "former@example.com", "Former Admin");
    promote(state.db.get_ref(), admin_id, UserRole::Admin).await;
    let admin_token = sign_in!(app, "former@example.com");
    let id = create_report!(app, citizen_token, "Blocked drain");

    let req = test::TestRequest::get()
        .uri("/api/admin/reports")
        .insert_header(bearer(&admin_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    promote(state.db.get_ref(), admin_id, UserRole::User).await;

    let req = test::TestRequest::get()
        .uri("/api/admin/reports")
        .insert_header(bearer(&admin_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&format!("/api/reports/{id}"))
        .insert_header(bearer(&admin_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn plain_users_cannot_use_admin_routes_or_read_others_reports() {
    let state = test_state().await;
    let app = test_app!(state);

    let (owner_token, _) = sign_up!(app, "first@example.com", "First");
    let (other_token, _) = sign_up!(app, "second@example.com", "Second");
    let id = create_report!(app, owner_token, "Broken pipe");

    let req = test::TestRequest::get()
        .uri("/api/admin/reports")
        .insert_header(bearer(&other_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/admin/reports/{id}/status"))
        .insert_header(bearer(&owner_token))
        .set_json(json!({ "status": "completed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&format!("/api/reports/{id}"))
        .insert_header(bearer(&other_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/reports/{id}"))
        .insert_header(bearer(&other_token))
        .set_json(json!({ "title": "Hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn owner_can_edit_and_list_reports() {
    let state = test_state().await;
    let app = test_app!(state);

    let (token, _) = sign_up!(app, "editor@example.com", "Editor");
    let id = create_report!(app, token, "Garbage pile");

    // media urls round-trip through the JSON column
    let req = test::TestRequest::get()
        .uri(&format!("/api/reports/{id}"))
        .insert_header(bearer(&token))
        .to_request();
    let report: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(report["mediaUrls"], json!(["https://cdn.example.com/photo.jpg"]));

    let req = test::TestRequest::patch()
        .uri(&format!("/api/reports/{id}"))
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "Garbage pile near school", "mediaUrls": [] }))
        .to_request();
    let report: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(report["title"], "Garbage pile near school");
    assert_eq!(report["mediaUrls"], json!([]));
    assert_eq!(report["status"], "pending");

    let req = test::TestRequest::get()
        .uri("/api/reports?page=1&size=10")
        .insert_header(bearer(&token))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["content"][0]["departmentLabel"], "Roads & Transport");
}

#[actix_web::test]
async fn assignment_requires_a_triage_capable_assignee() {
    let state = test_state().await;
    let app = test_app!(state);

    let (token, citizen_id) = sign_up!(app, "c@example.com", "Citizen");
    let (_, admin_id) = sign_up!(app, "a@example.com", "Admin");
    promote(state.db.get_ref(), admin_id, UserRole::Superadmin).await;
    let admin_token = sign_in!(app, "a@example.com");
    let id = create_report!(app, token, "Water leak");

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/reports/{id}/assignment"))
        .insert_header(bearer(&admin_token))
        .set_json(json!({ "adminId": citizen_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/reports/{id}/assignment"))
        .insert_header(bearer(&admin_token))
        .set_json(json!({ "adminId": admin_id }))
        .to_request();
    let report: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(report["assignedAdminId"], admin_id.to_string());

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/profiles/{citizen_id}/role"))
        .insert_header(bearer(&admin_token))
        .set_json(json!({ "role": "admin", "department": "water_supply" }))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["role"], "admin");
    assert_eq!(profile["department"], "water_supply");
}

#[actix_web::test]
async fn navigation_follows_the_session() {
    let state = test_state().await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/navigation?path=/auth")
        .to_request();
    let nav: Value = test::call_and_read_body_json(&app, req).await;
    assert!(nav["userMenu"].is_null());
    assert!(nav["redirect"].is_null());
    assert_eq!(nav["authEntries"].as_array().unwrap().len(), 2);

    let (token, _) = sign_up!(app, "nav@example.com", "Nila");

    let req = test::TestRequest::get()
        .uri("/navigation?path=/auth")
        .insert_header(bearer(&token))
        .to_request();
    let nav: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(nav["redirect"], "/");
    assert_eq!(nav["userMenu"]["avatarInitial"], "N");
    assert!(nav["authEntries"].as_array().unwrap().is_empty());

    let links: Vec<&str> = nav["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["path"].as_str().unwrap())
        .collect();
    assert!(!links.contains(&"/admin"));
}

#[actix_web::test]
async fn profile_name_can_be_updated() {
    let state = test_state().await;
    let app = test_app!(state);

    let (token, _) = sign_up!(app, "profile@example.com", "Old Name");

    let req = test::TestRequest::patch()
        .uri("/api/profile")
        .insert_header(bearer(&token))
        .set_json(json!({ "fullName": "X" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::patch()
        .uri("/api/profile")
        .insert_header(bearer(&token))
        .set_json(json!({ "fullName": "  New Name " }))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["fullName"], "New Name");

    let req = test::TestRequest::get()
        .uri("/api/profile")
        .insert_header(bearer(&token))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["fullName"], "New Name");
}

#[actix_web::test]
async fn refresh_cookie_issues_a_new_access_token() {
    let state = test_state().await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/sign-up")
        .set_json(json!({ "email": "refresh@example.com", "password": "secret123", "fullName": "Ref" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let refresh = resp
        .response()
        .cookies()
        .find(|c| c.name() == "refreshToken")
        .map(|c| c.value().to_string())
        .unwrap();
    let access = resp
        .response()
        .cookies()
        .find(|c| c.name() == "accessToken")
        .map(|c| c.value().to_string())
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/auth/refresh")
        .cookie(actix_web::cookie::Cookie::new("refreshToken", refresh))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["token"].is_string());

    let req = test::TestRequest::post()
        .uri("/auth/refresh")
        .cookie(actix_web::cookie::Cookie::new("refreshToken", access))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
