mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use study_circle::config::SessionConfig;
use study_circle::http::{build_app, AppState};
use tower::ServiceExt;

use common::test_db;

const PUBLIC_URL: &str = "http://studies.test";

async fn app() -> Router {
    let state = AppState {
        db: test_db().await,
        public_url: PUBLIC_URL.to_string(),
    };
    let sessions = SessionConfig {
        secure: false,
        ..SessionConfig::default()
    };
    build_app(state, &sessions)
}

struct Reply {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    Reply {
        status,
        cookie,
        body,
    }
}

#[tokio::test]
async fn index_lists_routes() {
    let app = app().await;
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("/join/{code}"));
}

#[tokio::test]
async fn leader_and_member_flow() {
    let app = app().await;

    let created = send(&app, Method::POST, "/create", None, Some(json!({ "name": " Romans " }))).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let leader = created.cookie.expect("identity cookie");
    let study_id = created.body["studyId"].as_str().unwrap().to_string();
    let session_id = created.body["firstSessionId"].as_str().unwrap().to_string();
    let code = created.body["joinCode"].as_str().unwrap().to_string();

    let invite = send(&app, Method::GET, &format!("/created/{study_id}"), None, None).await;
    assert_eq!(invite.status, StatusCode::OK);
    assert_eq!(invite.body["name"], "Romans");
    assert_eq!(invite.body["inviteUrl"], format!("{PUBLIC_URL}/join/{code}"));

    let dashboard = send(&app, Method::GET, &format!("/s/{study_id}"), Some(&leader), None).await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert_eq!(dashboard.body["capabilities"]["role"], "leader");
    assert_eq!(dashboard.body["capabilities"]["canEditSessions"], true);
    assert_eq!(dashboard.body["sessions"].as_array().unwrap().len(), 1);

    let session_uri = format!("/s/{study_id}/session/{session_id}");
    let updated = send(
        &app,
        Method::PUT,
        &session_uri,
        Some(&leader),
        Some(json!({
            "passageRef": "Romans 8:28",
            "questions": ["What is promised?", " "],
            "leaderNotes": "Start with prayer",
        })),
    )
    .await;
    assert_eq!(updated.status, StatusCode::NO_CONTENT);

    // A second browser joins through the lowercase code
    let preview = send(&app, Method::GET, &format!("/join/{}", code.to_lowercase()), None, None).await;
    assert_eq!(preview.status, StatusCode::OK);
    assert_eq!(preview.body["study"]["id"], study_id.as_str());
    assert_eq!(preview.body["nextSession"]["title"], "Session 1");

    let joined = send(&app, Method::POST, &format!("/join/{}", code.to_lowercase()), None, None).await;
    assert_eq!(joined.status, StatusCode::OK);
    assert_eq!(joined.body["outcome"], "joined");
    let member = joined.cookie.expect("identity cookie");
    assert_ne!(member, leader);

    let again = send(&app, Method::POST, &format!("/join/{code}"), Some(&member), None).await;
    assert_eq!(again.body["outcome"], "already_member");

    let detail = send(&app, Method::GET, &session_uri, Some(&member), None).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["capabilities"]["role"], "member");
    assert_eq!(detail.body["session"]["passage"]["reference"], "Romans 8:28");
    assert_eq!(detail.body["session"]["agenda"]["questions"], json!(["What is promised?"]));
    assert_eq!(detail.body["session"]["agenda"]["leaderNotes"], "");

    let leader_detail = send(&app, Method::GET, &session_uri, Some(&leader), None).await;
    assert_eq!(leader_detail.body["session"]["agenda"]["leaderNotes"], "Start with prayer");

    let forbidden = send(
        &app,
        Method::PUT,
        &session_uri,
        Some(&member),
        Some(json!({ "passageRef": "Romans 1" })),
    )
    .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let new_session = send(
        &app,
        Method::POST,
        &format!("/s/{study_id}/new"),
        Some(&member),
        Some(json!({ "passageRef": "Romans 9" })),
    )
    .await;
    assert_eq!(new_session.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn recaps_are_posted_by_the_leader() {
    let app = app().await;

    let created = send(&app, Method::POST, "/create", None, Some(json!({ "name": "Ruth" }))).await;
    let leader = created.cookie.unwrap();
    let study_id = created.body["studyId"].as_str().unwrap().to_string();
    let code = created.body["joinCode"].as_str().unwrap().to_string();

    let scheduled = send(
        &app,
        Method::POST,
        &format!("/s/{study_id}/new"),
        Some(&leader),
        Some(json!({
            "scheduledAt": "2031-03-04T19:00:00+00:00",
            "passageRef": "Ruth 1",
            "questions": ["Where is home?"],
        })),
    )
    .await;
    assert_eq!(scheduled.status, StatusCode::CREATED);
    let session_id = scheduled.body["sessionId"].as_str().unwrap().to_string();
    let recap_uri = format!("/s/{study_id}/session/{session_id}/recap");

    let dashboard = send(&app, Method::GET, &format!("/s/{study_id}"), Some(&leader), None).await;
    assert_eq!(dashboard.body["upcoming"]["id"], session_id.as_str());

    let missing = send(&app, Method::GET, &format!("{recap_uri}/view"), Some(&leader), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let draft = send(&app, Method::GET, &recap_uri, Some(&leader), None).await;
    assert_eq!(draft.body["summary"], "");

    let blank = send(
        &app,
        Method::POST,
        &recap_uri,
        Some(&leader),
        Some(json!({ "summary": "   ", "keyTakeaways": ["hesed"] })),
    )
    .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["error"], "Recap summary is required.");
    let still_missing = send(&app, Method::GET, &format!("{recap_uri}/view"), Some(&leader), None).await;
    assert_eq!(still_missing.status, StatusCode::NOT_FOUND);

    let posted = send(
        &app,
        Method::POST,
        &recap_uri,
        Some(&leader),
        Some(json!({
            "summary": "  Loyalty in hard places. ",
            "keyTakeaways": ["hesed", ""],
            "prayerIntentions": ["Naomi's family"],
        })),
    )
    .await;
    assert_eq!(posted.status, StatusCode::NO_CONTENT);

    let joined = send(&app, Method::POST, &format!("/join/{code}"), None, None).await;
    let member = joined.cookie.unwrap();

    let view = send(&app, Method::GET, &format!("{recap_uri}/view"), Some(&member), None).await;
    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.body["recap"]["summary"], "Loyalty in hard places.");
    assert_eq!(view.body["recap"]["keyTakeaways"], json!(["hesed"]));
    assert_eq!(view.body["passage"]["reference"], "Ruth 1");

    let member_draft = send(&app, Method::GET, &recap_uri, Some(&member), None).await;
    assert_eq!(member_draft.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn bad_input_is_rejected() {
    let app = app().await;

    let blank = send(&app, Method::POST, "/create", None, Some(json!({ "name": "   " }))).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["error"], "Study name is required.");

    let unknown = send(&app, Method::GET, "/join/ZZZZZZ", None, None).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["error"], "This invite link is invalid or has expired.");

    let join_unknown = send(&app, Method::POST, "/join/ZZZZZZ", None, None).await;
    assert_eq!(join_unknown.status, StatusCode::NOT_FOUND);

    let no_study = send(&app, Method::GET, "/created/nope", None, None).await;
    assert_eq!(no_study.status, StatusCode::NOT_FOUND);
}
