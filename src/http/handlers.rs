use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::access::{authorize, Capabilities, Capability};
use crate::entity::study;
use crate::entity::study_session::Recap;
use crate::error::Error;
use crate::identity::{AnonymousUser, Uid};
use crate::services::join::{self, JoinOutcome};
use crate::services::sessions::{
    self, NewSession, Passage, RecapDraft, SessionBasics, SessionRecord,
};
use crate::services::studies::{self, CreatedStudy, NextSession};

type ApiResult<T> = Result<T, ApiError>;

/// `GET /` - plain HTML listing of the routes.
pub async fn index() -> Html<&'static str> {
    Html(
        r#"<html>
    <head><title>Study Circle</title></head>
    <body>
        <h1>Study Circle</h1>
        <ul>
            <li><code>POST /create</code> - start a study</li>
            <li><code>GET|POST /join/{code}</code> - preview or join a study</li>
            <li><code>GET /s/{studyId}</code> - study dashboard</li>
            <li><code>POST /s/{studyId}/new</code> - schedule a session</li>
            <li><code>GET|PUT /s/{studyId}/session/{sessionId}</code> - session details</li>
            <li><code>GET|POST /s/{studyId}/session/{sessionId}/recap</code> - edit the recap</li>
            <li><code>GET /s/{studyId}/session/{sessionId}/recap/view</code> - read the recap</li>
        </ul>
    </body>
</html>"#,
    )
}

#[derive(Debug, Deserialize)]
pub struct CreateStudyRequest {
    #[serde(default)]
    pub name: String,
}

/// `POST /create` - starts a study led by the caller.
///
/// Responds `201` with the ids and join code, `400` for a blank name and `503`
/// when no join code could be claimed.
pub async fn create_study(
    State(state): State<AppState>,
    AnonymousUser(uid): AnonymousUser,
    Json(req): Json<CreateStudyRequest>,
) -> ApiResult<(StatusCode, Json<CreatedStudy>)> {
    let created = studies::create_study(&state.db, &uid, &req.name)
        .await
        .map_err(ApiError::failed("create study"))?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteView {
    pub study_id: String,
    pub name: String,
    pub join_code: String,
    pub invite_path: String,
    pub invite_url: String,
}

/// `GET /created/{studyId}` - the invite link to share after creating a study.
pub async fn created(
    State(state): State<AppState>,
    Path(study_id): Path<String>,
) -> ApiResult<Json<InviteView>> {
    let study = load_study(&state, &study_id, "load study").await?;
    let invite_path = format!("/join/{}", study.join_code);
    Ok(Json(InviteView {
        invite_url: format!("{}{}", state.public_url, invite_path),
        invite_path,
        study_id: study.id,
        name: study.name,
        join_code: study.join_code,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPreview {
    pub study: study::Model,
    pub next_session: Option<NextSession>,
}

/// `GET /join/{code}` - what a visitor is about to join. Needs no identity.
pub async fn join_preview(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<JoinPreview>> {
    let study = join::get_study_by_join_code(&state.db, &code)
        .await
        .map_err(ApiError::failed("look up invite"))?
        .ok_or(Error::NotFound("join code"))?;
    let next_session = studies::get_next_session(&state.db, &study.id)
        .await
        .map_err(ApiError::failed("look up invite"))?;
    Ok(Json(JoinPreview {
        study,
        next_session,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub study_id: String,
    pub outcome: JoinOutcome,
}

/// `POST /join/{code}` - adds the caller as a member; repeating it is harmless.
pub async fn join(
    State(state): State<AppState>,
    AnonymousUser(uid): AnonymousUser,
    Path(code): Path<String>,
) -> ApiResult<Json<JoinResponse>> {
    let study_id = join::resolve_join_code(&state.db, &code)
        .await
        .map_err(ApiError::failed("join study"))?
        .ok_or(Error::NotFound("join code"))?;
    let outcome = join::join_study(&state.db, &uid, &study_id)
        .await
        .map_err(ApiError::failed("join study"))?;
    Ok(Json(JoinResponse { study_id, outcome }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub study: study::Model,
    pub capabilities: Capabilities,
    pub sessions: Vec<SessionRecord>,
    /// First session scheduled from now on, else the first one listed.
    pub upcoming: Option<SessionRecord>,
}

/// `GET /s/{studyId}` - study overview with the caller's capabilities.
///
/// Leader notes are blanked unless the caller leads the study.
pub async fn dashboard(
    State(state): State<AppState>,
    AnonymousUser(uid): AnonymousUser,
    Path(study_id): Path<String>,
) -> ApiResult<Json<Dashboard>> {
    let study = load_study(&state, &study_id, "load this study").await?;
    let capabilities = authorize(&state.db, &study_id, &uid)
        .await
        .map_err(ApiError::failed("load this study"))?;
    capabilities.require(Capability::View)?;

    let mut sessions = sessions::list_sessions(&state.db, &study_id)
        .await
        .map_err(ApiError::failed("load this study"))?;
    for session in &mut sessions {
        redact(session, &capabilities);
    }

    let now = Utc::now();
    let upcoming = sessions
        .iter()
        .find(|s| s.scheduled_at.is_some_and(|at| at >= now))
        .or_else(|| sessions.first())
        .cloned();

    Ok(Json(Dashboard {
        study,
        capabilities,
        sessions,
        upcoming,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSession {
    pub session_id: String,
}

/// `POST /s/{studyId}/new` - schedules a session. Leader only.
///
/// The passage is trimmed and blank questions dropped before storing.
pub async fn new_session(
    State(state): State<AppState>,
    AnonymousUser(uid): AnonymousUser,
    Path(study_id): Path<String>,
    Json(new): Json<NewSession>,
) -> ApiResult<(StatusCode, Json<CreatedSession>)> {
    leader_gate(&state, &study_id, &uid, Capability::EditSessions).await?;

    let new = NewSession {
        scheduled_at: new.scheduled_at,
        passage_ref: new.passage_ref.trim().to_string(),
        questions: clean_list(new.questions),
    };
    let session_id = sessions::create_session(&state.db, &study_id, new)
        .await
        .map_err(ApiError::failed("create session"))?;
    Ok((StatusCode::CREATED, Json(CreatedSession { session_id })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    pub session: SessionRecord,
    pub capabilities: Capabilities,
}

/// `GET /s/{studyId}/session/{sessionId}`
pub async fn session_detail(
    State(state): State<AppState>,
    AnonymousUser(uid): AnonymousUser,
    Path((study_id, session_id)): Path<(String, String)>,
) -> ApiResult<Json<SessionDetail>> {
    let capabilities = authorize(&state.db, &study_id, &uid)
        .await
        .map_err(ApiError::failed("load session"))?;
    capabilities.require(Capability::View)?;

    let mut session = load_session(&state, &study_id, &session_id, "load session").await?;
    redact(&mut session, &capabilities);
    Ok(Json(SessionDetail {
        session,
        capabilities,
    }))
}

/// `PUT /s/{studyId}/session/{sessionId}` - saves passage, questions and notes. Leader only.
pub async fn update_session(
    State(state): State<AppState>,
    AnonymousUser(uid): AnonymousUser,
    Path((study_id, session_id)): Path<(String, String)>,
    Json(basics): Json<SessionBasics>,
) -> ApiResult<StatusCode> {
    leader_gate(&state, &study_id, &uid, Capability::EditSessions).await?;

    // Leader notes are free text and kept as typed
    let basics = SessionBasics {
        passage_ref: basics.passage_ref.trim().to_string(),
        questions: clean_list(basics.questions),
        leader_notes: basics.leader_notes,
    };
    sessions::update_session_basics(&state.db, &study_id, &session_id, basics)
        .await
        .map_err(ApiError::failed("save session"))?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapForm {
    pub summary: String,
    pub key_takeaways: Vec<String>,
    pub prayer_intentions: Vec<String>,
}

/// Current recap content for editing, empty when nothing is published yet.
pub async fn recap_draft(
    State(state): State<AppState>,
    AnonymousUser(uid): AnonymousUser,
    Path((study_id, session_id)): Path<(String, String)>,
) -> ApiResult<Json<RecapForm>> {
    leader_gate(&state, &study_id, &uid, Capability::PostRecap).await?;

    let session = load_session(&state, &study_id, &session_id, "load recap").await?;
    let form = match session.recap {
        Some(recap) => RecapForm {
            summary: recap.summary,
            key_takeaways: recap.key_takeaways,
            prayer_intentions: recap.prayer_intentions,
        },
        None => RecapForm {
            summary: String::new(),
            key_takeaways: Vec::new(),
            prayer_intentions: Vec::new(),
        },
    };
    Ok(Json(form))
}

/// `POST /s/{studyId}/session/{sessionId}/recap` - publishes the recap. Leader only.
///
/// A blank summary is rejected with `400` before anything else is checked.
pub async fn post_recap(
    State(state): State<AppState>,
    AnonymousUser(uid): AnonymousUser,
    Path((study_id, session_id)): Path<(String, String)>,
    Json(draft): Json<RecapDraft>,
) -> ApiResult<StatusCode> {
    let summary = draft.summary.trim();
    if summary.is_empty() {
        return Err(Error::Validation("Recap summary is required.".to_string()).into());
    }
    leader_gate(&state, &study_id, &uid, Capability::PostRecap).await?;

    let draft = RecapDraft {
        summary: summary.to_string(),
        key_takeaways: clean_list(draft.key_takeaways),
        prayer_intentions: clean_list(draft.prayer_intentions),
    };
    sessions::post_recap(&state.db, &study_id, &session_id, &uid, draft)
        .await
        .map_err(ApiError::failed("post recap"))?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapView {
    pub session_id: String,
    pub title: Option<String>,
    pub passage: Passage,
    pub recap: Recap,
    pub capabilities: Capabilities,
}

/// `GET /s/{studyId}/session/{sessionId}/recap/view` - the published recap, `404` until one exists.
pub async fn recap_view(
    State(state): State<AppState>,
    AnonymousUser(uid): AnonymousUser,
    Path((study_id, session_id)): Path<(String, String)>,
) -> ApiResult<Json<RecapView>> {
    let capabilities = authorize(&state.db, &study_id, &uid)
        .await
        .map_err(ApiError::failed("load recap"))?;
    capabilities.require(Capability::View)?;

    let session = load_session(&state, &study_id, &session_id, "load recap").await?;
    let recap = session.recap.ok_or(Error::NotFound("recap"))?;
    Ok(Json(RecapView {
        session_id: session.id,
        title: session.title,
        passage: session.passage,
        recap,
        capabilities,
    }))
}

/// Authorizes the caller and fails unless `capability` is held.
async fn leader_gate(
    state: &AppState,
    study_id: &str,
    uid: &Uid,
    capability: Capability,
) -> ApiResult<Capabilities> {
    let capabilities = authorize(&state.db, study_id, uid)
        .await
        .map_err(ApiError::failed("check your role"))?;
    capabilities.require(capability)?;
    Ok(capabilities)
}

async fn load_study(state: &AppState, study_id: &str, action: &'static str) -> ApiResult<study::Model> {
    let study = studies::get_study(&state.db, study_id)
        .await
        .map_err(ApiError::failed(action))?;
    study.ok_or_else(|| Error::NotFound("study").into())
}

async fn load_session(
    state: &AppState,
    study_id: &str,
    session_id: &str,
    action: &'static str,
) -> ApiResult<SessionRecord> {
    let session = sessions::get_session(&state.db, study_id, session_id)
        .await
        .map_err(ApiError::failed(action))?;
    session.ok_or_else(|| Error::NotFound("session").into())
}

/// Trims every entry and drops the blank ones.
fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn redact(session: &mut SessionRecord, capabilities: &Capabilities) {
    if !capabilities.can_see_leader_notes {
        session.agenda.leader_notes.clear();
    }
}
