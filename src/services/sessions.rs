//! Session scheduling, agenda editing and recaps.
//!
//! Leader-only operations do not check roles themselves. Callers gate them
//! through [`Capabilities`](crate::access::Capabilities) first. Fields are
//! stored exactly as passed in; trimming form input is up to the caller.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entity::study_session::{self, Agenda, Entity as SessionEntity, Recap};
use crate::error::{Error, Result};
use crate::identity::Uid;
use crate::services::studies::new_id;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub reference: String,
}

/// A session as presented to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub study_id: String,
    pub title: Option<String>,
    pub order: Option<i64>,
    pub scheduled_at: Option<DateTimeWithTimeZone>,
    pub passage: Passage,
    pub agenda: Agenda,
    pub recap: Option<Recap>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<study_session::Model> for SessionRecord {
    fn from(model: study_session::Model) -> Self {
        Self {
            id: model.id,
            study_id: model.study_id,
            title: model.title,
            order: model.sort_order,
            scheduled_at: model.scheduled_at,
            passage: Passage {
                reference: model.passage_reference,
            },
            agenda: model.agenda,
            recap: model.recap,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    #[serde(default)]
    pub scheduled_at: Option<DateTimeWithTimeZone>,
    #[serde(default)]
    pub passage_ref: String,
    #[serde(default)]
    pub questions: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBasics {
    #[serde(default)]
    pub passage_ref: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub leader_notes: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapDraft {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_takeaways: Vec<String>,
    #[serde(default)]
    pub prayer_intentions: Vec<String>,
}

/// All sessions of a study in display order.
///
/// Rows written before ordering existed have no order value. When any are
/// present the whole list is ordered by scheduled time instead, with
/// unscheduled sessions counted as the Unix epoch.
///
/// # Errors
///
/// `Error::Store` if the query fails. An unknown study yields an empty list.
pub async fn list_sessions(db: &DatabaseConnection, study_id: &str) -> Result<Vec<SessionRecord>> {
    let mut sessions: Vec<SessionRecord> = SessionEntity::find()
        .filter(study_session::Column::StudyId.eq(study_id))
        .order_by_asc(study_session::Column::SortOrder)
        .order_by_asc(study_session::Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(SessionRecord::from)
        .collect();

    if sessions.iter().any(|s| s.order.is_none()) {
        debug!(%study_id, "unordered sessions present, sorting by scheduled time");
        sessions.sort_by_key(|s| s.scheduled_at.map_or(0, |at| at.timestamp_millis()));
    }
    Ok(sessions)
}

/// Fetches one session of a study.
///
/// # Parameters
///
/// * `study_id` - Study the session must belong to.
/// * `session_id` - Session id.
///
/// # Returns
///
/// * `Ok(Some(session))` - The session with its single canonical `scheduled_at`.
/// * `Ok(None)` - No such session in this study, even if the id exists elsewhere.
/// * `Err(Error::Store)` - The lookup failed.
pub async fn get_session(
    db: &DatabaseConnection,
    study_id: &str,
    session_id: &str,
) -> Result<Option<SessionRecord>> {
    Ok(find_session(db, study_id, session_id)
        .await?
        .map(SessionRecord::from))
}

/// Adds a session to the end of the study's schedule and returns its id.
///
/// The order value is the creation time in milliseconds, which only
/// increases under a single writer.
///
/// # Parameters
///
/// * `study_id` - Study to schedule in.
/// * `new` - Time, passage and questions, stored as given. Leader notes start empty.
///
/// # Errors
///
/// `Error::Store` if the insert fails, including for an unknown study.
pub async fn create_session(
    db: &DatabaseConnection,
    study_id: &str,
    new: NewSession,
) -> Result<String> {
    let now = Utc::now().fixed_offset();
    let id = new_id();

    SessionEntity::insert(study_session::ActiveModel {
        id: Set(id.clone()),
        study_id: Set(study_id.to_string()),
        title: Set(None),
        sort_order: Set(Some(now.timestamp_millis())),
        scheduled_at: Set(new.scheduled_at),
        passage_reference: Set(new.passage_ref),
        agenda: Set(Agenda {
            questions: new.questions,
            leader_notes: String::new(),
        }),
        recap: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    })
    .exec_without_returning(db)
    .await?;

    info!(%study_id, session_id = %id, "session created");
    Ok(id)
}

/// Replaces the passage reference, questions and leader notes.
///
/// Schedule, order and recap are left alone; `updated_at` is stamped.
///
/// # Errors
///
/// * `Error::NotFound("session")` - No such session in this study.
/// * `Error::Store` - The read or the update failed.
pub async fn update_session_basics(
    db: &DatabaseConnection,
    study_id: &str,
    session_id: &str,
    basics: SessionBasics,
) -> Result<()> {
    let existing = find_session(db, study_id, session_id)
        .await?
        .ok_or(Error::NotFound("session"))?;

    let mut active_model = existing.into_active_model();
    active_model.passage_reference = Set(basics.passage_ref);
    active_model.agenda = Set(Agenda {
        questions: basics.questions,
        leader_notes: basics.leader_notes,
    });
    active_model.updated_at = Set(Utc::now().fixed_offset());
    active_model.update(db).await?;

    info!(%study_id, %session_id, "session basics updated");
    Ok(())
}

/// Publishes a recap, replacing any earlier one in full.
///
/// Nothing of a previous recap survives; takeaways and intentions are not
/// merged.
///
/// # Parameters
///
/// * `uid` - Recorded as `posted_by_uid`.
/// * `draft` - Summary and lists, stored as given.
///
/// # Errors
///
/// * `Error::NotFound("session")` - No such session in this study.
/// * `Error::Store` - The read or the update failed.
pub async fn post_recap(
    db: &DatabaseConnection,
    study_id: &str,
    session_id: &str,
    uid: &Uid,
    draft: RecapDraft,
) -> Result<()> {
    let existing = find_session(db, study_id, session_id)
        .await?
        .ok_or(Error::NotFound("session"))?;

    let now = Utc::now().fixed_offset();
    let mut active_model = existing.into_active_model();
    active_model.recap = Set(Some(Recap {
        summary: draft.summary,
        key_takeaways: draft.key_takeaways,
        prayer_intentions: draft.prayer_intentions,
        posted_at: now,
        posted_by_uid: uid.to_string(),
    }));
    active_model.updated_at = Set(now);
    active_model.update(db).await?;

    info!(%study_id, %session_id, posted_by = %uid, "recap posted");
    Ok(())
}

async fn find_session(
    db: &DatabaseConnection,
    study_id: &str,
    session_id: &str,
) -> Result<Option<study_session::Model>> {
    Ok(SessionEntity::find_by_id(session_id.to_string())
        .filter(study_session::Column::StudyId.eq(study_id))
        .one(db)
        .await?)
}
