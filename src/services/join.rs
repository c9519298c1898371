//! Resolving join codes and recording memberships.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait};
use serde::Serialize;
use tracing::{debug, info};

use crate::entity::join_code::Entity as JoinCodeEntity;
use crate::entity::member::{self, Entity as MemberEntity, Role};
use crate::entity::study;
use crate::error::{Error, Result};
use crate::identity::Uid;
use crate::join_code::normalize_join_code;
use crate::services::studies::get_study;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinOutcome {
    Joined,
    AlreadyMember,
}

/// Study id behind a join code, or `None` for an unknown code.
///
/// Input is trimmed and uppercased, so codes typed in lowercase or pasted
/// with stray whitespace still resolve.
///
/// # Errors
///
/// * `Error::Validation` - The code is empty after trimming.
/// * `Error::Store` - The lookup failed.
pub async fn resolve_join_code(db: &DatabaseConnection, code: &str) -> Result<Option<String>> {
    let normalized = normalize_join_code(code);
    if normalized.is_empty() {
        return Err(Error::Validation("Join code is required.".to_string()));
    }

    debug!(code = %normalized, "resolving join code");
    let entry = JoinCodeEntity::find_by_id(normalized).one(db).await?;
    Ok(entry.map(|e| e.study_id))
}

/// Resolves a join code straight to its study.
///
/// # Returns
///
/// `None` when the code is unknown or its study no longer exists.
///
/// # Errors
///
/// Same as [`resolve_join_code`].
pub async fn get_study_by_join_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<Option<study::Model>> {
    match resolve_join_code(db, code).await? {
        Some(study_id) => get_study(db, &study_id).await,
        None => Ok(None),
    }
}

/// Records `uid` as a member of the study.
///
/// Idempotent: an existing membership, whatever its role, is left untouched.
///
/// # Returns
///
/// * `Ok(JoinOutcome::Joined)` - A member record was created.
/// * `Ok(JoinOutcome::AlreadyMember)` - `uid` already belonged to the study.
///
/// # Errors
///
/// * `Error::NotFound("study")` - The study does not exist.
/// * `Error::Store` - The read or the insert failed.
pub async fn join_study(db: &DatabaseConnection, uid: &Uid, study_id: &str) -> Result<JoinOutcome> {
    if get_study(db, study_id).await?.is_none() {
        return Err(Error::NotFound("study"));
    }

    let existing = MemberEntity::find_by_id((study_id.to_string(), uid.to_string()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(JoinOutcome::AlreadyMember);
    }

    // A concurrent join from the same identity lands on the conflict clause
    let inserted = MemberEntity::insert(member::ActiveModel {
        study_id: Set(study_id.to_string()),
        user_id: Set(uid.to_string()),
        role: Set(Role::Member),
        joined_at: Set(Utc::now().fixed_offset()),
    })
    .on_conflict(
        OnConflict::columns([member::Column::StudyId, member::Column::UserId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;

    if inserted == 0 {
        return Ok(JoinOutcome::AlreadyMember);
    }
    info!(%study_id, member = %uid, "member joined study");
    Ok(JoinOutcome::Joined)
}
