//! Scheduled meetings of a study.
//!
//! The `agenda` and `recap` sub-objects are stored as JSON columns. A recap is
//! absent until first published and is replaced wholesale on every edit.

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Discussion plan for a session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct Agenda {
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub leader_notes: String,
}

/// Leader-authored summary posted after a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct Recap {
    pub summary: String,
    #[serde(default)]
    pub key_takeaways: Vec<String>,
    #[serde(default)]
    pub prayer_intentions: Vec<String>,
    pub posted_at: DateTimeWithTimeZone,
    pub posted_by_uid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "study_session")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    pub study_id: String,
    pub title: Option<String>,
    /// Display position. Rows written before ordering existed carry `NULL`.
    pub sort_order: Option<i64>,
    pub scheduled_at: Option<DateTimeWithTimeZone>,
    pub passage_reference: String,
    #[sea_orm(column_type = "Json")]
    pub agenda: Agenda,
    #[sea_orm(column_type = "Json", nullable)]
    pub recap: Option<Recap>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
