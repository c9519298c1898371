//! Study records.

use sea_orm::entity::prelude::*;
use serde::Serialize;

/// A recurring group study.
///
/// `join_code` is unique across all studies. The authoritative uniqueness
/// check is the [`join_code`](super::join_code) index table, written in the
/// same transaction as the study.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "study")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub join_code: String,
    pub created_at: DateTimeWithTimeZone,
    /// Anonymous uid of the creator, who is also the first leader.
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
