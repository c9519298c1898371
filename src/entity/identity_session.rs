//! Server-side sessions carrying anonymous identities.
//!
//! Rows are written by [`IdentityStore`](crate::IdentityStore) on behalf of
//! `tower-sessions`. The full session record is kept MessagePack-encoded in
//! `data`; the anonymous uid is copied out into its own column so identities
//! can be queried without decoding every record.
//!
//! | Column      | Type               | Description                          |
//! |-------------|--------------------|--------------------------------------|
//! | id          | TEXT (Primary Key) | Session ID (the cookie value)        |
//! | uid         | TEXT NULL          | Anonymous uid stored in the session  |
//! | data        | BLOB / BYTEA       | MessagePack-encoded session record   |
//! | expiry_date | TIMESTAMPTZ        | When the identity lapses             |

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "identity_session")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    pub uid: Option<String>,
    pub data: Vec<u8>,
    pub expiry_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
