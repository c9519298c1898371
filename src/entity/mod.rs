//! SeaORM entities for the study-circle document collections.
//!
//! Each logical collection maps to one table:
//!
//! | Collection                              | Entity               |
//! |-----------------------------------------|----------------------|
//! | `studies/{studyId}`                     | [`study`]            |
//! | `studies/{studyId}/members/{userId}`    | [`member`]           |
//! | `studies/{studyId}/sessions/{sessionId}`| [`study_session`]    |
//! | `joinCodes/{code}`                      | [`join_code`]        |
//!
//! [`identity_session`] backs the anonymous identities handed out through
//! `tower-sessions`.

pub mod identity_session;
pub mod join_code;
pub mod member;
pub mod study;
pub mod study_session;
