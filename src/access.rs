//! The single authorization check behind every leader/member view.

use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::entity::member::Role;
use crate::error::{Error, Result};
use crate::identity::Uid;
use crate::services::studies::get_my_role;

/// What the caller may do within one study.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub role: Option<Role>,
    pub can_view: bool,
    pub can_join: bool,
    pub can_edit_sessions: bool,
    pub can_post_recap: bool,
    pub can_see_leader_notes: bool,
}

/// A capability an operation depends on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Capability {
    View,
    Join,
    EditSessions,
    PostRecap,
}

impl Capabilities {
    pub fn for_role(role: Option<Role>) -> Self {
        let leader = role == Some(Role::Leader);
        Self {
            role,
            can_view: true,
            can_join: role.is_none(),
            can_edit_sessions: leader,
            can_post_recap: leader,
            can_see_leader_notes: leader,
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::View => self.can_view,
            Capability::Join => self.can_join,
            Capability::EditSessions => self.can_edit_sessions,
            Capability::PostRecap => self.can_post_recap,
        }
    }

    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.allows(capability) {
            return Ok(());
        }
        Err(Error::Forbidden(match capability {
            Capability::View => "view this study",
            Capability::Join => "join this study",
            Capability::EditSessions => "edit sessions",
            Capability::PostRecap => "post recaps",
        }))
    }
}

/// Capabilities of `uid` in the study, derived from its membership.
pub async fn authorize(db: &DatabaseConnection, study_id: &str, uid: &Uid) -> Result<Capabilities> {
    let role = get_my_role(db, study_id, uid).await?;
    Ok(Capabilities::for_role(role))
}
