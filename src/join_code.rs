//! Join code generation and allocation.
//!
//! Codes are 6 symbols drawn from a 32-symbol alphabet of uppercase letters
//! and digits without the look-alikes `I`, `O`, `0` and `1`, giving
//! 32^6 (about 1.07 billion) possible codes.

use sea_orm::{ConnectionTrait, EntityTrait};
use tracing::warn;

use crate::entity::join_code::Entity as JoinCodeEntity;
use crate::error::{Error, Result};

pub const JOIN_CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const JOIN_CODE_LEN: usize = 6;

/// Draws a candidate code, each symbol chosen independently and uniformly.
pub fn random_join_code() -> Result<String> {
    let mut bytes = [0u8; JOIN_CODE_LEN];
    getrandom::fill(&mut bytes).map_err(|e| Error::Entropy(e.to_string()))?;
    // 256 is a multiple of 32, so masking keeps the draw uniform
    Ok(bytes
        .iter()
        .map(|b| JOIN_CODE_ALPHABET[usize::from(b & 31)] as char)
        .collect())
}

/// Canonical form of user-entered codes: surrounding whitespace removed, uppercased.
pub fn normalize_join_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Whether `code` has the shape of a generated code.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == JOIN_CODE_LEN && code.bytes().all(|b| JOIN_CODE_ALPHABET.contains(&b))
}

/// Draws candidates from `draw` until one has no entry in the join code index.
///
/// Pass [`random_join_code`] for real allocations.
///
/// The check is only as strong as the connection it runs on. Study creation
/// calls this inside the transaction that also inserts the index entry, and
/// the index primary key rejects any code claimed concurrently.
pub async fn allocate_join_code_with<C, F>(conn: &C, mut draw: F) -> Result<String>
where
    C: ConnectionTrait,
    F: FnMut() -> Result<String>,
{
    let mut candidate = draw()?;
    while JoinCodeEntity::find_by_id(candidate.clone())
        .one(conn)
        .await?
        .is_some()
    {
        warn!(code = %candidate, "join code already taken, drawing again");
        candidate = draw()?;
    }
    Ok(candidate)
}
