use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::session::Identity;

/// Row of the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash
    pub created_at: OffsetDateTime,
}

impl User {
    /// The identity scans are stamped with.
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            email: self.email.clone(),
        }
    }
}
