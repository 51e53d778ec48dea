use chrono::Utc;
use serde::{ Serialize, Deserialize };
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl User {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: format!("user-{}", Uuid::new_v4()),
            email: email.into(),
            name: name.into(),
            created_at: Utc::now().timestamp_millis(),
        }
    }

    /// Fixed-id constructor for the seeded demo accounts.
    pub fn seeded(id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            created_at: Utc::now().timestamp_millis(),
        }
    }
}
