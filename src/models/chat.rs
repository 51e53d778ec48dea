use chrono::Utc;
use serde::{ Serialize, Deserialize };
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// One entry in a transcript. Assistant messages start empty and grow as
/// stream tokens arrive.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub role: Role,
    pub timestamp: i64,
    #[serde(rename = "userId")]
    pub owner_id: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            role,
            timestamp: Utc::now().timestamp_millis(),
            owner_id: owner_id.into(),
        }
    }

    pub fn user(content: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self::new(Role::User, content, owner_id)
    }

    /// Empty assistant message, ready to receive streamed tokens.
    pub fn assistant(owner_id: impl Into<String>) -> Self {
        Self::new(Role::Assistant, "", owner_id)
    }

    pub fn push_token(&mut self, token: &str) {
        self.content.push_str(token);
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    #[serde(rename = "userId")]
    pub owner_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

impl Chat {
    pub fn new(title: impl Into<String>, owner_id: impl Into<String>) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            messages: Vec::new(),
            owner_id: owner_id.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.updated_at = Utc::now().timestamp_millis();
        self.messages.push(message);
    }
}
