//! Transcript export for download by the UI layer.

use chrono::Utc;

use crate::models::chat::{ Chat, Role };

pub fn chat_to_json(chat: &Chat) -> serde_json::Result<String> {
    serde_json::to_string_pretty(chat)
}

/// `# <title>` followed by one `**You:** / **Assistant:**` block per message.
pub fn chat_to_markdown(chat: &Chat) -> String {
    let body = chat
        .messages
        .iter()
        .map(|msg| {
            let speaker = match msg.role {
                Role::User => "You",
                Role::Assistant => "Assistant",
            };
            format!("**{}:** {}", speaker, msg.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("# {}\n\n{}", chat.title, body)
}

pub fn export_file_name(title: &str, extension: &str) -> String {
    format!("chat-{}-{}.{}", title, Utc::now().format("%Y-%m-%d"), extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::ChatMessage;

    fn sample_chat() -> Chat {
        let mut chat = Chat::new("Greetings", "demo-user-1");
        chat.push(ChatMessage::user("hello there", "demo-user-1"));
        let mut reply = ChatMessage::assistant("demo-user-1");
        reply.push_token("Hi ");
        reply.push_token("yourself!");
        chat.push(reply);
        chat
    }

    #[test]
    fn markdown_labels_both_speakers() {
        let md = chat_to_markdown(&sample_chat());
        assert!(md.starts_with("# Greetings\n\n"));
        assert!(md.contains("**You:** hello there"));
        assert!(md.contains("**Assistant:** Hi yourself!"));
    }

    #[test]
    fn json_export_round_trips() {
        let chat = sample_chat();
        let json = chat_to_json(&chat).unwrap();
        let back: Chat = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, chat.id);
        assert_eq!(back.messages.len(), 2);
        assert_eq!(back.messages[1].content, "Hi yourself!");
    }

    #[test]
    fn file_name_carries_title_and_date() {
        let name = export_file_name("Greetings", "md");
        assert!(name.starts_with("chat-Greetings-"));
        assert!(name.ends_with(".md"));
    }
}
