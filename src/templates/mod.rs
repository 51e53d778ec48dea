use serde::Serialize;

/// Starter prompt shown in the composer UI.
#[derive(Clone, Debug, Serialize)]
pub struct PromptTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub content: &'static str,
    pub category: &'static str,
}

pub const PROMPT_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        id: "1",
        title: "Code Review",
        content: "Please review this code and provide feedback on best practices, potential issues, and improvements:",
        category: "Development",
    },
    PromptTemplate {
        id: "2",
        title: "Email Draft",
        content: "Help me write a professional email for:",
        category: "Communication",
    },
    PromptTemplate {
        id: "3",
        title: "Explain Concept",
        content: "Explain this concept in simple terms with examples:",
        category: "Education",
    },
    PromptTemplate {
        id: "4",
        title: "Brainstorm Ideas",
        content: "Help me brainstorm creative ideas for:",
        category: "Creative",
    },
    PromptTemplate {
        id: "5",
        title: "Debug Issue",
        content: "I'm having trouble with this code. Can you help me debug it?",
        category: "Development",
    },
    PromptTemplate {
        id: "6",
        title: "Meeting Summary",
        content: "Please summarize the key points from this meeting transcript:",
        category: "Business",
    },
];
