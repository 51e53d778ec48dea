//! Canned-response selection. Classifies free text into a topic bucket by
//! case-insensitive keyword match and picks one response at random, so the
//! same input can answer differently across calls.

use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

const CODE_KEYWORDS: &[&str] = &["code", "program", "function"];
const HELP_KEYWORDS: &[&str] = &["help", "assist", "support"];
const GREETING_KEYWORDS: &[&str] = &["hello", "hi", "hey"];

const CODE_RESPONSES: &[&str] = &[
    "Here's a clean approach to solve that coding problem. First, let's break down the requirements...",
    "That's a common programming challenge. I'd recommend using a modular approach...",
    "Great coding question! The key is to think about the data structure first...",
    "For this programming task, I'd suggest starting with pseudocode...",
];

const HELP_RESPONSES: &[&str] = &[
    "I'm here to help! What specific area would you like assistance with?",
    "Of course! I'd be happy to guide you through this step by step.",
    "Let me help you with that. What's the main challenge you're facing?",
    "I'm glad you asked! Here's how we can tackle this together...",
];

const GREETING_RESPONSES: &[&str] = &[
    "Hello! It's great to meet you. How can I assist you today?",
    "Hi there! I'm excited to chat with you. What's on your mind?",
    "Hello! Welcome to our conversation. What would you like to explore?",
    "Hey! Thanks for reaching out. How can I help you today?",
];

const DEFAULT_RESPONSES: &[&str] = &[
    "That's an interesting question! Let me think about that for a moment.",
    "I understand what you're asking. Here's my perspective on that topic.",
    "Great point! I'd be happy to help you with that.",
    "That's a complex topic. Let me break it down for you.",
    "I see what you mean. Here's how I would approach that problem.",
    "Excellent question! This is something I've been thinking about recently.",
    "That's a fascinating topic. Let me share some insights with you.",
    "I appreciate you bringing this up. Here's what I think about it.",
    "That's a really good observation. Let me elaborate on that.",
    "Interesting perspective! I'd like to add to what you've said.",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topic {
    Code,
    Help,
    Greeting,
    Default,
}

/// Substring match against the keyword sets, in fixed priority order:
/// code beats help beats greeting. Empty or unmatched input is Default.
pub fn classify(input: &str) -> Topic {
    let lower = input.to_lowercase();

    if CODE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Topic::Code
    } else if HELP_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Topic::Help
    } else if GREETING_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Topic::Greeting
    } else {
        Topic::Default
    }
}

pub fn responses_for(topic: Topic) -> &'static [&'static str] {
    match topic {
        Topic::Code => CODE_RESPONSES,
        Topic::Help => HELP_RESPONSES,
        Topic::Greeting => GREETING_RESPONSES,
        Topic::Default => DEFAULT_RESPONSES,
    }
}

pub fn select_response(input: &str) -> &'static str {
    let bucket = responses_for(classify(input));
    bucket
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(DEFAULT_RESPONSES[0])
}

/// In-process variant used by co-located consumers: waits a simulated
/// "thinking" interval (300ms plus up to 700ms of jitter) before selecting.
pub async fn mock_chat_response(input: &str) -> String {
    let jitter = rand::thread_rng().gen_range(0..700);
    tokio::time::sleep(Duration::from_millis(300 + jitter)).await;
    select_response(input).to_string()
}
