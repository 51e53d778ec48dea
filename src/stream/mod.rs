//! Word-chunked pseudo-streaming. Takes a complete response string, splits it
//! into whitespace-delimited tokens and delivers them one per timer tick with
//! randomized delays, ending with a single terminal frame. Each stream owns
//! its own cursor and timer task; concurrent streams are independent.

use futures::Stream;
use log::warn;
use rand::Rng;
use serde::Serialize;
use std::error::Error;
use std::pin::Pin;
use std::task::{ Context, Poll };
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

/// Token accounting carried by the terminal frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StreamFrame {
    Token(String),
    Done {
        finish_reason: &'static str,
        usage: Usage,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DonePayload {
    finish_reason: &'static str,
    usage: Usage,
}

impl StreamFrame {
    /// Line-oriented wire form: `0:"<escaped token>"` for tokens and
    /// `d:{"finishReason":...,"usage":{...}}` for the terminal frame, each
    /// newline-terminated.
    pub fn encode(&self) -> String {
        match self {
            // Serializing a plain string cannot fail.
            StreamFrame::Token(text) => {
                format!("0:{}\n", serde_json::to_string(text).unwrap())
            }
            StreamFrame::Done { finish_reason, usage } => {
                let payload = DonePayload {
                    finish_reason,
                    usage: *usage,
                };
                format!("d:{}\n", serde_json::to_string(&payload).unwrap())
            }
        }
    }
}

/// Delay profile for the simulated typing cadence. Injectable so tests can
/// run the emitter with zero delays.
#[derive(Clone, Debug)]
pub struct TypingDelay {
    pub preroll: Duration,
    pub base: Duration,
    pub jitter: Duration,
}

impl Default for TypingDelay {
    fn default() -> Self {
        Self {
            preroll: Duration::from_millis(200),
            base: Duration::from_millis(50),
            jitter: Duration::from_millis(100),
        }
    }
}

impl TypingDelay {
    pub fn from_millis(preroll: u64, base: u64, jitter: u64) -> Self {
        Self {
            preroll: Duration::from_millis(preroll),
            base: Duration::from_millis(base),
            jitter: Duration::from_millis(jitter),
        }
    }

    /// Zero delays, for deterministic tests.
    pub fn none() -> Self {
        Self::from_millis(0, 0, 0)
    }

    fn next_tick(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.base;
        }
        self.base + Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
    }
}

/// Splits on single spaces; every token except the last keeps one trailing
/// space, so concatenating all tokens reproduces the input exactly. Empty
/// input yields no tokens.
pub fn split_words(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let words: Vec<&str> = text.split(' ').collect();
    let last = words.len() - 1;
    words
        .iter()
        .enumerate()
        .map(|(i, w)| {
            if i < last {
                format!("{} ", w)
            } else {
                (*w).to_string()
            }
        })
        .collect()
}

pub struct StreamEmitter {
    delay: TypingDelay,
}

impl StreamEmitter {
    pub fn new(delay: TypingDelay) -> Self {
        Self { delay }
    }

    /// Starts a timer-driven delivery task for `text` and hands back the
    /// frame stream. `prompt_tokens` flows into the terminal frame's usage;
    /// completion tokens are counted here.
    pub fn start(&self, text: &str, prompt_tokens: u32) -> TokenStream {
        let words = split_words(text);
        let usage = Usage {
            prompt_tokens,
            completion_tokens: words.len() as u32,
        };
        let delay = self.delay.clone();

        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay.preroll).await;
            for word in words {
                // Receiver gone: stop quietly, nothing to leak.
                if tx.send(StreamFrame::Token(word)).await.is_err() {
                    return;
                }
                tokio::time::sleep(delay.next_tick()).await;
            }
            let _ = tx
                .send(StreamFrame::Done {
                    finish_reason: "stop",
                    usage,
                })
                .await;
        });

        TokenStream {
            inner: ReceiverStream::new(rx),
            task,
            cancelled: false,
        }
    }
}

/// Ordered frame stream for one response. Aborts its timer task on `cancel`
/// or drop, so no callbacks fire for an abandoned stream.
pub struct TokenStream {
    inner: ReceiverStream<StreamFrame>,
    task: JoinHandle<()>,
    cancelled: bool,
}

impl TokenStream {
    /// Suppresses all pending and future frames and releases the timer task.
    pub fn cancel(&mut self) {
        self.task.abort();
        self.cancelled = true;
    }

    /// In-process delivery: forwards each token to `on_token` and the final
    /// usage to `on_done`. A failing token callback is logged and skipped;
    /// it never aborts delivery of the remaining tokens.
    pub async fn drive<F, D>(mut self, mut on_token: F, on_done: D)
    where
        F: FnMut(&str) -> Result<(), Box<dyn Error + Send + Sync>>,
        D: FnOnce(Usage),
    {
        while let Some(frame) = self.next().await {
            match frame {
                StreamFrame::Token(token) => {
                    if let Err(e) = on_token(&token) {
                        warn!("Token consumer failed, continuing stream: {}", e);
                    }
                }
                StreamFrame::Done { usage, .. } => {
                    on_done(usage);
                    return;
                }
            }
        }
    }
}

impl Stream for TokenStream {
    type Item = StreamFrame;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.cancelled {
            return Poll::Ready(None);
        }
        Pin::new(&mut this.inner).poll_next(cx)
    }
}

impl Drop for TokenStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}
