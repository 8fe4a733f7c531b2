//! Streaming Emitter
//!
//! Turns a finished response into a sequence of growing prefixes so callers
//! can render it progressively. Sequence correctness lives in
//! [`ChunkSequence`], a plain iterator; timing lives in
//! [`StreamingEmitter::emit`], which pulls from the iterator on a fixed
//! tick. Both stop on a [`CancellationToken`].
//!
//! A session holds at most one active emission through an [`EmitterSlot`].

use std::time::Duration;

use async_stream::stream;
use futures::Stream;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Default delay between chunks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Lazy sequence of growing prefixes of a text
///
/// Chunk *k* ends where the *k*-th whitespace-delimited token ends, so the
/// original spacing is preserved. The last chunk is always the full text,
/// including any trailing whitespace. Text with no tokens yields exactly one
/// chunk equal to the text.
#[derive(Debug, Clone)]
pub struct ChunkSequence {
    text: String,
    pos: usize,
    emitted: usize,
    finished: bool,
    cancel: Option<CancellationToken>,
}

impl ChunkSequence {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pos: 0,
            emitted: 0,
            finished: false,
            cancel: None,
        }
    }

    /// Stop yielding as soon as `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Number of chunks yielded so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }

    fn finish_with_full_text(&mut self) -> Option<String> {
        self.finished = true;
        self.emitted += 1;
        Some(self.text.clone())
    }
}

impl Iterator for ChunkSequence {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.finished {
            return None;
        }
        if self.is_cancelled() {
            self.finished = true;
            return None;
        }

        let rest = &self.text[self.pos..];
        let Some(start) = rest
            .char_indices()
            .find(|(_, c)| !c.is_whitespace())
            .map(|(i, _)| self.pos + i)
        else {
            // No tokens left
            if self.emitted == 0 {
                return self.finish_with_full_text();
            }
            self.finished = true;
            return None;
        };

        let end = self.text[start..]
            .char_indices()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, _)| start + i)
            .unwrap_or(self.text.len());
        self.pos = end;

        let has_more = self.text[end..].chars().any(|c| !c.is_whitespace());
        if !has_more {
            return self.finish_with_full_text();
        }

        self.emitted += 1;
        Some(self.text[..end].to_string())
    }
}

/// Emits chunk sequences on a fixed tick
#[derive(Debug, Clone)]
pub struct StreamingEmitter {
    tick_interval: Duration,
}

impl StreamingEmitter {
    pub fn new(tick_interval: Duration) -> Self {
        Self { tick_interval }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Stream the growing prefixes of `text`
    ///
    /// The first chunk is produced immediately and each following chunk one
    /// tick later. Once `cancel` fires no further chunk is produced. The
    /// token is cancelled when the stream ends or is dropped, so whoever
    /// holds it can tell the emission is over.
    pub fn emit(
        &self,
        text: impl Into<String>,
        cancel: CancellationToken,
    ) -> impl Stream<Item = String> + Send + 'static {
        let tick = self.tick_interval;
        let mut chunks = ChunkSequence::new(text).with_cancellation(cancel.clone());
        let finished = cancel.clone().drop_guard();

        stream! {
            let _finished = finished;
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let next = tokio::select! {
                    biased;

                    _ = cancel.cancelled() => None,
                    _ = interval.tick() => chunks.next(),
                };

                match next {
                    Some(chunk) => yield chunk,
                    None => break,
                }
            }

            if cancel.is_cancelled() {
                tracing::debug!("Emission cancelled after {} chunks", chunks.emitted());
            } else {
                tracing::trace!("Emission finished after {} chunks", chunks.emitted());
            }
        }
    }
}

impl Default for StreamingEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

/// Holder of a session's single active emission
#[derive(Debug, Default)]
pub struct EmitterSlot {
    active: Option<CancellationToken>,
}

impl EmitterSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any in-flight emission and hand out a token for the next one
    pub fn start(&mut self) -> CancellationToken {
        self.cancel();
        let token = CancellationToken::new();
        self.active = Some(token.clone());
        token
    }

    /// Stop the current emission, if any
    pub fn cancel(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }

    /// Whether the current emission is still producing chunks
    pub fn is_active(&self) -> bool {
        self.active.as_ref().is_some_and(|t| !t.is_cancelled())
    }
}

impl Drop for EmitterSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}
