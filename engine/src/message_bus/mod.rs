//! Message Bus for observing the engine
//!
//! The MessageBus provides a pub/sub pattern so front ends, loggers and tests
//! can watch what a session is doing without being wired into it. Events are
//! purely observational: nothing in the engine waits for a subscriber, and a
//! subscriber that falls behind misses events rather than stalling a turn.
//!
//! Each subscriber gets a bounded channel. Subscriptions are either for one
//! event type or for `EventType::All`.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Channel buffer size for bounded channels
const CHANNEL_BUFFER_SIZE: usize = 100;

/// Event types that can be published on the message bus
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum EventType {
    /// Task has started execution
    TaskStarted,
    /// Task has completed successfully
    TaskCompleted,
    /// Task has failed
    TaskFailed,
    /// An identity question was answered without a task
    IdentityAnswered,
    /// A web search finished for a task
    SearchCompleted,
    /// Memory entries were dropped to stay within capacity
    MemoryEvicted,
    /// An in-flight emission was cancelled
    EmissionCancelled,
    /// Subscribe to all event types
    All,
}

/// Events that can be published on the message bus
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    TaskStarted {
        task_id: String,
        category: String,
        input: String,
    },
    TaskCompleted {
        task_id: String,
        elapsed_ms: u64,
    },
    TaskFailed {
        task_id: String,
        error: String,
    },
    IdentityAnswered {
        topic: String,
    },
    SearchCompleted {
        task_id: String,
        result_count: usize,
        sources: Vec<String>,
    },
    MemoryEvicted {
        evicted: usize,
        lowest_retained_importance: Option<i32>,
    },
    EmissionCancelled {
        session_id: String,
    },
}

impl Event {
    /// Get the event type for this event
    pub fn event_type(&self) -> EventType {
        match self {
            Event::TaskStarted { .. } => EventType::TaskStarted,
            Event::TaskCompleted { .. } => EventType::TaskCompleted,
            Event::TaskFailed { .. } => EventType::TaskFailed,
            Event::IdentityAnswered { .. } => EventType::IdentityAnswered,
            Event::SearchCompleted { .. } => EventType::SearchCompleted,
            Event::MemoryEvicted { .. } => EventType::MemoryEvicted,
            Event::EmissionCancelled { .. } => EventType::EmissionCancelled,
        }
    }
}

/// Message bus for pub/sub communication
pub struct MessageBus {
    /// Map of event types to lists of subscribers
    channels: Arc<Mutex<HashMap<EventType, Vec<mpsc::Sender<Event>>>>>,
}

impl MessageBus {
    /// Create a new MessageBus
    pub fn new() -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Subscribe to a specific event type, or `EventType::All`
    pub async fn subscribe(&self, event_type: EventType) -> mpsc::Receiver<Event> {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let mut channels = self.channels.lock().await;
        channels.entry(event_type).or_default().push(tx);
        rx
    }

    /// Publish an event to all matching subscribers
    ///
    /// Never waits on a subscriber. A full channel drops the event for that
    /// subscriber; closed channels are pruned.
    pub async fn publish(&self, event: Event) {
        let mut channels = self.channels.lock().await;
        let event_type = event.event_type();

        for key in [event_type, EventType::All] {
            if let Some(subscribers) = channels.get_mut(&key) {
                subscribers.retain(|tx| match tx.try_send(event.clone()) {
                    Ok(()) => true,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::debug!("Subscriber lagging, dropped {:?} event", event_type);
                        true
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => false,
                });
            }
        }
    }

    /// Number of live subscriptions across all event types
    pub async fn subscriber_count(&self) -> usize {
        let channels = self.channels.lock().await;
        channels.values().map(|s| s.len()).sum()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
