//! Chat sessions
//!
//! A session pairs one orchestrator with one emitter slot, so a new turn can
//! cancel the previous turn's stream before it starts. The registry keeps
//! several sessions and tracks which one is active; switching cancels the
//! stream of the session being left.

use futures::stream::{BoxStream, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::core::{ProcessOptions, ProcessOutcome, TaskOrchestrator};
use crate::config::Config;
use crate::message_bus::{Event, MessageBus};
use crate::search::SearchAggregator;
use crate::stream::{EmitterSlot, StreamingEmitter};
use sdk::EngineError;

/// One processed turn plus its chunk stream
pub struct Turn<S> {
    pub outcome: ProcessOutcome,
    pub chunks: S,
}

pub struct Session {
    orchestrator: TaskOrchestrator,
    emitter: StreamingEmitter,
    slot: EmitterSlot,
    bus: Option<Arc<MessageBus>>,
}

impl Session {
    pub fn new(orchestrator: TaskOrchestrator, emitter: StreamingEmitter) -> Self {
        Self {
            orchestrator,
            emitter,
            slot: EmitterSlot::new(),
            bus: None,
        }
    }

    pub fn with_message_bus(mut self, bus: Arc<MessageBus>) -> Self {
        self.orchestrator = self.orchestrator.with_message_bus(Arc::clone(&bus));
        self.bus = Some(bus);
        self
    }

    pub fn id(&self) -> &str {
        self.orchestrator.session_id()
    }

    pub fn orchestrator(&self) -> &TaskOrchestrator {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut TaskOrchestrator {
        &mut self.orchestrator
    }

    /// Whether a previous turn's stream is still running
    pub fn is_streaming(&self) -> bool {
        self.slot.is_active()
    }

    /// Process a turn and start streaming its reply
    ///
    /// Any stream from an earlier turn is cancelled first.
    pub async fn submit(
        &mut self,
        text: &str,
        options: &ProcessOptions,
    ) -> Turn<BoxStream<'static, String>> {
        self.cancel_stream().await;

        let outcome = self.orchestrator.process_input(text, options).await;
        let token = self.slot.start();
        let chunks = self.emitter.emit(outcome.response_text.clone(), token).boxed();

        Turn { outcome, chunks }
    }

    /// Cancel the in-flight stream, if any
    pub async fn cancel_stream(&mut self) {
        if !self.slot.is_active() {
            return;
        }
        self.slot.cancel();
        if let Some(bus) = &self.bus {
            bus.publish(Event::EmissionCancelled {
                session_id: self.id().to_string(),
            })
            .await;
        }
    }

    /// End the session; nothing it streamed continues
    pub async fn end(mut self) {
        self.cancel_stream().await;
        tracing::debug!("Session {} ended", self.id());
    }
}

/// Open sessions and the one currently in use
pub struct SessionRegistry {
    config: Config,
    aggregator: Arc<SearchAggregator>,
    bus: Option<Arc<MessageBus>>,
    sessions: HashMap<String, Session>,
    active: Option<String>,
}

impl SessionRegistry {
    pub fn new(config: Config, aggregator: Arc<SearchAggregator>) -> Self {
        Self {
            config,
            aggregator,
            bus: None,
            sessions: HashMap::new(),
            active: None,
        }
    }

    pub fn with_message_bus(mut self, bus: Arc<MessageBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Open a new session and make it active
    pub async fn open(&mut self) -> Result<String, EngineError> {
        let id = Uuid::new_v4().to_string();
        let orchestrator = TaskOrchestrator::new(&self.config, Arc::clone(&self.aggregator))?
            .with_session_id(id.clone());
        let emitter = StreamingEmitter::new(self.config.stream.tick_interval());

        let mut session = Session::new(orchestrator, emitter);
        if let Some(bus) = &self.bus {
            session = session.with_message_bus(Arc::clone(bus));
        }

        self.sessions.insert(id.clone(), session);
        self.switch_to(&id).await?;
        tracing::info!("Opened session {}", id);
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_mut(&mut self) -> Option<&mut Session> {
        let id = self.active.as_ref()?;
        self.sessions.get_mut(id)
    }

    /// Make `id` the active session, cancelling the previous one's stream
    pub async fn switch_to(&mut self, id: &str) -> Result<(), EngineError> {
        if !self.sessions.contains_key(id) {
            return Err(EngineError::UnknownSession(id.to_string()));
        }

        if let Some(previous) = self.active.take() {
            if previous != id {
                if let Some(session) = self.sessions.get_mut(&previous) {
                    session.cancel_stream().await;
                }
            }
        }

        self.active = Some(id.to_string());
        Ok(())
    }

    /// Close a session, discarding its tasks and memory
    pub async fn close(&mut self, id: &str) -> bool {
        let Some(session) = self.sessions.remove(id) else {
            return false;
        };
        session.end().await;

        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
