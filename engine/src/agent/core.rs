//! Task Orchestrator
//!
//! One orchestrator serves one chat session. `process_input` handles a turn:
//!
//! 1. Identity questions are answered from the profile; no task is created
//! 2. Otherwise a task is created and classified (web search, code, chat)
//! 3. The task runs its category's strategy inside a single step
//! 4. Strategy errors and panics fail the task; the caller gets an apology
//! 5. Successful turns are remembered in long-term memory
//!
//! Every answered turn, identity answers included, is also appended to the
//! session transcript together with the planner's task plan. Failed turns
//! are not recorded there.
//!
//! Nothing that goes wrong inside a turn escapes as an error.

use futures::FutureExt;
use sdk::{EngineError, SearchResponse};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::memory::{
    LongTermMemory, MemoryEntry, TAG_AI_GENERATED, TAG_IDENTITY, TAG_WEB_ENHANCED,
};
use super::planner::plan_tasks;
use super::strategy::{ExecutionStrategy, StrategyRegistry};
use super::task::{Task, TaskCategory, TaskMetadata, TaskOutput, TaskStatus};
use super::transcript::{ConversationTurn, Transcript, TurnMetadata};
use crate::config::{Config, MemoryConfig};
use crate::identity::{IdentityProfile, IdentityResponder};
use crate::llm::router::{ModelRouter, AUTO_MODEL_ID};
use crate::message_bus::{Event, MessageBus};
use crate::search::SearchAggregator;

/// Reply returned whenever a task fails
pub const APOLOGY: &str = "I encountered an error while processing your request. Please try again.";

const WEB_SEARCH_KEYWORDS: &[&str] = &[
    "search", "find", "look up", "what is", "who is", "when did", "where is", "latest",
    "current", "recent", "news", "price", "weather", "stock",
];

const CODE_KEYWORDS: &[&str] = &[
    "code", "function", "class", "component", "algorithm", "implement", "debug", "fix",
    "optimize", "refactor", "typescript", "javascript", "react", "python", "api",
];

/// Caller choices for one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    pub model_id: String,
    pub web_mode: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            model_id: AUTO_MODEL_ID.to_string(),
            web_mode: false,
        }
    }
}

/// Result of one turn
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub response_text: String,
    /// Snapshot of the task, absent for identity answers
    pub task: Option<Task>,
    pub is_canned_identity_response: bool,
    pub search_data: Option<SearchResponse>,
}

/// Summary of a session's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStatus {
    pub session_id: String,
    pub task_count: usize,
    pub memory_entries: usize,
    pub transcript_turns: usize,
    pub last_task_status: Option<TaskStatus>,
}

/// Pick the task category from the orchestrator's keyword families
pub fn classify_task(input: &str) -> TaskCategory {
    let input = input.to_lowercase();

    if WEB_SEARCH_KEYWORDS.iter().any(|k| input.contains(k)) {
        TaskCategory::WebSearch
    } else if CODE_KEYWORDS.iter().any(|k| input.contains(k)) {
        TaskCategory::CodeGeneration
    } else {
        TaskCategory::Chat
    }
}

/// Per-session orchestrator owning tasks and memory
pub struct TaskOrchestrator {
    session_id: String,
    identity: IdentityResponder,
    router: ModelRouter,
    strategies: StrategyRegistry,
    tasks: Vec<Task>,
    memory: LongTermMemory,
    memory_config: MemoryConfig,
    transcript: Transcript,
    bus: Option<Arc<MessageBus>>,
}

impl TaskOrchestrator {
    /// Create an orchestrator with the standard strategies
    pub fn new(config: &Config, aggregator: Arc<SearchAggregator>) -> Result<Self, EngineError> {
        let profile = IdentityProfile::from_config(&config.identity);
        let strategies = StrategyRegistry::standard(&profile, aggregator);

        Ok(Self {
            session_id: Uuid::new_v4().to_string(),
            identity: IdentityResponder::new(profile)?,
            router: ModelRouter::new(config.router.short_prompt_threshold),
            strategies,
            tasks: Vec::new(),
            memory: LongTermMemory::with_capacity(config.memory.capacity),
            memory_config: config.memory.clone(),
            transcript: Transcript::new(),
            bus: None,
        })
    }

    /// Replace the strategy used for `category`
    pub fn with_strategy(
        mut self,
        category: TaskCategory,
        strategy: Arc<dyn ExecutionStrategy>,
    ) -> Self {
        self.strategies.register(category, strategy);
        self
    }

    /// Publish lifecycle events on `bus`
    pub fn with_message_bus(mut self, bus: Arc<MessageBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn router(&self) -> &ModelRouter {
        &self.router
    }

    pub fn profile(&self) -> &IdentityProfile {
        self.identity.profile()
    }

    /// Handle one user turn
    pub async fn process_input(&mut self, text: &str, options: &ProcessOptions) -> ProcessOutcome {
        if let Some(answer) = self.identity.respond(text) {
            info!("Answered identity question ({:?})", answer.topic);
            self.publish(Event::IdentityAnswered {
                topic: format!("{:?}", answer.topic),
            })
            .await;
            self.remember(
                text,
                &answer.text,
                self.memory_config.identity_importance,
                vec![TAG_IDENTITY],
            )
            .await;
            self.transcript.record(
                text,
                &answer.text,
                TurnMetadata {
                    model_used: None,
                    selected_model: options.model_id.clone(),
                    task_plan: Vec::new(),
                    web_mode: options.web_mode,
                    task_id: None,
                    web_enhanced: false,
                },
            );

            return ProcessOutcome {
                response_text: answer.text,
                task: None,
                is_canned_identity_response: true,
                search_data: None,
            };
        }

        let category = classify_task(text);
        let routed = self.router.route(text, Some(&options.model_id));
        debug!(
            "Classified input as {} (routed model: {})",
            category, routed.id
        );

        let metadata = TaskMetadata::new(&options.model_id, options.web_mode, &routed.id)
            .with_plan(plan_tasks(text));
        let mut task = Task::new(category, text, metadata);

        info!("Starting task {} ({})", task.id, category);
        self.publish(Event::TaskStarted {
            task_id: task.id.clone(),
            category: category.to_string(),
            input: text.to_string(),
        })
        .await;

        let outcome = match self.execute(&mut task).await {
            Ok(output) => {
                info!("Task {} completed", task.id);
                self.publish(Event::TaskCompleted {
                    task_id: task.id.clone(),
                    elapsed_ms: task.age_ms(),
                })
                .await;

                if let Some(search) = &output.search {
                    self.publish(Event::SearchCompleted {
                        task_id: task.id.clone(),
                        result_count: search.results.len(),
                        sources: search.contributing_sources.clone(),
                    })
                    .await;
                }

                let mut tags = vec![TAG_AI_GENERATED];
                if output.search.is_some() {
                    tags.push(TAG_WEB_ENHANCED);
                }
                self.remember(
                    text,
                    &output.response,
                    self.memory_config.default_importance,
                    tags,
                )
                .await;
                self.transcript.record(
                    text,
                    &output.response,
                    TurnMetadata {
                        model_used: Some(task.metadata.routed_model_id.clone()),
                        selected_model: task.metadata.model_id.clone(),
                        task_plan: task.metadata.task_plan.clone(),
                        web_mode: task.metadata.web_mode,
                        task_id: Some(task.id.clone()),
                        web_enhanced: output.search.is_some(),
                    },
                );

                ProcessOutcome {
                    response_text: output.response,
                    task: None,
                    is_canned_identity_response: false,
                    search_data: output.search,
                }
            }
            Err(e) => {
                error!("Task {} failed: {}", task.id, e);
                self.publish(Event::TaskFailed {
                    task_id: task.id.clone(),
                    error: e.to_string(),
                })
                .await;

                ProcessOutcome {
                    response_text: APOLOGY.to_string(),
                    task: None,
                    is_canned_identity_response: false,
                    search_data: None,
                }
            }
        };

        self.tasks.push(task.clone());
        ProcessOutcome {
            task: Some(task),
            ..outcome
        }
    }

    /// Run the task's strategy and settle the task from its result
    async fn execute(&self, task: &mut Task) -> Result<TaskOutput, EngineError> {
        let strategy = self.strategies.resolve(task.category);

        task.start()?;
        task.begin_step(strategy.step_name())?;

        let result = match AssertUnwindSafe(strategy.execute(task)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(EngineError::Strategy(format!(
                "Strategy '{}' panicked: {}",
                strategy.step_name(),
                panic_message(panic.as_ref())
            ))),
        };

        match result {
            Ok(output) => {
                task.complete(output.clone())?;
                Ok(output)
            }
            Err(e) => {
                task.fail(e.to_string())?;
                Err(e)
            }
        }
    }

    async fn remember(&mut self, input: &str, response: &str, importance: i32, tags: Vec<&str>) {
        let evicted = self
            .memory
            .insert(MemoryEntry::exchange(input, response, importance, tags));

        if !evicted.is_empty() {
            debug!("Evicted {} memory entries", evicted.len());
            self.publish(Event::MemoryEvicted {
                evicted: evicted.len(),
                lowest_retained_importance: self.memory.lowest_importance(),
            })
            .await;
        }
    }

    async fn publish(&self, event: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(event).await;
        }
    }

    /// Look up a task by id
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// All tasks in creation order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn memory(&self) -> &[MemoryEntry] {
        self.memory.entries()
    }

    pub fn clear_memory(&mut self) {
        info!("Clearing memory for session {}", self.session_id);
        self.memory.clear();
    }

    /// Every answered turn in order
    pub fn history(&self) -> &[ConversationTurn] {
        self.transcript.turns()
    }

    pub fn clear_history(&mut self) {
        info!("Clearing history for session {}", self.session_id);
        self.transcript.clear();
    }

    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            session_id: self.session_id.clone(),
            task_count: self.tasks.len(),
            memory_entries: self.memory.len(),
            transcript_turns: self.transcript.len(),
            last_task_status: self.tasks.last().map(|t| t.status),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
