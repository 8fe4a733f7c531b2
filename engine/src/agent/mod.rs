//! Task orchestration
//!
//! This module owns everything that happens inside one chat session: the
//! task model, the planner, execution strategies, the importance-ranked
//! long-term memory, the full conversation transcript, the orchestrator that
//! ties them together, and the session wrapper that pairs an orchestrator
//! with its streaming output.

pub mod core;
pub mod memory;
pub mod planner;
pub mod session;
pub mod strategy;
pub mod task;
pub mod transcript;

pub use self::core::{classify_task, AgentStatus, ProcessOptions, ProcessOutcome, TaskOrchestrator, APOLOGY};
pub use memory::{LongTermMemory, MemoryEntry};
pub use planner::{plan_tasks, PlanStep};
pub use session::{Session, SessionRegistry, Turn};
pub use strategy::{
    ChatStrategy, CodeGenerationStrategy, ExecutionStrategy, StrategyRegistry, WebSearchStrategy,
};
pub use task::{StepOutcome, Task, TaskCategory, TaskMetadata, TaskOutput, TaskStatus, TaskStep};
pub use transcript::{ConversationTurn, Transcript, TurnMetadata};
