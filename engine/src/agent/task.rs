//! Task and step model
//!
//! A task is one orchestrated user turn. It moves `pending → running →
//! {completed | failed}` and never leaves a terminal state. Steps are
//! appended as execution phases begin and are never removed; each ends in
//! exactly one terminal state.

use chrono::{DateTime, Utc};
use sdk::{EngineError, SearchResponse};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::planner::PlanStep;

/// Kind of work a task represents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Chat,
    WebSearch,
    CodeGeneration,
    FileAnalysis,
    ExternalAction,
}

impl TaskCategory {
    pub fn as_str(&self) -> &str {
        match self {
            TaskCategory::Chat => "chat",
            TaskCategory::WebSearch => "web_search",
            TaskCategory::CodeGeneration => "code_generation",
            TaskCategory::FileAnalysis => "file_analysis",
            TaskCategory::ExternalAction => "external_action",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lifecycle state shared by tasks and steps
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Running)
                | (TaskStatus::Running, TaskStatus::Completed)
                | (TaskStatus::Running, TaskStatus::Failed)
        )
    }

    fn transition(&mut self, next: TaskStatus) -> Result<(), EngineError> {
        if !self.can_transition_to(next) {
            return Err(EngineError::InvalidTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// How a step ended
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "detail", rename_all = "lowercase")]
pub enum StepOutcome {
    Completed(String),
    Failed(String),
}

/// One phase of a task's execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStep {
    pub id: String,
    pub name: String,
    pub status: TaskStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub outcome: Option<StepOutcome>,
}

impl TaskStep {
    /// A step is recorded when its phase starts, so it begins running
    pub fn begin(name: impl Into<String>) -> Self {
        Self {
            id: format!("step_{}", Uuid::new_v4().simple()),
            name: name.into(),
            status: TaskStatus::Running,
            started_at: Utc::now(),
            ended_at: None,
            outcome: None,
        }
    }

    pub fn complete(&mut self, result: impl Into<String>) -> Result<(), EngineError> {
        self.status.transition(TaskStatus::Completed)?;
        self.finish(StepOutcome::Completed(result.into()));
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), EngineError> {
        self.status.transition(TaskStatus::Failed)?;
        self.finish(StepOutcome::Failed(error.into()));
        Ok(())
    }

    fn finish(&mut self, outcome: StepOutcome) {
        self.ended_at = Some(Utc::now());
        self.outcome = Some(outcome);
    }

    /// Wall-clock duration, once the step has ended
    pub fn duration_ms(&self) -> Option<i64> {
        self.ended_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}

/// Details captured when a task is created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskMetadata {
    pub created_at: DateTime<Utc>,
    /// Model id the caller asked for ("auto" when unspecified)
    pub model_id: String,
    pub web_mode: bool,
    /// Model id the router picked for this input
    pub routed_model_id: String,
    /// Phases the planner laid out for this input
    pub task_plan: Vec<PlanStep>,
}

impl TaskMetadata {
    pub fn new(
        model_id: impl Into<String>,
        web_mode: bool,
        routed_model_id: impl Into<String>,
    ) -> Self {
        Self {
            created_at: Utc::now(),
            model_id: model_id.into(),
            web_mode,
            routed_model_id: routed_model_id.into(),
            task_plan: Vec::new(),
        }
    }

    pub fn with_plan(mut self, plan: Vec<PlanStep>) -> Self {
        self.task_plan = plan;
        self
    }
}

/// What a successful strategy produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskOutput {
    pub response: String,
    pub search: Option<SearchResponse>,
}

impl TaskOutput {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            search: None,
        }
    }

    pub fn with_search(response: impl Into<String>, search: SearchResponse) -> Self {
        Self {
            response: response.into(),
            search: Some(search),
        }
    }
}

/// One orchestrated unit of work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub category: TaskCategory,
    pub input: String,
    pub status: TaskStatus,
    pub steps: Vec<TaskStep>,
    pub result: Option<TaskOutput>,
    pub metadata: TaskMetadata,
}

impl Task {
    /// Create a pending task with no steps
    pub fn new(category: TaskCategory, input: impl Into<String>, metadata: TaskMetadata) -> Self {
        Self {
            id: format!("task_{}", Uuid::new_v4().simple()),
            category,
            input: input.into(),
            status: TaskStatus::Pending,
            steps: Vec::new(),
            result: None,
            metadata,
        }
    }

    pub fn start(&mut self) -> Result<(), EngineError> {
        self.status.transition(TaskStatus::Running)
    }

    /// Append a running step; only allowed while the task runs
    pub fn begin_step(&mut self, name: impl Into<String>) -> Result<&mut TaskStep, EngineError> {
        if self.status != TaskStatus::Running {
            return Err(EngineError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: "step".to_string(),
            });
        }
        self.steps.push(TaskStep::begin(name));
        let index = self.steps.len() - 1;
        Ok(&mut self.steps[index])
    }

    /// Complete the current step and the task, recording the result
    pub fn complete(&mut self, output: TaskOutput) -> Result<(), EngineError> {
        self.status.transition(TaskStatus::Completed)?;
        if let Some(step) = self.open_step() {
            step.complete(output.response.clone())?;
        }
        self.result = Some(output);
        Ok(())
    }

    /// Fail the current step and the task
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), EngineError> {
        self.status.transition(TaskStatus::Failed)?;
        if let Some(step) = self.open_step() {
            step.fail(error)?;
        }
        Ok(())
    }

    fn open_step(&mut self) -> Option<&mut TaskStep> {
        self.steps.iter_mut().rev().find(|s| !s.status.is_terminal())
    }

    /// Milliseconds since the task was created
    pub fn age_ms(&self) -> u64 {
        (Utc::now() - self.metadata.created_at)
            .num_milliseconds()
            .max(0) as u64
    }
}
