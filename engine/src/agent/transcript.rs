//! Conversation transcript
//!
//! Full, ordered record of a session's answered turns. Unlike long-term
//! memory nothing is ever evicted; only [`Transcript::clear`] removes turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::planner::PlanStep;

/// How a turn was answered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnMetadata {
    /// Model the router picked, absent for identity answers
    pub model_used: Option<String>,
    /// Model id the caller asked for
    pub selected_model: String,
    pub task_plan: Vec<PlanStep>,
    pub web_mode: bool,
    /// Task that produced the reply, absent for identity answers
    pub task_id: Option<String>,
    pub web_enhanced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub reply: String,
    pub metadata: TurnMetadata,
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        user: impl Into<String>,
        reply: impl Into<String>,
        metadata: TurnMetadata,
    ) {
        self.turns.push(ConversationTurn {
            timestamp: Utc::now(),
            user: user.into(),
            reply: reply.into(),
            metadata,
        });
    }

    /// Turns in the order they happened
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
