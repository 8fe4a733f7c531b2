//! Task planner
//!
//! Maps an input onto the ordered list of phases a complete answer would go
//! through. The plan is advisory: it is recorded on the task and in the
//! transcript, while execution is still driven by the task category.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One planned phase of answering an input
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlanStep {
    Analyze,
    Summarize,
    Parse,
    GenerateCode,
    DetectLanguage,
    Translate,
    WebBrowse,
    CreativeGeneration,
    GeneralResponse,
}

impl PlanStep {
    pub fn as_str(&self) -> &str {
        match self {
            PlanStep::Analyze => "analyze",
            PlanStep::Summarize => "summarize",
            PlanStep::Parse => "parse",
            PlanStep::GenerateCode => "generate_code",
            PlanStep::DetectLanguage => "detect_language",
            PlanStep::Translate => "translate",
            PlanStep::WebBrowse => "web_browse",
            PlanStep::CreativeGeneration => "creative_generation",
            PlanStep::GeneralResponse => "general_response",
        }
    }
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// First matching family wins
const PLAN_TABLE: &[(&[&str], &[PlanStep])] = &[
    (
        &["summarize", "summary", "tl;dr"],
        &[PlanStep::Analyze, PlanStep::Summarize],
    ),
    (
        &["code", "programming", "function", "debug"],
        &[PlanStep::Parse, PlanStep::GenerateCode],
    ),
    (
        &["translate", "translation"],
        &[PlanStep::DetectLanguage, PlanStep::Translate],
    ),
    (
        &["search", "look up", "find", "what is", "who is"],
        &[PlanStep::WebBrowse, PlanStep::Analyze, PlanStep::Summarize],
    ),
    (
        &["create", "write", "poem", "story"],
        &[PlanStep::CreativeGeneration],
    ),
];

/// Plan the phases for `input`; never empty
pub fn plan_tasks(input: &str) -> Vec<PlanStep> {
    let input = input.to_lowercase();

    PLAN_TABLE
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| input.contains(k)))
        .map(|(_, steps)| steps.to_vec())
        .unwrap_or_else(|| vec![PlanStep::GeneralResponse])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_families() {
        assert_eq!(
            plan_tasks("Summarize this article"),
            vec![PlanStep::Analyze, PlanStep::Summarize]
        );
        assert_eq!(
            plan_tasks("debug my parser"),
            vec![PlanStep::Parse, PlanStep::GenerateCode]
        );
        assert_eq!(
            plan_tasks("translate hello to French"),
            vec![PlanStep::DetectLanguage, PlanStep::Translate]
        );
        assert_eq!(
            plan_tasks("what is the tallest tree"),
            vec![PlanStep::WebBrowse, PlanStep::Analyze, PlanStep::Summarize]
        );
        assert_eq!(plan_tasks("write a poem"), vec![PlanStep::CreativeGeneration]);
        assert_eq!(plan_tasks("hello there"), vec![PlanStep::GeneralResponse]);
    }

    #[test]
    fn test_earlier_family_wins() {
        // "summary" beats "code"
        assert_eq!(
            plan_tasks("give me a summary of this code"),
            vec![PlanStep::Analyze, PlanStep::Summarize]
        );
        // "function" beats "write"
        assert_eq!(
            plan_tasks("write a function"),
            vec![PlanStep::Parse, PlanStep::GenerateCode]
        );
    }

    #[test]
    fn test_plan_serializes_snake_case() {
        let json = serde_json::to_string(&plan_tasks("find rust news")).unwrap();
        assert_eq!(json, r#"["web_browse","analyze","summarize"]"#);
        assert_eq!(PlanStep::GenerateCode.to_string(), "generate_code");
    }
}
