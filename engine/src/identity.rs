//! Assistant identity
//!
//! Questions about who the assistant is, who built it and what it can do are
//! answered from a fixed narrative instead of going through routing. The
//! rules are an ordered table of topic → patterns; the first topic with any
//! matching pattern wins.

use regex::Regex;
use sdk::errors::EngineError;

use crate::config::IdentityConfig;

/// The narrative the identity answers are built from
#[derive(Debug, Clone)]
pub struct IdentityProfile {
    pub name: String,
    pub creator: String,
    pub creator_location: String,
    pub mission: String,
    pub capabilities: Vec<String>,
    pub tone: String,
    pub ethics: Vec<String>,
    pub values: Vec<String>,
    pub architecture: String,
    pub models: Vec<String>,
    pub features: Vec<String>,
    pub created: String,
    pub version: String,
}

impl IdentityProfile {
    /// Build the profile from configuration, filling the rest with defaults
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self {
            name: config.name.clone(),
            creator: config.creator.clone(),
            creator_location: config.creator_location.clone(),
            ..Self::default()
        }
    }

    /// System prompt handed to model backends
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}, an autonomous AI assistant created by {}.\n\n\
             Your mission: {}\n\n\
             Your personality: {}\n\
             Your values: {}\n\
             Your ethics: {}\n\n\
             Always identify yourself as {} and reference your creator when relevant.",
            self.name,
            self.creator,
            self.mission,
            self.tone,
            self.values.join(", "),
            self.ethics.join(", "),
            self.name
        )
    }
}

impl Default for IdentityProfile {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let config = IdentityConfig::default();
        Self {
            name: config.name,
            creator: config.creator,
            creator_location: config.creator_location,
            mission: "To be a helpful conversational assistant that can search the web, \
                      sketch code and answer questions while respecting user privacy."
                .to_string(),
            capabilities: strings(&[
                "Real-time web search across several providers",
                "Code generation outlines",
                "Conversational answers",
                "Memory of important exchanges within a session",
                "Streaming responses",
            ]),
            tone: "Friendly, helpful, and precise".to_string(),
            ethics: strings(&[
                "User privacy first",
                "Transparent and honest communication",
                "Respectful of all users",
            ]),
            values: strings(&["Accessibility", "Reliability", "Openness"]),
            architecture: "Task orchestrator with keyword routing and concurrent search"
                .to_string(),
            models: strings(&["Gemini Pro", "GPT-4 Turbo", "Mixtral 8x7B", "Claude 3 Haiku"]),
            features: strings(&[
                "Adaptive model routing",
                "Multi-provider web search",
                "Importance-ranked session memory",
                "Streaming responses",
            ]),
            created: "2025".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Topic of an identity question, in rule evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityTopic {
    Creator,
    SelfDescription,
    Capabilities,
    Technology,
    Origin,
    Purpose,
    Age,
}

/// A canned answer and the topic that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityAnswer {
    pub topic: IdentityTopic,
    pub text: String,
}

struct IdentityRule {
    topic: IdentityTopic,
    patterns: Vec<Regex>,
}

// Evaluated in order, first match wins. The `\b` after "you" in the
// self-description rule keeps "what are your capabilities" and similar
// questions for the Capabilities rule instead of answering them with the
// self-description.
const RULES: &[(IdentityTopic, &[&str])] = &[
    (
        IdentityTopic::Creator,
        &[
            r"who\s+(created|made|built|developed)\s+you",
            r"who\s+is\s+your\s+(creator|maker|developer|author)",
            r"who\s+are\s+you\s+created\s+by",
            r"tell\s+me\s+about\s+your\s+creator",
        ],
    ),
    (
        IdentityTopic::SelfDescription,
        &[
            r"what\s+are\s+you\b",
            r"who\s+are\s+you\b",
            r"tell\s+me\s+about\s+yourself",
            r"introduce\s+yourself",
        ],
    ),
    (
        IdentityTopic::Capabilities,
        &[
            r"what\s+can\s+you\s+do",
            r"what\s+are\s+your\s+(capabilities|abilities|features)",
            r"how\s+can\s+you\s+help",
        ],
    ),
    (
        IdentityTopic::Technology,
        &[
            r"what\s+models\s+do\s+you\s+use",
            r"what\s+is\s+your\s+architecture",
            r"how\s+do\s+you\s+work",
            r"what\s+technology\s+powers\s+you",
        ],
    ),
    (
        IdentityTopic::Origin,
        &[
            r"where\s+are\s+you\s+from",
            r"where\s+were\s+you\s+(created|made|built)",
            r"what\s+is\s+your\s+origin",
        ],
    ),
    (
        IdentityTopic::Purpose,
        &[
            r"what\s+is\s+your\s+(purpose|mission|goal)",
            r"why\s+were\s+you\s+created",
            r"what\s+is\s+your\s+objective",
        ],
    ),
    (
        IdentityTopic::Age,
        &[
            r"how\s+old\s+are\s+you",
            r"when\s+were\s+you\s+(created|made|built)",
            r"what\s+version\s+are\s+you",
        ],
    ),
];

/// Matches identity questions and renders their answers
pub struct IdentityResponder {
    profile: IdentityProfile,
    rules: Vec<IdentityRule>,
}

impl IdentityResponder {
    /// Compile the rule table for `profile`
    pub fn new(profile: IdentityProfile) -> Result<Self, EngineError> {
        let rules = RULES
            .iter()
            .map(|(topic, patterns)| {
                let patterns = patterns
                    .iter()
                    .map(|p| {
                        Regex::new(&format!("(?i){}", p)).map_err(|e| {
                            EngineError::Config(format!("Invalid identity pattern {}: {}", p, e))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(IdentityRule {
                    topic: *topic,
                    patterns,
                })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        Ok(Self { profile, rules })
    }

    pub fn profile(&self) -> &IdentityProfile {
        &self.profile
    }

    /// Answer `input` if it is an identity question
    pub fn respond(&self, input: &str) -> Option<IdentityAnswer> {
        let input = input.trim();

        self.rules
            .iter()
            .find(|rule| rule.patterns.iter().any(|p| p.is_match(input)))
            .map(|rule| IdentityAnswer {
                topic: rule.topic,
                text: self.render(rule.topic),
            })
    }

    fn render(&self, topic: IdentityTopic) -> String {
        let p = &self.profile;
        match topic {
            IdentityTopic::Creator => format!(
                "I was created by {}, based in {}. They built me to make capable AI \
                 assistance accessible to everyone, and they believe in {}.",
                p.creator,
                p.creator_location,
                p.values.join(", ").to_lowercase()
            ),
            IdentityTopic::SelfDescription => format!(
                "I'm {}, an AI assistant created by {}. My mission is {} I'm capable of {}, \
                 and much more. I aim to be {} and am guided by these principles: {}.",
                p.name,
                p.creator,
                lowercase_first(&p.mission),
                p.capabilities
                    .iter()
                    .take(3)
                    .map(|c| c.to_lowercase())
                    .collect::<Vec<_>>()
                    .join(", "),
                p.tone.to_lowercase(),
                p.ethics.join(", ").to_lowercase()
            ),
            IdentityTopic::Capabilities => format!(
                "My capabilities include: {}. I'm built as a {} and can route between models \
                 such as {}.",
                p.capabilities.join(", "),
                p.architecture.to_lowercase(),
                p.models.join(", ")
            ),
            IdentityTopic::Technology => format!(
                "I'm powered by a {} using several models: {}. My key features include {}.",
                p.architecture.to_lowercase(),
                p.models.join(", "),
                p.features.join(", ")
            ),
            IdentityTopic::Origin => format!(
                "I was created in {} by {}. I was built on freely available models so that \
                 anyone can use me, whatever their budget.",
                p.creator_location, p.creator
            ),
            IdentityTopic::Purpose => format!(
                "My mission is {} I value {} and operate under clear ethical guidelines: {}.",
                lowercase_first(&p.mission),
                p.values.join(", ").to_lowercase(),
                p.ethics.join(", ").to_lowercase()
            ),
            IdentityTopic::Age => format!(
                "I was created in {} and I'm currently version {}. {} keeps improving me \
                 with every release.",
                p.created,
                p.version,
                uppercase_first(&p.creator)
            ),
        }
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn uppercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responder() -> IdentityResponder {
        IdentityResponder::new(IdentityProfile::default()).unwrap()
    }

    #[test]
    fn test_creator_question() {
        let answer = responder().respond("Who created you?").unwrap();
        assert_eq!(answer.topic, IdentityTopic::Creator);
        assert!(answer.text.contains("the Parley Team"));
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let answer = responder().respond("   WHO   ARE   YOU  ").unwrap();
        assert_eq!(answer.topic, IdentityTopic::SelfDescription);
    }

    #[test]
    fn test_first_rule_wins() {
        // Matches both the creator rule and the self rule ("who are you")
        let answer = responder().respond("who are you created by").unwrap();
        assert_eq!(answer.topic, IdentityTopic::Creator);
    }

    #[test]
    fn test_each_topic_matches() {
        let r = responder();
        let cases = [
            ("what can you do", IdentityTopic::Capabilities),
            ("what are your abilities", IdentityTopic::Capabilities),
            ("What are your capabilities?", IdentityTopic::Capabilities),
            ("what technology powers you", IdentityTopic::Technology),
            ("where are you from", IdentityTopic::Origin),
            ("what is your purpose", IdentityTopic::Purpose),
            ("how old are you", IdentityTopic::Age),
        ];
        for (input, topic) in cases {
            assert_eq!(r.respond(input).map(|a| a.topic), Some(topic), "{}", input);
        }
    }

    #[test]
    fn test_non_identity_input() {
        assert!(responder().respond("search for the latest news").is_none());
        assert!(responder().respond("").is_none());
    }

    #[test]
    fn test_answers_are_deterministic() {
        let r = responder();
        assert_eq!(r.respond("what is your mission"), r.respond("what is your mission"));
    }

    #[test]
    fn test_profile_from_config() {
        let config = IdentityConfig {
            name: "Juniper".to_string(),
            creator: "Acme Labs".to_string(),
            creator_location: "Lisbon".to_string(),
        };
        let r = IdentityResponder::new(IdentityProfile::from_config(&config)).unwrap();
        let answer = r.respond("introduce yourself").unwrap();
        assert!(answer.text.starts_with("I'm Juniper"));
        assert!(r.respond("where were you built").unwrap().text.contains("Lisbon"));
    }

    #[test]
    fn test_system_prompt_mentions_name() {
        let prompt = IdentityProfile::default().system_prompt();
        assert!(prompt.starts_with("You are Parley"));
    }
}
