//! Prompt construction for the five answer modes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::{AppError, ChatMessage, SearchHit};

/// Characters of each document included in the prompt context.
pub const CONTEXT_CONTENT_CHARS: usize = 500;

pub const NO_DOCUMENTS_CONTEXT: &str = "No relevant legal documents found.";

/// Answer style requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssistantMode {
    #[default]
    General,
    Lawyer,
    Argument,
    Research,
    Simple,
}

/// How a mode is presented to users.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModeInfo {
    pub mode: AssistantMode,
    pub icon: String,
    pub title: String,
    pub description: String,
    pub best_for: String,
    pub examples: Vec<String>,
}

impl AssistantMode {
    pub const ALL: [AssistantMode; 5] = [
        AssistantMode::General,
        AssistantMode::Lawyer,
        AssistantMode::Argument,
        AssistantMode::Research,
        AssistantMode::Simple,
    ];

    /// Parse a mode name; anything unrecognised answers in general mode.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Lawyer => "lawyer",
            Self::Argument => "argument",
            Self::Research => "research",
            Self::Simple => "simple",
        }
    }

    pub fn info(&self) -> ModeInfo {
        let (icon, title, description, best_for, examples): (_, _, _, _, Vec<&str>) = match self {
            Self::General => (
                "🤖",
                "General Legal Assistant",
                "Provides balanced legal information with clear explanations and relevant citations.",
                "General legal questions, understanding laws, basic legal guidance",
                vec![
                    "What is the punishment for theft in Bangladesh?",
                    "How do I register a company in Bangladesh?",
                    "What are the fundamental rights in the constitution?",
                ],
            ),
            Self::Lawyer => (
                "⚖️",
                "Legal Professional Mode",
                "Comprehensive legal analysis with formal language, citations, and professional insights.",
                "Complex legal analysis, professional legal research, detailed legal opinions",
                vec![
                    "Analyze the legal implications of breach of contract under Bangladesh law",
                    "What are the procedural requirements for filing a civil suit?",
                    "Compare the penalties for different types of fraud",
                ],
            ),
            Self::Argument => (
                "🎯",
                "Argument Builder",
                "Helps build legal arguments and counterarguments with supporting evidence.",
                "Case preparation, debate preparation, understanding different legal perspectives",
                vec![
                    "Build arguments for and against digital privacy rights",
                    "What are the defenses available in a defamation case?",
                    "Arguments for contract rescission due to misrepresentation",
                ],
            ),
            Self::Research => (
                "📚",
                "Legal Researcher",
                "Comprehensive research with historical context, cross-references, and extensive citations.",
                "Academic research, legislative history, comprehensive legal analysis",
                vec![
                    "Historical development of labor laws in Bangladesh",
                    "All amendments to the Evidence Act since independence",
                    "Cross-references between family law and inheritance law",
                ],
            ),
            Self::Simple => (
                "👤",
                "Simple Explanation Mode",
                "Explains legal concepts in plain language that anyone can understand.",
                "Learning legal basics, understanding rights, citizen-friendly explanations",
                vec![
                    "Explain what a contract means in simple terms",
                    "What rights do tenants have?",
                    "How does the court system work in Bangladesh?",
                ],
            ),
        };

        ModeInfo {
            mode: *self,
            icon: icon.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            best_for: best_for.to_string(),
            examples: examples.into_iter().map(str::to_string).collect(),
        }
    }

    fn instructions(&self) -> &'static str {
        match self {
            Self::Lawyer => {
                "LAWYER MODE: You are acting as a legal professional providing expert legal advice.

Instructions:
1. Provide comprehensive legal analysis
2. Cite specific acts, sections, and years
3. Explain legal implications and consequences
4. Suggest legal strategies or approaches
5. Mention relevant precedents if applicable
6. Use formal legal language
7. Always caveat that this is general guidance and recommend consulting a practicing lawyer for specific cases

Response format: Provide detailed legal analysis with citations."
            }
            Self::Argument => {
                "ARGUMENT MODE: Help build legal arguments and counterarguments.

Instructions:
1. Identify the main legal issues
2. Present arguments for different sides
3. Cite supporting legal provisions
4. Identify potential weaknesses in arguments
5. Suggest evidence or precedents that might be relevant
6. Present both plaintiff and defendant perspectives where applicable

Response format: Structure as \"Arguments For:\" and \"Arguments Against:\" with legal citations."
            }
            Self::Research => {
                "RESEARCH MODE: Provide comprehensive legal research assistance.

Instructions:
1. Identify all relevant laws and regulations
2. Provide historical context and amendments
3. Compare with similar provisions in other acts
4. Explain the legislative intent and purpose
5. List related acts and cross-references
6. Provide implementation guidelines if available

Response format: Comprehensive research summary with extensive citations."
            }
            Self::Simple => {
                "SIMPLE MODE: Explain legal concepts in easy-to-understand language.

Instructions:
1. Use simple, non-technical language
2. Explain legal jargon and concepts
3. Provide practical examples
4. Focus on what it means for ordinary citizens
5. Break down complex procedures into steps
6. Avoid excessive legal citations

Response format: Clear, simple explanation that a non-lawyer can understand."
            }
            Self::General => {
                "GENERAL MODE: Provide balanced legal information and guidance.

Instructions:
1. Answer the question directly and clearly
2. Provide relevant legal context
3. Cite applicable laws with act names and years
4. Explain practical implications
5. Maintain professional but accessible tone
6. Suggest next steps if appropriate

Response format: Clear, informative response with appropriate legal citations."
            }
        }
    }
}

impl FromStr for AssistantMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(Self::General),
            "lawyer" => Ok(Self::Lawyer),
            "argument" => Ok(Self::Argument),
            "research" => Ok(Self::Research),
            "simple" => Ok(Self::Simple),
            other => Err(AppError::InvalidInput(format!(
                "Unknown mode '{}'. Use: general, lawyer, argument, research, simple",
                other
            ))),
        }
    }
}

impl std::fmt::Display for AssistantMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render retrieved documents as the prompt's context block.
pub fn build_context(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_DOCUMENTS_CONTEXT.to_string();
    }

    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            let meta = &hit.metadata;
            let or_na = |s: &str| if s.is_empty() { "N/A".to_string() } else { s.to_string() };
            let section = meta
                .section_title
                .as_deref()
                .unwrap_or("Overview");
            let excerpt: String = hit.content.chars().take(CONTEXT_CONTENT_CHARS).collect();

            format!(
                "Document {}:\nTitle: {}\nYear: {}\nSection: {}\nStatus: {}\nContent: {}...",
                i + 1,
                or_na(&meta.act_title),
                or_na(&meta.act_year),
                section,
                if meta.is_repealed { "Repealed" } else { "Active" },
                excerpt
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assemble the full prompt for `mode`.
pub fn build_prompt(
    mode: AssistantMode,
    query: &str,
    context: &str,
    history: &[ChatMessage],
) -> String {
    let mut prompt = format!(
        "You are a Bangladesh Legal Assistant AI, specialized in helping with legal questions based on the Bangladesh legal database.\n\nAvailable Legal Context:\n{}\n\nCurrent Query: {}",
        context, query
    );

    if !history.is_empty() {
        prompt.push_str("\n\nConversation so far:\n");
        for message in history {
            let speaker = match message.role {
                crate::types::MessageRole::User => "User",
                crate::types::MessageRole::Assistant => "Assistant",
            };
            prompt.push_str(&format!("{}: {}\n", speaker, message.content.trim()));
        }
        // Drop the trailing newline from the last turn
        prompt.pop();
    }

    prompt.push_str("\n\n");
    prompt.push_str(mode.instructions());
    prompt.push('\n');
    prompt
}
