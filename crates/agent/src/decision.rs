//! Turning raw model output into an [`AgentDecision`].
//!
//! The model is asked to answer in a small line-oriented format:
//!
//! ```text
//! Thought: Do I need to use a tool? Yes
//! Action: Search
//! Action Input: today's weather
//! ```
//!
//! or, when it can answer directly:
//!
//! ```text
//! Final Answer: It's sunny, 20C
//! ```
//!
//! Output without any marker is taken as the final answer verbatim. All
//! knowledge of the format lives here so the session loop only ever sees
//! the two-variant decision.

use jarvis_core::tool::ToolRegistry;
use thiserror::Error;

const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";
const OBSERVATION: &str = "Observation:";
const FINAL_ANSWER: &str = "Final Answer:";

/// What the model decided to do this iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentDecision {
    FinalAnswer(String),
    ToolInvocation { tool_name: String, tool_input: String },
}

/// Model output that carried a tool marker but could not be acted on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("'Action:' must name a tool")]
    MissingToolName,

    #[error("'Action: {tool_name}' must be followed by an 'Action Input:' line")]
    MissingActionInput { tool_name: String },

    #[error("'{tool_name}' is not an available tool")]
    UnknownTool { tool_name: String },

    #[error("output contains both an action and a final answer")]
    Ambiguous,
}

/// Parse one model response against the tools in `registry`.
pub fn parse_decision(raw: &str, registry: &ToolRegistry) -> Result<AgentDecision, ParseFailure> {
    let lines: Vec<&str> = raw.lines().collect();

    let Some(action_at) = lines.iter().position(|l| strip_marker(l, ACTION).is_some()) else {
        return Ok(AgentDecision::FinalAnswer(final_answer_text(raw)));
    };

    if lines.iter().any(|l| strip_marker(l, FINAL_ANSWER).is_some()) {
        return Err(ParseFailure::Ambiguous);
    }

    let tool_name = strip_marker(lines[action_at], ACTION)
        .map(clean_value)
        .unwrap_or_default();
    if tool_name.is_empty() {
        return Err(ParseFailure::MissingToolName);
    }

    let Some(input_at) = lines[action_at + 1..]
        .iter()
        .position(|l| strip_marker(l, ACTION_INPUT).is_some())
        .map(|offset| action_at + 1 + offset)
    else {
        return Err(ParseFailure::MissingActionInput { tool_name });
    };

    if !registry.contains(&tool_name) {
        return Err(ParseFailure::UnknownTool { tool_name });
    }

    // The input may continue over several lines, up to a hallucinated
    // observation or the end of the output.
    let mut input_lines = vec![strip_marker(lines[input_at], ACTION_INPUT).unwrap_or_default()];
    input_lines.extend(
        lines[input_at + 1..]
            .iter()
            .take_while(|l| strip_marker(l, OBSERVATION).is_none())
            .copied(),
    );
    let tool_input = clean_value(&input_lines.join("\n"));

    Ok(AgentDecision::ToolInvocation { tool_name, tool_input })
}

/// The answer text: whatever follows the last `Final Answer:` marker, or
/// the whole output when there is none.
fn final_answer_text(raw: &str) -> String {
    match raw.rfind(FINAL_ANSWER) {
        Some(at) => raw[at + FINAL_ANSWER.len()..].trim().to_string(),
        None => raw.trim().to_string(),
    }
}

fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    line.trim_start().strip_prefix(marker)
}

/// Trim whitespace and one layer of quotes or backticks the model may add.
fn clean_value(value: &str) -> String {
    let trimmed = value.trim();
    let unquoted = ['"', '`', '\'']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}
