//! Prompt assembly for one model call.
//!
//! A prompt is built fresh for every iteration from three sources: the
//! committed conversation history, the current user input, and the
//! turn-local scratchpad of model outputs and tool observations.

use jarvis_core::provider::{PromptContext, PromptMessage, ToolDefinition};
use jarvis_core::turn::Role;
use jarvis_memory::HistoryView;

/// Stop sequence that keeps the model from inventing its own observations.
pub const OBSERVATION_STOP: &str = "\nObservation:";

const FORMAT_REMINDER: &str = "Your last reply could not be understood. \
Reply with either an 'Action:' line naming one of the tools followed by an \
'Action Input:' line, or with a line starting 'Final Answer:'.";

/// Something that happened earlier in the current turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScratchEntry {
    /// Raw text the model produced.
    ModelOutput(String),
    /// Result of the tool the model asked for.
    Observation(String),
    /// Nudge sent after an unparseable reply.
    FormatReminder(String),
}

impl ScratchEntry {
    pub fn reminder(failure: impl std::fmt::Display) -> Self {
        Self::FormatReminder(format!("{FORMAT_REMINDER} ({failure})"))
    }

    fn to_message(&self) -> PromptMessage {
        match self {
            Self::ModelOutput(text) => PromptMessage::assistant(text.clone()),
            Self::Observation(text) => PromptMessage::user(format!("Observation: {text}")),
            Self::FormatReminder(text) => PromptMessage::user(text.clone()),
        }
    }
}

/// The standing instructions: persona, tool list and reply format.
pub fn system_prompt(tools: &[ToolDefinition]) -> String {
    let mut prompt = String::from(
        "You are Jarvis, a helpful conversational assistant. You can answer \
         questions directly, and you can use tools when you need current or \
         external information.\n\n",
    );

    if tools.is_empty() {
        prompt.push_str("You have no tools available.\n\n");
    } else {
        prompt.push_str("TOOLS:\n------\nYou have access to the following tools:\n\n");
        for tool in tools {
            prompt.push_str(&format!("> {}: {}\n", tool.name, tool.description));
        }
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        prompt.push_str(&format!(
            "\nTo use a tool, reply in exactly this format:\n\n\
             Thought: Do I need to use a tool? Yes\n\
             Action: the tool to use, one of [{}]\n\
             Action Input: the input to the tool\n\n\
             The tool result will be sent back to you as an Observation.\n\n",
            names.join(", ")
        ));
    }

    prompt.push_str(
        "When you have a response for the user, or do not need a tool, reply \
         in exactly this format:\n\n\
         Thought: Do I need to use a tool? No\n\
         Final Answer: your response here",
    );
    prompt
}

/// Build the prompt for the next model call of the current turn.
pub fn build(
    history: HistoryView<'_>,
    tools: &[ToolDefinition],
    user_input: &str,
    scratchpad: &[ScratchEntry],
) -> PromptContext {
    let mut messages = Vec::with_capacity(history.len() + scratchpad.len() + 2);
    messages.push(PromptMessage::system(system_prompt(tools)));

    for turn in history {
        messages.push(match turn.role {
            Role::User => PromptMessage::user(turn.content.clone()),
            Role::Agent => PromptMessage::assistant(turn.content.clone()),
            Role::Tool => PromptMessage::user(format!("Observation: {}", turn.content)),
        });
    }

    messages.push(PromptMessage::user(user_input));
    messages.extend(scratchpad.iter().map(ScratchEntry::to_message));

    PromptContext {
        messages,
        tools: tools.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jarvis_core::provider::PromptRole;
    use jarvis_core::turn::Role;
    use jarvis_memory::ConversationMemory;
    use jarvis_core::memory::ViewPolicy;

    fn search() -> ToolDefinition {
        ToolDefinition {
            name: "Search".into(),
            description: "Useful for searching the internet for current information.".into(),
        }
    }

    #[test]
    fn system_prompt_lists_tools_and_format() {
        let prompt = system_prompt(&[search()]);
        assert!(prompt.contains("Jarvis"));
        assert!(prompt.contains("> Search: Useful for searching"));
        assert!(prompt.contains("one of [Search]"));
        assert!(prompt.contains("Final Answer:"));
    }

    #[test]
    fn system_prompt_without_tools() {
        let prompt = system_prompt(&[]);
        assert!(prompt.contains("no tools available"));
        assert!(!prompt.contains("Action Input:"));
    }

    #[test]
    fn first_call_has_system_and_input_only() {
        let memory = ConversationMemory::new();
        let context = build(memory.view(ViewPolicy::All), &[search()], "hi", &[]);
        assert_eq!(context.messages.len(), 2);
        assert_eq!(context.messages[0].role, PromptRole::System);
        assert_eq!(context.messages[1].content, "hi");
        assert_eq!(context.tools.len(), 1);
    }

    #[test]
    fn history_roles_are_mapped() {
        let mut memory = ConversationMemory::new();
        memory.record(Role::User, "weather?");
        memory.record(Role::Tool, "sunny");
        memory.record(Role::Agent, "It's sunny.");

        let context = build(memory.view(ViewPolicy::All), &[], "thanks", &[]);
        let roles: Vec<PromptRole> = context.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                PromptRole::System,
                PromptRole::User,
                PromptRole::User,
                PromptRole::Assistant,
                PromptRole::User,
            ]
        );
        assert_eq!(context.messages[2].content, "Observation: sunny");
    }

    #[test]
    fn scratchpad_follows_user_input() {
        let memory = ConversationMemory::new();
        let scratch = vec![
            ScratchEntry::ModelOutput("Action: Search\nAction Input: weather".into()),
            ScratchEntry::Observation("sunny".into()),
        ];
        let context = build(memory.view(ViewPolicy::All), &[search()], "weather?", &scratch);
        let tail: Vec<&str> = context.messages[1..].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            tail,
            vec!["weather?", "Action: Search\nAction Input: weather", "Observation: sunny"]
        );
        assert_eq!(context.messages[2].role, PromptRole::Assistant);
    }

    #[test]
    fn reminder_mentions_the_failure() {
        let entry = ScratchEntry::reminder("'Calculator' is not an available tool");
        let ScratchEntry::FormatReminder(text) = entry else {
            panic!("expected reminder");
        };
        assert!(text.contains("Final Answer:"));
        assert!(text.contains("Calculator"));
    }
}
