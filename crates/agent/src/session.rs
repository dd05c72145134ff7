//! The agent controller: one conversation, one turn at a time.
//!
//! Each call to [`AgentController::handle_turn`] walks the state machine
//!
//! ```text
//! INIT -> THINKING -> (TOOL_CALL -> OBSERVING -> THINKING)* -> FINAL -> DONE
//! ```
//!
//! with `ERROR` reachable from THINKING when the model cannot be reached.
//!
//! Turns produced while a turn is in flight are staged and only written to
//! memory once the turn reaches DONE. Dropping the future mid-turn, or a
//! turn that ends in a model outage, leaves memory exactly as it was.

use crate::decision::{AgentDecision, parse_decision};
use crate::prompt::{self, OBSERVATION_STOP, ScratchEntry};
use jarvis_core::agent::{AgentConfig, AgentState, SessionStatus};
use jarvis_core::channel::is_termination_token;
use jarvis_core::error::{AgentError, ModelError, ToolError};
use jarvis_core::memory::ViewPolicy;
use jarvis_core::provider::{ModelParameters, ToolDefinition};
use jarvis_core::tool::ToolRegistry;
use jarvis_core::turn::{Role, SessionId, Turn};
use jarvis_memory::ConversationMemory;
use jarvis_providers::LanguageModelClient;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Parse attempts allowed per turn before the raw reply is accepted as is.
pub const MAX_PARSE_ATTEMPTS: u32 = 2;

/// Shown when the model could not be reached for this turn.
pub const APOLOGY: &str = "I'm sorry, I couldn't reach the language model just now. Please try again.";

/// Returned when the tool cycle budget runs out before a final answer.
pub const ITERATION_FALLBACK: &str =
    "I'm sorry, I was unable to complete that request within the iteration budget.";

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// The model produced a final answer.
    Answered,
    /// The model's reply could not be parsed twice; the raw reply was used.
    ParseFallback,
    /// The model kept asking for tools after the budget was spent.
    IterationBudgetExhausted,
    /// The model client gave up; nothing was recorded.
    ModelUnavailable,
}

/// Result of one turn, with the counters that explain how it got there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub answer: String,
    pub kind: TurnKind,
    pub tool_cycles: u32,
    pub parse_failures: u32,
}

/// Per-conversation state owned by one controller.
#[derive(Debug, Clone)]
pub struct AgentSession {
    pub id: SessionId,
    memory: ConversationMemory,
    status: SessionStatus,
    state: AgentState,
}

impl AgentSession {
    fn new() -> Self {
        Self {
            id: SessionId::new(),
            memory: ConversationMemory::new(),
            status: SessionStatus::Active,
            state: AgentState::Init,
        }
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// State reached by the most recent (or in-flight) turn.
    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

/// Drives one conversation against a model client and a shared tool set.
pub struct AgentController {
    model: Arc<LanguageModelClient>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
    definitions: Vec<ToolDefinition>,
    session: AgentSession,
}

impl AgentController {
    pub fn new(model: Arc<LanguageModelClient>, tools: Arc<ToolRegistry>, config: AgentConfig) -> Self {
        let definitions = tools.definitions();
        let session = AgentSession::new();
        info!(
            session = %session.id,
            model = %model.model(),
            tools = definitions.len(),
            max_iterations = config.max_iterations,
            "Agent session started"
        );
        Self {
            model,
            tools,
            config,
            definitions,
            session,
        }
    }

    pub fn session(&self) -> &AgentSession {
        &self.session
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.session.memory
    }

    /// Permanently drop the oldest turns outside `policy`. Returns how
    /// many were dropped; later turns keep their sequence indices.
    pub fn trim_history(&mut self, policy: ViewPolicy) -> usize {
        let dropped = self.session.memory.trim(policy);
        if dropped > 0 {
            debug!(session = %self.session.id, dropped, "Trimmed conversation history");
        }
        dropped
    }

    /// Take one user input and return the text to show the user.
    pub async fn handle_turn(&mut self, input: &str) -> Result<String, AgentError> {
        self.run_turn(input).await.map(|outcome| outcome.answer)
    }

    /// Like [`handle_turn`](Self::handle_turn) but reports how the turn ended.
    pub async fn run_turn(&mut self, input: &str) -> Result<TurnOutcome, AgentError> {
        if !self.session.is_active() {
            return Err(AgentError::SessionClosed);
        }

        self.session.state = AgentState::Init;

        let input = input.trim();
        if input.is_empty() || is_termination_token(input) {
            return Err(AgentError::EmptyInput);
        }

        info!(session = %self.session.id, "Turn started");

        let parameters = self.model_parameters();
        let mut staged: Vec<(Role, String)> = vec![(Role::User, input.to_string())];
        let mut scratchpad: Vec<ScratchEntry> = Vec::new();
        let mut tool_cycles = 0u32;
        let mut parse_failures = 0u32;

        loop {
            self.session.state = AgentState::Thinking;
            let context = prompt::build(
                self.session.memory.view(self.config.history),
                &self.definitions,
                input,
                &scratchpad,
            );
            debug!(
                session = %self.session.id,
                tool_cycles,
                messages = context.messages.len(),
                "Thinking"
            );

            let raw = match self.model.complete(&context, &parameters).await {
                Ok(raw) => raw,
                Err(ModelError::Unavailable { attempts, last_error }) => {
                    self.session.state = AgentState::Error;
                    warn!(
                        session = %self.session.id,
                        attempts,
                        error = %last_error,
                        "Model unavailable, abandoning turn"
                    );
                    return Ok(TurnOutcome {
                        answer: APOLOGY.to_string(),
                        kind: TurnKind::ModelUnavailable,
                        tool_cycles,
                        parse_failures,
                    });
                }
                Err(ModelError::FatalConfiguration(reason)) => {
                    self.session.state = AgentState::Error;
                    self.session.status = SessionStatus::Failed {
                        reason: reason.clone(),
                    };
                    error!(session = %self.session.id, reason = %reason, "Session closed by fatal configuration error");
                    return Err(AgentError::FatalConfiguration(reason));
                }
            };

            let (answer, kind) = match parse_decision(&raw, &self.tools) {
                Ok(AgentDecision::FinalAnswer(answer)) => (answer, TurnKind::Answered),
                Ok(AgentDecision::ToolInvocation { tool_name, tool_input }) => {
                    // A think/act/observe cycle is one iteration; the model is
                    // not consulted again once the last one has run.
                    if tool_cycles < self.config.max_iterations {
                        tool_cycles += 1;
                        let observation = self.call_tool(&tool_name, &tool_input).await;
                        self.session.state = AgentState::Observing;
                        staged.push((Role::Tool, observation.clone()));
                        scratchpad.push(ScratchEntry::ModelOutput(raw));
                        scratchpad.push(ScratchEntry::Observation(observation));
                        if tool_cycles < self.config.max_iterations {
                            continue;
                        }
                    }
                    warn!(
                        session = %self.session.id,
                        max_iterations = self.config.max_iterations,
                        tool = %tool_name,
                        "Iteration budget exhausted"
                    );
                    (ITERATION_FALLBACK.to_string(), TurnKind::IterationBudgetExhausted)
                }
                Err(failure) => {
                    parse_failures += 1;
                    if parse_failures >= MAX_PARSE_ATTEMPTS {
                        warn!(session = %self.session.id, error = %failure, "Unparseable reply, using it verbatim");
                        (raw.trim().to_string(), TurnKind::ParseFallback)
                    } else {
                        warn!(session = %self.session.id, error = %failure, "Unparseable reply, re-prompting");
                        scratchpad.push(ScratchEntry::ModelOutput(raw));
                        scratchpad.push(ScratchEntry::reminder(&failure));
                        continue;
                    }
                }
            };

            self.session.state = AgentState::Final;
            staged.push((Role::Agent, answer.clone()));
            self.commit(staged)?;
            if let Some(retention) = self.config.retention {
                self.trim_history(retention);
            }
            self.session.state = AgentState::Done;

            info!(
                session = %self.session.id,
                tool_cycles,
                parse_failures,
                outcome = ?kind,
                "Turn finished"
            );
            return Ok(TurnOutcome {
                answer,
                kind,
                tool_cycles,
                parse_failures,
            });
        }
    }

    /// Run a tool and turn whatever happens into observation text.
    async fn call_tool(&mut self, name: &str, input: &str) -> String {
        self.session.state = AgentState::ToolCall;
        debug!(session = %self.session.id, tool = %name, input = %input, "Calling tool");

        match self.tools.invoke(name, input).await {
            Ok(output) => output,
            Err(err) => {
                warn!(session = %self.session.id, tool = %name, error = %err, "Tool call failed");
                failure_observation(name, &err)
            }
        }
    }

    fn model_parameters(&self) -> ModelParameters {
        let mut parameters = self.config.model_parameters.clone();
        if !self.definitions.is_empty() && !parameters.stop.iter().any(|s| s == OBSERVATION_STOP) {
            parameters.stop.push(OBSERVATION_STOP.to_string());
        }
        parameters
    }

    /// Write a finished turn's staged entries to memory in order.
    fn commit(&mut self, staged: Vec<(Role, String)>) -> Result<(), AgentError> {
        let base = self.session.memory.next_index();
        for (offset, (role, content)) in (0u64..).zip(staged) {
            self.session.memory.append(Turn::new(role, content, base + offset))?;
        }
        Ok(())
    }
}

fn failure_observation(name: &str, err: &ToolError) -> String {
    match err {
        ToolError::Execution { cause, .. } => format!("Tool '{name}' failed: {cause}"),
        other => format!("Tool '{name}' failed: {other}"),
    }
}
