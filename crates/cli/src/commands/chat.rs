//! `jarvis chat`: interactive or single-message chat mode.

use jarvis_agent::{AgentController, ConversationEnd, run_conversation};
use jarvis_channels::ConsoleIo;
use jarvis_config::AppConfig;
use jarvis_core::error::{AgentError, Error};
use std::sync::Arc;

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early and give a clear error
    if config.require_api_key().is_err() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENAI_API_KEY=sk-...   (for OpenAI)");
        eprintln!("    JARVIS_API_KEY=...      (any OpenAI-compatible endpoint)");
        eprintln!();
        eprintln!("  Or add it to your config file (create one with `jarvis init`):");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let model = Arc::new(jarvis_providers::build_client(&config)?);
    let tools = Arc::new(jarvis_tools::default_registry(&config.search)?);
    let tool_names = tools.names().join(", ");
    let mut agent = AgentController::new(model, tools, config.agent_config());

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let result = agent.handle_turn(&msg).await;
        eprint!("\r              \r");
        match result {
            Ok(answer) => println!("{answer}"),
            Err(AgentError::EmptyInput) => return Err("Message is empty".into()),
            Err(e) => return Err(e.into()),
        }
        return Ok(());
    }

    // Interactive mode
    let tool_names = if tool_names.is_empty() { "none".to_string() } else { tool_names };
    let banner = [
        String::new(),
        "  JARVIS online.".into(),
        String::new(),
        format!("  Model:     {}", config.model),
        format!("  Endpoint:  {}", config.api_url),
        format!("  Tools:     {tool_names}"),
        String::new(),
        "  Type your message and press Enter.".into(),
        "  Type 'exit' or 'quit' to end.".into(),
        String::new(),
    ];

    let mut io = ConsoleIo::stdio();
    for line in &banner {
        io.announce(line).await?;
    }
    match run_conversation(&mut agent, &mut io).await {
        Ok(ConversationEnd::UserExit) => {}
        Ok(ConversationEnd::InputClosed) => println!(),
        Err(Error::Agent(AgentError::FatalConfiguration(reason))) => {
            eprintln!("  [Fatal] {reason}");
            eprintln!("  Check the API key and model in your config.");
            return Err(reason.into());
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
