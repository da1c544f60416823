use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing_subscriber::EnvFilter;

use parley_core::config::AppConfig;
use parley_core::conversation::{Conversation, Message, MessageRole, PENDING_TEXT};
use parley_core::error::ParleyError;
use parley_infrastructure::{ConfigStorage, ParleyPaths, TokenStorage};
use parley_interaction::{
    ChatAgent, ExchangeClient, HttpChatAgent, LoginFlow, LoginResult, MockChatAgent,
    StubAuthorizeControl,
};

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: vec![
                "/login".to_string(),
                "/logout".to_string(),
                "/status".to_string(),
            ],
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Result of one background exchange, sent back to the rendering task.
struct ExchangeEvent {
    placeholder_id: String,
    outcome: Result<String, ParleyError>,
}

fn print_message(msg: &Message) {
    match msg.role {
        MessageRole::User => println!("{}", format!("> {}", msg.text).green()),
        MessageRole::Assistant => {
            for line in msg.text.lines() {
                println!("{}", line.bright_blue());
            }
        }
        MessageRole::System => println!("{}", msg.text.bright_black()),
    }
}

/// The main entry point for the Parley chat REPL.
///
/// Sets up a rustyline-based REPL that:
/// 1. Loads configuration and the session token store
/// 2. Picks the chat transport (mock or live) from configuration
/// 3. Provides command completion for /login, /logout, and /status
/// 4. Runs each exchange on a background task so input stays responsive
/// 5. Displays colored output for user, assistant, and system messages
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // ===== Backend Initialization =====
    let config = ConfigStorage::<AppConfig>::new(ParleyPaths::config_file()?)
        .load()?
        .unwrap_or_default();
    let tokens = Arc::new(TokenStorage::new()?);

    let mock_mode = config.mock_mode();
    let deadline = Duration::from_secs(config.chat.request_timeout_secs);

    let agent: Arc<dyn ChatAgent> = if mock_mode {
        Arc::new(MockChatAgent::new())
    } else {
        Arc::new(HttpChatAgent::new(
            config.chat.endpoint.clone(),
            deadline,
            tokens.clone(),
        )?)
    };

    let login = LoginFlow::new(
        Arc::new(StubAuthorizeControl),
        ExchangeClient::new(config.auth.exchange_endpoint.clone(), deadline)?,
        tokens.clone(),
    );

    let conversation = Arc::new(Mutex::new(Conversation::new()));

    // Create a channel for receiving exchange results from background tasks
    let (event_tx, mut event_rx) = mpsc::channel::<ExchangeEvent>(32);

    // Spawn the task that resolves placeholders and renders replies
    let handler_conversation = Arc::clone(&conversation);
    let response_handler = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let resolved = handler_conversation
                .lock()
                .unwrap()
                .resolve_exchange(&event.placeholder_id, event.outcome);

            if let Some(msg) = resolved {
                print_message(&msg);
            }
        }
    });

    // ===== REPL Setup =====
    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    println!("{}", "=== Parley ===".bright_magenta().bold());
    println!(
        "{}",
        format!(
            "{} mode. Type '/login' to sign in, '/status' for details, or 'quit' to exit.",
            if mock_mode { "Mock" } else { "Live" }
        )
        .bright_black()
    );
    println!();

    // Show the seeded welcome message
    {
        let conv = conversation.lock().unwrap();
        for msg in conv.messages() {
            print_message(msg);
        }
    }

    // ===== Main REPL Loop =====
    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                // Handle quit command
                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                // Skip empty lines
                if trimmed.is_empty() {
                    continue;
                }

                // Add to history
                let _ = rl.add_history_entry(&line);

                if trimmed == "/login" {
                    match login.run().await {
                        LoginResult::Authenticated => {
                            println!("{}", "Signed in - you're all set.".bright_green());
                        }
                        LoginResult::Cancelled { status } => {
                            println!("{}", status.yellow());
                        }
                        LoginResult::Failed { status } => {
                            println!("{}", format!("Login failed: {status}").red().bold());
                        }
                    }
                    continue;
                }

                if trimmed == "/logout" {
                    match tokens.clear() {
                        Ok(()) => println!("{}", "Logged out.".bright_green()),
                        Err(e) => eprintln!("{}", format!("Logout failed: {e}").red()),
                    }
                    continue;
                }

                if trimmed == "/status" {
                    let has_token = tokens.load().ok().flatten().is_some();
                    println!(
                        "{}",
                        format!("mode: {}", if mock_mode { "mock" } else { "live" }).bright_black()
                    );
                    println!(
                        "{}",
                        format!("chat endpoint: {}", config.chat.endpoint).bright_black()
                    );
                    println!(
                        "{}",
                        format!(
                            "session token: {}",
                            if has_token { "present" } else { "absent" }
                        )
                        .bright_black()
                    );
                    continue;
                }

                if trimmed.starts_with('/') {
                    println!("{}", "Unknown command".bright_black());
                    continue;
                }

                // Chat submission
                let exchange = {
                    let mut conv = conversation.lock().unwrap();
                    conv.set_draft(trimmed);
                    match conv.begin_exchange() {
                        Some(exchange) => exchange,
                        None => {
                            if conv.is_sending() {
                                println!(
                                    "{}",
                                    "Hold on - still waiting for the previous reply."
                                        .bright_black()
                                );
                            }
                            continue;
                        }
                    }
                };

                println!("{}", format!("> {}", trimmed).green());
                println!("{}", PENDING_TEXT.bright_black());

                // Spawn background task for the exchange
                let tx = event_tx.clone();
                let agent = Arc::clone(&agent);

                tokio::spawn(async move {
                    // Wrap the exchange in a timeout so the placeholder
                    // always resolves, even for a hung request
                    let outcome = match timeout(deadline, agent.reply(&exchange.history)).await {
                        Ok(result) => result,
                        Err(_) => Err(ParleyError::transport(None, "request timed out")),
                    };

                    let _ = tx
                        .send(ExchangeEvent {
                            placeholder_id: exchange.placeholder_id,
                            outcome,
                        })
                        .await;
                });
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    // Drop the channel to signal shutdown
    drop(event_tx);

    // Wait for the response handler to finish
    let _ = response_handler.await;

    Ok(())
}
