use anyhow::{Context, Result};
use colored::*;
use mediai_core::{submit, ChatSession, Submission, Transport, Trigger};
use std::io::{self, Write};
use tracing::{debug, info};
use uuid::Uuid;

use crate::output::{print_interactive_help, TerminalSurface};

/// One line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    History,
    /// Sets or clears the manual API key
    Key(Option<String>),
    Submit(Trigger, String),
}

/// Parses a line typed at the interactive prompt
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();

    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return Command::Exit;
    }

    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match head {
        "/help" => Command::Help,
        "/history" => Command::History,
        "/key" => Command::Key(Some(rest.to_string()).filter(|key| !key.is_empty())),
        "/suggest" => Command::Submit(Trigger::Suggest, rest.to_string()),
        "/send" => Command::Submit(Trigger::Send, rest.to_string()),
        _ => Command::Submit(Trigger::EnterKey, line.to_string()),
    }
}

/// Display-only guest label; not an identity
pub fn guest_label() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("GUEST-{}", id[..6].to_uppercase())
}

/// Runs a single query, in chat or structured mode
pub async fn run_single_query<T: Transport>(
    session: &mut ChatSession<T, TerminalSurface>,
    prompt: String,
    suggest: bool,
) -> Result<()> {
    info!(suggest, "Running single query");

    let trigger = if suggest { Trigger::Suggest } else { Trigger::Send };
    if submit(session, trigger, &prompt).await == Submission::Ignored {
        println!("{}", "Nothing to send: the prompt is empty.".yellow());
    }

    Ok(())
}

/// Runs an interactive chat session
pub async fn run_interactive_chat<T: Transport>(
    session: &mut ChatSession<T, TerminalSurface>,
) -> Result<()> {
    println!(
        "Starting interactive MediAI session as {}.",
        guest_label().cyan()
    );
    println!("Type '/help' for commands, 'exit' or 'quit' to end the session.");
    println!();
    session.greet();

    loop {
        // Every submission re-enables input before returning
        debug_assert!(session.surface().input_enabled());

        // Prompt for user input
        print!("{}: ", "You".green().bold());
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .context("Failed to read input")?;
        if read == 0 {
            println!();
            break; // EOF
        }

        match parse_command(&input) {
            Command::Exit => {
                println!("Exiting chat session.");
                break;
            }
            Command::Help => print_interactive_help(),
            Command::History => {
                println!("{} turns in this session.", session.transcript().len());
            }
            Command::Key(key) => {
                let cleared = key.is_none();
                session.set_manual_key(key);
                if cleared {
                    println!("{}", "Manual API key cleared.".yellow());
                } else {
                    println!("{}", "Manual API key set.".green());
                }
            }
            Command::Submit(trigger, prompt) => {
                debug!(?trigger, "Interactive submission");
                submit(session, trigger, &prompt).await;
            }
        }
    }

    Ok(())
}
