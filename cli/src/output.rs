use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use mediai_core::{ChatSurface, MessageBody, RenderedMessage, Role, Variant};
use pulldown_cmark::{Event as MdEvent, HeadingLevel, Options, Parser as MdParser, Tag};
use std::time::Duration;

/// Terminal implementation of the chat surface
pub struct TerminalSurface {
    spinner: Option<ProgressBar>,
    input_enabled: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            spinner: None,
            input_enabled: true,
        }
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }
}

impl ChatSurface for TerminalSurface {
    fn paint(&mut self, message: RenderedMessage) {
        println!("{}", format_message(&message));
        println!(); // Add spacing between messages
    }

    fn show_thinking(&mut self, text: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(text.italic().to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(spinner);
    }

    fn clear_thinking(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }
}

fn speaker(role: Role) -> ColoredString {
    match role {
        Role::User => "You".green().bold(),
        Role::Model => "MediAI".blue().bold(),
    }
}

/// Formats a rendered message for the terminal
pub fn format_message(message: &RenderedMessage) -> String {
    let label = speaker(message.role);

    match (&message.variant, &message.body) {
        (Variant::Error, MessageBody::Text(text)) => {
            format!("{}: {} {}", label, "Error:".red().bold(), text)
        }
        (Variant::Model, MessageBody::Text(text)) => {
            format!("{}: {}", label, render_markdown(text).trim())
        }
        (_, MessageBody::Text(text)) => format!("{}: {}", label, text),
        (
            variant,
            MessageBody::Suggestion {
                heading,
                medicine,
                purpose,
                dosage,
                note,
            },
        ) => {
            let prescription = *variant == Variant::Prescription;
            let heading = if prescription {
                heading.yellow().bold()
            } else {
                heading.cyan().bold()
            };
            let dosage = if prescription {
                dosage.red().bold()
            } else {
                dosage.normal()
            };

            format!(
                "{}:\n{}\n{}\n  {} {}\n  {} {}\n  {} {}\n  {} {}",
                label,
                heading,
                "─".repeat(40).dimmed(),
                "Medicine:".bold(),
                medicine,
                "Purpose:".bold(),
                purpose,
                "Dosage:".bold(),
                dosage,
                "Note:".bold(),
                note.italic().dimmed()
            )
        }
    }
}

/// Show usage instructions when no prompt or action is provided
pub fn print_usage_instructions() {
    println!("{}", "Usage:".yellow().bold());
    println!("  {}", "mediai \"your question\"".green().bold());
    println!("    Ask a general medical information question");
    println!();
    println!("  {}", "mediai --suggest \"your symptom\"".green().bold());
    println!("    Get a structured medicine suggestion");
    println!();
    println!("  {}", "mediai -i".green().bold());
    println!("    Start an interactive chat session");
    println!();
    println!("{}", "Options:".cyan());
    println!("  --api-key <KEY>   Use your own Gemini API key");
    println!("  --help            Show this help message");
    println!();
}

/// Prints the interactive commands
pub fn print_interactive_help() {
    println!("{}", "Commands:".cyan());
    println!("  <text>            Chat (Enter always uses chat mode)");
    println!("  /suggest <text>   Suggest medicine (structured)");
    println!("  /send <text>      Chat");
    println!("  /key <KEY>        Use your own API key (/key alone clears it)");
    println!("  /history          Show the number of turns so far");
    println!("  exit | quit       End the session");
    println!();
}

/// Render model markdown for the terminal
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = MdParser::new_ext(markdown, options);

    let mut output = String::new();
    let mut strong = 0usize;
    let mut emphasis = 0usize;
    let mut list_depth = 0usize;

    for event in parser {
        match event {
            MdEvent::Start(Tag::Heading(level, ..)) => match level {
                HeadingLevel::H1 | HeadingLevel::H2 => {
                    output.push_str(&format!("\n{} ", "#".bright_cyan().bold()))
                }
                _ => output.push('\n'),
            },
            MdEvent::End(Tag::Heading(..)) => output.push('\n'),
            MdEvent::Start(Tag::Paragraph) => {
                if list_depth == 0 && !output.is_empty() && !output.ends_with('\n') {
                    output.push_str("\n\n");
                }
            }
            MdEvent::End(Tag::Paragraph) => {
                if list_depth == 0 {
                    output.push('\n');
                }
            }
            MdEvent::Start(Tag::List(_)) => {
                if list_depth == 0 {
                    output.push('\n');
                }
                list_depth += 1;
            }
            MdEvent::End(Tag::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
            }
            MdEvent::Start(Tag::Item) => {
                if !output.is_empty() && !output.ends_with('\n') {
                    output.push('\n');
                }
                output.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
                output.push_str(&format!("{}  ", "•".yellow()));
            }
            MdEvent::End(Tag::Item) => {
                if !output.ends_with('\n') {
                    output.push('\n');
                }
            }
            MdEvent::Start(Tag::Strong) => strong += 1,
            MdEvent::End(Tag::Strong) => strong = strong.saturating_sub(1),
            MdEvent::Start(Tag::Emphasis) => emphasis += 1,
            MdEvent::End(Tag::Emphasis) => emphasis = emphasis.saturating_sub(1),
            MdEvent::Code(code) => {
                output.push_str(&format!("`{}`", code.on_bright_black().white()));
            }
            MdEvent::Text(text) => {
                let styled = match (strong > 0, emphasis > 0) {
                    (true, _) => text.bold().to_string(),
                    (false, true) => text.italic().to_string(),
                    (false, false) => text.to_string(),
                };
                output.push_str(&styled);
            }
            MdEvent::SoftBreak => output.push(' '),
            MdEvent::HardBreak => output.push('\n'),
            MdEvent::Rule => {
                output.push_str(&format!("\n{}\n", "─".repeat(40).dimmed()));
            }
            _ => {
                // Tables, html and footnotes pass through as plain text events
            }
        }
    }

    output
}
