use clap::Parser;
use std::path::PathBuf;

/// Terminal client for MediAI, a non-diagnostic medical information assistant
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The prompt to send
    #[arg(index = 1)] // Positional argument
    pub prompt: Option<String>,

    /// Ask for a structured medicine suggestion instead of open chat
    #[arg(short, long, default_value_t = false)]
    pub suggest: bool,

    /// Enter interactive chat mode
    #[arg(short, long, default_value_t = false)]
    pub interactive: bool,

    /// API key to use instead of the built-in fallback key
    #[arg(short = 'k', long, env = "MEDIAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Path to the configuration file
    #[arg(short, long, env = "MEDIAI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Gemini model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Attempts per request before giving up
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Enable verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
