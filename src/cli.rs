use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Manage a todo list in natural language", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Mode>,

    /// AI provider to use [possible values: openai, openrouter, deepseek, gemini, anthropic]
    #[arg(short, long, global = true)]
    pub provider: Option<String>,

    /// Model to use (provider-specific)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Path of the SQLite todo database
    #[arg(long, global = true, conflicts_with = "api_url")]
    pub db: Option<PathBuf>,

    /// Use a remote todo REST API instead of the local database, e.g. http://localhost:8000/api
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Interactive session: each line becomes one todo command (default)
    Chat,
    /// Interactive session where the model calls the todo tools itself
    Tools,
    /// Run a single request and exit. Reads stdin when no query is given
    Ask {
        /// The request, e.g. "add buy milk"
        query: Vec<String>,
    },
    /// Serve the todo tools over MCP on stdin/stdout
    Mcp,
    /// Serve the todo REST API
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
}

impl Args {
    pub fn mode(&self) -> Mode {
        self.command.clone().unwrap_or(Mode::Chat)
    }

    /// Log level used when `RUST_LOG` is not set.
    pub fn default_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if matches!(self.mode(), Mode::Mcp | Mode::Serve { .. }) {
            "info"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_chat() {
        let args = Args::try_parse_from(["todochat"]).unwrap();
        assert_eq!(args.mode(), Mode::Chat);
        assert_eq!(args.default_log_level(), "warn");
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "todochat", "ask", "add", "milk", "--provider", "anthropic", "-m", "claude-x",
        ])
        .unwrap();
        assert_eq!(
            args.mode(),
            Mode::Ask {
                query: vec!["add".to_string(), "milk".to_string()]
            }
        );
        assert_eq!(args.provider.as_deref(), Some("anthropic"));
        assert_eq!(args.model.as_deref(), Some("claude-x"));
    }

    #[test]
    fn serve_defaults_and_log_level() {
        let args = Args::try_parse_from(["todochat", "serve", "--port", "9000"]).unwrap();
        assert_eq!(
            args.mode(),
            Mode::Serve {
                host: "127.0.0.1".to_string(),
                port: 9000
            }
        );
        assert_eq!(args.default_log_level(), "info");

        let verbose = Args::try_parse_from(["todochat", "mcp", "-v"]).unwrap();
        assert_eq!(verbose.default_log_level(), "debug");
    }

    #[test]
    fn db_and_api_url_are_exclusive() {
        assert!(
            Args::try_parse_from(["todochat", "--db", "x.db", "--api-url", "http://h/api"])
                .is_err()
        );
    }
}
