use crate::api;
use crate::assistant::{Assistant, CommandAssistant, ToolAssistant};
use crate::cli::{Args, Mode};
use crate::commands::{ChatState, CommandDispatcher};
use crate::config::{Config, Provider, StoreConfig};
use crate::core::error::TodoError;
use crate::display;
use crate::input::{self, UserInput};
use crate::mcp;
use crate::providers::LLMProvider;
use crate::providers::factory::ProviderFactory;
use crate::store::{TodoStore, open_store};
use crate::tools::todo_tools;
use is_terminal::IsTerminal;
use std::io::{self, Read};
use std::sync::Arc;

pub struct Application {
    pub args: Args,
    pub config: Config,
    pub store: Arc<dyn TodoStore>,
    pub command_dispatcher: CommandDispatcher,
}

impl Application {
    /// Applies command-line overrides to `config` and opens the store.
    pub fn new(
        args: Args,
        mut config: Config,
        command_dispatcher: CommandDispatcher,
    ) -> Result<Self, TodoError> {
        apply_overrides(&args, &mut config)?;
        let store = open_store(&config.store, config.request_timeout())?;

        Ok(Self {
            args,
            config,
            store,
            command_dispatcher,
        })
    }

    pub async fn run(&mut self) -> Result<(), TodoError> {
        match self.args.mode() {
            Mode::Chat => {
                let assistant = CommandAssistant::new(self.create_provider()?, self.store.clone());
                self.handle_interactive_mode("command mode", Box::new(assistant))
                    .await
            }
            Mode::Tools => {
                let tools = Arc::new(todo_tools(self.store.clone()));
                let assistant = ToolAssistant::new(self.create_provider()?, tools);
                self.handle_interactive_mode("tool mode", Box::new(assistant))
                    .await
            }
            Mode::Ask { query } => self.handle_ask_mode(query.join(" ")).await,
            Mode::Mcp => mcp::serve_stdio(Arc::new(todo_tools(self.store.clone()))).await,
            Mode::Serve { host, port } => api::serve(&host, port, self.store.clone()).await,
        }
    }

    fn active_provider(&self) -> Provider {
        self.config.active_provider.unwrap_or_default()
    }

    fn create_provider(&self) -> Result<Box<dyn LLMProvider>, TodoError> {
        let provider = self.active_provider();
        let mut provider_config = self.config.provider_config(provider);
        if let Some(model) = &self.args.model {
            provider_config.model = Some(model.clone());
        }

        ProviderFactory::new().create(provider, &provider_config, self.config.request_timeout())
    }

    fn store_label(&self) -> String {
        match &self.config.store {
            StoreConfig::Sqlite { path } => format!("sqlite {}", path.display()),
            StoreConfig::Http { base_url } => base_url.clone(),
        }
    }

    async fn handle_interactive_mode(
        &self,
        mode: &str,
        assistant: Box<dyn Assistant>,
    ) -> Result<(), TodoError> {
        let count = self
            .store
            .list(None)
            .await
            .map_err(|e| TodoError::Store(format!("Could not reach the todo store: {}", e)))?
            .len();

        display::display_banner(
            mode,
            &format!("{:?}", self.active_provider()).to_lowercase(),
            assistant.model(),
            &self.store_label(),
            count,
        );

        let mut state = ChatState::new(assistant);
        let mut editor = input::create_editor(self.command_dispatcher.clone())?;

        while state.should_continue {
            match input::read_input(&mut editor)? {
                UserInput::Exit => break,
                UserInput::Command(line) => {
                    match self.command_dispatcher.execute_line(&line, &mut state) {
                        Ok(Some(output)) => println!("{}", output),
                        Ok(None) => {}
                        Err(e) => display::display_error(&e.to_string()),
                    }
                }
                UserInput::Line(text) => {
                    let reply = state.assistant.respond(&text).await;
                    display::display_reply(&reply);
                }
            }
        }

        println!("Goodbye!");
        if let Err(e) = input::save_history(&mut editor) {
            tracing::warn!(error = %e, "could not save input history");
        }
        Ok(())
    }

    async fn handle_ask_mode(&self, query: String) -> Result<(), TodoError> {
        let query = if query.trim().is_empty() && !io::stdin().is_terminal() {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| TodoError::Input(format!("Failed to read from stdin: {}", e)))?;
            buffer
        } else {
            query
        };

        let query = query.trim();
        if query.is_empty() {
            return Err(TodoError::Input("No query provided".to_string()));
        }

        let mut assistant = CommandAssistant::new(self.create_provider()?, self.store.clone());
        let reply = assistant.respond(query).await;
        display::display_reply(&reply);
        Ok(())
    }
}

fn apply_overrides(args: &Args, config: &mut Config) -> Result<(), TodoError> {
    if let Some(name) = &args.provider {
        let provider = Provider::from_name(name)
            .ok_or_else(|| TodoError::Config(format!("Unsupported provider: {}", name)))?;
        config.active_provider = Some(provider);
    }

    if let Some(path) = &args.db {
        config.store = StoreConfig::Sqlite { path: path.clone() };
    } else if let Some(base_url) = &args.api_url {
        config.store = StoreConfig::Http {
            base_url: base_url.clone(),
        };
    }
    config.store = config.store.resolved();
    Ok(())
}
