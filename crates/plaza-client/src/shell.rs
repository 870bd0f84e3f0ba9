//! Line-oriented front end used by the `plaza` binary.
//!
//! Each input line is parsed as one [`ShellCommand`]; each reply is
//! pretty-printed JSON, either the command's result or `{"error": {...}}`.
//! Lines that do not parse come back as a `usage` error.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use serde::Serialize;

use plaza_shared::constants::APP_NAME;

use crate::commands::{self, CommandError, CommandResult};
use crate::state::SharedState;

#[derive(Parser, Debug)]
#[command(name = APP_NAME, no_binary_name = true, disable_help_subcommand = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum ShellCommand {
    /// Start a registration
    Register {
        email: String,
        age: u32,
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Finish profile setup and log in
    Setup {
        /// Profile photo URL; a generated avatar is used otherwise
        #[arg(long)]
        avatar: Option<String>,
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Log in as an existing user
    Login { email: String },
    Logout,
    /// Current auth state and user
    Session,
    /// Publish a post
    Post {
        #[arg(long)]
        image: Option<String>,
        text: Vec<String>,
    },
    /// Posts with their authors, newest first
    Feed,
    /// Raw posts, newest first
    Posts,
    /// One user's posts, newest first
    PostsBy { user_id: String },
    /// Every registered user
    Users,
    /// Other users by name or email
    Search { term: Vec<String> },
    /// Conversation with a user
    Chat { user_id: String },
    /// Message a user
    Dm {
        user_id: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Message a conversation by id
    Send {
        conversation_id: String,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Your conversations with their latest message
    Convos,
    /// Every conversation
    AllConvos,
    Help,
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reply(String),
    Quit,
    Nothing,
}

/// Usage text listing every shell command.
pub fn help() -> String {
    ShellLine::command().render_help().to_string()
}

pub struct Shell {
    state: SharedState,
}

impl Shell {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    pub fn execute(&self, line: &str) -> Outcome {
        if line.trim().is_empty() {
            return Outcome::Nothing;
        }

        let command = match ShellLine::try_parse_from(line.split_whitespace()) {
            Ok(parsed) => parsed.command,
            Err(e) if e.kind() == ErrorKind::DisplayHelp => {
                return Outcome::Reply(e.to_string());
            }
            Err(e) => return Outcome::Reply(usage(e.to_string().trim())),
        };

        let state = &self.state;
        let reply = match command {
            ShellCommand::Quit => return Outcome::Quit,
            ShellCommand::Help => return Outcome::Reply(help()),

            ShellCommand::Register { email, age, name } => {
                render(commands::auth::register(state, name.join(" "), email, age))
            }
            ShellCommand::Setup { avatar, name } => render(
                commands::auth::complete_profile_setup(state, name.join(" "), avatar),
            ),
            ShellCommand::Login { email } => render(commands::auth::login(state, email)),
            ShellCommand::Logout => render(commands::auth::logout(state)),
            ShellCommand::Session => render(commands::auth::get_session(state)),

            ShellCommand::Post { image, text } => {
                render(commands::posts::add_post(state, text.join(" "), image))
            }
            ShellCommand::Feed => render(commands::posts::get_feed(state)),
            ShellCommand::Posts => render(commands::posts::get_posts(state)),
            ShellCommand::PostsBy { user_id } => {
                render(commands::posts::get_posts_by_user(state, user_id))
            }

            ShellCommand::Users => render(commands::users::list_users(state)),
            ShellCommand::Search { term } => {
                render(commands::users::search_users(state, term.join(" ")))
            }

            ShellCommand::Chat { user_id } => {
                render(commands::messaging::get_conversation_with(state, user_id))
            }
            ShellCommand::Dm { user_id, text } => render(
                commands::messaging::send_direct_message(state, user_id, text.join(" ")),
            ),
            ShellCommand::Send {
                conversation_id,
                text,
            } => render(commands::messaging::send_message(
                state,
                conversation_id,
                text.join(" "),
            )),
            ShellCommand::Convos => render(commands::messaging::conversation_summaries(state)),
            ShellCommand::AllConvos => render(commands::messaging::list_conversations(state)),
        };

        Outcome::Reply(reply)
    }
}

fn render<T: Serialize>(result: CommandResult<T>) -> String {
    let rendered = match &result {
        Ok(value) => serde_json::to_string_pretty(value),
        Err(error) => serde_json::to_string_pretty(&serde_json::json!({ "error": error })),
    };
    rendered.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize reply");
        serde_json::json!({
            "error": { "code": "internal", "message": e.to_string(), "recoverable": false }
        })
        .to_string()
    })
}

fn usage(message: &str) -> String {
    render::<()>(Err(CommandError {
        code: "usage".to_string(),
        message: message.to_string(),
        recoverable: true,
    }))
}
