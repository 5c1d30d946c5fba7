//! Line-oriented console front-end.
//!
//! Reads one command per line and drives the session store, the poller's
//! refresh trigger and the command dispatcher. Sensor updates are printed
//! separately by [`crate::render::print_updates`].

use std::io::BufRead;
use std::ops::ControlFlow;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::{Stream, StreamExt};

use hubpanel_app::dispatcher::CommandDispatcher;
use hubpanel_app::entity_cache::EntityCache;
use hubpanel_app::poller::RefreshTrigger;
use hubpanel_app::ports::StateClient;
use hubpanel_app::session::SessionStore;
use hubpanel_domain::catalog::Catalog;
use hubpanel_domain::entity::{CommandRole, UnknownRole};

use crate::render;

pub const HELP: &str = "\
commands:
  login <url> <token>                 set hub credentials and refresh
  logout                              forget credentials
  refresh                             refresh sensors now (ignored when logged out)
  send <profile> <execute|play> <text>
                                      write text to a speaker
  dismiss <profile>                   send the dismiss preset
  show                                print the last known readings
  help                                print this help
  quit                                stop polling and exit";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { base_url: String, token: String },
    Logout,
    Refresh,
    Send {
        profile: String,
        role: CommandRole,
        text: String,
    },
    Dismiss { profile: String },
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Role(#[from] UnknownRole),
}

/// Split off the first whitespace-delimited word.
fn next_word(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    Some(match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (input, ""),
    })
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (name, rest) = next_word(line).ok_or(ParseError::Empty)?;
        let no_args = |command: Self, usage: &'static str| {
            if rest.trim().is_empty() {
                Ok(command)
            } else {
                Err(ParseError::Usage(usage))
            }
        };
        match name.to_ascii_lowercase().as_str() {
            "login" => {
                let usage = ParseError::Usage("login <url> <token>");
                let (base_url, rest) = next_word(rest).ok_or(usage.clone())?;
                let (token, rest) = next_word(rest).ok_or(usage.clone())?;
                if !rest.trim().is_empty() {
                    return Err(usage);
                }
                Ok(Self::Login {
                    base_url: base_url.to_string(),
                    token: token.to_string(),
                })
            }
            "logout" => no_args(Self::Logout, "logout"),
            "refresh" => no_args(Self::Refresh, "refresh"),
            "show" => no_args(Self::Show, "show"),
            "help" | "?" => no_args(Self::Help, "help"),
            "quit" | "exit" => no_args(Self::Quit, "quit"),
            "send" => {
                let usage = ParseError::Usage("send <profile> <execute|play> <text>");
                let (profile, rest) = next_word(rest).ok_or(usage.clone())?;
                let (role, rest) = next_word(rest).ok_or(usage)?;
                Ok(Self::Send {
                    profile: profile.to_string(),
                    role: role.parse()?,
                    text: rest.trim_start().to_string(),
                })
            }
            "dismiss" => {
                let usage = ParseError::Usage("dismiss <profile>");
                let (profile, rest) = next_word(rest).ok_or(usage.clone())?;
                if !rest.trim().is_empty() {
                    return Err(usage);
                }
                Ok(Self::Dismiss {
                    profile: profile.to_string(),
                })
            }
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

/// Lines typed on stdin.
///
/// Reading happens on a dedicated thread so a pending read never holds up
/// runtime shutdown.
#[must_use]
pub fn stdin_lines() -> UnboundedReceiverStream<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "unable to read console input");
                    break;
                }
            }
        }
    });
    UnboundedReceiverStream::new(rx)
}

/// Everything the console needs to act on commands.
pub struct Console<C> {
    session: SessionStore,
    cache: EntityCache,
    catalog: Arc<Catalog>,
    dispatcher: CommandDispatcher<C>,
    refresh: RefreshTrigger,
}

impl<C: StateClient> Console<C> {
    #[must_use]
    pub fn new(
        session: SessionStore,
        cache: EntityCache,
        catalog: Arc<Catalog>,
        dispatcher: CommandDispatcher<C>,
        refresh: RefreshTrigger,
    ) -> Self {
        Self {
            session,
            cache,
            catalog,
            dispatcher,
            refresh,
        }
    }

    /// Read commands until `quit` or end of input.
    pub async fn run<S>(&self, mut lines: S)
    where
        S: Stream<Item = String> + Unpin,
    {
        while let Some(line) = lines.next().await {
            if line.trim().is_empty() {
                continue;
            }
            let reply = match line.parse::<Command>() {
                Ok(command) => self.execute(command).await,
                Err(err) => ControlFlow::Continue(format!("{err} (type `help` for commands)")),
            };
            match reply {
                ControlFlow::Continue(text) => println!("{text}"),
                ControlFlow::Break(text) => {
                    println!("{text}");
                    return;
                }
            }
        }
        tracing::debug!("console input closed");
    }

    /// Act on one command. `Break` means the console should exit.
    pub async fn execute(&self, command: Command) -> ControlFlow<String, String> {
        let text = match command {
            Command::Login { base_url, token } => {
                if self.session.provide(&base_url, &token) {
                    format!("logged in to {}", base_url.trim().trim_end_matches('/'))
                } else {
                    "login needs both a base url and a token".to_string()
                }
            }
            Command::Logout => {
                self.session.clear();
                "logged out".to_string()
            }
            Command::Refresh => {
                if self.session.is_configured() {
                    self.refresh.request();
                    "refresh requested".to_string()
                } else {
                    "not logged in".to_string()
                }
            }
            Command::Send {
                profile,
                role,
                text,
            } => match self.catalog.command(&profile, role, text) {
                Ok(request) => {
                    render::command_outcome(&self.dispatcher.dispatch_request(&request).await)
                }
                Err(err) => err.to_string(),
            },
            Command::Dismiss { profile } => match self.catalog.dismiss(&profile) {
                Ok(request) => {
                    render::command_outcome(&self.dispatcher.dispatch_request(&request).await)
                }
                Err(err) => err.to_string(),
            },
            Command::Show => {
                let status = if self.session.is_configured() {
                    "logged in"
                } else {
                    "not logged in"
                };
                format!(
                    "{status}\n{}",
                    render::groups_block(&self.catalog, &self.cache.snapshot_all())
                )
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return ControlFlow::Break("bye".to_string()),
        };
        ControlFlow::Continue(text)
    }
}
