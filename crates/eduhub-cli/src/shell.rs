//! The interactive shell and its commands.

use std::collections::HashSet;

use eduhub_client::session::AuthError;
use eduhub_client::{ApiError, ConversationError, EduhubClient, LoginForm, RegisterForm};
use eduhub_common::{Event, Message, UserId};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::broadcast;
use tracing::debug;

use crate::cli::{Command, ShellLine};

const LEAVE: &str = "/leave";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Conversation(#[from] ConversationError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("not logged in, use `login <username>` first")]
    NotLoggedIn,
}

enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    client: EduhubClient,
    lines: Lines<BufReader<Stdin>>,
    events: broadcast::Receiver<Event>,
}

impl Shell {
    pub fn new(client: EduhubClient) -> Self {
        let events = client.events().subscribe();
        Self {
            client,
            lines: BufReader::new(io::stdin()).lines(),
            events,
        }
    }

    pub async fn run(&mut self) -> Result<(), CliError> {
        if let Some(user) = self.client.session().cached_identity() {
            println!("Last signed in as {} (unverified, try `whoami`)", user.label());
        }

        loop {
            self.report_session_events();
            prompt("eduhub> ").await?;
            let Some(line) = self.lines.next_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let command = match ShellLine::parse_line(&line) {
                Ok(parsed) => parsed.command,
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            };
            match self.execute(command).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(CliError::Io(e)) => return Err(CliError::Io(e)),
                Err(e) => println!("error: {e}"),
            }
        }
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<Flow, CliError> {
        match command {
            Command::Login { username } => {
                let password = self.read_secret("password: ").await?;
                let user = self
                    .client
                    .session()
                    .login(&LoginForm::new(username, password))
                    .await?;
                println!("Logged in as {} (#{})", user.label(), user.id);
            }
            Command::Register {
                username,
                email,
                display_name,
            } => {
                let password = self.read_secret("password: ").await?;
                let form = RegisterForm {
                    username,
                    email,
                    password,
                    display_name: display_name.unwrap_or_default(),
                };
                let user = self.client.session().register(&form).await?;
                println!("Welcome, {} (#{})", user.label(), user.id);
            }
            Command::Whoami => match self.client.session().try_reconcile().await? {
                Some(user) => println!(
                    "{} (@{}, #{}) <{}>",
                    user.label(),
                    user.username,
                    user.id,
                    user.email
                ),
                None => return Err(CliError::NotLoggedIn),
            },
            Command::Logout => {
                self.client.session().logout().await;
                println!("Logged out");
            }
            Command::Users => {
                let me = self
                    .client
                    .session()
                    .require_identity()
                    .await
                    .ok_or(CliError::NotLoggedIn)?;
                let partners = self.client.directory().list_partners(Some(me.id)).await?;
                if partners.is_empty() {
                    println!("Nobody else is here yet");
                }
                for user in partners {
                    println!("{:>6}  {:<24} @{}", user.id, user.label(), user.username);
                }
            }
            Command::Chat { partner } => self.chat(UserId(partner)).await?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn chat(&mut self, partner: UserId) -> Result<(), CliError> {
        let me = self
            .client
            .session()
            .require_identity()
            .await
            .ok_or(CliError::NotLoggedIn)?;

        let poller = self.client.conversation();
        let mut view = poller.subscribe();
        poller.select(partner).await;
        println!("Chatting with #{partner}. Type {LEAVE} to go back.");

        let mut shown = HashSet::new();
        print_new(&poller.snapshot().messages, me.id, &mut shown);

        loop {
            tokio::select! {
                changed = view.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let messages = view.borrow_and_update().messages.clone();
                    print_new(&messages, me.id, &mut shown);
                }
                line = self.lines.next_line() => {
                    let Some(line) = line? else { break };
                    let line = line.trim();
                    if line == LEAVE {
                        break;
                    }
                    if line.is_empty() {
                        continue;
                    }
                    if let Err(e) = poller.send(line).await {
                        println!("! not sent: {e}");
                    }
                }
                event = self.events.recv() => {
                    // SessionExpired is published exactly once per expiry, in the
                    // same step that clears the cache. Navigate follows it and only
                    // names the login route, which a terminal has no use for.
                    if let Ok(Event::SessionExpired) = event {
                        println!("! session expired, please log in again");
                        break;
                    }
                }
            }
        }

        poller.teardown();
        Ok(())
    }

    async fn read_secret(&mut self, label: &str) -> Result<String, CliError> {
        prompt(label).await?;
        Ok(self.lines.next_line().await?.unwrap_or_default())
    }

    fn report_session_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(Event::SessionExpired) => println!("! session expired, please log in again"),
                Ok(Event::Navigate(route)) => debug!(%route, "navigation requested"),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "session events lagged");
                }
                Err(_) => break,
            }
        }
    }
}

async fn prompt(label: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await
}

/// Print messages not shown yet, oldest first.
fn print_new(messages: &[Message], me: UserId, shown: &mut HashSet<i64>) {
    for message in messages {
        if !shown.insert(message.id) {
            continue;
        }
        let who = if message.is_from(me) {
            "you".to_string()
        } else {
            format!("#{}", message.sender_id)
        };
        println!(
            "[{}] {}: {}",
            message.created_at.format("%H:%M"),
            who,
            message.content
        );
    }
}
