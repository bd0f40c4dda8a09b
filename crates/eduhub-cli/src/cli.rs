use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// EduHub from the terminal: sign in, see who is around, chat.
///
/// Starts an interactive shell. The session cookie lives only in this
/// process, so everything happens inside one shell session.
#[derive(Parser, Debug)]
#[command(name = "eduhub", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (e.g. `eduhub=debug`).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}

/// One line typed at the shell prompt.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "eduhub", disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in. The password is asked for on the next line.
    Login { username: String },
    /// Create an account and sign in.
    Register {
        username: String,
        email: String,
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Ask the server who is signed in.
    Whoami,
    /// Sign out and forget the cached identity.
    Logout,
    /// List people you can message.
    Users,
    /// Open a live conversation. Lines typed are sent; `/leave` returns.
    Chat {
        /// User id of the partner.
        partner: i64,
    },
    /// Leave the shell.
    #[command(alias = "exit")]
    Quit,
}

impl ShellLine {
    pub fn parse_line(line: &str) -> Result<Self, clap::Error> {
        Self::try_parse_from(line.split_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_shell_commands() {
        let line = ShellLine::parse_line("chat 7").unwrap();
        assert!(matches!(line.command, Command::Chat { partner: 7 }));

        let line = ShellLine::parse_line("register binh b@eduhub.vn --display-name Binh").unwrap();
        assert!(matches!(
            line.command,
            Command::Register { ref display_name, .. } if display_name.as_deref() == Some("Binh")
        ));

        let line = ShellLine::parse_line("exit").unwrap();
        assert!(matches!(line.command, Command::Quit));
    }

    #[test]
    fn rejects_bad_partner_id() {
        assert!(ShellLine::parse_line("chat seven").is_err());
        assert!(ShellLine::parse_line("dance").is_err());
    }

    #[test]
    fn top_level_flags() {
        let args = Args::parse_from(["eduhub", "--log-level", "eduhub=debug"]);
        assert_eq!(args.log_level.as_deref(), Some("eduhub=debug"));
        assert!(args.config.is_none());
    }
}
