use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use rustyline::{error::ReadlineError, DefaultEditor};
use tracing::{debug, error};

use super::{run_session_command, FoodSession, SessionCommand};

const PROMPT: &str = "foodlog> ";

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    #[command(flatten)]
    Session(SessionCommand),
    #[command(about = "Close the session", alias = "exit")]
    Quit {},
}

/// Reads commands until `quit` or end of input. Every command runs to completion against the same
/// session before the next line is read. A failing command is reported and the loop goes on.
pub async fn run_shell(session: &mut FoodSession) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        if line.trim().is_empty() {
            continue;
        }
        if let Err(e) = editor.add_history_entry(line.as_str()) {
            debug!("Failed to keep history entry {e:?}");
        }

        let command = match split_words(&line).and_then(|words| Ok(ShellLine::try_parse_from(words)?)) {
            Ok(ShellLine { command }) => command,
            Err(e) => {
                match e.downcast_ref::<clap::Error>() {
                    Some(e) => {
                        if let Err(e) = e.print() {
                            error!("Failed to print usage {e:?}");
                        }
                    }
                    None => eprintln!("{e}"),
                }
                continue;
            }
        };

        match command {
            ShellCommand::Quit {} => return Ok(()),
            ShellCommand::Session(command) => {
                if let Err(e) = run_session_command(session, command).await {
                    error!("Command failed {e:?}");
                    eprintln!("{e:#}");
                }
            }
        }
    }
}

/// Splits a line on whitespace. Double quotes keep a label like "bibim bap" in one piece.
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut has_word = false;
    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                has_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if has_word {
                    words.push(std::mem::take(&mut current));
                    has_word = false;
                }
            }
            c => {
                current.push(c);
                has_word = true;
            }
        }
    }
    if quoted {
        bail!("Unterminated quote in {line:?}");
    }
    if has_word {
        words.push(current);
    }
    Ok(words)
}
