use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use std::fmt::Write as _;

use crate::{
    repository::NoteStore,
    service::{NoteListController, NoteListView},
};

pub const EMPTY_MESSAGE: &str = "No todos yet. Add one above!";
pub const LOADING_MESSAGE: &str = "Loading...";

const HELP: &str = "\
commands:
  add <text>     create a todo
  draft <text>   edit the draft without submitting
  submit         create a todo from the draft
  toggle <n>     mark row n done / not done
  rm <n>         delete row n
  ls             show the list
  help           show this help
  quit           exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Draft(String),
    Submit,
    Toggle(usize),
    Remove(usize),
    List,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Unknown(String),
    MissingRow(&'static str),
    BadRow(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(cmd) => write!(f, "unknown command '{cmd}', try 'help'"),
            Self::MissingRow(cmd) => write!(f, "'{cmd}' needs a row number"),
            Self::BadRow(raw) => write!(f, "'{raw}' is not a row number"),
        }
    }
}

fn parse_row(cmd: &'static str, rest: &str) -> Result<usize, ParseError> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(ParseError::MissingRow(cmd));
    }
    match rest.parse::<usize>() {
        Ok(row) if row > 0 => Ok(row),
        _ => Err(ParseError::BadRow(rest.to_string())),
    }
}

/// Parses one input line. Text arguments are kept verbatim; blank-text
/// checks belong to the controller.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    let (cmd, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));

    match cmd {
        "add" => Ok(Command::Add(rest.to_string())),
        "draft" => Ok(Command::Draft(rest.to_string())),
        "submit" => Ok(Command::Submit),
        "toggle" => parse_row("toggle", rest).map(Command::Toggle),
        "rm" | "delete" => parse_row("rm", rest).map(Command::Remove),
        "ls" | "" => Ok(Command::List),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

pub fn render(view: &NoteListView) -> String {
    let mut out = String::new();

    if view.is_loading {
        out.push_str(LOADING_MESSAGE);
        out.push('\n');
    } else if view.show_empty_message {
        out.push_str(EMPTY_MESSAGE);
        out.push('\n');
    }

    for (idx, note) in view.notes.iter().enumerate() {
        let mark = if note.completed { 'x' } else { ' ' };
        let _ = writeln!(out, "{}. [{}] {}", idx + 1, mark, note.text);
    }

    if !view.draft.is_empty() {
        let _ = writeln!(out, "draft: {}", view.draft);
    }

    out
}

/// Applies one command. Returns `false` once the session should end.
pub async fn dispatch<S: NoteStore>(controller: &NoteListController<S>, command: Command) -> bool {
    match command {
        Command::Add(text) => {
            controller.set_draft(text).await;
            controller.submit_draft().await;
        }
        Command::Draft(text) => controller.set_draft(text).await,
        Command::Submit => {
            controller.submit_draft().await;
        }
        Command::Toggle(row) => {
            let notes = controller.notes().await;
            match row.checked_sub(1).and_then(|idx| notes.get(idx)) {
                Some(note) => {
                    controller.toggle_completion(&note.id, note.completed).await;
                }
                None => tracing::warn!("No row {} to toggle", row),
            }
        }
        Command::Remove(row) => {
            let notes = controller.notes().await;
            match row.checked_sub(1).and_then(|idx| notes.get(idx)) {
                Some(note) => {
                    controller.remove_note(&note.id).await;
                }
                None => tracing::warn!("No row {} to delete", row),
            }
        }
        Command::List | Command::Help => {}
        Command::Quit => return false,
    }
    true
}

/// Read-eval-render loop over `input` until `quit` or end of input.
pub async fn run<S, R, W>(
    controller: &NoteListController<S>,
    input: R,
    mut output: W,
) -> std::io::Result<()>
where
    S: NoteStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output
        .write_all(render(&controller.view().await).as_bytes())
        .await?;
    output.flush().await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                output.write_all(format!("{e}\n").as_bytes()).await?;
                output.flush().await?;
                continue;
            }
        };

        if command == Command::Help {
            output.write_all(HELP.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }

        if !dispatch(controller, command).await {
            break;
        }

        output
            .write_all(render(&controller.view().await).as_bytes())
            .await?;
        output.flush().await?;
    }

    Ok(())
}
