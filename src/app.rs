//! Interactive session
//!
//! Lines come in, the session decides what they mean, and an `Action`
//! goes out for the terminal loop to print. Statements accumulate across
//! lines until the input ends with `;`. Backslash commands run at once.

use crate::commands::{Command, HELP_TEXT, is_command, parse_command};
use crate::db::{Connector, DbClient, DriverConnector, QueryResult};
use crate::error::Result;
use crate::export::ExportFormat;
use crate::history::QueryHistory;
use crate::ui::{Prompt, PromptAction, render_table, row_count};
use crossterm::style::Stylize;
use std::path::Path;

/// Terminator that commits a statement
pub const STATEMENT_TERMINATOR: char = ';';

const CONTINUATION_PROMPT: &str = "    -> ";

/// What the terminal loop should do after a line was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing to show (statement still incomplete, blank line)
    None,
    /// Normal output
    Print(String),
    /// Failure to report; the session keeps going
    Error(String),
    Quit,
}

pub struct App<C: Connector = DriverConnector> {
    client: DbClient<C>,
    history: QueryHistory,

    /// Lines of a statement not yet terminated
    pending: String,

    /// Most recent result with columns, source for copy/export
    last_result: Option<QueryResult>,

    /// Opened on first copy (kept alive to avoid Linux clipboard drop race)
    clipboard: Option<arboard::Clipboard>,

    pub running: bool,
}

impl<C: Connector> App<C> {
    pub fn new(client: DbClient<C>, history: QueryHistory) -> Self {
        Self {
            client,
            history,
            pending: String::new(),
            last_result: None,
            clipboard: None,
            running: true,
        }
    }

    /// Prompt for the next line: the connection label, or a continuation
    /// marker while a statement is incomplete
    pub fn prompt(&self) -> String {
        if self.pending.is_empty() {
            format!("{}> ", self.client.options().display_name())
        } else {
            CONTINUATION_PROMPT.to_string()
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drop a partially typed statement (Ctrl+C)
    pub fn cancel_pending(&mut self) {
        self.pending.clear();
    }

    pub fn last_result(&self) -> Option<&QueryResult> {
        self.last_result.as_ref()
    }

    pub fn history(&self) -> &QueryHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut QueryHistory {
        &mut self.history
    }

    pub fn client(&self) -> &DbClient<C> {
        &self.client
    }

    /// Handle one line of input
    pub async fn handle_line(&mut self, line: &str) -> Action {
        if self.pending.is_empty() {
            if line.trim().is_empty() {
                return Action::None;
            }
            if is_command(line) {
                return match parse_command(line) {
                    Ok(command) => self.execute_command(command).await,
                    Err(e) => Action::Error(e.to_string()),
                };
            }
        } else {
            self.pending.push('\n');
        }
        self.pending.push_str(line);

        if !self.pending.trim_end().ends_with(STATEMENT_TERMINATOR) {
            return Action::None;
        }
        let statement = std::mem::take(&mut self.pending);
        self.run_statement(statement.trim()).await
    }

    async fn run_statement(&mut self, statement: &str) -> Action {
        self.history.push(statement);
        match self.client.query(statement).await {
            Ok(Some(result)) if !result.columns.is_empty() => {
                let text = render_table(&result);
                self.last_result = Some(result);
                Action::Print(text)
            }
            Ok(_) => Action::Print("No results".to_string()),
            Err(e) => {
                tracing::debug!(error = %e, "statement failed");
                Action::Error(e.to_string())
            }
        }
    }

    async fn execute_command(&mut self, command: Command) -> Action {
        match command {
            Command::Quit => {
                self.running = false;
                Action::Quit
            }
            Command::Help => Action::Print(HELP_TEXT.to_string()),
            Command::UseDatabase(name) => match self.client.use_database(&name).await {
                Ok(()) => Action::Print(format!("Now using database {}", name)),
                Err(e) => Action::Error(e.to_string()),
            },
            Command::Copy(format) => self.copy_result(format),
            Command::Export(format, path) => self.export_result(format, &path),
            Command::History => {
                let listing: Vec<String> = self
                    .history
                    .entries()
                    .enumerate()
                    .map(|(i, entry)| format!("{:>4}  {}", i + 1, entry))
                    .collect();
                if listing.is_empty() {
                    Action::Print("History is empty".to_string())
                } else {
                    Action::Print(listing.join("\n"))
                }
            }
        }
    }

    fn copy_result(&mut self, format: ExportFormat) -> Action {
        let Some(result) = &self.last_result else {
            return Action::Error("No results to copy".to_string());
        };
        let text = format.render(result);
        let rows = result.row_count();

        if self.clipboard.is_none() {
            match arboard::Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => return Action::Error(format!("Clipboard unavailable: {}", e)),
            }
        }
        let Some(clipboard) = self.clipboard.as_mut() else {
            return Action::Error("Clipboard unavailable".to_string());
        };
        match clipboard.set_text(text) {
            Ok(()) => Action::Print(format!(
                "Copied {} as {}",
                row_count(rows),
                format.extension().to_uppercase()
            )),
            Err(e) => Action::Error(format!("Clipboard error: {}", e)),
        }
    }

    fn export_result(&self, format: ExportFormat, path: &Path) -> Action {
        let Some(result) = &self.last_result else {
            return Action::Error("No results to export".to_string());
        };
        let data = format.render(result);
        match std::fs::write(path, &data) {
            Ok(()) => Action::Print(format!(
                "Exported {} as {} ({} bytes)",
                path.display(),
                format.extension().to_uppercase(),
                data.len()
            )),
            Err(e) => Action::Error(format!("Export failed: {}", e)),
        }
    }

    /// Read, handle and print lines until quit or end of input
    pub async fn run(&mut self) -> Result<()> {
        let mut prompt = Prompt::new();
        while self.running {
            let label = self.prompt();
            let history = &mut self.history;
            let action = tokio::task::block_in_place(|| prompt.read_line(&label, history))?;

            match action {
                PromptAction::Submit(line) => match self.handle_line(&line).await {
                    Action::None => {}
                    Action::Print(text) => println!("{}", text),
                    Action::Error(text) => eprintln!("{}", text.red()),
                    Action::Quit => break,
                },
                PromptAction::Cancel => self.cancel_pending(),
                PromptAction::Eof => break,
                PromptAction::Consumed => {}
            }
        }
        Ok(())
    }

    /// Close the database connection
    pub async fn shutdown(mut self) {
        self.history.stop_browsing();
        self.client.destroy().await;
    }
}
