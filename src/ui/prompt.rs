//! Line prompt
//!
//! A single-line editor driven by crossterm key events. Up/Down walk the
//! statement history only when the line is empty or a walk is already in
//! progress, so arrow keys never clobber text being typed.

use crate::history::QueryHistory;
use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use std::io::{self, BufRead, IsTerminal, Write};
use unicode_width::UnicodeWidthStr;

/// What the caller should do after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    /// Key handled, keep reading
    Consumed,
    /// Enter was pressed with this line
    Submit(String),
    /// Ctrl+C: drop the current input
    Cancel,
    /// Ctrl+D on an empty line, or end of piped input
    Eof,
}

/// Editable line with a cursor (byte offset, always on a char boundary)
#[derive(Debug, Default)]
pub struct LineInput {
    input: String,
    cursor: usize,
}

impl LineInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the line, cursor at the end. Newlines from recalled
    /// multi-line statements are flattened.
    pub fn set(&mut self, text: &str) {
        self.input = text.replace('\n', " ");
        self.cursor = self.input.len();
    }

    /// Take the line, leaving the editor empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.input)
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        let s = s.replace(['\r', '\n'], " ");
        self.input.insert_str(self.cursor, &s);
        self.cursor += s.len();
    }

    /// Backspace
    pub fn delete_char(&mut self) {
        if let Some(c) = self.input[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
            self.input.remove(self.cursor);
        }
    }

    /// Delete under the cursor
    pub fn delete_forward(&mut self) {
        if self.cursor < self.input.len() {
            self.input.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.input[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.input[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.len();
    }

    /// Ctrl+U
    pub fn clear_to_start(&mut self) {
        self.input.drain(..self.cursor);
        self.cursor = 0;
    }

    /// Display width of the text left of the cursor
    pub fn cursor_column(&self) -> usize {
        self.input[..self.cursor].width()
    }

    pub fn handle_key(&mut self, key: KeyEvent, history: &mut QueryHistory) -> PromptAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => {
                history.stop_browsing();
                return PromptAction::Submit(self.take());
            }
            KeyCode::Char('c') if ctrl => {
                history.stop_browsing();
                self.take();
                return PromptAction::Cancel;
            }
            KeyCode::Char('d') if ctrl => {
                if self.input.is_empty() {
                    return PromptAction::Eof;
                }
                self.delete_forward();
            }
            KeyCode::Up => {
                if self.input.is_empty() || history.is_browsing() {
                    if let Some(entry) = history.back(&self.input) {
                        let entry = entry.to_string();
                        self.set(&entry);
                    }
                }
            }
            KeyCode::Down => {
                if history.is_browsing() {
                    let entry = history.forward().unwrap_or_default().to_string();
                    self.set(&entry);
                }
            }
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            KeyCode::Char('a') if ctrl => self.move_home(),
            KeyCode::Char('e') if ctrl => self.move_end(),
            KeyCode::Char('u') if ctrl => {
                history.stop_browsing();
                self.clear_to_start();
            }
            KeyCode::Backspace => {
                history.stop_browsing();
                self.delete_char();
            }
            KeyCode::Delete => {
                history.stop_browsing();
                self.delete_forward();
            }
            KeyCode::Tab => self.insert_char(' '),
            KeyCode::Char(c) if !ctrl => {
                history.stop_browsing();
                self.insert_char(c);
            }
            _ => {}
        }
        PromptAction::Consumed
    }
}

/// Restores cooked mode when dropped, including on early return
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Reads one line at a time from the terminal, or from stdin when it is
/// not a terminal
#[derive(Debug, Default)]
pub struct Prompt {
    line: LineInput,
}

impl Prompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the user submits, cancels or ends input.
    /// Never returns `PromptAction::Consumed`.
    pub fn read_line(
        &mut self,
        prompt: &str,
        history: &mut QueryHistory,
    ) -> io::Result<PromptAction> {
        if !io::stdin().is_terminal() {
            return read_piped_line();
        }

        let mut stdout = io::stdout();
        let _raw = RawModeGuard::enable()?;
        loop {
            self.redraw(&mut stdout, prompt)?;
            let action = match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    self.line.handle_key(key, history)
                }
                Event::Paste(text) => {
                    self.line.insert_str(&text);
                    PromptAction::Consumed
                }
                _ => PromptAction::Consumed,
            };
            if action != PromptAction::Consumed {
                execute!(stdout, Print("\r\n"))?;
                return Ok(action);
            }
        }
    }

    fn redraw(&self, out: &mut impl Write, prompt: &str) -> io::Result<()> {
        let column = prompt.width() + self.line.cursor_column();
        queue!(
            out,
            MoveToColumn(0),
            Clear(ClearType::UntilNewLine),
            Print(prompt),
            Print(self.line.input()),
            MoveToColumn(u16::try_from(column).unwrap_or(u16::MAX)),
        )?;
        out.flush()
    }
}

fn read_piped_line() -> io::Result<PromptAction> {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(PromptAction::Eof);
    }
    Ok(PromptAction::Submit(
        line.trim_end_matches(['\r', '\n']).to_string(),
    ))
}
