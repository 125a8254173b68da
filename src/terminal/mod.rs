use crossterm::event::{Event, KeyEvent, KeyEventKind, poll, read};
use crossterm::style::Print;
use crossterm::{cursor, execute, queue, terminal};
use std::io::{self, Stdout, Write};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub enum TerminalEvent {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
}

/// Raw-mode terminal wrapper for the demo frontend: alternate screen,
/// event polling, and line-oriented repainting.
pub struct Terminal {
    stdout: Stdout,
    drawn_rows: u16,
}

impl Terminal {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            stdout: io::stdout(),
            drawn_rows: 0,
        })
    }

    pub fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.stdout,
            terminal::EnterAlternateScreen,
            cursor::MoveTo(0, 0)
        )
    }

    pub fn exit(&mut self) -> io::Result<()> {
        let leave = execute!(
            self.stdout,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        terminal::disable_raw_mode().and(leave)
    }

    pub fn poll(&self, timeout: Duration) -> io::Result<bool> {
        poll(timeout)
    }

    /// Next key press or resize; other terminal events are skipped.
    pub fn read_event(&mut self) -> io::Result<Option<TerminalEvent>> {
        match read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                Ok(Some(TerminalEvent::Key(key)))
            }
            Event::Resize(width, height) => Ok(Some(TerminalEvent::Resize { width, height })),
            _ => Ok(None),
        }
    }

    /// Repaints the frame from the top row, clearing what the previous
    /// frame drew below it.
    pub fn draw_lines(&mut self, lines: &[String]) -> io::Result<()> {
        queue!(self.stdout, cursor::Hide)?;
        for (row, line) in lines.iter().enumerate() {
            queue!(
                self.stdout,
                cursor::MoveTo(0, row as u16),
                terminal::Clear(terminal::ClearType::CurrentLine),
                Print(line)
            )?;
        }
        for row in lines.len()..self.drawn_rows as usize {
            queue!(
                self.stdout,
                cursor::MoveTo(0, row as u16),
                terminal::Clear(terminal::ClearType::CurrentLine)
            )?;
        }
        self.drawn_rows = lines.len() as u16;
        self.stdout.flush()
    }

    pub fn place_cursor(&mut self, row: u16, col: u16) -> io::Result<()> {
        execute!(self.stdout, cursor::MoveTo(col, row), cursor::Show)
    }
}
