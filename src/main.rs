use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Stylize;
use pickbox::candidate::{Candidate, load_candidates, parse_candidates_yaml};
use pickbox::terminal::{Terminal, TerminalEvent};
use pickbox::widgets::ComboBox;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

const DEFAULT_DATASET: &str = include_str!("../demos/countries.yaml");

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let candidates = match std::env::args().nth(1) {
        Some(path) => load_candidates(Path::new(&path))?,
        None => parse_candidates_yaml(DEFAULT_DATASET)?,
    };

    let mut terminal = Terminal::new().map_err(|e| e.to_string())?;
    terminal.enter().map_err(|e| e.to_string())?;

    let result = event_loop(&mut terminal, candidates);

    let exit_result = terminal.exit();
    result.and(exit_result).map_err(|e| e.to_string())
}

fn event_loop(terminal: &mut Terminal, candidates: Vec<Candidate>) -> io::Result<()> {
    let mut combobox = ComboBox::new("Country", candidates).with_max_visible(8);
    let mut render_requested = true;

    loop {
        if render_requested {
            draw(terminal, &combobox)?;
            render_requested = false;
        }

        let now = Instant::now();
        let timeout = combobox.poll_timeout(now, Duration::from_millis(120));
        if terminal.poll(timeout)? {
            match terminal.read_event()? {
                Some(TerminalEvent::Key(key)) if should_exit(key) => break,
                Some(TerminalEvent::Key(key)) => {
                    if combobox.on_key(key, Instant::now()).request_render {
                        render_requested = true;
                    }
                }
                Some(TerminalEvent::Resize { .. }) => render_requested = true,
                None => {}
            }
        }

        if combobox.tick(Instant::now()).request_render {
            render_requested = true;
        }
    }

    Ok(())
}

fn should_exit(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
}

fn draw(terminal: &mut Terminal, combobox: &ComboBox) -> io::Result<()> {
    let mut lines = combobox.render_lines();
    lines.push(String::new());
    if let Some(value) = combobox.committed() {
        lines.push(format!("  selected: {}", value));
    }
    lines.push(format!(
        "  {}",
        "Type to filter · ↑/↓ navigate · Enter select · Tab popup · Esc clear · Ctrl+Q quit"
            .dark_grey()
    ));

    terminal.draw_lines(&lines)?;
    terminal.place_cursor(0, combobox.cursor_col())
}
