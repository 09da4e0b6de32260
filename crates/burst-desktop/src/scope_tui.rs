use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use burst_core::trace::Line;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{Level, LevelFilter, Metadata, Record};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line as TextLine, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::scope::{Capture, View};

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
}

// Extension trait for log::Level to provide UI rendering methods
trait LevelExt {
    fn color(&self) -> Color;
    fn prefix(&self) -> &str;
}

impl LevelExt for Level {
    fn color(&self) -> Color {
        match *self {
            Level::Error => Color::Red,
            Level::Warn => Color::Yellow,
            Level::Info => Color::Cyan,
            Level::Debug => Color::Gray,
            Level::Trace => Color::DarkGray,
        }
    }

    fn prefix(&self) -> &str {
        match *self {
            Level::Error => "[ERROR]",
            Level::Warn => "[WARN] ",
            Level::Info => "[INFO] ",
            Level::Debug => "[DEBUG]",
            Level::Trace => "[TRACE]",
        }
    }
}

enum TuiMessage {
    Log(LogEntry),
    Capture(Box<Capture>),
    Shutdown,
}

struct TuiState {
    capture: Option<Capture>,
    logs: Vec<LogEntry>,
    rx: Receiver<TuiMessage>,
    view: View,
    frozen: bool,
    max_logs: usize,
    should_quit: bool,
}

impl TuiState {
    fn new(rx: Receiver<TuiMessage>) -> Self {
        Self {
            capture: None,
            logs: Vec::new(),
            rx,
            view: View::Cycle,
            frozen: false,
            max_logs: 100,
            should_quit: false,
        }
    }

    fn collect_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                TuiMessage::Log(log) => {
                    self.logs.push(log);
                    if self.logs.len() > self.max_logs {
                        self.logs.remove(0);
                    }
                }
                TuiMessage::Capture(capture) => {
                    if !self.frozen {
                        self.capture = Some(*capture);
                    }
                }
                TuiMessage::Shutdown => {
                    self.should_quit = true;
                }
            }
        }
    }
}

// Logger implementation that sends logs to the TUI
struct TuiLogger {
    tx: Sender<TuiMessage>,
}

impl log::Log for TuiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let entry = LogEntry {
                level: record.level(),
                message: format!("{}", record.args()),
            };
            // TUI might have shut down
            let _ = self.tx.send(TuiMessage::Log(entry));
        }
    }

    fn flush(&self) {}
}

/// Terminal scope running on its own thread.
///
/// Shows the latest capture as two digital traces with the measured timings
/// and a log panel. Closing it (Q/Esc/Ctrl+C) clears [`is_running`](Self::is_running).
pub struct ScopeTui {
    tx: Sender<TuiMessage>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ScopeTui {
    pub fn new() -> Result<Self, anyhow::Error> {
        let (tx, rx) = channel();
        let running = Arc::new(AtomicBool::new(true));

        let running_tui = Arc::clone(&running);
        let thread = thread::Builder::new()
            .name("scope_tui".to_string())
            .spawn(move || {
                if let Err(e) = run_tui(rx) {
                    eprintln!("TUI error: {}", e);
                }
                running_tui.store(false, Ordering::Release);
            })?;

        let logger = TuiLogger { tx: tx.clone() };
        if log::set_boxed_logger(Box::new(logger)).is_ok() {
            log::set_max_level(LevelFilter::Debug);
        }

        Ok(Self {
            tx,
            running,
            thread: Some(thread),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn publish(&self, capture: Capture) {
        let _ = self.tx.send(TuiMessage::Capture(Box::new(capture)));
    }

    pub fn shutdown(&mut self) {
        let _ = self.tx.send(TuiMessage::Shutdown);
        if let Some(thread) = self.thread.take() {
            // terminal must be restored before the process exits
            let _ = thread.join();
        }
    }
}

impl Drop for ScopeTui {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_tui(rx: Receiver<TuiMessage>) -> Result<(), io::Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut tui_state = TuiState::new(rx);

    loop {
        tui_state.collect_messages();
        if tui_state.should_quit {
            break;
        }

        terminal.draw(|f| ui(f, &tui_state))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Tab => tui_state.view = tui_state.view.toggle(),
                    KeyCode::Char(' ') => tui_state.frozen = !tui_state.frozen,
                    _ => {}
                }
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

fn ui(f: &mut Frame, state: &TuiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Title + timings
            Constraint::Length(8), // Traces
            Constraint::Min(6),    // Logs
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    render_header(f, chunks[0], state);
    render_traces(f, chunks[1], state);
    render_logs(f, chunks[2], state);

    let help = Paragraph::new("Tab: Cycle/Burst view | Space: Freeze | Q/ESC/Ctrl+C: Quit")
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, chunks[3]);
}

fn render_header(f: &mut Frame, area: Rect, state: &TuiState) {
    let text = match &state.capture {
        Some(capture) => {
            let config = &capture.config;
            let mut lines = vec![TextLine::from(format!(
                "{} Hz x {} pulses | duty {}/{} | burst delay {} us | cycles {} | echo {:.1} us",
                config.frequency_hz,
                config.count,
                config.duty,
                config.max_duty(),
                config.burst_delay_us().unwrap_or_default(),
                capture.cycles,
                capture.echo_time_ns() as f32 / 1000.0,
            ))];
            if let Some(m) = capture.measure() {
                lines.push(TextLine::from(format!(
                    "trigger high {} us | signal on {} us (+{} us) | period {}",
                    m.trigger_high_us,
                    m.signal_on_us,
                    m.signal_lag_us,
                    m.period_us
                        .map(|p| format!("{} us", p))
                        .unwrap_or_else(|| "-".to_string()),
                )));
            }
            lines
        }
        None => vec![TextLine::from("Waiting for first burst...")],
    };

    let title = if state.frozen { "Burst Scope (frozen)" } else { "Burst Scope" };
    let header = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                title,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(header, area);
}

fn render_traces(f: &mut Frame, area: Rect, state: &TuiState) {
    let title = match state.view {
        View::Cycle => "Traces: full cycle",
        View::Burst => "Traces: burst",
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(capture) = &state.capture else {
        return;
    };

    const LABEL_WIDTH: u16 = 10;
    let columns = inner.width.saturating_sub(LABEL_WIDTH) as usize;
    let rows = [
        ("TRIGGER", Line::Trigger, Color::Yellow),
        ("SIGNAL", Line::Signal, Color::Green),
    ];

    let mut lines = Vec::new();
    for (label, line, color) in rows {
        lines.push(TextLine::from(vec![
            Span::styled(format!("{:<width$}", label, width = LABEL_WIDTH as usize), Style::default().fg(color)),
            Span::styled(capture.render(line, state.view, columns), Style::default().fg(color)),
        ]));
        lines.push(TextLine::from(""));
    }

    if let Some((start, end)) = capture.window(state.view) {
        lines.push(TextLine::from(Span::styled(
            format!("window {} us .. {} us ({} us)", start, end, end - start),
            Style::default().fg(Color::DarkGray),
        )));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_logs(f: &mut Frame, area: Rect, state: &TuiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Logs (scrolls automatically)");

    let inner = block.inner(area);
    f.render_widget(block, area);

    let max_logs = inner.height as usize;
    let start_idx = state.logs.len().saturating_sub(max_logs);

    let log_items: Vec<ListItem> = state.logs[start_idx..]
        .iter()
        .map(|log| {
            let content = TextLine::from(vec![
                Span::styled(log.level.prefix(), Style::default().fg(log.level.color())),
                Span::raw(" "),
                Span::raw(&log.message),
            ]);
            ListItem::new(content)
        })
        .collect();

    f.render_widget(List::new(log_items), inner);
}
