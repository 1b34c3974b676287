use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use tracing_subscriber::EnvFilter;

use todos_tui::application::store::TodoStore;
use todos_tui::domain::gateway::TodoGateway;
use todos_tui::infrastructure::rest_gateway::{DEFAULT_BASE_URL, RestTodoGateway};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    // Logs go to stderr so the alternate screen stays usable when they are
    // redirected to a file.
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let base_url = std::env::var("TODOS_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let store = TodoStore::new(RestTodoGateway::new(base_url.clone()));
    // Torn down with the view: any remote call still in flight when the UI
    // exits is abandoned here.
    let cancel = store.cancellation_token();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, store, base_url).await;

    cancel.cancel();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    View,
    Create,
}

struct App<G: TodoGateway> {
    store: TodoStore<G>,
    selected: usize,
    list_state: ListState,
    mode: Mode,
    draft: String,
    last_tick: Instant,
}

impl<G: TodoGateway> App<G> {
    fn clamp_selection(&mut self) {
        let len = self.store.items().len();
        if len == 0 {
            self.selected = 0;
            self.list_state.select(None);
        } else {
            if self.selected >= len {
                self.selected = len - 1;
            }
            self.list_state.select(Some(self.selected));
        }
    }
}

async fn run_app<G: TodoGateway>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    store: TodoStore<G>,
    base_url: String,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut app = App {
        store,
        selected: 0,
        list_state: ListState::default(),
        mode: Mode::View,
        draft: String::new(),
        last_tick: Instant::now(),
    };
    // A failed initial load just leaves the list empty.
    let _ = app.store.load().await;
    app.clamp_selection();

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(3),
                ])
                .split(f.size());

            let header = Paragraph::new(
                "Todos (Enter: toggle, n: new, d: delete, q: quit)  |  New: type title, Enter to add, Esc to cancel",
            )
            .block(Block::default().borders(Borders::ALL).title("todos-tui"));
            f.render_widget(header, chunks[0]);

            let rows: Vec<ListItem> = app
                .store
                .items()
                .iter()
                .map(|t| {
                    let mark = if t.check { "[x]" } else { "[ ]" };
                    ListItem::new(format!("{} {}", mark, t.title))
                })
                .collect();
            if app.store.items().is_empty() {
                app.list_state.select(None);
            } else {
                app.list_state.select(Some(app.selected));
            }
            let list = List::new(rows)
                .block(Block::default().borders(Borders::ALL).title("items"))
                .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, chunks[1], &mut app.list_state);

            let footer_text = match app.mode {
                Mode::View => format!("TODOS_URL={}", base_url),
                Mode::Create => format!("New todo: {}_  |  (Enter to add, Esc to cancel)", app.draft),
            };
            let footer = Paragraph::new(footer_text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(match app.mode { Mode::View => "info", Mode::Create => "create" }),
            );
            f.render_widget(footer, chunks[2]);
        })?;

        let timeout = tick_rate.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; ignore repeats and releases to prevent duplicate input
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.mode {
                    Mode::View => match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Up => {
                            if app.selected > 0 {
                                app.selected -= 1;
                            }
                        }
                        KeyCode::Down => {
                            let len = app.store.items().len();
                            if app.selected + 1 < len {
                                app.selected += 1;
                            }
                        }
                        KeyCode::Enter => {
                            let target = app
                                .store
                                .items()
                                .get(app.selected)
                                .map(|t| (t.id, !t.check));
                            if let Some((id, next)) = target {
                                let _ = app.store.toggle(id, next).await;
                            }
                        }
                        KeyCode::Char('d') => {
                            let target = app.store.items().get(app.selected).map(|t| t.id);
                            if let Some(id) = target {
                                let _ = app.store.remove(id).await;
                                app.clamp_selection();
                            }
                        }
                        KeyCode::Char('n') => {
                            app.mode = Mode::Create;
                            app.draft.clear();
                        }
                        _ => {}
                    },
                    Mode::Create => match key.code {
                        KeyCode::Esc => {
                            app.mode = Mode::View;
                            app.draft.clear();
                        }
                        KeyCode::Enter => {
                            // Confirming an empty draft is a no-op; the
                            // widget stays in create mode.
                            if !app.draft.trim().is_empty() {
                                let draft = std::mem::take(&mut app.draft);
                                let _ = app.store.add(&draft).await;
                                app.mode = Mode::View;
                                app.clamp_selection();
                            }
                        }
                        KeyCode::Backspace => {
                            app.draft.pop();
                        }
                        KeyCode::Char(c) => app.draft.push(c),
                        _ => {}
                    },
                }
            }
        }
        if app.last_tick.elapsed() >= tick_rate {
            app.last_tick = Instant::now();
        }
    }
    Ok(())
}
