pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::app::Result;
use crate::poller::Match;

use self::app::TuiApp;
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Show matches arriving on `rx` until the user quits.
pub async fn run(rx: mpsc::Receiver<Match>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, rx).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, mut rx: mpsc::Receiver<Match>) -> Result<()> {
    let mut tui_app = TuiApp::new();
    let event_handler = EventHandler::new(Duration::from_millis(100));

    loop {
        drain_matches(&mut tui_app, &mut rx);
        terminal.draw(|frame| layout::render(frame, &mut tui_app))?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                tui_app.clear_status();
                match Action::from(key) {
                    Action::Quit => tui_app.should_quit = true,
                    Action::MoveUp => tui_app.move_up(),
                    Action::MoveDown => tui_app.move_down(),
                    Action::NextPage => tui_app.next_page(),
                    Action::PrevPage => tui_app.prev_page(),
                    Action::First => tui_app.first(),
                    Action::Last => tui_app.last(),
                    Action::NextPane => tui_app.active_pane = tui_app.active_pane.next(),
                    Action::PrevPane => tui_app.active_pane = tui_app.active_pane.prev(),
                    Action::OpenInBrowser => {
                        if let Some(link) = tui_app.selected().map(|f| f.item.link.clone()) {
                            if link.is_empty() {
                                tui_app.set_status("Item has no link".to_string());
                            } else if let Err(e) = open::that(&link) {
                                tui_app.set_status(format!("Failed to open browser: {}", e));
                            }
                        }
                    }
                    Action::None => {}
                }
            }
            AppEvent::Tick => {}
        }

        if tui_app.should_quit {
            break;
        }

        // Let the poller task make progress between frames.
        tokio::task::yield_now().await;
    }

    Ok(())
}

fn drain_matches(tui_app: &mut TuiApp, rx: &mut mpsc::Receiver<Match>) {
    let mut new = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(found) => new.push(found),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                if tui_app.polling {
                    tui_app.polling = false;
                    tracing::warn!("Poller stopped");
                }
                break;
            }
        }
    }
    tui_app.push_matches(new);
}
