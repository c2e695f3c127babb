//! Event polling and redraw loop for the full-screen client.
//!
//! A blocking reader task forwards crossterm events over a channel. Each key
//! press is handed to [`App::handle_key`]; when that yields an action, the
//! screen is redrawn first so the user's message and the busy label are
//! visible, then the request is awaited inline.

pub mod lifecycle;

use std::{error::Error, sync::Arc, time::Duration};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc;
use tracing::debug;

use crate::api::ApiClient;
use crate::core::app::App;
use crate::core::session::SessionManager;
use crate::ui::renderer::ui;

use lifecycle::{restore_terminal, setup_terminal, AppTerminal};

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

fn draw(terminal: &mut AppTerminal, app: &mut App) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| {
        app.fit_to_area(f.area());
        ui(f, app);
    })?;
    Ok(())
}

pub async fn run_chat(api_url: String, sessions: SessionManager) -> Result<(), Box<dyn Error>> {
    let client = ApiClient::new(&api_url)?;
    let mut app = App::new(Arc::new(client), sessions, api_url);

    let mut terminal = setup_terminal()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let reader = spawn_event_reader(event_tx);

    let result = event_loop(&mut terminal, &mut app, &mut event_rx).await;

    reader.abort();
    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut AppTerminal,
    app: &mut App,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
) -> Result<(), Box<dyn Error>> {
    if let Some(action) = app.take_startup_action() {
        app.busy = Some(action.busy_label());
        draw(terminal, app)?;
        app.execute(action).await;
    }
    draw(terminal, app)?;

    while let Some(UiEvent::Crossterm(ev)) = event_rx.recv().await {
        let action = match ev {
            Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(&key),
            Event::Paste(text) => {
                app.handle_paste(&text);
                None
            }
            Event::Resize(_, _) => None,
            _ => continue,
        };

        if app.should_quit {
            debug!("quit requested");
            break;
        }

        if let Some(action) = action {
            app.busy = Some(action.busy_label());
            draw(terminal, app)?;
            app.execute(action).await;
        }
        draw(terminal, app)?;
    }

    Ok(())
}
