use super::App;
use crate::event_handler::EventHandler;

use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::Result;
use std::time::Instant;
use std::{panic, time::Duration};
use tokio::sync::broadcast::error::RecvError;

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Run the shell until the user quits
///
/// Terminal input, controller results, panel signals and the scroll
/// throttle's trailing deadline are multiplexed on the current task, so all
/// view state is mutated from one place.
pub async fn run(app: &mut App) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let backend = CrosstermBackend::new(std::io::stdout());
        if let Ok(mut terminal) = Terminal::new(backend) {
            let _ = terminal.show_cursor();
        }
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    terminal.clear()?;
    app.draw(&mut terminal)?;

    while !app.should_exit() {
        let tui_poll = async {
            tokio::time::sleep(INPUT_POLL_INTERVAL).await;
            EventHandler::read()
        };
        let deadline = app.controller.scroll().next_deadline();
        let trailing_measure = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            maybe_event = tui_poll => {
                if let Some(event) = maybe_event {
                    app.handle_terminal_event(event);
                    app.draw(&mut terminal)?;
                }
            }
            Some(event) = app.controller_rx.recv() => {
                app.handle_controller_event(event);
                app.draw(&mut terminal)?;
            }
            signal = app.signals_rx.recv() => match signal {
                Ok(signal) => {
                    app.handle_signal(signal);
                    app.draw(&mut terminal)?;
                }
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "signals skipped"),
                Err(RecvError::Closed) => {}
            },
            _ = trailing_measure => {
                app.tick(Instant::now());
                app.draw(&mut terminal)?;
            }
        }
    }

    app.controller.deactivate();

    terminal.show_cursor()?;
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;

    Ok(())
}
