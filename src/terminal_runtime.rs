use std::io;
use std::panic;
use std::sync::Once;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::debug;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};

use crate::renderer;
use crate::session::Snapshot;

static PANIC_HOOK: Once = Once::new();

/// Raw-mode alternate screen that the game draws into.
///
/// Dropping it (or panicking while it is live) puts the terminal back.
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(error) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(error);
        }

        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => {
                debug!("entered alternate screen");
                Ok(Self { terminal })
            }
            Err(error) => {
                let _ = restore_terminal();
                Err(error)
            }
        }
    }

    /// Draws one frame of the board and sidebar.
    pub fn draw(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        draw_snapshot(&mut self.terminal, snapshot)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

/// Renders `snapshot` on any ratatui backend.
pub fn draw_snapshot<B: Backend>(
    terminal: &mut Terminal<B>,
    snapshot: &Snapshot<'_>,
) -> io::Result<()> {
    terminal.draw(|frame| renderer::render(frame, snapshot))?;
    Ok(())
}

// Installed at most once so re-entering does not stack hooks.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = restore_terminal();
            default_hook(panic_info);
        }));
    });
}

fn restore_terminal() -> io::Result<()> {
    let _ = disable_raw_mode();
    execute!(io::stdout(), Show, LeaveAlternateScreen)
}
