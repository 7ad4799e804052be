//! Full-screen terminal view of a running agent
//!
//! Drawing happens synchronously from the episode loop. Key presses are
//! drained without blocking before every step, and each frame is paced to the
//! configured frame rate.
//!
//! # Controls
//!
//! - `+` / Up: double the frame rate
//! - `-` / Down: halve the frame rate
//! - `q` / Esc / Ctrl+C: stop the run

use std::io::{Stderr, stderr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use super::{BoardView, Flow, Renderer};
use crate::error::{Error, Result};
use crate::game::{GameConfig, Observation};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;

const MIN_FPS: u32 = 1;
const MAX_FPS: u32 = 960;

pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<Stderr>>,
    view: BoardView,
    metrics: GameMetrics,
    input: InputHandler,
    cancel: Arc<AtomicBool>,
    fps: u32,
    last_frame: Instant,
}

impl TerminalRenderer {
    /// Take over the terminal (raw mode, alternate screen)
    ///
    /// The terminal is restored when the renderer is dropped. Quitting from
    /// the keyboard also sets `cancel` so the caller stops starting episodes.
    pub fn new(config: GameConfig, fps: u32, cancel: Arc<AtomicBool>) -> Result<Self> {
        enable_raw_mode().map_err(Error::Terminal)?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).map_err(Error::Terminal)?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).map_err(Error::Terminal)?;
        terminal.hide_cursor().map_err(Error::Terminal)?;
        terminal.clear().map_err(Error::Terminal)?;

        Ok(Self {
            terminal,
            view: BoardView::new(config),
            metrics: GameMetrics::new(),
            input: InputHandler::new(),
            cancel,
            fps: fps.clamp(MIN_FPS, MAX_FPS),
            last_frame: Instant::now(),
        })
    }

    /// Drain pending key presses without blocking
    fn handle_events(&mut self) -> Result<Flow> {
        while event::poll(Duration::ZERO).map_err(Error::Terminal)? {
            let Event::Key(key) = event::read().map_err(Error::Terminal)? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match self.input.handle_key_event(key) {
                KeyAction::Quit => {
                    self.cancel.store(true, Ordering::Relaxed);
                    return Ok(Flow::Abort);
                }
                KeyAction::SpeedUp => self.fps = (self.fps * 2).min(MAX_FPS),
                KeyAction::SlowDown => self.fps = (self.fps / 2).max(MIN_FPS),
                KeyAction::None => {}
            }
        }

        if self.cancel.load(Ordering::Relaxed) {
            Ok(Flow::Abort)
        } else {
            Ok(Flow::Continue)
        }
    }

    /// Sleep out the remainder of the current frame
    fn pace(&mut self) {
        let frame = Duration::from_secs(1) / self.fps;
        let elapsed = self.last_frame.elapsed();
        if elapsed < frame {
            thread::sleep(frame - elapsed);
        }
        self.last_frame = Instant::now();
    }
}

impl Renderer for TerminalRenderer {
    fn begin_episode(&mut self, episode: usize) -> Result<()> {
        self.metrics.on_episode_start(episode);
        Ok(())
    }

    fn poll(&mut self) -> Result<Flow> {
        self.handle_events()
    }

    fn render(&mut self, observation: &Observation) -> Result<Flow> {
        self.metrics.update();
        self.metrics.observe_score(observation.score());

        let Self {
            terminal,
            view,
            metrics,
            fps,
            ..
        } = self;
        terminal
            .draw(|frame| view.render(frame, observation, metrics, *fps))
            .map_err(Error::Terminal)?;

        self.pace();
        self.handle_events()
    }

    fn end_episode(&mut self, score: u32) {
        self.metrics.on_episode_end(score);
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        // Best effort: nothing useful can be done if restoring fails
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}
