//! Main TUI application loop.
//!
//! Everything runs on one thread: sampling, key handling, and drawing are
//! interleaved by using `event::poll` with the time remaining until the
//! next sample tick as the timeout. A Ctrl-C handler only flips the shared
//! stop flag, which the loop consumes at the top of each pass.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::warn;

use crate::collector::FileSystem;
use crate::csv::CsvSink;
use crate::device::Device;

use super::input::{KeyAction, handle_key};
use super::layout::LayoutManager;
use super::render::render;
use super::state::{SessionState, Units, ViewMode};

/// Runtime options carried from the command line.
pub struct AppOptions {
    pub interval: Duration,
    pub units: Units,
    /// Exit after this much wall time.
    pub duration: Option<Duration>,
    /// Per-tick rate log, single-device mode only.
    pub csv: Option<CsvSink>,
}

/// Advances a tick deadline by whole intervals until it is in the future,
/// so a stalled loop resynchronizes instead of firing a burst of ticks.
fn next_deadline(mut deadline: Instant, interval: Duration, now: Instant) -> Instant {
    while deadline <= now {
        deadline += interval;
    }
    deadline
}

/// Decides whether this loop pass samples, and where the deadline moves.
///
/// A fast view switch never samples, even with the deadline overdue, and
/// pushes the next sample a full interval out, matching the cadence of a
/// skipped tick.
fn schedule(tick_at: Instant, interval: Duration, now: Instant, fast: bool) -> (bool, Instant) {
    if fast {
        (false, now + interval)
    } else if now >= tick_at {
        (true, next_deadline(tick_at, interval, now))
    } else {
        (false, tick_at)
    }
}

/// Main TUI application.
pub struct App<F: FileSystem> {
    fs: F,
    devices: Vec<Device>,
    state: SessionState,
    interval: Duration,
    duration: Option<Duration>,
    csv: Option<CsvSink>,
    stop: Arc<AtomicBool>,
    layout: LayoutManager,
    should_quit: bool,
    fast_switch: bool,
}

impl<F: FileSystem> App<F> {
    pub fn new(fs: F, devices: Vec<Device>, stop: Arc<AtomicBool>, opts: AppOptions) -> Self {
        Self {
            fs,
            devices,
            state: SessionState::new(opts.units),
            interval: opts.interval,
            duration: opts.duration,
            csv: opts.csv,
            stop,
            layout: LayoutManager::new(),
            should_quit: false,
            fast_switch: false,
        }
    }

    /// Runs the application, restoring the terminal before returning.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        let started = Instant::now();
        let mut tick_at = started + self.interval;

        loop {
            if self.should_quit || self.stop.load(Ordering::Relaxed) {
                break;
            }
            if let Some(d) = self.duration
                && started.elapsed() >= d
            {
                break;
            }

            let fast = std::mem::take(&mut self.fast_switch);
            let now = Instant::now();
            let (sample, next_at) = schedule(tick_at, self.interval, now, fast);
            tick_at = next_at;
            if sample {
                if !self.state.paused {
                    self.tick();
                }
                self.refresh_view_data();
            } else if fast {
                // A view just changed: refresh its backing data without
                // disturbing the sampling cadence.
                self.refresh_view_data();
            }

            self.draw(terminal, !fast)?;

            if fast {
                continue;
            }
            self.wait_for_input(tick_at)?;
        }
        Ok(())
    }

    /// Samples every device and logs the single-device sample to CSV.
    fn tick(&mut self) {
        let single = self.devices.len() == 1;
        for dev in &mut self.devices {
            let sample = dev.tick(&self.fs);
            if single
                && let Some(csv) = &mut self.csv
                && let Err(e) = csv.write(&sample)
            {
                warn!("csv write failed, disabling sink: {}", e);
                self.csv = None;
            }
        }
    }

    /// Refreshes the data behind the active view (raw extras or GID table).
    /// The Plot view draws from histories the tick already filled.
    fn refresh_view_data(&mut self) {
        match self.state.view {
            ViewMode::Plot => {}
            ViewMode::Data => {
                for dev in &mut self.devices {
                    dev.refresh_extras(&self.fs);
                }
            }
            ViewMode::Info => {
                for dev in &mut self.devices {
                    dev.refresh_gids(&self.fs);
                }
            }
        }
    }

    fn draw(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        filler: bool,
    ) -> io::Result<()> {
        let layout = &mut self.layout;
        let devices = &self.devices;
        let state = &self.state;
        let interval_secs = self.interval.as_secs_f64();
        terminal.draw(|f| {
            let geometry = layout.update(f.area(), devices.len(), state.view);
            render(f, geometry, devices, state, interval_secs, filler);
        })?;
        Ok(())
    }

    /// Sleeps until the next tick deadline, waking early for input. Any
    /// key or resize ends the wait so the next frame reflects it.
    fn wait_for_input(&mut self, tick_at: Instant) -> io::Result<()> {
        loop {
            if self.should_quit || self.stop.load(Ordering::Relaxed) {
                return Ok(());
            }
            let timeout = tick_at.saturating_duration_since(Instant::now());
            if timeout.is_zero() {
                return Ok(());
            }
            if !event::poll(timeout)? {
                return Ok(());
            }
            match event::read()? {
                Event::Key(key) => {
                    match handle_key(&mut self.state, key) {
                        KeyAction::Quit => self.should_quit = true,
                        KeyAction::FastSwitch => self.fast_switch = true,
                        KeyAction::None => {}
                    }
                    return Ok(());
                }
                Event::Resize(_, _) => return Ok(()),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_catches_up_after_stall() {
        let interval = Duration::from_secs(1);
        let t0 = Instant::now();
        // 3.5 intervals late: the next deadline lands at t0 + 4s.
        let next = next_deadline(t0, interval, t0 + Duration::from_millis(3500));
        assert_eq!(next, t0 + Duration::from_secs(4));
    }

    #[test]
    fn fast_switch_defers_an_overdue_tick() {
        let interval = Duration::from_secs(1);
        let t0 = Instant::now();
        let now = t0 + Duration::from_secs(3);
        // Deadline long past, but the switch frame must not sample and
        // the next sample waits a full interval.
        let (sample, next) = schedule(t0, interval, now, true);
        assert!(!sample);
        assert_eq!(next, now + interval);
    }

    #[test]
    fn due_tick_samples_and_advances() {
        let interval = Duration::from_secs(1);
        let t0 = Instant::now();
        let (sample, next) = schedule(t0, interval, t0 + Duration::from_millis(10), false);
        assert!(sample);
        assert_eq!(next, t0 + interval);
    }

    #[test]
    fn early_pass_leaves_deadline_alone() {
        let interval = Duration::from_secs(1);
        let t0 = Instant::now();
        let (sample, next) = schedule(t0 + interval, interval, t0, false);
        assert!(!sample);
        assert_eq!(next, t0 + interval);
    }

    #[test]
    fn future_deadline_is_untouched() {
        let interval = Duration::from_secs(1);
        let t0 = Instant::now();
        let next = next_deadline(t0 + Duration::from_secs(2), interval, t0);
        assert_eq!(next, t0 + Duration::from_secs(2));
    }
}
