use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the app loop
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Production event source backed by crossterm
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(GameEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(GameEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source fed from a plain channel
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Advances the application one event at a time, emitting `Tick` whenever
/// the tick interval elapses without input. The countdown itself measures
/// real elapsed time; the interval only bounds tick granularity.
pub struct Runner<E: EventSource> {
    event_source: E,
    tick_interval: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E, tick_interval: Duration) -> Self {
        Self {
            event_source,
            tick_interval,
        }
    }

    /// Blocks up to the tick interval and returns the next event, or Tick
    /// on timeout
    pub fn step(&self) -> GameEvent {
        match self.event_source.recv_timeout(self.tick_interval) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => GameEvent::Tick,
        }
    }
}
