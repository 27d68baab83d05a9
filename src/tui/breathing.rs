// breathing exercise panel
// the state is plain data; the ticker owns the timers that drive it

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const PHASE_PERIOD: Duration = Duration::from_secs(4);
pub const MESSAGE_PERIOD: Duration = Duration::from_secs(8);

pub const MOTIVATION: &[&str] = &[
    "You're doing great!",
    "Breathe in peace, breathe out stress",
    "You are worthy of calm",
    "Take your time, you're safe here",
    "One breath at a time",
    "You've got this",
    "Healing takes time, be patient",
    "You are stronger than you know",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Inhale,
    Exhale,
}

impl Phase {
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Inhale => "Breathe in...",
            Self::Exhale => "Breathe out...",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Phase,
    Message,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breathing {
    pub phase: Phase,
    pub message_index: usize,
}

impl Default for Breathing {
    fn default() -> Self {
        Self::new()
    }
}

impl Breathing {
    pub fn new() -> Self {
        Self {
            phase: Phase::Inhale,
            message_index: 0,
        }
    }

    pub fn apply(&mut self, tick: Tick) {
        match tick {
            Tick::Phase => {
                self.phase = match self.phase {
                    Phase::Inhale => Phase::Exhale,
                    Phase::Exhale => Phase::Inhale,
                };
            }
            Tick::Message => {
                self.message_index = (self.message_index + 1) % MOTIVATION.len();
            }
        }
    }

    pub fn message(&self) -> &'static str {
        MOTIVATION[self.message_index]
    }
}

/// Repeating timers feeding ticks into a channel. Dropping the ticker aborts
/// both timers.
pub struct Ticker {
    tasks: Vec<JoinHandle<()>>,
    rx: mpsc::UnboundedReceiver<Tick>,
}

impl Ticker {
    pub fn start() -> Self {
        Self::with_periods(PHASE_PERIOD, MESSAGE_PERIOD)
    }

    pub fn with_periods(phase: Duration, message: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tasks = vec![
            spawn_timer(phase, Tick::Phase, tx.clone()),
            spawn_timer(message, Tick::Message, tx),
        ];
        Self { tasks, rx }
    }

    /// Ticks that fired since the last call, without waiting.
    pub fn drain(&mut self) -> Vec<Tick> {
        let mut ticks = Vec::new();
        while let Ok(tick) = self.rx.try_recv() {
            ticks.push(tick);
        }
        ticks
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn spawn_timer(period: Duration, tick: Tick, tx: mpsc::UnboundedSender<Tick>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            interval.tick().await;
            if tx.send(tick).is_err() {
                break;
            }
        }
    })
}

/// The panel as the view sees it: state plus the timers driving it.
pub struct Exercise {
    pub state: Breathing,
    ticker: Ticker,
}

impl Exercise {
    pub fn start() -> Self {
        Self {
            state: Breathing::new(),
            ticker: Ticker::start(),
        }
    }

    // apply whatever fired since the last frame
    pub fn update(&mut self) {
        for tick in self.ticker.drain() {
            self.state.apply(tick);
        }
    }
}
