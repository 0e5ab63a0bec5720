use std::{path::PathBuf, time::Duration};

use blockfall_engine::{
    Engine, GameStats, GameView, Intent, Phase, PieceSeed, RenderSink, TickHandle, TickScheduler,
    VirtualTimer,
};
use chrono::{DateTime, Utc};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{config::GameArgs, logging, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    game: GameArgs,
    /// Stop after this many ticks even if the game is still running
    #[clap(long, default_value_t = 10_000)]
    max_ticks: usize,
    /// Output file path (defaults to stdout)
    #[clap(long)]
    output: Option<PathBuf>,
}

/// Outcome of a headless session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Timestamp when the report was generated (ISO 8601 format)
    pub generated_at: DateTime<Utc>,
    /// Seed of the piece sequence and of the simulated input
    pub seed: PieceSeed,
    /// Ticks processed, including the final one
    pub ticks: usize,
    /// Player intents issued between ticks
    pub intents: usize,
    /// Virtual time elapsed
    #[serde(with = "millis")]
    pub elapsed: Duration,
    pub final_phase: Phase,
    pub final_stats: GameStats,
    pub final_view: GameView,
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize as _, Deserializer, Serializer};

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Host with a virtual clock that keeps only the latest view.
#[derive(Debug, Default)]
struct HeadlessHost {
    timer: VirtualTimer,
    view: Option<GameView>,
}

impl TickScheduler for HeadlessHost {
    fn schedule_once(&mut self, delay: Duration) -> TickHandle {
        self.timer.schedule_once(delay)
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.timer.cancel(handle);
    }
}

impl RenderSink for HeadlessHost {
    fn render(&mut self, view: &GameView) {
        self.view = Some(view.clone());
    }
}

/// Intents the simulated player picks from, plus one slot for doing nothing.
const PLAYER_INTENTS: [Intent; 5] = [
    Intent::MoveLeft,
    Intent::MoveRight,
    Intent::RotateCw,
    Intent::SoftDrop,
    Intent::HardDrop,
];

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        game,
        max_ticks,
        output,
    } = arg;

    logging::init_stderr()?;
    let engine = game.resolve()?.build_engine()?;
    let report = simulate(engine, *max_ticks);
    info!(
        ticks = report.ticks,
        score = report.final_stats.score(),
        phase = ?report.final_phase,
        "simulation finished"
    );

    util::save_json(&report, output.as_deref())
}

/// Plays `engine` from a fresh start with random input until the game ends
/// or `max_ticks` ticks have run.
///
/// The input stream is derived from the piece seed, so a seed fully
/// determines the report apart from its timestamp.
fn simulate(mut engine: Engine, max_ticks: usize) -> SimulationReport {
    let seed = engine.seed();
    let mut rng = Pcg32::from_seed(seed.to_bytes());
    let mut host = HeadlessHost::default();
    let mut ticks = 0;
    let mut intents = 0;

    engine.start(&mut host);
    while ticks < max_ticks {
        let Some(handle) = host.timer.advance() else {
            break;
        };
        if let Some(&intent) = PLAYER_INTENTS.get(rng.random_range(0..=PLAYER_INTENTS.len())) {
            engine.apply_intent(&mut host, intent);
            intents += 1;
        }
        engine.tick(&mut host, handle);
        ticks += 1;
    }

    SimulationReport {
        generated_at: Utc::now(),
        seed,
        ticks,
        intents,
        elapsed: host.timer.now(),
        final_phase: engine.phase(),
        final_stats: engine.stats().clone(),
        final_view: host.view.unwrap_or_else(|| engine.view()),
    }
}
