/// Entry point and game loop.

mod app;
mod config;
mod domain;
mod error;
mod race;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::{App, Cue};
use config::{GameConfig, GeneralConfig, Mode};
use domain::rng::Rng;
use error::SetupError;
use race::link::{Loopback, PeerLink, StdioLink};
use race::protocol::{countdown_in_ticks, Race};
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::{sfx_for, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

#[derive(Parser, Debug)]
#[command(name = "keyrace", version)]
#[command(about = "Grab the key, dodge the spiders, reach the exit before your opponent does")]
struct Cli {
    /// Path to config.toml (default: search exe dir, CWD, ~/.local/share/keyrace)
    #[arg(long)]
    config: Option<PathBuf>,
    /// solo: race against yourself; race: opponent on stdin/stdout
    #[arg(long, value_enum)]
    mode: Option<Mode>,
    /// Fixed RNG seed as `a,b`
    #[arg(long)]
    seed: Option<Seed>,
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    height: Option<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Seed(u64, u64);

impl FromStr for Seed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s.split_once(',').ok_or("expected two numbers as `a,b`")?;
        let num = |v: &str| v.trim().parse::<u64>().map_err(|e| format!("{v:?}: {e}"));
        Ok(Seed(num(a)?, num(b)?))
    }
}

impl Cli {
    /// Flags win over file values.
    fn apply(&self, config: &mut GameConfig) {
        if let Some(mode) = self.mode { config.race.mode = mode; }
        if let Some(w) = self.width { config.level.width = w; }
        if let Some(h) = self.height { config.level.height = h; }
    }
}

fn main() {
    let cli = Cli::parse();

    let (mut config, config_err) = match GameConfig::load(cli.config.as_deref()) {
        Ok(cfg) => (cfg, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };
    cli.apply(&mut config);

    if let Err(e) = init_logging(&config.general) {
        eprintln!("keyrace: {e}");
        std::process::exit(1);
    }
    if let Some(e) = config_err {
        warn!(error = %e, "config unusable, using defaults");
    }

    if let Err(e) = run(&config, cli.seed) {
        eprintln!("keyrace: {e:#}");
        std::process::exit(1);
    }
}

/// File-only logging: stdout carries the protocol and stderr the display.
fn init_logging(general: &GeneralConfig) -> Result<(), SetupError> {
    let Some(path) = &general.log_file else { return Ok(()) };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| SetupError::LogFile { path: path.clone(), source })?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&general.log_level));
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
    Ok(())
}

fn run(config: &GameConfig, seed: Option<Seed>) -> anyhow::Result<()> {
    let rng = match seed {
        Some(Seed(a, b)) => Rng::seeded(a, b),
        None => Rng::from_entropy(),
    };
    let world = WorldState::new(config.level.width, config.level.height, rng)
        .map_err(SetupError::from)?;
    let race = Race::new(countdown_in_ticks(config.race.countdown_secs, config.speed.tick_rate_ms));
    info!(
        mode = ?config.race.mode,
        width = config.level.width,
        height = config.level.height,
        seeded = seed.is_some(),
        "keyrace starting"
    );

    match config.race.mode {
        Mode::Solo => play(App::new(world, race, Loopback::new()), config),
        Mode::Race => {
            if io::stdin().is_terminal() {
                return Err(SetupError::PeerIsTerminal.into());
            }
            let poll = Duration::from_millis(config.race.reader_poll_ms);
            let link = StdioLink::spawn(io::stdin(), io::stdout(), poll).map_err(SetupError::Reader)?;
            play(App::new(world, race, link), config)
        }
    }
}

fn play<L: PeerLink>(mut app: App<L>, config: &GameConfig) -> anyhow::Result<()> {
    let mut renderer = Renderer::new(config.speed.tick_rate_ms);
    renderer.init().map_err(SetupError::Terminal)?;

    let sound = SoundEngine::new();

    let result = game_loop(&mut app, &mut renderer, sound.as_ref(), config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    let s = app.world().session();
    eprintln!();
    eprintln!("Final Score: {}  Levels: {}  Spiders: {}", s.score(), s.levels_cleared(), s.enemies_defeated());
    result
}

fn game_loop<L: PeerLink>(
    app: &mut App<L>,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> anyhow::Result<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    loop {
        // Link first: a message sent last frame is read before new input can overwrite it
        let mut cues = app.pump_link();

        let mut inputs = kb.drain_events().to_vec();
        inputs.extend(gp.update());
        for ev in inputs {
            cues.extend(app.handle_input(ev));
        }
        if app.should_quit() {
            info!("quit requested");
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            cues.extend(app.tick());
            last_tick = Instant::now();
        }

        play_cues(sound, &cues);
        renderer.render(app.world(), app.race()).context("rendering frame")?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn play_cues(sound: Option<&SoundEngine>, cues: &[Cue]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for cue in cues {
        if let Some(effect) = sfx_for(*cue) {
            sfx.play(effect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_flag() {
        assert_eq!("1,1".parse::<Seed>(), Ok(Seed(1, 1)));
        assert_eq!(" 7 , 42".parse::<Seed>(), Ok(Seed(7, 42)));
        assert!("7".parse::<Seed>().is_err());
        assert!("a,b".parse::<Seed>().is_err());
    }

    #[test]
    fn flags_override_file() {
        let cli = Cli::parse_from(["keyrace", "--mode", "race", "--width", "20", "--seed", "3,4"]);
        let mut cfg = GameConfig::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg.race.mode, Mode::Race);
        assert_eq!(cfg.level.width, 20);
        assert_eq!(cfg.level.height, 16);
        assert_eq!(cli.seed, Some(Seed(3, 4)));
    }
}
