use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context};
use clap::Parser;
use engine::{prelude::*, AssetTable, ORBITAL_BOLT_ASSET};
use tracing_subscriber::EnvFilter;
use world::{Data, RoomsAndCorridors, Settings};

mod autopilot;
use autopilot::Autopilot;

mod map_view;

pub const GAME_NAME: &str = "delve";

/// Simulated seconds per frame.
const FRAME: f32 = 1.0 / 30.0;

/// Give up if a single turn takes this many frames.
const MAX_FRAMES_PER_TURN: usize = 10_000;

#[derive(Parser, Debug)]
#[command(name = GAME_NAME, about = "Headless dungeon run with a scripted player")]
struct Args {
    #[arg(long, help = "Game world seed")]
    seed: Option<u64>,

    #[arg(long, help = "IDM file with settings, bestiary and spellbook")]
    data: Option<PathBuf>,

    #[arg(long, help = "IDM settings file, overrides settings from --data")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 200, help = "Stop after this many turns")]
    turns: u64,

    #[arg(short, long, help = "Show debug logging")]
    verbose: bool,

    #[arg(long, help = "Print the map after every turn")]
    watch: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("seed: {seed}");

    let mut data = match &args.data {
        Some(path) => Data::load(path)?,
        None => Data::default(),
    };
    if let Some(path) = &args.config {
        data.settings = Settings::load(path)?;
    }

    let levels = RoomsAndCorridors::new(
        seed,
        data.settings.map_width,
        data.settings.map_height,
    );
    let assets = AssetTable::new(["bolt", "orbital", "fireball", ORBITAL_BOLT_ASSET]);
    let mut r = Runtime::new(Arc::new(data), levels, assets, seed)
        .context("starting session")?;

    let mut pilot = Autopilot::default();
    let mut frames = 0;
    let mut turn = r.turn();

    while r.turn() < args.turns && r.phase() != TurnPhase::GameOver {
        let input = pilot.decide(&r);
        r.tick(FRAME, input);

        for msg in r.drain_msgs() {
            if let Msg::Message(text) = msg {
                println!("{text}");
            }
        }

        if r.turn() != turn {
            turn = r.turn();
            frames = 0;
            if args.watch {
                println!("{}", map_view::draw_map(&r));
            }
        }

        frames += 1;
        if frames > MAX_FRAMES_PER_TURN {
            bail!("turn {} stalled in phase {:?}", r.turn(), r.phase());
        }
    }

    println!("{}", map_view::draw_map(&r));
    println!("{}", map_view::status_line(&r));
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "info" })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
