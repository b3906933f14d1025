use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use gridlife_core::{Automaton, LifeConfig, LifeWorld, PatternCatalog};
use gridlife_app::{
    command::CommandQueue,
    control::ControlLoop,
    renderer::{Renderer, RendererContext},
    terminal::TerminalRenderer,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "gridlife",
    version,
    about = "Interactive Conway's Game of Life in the terminal"
)]
struct Cli {
    /// Render surface width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Render surface height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Frame budget for headless runs; interactive sessions ignore it.
    #[arg(long, default_value_t = 1_000)]
    generations: u32,

    /// Edge length of one cell in pixels.
    #[arg(long, default_value_t = 10)]
    cell_size: u32,

    /// Initial tick interval in milliseconds.
    #[arg(long, default_value_t = 500)]
    frame_delay_ms: u64,

    /// Pattern catalog file; a missing or malformed file only disables
    /// pattern loading.
    #[arg(long, default_value = "patterns.json")]
    patterns: PathBuf,

    /// RNG seed for reproducible randomize commands.
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn into_config(self) -> (LifeConfig, PathBuf) {
        let config = LifeConfig {
            width: self.width,
            height: self.height,
            generations: self.generations,
            cell_size: self.cell_size,
            frame_delay_ms: self.frame_delay_ms,
            rng_seed: self.seed,
        };
        (config, self.patterns)
    }
}

fn main() -> Result<()> {
    init_tracing();
    let (config, patterns_path) = Cli::parse().into_config();

    let catalog = PatternCatalog::load_or_empty(&patterns_path);
    let mut world = LifeWorld::from_config(&config)?;
    info!(
        rows = world.grid().rows(),
        cols = world.grid().cols(),
        interval_ms = config.frame_delay_ms,
        patterns = catalog.len(),
        "starting gridlife session",
    );

    let mut commands = CommandQueue::new();
    let mut control = ControlLoop::new(config.frame_delay_ms);
    let renderer = TerminalRenderer::new(config.generations as usize);
    renderer.run(RendererContext {
        world: &mut world,
        catalog: &catalog,
        commands: &mut commands,
        control: &mut control,
    })
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
