mod app;
mod tui;
mod widgets;

use clap::Parser;

use crate::{app::PlayApp, tui::Tui};

/// Falling-block puzzle game for the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Seed for the piece sequence; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Hide the landing-position ghost
    #[arg(long)]
    hide_ghost: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut app = PlayApp::new(args.seed, !args.hide_ghost);
    Tui::new().run(&mut app)
}
