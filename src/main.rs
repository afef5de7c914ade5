use clap::Parser;
use radixmux::cli::{run_cli, Cli};
use radixmux::logging::init_logging;

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    run_cli(&cli)
}
