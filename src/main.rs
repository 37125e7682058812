//! sweep-runner binary entry point

use anyhow::Result;

fn main() -> Result<()> {
    sweep_runner::cli::run()
}
