use std::path::PathBuf;

use clap::Parser;
use orcakit::{config::Config, greet::greeting};

/// maybe say hello
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long, env = "ORCAKIT_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = Config::load_or_default(args.config.as_ref())?;
    let Ok(login) = std::env::var("USER") else {
        log::debug!("USER not set, staying quiet");
        return Ok(());
    };
    if let Some(msg) = greeting(&mut rand::thread_rng(), &login, &config.greet) {
        println!("{msg}");
    }
    Ok(())
}
