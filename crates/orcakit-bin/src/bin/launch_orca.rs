use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use orcakit::{
    VERSION,
    config::Config,
    input::Settings,
    job_name,
    launch::{Launch, LaunchError, choose_settings, classify, settings_options},
};

/// write ORCA input files for every charge_spin-tagged xyz file in a
/// directory, plus a SLURM script running them all
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Up to three arguments in any order: a job time containing `:` (e.g.
    /// 2-00:00:00), a memory per core in MB followed by M (e.g. 2000M), and
    /// the path to an ORCA settings file. Without a settings file, one is
    /// chosen from the configured settings_dir.
    #[arg(value_parser, num_args = 0..=3)]
    args: Vec<String>,

    /// Address for SLURM's job notifications, overriding the config file.
    #[arg(short, long, env = "ORCAKIT_EMAIL")]
    email: Option<String>,

    /// TOML configuration file.
    #[arg(short, long, env = "ORCAKIT_CONFIG")]
    config: Option<PathBuf>,

    /// The job directory containing the xyz files. Defaults to the current
    /// directory.
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = Config::load_or_default(args.config.as_ref())?;
    let pos = classify(&args.args)?;

    let settings_file = match pos.settings {
        Some(f) => f,
        None => {
            let dir = config
                .settings_dir
                .as_ref()
                .ok_or(LaunchError::NoSettingsDir)?;
            let options = settings_options(dir)?;
            let stdin = std::io::stdin();
            choose_settings(
                dir,
                &options,
                &mut stdin.lock(),
                &mut std::io::stdout(),
            )?
        }
    };
    let settings = Settings::load(&settings_file)?;
    println!("{}", settings.title());

    let time = match pos.time {
        Some(t) => t,
        None => {
            println!(
                "No job time provided. Setting job time to {}",
                config.default_time
            );
            config.default_time.clone()
        }
    };

    let job_name = job_name(&args.dir).with_context(|| {
        format!("failed to resolve job directory {}", args.dir.display())
    })?;
    let launch = Launch {
        dir: args.dir,
        job_name,
        time,
        settings,
        memory_per_core: pos.memory,
        email: args.email.or(config.email),
        max_memory: config.max_memory,
        module_path: config.module_path,
        queue_template: config.queue_template,
        version: VERSION.to_owned(),
    };

    let launched = launch.run()?;
    if launched.estimated {
        println!(
            "Memory per core estimated to be {}MB",
            launched.memory_per_core
        );
    }
    println!(
        "{} input files written, requesting {} cores and {}G total",
        launched.inputs.len(),
        launched.ncores,
        launched.total_memory
    );
    println!("Batch script {} created.", launched.script.display());

    Ok(())
}
