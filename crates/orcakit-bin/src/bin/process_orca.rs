use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use orcakit::{
    VERSION,
    config::Config,
    job_name,
    queue::pltvib::{NegFreqScript, SCRIPT_NAME},
    summary::{Summary, available_path},
    write_script,
};

/// summarize the ORCA output files in a directory as a CSV table, and write a
/// script animating any negative frequencies
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The job directory containing the output files. Defaults to the current
    /// directory.
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Overwrite an existing summary instead of picking a new numbered name.
    /// Defaults to false.
    #[arg(short, long, default_value_t = false)]
    overwrite: bool,

    /// Also print the summary rows to stdout as JSON. Defaults to false.
    #[arg(short, long, default_value_t = false)]
    json: bool,

    /// TOML configuration file.
    #[arg(short, long, env = "ORCAKIT_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = Config::load_or_default(args.config.as_ref())?;
    let job = job_name(&args.dir).with_context(|| {
        format!("failed to resolve job directory {}", args.dir.display())
    })?;

    let summary = Summary::collect(&args.dir).with_context(|| {
        format!("failed to read output files in {}", args.dir.display())
    })?;
    for s in &summary.skipped {
        if s.reason.is_multiple_jobs() {
            println!(
                "{} contains multiple jobs and was skipped",
                s.file.display()
            );
        } else {
            println!("{} was skipped: {}", s.file.display(), s.reason);
        }
    }

    let stem = format!("{job}_summary");
    let path = if args.overwrite {
        args.dir.join(format!("{stem}.csv"))
    } else {
        available_path(&args.dir, &stem, "csv")
    };
    let f = File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    summary.write_csv(&mut w, &job, VERSION)?;
    w.flush()?;
    println!("Summary file {} created.", path.display());

    if !summary.neg_freqs.is_empty() {
        let script = NegFreqScript {
            entries: &summary.neg_freqs,
            job_name: &job,
            version: VERSION,
            module_path: &config.module_path,
        };
        let script_path = args.dir.join(SCRIPT_NAME);
        write_script(&script_path, &script.render()).with_context(|| {
            format!("failed to write {}", script_path.display())
        })?;
        println!(
            "{} negative frequencies found. Run {} to visualize them{}.",
            summary.neg_freqs.len(),
            script_path.display(),
            if script.needs_slurm() {
                " with sbatch"
            } else {
                ""
            }
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary.rows)?);
    }

    Ok(())
}
