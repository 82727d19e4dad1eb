//! Turning a directory of xyz files into ORCA inputs and a SLURM batch script

use std::{
    fmt::Display,
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use crate::{
    files_with_ext,
    input::{self, InputError, Settings},
    memory,
    queue::slurm::{BatchJob, program_cmd},
    write_script,
};


pub const USAGE: &str = "usage: launch_orca [d-hh:mm:ss] [nM] [settings_file]";

#[derive(Debug, PartialEq, Eq)]
pub enum LaunchError {
    UnknownArg(String),
    DuplicateArg(String),
    BadMemory(String),
    NoSettingsDir,
    EmptySettingsDir(String),
    InvalidChoice(String),
    MissingNprocs,
    TooMuchMemory { requested: usize, max: usize },
    Input(InputError),
    Io(String, std::io::ErrorKind),
}

impl Display for LaunchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchError::UnknownArg(a) => {
                write!(f, "{a} not recognized\n{USAGE}")
            }
            LaunchError::DuplicateArg(a) => {
                write!(f, "{a} given more than once\n{USAGE}")
            }
            LaunchError::BadMemory(a) => {
                write!(f, "invalid memory per core {a}, expected e.g. 2000M")
            }
            LaunchError::NoSettingsDir => write!(
                f,
                "no settings file given and no settings_dir configured"
            ),
            LaunchError::EmptySettingsDir(d) => {
                write!(f, "no settings files found in {d}")
            }
            LaunchError::InvalidChoice(c) => write!(f, "invalid choice `{c}`"),
            LaunchError::MissingNprocs => {
                write!(f, "settings file must contain %pal nprocs")
            }
            LaunchError::TooMuchMemory { requested, max } => write!(
                f,
                "excessive memory ({requested}G) requested!\n\
                 lower memory below {max}G by lowering %pal nprocs or\n\
                 specifying a lower memory per core as an argument \
                 (e.g. launch_orca 2000M)"
            ),
            LaunchError::Input(e) => write!(f, "{e}"),
            LaunchError::Io(file, kind) => write!(f, "{file}: {kind}"),
        }
    }
}

impl std::error::Error for LaunchError {}

impl From<InputError> for LaunchError {
    fn from(value: InputError) -> Self {
        Self::Input(value)
    }
}

/// The free-order positional arguments to launch_orca
#[derive(Debug, Default, PartialEq)]
pub struct Positionals {
    /// anything containing a `:`
    pub time: Option<String>,
    /// an integer followed by `M`, in MB per core
    pub memory: Option<usize>,
    /// an existing file
    pub settings: Option<PathBuf>,
}

fn set_once<T>(
    slot: &mut Option<T>,
    value: T,
    arg: &str,
) -> Result<(), LaunchError> {
    if slot.is_some() {
        return Err(LaunchError::DuplicateArg(arg.to_owned()));
    }
    *slot = Some(value);
    Ok(())
}

/// sort `args` into a job time, a memory per core, and a settings file
pub fn classify<S: AsRef<str>>(args: &[S]) -> Result<Positionals, LaunchError> {
    let mut ret = Positionals::default();
    for arg in args {
        let arg = arg.as_ref();
        if arg.contains(':') {
            set_once(&mut ret.time, arg.to_owned(), arg)?;
        } else if let Some(mb) = arg.strip_suffix('M') {
            let mb = mb
                .parse()
                .map_err(|_| LaunchError::BadMemory(arg.to_owned()))?;
            set_once(&mut ret.memory, mb, arg)?;
        } else if Path::new(arg).exists() {
            set_once(&mut ret.settings, PathBuf::from(arg), arg)?;
        } else {
            return Err(LaunchError::UnknownArg(arg.to_owned()));
        }
    }
    Ok(ret)
}

/// the sorted regular files in the settings directory `dir`
pub fn settings_options(dir: &Path) -> Result<Vec<PathBuf>, LaunchError> {
    let io_err = |e: std::io::Error| {
        LaunchError::Io(dir.display().to_string(), e.kind())
    };
    let mut ret = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.file_type().map_err(io_err)?.is_file() {
            ret.push(entry.path());
        }
    }
    ret.sort();
    if ret.is_empty() {
        return Err(LaunchError::EmptySettingsDir(dir.display().to_string()));
    }
    Ok(ret)
}

/// print a numbered menu of `options` to `out` and read a 1-based choice from
/// `input`
pub fn choose_settings<R: BufRead, W: Write>(
    dir: &Path,
    options: &[PathBuf],
    input: &mut R,
    out: &mut W,
) -> Result<PathBuf, LaunchError> {
    let io_err = |e: std::io::Error| LaunchError::Io(String::from("menu"), e.kind());
    writeln!(
        out,
        "\nWelcome to the interactive ORCA input handler!\n\
         Default files can be found/edited at {}\n\
         Please use a number key to choose a setting.",
        dir.display()
    )
    .map_err(io_err)?;
    for (i, option) in options.iter().enumerate() {
        let name = option
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        writeln!(out, "{:>2} {name}", i + 1).map_err(io_err)?;
    }
    write!(out, " > ").map_err(io_err)?;
    out.flush().map_err(io_err)?;

    let mut line = String::new();
    input.read_line(&mut line).map_err(io_err)?;
    let choice = line.trim();
    match choice.parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => Ok(options[n - 1].clone()),
        _ => Err(LaunchError::InvalidChoice(choice.to_owned())),
    }
}

/// Everything decided before any file is written
#[derive(Clone, Debug)]
pub struct Launch {
    pub dir: PathBuf,
    pub job_name: String,
    pub time: String,
    pub settings: Settings,
    /// in MB. estimated from the geometries if None
    pub memory_per_core: Option<usize>,
    pub email: Option<String>,
    /// in GB
    pub max_memory: usize,
    pub module_path: String,
    pub queue_template: Option<String>,
    pub version: String,
}

/// What [Launch::run] did
#[derive(Debug, PartialEq)]
pub struct Launched {
    pub inputs: Vec<PathBuf>,
    pub script: PathBuf,
    pub ncores: usize,
    pub memory_per_core: usize,
    /// whether `memory_per_core` came from [memory::estimate]
    pub estimated: bool,
    pub total_memory: usize,
}

impl Launch {
    /// write an input file for every xyz file in `self.dir`, rename the xyz
    /// files, and write the batch script running all of the inputs in the
    /// directory. Nothing is written if any check fails
    pub fn run(&self) -> Result<Launched, LaunchError> {
        let ncores = self.settings.nprocs().ok_or(LaunchError::MissingNprocs)?;
        let planned = input::plan(&self.dir)?;

        let (memory_per_core, estimated) = match self.memory_per_core {
            Some(m) => (m, false),
            None => {
                let est = memory::estimate_max(planned.iter().map(|p| &p.geom))
                    .unwrap_or(memory::MIN_MEMORY);
                (est, true)
            }
        };
        let total_memory = memory::total_gb(memory_per_core, ncores);
        if total_memory > self.max_memory {
            return Err(LaunchError::TooMuchMemory {
                requested: total_memory,
                max: self.max_memory,
            });
        }

        let inputs = input::write_inputs(
            &self.dir,
            &planned,
            &self.settings,
            memory_per_core,
            &self.version,
        )?;

        // every input in the directory, not just the new ones
        let all_inputs = files_with_ext(&self.dir, "inp").map_err(|e| {
            LaunchError::Io(self.dir.display().to_string(), e.kind())
        })?;
        let job = BatchJob {
            name: self.job_name.clone(),
            time: self.time.clone(),
            ncores,
            total_memory,
            email: self.email.clone(),
            version: self.version.clone(),
            module_path: self.module_path.clone(),
            subjobs: all_inputs.iter().map(|p| program_cmd(p)).collect(),
        };
        let script = self.dir.join(job.filename());
        write_script(&script, &job.render(self.queue_template.as_deref()))
            .map_err(|e| LaunchError::Io(script.display().to_string(), e.kind()))?;
        log::info!("wrote {}", script.display());

        Ok(Launched {
            inputs,
            script,
            ncores,
            memory_per_core,
            estimated,
            total_memory,
        })
    }
}
