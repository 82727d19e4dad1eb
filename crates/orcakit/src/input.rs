use std::{
    fmt::Display,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::geom::{GeomError, Xyz};


/// suffix appended to the stem of an xyz file once an input file refers to it
pub const IN_SUFFIX: &str = "_in";

pub(crate) static NPROCS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*%pal\s+nprocs\s+(\d+)").unwrap()
});

#[derive(Debug, PartialEq, Eq)]
pub enum InputError {
    BadName { file: String, reason: String },
    MissingNprocs(String),
    NoXyz(String),
    ReadFileError(String, std::io::ErrorKind),
    WriteFileError(String, std::io::ErrorKind),
    Geom(String, GeomError),
}

impl Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::BadName { file, reason } => write!(
                f,
                "{file}: {reason}. xyz files should be named \
                 {{molecule}}_{{charge}}_{{spin}}.xyz"
            ),
            InputError::MissingNprocs(file) => {
                write!(f, "settings file {file} must contain %pal nprocs")
            }
            InputError::NoXyz(dir) => write!(f, "there are no xyz files in {dir}"),
            InputError::ReadFileError(file, kind) => {
                write!(f, "failed to read {file}: {kind}")
            }
            InputError::WriteFileError(file, kind) => {
                write!(f, "failed to write {file}: {kind}")
            }
            InputError::Geom(file, e) => write!(f, "{file}: {e}"),
        }
    }
}

impl std::error::Error for InputError {}

fn bad_name(file: &str, reason: impl Into<String>) -> InputError {
    InputError::BadName {
        file: file.to_owned(),
        reason: reason.into(),
    }
}

/// One ORCA calculation, derived from the name of its xyz file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subjob {
    /// the file stem, without any `_in` suffix. also the name of the input
    /// and output files
    pub name: String,
    pub charge: isize,
    pub spin: usize,

    /// whether the xyz file already carries the `_in` suffix from a previous
    /// run
    pub renamed: bool,
}

/// parse the charge field of a file name. `m` marks negative charges and `p`
/// positive ones, but a bare number is also positive
fn parse_charge(file: &str, s: &str) -> Result<isize, InputError> {
    let err = || bad_name(file, format!("invalid charge `{s}`"));
    let (sign, digits) = match s.strip_prefix('m') {
        Some(d) => (-1, d),
        None => (1, s.strip_prefix('p').unwrap_or(s)),
    };
    if digits != s && digits.starts_with(['-', '+']) {
        return Err(err());
    }
    digits.parse::<isize>().map(|c| sign * c).map_err(|_| err())
}

impl Subjob {
    /// parse a file name of the form `{molecule}_{charge}_{spin}.xyz`, or the
    /// same with `_in` appended to the stem
    pub fn from_filename(file: &str) -> Result<Self, InputError> {
        let Some(stem) = file.strip_suffix(".xyz") else {
            return Err(bad_name(file, "not an xyz file"));
        };
        let (stem, renamed) = match stem.strip_suffix(IN_SUFFIX) {
            Some(s) => (s, true),
            None => (stem, false),
        };
        let mut parts = stem.rsplitn(3, '_');
        let (Some(spin), Some(charge), Some(molecule)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(bad_name(file, "missing charge or spin"));
        };
        if molecule.is_empty() {
            return Err(bad_name(file, "empty molecule name"));
        }
        let charge = parse_charge(file, charge)?;
        let spin = spin
            .parse()
            .map_err(|_| bad_name(file, format!("invalid spin `{spin}`")))?;
        if spin == 0 {
            return Err(bad_name(file, "spin multiplicity must be at least 1"));
        }
        Ok(Self {
            name: stem.to_owned(),
            charge,
            spin,
            renamed,
        })
    }

    /// the name of the xyz file on disk before [write_inputs] runs
    pub fn xyz_file(&self) -> String {
        if self.renamed {
            self.renamed_xyz()
        } else {
            format!("{}.xyz", self.name)
        }
    }

    /// the name of the xyz file referenced by the input file
    pub fn renamed_xyz(&self) -> String {
        format!("{}{IN_SUFFIX}.xyz", self.name)
    }

    pub fn infile(&self) -> String {
        format!("{}.inp", self.name)
    }
}

/// The ORCA keywords shared by every input file in a job: simple input lines,
/// `%pal`, `%scf` blocks and so on
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    body: String,
}

impl From<&str> for Settings {
    fn from(s: &str) -> Self {
        let mut body = s.to_owned();
        if !body.ends_with('\n') {
            body.push('\n');
        }
        Self { body }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        std::fs::read_to_string(path)
            .map(|s| Self::from(s.as_str()))
            .map_err(|e| {
                InputError::ReadFileError(path.display().to_string(), e.kind())
            })
    }

    /// the first line of the file, conventionally a comment describing the
    /// settings
    pub fn title(&self) -> &str {
        self.body.lines().next().unwrap_or("")
    }

    /// the number of processes requested by `%pal nprocs`
    pub fn nprocs(&self) -> Option<usize> {
        NPROCS
            .captures(&self.body)
            .and_then(|c| c[1].parse().ok())
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// the full contents of the input file for `subjob`
    pub fn render(&self, subjob: &Subjob, maxcore: usize, version: &str) -> String {
        format!(
            "{body}%maxcore {maxcore}\n\
             * xyzfile {charge} {spin} {xyz}\n\
             \n\
             # This input file was created with launch_orca version {version}\n",
            body = self.body,
            charge = subjob.charge,
            spin = subjob.spin,
            xyz = subjob.renamed_xyz(),
        )
    }
}

/// A subjob together with its loaded geometry
#[derive(Clone, Debug, PartialEq)]
pub struct Planned {
    pub subjob: Subjob,
    pub geom: Xyz,
}

/// collect the subjobs for every xyz file in `dir`. every file name is
/// validated before anything is returned, so a single bad name leaves the
/// directory untouched
pub fn plan(dir: impl AsRef<Path>) -> Result<Vec<Planned>, InputError> {
    let dir = dir.as_ref();
    let read_err =
        |e: std::io::Error| InputError::ReadFileError(dir.display().to_string(), e.kind());
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".xyz") {
            entries.push(name);
        } else {
            log::debug!("skipping {name} because it is not an xyz file");
        }
    }
    entries.sort();
    if entries.is_empty() {
        return Err(InputError::NoXyz(dir.display().to_string()));
    }
    let mut ret = Vec::with_capacity(entries.len());
    for name in entries {
        let subjob = Subjob::from_filename(&name)?;
        let geom = Xyz::load(dir.join(&name))
            .map_err(|e| InputError::Geom(name.clone(), e))?;
        ret.push(Planned { subjob, geom });
    }
    Ok(ret)
}

/// write an input file for each of `planned` into `dir` and rename the
/// corresponding xyz files. returns the paths of the new input files
pub fn write_inputs(
    dir: impl AsRef<Path>,
    planned: &[Planned],
    settings: &Settings,
    maxcore: usize,
    version: &str,
) -> Result<Vec<PathBuf>, InputError> {
    let dir = dir.as_ref();
    let mut ret = Vec::with_capacity(planned.len());
    for Planned { subjob, .. } in planned {
        let infile = dir.join(subjob.infile());
        std::fs::write(&infile, settings.render(subjob, maxcore, version))
            .map_err(|e| {
                InputError::WriteFileError(infile.display().to_string(), e.kind())
            })?;
        if !subjob.renamed {
            let to = dir.join(subjob.renamed_xyz());
            std::fs::rename(dir.join(subjob.xyz_file()), &to).map_err(|e| {
                InputError::WriteFileError(to.display().to_string(), e.kind())
            })?;
        }
        log::info!("wrote {}", infile.display());
        ret.push(infile);
    }
    Ok(ret)
}
