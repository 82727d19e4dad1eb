//! Parsing for ORCA 4 output files

use std::{fmt::Display, path::Path, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::input::NPROCS;

pub mod section;

use section::{Case, Direction, Marker, cut, field, find};


const INPUT_FILE: Marker = Marker::EndsWith("INPUT FILE");
const END_OF_INPUT: Marker = Marker::EndsWith("****END OF INPUT****");
const TERMINATED: &str = "****ORCA TERMINATED NORMALLY****";
const VIB_FREQS: Marker = Marker::EndsWith("VIBRATIONAL FREQUENCIES");
const NORMAL_MODES: Marker = Marker::EndsWith("NORMAL MODES");
const CONVERGED: &str = "THE OPTIMIZATION HAS CONVERGED";

static CELL: OnceLock<[Regex; 3]> = OnceLock::new();

fn regexes() -> &'static [Regex; 3] {
    CELL.get_or_init(|| {
        [
            Regex::new(r"(?i)\$new_job").unwrap(),
            Regex::new(r"^(\d+):\s+(-?\d+\.\d+)\s+cm\*\*-1").unwrap(),
            Regex::new(
                r"^TOTAL RUN TIME:\s+(\d+)\s+days\s+(\d+)\s+hours\s+(\d+)\s+minutes\s+(\d+)\s+seconds\s+(\d+)\s+msec",
            )
            .unwrap(),
        ]
    })
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// the file contains several jobs separated by `$new_job`
    MultipleJobs(String),
    /// the echoed input file could not be found
    NoInput(String),
    /// the echoed input has no `!` keyword line
    NoCommands(String),
    ReadFileError(String, std::io::ErrorKind),
}

impl ParseError {
    /// Returns `true` if the parse error is [`MultipleJobs`].
    ///
    /// [`MultipleJobs`]: ParseError::MultipleJobs
    #[must_use]
    pub fn is_multiple_jobs(&self) -> bool {
        matches!(self, Self::MultipleJobs(..))
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MultipleJobs(name) => {
                write!(f, "{name} contains multiple jobs")
            }
            ParseError::NoInput(name) => {
                write!(f, "{name} does not echo an input file")
            }
            ParseError::NoCommands(name) => {
                write!(f, "{name} has no ! keyword line in its input")
            }
            ParseError::ReadFileError(name, kind) => {
                write!(f, "failed to read {name}: {kind}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    Opt,
    OptTs,
    SinglePt,
}

impl JobType {
    /// classify a lowercased keyword line. `optts` has to be checked first
    /// since it also contains `opt`. ORCA allows `!OptTS` with no space, so
    /// keywords are split on anything that isn't alphanumeric
    pub fn from_commands(commands: &str) -> Self {
        if commands
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|k| k == "optts")
        {
            JobType::OptTs
        } else if commands.contains("opt") {
            JobType::Opt
        } else {
            JobType::SinglePt
        }
    }

    pub fn is_opt(self) -> bool {
        matches!(self, JobType::Opt | JobType::OptTs)
    }
}

impl Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobType::Opt => write!(f, "opt"),
            JobType::OptTs => write!(f, "optTS"),
            JobType::SinglePt => write!(f, "SP"),
        }
    }
}

/// Wall time from the `TOTAL RUN TIME` line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTime {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub msec: u64,
}

impl RunTime {
    /// wall time in hours. milliseconds are dropped
    pub fn hours(&self) -> f64 {
        24.0 * self.days as f64
            + self.hours as f64
            + self.minutes as f64 / 60.0
            + self.seconds as f64 / 3600.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NegFreq {
    /// the index ORCA assigns to the mode, as used by `orca_pltvib`
    pub mode: usize,
    /// in cm⁻¹, verbatim
    pub freq: String,
}

impl NegFreq {
    pub fn value(&self) -> Option<f64> {
        self.freq.parse().ok()
    }
}

/// Everything extracted from a single ORCA output file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrcaOutput {
    /// the output file name up to the first `.`
    pub name: String,
    /// the first `!` line of the input, lowercased
    pub commands: String,
    pub ncores: usize,
    pub job_type: JobType,
    pub freq: bool,
    /// whether ORCA reported normal termination
    pub terminated: bool,
    /// present only for jobs that terminated normally
    pub run_time: Option<RunTime>,
    /// final single-point energy in Eh, verbatim
    pub energy: Option<String>,
    /// total enthalpy in Eh, verbatim. frequency jobs only
    pub enthalpy: Option<String>,
    /// final Gibbs free energy in Eh, verbatim. frequency jobs only
    pub gibbs: Option<String>,
    /// every vibrational frequency from the last frequency block
    pub frequencies: Vec<f64>,
    pub neg_freqs: Vec<NegFreq>,
    /// None for single points
    pub geom_converged: Option<bool>,
}

/// the molecule name for the output file at `path`
pub fn molecule_name(path: &Path) -> String {
    let file = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file.split_once('.') {
        Some((stem, _)) => stem.to_owned(),
        None => file,
    }
}

/// the number after `%pal nprocs` in the echoed input, if any. the same
/// pattern as [crate::input::Settings::nprocs], so `nprocs` may be on its own
/// line inside the `%pal` block
fn parse_ncores(input: &[&str]) -> Option<usize> {
    let joined = input.join("\n");
    let caps = NPROCS.captures(&joined)?;
    caps[1].parse().ok()
}

fn parse_run_time(lines: &[&str]) -> Option<RunTime> {
    let [_, _, time_re] = regexes();
    let line =
        find(lines, "TOTAL RUN TIME", Direction::Reverse, Case::Sensitive)?;
    let caps = time_re.captures(line)?;
    let get = |i: usize| caps[i].parse::<u64>().ok();
    Some(RunTime {
        days: get(1)?,
        hours: get(2)?,
        minutes: get(3)?,
        seconds: get(4)?,
        msec: get(5)?,
    })
}

/// the `n`th field of the last line in `lines` starting with `prefix`
fn extract_energy(lines: &[&str], prefix: &str, n: isize) -> Option<String> {
    let line = find(lines, prefix, Direction::Reverse, Case::Sensitive)?;
    field(line, n).map(str::to_owned)
}

impl OrcaOutput {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ParseError::ReadFileError(path.display().to_string(), e.kind())
        })?;
        Self::parse(&molecule_name(path), &contents)
    }

    /// parse the contents of an ORCA output file for the molecule `name`
    pub fn parse(name: &str, contents: &str) -> Result<Self, ParseError> {
        let [new_job, freq_re, _] = regexes();
        if new_job.is_match(contents) {
            return Err(ParseError::MultipleJobs(name.to_owned()));
        }

        let mut lines: Vec<&str> = contents.lines().map(str::trim).collect();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        // echoed input, with the `|  1> ` prompts stripped
        let input: Vec<&str> =
            cut(&lines, Some(INPUT_FILE), 3, Some(END_OF_INPUT), 0)
                .iter()
                .filter_map(|l| l.split_once('>').map(|(_, rest)| rest.trim()))
                .collect();
        if input.is_empty() {
            return Err(ParseError::NoInput(name.to_owned()));
        }

        let commands = find(&input, "!", Direction::Forward, Case::Sensitive)
            .ok_or_else(|| ParseError::NoCommands(name.to_owned()))?
            .to_lowercase();
        let ncores = parse_ncores(&input).unwrap_or_else(|| {
            log::debug!("{name}: no %pal nprocs, assuming a serial job");
            1
        });

        let terminated = lines.iter().rev().any(|l| *l == TERMINATED);
        let (results, run_time) = if terminated {
            let end = Marker::Contains(TERMINATED);
            (
                cut(&lines, Some(END_OF_INPUT), 3, Some(end), 0),
                parse_run_time(&lines),
            )
        } else {
            (cut(&lines, Some(END_OF_INPUT), 3, None, 0), None)
        };
        if terminated && run_time.is_none() {
            log::warn!("{name}: terminated normally but has no run time");
        }

        let job_type = JobType::from_commands(&commands);
        let freq = commands.contains("freq");
        let energy = extract_energy(results, "FINAL SINGLE POINT ENERGY", -1);

        let mut enthalpy = None;
        let mut gibbs = None;
        let mut frequencies = Vec::new();
        let mut neg_freqs = Vec::new();
        if freq {
            enthalpy = extract_energy(results, "Total enthalpy", -2);
            gibbs = extract_energy(results, "Final Gibbs free energy", -2);
            // a block cut off before NORMAL MODES is incomplete, so none of
            // it is used
            let tail = cut(results, Some(VIB_FREQS), 0, None, 0);
            let end = tail.iter().position(|l| NORMAL_MODES.matches(l));
            let block: &[&str] = match end {
                Some(end) => &tail[..end],
                None => {
                    if !tail.is_empty() {
                        log::debug!("{name}: incomplete frequency block");
                    }
                    &[]
                }
            };
            for line in block {
                let Some(caps) = freq_re.captures(line) else {
                    continue;
                };
                let (Ok(mode), Ok(f)) =
                    (caps[1].parse::<usize>(), caps[2].parse::<f64>())
                else {
                    continue;
                };
                frequencies.push(f);
                if f < 0.0 {
                    neg_freqs.push(NegFreq {
                        mode,
                        freq: caps[2].to_owned(),
                    });
                }
            }
        }

        let geom_converged = job_type
            .is_opt()
            .then(|| results.iter().any(|l| l.contains(CONVERGED)));

        Ok(Self {
            name: name.to_owned(),
            commands,
            ncores,
            job_type,
            freq,
            terminated,
            run_time,
            energy,
            enthalpy,
            gibbs,
            frequencies,
            neg_freqs,
            geom_converged,
        })
    }

    /// computational cost in CPU-hours, only known for jobs that terminated
    /// normally
    pub fn cost(&self) -> Option<f64> {
        self.run_time.map(|t| self.ncores as f64 * t.hours())
    }

    /// the final single-point energy as a number
    pub fn energy_value(&self) -> Option<f64> {
        self.energy.as_deref().and_then(|e| e.parse().ok())
    }

    pub fn enthalpy_value(&self) -> Option<f64> {
        self.enthalpy.as_deref().and_then(|e| e.parse().ok())
    }

    pub fn gibbs_value(&self) -> Option<f64> {
        self.gibbs.as_deref().and_then(|e| e.parse().ok())
    }
}
