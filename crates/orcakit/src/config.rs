//! Configuration shared by the orcakit binaries

use std::{
    fmt::Display,
    fs::read_to_string,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{greet::GreetConfig, queue::DEFAULT_MODULE_PATH};


/// the job time used when none is given on the command line
pub const DEFAULT_TIME: &str = "1:00:00";

/// the largest total memory request allowed, in GB
pub const MAX_MEMORY: usize = 120;

/// Templates can either be literal strings in the config file, or the name of a
/// file to be loaded
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(untagged)]
enum TemplateSrc {
    Literal(String),
    File { file: String },
}

impl TryFrom<TemplateSrc> for String {
    type Error = String;

    fn try_from(value: TemplateSrc) -> Result<Self, Self::Error> {
        match value {
            TemplateSrc::Literal(s) => Ok(s),
            TemplateSrc::File { file } => read_to_string(&file).map_err(|e| {
                format!("failed to load template file {file}: {e}")
            }),
        }
    }
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    /// Address for SLURM's job start and end notifications. If absent, no
    /// mail directives are written.
    email: Option<String>,

    /// Directory of ORCA keyword templates offered in the interactive menu
    /// when no settings file is given on the command line.
    settings_dir: Option<String>,

    /// Wall time for the batch job when none is given, in SLURM's
    /// d:hh:mm:ss format. Defaults to 1:00:00.
    default_time: Option<String>,

    /// The largest total memory request in GB that launch_orca will write
    /// into a batch script. Defaults to 120.
    max_memory: Option<usize>,

    /// The environment-modules directory holding the orca module.
    module_path: Option<String>,

    /// The template for the SLURM submit script, overriding the built-in
    /// one. Supported formatting directives are {{.jobname}}, {{.time}},
    /// {{.ncores}}, {{.memory}}, {{.mail}}, {{.version}}, {{.modules}}, and
    /// {{.subjobs}}.
    queue_template: Option<TemplateSrc>,

    /// Settings for the greet binary.
    #[serde(default)]
    greet: GreetConfig,
}

/// Construct a full `Config` using [Config::load] on a TOML file or start from
/// [Config::default]
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    pub email: Option<String>,

    /// where to look for default ORCA settings files
    pub settings_dir: Option<PathBuf>,

    pub default_time: String,

    /// in GB
    pub max_memory: usize,

    pub module_path: String,

    /// the optional template to use for the batch script. If this is not
    /// provided, [crate::queue::slurm::default_submit_script] is used
    pub queue_template: Option<String>,

    pub greet: GreetConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: None,
            settings_dir: None,
            default_time: DEFAULT_TIME.to_owned(),
            max_memory: MAX_MEMORY,
            module_path: DEFAULT_MODULE_PATH.to_owned(),
            queue_template: None,
            greet: GreetConfig::default(),
        }
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = String;

    fn try_from(rc: RawConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            email: rc.email,
            settings_dir: rc.settings_dir.map(PathBuf::from),
            default_time: rc
                .default_time
                .unwrap_or_else(|| DEFAULT_TIME.to_owned()),
            max_memory: rc.max_memory.unwrap_or(MAX_MEMORY),
            module_path: rc
                .module_path
                .unwrap_or_else(|| DEFAULT_MODULE_PATH.to_owned()),
            queue_template: rc
                .queue_template
                .map(String::try_from)
                .transpose()?,
            greet: rc.greet,
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    ReadFileError(String, std::io::ErrorKind),
    ParseError(String, String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadFileError(file, kind) => {
                write!(f, "failed to read config file {file}: {kind}")
            }
            ConfigError::ParseError(file, e) => {
                write!(f, "failed to parse config file {file}: {e}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl std::str::FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl Config {
    pub fn load(filename: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let filename = filename.as_ref();
        let name = filename.display().to_string();
        let contents = read_to_string(filename)
            .map_err(|e| ConfigError::ReadFileError(name.clone(), e.kind()))?;
        contents.parse().map_err(|e: toml::de::Error| {
            ConfigError::ParseError(name, e.to_string())
        })
    }

    /// load `filename` if it is Some, otherwise fall back to the defaults
    pub fn load_or_default(
        filename: Option<impl AsRef<Path>>,
    ) -> Result<Self, ConfigError> {
        match filename {
            Some(f) => Self::load(f),
            None => Ok(Self::default()),
        }
    }
}
