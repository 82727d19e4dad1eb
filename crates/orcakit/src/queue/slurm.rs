use std::path::Path;

use serde::{Deserialize, Serialize};

use super::fill;

/// the submit script used when the configuration doesn't supply one
pub fn default_submit_script() -> &'static str {
    include_str!("../../templates/slurm/orca")
}

/// the line running one ORCA input file inside the batch script. output is
/// appended to `{stem}.out` in the submission directory
pub fn program_cmd(infile: &Path) -> String {
    let file = infile
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = infile
        .file_stem()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("$ORCA {file} >> $SLURM_SUBMIT_DIR/{stem}.out")
}

/// Everything needed to fill in a SLURM submission script running several ORCA
/// inputs one after the other on a single node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchJob {
    pub name: String,
    /// wall time in SLURM's `d:hh:mm:ss` format
    pub time: String,
    pub ncores: usize,
    /// in GB
    pub total_memory: usize,
    pub email: Option<String>,
    pub version: String,
    pub module_path: String,
    /// the lines from [program_cmd]
    pub subjobs: Vec<String>,
}

impl BatchJob {
    /// render the submit script from `template`, or from
    /// [default_submit_script] if it is None. Supported directives are
    /// `{{.jobname}}`, `{{.time}}`, `{{.ncores}}`, `{{.memory}}`, `{{.mail}}`,
    /// `{{.version}}`, `{{.modules}}`, and `{{.subjobs}}`
    pub fn render(&self, template: Option<&str>) -> String {
        let template = template.unwrap_or(default_submit_script());
        let mail = match &self.email {
            Some(email) => format!(
                "#SBATCH --mail-user={email}\n#SBATCH --mail-type=all\n"
            ),
            None => String::new(),
        };
        let mut subjobs = String::new();
        for s in &self.subjobs {
            subjobs.push_str(s);
            subjobs.push('\n');
        }
        fill(
            template,
            &[
                ("jobname", &self.name),
                ("time", &self.time),
                ("ncores", &self.ncores.to_string()),
                ("memory", &self.total_memory.to_string()),
                ("mail", &mail),
                ("version", &self.version),
                ("modules", &self.module_path),
                ("subjobs", &subjobs),
            ],
        )
    }

    /// the file name for the script, `{name}.sh`
    pub fn filename(&self) -> String {
        format!("{}.sh", self.name)
    }
}
