//! Scripts animating negative-frequency modes with `orca_pltvib`

use crate::summary::NegFreqEntry;

use super::fill;

/// the name of the generated script
pub const SCRIPT_NAME: &str = "neg_freqs.sh";

/// with at least this many modes the script only runs under SLURM
pub const MAX_LOCAL: usize = 10;

/// directory the SLURM variant expects the Hessian files in
pub const HESS_DIR: &str = "job_files";

pub struct NegFreqScript<'a> {
    pub entries: &'a [NegFreqEntry],
    pub job_name: &'a str,
    pub version: &'a str,
    pub module_path: &'a str,
}

impl NegFreqScript<'_> {
    /// whether the script has to be submitted with sbatch
    pub fn needs_slurm(&self) -> bool {
        self.entries.len() >= MAX_LOCAL
    }

    pub fn render(&self) -> String {
        use std::fmt::Write;
        let mut pltvib = String::new();
        let template = if self.needs_slurm() {
            for e in self.entries {
                writeln!(
                    pltvib,
                    "    orca_pltvib {HESS_DIR}/{}.hess {}",
                    e.molecule, e.mode
                )
                .unwrap();
            }
            write!(pltvib, "    mv {HESS_DIR}/*.hess.v* .").unwrap();
            include_str!("../../templates/neg_freqs/slurm")
        } else {
            for e in self.entries {
                writeln!(pltvib, "orca_pltvib {}.hess {}", e.molecule, e.mode)
                    .unwrap();
            }
            include_str!("../../templates/neg_freqs/local")
        };
        fill(
            template,
            &[
                ("modules", self.module_path),
                ("count", &self.entries.len().to_string()),
                ("pltvib", &pltvib),
                ("version", self.version),
                ("jobname", self.job_name),
            ],
        )
    }
}
