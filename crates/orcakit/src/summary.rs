//! Tabulating parsed ORCA outputs

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    files_with_ext,
    output::{OrcaOutput, ParseError},
};

#[cfg(test)]
mod tests;

pub const HEADER: [&str; 10] = [
    "molecule name",
    "command line",
    "job type",
    "freq?",
    "cost (cpu*hr)",
    "E (a.u.)",
    "H (a.u.)",
    "G (a.u.)",
    "neg freq (cm^-1)",
    "geom converged?",
];

/// One line of the summary table. Every column is already formatted, and
/// columns that don't apply to a job are empty
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub molecule: String,
    pub commands: String,
    pub job_type: String,
    pub freq: String,
    pub cost: String,
    pub energy: String,
    pub enthalpy: String,
    pub gibbs: String,
    pub neg_freqs: String,
    pub geom_converged: String,
}

impl From<&OrcaOutput> for Row {
    fn from(out: &OrcaOutput) -> Self {
        let freq_col = |s: &Option<String>| {
            if out.freq {
                s.clone().unwrap_or_default()
            } else {
                String::new()
            }
        };
        let neg_freqs = if out.freq {
            out.neg_freqs
                .iter()
                .map(|n| n.freq.as_str())
                .collect::<Vec<_>>()
                .join(";")
        } else {
            String::new()
        };
        Self {
            molecule: out.name.clone(),
            commands: out.commands.clone(),
            job_type: out.job_type.to_string(),
            freq: out.freq.to_string(),
            cost: out.cost().map(|c| format!("{c:.4}")).unwrap_or_default(),
            energy: out.energy.clone().unwrap_or_default(),
            enthalpy: freq_col(&out.enthalpy),
            gibbs: freq_col(&out.gibbs),
            neg_freqs,
            geom_converged: out
                .geom_converged
                .map(|b| b.to_string())
                .unwrap_or_default(),
        }
    }
}

impl Row {
    pub fn fields(&self) -> [&str; 10] {
        [
            &self.molecule,
            &self.commands,
            &self.job_type,
            &self.freq,
            &self.cost,
            &self.energy,
            &self.enthalpy,
            &self.gibbs,
            &self.neg_freqs,
            &self.geom_converged,
        ]
    }
}

/// A negative frequency to visualize: the molecule whose Hessian holds it and
/// the mode index
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegFreqEntry {
    pub molecule: String,
    pub mode: usize,
}

/// An output file that was left out of the summary, and why
#[derive(Debug, PartialEq)]
pub struct Skipped {
    pub file: PathBuf,
    pub reason: ParseError,
}

#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub rows: Vec<Row>,
    pub neg_freqs: Vec<NegFreqEntry>,
    pub skipped: Vec<Skipped>,
}

/// quote `field` if it contains a comma, quote, or line break
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

fn write_record<'a, W: Write>(
    w: &mut W,
    fields: impl IntoIterator<Item = &'a str>,
) -> std::io::Result<()> {
    let line: Vec<_> = fields.into_iter().map(csv_field).collect();
    writeln!(w, "{}", line.join(","))
}

impl Summary {
    /// parse every ORCA output file in `dir`. SLURM logs are skipped silently,
    /// and files that fail to parse end up in [Summary::skipped]
    pub fn collect(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let mut ret = Self::default();
        for path in files_with_ext(dir, "out")? {
            let is_slurm = path
                .file_name()
                .is_some_and(|f| f.to_string_lossy().contains("slurm"));
            if is_slurm {
                log::debug!("skipping slurm log {}", path.display());
                continue;
            }
            match OrcaOutput::load(&path) {
                Ok(out) => ret.push(&out),
                Err(reason) => ret.skipped.push(Skipped { file: path, reason }),
            }
        }
        Ok(ret)
    }

    pub fn push(&mut self, out: &OrcaOutput) {
        self.rows.push(Row::from(out));
        if out.freq {
            self.neg_freqs.extend(out.neg_freqs.iter().map(|n| NegFreqEntry {
                molecule: out.name.clone(),
                mode: n.mode,
            }));
        }
    }

    /// write the table as CSV, preceded by a provenance line
    pub fn write_csv<W: Write>(
        &self,
        w: &mut W,
        job_name: &str,
        version: &str,
    ) -> std::io::Result<()> {
        let provenance = format!(
            "This table was compiled with process_orca version {version} \
             and extracted from {job_name}/"
        );
        write_record(w, [provenance.as_str()])?;
        write_record(w, HEADER)?;
        for row in &self.rows {
            write_record(w, row.fields())?;
        }
        Ok(())
    }
}

/// the first of `stem.ext`, `stem_1.ext`, `stem_2.ext`, ... in `dir` that
/// doesn't exist yet
pub fn available_path(dir: impl AsRef<Path>, stem: &str, ext: &str) -> PathBuf {
    let dir = dir.as_ref();
    let first = dir.join(format!("{stem}.{ext}"));
    if !first.exists() {
        return first;
    }
    (1..)
        .map(|n| dir.join(format!("{stem}_{n}.{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}
