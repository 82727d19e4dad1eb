//! Shell and SLURM scripts. Templates use `{{.name}}` directives, in line with
//! [Go templates](https://pkg.go.dev/text/template), and are filled by plain
//! substitution.

use std::sync::LazyLock;

use regex::{Captures, Regex};

pub mod pltvib;
pub mod slurm;

/// the environment-modules directory holding the ORCA module
pub const DEFAULT_MODULE_PATH: &str = "/project/carrow/downloads/apps/modules";

static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\.(\w+)\}\}").unwrap());

/// replace every `{{.key}}` in `template` with its value in a single pass, so
/// directives inside the values are left alone. unknown keys are kept as-is
pub(crate) fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    DIRECTIVE
        .replace_all(template, |caps: &Captures| {
            match vars.iter().find(|(k, _)| *k == &caps[1]) {
                Some((_, v)) => v.to_string(),
                None => caps[0].to_owned(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::fill;

    #[test]
    fn fill_repeated() {
        let got = fill(
            "{{.a}} and {{.b}} and {{.a}} but not {{.c}}",
            &[("a", "x"), ("b", "y")],
        );
        assert_eq!(got, "x and y and x but not {{.c}}");
    }

    #[test]
    fn fill_values_verbatim() {
        let got = fill(
            "cd {{.dir}} for {{.time}}",
            &[("dir", "/scratch/{{.time}}"), ("time", "1:00:00")],
        );
        assert_eq!(got, "cd /scratch/{{.time}} for 1:00:00");
    }
}
