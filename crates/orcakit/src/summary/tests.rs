use std::fs::write;

use insta::assert_snapshot;
use tempfile::tempdir;
use test_case::test_case;

use super::*;

#[test]
fn collect_testfiles() {
    let got = Summary::collect("testfiles").unwrap();
    let molecules: Vec<_> =
        got.rows.iter().map(|r| r.molecule.as_str()).collect();
    assert_eq!(
        molecules,
        ["benzene_0_1", "h2o_0_1", "nh3_0_1", "pdcl2_0_1", "ts_m1_2"]
    );
    assert_eq!(got.skipped.len(), 1);
    assert!(got.skipped[0].file.ends_with("multi_0_1.out"));
    assert!(got.skipped[0].reason.is_multiple_jobs());
    assert_eq!(
        got.neg_freqs,
        [("nh3_0_1", 6), ("nh3_0_1", 7), ("ts_m1_2", 6)].map(|(m, mode)| {
            NegFreqEntry {
                molecule: m.to_owned(),
                mode,
            }
        })
    );
}

#[test]
fn csv() {
    let summary = Summary::collect("testfiles").unwrap();
    let mut buf = Vec::new();
    summary.write_csv(&mut buf, "screen", "3.0.0").unwrap();
    assert_snapshot!(String::from_utf8(buf).unwrap(), @r"
    This table was compiled with process_orca version 3.0.0 and extracted from screen/
    molecule name,command line,job type,freq?,cost (cpu*hr),E (a.u.),H (a.u.),G (a.u.),neg freq (cm^-1),geom converged?
    benzene_0_1,! hf def2-tzvp,SP,false,0.0117,-230.713628804130,,,,
    h2o_0_1,! b3lyp d3bj def2-svp opt freq,opt,true,0.1844,-76.270901384461,-76.24706389,-76.26847870,,true
    nh3_0_1,! b3lyp d3bj def2-svp opt freq,opt,true,0.5556,-56.531251993240,-56.49222581,-56.51528742,-833.52;-12.07,true
    pdcl2_0_1,! b3lyp def2-svp opt,opt,false,,-1047.834001727615,,,,false
    ts_m1_2,! b3lyp def2-svp optts freq,optTS,true,424.0000,-325.118291003822,-325.03411297,-325.07298741,-1520.33,true
    ");
}

#[test_case("plain", "plain")]
#[test_case("! b3lyp, d3bj", "\"! b3lyp, d3bj\"")]
#[test_case("say \"hi\"", "\"say \"\"hi\"\"\"")]
#[test_case("", "")]
fn quoting(field: &str, want: &str) {
    assert_eq!(csv_field(field), want);
}

#[test]
fn next_free_name() {
    let dir = tempdir().unwrap();
    let p = available_path(dir.path(), "job_summary", "csv");
    assert_eq!(p, dir.path().join("job_summary.csv"));
    write(&p, "").unwrap();
    write(dir.path().join("job_summary_1.csv"), "").unwrap();
    let p = available_path(dir.path(), "job_summary", "csv");
    assert_eq!(p, dir.path().join("job_summary_2.csv"));
}

#[test]
fn empty_dir() {
    let dir = tempdir().unwrap();
    let got = Summary::collect(dir.path()).unwrap();
    assert_eq!(got, Summary::default());
}
