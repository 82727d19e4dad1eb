use std::{
    fs::{read_to_string, write},
    path::Path,
};

use assert_cmd::Command;
use insta::{assert_snapshot, with_settings};
use tempfile::tempdir;
use test_case::test_case;

const TESTFILES: &str = "../orcakit/testfiles";

const WATER: &str = "3
water
O          0.0000000000        0.0000000000       -0.0657441568
H          0.0000000000        0.7574590974        0.5217905143
H          0.0000000000       -0.7574590974        0.5217905143
";

const SETTINGS: &str = "# B3LYP optimization and frequencies
! B3LYP D3BJ def2-SVP Opt Freq
%pal nprocs 8 end
";

/// a command for `bin` that ignores any configuration in the environment
fn command(bin: &str) -> Command {
    let mut cmd = Command::cargo_bin(bin).unwrap();
    cmd.env_remove("ORCAKIT_CONFIG").env_remove("ORCAKIT_EMAIL");
    cmd
}

fn dir_name(dir: &Path) -> String {
    dir.file_name().unwrap().to_string_lossy().into_owned()
}

fn copy_outputs(to: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(TESTFILES)? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "out") {
            std::fs::copy(&path, to.join(path.file_name().unwrap()))?;
        }
    }
    Ok(())
}

#[test]
fn process() -> std::io::Result<()> {
    let dir = tempdir()?;
    copy_outputs(dir.path())?;
    let job = dir_name(dir.path());

    let assert = command("process_orca").arg("--dir").arg(dir.path()).assert();
    let output = assert.get_output();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("multi_0_1.out contains multiple jobs and was skipped"));
    assert!(stdout.contains("3 negative frequencies found."));

    let csv = read_to_string(dir.path().join(format!("{job}_summary.csv")))?;
    with_settings!({
        filters => vec![
            (r"extracted from \S+/", "extracted from [job]/"),
            (r"version \S+ and", "version [version] and"),
        ],
    }, {
        assert_snapshot!(csv, @r"
        This table was compiled with process_orca version [version] and extracted from [job]/
        molecule name,command line,job type,freq?,cost (cpu*hr),E (a.u.),H (a.u.),G (a.u.),neg freq (cm^-1),geom converged?
        benzene_0_1,! hf def2-tzvp,SP,false,0.0117,-230.713628804130,,,,
        h2o_0_1,! b3lyp d3bj def2-svp opt freq,opt,true,0.1844,-76.270901384461,-76.24706389,-76.26847870,,true
        nh3_0_1,! b3lyp d3bj def2-svp opt freq,opt,true,0.5556,-56.531251993240,-56.49222581,-56.51528742,-833.52;-12.07,true
        pdcl2_0_1,! b3lyp def2-svp opt,opt,false,,-1047.834001727615,,,,false
        ts_m1_2,! b3lyp def2-svp optts freq,optTS,true,424.0000,-325.118291003822,-325.03411297,-325.07298741,-1520.33,true
        ");
    });

    let script = read_to_string(dir.path().join("neg_freqs.sh"))?;
    assert!(script.contains(
        "orca_pltvib nh3_0_1.hess 6\n\
         orca_pltvib nh3_0_1.hess 7\n\
         orca_pltvib ts_m1_2.hess 6\n"
    ));
    Ok(())
}

#[test_case(false, &["_summary.csv", "_summary_1.csv"]; "numbered")]
#[test_case(true, &["_summary.csv"]; "overwrite")]
fn process_twice(overwrite: bool, want: &[&str]) -> std::io::Result<()> {
    let dir = tempdir()?;
    copy_outputs(dir.path())?;
    let job = dir_name(dir.path());
    for _ in 0..2 {
        let mut cmd = command("process_orca");
        cmd.arg("--dir").arg(dir.path());
        if overwrite {
            cmd.arg("--overwrite");
        }
        cmd.assert().success();
    }
    let mut got: Vec<_> = std::fs::read_dir(dir.path())?
        .filter_map(|e| {
            let name = e.ok()?.file_name().to_string_lossy().into_owned();
            name.ends_with(".csv").then_some(name)
        })
        .collect();
    got.sort();
    let want: Vec<_> = want.iter().map(|w| format!("{job}{w}")).collect();
    assert_eq!(got, want);
    Ok(())
}

#[test]
fn process_json() -> std::io::Result<()> {
    let dir = tempdir()?;
    copy_outputs(dir.path())?;
    let assert = command("process_orca")
        .arg("--dir")
        .arg(dir.path())
        .arg("--json")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains(r#""molecule": "ts_m1_2""#));
    assert!(stdout.contains(r#""neg_freqs": "-833.52;-12.07""#));
    Ok(())
}

#[test]
fn launch() -> std::io::Result<()> {
    let dir = tempdir()?;
    let settings_dir = tempdir()?;
    let settings = settings_dir.path().join("b3lyp_opt_freq");
    write(&settings, SETTINGS)?;
    write(dir.path().join("h2o_0_1.xyz"), WATER)?;
    write(dir.path().join("oh_m1_1.xyz"), WATER)?;
    let job = dir_name(dir.path());

    let assert = command("launch_orca")
        .arg("--dir")
        .arg(dir.path())
        .arg(&settings)
        .arg("2-00:00:00")
        .assert();
    let output = assert.get_output();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("# B3LYP optimization and frequencies\n"));
    assert!(stdout.contains("Memory per core estimated to be 1100MB"));

    assert!(dir.path().join("h2o_0_1_in.xyz").exists());
    assert!(dir.path().join("oh_m1_1.inp").exists());
    let script = read_to_string(dir.path().join(format!("{job}.sh")))?;
    assert!(script.contains("#SBATCH -t 2-00:00:00\n"));
    assert!(!script.contains("--mail-user"));
    Ok(())
}

#[test]
fn launch_menu() -> std::io::Result<()> {
    let dir = tempdir()?;
    let settings_dir = tempdir()?;
    write(settings_dir.path().join("a_single_point"), "! HF def2-SVP\n")?;
    write(settings_dir.path().join("b_opt_freq"), SETTINGS)?;
    write(dir.path().join("h2o_0_1.xyz"), WATER)?;
    let config = dir.path().join("orcakit.toml");
    write(
        &config,
        format!(
            "email = 'someone@example.com'\nsettings_dir = '{}'\n",
            settings_dir.path().display()
        ),
    )?;

    let assert = command("launch_orca")
        .arg("--dir")
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("500M")
        .write_stdin("2\n")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains(" 1 a_single_point\n 2 b_opt_freq\n"));
    assert!(stdout.contains("No job time provided. Setting job time to 1:00:00"));
    assert!(!stdout.contains("estimated"));

    let job = dir_name(dir.path());
    let script = read_to_string(dir.path().join(format!("{job}.sh")))?;
    assert!(script.contains("#SBATCH --mail-user=someone@example.com\n"));
    assert!(script.contains("#SBATCH --mem 4G\n"));
    let inp = read_to_string(dir.path().join("h2o_0_1.inp"))?;
    assert!(inp.contains("%maxcore 500\n"));
    Ok(())
}

#[test_case(&["bogus"], "bogus not recognized"; "unknown argument")]
#[test_case(&["16000M", "settings"], "excessive memory (128G) requested!"; "too much memory")]
#[test_case(&["single_point"], "settings file must contain %pal nprocs"; "missing nprocs")]
fn launch_fails(args: &[&str], want: &str) -> std::io::Result<()> {
    let dir = tempdir()?;
    write(dir.path().join("settings"), SETTINGS)?;
    write(dir.path().join("single_point"), "! HF def2-SVP\n")?;
    write(dir.path().join("h2o_0_1.xyz"), WATER)?;
    let assert = command("launch_orca")
        .current_dir(dir.path())
        .args(args)
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains(want), "stderr: {stderr}");
    assert!(!dir.path().join("h2o_0_1.inp").exists());
    Ok(())
}

#[test_case(1.0, "hello Ada\n"; "always")]
#[test_case(0.0, ""; "never")]
fn greet(odds: f64, want: &str) -> std::io::Result<()> {
    let dir = tempdir()?;
    let config = dir.path().join("orcakit.toml");
    write(
        &config,
        format!(
            "[greet]\nmessages = ['hello {{name}}']\n\n\
             [[greet.users]]\nlogin = 'alovelace'\nname = 'Ada'\nodds = {odds:?}\n"
        ),
    )?;
    command("greet")
        .arg("--config")
        .arg(&config)
        .env("USER", "alovelace")
        .assert()
        .success()
        .stdout(want.to_owned());
    Ok(())
}

#[test]
fn example_config() {
    command("greet")
        .arg("--config")
        .arg(Path::new(TESTFILES).join("orcakit.toml"))
        .env("USER", "cbabbage")
        .assert()
        .success();
}
