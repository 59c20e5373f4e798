// CLI behaviour of the relative_grader binary

use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn grader(log_dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("relative_grader");
    cmd.env("LOG_FILE_PATH", log_dir.join("grader.log"));
    cmd
}

#[test]
fn test_grade_writes_results_and_prints_summary() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("final_grades.csv");

    grader(dir.path())
        .arg("grade")
        .arg("tests/fixtures/sample_class.csv")
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total students:  6"))
        .stdout(predicate::str::contains("Method used:     Absolute"))
        .stdout(predicate::str::contains("Pass percentage: 50.0%"));

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.starts_with("id,marks,attendance,ese_marks,name,final_grade\n"));
    assert!(content.contains("5,91,95,50,Dev,A+"));
}

#[test]
fn test_grade_dash_output_streams_results_to_stdout() {
    let dir = tempfile::tempdir().unwrap();

    let assert = grader(dir.path())
        .args(["grade", "tests/fixtures/sample_class.csv", "--output", "-"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "id,marks,attendance,ese_marks,name,final_grade\n",
        ))
        .stdout(predicate::str::contains("5,91,95,50,Dev,A+"))
        .stdout(predicate::str::contains("Total students").not())
        .stderr(predicate::str::contains("Total students:  6"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 7);
    assert!(!Path::new("-").exists());
}

#[test]
fn test_grade_writes_optional_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.csv");
    let bounds = dir.path().join("bounds.csv");
    let chart = dir.path().join("chart.svg");
    let json = dir.path().join("report.json");

    grader(dir.path())
        .args(["grade", "tests/fixtures/sample_class.csv", "--course-type", "practical", "--gzip"])
        .arg("--output")
        .arg(&output)
        .arg("--boundaries")
        .arg(&bounds)
        .arg("--chart")
        .arg(&chart)
        .arg("--json")
        .arg(&json)
        .assert()
        .success();

    assert!(dir.path().join("out.csv.gz").exists());
    assert!(fs::read_to_string(&bounds).unwrap().contains("D,50.0"));
    assert!(fs::read_to_string(&chart).unwrap().contains("<svg"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(report["config"]["course_type"], "practical");
    assert_eq!(report["summary"]["method"], "absolute");
    assert_eq!(report["boundaries"]["D"], 50.0);
}

#[test]
fn test_grade_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("grading.json");
    let json = dir.path().join("report.json");
    fs::write(&config, r#"{"total_max_marks": 150, "protocol": "b"}"#).unwrap();

    grader(dir.path())
        .args(["grade", "tests/fixtures/sample_class.csv", "--protocol", "a"])
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(dir.path().join("out.csv"))
        .arg("--json")
        .arg(&json)
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(report["config"]["total_max_marks"], 150.0);
    assert_eq!(report["config"]["protocol"], "a");
}

#[test]
fn test_grade_rejects_missing_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.csv");
    fs::write(&input, "id,marks\n1,50\n").unwrap();

    grader(dir.path())
        .arg("grade")
        .arg(&input)
        .arg("--output")
        .arg(dir.path().join("out.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "CSV must contain columns: attendance, ese_marks",
        ));
}

#[test]
fn test_template_round_trips_through_grade() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("template.csv");

    grader(dir.path())
        .arg("template")
        .arg("--output")
        .arg(&template)
        .assert()
        .success();

    assert!(
        fs::read_to_string(&template)
            .unwrap()
            .starts_with("id,marks,attendance,ese_marks\n")
    );

    grader(dir.path())
        .arg("grade")
        .arg(&template)
        .arg("--output")
        .arg(dir.path().join("out.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Pass percentage: 60.0%"));
}

#[test]
fn test_semester_master_and_detail_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let master = dir.path().join("master.csv");
    let detail = dir.path().join("detail.csv");

    grader(dir.path())
        .args(["semester", "tests/fixtures/semester.csv", "--protocol", "b"])
        .arg("--output")
        .arg(&master)
        .arg("--detailed")
        .arg(&detail)
        .assert()
        .success()
        .stdout(predicate::str::contains("Graced:   2"));

    let master = fs::read_to_string(&master).unwrap();
    assert!(master.contains("s2,D*,D*,6,4,None,2"));

    let detail = fs::read_to_string(&detail).unwrap();
    assert!(detail.starts_with(
        "student_id,subject_code,marks,attendance,ese_marks,credits,final_grade,grade_point,boundary_d,min_ese_required,graced\n"
    ));
    assert_eq!(detail.lines().count(), 9);
}
