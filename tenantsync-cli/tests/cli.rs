use assert_cmd::Command;
use tempfile::NamedTempFile;

const JOBS: &str = r#"
jobs:
  teachers:
    pre_execute:
      - TRUNCATE sync.teachers_staging
    count: SELECT count(*) FROM teachers WHERE resource_path = $1
    page: >
      INSERT INTO sync.teachers_staging
      SELECT * FROM teachers WHERE resource_path = $1
      ORDER BY teacher_id LIMIT $2 OFFSET $3
  lesson-members:
    count: SELECT count(*) FROM lesson_members WHERE resource_path = $1
    page: SELECT 1 WHERE $1::text IS NOT NULL LIMIT $2 OFFSET $3
"#;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("tempfile");
    std::io::Write::write_all(&mut f, contents.as_bytes()).expect("write");
    f
}

fn tenantsync() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tenantsync"));
    cmd.env_remove("TENANTSYNC_DATABASE_URL")
        .env_remove("DATABASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let out = cmd.output().expect("run tenantsync");
    String::from_utf8(out.stdout).expect("utf8 stdout")
}

#[test]
fn jobs_lists_defined_jobs() {
    let f = write_temp(JOBS);
    let stdout = stdout_of(tenantsync().args(["jobs", "--jobs-file", f.path().to_str().unwrap()]));
    assert!(stdout.contains("teachers"), "{stdout}");
    assert!(stdout.contains("lesson-members"), "{stdout}");
    assert!(!stdout.contains("student-subscriptions"), "{stdout}");
    assert!(serde_json::from_str::<serde_json::Value>(stdout.trim()).is_err(), "{stdout}");
}

#[test]
fn jobs_json_output_is_parseable() {
    let f = write_temp(JOBS);
    let stdout = stdout_of(tenantsync().args([
        "jobs",
        "--jobs-file",
        f.path().to_str().unwrap(),
        "--format",
        "json",
    ]));
    let parsed: serde_json::Value = serde_json::from_str(stdout.trim()).expect("json output");
    let kinds: Vec<&str> = parsed
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|j| j["kind"].as_str())
        .collect();
    assert_eq!(kinds, ["lesson-members", "teachers"]);
    assert_eq!(parsed[1]["pre_execute"], 1);
}

#[test]
fn jobs_rejects_invalid_file() {
    let f = write_temp("jobs:\n  teachers:\n    count: SELECT 1\n");
    tenantsync()
        .args(["jobs", "--jobs-file", f.path().to_str().unwrap()])
        .assert()
        .code(2);
}

#[test]
fn jobs_rejects_missing_file() {
    tenantsync()
        .args(["jobs", "--jobs-file", "/nonexistent/tenantsync-jobs.yaml"])
        .assert()
        .code(2);
}

#[test]
fn run_without_database_url_is_config_error() {
    let f = write_temp(JOBS);
    tenantsync()
        .args(["run", "--job", "teachers", "--jobs-file", f.path().to_str().unwrap()])
        .assert()
        .code(2);
}

#[test]
fn run_rejects_zero_concurrency() {
    let f = write_temp(JOBS);
    tenantsync()
        .args([
            "run",
            "--job",
            "teachers",
            "--jobs-file",
            f.path().to_str().unwrap(),
            "--concurrency",
            "0",
            "--store",
            "postgres://sync@127.0.0.1:1/unused",
        ])
        .assert()
        .code(2);
}

#[test]
fn run_rejects_negative_page_size() {
    let f = write_temp(JOBS);
    tenantsync()
        .args([
            "run",
            "--job",
            "teachers",
            "--jobs-file",
            f.path().to_str().unwrap(),
            "--page-size=-5",
        ])
        .assert()
        .code(2);
}

#[test]
fn run_rejects_job_missing_from_file() {
    let f = write_temp(JOBS);
    tenantsync()
        .args([
            "run",
            "--job",
            "student-subscriptions",
            "--jobs-file",
            f.path().to_str().unwrap(),
        ])
        .assert()
        .code(2);
}

#[test]
fn run_rejects_unknown_job_kind() {
    let f = write_temp(JOBS);
    tenantsync()
        .args(["run", "--job", "invoices", "--jobs-file", f.path().to_str().unwrap()])
        .assert()
        .code(2);
}

#[test]
fn run_rejects_bad_tenant_table() {
    let f = write_temp(JOBS);
    tenantsync()
        .args([
            "run",
            "--job",
            "teachers",
            "--jobs-file",
            f.path().to_str().unwrap(),
            "--tenant-table",
            "orgs; DROP TABLE orgs",
            "--store",
            "postgres://sync@127.0.0.1:1/unused",
        ])
        .assert()
        .code(2);
}

#[test]
fn tenants_without_database_url_is_config_error() {
    tenantsync().args(["tenants"]).assert().code(2);
}

#[test]
fn doctor_skips_database_when_unconfigured() {
    let f = write_temp(JOBS);
    let stdout = stdout_of(tenantsync().args([
        "doctor",
        "--jobs-file",
        f.path().to_str().unwrap(),
        "--format",
        "json",
    ]));
    let parsed: serde_json::Value = serde_json::from_str(stdout.trim()).expect("json output");
    assert_eq!(parsed["all_passed"], true);
    let statuses: Vec<(&str, &str)> = parsed["checks"]
        .as_array()
        .expect("checks")
        .iter()
        .map(|c| (c["name"].as_str().unwrap(), c["status"].as_str().unwrap()))
        .collect();
    assert_eq!(statuses, [("jobs file", "ok"), ("database", "skipped")]);
}

#[test]
fn doctor_fails_on_invalid_jobs_file() {
    let f = write_temp("not: [valid");
    tenantsync()
        .args(["doctor", "--jobs-file", f.path().to_str().unwrap()])
        .assert()
        .code(4);
}

#[test]
fn doctor_checks_database_even_with_bad_tenant_table() {
    let stdout = stdout_of(tenantsync().args([
        "doctor",
        "--tenant-table",
        "orgs;x",
        "--format",
        "json",
    ]));
    let parsed: serde_json::Value = serde_json::from_str(stdout.trim()).expect("json output");
    assert_eq!(parsed["all_passed"], false);
    let checks = parsed["checks"].as_array().expect("checks");
    let statuses: Vec<(&str, &str)> = checks
        .iter()
        .map(|c| (c["name"].as_str().unwrap(), c["status"].as_str().unwrap()))
        .collect();
    assert_eq!(statuses, [("tenant table", "error"), ("database", "skipped")]);
    assert!(checks.iter().all(|c| c["message"].is_string()));
}

#[test]
fn run_help_lists_job_kinds() {
    let stdout = stdout_of(tenantsync().args(["run", "--help"]));
    for kind in ["lesson-reports", "lesson-members", "teachers", "student-subscriptions"] {
        assert!(stdout.contains(kind), "{kind} missing from:\n{stdout}");
    }
}
