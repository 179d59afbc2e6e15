use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn passbook(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("passbook").unwrap();
    cmd.env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn initialized() -> TempDir {
    let home = tempfile::tempdir().unwrap();
    let data = home.path().join("books");
    passbook(&home)
        .args(["init", "--data-dir", data.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized passbook"));
    home
}

#[test]
fn banks_lists_every_format() {
    let home = tempfile::tempdir().unwrap();
    passbook(&home)
        .arg("banks")
        .assert()
        .success()
        .stdout(predicate::str::contains("HDFC Bank"))
        .stdout(predicate::str::contains("kotak"));
}

#[test]
fn detect_reports_bank_and_preview() {
    let home = tempfile::tempdir().unwrap();
    passbook(&home)
        .args(["detect", "tests/fixtures/hdfc.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HDFC Bank"))
        .stdout(predicate::str::contains("5 transactions parsed"));
}

#[test]
fn import_requires_init() {
    let home = tempfile::tempdir().unwrap();
    passbook(&home)
        .args(["import", "tests/fixtures/hdfc.csv"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Run `passbook init`"));
}

#[test]
fn import_then_reimport_skips_duplicates() {
    let home = initialized();
    passbook(&home)
        .args(["import", "tests/fixtures/hdfc.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 5"));
    passbook(&home)
        .args(["import", "tests/fixtures/hdfc.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 duplicates"));
    passbook(&home)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("hdfc.csv"));
}

#[test]
fn import_with_forced_bank() {
    let home = initialized();
    passbook(&home)
        .args(["import", "tests/fixtures/sbi.csv", "--bank", "sbi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 4"));
    passbook(&home)
        .args(["import", "tests/fixtures/sbi.csv", "--bank", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown bank key"));
}

#[test]
fn import_rejects_unknown_layout() {
    let home = initialized();
    let file = home.path().join("mystery.csv");
    std::fs::write(&file, "When,What,How much\n2024-01-01,Coffee,100\n").unwrap();
    passbook(&home)
        .args(["import", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported statement format"));
}

#[test]
fn import_with_column_aliases() {
    let home = initialized();
    let file = home.path().join("mystery.csv");
    std::fs::write(
        &file,
        "When,What,Out,In\n2024-02-01,SWIGGY ORDER,250.00,\n2024-02-02,REFUND,,99.00\n",
    )
    .unwrap();
    let aliases = home.path().join("aliases.json");
    std::fs::write(
        &aliases,
        r#"{"name": "Mystery Bank", "columns": {"date": ["when"], "narration": ["what"], "withdrawal": ["out"], "deposit": ["in"]}}"#,
    )
    .unwrap();
    passbook(&home)
        .args([
            "import",
            file.to_str().unwrap(),
            "--columns",
            aliases.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2"));
}

#[test]
fn rules_and_categories_round_trip() {
    let home = initialized();
    passbook(&home)
        .args(["categories", "add", "Pets", "--group", "expense"])
        .assert()
        .success();
    passbook(&home)
        .args(["rules", "add", "--category", "Pets", "--keyword", "petstore", "--priority", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added rule"));
    passbook(&home)
        .args(["rules", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("petstore"));
    passbook(&home)
        .args(["rules", "add", "--category", "Nowhere", "--keyword", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown category"));
}

#[test]
fn export_writes_csv() {
    let home = initialized();
    passbook(&home)
        .args(["import", "tests/fixtures/icici.csv"])
        .assert()
        .success();
    let out = home.path().join("out.csv");
    passbook(&home)
        .args(["export", "--output", out.to_str().unwrap()])
        .assert()
        .success();
    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("id,date,narration"));
    assert_eq!(written.lines().count(), 5);
}

#[test]
fn import_reads_statement_from_stdin() {
    let home = initialized();
    let statement = std::fs::read_to_string("tests/fixtures/hdfc.csv").unwrap();
    passbook(&home)
        .args(["import", "-"])
        .write_stdin(statement)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 5 from stdin"));
}
