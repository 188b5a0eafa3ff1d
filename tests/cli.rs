//! End-to-end tests of the `feedledger` binary

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use feed_ledger::grid::{xlsx, CellValue, GridCoordinate};

fn feedledger(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("feedledger").unwrap();
    cmd.env("FEED_LEDGER_DATA_DIR", home)
        .env_remove("FEED_LEDGER_ACTOR")
        .env_remove("RUST_LOG");
    cmd
}

/// Initialized ledger with one farm of two ponds and one collection
fn seeded() -> TempDir {
    let home = TempDir::new().unwrap();
    feedledger(home.path()).arg("init").assert().success();
    feedledger(home.path())
        .args(["farm", "add", "Bang Pakong"])
        .assert()
        .success()
        .stdout(predicate::str::contains("farm-1"));
    for pond in ["บ่อ 1", "บ่อ 2"] {
        feedledger(home.path())
            .args(["pond", "add", "Bang Pakong", pond])
            .assert()
            .success();
    }
    feedledger(home.path())
        .args(["collection", "add", "อาหารกุ้ง"])
        .assert()
        .success();
    home
}

fn export_january(home: &Path, output: &Path) {
    feedledger(home)
        .args(["export", "-c", "feed-1", "-f", "Bang Pakong", "-p", "2021-01", "-o"])
        .arg(output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Ponds:   2"));
}

fn fill_in(path: &Path, cells: &[(u32, u32, f64)]) {
    let mut doc = xlsx::read_xlsx(path).unwrap();
    for &(row, column, amount) in cells {
        doc.set_value(GridCoordinate::new(row, column), CellValue::Number(amount));
    }
    xlsx::write_xlsx(&doc, path).unwrap();
}

fn import(home: &Path, file: &Path, mode: &str) -> assert_cmd::assert::Assert {
    feedledger(home)
        .args(["--actor", "somchai", "import"])
        .arg(file)
        .args(["-c", "อาหารกุ้ง", "-f", "1", "-m", mode])
        .assert()
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    feedledger(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("audit"));
}

#[test]
fn export_fill_import_cycle() {
    let home = seeded();
    let sheet = home.path().join("jan.xlsx");
    export_january(home.path(), &sheet);
    fill_in(&sheet, &[(3, 3, 10.0), (3, 4, 5.0)]);

    import(home.path(), &sheet, "new")
        .success()
        .stdout(predicate::str::contains("Created:          2"));

    // A fresh export carries the imported amounts
    let again = home.path().join("again.xlsx");
    export_january(home.path(), &again);
    let doc = xlsx::read_xlsx(&again).unwrap();
    assert_eq!(doc.value(GridCoordinate::new(3, 3)).as_number(), Some(10.0));
    assert_eq!(doc.value(GridCoordinate::new(3, 5)).as_number(), Some(15.0));

    feedledger(home.path())
        .args(["audit", "--limit", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE LedgerEntry"))
        .stdout(predicate::str::contains("by somchai"));
}

#[test]
fn second_new_import_is_refused_but_amend_works() {
    let home = seeded();
    let sheet = home.path().join("jan.xlsx");
    export_january(home.path(), &sheet);
    fill_in(&sheet, &[(3, 3, 10.0)]);
    import(home.path(), &sheet, "new").success();

    import(home.path(), &sheet, "new")
        .failure()
        .stderr(predicate::str::contains("already recorded"));

    fill_in(&sheet, &[(3, 3, 12.5), (4, 3, 1.0)]);
    import(home.path(), &sheet, "amend")
        .success()
        .stdout(predicate::str::contains("Updated:          1"))
        .stdout(predicate::str::contains("Created:          1"));
}

#[test]
fn bad_cell_is_reported_with_its_coordinate() {
    let home = seeded();
    let sheet = home.path().join("jan.xlsx");
    export_january(home.path(), &sheet);

    let mut doc = xlsx::read_xlsx(&sheet).unwrap();
    doc.set_value(GridCoordinate::new(5, 4), CellValue::text("abc"));
    xlsx::write_xlsx(&doc, &sheet).unwrap();

    import(home.path(), &sheet, "new")
        .failure()
        .stderr(predicate::str::contains("Invalid amount at D5"));
}

#[test]
fn adding_a_pond_makes_old_sheets_stale() {
    let home = seeded();
    let sheet = home.path().join("jan.xlsx");
    export_january(home.path(), &sheet);

    feedledger(home.path())
        .args(["pond", "add", "farm-1", "บ่อ 3"])
        .assert()
        .success();

    import(home.path(), &sheet, "new")
        .failure()
        .stderr(predicate::str::contains("Stale template"));
}

#[test]
fn unknown_farm_is_an_error() {
    let home = seeded();
    feedledger(home.path())
        .args(["export", "-c", "feed-1", "-f", "nowhere", "-p", "2021", "-o"])
        .arg(home.path().join("x.xlsx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Farm not found: nowhere"));
}
