//! Behavioural tests for `Provisioner` using rstest-bdd.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use geocoder_core::{DEFAULT_DATABASE_FILENAME, PostcodeService, SqlitePostcodeStore};
use geocoder_data::{DirectoryError, ProvisionReport, Provisioner};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/onspd_sample.csv");

/// Shared state for provisioning scenarios.
#[derive(Debug)]
struct ProvisionWorld {
    temp_dir: TempDir,
    target: RefCell<Option<Utf8PathBuf>>,
    reports: RefCell<Vec<ProvisionReport>>,
    directory_error: RefCell<Option<DirectoryError>>,
}

impl ProvisionWorld {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
            target: RefCell::new(None),
            reports: RefCell::new(Vec::new()),
            directory_error: RefCell::new(None),
        }
    }

    fn root(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.temp_dir.path().to_path_buf()).expect("utf-8 path")
    }

    fn target(&self) -> Utf8PathBuf {
        self.target
            .borrow()
            .clone()
            .expect("a database directory should be chosen first")
    }

    fn store(&self) -> SqlitePostcodeStore {
        SqlitePostcodeStore::open(&self.target().join(DEFAULT_DATABASE_FILENAME))
            .expect("open provisioned store")
    }
}

#[fixture]
fn world() -> ProvisionWorld {
    ProvisionWorld::new()
}

#[given("an empty database directory")]
fn given_empty_directory(world: &ProvisionWorld) {
    world.target.replace(Some(world.root().join("db")));
}

#[given("a database path that is a regular file")]
fn given_file_path(world: &ProvisionWorld) {
    let path = world.root().join("postcodes.txt");
    std::fs::write(path.as_std_path(), b"not a directory").expect("write file");
    world.target.replace(Some(path));
}

#[when("I provision the sample dataset in batches of 30")]
fn provision_sample(world: &ProvisionWorld) {
    let report = Provisioner::new(world.target(), FIXTURE)
        .expect("prepare provisioner")
        .with_per_page(30)
        .run()
        .expect("provision sample dataset");
    world.reports.borrow_mut().push(report);
}

#[when("I prepare a provisioner for that path")]
fn prepare_for_file(world: &ProvisionWorld) {
    let outcome = Provisioner::new(world.target(), FIXTURE).err();
    world.directory_error.replace(outcome);
}

#[then("the store holds 108 postcodes")]
fn then_total(world: &ProvisionWorld) {
    let service = PostcodeService::open(&world.target(), DEFAULT_DATABASE_FILENAME)
        .expect("open service");
    assert_eq!(service.total_records().expect("count"), 108);
}

#[then("the import ran in 4 batches")]
fn then_batches(world: &ProvisionWorld) {
    let reports = world.reports.borrow();
    let report = reports.last().expect("a run should be recorded");
    assert_eq!(report.batches, 4);
    assert_eq!(report.inserted, 108);
}

#[then("every row of the second import was skipped")]
fn then_skipped(world: &ProvisionWorld) {
    let reports = world.reports.borrow();
    let second = reports.get(1).expect("two runs should be recorded");
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 108);
}

fn assert_markers(world: &ProvisionWorld, expected: usize) {
    let history = world.store().import_history().expect("import history");
    assert_eq!(history.len(), expected);
    assert!(history.iter().all(|marker| marker.filename == "onspd_sample.csv"));
}

#[then("one import marker is recorded")]
fn then_one_marker(world: &ProvisionWorld) {
    assert_markers(world, 1);
}

#[then("two import markers are recorded")]
fn then_two_markers(world: &ProvisionWorld) {
    assert_markers(world, 2);
}

#[then("preparation fails with a not a directory error")]
fn then_not_a_directory(world: &ProvisionWorld) {
    let binding = world.directory_error.borrow();
    let error = binding.as_ref().expect("an error should be recorded");
    assert!(matches!(error, DirectoryError::NotADirectory { .. }));
}

#[scenario(path = "tests/features/provisioner.feature", index = 0)]
fn provisions_every_row(world: ProvisionWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/provisioner.feature", index = 1)]
fn reprovisioning_is_additive(world: ProvisionWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/provisioner.feature", index = 2)]
fn rejects_file_directory(world: ProvisionWorld) {
    let _ = world;
}
