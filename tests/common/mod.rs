#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory that faqbot can be initialized in.
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the record database created by `faqbot init`.
    pub fn db_path(&self) -> PathBuf {
        self.path().join(".faqbot").join("records.db")
    }

    /// Initialize faqbot in this directory.
    pub fn faqbot_init(&self) {
        let output = std::process::Command::new(Self::faqbot_bin())
            .arg("init")
            .arg(self.path())
            .output()
            .expect("faqbot init failed");
        assert!(output.status.success(), "faqbot init exited with failure");
    }

    /// Insert a record straight into the database, bypassing the HTTP forms.
    pub fn add_record(&self, question: &str, answer: &str) {
        let conn = rusqlite::Connection::open(self.db_path()).expect("failed to open records db");
        conn.execute(
            "INSERT INTO records (question, answer) VALUES (?1, ?2)",
            [question, answer],
        )
        .expect("failed to insert record");
    }

    /// Return the path to the faqbot binary (built via cargo).
    pub fn faqbot_bin() -> PathBuf {
        PathBuf::from(env!("CARGO_BIN_EXE_faqbot"))
    }
}

/// Create an initialized project with a couple of stored answers.
pub fn init_project() -> TestProject {
    let project = TestProject::new();
    project.faqbot_init();
    project.add_record("what are your hours", "9 to 5");
    project.add_record("where are you located", "12 Main Street");
    project
}
