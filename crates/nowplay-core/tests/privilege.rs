//! The privilege check halts workflows before any command runs.

mod support;

use std::sync::Arc;

use nowplay_core::error::Stage;
use nowplay_core::orchestration::Orchestrator;
use nowplay_core::privilege::PrivilegeGuard;
use tempfile::TempDir;

use support::{FakeRunner, ScriptedPrompter, install_answers, test_settings};

fn orchestrator(temp: &TempDir, runner: &Arc<FakeRunner>, uid: u32) -> Orchestrator {
    let settings = test_settings(temp.path(), "https://example.com/now-playing.git");
    Orchestrator::new(&settings, runner.clone()).with_guard(PrivilegeGuard::with_uid(uid))
}

#[test]
fn install_as_root_executes_nothing() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::new());
    let prompter = ScriptedPrompter::new(install_answers("3", "1"));

    let err = orchestrator(&temp, &runner, 0).install(&prompter).unwrap_err();

    assert_eq!(err.stage(), Stage::PrivilegeCheck);
    assert_eq!(err.exit_code(), 10);
    assert!(runner.commands().is_empty());
    assert!(prompter.prompts().is_empty());
    assert!(!temp.path().join("home").exists());
}

#[test]
fn update_as_root_executes_nothing() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::new());
    let prompter = ScriptedPrompter::default().with_confirms(&[true]);

    let err = orchestrator(&temp, &runner, 0).update(&prompter).unwrap_err();

    assert_eq!(err.stage(), Stage::PrivilegeCheck);
    assert!(runner.commands().is_empty());
    assert!(prompter.prompts().is_empty());
}
