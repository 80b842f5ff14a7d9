//! Update: stop, resync, optional interpreter refresh, unit left stopped.

mod support;

use std::fs;
use std::sync::Arc;

use nowplay_core::error::Stage;
use nowplay_core::orchestration::Orchestrator;
use nowplay_core::privilege::PrivilegeGuard;
use nowplay_core::service::{ServiceUnitManager, UnitState};
use nowplay_core::settings::ProvisionSettings;
use tempfile::TempDir;

use support::git::{commit_all, file_url, init_upstream};
use support::{FakeRunner, ScriptedPrompter, install_answers, test_settings};

struct Fixture {
    temp: TempDir,
    upstream: git2::Repository,
    settings: ProvisionSettings,
    runner: Arc<FakeRunner>,
}

impl Fixture {
    /// Installed and running.
    fn installed() -> Self {
        let temp = TempDir::new().unwrap();
        let upstream_path = temp.path().join("upstream");
        let upstream = init_upstream(&upstream_path);
        let settings = test_settings(temp.path(), &file_url(&upstream_path));
        let fx = Self {
            temp,
            upstream,
            settings,
            runner: Arc::new(FakeRunner::new()),
        };
        fx.orchestrator()
            .install(&ScriptedPrompter::new(install_answers("3", "1")))
            .unwrap();
        fx.runner.clear_log();
        fx
    }

    fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(&self.settings, self.runner.clone())
            .with_guard(PrivilegeGuard::with_uid(1000))
    }

    fn units(&self) -> ServiceUnitManager {
        ServiceUnitManager::from_settings(&self.settings.service, self.runner.clone())
    }
}

#[test]
fn update_stops_before_fetch_and_leaves_unit_stopped() {
    let fx = Fixture::installed();
    assert!(fx.runner.unit_active());

    let report = fx
        .orchestrator()
        .update(&ScriptedPrompter::default().with_confirms(&[false]))
        .unwrap();

    assert!(report.stopped_service);
    assert!(!report.refreshed_dependencies);
    assert_eq!(report.unit_name, "now-playing.service");
    assert!(fx.runner.violations().is_empty());

    let stop = fx.runner.position("sudo systemctl stop").unwrap();
    let fetch = fx.runner.position("git fetch").unwrap();
    assert!(stop < fetch);
    assert_eq!(fx.runner.count("sudo systemctl start"), 0);
    assert_eq!(fx.units().state().unwrap(), UnitState::Installed);
}

#[test]
fn update_picks_up_upstream_and_discards_local_edits() {
    let fx = Fixture::installed();
    let root = fx.settings.layout().root().to_path_buf();
    fs::write(root.join("src/now_playing.py"), "print('hacked')\n").unwrap();

    let upstream_path = fx.temp.path().join("upstream");
    fs::write(upstream_path.join("src/now_playing.py"), "print('v2')\n").unwrap();
    let new_head = commit_all(&fx.upstream, "v2");

    let report = fx
        .orchestrator()
        .update(&ScriptedPrompter::default().with_confirms(&[false]))
        .unwrap();

    assert_eq!(report.commit, new_head.to_string());
    assert_eq!(
        fs::read_to_string(root.join("src/now_playing.py")).unwrap(),
        "print('v2')\n"
    );
    assert!(fx.settings.layout().config_file().is_file());
}

#[test]
fn refresh_runs_only_when_confirmed() {
    let fx = Fixture::installed();

    fx.orchestrator()
        .update(&ScriptedPrompter::default().with_confirms(&[false]))
        .unwrap();
    assert_eq!(fx.runner.count(&fx.settings.interpreter.venv_pip().display().to_string()), 0);

    let report = fx
        .orchestrator()
        .update(&ScriptedPrompter::default().with_confirms(&[true]))
        .unwrap();
    assert!(report.refreshed_dependencies);
    assert_eq!(fx.runner.count(&fx.settings.interpreter.venv_pip().display().to_string()), 2);
    assert_eq!(fx.runner.count("sudo apt-get"), 0);
}

#[test]
fn update_without_installation_fails_at_repository() {
    let temp = TempDir::new().unwrap();
    let settings = test_settings(temp.path(), "https://example.com/now-playing.git");
    let runner = Arc::new(FakeRunner::new());

    let err = Orchestrator::new(&settings, runner.clone())
        .with_guard(PrivilegeGuard::with_uid(1000))
        .update(&ScriptedPrompter::default().with_confirms(&[false]))
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Repository);
    assert_eq!(err.exit_code(), 14);
    assert!(format!("{:#}", anyhow::Error::new(err)).contains("run install first"));
    assert!(runner.commands().is_empty());
}

#[test]
fn stop_failure_is_tagged_and_skips_fetch() {
    let fx = Fixture::installed();
    fx.runner.fail_on("systemctl stop");

    let err = fx
        .orchestrator()
        .update(&ScriptedPrompter::default().with_confirms(&[false]))
        .unwrap_err();

    assert_eq!(err.stage(), Stage::ServiceStop);
    assert_eq!(err.exit_code(), 20);
    assert_eq!(fx.runner.count("git fetch"), 0);
}
