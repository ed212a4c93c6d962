//! Integration tests for Slipway

mod cli_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn slipway() -> Command {
        Command::cargo_bin("slipway").unwrap()
    }

    /// A project directory with both lock files and a local config
    fn release_project() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("backend")).unwrap();
        fs::create_dir_all(temp.path().join("frontend")).unwrap();
        fs::write(temp.path().join("backend/Cargo.lock"), "[[package]]\n").unwrap();
        fs::write(temp.path().join("frontend/package-lock.json"), "{}").unwrap();
        fs::write(
            temp.path().join(".slipway.toml"),
            format!(
                "[registry]\nendpoint = \"registry.example.com\"\n\n[cache]\ndir = \"{}\"\n",
                temp.path().join("cache-store").display()
            ),
        )
        .unwrap();
        temp
    }

    #[test]
    fn help_displays() {
        slipway()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Release Pipeline Orchestrator"));
    }

    #[test]
    fn version_flag_displays() {
        slipway()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("slipway"));
    }

    #[test]
    fn version_resolves_from_flags() {
        slipway()
            .args(["version", "--date", "2024-05-01", "--ordinal", "7"])
            .assert()
            .success()
            .stdout(predicate::str::diff("2024.05.01-7\n"));
    }

    #[test]
    fn version_resolves_ordinal_from_env() {
        slipway()
            .args(["version", "--date", "2024-05-01"])
            .env("SLIPWAY_RUN_NUMBER", "12")
            .assert()
            .success()
            .stdout(predicate::str::diff("2024.05.01-12\n"));
    }

    #[test]
    fn version_requires_ordinal() {
        slipway()
            .args(["version", "--date", "2024-05-01"])
            .env_remove("SLIPWAY_RUN_NUMBER")
            .assert()
            .failure()
            .stderr(predicate::str::contains("SLIPWAY_RUN_NUMBER"));
    }

    #[test]
    fn version_rejects_garbage_ordinal() {
        slipway()
            .args(["version", "--date", "2024-05-01"])
            .env("SLIPWAY_RUN_NUMBER", "seven")
            .assert()
            .failure()
            .stderr(predicate::str::contains("SLIPWAY_RUN_NUMBER"));
    }

    #[test]
    fn status_runs() {
        // Individual checks may report missing tools, but the command
        // itself always completes
        slipway()
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Slipway System Status"));
    }

    #[test]
    fn config_path_displays() {
        slipway()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_displays() {
        slipway()
            .args(["config", "show", "--no-local"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[registry]"));
    }

    #[test]
    fn init_creates_local_config() {
        let temp = TempDir::new().unwrap();
        slipway()
            .args(["init", "--path"])
            .arg(temp.path())
            .assert()
            .success();
        assert!(temp.path().join(".slipway.toml").is_file());
    }

    #[test]
    fn cache_keys_lists_all_domains() {
        let project = release_project();
        slipway()
            .args(["cache", "keys", "--format", "plain"])
            .arg("--project")
            .arg(project.path())
            .current_dir(project.path())
            .assert()
            .success()
            .stdout(
                predicate::str::contains("deps-")
                    .and(predicate::str::contains("pkg-"))
                    .and(predicate::str::contains("layer-buildx")),
            );
    }

    #[test]
    fn cache_keys_fails_without_lock_files() {
        let temp = TempDir::new().unwrap();
        slipway()
            .args(["cache", "keys", "--no-local"])
            .arg("--project")
            .arg(temp.path())
            .current_dir(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("cache key source"));
    }

    #[test]
    fn run_requires_run_number() {
        let project = release_project();
        slipway()
            .arg("run")
            .current_dir(project.path())
            .env_remove("SLIPWAY_RUN_NUMBER")
            .assert()
            .failure()
            .stderr(predicate::str::contains("SLIPWAY_RUN_NUMBER"));
    }

    #[test]
    fn run_requires_registry_endpoint() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("backend")).unwrap();
        fs::create_dir_all(temp.path().join("frontend")).unwrap();
        fs::write(temp.path().join("backend/Cargo.lock"), "").unwrap();
        fs::write(temp.path().join("frontend/package-lock.json"), "").unwrap();

        slipway()
            .args(["run", "--no-local", "--config"])
            .arg(temp.path().join("absent.toml"))
            .current_dir(temp.path())
            .env("SLIPWAY_RUN_NUMBER", "7")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Registry endpoint not configured"));
    }

    #[test]
    fn run_fails_at_credentials_before_any_stage() {
        let project = release_project();
        slipway()
            .arg("run")
            .current_dir(project.path())
            .env("SLIPWAY_RUN_NUMBER", "7")
            .env_remove("AWS_ACCESS_KEY_ID")
            .env_remove("AWS_SECRET_ACCESS_KEY")
            .assert()
            .failure()
            .stderr(predicate::str::contains("AWS_ACCESS_KEY_ID"));
    }

    #[test]
    fn dry_run_prints_plan_without_tools() {
        let project = release_project();
        slipway()
            .args(["run", "--dry-run"])
            .current_dir(project.path())
            .env("SLIPWAY_RUN_NUMBER", "7")
            .env_remove("AWS_ACCESS_KEY_ID")
            .env_remove("AWS_SECRET_ACCESS_KEY")
            .assert()
            .success()
            .stdout(
                predicate::str::contains("registry.example.com/app:latest")
                    .and(predicate::str::contains("layer-buildx"))
                    .and(predicate::str::contains("miss")),
            );
    }

    #[test]
    fn dry_run_version_uses_run_number() {
        let project = release_project();
        slipway()
            .args(["run", "--dry-run"])
            .current_dir(project.path())
            .env("SLIPWAY_RUN_NUMBER", "41")
            .assert()
            .success()
            .stdout(predicate::str::contains("-41"));
    }
}
