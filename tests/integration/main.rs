//! Integration tests for pack

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// `pack` with a throwaway home and no config file
    fn pack(home: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("pack");
        cmd.env("HOME", home.path())
            .env("PACK_CONFIG", home.path().join("config.toml"))
            .env("CI", "true");
        cmd
    }

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        pack(&home)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("build container images"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        pack(&home)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("pack"));
    }

    #[test]
    fn no_daemon_is_rejected() {
        let home = TempDir::new().unwrap();
        let app = TempDir::new().unwrap();
        pack(&home)
            .args(["build", "myapp", "--no-daemon", "--stack", "heroku-18", "-p"])
            .arg(app.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("must use daemon"));

        assert!(!home.path().join(".pack").exists());
    }

    #[test]
    fn build_requires_stack() {
        let home = TempDir::new().unwrap();
        let app = TempDir::new().unwrap();
        pack(&home)
            .args(["build", "myapp", "-p"])
            .arg(app.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("--stack"));
    }

    #[test]
    fn cache_path_is_stable_and_under_home() {
        let home = TempDir::new().unwrap();
        let first = pack(&home)
            .args(["cache", "path", "--path", "/src/app1"])
            .assert()
            .success()
            .stdout(predicate::str::contains(".pack/cache/"))
            .get_output()
            .stdout
            .clone();

        pack(&home)
            .args(["cache", "path", "--path", "/src/./app1/"])
            .assert()
            .success()
            .stdout(predicate::eq(first.as_slice()));

        pack(&home)
            .args(["cache", "path", "--path", "/src/app2"])
            .assert()
            .success()
            .stdout(predicate::ne(first.as_slice()));
    }

    #[test]
    fn cache_clear_without_cache() {
        let home = TempDir::new().unwrap();
        pack(&home)
            .args(["cache", "clear", "--path", "/src/app1"])
            .assert()
            .success();
    }

    #[test]
    fn config_path() {
        let home = TempDir::new().unwrap();
        pack(&home)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let home = TempDir::new().unwrap();
        pack(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[runtime]"))
            .stdout(predicate::str::contains("/var/run/docker.sock"));
    }

    #[test]
    fn config_set_then_show() {
        let home = TempDir::new().unwrap();
        pack(&home)
            .args(["config", "set", "build.default_stack", "heroku-18"])
            .assert()
            .success();

        pack(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("heroku-18"));
    }

    #[test]
    fn config_set_unknown_key() {
        let home = TempDir::new().unwrap();
        pack(&home)
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn invalid_config_reports_path() {
        let home = TempDir::new().unwrap();
        std::fs::write(home.path().join("config.toml"), "[runtime\nbinary = ").unwrap();
        pack(&home)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("config.toml"));
    }

    #[test]
    fn status_runs() {
        // May report a missing runtime, but must not panic
        let home = TempDir::new().unwrap();
        let _ = pack(&home).arg("status").assert();
    }
}
