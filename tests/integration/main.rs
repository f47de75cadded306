//! Integration tests for cache-locator

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A workspace with an isolated config that disables shared cache probing
    struct Fixture {
        temp: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            std::fs::write(
                temp.path().join("config.toml"),
                "[shared_cache]\nenabled = false\n",
            )
            .unwrap();
            Self { temp }
        }

        fn config(&self) -> PathBuf {
            self.temp.path().join("config.toml")
        }

        fn listing(&self, json: &str) -> PathBuf {
            let path = self.temp.path().join("lsblk.json");
            std::fs::write(&path, json).unwrap();
            path
        }

        fn volume(&self, name: &str) -> PathBuf {
            let path = self.temp.path().join(name);
            std::fs::create_dir_all(&path).unwrap();
            path
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("cache-locator");
            cmd.env("CACHE_LOCATOR_CONFIG", self.config());
            cmd
        }
    }

    fn nvme_listing(mountpoints: &[(&str, &str, &Path)]) -> String {
        let devices: Vec<String> = mountpoints
            .iter()
            .map(|(name, size, mp)| {
                format!(
                    r#"{{"name":"{}", "type":"disk", "size":"{}", "tran":"nvme", "mountpoint":"{}"}}"#,
                    name,
                    size,
                    mp.display()
                )
            })
            .collect();
        format!(r#"{{"blockdevices": [{}]}}"#, devices.join(","))
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("cache-locator")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("best local cache directory"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("cache-locator")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("cache-locator"));
    }

    #[test]
    fn resolve_picks_nvme_volume() {
        let fx = Fixture::new();
        let small = fx.volume("small");
        let large = fx.volume("large");
        let listing = fx.listing(&nvme_listing(&[
            ("nvme0n1", "3.5T", &large),
            ("nvme1n1", "1.7T", &small),
        ]));

        fx.cmd()
            .args(["resolve", "--listing"])
            .arg(&listing)
            .assert()
            .success()
            .stdout(format!("{}\n", large.join("jfsCache").display()));
    }

    #[test]
    fn resolve_falls_back_to_default() {
        let fx = Fixture::new();
        let listing = fx.listing(
            r#"{"blockdevices": [
                {"name":"sda", "type":"disk", "size":"1.8T", "tran":"sata", "mountpoint":"/"}
            ]}"#,
        );

        fx.cmd()
            .args(["resolve", "--listing"])
            .arg(&listing)
            .assert()
            .success()
            .stdout("/var/jfsCache\n");
    }

    #[test]
    fn resolve_survives_garbage_listing() {
        let fx = Fixture::new();
        let listing = fx.listing("lsblk: not json");

        fx.cmd()
            .args(["resolve", "--format", "json", "--listing"])
            .arg(&listing)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"/var/jfsCache\""));
    }

    #[test]
    fn devices_table_shows_selection() {
        let fx = Fixture::new();
        let data = fx.volume("data");
        let listing = fx.listing(&nvme_listing(&[("nvme0n1", "1.7T", &data)]));

        fx.cmd()
            .args(["devices", "--listing"])
            .arg(&listing)
            .assert()
            .success()
            .stdout(predicate::str::contains("nvme0n1"))
            .stdout(predicate::str::contains("Selected NVMe mountpoint"));
    }

    #[test]
    fn devices_rejects_malformed_listing() {
        let fx = Fixture::new();
        let listing = fx.listing("{ broken");

        fx.cmd()
            .args(["devices", "--listing"])
            .arg(&listing)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Malformed device listing"));
    }

    #[test]
    fn shared_respects_disabled_probe() {
        let fx = Fixture::new();
        fx.cmd()
            .arg("shared")
            .assert()
            .success()
            .stdout(predicate::str::contains("disabled"));
    }

    #[test]
    fn config_path() {
        let fx = Fixture::new();
        fx.cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let fx = Fixture::new();
        fx.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[discovery]"))
            .stdout(predicate::str::contains("enabled = false"));
    }

    #[test]
    fn config_init_writes_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fresh").join("config.toml");

        cargo_bin_cmd!("cache-locator")
            .env("CACHE_LOCATOR_CONFIG", &path)
            .args(["config", "init"])
            .assert()
            .success();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("default_dir = \"/var/jfsCache\""));
    }
}
