//! Integration tests for the packager binary

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use flate2::read::GzDecoder;
    use predicates::prelude::*;
    use sha2::{Digest, Sha256};
    use std::fs::{self, File};
    use std::path::Path;
    use tempfile::TempDir;

    const ARTIFACT: &[u8] = b"dependency payload";

    fn packager() -> Command {
        let mut cmd = cargo_bin_cmd!("buildpack-packager");
        cmd.env_remove("BP_DEBUG");
        cmd
    }

    fn write_buildpack(root: &Path, source: &Path, pre_package: Option<&str>) {
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::write(root.join("bin/detect"), "#!/bin/sh\nexit 0\n").unwrap();

        let artifact = source.join("payload.tgz");
        fs::write(&artifact, ARTIFACT).unwrap();

        let hook = pre_package
            .map(|c| format!("pre_package = \"{c}\"\n"))
            .unwrap_or_default();
        fs::write(
            root.join("buildpack.toml"),
            format!(
                r#"
[buildpack]
id = "com.example.buildpack"
name = "Example Buildpack"
version = "1.2.3"

[metadata]
include_files = ["buildpack.toml", "bin/detect"]
{hook}
[[metadata.dependencies]]
id = "payload"
name = "Payload"
version = "1.0.0"
uri = "file://{uri}"
sha256 = "{sha}"
"#,
                uri = artifact.display(),
                sha = hex::encode(Sha256::digest(ARTIFACT)),
            ),
        )
        .unwrap();
    }

    #[test]
    fn help_displays() {
        packager()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Package a buildpack"));
    }

    #[test]
    fn version_displays() {
        packager()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("buildpack-packager"));
    }

    #[test]
    fn missing_manifest() {
        let dir = TempDir::new().unwrap();
        packager()
            .current_dir(dir.path())
            .arg("out")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Buildpack manifest not found"));
    }

    #[test]
    fn missing_output_dir() {
        let root = TempDir::new().unwrap();
        let source = TempDir::new().unwrap();
        write_buildpack(root.path(), source.path(), None);

        packager()
            .current_dir(root.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Missing required argument: output directory",
            ));
    }

    #[test]
    fn packages_buildpack() {
        let root = TempDir::new().unwrap();
        let source = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_buildpack(root.path(), source.path(), None);

        packager()
            .current_dir(root.path())
            .arg(out.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "-----> Packaging Example Buildpack 1.2.3",
            ))
            .stdout(predicate::str::contains("Caching Payload 1.0.0"))
            .stdout(predicate::str::contains("Adding bin/detect"))
            .stderr(predicate::str::is_empty());

        let archive = out.path().join(
            "com/example/buildpack/com.example.buildpack/1.2.3/com.example.buildpack-1.2.3.tgz",
        );
        let mut tar = tar::Archive::new(GzDecoder::new(File::open(&archive).unwrap()));
        let names: Vec<String> = tar
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().display().to_string())
            .collect();

        let sha = hex::encode(Sha256::digest(ARTIFACT));
        assert_eq!(
            names,
            vec![
                "buildpack.toml".to_string(),
                "bin/detect".to_string(),
                format!("dependency-cache/{sha}/payload.tgz"),
                format!("dependency-cache/{sha}/dependency.toml"),
            ]
        );
    }

    #[test]
    fn debug_logging_goes_to_stderr() {
        let root = TempDir::new().unwrap();
        let source = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_buildpack(root.path(), source.path(), None);

        packager()
            .current_dir(root.path())
            .env("BP_DEBUG", "1")
            .arg(out.path())
            .assert()
            .success()
            .stderr(predicate::str::contains("DEBUG"));
    }

    #[test]
    fn failing_pre_package_creates_no_archive() {
        let root = TempDir::new().unwrap();
        let source = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_buildpack(root.path(), source.path(), Some("false"));

        packager()
            .current_dir(root.path())
            .arg(out.path())
            .assert()
            .failure()
            .stdout(predicate::str::contains("Pre-Package with false"))
            .stderr(predicate::str::contains("Pre-package command false exited"));

        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn checksum_mismatch_fails() {
        let root = TempDir::new().unwrap();
        let source = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_buildpack(root.path(), source.path(), None);
        fs::write(source.path().join("payload.tgz"), b"tampered").unwrap();

        packager()
            .current_dir(root.path())
            .arg(out.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Checksum mismatch for payload"))
            .stderr(predicate::str::contains("Hint:"));

        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }
}
