// tests/config_loading.rs

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use tempfile::tempdir;

use quietshell::config::{LauncherConfig, load_and_validate};
use quietshell::errors::QuietShellError;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn empty_file_gives_defaults() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("QuietShell.toml");
    fs::write(&path, "")?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg, LauncherConfig::default());
    assert_eq!(cfg.log.max_size_mb, 2);
    assert_eq!(cfg.log.max_backups, 10);
    assert_eq!(cfg.host_executable(), "pwsh");
    Ok(())
}

#[test]
fn values_are_read_from_all_sections() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("QuietShell.toml");
    fs::write(
        &path,
        r#"
[engine]
process_executable = "/opt/microsoft/powershell/7/pwsh"
host_executable = "/usr/local/bin/pwsh"

[log]
directory = "/var/log/quietshell"
max_size_mb = 5
max_backups = 3
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.process_executable(), "/opt/microsoft/powershell/7/pwsh");
    assert_eq!(cfg.host_executable(), "/usr/local/bin/pwsh");
    assert_eq!(cfg.log.directory, Some(PathBuf::from("/var/log/quietshell")));
    assert_eq!(cfg.log.max_size_mb, 5);
    assert_eq!(cfg.log.max_backups, 3);
    Ok(())
}

#[test]
fn zero_sizes_are_rejected() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("QuietShell.toml");

    fs::write(&path, "[log]\nmax_size_mb = 0\n")?;
    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, QuietShellError::Config(_)));
    assert_eq!(err.exit_code(), -1);

    fs::write(&path, "[log]\nmax_backups = 0\n")?;
    assert!(matches!(
        load_and_validate(&path).unwrap_err(),
        QuietShellError::Config(_)
    ));
    Ok(())
}

#[test]
fn blank_executable_is_rejected() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("QuietShell.toml");
    fs::write(&path, "[engine]\nhost_executable = \"  \"\n")?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(err.to_string().contains("host_executable"));
    Ok(())
}

#[test]
fn malformed_toml_is_a_parse_error() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("QuietShell.toml");
    fs::write(&path, "[log\nmax_size_mb = ")?;

    assert!(matches!(
        load_and_validate(&path).unwrap_err(),
        QuietShellError::Toml(_)
    ));
    Ok(())
}
