// Loading emergency configuration from disk
use emergency_core::config::CONFIG_ENV_VAR;
use emergency_core::{EmergencyConfig, EmergencyError, FlagSet, SolveError};
use std::io::Write;
use std::sync::Arc;

const NODE_CONFIG: &str = r#"
reject_cycles = true

[indicator]
kind = "atomic"

[[dependencies]]
flag = 4
depends_on = [2]
"#;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_and_run_from_file() {
    let file = write_config(NODE_CONFIG);
    let config = EmergencyConfig::load(file.path()).unwrap();

    let aggregator = config.build_aggregator().unwrap();
    let deps = Arc::new(config.dependency_table().unwrap());
    let mut node = FlagSet::new(Arc::clone(&aggregator), deps);

    node.raise(2).unwrap();
    node.raise(4).unwrap();
    assert!(matches!(
        node.solve(4),
        Err(SolveError::DependencyActive { id: 4, .. })
    ));
    node.solve(2).unwrap();
    node.solve(4).unwrap();
    assert!(!aggregator.indicator_asserted());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = EmergencyConfig::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(EmergencyError::Io(_))));
}

#[test]
fn test_rejected_cycle_from_file() {
    let file = write_config(
        r#"
reject_cycles = true

[[dependencies]]
flag = 9
depends_on = [9]
"#,
    );
    let config = EmergencyConfig::load(file.path()).unwrap();
    assert!(matches!(
        config.dependency_table(),
        Err(EmergencyError::DependencyCycle { ref flags }) if flags == &vec![9]
    ));
}

#[test]
fn test_env_var_selects_file() {
    let file = write_config(NODE_CONFIG);
    std::env::set_var(CONFIG_ENV_VAR, file.path());
    let config = EmergencyConfig::from_env_or_default();
    std::env::remove_var(CONFIG_ENV_VAR);

    let config = config.unwrap();
    assert!(config.reject_cycles);
    assert_eq!(config.dependencies.len(), 1);

    let fallback = EmergencyConfig::from_env_or_default().unwrap();
    assert_eq!(fallback, EmergencyConfig::default());
}
