use std::collections::HashMap;
use std::path::PathBuf;

use spindle::config::{Args, Config, ConfigError, Mode};

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.address, "0.0.0.0");
    assert_eq!(cfg.port, 9898);
    assert_eq!(cfg.root, PathBuf::from("www"));
    assert_eq!(cfg.mime_types, PathBuf::from("/etc/mime.types"));
    assert_eq!(cfg.default_mime, "text/plain");
    assert_eq!(cfg.mode, Mode::Task);
}

#[test]
fn test_config_from_yaml_partial() {
    let cfg = Config::from_yaml("port: 8080\nroot: /srv/www\nmode: single\n").unwrap();

    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.root, PathBuf::from("/srv/www"));
    assert_eq!(cfg.mode, Mode::Single);
    assert_eq!(cfg.default_mime, "text/plain");
}

#[test]
fn test_config_yaml_accepts_forking_alias() {
    let cfg = Config::from_yaml("mode: forking\n").unwrap();

    assert_eq!(cfg.mode, Mode::Task);
}

#[test]
fn test_config_invalid_yaml() {
    let result = Config::from_yaml("port: not-a-port\n");

    assert!(matches!(result, Err(ConfigError::Yaml(_))));
}

#[test]
fn test_config_env_overrides() {
    let cfg = Config::default()
        .with_env(env(&[
            ("SPINDLE_PORT", "3000"),
            ("SPINDLE_ROOT", "/tmp/site"),
            ("SPINDLE_DEFAULT_MIME", "application/octet-stream"),
            ("SPINDLE_MODE", "SINGLE"),
        ]))
        .unwrap();

    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.root, PathBuf::from("/tmp/site"));
    assert_eq!(cfg.default_mime, "application/octet-stream");
    assert_eq!(cfg.mode, Mode::Single);
}

#[test]
fn test_config_env_invalid_port() {
    let result = Config::default().with_env(env(&[("SPINDLE_PORT", "eighty")]));

    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnv { name: "SPINDLE_PORT", .. })
    ));
}

#[test]
fn test_config_args_override_env() {
    let args = Args {
        port: Some(7000),
        address: Some("127.0.0.1".to_string()),
        ..Args::default()
    };
    let cfg = Config::default()
        .with_env(env(&[("SPINDLE_PORT", "3000")]))
        .unwrap()
        .with_args(&args);

    assert_eq!(cfg.address, "127.0.0.1");
    assert_eq!(cfg.port, 7000);
}

#[test]
fn test_config_parses_short_flags() {
    use clap::Parser;

    let args = Args::try_parse_from([
        "spindle", "-c", "single", "-m", "/tmp/mime.types", "-M", "text/html", "-p", "9000", "-r",
        "/srv",
    ])
    .unwrap();

    assert_eq!(args.mode, Some(Mode::Single));
    assert_eq!(args.mime_types, Some(PathBuf::from("/tmp/mime.types")));
    assert_eq!(args.default_mime.as_deref(), Some("text/html"));
    assert_eq!(args.port, Some(9000));
    assert_eq!(args.root, Some(PathBuf::from("/srv")));
}

#[test]
fn test_config_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spindle.yaml");
    std::fs::write(&path, "port: 8181\ndefault_mime: text/html\n").unwrap();

    let cfg = Config::from_file(&path).unwrap();

    assert_eq!(cfg.port, 8181);
    assert_eq!(cfg.default_mime, "text/html");
    assert!(matches!(
        Config::from_file(&dir.path().join("missing.yaml")),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn test_into_server_canonicalizes_root_and_loads_mime() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("www")).unwrap();
    let mime = dir.path().join("mime.types");
    std::fs::write(&mime, "text/html html\n").unwrap();

    let cfg = Config {
        root: dir.path().join("www").join(".").join("..").join("www"),
        mime_types: mime,
        ..Config::default()
    }
    .into_server()
    .unwrap();

    assert_eq!(cfg.root, dir.path().join("www").canonicalize().unwrap());
    assert_eq!(cfg.mime_type_for(std::path::Path::new("a.html")), "text/html");
    assert_eq!(cfg.mime_type_for(std::path::Path::new("a.bin")), "text/plain");
}

#[test]
fn test_into_server_missing_mime_table_uses_default() {
    let dir = tempfile::tempdir().unwrap();

    let cfg = Config {
        root: dir.path().to_path_buf(),
        mime_types: dir.path().join("no-such-table"),
        ..Config::default()
    }
    .into_server()
    .unwrap();

    assert!(cfg.mime_types.is_empty());
    assert_eq!(cfg.mime_type_for(std::path::Path::new("index.html")), "text/plain");
}

#[test]
fn test_into_server_rejects_bad_root() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("file.txt");
    std::fs::write(&file, "x").unwrap();

    let missing = Config {
        root: dir.path().join("missing"),
        ..Config::default()
    };
    let not_dir = Config {
        root: file,
        ..Config::default()
    };

    assert!(matches!(missing.into_server(), Err(ConfigError::Root { .. })));
    assert!(matches!(not_dir.into_server(), Err(ConfigError::RootNotDirectory(_))));
}
