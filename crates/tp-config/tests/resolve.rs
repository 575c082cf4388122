use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tp_config::{
    ConfigError, ConfigSources, MapEnv, ParameterConfig, load_file, resolve, save_json, save_yaml,
};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

#[test]
fn defaults_without_sources() {
    let env = MapEnv::default();
    let cfg = resolve(&ConfigSources {
        file: None,
        dotenv: None,
        env: &env,
    })
    .unwrap();
    assert_eq!(cfg, ParameterConfig::default());
}

#[test]
fn yaml_file_fills_missing_keys_with_defaults() {
    let dir = unique_temp_dir("tp_config_partial");
    let path = dir.join("params.yaml");
    fs::write(&path, "kp: 1.5\nmax_iterations: 10\n").unwrap();

    let cfg = load_file(&path).unwrap();
    assert_eq!(cfg.kp, 1.5);
    assert_eq!(cfg.max_iterations, 10);
    assert_eq!(cfg.setpoint, 75.0);
}

#[test]
fn unknown_file_keys_are_rejected() {
    let dir = unique_temp_dir("tp_config_unknown");
    let path = dir.join("params.yaml");
    fs::write(&path, "kp: 1.0\ngain_schedule: true\n").unwrap();
    assert!(matches!(load_file(&path), Err(ConfigError::Yaml(_))));
}

#[test]
fn unsupported_extension() {
    let dir = unique_temp_dir("tp_config_ext");
    let path = dir.join("params.toml");
    fs::write(&path, "kp = 1.0").unwrap();
    assert!(matches!(
        load_file(&path),
        Err(ConfigError::UnsupportedFormat { .. })
    ));
}

#[test]
fn yaml_and_json_roundtrip() {
    let dir = unique_temp_dir("tp_config_roundtrip");
    let mut cfg = ParameterConfig::default();
    cfg.kd = 0.35;
    cfg.output_file = PathBuf::from("sweep.csv");

    let yaml = dir.join("params.yaml");
    save_yaml(&yaml, &cfg).unwrap();
    assert_eq!(load_file(&yaml).unwrap(), cfg);

    let json = dir.join("params.json");
    save_json(&json, &cfg).unwrap();
    assert_eq!(load_file(&json).unwrap(), cfg);
}

#[test]
fn save_refuses_invalid_parameters() {
    let dir = unique_temp_dir("tp_config_invalid_save");
    let cfg = ParameterConfig {
        thermal_inertia: 1.0,
        ..Default::default()
    };
    assert!(matches!(
        save_yaml(&dir.join("bad.yaml"), &cfg),
        Err(ConfigError::Sim(_))
    ));
}

#[test]
fn precedence_file_then_dotenv_then_environment() {
    let dir = unique_temp_dir("tp_config_precedence");
    let file = dir.join("params.yaml");
    fs::write(&file, "kp: 1.0\nki: 0.001\nkd: 0.5\n").unwrap();
    let dotenv = dir.join(".env");
    fs::write(&dotenv, "# overrides\nKI=0.002\nKD=0.6\n").unwrap();
    let env = MapEnv::from_pairs([("KD", "0.7")]);

    let cfg = resolve(&ConfigSources {
        file: Some(file.as_path()),
        dotenv: Some(dotenv.as_path()),
        env: &env,
    })
    .unwrap();

    assert_eq!(cfg.kp, 1.0);
    assert_eq!(cfg.ki, 0.002);
    assert_eq!(cfg.kd, 0.7);
}

#[test]
fn unparsable_environment_value_is_reported() {
    let env = MapEnv::from_pairs([("SAMPLE_TIME", "thirty")]);
    let err = resolve(&ConfigSources {
        file: None,
        dotenv: None,
        env: &env,
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
    assert!(err.to_string().contains("SAMPLE_TIME"));
}

#[test]
fn missing_dotenv_is_an_io_error() {
    let dir = unique_temp_dir("tp_config_missing_env");
    let env = MapEnv::default();
    let missing = dir.join("absent.env");
    let result = resolve(&ConfigSources {
        file: None,
        dotenv: Some(missing.as_path()),
        env: &env,
    });
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
