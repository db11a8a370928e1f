use clap::Parser;
use serial_test::serial;
use std::env;
use std::fs::write;
use tempfile::NamedTempFile;
use webotron::cli::{Cli, GlobalArgs};
use webotron::load_config::{load_config, FileConfig, Settings};

const ENV_KEYS: [&str; 4] = [
    "WEBOTRON_PROFILE",
    "WEBOTRON_REGION",
    "WEBOTRON_ENDPOINT_URL",
    "WEBOTRON_CONFIG",
];

fn clear_env() {
    for key in ENV_KEYS {
        env::remove_var(key);
    }
}

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).expect("write config");
    file
}

#[test]
#[serial]
fn loads_all_keys_from_yaml() {
    let file = config_file(
        "profile: personal\nregion: us-east-2\nendpoint_url: http://localhost:4566\n",
    );

    let config = load_config(file.path()).expect("Config should load");

    assert_eq!(
        config,
        FileConfig {
            profile: Some("personal".to_string()),
            region: Some("us-east-2".to_string()),
            endpoint_url: Some("http://localhost:4566".to_string()),
        }
    );
}

#[test]
#[serial]
fn empty_yaml_is_all_defaults() {
    let file = config_file("\n");
    assert_eq!(load_config(file.path()).unwrap(), FileConfig::default());
}

#[test]
#[serial]
fn unknown_keys_are_rejected() {
    let file = config_file("regoin: us-east-2\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(
        err.to_string().contains("Failed to parse config YAML"),
        "got {err}"
    );
}

#[test]
#[serial]
fn flags_override_file_values() {
    let args = GlobalArgs {
        region: Some("eu-west-1".to_string()),
        ..GlobalArgs::default()
    };
    let file = FileConfig {
        profile: Some("personal".to_string()),
        region: Some("us-east-2".to_string()),
        endpoint_url: None,
    };

    let settings = Settings::merge(&args, file);

    assert_eq!(settings.region.as_deref(), Some("eu-west-1"));
    assert_eq!(settings.profile.as_deref(), Some("personal"));
    assert_eq!(settings.endpoint_url, None);
}

#[test]
#[serial]
fn environment_feeds_global_arguments() {
    clear_env();
    let file = config_file("profile: from-file\nregion: us-west-2\n");
    env::set_var("WEBOTRON_REGION", "ap-southeast-2");
    env::set_var("WEBOTRON_CONFIG", file.path());

    let cli = Cli::try_parse_from(["webotron", "list-buckets"]).expect("arguments parse");
    let settings = Settings::resolve(&cli.global).expect("settings resolve");
    clear_env();

    assert_eq!(settings.region.as_deref(), Some("ap-southeast-2"));
    assert_eq!(settings.profile.as_deref(), Some("from-file"));
}
