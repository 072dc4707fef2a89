use super::*;

use std::io::Write;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = resolve_settings(None, env_from(&[]));
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.author().author_name, "Current User");
    assert!(settings.latency().read.is_zero());
}

#[test]
fn file_values_accept_strings_and_integers() {
    let file = parse_config_file(
        r#"
        seed_path = "fixtures/seed.json"
        read_latency_ms = 200
        write_latency_ms = "300"
        author_name = "Sarah Chen"
        author_reputation = 1250
        "#,
    )
    .expect("parse");
    let settings = resolve_settings(Some(&file), env_from(&[]));
    assert_eq!(settings.seed_path, PathBuf::from("fixtures/seed.json"));
    assert_eq!(settings.latency(), StoreLatency::from_millis(200, 300));
    assert_eq!(settings.author_name, "Sarah Chen");
    assert_eq!(settings.author_reputation, 1250);
}

#[test]
fn environment_overrides_file() {
    let file = parse_config_file("author_id = 4\nlog_filter = \"debug\"").expect("parse");
    let settings = resolve_settings(
        Some(&file),
        env_from(&[
            ("APP__AUTHOR_ID", "9"),
            ("COMMENTS_SEED_PATH", "legacy.json"),
            ("APP__SEED_PATH", "preferred.json"),
        ]),
    );
    assert_eq!(settings.author_id, 9);
    assert_eq!(settings.seed_path, PathBuf::from("preferred.json"));
    assert_eq!(settings.log_filter, "debug");
}

#[test]
fn unparseable_numbers_are_ignored() {
    let settings = resolve_settings(
        None,
        env_from(&[
            ("APP__READ_LATENCY_MS", "soon"),
            ("APP__AUTHOR_REPUTATION", "-5"),
        ]),
    );
    assert_eq!(settings.read_latency_ms, 0);
    assert_eq!(settings.author_reputation, 100);
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = load_settings(&dir.path().join("absent.toml")).expect("load");
    assert_eq!(settings.seed_path, Settings::default().seed_path);
}

#[test]
fn malformed_config_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "this is = = not toml").expect("write");
    let err = load_settings(file.path()).expect_err("malformed");
    assert!(format!("{err:#}").contains("failed to parse config file"));
}
