use super::*;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_local_frontend_setup() {
    let settings = Settings::default();
    assert_eq!(settings.server_bind, "127.0.0.1:8000");
    assert_eq!(settings.allowed_origins, vec!["http://localhost:5173"]);
    assert!(!settings.allows_any_origin());
}

#[test]
fn file_overrides_bind_and_origins() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"
bind_addr = "0.0.0.0:9000"
allowed_origins = "https://fares.example, *"
max_body_bytes = "2048"
"#,
    );
    assert_eq!(settings.server_bind, "0.0.0.0:9000");
    assert_eq!(settings.allowed_origins, vec!["https://fares.example", "*"]);
    assert!(settings.allows_any_origin());
    assert_eq!(settings.max_body_bytes, 2048);
}

#[test]
fn unreadable_file_leaves_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "bind_addr = [1, 2");
    assert_eq!(settings, Settings::default());
}

#[test]
fn prefixed_env_wins_over_plain_env() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("SERVER_BIND", "127.0.0.1:7000"),
            ("APP__BIND_ADDR", "127.0.0.1:7001"),
            ("APP__MAX_BODY_BYTES", "not-a-number"),
        ]),
    );
    assert_eq!(settings.server_bind, "127.0.0.1:7001");
    assert_eq!(settings.max_body_bytes, Settings::default().max_body_bytes);
}

#[test]
fn env_origins_drop_blank_entries() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[("APP__ALLOWED_ORIGINS", " http://a.test , ,http://b.test")]),
    );
    assert_eq!(settings.allowed_origins, vec!["http://a.test", "http://b.test"]);
}
