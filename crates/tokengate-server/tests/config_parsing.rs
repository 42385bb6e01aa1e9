use std::{env, fs};

use tokengate_auth::Subject;
use tokengate_server::AppConfig;
use tokengate_server::config::{ConfigError, loader::load_config};

// Env vars are process-global; keep every env-touching assertion in this one test.
#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("tokengate.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081
body_limit_bytes = 1024

[logging]
level = "debug"

[auth]
token_secret_key = "file-secret"
token_algorithm = "HS512"
token_expire_minutes = 5

[[users]]
id = 1
email = "james@james.james"
password = "1234567"

[[users]]
id = "svc-reporter"
email = "reporter@james.james"
password = "abc"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses; unset keys keep their defaults
    let cfg = tokio_test::assert_ok!(load_config(path.to_str()));
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.server.body_limit_bytes, 1024);
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.auth.token_secret_key, "file-secret");
    assert_eq!(cfg.auth.token_algorithm, "HS512");
    assert_eq!(cfg.auth.token_expire_minutes, 5);
    assert_eq!(cfg.auth.refresh_token_expire_minutes, 43_200);
    assert!(cfg.auth.rotate_refresh_tokens);
    assert_eq!(cfg.users.len(), 2);
    assert_eq!(cfg.users[0].id, Subject::Id(1));
    assert_eq!(cfg.users[1].id, Subject::from("svc-reporter"));

    // 2) Env override should win over file
    unsafe {
        env::set_var("TOKENGATE__SERVER__PORT", "9090");
        env::set_var("TOKENGATE__AUTH__ROTATE_REFRESH_TOKENS", "false");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.server.port, 9090);
    assert!(!cfg_env.auth.rotate_refresh_tokens);
    unsafe {
        env::remove_var("TOKENGATE__SERVER__PORT");
        env::remove_var("TOKENGATE__AUTH__ROTATE_REFRESH_TOKENS");
    }

    // 3) Invalid algorithm is rejected by validation
    let bad_alg = toml_content.replace("HS512", "RS256");
    fs::write(&path, bad_alg).expect("write toml");
    let err = load_config(path.to_str()).expect_err("RS256 is not supported");
    assert!(matches!(err, ConfigError::Auth(_)));

    // 4) Refresh lifetime shorter than access lifetime is rejected
    let bad_ttl = toml_content.replace(
        "token_expire_minutes = 5",
        "token_expire_minutes = 5\nrefresh_token_expire_minutes = 1",
    );
    fs::write(&path, bad_ttl).expect("write toml");
    assert!(load_config(path.to_str()).is_err());

    // 5) Missing secret is rejected
    let no_secret = toml_content.replace("token_secret_key = \"file-secret\"", "");
    fs::write(&path, no_secret).expect("write toml");
    assert!(load_config(path.to_str()).is_err());

    // 6) Invalid log level
    let bad_level = toml_content.replace("level = \"debug\"", "level = \"shouty\"");
    fs::write(&path, bad_level).expect("write toml");
    let err = load_config(path.to_str()).expect_err("bad level");
    assert!(err.to_string().contains("logging.level"));
}

#[test]
fn bundled_sample_config_is_valid() {
    let sample = include_str!("../../../tokengate.toml");
    let cfg: AppConfig = toml::from_str(sample).expect("sample parses");
    cfg.validate().expect("sample validates");
    assert_eq!(cfg.users.len(), 4);
    assert_eq!(cfg.users[0].email, "james@james.james");
    assert_eq!(cfg.users[3].id, Subject::Id(4));
    assert_eq!(cfg.users[3].email, "james3@james.james");
}
