// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sample_toml() -> &'static str {
    r#"
        max_teams = 3
        data_dir = "/var/lib/overseer"
        feature_prefix = "feature/"

        [[source_trees]]
        path = "/repo"
        develop_branch = "develop"

        [tracker]
        owner = "acme"
        repos = ["widgets"]

        [models]
        superintendent_model = "claude-opus"
        engineer_model = "claude-sonnet"
        superintendent_prompt_path = "/etc/overseer/superintendent.md"
        engineer_prompt_path = "/etc/overseer/engineer.md"
    "#
}

#[test]
fn parses_minimal_config_with_defaults() {
    let config = Config::from_toml_str(sample_toml()).unwrap();
    assert_eq!(config.max_teams, 3);
    assert_eq!(config.bash_timeout_minutes, 10);
    assert_eq!(config.idle_threshold_secs, 300);
    assert_eq!(config.dormancy_threshold_secs, 3600);
    assert_eq!(config.chatlog_max_lines, 500);
    assert_eq!(config.tracker.poll_interval_secs, 60);
    assert_eq!(config.tracker.event_poll_interval_secs, 30);
    assert_eq!(config.main_check_interval_hours, 6);
    assert_eq!(config.doc_check_interval_hours, 24);
    assert_eq!(config.agent_kill_grace_secs, 15);
}

#[test]
fn rejects_zero_max_teams() {
    let toml_str = sample_toml().replace("max_teams = 3", "max_teams = 0");
    let err = Config::from_toml_str(&toml_str).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn rejects_nonzero_dormancy_shorter_than_nonzero_idle() {
    let mut toml_str = sample_toml().to_string();
    toml_str.push_str("\ndormancy_threshold_secs = 10\nidle_threshold_secs = 300\n");
    let err = Config::from_toml_str(&toml_str).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn allows_zero_idle_threshold_to_disable_idle_tracking() {
    let mut toml_str = sample_toml().to_string();
    toml_str.push_str("\nidle_threshold_secs = 0\ndormancy_threshold_secs = 10\n");
    let config = Config::from_toml_str(&toml_str).unwrap();
    assert_eq!(config.idle_threshold_secs, 0);
}

#[test]
fn rejects_empty_source_trees() {
    let toml_str = sample_toml().replace(
        "[[source_trees]]\n        path = \"/repo\"\n        develop_branch = \"develop\"",
        "",
    );
    let err = Config::from_toml_str(&toml_str).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn rejects_empty_tracker_owner() {
    let toml_str = sample_toml().replace(r#"owner = "acme""#, r#"owner = """#);
    let err = Config::from_toml_str(&toml_str).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn rejects_malformed_toml() {
    let err = Config::from_toml_str("not = [valid").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn duration_helpers_convert_to_duration() {
    let config = Config::from_toml_str(sample_toml()).unwrap();
    assert_eq!(config.bash_timeout(), Duration::from_secs(600));
    assert_eq!(config.idle_threshold(), Duration::from_secs(300));
    assert_eq!(config.dormancy_threshold(), Duration::from_secs(3600));
    assert_eq!(config.context_reset_interval(), Duration::from_secs(7200));
    assert_eq!(config.agent_kill_grace(), Duration::from_secs(15));
}
