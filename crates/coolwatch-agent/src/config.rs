use std::path::{Path, PathBuf};

use coolwatch_alert::settings::{AlertSettings, ArmingSettings, NotificationSettings};
use coolwatch_common::types::Measurements;
use coolwatch_notify::ChannelConfig;
use serde::Deserialize;

/// Errors raised while loading or validating the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    pub influxdb: InfluxConfig,
    pub notifiers: Vec<ChannelConfig>,
    pub notification: NotificationSettings,
    #[serde(default)]
    pub arming: ArmingSettings,
    /// Where the cross-invocation notifier state is persisted.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct InfluxConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub measurements: Measurements,
}

fn default_state_file() -> PathBuf {
    PathBuf::from("coolwatch_state.json")
}

impl AgentConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.influxdb.port == 0 {
            return Err(ConfigError::Invalid(
                "influxdb.port must be between 1 and 65535".to_string(),
            ));
        }
        if self.notifiers.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one notifier must be configured".to_string(),
            ));
        }

        let rapid = &self.notification.rapid_change_event;
        if rapid.window_minutes == 0 {
            return Err(ConfigError::Invalid(
                "notification.rapid_change_event.window_minutes must be greater than zero"
                    .to_string(),
            ));
        }
        if rapid.rise < 0.0 || rapid.drop < 0.0 {
            return Err(ConfigError::Invalid(
                "notification.rapid_change_event rise and drop must not be negative".to_string(),
            ));
        }
        if self.notification.reenable.min_rise_between_notifications < 0.0 {
            return Err(ConfigError::Invalid(
                "notification.reenable.min_rise_between_notifications must not be negative"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn alert_settings(&self) -> AlertSettings {
        AlertSettings {
            notification: self.notification.clone(),
            arming: self.arming.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    const FULL_EXAMPLE: &str = r#"
        state_file = "state/coolwatch.json"

        [influxdb]
        host = "localhost"
        port = 8086
        database = "home"

        [influxdb.measurements.indoor]
        name = "living_room"
        field = "temperature"

        [influxdb.measurements.outdoor]
        name = "garden"
        field = "temperature"

        [[notifiers]]
        type = "simplepush"
        key = "AbCdEf"

        [[notifiers]]
        type = "webhook"
        url = "https://example.com/hook"

        [notification]
        min_indoor_temperature = 18.0

        [notification.rapid_change_event]
        rise = 8.0
        drop = 8.0
        window_minutes = 60

        [notification.reenable]
        cooldown_minutes = 30
        min_rise_between_notifications = 3.0

        [arming]
        temperature_delta = 5.0
        time = "12:30"
    "#;

    fn parse(content: &str) -> AgentConfig {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn parses_full_example() {
        let config = parse(FULL_EXAMPLE);
        config.validate().unwrap();

        assert_eq!(config.influxdb.host, "localhost");
        assert_eq!(config.influxdb.port, 8086);
        assert_eq!(config.influxdb.measurements.indoor.name, "living_room");
        assert_eq!(config.influxdb.measurements.outdoor.field, "temperature");
        assert_eq!(config.notifiers.len(), 2);
        assert!(matches!(config.notifiers[0], ChannelConfig::SimplePush { .. }));
        assert_eq!(config.notification.min_indoor_temperature, 18.0);
        assert_eq!(config.notification.rapid_change_event.window_minutes, 60);
        assert_eq!(config.arming.temperature_delta, Some(5.0));
        assert_eq!(
            config.arming.time,
            Some(NaiveTime::from_hms_opt(12, 30, 0).unwrap())
        );
        assert_eq!(config.state_file, PathBuf::from("state/coolwatch.json"));
    }

    #[test]
    fn state_file_defaults_when_omitted() {
        let config = parse(&FULL_EXAMPLE.replace("state_file = \"state/coolwatch.json\"", ""));
        assert_eq!(config.state_file, PathBuf::from("coolwatch_state.json"));
    }

    #[test]
    fn arming_section_may_be_empty() {
        let without_arming = FULL_EXAMPLE
            .replace("[arming]", "")
            .replace("temperature_delta = 5.0", "")
            .replace("time = \"12:30\"", "");
        let config = parse(&without_arming);
        config.validate().unwrap();
        assert!(config.arming.temperature_delta.is_none());
        assert!(config.arming.time.is_none());
    }

    #[test]
    fn rejects_malformed_arming_time() {
        let result: Result<AgentConfig, _> =
            toml::from_str(&FULL_EXAMPLE.replace("\"12:30\"", "\"25:99\""));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_port_zero() {
        let config = parse(&FULL_EXAMPLE.replace("port = 8086", "port = 0"));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_empty_notifier_list() {
        let content = r#"
            notifiers = []

            [influxdb]
            host = "localhost"
            port = 8086
            database = "home"

            [influxdb.measurements.indoor]
            name = "living_room"
            field = "temperature"

            [influxdb.measurements.outdoor]
            name = "garden"
            field = "temperature"

            [notification]
            min_indoor_temperature = 18.0

            [notification.rapid_change_event]
            rise = 8.0
            drop = 8.0
            window_minutes = 60

            [notification.reenable]
            cooldown_minutes = 30
            min_rise_between_notifications = 3.0
        "#;
        let config = parse(content);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_width_rapid_change_window() {
        let config = parse(&FULL_EXAMPLE.replace("window_minutes = 60", "window_minutes = 0"));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
