use gl_wrapper::program::LinkPolicy;
use gl_wrapper::SurfaceDesc;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CANVAS_ID: &str = "webgl";
pub const DEFAULT_SIZE: u32 = 640;

/// Session settings, read from an optional JSON object handed to `start`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub canvas_id: String,
    pub width: u32,
    pub height: u32,
    pub link_policy: LinkPolicyArg,
    pub log_level: LogLevelArg,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            canvas_id: DEFAULT_CANVAS_ID.to_owned(),
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            link_policy: LinkPolicyArg::Warn,
            log_level: LogLevelArg::Info,
        }
    }
}

impl SessionConfig {
    /// Parses a JSON config. `None` and blank input give the defaults.
    pub fn from_json(json: Option<&str>) -> Result<Self, ConfigError> {
        let config: SessionConfig = match json.map(str::trim) {
            None | Some("") => Self::default(),
            Some(s) => serde_json::from_str(s).map_err(ConfigError::Format)?,
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroSize(self.width, self.height));
        }

        if self.canvas_id.is_empty() {
            return Err(ConfigError::EmptyCanvasId);
        }

        Ok(())
    }

    pub fn surface(&self) -> SurfaceDesc {
        SurfaceDesc {
            element_id: self.canvas_id.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config: {0}")]
    Format(serde_json::Error),
    #[error("Surface size must be non-zero, got {0}x{1}")]
    ZeroSize(u32, u32),
    #[error("Canvas id must not be empty")]
    EmptyCanvasId,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPolicyArg {
    Warn,
    Strict,
}

impl From<LinkPolicyArg> for LinkPolicy {
    fn from(p: LinkPolicyArg) -> Self {
        match p {
            LinkPolicyArg::Warn => Self::Warn,
            LinkPolicyArg::Strict => Self::Strict,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for log::LevelFilter {
    fn from(l: LogLevelArg) -> Self {
        match l {
            LogLevelArg::Off => Self::Off,
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
            LogLevelArg::Trace => Self::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::from_json(None).unwrap();

        assert_eq!(config, SessionConfig::default());
        assert_eq!(
            config.surface(),
            SurfaceDesc {
                element_id: "webgl".to_owned(),
                width: 640,
                height: 640,
            }
        );
        assert_eq!(SessionConfig::from_json(Some("  ")).unwrap(), config);
    }

    #[test]
    fn partial_override() {
        let config =
            SessionConfig::from_json(Some(r#"{ "canvas_id": "view", "link_policy": "strict" }"#))
                .unwrap();

        assert_eq!(config.canvas_id, "view");
        assert_eq!(config.width, 640);
        assert_eq!(LinkPolicy::from(config.link_policy), LinkPolicy::Strict);
        assert_eq!(log::LevelFilter::from(config.log_level), log::LevelFilter::Info);
    }

    #[test]
    fn rejects_unknown_fields() {
        let res = SessionConfig::from_json(Some(r#"{ "fullscreen": true }"#));
        assert!(matches!(res, Err(ConfigError::Format(_))));
    }

    #[test]
    fn rejects_zero_size() {
        let res = SessionConfig::from_json(Some(r#"{ "width": 0 }"#));
        assert!(matches!(res, Err(ConfigError::ZeroSize(0, 640))));
    }
}
