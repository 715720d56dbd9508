//! Engine configuration

use crate::EngineError;
use dispatch::DispatcherConfig;
use face_signals::SignalConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Detection engine configuration.
///
/// Immutable for the lifetime of a session; changing anything means stopping
/// the session and starting a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EngineConfig {
    /// Seconds between inference passes. Frames between passes reuse the
    /// previous detections for display.
    pub detection_interval_seconds: f64,
    /// Continuous occupancy required before a zone is confirmed present
    pub presence_threshold_seconds: u64,
    /// Continuous vacancy required before a zone is confirmed absent
    pub absence_threshold_seconds: u64,
    /// Minimum detection confidence; detections below it are discarded
    pub confidence_threshold: f32,
    /// Run landmark-based face analysis on detected persons
    pub enable_face_analysis: bool,
    /// Restrict face analysis to persons whose center lies inside a zone
    pub face_analysis_roi_only: bool,
    /// Smoothed EAR above this means eyes open
    pub ear_threshold: f32,
    /// Smoothed MAR above this means speaking
    pub mar_speak_threshold: f32,
    /// Smoothed MAR above this means mouth wide open
    pub mar_open_threshold: f32,
    /// Lower-face mask-color pixel fraction above this flags a device
    pub ventilator_detection_threshold: f32,
    /// Webhook endpoint URL; `None` disables outbound notifications
    pub webhook_endpoint: Option<String>,
    /// Minimum seconds between sad-expression notifications per zone
    pub sad_expression_cooldown_seconds: u64,
    /// JPEG quality for streamed frames
    pub jpeg_quality: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detection_interval_seconds: 1.0,
            presence_threshold_seconds: 5,
            absence_threshold_seconds: 3,
            confidence_threshold: 0.5,
            enable_face_analysis: false,
            face_analysis_roi_only: false,
            ear_threshold: 0.21,
            mar_speak_threshold: 0.3,
            mar_open_threshold: 0.5,
            ventilator_detection_threshold: 0.3,
            webhook_endpoint: None,
            sad_expression_cooldown_seconds: 10,
            jpeg_quality: 80,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a file, with `ZONEWATCH_`-prefixed
    /// environment variables overriding file values.
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("ZONEWATCH"))
            .build()?;
        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations that would make the loop or the state
    /// machines misbehave.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.detection_interval_seconds.is_finite() || self.detection_interval_seconds <= 0.0 {
            return Err(EngineError::Config(
                "detection_interval_seconds must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(EngineError::Config(
                "confidence_threshold must be within [0, 1]".to_string(),
            ));
        }
        if self.ear_threshold <= 0.0 {
            return Err(EngineError::Config(
                "ear_threshold must be positive".to_string(),
            ));
        }
        if self.mar_speak_threshold >= self.mar_open_threshold {
            return Err(EngineError::Config(
                "mar_speak_threshold must be below mar_open_threshold".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.ventilator_detection_threshold) {
            return Err(EngineError::Config(
                "ventilator_detection_threshold must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    pub fn detection_interval(&self) -> Duration {
        Duration::from_secs_f64(self.detection_interval_seconds)
    }

    pub fn presence_threshold(&self) -> Duration {
        Duration::from_secs(self.presence_threshold_seconds)
    }

    pub fn absence_threshold(&self) -> Duration {
        Duration::from_secs(self.absence_threshold_seconds)
    }

    pub fn signal_config(&self) -> SignalConfig {
        SignalConfig {
            ear_threshold: self.ear_threshold,
            mar_speak_threshold: self.mar_speak_threshold,
            mar_open_threshold: self.mar_open_threshold,
            ventilator_threshold: self.ventilator_detection_threshold,
        }
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            endpoint: self.webhook_endpoint.clone(),
            signal_cooldown: Duration::from_secs(self.sad_expression_cooldown_seconds),
            ..DispatcherConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.detection_interval_seconds, 1.0);
        assert_eq!(cfg.presence_threshold_seconds, 5);
        assert_eq!(cfg.absence_threshold_seconds, 3);
        assert_eq!(cfg.confidence_threshold, 0.5);
        assert!(!cfg.enable_face_analysis);
        assert!(cfg.webhook_endpoint.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let cfg = EngineConfig {
            detection_interval_seconds: 0.0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_confidence() {
        let cfg = EngineConfig {
            confidence_threshold: 1.5,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_mar_thresholds() {
        let cfg = EngineConfig {
            mar_speak_threshold: 0.6,
            mar_open_threshold: 0.5,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let result: Result<EngineConfig, _> =
            serde_json::from_str(r#"{"detection_interval": 1.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"detection_interval_seconds": 0.5}"#).unwrap();
        assert_eq!(cfg.detection_interval_seconds, 0.5);
        assert_eq!(cfg.presence_threshold_seconds, 5);
    }

    #[test]
    fn test_dispatcher_config_carries_cooldown() {
        let cfg = EngineConfig {
            webhook_endpoint: Some("http://localhost:9000/hook".to_string()),
            sad_expression_cooldown_seconds: 20,
            ..EngineConfig::default()
        };
        let dc = cfg.dispatcher_config();
        assert_eq!(dc.endpoint.as_deref(), Some("http://localhost:9000/hook"));
        assert_eq!(dc.signal_cooldown, Duration::from_secs(20));
    }
}
