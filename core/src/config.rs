//! Desk configuration.
//!
//! `DeskConfig` is process-level and read from a JSON file at startup.
//! `AssignmentConfig` is the admin-editable singleton persisted by the
//! assignment store.

use crate::{
    duplicate::DEFAULT_DUPLICATE_THRESHOLD,
    error::{DeskError, DeskResult},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentConfig {
    /// Queue age cutoff in days, 1–90.
    #[serde(default = "default_review_window_days")]
    pub review_window_days: u32,
    /// 0–100. Advisory only: nothing auto-approves on it yet.
    #[serde(default = "default_auto_assign_threshold")]
    pub auto_assign_threshold: f64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_review_window_days() -> u32 { 20 }
fn default_auto_assign_threshold() -> f64 { 85.0 }
fn default_true() -> bool { true }

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            review_window_days: default_review_window_days(),
            auto_assign_threshold: default_auto_assign_threshold(),
            enabled: true,
        }
    }
}

impl AssignmentConfig {
    pub fn validate(&self) -> DeskResult<()> {
        if !(1..=90).contains(&self.review_window_days) {
            return Err(DeskError::Validation(format!(
                "review_window_days must be between 1 and 90, got {}",
                self.review_window_days
            )));
        }
        if !(0.0..=100.0).contains(&self.auto_assign_threshold) {
            return Err(DeskError::Validation(format!(
                "auto_assign_threshold must be between 0 and 100, got {}",
                self.auto_assign_threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskConfig {
    /// SQLite path, or ":memory:".
    pub database_path: String,
    pub min_description_length: usize,
    pub duplicate_threshold: f64,
    pub audit_log_default_limit: usize,
    pub audit_log_max_limit: usize,
    /// Seeds the assignment config when none has been persisted.
    #[serde(default)]
    pub default_assignment: AssignmentConfig,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            database_path: "grievance_desk.db".into(),
            min_description_length: 20,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            audit_log_default_limit: 100,
            audit_log_max_limit: 500,
            default_assignment: AssignmentConfig::default(),
        }
    }
}

impl DeskConfig {
    /// Load from a JSON file. Missing keys are an error, except
    /// `default_assignment`.
    /// In tests, use DeskConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DeskConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_test() -> Self {
        Self {
            database_path: ":memory:".into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.duplicate_threshold) {
            anyhow::bail!(
                "duplicate_threshold must be between 0 and 1, got {}",
                self.duplicate_threshold
            );
        }
        if self.audit_log_default_limit > self.audit_log_max_limit {
            anyhow::bail!("audit_log_default_limit exceeds audit_log_max_limit");
        }
        self.default_assignment.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_admin_expectations() {
        let c = AssignmentConfig::default();
        assert_eq!(c.review_window_days, 20);
        assert_eq!(c.auto_assign_threshold, 85.0);
        assert!(c.enabled);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn review_window_bounds_enforced() {
        for days in [0, 91] {
            let c = AssignmentConfig { review_window_days: days, ..Default::default() };
            assert!(matches!(c.validate(), Err(DeskError::Validation(_))));
        }
        let c = AssignmentConfig { review_window_days: 90, ..Default::default() };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn threshold_bounds_enforced() {
        let c = AssignmentConfig { auto_assign_threshold: 100.5, ..Default::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn partial_assignment_json_uses_defaults() {
        let c: AssignmentConfig = serde_json::from_str(r#"{"review_window_days": 7}"#).unwrap();
        assert_eq!(c.review_window_days, 7);
        assert_eq!(c.auto_assign_threshold, 85.0);
        assert!(c.enabled);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = DeskConfig::load("/nonexistent/desk.json").unwrap_err();
        assert!(err.to_string().contains("Cannot read"));
    }
}
