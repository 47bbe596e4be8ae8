//! Shared primitive types used across the grievance desk.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable, unique identifier for a complaint (`CSP-YYYYMMDD-XXXXXX`).
pub type ComplaintId = String;

/// Grievance categories a citizen can file under.
/// Declaration order is the iteration order for every keyword table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Road,
    Water,
    Electricity,
    Sanitation,
    HealthSafety,
    Others,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Road,
        Category::Water,
        Category::Electricity,
        Category::Sanitation,
        Category::HealthSafety,
        Category::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Road         => "road",
            Self::Water        => "water",
            Self::Electricity  => "electricity",
            Self::Sanitation   => "sanitation",
            Self::HealthSafety => "health_safety",
            Self::Others       => "others",
        }
    }

    /// Human label used in explanations, e.g. "Health Safety".
    pub fn title(&self) -> &'static str {
        match self {
            Self::Road         => "Road",
            Self::Water        => "Water",
            Self::Electricity  => "Electricity",
            Self::Sanitation   => "Sanitation",
            Self::HealthSafety => "Health Safety",
            Self::Others       => "Others",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High   => "high",
            Self::Medium => "medium",
            Self::Low    => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high"   => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low"    => Some(Self::Low),
            _        => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a complaint as owned by the grievance store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Submitted,
    Assigned,
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted  => "submitted",
            Self::Assigned   => "assigned",
            Self::InProgress => "in_progress",
            Self::Resolved   => "resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "submitted"   => Some(Self::Submitted),
            "assigned"    => Some(Self::Assigned),
            "in_progress" => Some(Self::InProgress),
            "resolved"    => Some(Self::Resolved),
            _             => None,
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated admin performing a workflow action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub id:    String,
    pub email: String,
    pub role:  String,
    pub name:  Option<String>,
}

impl Principal {
    /// Name recorded in the audit log: the display name, else the email,
    /// else "Admin".
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ if !self.email.trim().is_empty() => self.email.clone(),
            _ => "Admin".to_string(),
        }
    }
}
