//! Shared types for awsnav
//!
//! This crate contains data structures used across multiple awsnav crates.

use chrono::{DateTime, Utc};
use colored::Color;

// ============================================================================
// Profile Types
// ============================================================================

/// An SSO-enabled profile discovered in the shared AWS config file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileInfo {
    pub name: String,
    pub region: Option<String>,
    pub sso_account_id: Option<String>,
    pub sso_role_name: Option<String>,
}

impl ProfileInfo {
    pub fn new(name: String) -> Self {
        Self {
            name,
            region: None,
            sso_account_id: None,
            sso_role_name: None,
        }
    }
}

// ============================================================================
// EC2 Types
// ============================================================================

/// EC2 instance information
#[derive(Clone, Debug, Default)]
pub struct InstanceInfo {
    pub id: String,
    pub name: Option<String>,
    pub state: String,
    pub instance_type: String,
    pub availability_zone: Option<String>,
    pub public_ip: Option<String>,
    pub private_ip: Option<String>,
    pub vpc_id: Option<String>,
    pub subnet_id: Option<String>,
    pub security_groups: Vec<String>,
    pub key_name: Option<String>,
    pub image_id: Option<String>,
    pub launch_time: Option<DateTime<Utc>>,
}

impl InstanceInfo {
    /// Name tag if present, otherwise the instance id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

// ============================================================================
// ECS Types
// ============================================================================

/// ECS service detail
#[derive(Clone, Debug)]
pub struct ServiceDetail {
    pub name: String,
    pub status: String,
    pub task_definition: String,
    pub desired_count: i32,
    pub running_count: i32,
    pub pending_count: i32,
    pub launch_type: String,
}

/// One task of an ECS service
#[derive(Clone, Debug)]
pub struct TaskSummary {
    pub id: String,
    pub arn: String,
    pub last_status: String,
    pub desired_status: String,
    pub health_status: String,
    pub containers: Vec<String>,
}

/// A container with an awslogs log group resolved from its task definition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerLogSource {
    pub container: String,
    pub log_group: String,
}

// ============================================================================
// API Gateway Types
// ============================================================================

#[derive(Clone, Debug)]
pub struct ApiInfo {
    pub id: String,
    pub name: String,
    pub protocol: String,
}

#[derive(Clone, Debug)]
pub struct RouteInfo {
    pub id: String,
    pub route_key: String,
    pub target: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AuthorizerInfo {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct IntegrationInfo {
    pub id: String,
    pub integration_type: String,
    pub uri: Option<String>,
}

// ============================================================================
// Service Catalog Types
// ============================================================================

#[derive(Clone, Debug)]
pub struct ProductInfo {
    pub id: String,
    pub name: String,
    pub owner: Option<String>,
    pub description: Option<String>,
}

/// A non-deprecated provisioning artifact of a product
#[derive(Clone, Debug)]
pub struct ProductVersion {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LaunchPath {
    pub id: String,
    pub name: String,
}

/// One parameter the user fills in before provisioning
#[derive(Clone, Debug)]
pub struct ProvisioningParameterInfo {
    pub key: String,
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub no_echo: bool,
}

#[derive(Clone, Debug)]
pub struct ProvisionedProduct {
    pub id: String,
    pub name: String,
    pub status: String,
    pub product_type: String,
    pub created: Option<DateTime<Utc>>,
}

/// Live status of a provisioned product
#[derive(Clone, Debug)]
pub struct StatusDetail {
    pub status: String,
    pub message: Option<String>,
}

// ============================================================================
// S3 Types
// ============================================================================

#[derive(Clone, Debug)]
pub struct BucketInfo {
    pub name: String,
    pub created: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug)]
pub struct ObjectEntry {
    pub key: String,
    pub size: i64,
    pub modified: Option<DateTime<Utc>>,
}

/// One `/`-delimited level of a bucket listing
#[derive(Clone, Debug, Default)]
pub struct DirListing {
    pub folders: Vec<String>,
    pub objects: Vec<ObjectEntry>,
}

// ============================================================================
// Cost Explorer Types
// ============================================================================

#[derive(Clone, Debug)]
pub struct ServiceCost {
    pub service: String,
    pub amount: f64,
}

#[derive(Clone, Debug)]
pub struct CostSummary {
    pub start: String,
    pub end: String,
    pub total: f64,
    pub unit: String,
    pub forecast: Option<f64>,
}

/// A resource that costs money while doing nothing
#[derive(Clone, Debug)]
pub struct IdleResource {
    pub kind: String,
    pub id: String,
    pub note: String,
}

// ============================================================================
// Log Types
// ============================================================================

/// Timestamp attached to a fetched log event, before formatting
#[derive(Clone, Debug, PartialEq)]
pub enum EventTimestamp {
    /// Epoch milliseconds as returned by CloudWatch Logs
    Millis(i64),
    /// A textual timestamp from some other source
    Text(String),
}

/// A log event as returned by the provider
#[derive(Clone, Debug, PartialEq)]
pub struct RawLogEvent {
    pub timestamp: EventTimestamp,
    pub message: String,
}

/// Log severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Map a word to a level. `WARNING` normalizes to `Warn`; anything
    /// else that is not a level yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Some(Self::Error),
            "WARN" | "WARNING" => Some(Self::Warn),
            "INFO" => Some(Self::Info),
            "DEBUG" => Some(Self::Debug),
            "TRACE" => Some(Self::Trace),
            _ => None,
        }
    }

    /// Display color for this level
    pub fn color(&self) -> Color {
        match self {
            Self::Error => Color::Red,
            Self::Warn => Color::Yellow,
            Self::Info => Color::Green,
            Self::Debug => Color::Cyan,
            Self::Trace => Color::BrightBlack,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

/// A log event after the formatting pipeline has run
#[derive(Clone, Debug, PartialEq)]
pub struct FormattedLogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    pub json_data: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parse_normalizes_warning() {
        assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("WARN"), Some(LogLevel::Warn));
    }

    #[test]
    fn level_parse_rejects_non_levels() {
        assert_eq!(LogLevel::parse("notice"), None);
        assert_eq!(LogLevel::parse("foo"), None);
        assert_eq!(LogLevel::parse(""), None);
    }

    #[test]
    fn level_default_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn instance_display_name_falls_back_to_id() {
        let mut instance = InstanceInfo {
            id: "i-0abc".to_string(),
            ..Default::default()
        };
        assert_eq!(instance.display_name(), "i-0abc");
        instance.name = Some("web-1".to_string());
        assert_eq!(instance.display_name(), "web-1");
    }
}
