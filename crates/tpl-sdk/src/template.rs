//! Templates, template versions, and usage statistics

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A named, versioned blueprint from which workspaces are provisioned
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Server-assigned identifier
    pub id: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Owning organization
    pub organization_id: String,
    /// Name, unique within the organization
    pub name: String,
    /// Provisioner used to build workspaces
    pub provisioner: ProvisionerType,
    /// Version new workspaces are built from
    pub active_version_id: String,
    /// Number of distinct users owning a workspace built from this template
    pub workspace_owner_count: u32,
    /// Free-form description
    pub description: String,
    /// Icon URL or path
    pub icon: String,
    /// Maximum workspace lifetime in milliseconds, zero when unbounded
    pub max_ttl_ms: u64,
    /// Minimum interval between autostarts in milliseconds
    pub min_autostart_interval_ms: u64,
    /// Creator's user id
    pub created_by_id: String,
    /// Creator's username
    pub created_by_name: String,
}

impl Template {
    /// Maximum workspace lifetime, `None` when unbounded
    #[inline]
    #[must_use]
    pub fn max_ttl(&self) -> Option<Duration> {
        (self.max_ttl_ms > 0).then(|| Duration::from_millis(self.max_ttl_ms))
    }

    /// Minimum interval between autostarts
    #[inline]
    #[must_use]
    pub fn min_autostart_interval(&self) -> Duration {
        Duration::from_millis(self.min_autostart_interval_ms)
    }
}

/// Immutable snapshot of a template's provisioning definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVersion {
    /// Server-assigned identifier
    pub id: String,
    /// Template this version belongs to; absent for orphan imports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Owning organization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Human-readable name
    pub name: String,
    /// Import job that produced this version
    pub job: ProvisionerJob,
    /// Markdown readme bundled with the version
    pub readme: String,
    /// Creator's user id
    pub created_by_id: String,
    /// Creator's username
    pub created_by_name: String,
}

/// Provisioner job backing a template version import or a workspace build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionerJob {
    /// Server-assigned identifier
    pub id: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// When a provisioner picked the job up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the job finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Current status
    pub status: ProvisionerJobStatus,
    /// Provisioner daemon running the job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    /// Storage reference for the job's source archive
    pub storage_source: String,
}

impl ProvisionerJob {
    /// Wall-clock duration, available once the job has started and completed
    #[must_use]
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

/// Provisioner job status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionerJobStatus {
    /// Queued, not yet acquired
    #[default]
    Pending,
    /// Acquired by a provisioner
    Running,
    /// Finished successfully
    Succeeded,
    /// Cancellation requested
    Canceling,
    /// Cancelled before completion
    Canceled,
    /// Finished with an error
    Failed,
}

impl ProvisionerJobStatus {
    /// Whether the job can no longer change status
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Canceled | Self::Failed)
    }

    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Canceling => "canceling",
            Self::Canceled => "canceled",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ProvisionerJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provisioner backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionerType {
    /// Test provisioner that echoes its input
    Echo,
    /// Terraform
    #[default]
    Terraform,
}

/// One day's active-user count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DauEntry {
    /// Day the count applies to
    pub date: DateTime<Utc>,
    /// Distinct active users on that day
    pub amount: u64,
}

impl DauEntry {
    /// Calendar day of the entry
    #[inline]
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// Daily-active-user series for a template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDausResponse {
    /// Entries ordered by date
    pub entries: Vec<DauEntry>,
}

impl TemplateDausResponse {
    /// Highest single-day count, `None` for an empty series
    #[must_use]
    pub fn peak(&self) -> Option<&DauEntry> {
        self.entries.iter().max_by_key(|e| e.amount)
    }

    /// Most recent entry
    #[must_use]
    pub fn latest(&self) -> Option<&DauEntry> {
        self.entries.iter().max_by_key(|e| e.date)
    }

    /// Whether the series has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
