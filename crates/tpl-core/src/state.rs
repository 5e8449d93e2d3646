//! Page states and the detail-fetch join
//!
//! `FetchingDetails` is a composite state: four independent branches, each
//! tracked by its own completion flag in [`DetailProgress`]. The composite is
//! done only when every flag is set.

use serde::{Deserialize, Serialize};
use tpl_client::ApiError;

/// One of the four sub-resources fetched once the template is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailBranch {
    /// Template's active version, keyed by `active_version_id`
    ActiveVersion,
    /// Resources of the active version, keyed by `active_version_id`
    Resources,
    /// All versions, keyed by template `id`
    Versions,
    /// Daily-active-user series, keyed by template `id`
    Daus,
}

impl DetailBranch {
    /// Every branch, in issue order
    pub const ALL: [DetailBranch; 4] = [
        DetailBranch::ActiveVersion,
        DetailBranch::Resources,
        DetailBranch::Versions,
        DetailBranch::Daus,
    ];

    /// Stable name used in logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ActiveVersion => "active_version",
            Self::Resources => "resources",
            Self::Versions => "versions",
            Self::Daus => "daus",
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl std::fmt::Display for DetailBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion flags for the four detail branches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DetailProgress {
    done: u8,
}

impl DetailProgress {
    /// No branch complete
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `branch` complete; returns `false` if it already was
    #[inline]
    pub fn mark(&mut self, branch: DetailBranch) -> bool {
        let newly = !self.is_done(branch);
        self.done |= branch.bit();
        newly
    }

    /// Whether `branch` has completed
    #[inline]
    #[must_use]
    pub fn is_done(self, branch: DetailBranch) -> bool {
        self.done & branch.bit() != 0
    }

    /// Whether all four branches have completed
    #[inline]
    #[must_use]
    pub fn is_complete(self) -> bool {
        DetailBranch::ALL.iter().all(|b| self.is_done(*b))
    }

    /// Branches still outstanding
    #[must_use]
    pub fn pending(self) -> Vec<DetailBranch> {
        DetailBranch::ALL
            .into_iter()
            .filter(|b| !self.is_done(*b))
            .collect()
    }

    /// Number of completed branches
    #[inline]
    #[must_use]
    pub fn completed(self) -> usize {
        self.done.count_ones() as usize
    }
}

/// Which fetch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "stage", content = "branch")]
pub enum FetchStage {
    /// The initial template lookup
    Template,
    /// One of the detail branches
    Detail(DetailBranch),
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template => f.write_str("template"),
            Self::Detail(branch) => write!(f, "{branch}"),
        }
    }
}

/// Fetch failure surfaced by the `Failed` state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// Where the failure happened
    pub stage: FetchStage,
    /// What the API reported
    pub error: ApiError,
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to fetch {}: {}", self.stage, self.error)
    }
}

/// Page-level state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    /// Fetching the template by organization and name
    FetchingTemplate,
    /// Fetching the four detail branches concurrently
    FetchingDetails(DetailProgress),
    /// All data present; accepts `Delete`
    Loaded,
    /// Waiting for the user to confirm or cancel deletion
    ConfirmingDelete,
    /// Delete request in flight
    Deleting,
    /// Template deleted
    Deleted,
    /// A fetch failed; accepts `Retry`
    Failed(FetchFailure),
}

impl PageState {
    /// Discriminant without payload
    #[must_use]
    pub fn status(&self) -> PageStatus {
        match self {
            Self::FetchingTemplate => PageStatus::FetchingTemplate,
            Self::FetchingDetails(_) => PageStatus::FetchingDetails,
            Self::Loaded => PageStatus::Loaded,
            Self::ConfirmingDelete => PageStatus::ConfirmingDelete,
            Self::Deleting => PageStatus::Deleting,
            Self::Deleted => PageStatus::Deleted,
            Self::Failed(_) => PageStatus::Failed,
        }
    }

    /// Whether no further input can change the state
    #[inline]
    #[must_use]
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Whether the state waits on a remote call rather than on the user
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::FetchingTemplate | Self::FetchingDetails(_) | Self::Deleting
        )
    }
}

/// Payload-free view of [`PageState`] for display and serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    /// See [`PageState::FetchingTemplate`]
    FetchingTemplate,
    /// See [`PageState::FetchingDetails`]
    FetchingDetails,
    /// See [`PageState::Loaded`]
    Loaded,
    /// See [`PageState::ConfirmingDelete`]
    ConfirmingDelete,
    /// See [`PageState::Deleting`]
    Deleting,
    /// See [`PageState::Deleted`]
    Deleted,
    /// See [`PageState::Failed`]
    Failed,
}

impl std::fmt::Display for PageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::FetchingTemplate => "fetching_template",
            Self::FetchingDetails => "fetching_details",
            Self::Loaded => "loaded",
            Self::ConfirmingDelete => "confirming_delete",
            Self::Deleting => "deleting",
            Self::Deleted => "deleted",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
