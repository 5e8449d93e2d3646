//! Testing utilities for the template page workspace
//!
//! Shared fixtures, a scripted in-memory [`TemplateApi`], and a recording
//! [`Notifier`].

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;
use tpl_client::{ApiError, Notifier, TemplateApi};
use tpl_sdk::{
    DauEntry, ProvisionerJob, ProvisionerJobStatus, Template, TemplateDausResponse,
    TemplateVersion, WorkspaceAgent, WorkspaceAgentStatus, WorkspaceResource,
};

pub mod fixtures {
    use super::*;

    pub fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 8, 1, 12, 0, 0).unwrap()
    }

    pub fn template(id: &str, active_version_id: &str) -> Template {
        Template {
            id: id.to_string(),
            created_at: timestamp(),
            updated_at: timestamp(),
            organization_id: "org1".to_string(),
            name: "tmpl1".to_string(),
            active_version_id: active_version_id.to_string(),
            created_by_id: "u1".to_string(),
            created_by_name: "admin".to_string(),
            ..Template::default()
        }
    }

    pub fn template_version(id: &str, template_id: &str) -> TemplateVersion {
        TemplateVersion {
            id: id.to_string(),
            template_id: Some(template_id.to_string()),
            created_at: timestamp(),
            updated_at: timestamp(),
            name: format!("version-{id}"),
            job: ProvisionerJob {
                id: format!("job-{id}"),
                created_at: timestamp(),
                started_at: Some(timestamp()),
                completed_at: Some(timestamp() + ChronoDuration::seconds(42)),
                status: ProvisionerJobStatus::Succeeded,
                ..ProvisionerJob::default()
            },
            created_by_id: "u1".to_string(),
            created_by_name: "admin".to_string(),
            ..TemplateVersion::default()
        }
    }

    pub fn resource(id: &str, agents: usize) -> WorkspaceResource {
        let agents = (0..agents)
            .map(|i| WorkspaceAgent {
                id: format!("{id}-agent-{i}"),
                name: format!("agent{i}"),
                resource_id: id.to_string(),
                status: WorkspaceAgentStatus::Connected,
                architecture: "amd64".to_string(),
                operating_system: "linux".to_string(),
                ..WorkspaceAgent::default()
            })
            .collect();
        WorkspaceResource {
            id: id.to_string(),
            created_at: timestamp(),
            job_id: "job-v1".to_string(),
            resource_type: "docker_container".to_string(),
            name: format!("resource-{id}"),
            agents: Some(agents),
            ..WorkspaceResource::default()
        }
    }

    pub fn daus(amounts: &[u64]) -> TemplateDausResponse {
        let entries = amounts
            .iter()
            .zip(0i64..)
            .map(|(amount, day)| DauEntry {
                date: timestamp() + ChronoDuration::days(day),
                amount: *amount,
            })
            .collect();
        TemplateDausResponse { entries }
    }
}

/// Remote call kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    FetchTemplate,
    ActiveVersion,
    Resources,
    Versions,
    Daus,
    Delete,
}

/// Recorded remote call with the key it was made with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    FetchTemplate {
        organization_id: String,
        template_name: String,
    },
    ActiveVersion { version_id: String },
    Resources { version_id: String },
    Versions { template_id: String },
    Daus { template_id: String },
    Delete { template_id: String },
}

impl ApiCall {
    pub fn kind(&self) -> CallKind {
        match self {
            Self::FetchTemplate { .. } => CallKind::FetchTemplate,
            Self::ActiveVersion { .. } => CallKind::ActiveVersion,
            Self::Resources { .. } => CallKind::Resources,
            Self::Versions { .. } => CallKind::Versions,
            Self::Daus { .. } => CallKind::Daus,
            Self::Delete { .. } => CallKind::Delete,
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    templates: VecDeque<Result<Template, ApiError>>,
    active_versions: VecDeque<Result<TemplateVersion, ApiError>>,
    resources: VecDeque<Result<Vec<WorkspaceResource>, ApiError>>,
    versions: VecDeque<Result<Vec<TemplateVersion>, ApiError>>,
    daus: VecDeque<Result<TemplateDausResponse, ApiError>>,
    deletes: VecDeque<Result<(), ApiError>>,
    delays: HashMap<CallKind, Duration>,
    stalls: HashSet<CallKind>,
}

/// In-memory [`TemplateApi`] answering from queued responses
///
/// Each call pops the next queued response for its kind, falling back to a
/// successful fixture when the queue is empty. Every call is recorded before
/// it is answered.
#[derive(Debug, Default)]
pub struct ScriptedApi {
    script: Mutex<Script>,
    calls: Mutex<Vec<ApiCall>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(self, template: Template) -> Self {
        self.script.lock().templates.push_back(Ok(template));
        self
    }

    pub fn with_active_version(self, version: TemplateVersion) -> Self {
        self.script.lock().active_versions.push_back(Ok(version));
        self
    }

    pub fn with_resources(self, resources: Vec<WorkspaceResource>) -> Self {
        self.script.lock().resources.push_back(Ok(resources));
        self
    }

    pub fn with_versions(self, versions: Vec<TemplateVersion>) -> Self {
        self.script.lock().versions.push_back(Ok(versions));
        self
    }

    pub fn with_daus(self, daus: TemplateDausResponse) -> Self {
        self.script.lock().daus.push_back(Ok(daus));
        self
    }

    /// Queue a failure for the next call of `kind`
    pub fn with_failure(self, kind: CallKind, error: ApiError) -> Self {
        self.fail_next(kind, error);
        self
    }

    /// Delay every call of `kind`
    pub fn with_delay(self, kind: CallKind, delay: Duration) -> Self {
        self.script.lock().delays.insert(kind, delay);
        self
    }

    /// Make every call of `kind` hang forever
    pub fn with_stall(self, kind: CallKind) -> Self {
        self.script.lock().stalls.insert(kind);
        self
    }

    /// Queue a failure for the next call of `kind`
    pub fn fail_next(&self, kind: CallKind, error: ApiError) {
        let mut script = self.script.lock();
        match kind {
            CallKind::FetchTemplate => script.templates.push_back(Err(error)),
            CallKind::ActiveVersion => script.active_versions.push_back(Err(error)),
            CallKind::Resources => script.resources.push_back(Err(error)),
            CallKind::Versions => script.versions.push_back(Err(error)),
            CallKind::Daus => script.daus.push_back(Err(error)),
            CallKind::Delete => script.deletes.push_back(Err(error)),
        }
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn count(&self, kind: CallKind) -> usize {
        self.calls.lock().iter().filter(|c| c.kind() == kind).count()
    }

    pub fn template_lookups(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                ApiCall::FetchTemplate {
                    organization_id,
                    template_name,
                } => Some((organization_id.clone(), template_name.clone())),
                _ => None,
            })
            .collect()
    }

    async fn enter(&self, call: ApiCall) {
        let kind = call.kind();
        self.calls.lock().push(call);

        let (stall, delay) = {
            let script = self.script.lock();
            (script.stalls.contains(&kind), script.delays.get(&kind).copied())
        };
        if stall {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl TemplateApi for ScriptedApi {
    async fn fetch_template(
        &self,
        organization_id: &str,
        template_name: &str,
    ) -> Result<Template, ApiError> {
        self.enter(ApiCall::FetchTemplate {
            organization_id: organization_id.to_string(),
            template_name: template_name.to_string(),
        })
        .await;
        let queued = self.script.lock().templates.pop_front();
        queued.unwrap_or_else(|| {
            let mut template = fixtures::template("t1", "v1");
            template.organization_id = organization_id.to_string();
            template.name = template_name.to_string();
            Ok(template)
        })
    }

    async fn fetch_active_version(&self, template: &Template) -> Result<TemplateVersion, ApiError> {
        self.enter(ApiCall::ActiveVersion {
            version_id: template.active_version_id.clone(),
        })
        .await;
        let queued = self.script.lock().active_versions.pop_front();
        queued.unwrap_or_else(|| {
            Ok(fixtures::template_version(&template.active_version_id, &template.id))
        })
    }

    async fn fetch_template_resources(
        &self,
        template: &Template,
    ) -> Result<Vec<WorkspaceResource>, ApiError> {
        self.enter(ApiCall::Resources {
            version_id: template.active_version_id.clone(),
        })
        .await;
        let queued = self.script.lock().resources.pop_front();
        queued.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_template_versions(
        &self,
        template: &Template,
    ) -> Result<Vec<TemplateVersion>, ApiError> {
        self.enter(ApiCall::Versions {
            template_id: template.id.clone(),
        })
        .await;
        let queued = self.script.lock().versions.pop_front();
        queued.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_template_daus(
        &self,
        template: &Template,
    ) -> Result<TemplateDausResponse, ApiError> {
        self.enter(ApiCall::Daus {
            template_id: template.id.clone(),
        })
        .await;
        let queued = self.script.lock().daus.pop_front();
        queued.unwrap_or_else(|| Ok(TemplateDausResponse::default()))
    }

    async fn delete_template(&self, template: &Template) -> Result<Template, ApiError> {
        self.enter(ApiCall::Delete {
            template_id: template.id.clone(),
        })
        .await;
        let queued = self.script.lock().deletes.pop_front();
        queued.unwrap_or(Ok(())).map(|()| template.clone())
    }
}

/// [`Notifier`] that keeps every message
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_success(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
