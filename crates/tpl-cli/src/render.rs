//! Plain-text rendering of a loaded template page

use std::fmt;
use tpl_core::TemplateViewState;
use tpl_sdk::{ProvisionerType, Template, TemplateVersion, WorkspaceAgentStatus, WorkspaceResource};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Human-readable view of everything the page fetched
pub(crate) struct PageView<'a>(pub(crate) &'a TemplateViewState);

impl fmt::Display for PageView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let context = self.0;
        let Some(template) = context.template() else {
            return writeln!(
                f,
                "Template {}/{} not loaded",
                context.organization_id(),
                context.template_name()
            );
        };

        write_template(f, template)?;

        if let Some(version) = context.active_template_version() {
            writeln!(f)?;
            write_active_version(f, version)?;
        }

        if let Some(resources) = context.template_resources() {
            writeln!(f)?;
            write_resources(f, resources)?;
        }

        if let Some(versions) = context.template_versions() {
            writeln!(f)?;
            writeln!(f, "Versions ({})", versions.len())?;
            for version in versions {
                let marker = if version.id == template.active_version_id { "*" } else { " " };
                writeln!(
                    f,
                    " {marker} {:<24} {}  by {}",
                    version.name,
                    version.created_at.format(TIME_FORMAT),
                    version.created_by_name
                )?;
            }
        }

        if let Some(daus) = context.template_daus() {
            writeln!(f)?;
            match (daus.peak(), daus.latest()) {
                (Some(peak), Some(latest)) => writeln!(
                    f,
                    "Daily active users: {} today ({}), peak {} on {}",
                    latest.amount,
                    latest.day(),
                    peak.amount,
                    peak.day()
                )?,
                _ => writeln!(f, "Daily active users: no data")?,
            }
        }

        if let Some(error) = context.delete_error() {
            writeln!(f)?;
            writeln!(f, "Last delete failed: {error}")?;
            if let Some(detail) = error.detail() {
                writeln!(f, "  {detail}")?;
            }
        }
        Ok(())
    }
}

fn write_template(f: &mut fmt::Formatter<'_>, template: &Template) -> fmt::Result {
    writeln!(f, "Template {} ({})", template.name, template.id)?;
    if !template.description.is_empty() {
        writeln!(f, "  {}", template.description)?;
    }
    writeln!(f, "  provisioner     {}", provisioner(template.provisioner))?;
    writeln!(f, "  used by         {} developer(s)", template.workspace_owner_count)?;
    match template.max_ttl() {
        Some(ttl) => writeln!(f, "  max ttl         {}h", ttl.as_secs() / 3600)?,
        None => writeln!(f, "  max ttl         unlimited")?,
    }
    writeln!(
        f,
        "  created         {} by {}",
        template.created_at.format(TIME_FORMAT),
        template.created_by_name
    )
}

fn write_active_version(f: &mut fmt::Formatter<'_>, version: &TemplateVersion) -> fmt::Result {
    write!(f, "Active version {} ({})", version.name, version.job.status)?;
    if let Some(took) = version.job.duration() {
        write!(f, " built in {}s", took.num_seconds())?;
    }
    writeln!(f)
}

fn write_resources(f: &mut fmt::Formatter<'_>, resources: &[WorkspaceResource]) -> fmt::Result {
    writeln!(f, "Resources ({})", resources.len())?;
    for resource in resources {
        writeln!(f, "  {}.{}", resource.resource_type, resource.name)?;
        for agent in resource.agents() {
            writeln!(
                f,
                "    agent {:<12} {:<12} {}/{}",
                agent.name,
                agent_status(agent.status),
                agent.operating_system,
                agent.architecture
            )?;
        }
        for item in resource.visible_metadata() {
            writeln!(f, "    {} = {}", item.key, item.value)?;
        }
    }
    Ok(())
}

fn provisioner(kind: ProvisionerType) -> &'static str {
    match kind {
        ProvisionerType::Echo => "echo",
        ProvisionerType::Terraform => "terraform",
    }
}

fn agent_status(status: WorkspaceAgentStatus) -> &'static str {
    match status {
        WorkspaceAgentStatus::Connecting => "connecting",
        WorkspaceAgentStatus::Connected => "connected",
        WorkspaceAgentStatus::Disconnected => "disconnected",
    }
}
