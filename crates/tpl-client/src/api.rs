//! Remote calls the template page depends on

use crate::error::ApiError;
use async_trait::async_trait;
use std::sync::Arc;
use tpl_sdk::{Template, TemplateDausResponse, TemplateVersion, WorkspaceResource};

/// Remote template API
///
/// Every call except [`fetch_template`](TemplateApi::fetch_template) is keyed
/// by an already-fetched [`Template`]: the version-scoped calls use
/// `active_version_id`, the template-scoped calls use `id`.
#[async_trait]
pub trait TemplateApi: Send + Sync {
    /// Look a template up by organization and name
    async fn fetch_template(
        &self,
        organization_id: &str,
        template_name: &str,
    ) -> Result<Template, ApiError>;

    /// Fetch the template's active version
    async fn fetch_active_version(&self, template: &Template) -> Result<TemplateVersion, ApiError>;

    /// Fetch the resources declared by the template's active version
    async fn fetch_template_resources(
        &self,
        template: &Template,
    ) -> Result<Vec<WorkspaceResource>, ApiError>;

    /// Fetch every version of the template
    async fn fetch_template_versions(
        &self,
        template: &Template,
    ) -> Result<Vec<TemplateVersion>, ApiError>;

    /// Fetch the template's daily-active-user series
    async fn fetch_template_daus(&self, template: &Template)
        -> Result<TemplateDausResponse, ApiError>;

    /// Delete the template, echoing the deleted entity
    async fn delete_template(&self, template: &Template) -> Result<Template, ApiError>;
}

#[async_trait]
impl<T: TemplateApi + ?Sized> TemplateApi for Arc<T> {
    async fn fetch_template(
        &self,
        organization_id: &str,
        template_name: &str,
    ) -> Result<Template, ApiError> {
        (**self).fetch_template(organization_id, template_name).await
    }

    async fn fetch_active_version(&self, template: &Template) -> Result<TemplateVersion, ApiError> {
        (**self).fetch_active_version(template).await
    }

    async fn fetch_template_resources(
        &self,
        template: &Template,
    ) -> Result<Vec<WorkspaceResource>, ApiError> {
        (**self).fetch_template_resources(template).await
    }

    async fn fetch_template_versions(
        &self,
        template: &Template,
    ) -> Result<Vec<TemplateVersion>, ApiError> {
        (**self).fetch_template_versions(template).await
    }

    async fn fetch_template_daus(
        &self,
        template: &Template,
    ) -> Result<TemplateDausResponse, ApiError> {
        (**self).fetch_template_daus(template).await
    }

    async fn delete_template(&self, template: &Template) -> Result<Template, ApiError> {
        (**self).delete_template(template).await
    }
}
