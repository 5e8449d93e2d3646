//! View state owned by the controller

use crate::error::ControllerError;
use serde::Serialize;
use tpl_client::ApiError;
use tpl_sdk::{Template, TemplateDausResponse, TemplateVersion, WorkspaceResource};

/// Data backing one template page
///
/// Created when the page mounts, keyed by organization and template name,
/// and discarded when it unmounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateViewState {
    organization_id: String,
    template_name: String,
    template: Option<Template>,
    active_template_version: Option<TemplateVersion>,
    template_resources: Option<Vec<WorkspaceResource>>,
    template_versions: Option<Vec<TemplateVersion>>,
    template_daus: Option<TemplateDausResponse>,
    #[serde(serialize_with = "serialize_error")]
    delete_error: Option<ApiError>,
}

impl TemplateViewState {
    /// Empty view state for a page
    #[must_use]
    pub fn new(organization_id: impl Into<String>, template_name: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            template_name: template_name.into(),
            template: None,
            active_template_version: None,
            template_resources: None,
            template_versions: None,
            template_daus: None,
            delete_error: None,
        }
    }

    /// Organization the template belongs to
    #[inline]
    #[must_use]
    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    /// Template name from the page route
    #[inline]
    #[must_use]
    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// Fetched template
    #[inline]
    #[must_use]
    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    /// Fetched template, or a programming error if not loaded yet
    ///
    /// # Errors
    /// - `ControllerError::TemplateNotLoaded` before the template fetch completes
    pub fn require_template(&self) -> Result<&Template, ControllerError> {
        self.template.as_ref().ok_or(ControllerError::TemplateNotLoaded)
    }

    /// Active version
    #[inline]
    #[must_use]
    pub fn active_template_version(&self) -> Option<&TemplateVersion> {
        self.active_template_version.as_ref()
    }

    /// Resources of the active version
    #[inline]
    #[must_use]
    pub fn template_resources(&self) -> Option<&[WorkspaceResource]> {
        self.template_resources.as_deref()
    }

    /// All versions of the template
    #[inline]
    #[must_use]
    pub fn template_versions(&self) -> Option<&[TemplateVersion]> {
        self.template_versions.as_deref()
    }

    /// Daily-active-user series
    #[inline]
    #[must_use]
    pub fn template_daus(&self) -> Option<&TemplateDausResponse> {
        self.template_daus.as_ref()
    }

    /// Failure of the most recent delete attempt
    #[inline]
    #[must_use]
    pub fn delete_error(&self) -> Option<&ApiError> {
        self.delete_error.as_ref()
    }

    /// Whether the template and all four detail fields are present
    #[must_use]
    pub fn is_fully_loaded(&self) -> bool {
        self.template.is_some()
            && self.active_template_version.is_some()
            && self.template_resources.is_some()
            && self.template_versions.is_some()
            && self.template_daus.is_some()
    }

    pub(crate) fn set_template(&mut self, template: Template) {
        self.template = Some(template);
    }

    pub(crate) fn set_active_template_version(&mut self, version: TemplateVersion) {
        self.active_template_version = Some(version);
    }

    pub(crate) fn set_template_resources(&mut self, resources: Vec<WorkspaceResource>) {
        self.template_resources = Some(resources);
    }

    pub(crate) fn set_template_versions(&mut self, versions: Vec<TemplateVersion>) {
        self.template_versions = Some(versions);
    }

    pub(crate) fn set_template_daus(&mut self, daus: TemplateDausResponse) {
        self.template_daus = Some(daus);
    }

    pub(crate) fn set_delete_error(&mut self, error: ApiError) {
        self.delete_error = Some(error);
    }

    pub(crate) fn clear_delete_error(&mut self) {
        self.delete_error = None;
    }

    /// Drop everything fetched so far, keeping the identifying keys
    pub(crate) fn clear_fetched(&mut self) {
        *self = Self::new(
            std::mem::take(&mut self.organization_id),
            std::mem::take(&mut self.template_name),
        );
    }
}

fn serialize_error<S: serde::Serializer>(
    error: &Option<ApiError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}
