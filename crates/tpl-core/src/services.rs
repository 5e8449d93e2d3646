//! Remote calls behind each [`Effect`](crate::Effect)
//!
//! Every call except the template lookup is keyed by the fetched template and
//! fails fast with [`ControllerError::TemplateNotLoaded`] when it is missing.

use crate::context::TemplateViewState;
use crate::error::ControllerError;
use crate::machine::Completion;
use crate::state::DetailBranch;
use tpl_client::TemplateApi;

/// Look the template up by the page's organization and name
pub async fn fetch_template<A: TemplateApi + ?Sized>(
    api: &A,
    context: &TemplateViewState,
) -> Completion {
    tracing::debug!(
        organization = context.organization_id(),
        template = context.template_name(),
        "fetching template"
    );
    Completion::Template(
        api.fetch_template(context.organization_id(), context.template_name())
            .await,
    )
}

/// Fetch one detail branch
///
/// # Errors
/// - `ControllerError::TemplateNotLoaded` if the template has not been fetched
pub async fn fetch_detail<A: TemplateApi + ?Sized>(
    api: &A,
    context: &TemplateViewState,
    branch: DetailBranch,
) -> Result<Completion, ControllerError> {
    let template = context.require_template()?;
    tracing::debug!(template_id = %template.id, %branch, "fetching template detail");

    let completion = match branch {
        DetailBranch::ActiveVersion => {
            Completion::ActiveVersion(api.fetch_active_version(template).await)
        }
        DetailBranch::Resources => {
            Completion::Resources(api.fetch_template_resources(template).await)
        }
        DetailBranch::Versions => Completion::Versions(api.fetch_template_versions(template).await),
        DetailBranch::Daus => Completion::Daus(api.fetch_template_daus(template).await),
    };
    Ok(completion)
}

/// Delete the loaded template
///
/// # Errors
/// - `ControllerError::TemplateNotLoaded` if the template has not been fetched
pub async fn delete_template<A: TemplateApi + ?Sized>(
    api: &A,
    context: &TemplateViewState,
) -> Result<Completion, ControllerError> {
    let template = context.require_template()?;
    tracing::info!(template_id = %template.id, name = %template.name, "deleting template");
    Ok(Completion::Delete(api.delete_template(template).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tpl_test_utils::ScriptedApi;

    #[tokio::test]
    async fn detail_without_template_fails_fast() {
        let api = ScriptedApi::new();
        let context = TemplateViewState::new("org1", "tmpl1");

        for branch in DetailBranch::ALL {
            let err = fetch_detail(&api, &context, branch).await.unwrap_err();
            assert!(err.is_programming_error());
        }
        assert_eq!(api.total_calls(), 0);
    }

    #[tokio::test]
    async fn delete_without_template_fails_fast() {
        let api = ScriptedApi::new();
        let context = TemplateViewState::new("org1", "tmpl1");

        let err = delete_template(&api, &context).await.unwrap_err();
        assert_eq!(err, ControllerError::TemplateNotLoaded);
        assert_eq!(api.total_calls(), 0);
    }

    #[tokio::test]
    async fn fetch_template_uses_page_keys() {
        let api = ScriptedApi::new();
        let context = TemplateViewState::new("org1", "tmpl1");

        let completion = fetch_template(&api, &context).await;

        assert!(matches!(completion, Completion::Template(Ok(ref t)) if t.name == "tmpl1"));
        assert_eq!(api.template_lookups(), vec![("org1".to_string(), "tmpl1".to_string())]);
    }
}
