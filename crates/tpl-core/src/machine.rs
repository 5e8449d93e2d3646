//! Template page state machine
//!
//! A pure transition function: `(state, input) -> (state, effects)`. Inputs are
//! either UI events or API completions; effects describe the remote calls and
//! notifications an outer driver must perform. Nothing in here does I/O.
//!
//! ```text
//! FetchingTemplate --ok--> FetchingDetails --all four ok--> Loaded <------+
//!        |                        |                           |           |
//!       err                   any err                      Delete    CancelDelete
//!        v                        v                           v           |
//!      Failed <-------------------+                   ConfirmingDelete ---+
//!        |                                                    |
//!      Retry --> FetchingTemplate                       ConfirmDelete
//!                                                             v
//!                                  Loaded <--err (delete_error)-- Deleting --ok--> Deleted
//! ```

use crate::config::ControllerConfig;
use crate::context::TemplateViewState;
use crate::state::{DetailBranch, DetailProgress, FetchFailure, FetchStage, PageState, PageStatus};
use tpl_client::ApiError;
use tpl_sdk::{Template, TemplateDausResponse, TemplateVersion, WorkspaceResource};

/// Event issued by the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageEvent {
    /// Ask to delete the template
    Delete,
    /// Confirm a pending delete
    ConfirmDelete,
    /// Abandon a pending delete
    CancelDelete,
    /// Refetch after a failed load
    Retry,
}

/// Result of a remote call, fed back into the machine
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Template lookup finished
    Template(Result<Template, ApiError>),
    /// Active version fetch finished
    ActiveVersion(Result<TemplateVersion, ApiError>),
    /// Resource fetch finished
    Resources(Result<Vec<WorkspaceResource>, ApiError>),
    /// Version list fetch finished
    Versions(Result<Vec<TemplateVersion>, ApiError>),
    /// DAU fetch finished
    Daus(Result<TemplateDausResponse, ApiError>),
    /// Delete finished
    Delete(Result<Template, ApiError>),
}

impl Completion {
    /// Detail branch this completion belongs to, if any
    #[must_use]
    pub fn detail_branch(&self) -> Option<DetailBranch> {
        match self {
            Self::ActiveVersion(_) => Some(DetailBranch::ActiveVersion),
            Self::Resources(_) => Some(DetailBranch::Resources),
            Self::Versions(_) => Some(DetailBranch::Versions),
            Self::Daus(_) => Some(DetailBranch::Daus),
            Self::Template(_) | Self::Delete(_) => None,
        }
    }

    fn into_detail(self) -> Option<(DetailBranch, Result<DetailData, ApiError>)> {
        let (branch, result) = match self {
            Self::ActiveVersion(r) => {
                (DetailBranch::ActiveVersion, r.map(DetailData::ActiveVersion))
            }
            Self::Resources(r) => (DetailBranch::Resources, r.map(DetailData::Resources)),
            Self::Versions(r) => (DetailBranch::Versions, r.map(DetailData::Versions)),
            Self::Daus(r) => (DetailBranch::Daus, r.map(DetailData::Daus)),
            Self::Template(_) | Self::Delete(_) => return None,
        };
        Some((branch, result))
    }
}

enum DetailData {
    ActiveVersion(TemplateVersion),
    Resources(Vec<WorkspaceResource>),
    Versions(Vec<TemplateVersion>),
    Daus(TemplateDausResponse),
}

/// Machine input
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// From the UI
    Event(PageEvent),
    /// From the API
    Completion(Completion),
}

impl From<PageEvent> for Input {
    fn from(event: PageEvent) -> Self {
        Self::Event(event)
    }
}

impl From<Completion> for Input {
    fn from(completion: Completion) -> Self {
        Self::Completion(completion)
    }
}

/// Work the driver must perform after a transition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Look the template up by organization and name
    FetchTemplate,
    /// Fetch one detail branch
    FetchDetail(DetailBranch),
    /// Delete the loaded template
    DeleteTemplate,
    /// Show a success message
    NotifySuccess(String),
}

/// State plus view context for one template page
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMachine {
    state: PageState,
    context: TemplateViewState,
    delete_success_message: String,
}

impl TemplateMachine {
    /// Start a page in `FetchingTemplate`, returning the initial fetch effect
    #[must_use]
    pub fn new(
        organization_id: impl Into<String>,
        template_name: impl Into<String>,
        config: &ControllerConfig,
    ) -> (Self, Vec<Effect>) {
        let machine = Self {
            state: PageState::FetchingTemplate,
            context: TemplateViewState::new(organization_id, template_name),
            delete_success_message: config.delete_success_message.clone(),
        };
        (machine, vec![Effect::FetchTemplate])
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Current state without payload
    #[inline]
    #[must_use]
    pub fn status(&self) -> PageStatus {
        self.state.status()
    }

    /// View context
    #[inline]
    #[must_use]
    pub fn context(&self) -> &TemplateViewState {
        &self.context
    }

    /// Whether `event` would cause a transition in the current state
    #[must_use]
    pub fn accepts(&self, event: PageEvent) -> bool {
        matches!(
            (&self.state, event),
            (PageState::Loaded, PageEvent::Delete)
                | (
                    PageState::ConfirmingDelete,
                    PageEvent::ConfirmDelete | PageEvent::CancelDelete
                )
                | (PageState::Failed(_), PageEvent::Retry)
        )
    }

    /// Consume the machine and one input, producing the next machine and its effects
    #[must_use]
    pub fn step(mut self, input: impl Into<Input>) -> (Self, Vec<Effect>) {
        let effects = self.apply(input);
        (self, effects)
    }

    /// Apply one input in place, returning the effects to perform
    ///
    /// Inputs that are not valid in the current state are ignored: the state
    /// and context are left untouched and no effects are returned.
    pub fn apply(&mut self, input: impl Into<Input>) -> Vec<Effect> {
        let input = input.into();
        let from = self.status();

        let outcome = match input {
            Input::Event(event) => self.on_event(event),
            Input::Completion(completion) => self.on_completion(completion),
        };

        match outcome {
            Some(effects) => {
                let to = self.status();
                if from == to {
                    tracing::debug!(state = %to, effects = effects.len(), "input applied");
                } else {
                    tracing::info!(
                        template = self.context.template_name(),
                        %from,
                        %to,
                        effects = effects.len(),
                        "template page transition"
                    );
                }
                if let PageState::Failed(failure) = &self.state {
                    tracing::warn!(
                        template = self.context.template_name(),
                        %failure,
                        "template page failed"
                    );
                }
                effects
            }
            None => {
                tracing::debug!(state = %from, "input ignored");
                Vec::new()
            }
        }
    }

    fn on_event(&mut self, event: PageEvent) -> Option<Vec<Effect>> {
        match (&self.state, event) {
            (PageState::Loaded, PageEvent::Delete) => {
                self.state = PageState::ConfirmingDelete;
                Some(Vec::new())
            }
            (PageState::ConfirmingDelete, PageEvent::ConfirmDelete) => {
                self.context.clear_delete_error();
                self.state = PageState::Deleting;
                Some(vec![Effect::DeleteTemplate])
            }
            (PageState::ConfirmingDelete, PageEvent::CancelDelete) => {
                self.state = PageState::Loaded;
                Some(Vec::new())
            }
            (PageState::Failed(_), PageEvent::Retry) => {
                self.context.clear_fetched();
                self.state = PageState::FetchingTemplate;
                Some(vec![Effect::FetchTemplate])
            }
            _ => None,
        }
    }

    fn on_completion(&mut self, completion: Completion) -> Option<Vec<Effect>> {
        match completion {
            Completion::Template(result) => {
                if self.state != PageState::FetchingTemplate {
                    return None;
                }
                match result {
                    Ok(template) => {
                        self.context.set_template(template);
                        self.state = PageState::FetchingDetails(DetailProgress::new());
                        Some(DetailBranch::ALL.into_iter().map(Effect::FetchDetail).collect())
                    }
                    Err(error) => {
                        self.fail(FetchStage::Template, error);
                        Some(Vec::new())
                    }
                }
            }
            Completion::Delete(result) => {
                if self.state != PageState::Deleting {
                    return None;
                }
                match result {
                    Ok(_) => {
                        self.state = PageState::Deleted;
                        Some(vec![Effect::NotifySuccess(self.delete_success_message.clone())])
                    }
                    Err(error) => {
                        self.context.set_delete_error(error);
                        self.state = PageState::Loaded;
                        Some(Vec::new())
                    }
                }
            }
            detail => self.on_detail(detail),
        }
    }

    fn on_detail(&mut self, completion: Completion) -> Option<Vec<Effect>> {
        let PageState::FetchingDetails(progress) = &mut self.state else {
            return None;
        };
        let (branch, result) = completion.into_detail()?;
        if progress.is_done(branch) {
            return None;
        }

        match result {
            Ok(data) => {
                progress.mark(branch);
                let complete = progress.is_complete();
                match data {
                    DetailData::ActiveVersion(v) => self.context.set_active_template_version(v),
                    DetailData::Resources(r) => self.context.set_template_resources(r),
                    DetailData::Versions(v) => self.context.set_template_versions(v),
                    DetailData::Daus(d) => self.context.set_template_daus(d),
                }
                if complete {
                    self.state = PageState::Loaded;
                }
            }
            Err(error) => self.fail(FetchStage::Detail(branch), error),
        }
        Some(Vec::new())
    }

    fn fail(&mut self, stage: FetchStage, error: ApiError) {
        self.state = PageState::Failed(FetchFailure { stage, error });
    }
}
