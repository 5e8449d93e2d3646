//! Async driver for the template page machine
//!
//! Owns a [`TemplateMachine`] and executes the effects it returns:
//! - the four detail fetches are issued together and their completions are
//!   applied in arrival order
//! - every remote call is raced against a [`CancellationToken`]
//! - a [`PageSnapshot`] is published after each applied input

use crate::config::ControllerConfig;
use crate::context::TemplateViewState;
use crate::error::ControllerError;
use crate::machine::{Completion, Effect, PageEvent, TemplateMachine};
use crate::services;
use crate::state::{DetailBranch, PageState, PageStatus};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tpl_client::{Notifier, TemplateApi};

/// Observable copy of the page after a transition
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    /// Page state
    pub state: PageState,
    /// View context
    pub context: TemplateViewState,
}

impl PageSnapshot {
    /// State without payload
    #[inline]
    #[must_use]
    pub fn status(&self) -> PageStatus {
        self.state.status()
    }
}

/// Drives one template page against a [`TemplateApi`] and a [`Notifier`]
///
/// Inputs are processed one at a time, so the machine needs no locking.
/// Cancellation is terminal: once the token fires every later call returns
/// [`ControllerError::Cancelled`] and the machine keeps its last state.
pub struct TemplatePageController<A: ?Sized, N: ?Sized> {
    api: Arc<A>,
    notifier: Arc<N>,
    machine: TemplateMachine,
    /// Effects produced by construction, run by the first `load`
    initial: Vec<Effect>,
    cancel: CancellationToken,
    snapshots: watch::Sender<PageSnapshot>,
}

impl<A, N> TemplatePageController<A, N>
where
    A: TemplateApi + ?Sized,
    N: Notifier + ?Sized,
{
    /// Create a controller for the page keyed by organization and template name
    #[must_use]
    pub fn new(
        api: Arc<A>,
        notifier: Arc<N>,
        organization_id: impl Into<String>,
        template_name: impl Into<String>,
        config: &ControllerConfig,
    ) -> Self {
        let (machine, initial) = TemplateMachine::new(organization_id, template_name, config);
        let (snapshots, _) = watch::channel(PageSnapshot {
            state: machine.state().clone(),
            context: machine.context().clone(),
        });
        Self {
            api,
            notifier,
            machine,
            initial,
            cancel: CancellationToken::new(),
            snapshots,
        }
    }

    /// Use `token` for cancellation instead of a private one
    ///
    /// Passing a child of the owning view's token ties in-flight work to the
    /// view's lifetime.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &PageState {
        self.machine.state()
    }

    /// Current state without payload
    #[inline]
    #[must_use]
    pub fn status(&self) -> PageStatus {
        self.machine.status()
    }

    /// View context
    #[inline]
    #[must_use]
    pub fn context(&self) -> &TemplateViewState {
        self.machine.context()
    }

    /// Underlying machine
    #[inline]
    #[must_use]
    pub fn machine(&self) -> &TemplateMachine {
        &self.machine
    }

    /// Latest snapshot
    #[must_use]
    pub fn snapshot(&self) -> PageSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receive a snapshot after every applied input
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PageSnapshot> {
        self.snapshots.subscribe()
    }

    /// Token that abandons in-flight work when cancelled
    #[inline]
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Abandon in-flight work
    pub fn cancel(&self) {
        tracing::debug!(template = self.context().template_name(), "template page cancelled");
        self.cancel.cancel();
    }

    /// Fetch the template and its details
    ///
    /// Returns once the page is `Loaded` or `Failed`. Calling it again is a
    /// no-op; use [`PageEvent::Retry`] to refetch after a failure.
    ///
    /// # Errors
    /// - `ControllerError::Cancelled` if the token fires first
    /// - `ControllerError::TemplateNotLoaded` on a wiring mistake
    pub async fn load(&mut self) -> Result<PageStatus, ControllerError> {
        self.ensure_live()?;
        let effects = std::mem::take(&mut self.initial);
        self.drive(effects).await?;
        Ok(self.status())
    }

    /// Apply a UI event and run whatever it triggers to completion
    ///
    /// Once the token has fired the event is not applied.
    ///
    /// # Errors
    /// - `ControllerError::Cancelled` if the token has fired or fires during a remote call
    /// - `ControllerError::TemplateNotLoaded` on a wiring mistake
    pub async fn send(&mut self, event: PageEvent) -> Result<PageStatus, ControllerError> {
        self.ensure_live()?;
        tracing::debug!(?event, state = %self.status(), "page event");
        let effects = self.machine.apply(event);
        self.publish();
        self.drive(effects).await?;
        Ok(self.status())
    }

    fn ensure_live(&self) -> Result<(), ControllerError> {
        if self.cancel.is_cancelled() {
            return Err(ControllerError::Cancelled);
        }
        Ok(())
    }

    async fn drive(&mut self, effects: Vec<Effect>) -> Result<(), ControllerError> {
        let mut queue: VecDeque<Effect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::FetchTemplate => {
                    let api = Arc::clone(&self.api);
                    let completion = self
                        .cancellable(services::fetch_template(&*api, self.machine.context()))
                        .await?;
                    queue.extend(self.apply(completion));
                }
                Effect::FetchDetail(first) => {
                    let mut branches = vec![first];
                    while let Some(Effect::FetchDetail(branch)) = queue.front() {
                        branches.push(*branch);
                        queue.pop_front();
                    }
                    let follow_up = self.fetch_details(branches).await?;
                    queue.extend(follow_up);
                }
                Effect::DeleteTemplate => {
                    let api = Arc::clone(&self.api);
                    let completion = self
                        .cancellable(services::delete_template(&*api, self.machine.context()))
                        .await??;
                    queue.extend(self.apply(completion));
                }
                Effect::NotifySuccess(message) => {
                    self.notifier.notify_success(&message);
                }
            }
        }
        Ok(())
    }

    /// Issue every branch at once and apply completions as they arrive
    ///
    /// Stops polling the remaining branches once the machine leaves
    /// `FetchingDetails`.
    async fn fetch_details(
        &mut self,
        branches: Vec<DetailBranch>,
    ) -> Result<Vec<Effect>, ControllerError> {
        let api = Arc::clone(&self.api);
        let context = self.machine.context().clone();
        let token = self.cancel.clone();

        let mut pending: FuturesUnordered<_> = branches
            .into_iter()
            .map(|branch| services::fetch_detail(&*api, &context, branch))
            .collect();

        let mut follow_up = Vec::new();
        while !pending.is_empty() {
            let next = tokio::select! {
                biased;
                () = token.cancelled() => return Err(ControllerError::Cancelled),
                next = pending.next() => next,
            };
            let Some(result) = next else { break };
            follow_up.extend(self.apply(result?));

            if self.status() != PageStatus::FetchingDetails {
                break;
            }
        }
        Ok(follow_up)
    }

    fn apply(&mut self, completion: Completion) -> Vec<Effect> {
        let effects = self.machine.apply(completion);
        self.publish();
        effects
    }

    fn publish(&self) {
        self.snapshots.send_if_modified(|current| {
            if current.state == *self.machine.state()
                && current.context == *self.machine.context()
            {
                return false;
            }
            current.state = self.machine.state().clone();
            current.context = self.machine.context().clone();
            true
        });
    }

    async fn cancellable<F: Future>(&self, fut: F) -> Result<F::Output, ControllerError> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ControllerError::Cancelled),
            output = fut => Ok(output),
        }
    }
}

impl<A: ?Sized, N: ?Sized> std::fmt::Debug for TemplatePageController<A, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplatePageController")
            .field("machine", &self.machine)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
