//! Integration tests for the template page controller

use mockall::mock;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tpl_client::{ApiError, Notifier};
use tpl_core::prelude::*;
use tpl_core::{DetailBranch, FetchStage, DEFAULT_DELETE_SUCCESS_MESSAGE};
use tpl_test_utils::{fixtures, ApiCall, CallKind, RecordingNotifier, ScriptedApi};

type Page = TemplatePageController<ScriptedApi, RecordingNotifier>;

fn page(api: ScriptedApi) -> (Page, Arc<ScriptedApi>, Arc<RecordingNotifier>) {
    let api = Arc::new(api);
    let notifier = Arc::new(RecordingNotifier::new());
    let page = TemplatePageController::new(
        Arc::clone(&api),
        Arc::clone(&notifier),
        "org1",
        "tmpl1",
        &ControllerConfig::new(),
    );
    (page, api, notifier)
}

fn populated_api() -> ScriptedApi {
    ScriptedApi::new()
        .with_template(fixtures::template("t1", "v1"))
        .with_active_version(fixtures::template_version("v1", "t1"))
        .with_resources(vec![fixtures::resource("r1", 1), fixtures::resource("r2", 0)])
        .with_versions(vec![
            fixtures::template_version("v1", "t1"),
            fixtures::template_version("v0", "t1"),
        ])
        .with_daus(fixtures::daus(&[3, 5, 4]))
}

#[tokio::test]
async fn load_populates_every_field() {
    let (mut page, _api, _) = page(populated_api());

    let status = page.load().await.unwrap();
    assert_eq!(status, PageStatus::Loaded);

    let context = page.context();
    assert_eq!(context.template().unwrap().id, "t1");
    assert_eq!(context.active_template_version().unwrap().id, "v1");
    assert_eq!(context.template_resources().unwrap().len(), 2);
    assert_eq!(context.template_versions().unwrap().len(), 2);
    assert_eq!(context.template_daus().unwrap().peak().map(|e| e.amount), Some(5));
    assert!(context.delete_error().is_none());
    assert!(context.is_fully_loaded());
}

#[tokio::test]
async fn each_fetch_runs_once_with_template_keys() {
    let (mut page, api, _) = page(populated_api());

    page.load().await.unwrap();

    assert_eq!(api.total_calls(), 5);
    for kind in [
        CallKind::FetchTemplate,
        CallKind::ActiveVersion,
        CallKind::Resources,
        CallKind::Versions,
        CallKind::Daus,
    ] {
        assert_eq!(api.count(kind), 1, "{kind:?}");
    }
    assert_eq!(
        api.calls()[0],
        ApiCall::FetchTemplate {
            organization_id: "org1".to_string(),
            template_name: "tmpl1".to_string(),
        }
    );

    let calls = api.calls();
    assert!(calls.contains(&ApiCall::ActiveVersion { version_id: "v1".to_string() }));
    assert!(calls.contains(&ApiCall::Resources { version_id: "v1".to_string() }));
    assert!(calls.contains(&ApiCall::Versions { template_id: "t1".to_string() }));
    assert!(calls.contains(&ApiCall::Daus { template_id: "t1".to_string() }));
}

#[tokio::test]
async fn load_twice_does_not_refetch() {
    let (mut page, api, _) = page(ScriptedApi::new());

    page.load().await.unwrap();
    let status = page.load().await.unwrap();

    assert_eq!(status, PageStatus::Loaded);
    assert_eq!(api.total_calls(), 5);
}

#[tokio::test(start_paused = true)]
async fn detail_fetches_run_concurrently() {
    let delay = Duration::from_millis(100);
    let api = ScriptedApi::new()
        .with_delay(CallKind::ActiveVersion, delay)
        .with_delay(CallKind::Resources, delay)
        .with_delay(CallKind::Versions, delay)
        .with_delay(CallKind::Daus, delay);
    let (mut page, _, _) = page(api);

    let started = tokio::time::Instant::now();
    page.load().await.unwrap();

    assert_eq!(page.status(), PageStatus::Loaded);
    assert!(started.elapsed() < delay * 2, "took {:?}", started.elapsed());
}

#[tokio::test(start_paused = true)]
async fn uneven_detail_latency_still_joins() {
    let api = ScriptedApi::new()
        .with_delay(CallKind::ActiveVersion, Duration::from_millis(300))
        .with_delay(CallKind::Daus, Duration::from_millis(10));
    let (mut page, _, _) = page(api);

    assert_eq!(page.load().await.unwrap(), PageStatus::Loaded);
    assert!(page.context().is_fully_loaded());
}

#[tokio::test]
async fn delete_success_notifies_once() {
    let (mut page, api, notifier) = page(ScriptedApi::new());
    page.load().await.unwrap();

    assert_eq!(page.send(PageEvent::Delete).await.unwrap(), PageStatus::ConfirmingDelete);
    assert_eq!(api.count(CallKind::Delete), 0);

    let status = page.send(PageEvent::ConfirmDelete).await.unwrap();

    assert_eq!(status, PageStatus::Deleted);
    assert_eq!(api.count(CallKind::Delete), 1);
    assert_eq!(notifier.messages(), vec![DEFAULT_DELETE_SUCCESS_MESSAGE.to_string()]);
}

#[tokio::test]
async fn delete_failure_returns_to_loaded_with_error() {
    let api = ScriptedApi::new()
        .with_failure(CallKind::Delete, ApiError::response(400, "template in use"));
    let (mut page, _, notifier) = page(api);
    page.load().await.unwrap();

    page.send(PageEvent::Delete).await.unwrap();
    let status = page.send(PageEvent::ConfirmDelete).await.unwrap();

    assert_eq!(status, PageStatus::Loaded);
    let error = page.context().delete_error().unwrap();
    assert_eq!(error.to_string(), "template in use");
    assert_eq!(error.status(), Some(400));
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn delete_retry_clears_previous_error() {
    let api = ScriptedApi::new()
        .with_failure(CallKind::Delete, ApiError::response(400, "template in use"));
    let (mut page, api, notifier) = page(api);
    page.load().await.unwrap();

    page.send(PageEvent::Delete).await.unwrap();
    page.send(PageEvent::ConfirmDelete).await.unwrap();
    assert!(page.context().delete_error().is_some());

    page.send(PageEvent::Delete).await.unwrap();
    let status = page.send(PageEvent::ConfirmDelete).await.unwrap();

    assert_eq!(status, PageStatus::Deleted);
    assert!(page.context().delete_error().is_none());
    assert_eq!(api.count(CallKind::Delete), 2);
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn cancel_delete_returns_to_loaded() {
    let (mut page, api, notifier) = page(ScriptedApi::new());
    page.load().await.unwrap();

    page.send(PageEvent::Delete).await.unwrap();
    let status = page.send(PageEvent::CancelDelete).await.unwrap();

    assert_eq!(status, PageStatus::Loaded);
    assert_eq!(api.count(CallKind::Delete), 0);
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn events_outside_their_state_are_ignored() {
    let (mut page, api, _) = page(ScriptedApi::new());
    page.load().await.unwrap();

    assert_eq!(page.send(PageEvent::ConfirmDelete).await.unwrap(), PageStatus::Loaded);
    assert_eq!(page.send(PageEvent::CancelDelete).await.unwrap(), PageStatus::Loaded);
    assert_eq!(page.send(PageEvent::Retry).await.unwrap(), PageStatus::Loaded);
    assert_eq!(api.count(CallKind::Delete), 0);
    assert_eq!(api.count(CallKind::FetchTemplate), 1);
}

#[tokio::test]
async fn template_not_found_fails_load() {
    let api = ScriptedApi::new()
        .with_failure(CallKind::FetchTemplate, ApiError::response(404, "Template not found"));
    let (mut page, api, _) = page(api);

    let status = page.load().await.unwrap();

    assert_eq!(status, PageStatus::Failed);
    let PageState::Failed(failure) = page.state() else {
        panic!("expected failure, got {:?}", page.state());
    };
    assert_eq!(failure.stage, FetchStage::Template);
    assert!(failure.error.is_not_found());
    assert_eq!(api.total_calls(), 1);
}

#[tokio::test]
async fn detail_failure_then_retry_loads() {
    let api = ScriptedApi::new()
        .with_failure(CallKind::Versions, ApiError::Transport("connection reset".to_string()));
    let (mut page, api, _) = page(api);

    assert_eq!(page.load().await.unwrap(), PageStatus::Failed);
    let PageState::Failed(failure) = page.state() else {
        panic!("expected failure, got {:?}", page.state());
    };
    assert_eq!(failure.stage, FetchStage::Detail(DetailBranch::Versions));

    let status = page.send(PageEvent::Retry).await.unwrap();

    assert_eq!(status, PageStatus::Loaded);
    assert!(page.context().is_fully_loaded());
    assert_eq!(api.count(CallKind::FetchTemplate), 2);
}

#[tokio::test]
async fn cancel_before_load_makes_no_calls() {
    let (mut page, api, _) = page(ScriptedApi::new());

    page.cancel();
    let err = page.load().await.unwrap_err();

    assert_eq!(err, ControllerError::Cancelled);
    assert_eq!(page.status(), PageStatus::FetchingTemplate);
    assert_eq!(api.total_calls(), 0);
}

#[tokio::test]
async fn send_after_cancel_leaves_loaded_page_untouched() {
    let (mut page, api, _) = page(ScriptedApi::new());
    page.load().await.unwrap();
    let before = page.snapshot();

    page.cancel();
    let err = page.send(PageEvent::Delete).await.unwrap_err();

    assert_eq!(err, ControllerError::Cancelled);
    assert_eq!(page.status(), PageStatus::Loaded);
    assert_eq!(page.snapshot(), before);
    assert_eq!(api.count(CallKind::Delete), 0);
}

#[tokio::test]
async fn confirm_after_cancel_keeps_delete_error() {
    let api = ScriptedApi::new()
        .with_failure(CallKind::Delete, ApiError::response(400, "template in use"));
    let (mut page, api, notifier) = page(api);
    page.load().await.unwrap();
    page.send(PageEvent::Delete).await.unwrap();
    page.send(PageEvent::ConfirmDelete).await.unwrap();
    page.send(PageEvent::Delete).await.unwrap();

    page.cancel();
    let err = page.send(PageEvent::ConfirmDelete).await.unwrap_err();

    assert_eq!(err, ControllerError::Cancelled);
    assert_eq!(page.status(), PageStatus::ConfirmingDelete);
    assert_eq!(
        page.context().delete_error().map(ToString::to_string),
        Some("template in use".to_string())
    );
    assert_eq!(api.count(CallKind::Delete), 1);
    assert_eq!(notifier.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn load_after_cancelled_load_stays_cancelled() {
    let api = ScriptedApi::new().with_stall(CallKind::FetchTemplate);
    let (mut page, api, _) = page(api);

    let token = page.cancellation_token().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
    });
    assert_eq!(page.load().await.unwrap_err(), ControllerError::Cancelled);

    assert_eq!(page.load().await.unwrap_err(), ControllerError::Cancelled);
    assert_eq!(page.status(), PageStatus::FetchingTemplate);
    assert_eq!(api.count(CallKind::FetchTemplate), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_abandons_stalled_detail_fetch() {
    let api = ScriptedApi::new().with_stall(CallKind::Resources);
    let (mut page, _, _) = page(api);

    let token = page.cancellation_token().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let err = page.load().await.unwrap_err();

    assert_eq!(err, ControllerError::Cancelled);
    assert_eq!(page.status(), PageStatus::FetchingDetails);
    assert!(page.context().template_resources().is_none());
}

#[tokio::test(start_paused = true)]
async fn parent_token_cancels_page() {
    let parent = tokio_util::sync::CancellationToken::new();
    let api = ScriptedApi::new().with_stall(CallKind::FetchTemplate);
    let (page, _, _) = page(api);
    let mut page = page.with_cancellation(parent.child_token());

    let trigger = parent.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.cancel();
    });

    assert_eq!(page.load().await.unwrap_err(), ControllerError::Cancelled);
    assert!(page.context().template().is_none());
}

#[tokio::test]
async fn subscribers_see_final_snapshot() {
    let (mut page, _, _) = page(ScriptedApi::new());
    let mut snapshots = page.subscribe();
    assert_eq!(snapshots.borrow().status(), PageStatus::FetchingTemplate);

    page.load().await.unwrap();

    assert!(snapshots.has_changed().unwrap());
    let latest = snapshots.borrow_and_update().clone();
    assert_eq!(latest.status(), PageStatus::Loaded);
    assert_eq!(latest, page.snapshot());
}

#[tokio::test]
async fn ignored_event_publishes_nothing() {
    let (mut page, _, _) = page(ScriptedApi::new());
    page.load().await.unwrap();
    let mut snapshots = page.subscribe();
    snapshots.borrow_and_update();

    page.send(PageEvent::ConfirmDelete).await.unwrap();

    assert!(!snapshots.has_changed().unwrap());
}

#[tokio::test]
async fn custom_success_message_is_used() {
    let api = Arc::new(ScriptedApi::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let config = ControllerConfig::new().with_delete_success_message("Gone.");
    let mut page =
        TemplatePageController::new(api, Arc::clone(&notifier), "org1", "tmpl1", &config);

    page.load().await.unwrap();
    page.send(PageEvent::Delete).await.unwrap();
    page.send(PageEvent::ConfirmDelete).await.unwrap();

    assert_eq!(notifier.messages(), vec!["Gone.".to_string()]);
}

mock! {
    pub Toast {}

    impl Notifier for Toast {
        fn notify_success(&self, message: &str);
    }
}

#[tokio::test]
async fn notifier_sees_exactly_one_success() {
    let mut toast = MockToast::new();
    toast
        .expect_notify_success()
        .withf(|message| message == DEFAULT_DELETE_SUCCESS_MESSAGE)
        .times(1)
        .return_const(());

    let mut page = TemplatePageController::new(
        Arc::new(ScriptedApi::new()),
        Arc::new(toast),
        "org1",
        "tmpl1",
        &ControllerConfig::new(),
    );

    page.load().await.unwrap();
    page.send(PageEvent::Delete).await.unwrap();
    page.send(PageEvent::ConfirmDelete).await.unwrap();

    assert_eq!(page.status(), PageStatus::Deleted);
}

#[tokio::test]
async fn dyn_api_and_notifier_are_accepted() {
    let api: Arc<dyn tpl_client::TemplateApi> = Arc::new(ScriptedApi::new());
    let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier::new());
    let mut page =
        TemplatePageController::new(api, notifier, "org1", "tmpl1", &ControllerConfig::new());

    assert_eq!(page.load().await.unwrap(), PageStatus::Loaded);
}
