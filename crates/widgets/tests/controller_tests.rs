//! Widget lifecycle tests against the in-memory record store

use std::sync::Arc;
use std::time::Duration;

use budgetease_client::{
    EnvironmentSignals, FeedbackStore, MemoryStore, RecordingSink, RetryPolicy,
};
use budgetease_types::{
    ContextKey, InterviewInterest, NewsletterPreference, PlanId, SmileyRating, StoreError,
};
use budgetease_widgets::{
    ChannelNotifier, Field, FieldError, NoopNotifier, PricingController, RatingController,
    SignupController, SignupInput, WidgetError,
};

fn signals() -> EnvironmentSignals {
    EnvironmentSignals {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/128.0".to_string(),
        language: "fr-FR".to_string(),
        timezone_offset_minutes: -120,
        screen_width: 1920,
        screen_height: 1080,
        color_depth: 24,
        hardware_concurrency: 8,
    }
}

fn feedback_store(memory: Arc<MemoryStore>) -> Arc<FeedbackStore> {
    Arc::new(
        FeedbackStore::new(memory).with_retry_policy(RetryPolicy::new(3, Duration::from_millis(5))),
    )
}

fn rating_controller(store: Arc<FeedbackStore>, context: &str) -> RatingController {
    RatingController::new(
        store,
        ContextKey::new(context),
        signals(),
        None,
        Arc::new(NoopNotifier),
    )
}

#[tokio::test]
async fn first_vote_then_remount_resolves_answered() {
    let memory = Arc::new(MemoryStore::new());
    let store = feedback_store(Arc::clone(&memory));

    let first_visit = rating_controller(Arc::clone(&store), "budget.cta");
    first_visit.mount().await;
    assert!(first_visit.state().is_unanswered());

    first_visit.submit(SmileyRating::Like).await.unwrap();
    assert_eq!(first_visit.prior_rating(), Some(SmileyRating::Like));

    let rows = memory.rows("feature_ratings").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["rating"], "🙂");
    assert_eq!(rows[0]["cta_source"], "budget.cta");

    // Same device, fresh page load: the prior answer is pre-populated.
    let second_visit = rating_controller(store, "budget.cta");
    second_visit.mount().await;
    assert!(second_visit.state().is_answered());
    assert_eq!(second_visit.prior_rating(), Some(SmileyRating::Like));
}

#[tokio::test]
async fn invalid_email_never_reaches_the_store() {
    let memory = Arc::new(MemoryStore::new());
    let store = feedback_store(Arc::clone(&memory));
    let controller = SignupController::new(
        store,
        ContextKey::new("hero.cta"),
        signals(),
        Arc::new(NoopNotifier),
    );

    let result = controller
        .submit(SignupInput {
            newsletter: Some(NewsletterPreference::Yes),
            interview: Some(InterviewInterest::No),
            email: "not-an-email".to_string(),
        })
        .await;

    match result {
        Err(WidgetError::Validation(errors)) => {
            assert_eq!(errors.get(Field::Email), Some(FieldError::InvalidEmail));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    assert_eq!(memory.select_calls(), 0);
    assert_eq!(memory.upsert_calls(), 0);
    assert!(controller.state().is_unanswered());
}

#[tokio::test]
async fn signup_happy_path_records_and_answers() {
    let memory = Arc::new(MemoryStore::new());
    let store = feedback_store(Arc::clone(&memory));
    let controller = SignupController::new(
        store,
        ContextKey::new("hero.cta"),
        signals(),
        Arc::new(NoopNotifier),
    );

    controller.mount().await;
    controller
        .submit(SignupInput {
            newsletter: Some(NewsletterPreference::Yes),
            interview: Some(InterviewInterest::Maybe),
            email: "someone@example.com".to_string(),
        })
        .await
        .unwrap();

    assert!(controller.state().is_answered());
    let rows = memory.rows("user_feedback").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["email"], "someone@example.com");
    assert_eq!(rows[0]["newsletter_preference"], "yes");
}

#[tokio::test]
async fn failed_submit_reverts_to_unanswered() {
    let memory = Arc::new(MemoryStore::new());
    memory
        .inject_upsert_error(StoreError::transport("400"))
        .await;

    let store = feedback_store(Arc::clone(&memory));
    let controller = rating_controller(store, "budget.cta");
    controller.mount().await;

    let result = controller.submit(SmileyRating::Dislike).await;
    assert!(matches!(result, Err(WidgetError::Submit(_))));

    // Terminal error: one attempt, no partial record, state restored.
    assert_eq!(memory.upsert_calls(), 1);
    assert!(memory.rows("feature_ratings").await.is_empty());
    assert!(controller.state().is_unanswered());
}

#[tokio::test]
async fn failed_update_reverts_to_previous_answer() {
    let memory = Arc::new(MemoryStore::new());
    let store = feedback_store(Arc::clone(&memory));
    let controller = rating_controller(store, "wealth.cta");

    controller.submit(SmileyRating::Love).await.unwrap();
    memory
        .inject_upsert_error(StoreError::transport("400"))
        .await;

    let result = controller.submit(SmileyRating::Neutral).await;
    assert!(result.is_err());

    // The prior answer survives a failed update.
    assert_eq!(controller.prior_rating(), Some(SmileyRating::Love));
    let rows = memory.rows("feature_ratings").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["rating"], "😍");
}

#[tokio::test]
async fn transient_failures_eventually_succeed() {
    let memory = Arc::new(MemoryStore::new());
    memory
        .inject_upsert_error(StoreError::transport("Failed to fetch"))
        .await;
    memory
        .inject_upsert_error(StoreError::transport("Failed to fetch"))
        .await;

    let store = feedback_store(Arc::clone(&memory));
    let controller = rating_controller(store, "budget.cta");

    controller.submit(SmileyRating::Like).await.unwrap();

    assert_eq!(memory.upsert_calls(), 3);
    assert!(controller.state().is_answered());
}

#[tokio::test]
async fn submitting_state_gates_concurrent_submissions() {
    let memory = Arc::new(MemoryStore::new());
    memory.set_latency(Duration::from_millis(100));

    let store = feedback_store(memory);
    let controller = Arc::new(rating_controller(store, "budget.cta"));

    let first = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.submit(SmileyRating::Like).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(controller.state().is_submitting());

    let second = controller.submit(SmileyRating::Love).await;
    assert!(matches!(second, Err(WidgetError::SubmissionInFlight)));

    first.await.unwrap().unwrap();
    assert_eq!(controller.prior_rating(), Some(SmileyRating::Like));
}

#[tokio::test]
async fn unmount_discards_pending_lookup() {
    let memory = Arc::new(MemoryStore::new());
    let store = feedback_store(Arc::clone(&memory));

    // Seed a prior answer, then make the store slow.
    rating_controller(Arc::clone(&store), "budget.cta")
        .submit(SmileyRating::Like)
        .await
        .unwrap();
    memory.set_latency(Duration::from_millis(100));

    let controller = Arc::new(rating_controller(store, "budget.cta"));
    let mounting = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.mount().await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    controller.unmount();
    mounting.await.unwrap();

    // The lookup resolved after unmount; its result was discarded.
    assert!(controller.state().is_unanswered());
}

#[tokio::test]
async fn page_is_notified_on_success_only() {
    let memory = Arc::new(MemoryStore::new());
    memory
        .inject_upsert_error(StoreError::transport("400"))
        .await;

    let store = feedback_store(memory);
    let (notifier, mut notifications) = ChannelNotifier::channel();
    let controller = PricingController::new(
        store,
        ContextKey::new("pricing"),
        signals(),
        Arc::new(notifier),
    );

    assert!(controller.submit(PlanId::Tax).await.is_err());
    assert!(notifications.try_recv().is_err());

    controller.submit(PlanId::Tax).await.unwrap();
    let source = notifications.recv().await.unwrap();
    assert_eq!(source.as_str(), "pricing");
}

#[tokio::test]
async fn updating_a_vote_switches_the_single_record() {
    let memory = Arc::new(MemoryStore::new());
    let sink = Arc::new(RecordingSink::new());
    let store = Arc::new(
        FeedbackStore::new(memory.clone())
            .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(5)))
            .with_analytics(sink.clone()),
    );

    let controller = PricingController::new(
        Arc::clone(&store),
        ContextKey::new("pricing"),
        signals(),
        Arc::new(NoopNotifier),
    );

    controller.submit(PlanId::Discovery).await.unwrap();
    controller.submit(PlanId::Complete).await.unwrap();

    assert_eq!(controller.selected_plan(), Some(PlanId::Complete));
    let rows = memory.rows("pricing_votes").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["plan_id"], "complete");

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].attributes["plan"], "complete");
}

#[tokio::test]
async fn rating_update_is_flagged_for_analytics() {
    let memory = Arc::new(MemoryStore::new());
    let sink = Arc::new(RecordingSink::new());
    let store = Arc::new(
        FeedbackStore::new(memory.clone())
            .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(5)))
            .with_analytics(sink.clone()),
    );

    let controller = RatingController::new(
        store,
        ContextKey::new("taxDeclaration.cta"),
        signals(),
        None,
        Arc::new(NoopNotifier),
    );

    controller.submit(SmileyRating::Neutral).await.unwrap();
    controller.submit(SmileyRating::Love).await.unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].attributes["isUpdate"], "false");
    assert_eq!(events[1].attributes["isUpdate"], "true");
    assert_eq!(events[1].attributes["rating"], "😍");
    assert_eq!(events[1].attributes["feature"], "taxDeclaration.cta");
}
