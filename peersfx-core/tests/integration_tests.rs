//! Integration tests for peersfx-core services
//!
//! Every service runs against the in-process adapters wired through a
//! `PeersFxContext`, the same way the CLI drives them.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use tempfile::TempDir;

use peersfx_core::adapters::demo::{self, DEMO_USER_ID};
use peersfx_core::adapters::RecordingToaster;
use peersfx_core::domain::{
    DocumentSlot, DocumentType, KycStatus, KycStep, NotificationType, PersonalInfo,
};
use peersfx_core::ports::data_store::{KYC_VERIFICATIONS, NOTIFICATIONS, ORDERS};
use peersfx_core::ports::realtime::{
    KYC_SUBMISSIONS, MARKETPLACE_ORDERS, NEW_NOTIFICATION, NEW_ORDER, NEW_SUBMISSION,
    ORDER_MATCHED, USER_NOTIFICATIONS,
};
use peersfx_core::ports::{ListQuery, UploadFile};
use peersfx_core::services::{
    EventOutcome, LoadOutcome, MarketFilter, OrderForm, ReadFilter, RouteDecision,
};
use peersfx_core::{Error, OrderType, PeersFxContext};

// ============================================================================
// Test Helpers
// ============================================================================

struct Harness {
    ctx: PeersFxContext,
    toasts: Arc<RecordingToaster>,
    _dir: TempDir,
}

/// Context over a fresh data directory, demo data seeded
async fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let toasts = Arc::new(RecordingToaster::new());
    let mut ctx = PeersFxContext::with_toasts(dir.path(), toasts.clone()).unwrap();
    ctx.config.enable_demo_mode();
    assert!(ctx.seed_demo_data().await.unwrap());
    Harness {
        ctx,
        toasts,
        _dir: dir,
    }
}

async fn stored(ctx: &PeersFxContext, collection: &str) -> usize {
    ctx.store
        .list(collection, &ListQuery::new())
        .await
        .unwrap()
        .len()
}

fn personal_info() -> PersonalInfo {
    PersonalInfo {
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
        date_of_birth: "1985-12-09".into(),
        phone_number: "+1 555 0100".into(),
        address: "7 Harbor Rd".into(),
        city: "Arlington".into(),
        country: "US".into(),
        postal_code: "22201".into(),
    }
}

fn image(name: &str) -> UploadFile {
    UploadFile::new(name, "image/jpeg", vec![0xFF; 256])
}

// ============================================================================
// Order creation
// ============================================================================

#[tokio::test]
async fn test_market_rate_quote_for_500_usd() {
    let form = OrderForm::new(OrderType::Sell, "USD", "EUR", "500");
    assert_eq!(form.effective_rate(), Decimal::new(85, 2));
    assert_eq!(form.total_display(), "425.00");
}

#[tokio::test]
async fn test_same_currency_never_reaches_the_store() {
    let h = harness().await;
    let mut sub = h.ctx.realtime.subscribe(MARKETPLACE_ORDERS).await.unwrap();
    let before = stored(&h.ctx, ORDERS).await;

    let user = demo::demo_user();
    let form = OrderForm::new(OrderType::Buy, "GBP", "GBP", "100");
    let err = h.ctx.order_form().submit(&form, Some(&user)).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(stored(&h.ctx, ORDERS).await, before);
    assert!(sub.try_recv().is_none());
    assert_eq!(h.toasts.titles(), vec!["Invalid Selection"]);
}

#[tokio::test]
async fn test_signed_out_submit_is_rejected() {
    let h = harness().await;
    let form = OrderForm::new(OrderType::Sell, "USD", "EUR", "10");
    let err = h.ctx.order_form().submit(&form, None).await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
}

// ============================================================================
// Marketplace reconciliation
// ============================================================================

#[tokio::test]
async fn test_new_order_reaches_subscribed_marketplace() {
    let h = harness().await;
    let user = demo::demo_user();
    let mut market = h.ctx.marketplace();
    assert_eq!(market.load().await, LoadOutcome::Loaded(4));
    assert!(market.subscribe().await);

    let form = OrderForm::new(OrderType::Sell, "USD", "EUR", "500");
    let created = h.ctx.order_form().submit(&form, Some(&user)).await.unwrap();

    let outcomes = market.poll_events(Some(&user));
    assert_eq!(outcomes, vec![EventOutcome::Inserted(created.id.clone())]);
    assert_eq!(market.orders().len(), 5);
    assert_eq!(market.orders()[0].id, created.id);
    assert_eq!(market.orders()[0].total_amount, Decimal::new(425, 0));
}

#[tokio::test]
async fn test_duplicate_and_unknown_events_leave_list_unchanged() {
    let h = harness().await;
    let mut market = h.ctx.marketplace();
    market.load().await;
    market.subscribe().await;
    let before: Vec<String> = market.orders().iter().map(|o| o.id.clone()).collect();

    let existing = market.orders()[0].clone();
    h.ctx
        .realtime
        .publish(MARKETPLACE_ORDERS, NEW_ORDER, json!({ "order": existing, "message": "again" }))
        .await
        .unwrap();
    h.ctx
        .realtime
        .publish(MARKETPLACE_ORDERS, ORDER_MATCHED, json!({ "orderId": "missing", "matchedBy": "x" }))
        .await
        .unwrap();

    let outcomes = market.poll_events(None);
    assert_eq!(
        outcomes,
        vec![
            EventOutcome::Duplicate(existing.id.clone()),
            EventOutcome::UnknownOrder("missing".to_string()),
        ]
    );
    let after: Vec<String> = market.orders().iter().map(|o| o.id.clone()).collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_filters_over_loaded_orders() {
    let h = harness().await;
    let mut market = h.ctx.marketplace();
    market.load().await;

    let buys = market.view(&MarketFilter::default().order_type(OrderType::Buy));
    assert!(!buys.is_empty());
    assert!(buys.iter().all(|o| o.order_type == OrderType::Buy));

    let usd_buys = market.view(
        &MarketFilter::default()
            .order_type(OrderType::Buy)
            .currency("USD"),
    );
    assert_eq!(usd_buys.len(), 1);
    assert!(usd_buys
        .iter()
        .all(|o| o.from_currency == "USD" || o.to_currency == "USD"));
}

#[tokio::test]
async fn test_store_outage_falls_back_to_sample_orders() {
    let dir = TempDir::new().unwrap();
    let toasts = Arc::new(RecordingToaster::new());
    let mut ctx = PeersFxContext::with_toasts(dir.path(), toasts.clone()).unwrap();
    ctx.store = Arc::new({
        let store = peersfx_core::adapters::InMemoryDataStore::new();
        store.set_offline(true);
        store
    });

    let mut market = ctx.marketplace();
    assert_eq!(market.load().await, LoadOutcome::Fallback(4));
    assert_eq!(toasts.titles(), vec!["Loading Error"]);
}

#[tokio::test]
async fn test_match_is_announced_to_other_clients() {
    let h = harness().await;
    let user = demo::demo_user();
    let mut mine = h.ctx.marketplace();
    let mut theirs = h.ctx.marketplace();
    mine.load().await;
    theirs.load().await;
    theirs.subscribe().await;

    let matched = mine.match_order("2", &user).await.unwrap();
    assert_eq!(matched.matched_with.as_deref(), Some(DEMO_USER_ID));

    let outcomes = theirs.poll_events(None);
    assert_eq!(outcomes, vec![EventOutcome::Matched("2".to_string())]);
    assert!(theirs.orders().iter().any(|o| o.id == "2" && !o.is_active()));

    assert!(mine.match_order("2", &user).await.is_err());
}

// ============================================================================
// KYC wizard
// ============================================================================

#[tokio::test]
async fn test_kyc_flow_end_to_end() {
    let h = harness().await;
    let user = demo::demo_user();
    let mut submissions = h.ctx.realtime.subscribe(KYC_SUBMISSIONS).await.unwrap();
    let mut wizard = h.ctx.kyc_wizard();

    wizard.set_personal_info(personal_info());
    wizard.submit_personal().unwrap();
    wizard.set_document_type(DocumentType::Passport);

    wizard
        .upload(DocumentSlot::Front, image("front.jpg"), Some(&user), None)
        .await
        .unwrap();
    assert!(wizard.submit_documents().is_err());
    assert_eq!(wizard.step(), KycStep::Document);

    wizard
        .upload(DocumentSlot::Selfie, image("selfie.jpg"), Some(&user), None)
        .await
        .unwrap();
    wizard.submit_documents().unwrap();
    assert_eq!(wizard.step(), KycStep::Review);

    let record = wizard.submit(Some(&user)).await.unwrap();
    assert_eq!(record.status, KycStatus::Pending);
    assert_eq!(record.user_id, DEMO_USER_ID);
    assert!(record.documents_uploaded.front && record.documents_uploaded.selfie);
    assert_eq!(wizard.step(), KycStep::Complete);
    assert_eq!(wizard.progress(), 100);

    assert_eq!(stored(&h.ctx, KYC_VERIFICATIONS).await, 1);
    let message = submissions.try_recv().unwrap();
    assert_eq!(message.event_type, NEW_SUBMISSION);
}

#[tokio::test]
async fn test_kyc_without_selfie_never_advances() {
    let h = harness().await;
    let user = demo::demo_user();
    let mut wizard = h.ctx.kyc_wizard();
    wizard.set_personal_info(personal_info());
    wizard.submit_personal().unwrap();
    wizard.set_document_type(DocumentType::DriversLicense);

    for slot in [DocumentSlot::Front, DocumentSlot::Back] {
        wizard
            .upload(slot, image("side.jpg"), Some(&user), None)
            .await
            .unwrap();
    }
    for _ in 0..3 {
        assert!(wizard.submit_documents().is_err());
    }
    assert_eq!(wizard.step(), KycStep::Document);
    assert_eq!(stored(&h.ctx, KYC_VERIFICATIONS).await, 0);
}

// ============================================================================
// Notifications
// ============================================================================

#[tokio::test]
async fn test_notification_inbox_follows_live_messages() {
    let h = harness().await;
    let user = demo::demo_user();
    let mut center = h.ctx.notification_center();

    assert_eq!(center.load(DEMO_USER_ID).await, LoadOutcome::Loaded(6));
    assert_eq!(center.unread_count(), 3);
    assert!(center.subscribe().await);

    h.ctx
        .realtime
        .publish(
            USER_NOTIFICATIONS,
            NEW_NOTIFICATION,
            json!({ "userId": DEMO_USER_ID, "title": "Order Matched", "message": "ORD-9", "type": "success" }),
        )
        .await
        .unwrap();
    h.ctx
        .realtime
        .publish(
            USER_NOTIFICATIONS,
            NEW_NOTIFICATION,
            json!({ "userId": "someone-else", "title": "Hidden", "message": "not yours" }),
        )
        .await
        .unwrap();

    let arrived = center.poll_events(&user);
    assert_eq!(arrived.len(), 1);
    assert_eq!(arrived[0].notification_type, NotificationType::Success);
    assert_eq!(center.unread_count(), 4);

    // Background persistence runs on the test runtime
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    assert_eq!(stored(&h.ctx, NOTIFICATIONS).await, 7);

    assert_eq!(center.mark_all_read().await, 4);
    assert!(center.view(ReadFilter::Unread, None).is_empty());
}

// ============================================================================
// Session and admin
// ============================================================================

#[tokio::test]
async fn test_session_signed_in_as_demo_user() {
    let h = harness().await;
    let mut session = h.ctx.session();
    let state = session.ready().await.unwrap();
    assert_eq!(state.user.map(|u| u.id), Some(DEMO_USER_ID.to_string()));
    assert!(matches!(session.resolve("/"), RouteDecision::Redirect(_)));
}

#[tokio::test]
async fn test_admin_console_from_context() {
    let h = harness().await;
    let mut console = h.ctx.admin_console();
    let overview = console.overview();
    assert_eq!(overview.orders.disputed, 1);

    let before = console.compliance.alerts().len();
    console.screen_order("ORD-001").unwrap();
    assert!(console.compliance.alerts().len() >= before);
}
