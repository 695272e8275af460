//! End-to-end routing scenarios against the in-memory host.
//!
//! Each test builds a small cast (the bot, employee `bill`, customer
//! `ted`), drives the plugin's hook surface, and asserts on the sends the
//! host recorded.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use employee_relay::config::{ForwardPolicy, PluginConfig};
use employee_relay::host::{Host, InMemoryHost};
use employee_relay::model::{
    tags, Actor, Application, IdentityStub, MessageEnvelope, OutboundPayload, RoutingIntent,
    SignedObject, EMPLOYEE_ROLE,
};
use employee_relay::plugin::Plugin;
use employee_relay::router::RouteRequest;

const BOT: &str = "the-bot";

fn setup() -> (Arc<InMemoryHost>, Plugin) {
    setup_with_config(PluginConfig::default())
}

fn setup_with_config(config: PluginConfig) -> (Arc<InMemoryHost>, Plugin) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let host = Arc::new(InMemoryHost::new(BOT));
    let plugin = Plugin::new(Arc::clone(&host) as Arc<dyn Host>, config);
    (host, plugin)
}

fn employee(id: &str) -> Actor {
    let mut actor = Actor::new(id);
    actor.roles.insert(EMPLOYEE_ROLE.to_string());
    actor
}

fn customer(id: &str) -> Actor {
    Actor::new(id)
}

fn simple_message(author: &str, text: &str) -> MessageEnvelope {
    MessageEnvelope::new(
        author,
        SignedObject::new(tags::SIMPLE_MESSAGE, json!({ "message": text })),
    )
}

fn assignment(author: &str, rm: &str, application: &str) -> MessageEnvelope {
    MessageEnvelope::new(
        author,
        SignedObject::new(
            tags::ASSIGN_RM,
            json!({
                "employee": { "permalink": rm },
                "application": { "id": application },
            }),
        ),
    )
}

fn judgment(author: &str, tag: &str, application: &str) -> MessageEnvelope {
    MessageEnvelope::new(
        author,
        SignedObject::new(tag, json!({ "application": { "id": application } })),
    )
}

fn application(id: &str, applicant: &str) -> Application {
    Application::new(id, IdentityStub::bare(applicant), "CurrentAccount")
}

fn sends_of_type<'a>(sent: &'a [RoutingIntent], tag: &str) -> Vec<&'a RoutingIntent> {
    sent.iter()
        .filter(|intent| intent.payload.type_tag() == Some(tag))
        .collect()
}

// ── Scenario A: RM assignment ───────────────────────────────────────

#[tokio::test]
async fn assignment_introduces_both_parties_and_verifies_the_rm() {
    let (host, plugin) = setup();
    let bill = employee("bill");
    host.add_actor(bill.clone()).await;
    host.add_actor(customer("ted")).await;

    let mut app = application("app-1", "ted");
    app.context = Some("ctx-1".to_string());
    host.add_application(app.clone()).await;

    let outcome = plugin
        .on_message(RouteRequest::new(
            bill,
            Some(app),
            assignment("bill", "bill", "app-1"),
        ))
        .await
        .unwrap();
    assert!(!outcome.continue_default);

    let sent = host.sent().await;
    assert_eq!(sent.len(), 3);

    let intros = sends_of_type(&sent, tags::INTRODUCTION);
    let mut intro_recipients: Vec<&str> = intros.iter().map(|intent| intent.to.as_str()).collect();
    intro_recipients.sort();
    assert_eq!(intro_recipients, ["bill", "ted"]);
    for intro in &intros {
        assert_eq!(intro.other.context.as_deref(), Some("ctx-1"));
    }

    let verifications = sends_of_type(&sent, tags::VERIFICATION);
    assert_eq!(verifications.len(), 1);
    assert_eq!(verifications[0].to, "bill");

    let stored = host.application("app-1").await.unwrap();
    assert!(stored.has_relationship_manager("bill"));
    assert_eq!(stored.relationship_managers.len(), 1);
}

// Assigning the same RM again is a no-op.
#[tokio::test]
async fn reassigning_the_same_rm_sends_nothing() {
    let (host, plugin) = setup();
    let bill = employee("bill");
    host.add_actor(bill.clone()).await;
    host.add_actor(customer("ted")).await;
    host.add_application(application("app-1", "ted")).await;

    let first = RouteRequest::new(
        bill.clone(),
        host.application("app-1").await,
        assignment("bill", "bill", "app-1"),
    );
    plugin.on_message(first).await.unwrap();
    let after_first = host.sent().await.len();

    // second assignment sees the mutated application, as the host re-resolves it
    let second = RouteRequest::new(
        bill,
        host.application("app-1").await,
        assignment("bill", "bill", "app-1"),
    );
    plugin.on_message(second).await.unwrap();

    let stored = host.application("app-1").await.unwrap();
    assert_eq!(stored.relationship_managers.len(), 1);
    assert_eq!(host.sent().await.len(), after_first);
}

// The applicant can never be their own RM.
#[tokio::test]
async fn self_assignment_is_rejected_with_a_notice() {
    let (host, plugin) = setup();
    // ted is both the applicant and an employee here
    let ted = employee("ted");
    host.add_actor(ted.clone()).await;
    host.add_application(application("app-1", "ted")).await;

    plugin
        .on_message(RouteRequest::new(
            ted,
            host.application("app-1").await,
            assignment("ted", "ted", "app-1"),
        ))
        .await
        .unwrap();

    let sent = host.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ted");
    assert_eq!(sent[0].payload.type_tag(), Some(tags::SIMPLE_MESSAGE));

    let stored = host.application("app-1").await.unwrap();
    assert!(stored.relationship_managers.is_empty());
}

#[tokio::test]
async fn assignment_from_non_employee_is_ignored() {
    let (host, plugin) = setup();
    let mallory = customer("mallory");
    host.add_actor(mallory.clone()).await;
    host.add_actor(customer("ted")).await;
    host.add_application(application("app-1", "ted")).await;

    plugin
        .on_message(RouteRequest::new(
            mallory,
            host.application("app-1").await,
            assignment("mallory", "mallory", "app-1"),
        ))
        .await
        .unwrap();

    assert!(host.sent().await.is_empty());
    let stored = host.application("app-1").await.unwrap();
    assert!(stored.relationship_managers.is_empty());
}

// ── Scenario B: default relay to the RM ─────────────────────────────

#[tokio::test]
async fn customer_message_relays_to_the_assigned_rm() {
    let (host, plugin) = setup();
    host.add_actor(employee("bill")).await;
    let ted = customer("ted");
    host.add_actor(ted.clone()).await;

    let mut app = application("app-1", "ted");
    app.relationship_managers.push(IdentityStub::bare("bill"));
    host.add_application(app.clone()).await;

    let message = simple_message("ted", "hey").with_context("ctx-1");
    let outcome = plugin
        .on_message(RouteRequest::new(ted, Some(app), message))
        .await
        .unwrap();
    assert!(outcome.continue_default);

    let sent = host.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "bill");
    assert_eq!(sent[0].other.original_sender.as_deref(), Some("ted"));
    assert_eq!(sent[0].other.context.as_deref(), Some("ctx-1"));
    assert_eq!(sent[0].payload.type_tag(), Some(tags::SIMPLE_MESSAGE));
}

#[tokio::test]
async fn customer_message_relays_to_every_assigned_rm() {
    let (host, plugin) = setup();
    host.add_actor(employee("bill")).await;
    host.add_actor(employee("alice")).await;
    let ted = customer("ted");
    host.add_actor(ted.clone()).await;

    let mut app = application("app-1", "ted");
    app.relationship_managers.push(IdentityStub::bare("bill"));
    app.relationship_managers.push(IdentityStub::bare("alice"));
    host.add_application(app.clone()).await;

    plugin
        .on_message(RouteRequest::new(ted, Some(app), simple_message("ted", "hey")))
        .await
        .unwrap();

    let mut recipients: Vec<String> = host.sent().await.iter().map(|i| i.to.clone()).collect();
    recipients.sort();
    assert_eq!(recipients, ["alice", "bill"]);
}

#[tokio::test]
async fn employee_message_on_application_is_not_relayed_back() {
    let (host, plugin) = setup();
    let bill = employee("bill");
    host.add_actor(bill.clone()).await;
    host.add_actor(customer("ted")).await;

    let mut app = application("app-1", "ted");
    app.relationship_managers.push(IdentityStub::bare("bill"));
    host.add_application(app.clone()).await;

    let outcome = plugin
        .on_message(RouteRequest::new(bill, Some(app), simple_message("bill", "hello")))
        .await
        .unwrap();

    assert!(outcome.continue_default);
    assert!(host.sent().await.is_empty());
}

// ── Scenario C: explicit forward from an employee ───────────────────

#[tokio::test]
async fn employee_forward_resigns_foreign_objects() {
    let (host, plugin) = setup();
    let bill = employee("bill");
    host.add_actor(bill.clone()).await;
    host.add_actor(customer("ted")).await;

    let mut message = simple_message("bill", "for ted").with_forward("ted");
    message.object.author = Some("bill".to_string());

    let outcome = plugin
        .on_message(RouteRequest::new(bill, None, message))
        .await
        .unwrap();
    assert!(!outcome.continue_default);

    let sent = host.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ted");
    assert_eq!(sent[0].other.original_sender.as_deref(), Some("bill"));
    match &sent[0].payload {
        OutboundPayload::Object { object } => {
            // re-signed under the bot's identity
            assert_eq!(object.author.as_deref(), Some(BOT));
        }
        other => panic!("expected an object payload, got {other:?}"),
    }
}

#[tokio::test]
async fn employee_forward_skips_resigning_the_bots_own_objects() {
    let (host, plugin) = setup();
    let bill = employee("bill");
    host.add_actor(bill.clone()).await;
    host.add_actor(customer("ted")).await;

    let mut message = simple_message("bill", "from the bot").with_forward("ted");
    message.object.author = Some(BOT.to_string());
    message.object.signature = Some("original-signature".to_string());

    plugin
        .on_message(RouteRequest::new(bill, None, message))
        .await
        .unwrap();

    let sent = host.sent().await;
    assert_eq!(sent.len(), 1);
    match &sent[0].payload {
        OutboundPayload::Object { object } => {
            assert_eq!(object.signature.as_deref(), Some("original-signature"));
        }
        other => panic!("expected an object payload, got {other:?}"),
    }
}

#[tokio::test]
async fn employee_forward_to_the_bot_itself_is_refused() {
    let (host, plugin) = setup();
    let bill = employee("bill");
    host.add_actor(bill.clone()).await;

    let message = simple_message("bill", "loop").with_forward(BOT);
    let outcome = plugin
        .on_message(RouteRequest::new(bill, None, message))
        .await
        .unwrap();

    assert!(!outcome.continue_default);
    assert!(host.sent().await.is_empty());
}

// ── Scenario D: forward gating for customers ────────────────────────

// Customer forwarding works only toward an employee.
#[tokio::test]
async fn customer_forward_to_employee_relays_without_resigning() {
    let (host, plugin) = setup();
    host.add_actor(employee("bill")).await;
    let ted = customer("ted");
    host.add_actor(ted.clone()).await;

    let mut message = simple_message("ted", "for bill").with_forward("bill");
    message.object.author = Some("ted".to_string());
    message.object.signature = Some("teds-signature".to_string());

    plugin
        .on_message(RouteRequest::new(ted, None, message))
        .await
        .unwrap();

    let sent = host.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "bill");
    assert_eq!(sent[0].other.original_sender.as_deref(), Some("ted"));
    match &sent[0].payload {
        OutboundPayload::Object { object } => {
            assert_eq!(object.signature.as_deref(), Some("teds-signature"));
        }
        other => panic!("expected an object payload, got {other:?}"),
    }
}

#[tokio::test]
async fn customer_forward_to_non_employee_is_refused() {
    let (host, plugin) = setup();
    let ted = customer("ted");
    host.add_actor(ted.clone()).await;
    host.add_actor(customer("carol")).await;

    let message = simple_message("ted", "psst").with_forward("carol");
    let outcome = plugin
        .on_message(RouteRequest::new(ted, None, message))
        .await
        .unwrap();

    // forward suppresses default processing regardless of outcome
    assert!(!outcome.continue_default);
    assert!(host.sent().await.is_empty());
}

#[tokio::test]
async fn customer_forward_to_unknown_target_is_refused() {
    let (host, plugin) = setup();
    let ted = customer("ted");
    host.add_actor(ted.clone()).await;

    let message = simple_message("ted", "psst").with_forward("nobody");
    let outcome = plugin
        .on_message(RouteRequest::new(ted, None, message))
        .await
        .unwrap();

    assert!(!outcome.continue_default);
    assert!(host.sent().await.is_empty());
}

// ── Forward policy veto ─────────────────────────────────────────────

struct DenyAll;

#[async_trait]
impl ForwardPolicy for DenyAll {
    async fn should_forward_from_employee(
        &self,
        _sender: &Actor,
        _message: &MessageEnvelope,
        _target: &str,
    ) -> bool {
        false
    }

    async fn should_forward_to_employee(
        &self,
        _sender: &Actor,
        _message: &MessageEnvelope,
        _target: &str,
    ) -> bool {
        false
    }
}

#[tokio::test]
async fn forward_policy_can_veto_both_directions() {
    let host = Arc::new(InMemoryHost::new(BOT));
    let plugin = Plugin::with_policy(
        Arc::clone(&host) as Arc<dyn Host>,
        PluginConfig::default(),
        Arc::new(DenyAll),
    );
    let bill = employee("bill");
    let ted = customer("ted");
    host.add_actor(bill.clone()).await;
    host.add_actor(ted.clone()).await;

    let from_employee = simple_message("bill", "x").with_forward("ted");
    plugin
        .on_message(RouteRequest::new(bill, None, from_employee))
        .await
        .unwrap();

    let to_employee = simple_message("ted", "y").with_forward("bill");
    plugin
        .on_message(RouteRequest::new(ted, None, to_employee))
        .await
        .unwrap();

    assert!(host.sent().await.is_empty());
}

// ── Context-based discovery ─────────────────────────────────────────

#[tokio::test]
async fn contextless_application_free_message_goes_nowhere() {
    let (host, plugin) = setup();
    let ted = customer("ted");
    host.add_actor(ted.clone()).await;

    let outcome = plugin
        .on_message(RouteRequest::new(ted, None, simple_message("ted", "hello?")))
        .await
        .unwrap();

    assert!(outcome.continue_default);
    assert!(host.sent().await.is_empty());
}

#[tokio::test]
async fn context_discovery_forwards_to_the_employee_behind_the_thread() {
    let (host, plugin) = setup();
    host.add_actor(employee("bill")).await;
    let ted = customer("ted");
    host.add_actor(ted.clone()).await;

    host.record_inbound(simple_message("bill", "anything else you need?").with_context("ctx-9"))
        .await;

    let message = simple_message("ted", "yes actually").with_context("ctx-9");
    plugin
        .on_message(RouteRequest::new(ted, None, message))
        .await
        .unwrap();

    let sent = host.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "bill");
    assert_eq!(sent[0].other.context.as_deref(), Some("ctx-9"));
    assert_eq!(sent[0].other.original_sender.as_deref(), Some("ted"));
}

#[tokio::test]
async fn context_discovery_ignores_non_employee_authors() {
    let (host, plugin) = setup();
    host.add_actor(customer("carol")).await;
    let ted = customer("ted");
    host.add_actor(ted.clone()).await;

    host.record_inbound(simple_message("carol", "hi").with_context("ctx-9"))
        .await;

    plugin
        .on_message(RouteRequest::new(
            ted,
            None,
            simple_message("ted", "hi again").with_context("ctx-9"),
        ))
        .await
        .unwrap();

    assert!(host.sent().await.is_empty());
}

// ── Judgment ────────────────────────────────────────────────────────

// The applicant can never judge their own application.
#[tokio::test]
async fn self_approval_is_blocked_with_a_notice() {
    let (host, plugin) = setup();
    let ted = employee("ted");
    host.add_actor(ted.clone()).await;
    host.add_application(application("app-1", "ted")).await;

    plugin
        .on_message(RouteRequest::new(
            ted,
            host.application("app-1").await,
            judgment("ted", tags::APPROVAL, "app-1"),
        ))
        .await
        .unwrap();

    let sent = host.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ted");
    assert_eq!(sent[0].payload.type_tag(), Some(tags::SIMPLE_MESSAGE));

    // the application is still judgeable: a real judge succeeds afterwards
    let bill = employee("bill");
    host.add_actor(bill.clone()).await;
    plugin
        .on_message(RouteRequest::new(
            bill,
            host.application("app-1").await,
            judgment("bill", tags::APPROVAL, "app-1"),
        ))
        .await
        .unwrap();
    assert_eq!(host.sent().await.len(), 1); // no new notice
}

#[tokio::test]
async fn judging_twice_notifies_the_second_judge() {
    let (host, plugin) = setup();
    let bill = employee("bill");
    let alice = employee("alice");
    host.add_actor(bill.clone()).await;
    host.add_actor(alice.clone()).await;
    host.add_actor(customer("ted")).await;
    host.add_application(application("app-1", "ted")).await;

    plugin
        .on_message(RouteRequest::new(
            bill,
            host.application("app-1").await,
            judgment("bill", tags::APPROVAL, "app-1"),
        ))
        .await
        .unwrap();
    assert!(host.sent().await.is_empty());

    plugin
        .on_message(RouteRequest::new(
            alice,
            host.application("app-1").await,
            judgment("alice", tags::DENIAL, "app-1"),
        ))
        .await
        .unwrap();

    let sent = host.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "alice");
    assert_eq!(sent[0].payload.type_tag(), Some(tags::SIMPLE_MESSAGE));
}

#[tokio::test]
async fn aborted_judgment_sends_a_structured_error() {
    let (host, plugin) = setup();
    let bill = employee("bill");
    host.add_actor(bill.clone()).await;
    host.add_actor(customer("ted")).await;
    host.add_application(application("app-1", "ted")).await;
    host.abort_next_judgment().await;

    plugin
        .on_message(RouteRequest::new(
            bill,
            host.application("app-1").await,
            judgment("bill", tags::APPROVAL, "app-1"),
        ))
        .await
        .unwrap();

    let sent = host.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "bill");
    assert_eq!(sent[0].payload.type_tag(), Some(tags::REQUEST_ERROR));
}

#[tokio::test]
async fn judgment_resolves_the_application_from_its_payload() {
    let (host, plugin) = setup();
    let bill = employee("bill");
    host.add_actor(bill.clone()).await;
    host.add_actor(customer("ted")).await;
    host.add_application(application("app-1", "ted")).await;

    // no application attached to the request; the payload names it
    plugin
        .on_message(RouteRequest::new(
            bill,
            None,
            judgment("bill", tags::DENIAL, "app-1"),
        ))
        .await
        .unwrap();

    // denial succeeded: a second judgment draws the duplicate notice
    let alice = employee("alice");
    host.add_actor(alice.clone()).await;
    plugin
        .on_message(RouteRequest::new(
            alice,
            None,
            judgment("alice", tags::APPROVAL, "app-1"),
        ))
        .await
        .unwrap();
    assert_eq!(host.sent().await.len(), 1);
}

// ── Share requests ──────────────────────────────────────────────────

#[tokio::test]
async fn share_request_fans_out_links_times_recipients() {
    let (host, plugin) = setup();
    let bill = employee("bill");
    host.add_actor(bill.clone()).await;

    let message = MessageEnvelope::new(
        "bill",
        SignedObject::new(
            tags::SHARE_REQUEST,
            json!({
                "links": ["link-a", "link-b"],
                "with": [{ "permalink": "ted" }, { "permalink": "carol" }],
            }),
        ),
    )
    .with_context("ctx-3");

    let outcome = plugin
        .on_message(RouteRequest::new(bill, None, message))
        .await
        .unwrap();
    assert!(!outcome.continue_default);

    let sent = host.sent().await;
    assert_eq!(sent.len(), 4);
    for intent in &sent {
        assert!(matches!(&intent.payload, OutboundPayload::Link { .. }));
        assert_eq!(intent.other.original_sender.as_deref(), Some("bill"));
        assert_eq!(intent.other.context.as_deref(), Some("ctx-3"));
    }
}

// ── Form requests and corrections ───────────────────────────────────

#[tokio::test]
async fn employee_form_request_is_relayed_to_the_applicant() {
    let (host, plugin) = setup();
    let bill = employee("bill");
    host.add_actor(bill.clone()).await;
    host.add_actor(customer("ted")).await;
    host.add_application(application("app-1", "ted")).await;

    let mut message = MessageEnvelope::new(
        "bill",
        SignedObject::new(tags::FORM_REQUEST, json!({ "form": "Passport" })),
    );
    message.object.signature = Some("bills-signature".to_string());

    let outcome = plugin
        .on_message(RouteRequest::new(bill, host.application("app-1").await, message))
        .await
        .unwrap();
    assert!(!outcome.continue_default);

    let requests = host.item_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].user, "ted");
    assert_eq!(requests[0].other.original_sender.as_deref(), Some("bill"));
    assert!(requests[0].item.signature.is_none());
}

#[tokio::test]
async fn employee_form_error_requests_an_edit() {
    let (host, plugin) = setup();
    let bill = employee("bill");
    host.add_actor(bill.clone()).await;
    host.add_actor(customer("ted")).await;
    host.add_application(application("app-1", "ted")).await;

    let message = MessageEnvelope::new(
        "bill",
        SignedObject::new(tags::FORM_ERROR, json!({ "message": "name mismatch" })),
    );

    plugin
        .on_message(RouteRequest::new(bill, host.application("app-1").await, message))
        .await
        .unwrap();

    let requests = host.edit_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].user, "ted");
    assert_eq!(requests[0].details.body["message"], "name mismatch");
}

// ── Verification passthrough ────────────────────────────────────────

#[tokio::test]
async fn employee_verification_defers_to_default_import() {
    let (host, plugin) = setup();
    let bill = employee("bill");
    host.add_actor(bill.clone()).await;
    host.add_actor(customer("ted")).await;
    host.add_application(application("app-1", "ted")).await;

    let message = MessageEnvelope::new(
        "bill",
        SignedObject::new(tags::VERIFICATION, json!({ "document": { "id": "form-1" } })),
    );

    let outcome = plugin
        .on_message(RouteRequest::new(bill, host.application("app-1").await, message))
        .await
        .unwrap();

    assert!(outcome.continue_default);
    assert!(host.sent().await.is_empty());
}

// ── Envelope wrapping ───────────────────────────────────────────────

#[tokio::test]
async fn wrap_config_forwards_the_whole_envelope() {
    let config = PluginConfig {
        wrap_entire_message_when_forwarding: true,
        ..PluginConfig::default()
    };
    let (host, plugin) = setup_with_config(config);
    host.add_actor(employee("bill")).await;
    let ted = customer("ted");
    host.add_actor(ted.clone()).await;

    let mut app = application("app-1", "ted");
    app.relationship_managers.push(IdentityStub::bare("bill"));
    host.add_application(app.clone()).await;

    plugin
        .on_message(RouteRequest::new(ted, Some(app), simple_message("ted", "hey")))
        .await
        .unwrap();

    let sent = host.sent().await;
    assert_eq!(sent.len(), 1);
    match &sent[0].payload {
        OutboundPayload::Envelope { envelope } => {
            assert_eq!(envelope.author, "ted");
            assert_eq!(envelope.object.body["message"], "hey");
        }
        other => panic!("expected an envelope payload, got {other:?}"),
    }
}

// ── Unknown object kinds ────────────────────────────────────────────

#[tokio::test]
async fn unknown_object_kinds_still_relay_to_the_rm() {
    let (host, plugin) = setup();
    host.add_actor(employee("bill")).await;
    let ted = customer("ted");
    host.add_actor(ted.clone()).await;

    let mut app = application("app-1", "ted");
    app.relationship_managers.push(IdentityStub::bare("bill"));
    host.add_application(app.clone()).await;

    let message = MessageEnvelope::new(
        "ted",
        SignedObject::new("SomeCustomForm", json!({ "field": "value" })),
    );
    plugin
        .on_message(RouteRequest::new(ted, Some(app), message))
        .await
        .unwrap();

    let sent = host.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "bill");
    assert_eq!(sent[0].payload.type_tag(), Some("SomeCustomForm"));
}
