//! End-to-end tests for the event processing pipeline.

use database::catalog::{insert_catalog, upsert_link};
use database::models::Property;
use database::property::insert_property;
use database::{Database, NewCatalog};
use orchestrator::{
    Engine, Outcome, RecordingSender, SentItem, SqlKnowledgeSearch, SqlListingSearch,
    WELCOME_TEXT,
};
use convo_core::FixedReplyGenerator;
use whatsapp_api::{InboundEvent, InboundMessage, MessageContent, OutboundEvent, WebhookEvent};

const PHONE: &str = "+573001112233";
const REPLY: &str = "Claro, te cuento.";

async fn test_db() -> Database {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    db
}

fn engine<'a>(
    db: &Database,
    sender: &'a RecordingSender,
) -> Engine<FixedReplyGenerator, SqlListingSearch, SqlKnowledgeSearch, &'a RecordingSender> {
    Engine::new(
        db.pool().clone(),
        FixedReplyGenerator::new(REPLY),
        SqlListingSearch::new(db.pool().clone()),
        SqlKnowledgeSearch::new(db.pool().clone()),
        sender,
    )
}

fn inbound(event_id: &str, text: &str) -> WebhookEvent {
    WebhookEvent::MessageReceived(InboundEvent {
        id: event_id.to_string(),
        from: PHONE.to_string(),
        contact_name: Some("Juan".to_string()),
        message: InboundMessage {
            id: Some(format!("wamid.{}", event_id)),
            content: MessageContent::Text {
                body: text.to_string(),
            },
        },
    })
}

fn outbound(event_id: &str) -> WebhookEvent {
    WebhookEvent::MessageSent(OutboundEvent {
        id: event_id.to_string(),
        to: PHONE.to_string(),
    })
}

async fn seed_property(db: &Database, id: &str, name: &str, location: &str) {
    insert_property(
        db.pool(),
        &Property {
            id: id.to_string(),
            name: name.to_string(),
            description: "Finca con piscina".to_string(),
            location: location.to_string(),
            price_base: 500_000,
            price_low_season: None,
            capacity: Some(10),
            images: "[]".to_string(),
        },
    )
    .await
    .unwrap();
}

async fn seed_catalog(
    db: &Database,
    name: &str,
    keyword: Option<&str>,
    is_default: bool,
    order: i64,
) -> i64 {
    insert_catalog(
        db.pool(),
        &NewCatalog {
            name: name.to_string(),
            catalog_id: format!("ext-{}", name),
            is_default,
            location_keyword: keyword.map(|k| k.to_string()),
            order_index: order,
        },
    )
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn new_conversation_gets_welcome_only() {
    let db = test_db().await;
    seed_property(&db, "p1", "Villa Green", "Restrepo").await;
    let catalog_id = seed_catalog(&db, "main", None, true, 0).await;
    upsert_link(db.pool(), "p1", catalog_id, "prod-1").await.unwrap();

    let sender = RecordingSender::new();
    let engine = engine(&db, &sender);

    // Even a message that would trigger a catalog card must short-circuit
    // to the welcome on a brand-new conversation.
    let outcome = engine
        .handle_event(inbound("evt-1", "quiero ver la finca de villa green"))
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Welcomed { .. }));

    let sent = sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0],
        SentItem::Text {
            to: PHONE.to_string(),
            body: WELCOME_TEXT.to_string(),
            direct: true,
        }
    );
}

#[tokio::test]
async fn duplicate_event_is_processed_once() {
    let db = test_db().await;
    let sender = RecordingSender::new();
    let engine = engine(&db, &sender);

    let first = engine.handle_event(inbound("evt-1", "hola")).await.unwrap();
    let Outcome::Welcomed { conversation_id } = first else {
        panic!("expected welcome, got {:?}", first);
    };

    let second = engine.handle_event(inbound("evt-1", "hola")).await.unwrap();
    assert_eq!(
        second,
        Outcome::Skipped {
            reason: "duplicate event".to_string()
        }
    );

    // Exactly one conversation mutation and one outbound send.
    assert_eq!(sender.sent().len(), 1);
    let count = database::message::count_messages(db.pool(), conversation_id)
        .await
        .unwrap();
    assert_eq!(count, 2); // welcome + the user message
}

#[tokio::test]
async fn replies_are_gated_by_status() {
    let db = test_db().await;
    let sender = RecordingSender::new();
    let engine = engine(&db, &sender);

    let Outcome::Welcomed { conversation_id } =
        engine.handle_event(inbound("evt-1", "hola")).await.unwrap()
    else {
        panic!("expected welcome");
    };

    orchestrator::conversation::escalate_to_human(db.pool(), conversation_id)
        .await
        .unwrap();
    let sends_before = sender.sent().len();

    let outcome = engine
        .handle_event(inbound("evt-2", "sigo esperando"))
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Stored { .. }));

    // The message is persisted even though no reply goes out.
    assert_eq!(sender.sent().len(), sends_before);
    let count = database::message::count_messages(db.pool(), conversation_id)
        .await
        .unwrap();
    assert_eq!(count, 3);
}

#[tokio::test]
async fn resolved_conversation_is_reused_without_new_welcome() {
    let db = test_db().await;
    let sender = RecordingSender::new();
    let engine = engine(&db, &sender);

    let Outcome::Welcomed { conversation_id } =
        engine.handle_event(inbound("evt-1", "hola")).await.unwrap()
    else {
        panic!("expected welcome");
    };

    orchestrator::conversation::resolve(db.pool(), conversation_id)
        .await
        .unwrap();

    let outcome = engine
        .handle_event(inbound("evt-2", "una pregunta más"))
        .await
        .unwrap();
    match outcome {
        Outcome::Replied {
            conversation_id: replied_id,
            ..
        } => assert_eq!(replied_id, conversation_id),
        other => panic!("expected reply on reused conversation, got {:?}", other),
    }

    // The welcome script appears exactly once in the transcript.
    let messages = database::message::recent_messages(db.pool(), conversation_id, 50)
        .await
        .unwrap();
    let welcomes = messages.iter().filter(|m| m.content == WELCOME_TEXT).count();
    assert_eq!(welcomes, 1);
}

#[tokio::test]
async fn single_listing_request_sends_product_card() {
    let db = test_db().await;
    seed_property(&db, "p1", "Villa Green", "Restrepo").await;
    let catalog_id = seed_catalog(&db, "main", None, true, 0).await;
    upsert_link(db.pool(), "p1", catalog_id, "prod-1").await.unwrap();

    let sender = RecordingSender::new();
    let engine = engine(&db, &sender);

    engine.handle_event(inbound("evt-1", "hola")).await.unwrap();

    let outcome = engine
        .handle_event(inbound("evt-2", "quiero ver la finca de villa green"))
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Replied { card_sent: true, .. }));

    let sent = sender.sent();
    // welcome, card, text reply
    assert_eq!(sent.len(), 3);
    match &sent[1] {
        SentItem::Card {
            catalog_id,
            product_ids,
            ..
        } => {
            assert_eq!(catalog_id, "ext-main");
            assert_eq!(product_ids, &vec!["prod-1".to_string()]);
        }
        other => panic!("expected card, got {:?}", other),
    }
    match &sent[2] {
        SentItem::Text { body, direct, .. } => {
            assert_eq!(body, REPLY);
            assert!(!direct);
        }
        other => panic!("expected text reply, got {:?}", other),
    }
}

#[tokio::test]
async fn unlinked_listing_still_gets_text_reply() {
    let db = test_db().await;
    seed_property(&db, "p1", "Villa Green", "Restrepo").await;
    // No catalogs at all.

    let sender = RecordingSender::new();
    let engine = engine(&db, &sender);

    engine.handle_event(inbound("evt-1", "hola")).await.unwrap();
    let outcome = engine
        .handle_event(inbound("evt-2", "quiero ver la finca de villa green"))
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Replied { card_sent: false, .. }));
    let cards = sender
        .sent()
        .iter()
        .filter(|s| matches!(s, SentItem::Card { .. }))
        .count();
    assert_eq!(cards, 0);
}

#[tokio::test]
async fn availability_request_sends_product_list() {
    let db = test_db().await;
    seed_property(&db, "p1", "Villa Green", "Restrepo").await;
    seed_property(&db, "p2", "Casa Roja", "Restrepo").await;
    seed_catalog(&db, "bogota", Some("bogota"), true, 0).await;
    let restrepo = seed_catalog(&db, "restrepo", Some("restrepo"), false, 1).await;
    upsert_link(db.pool(), "p1", restrepo, "prod-1").await.unwrap();
    upsert_link(db.pool(), "p2", restrepo, "prod-2").await.unwrap();

    let sender = RecordingSender::new();
    let engine = engine(&db, &sender);

    engine.handle_event(inbound("evt-1", "hola")).await.unwrap();
    let outcome = engine
        .handle_event(inbound("evt-2", "para restrepo del 20 al 21 para 10 personas"))
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Replied { card_sent: true, .. }));

    let sent = sender.sent();
    match &sent[1] {
        SentItem::Card {
            catalog_id,
            product_ids,
            ..
        } => {
            // The region catalog wins over the default.
            assert_eq!(catalog_id, "ext-restrepo");
            assert_eq!(product_ids.len(), 2);
        }
        other => panic!("expected card, got {:?}", other),
    }
}

#[tokio::test]
async fn availability_falls_back_to_default_catalog() {
    let db = test_db().await;
    seed_property(&db, "p1", "Villa Green", "Restrepo").await;
    let bogota = seed_catalog(&db, "bogota", Some("bogota"), true, 0).await;
    seed_catalog(&db, "restrepo", Some("restrepo"), false, 1).await;
    // Linked only in the default catalog.
    upsert_link(db.pool(), "p1", bogota, "prod-9").await.unwrap();

    let sender = RecordingSender::new();
    let engine = engine(&db, &sender);

    engine.handle_event(inbound("evt-1", "hola")).await.unwrap();
    let outcome = engine
        .handle_event(inbound("evt-2", "en restrepo del 5 al 8"))
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Replied { card_sent: true, .. }));

    match &sender.sent()[1] {
        SentItem::Card { catalog_id, .. } => assert_eq!(catalog_id, "ext-bogota"),
        other => panic!("expected card, got {:?}", other),
    }
}

#[tokio::test]
async fn outbound_business_message_marks_human() {
    let db = test_db().await;
    let sender = RecordingSender::new();
    let engine = engine(&db, &sender);

    // No conversation yet: a no-op.
    let outcome = engine.handle_event(outbound("evt-0")).await.unwrap();
    assert!(matches!(outcome, Outcome::Skipped { .. }));

    engine.handle_event(inbound("evt-1", "hola")).await.unwrap();

    let outcome = engine.handle_event(outbound("evt-2")).await.unwrap();
    assert!(matches!(outcome, Outcome::MarkedHuman { .. }));

    // Automation is now silent.
    let sends_before = sender.sent().len();
    let outcome = engine
        .handle_event(inbound("evt-3", "gracias"))
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Stored { .. }));
    assert_eq!(sender.sent().len(), sends_before);
}

#[tokio::test]
async fn media_without_content_is_ignored() {
    let db = test_db().await;
    let sender = RecordingSender::new();
    let engine = engine(&db, &sender);

    let event = WebhookEvent::MessageReceived(InboundEvent {
        id: "evt-1".to_string(),
        from: PHONE.to_string(),
        contact_name: None,
        message: InboundMessage {
            id: None,
            content: MessageContent::Image {
                caption: None,
                media_id: None,
            },
        },
    });

    let outcome = engine.handle_event(event).await.unwrap();
    assert!(matches!(outcome, Outcome::Skipped { .. }));
    assert!(sender.sent().is_empty());
}

#[tokio::test]
async fn audio_message_is_stored_with_placeholder() {
    let db = test_db().await;
    let sender = RecordingSender::new();
    let engine = engine(&db, &sender);

    let event = WebhookEvent::MessageReceived(InboundEvent {
        id: "evt-1".to_string(),
        from: PHONE.to_string(),
        contact_name: None,
        message: InboundMessage {
            id: Some("wamid.audio".to_string()),
            content: MessageContent::Audio {
                media_id: Some("media-1".to_string()),
            },
        },
    });

    let Outcome::Welcomed { conversation_id } = engine.handle_event(event).await.unwrap() else {
        panic!("expected welcome");
    };

    let messages = database::message::recent_messages(db.pool(), conversation_id, 10)
        .await
        .unwrap();
    assert!(messages.iter().any(|m| m.content == "[Audio]"));
}

#[tokio::test]
async fn unknown_event_is_acknowledged_and_skipped() {
    let db = test_db().await;
    let sender = RecordingSender::new();
    let engine = engine(&db, &sender);

    let outcome = engine.handle_event(WebhookEvent::Unknown).await.unwrap();
    assert_eq!(
        outcome,
        Outcome::Skipped {
            reason: "unknown event type".to_string()
        }
    );
}
