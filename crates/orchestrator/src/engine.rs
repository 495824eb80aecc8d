//! The conversation engine: webhook events in, bookkeeping and replies out.

use chrono::NaiveDate;
use convo_core::{
    build_system_prompt, ChatTurn, IntentParser, KnowledgeSearch, ListingSearch, ListingSummary,
    PatternIntentParser, PromptContext, ReplyGenerator, StayQuery,
};
use database::models::{Conversation, ConversationStatus, SenderRole};
use database::SqlitePool;
use tracing::{debug, info, warn};
use whatsapp_api::{InboundEvent, OutboundEvent, WebhookEvent};

use crate::conversation::{ensure_conversation, WELCOME_TEXT};
use crate::error::EngineError;
use crate::sender::MessageSender;

/// Tunables for the reply pipeline.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How many recent messages feed the generator.
    pub history_limit: i64,
    /// How many knowledge snippets feed the prompt.
    pub knowledge_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: 12,
            knowledge_limit: 4,
        }
    }
}

/// Result of processing a single webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A fresh conversation was started and the welcome script sent.
    Welcomed { conversation_id: i64 },
    /// An automated reply was produced (with or without a catalog card).
    Replied {
        conversation_id: i64,
        card_sent: bool,
    },
    /// The message was persisted but no reply was produced.
    Stored {
        conversation_id: i64,
        reason: String,
    },
    /// An outbound business message moved the conversation to human.
    MarkedHuman { phone: String },
    /// The event required no work.
    Skipped { reason: String },
}

impl Outcome {
    /// Short human-readable form for the webhook acknowledgement.
    pub fn summary(&self) -> String {
        match self {
            Self::Welcomed { .. } => "welcome sent".to_string(),
            Self::Replied { card_sent: true, .. } => "catalog and reply sent".to_string(),
            Self::Replied { .. } => "reply sent".to_string(),
            Self::Stored { reason, .. } => format!("stored: {}", reason),
            Self::MarkedHuman { .. } => "conversation marked human".to_string(),
            Self::Skipped { reason } => format!("skipped: {}", reason),
        }
    }
}

/// The engine ties the stores, the intent parser, the catalog resolver, and
/// the collaborators together.
///
/// Each webhook invocation runs the sequential pipeline: dedup, contact and
/// conversation bookkeeping, message persistence, then the state-gated
/// reply. Only remote catalog sync runs in the background, elsewhere.
pub struct Engine<G, L, K, S> {
    pool: SqlitePool,
    generator: G,
    listings: L,
    knowledge: K,
    sender: S,
    parser: Box<dyn IntentParser>,
    config: EngineConfig,
}

impl<G, L, K, S> Engine<G, L, K, S>
where
    G: ReplyGenerator,
    L: ListingSearch,
    K: KnowledgeSearch,
    S: MessageSender,
{
    /// Create an engine with the default parser and config.
    pub fn new(pool: SqlitePool, generator: G, listings: L, knowledge: K, sender: S) -> Self {
        Self {
            pool,
            generator,
            listings,
            knowledge,
            sender,
            parser: Box::new(PatternIntentParser),
            config: EngineConfig::default(),
        }
    }

    /// Override the engine config.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Swap the intent parsing strategy.
    pub fn with_parser(mut self, parser: Box<dyn IntentParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Process one webhook event end-to-end.
    pub async fn handle_event(&self, event: WebhookEvent) -> Result<Outcome, EngineError> {
        match event {
            WebhookEvent::MessageReceived(inbound) => self.handle_inbound(inbound).await,
            WebhookEvent::MessageSent(outbound) => self.handle_outbound(outbound).await,
            WebhookEvent::Unknown => {
                debug!("Ignoring unknown webhook event type");
                Ok(Outcome::Skipped {
                    reason: "unknown event type".to_string(),
                })
            }
        }
    }

    /// The business sent a message through the channel directly: stop
    /// automating the active conversation.
    async fn handle_outbound(&self, event: OutboundEvent) -> Result<Outcome, EngineError> {
        if !database::processed_event::try_record(&self.pool, &event.id).await? {
            info!(event_id = %event.id, "Duplicate event; skipping");
            return Ok(Outcome::Skipped {
                reason: "duplicate event".to_string(),
            });
        }

        if database::conversation::mark_human_on_outbound(&self.pool, &event.to).await? {
            info!(phone = %event.to, "Outbound business message; conversation moved to human");
            Ok(Outcome::MarkedHuman { phone: event.to })
        } else {
            Ok(Outcome::Skipped {
                reason: "no active conversation".to_string(),
            })
        }
    }

    async fn handle_inbound(&self, event: InboundEvent) -> Result<Outcome, EngineError> {
        let Some(text) = event.message.content.display_text() else {
            debug!(
                event_id = %event.id,
                kind = event.message.content.kind(),
                "No text or media reference; ignoring"
            );
            return Ok(Outcome::Skipped {
                reason: "no displayable content".to_string(),
            });
        };

        // Record the event id before any side-effecting work: webhook
        // retries must not produce a second reply.
        if !database::processed_event::try_record(&self.pool, &event.id).await? {
            info!(event_id = %event.id, "Duplicate event; skipping");
            return Ok(Outcome::Skipped {
                reason: "duplicate event".to_string(),
            });
        }

        database::contact::upsert_contact(&self.pool, &event.from, event.contact_name.as_deref())
            .await?;
        let (conversation, created) = ensure_conversation(&self.pool, &event.from).await?;

        database::message::append_message(&self.pool, conversation.id, SenderRole::User, &text)
            .await?;

        if created {
            // Fresh conversation: the exact welcome script, nothing else.
            if let Err(e) = self.sender.send_text(&event.from, WELCOME_TEXT, None, true).await {
                warn!(conversation_id = conversation.id, "Failed to send welcome: {}", e);
            }
            return Ok(Outcome::Welcomed {
                conversation_id: conversation.id,
            });
        }

        // Re-read the status now that the message is persisted; an
        // escalation racing this request must win.
        let conversation =
            database::conversation::get_conversation(&self.pool, conversation.id).await?;
        if conversation.status != ConversationStatus::Ai {
            info!(
                conversation_id = conversation.id,
                status = conversation.status.as_str(),
                "Automation gated; message stored only"
            );
            return Ok(Outcome::Stored {
                conversation_id: conversation.id,
                reason: format!("conversation is {}", conversation.status.as_str()),
            });
        }

        let wamid = event.message.id.as_deref();
        match self.reply(&conversation, &text, wamid).await {
            Ok(card_sent) => Ok(Outcome::Replied {
                conversation_id: conversation.id,
                card_sent,
            }),
            Err(e) => {
                // The user's message and bookkeeping are already persisted;
                // a failed reply must not fail the event.
                warn!(conversation_id = conversation.id, "Reply pipeline failed: {}", e);
                Ok(Outcome::Stored {
                    conversation_id: conversation.id,
                    reason: format!("reply failed: {}", e),
                })
            }
        }
    }

    /// Card decisions, context assembly, generation, then persist and send.
    async fn reply(
        &self,
        conversation: &Conversation,
        text: &str,
        wamid: Option<&str>,
    ) -> Result<bool, EngineError> {
        let mut context = PromptContext::new();

        // Catalog checks come first so their outcome can steer the text
        // reply: single listing, then location + dates.
        if let Some(listing) = self.match_single_listing(text).await? {
            let sent = self.send_single_card(conversation, &listing, wamid).await?;
            if sent {
                context.card_sent = true;
                context.card_listing_title = Some(listing.name.clone());
            }
            context.listings = vec![listing];
        } else if let Some(query) = self.parser.stay_search(text, today()) {
            let (sent, available) = self.send_availability_card(conversation, &query, wamid).await?;
            context.card_sent = sent;
            context.listings = available;
        }

        match self.knowledge.search(text, self.config.knowledge_limit).await {
            Ok(snippets) => context.knowledge = snippets,
            Err(e) => warn!("Knowledge search failed: {}", e),
        }

        let history: Vec<ChatTurn> =
            database::message::recent_messages(&self.pool, conversation.id, self.config.history_limit)
                .await?
                .into_iter()
                .map(|m| match m.sender {
                    SenderRole::User => ChatTurn::user(m.content),
                    SenderRole::Assistant => ChatTurn::assistant(m.content),
                })
                .collect();

        let prompt = build_system_prompt(&context);
        let reply = self.generator.generate(&prompt, &history).await?;

        self.sender
            .send_text(&conversation.contact_phone, &reply, wamid, false)
            .await?;
        database::message::append_message(
            &self.pool,
            conversation.id,
            SenderRole::Assistant,
            &reply,
        )
        .await?;

        info!(conversation_id = conversation.id, "Reply sent ({} chars)", reply.len());
        Ok(context.card_sent)
    }

    /// Detect a single-listing request and find its best match.
    async fn match_single_listing(
        &self,
        text: &str,
    ) -> Result<Option<ListingSummary>, EngineError> {
        let Some(term) = self.parser.single_listing(text) else {
            return Ok(None);
        };

        debug!(term = %term, "Single-listing request detected");
        let matches = self.listings.search_by_name(&term).await?;
        Ok(matches.into_iter().next())
    }

    /// Send a single-product card for the listing if it is linked in any
    /// catalog, preferring the default one. Returns whether a card went out.
    async fn send_single_card(
        &self,
        conversation: &Conversation,
        listing: &ListingSummary,
        wamid: Option<&str>,
    ) -> Result<bool, EngineError> {
        let default = match catalog::default_catalog(&self.pool).await {
            Ok(found) => found,
            Err(catalog::CatalogError::NoCatalogs) => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let target = match database::catalog::product_id_for(&self.pool, default.id, &listing.id)
            .await?
        {
            Some(product_id) => Some((default.catalog_id, product_id)),
            None => {
                // Not in the default catalog; any other link will do.
                let links =
                    database::catalog::links_for_property(&self.pool, &listing.id).await?;
                match links.into_iter().next() {
                    Some(link) => {
                        let owner =
                            database::catalog::get_catalog(&self.pool, link.catalog_id).await?;
                        Some((owner.catalog_id, link.product_id))
                    }
                    None => None,
                }
            }
        };

        let Some((catalog_ext_id, product_id)) = target else {
            debug!(listing = %listing.name, "Listing not linked in any catalog; no card");
            return Ok(false);
        };

        let body = format!("Esta es {} 👆", listing.name);
        self.sender
            .send_catalog_card(
                &conversation.contact_phone,
                &catalog_ext_id,
                &[product_id],
                &body,
                wamid,
            )
            .await?;

        Ok(true)
    }

    /// Send a product list for the listings available in the requested
    /// location and range. Returns whether a card went out, plus the
    /// available listings for the prompt context.
    async fn send_availability_card(
        &self,
        conversation: &Conversation,
        query: &StayQuery,
        wamid: Option<&str>,
    ) -> Result<(bool, Vec<ListingSummary>), EngineError> {
        debug!(
            location = %query.location,
            entry = %query.entry,
            exit = %query.exit,
            "Availability request detected"
        );

        let available = self
            .listings
            .search_available(&query.location, query.entry, query.exit)
            .await?;
        if available.is_empty() {
            return Ok((false, available));
        }

        let resolved = match catalog::resolve_for_location(&self.pool, &query.location).await {
            Ok(found) => found,
            Err(catalog::CatalogError::NoCatalogs) => return Ok((false, available)),
            Err(e) => return Err(e.into()),
        };

        let listing_ids: Vec<String> = available.iter().map(|l| l.id.clone()).collect();
        let mut products =
            catalog::product_ids_for_listings(&self.pool, &resolved, &listing_ids).await?;
        let mut catalog_ext_id = resolved.catalog_id.clone();

        // A region catalog with no links for these listings falls back to
        // the default catalog.
        if products.is_empty() {
            let default = catalog::default_catalog(&self.pool).await?;
            if default.id != resolved.id {
                products =
                    catalog::product_ids_for_listings(&self.pool, &default, &listing_ids).await?;
                catalog_ext_id = default.catalog_id.clone();
            }
        }

        if products.is_empty() {
            return Ok((false, available));
        }

        let body = format!(
            "Estas son las fincas disponibles en {} para tus fechas 👆",
            query.location
        );
        self.sender
            .send_catalog_card(
                &conversation.contact_phone,
                &catalog_ext_id,
                &products,
                &body,
                wamid,
            )
            .await?;

        Ok((true, available))
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
