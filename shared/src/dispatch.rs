//! Event dispatch: echo text messages, answer locations with nearby shops.
//!
//! Events are handled strictly in arrival order. The first reply failure
//! aborts the remaining events of the same delivery and is returned to the
//! caller.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::carousel::{self, CarouselError};
use crate::events::{EventType, InboundEvent, LocationMessage, Message};
use crate::reply::{ReplyMessage, ReplySender};
use crate::search::ShopSearch;
use crate::Result;

/// Reply text when no shop is found near the shared location.
pub const NO_SHOPS_TEXT: &str = "近くにラーメン屋さんが見つかりませんでした。";

/// Reply text when the search API fails and the fallback is enabled.
pub const SEARCH_FAILED_TEXT: &str =
    "お店の検索に失敗しました。しばらくしてからもう一度お試しください。";

/// Counters reported after a delivery has been dispatched.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub replies_sent: u32,
    pub events_ignored: u32,
}

/// Routes inbound events to the echo or shop-search path.
pub struct Dispatcher {
    searcher: Arc<dyn ShopSearch>,
    replier: Arc<dyn ReplySender>,
    search_failure_fallback: bool,
}

impl Dispatcher {
    pub fn new(searcher: Arc<dyn ShopSearch>, replier: Arc<dyn ReplySender>) -> Self {
        Self {
            searcher,
            replier,
            search_failure_fallback: false,
        }
    }

    /// Reply with [`SEARCH_FAILED_TEXT`] instead of failing the invocation
    /// when the search API errors.
    pub fn with_search_failure_fallback(mut self, enabled: bool) -> Self {
        self.search_failure_fallback = enabled;
        self
    }

    pub async fn dispatch(&self, events: &[InboundEvent]) -> Result<DispatchSummary> {
        let mut summary = DispatchSummary::default();

        for event in events {
            if event.event_type != EventType::Message {
                summary.events_ignored += 1;
                continue;
            }

            let messages = match &event.message {
                Some(Message::Text(message)) => {
                    info!(reply_token = %event.reply_token, "Echoing text message");
                    vec![ReplyMessage::text(message.text.clone())]
                }
                Some(Message::Location(location)) => self.shop_list_reply(location).await?,
                Some(Message::Other) | None => {
                    summary.events_ignored += 1;
                    continue;
                }
            };

            if let Err(e) = self.replier.reply(&event.reply_token, messages).await {
                error!(reply_token = %event.reply_token, error = %e, "Reply failed, aborting delivery");
                return Err(e);
            }
            summary.replies_sent += 1;
        }

        Ok(summary)
    }

    async fn shop_list_reply(&self, location: &LocationMessage) -> Result<Vec<ReplyMessage>> {
        let (lat, lng) = location.query_coordinates();
        info!(lat = %lat, lng = %lng, "Searching shops near location");

        let shops = match self.searcher.search(&lat, &lng).await {
            Ok(shops) => shops,
            Err(e) if self.search_failure_fallback => {
                warn!(error = %e, "Shop search failed, replying with fallback text");
                return Ok(vec![ReplyMessage::text(SEARCH_FAILED_TEXT)]);
            }
            Err(e) => {
                error!(error = %e, "Shop search failed");
                return Err(e);
            }
        };

        if shops.is_empty() {
            return Ok(vec![ReplyMessage::text(NO_SHOPS_TEXT)]);
        }

        match carousel::build(&shops) {
            Ok(carousel) => Ok(vec![ReplyMessage::carousel(carousel)]),
            Err(CarouselError::Empty) => {
                warn!(shops = shops.len(), "No usable shop records");
                Ok(vec![ReplyMessage::text(NO_SHOPS_TEXT)])
            }
        }
    }
}
