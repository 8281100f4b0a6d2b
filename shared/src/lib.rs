//! Shared library for the LINE ramen-finder webhook.
//!
//! Decodes LINE webhook deliveries, echoes text messages, and answers shared
//! locations with a carousel of nearby ramen shops from the Hot Pepper
//! Gourmet API.

pub mod carousel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod reply;
pub mod search;
pub mod secrets;
pub mod signature;
pub mod webhook;

pub use carousel::{Carousel, CarouselCard, CarouselError};
pub use config::Config;
pub use dispatch::{DispatchSummary, Dispatcher};
pub use error::{Error, Result};
pub use events::{EventType, InboundEvent, LocationMessage, Message, TextMessage};
pub use reply::{LineReplyClient, ReplyMessage, ReplySender};
pub use search::{HotPepperClient, ShopRecord, ShopSearch};
pub use secrets::{get_bot_secret, BotSecret};
pub use webhook::{WebhookHandler, WebhookResponse, CONNECTION_ERROR_BODY};
