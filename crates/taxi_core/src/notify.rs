//! Pluggable order notifiers: trait abstraction for outbound order alerts.
//!
//! Implementations, selectable via [`NotifierKind`]:
//!
//! - **`NoopNotifier`**: default, drops every message.
//! - **`TelegramNotifier`** (feature `telegram`): posts the order text to a
//!   Telegram chat via the bot HTTP API.
//! - **`RecordingNotifier`** (feature `test-helpers`): captures messages in
//!   memory for assertions.
//!
//! The notifier is stored as a `Box<dyn OrderNotifier>` ECS resource,
//! constructed from `NotifierKind` during session building. Delivery is
//! best effort: a failed send is logged and never surfaces to the booking
//! flow.

use bevy_ecs::prelude::Resource;
use uuid::Uuid;

use crate::tariff::TariffTier;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// The order details handed to a notifier when a ride is requested.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub ride_id: Uuid,
    pub requester_name: String,
    pub requester_phone: String,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub tier: TariffTier,
    pub fare: f64,
}

/// Plain-text message body sent to the dispatcher chat.
pub fn format_order_message(order: &OrderSummary) -> String {
    format!(
        "New taxi order\n\n\
         Client: {}\n\
         Phone: {}\n\n\
         From: {}\n\
         To: {}\n\n\
         Tier: {}\n\
         Fare: {:.0} RUB\n\n\
         Ride id: {}",
        order.requester_name,
        order.requester_phone,
        order.pickup_address,
        order.dropoff_address,
        order.tier,
        order.fare,
        order.ride_id,
    )
}

/// Which notifier backend to use. The Telegram variant carries its
/// credentials as plain configuration; nothing in this crate hardcodes them.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum NotifierKind {
    #[default]
    Noop,
    #[cfg(feature = "telegram")]
    Telegram { bot_token: String, chat_id: String },
}

impl NotifierKind {
    /// Telegram when both credential variables are set (and the `telegram`
    /// feature is enabled), otherwise noop.
    pub fn from_env() -> Self {
        #[cfg(feature = "telegram")]
        {
            let bot_token = std::env::var(telegram::BOT_TOKEN_ENV).ok();
            let chat_id = std::env::var(telegram::CHAT_ID_ENV).ok();
            if let (Some(bot_token), Some(chat_id)) = (bot_token, chat_id) {
                return NotifierKind::Telegram { bot_token, chat_id };
            }
        }
        NotifierKind::Noop
    }
}

/// Trait for notifier backends. Implementations must be `Send + Sync` so the
/// notifier can be stored as a shared ECS resource.
pub trait OrderNotifier: Send + Sync {
    /// Deliver (or at least attempt to deliver) one order summary.
    fn notify_order(&self, order: &OrderSummary);
}

/// ECS resource wrapping a boxed notifier.
#[derive(Resource)]
pub struct NotifierResource(pub Box<dyn OrderNotifier>);

// ---------------------------------------------------------------------------
// Noop notifier (always available)
// ---------------------------------------------------------------------------

/// Swallows every message. Used when no dispatcher channel is configured.
pub struct NoopNotifier;

impl OrderNotifier for NoopNotifier {
    fn notify_order(&self, _order: &OrderSummary) {}
}

// ---------------------------------------------------------------------------
// Recording notifier (behind `test-helpers` feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "test-helpers")]
mod recording {
    use std::sync::{Arc, Mutex};

    use super::{OrderNotifier, OrderSummary};

    /// Captures every order in memory. Clones share the same buffer, so a
    /// test can keep one handle while the session owns the other.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingNotifier {
        sent: Arc<Mutex<Vec<OrderSummary>>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn sent(&self) -> Vec<OrderSummary> {
            self.sent
                .lock()
                .map(|orders| orders.clone())
                .unwrap_or_default()
        }
    }

    impl OrderNotifier for RecordingNotifier {
        fn notify_order(&self, order: &OrderSummary) {
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(order.clone());
            }
        }
    }
}

#[cfg(feature = "test-helpers")]
pub use recording::RecordingNotifier;

// ---------------------------------------------------------------------------
// Telegram notifier (behind `telegram` feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "telegram")]
pub mod telegram {
    use std::time::Duration;

    use reqwest::blocking::Client;
    use tracing::warn;

    use super::{format_order_message, OrderNotifier, OrderSummary};

    pub const BOT_TOKEN_ENV: &str = "TAXI_TELEGRAM_BOT_TOKEN";
    pub const CHAT_ID_ENV: &str = "TAXI_TELEGRAM_CHAT_ID";

    const API_BASE: &str = "https://api.telegram.org";

    /// Posts the order text to a Telegram chat via `sendMessage`.
    pub struct TelegramNotifier {
        client: Client,
        api_base: String,
        bot_token: String,
        chat_id: String,
    }

    impl TelegramNotifier {
        pub fn new(bot_token: &str, chat_id: &str) -> Self {
            let client = Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .expect("failed to build HTTP client");
            Self {
                client,
                api_base: API_BASE.to_string(),
                bot_token: bot_token.to_string(),
                chat_id: chat_id.to_string(),
            }
        }

        /// Reads the bot credentials from the environment. `None` when either
        /// variable is unset, so callers fall back to the noop notifier.
        pub fn from_env() -> Option<Self> {
            let bot_token = std::env::var(BOT_TOKEN_ENV).ok()?;
            let chat_id = std::env::var(CHAT_ID_ENV).ok()?;
            Some(Self::new(&bot_token, &chat_id))
        }

        /// Point at a different API host (e.g. a local stub in tests).
        pub fn with_api_base(mut self, api_base: &str) -> Self {
            self.api_base = api_base.trim_end_matches('/').to_string();
            self
        }
    }

    impl OrderNotifier for TelegramNotifier {
        fn notify_order(&self, order: &OrderSummary) {
            let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
            let body = serde_json::json!({
                "chat_id": self.chat_id,
                "text": format_order_message(order),
            });

            // Fire and forget: the booking flow never waits on delivery.
            let client = self.client.clone();
            std::thread::spawn(move || match client.post(&url).json(&body).send() {
                Ok(response) if !response.status().is_success() => {
                    warn!(
                        status = %response.status(),
                        "telegram rejected the order notification"
                    );
                }
                Ok(_) => {}
                Err(error) => {
                    warn!(error = %error, "failed to send order notification");
                }
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Factory: build a notifier from NotifierKind
// ---------------------------------------------------------------------------

/// Construct a boxed [`OrderNotifier`] from a [`NotifierKind`] descriptor.
pub fn build_notifier(kind: &NotifierKind) -> Box<dyn OrderNotifier> {
    match kind {
        NotifierKind::Noop => Box::new(NoopNotifier),

        #[cfg(feature = "telegram")]
        NotifierKind::Telegram { bot_token, chat_id } => {
            Box::new(telegram::TelegramNotifier::new(bot_token, chat_id))
        }
    }
}
