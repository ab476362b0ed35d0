//! OTP delivery routing.
//!
//! The route is chosen once, when the manager is built. A configured carrier
//! gateway is tried first on every issuance; the local fallback is always
//! available and never fails.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{info, warn};

use sentinel_contracts::{
    error::SentinelResult,
    otp::{DeliveryReceipt, OtpMessage},
};
use sentinel_core::traits::SmsGateway;
use sentinel_policy::GatewayCredentials;

use crate::phone::mask_phone;

pub const FALLBACK_PROVIDER: &str = "local";

/// Delivery path used when no carrier is configured or the carrier fails.
///
/// The message is accepted locally; only the masked destination is logged.
#[derive(Debug, Default)]
pub struct LocalFallbackGateway {
    delivered: AtomicUsize,
}

impl LocalFallbackGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliver(&self, message: &OtpMessage) -> DeliveryReceipt {
        let n = self.delivered.fetch_add(1, Ordering::Relaxed) + 1;
        info!(to = %mask_phone(&message.to), "OTP accepted by local fallback");
        DeliveryReceipt {
            provider: FALLBACK_PROVIDER.to_string(),
            receipt_id: format!("local-{n}"),
        }
    }

    /// Messages accepted so far.
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }
}

impl SmsGateway for LocalFallbackGateway {
    fn name(&self) -> &str {
        FALLBACK_PROVIDER
    }

    fn send(&self, message: &OtpMessage) -> SentinelResult<DeliveryReceipt> {
        Ok(self.deliver(message))
    }
}

/// The primary delivery path.
pub enum DeliveryRoute {
    /// Try this carrier first, fall back locally on failure.
    Gateway(Box<dyn SmsGateway>),
    /// No carrier; every code goes through the local fallback.
    FallbackOnly,
}

impl DeliveryRoute {
    /// Pick the route from the available credentials.
    ///
    /// `connect` builds the carrier client. Missing credentials or a failed
    /// connect both yield `FallbackOnly`; neither is an error.
    pub fn select<F>(credentials: Option<GatewayCredentials>, connect: F) -> Self
    where
        F: FnOnce(GatewayCredentials) -> SentinelResult<Box<dyn SmsGateway>>,
    {
        let Some(credentials) = credentials else {
            info!("no SMS gateway credentials, using local fallback delivery");
            return Self::FallbackOnly;
        };
        match connect(credentials) {
            Ok(gateway) => {
                info!(provider = gateway.name(), "SMS gateway configured");
                Self::Gateway(gateway)
            }
            Err(e) => {
                warn!(error = %e, "SMS gateway unavailable, using local fallback delivery");
                Self::FallbackOnly
            }
        }
    }

    pub fn is_fallback_only(&self) -> bool {
        matches!(self, Self::FallbackOnly)
    }
}

impl fmt::Debug for DeliveryRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gateway(gateway) => f.debug_tuple("Gateway").field(&gateway.name()).finish(),
            Self::FallbackOnly => f.write_str("FallbackOnly"),
        }
    }
}

/// Message body sent to the customer.
pub fn render_body(code: &str, ttl_seconds: i64) -> String {
    let minutes = (ttl_seconds / 60).max(1);
    let unit = if minutes == 1 { "minute" } else { "minutes" };
    format!("Your SentinelPay verification code is: {code}. Valid for {minutes} {unit}.")
}
