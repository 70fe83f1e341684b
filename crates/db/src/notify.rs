//! The low-stock notification seam.
//!
//! The engine only produces [`LowStockAlert`] facts; delivering them
//! (e-mail, push, webhooks) is a collaborator concern behind
//! [`LowStockNotifier`]. Emission is strictly post-commit and
//! fire-and-forget: a notifier failure is logged and swallowed, never
//! surfaced to the caller and never able to abort a stock change.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tillbook_core::stock::LowStockAlert;
use tillbook_shared::config::NotificationConfig;
use tracing::{info, warn};

/// Errors from a notification sink.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The sink could not deliver the notification.
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Collaborator contract for delivering low-stock alerts.
#[async_trait]
pub trait LowStockNotifier: Send + Sync {
    /// Delivers one alert. Best-effort; callers swallow failures.
    async fn notify_low_stock(&self, alert: &LowStockAlert) -> Result<(), NotifyError>;
}

/// Default notifier: writes the alert to the log and nothing else.
///
/// Useful for development and as a stand-in until a real delivery
/// channel is wired up by the embedding application.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotifier;

#[async_trait]
impl LowStockNotifier for LoggingNotifier {
    async fn notify_low_stock(&self, alert: &LowStockAlert) -> Result<(), NotifyError> {
        info!(
            shop_id = %alert.shop_id,
            product_id = %alert.product_id,
            product_name = %alert.product_name,
            stock_before = alert.stock_before,
            stock_after = alert.stock_after,
            owner_id = %alert.owner_id,
            "low stock"
        );
        Ok(())
    }
}

/// Notifier that drops every alert. Wired when low-stock alerts are
/// switched off in configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

#[async_trait]
impl LowStockNotifier for SilentNotifier {
    async fn notify_low_stock(&self, _alert: &LowStockAlert) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Builds the default notifier for the configured notification
/// settings: [`LoggingNotifier`] when low-stock alerts are enabled,
/// [`SilentNotifier`] otherwise.
#[must_use]
pub fn notifier_from_config(config: &NotificationConfig) -> Arc<dyn LowStockNotifier> {
    if config.low_stock_enabled {
        Arc::new(LoggingNotifier)
    } else {
        Arc::new(SilentNotifier)
    }
}

/// Emits a batch of alerts after a commit, swallowing delivery failures.
pub(crate) async fn emit_all(notifier: &Arc<dyn LowStockNotifier>, alerts: &[LowStockAlert]) {
    for alert in alerts {
        if let Err(error) = notifier.notify_low_stock(alert).await {
            warn!(
                product_id = %alert.product_id,
                shop_id = %alert.shop_id,
                %error,
                "low-stock notification failed; alert dropped"
            );
        }
    }
}
