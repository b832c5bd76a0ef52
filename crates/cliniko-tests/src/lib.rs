//! Integration tests for the Cliniko client.
//!
//! Tests run against [`MockCliniko`], an in-process stand-in for the Cliniko
//! API bound to an ephemeral port, so no credentials or network access are
//! needed.

mod mock;

pub use mock::{DEFAULT_PAGE_SIZE, MockCliniko, RecordedRequest};

use cliniko_client::{ClientConfig, ClinikoClient};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// API key the test clients authenticate with.
pub const TEST_API_KEY: &str = "test-key";

/// Email the test clients put in their user agent.
pub const TEST_EMAIL: &str = "tests@example.com";

/// Creates a client pointed at the mock.
///
/// # Errors
/// Returns error if client creation fails.
pub fn create_test_client(mock: &MockCliniko) -> Result<ClinikoClient, cliniko_client::Error> {
    ClinikoClient::new(
        ClientConfig::new(TEST_API_KEY, mock.base_url())
            .with_user_email(TEST_EMAIL)
            .with_timeout(Duration::from_secs(10)),
    )
}

/// Counts ERROR events emitted by the client crate.
#[derive(Clone, Default)]
pub struct ErrorCounter {
    count: Arc<AtomicUsize>,
}

impl ErrorCounter {
    /// Installs the counter as the thread's default subscriber.
    ///
    /// Only events emitted on the current thread are seen, so use it from a
    /// current-thread runtime (the `#[tokio::test]` default).
    #[must_use]
    pub fn install() -> (Self, DefaultGuard) {
        let counter = Self::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (counter, guard)
    }

    /// Number of ERROR events seen so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() == Level::ERROR && meta.target().starts_with("cliniko_client") {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}
