//! Collaborators shared by every engine built from one registry.

use std::sync::Arc;
use std::time::Duration;

use crate::banking::BankPartnerCallbackProvider;
use crate::config::{EngineConfig, TimeoutConfig};
use crate::custodial::CustodialWalletManager;
use crate::money::Currency;
use crate::resilience::{PollSettings, Poller};

/// Per-call deadlines for custodial manager calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    pub limits: Duration,
    pub submission: Duration,
    pub lookup: Duration,
}

impl From<&TimeoutConfig> for Deadlines {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            limits: Duration::from_secs(config.limits_secs),
            submission: Duration::from_secs(config.submission_secs),
            lookup: Duration::from_secs(config.lookup_secs),
        }
    }
}

#[derive(Clone)]
pub struct EngineContext {
    pub manager: Arc<dyn CustodialWalletManager>,
    pub callbacks: Arc<dyn BankPartnerCallbackProvider>,
    pub poller: Poller,
    pub deadlines: Deadlines,
    /// The user's display fiat currency, copied into every `PendingTx`.
    pub user_fiat: Currency,
}

impl EngineContext {
    pub fn from_config(
        config: &EngineConfig,
        manager: Arc<dyn CustodialWalletManager>,
        callbacks: Arc<dyn BankPartnerCallbackProvider>,
        user_fiat: Currency,
    ) -> Self {
        Self {
            manager,
            callbacks,
            poller: Poller::new(PollSettings::from(&config.poll)),
            deadlines: Deadlines::from(&config.timeouts),
            user_fiat,
        }
    }
}
