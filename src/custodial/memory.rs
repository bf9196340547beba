//! In-memory custodial backend used by the simulator and tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::banking::{BankTransferCallback, LinkedBank};
use crate::custodial::manager::{BankTransferCharge, CustodialWalletManager, ProviderError, TransferLimits};
use crate::money::{Currency, Money};

/// A transfer accepted by the in-memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub payment_id: String,
    pub address: String,
    pub amount: Money,
    pub callback: Option<BankTransferCallback>,
}

/// A withdrawal order accepted by the in-memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawOrder {
    pub order_id: String,
    pub bank_id: String,
    pub amount: Money,
}

#[derive(Debug, Clone)]
struct ChargeState {
    record: TransferRecord,
    polls: u32,
}

/// A thread-safe stand-in for the custodial backend.
///
/// Charges of transfers started with a callback expose an authorisation URL
/// once they have been fetched `polls_before_authorisation` times.
#[derive(Clone, Default)]
pub struct InMemoryCustodialManager {
    limits: Arc<DashMap<Currency, TransferLimits>>,
    banks: Arc<DashMap<String, LinkedBank>>,
    fees: Arc<DashMap<Currency, Money>>,
    charges: Arc<DashMap<String, ChargeState>>,
    orders: Arc<DashMap<String, WithdrawOrder>>,
    limit_requests: Arc<DashMap<Currency, bool>>,
    charge_polls: Arc<AtomicU32>,
    polls_before_authorisation: u32,
    rejection: Option<String>,
    limits_latency: Option<Duration>,
    submission_latency: Option<Duration>,
}

impl InMemoryCustodialManager {
    /// Create an empty backend. Authorisation URLs appear on the first poll.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(self, currency: &Currency, limits: TransferLimits) -> Self {
        self.limits.insert(currency.clone(), limits);
        self
    }

    pub fn with_linked_bank(self, bank: LinkedBank) -> Self {
        self.banks.insert(bank.id.clone(), bank);
        self
    }

    pub fn with_withdrawal_fee(self, fee: Money) -> Self {
        self.fees.insert(fee.currency().clone(), fee);
        self
    }

    /// Number of charge fetches before the authorisation URL is exposed.
    pub fn authorise_after(mut self, polls: u32) -> Self {
        self.polls_before_authorisation = polls;
        self
    }

    /// Reject every transfer submission and withdrawal order with `reason`.
    pub fn rejecting_submissions(mut self, reason: &str) -> Self {
        self.rejection = Some(reason.to_string());
        self
    }

    /// Delay every limits request by `latency`.
    pub fn slow_limits(mut self, latency: Duration) -> Self {
        self.limits_latency = Some(latency);
        self
    }

    /// Delay every transfer submission and withdrawal order by `latency`.
    pub fn slow_submissions(mut self, latency: Duration) -> Self {
        self.submission_latency = Some(latency);
        self
    }

    /// Total `get_bank_transfer_charge` calls served.
    pub fn charge_poll_count(&self) -> u32 {
        self.charge_polls.load(Ordering::SeqCst)
    }

    /// Transfers accepted so far.
    pub fn transfers(&self) -> Vec<TransferRecord> {
        self.charges.iter().map(|r| r.value().record.clone()).collect()
    }

    /// Withdrawal orders accepted so far.
    pub fn withdraw_orders(&self) -> Vec<WithdrawOrder> {
        self.orders.iter().map(|r| r.value().clone()).collect()
    }

    /// The `only_open_banking` flag of the last limits request for `currency`.
    pub fn last_limits_request(&self, currency: &Currency) -> Option<bool> {
        self.limit_requests.get(currency).map(|r| *r.value())
    }
}

async fn simulate_latency(latency: Option<Duration>) {
    if let Some(latency) = latency {
        tokio::time::sleep(latency).await;
    }
}

#[async_trait]
impl CustodialWalletManager for InMemoryCustodialManager {
    async fn get_bank_transfer_limits(
        &self,
        currency: &Currency,
        only_open_banking: bool,
    ) -> Result<TransferLimits, ProviderError> {
        simulate_latency(self.limits_latency).await;
        self.limit_requests.insert(currency.clone(), only_open_banking);
        self.limits
            .get(currency)
            .map(|r| r.value().clone())
            .ok_or_else(|| ProviderError::NotFound {
                kind: "transfer limits",
                id: currency.to_string(),
            })
    }

    async fn start_bank_transfer(
        &self,
        address: &str,
        amount: &Money,
        currency_code: &str,
        callback: Option<BankTransferCallback>,
    ) -> Result<String, ProviderError> {
        simulate_latency(self.submission_latency).await;
        if let Some(reason) = &self.rejection {
            return Err(ProviderError::Rejected(reason.clone()));
        }
        if amount.currency_code() != currency_code {
            return Err(ProviderError::Rejected(format!(
                "amount currency {} does not match {}",
                amount.currency_code(),
                currency_code
            )));
        }

        let payment_id = Uuid::new_v4().to_string();
        let record = TransferRecord {
            payment_id: payment_id.clone(),
            address: address.to_string(),
            amount: amount.clone(),
            callback,
        };
        self.charges.insert(payment_id.clone(), ChargeState { record, polls: 0 });
        tracing::debug!(payment_id = %payment_id, amount = %amount, "In-memory transfer started");
        Ok(payment_id)
    }

    async fn get_bank_transfer_charge(&self, payment_id: &str) -> Result<BankTransferCharge, ProviderError> {
        self.charge_polls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.charges.get_mut(payment_id).ok_or_else(|| ProviderError::NotFound {
            kind: "charge",
            id: payment_id.to_string(),
        })?;
        state.polls += 1;

        let authorisation_url = match &state.record.callback {
            Some(cb) if state.polls >= self.polls_before_authorisation => {
                Some(format!("{}?payment_id={}", cb.redirect_url, payment_id))
            }
            _ => None,
        };

        Ok(BankTransferCharge {
            payment_id: payment_id.to_string(),
            linked_bank_id: state.record.address.clone(),
            amount: state.record.amount.clone(),
            authorisation_url,
        })
    }

    async fn get_linked_bank(&self, id: &str) -> Result<LinkedBank, ProviderError> {
        self.banks
            .get(id)
            .map(|r| r.value().clone())
            .ok_or_else(|| ProviderError::NotFound {
                kind: "linked bank",
                id: id.to_string(),
            })
    }

    async fn get_withdrawal_fee(&self, currency: &Currency) -> Result<Money, ProviderError> {
        Ok(self
            .fees
            .get(currency)
            .map(|r| r.value().clone())
            .unwrap_or_else(|| Money::zero(currency)))
    }

    async fn create_withdraw_order(&self, bank_id: &str, amount: &Money) -> Result<String, ProviderError> {
        simulate_latency(self.submission_latency).await;
        if let Some(reason) = &self.rejection {
            return Err(ProviderError::Rejected(reason.clone()));
        }
        if !self.banks.contains_key(bank_id) {
            return Err(ProviderError::NotFound {
                kind: "linked bank",
                id: bank_id.to_string(),
            });
        }
        let order_id = Uuid::new_v4().to_string();
        self.orders.insert(
            order_id.clone(),
            WithdrawOrder {
                order_id: order_id.clone(),
                bank_id: bank_id.to_string(),
                amount: amount.clone(),
            },
        );
        Ok(order_id)
    }
}
