//! The `TxEngine` trait.
//!
//! # Design Decisions
//! - Public stage methods are provided and check the bound accounts before
//!   delegating to the engine's `do_*` hook
//! - Stages take a `PendingTx` by value and return the next one
//! - Errors after submission are `PostExecuteError`, never `TxEngineError`

use async_trait::async_trait;

use crate::accounts::Account;
use crate::engine::error::{PostExecuteError, TxEngineError};
use crate::engine::pending::PendingTx;
use crate::engine::result::{PostExecuteOutcome, TxResult};
use crate::engine::types::FeeLevel;
use crate::money::Money;
use crate::resilience::CancelToken;

/// Per-use-case transaction strategy bound to one source and one target.
#[async_trait]
pub trait TxEngine: Send + Sync {
    /// Short engine name used in logs and metric labels.
    fn name(&self) -> &'static str;

    fn source(&self) -> &Account;

    fn target(&self) -> &Account;

    /// Fails with `Precondition` unless the bound accounts are the variants
    /// this engine handles.
    fn assert_inputs_valid(&self) -> Result<(), TxEngineError>;

    async fn do_initialise_tx(&self) -> Result<PendingTx, TxEngineError>;

    async fn do_update_fee_level(
        &self,
        pending: PendingTx,
        level: FeeLevel,
        custom_fee: Option<u64>,
    ) -> Result<PendingTx, TxEngineError>;

    async fn do_build_confirmations(&self, pending: PendingTx) -> Result<PendingTx, TxEngineError>;

    async fn do_validate_amount(&self, pending: PendingTx) -> Result<PendingTx, TxEngineError>;

    async fn do_validate_all(&self, pending: PendingTx) -> Result<PendingTx, TxEngineError>;

    async fn do_execute(&self, pending: &PendingTx, second_password: &str) -> Result<TxResult, TxEngineError>;

    async fn do_post_execute(
        &self,
        pending: &PendingTx,
        result: &TxResult,
        cancel: &CancelToken,
    ) -> Result<PostExecuteOutcome, TxEngineError>;

    /// Zero-amount transaction with limits loaded.
    async fn initialise_tx(&self) -> Result<PendingTx, TxEngineError> {
        self.assert_inputs_valid()?;
        self.do_initialise_tx().await
    }

    /// Replace the amount. No validation runs here.
    async fn update_amount(&self, amount: Money, pending: PendingTx) -> Result<PendingTx, TxEngineError> {
        self.assert_inputs_valid()?;
        TxEngineError::check(!amount.is_negative(), || format!("amount {} is negative", amount))?;
        Ok(PendingTx { amount, ..pending })
    }

    async fn update_fee_level(
        &self,
        pending: PendingTx,
        level: FeeLevel,
        custom_fee: Option<u64>,
    ) -> Result<PendingTx, TxEngineError> {
        self.assert_inputs_valid()?;
        TxEngineError::check(pending.fee_selection.is_available(level), || {
            format!("fee level {:?} is not available for {}", level, self.name())
        })?;
        let fee_selection = pending.fee_selection.select(level, custom_fee)?;
        self.do_update_fee_level(PendingTx { fee_selection, ..pending }, level, custom_fee)
            .await
    }

    /// Replace the confirmation list. Calling twice yields the same list.
    async fn build_confirmations(&self, pending: PendingTx) -> Result<PendingTx, TxEngineError> {
        self.assert_inputs_valid()?;
        self.do_build_confirmations(pending).await
    }

    async fn validate_amount(&self, pending: PendingTx) -> Result<PendingTx, TxEngineError> {
        self.assert_inputs_valid()?;
        self.do_validate_amount(pending).await
    }

    async fn validate_all(&self, pending: PendingTx) -> Result<PendingTx, TxEngineError> {
        self.assert_inputs_valid()?;
        self.do_validate_all(pending).await
    }

    /// Submit to the custodian.
    async fn execute(&self, pending: &PendingTx, second_password: &str) -> Result<TxResult, TxEngineError> {
        self.assert_inputs_valid()?;
        self.do_execute(pending, second_password).await
    }

    /// Follow-up after a submission the custodian accepted.
    async fn post_execute(
        &self,
        pending: &PendingTx,
        result: &TxResult,
        cancel: &CancelToken,
    ) -> Result<PostExecuteOutcome, PostExecuteError> {
        let outcome = match self.assert_inputs_valid() {
            Ok(()) => self.do_post_execute(pending, result, cancel).await,
            Err(e) => Err(e),
        };
        outcome.map_err(|cause| PostExecuteError {
            tx_id: result.id().to_string(),
            cause,
        })
    }
}
