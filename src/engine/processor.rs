//! Single-flow driver that owns one engine and one `PendingTx`.
//!
//! # Responsibilities
//! - Apply `TxStage` transitions and reject illegal ones
//! - Re-run validation before submission
//! - Log and count every transition
//!
//! # Design Decisions
//! - All mutation goes through `&mut self`, so a flow has a single writer
//! - A validation failure returns the flow to `AmountEntry`; it is not an error
//! - Only submission and post-execute failures move the flow to `Failed`

use thiserror::Error;

use crate::banking::BankPaymentApproval;
use crate::engine::error::{PostExecuteError, TxEngineError};
use crate::engine::pending::PendingTx;
use crate::engine::result::{PostExecuteOutcome, TxResult};
use crate::engine::traits::TxEngine;
use crate::engine::types::{FeeLevel, TxStage, ValidationState};
use crate::money::Money;
use crate::observability::metrics;
use crate::resilience::CancelToken;

/// Errors returned by the processor.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The flow already ended; start a new one.
    #[error("Flow already ended in {stage}")]
    Finished { stage: TxStage },

    /// The operation is not legal from the flow's current stage.
    #[error("Cannot {operation} while {stage}")]
    IllegalTransition { stage: TxStage, operation: &'static str },

    /// The transaction did not pass validation at submission time.
    #[error("Transaction is not executable: {0:?}")]
    NotExecutable(ValidationState),

    /// Failure before anything was submitted.
    #[error(transparent)]
    Engine(#[from] TxEngineError),

    /// Failure after the custodian accepted the submission.
    #[error(transparent)]
    PostSubmission(#[from] PostExecuteError),
}

/// How a successfully submitted flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Succeeded(TxResult),
    AwaitingApproval {
        result: TxResult,
        approval: BankPaymentApproval,
    },
}

const BEFORE_SUBMISSION: [TxStage; 4] = [
    TxStage::AmountEntry,
    TxStage::FeeSelected,
    TxStage::Validated,
    TxStage::Confirmed,
];

pub struct TransactionProcessor {
    engine: Box<dyn TxEngine>,
    pending: PendingTx,
}

impl TransactionProcessor {
    /// Initialise a transaction on `engine` and enter `AmountEntry`.
    pub async fn start(engine: Box<dyn TxEngine>) -> Result<Self, FlowError> {
        let pending = engine.initialise_tx().await?;
        let mut processor = Self { engine, pending };
        processor.transition(TxStage::AmountEntry);
        Ok(processor)
    }

    pub fn pending(&self) -> &PendingTx {
        &self.pending
    }

    pub fn stage(&self) -> TxStage {
        self.pending.stage
    }

    pub fn engine(&self) -> &dyn TxEngine {
        self.engine.as_ref()
    }

    /// Replace the amount. Any earlier validation or confirmation is discarded.
    pub async fn update_amount(&mut self, amount: Money) -> Result<&PendingTx, FlowError> {
        self.require("update amount", &BEFORE_SUBMISSION)?;
        let pending = self.engine.update_amount(amount, self.pending.clone()).await?;
        self.pending = PendingTx {
            confirmations: Vec::new(),
            ..pending
        };
        self.transition(TxStage::AmountEntry);
        Ok(&self.pending)
    }

    pub async fn update_fee_level(&mut self, level: FeeLevel, custom_fee: Option<u64>) -> Result<&PendingTx, FlowError> {
        self.require("update fee level", &BEFORE_SUBMISSION)?;
        let pending = self
            .engine
            .update_fee_level(self.pending.clone(), level, custom_fee)
            .await?;
        tracing::debug!(
            engine = self.engine.name(),
            level = ?pending.fee_selection.selected(),
            custom_fee = ?pending.fee_selection.custom_amount(),
            "Fee level selected"
        );
        self.pending = PendingTx {
            confirmations: Vec::new(),
            ..pending
        };
        self.transition(TxStage::FeeSelected);
        Ok(&self.pending)
    }

    /// Run the full validation. Legal from any stage before submission.
    pub async fn validate(&mut self) -> Result<ValidationState, FlowError> {
        self.require("validate", &BEFORE_SUBMISSION)?;
        self.pending = self.engine.validate_all(self.pending.clone()).await?;
        let state = self.pending.validation_state;
        if state == ValidationState::CanExecute {
            self.transition(TxStage::Validated);
        } else {
            tracing::debug!(engine = self.engine.name(), state = ?state, "Validation did not pass");
            self.transition(TxStage::AmountEntry);
        }
        Ok(state)
    }

    pub async fn build_confirmations(&mut self) -> Result<&PendingTx, FlowError> {
        self.require("build confirmations", &[TxStage::Validated, TxStage::Confirmed])?;
        self.pending = self.engine.build_confirmations(self.pending.clone()).await?;
        self.transition(TxStage::Confirmed);
        Ok(&self.pending)
    }

    /// Submit, then run the engine's post-execute step.
    pub async fn execute(&mut self, second_password: &str, cancel: &CancelToken) -> Result<FlowOutcome, FlowError> {
        self.require("execute", &[TxStage::Confirmed])?;

        self.pending = self.engine.validate_all(self.pending.clone()).await?;
        let state = self.pending.validation_state;
        if state != ValidationState::CanExecute {
            self.transition(TxStage::AmountEntry);
            return Err(FlowError::NotExecutable(state));
        }

        self.transition(TxStage::Executing);
        let result = match self.engine.execute(&self.pending, second_password).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(engine = self.engine.name(), error = %e, "Submission failed");
                self.transition(TxStage::Failed);
                return Err(e.into());
            }
        };

        match self.engine.post_execute(&self.pending, &result, cancel).await {
            Ok(PostExecuteOutcome::Completed) => {
                self.transition(TxStage::Succeeded);
                Ok(FlowOutcome::Succeeded(result))
            }
            Ok(PostExecuteOutcome::NeedsApproval(approval)) => {
                self.transition(TxStage::AwaitingApproval);
                Ok(FlowOutcome::AwaitingApproval { result, approval })
            }
            Err(e) => {
                tracing::error!(engine = self.engine.name(), tx_id = %e.tx_id, error = %e.cause, "Post-execute failed");
                self.transition(TxStage::Failed);
                Err(e.into())
            }
        }
    }

    fn require(&self, operation: &'static str, allowed: &[TxStage]) -> Result<(), FlowError> {
        if self.pending.stage.is_terminal() {
            return Err(FlowError::Finished {
                stage: self.pending.stage,
            });
        }
        if allowed.contains(&self.pending.stage) {
            Ok(())
        } else {
            Err(FlowError::IllegalTransition {
                stage: self.pending.stage,
                operation,
            })
        }
    }

    fn transition(&mut self, to: TxStage) {
        let from = self.pending.stage;
        self.pending.stage = to;
        metrics::record_stage(self.engine.name(), to.as_str());
        tracing::info!(engine = self.engine.name(), from = %from, to = %to, "Stage transition");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{Account, FiatAccount, LinkedBankAccount};
    use crate::banking::ConfiguredCallbackProvider;
    use crate::config::EngineConfig;
    use crate::custodial::{InMemoryCustodialManager, TransferLimits};
    use crate::engine::context::EngineContext;
    use crate::engine::fiat_deposit::FiatDepositTxEngine;
    use crate::money::Currency;
    use std::sync::Arc;

    fn usd() -> Currency {
        Currency::new("USD").unwrap()
    }

    fn deposit_engine(manager: InMemoryCustodialManager) -> Box<dyn TxEngine> {
        let config = EngineConfig::default();
        let ctx = EngineContext::from_config(
            &config,
            Arc::new(manager),
            Arc::new(ConfiguredCallbackProvider::new(&config.banking).unwrap()),
            usd(),
        );
        let bank = Account::LinkedBank(LinkedBankAccount {
            id: "bank-1".into(),
            label: "Main Street".into(),
            account_number: "****9876".into(),
            account_type: "Savings".into(),
            currency: usd(),
        });
        let fiat = Account::Fiat(FiatAccount {
            label: "USD Wallet".into(),
            currency: usd(),
            balance: Money::zero(&usd()),
        });
        Box::new(FiatDepositTxEngine::new(ctx, bank, fiat))
    }

    fn manager() -> InMemoryCustodialManager {
        InMemoryCustodialManager::new().with_limits(
            &usd(),
            TransferLimits {
                min: Money::from_major(10, &usd()),
                max: Some(Money::from_major(5000, &usd())),
            },
        )
    }

    #[tokio::test]
    async fn test_start_enters_amount_entry() {
        let processor = TransactionProcessor::start(deposit_engine(manager())).await.unwrap();
        assert_eq!(processor.stage(), TxStage::AmountEntry);
        assert_eq!(processor.engine().name(), "fiat_deposit");
    }

    #[tokio::test]
    async fn test_execute_before_confirm_is_illegal() {
        let mut processor = TransactionProcessor::start(deposit_engine(manager())).await.unwrap();
        processor.update_amount(Money::from_major(100, &usd())).await.unwrap();

        let err = processor.execute("", &CancelToken::new()).await.unwrap_err();
        assert!(matches!(
            err,
            FlowError::IllegalTransition {
                stage: TxStage::AmountEntry,
                operation: "execute"
            }
        ));
        let err = processor.build_confirmations().await.unwrap_err();
        assert!(matches!(err, FlowError::IllegalTransition { .. }));
    }

    #[tokio::test]
    async fn test_failed_validation_returns_to_amount_entry() {
        let mut processor = TransactionProcessor::start(deposit_engine(manager())).await.unwrap();
        processor.update_amount(Money::from_major(5, &usd())).await.unwrap();

        assert_eq!(processor.validate().await.unwrap(), ValidationState::UnderMinLimit);
        assert_eq!(processor.stage(), TxStage::AmountEntry);

        processor.update_amount(Money::from_major(50, &usd())).await.unwrap();
        assert_eq!(processor.validate().await.unwrap(), ValidationState::CanExecute);
        assert_eq!(processor.stage(), TxStage::Validated);
    }

    #[tokio::test]
    async fn test_amount_change_after_confirm_requires_revalidation() {
        let mut processor = TransactionProcessor::start(deposit_engine(manager())).await.unwrap();
        processor.update_amount(Money::from_major(50, &usd())).await.unwrap();
        processor.validate().await.unwrap();
        processor.build_confirmations().await.unwrap();
        assert_eq!(processor.stage(), TxStage::Confirmed);

        processor.update_amount(Money::from_major(60, &usd())).await.unwrap();
        assert_eq!(processor.stage(), TxStage::AmountEntry);
        assert!(processor.pending().confirmations.is_empty());
    }

    #[tokio::test]
    async fn test_full_flow_succeeds_and_is_terminal() {
        let mut processor = TransactionProcessor::start(deposit_engine(manager())).await.unwrap();
        processor.update_fee_level(FeeLevel::None, None).await.unwrap();
        assert_eq!(processor.stage(), TxStage::FeeSelected);
        processor.update_amount(Money::from_major(50, &usd())).await.unwrap();
        processor.validate().await.unwrap();
        processor.build_confirmations().await.unwrap();

        let outcome = processor.execute("", &CancelToken::new()).await.unwrap();
        assert!(matches!(outcome, FlowOutcome::Succeeded(TxResult::Hashed { .. })));
        assert_eq!(processor.stage(), TxStage::Succeeded);

        let err = processor.update_amount(Money::from_major(1, &usd())).await.unwrap_err();
        assert!(matches!(err, FlowError::Finished { stage: TxStage::Succeeded }));
    }

    #[tokio::test]
    async fn test_rejected_submission_fails_flow() {
        let manager = manager().rejecting_submissions("account frozen");
        let mut processor = TransactionProcessor::start(deposit_engine(manager)).await.unwrap();
        processor.update_amount(Money::from_major(50, &usd())).await.unwrap();
        processor.validate().await.unwrap();
        processor.build_confirmations().await.unwrap();

        let err = processor.execute("", &CancelToken::new()).await.unwrap_err();
        assert!(matches!(err, FlowError::Engine(TxEngineError::Provider(_))));
        assert_eq!(processor.stage(), TxStage::Failed);

        for err in [
            processor.validate().await.unwrap_err(),
            processor.execute("", &CancelToken::new()).await.unwrap_err(),
        ] {
            assert!(matches!(err, FlowError::Finished { stage: TxStage::Failed }));
        }
        assert_eq!(processor.stage(), TxStage::Failed);
    }
}
