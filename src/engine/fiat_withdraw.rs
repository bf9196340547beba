//! Withdrawal from a custodial fiat account to a linked bank.

use async_trait::async_trait;

use crate::accounts::{Account, FiatAccount, LinkedBankAccount};
use crate::engine::confirmation::{ConfirmationsBuilder, TxConfirmation};
use crate::engine::context::EngineContext;
use crate::engine::error::TxEngineError;
use crate::engine::pending::PendingTx;
use crate::engine::result::{PostExecuteOutcome, TxResult};
use crate::engine::traits::TxEngine;
use crate::engine::types::{AssetAction, FeeLevel, TxLimit, ValidationState};
use crate::engine::validation;
use crate::observability::metrics;
use crate::resilience::{with_deadline, CancelToken};

const ENGINE_NAME: &str = "fiat_withdraw";

pub struct FiatWithdrawTxEngine {
    ctx: EngineContext,
    source: Account,
    target: Account,
}

impl FiatWithdrawTxEngine {
    pub fn new(ctx: EngineContext, source: Account, target: Account) -> Self {
        Self { ctx, source, target }
    }

    fn fiat(&self) -> Result<&FiatAccount, TxEngineError> {
        self.source.as_fiat().ok_or_else(|| {
            TxEngineError::Precondition(format!(
                "source must be a custodial fiat account, got {}",
                self.source.kind()
            ))
        })
    }

    fn bank(&self) -> Result<&LinkedBankAccount, TxEngineError> {
        self.target.as_linked_bank().ok_or_else(|| {
            TxEngineError::Precondition(format!("target must be a linked bank, got {}", self.target.kind()))
        })
    }
}

#[async_trait]
impl TxEngine for FiatWithdrawTxEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn source(&self) -> &Account {
        &self.source
    }

    fn target(&self) -> &Account {
        &self.target
    }

    fn assert_inputs_valid(&self) -> Result<(), TxEngineError> {
        let fiat = self.fiat()?;
        let bank = self.bank()?;
        TxEngineError::check(fiat.currency == bank.currency, || {
            format!("cannot withdraw {} to a {} bank account", fiat.currency, bank.currency)
        })
    }

    async fn do_initialise_tx(&self) -> Result<PendingTx, TxEngineError> {
        let fiat = self.fiat()?;
        let limits = with_deadline(
            "get_bank_transfer_limits",
            self.ctx.deadlines.limits,
            self.ctx.manager.get_bank_transfer_limits(&fiat.currency, false),
        )
        .await??;
        let fee = with_deadline(
            "get_withdrawal_fee",
            self.ctx.deadlines.limits,
            self.ctx.manager.get_withdrawal_fee(&fiat.currency),
        )
        .await??;

        let (min, max) = TxLimit::from_transfer_limits(limits);
        let mut pending = PendingTx::zeroed(&fiat.currency, &self.ctx.user_fiat).with_limits(min, max);
        pending.total_balance = fiat.balance.clone();
        pending.available_balance = fiat.balance.clone();
        pending.fee_for_full_available = fee.clone();
        pending.fee_amount = fee;
        Ok(pending)
    }

    async fn do_update_fee_level(
        &self,
        pending: PendingTx,
        _level: FeeLevel,
        _custom_fee: Option<u64>,
    ) -> Result<PendingTx, TxEngineError> {
        Ok(pending)
    }

    async fn do_build_confirmations(&self, pending: PendingTx) -> Result<PendingTx, TxEngineError> {
        let total = pending.total_outgoing()?;
        let confirmations = ConfirmationsBuilder::new()
            .push(TxConfirmation::From {
                label: self.source.label().to_string(),
            })
            .push(TxConfirmation::To {
                label: self.target.label().to_string(),
                action: AssetAction::Withdraw,
            })
            .push(TxConfirmation::FeeAmount {
                fee: pending.fee_amount.clone(),
            })
            .push(TxConfirmation::EstimatedCompletion)
            .push(TxConfirmation::Amount {
                amount: pending.amount.clone(),
                is_important: false,
            })
            .push(TxConfirmation::Total { total })
            .build();
        Ok(PendingTx { confirmations, ..pending })
    }

    async fn do_validate_amount(&self, pending: PendingTx) -> Result<PendingTx, TxEngineError> {
        if validation::is_untouched(&pending) {
            return Ok(pending);
        }
        let state = validation::classify_amount(&pending)?;
        metrics::record_validation(ENGINE_NAME, state.as_str());
        Ok(pending.with_validation(state))
    }

    async fn do_validate_all(&self, pending: PendingTx) -> Result<PendingTx, TxEngineError> {
        let pending = self.do_validate_amount(pending).await?;
        if pending.validation_state != ValidationState::CanExecute {
            return Ok(pending);
        }
        let state = validation::classify_balance(&pending)?;
        if state != ValidationState::CanExecute {
            metrics::record_validation(ENGINE_NAME, state.as_str());
        }
        Ok(pending.with_validation(state))
    }

    async fn do_execute(&self, pending: &PendingTx, _second_password: &str) -> Result<TxResult, TxEngineError> {
        let bank = self.bank()?;
        let placed = with_deadline(
            "create_withdraw_order",
            self.ctx.deadlines.submission,
            self.ctx.manager.create_withdraw_order(&bank.id, &pending.amount),
        )
        .await
        .map_err(TxEngineError::from)
        .and_then(|r| r.map_err(TxEngineError::from));

        metrics::record_submission(ENGINE_NAME, placed.is_ok());
        let order_id = placed?;
        tracing::info!(order_id = %order_id, amount = %pending.amount, bank = %bank.label, "Withdrawal order placed");

        Ok(TxResult::Unhashed {
            order_id,
            amount: pending.amount.clone(),
        })
    }

    async fn do_post_execute(
        &self,
        _pending: &PendingTx,
        _result: &TxResult,
        _cancel: &CancelToken,
    ) -> Result<PostExecuteOutcome, TxEngineError> {
        Ok(PostExecuteOutcome::Completed)
    }
}
