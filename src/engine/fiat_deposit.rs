//! Deposit from a linked bank into a custodial fiat account.
//!
//! # Data Flow
//! ```text
//! initialise → limits for the bank's currency (open-banking only)
//! execute    → start_bank_transfer(link id, amount, currency, callback?)
//! post       → EUR/GBP: poll charge until authorisation url
//!                → linked bank lookup → NeedsApproval
//!              other currencies: Completed
//! ```

use async_trait::async_trait;

use crate::accounts::{Account, LinkedBankAccount};
use crate::banking::{is_open_banking_currency, BankPartner, BankPaymentApproval, BankTransferAction};
use crate::custodial::BankTransferCharge;
use crate::engine::confirmation::{ConfirmationsBuilder, TxConfirmation};
use crate::engine::context::EngineContext;
use crate::engine::error::TxEngineError;
use crate::engine::pending::PendingTx;
use crate::engine::result::{PostExecuteOutcome, TxResult};
use crate::engine::traits::TxEngine;
use crate::engine::types::{AssetAction, FeeLevel, TxLimit};
use crate::engine::validation;
use crate::observability::metrics;
use crate::resilience::{with_deadline, CancelToken};

const ENGINE_NAME: &str = "fiat_deposit";

pub struct FiatDepositTxEngine {
    ctx: EngineContext,
    source: Account,
    target: Account,
}

impl FiatDepositTxEngine {
    pub fn new(ctx: EngineContext, source: Account, target: Account) -> Self {
        Self { ctx, source, target }
    }

    fn bank(&self) -> Result<&LinkedBankAccount, TxEngineError> {
        self.source.as_linked_bank().ok_or_else(|| {
            TxEngineError::Precondition(format!("source must be a linked bank, got {}", self.source.kind()))
        })
    }

    fn is_open_banking(&self) -> bool {
        is_open_banking_currency(self.source.currency())
    }

    async fn fetch_charge(&self, payment_id: &str) -> Result<BankTransferCharge, TxEngineError> {
        let charge = with_deadline(
            "get_bank_transfer_charge",
            self.ctx.deadlines.lookup,
            self.ctx.manager.get_bank_transfer_charge(payment_id),
        )
        .await??;
        tracing::debug!(
            payment_id = %payment_id,
            authorised = charge.authorisation_url.is_some(),
            "Polled bank transfer charge"
        );
        Ok(charge)
    }
}

#[async_trait]
impl TxEngine for FiatDepositTxEngine {
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
        self.bank()?;
        TxEngineError::check(self.target.as_fiat().is_some(), || {
            format!("target must be a custodial fiat account, got {}", self.target.kind())
        })
    }

    async fn do_initialise_tx(&self) -> Result<PendingTx, TxEngineError> {
        let currency = &self.bank()?.currency;
        let limits = with_deadline(
            "get_bank_transfer_limits",
            self.ctx.deadlines.limits,
            self.ctx.manager.get_bank_transfer_limits(currency, true),
        )
        .await??;

        let (min, max) = TxLimit::from_transfer_limits(limits);
        tracing::debug!(currency = %currency, min = ?min, max = ?max, "Loaded deposit limits");
        Ok(PendingTx::zeroed(currency, &self.ctx.user_fiat).with_limits(min, max))
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
        let bank = self.bank()?;
        let confirmations = ConfirmationsBuilder::new()
            .push(TxConfirmation::PaymentMethod {
                label: bank.label.clone(),
                account_number: bank.account_number.clone(),
                account_type: bank.account_type.clone(),
                action: AssetAction::FiatDeposit,
            })
            .push(TxConfirmation::To {
                label: self.target.label().to_string(),
                action: AssetAction::FiatDeposit,
            })
            .push_if(!self.is_open_banking(), || TxConfirmation::EstimatedCompletion)
            .push(TxConfirmation::Amount {
                amount: pending.amount.clone(),
                is_important: true,
            })
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
        self.do_validate_amount(pending).await
    }

    async fn do_execute(&self, pending: &PendingTx, _second_password: &str) -> Result<TxResult, TxEngineError> {
        let address = self.source.receive_address()?;
        let callback = self
            .is_open_banking()
            .then(|| self.ctx.callbacks.callback(BankPartner::Yapily, BankTransferAction::Pay));

        let submitted = with_deadline(
            "start_bank_transfer",
            self.ctx.deadlines.submission,
            self.ctx.manager.start_bank_transfer(
                &address.address,
                &pending.amount,
                pending.amount.currency_code(),
                callback,
            ),
        )
        .await
        .map_err(TxEngineError::from)
        .and_then(|r| r.map_err(TxEngineError::from));

        metrics::record_submission(ENGINE_NAME, submitted.is_ok());
        let payment_id = submitted?;
        tracing::info!(
            payment_id = %payment_id,
            amount = %pending.amount,
            bank = %address.label,
            "Bank transfer started"
        );

        Ok(TxResult::Hashed {
            tx_id: payment_id,
            amount: pending.amount.clone(),
        })
    }

    async fn do_post_execute(
        &self,
        _pending: &PendingTx,
        result: &TxResult,
        cancel: &CancelToken,
    ) -> Result<PostExecuteOutcome, TxEngineError> {
        if !self.is_open_banking() {
            return Ok(PostExecuteOutcome::Completed);
        }
        let TxResult::Hashed { tx_id: payment_id, .. } = result else {
            return Err(TxEngineError::Precondition(format!(
                "deposit result {} has no payment id",
                result.id()
            )));
        };

        tracing::info!(payment_id = %payment_id, "Waiting for bank authorisation url");
        let (authorisation_url, charge) = self
            .ctx
            .poller
            .poll_map(
                || self.fetch_charge(payment_id),
                |charge: BankTransferCharge| {
                    let url = charge.authorisation_url.clone()?;
                    Some((url, charge))
                },
                cancel,
            )
            .await
            .map_err(|e| TxEngineError::from_approval_poll(payment_id, e))?;

        let linked_bank = with_deadline(
            "get_linked_bank",
            self.ctx.deadlines.lookup,
            self.ctx.manager.get_linked_bank(&charge.linked_bank_id),
        )
        .await??;

        tracing::info!(payment_id = %payment_id, bank = %linked_bank.name, "Payment needs bank approval");
        Ok(PostExecuteOutcome::NeedsApproval(BankPaymentApproval {
            payment_id: payment_id.clone(),
            authorisation_url,
            linked_bank,
            amount: charge.amount,
        }))
    }
}
