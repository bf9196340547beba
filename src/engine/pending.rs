//! The record threaded through every pipeline stage.

use serde::{Deserialize, Serialize};

use crate::engine::confirmation::TxConfirmation;
use crate::engine::types::{FeeSelection, TxLimit, TxStage, ValidationState};
use crate::money::{Currency, Money};

/// An in-progress transaction.
///
/// Owned by exactly one flow. Each stage takes the previous stage's output
/// and returns the next value; nothing else mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTx {
    /// Amount the user wants to move. Never negative.
    pub amount: Money,
    pub total_balance: Money,
    pub available_balance: Money,
    /// Fee that would be charged when sending the whole available balance.
    pub fee_for_full_available: Money,
    pub fee_amount: Money,
    /// The user's display fiat currency.
    pub selected_fiat: Currency,
    pub min_limit: TxLimit,
    pub max_limit: TxLimit,
    pub fee_selection: FeeSelection,
    pub validation_state: ValidationState,
    pub confirmations: Vec<TxConfirmation>,
    pub stage: TxStage,
}

impl PendingTx {
    /// All amounts zero in `currency`, limits unknown, default fee selection.
    pub fn zeroed(currency: &Currency, selected_fiat: &Currency) -> Self {
        let zero = Money::zero(currency);
        Self {
            amount: zero.clone(),
            total_balance: zero.clone(),
            available_balance: zero.clone(),
            fee_for_full_available: zero.clone(),
            fee_amount: zero,
            selected_fiat: selected_fiat.clone(),
            min_limit: TxLimit::Unknown,
            max_limit: TxLimit::Unknown,
            fee_selection: FeeSelection::default(),
            validation_state: ValidationState::Uninitialised,
            confirmations: Vec::new(),
            stage: TxStage::Uninitialised,
        }
    }

    pub fn with_limits(mut self, min_limit: TxLimit, max_limit: TxLimit) -> Self {
        self.min_limit = min_limit;
        self.max_limit = max_limit;
        self
    }

    pub fn with_validation(mut self, state: ValidationState) -> Self {
        self.validation_state = state;
        self
    }

    /// Amount plus fee, in the amount's currency.
    pub fn total_outgoing(&self) -> Result<Money, crate::money::MoneyError> {
        self.amount.checked_add(&self.fee_amount)
    }
}
