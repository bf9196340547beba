//! Pre-submission review summary.

use serde::{Deserialize, Serialize};

use crate::engine::types::AssetAction;
use crate::money::Money;

/// One line item of the summary shown to the user before execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TxConfirmation {
    /// The bank account paying for the transaction.
    PaymentMethod {
        label: String,
        account_number: String,
        account_type: String,
        action: AssetAction,
    },
    From { label: String },
    To { label: String, action: AssetAction },
    /// Funds arrive after the usual settlement window rather than instantly.
    EstimatedCompletion,
    FeeAmount { fee: Money },
    Amount { amount: Money, is_important: bool },
    Total { total: Money },
}

/// Ordered list builder that skips entries whose condition is false.
#[derive(Debug, Default)]
pub struct ConfirmationsBuilder {
    entries: Vec<TxConfirmation>,
}

impl ConfirmationsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, entry: TxConfirmation) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn push_if(self, condition: bool, entry: impl FnOnce() -> TxConfirmation) -> Self {
        if condition {
            self.push(entry())
        } else {
            self
        }
    }

    pub fn build(self) -> Vec<TxConfirmation> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditional_entries_keep_order() {
        let list = ConfirmationsBuilder::new()
            .push(TxConfirmation::From { label: "a".into() })
            .push_if(false, || TxConfirmation::EstimatedCompletion)
            .push(TxConfirmation::To { label: "b".into(), action: AssetAction::Withdraw })
            .push_if(true, || TxConfirmation::EstimatedCompletion)
            .build();

        assert_eq!(
            list,
            vec![
                TxConfirmation::From { label: "a".into() },
                TxConfirmation::To { label: "b".into(), action: AssetAction::Withdraw },
                TxConfirmation::EstimatedCompletion,
            ]
        );
    }
}
