//! Amount and balance checks shared by engines.
//!
//! Both checks classify instead of failing: an amount outside the limits is a
//! `ValidationState`, not an error. The only errors are currency mismatches
//! between the amount and a limit or balance.

use crate::engine::pending::PendingTx;
use crate::engine::types::{TxLimit, ValidationState};
use crate::money::MoneyError;

/// A zero amount that has never been validated is left alone, so a blank
/// entry field does not show an error before the user types anything.
pub fn is_untouched(pending: &PendingTx) -> bool {
    pending.validation_state == ValidationState::Uninitialised && pending.amount.is_zero()
}

/// Classify `pending.amount` against its limits. Bounds are inclusive.
pub fn classify_amount(pending: &PendingTx) -> Result<ValidationState, MoneyError> {
    if !pending.min_limit.is_known() || !pending.max_limit.is_known() {
        return Ok(ValidationState::UnknownError);
    }
    if pending.amount.is_zero() {
        return Ok(ValidationState::InvalidAmount);
    }
    if let TxLimit::Limited(min) = &pending.min_limit {
        if pending.amount.is_less_than(min)? {
            return Ok(ValidationState::UnderMinLimit);
        }
    }
    if let TxLimit::Limited(max) = &pending.max_limit {
        if pending.amount.is_greater_than(max)? {
            return Ok(ValidationState::OverMaxLimit);
        }
    }
    Ok(ValidationState::CanExecute)
}

/// Amount plus fee must fit in the available balance.
pub fn classify_balance(pending: &PendingTx) -> Result<ValidationState, MoneyError> {
    let outgoing = pending.total_outgoing()?;
    if outgoing.is_greater_than(&pending.available_balance)? {
        Ok(ValidationState::InsufficientFunds)
    } else {
        Ok(ValidationState::CanExecute)
    }
}
