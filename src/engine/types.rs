//! Transaction engine vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::custodial::TransferLimits;
use crate::engine::error::TxEngineError;
use crate::money::Money;

/// What the user is doing with the bound source and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetAction {
    Send,
    FiatDeposit,
    Withdraw,
}

impl fmt::Display for AssetAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetAction::Send => "send",
            AssetAction::FiatDeposit => "fiat_deposit",
            AssetAction::Withdraw => "withdraw",
        };
        f.write_str(name)
    }
}

/// Fee priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeLevel {
    None,
    Regular,
    Priority,
    Custom,
}

/// Chosen fee tier plus the tiers legal for the engine.
///
/// The selected level is always one of the available levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSelection {
    selected: FeeLevel,
    available: Vec<FeeLevel>,
    custom_amount: Option<u64>,
}

impl FeeSelection {
    pub fn new(selected: FeeLevel, available: Vec<FeeLevel>) -> Result<Self, TxEngineError> {
        if !available.contains(&selected) {
            return Err(TxEngineError::Precondition(format!(
                "fee level {:?} is not one of {:?}",
                selected, available
            )));
        }
        Ok(Self {
            selected,
            available,
            custom_amount: None,
        })
    }

    pub fn selected(&self) -> FeeLevel {
        self.selected
    }

    pub fn available(&self) -> &[FeeLevel] {
        &self.available
    }

    pub fn custom_amount(&self) -> Option<u64> {
        self.custom_amount
    }

    pub fn is_available(&self, level: FeeLevel) -> bool {
        self.available.contains(&level)
    }

    /// Switch to another available level.
    pub fn select(&self, level: FeeLevel, custom_amount: Option<u64>) -> Result<Self, TxEngineError> {
        let mut next = Self::new(level, self.available.clone())?;
        next.custom_amount = if level == FeeLevel::Custom { custom_amount } else { None };
        Ok(next)
    }
}

impl Default for FeeSelection {
    /// Single "no fee" tier.
    fn default() -> Self {
        Self {
            selected: FeeLevel::None,
            available: vec![FeeLevel::None],
            custom_amount: None,
        }
    }
}

/// Outcome of the last validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationState {
    Uninitialised,
    CanExecute,
    InvalidAmount,
    UnderMinLimit,
    OverMaxLimit,
    InsufficientFunds,
    /// Limits were not loaded, so the amount could not be checked.
    UnknownError,
}

impl ValidationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationState::Uninitialised => "uninitialised",
            ValidationState::CanExecute => "can_execute",
            ValidationState::InvalidAmount => "invalid_amount",
            ValidationState::UnderMinLimit => "under_min_limit",
            ValidationState::OverMaxLimit => "over_max_limit",
            ValidationState::InsufficientFunds => "insufficient_funds",
            ValidationState::UnknownError => "unknown_error",
        }
    }
}

/// Position of a flow in the pipeline.
///
/// ```text
/// Uninitialised → AmountEntry → FeeSelected → Validated → Confirmed → Executing
///     → Succeeded | AwaitingApproval | Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStage {
    Uninitialised,
    AmountEntry,
    FeeSelected,
    Validated,
    Confirmed,
    Executing,
    Succeeded,
    AwaitingApproval,
    Failed,
}

impl TxStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStage::Uninitialised => "uninitialised",
            TxStage::AmountEntry => "amount_entry",
            TxStage::FeeSelected => "fee_selected",
            TxStage::Validated => "validated",
            TxStage::Confirmed => "confirmed",
            TxStage::Executing => "executing",
            TxStage::Succeeded => "succeeded",
            TxStage::AwaitingApproval => "awaiting_approval",
            TxStage::Failed => "failed",
        }
    }

    /// No further engine calls are possible from this stage.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStage::Succeeded | TxStage::AwaitingApproval | TxStage::Failed)
    }
}

impl fmt::Display for TxStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transfer bound that may not have been fetched yet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TxLimit {
    /// Not fetched; amount validation cannot run.
    #[default]
    Unknown,
    /// Fetched, and there is no bound.
    Unbounded,
    Limited(Money),
}

impl TxLimit {
    pub fn is_known(&self) -> bool {
        !matches!(self, TxLimit::Unknown)
    }

    /// Pair of (min, max) bounds from fetched transfer limits.
    pub fn from_transfer_limits(limits: TransferLimits) -> (TxLimit, TxLimit) {
        let max = match limits.max {
            Some(max) => TxLimit::Limited(max),
            None => TxLimit::Unbounded,
        };
        (TxLimit::Limited(limits.min), max)
    }
}
