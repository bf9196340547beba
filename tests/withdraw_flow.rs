//! Fiat withdrawal flows against the in-memory custodian.

mod common;

use common::*;
use tx_engine::engine::{
    AssetAction, FlowError, FlowOutcome, TransactionProcessor, TxConfirmation, TxEngineError, TxResult, TxStage,
    ValidationState,
};
use tx_engine::CancelToken;

#[tokio::test]
async fn test_withdraw_places_order() {
    let config = fast_config();
    let manager = manager("GBP").with_withdrawal_fee(money(1, "GBP"));
    let registry = registry(&config, manager.clone(), "GBP");
    let engine = registry
        .bind(fiat_account("GBP", 500), bank_account("GBP"), AssetAction::Withdraw)
        .unwrap();

    let pending = engine.initialise_tx().await.unwrap();
    assert_eq!(manager.last_limits_request(&currency("GBP")), Some(false));
    assert_eq!(pending.available_balance, money(500, "GBP"));
    assert_eq!(pending.fee_amount, money(1, "GBP"));

    let mut processor = TransactionProcessor::start(engine).await.unwrap();
    processor.update_amount(money(200, "GBP")).await.unwrap();
    assert_eq!(processor.validate().await.unwrap(), ValidationState::CanExecute);

    let pending = processor.build_confirmations().await.unwrap();
    assert_eq!(pending.confirmations.len(), 6);
    assert_eq!(pending.confirmations[2], TxConfirmation::FeeAmount { fee: money(1, "GBP") });
    assert_eq!(pending.confirmations[5], TxConfirmation::Total { total: money(201, "GBP") });

    let outcome = processor.execute("", &CancelToken::new()).await.unwrap();
    let FlowOutcome::Succeeded(TxResult::Unhashed { order_id, amount }) = outcome else {
        panic!("expected unhashed result");
    };
    assert_eq!(amount, money(200, "GBP"));
    assert_eq!(processor.stage(), TxStage::Succeeded);

    let orders = manager.withdraw_orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, order_id);
    assert_eq!(orders[0].bank_id, BANK_ID);
}

#[tokio::test]
async fn test_fee_pushes_over_balance() {
    let config = fast_config();
    let manager = manager("USD").with_withdrawal_fee(money(5, "USD"));
    let registry = registry(&config, manager, "USD");
    let engine = registry
        .bind(fiat_account("USD", 100), bank_account("USD"), AssetAction::Withdraw)
        .unwrap();

    let pending = engine.initialise_tx().await.unwrap();
    let pending = engine.update_amount(money(96, "USD"), pending).await.unwrap();

    let amount_only = engine.validate_amount(pending.clone()).await.unwrap();
    assert_eq!(amount_only.validation_state, ValidationState::CanExecute);

    let all = engine.validate_all(pending).await.unwrap();
    assert_eq!(all.validation_state, ValidationState::InsufficientFunds);
}

#[tokio::test]
async fn test_limits_checked_before_balance() {
    let config = fast_config();
    let registry = registry(&config, manager("EUR"), "EUR");
    let engine = registry
        .bind(fiat_account("EUR", 3), bank_account("EUR"), AssetAction::Withdraw)
        .unwrap();

    let pending = engine.initialise_tx().await.unwrap();
    let pending = engine.update_amount(money(5, "EUR"), pending).await.unwrap();
    let pending = engine.validate_all(pending).await.unwrap();
    assert_eq!(pending.validation_state, ValidationState::UnderMinLimit);
}

#[tokio::test]
async fn test_rejected_order_fails_flow() {
    let config = fast_config();
    let manager = manager("GBP").rejecting_submissions("limit review");
    let registry = registry(&config, manager, "GBP");
    let engine = registry
        .bind(fiat_account("GBP", 500), bank_account("GBP"), AssetAction::Withdraw)
        .unwrap();

    let mut processor = TransactionProcessor::start(engine).await.unwrap();
    processor.update_amount(money(100, "GBP")).await.unwrap();
    processor.validate().await.unwrap();
    processor.build_confirmations().await.unwrap();

    let err = processor.execute("", &CancelToken::new()).await.unwrap_err();
    assert!(matches!(err, FlowError::Engine(TxEngineError::Provider(_))));
    assert_eq!(processor.stage(), TxStage::Failed);
}
