//! Shared fixtures for flow tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tx_engine::accounts::{Account, FiatAccount, LinkedBankAccount};
use tx_engine::banking::{BankPartner, ConfiguredCallbackProvider, LinkedBank};
use tx_engine::config::EngineConfig;
use tx_engine::custodial::{InMemoryCustodialManager, TransferLimits};
use tx_engine::engine::{Deadlines, EngineContext, EngineRegistry};
use tx_engine::money::{Currency, Money};

pub const BANK_ID: &str = "bank-1";

pub fn currency(code: &str) -> Currency {
    Currency::new(code).unwrap()
}

pub fn money(units: i64, code: &str) -> Money {
    Money::from_major(units, &currency(code))
}

/// Config with millisecond poll intervals so approval tests run fast.
pub fn fast_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.poll.interval_ms = 5;
    config.poll.max_attempts = 5;
    config
}

/// Backend with 10..=5000 limits and a linked bank for `code`.
pub fn manager(code: &str) -> InMemoryCustodialManager {
    InMemoryCustodialManager::new()
        .with_limits(
            &currency(code),
            TransferLimits {
                min: money(10, code),
                max: Some(money(5000, code)),
            },
        )
        .with_linked_bank(LinkedBank {
            id: BANK_ID.into(),
            name: "High Street Bank".into(),
            account_number: "****1234".into(),
            account_type: "Checking".into(),
            currency: currency(code),
            partner: BankPartner::Yapily,
        })
}

pub fn registry(config: &EngineConfig, manager: InMemoryCustodialManager, code: &str) -> EngineRegistry {
    EngineRegistry::with_defaults(EngineContext::from_config(
        config,
        Arc::new(manager),
        Arc::new(ConfiguredCallbackProvider::new(&config.banking).unwrap()),
        currency(code),
    ))
}

/// Registry whose custodial calls all share a millisecond `deadline`.
pub fn registry_with_deadline(
    config: &EngineConfig,
    manager: InMemoryCustodialManager,
    code: &str,
    deadline: Duration,
) -> EngineRegistry {
    let mut ctx = EngineContext::from_config(
        config,
        Arc::new(manager),
        Arc::new(ConfiguredCallbackProvider::new(&config.banking).unwrap()),
        currency(code),
    );
    ctx.deadlines = Deadlines {
        limits: deadline,
        submission: deadline,
        lookup: deadline,
    };
    EngineRegistry::with_defaults(ctx)
}

pub fn bank_account(code: &str) -> Account {
    Account::LinkedBank(LinkedBankAccount {
        id: BANK_ID.into(),
        label: "High Street".into(),
        account_number: "****1234".into(),
        account_type: "Checking".into(),
        currency: currency(code),
    })
}

pub fn fiat_account(code: &str, balance: i64) -> Account {
    Account::Fiat(FiatAccount {
        label: format!("{} Account", code),
        currency: currency(code),
        balance: money(balance, code),
    })
}
