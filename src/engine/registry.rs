//! Engine selection by account capabilities and action.

use std::collections::HashMap;
use std::sync::Arc;

use crate::accounts::{Account, AccountKind};
use crate::engine::context::EngineContext;
use crate::engine::error::TxEngineError;
use crate::engine::fiat_deposit::FiatDepositTxEngine;
use crate::engine::fiat_withdraw::FiatWithdrawTxEngine;
use crate::engine::traits::TxEngine;
use crate::engine::types::AssetAction;

/// Registry lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineKey {
    pub source: AccountKind,
    pub target: AccountKind,
    pub action: AssetAction,
}

impl EngineKey {
    pub fn new(source: AccountKind, target: AccountKind, action: AssetAction) -> Self {
        Self { source, target, action }
    }
}

type EngineFactory = Arc<dyn Fn(EngineContext, Account, Account) -> Box<dyn TxEngine> + Send + Sync>;

pub struct EngineRegistry {
    ctx: EngineContext,
    factories: HashMap<EngineKey, EngineFactory>,
}

impl EngineRegistry {
    /// Empty registry sharing `ctx` with every engine it builds.
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            ctx,
            factories: HashMap::new(),
        }
    }

    /// Registry with the fiat deposit and withdrawal engines.
    pub fn with_defaults(ctx: EngineContext) -> Self {
        let mut registry = Self::new(ctx);
        registry.register(
            EngineKey::new(AccountKind::LinkedBank, AccountKind::CustodialFiat, AssetAction::FiatDeposit),
            |ctx, source, target| -> Box<dyn TxEngine> {
                Box::new(FiatDepositTxEngine::new(ctx, source, target))
            },
        );
        registry.register(
            EngineKey::new(AccountKind::CustodialFiat, AccountKind::LinkedBank, AssetAction::Withdraw),
            |ctx, source, target| -> Box<dyn TxEngine> {
                Box::new(FiatWithdrawTxEngine::new(ctx, source, target))
            },
        );
        registry
    }

    pub fn register<F>(&mut self, key: EngineKey, factory: F)
    where
        F: Fn(EngineContext, Account, Account) -> Box<dyn TxEngine> + Send + Sync + 'static,
    {
        self.factories.insert(key, Arc::new(factory));
    }

    pub fn supports(&self, key: &EngineKey) -> bool {
        self.factories.contains_key(key)
    }

    /// Build the engine for `source → target` and check it accepts them.
    pub fn bind(&self, source: Account, target: Account, action: AssetAction) -> Result<Box<dyn TxEngine>, TxEngineError> {
        let key = EngineKey::new(source.kind(), target.kind(), action);
        let factory = self.factories.get(&key).ok_or(TxEngineError::Unsupported {
            from: key.source,
            to: key.target,
            action,
        })?;

        let engine = factory(self.ctx.clone(), source, target);
        engine.assert_inputs_valid()?;
        tracing::debug!(engine = engine.name(), source = %key.source, target = %key.target, "Engine bound");
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{FiatAccount, LinkedBankAccount, WalletAccount};
    use crate::banking::ConfiguredCallbackProvider;
    use crate::config::EngineConfig;
    use crate::custodial::InMemoryCustodialManager;
    use crate::money::{Currency, Money};

    fn registry() -> EngineRegistry {
        let config = EngineConfig::default();
        let gbp = Currency::new("GBP").unwrap();
        EngineRegistry::with_defaults(EngineContext::from_config(
            &config,
            Arc::new(InMemoryCustodialManager::new()),
            Arc::new(ConfiguredCallbackProvider::new(&config.banking).unwrap()),
            gbp,
        ))
    }

    fn bank(code: &str) -> Account {
        Account::LinkedBank(LinkedBankAccount {
            id: "bank-1".into(),
            label: "High Street".into(),
            account_number: "****1234".into(),
            account_type: "Checking".into(),
            currency: Currency::new(code).unwrap(),
        })
    }

    fn fiat(code: &str) -> Account {
        let currency = Currency::new(code).unwrap();
        Account::Fiat(FiatAccount {
            label: format!("{} Wallet", code),
            balance: Money::from_major(100, &currency),
            currency,
        })
    }

    #[test]
    fn test_bind_defaults() {
        let registry = registry();
        let deposit = registry.bind(bank("GBP"), fiat("GBP"), AssetAction::FiatDeposit).unwrap();
        assert_eq!(deposit.name(), "fiat_deposit");
        let withdraw = registry.bind(fiat("GBP"), bank("GBP"), AssetAction::Withdraw).unwrap();
        assert_eq!(withdraw.name(), "fiat_withdraw");
    }

    #[test]
    fn test_unknown_combination_is_unsupported() {
        let wallet = Account::Wallet(WalletAccount {
            label: "BTC".into(),
            asset: Currency::new("BTC").unwrap(),
            address: None,
            balance: Money::zero(&Currency::new("BTC").unwrap()),
        });
        let result = registry().bind(wallet, fiat("GBP"), AssetAction::FiatDeposit);
        assert!(matches!(result, Err(TxEngineError::Unsupported { .. })));

        let result = registry().bind(bank("GBP"), fiat("GBP"), AssetAction::Withdraw);
        assert!(matches!(result, Err(TxEngineError::Unsupported { .. })));
    }

    #[test]
    fn test_bind_runs_input_checks() {
        let result = registry().bind(fiat("EUR"), bank("GBP"), AssetAction::Withdraw);
        assert!(matches!(result, Err(TxEngineError::Precondition(_))));
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = registry();
        let key = EngineKey::new(AccountKind::LinkedBank, AccountKind::CustodialFiat, AssetAction::Send);
        assert!(!registry.supports(&key));
        registry.register(key, |ctx, source, target| -> Box<dyn TxEngine> {
            Box::new(FiatDepositTxEngine::new(ctx, source, target))
        });
        assert!(registry.supports(&key));
        assert!(registry.bind(bank("GBP"), fiat("GBP"), AssetAction::Send).is_ok());
    }
}
