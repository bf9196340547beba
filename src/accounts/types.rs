//! Funding sources and receive targets.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::money::{Currency, Money};

/// Errors raised when an account cannot provide what an engine asks for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// The account has no address to settle into.
    #[error("Account '{0}' has no receive address")]
    NoReceiveAddress(String),
}

/// Capability variant of an account, used to key the engine registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Non-custodial crypto wallet account.
    CryptoWallet,
    /// External bank account linked through a banking partner.
    LinkedBank,
    /// Custodial fiat balance held by the exchange.
    CustodialFiat,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccountKind::CryptoWallet => "crypto_wallet",
            AccountKind::LinkedBank => "linked_bank",
            AccountKind::CustodialFiat => "custodial_fiat",
        };
        f.write_str(name)
    }
}

/// Where funds for a transfer are settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveAddress {
    /// Opaque address or account identifier understood by the custodian.
    pub address: String,
    /// Human label of the owning account.
    pub label: String,
}

/// A non-custodial wallet holding a crypto asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAccount {
    pub label: String,
    pub asset: Currency,
    /// Receive address, if one has been derived yet.
    pub address: Option<String>,
    pub balance: Money,
}

/// A bank account linked through a banking partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedBankAccount {
    /// Custodian-side identifier of the link.
    pub id: String,
    pub label: String,
    /// Masked account number, e.g. `****1234`.
    pub account_number: String,
    /// Account type as reported by the bank (e.g. "Checking").
    pub account_type: String,
    pub currency: Currency,
}

/// A custodial fiat balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiatAccount {
    pub label: String,
    pub currency: Currency,
    pub balance: Money,
}

/// Any account that can fund or receive a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Account {
    Wallet(WalletAccount),
    LinkedBank(LinkedBankAccount),
    Fiat(FiatAccount),
}

impl Account {
    pub fn kind(&self) -> AccountKind {
        match self {
            Account::Wallet(_) => AccountKind::CryptoWallet,
            Account::LinkedBank(_) => AccountKind::LinkedBank,
            Account::Fiat(_) => AccountKind::CustodialFiat,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Account::Wallet(a) => &a.label,
            Account::LinkedBank(a) => &a.label,
            Account::Fiat(a) => &a.label,
        }
    }

    /// Currency the account is denominated in.
    pub fn currency(&self) -> &Currency {
        match self {
            Account::Wallet(a) => &a.asset,
            Account::LinkedBank(a) => &a.currency,
            Account::Fiat(a) => &a.currency,
        }
    }

    /// Whether funds can be drawn from this account.
    pub fn is_funding_source(&self) -> bool {
        match self {
            Account::Wallet(a) => !a.balance.is_zero(),
            Account::LinkedBank(_) | Account::Fiat(_) => true,
        }
    }

    /// Whether funds can be sent to this account.
    pub fn is_receive_target(&self) -> bool {
        match self {
            Account::Wallet(a) => a.address.is_some(),
            Account::LinkedBank(_) | Account::Fiat(_) => true,
        }
    }

    /// Balance snapshot. Linked banks do not report one.
    pub fn balance(&self) -> Option<&Money> {
        match self {
            Account::Wallet(a) => Some(&a.balance),
            Account::Fiat(a) => Some(&a.balance),
            Account::LinkedBank(_) => None,
        }
    }

    /// Address the custodian settles into for this account.
    ///
    /// For a linked bank this is the link id; for a custodial fiat account it
    /// is the currency code of the custodial balance.
    pub fn receive_address(&self) -> Result<ReceiveAddress, AccountError> {
        let address = match self {
            Account::Wallet(a) => a
                .address
                .clone()
                .ok_or_else(|| AccountError::NoReceiveAddress(a.label.clone()))?,
            Account::LinkedBank(a) => a.id.clone(),
            Account::Fiat(a) => a.currency.code().to_string(),
        };
        Ok(ReceiveAddress {
            address,
            label: self.label().to_string(),
        })
    }

    pub fn as_linked_bank(&self) -> Option<&LinkedBankAccount> {
        match self {
            Account::LinkedBank(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_fiat(&self) -> Option<&FiatAccount> {
        match self {
            Account::Fiat(a) => Some(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gbp() -> Currency {
        Currency::new("GBP").unwrap()
    }

    fn bank() -> Account {
        Account::LinkedBank(LinkedBankAccount {
            id: "bank-1".into(),
            label: "High Street".into(),
            account_number: "****1234".into(),
            account_type: "Checking".into(),
            currency: gbp(),
        })
    }

    #[test]
    fn test_bank_receive_address_is_link_id() {
        let addr = bank().receive_address().unwrap();
        assert_eq!(addr.address, "bank-1");
        assert_eq!(addr.label, "High Street");
        assert_eq!(bank().kind(), AccountKind::LinkedBank);
        assert!(bank().balance().is_none());
    }

    #[test]
    fn test_wallet_capabilities() {
        let btc = Currency::new("BTC").unwrap();
        let wallet = Account::Wallet(WalletAccount {
            label: "Savings".into(),
            asset: btc.clone(),
            address: None,
            balance: Money::zero(&btc),
        });
        assert!(!wallet.is_funding_source());
        assert!(!wallet.is_receive_target());
        assert_eq!(
            wallet.receive_address().unwrap_err(),
            AccountError::NoReceiveAddress("Savings".into())
        );
    }

    #[test]
    fn test_variant_accessors() {
        let fiat = Account::Fiat(FiatAccount {
            label: "GBP Account".into(),
            currency: gbp(),
            balance: Money::from_major(50, &gbp()),
        });
        assert!(fiat.as_fiat().is_some());
        assert!(fiat.as_linked_bank().is_none());
        assert!(bank().as_linked_bank().is_some());
        assert_eq!(fiat.receive_address().unwrap().address, "GBP");
        assert_eq!(AccountKind::CustodialFiat.to_string(), "custodial_fiat");
    }
}
