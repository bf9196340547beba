//! Bank partner callback provider.

use thiserror::Error;
use url::Url;

use crate::banking::types::{BankPartner, BankTransferAction, BankTransferCallback};
use crate::config::BankingConfig;

/// Supplies the redirect descriptor attached to open-banking transfers.
pub trait BankPartnerCallbackProvider: Send + Sync {
    fn callback(&self, partner: BankPartner, action: BankTransferAction) -> BankTransferCallback;
}

#[derive(Debug, Error)]
pub enum CallbackUrlError {
    #[error("invalid callback base url: {0}")]
    Parse(#[from] url::ParseError),

    #[error("callback base url '{0}' must be an http(s) url with a host")]
    NotHttp(String),
}

/// Builds callback URLs of the form `{base}/{partner}/{action}`.
#[derive(Debug, Clone)]
pub struct ConfiguredCallbackProvider {
    base: Url,
}

impl ConfiguredCallbackProvider {
    pub fn new(config: &BankingConfig) -> Result<Self, CallbackUrlError> {
        let base = Url::parse(&config.callback_base_url)?;
        let has_host = base.host_str().is_some_and(|host| !host.is_empty());
        if !matches!(base.scheme(), "http" | "https") || !has_host || base.cannot_be_a_base() {
            return Err(CallbackUrlError::NotHttp(config.callback_base_url.clone()));
        }
        Ok(Self { base })
    }
}

impl BankPartnerCallbackProvider for ConfiguredCallbackProvider {
    fn callback(&self, partner: BankPartner, action: BankTransferAction) -> BankTransferCallback {
        let mut redirect = self.base.clone();
        // http(s) bases with a host always have path segments.
        if let Ok(mut segments) = redirect.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&partner.to_string())
                .push(&action.to_string());
        }
        BankTransferCallback {
            partner,
            action,
            redirect_url: redirect.to_string(),
        }
    }
}
