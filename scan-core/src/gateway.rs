use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use lightning::log_debug;
use lightning::util::logger::Logger;
use lightning_invoice::Bolt11Invoice;
use lnurl::lightning_address::LightningAddress;
use lnurl::lnurl::LnUrl;

use crate::bip21;
use crate::input::{LightningInvoice, LnUrlFailure, ParsedInput};
use crate::lnurlclient::{self, LnUrlClient};
use crate::logging::ScanLogger;
use crate::utils;

#[cfg(test)]
use mockall::{automock, predicate::*};

/// Why a raw string could not be turned into a [`ParsedInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeFailure {
    /// No known format matched.
    NotRecognized,
    /// The format was recognized but the service behind it failed.
    Service(LnUrlFailure),
}

/// Decodes raw scanned or pasted text.
#[cfg_attr(test, automock)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait DecoderGateway {
    async fn decode(&self, raw: &str) -> Result<ParsedInput, DecodeFailure>;
}

/// Decodes the formats a lightning wallet is expected to read, in order:
/// bolt11 invoice, on-chain address or `bitcoin:` uri, LNURL, then
/// lightning address.
pub struct WalletDecoder<C: LnUrlClient> {
    lnurl_client: C,
    logger: Arc<ScanLogger>,
}

impl<C: LnUrlClient> WalletDecoder<C> {
    pub fn new(lnurl_client: C, logger: Arc<ScanLogger>) -> Self {
        Self {
            lnurl_client,
            logger,
        }
    }
}

/// Where a lightning address' LNURL-pay endpoint lives.
fn lightning_address_url(input: &str) -> Option<String> {
    LightningAddress::from_str(input).ok()?;
    let (user, domain) = input.split_once('@')?;
    let user = user.to_lowercase();
    let domain = domain.to_lowercase();
    // onion services don't do tls
    let scheme = if domain.ends_with(".onion") {
        "http"
    } else {
        "https"
    };
    Some(format!("{scheme}://{domain}/.well-known/lnurlp/{user}"))
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<C: LnUrlClient + Send + Sync> DecoderGateway for WalletDecoder<C> {
    async fn decode(&self, raw: &str) -> Result<ParsedInput, DecodeFailure> {
        let trimmed = raw.trim();
        let input = utils::strip_scheme(trimmed, "lightning").unwrap_or(trimmed);
        if input.is_empty() {
            return Err(DecodeFailure::NotRecognized);
        }

        if let Ok(invoice) = Bolt11Invoice::from_str(&input.to_lowercase()) {
            log_debug!(self.logger, "decoded a bolt11 invoice");
            return Ok(ParsedInput::LightningInvoice(LightningInvoice::from(
                invoice,
            )));
        }

        if let Some(request) = bip21::parse_onchain(input) {
            log_debug!(self.logger, "decoded an on-chain request");
            return Ok(ParsedInput::OnchainRequest(request));
        }

        let lnurl = match LnUrl::from_str(input) {
            Ok(lnurl) => Some(lnurl.url),
            Err(_) => lightning_address_url(input),
        };

        match lnurl {
            Some(url) => {
                log_debug!(self.logger, "resolving LNURL at {}", lnurlclient::origin_of(&url));
                match lnurlclient::resolve(&self.lnurl_client, &self.logger, &url).await {
                    ParsedInput::LnUrlFailure(failure) => Err(DecodeFailure::Service(failure)),
                    parsed => Ok(parsed),
                }
            }
            None => Err(DecodeFailure::NotRecognized),
        }
    }
}
