use std::str::FromStr;

use bitcoin::{Address, Amount, Denomination};
use lightning_invoice::Bolt11Invoice;

use crate::input::{LightningInvoice, OnchainRequest};
use crate::utils;

fn is_address(s: &str) -> bool {
    Address::from_str(s).is_ok()
}

/// Reads a bare address or a `bitcoin:` uri.
///
/// Returns `None` when the input is neither, or when the uri carries a
/// `req-` parameter we don't understand.
pub(crate) fn parse_onchain(input: &str) -> Option<OnchainRequest> {
    let Some(rest) = utils::strip_scheme(input, "bitcoin") else {
        return is_address(input).then(|| OnchainRequest {
            address: input.to_string(),
            amount_sats: None,
            label: None,
            message: None,
            lightning: None,
            raw: input.to_string(),
        });
    };

    let (address, query) = match rest.split_once('?') {
        Some((address, query)) => (address, Some(query)),
        None => (rest, None),
    };
    // some wallets write bitcoin://
    let address = address.trim_start_matches("//");
    if !is_address(address) {
        return None;
    }

    let mut request = OnchainRequest {
        address: address.to_string(),
        amount_sats: None,
        label: None,
        message: None,
        lightning: None,
        raw: input.to_string(),
    };

    for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        match key.to_lowercase().as_str() {
            "amount" => {
                request.amount_sats = Amount::from_str_in(&value, Denomination::Bitcoin)
                    .ok()
                    .map(|a| a.to_sat())
            }
            "label" => request.label = Some(value.into_owned()),
            "message" => request.message = Some(value.into_owned()),
            "lightning" => {
                request.lightning = Bolt11Invoice::from_str(&value.to_lowercase())
                    .ok()
                    .map(LightningInvoice::from)
            }
            k if k.starts_with("req-") => return None,
            _ => {}
        }
    }

    Some(request)
}
