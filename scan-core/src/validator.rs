//! Checks a decoded input against the wallet before it can reach a payment
//! screen.
//!
//! Lightning invoices go through [`INVOICE_RULES`] in order and the first rule
//! that has an opinion wins. The order matters: paying yourself is reported
//! even when the invoice is also expired, and an expired invoice is reported
//! even when it is also for another chain.

use core::time::Duration;

use crate::context::WalletContext;
use crate::input::{LightningInvoice, LnUrlVariant, OnchainRequest, ParsedInput};
use crate::state::{PaymentMode, PendingReason, ReadDone, ReadError};
use crate::utils;

/// The result of validating one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accept(ReadDone),
    AcceptPending(LightningInvoice, PendingReason),
    Reject(ReadError),
}

pub type InvoiceRule = fn(&LightningInvoice, &WalletContext, Duration) -> Option<Outcome>;

/// Invoice checks, in the order they are applied.
pub const INVOICE_RULES: [(&str, InvoiceRule); 4] = [
    ("pay_to_self", pay_to_self),
    ("expired", expired),
    ("unsupported_chain", unsupported_chain),
    ("amountless_legacy", amountless_legacy),
];

fn pay_to_self(invoice: &LightningInvoice, ctx: &WalletContext, _: Duration) -> Option<Outcome> {
    (&invoice.payee_pubkey == ctx.node_id()).then_some(Outcome::Reject(ReadError::PayToSelf))
}

fn expired(invoice: &LightningInvoice, _: &WalletContext, now: Duration) -> Option<Outcome> {
    (now.as_secs() >= invoice.expire).then_some(Outcome::Reject(ReadError::PaymentExpired))
}

fn unsupported_chain(
    invoice: &LightningInvoice,
    ctx: &WalletContext,
    _: Duration,
) -> Option<Outcome> {
    (!ctx.supports_chain(&invoice.currency)).then_some(Outcome::Reject(ReadError::InvalidChain))
}

fn amountless_legacy(
    invoice: &LightningInvoice,
    _: &WalletContext,
    _: Duration,
) -> Option<Outcome> {
    if invoice.amount_msats.is_none() && !invoice.supports_trampoline {
        Some(Outcome::AcceptPending(
            invoice.clone(),
            PendingReason::AmountlessLegacyInvoice,
        ))
    } else {
        None
    }
}

/// Validates against the current time.
pub fn validate(parsed: &ParsedInput, ctx: &WalletContext) -> Outcome {
    validate_at(parsed, ctx, utils::now())
}

/// Validates as if the current time were `now`, a duration since the unix epoch.
pub fn validate_at(parsed: &ParsedInput, ctx: &WalletContext, now: Duration) -> Outcome {
    match parsed {
        ParsedInput::LightningInvoice(invoice) => validate_invoice(invoice, ctx, now),
        ParsedInput::OnchainRequest(request) => validate_onchain(request),
        ParsedInput::LnUrlRequest(request) => match request.variant {
            LnUrlVariant::Withdraw(_) | LnUrlVariant::Pay(_) | LnUrlVariant::Auth => {
                Outcome::Accept(ReadDone::Url(request.clone()))
            }
            LnUrlVariant::Unsupported(_) => Outcome::Reject(ReadError::UnhandledLnUrl),
        },
        ParsedInput::LnUrlFailure(failure) => {
            Outcome::Reject(ReadError::LnUrlResponseError(failure.clone()))
        }
        ParsedInput::Unrecognized => Outcome::Reject(ReadError::UnhandledInput),
    }
}

pub fn validate_invoice(invoice: &LightningInvoice, ctx: &WalletContext, now: Duration) -> Outcome {
    INVOICE_RULES
        .iter()
        .find_map(|(_, rule)| rule(invoice, ctx, now))
        .unwrap_or_else(|| Outcome::Accept(ReadDone::Lightning(invoice.clone())))
}

/// The bare address is not checked against the wallet's chain, only an
/// embedded invoice is, and only once the user picks lightning.
fn validate_onchain(request: &OnchainRequest) -> Outcome {
    match request.lightning {
        Some(_) => Outcome::Accept(ReadDone::OnchainWithLightningOption(request.clone())),
        None => Outcome::Accept(ReadDone::Onchain(request.clone())),
    }
}

/// Resolves the user's pick for an on-chain request that offers lightning too.
pub fn resolve_payment_mode(
    request: &OnchainRequest,
    mode: PaymentMode,
    ctx: &WalletContext,
    now: Duration,
) -> Outcome {
    match (mode, &request.lightning) {
        (PaymentMode::Lightning, Some(invoice)) => validate_invoice(invoice, ctx, now),
        // without an invoice there is nothing else to pay
        (PaymentMode::Lightning, None) | (PaymentMode::Onchain, _) => {
            Outcome::Accept(ReadDone::Onchain(request.clone()))
        }
    }
}
