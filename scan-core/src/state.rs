use thiserror::Error;

use crate::input::{LightningInvoice, LnUrlFailure, LnUrlRequest, OnchainRequest};

/// Where the reader currently is. Exactly one value exists per reader.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReadState {
    /// Ready to accept input.
    #[default]
    Idle,
    /// Input was submitted and is being decoded, validated or resolved.
    Resolving,
    Error(ReadError),
    Done(ReadDone),
    /// A lightning invoice passed validation but the user has to accept a
    /// warning before it can be paid.
    PendingConfirmation {
        invoice: LightningInvoice,
        reason: PendingReason,
    },
}

impl ReadState {
    /// Whether scanning should be running while in this state.
    pub fn accepts_input(&self) -> bool {
        matches!(self, ReadState::Idle)
    }
}

/// Why an input was refused. Every kind is recoverable by going back to idle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("You cannot pay yourself.")]
    PayToSelf,
    #[error("This payment request is for another chain.")]
    InvalidChain,
    #[error("This payment request has expired.")]
    PaymentExpired,
    #[error("{0}")]
    LnUrlResponseError(LnUrlFailure),
    #[error("This LNURL is not supported.")]
    UnhandledLnUrl,
    #[error("Could not read this input.")]
    UnhandledInput,
}

/// A validated input ready to be handed to the payment flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadDone {
    Lightning(LightningInvoice),
    Onchain(OnchainRequest),
    /// An on-chain request that also offers a lightning invoice. The caller
    /// has to pick one with [`crate::reader::ReadInput::choose_payment_mode`].
    OnchainWithLightningOption(OnchainRequest),
    Url(LnUrlRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingReason {
    /// The invoice has no amount and the payee can't receive a trampoline
    /// payment, so the sender picks an amount the payee never agreed on.
    AmountlessLegacyInvoice,
}

/// The caller's pick for an on-chain request that offers lightning too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    Onchain,
    Lightning,
}
