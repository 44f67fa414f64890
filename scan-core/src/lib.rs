#![crate_name = "scan_core"]

//! Reads whatever a lightning wallet user scanned or pasted, works out what
//! it is and whether the wallet can pay it.
//!
//! Build a [`ReadInput`] with a [`WalletContext`] and a [`DecoderGateway`]
//! (usually a [`WalletDecoder`]), feed it text with [`ReadInput::submit`] and
//! watch [`ReadInput::state`] or [`ReadInput::subscribe`].

mod bip21;
pub mod context;
pub mod error;
pub mod gateway;
pub mod input;
pub mod lnurlclient;
pub mod logging;
pub mod reader;
pub mod state;
pub mod utils;
pub mod validator;

#[cfg(test)]
mod test_utils;

pub use crate::context::{WalletContext, WalletContextBuilder};
pub use crate::error::ScanError;
pub use crate::gateway::{DecodeFailure, DecoderGateway, WalletDecoder};
pub use crate::input::{
    LightningInvoice, LnUrlFailure, LnUrlFailureKind, LnUrlParams, LnUrlRequest, LnUrlVariant,
    OnchainRequest, ParsedInput,
};
pub use crate::lnurlclient::{HttpLnUrlClient, LnUrlClient, LnUrlReply};
pub use crate::logging::ScanLogger;
pub use crate::reader::{ReadInput, ReadInputBuilder, ScanGate};
pub use crate::state::{PaymentMode, PendingReason, ReadDone, ReadError, ReadState};
pub use crate::validator::{validate, validate_at, Outcome};

pub use bitcoin;
pub use lightning_invoice;
