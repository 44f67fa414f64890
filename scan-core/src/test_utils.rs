use std::sync::Mutex;
use std::time::Duration;

use bitcoin::hashes::{sha256, Hash};
use bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey};
use bitcoin::Network;
use lightning::ln::types::PaymentSecret;
use lightning_invoice::{Bolt11Invoice, Currency, InvoiceBuilder};

use crate::context::{WalletContext, WalletContextBuilder};
use crate::input::{LightningInvoice, OnchainRequest};
use crate::reader::ScanGate;

pub const MAINNET_ADDRESS: &str = "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq";

fn wallet_secret() -> SecretKey {
    SecretKey::from_slice(&[0x01; 32]).unwrap()
}

fn payee_secret() -> SecretKey {
    SecretKey::from_slice(&[0x02; 32]).unwrap()
}

pub fn wallet_node_id() -> PublicKey {
    PublicKey::from_secret_key(&Secp256k1::new(), &wallet_secret())
}

pub fn payee_node_id() -> PublicKey {
    PublicKey::from_secret_key(&Secp256k1::new(), &payee_secret())
}

pub fn regtest_context() -> WalletContext {
    WalletContextBuilder::new(wallet_node_id())
        .with_network(Network::Regtest)
        .build()
        .unwrap()
}

/// A signed regtest invoice from [`payee_node_id`].
pub fn create_dummy_invoice(
    amount_msats: Option<u64>,
    timestamp: u64,
    expiry_secs: u64,
) -> Bolt11Invoice {
    create_signed_invoice(Currency::Regtest, &payee_secret(), amount_msats, timestamp, expiry_secs)
}

/// A signed regtest invoice paying the wallet itself.
pub fn create_self_invoice(amount_msats: Option<u64>, timestamp: u64) -> Bolt11Invoice {
    create_signed_invoice(Currency::Regtest, &wallet_secret(), amount_msats, timestamp, 3_600)
}

pub fn create_signed_invoice(
    currency: Currency,
    secret: &SecretKey,
    amount_msats: Option<u64>,
    timestamp: u64,
    expiry_secs: u64,
) -> Bolt11Invoice {
    let secp = Secp256k1::new();
    let mut builder = InvoiceBuilder::new(currency)
        .description("scan test".to_string())
        .payment_hash(sha256::Hash::hash(&[0; 32]))
        .payment_secret(PaymentSecret([42; 32]))
        .duration_since_epoch(Duration::from_secs(timestamp))
        .expiry_time(Duration::from_secs(expiry_secs))
        .min_final_cltv_expiry_delta(144);
    if let Some(amt) = amount_msats {
        builder = builder.amount_milli_satoshis(amt);
    }

    builder
        .build_signed(|hash| secp.sign_ecdsa_recoverable(hash, secret))
        .unwrap()
}

pub fn dummy_lightning_invoice(amount_msats: Option<u64>, expire: u64) -> LightningInvoice {
    LightningInvoice {
        payee_pubkey: payee_node_id(),
        amount_msats,
        expire,
        supports_trampoline: false,
        currency: Currency::Regtest,
        bolt11: "lnbcrt1dummy".to_string(),
    }
}

pub fn dummy_onchain_request(lightning: Option<LightningInvoice>) -> OnchainRequest {
    OnchainRequest {
        address: MAINNET_ADDRESS.to_string(),
        amount_sats: None,
        label: None,
        message: None,
        lightning,
        raw: format!("bitcoin:{MAINNET_ADDRESS}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateCall {
    Pause,
    Resume,
}

/// Records every call the reader makes on the scanner.
#[derive(Default)]
pub struct RecordingScanGate {
    calls: Mutex<Vec<GateCall>>,
}

impl RecordingScanGate {
    pub fn calls(&self) -> Vec<GateCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ScanGate for RecordingScanGate {
    fn pause(&self) {
        self.calls.lock().unwrap().push(GateCall::Pause);
    }

    fn resume(&self) {
        self.calls.lock().unwrap().push(GateCall::Resume);
    }
}
