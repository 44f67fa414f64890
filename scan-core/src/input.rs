use std::fmt;

use bitcoin::secp256k1::PublicKey;
use lightning_invoice::{Bolt11Invoice, Currency};

/// Feature bits that have advertised trampoline payments over time: the early
/// eclair assignment, the bolts proposal and the current eclair prototype.
/// Each pair is (even, odd) and either bit counts.
const TRAMPOLINE_FEATURE_BITS: [usize; 3] = [50, 56, 148];

/// The typed result of decoding a raw string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInput {
    LightningInvoice(LightningInvoice),
    OnchainRequest(OnchainRequest),
    LnUrlRequest(LnUrlRequest),
    LnUrlFailure(LnUrlFailure),
    Unrecognized,
}

/// The parts of a bolt11 invoice the send flow has to check before paying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightningInvoice {
    pub payee_pubkey: PublicKey,
    pub amount_msats: Option<u64>,
    /// Seconds since the unix epoch after which the invoice can't be paid.
    pub expire: u64,
    pub supports_trampoline: bool,
    pub currency: Currency,
    /// The invoice as it was read, handed to the payment screen untouched.
    pub bolt11: String,
}

impl From<&Bolt11Invoice> for LightningInvoice {
    fn from(value: &Bolt11Invoice) -> Self {
        let timestamp = value.duration_since_epoch().as_secs();
        let expire = timestamp.saturating_add(value.expiry_time().as_secs());

        let payee_pubkey = value
            .payee_pub_key()
            .copied()
            .unwrap_or_else(|| value.recover_payee_pub_key());

        let supports_trampoline = value
            .features()
            .map(|f| has_trampoline_bit(f.le_flags()))
            .unwrap_or(false);

        LightningInvoice {
            payee_pubkey,
            amount_msats: value.amount_milli_satoshis(),
            expire,
            supports_trampoline,
            currency: value.currency(),
            bolt11: value.to_string(),
        }
    }
}

impl From<Bolt11Invoice> for LightningInvoice {
    fn from(value: Bolt11Invoice) -> Self {
        LightningInvoice::from(&value)
    }
}

fn has_trampoline_bit(le_flags: &[u8]) -> bool {
    let is_set = |bit: usize| {
        le_flags
            .get(bit / 8)
            .map(|byte| byte & (1 << (bit % 8)) != 0)
            .unwrap_or(false)
    };
    TRAMPOLINE_FEATURE_BITS
        .iter()
        .any(|&even| is_set(even) || is_set(even + 1))
}

/// An on-chain payment request, either a bare address or a BIP21 uri.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnchainRequest {
    pub address: String,
    pub amount_sats: Option<u64>,
    pub label: Option<String>,
    pub message: Option<String>,
    /// A bolt11 invoice offered alongside the address with `lightning=`.
    pub lightning: Option<LightningInvoice>,
    /// The text as it was read, handed to the payment screen untouched.
    pub raw: String,
}

/// A LNURL whose service answered with something we know how to continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LnUrlRequest {
    pub url: String,
    /// Host of the service, shown to the user.
    pub origin: String,
    pub variant: LnUrlVariant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LnUrlVariant {
    Withdraw(LnUrlParams),
    Pay(LnUrlParams),
    Auth,
    Unsupported(String),
}

impl LnUrlVariant {
    pub fn tag(&self) -> &str {
        match self {
            LnUrlVariant::Withdraw(_) => "withdrawRequest",
            LnUrlVariant::Pay(_) => "payRequest",
            LnUrlVariant::Auth => "login",
            LnUrlVariant::Unsupported(tag) => tag,
        }
    }
}

/// What the pay or withdraw screen needs to continue the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LnUrlParams {
    pub callback: String,
    /// Millisatoshis
    pub min: u64,
    /// Millisatoshis
    pub max: u64,
    /// Withdraw requests carry the secret the callback expects back.
    pub k1: Option<String>,
}

/// A LNURL service that was reached but failed to give a usable answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LnUrlFailure {
    pub origin: String,
    pub kind: LnUrlFailureKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LnUrlFailureKind {
    /// The service answered with this HTTP status code.
    Code(u16),
    /// The service answered `{"status":"ERROR"}` with this reason.
    Detailed(String),
    Unreadable,
    Generic,
}

impl fmt::Display for LnUrlFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LnUrlFailureKind::Code(code) => {
                write!(f, "{} returned error code {}", self.origin, code)
            }
            LnUrlFailureKind::Detailed(reason) => write!(f, "{} failed: {}", self.origin, reason),
            LnUrlFailureKind::Unreadable => {
                write!(f, "{} returned an unreadable response", self.origin)
            }
            LnUrlFailureKind::Generic => {
                write!(f, "{} could not process the request", self.origin)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::*;
    use std::str::FromStr;

    #[test]
    fn test_invoice_from_bolt11() {
        let bolt11 = create_dummy_invoice(Some(21_000), 1_700_000_000, 3_600);

        let invoice = LightningInvoice::from(&bolt11);
        assert_eq!(invoice.payee_pubkey, payee_node_id());
        assert_eq!(invoice.amount_msats, Some(21_000));
        assert_eq!(invoice.expire, 1_700_003_600);
        assert_eq!(invoice.currency, Currency::Regtest);
        assert!(!invoice.supports_trampoline);

        let reparsed = Bolt11Invoice::from_str(&invoice.bolt11).unwrap();
        assert_eq!(reparsed, bolt11);
    }

    #[test]
    fn test_amountless_invoice_from_bolt11() {
        let bolt11 = create_dummy_invoice(None, 1_700_000_000, 60);
        let invoice = LightningInvoice::from(bolt11);
        assert_eq!(invoice.amount_msats, None);
        assert_eq!(invoice.expire, 1_700_000_060);
    }

    #[test]
    fn test_trampoline_bits() {
        assert!(!has_trampoline_bit(&[]));
        assert!(!has_trampoline_bit(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff]));

        // bit 51 is byte 6, bit 3
        let mut flags = vec![0u8; 7];
        flags[6] = 1 << 3;
        assert!(has_trampoline_bit(&flags));

        // bit 56 is byte 7, bit 0
        let mut flags = vec![0u8; 8];
        flags[7] = 1;
        assert!(has_trampoline_bit(&flags));

        // bit 149 is byte 18, bit 5
        let mut flags = vec![0u8; 19];
        flags[18] = 1 << 5;
        assert!(has_trampoline_bit(&flags));

        // bit 52 is not one of them
        let mut flags = vec![0u8; 7];
        flags[6] = 1 << 4;
        assert!(!has_trampoline_bit(&flags));
    }

    #[test]
    fn test_lnurl_failure_display() {
        let failure = |kind| LnUrlFailure {
            origin: "service.com".to_string(),
            kind,
        };

        assert_eq!(
            failure(LnUrlFailureKind::Code(503)).to_string(),
            "service.com returned error code 503"
        );
        assert_eq!(
            failure(LnUrlFailureKind::Detailed("no funds".to_string())).to_string(),
            "service.com failed: no funds"
        );
        assert_eq!(
            failure(LnUrlFailureKind::Unreadable).to_string(),
            "service.com returned an unreadable response"
        );
        assert_eq!(
            failure(LnUrlFailureKind::Generic).to_string(),
            "service.com could not process the request"
        );
    }

    #[test]
    fn test_lnurl_variant_tags() {
        assert_eq!(LnUrlVariant::Auth.tag(), "login");
        assert_eq!(
            LnUrlVariant::Unsupported("channelRequest".to_string()).tag(),
            "channelRequest"
        );
    }
}
