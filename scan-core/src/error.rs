use lightning_invoice::ParseOrSemanticError;
use thiserror::Error;

#[derive(Error, Debug)]
/// An error returned by the scan API itself, as opposed to a rejected input.
///
/// Rejected inputs are never reported through this type, they end up as a
/// [`crate::state::ReadError`] inside the reader's state.
pub enum ScanError {
    /// A decision was sent while the reader was in a state that does not accept it.
    #[error("The reader is not in a state that accepts this action.")]
    InvalidState,
    /// Invalid Arguments were given
    #[error("Invalid Arguments were given")]
    InvalidArgumentsError,
    /// Failed to call on the given LNURL
    #[error("Failed to call on the given LNURL.")]
    LnUrlFailure,
    /// The given invoice is invalid.
    #[error("The given invoice is invalid.")]
    InvoiceInvalid,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PartialEq for ScanError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidState, Self::InvalidState) => true,
            (Self::InvalidArgumentsError, Self::InvalidArgumentsError) => true,
            (Self::LnUrlFailure, Self::LnUrlFailure) => true,
            (Self::InvoiceInvalid, Self::InvoiceInvalid) => true,
            (Self::Other(e), Self::Other(e2)) => e.to_string() == e2.to_string(),
            _ => false,
        }
    }
}

impl From<lnurl::Error> for ScanError {
    fn from(_e: lnurl::Error) -> Self {
        Self::LnUrlFailure
    }
}

impl From<reqwest::Error> for ScanError {
    fn from(_e: reqwest::Error) -> Self {
        Self::LnUrlFailure
    }
}

impl From<url::ParseError> for ScanError {
    fn from(_e: url::ParseError) -> Self {
        Self::LnUrlFailure
    }
}

impl From<ParseOrSemanticError> for ScanError {
    fn from(_e: ParseOrSemanticError) -> Self {
        Self::InvoiceInvalid
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_invalid_invoice_maps_to_invoice_invalid() {
        let err = lightning_invoice::Bolt11Invoice::from_str("lnbc1notaninvoice").unwrap_err();
        assert_eq!(ScanError::from(err), ScanError::InvoiceInvalid);
    }

    #[test]
    fn test_other_errors_compare_by_message() {
        let a = ScanError::Other(anyhow::anyhow!("boom"));
        let b = ScanError::Other(anyhow::anyhow!("boom"));
        let c = ScanError::Other(anyhow::anyhow!("bang"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(ScanError::InvalidState, ScanError::LnUrlFailure);
    }
}
