use bitcoin::secp256k1::PublicKey;
use bitcoin::Network;
use lightning_invoice::Currency;

use crate::error::ScanError;

/// Facts about the wallet that stay fixed for a scanning session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletContext {
    node_id: PublicKey,
    network: Network,
    supported_chains: Vec<Currency>,
}

impl WalletContext {
    pub fn node_id(&self) -> &PublicKey {
        &self.node_id
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn supported_chains(&self) -> &[Currency] {
        &self.supported_chains
    }

    pub fn supports_chain(&self, currency: &Currency) -> bool {
        self.supported_chains.contains(currency)
    }
}

pub struct WalletContextBuilder {
    node_id: PublicKey,
    network: Option<Network>,
    extra_chains: Vec<Currency>,
}

impl WalletContextBuilder {
    pub fn new(node_id: PublicKey) -> WalletContextBuilder {
        WalletContextBuilder {
            node_id,
            network: None,
            extra_chains: vec![],
        }
    }

    /// Required
    pub fn with_network(mut self, network: Network) -> WalletContextBuilder {
        self.network = Some(network);
        self
    }

    /// Accept invoices for another chain on top of the wallet's own network.
    pub fn with_supported_chain(mut self, currency: Currency) -> WalletContextBuilder {
        self.extra_chains.push(currency);
        self
    }

    pub fn build(self) -> Result<WalletContext, ScanError> {
        let network = self.network.ok_or(ScanError::InvalidArgumentsError)?;

        let mut supported_chains = vec![Currency::from(network)];
        for currency in self.extra_chains {
            if !supported_chains.contains(&currency) {
                supported_chains.push(currency);
            }
        }

        Ok(WalletContext {
            node_id: self.node_id,
            network,
            supported_chains,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_network_is_required() {
        let res = WalletContextBuilder::new(wallet_node_id()).build();
        assert_eq!(res.unwrap_err(), ScanError::InvalidArgumentsError);
    }

    #[test]
    fn test_network_chain_is_supported() {
        let ctx = WalletContextBuilder::new(wallet_node_id())
            .with_network(Network::Testnet)
            .build()
            .unwrap();

        assert_eq!(ctx.network(), Network::Testnet);
        assert_eq!(ctx.supported_chains(), &[Currency::BitcoinTestnet]);
        assert!(ctx.supports_chain(&Currency::BitcoinTestnet));
        assert!(!ctx.supports_chain(&Currency::Bitcoin));
    }

    #[test]
    fn test_extra_chains_are_deduplicated() {
        let ctx = WalletContextBuilder::new(wallet_node_id())
            .with_network(Network::Regtest)
            .with_supported_chain(Currency::Signet)
            .with_supported_chain(Currency::Regtest)
            .with_supported_chain(Currency::Signet)
            .build()
            .unwrap();

        assert_eq!(ctx.supported_chains(), &[Currency::Regtest, Currency::Signet]);
        assert_eq!(ctx.node_id(), &wallet_node_id());
    }
}
