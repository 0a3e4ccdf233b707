//! Legacy (EIP-155) transaction builder

use bytes::Bytes;
use chainflow_crypto::{keccak256, Signer};
use chainflow_primitives::{Address, H256, U256};
use rlp::RlpStream;

use crate::LedgerError;

/// Signed, RLP-encoded transaction ready for `eth_sendRawTransaction`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    /// Raw RLP bytes
    pub raw: Bytes,
    /// keccak256 of `raw`
    pub hash: H256,
    /// Sender
    pub from: Address,
    /// Nonce used
    pub nonce: u64,
    /// Gas limit used
    pub gas_limit: u64,
}

/// Transaction builder with fluent API
#[derive(Debug, Clone, Default)]
pub struct TxBuilder {
    chain_id: u64,
    nonce: Option<u64>,
    gas_limit: Option<u64>,
    gas_price: Option<U256>,
    to: Option<Address>,
    value: U256,
    data: Bytes,
}

impl TxBuilder {
    /// Create a new transaction builder
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Default::default()
        }
    }

    /// Set the nonce
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Set the gas limit
    pub fn gas_limit(mut self, limit: u64) -> Self {
        self.gas_limit = Some(limit);
        self
    }

    /// Set the gas price
    pub fn gas_price(mut self, price: U256) -> Self {
        self.gas_price = Some(price);
        self
    }

    /// Set the recipient address
    pub fn to(mut self, address: Address) -> Self {
        self.to = Some(address);
        self
    }

    /// Set the value to transfer (in wei)
    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Set the input data
    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    fn require(&self) -> Result<(u64, u64, U256), LedgerError> {
        let nonce = self
            .nonce
            .ok_or_else(|| LedgerError::MissingField("nonce".to_string()))?;
        let gas_limit = self
            .gas_limit
            .ok_or_else(|| LedgerError::MissingField("gas_limit".to_string()))?;
        let gas_price = self
            .gas_price
            .ok_or_else(|| LedgerError::MissingField("gas_price".to_string()))?;
        if self.chain_id == 0 {
            return Err(LedgerError::InvalidChainId(
                "chain ID 0 gives no replay protection".to_string(),
            ));
        }
        Ok((nonce, gas_limit, gas_price))
    }

    /// `[nonce, gasPrice, gas, to, value, data]` followed by `tail`
    fn encode(&self, tail: impl FnOnce(&mut RlpStream)) -> Result<Vec<u8>, LedgerError> {
        let (nonce, gas_limit, gas_price) = self.require()?;

        let mut stream = RlpStream::new_list(9);
        stream.append(&nonce);
        stream.append(&gas_price);
        stream.append(&gas_limit);
        match &self.to {
            Some(to) => stream.append(&to.as_bytes().to_vec()),
            None => stream.append_empty_data(),
        };
        stream.append(&self.value);
        stream.append(&self.data.to_vec());
        tail(&mut stream);
        Ok(stream.out().to_vec())
    }

    /// EIP-155 signing payload: the six fields plus `[chainId, 0, 0]`
    pub fn signing_payload(&self) -> Result<Vec<u8>, LedgerError> {
        let chain_id = self.chain_id;
        self.encode(|s| {
            s.append(&chain_id);
            s.append(&0u8);
            s.append(&0u8);
        })
    }

    /// Hash the signer signs
    pub fn signing_hash(&self) -> Result<H256, LedgerError> {
        Ok(keccak256(&self.signing_payload()?))
    }

    /// Sign and encode the transaction
    ///
    /// # Errors
    ///
    /// Returns an error if nonce, gas limit or gas price are missing, or the
    /// chain ID is 0.
    pub fn sign(&self, signer: &Signer) -> Result<SignedTx, LedgerError> {
        let (nonce, gas_limit, _) = self.require()?;
        let signature = signer.sign_hash(&self.signing_hash()?)?;

        let v = signature.recovery_id as u64 + self.chain_id * 2 + 35;
        let r = U256::from_big_endian(&signature.r);
        let s = U256::from_big_endian(&signature.s);

        let raw = self.encode(|stream| {
            stream.append(&v);
            stream.append(&r);
            stream.append(&s);
        })?;

        Ok(SignedTx {
            hash: keccak256(&raw),
            raw: Bytes::from(raw),
            from: signer.address(),
            nonce,
            gas_limit,
        })
    }
}
