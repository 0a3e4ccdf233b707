//! Single-transaction execution: preflight, estimate, submit, confirm.
//!
//! Every step runs at most once. A failed estimate falls back to the
//! configured gas limit; every other failure is returned to the caller as-is.

use std::sync::Arc;

use bytes::Bytes;
use chainflow_crypto::Signer;
use chainflow_ledger::abi::Token;
use chainflow_ledger::{abis, BlockId, CallRequest, DecodedEvent, Interface, LedgerClient, LogRecord, TxBuilder};
use chainflow_primitives::{format_units, Address, H256, NATIVE_DECIMALS, U256};
use tracing::{debug, info, warn};

use crate::actions::token_balance;
use crate::composite::StepRecord;
use crate::config::NetworkConfig;
use crate::error::ActionError;

/// Balance check performed before anything is submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preflight {
    /// No check
    None,
    /// Native balance must cover `required`
    Native {
        /// Amount in wei
        required: U256,
    },
    /// ERC-20 balance must cover `required`
    Token {
        /// Token contract
        token: Address,
        /// Amount in base units
        required: U256,
        /// Token decimals, for rendering
        decimals: u8,
        /// Token symbol, for rendering
        symbol: String,
    },
}

/// Approve `spender` first when its allowance is below `amount`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowanceCheck {
    /// Token contract
    pub token: Address,
    /// Contract that pulls the tokens
    pub spender: Address,
    /// Amount the main call spends
    pub amount: U256,
}

/// One state-changing call
#[derive(Debug, Clone)]
pub struct CallSpec {
    /// Step name used in logs and step records
    pub label: &'static str,
    /// Recipient or contract
    pub to: Address,
    /// Calldata, empty for native sends
    pub data: Bytes,
    /// Attached native value
    pub value: U256,
    /// Balance check
    pub preflight: Preflight,
    /// Allowance check
    pub allowance: Option<AllowanceCheck>,
}

impl CallSpec {
    /// Plain native-currency send
    pub fn native_transfer(to: Address, value: U256) -> Self {
        Self {
            label: "transfer",
            to,
            data: Bytes::new(),
            value,
            preflight: Preflight::Native { required: value },
            allowance: None,
        }
    }

    /// Contract call with no value attached
    pub fn contract_call(label: &'static str, to: Address, data: Bytes) -> Self {
        Self {
            label,
            to,
            data,
            value: U256::zero(),
            preflight: Preflight::None,
            allowance: None,
        }
    }

    /// Attach native value
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Set the balance check
    pub fn with_preflight(mut self, preflight: Preflight) -> Self {
        self.preflight = preflight;
        self
    }

    /// Set the allowance check
    pub fn with_allowance(mut self, allowance: AllowanceCheck) -> Self {
        self.allowance = Some(allowance);
        self
    }
}

/// How the gas limit of a transaction was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPlan {
    /// Node estimate plus 20%
    Estimated {
        /// Raw estimate
        estimate: u64,
        /// Buffered limit
        limit: u64,
    },
    /// Estimation failed; the configured fallback limit is used
    NetworkDefault {
        /// Limit signed into the transaction
        limit: u64,
    },
}

impl GasPlan {
    /// Limit signed into the transaction
    pub fn limit(&self) -> u64 {
        match self {
            GasPlan::Estimated { limit, .. } | GasPlan::NetworkDefault { limit } => *limit,
        }
    }
}

/// `ceil(estimate * 1.2)` in integer arithmetic
pub fn buffered_gas_limit(estimate: u64) -> u64 {
    let buffered = (estimate as u128 * 6 + 4) / 5;
    u64::try_from(buffered).unwrap_or(u64::MAX)
}

/// Outcome of a passed balance check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightResult {
    /// Asset symbol
    pub asset: String,
    /// Balance at check time
    pub balance: U256,
    /// Amount required
    pub required: U256,
    /// Whether the balance covered the requirement
    pub passed: bool,
}

/// Confirmed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    /// Transaction hash
    pub tx_hash: H256,
    /// Including block
    pub block_number: u64,
    /// Gas consumed
    pub gas_used: U256,
    /// Gas limit choice
    pub gas_plan: GasPlan,
    /// Receipt logs in emission order
    pub logs: Vec<LogRecord>,
}

/// Everything one pipeline run produced
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Approval sent ahead of the main call
    pub approval: Option<TransactionOutcome>,
    /// Balance check result
    pub preflight: Option<PreflightResult>,
    /// Main call
    pub outcome: TransactionOutcome,
}

/// Runs state-changing calls against the ledger
#[derive(Debug, Clone)]
pub struct TransactionPipeline {
    client: Arc<LedgerClient>,
    config: Arc<NetworkConfig>,
}

impl TransactionPipeline {
    /// Create a pipeline
    pub fn new(client: Arc<LedgerClient>, config: Arc<NetworkConfig>) -> Self {
        Self { client, config }
    }

    /// Execute `spec` on behalf of `signer`
    pub async fn execute(
        &self,
        signer: &Signer,
        spec: &CallSpec,
    ) -> Result<PipelineResult, ActionError> {
        let preflight = self.preflight(signer.address(), &spec.preflight).await?;

        let approval = match &spec.allowance {
            Some(check) => self.ensure_allowance(signer, check).await?,
            None => None,
        };

        let outcome = match self
            .submit(signer, spec.label, spec.to, &spec.data, spec.value)
            .await
        {
            Ok(outcome) => outcome,
            Err(source) => {
                return Err(match &approval {
                    Some(approved) => ActionError::CompositeIncomplete {
                        completed: vec![StepRecord::confirmed("approve", approved, None)],
                        failed_step: spec.label.to_string(),
                        source: Box::new(source),
                    },
                    None => source,
                })
            }
        };

        Ok(PipelineResult {
            approval,
            preflight,
            outcome,
        })
    }

    /// Read the balance of `owner` and fail with `InsufficientBalance` if it
    /// does not cover the requirement
    pub async fn preflight(
        &self,
        owner: Address,
        preflight: &Preflight,
    ) -> Result<Option<PreflightResult>, ActionError> {
        let (asset, balance, required, decimals) = match preflight {
            Preflight::None => return Ok(None),
            Preflight::Native { required } => {
                let balance = self.client.get_balance(&owner, BlockId::Latest).await?;
                (
                    self.config.native_symbol.clone(),
                    balance,
                    *required,
                    NATIVE_DECIMALS,
                )
            }
            Preflight::Token {
                token,
                required,
                decimals,
                symbol,
            } => {
                let balance = token_balance(&self.client, *token, owner).await?;
                (symbol.clone(), balance, *required, *decimals)
            }
        };

        if balance < required {
            return Err(ActionError::InsufficientBalance {
                asset,
                balance: format_units(balance, decimals),
                required: format_units(required, decimals),
                shortfall: format_units(required - balance, decimals),
            });
        }

        debug!(%asset, %balance, %required, "preflight passed");
        Ok(Some(PreflightResult {
            asset,
            balance,
            required,
            passed: true,
        }))
    }

    async fn ensure_allowance(
        &self,
        signer: &Signer,
        check: &AllowanceCheck,
    ) -> Result<Option<TransactionOutcome>, ActionError> {
        let output = self
            .client
            .read(
                check.token,
                abis::erc20(),
                "allowance",
                &[Token::Address(signer.address()), Token::Address(check.spender)],
            )
            .await?;
        let allowance = output.first().and_then(Token::as_uint).unwrap_or_default();
        if allowance >= check.amount {
            debug!(%allowance, "allowance sufficient");
            return Ok(None);
        }

        info!(token = %check.token, spender = %check.spender, "approving spender");
        let data = abis::erc20().encode_call(
            "approve",
            &[Token::Address(check.spender), Token::Uint(check.amount)],
        )?;
        let outcome = self
            .submit(signer, "approve", check.token, &data, U256::zero())
            .await?;
        Ok(Some(outcome))
    }

    /// Estimate gas for the call; fall back to the configured limit on failure
    pub async fn plan_gas(&self, request: &CallRequest) -> GasPlan {
        match self.client.estimate_gas(request).await {
            Ok(estimate) => GasPlan::Estimated {
                estimate,
                limit: buffered_gas_limit(estimate),
            },
            Err(e) => {
                warn!(error = %e, "gas estimation failed, using fallback limit");
                GasPlan::NetworkDefault {
                    limit: self.config.fallback_gas_limit,
                }
            }
        }
    }

    async fn submit(
        &self,
        signer: &Signer,
        label: &'static str,
        to: Address,
        data: &Bytes,
        value: U256,
    ) -> Result<TransactionOutcome, ActionError> {
        let from = signer.address();
        let request = CallRequest {
            from: Some(from),
            to: Some(to),
            value: Some(value),
            data: Some(data.clone()),
            ..Default::default()
        };
        let gas_plan = self.plan_gas(&request).await;

        let nonce = self.client.get_nonce(&from, BlockId::Pending).await?;
        let gas_price = self.client.gas_price().await?;
        let chain_id = self.client.chain_id().await?;

        let tx = TxBuilder::new(chain_id)
            .nonce(nonce)
            .gas_limit(gas_plan.limit())
            .gas_price(gas_price)
            .to(to)
            .value(value)
            .data(data.clone())
            .sign(signer)?;

        let tx_hash = self
            .client
            .send_raw_transaction(&tx.raw)
            .await
            .map_err(ActionError::submission)?;
        info!(step = label, %tx_hash, gas_limit = gas_plan.limit(), nonce, "transaction submitted");

        let receipt = self
            .client
            .wait_for_receipt(&tx_hash, self.config.receipt_poll_interval())
            .await
            .map_err(|e| ActionError::confirmation(&tx_hash, e))?;
        if !receipt.succeeded() {
            warn!(step = label, %tx_hash, "transaction reverted");
            return Err(ActionError::Reverted {
                tx_hash: tx_hash.to_hex(),
            });
        }
        info!(
            step = label,
            %tx_hash,
            block = receipt.block_number,
            gas_used = %receipt.gas_used,
            "transaction confirmed"
        );

        Ok(TransactionOutcome {
            tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            gas_plan,
            logs: receipt.logs,
        })
    }
}

/// First log in `outcome` that decodes as `event`
pub fn extract_event(
    interface: &Interface,
    outcome: &TransactionOutcome,
    event: &str,
) -> Result<DecodedEvent, ActionError> {
    interface
        .find_event(&outcome.logs, event)
        .ok_or_else(|| ActionError::ExpectedEventNotFound {
            event: event.to_string(),
            tx_hash: outcome.tx_hash.to_hex(),
        })
}
