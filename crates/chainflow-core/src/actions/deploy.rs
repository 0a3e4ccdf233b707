use async_trait::async_trait;
use chainflow_crypto::Signer;
use chainflow_ledger::abi::Token;
use chainflow_ledger::abis;
use chainflow_primitives::{format_units, Address, U256, NATIVE_DECIMALS};
use serde_json::{json, Value};
use tracing::warn;

use super::require_positive;
use crate::context::ActionContext;
use crate::error::ActionError;
use crate::params::ActionParams;
use crate::pipeline::{extract_event, CallSpec, Preflight, TransactionOutcome};
use crate::registry::ActionHandler;
use crate::result::ActionOutput;

/// Deploy an ERC-20 through the token factory
pub struct DeployErc20;

/// Deploy an ERC-721 collection through the NFT factory
pub struct DeployErc721;

/// Deploy a DAO through the DAO factory
pub struct CreateDao;

/// Deployments only need some native balance to pay for gas
fn gas_preflight() -> Preflight {
    Preflight::Native {
        required: U256::one(),
    }
}

#[async_trait]
impl ActionHandler for DeployErc20 {
    fn required_fields(&self) -> &'static [&'static str] {
        &["privateKey", "name", "symbol", "initialSupply"]
    }

    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &ActionParams,
    ) -> Result<ActionOutput, ActionError> {
        let name = params.required_text("name")?;
        let symbol = params.required_text("symbol")?;
        let initial_supply = params.uint("initialSupply")?;
        require_positive(initial_supply, "initialSupply")?;
        let signer = params.signer()?;

        let factory = ctx.config().token_factory;
        let data = abis::token_factory().encode_call(
            "createToken",
            &[
                Token::String(name.clone()),
                Token::String(symbol.clone()),
                Token::Uint(initial_supply),
            ],
        )?;
        let spec = CallSpec::contract_call("deploy_token", factory, data)
            .with_preflight(gas_preflight());
        let outcome = ctx.pipeline().execute(&signer, &spec).await?.outcome;

        let event = extract_event(abis::token_factory(), &outcome, "TokenCreated")?;
        let token = event
            .address_arg("tokenAddress")
            .ok_or_else(|| ActionError::ExpectedEventNotFound {
                event: "TokenCreated".to_string(),
                tx_hash: outcome.tx_hash.to_hex(),
            })?;

        let token_info = match token_info(ctx, factory, token).await {
            Ok(info) => info,
            Err(e) => {
                warn!(%token, error = %e, "getTokenInfo failed, using request values");
                json!({
                    "name": name,
                    "symbol": symbol,
                    "initialSupply": initial_supply.to_string(),
                })
            }
        };

        Ok(ActionOutput::new()
            .field("message", "Token created successfully via TokenFactory")
            .field("contractAddress", token.to_checksum())
            .field("tokenInfo", token_info)
            .field("creator", signer.address().to_checksum())
            .field("factoryAddress", factory.to_checksum())
            .transaction(&outcome))
    }
}

/// Read `getTokenInfo` from the factory
async fn token_info(
    ctx: &ActionContext,
    factory: Address,
    token: Address,
) -> Result<Value, ActionError> {
    let output = ctx
        .client()
        .read(factory, abis::token_factory(), "getTokenInfo", &[Token::Address(token)])
        .await?;

    let malformed = || ActionError::Network {
        reason: "getTokenInfo returned unexpected values".to_string(),
        code: None,
    };
    let [creator, name, symbol, initial_supply, deployed_at, current_supply, owner] =
        output.as_slice()
    else {
        return Err(malformed());
    };

    let deployed_at = deployed_at.as_uint().ok_or_else(malformed)?;
    let deployed_at = i64::try_from(deployed_at.low_u64())
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|time| time.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
        .ok_or_else(malformed)?;

    Ok(json!({
        "name": name.as_str().ok_or_else(malformed)?,
        "symbol": symbol.as_str().ok_or_else(malformed)?,
        "initialSupply": initial_supply.as_uint().ok_or_else(malformed)?.to_string(),
        "currentSupply": format_units(current_supply.as_uint().ok_or_else(malformed)?, NATIVE_DECIMALS),
        "creator": creator.as_address().ok_or_else(malformed)?.to_checksum(),
        "owner": owner.as_address().ok_or_else(malformed)?.to_checksum(),
        "deployedAt": deployed_at,
    }))
}

#[async_trait]
impl ActionHandler for DeployErc721 {
    fn required_fields(&self) -> &'static [&'static str] {
        &["privateKey", "name", "symbol", "baseURI"]
    }

    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &ActionParams,
    ) -> Result<ActionOutput, ActionError> {
        let name = params.required_text("name")?;
        let symbol = params.required_text("symbol")?;
        let base_uri = params.required_text("baseURI")?;
        let factory = ctx.config().nft_factory()?;
        let signer = params.signer()?;

        let deployed = ctx
            .coordinator()
            .deploy_collection(&signer, &name, &symbol, &base_uri)
            .await?;

        Ok(ActionOutput::new()
            .field("message", "NFT collection created successfully via NFTFactory")
            .field("contractAddress", deployed.address.to_checksum())
            .field(
                "collectionInfo",
                json!({ "name": name, "symbol": symbol, "baseURI": base_uri }),
            )
            .field("creator", signer.address().to_checksum())
            .field("factoryAddress", factory.to_checksum())
            .transaction(&deployed.outcome))
    }
}

#[async_trait]
impl ActionHandler for CreateDao {
    fn required_fields(&self) -> &'static [&'static str] {
        &["privateKey", "name", "votingPeriod", "quorumPercentage"]
    }

    async fn execute(
        &self,
        ctx: &ActionContext,
        params: &ActionParams,
    ) -> Result<ActionOutput, ActionError> {
        let name = params.required_text("name")?;
        let voting_period = params.u64("votingPeriod")?;
        let quorum = params.u64("quorumPercentage")?;
        if voting_period == 0 {
            return Err(ActionError::InvalidInput(
                "votingPeriod must be greater than zero".to_string(),
            ));
        }
        if !(1..=100).contains(&quorum) {
            return Err(ActionError::InvalidInput(
                "quorumPercentage must be between 1 and 100".to_string(),
            ));
        }
        let factory = ctx.config().dao_factory()?;
        let signer = params.signer()?;

        let (dao, outcome) = create_dao(ctx, &signer, factory, &name, voting_period, quorum).await?;

        Ok(ActionOutput::new()
            .field("message", "DAO created successfully via DAOFactory")
            .field("daoAddress", dao.to_checksum())
            .field(
                "daoInfo",
                json!({
                    "name": name,
                    "votingPeriod": voting_period,
                    "quorumPercentage": quorum,
                }),
            )
            .field("creator", signer.address().to_checksum())
            .field("factoryAddress", factory.to_checksum())
            .transaction(&outcome))
    }
}

async fn create_dao(
    ctx: &ActionContext,
    signer: &Signer,
    factory: Address,
    name: &str,
    voting_period: u64,
    quorum: u64,
) -> Result<(Address, TransactionOutcome), ActionError> {
    let data = abis::dao_factory().encode_call(
        "createDAO",
        &[
            Token::String(name.to_string()),
            Token::Uint(U256::from(voting_period)),
            Token::Uint(U256::from(quorum)),
        ],
    )?;
    let spec = CallSpec::contract_call("create_dao", factory, data).with_preflight(gas_preflight());
    let outcome = ctx.pipeline().execute(signer, &spec).await?.outcome;

    let event = extract_event(abis::dao_factory(), &outcome, "DAOCreated")?;
    let dao = event
        .address_arg("daoAddress")
        .ok_or_else(|| ActionError::ExpectedEventNotFound {
            event: "DAOCreated".to_string(),
            tx_hash: outcome.tx_hash.to_hex(),
        })?;
    Ok((dao, outcome))
}
