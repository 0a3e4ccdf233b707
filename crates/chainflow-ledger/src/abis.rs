//! Interfaces of the contracts chainflow talks to

use std::sync::OnceLock;

use crate::abi::ParamType;
use crate::interface::{EventParam, Interface};

fn uint() -> ParamType {
    ParamType::Uint(256)
}

/// ERC-20 token
pub fn erc20() -> &'static Interface {
    static IFACE: OnceLock<Interface> = OnceLock::new();
    IFACE.get_or_init(|| {
        Interface::new("ERC20")
            .function("name", vec![], vec![ParamType::String])
            .function("symbol", vec![], vec![ParamType::String])
            .function("decimals", vec![], vec![ParamType::Uint(8)])
            .function("totalSupply", vec![], vec![uint()])
            .function("balanceOf", vec![ParamType::Address], vec![uint()])
            .function("transfer", vec![ParamType::Address, uint()], vec![ParamType::Bool])
            .function("approve", vec![ParamType::Address, uint()], vec![ParamType::Bool])
            .function(
                "allowance",
                vec![ParamType::Address, ParamType::Address],
                vec![uint()],
            )
            .event(
                "Transfer",
                vec![
                    EventParam::indexed("from", ParamType::Address),
                    EventParam::indexed("to", ParamType::Address),
                    EventParam::data("value", uint()),
                ],
            )
            .event(
                "Approval",
                vec![
                    EventParam::indexed("owner", ParamType::Address),
                    EventParam::indexed("spender", ParamType::Address),
                    EventParam::data("value", uint()),
                ],
            )
    })
}

/// ERC-20 token factory
pub fn token_factory() -> &'static Interface {
    static IFACE: OnceLock<Interface> = OnceLock::new();
    IFACE.get_or_init(|| {
        Interface::new("TokenFactory")
            .function(
                "createToken",
                vec![ParamType::String, ParamType::String, uint()],
                vec![ParamType::Address],
            )
            .function(
                "getTokenInfo",
                vec![ParamType::Address],
                // creator, name, symbol, initialSupply, deployedAt, currentSupply, owner
                vec![
                    ParamType::Address,
                    ParamType::String,
                    ParamType::String,
                    uint(),
                    uint(),
                    uint(),
                    ParamType::Address,
                ],
            )
            .event(
                "TokenCreated",
                vec![
                    EventParam::indexed("tokenAddress", ParamType::Address),
                    EventParam::indexed("creator", ParamType::Address),
                    EventParam::data("name", ParamType::String),
                    EventParam::data("symbol", ParamType::String),
                    EventParam::data("initialSupply", uint()),
                    EventParam::data("timestamp", uint()),
                ],
            )
    })
}

/// ERC-721 collection factory
pub fn nft_factory() -> &'static Interface {
    static IFACE: OnceLock<Interface> = OnceLock::new();
    IFACE.get_or_init(|| {
        Interface::new("NFTFactory")
            .function(
                "createCollection",
                vec![ParamType::String, ParamType::String, ParamType::String],
                vec![ParamType::Address],
            )
            .event(
                "CollectionCreated",
                vec![
                    EventParam::indexed("collectionAddress", ParamType::Address),
                    EventParam::indexed("creator", ParamType::Address),
                    EventParam::data("name", ParamType::String),
                    EventParam::data("symbol", ParamType::String),
                    EventParam::data("baseURI", ParamType::String),
                ],
            )
    })
}

/// ERC-721 collection created by [`nft_factory`]
pub fn nft_collection() -> &'static Interface {
    static IFACE: OnceLock<Interface> = OnceLock::new();
    IFACE.get_or_init(|| {
        Interface::new("NFTCollection")
            .function("owner", vec![], vec![ParamType::Address])
            .function("name", vec![], vec![ParamType::String])
            .function("symbol", vec![], vec![ParamType::String])
            .function("mint", vec![ParamType::Address, ParamType::String], vec![uint()])
            .event(
                "Transfer",
                vec![
                    EventParam::indexed("from", ParamType::Address),
                    EventParam::indexed("to", ParamType::Address),
                    EventParam::indexed("tokenId", uint()),
                ],
            )
    })
}

/// DAO factory
pub fn dao_factory() -> &'static Interface {
    static IFACE: OnceLock<Interface> = OnceLock::new();
    IFACE.get_or_init(|| {
        Interface::new("DAOFactory")
            .function(
                "createDAO",
                vec![ParamType::String, uint(), uint()],
                vec![ParamType::Address],
            )
            .event(
                "DAOCreated",
                vec![
                    EventParam::indexed("daoAddress", ParamType::Address),
                    EventParam::indexed("creator", ParamType::Address),
                    EventParam::data("name", ParamType::String),
                    EventParam::data("votingPeriod", uint()),
                    EventParam::data("quorumPercentage", uint()),
                ],
            )
    })
}

/// Batch native-currency airdrop contract
pub fn airdrop() -> &'static Interface {
    static IFACE: OnceLock<Interface> = OnceLock::new();
    IFACE.get_or_init(|| {
        Interface::new("Airdrop")
            .function(
                "airdrop",
                vec![ParamType::Array(Box::new(ParamType::Address)), uint()],
                vec![],
            )
            .event(
                "AirdropExecuted",
                vec![
                    EventParam::indexed("sender", ParamType::Address),
                    EventParam::data("recipientCount", uint()),
                    EventParam::data("amountPerRecipient", uint()),
                ],
            )
    })
}

/// Concentrated-liquidity swap router
pub fn swap_router() -> &'static Interface {
    static IFACE: OnceLock<Interface> = OnceLock::new();
    IFACE.get_or_init(|| {
        Interface::new("SwapRouter").function(
            "exactInputSingle",
            // tokenIn, tokenOut, fee, recipient, amountIn, amountOutMinimum, sqrtPriceLimitX96
            vec![ParamType::Tuple(vec![
                ParamType::Address,
                ParamType::Address,
                ParamType::Uint(24),
                ParamType::Address,
                uint(),
                uint(),
                ParamType::Uint(160),
            ])],
            vec![uint()],
        )
    })
}

/// ERC-4626 tokenized vault
pub fn yield_vault() -> &'static Interface {
    static IFACE: OnceLock<Interface> = OnceLock::new();
    IFACE.get_or_init(|| {
        Interface::new("ERC4626")
            .function("asset", vec![], vec![ParamType::Address])
            .function("deposit", vec![uint(), ParamType::Address], vec![uint()])
            .event(
                "Deposit",
                vec![
                    EventParam::indexed("sender", ParamType::Address),
                    EventParam::indexed("owner", ParamType::Address),
                    EventParam::data("assets", uint()),
                    EventParam::data("shares", uint()),
                ],
            )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        let erc20 = erc20();
        assert_eq!(erc20.get_function("decimals").unwrap().selector, [0x31, 0x3c, 0xe5, 0x67]);
        assert_eq!(erc20.get_function("allowance").unwrap().selector, [0xdd, 0x62, 0xed, 0x3e]);
        assert_eq!(
            swap_router().get_function("exactInputSingle").unwrap().signature,
            "exactInputSingle((address,address,uint24,address,uint256,uint256,uint160))"
        );
        assert_eq!(
            swap_router().get_function("exactInputSingle").unwrap().selector,
            [0x04, 0xe4, 0x5a, 0xaf]
        );
    }

    #[test]
    fn test_event_signatures() {
        assert_eq!(
            token_factory().get_event("TokenCreated").unwrap().signature,
            "TokenCreated(address,address,string,string,uint256,uint256)"
        );
        assert_eq!(
            nft_collection().get_event("Transfer").unwrap().topic,
            erc20().get_event("Transfer").unwrap().topic
        );
    }
}
