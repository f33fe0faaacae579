//! Well-known token registry
//!
//! Display fallback for pools whose subgraph entries carry no symbol.
//! Mainnet addresses of the tokens that dominate weighted-pool liquidity.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::cartographer::Token;

lazy_static! {
    static ref KNOWN_SYMBOLS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "WETH");
        m.insert("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "USDC");
        m.insert("0xdac17f958d2ee523a2206206994597c13d831ec7", "USDT");
        m.insert("0x6b175474e89094c44da98b954eedcdecb5be3830", "DAI");
        m.insert("0x2260fac5e5542a773aa44fbcfedf7c193bc2c599", "WBTC");
        m.insert("0xba100000625a3754423978a60c9317c58a424e3d", "BAL");
        m.insert("0x514910771af9ca656af840dff83e8264ecf986ca", "LINK");
        m.insert("0x1f9840a85d5af5bf1d1762f925bdaddc4201f984", "UNI");
        m.insert("0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2", "MKR");
        m.insert("0xc011a73ee8576fb46f5e1c5751ca3b9fe0af2a6f", "SNX");
        m.insert("0x0d8775f648430679a709e98d2b0cb6250d2887ef", "BAT");
        m.insert("0x1985365e9f78359a9b6ad760e32412f4a445e862", "REP");
        m.insert("0xe41d2489571d322189246dafa5ebde1f4699f498", "ZRX");
        m.insert("0x7fc66500c84a76ad7e9c93437bfc5ac33e2ddae9", "AAVE");
        m.insert("0xd533a949740bb3306d119cc777fa900ba034cd52", "CRV");
        m
    };
}

/// Known mainnet symbol for a token, if any.
pub fn known_symbol(token: &Token) -> Option<&'static str> {
    KNOWN_SYMBOLS.get(token.as_str()).copied()
}
