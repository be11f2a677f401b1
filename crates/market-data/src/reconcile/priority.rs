//! Per-field provider priority table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{ProviderId, TokenField};

use ProviderId::*;

const IDENTITY: &[ProviderId] = &[
    CoinGecko,
    PumpFun,
    Birdeye,
    DexScreener,
    GeckoTerminal,
    RugCheck,
];
const MARKET: &[ProviderId] = &[CoinGecko, GeckoTerminal, DexScreener, Birdeye, PumpFun];
const MOMENTUM: &[ProviderId] = &[CoinGecko, GeckoTerminal, DexScreener, Birdeye];
const LINKS: &[ProviderId] = &[PumpFun, DexScreener];

/// Ordered list of providers consulted for each canonical field.
///
/// The first listed provider with a value wins. A field missing from the
/// table, or listed with an empty order, always takes its fallback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorityTable {
    orders: BTreeMap<TokenField, Vec<ProviderId>>,
}

impl Default for PriorityTable {
    fn default() -> Self {
        let entries: [(TokenField, &[ProviderId]); 15] = [
            (TokenField::Name, IDENTITY),
            (TokenField::Symbol, IDENTITY),
            (TokenField::TotalSupply, &[CoinGecko, PumpFun, RugCheck]),
            (TokenField::MarketCap, MARKET),
            (TokenField::Price, MARKET),
            (TokenField::PriceChange24h, MOMENTUM),
            (TokenField::Volume24h, MOMENTUM),
            (TokenField::Holders, &[Birdeye]),
            (
                TokenField::Image,
                &[CoinGecko, PumpFun, Birdeye, DexScreener, GeckoTerminal],
            ),
            (TokenField::Description, &[CoinGecko, PumpFun]),
            (TokenField::Website, LINKS),
            (TokenField::Twitter, LINKS),
            (TokenField::Telegram, LINKS),
            (TokenField::Discord, &[DexScreener]),
            (TokenField::CreatedAt, LINKS),
        ];

        Self {
            orders: entries
                .into_iter()
                .map(|(field, order)| (field, order.to_vec()))
                .collect(),
        }
    }
}

impl PriorityTable {
    /// Table with no entries; every field takes its fallback.
    pub fn empty() -> Self {
        Self {
            orders: BTreeMap::new(),
        }
    }

    /// Provider order for a field.
    pub fn order(&self, field: TokenField) -> &[ProviderId] {
        self.orders.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the order for one field. Duplicate providers keep their first position.
    pub fn set(&mut self, field: TokenField, order: Vec<ProviderId>) {
        let mut deduped = Vec::with_capacity(order.len());
        for provider in order {
            if !deduped.contains(&provider) {
                deduped.push(provider);
            }
        }
        self.orders.insert(field, deduped);
    }

    /// Builder-style [`set`](Self::set).
    pub fn with_order(mut self, field: TokenField, order: Vec<ProviderId>) -> Self {
        self.set(field, order);
        self
    }

    /// Providers that can win at least one field.
    pub fn contributors(&self) -> Vec<ProviderId> {
        let mut providers: Vec<ProviderId> = self.orders.values().flatten().copied().collect();
        providers.sort();
        providers.dedup();
        providers
    }
}
