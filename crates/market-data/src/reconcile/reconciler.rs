//! Field reconciler - builds canonical token details from provider snapshots.

use std::collections::BTreeMap;

use chrono::Utc;
use log::debug;

use crate::models::{
    MarketSnapshot, ProviderId, TokenAddress, TokenDetails, TokenField, DEFAULT_DECIMALS,
    UNKNOWN_NAME, UNKNOWN_SYMBOL,
};

use super::priority::PriorityTable;

/// Which provider supplied each populated field.
pub type Provenance = BTreeMap<TokenField, ProviderId>;

/// Picks one value per field by walking the [`PriorityTable`].
///
/// Values are taken verbatim from a single provider; nothing is averaged or
/// combined. Only snapshots passed in are considered, so callers pass the
/// successful ones only.
#[derive(Clone, Debug, Default)]
pub struct FieldReconciler {
    table: PriorityTable,
}

impl FieldReconciler {
    pub fn new(table: PriorityTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PriorityTable {
        &self.table
    }

    pub fn reconcile(
        &self,
        address: &TokenAddress,
        snapshots: &BTreeMap<ProviderId, MarketSnapshot>,
    ) -> (TokenDetails, Provenance) {
        let mut picker = Picker {
            table: &self.table,
            snapshots,
            provenance: Provenance::new(),
        };

        let details = TokenDetails {
            address: address.to_string(),
            name: picker
                .pick(TokenField::Name, |s| s.name.as_ref())
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            symbol: picker
                .pick(TokenField::Symbol, |s| s.symbol.as_ref())
                .unwrap_or_else(|| UNKNOWN_SYMBOL.to_string()),
            decimals: DEFAULT_DECIMALS,
            total_supply: picker.pick(TokenField::TotalSupply, |s| s.total_supply.as_ref()),
            market_cap: picker.pick(TokenField::MarketCap, |s| s.market_cap.as_ref()),
            price: picker.pick(TokenField::Price, |s| s.price.as_ref()),
            price_change_24h: picker
                .pick(TokenField::PriceChange24h, |s| s.price_change_24h.as_ref()),
            volume_24h: picker.pick(TokenField::Volume24h, |s| s.volume_24h.as_ref()),
            holders: picker.pick(TokenField::Holders, |s| s.holders.as_ref()),
            description: picker.pick(TokenField::Description, |s| s.description.as_ref()),
            image: picker.pick(TokenField::Image, |s| s.image.as_ref()),
            website: picker.pick(TokenField::Website, |s| s.website.as_ref()),
            twitter: picker.pick(TokenField::Twitter, |s| s.twitter.as_ref()),
            telegram: picker.pick(TokenField::Telegram, |s| s.telegram.as_ref()),
            discord: picker.pick(TokenField::Discord, |s| s.discord.as_ref()),
            created_at: picker.pick(TokenField::CreatedAt, |s| s.created_at.as_ref()),
            updated_at: Utc::now(),
        };

        debug!(
            "Reconciled {} of {} fields for {} from {} snapshots",
            picker.provenance.len(),
            TokenField::ALL.len(),
            address,
            snapshots.len()
        );

        (details, picker.provenance)
    }
}

struct Picker<'a> {
    table: &'a PriorityTable,
    snapshots: &'a BTreeMap<ProviderId, MarketSnapshot>,
    provenance: Provenance,
}

impl Picker<'_> {
    /// First value for `field` in priority order, recording its provider.
    fn pick<T: Clone>(
        &mut self,
        field: TokenField,
        get: impl Fn(&MarketSnapshot) -> Option<&T>,
    ) -> Option<T> {
        let (provider, value) = self.table.order(field).iter().find_map(|provider| {
            let value = get(self.snapshots.get(provider)?)?;
            Some((*provider, value.clone()))
        })?;
        self.provenance.insert(field, provider);
        Some(value)
    }
}
