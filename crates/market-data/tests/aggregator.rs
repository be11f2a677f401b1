//! End-to-end aggregation tests over mock sources and a routing transport.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use memescope_market_data::provider::ProviderRequest;
use memescope_market_data::{
    success_rate, Envelope, HistoryResolver, HistoryWindow, MarketDataError, MarketSnapshot,
    PricePoint, PriorityTable, ProviderId, SecurityReport, SourceRegistry, TokenAddress,
    TokenAggregator, TokenDataSource, TokenField, Transport, NO_HISTORY,
};

const BONK: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

// ============================================================================
// Mock sources
// ============================================================================

#[derive(Clone)]
enum Behavior {
    Answer(MarketSnapshot),
    Fail(&'static str),
    Panic,
}

struct MockSource {
    id: ProviderId,
    behavior: Behavior,
    delay: Duration,
    history: Vec<PricePoint>,
    calls: AtomicUsize,
}

impl MockSource {
    fn new(id: ProviderId, behavior: Behavior) -> Self {
        Self {
            id,
            behavior,
            delay: Duration::ZERO,
            history: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn answering(id: ProviderId, snapshot: MarketSnapshot) -> Arc<Self> {
        Arc::new(Self::new(id, Behavior::Answer(snapshot)))
    }

    fn failing(id: ProviderId) -> Arc<Self> {
        Arc::new(Self::new(id, Behavior::Fail("upstream unavailable")))
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn with_history(mut self, points: usize) -> Self {
        self.history = (0..points)
            .map(|i| {
                let timestamp = 1_700_000_000_000 + i as i64 * 86_400_000;
                PricePoint::new(timestamp, 1.0 + i as f64, None)
            })
            .collect();
        self
    }
}

#[async_trait]
impl TokenDataSource for MockSource {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn supports_history(&self) -> bool {
        true
    }

    async fn fetch_current(&self, _token: &TokenAddress) -> Envelope<MarketSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.behavior {
            Behavior::Answer(snapshot) => Envelope::ok(snapshot.clone()),
            Behavior::Fail(message) => Envelope::failure(*message),
            Behavior::Panic => panic!("decoder exploded"),
        }
    }

    async fn fetch_history(
        &self,
        _token: &TokenAddress,
        _window: &HistoryWindow,
    ) -> Envelope<Vec<PricePoint>> {
        Envelope::ok(self.history.clone())
    }
}

fn named(name: &str, price: f64) -> MarketSnapshot {
    MarketSnapshot {
        name: Some(name.to_string()),
        symbol: Some(name.to_uppercase()),
        price: Some(price),
        ..Default::default()
    }
}

fn registry_of(sources: Vec<Arc<MockSource>>) -> SourceRegistry {
    sources
        .into_iter()
        .fold(SourceRegistry::new(), |registry, source| registry.with_source(source))
}

// ============================================================================
// Aggregation semantics
// ============================================================================

#[tokio::test]
async fn test_empty_registry_yields_fallbacks() {
    let aggregator = TokenAggregator::new(SourceRegistry::new());

    let result = aggregator.get_token_details(BONK).await.unwrap();
    let details = &result.token_details;
    assert_eq!(details.address, BONK);
    assert_eq!(details.name, "Unknown Token");
    assert_eq!(details.symbol, "UNKNOWN");
    assert_eq!(details.decimals, 6);
    assert!(details.price.is_none());
    assert!(details.market_cap.is_none());

    assert_eq!(result.sources.len(), 9);
    assert!(result.sources.values().all(|envelope| !envelope.success));
    assert!(!result.price_history.success);
    assert_eq!(result.price_history.error.as_deref(), Some(NO_HISTORY));

    let summary = aggregator.get_token_summary(BONK).await.unwrap();
    assert_eq!(summary.success_rate, dec!(0));
    assert!(summary.security.is_none());
}

#[tokio::test]
async fn test_priority_decides_between_disagreeing_sources() {
    let aggregator = TokenAggregator::new(registry_of(vec![
        MockSource::answering(ProviderId::DexScreener, named("dex", 1.0)),
        MockSource::answering(ProviderId::Birdeye, named("bird", 2.0)),
        MockSource::answering(ProviderId::CoinGecko, named("gecko", 3.0)),
    ]));

    let result = aggregator.get_token_details(BONK).await.unwrap();
    assert_eq!(result.token_details.name, "gecko");
    assert_eq!(result.token_details.price, Some(3.0));
    assert_eq!(result.provenance[&TokenField::Price], ProviderId::CoinGecko);

    // Raw envelopes keep every provider's own view
    let dex = result.sources[&ProviderId::DexScreener].data().unwrap();
    assert_eq!(dex.price, Some(1.0));
}

#[tokio::test]
async fn test_custom_priority_table() {
    let table = PriorityTable::default().with_order(
        TokenField::Price,
        vec![ProviderId::Birdeye, ProviderId::CoinGecko],
    );
    let aggregator = TokenAggregator::new(registry_of(vec![
        MockSource::answering(ProviderId::Birdeye, named("bird", 2.0)),
        MockSource::answering(ProviderId::CoinGecko, named("gecko", 3.0)),
    ]))
    .with_priority_table(table);

    let result = aggregator.get_token_details(BONK).await.unwrap();
    assert_eq!(result.token_details.price, Some(2.0));
    assert_eq!(result.token_details.name, "gecko");
}

#[tokio::test]
async fn test_panicking_source_is_contained() {
    let panicking = Arc::new(MockSource::new(ProviderId::GeckoTerminal, Behavior::Panic));
    let aggregator = TokenAggregator::new(registry_of(vec![
        panicking,
        MockSource::answering(ProviderId::Birdeye, named("bird", 2.0)),
    ]));

    let result = aggregator.get_token_details(BONK).await.unwrap();
    let envelope = &result.sources[&ProviderId::GeckoTerminal];
    assert!(!envelope.success);
    assert!(envelope.error.as_deref().unwrap().contains("decoder exploded"));
    assert_eq!(result.token_details.name, "bird");
}

#[tokio::test]
async fn test_all_sources_failing() {
    let sources = ProviderId::ALL.into_iter().map(MockSource::failing).collect();
    let aggregator = TokenAggregator::new(registry_of(sources));

    let summary = aggregator.get_token_summary(BONK).await.unwrap();
    assert_eq!(summary.success_rate, dec!(0));
    assert_eq!(summary.name, "Unknown Token");
    assert!(summary.sources.values().all(|ok| !ok));
}

#[tokio::test(start_paused = true)]
async fn test_result_independent_of_completion_order() {
    let fast_first = TokenAggregator::new(registry_of(vec![
        Arc::new(
            MockSource::new(ProviderId::CoinGecko, Behavior::Answer(named("gecko", 3.0)))
                .delayed(Duration::from_millis(10)),
        ),
        Arc::new(
            MockSource::new(ProviderId::DexScreener, Behavior::Answer(named("dex", 1.0)))
                .delayed(Duration::from_millis(500)),
        ),
    ]));
    let slow_first = TokenAggregator::new(registry_of(vec![
        Arc::new(
            MockSource::new(ProviderId::CoinGecko, Behavior::Answer(named("gecko", 3.0)))
                .delayed(Duration::from_millis(500)),
        ),
        Arc::new(
            MockSource::new(ProviderId::DexScreener, Behavior::Answer(named("dex", 1.0)))
                .delayed(Duration::from_millis(10)),
        ),
    ]));

    let a = fast_first.get_token_details(BONK).await.unwrap();
    let b = slow_first.get_token_details(BONK).await.unwrap();
    assert_eq!(a.token_details.name, b.token_details.name);
    assert_eq!(a.token_details.price, b.token_details.price);
    assert_eq!(a.provenance, b.provenance);
}

#[tokio::test(start_paused = true)]
async fn test_sources_run_concurrently() {
    let sources = ProviderId::ALL
        .into_iter()
        .map(|id| {
            Arc::new(
                MockSource::new(id, Behavior::Answer(MarketSnapshot::default()))
                    .delayed(Duration::from_secs(1)),
            )
        })
        .collect();
    let aggregator = TokenAggregator::new(registry_of(sources));

    let started = tokio::time::Instant::now();
    let summary = aggregator.get_token_summary(BONK).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(summary.success_rate, dec!(100));
}

#[tokio::test]
async fn test_invalid_address_contacts_nothing() {
    let source = MockSource::answering(ProviderId::DexScreener, named("dex", 1.0));
    let aggregator = TokenAggregator::new(SourceRegistry::new().with_source(source.clone()));

    let err = aggregator.get_token_summary("not a mint").await.unwrap_err();
    assert!(matches!(err, MarketDataError::InvalidTokenAddress(_)));
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_security_report_passes_through() {
    let report = SecurityReport::new(42.0, Some(3100.0), Some(2), Vec::new(), Vec::new());
    let aggregator = TokenAggregator::new(registry_of(vec![MockSource::answering(
        ProviderId::RugCheck,
        MarketSnapshot {
            security: Some(report.clone()),
            ..named("rug", 0.0)
        },
    )]));

    let summary = aggregator.get_token_summary(BONK).await.unwrap();
    assert_eq!(summary.security, Some(report));
    assert!(summary.security.as_ref().unwrap().is_high_risk);
    assert_eq!(summary.success_rate, dec!(11.11));
}

#[tokio::test]
async fn test_history_follows_resolver_order() {
    let aggregator = TokenAggregator::new(registry_of(vec![
        Arc::new(MockSource::new(
            ProviderId::DexScreener,
            Behavior::Answer(MarketSnapshot::default()),
        )),
        Arc::new(
            MockSource::new(ProviderId::Birdeye, Behavior::Answer(MarketSnapshot::default()))
                .with_history(3),
        ),
        Arc::new(
            MockSource::new(ProviderId::PumpFun, Behavior::Answer(MarketSnapshot::default()))
                .with_history(5),
        ),
    ]));

    let result = aggregator.get_token_details(BONK).await.unwrap();
    assert_eq!(result.price_history.data().map(Vec::len), Some(3));

    let reordered = aggregator.with_history_resolver(HistoryResolver::with_order(vec![
        ProviderId::PumpFun,
        ProviderId::Birdeye,
    ]));
    let result = reordered.get_token_details(BONK).await.unwrap();
    assert_eq!(result.price_history.data().map(Vec::len), Some(5));
}

proptest! {
    #[test]
    fn prop_success_rate_counts_successful_providers(
        mask in proptest::collection::vec(any::<bool>(), 9)
    ) {
        let sources: Vec<Arc<MockSource>> = ProviderId::ALL
            .into_iter()
            .zip(mask.iter())
            .map(|(id, ok)| {
                if *ok {
                    MockSource::answering(id, MarketSnapshot::default())
                } else {
                    MockSource::failing(id)
                }
            })
            .collect();
        let aggregator = TokenAggregator::new(registry_of(sources));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let summary = runtime.block_on(aggregator.get_token_summary(BONK)).unwrap();

        let successful = mask.iter().filter(|ok| **ok).count();
        prop_assert_eq!(summary.success_rate, success_rate(successful, 9));
        prop_assert_eq!(summary.sources.values().filter(|ok| **ok).count(), successful);
        for (id, ok) in ProviderId::ALL.into_iter().zip(mask.iter()) {
            prop_assert_eq!(summary.sources[&id], *ok);
        }
    }

    #[test]
    fn prop_price_comes_from_highest_priority_answer(
        mask in proptest::collection::vec(any::<bool>(), 9)
    ) {
        let answering: Vec<ProviderId> = ProviderId::ALL
            .into_iter()
            .zip(mask.iter())
            .filter(|(_, ok)| **ok)
            .map(|(id, _)| id)
            .collect();
        // Each provider reports a distinct price so the winner is identifiable
        let price_of =
            |id: ProviderId| ProviderId::ALL.iter().position(|p| *p == id).unwrap() as f64 + 1.0;
        let sources = answering
            .iter()
            .map(|id| MockSource::answering(*id, named(id.as_str(), price_of(*id))))
            .collect();
        let aggregator = TokenAggregator::new(registry_of(sources));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let result = runtime.block_on(aggregator.get_token_details(BONK)).unwrap();

        let table = PriorityTable::default();
        let expected = table
            .order(TokenField::Price)
            .iter()
            .find(|id| answering.contains(id))
            .copied();
        prop_assert_eq!(result.token_details.price, expected.map(price_of));
        prop_assert_eq!(result.provenance.get(&TokenField::Price).copied(), expected);
    }
}

// ============================================================================
// Built-in adapters over a routing transport
// ============================================================================

/// Answers by (provider, path); anything unrouted is a 404.
#[derive(Default)]
struct RoutingTransport {
    routes: HashMap<(ProviderId, String), Value>,
}

impl RoutingTransport {
    fn route(mut self, provider: ProviderId, path: impl Into<String>, body: Value) -> Self {
        self.routes.insert((provider, path.into()), body);
        self
    }
}

#[async_trait]
impl Transport for RoutingTransport {
    async fn send(&self, request: &ProviderRequest) -> Result<Value, MarketDataError> {
        self.routes
            .get(&(request.provider, request.path.clone()))
            .cloned()
            .ok_or(MarketDataError::HttpStatus {
                provider: request.provider,
                status: 404,
                body: "not found".to_string(),
            })
    }
}

#[tokio::test]
async fn test_builtin_sources_end_to_end() {
    let transport = RoutingTransport::default()
        .route(
            ProviderId::DexScreener,
            format!("/latest/dex/tokens/{}", BONK),
            json!({
                "pairs": [{
                    "baseToken": { "name": "Bonk", "symbol": "bonk" },
                    "priceUsd": "0.00002",
                    "priceChange": { "h24": 4.5 },
                    "volume": { "h24": 1000000 },
                    "info": {
                        "socials": [{ "type": "discord", "url": "https://discord.gg/bonk" }]
                    }
                }]
            }),
        )
        .route(
            ProviderId::PumpFun,
            format!("/coins/{}", BONK),
            json!({
                "mint": BONK,
                "name": "Pump Bonk",
                "symbol": "pbonk",
                "total_supply": 1000000000,
                "usd_market_cap": 1000,
                "twitter": "https://x.com/bonk"
            }),
        )
        .route(
            ProviderId::PumpFun,
            format!("/coins/{}/price_history", BONK),
            json!([
                { "timestamp": 1700000000, "price": 0.000001 },
                { "timestamp": 1700086400, "price": 0.0000012 }
            ]),
        );

    let aggregator = TokenAggregator::new(SourceRegistry::with_transport(Arc::new(transport)));
    let result = aggregator.get_token_details(BONK).await.unwrap();

    let succeeded: Vec<ProviderId> = result
        .sources
        .iter()
        .filter(|(_, envelope)| envelope.success)
        .map(|(id, _)| *id)
        .collect();
    assert_eq!(succeeded, vec![ProviderId::DexScreener, ProviderId::PumpFun]);
    assert_eq!(
        result.sources[&ProviderId::CoinGecko].error.as_deref(),
        Some("HTTP 404 from coin_gecko: not found")
    );

    let details = &result.token_details;
    assert_eq!(details.name, "Pump Bonk");
    assert_eq!(details.symbol, "PBONK");
    assert_eq!(details.price, Some(0.00002));
    assert_eq!(details.volume_24h, Some(1000000.0));
    assert_eq!(details.total_supply.as_deref(), Some("1000000000"));
    assert_eq!(details.twitter.as_deref(), Some("https://x.com/bonk"));
    assert_eq!(details.discord.as_deref(), Some("https://discord.gg/bonk"));

    let provenance: BTreeMap<TokenField, ProviderId> = result.provenance.clone();
    assert_eq!(provenance[&TokenField::Price], ProviderId::DexScreener);
    assert_eq!(provenance[&TokenField::Name], ProviderId::PumpFun);

    let history = result.price_history.data().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].timestamp, 1_700_000_000_000);
}
