use orderpay::config::PricingConfig;
use orderpay::domain::order::{NewOrder, Urgency};
use orderpay::domain::pricing::PricingEngine;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

mod common;

fn expected(pages: u32, urgency: Urgency) -> u64 {
    let config = PricingConfig::default();
    let raw = Decimal::from(pages)
        * Decimal::from(config.base_price_per_page)
        * config.urgency_multiplier.get(urgency);
    // Half-up by hand: floor(x + 0.5) for non-negative x.
    (raw + Decimal::new(5, 1)).floor().to_u64().unwrap()
}

#[test]
fn test_random_prices_follow_formula() {
    let engine = PricingEngine::default();
    let mut rng = rand::thread_rng();
    let urgencies = [Urgency::Normal, Urgency::Urgent, Urgency::Express];

    for _ in 0..1_000 {
        let pages = rng.gen_range(1..=100_000u32);
        let urgency = urgencies[rng.gen_range(0..urgencies.len())];
        let first = engine.price(pages, urgency).unwrap();
        let second = engine.price(pages, urgency).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.value(), expected(pages, urgency), "{pages} pages, {urgency}");
    }
}

#[tokio::test]
async fn test_reference_order_price() {
    let engine = common::engine();
    let order = engine
        .create_order(NewOrder::new("T", "X", 10).with_urgency("urgent"))
        .await
        .unwrap();
    assert_eq!(order.amount.value(), 650);
}

#[test]
fn test_pricing_info_repeatable() {
    let engine = common::engine();
    let first = serde_json::to_string(&engine.pricing_info()).unwrap();
    for _ in 0..10 {
        assert_eq!(serde_json::to_string(&engine.pricing_info()).unwrap(), first);
    }
}
