//! Property-based tests for price resolution and receipt totals.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use supermarket_api::{
    entities::{discount_card, price},
    services::pricing::{current_price, line_total, round_money, PurchaseTotals},
};

fn money_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn percent_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

fn card(percent: Decimal, is_active: bool) -> discount_card::Model {
    let now = Utc::now();
    discount_card::Model {
        id: 1,
        card_number: "PROP-1".to_string(),
        discount_percent: percent,
        is_active,
        created_at: now,
        updated_at: now,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn totals_always_balance(
        lines in prop::collection::vec((1i32..50, money_strategy()), 0..12),
        percent in percent_strategy(),
        is_active in any::<bool>(),
    ) {
        let card = card(percent, is_active);
        let totals = PurchaseTotals::compute(
            lines.iter().map(|&(qty, price)| line_total(qty, price)),
            Some(&card),
        );

        prop_assert_eq!(totals.subtotal, totals.discount_amount + totals.final_amount);
        prop_assert!(totals.discount_amount >= Decimal::ZERO);
        prop_assert!(totals.final_amount >= Decimal::ZERO);
        prop_assert!(totals.discount_amount <= totals.subtotal);
        prop_assert!(totals.subtotal.scale() <= 2);
        prop_assert!(totals.discount_amount.scale() <= 2);
        if !is_active {
            prop_assert_eq!(totals.discount_amount, Decimal::ZERO);
        }
    }

    #[test]
    fn totals_do_not_depend_on_line_order(
        mut lines in prop::collection::vec((1i32..20, money_strategy()), 1..8),
        percent in percent_strategy(),
    ) {
        let card = card(percent, true);
        let forward = PurchaseTotals::compute(lines.iter().map(|&(q, p)| line_total(q, p)), Some(&card));
        lines.reverse();
        let backward = PurchaseTotals::compute(lines.iter().map(|&(q, p)| line_total(q, p)), Some(&card));
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn rounding_is_idempotent(cents in -1_000_000_000i64..1_000_000_000, extra in 0u32..4) {
        let amount = Decimal::new(cents, 2 + extra);
        let once = round_money(amount);
        prop_assert_eq!(round_money(once), once);
    }

    #[test]
    fn current_price_is_latest_started(
        offsets in prop::collection::vec((-1000i64..1000, money_strategy()), 1..10),
    ) {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let history: Vec<price::Model> = offsets
            .iter()
            .enumerate()
            .map(|(i, &(offset, value))| price::Model {
                id: i as i32 + 1,
                product_id: 1,
                value,
                start_date: now + Duration::hours(offset),
                created_at: now,
                updated_at: now,
            })
            .collect();

        let expected = history
            .iter()
            .filter(|p| p.start_date <= now)
            .max_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)))
            .map(|p| p.value);

        prop_assert_eq!(current_price(&history, now), expected);
        if history.iter().all(|p| p.start_date > now) {
            prop_assert!(current_price(&history, now).is_none());
        }
    }
}
