//! Current-price resolution and purchase total recalculation.

use crate::entities::{discount_card, price, purchase, purchase_item};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, Unchanged,
};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Decimal places every stored amount carries.
pub const MONEY_SCALE: u32 = 2;

/// Rounds to two places, half to even.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// `quantity × price`, rounded like every stored amount.
pub fn line_total(quantity: i32, price: Decimal) -> Decimal {
    round_money(Decimal::from(quantity) * price)
}

/// Newest-first ordering; equal start dates fall back to insertion order.
fn newer_first(a: &price::Model, b: &price::Model) -> std::cmp::Ordering {
    b.start_date
        .cmp(&a.start_date)
        .then_with(|| b.id.cmp(&a.id))
}

/// Value of the latest record that has already started at `now`.
pub fn current_price(history: &[price::Model], now: DateTime<Utc>) -> Option<Decimal> {
    history
        .iter()
        .filter(|p| p.start_date <= now)
        .min_by(|a, b| newer_first(a, b))
        .map(|p| p.value)
}

/// Records that have started at `now`, newest first. Future prices are left out.
pub fn effective_history(history: &[price::Model], now: DateTime<Utc>) -> Vec<price::Model> {
    let mut effective: Vec<price::Model> = history
        .iter()
        .filter(|p| p.start_date <= now)
        .cloned()
        .collect();
    effective.sort_by(newer_first);
    effective
}

/// Current price of one product, evaluated by the database.
pub async fn resolve_current_price<C>(
    conn: &C,
    product_id: i32,
    now: DateTime<Utc>,
) -> Result<Option<Decimal>, DbErr>
where
    C: ConnectionTrait,
{
    let latest = price::Entity::find()
        .filter(price::Column::ProductId.eq(product_id))
        .filter(price::Column::StartDate.lte(now))
        .order_by_desc(price::Column::StartDate)
        .order_by_desc(price::Column::Id)
        .one(conn)
        .await?;

    Ok(latest.map(|p| p.value))
}

/// Current prices for a page of products in one query. Products without a
/// started price are absent from the map.
pub async fn resolve_current_prices<C>(
    conn: &C,
    product_ids: &[i32],
    now: DateTime<Utc>,
) -> Result<HashMap<i32, Decimal>, DbErr>
where
    C: ConnectionTrait,
{
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let history = price::Entity::find()
        .filter(price::Column::ProductId.is_in(product_ids.iter().copied()))
        .filter(price::Column::StartDate.lte(now))
        .all(conn)
        .await?;

    let mut by_product: HashMap<i32, Vec<price::Model>> = HashMap::new();
    for record in history {
        by_product.entry(record.product_id).or_default().push(record);
    }

    Ok(by_product
        .into_iter()
        .filter_map(|(product_id, records)| {
            current_price(&records, now).map(|value| (product_id, value))
        })
        .collect())
}

/// Derived amounts of a purchase receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
}

impl PurchaseTotals {
    /// An absent or inactive card gives no discount. The discount is rounded
    /// before subtracting so `subtotal == discount_amount + final_amount`.
    pub fn compute<I>(line_totals: I, card: Option<&discount_card::Model>) -> Self
    where
        I: IntoIterator<Item = Decimal>,
    {
        let subtotal = round_money(line_totals.into_iter().sum());

        let discount_amount = match card {
            Some(card) if card.is_active => {
                round_money(subtotal * card.discount_percent / Decimal::ONE_HUNDRED)
            }
            _ => Decimal::ZERO,
        };

        Self {
            subtotal,
            discount_amount,
            final_amount: subtotal - discount_amount,
        }
    }
}

/// Recomputes and stores the three derived amounts of a purchase. Only those
/// columns (and `updated_at`) are written.
#[instrument(skip(conn))]
pub async fn recalculate_purchase_totals<C>(
    conn: &C,
    purchase_id: i32,
) -> Result<purchase::Model, DbErr>
where
    C: ConnectionTrait,
{
    let receipt = purchase::Entity::find_by_id(purchase_id)
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Purchase {} not found", purchase_id)))?;

    let items = purchase_item::Entity::find()
        .filter(purchase_item::Column::PurchaseId.eq(purchase_id))
        .all(conn)
        .await?;

    let card = match receipt.discount_card_id {
        Some(card_id) => discount_card::Entity::find_by_id(card_id).one(conn).await?,
        None => None,
    };

    let totals = PurchaseTotals::compute(items.iter().map(|item| item.line_total), card.as_ref());

    debug!(
        purchase_id,
        items = items.len(),
        subtotal = %totals.subtotal,
        discount = %totals.discount_amount,
        final_amount = %totals.final_amount,
        "Recalculated purchase totals"
    );

    purchase::ActiveModel {
        id: Unchanged(purchase_id),
        subtotal: Set(totals.subtotal),
        discount_amount: Set(totals.discount_amount),
        final_amount: Set(totals.final_amount),
        ..Default::default()
    }
    .update(conn)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn at(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, day, 0, 0, 0).unwrap()
    }

    fn price(id: i32, value: Decimal, start_date: DateTime<Utc>) -> price::Model {
        price::Model {
            id,
            product_id: 1,
            value,
            start_date,
            created_at: start_date,
            updated_at: start_date,
        }
    }

    fn card(percent: Decimal, is_active: bool) -> discount_card::Model {
        discount_card::Model {
            id: 1,
            card_number: "0001".into(),
            discount_percent: percent,
            is_active,
            created_at: at(1, 1),
            updated_at: at(1, 1),
        }
    }

    fn jan_feb_history() -> Vec<price::Model> {
        vec![price(1, dec!(100), at(1, 1)), price(2, dec!(120), at(2, 1))]
    }

    #[rstest]
    #[case(at(1, 15), Some(dec!(100)))]
    #[case(at(3, 1), Some(dec!(120)))]
    #[case(at(2, 1), Some(dec!(120)))]
    #[case(Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap(), None)]
    fn current_price_picks_latest_started_record(
        #[case] now: DateTime<Utc>,
        #[case] expected: Option<Decimal>,
    ) {
        assert_eq!(current_price(&jan_feb_history(), now), expected);
    }

    #[test]
    fn current_price_ignores_insertion_order() {
        let mut history = jan_feb_history();
        history.reverse();
        assert_eq!(current_price(&history, at(3, 1)), Some(dec!(120)));
    }

    #[test]
    fn current_price_of_empty_history_is_none() {
        assert_eq!(current_price(&[], at(3, 1)), None);
    }

    #[test]
    fn same_start_date_prefers_later_record() {
        let history = vec![price(7, dec!(50), at(1, 1)), price(3, dec!(40), at(1, 1))];
        assert_eq!(current_price(&history, at(1, 2)), Some(dec!(50)));
    }

    #[test]
    fn effective_history_drops_future_and_sorts_newest_first() {
        let mut history = jan_feb_history();
        history.push(price(3, dec!(150), at(6, 1)));

        let effective = effective_history(&history, at(3, 1));
        let values: Vec<Decimal> = effective.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![dec!(120), dec!(100)]);
    }

    #[test]
    fn active_card_discounts_subtotal() {
        let totals = PurchaseTotals::compute(
            [dec!(150), dec!(50)],
            Some(&card(dec!(10), true)),
        );
        assert_eq!(totals.subtotal, dec!(200.00));
        assert_eq!(totals.discount_amount, dec!(20.00));
        assert_eq!(totals.final_amount, dec!(180.00));
    }

    #[test]
    fn inactive_card_gives_no_discount() {
        let totals = PurchaseTotals::compute([dec!(200)], Some(&card(dec!(10), false)));
        assert_eq!(totals.discount_amount, Decimal::ZERO);
        assert_eq!(totals.final_amount, dec!(200.00));
    }

    #[test]
    fn no_items_means_zero_totals() {
        let totals = PurchaseTotals::compute(Vec::new(), Some(&card(dec!(25), true)));
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.discount_amount, Decimal::ZERO);
        assert_eq!(totals.final_amount, Decimal::ZERO);
    }

    #[rstest]
    // 0.25 * 10% = 0.025 -> 0.02 (half to even)
    #[case(dec!(0.25), dec!(10), dec!(0.02), dec!(0.23))]
    // 0.35 * 10% = 0.035 -> 0.04
    #[case(dec!(0.35), dec!(10), dec!(0.04), dec!(0.31))]
    #[case(dec!(99.99), dec!(33.33), dec!(33.33), dec!(66.66))]
    #[case(dec!(10.00), dec!(100), dec!(10.00), dec!(0.00))]
    fn discount_is_rounded_half_even_before_subtracting(
        #[case] subtotal: Decimal,
        #[case] percent: Decimal,
        #[case] discount: Decimal,
        #[case] final_amount: Decimal,
    ) {
        let totals = PurchaseTotals::compute([subtotal], Some(&card(percent, true)));
        assert_eq!(totals.discount_amount, discount);
        assert_eq!(totals.final_amount, final_amount);
        assert_eq!(totals.subtotal, totals.discount_amount + totals.final_amount);
    }

    #[test]
    fn line_total_multiplies_quantity_and_price() {
        assert_eq!(line_total(3, dec!(19.99)), dec!(59.97));
        assert_eq!(line_total(1, dec!(0.01)), dec!(0.01));
    }
}
