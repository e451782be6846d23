//! Roll-up tables computed once over the full enriched order history

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{EnrichedOrder, UserId};

/// First order of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub user_id: UserId,
    pub date: NaiveDate,
}

/// Order cadence of a user at the time of one order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub user_id: UserId,
    pub order_number: u32,
    pub days_since_prior_order: Option<u32>,
    /// Days between the user's first order and this one
    pub tenure_days: u32,
}

/// One active day of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retention {
    pub user_id: UserId,
    pub date: NaiveDate,
}

/// Order and item volume of one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub date: NaiveDate,
    pub orders: u64,
    pub items: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Rollups {
    pub new_users: Vec<NewUser>,
    pub engagement: Vec<Engagement>,
    pub retention: Vec<Retention>,
    pub volumes: Vec<Volume>,
}

impl Rollups {
    pub fn compute(orders: &[EnrichedOrder]) -> Self {
        Self {
            new_users: new_users(orders),
            engagement: engagement(orders),
            retention: retention(orders),
            volumes: volumes(orders),
        }
    }
}

/// First-order events sorted by `(date, user_id)`
pub fn new_users(orders: &[EnrichedOrder]) -> Vec<NewUser> {
    let mut rows: Vec<NewUser> = orders
        .iter()
        .filter(|o| o.is_first())
        .map(|o| NewUser {
            user_id: o.user_id,
            date: o.date,
        })
        .collect();
    rows.sort_by_key(|r| (r.date, r.user_id));
    rows
}

/// Per-order cadence sorted by `(days_since_prior_order, user_id, order_number)`,
/// first orders last
pub fn engagement(orders: &[EnrichedOrder]) -> Vec<Engagement> {
    let mut first_dates: HashMap<UserId, NaiveDate> = HashMap::new();
    for order in orders {
        first_dates
            .entry(order.user_id)
            .and_modify(|d| *d = (*d).min(order.date))
            .or_insert(order.date);
    }

    let mut rows: Vec<Engagement> = orders
        .iter()
        .map(|o| {
            let first = first_dates.get(&o.user_id).copied().unwrap_or(o.date);
            Engagement {
                user_id: o.user_id,
                order_number: o.order_number,
                days_since_prior_order: o.days_since_prior_order,
                tenure_days: (o.date - first).num_days().max(0) as u32,
            }
        })
        .collect();
    rows.sort_by_key(|r| {
        (
            r.days_since_prior_order.is_none(),
            r.days_since_prior_order,
            r.user_id,
            r.order_number,
        )
    });
    rows
}

/// Every order date of every user sorted by `(date, user_id)`
pub fn retention(orders: &[EnrichedOrder]) -> Vec<Retention> {
    let mut rows: Vec<Retention> = orders
        .iter()
        .map(|o| Retention {
            user_id: o.user_id,
            date: o.date,
        })
        .collect();
    rows.sort_by_key(|r| (r.date, r.user_id));
    rows
}

/// Orders and items sold per date
pub fn volumes(orders: &[EnrichedOrder]) -> Vec<Volume> {
    let mut by_date: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for order in orders {
        let entry = by_date.entry(order.date).or_default();
        entry.0 += 1;
        entry.1 += order.basket_size as u64;
    }
    by_date
        .into_iter()
        .map(|(date, (orders, items))| Volume {
            date,
            orders,
            items,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Basket, EvalSet};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn order(
        user_id: u32,
        number: u32,
        delta: Option<u32>,
        date: NaiveDate,
        items: usize,
    ) -> EnrichedOrder {
        EnrichedOrder {
            order_id: user_id * 100 + number,
            user_id,
            eval_set: EvalSet::Prior,
            order_number: number,
            order_dow: 0,
            order_hour_of_day: 9,
            days_since_prior_order: delta,
            basket: Basket::new((0..items as u32).collect()),
            total_days_on_platform: 0,
            datetime: date.and_hms_opt(9, 0, 0).unwrap(),
            date,
            basket_size: items,
        }
    }

    fn history() -> Vec<EnrichedOrder> {
        vec![
            order(2, 1, None, date(2023, 9, 20), 3),
            order(2, 2, Some(11), date(2023, 10, 1), 1),
            order(1, 1, None, date(2023, 9, 20), 2),
            order(1, 2, Some(4), date(2023, 9, 24), 5),
            order(1, 3, Some(7), date(2023, 10, 1), 4),
        ]
    }

    #[test]
    fn new_users_are_first_orders_sorted_by_date_then_user() {
        let rows = new_users(&history());
        assert_eq!(
            rows,
            vec![
                NewUser {
                    user_id: 1,
                    date: date(2023, 9, 20)
                },
                NewUser {
                    user_id: 2,
                    date: date(2023, 9, 20)
                },
            ]
        );
    }

    #[test]
    fn engagement_puts_first_orders_last() {
        let rows = engagement(&history());
        let deltas: Vec<Option<u32>> = rows.iter().map(|r| r.days_since_prior_order).collect();
        assert_eq!(deltas, vec![Some(4), Some(7), Some(11), None, None]);
    }

    #[test]
    fn engagement_tenure_counts_days_since_first_order() {
        let rows = engagement(&history());
        let row = rows
            .iter()
            .find(|r| r.user_id == 1 && r.order_number == 3)
            .unwrap();
        assert_eq!(row.tenure_days, 11);
    }

    #[test]
    fn retention_has_one_row_per_order() {
        let rows = retention(&history());
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].user_id, 1);
        assert_eq!(rows.last().unwrap().date, date(2023, 10, 1));
    }

    #[test]
    fn volumes_sum_orders_and_items_per_date() {
        let rows = volumes(&history());
        assert_eq!(
            rows,
            vec![
                Volume {
                    date: date(2023, 9, 20),
                    orders: 2,
                    items: 5
                },
                Volume {
                    date: date(2023, 9, 24),
                    orders: 1,
                    items: 5
                },
                Volume {
                    date: date(2023, 10, 1),
                    orders: 2,
                    items: 5
                },
            ]
        );
    }
}
