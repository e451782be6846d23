//! Order enrichment: baskets, tenure and absolute order dates
//!
//! The source only records, for each order, how many days passed since the
//! same user's previous order. Absolute dates are rebuilt per user by an
//! ordered fold over the user's orders sorted by `order_number`:
//!
//! ```text
//! first order:  date = anchor_date - total_days_on_platform
//! order k > 1:  date = date(k - 1) + days_since_prior_order(k)
//! ```
//!
//! The last order of every user therefore lands exactly on the anchor date.

use std::collections::{BTreeMap, HashMap};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::EnrichError;
use crate::model::{Basket, EnrichedOrder, EvalSet, OrderId, OrderLine, RawOrder, UserId};

/// Default reference date that every user's last order is anchored to
pub fn default_anchor_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 10, 1).expect("2023-10-01 is a valid date")
}

/// Settings of the enrichment stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichConfig {
    /// Fixed date the reconstruction is anchored to
    pub anchor_date: NaiveDate,
    /// Only orders of this partition are kept
    pub eval_set: EvalSet,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            anchor_date: default_anchor_date(),
            eval_set: EvalSet::Prior,
        }
    }
}

/// Baskets keyed by order, built from order lines in file order
#[derive(Debug, Clone, Default)]
pub struct BasketIndex(HashMap<OrderId, Basket>);

impl BasketIndex {
    pub fn add(&mut self, line: &OrderLine) {
        self.0.entry(line.order_id).or_default().push(line.product_id);
    }

    pub fn take(&mut self, order_id: OrderId) -> Option<Basket> {
        self.0.remove(&order_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a OrderLine> for BasketIndex {
    fn from_iter<I: IntoIterator<Item = &'a OrderLine>>(iter: I) -> Self {
        let mut index = Self::default();
        for line in iter {
            index.add(line);
        }
        index
    }
}

/// Convert the float day delta of the source into whole days
fn whole_days(order_id: OrderId, value: f64) -> Result<u32, EnrichError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(EnrichError::InvalidDelta { order_id, value });
    }
    Ok(value as u32)
}

/// One user's orders sorted by order number with validated deltas
struct UserOrders {
    orders: Vec<(RawOrder, Option<u32>)>,
    tenure: u32,
}

impl UserOrders {
    fn build(user_id: UserId, mut orders: Vec<RawOrder>) -> Result<Self, EnrichError> {
        orders.sort_by_key(|o| o.order_number);

        if let Some(pair) = orders
            .windows(2)
            .find(|pair| pair[0].order_number == pair[1].order_number)
        {
            return Err(EnrichError::DuplicateOrderNumber {
                user_id,
                order_number: pair[0].order_number,
            });
        }

        let mut tenure = 0u32;
        let mut validated = Vec::with_capacity(orders.len());
        for (position, order) in orders.into_iter().enumerate() {
            if order.order_hour_of_day > 23 {
                return Err(EnrichError::HourOutOfRange {
                    order_id: order.order_id,
                    hour: order.order_hour_of_day,
                });
            }
            let delta = match (position, order.days_since_prior_order) {
                (0, None) => None,
                (0, Some(_)) => {
                    return Err(EnrichError::UnexpectedDelta {
                        order_id: order.order_id,
                    });
                }
                (_, None) => {
                    return Err(EnrichError::MissingDelta {
                        order_id: order.order_id,
                    });
                }
                (_, Some(value)) => Some(whole_days(order.order_id, value)?),
            };
            tenure = tenure
                .checked_add(delta.unwrap_or(0))
                .ok_or(EnrichError::DateOutOfRange {
                    order_id: order.order_id,
                })?;
            validated.push((order, delta));
        }

        Ok(Self {
            orders: validated,
            tenure,
        })
    }
}

/// Rebuild absolute dates for one user's deltas (first entry `None`).
///
/// Returns `None` if a date leaves chrono's representable range.
pub fn reconstruct_dates(
    anchor_date: NaiveDate,
    deltas: &[Option<u32>],
) -> Option<Vec<NaiveDate>> {
    let tenure: u64 = deltas.iter().flatten().map(|&d| u64::from(d)).sum();
    let mut dates: Vec<NaiveDate> = Vec::with_capacity(deltas.len());
    for delta in deltas {
        let date = match (dates.last(), delta) {
            (Some(previous), Some(days)) => previous.checked_add_days(Days::new(u64::from(*days)))?,
            _ => anchor_date.checked_sub_days(Days::new(tenure))?,
        };
        dates.push(date);
    }
    Some(dates)
}

/// Enrich raw orders into snapshot rows.
///
/// Output is sorted by `(user_id, order_number)`. Orders outside the
/// configured eval set are dropped, and so are their order lines.
pub fn enrich_orders(
    orders: Vec<RawOrder>,
    mut baskets: BasketIndex,
    config: &EnrichConfig,
) -> Result<Vec<EnrichedOrder>, EnrichError> {
    let total = orders.len();
    let mut by_user: BTreeMap<UserId, Vec<RawOrder>> = BTreeMap::new();
    for order in orders.into_iter().filter(|o| o.eval_set == config.eval_set) {
        by_user.entry(order.user_id).or_default().push(order);
    }
    debug!(
        kept = by_user.values().map(Vec::len).sum::<usize>(),
        total,
        eval_set = %config.eval_set,
        "Filtered orders"
    );

    let mut enriched = Vec::with_capacity(total);
    for (user_id, orders) in by_user {
        let user = UserOrders::build(user_id, orders)?;

        let deltas: Vec<Option<u32>> = user.orders.iter().map(|(_, delta)| *delta).collect();
        let dates = reconstruct_dates(config.anchor_date, &deltas).ok_or(
            EnrichError::DateOutOfRange {
                order_id: user.orders[0].0.order_id,
            },
        )?;

        for ((order, delta), date) in user.orders.into_iter().zip(dates) {
            let order_id = order.order_id;
            let datetime = date
                .and_hms_opt(u32::from(order.order_hour_of_day), 0, 0)
                .ok_or(EnrichError::HourOutOfRange {
                    order_id,
                    hour: order.order_hour_of_day,
                })?;

            let basket = baskets
                .take(order_id)
                .filter(|b| !b.is_empty())
                .ok_or(EnrichError::EmptyBasket { order_id })?;

            enriched.push(EnrichedOrder {
                order_id,
                user_id,
                eval_set: order.eval_set,
                order_number: order.order_number,
                order_dow: order.order_dow,
                order_hour_of_day: order.order_hour_of_day,
                days_since_prior_order: delta,
                basket_size: basket.len(),
                basket,
                total_days_on_platform: user.tenure,
                datetime,
                date,
            });
        }
    }

    if !baskets.is_empty() {
        debug!(
            orphaned = baskets.len(),
            "Ignored order lines of orders outside the kept set"
        );
    }
    info!(orders = enriched.len(), "Enriched orders");
    Ok(enriched)
}
