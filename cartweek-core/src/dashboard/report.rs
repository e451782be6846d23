//! Week-over-week comparison between two weekly snapshots

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::time_of_day::{TimeOfDay, bucket_counts};
use crate::model::{Dimensions, EnrichedOrder, OrderId, UserId};
use crate::partition::{WEEK_DAYS, WeekId};
use crate::rollup::{NewUser, Volume};

/// Bucket holding every department outside the top list
pub const OTHER_DEPARTMENTS: &str = "other";

/// Sizes of the ranked lists in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub top_departments: usize,
    pub top_aisles: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_departments: 6,
            top_aisles: 5,
        }
    }
}

/// A metric for the selected week next to the same metric one week earlier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricCard {
    pub current: f64,
    pub previous: f64,
    /// `(current - previous) / previous`; `None` when the previous value is zero
    pub relative_delta: Option<f64>,
}

impl MetricCard {
    pub fn new(current: f64, previous: f64) -> Self {
        let relative_delta = (previous != 0.0).then(|| (current - previous) / previous);
        Self {
            current,
            previous,
            relative_delta,
        }
    }

    fn counts(current: usize, previous: usize) -> Self {
        Self::new(current as f64, previous as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOrders {
    pub weekday: String,
    pub date: NaiveDate,
    pub previous_date: NaiveDate,
    pub current: u64,
    pub previous: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOfDayOrders {
    pub bucket: TimeOfDay,
    pub label: String,
    pub current: u64,
    pub previous: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentShare {
    pub department: String,
    pub occurrences: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AisleComparison {
    pub aisle: String,
    pub current: u64,
    pub previous: u64,
}

/// Orders and items of one calendar week ending on Sunday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySales {
    pub week_ending: NaiveDate,
    pub orders: u64,
    pub items: u64,
}

/// Everything the dashboard shows for one selected week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekReport {
    pub week: WeekId,
    pub previous_week: WeekId,
    pub users: MetricCard,
    pub orders: MetricCard,
    pub basket_size: MetricCard,
    pub days_between_orders: MetricCard,
    pub new_users: MetricCard,
    pub daily_orders: Vec<DailyOrders>,
    pub time_of_day: Vec<TimeOfDayOrders>,
    pub top_departments: Vec<DepartmentShare>,
    pub top_aisles: Vec<AisleComparison>,
    /// Share of this and last week's users that ordered this week, in percent.
    /// `None` when neither week has any orders.
    pub active_users_pct: Option<f64>,
    pub weekly_sales: Vec<WeeklySales>,
}

/// Tables a report is computed from
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    pub week: WeekId,
    pub previous_week: WeekId,
    pub current: &'a [EnrichedOrder],
    pub previous: &'a [EnrichedOrder],
    pub new_users: &'a [NewUser],
    pub volumes: &'a [Volume],
    pub dimensions: &'a Dimensions,
}

impl WeekReport {
    pub fn build(inputs: ReportInputs<'_>, config: &DashboardConfig) -> Self {
        let ReportInputs {
            week,
            previous_week,
            current,
            previous,
            new_users,
            volumes,
            dimensions,
        } = inputs;

        let current_users = user_set(current);
        let previous_users = user_set(previous);
        let current_occurrences = Occurrences::count(current, dimensions);
        let previous_occurrences = Occurrences::count(previous, dimensions);

        Self {
            week,
            previous_week,
            users: MetricCard::counts(current_users.len(), previous_users.len()),
            orders: MetricCard::counts(order_count(current), order_count(previous)),
            basket_size: MetricCard::new(mean_basket_size(current), mean_basket_size(previous)),
            days_between_orders: MetricCard::new(
                mean_days_between_orders(current),
                mean_days_between_orders(previous),
            ),
            new_users: MetricCard::counts(
                new_user_count(new_users, &week),
                new_user_count(new_users, &previous_week),
            ),
            daily_orders: daily_orders(&week, &previous_week, current, previous),
            time_of_day: time_of_day(current, previous),
            top_departments: top_departments(&current_occurrences, config.top_departments),
            top_aisles: top_aisles(
                &current_occurrences,
                &previous_occurrences,
                config.top_aisles,
            ),
            active_users_pct: active_users_pct(&current_users, &previous_users),
            weekly_sales: weekly_sales(volumes, week.end),
        }
    }
}

fn user_set(orders: &[EnrichedOrder]) -> HashSet<UserId> {
    orders.iter().map(|o| o.user_id).collect()
}

fn order_count(orders: &[EnrichedOrder]) -> usize {
    orders.iter().map(|o| o.order_id).collect::<HashSet<OrderId>>().len()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

fn mean_basket_size(orders: &[EnrichedOrder]) -> f64 {
    mean(orders.iter().map(|o| o.basket_size as f64))
}

/// First orders carry no delta and are left out
fn mean_days_between_orders(orders: &[EnrichedOrder]) -> f64 {
    mean(
        orders
            .iter()
            .filter_map(|o| o.days_since_prior_order)
            .map(f64::from),
    )
}

fn new_user_count(new_users: &[NewUser], week: &WeekId) -> usize {
    new_users.iter().filter(|u| week.contains(u.date)).count()
}

fn orders_by_date(orders: &[EnrichedOrder]) -> HashMap<NaiveDate, u64> {
    let mut counts = HashMap::new();
    for order in orders {
        *counts.entry(order.date).or_insert(0) += 1;
    }
    counts
}

/// Both weeks are seven days apart, so the n-th day of each falls on the same weekday
fn daily_orders(
    week: &WeekId,
    previous_week: &WeekId,
    current: &[EnrichedOrder],
    previous: &[EnrichedOrder],
) -> Vec<DailyOrders> {
    let current_counts = orders_by_date(current);
    let previous_counts = orders_by_date(previous);

    (0..WEEK_DAYS)
        .filter_map(|offset| {
            let date = week.first_day.checked_add_days(Days::new(offset))?;
            let previous_date = previous_week.first_day.checked_add_days(Days::new(offset))?;
            Some(DailyOrders {
                weekday: date.format("%A").to_string(),
                date,
                previous_date,
                current: current_counts.get(&date).copied().unwrap_or(0),
                previous: previous_counts.get(&previous_date).copied().unwrap_or(0),
            })
        })
        .collect()
}

fn time_of_day(current: &[EnrichedOrder], previous: &[EnrichedOrder]) -> Vec<TimeOfDayOrders> {
    let current_counts = bucket_counts(current.iter().map(|o| o.order_hour_of_day));
    let previous_counts = bucket_counts(previous.iter().map(|o| o.order_hour_of_day));

    TimeOfDay::ALL
        .iter()
        .zip(current_counts.iter().zip(previous_counts.iter()))
        .map(|(bucket, (&current, &previous))| TimeOfDayOrders {
            bucket: *bucket,
            label: bucket.label().to_string(),
            current,
            previous,
        })
        .collect()
}

/// Basket occurrences per aisle and department. Products missing from the
/// dimension tables are not counted.
#[derive(Debug, Default)]
struct Occurrences<'a> {
    departments: HashMap<&'a str, u64>,
    aisles: HashMap<&'a str, u64>,
}

impl<'a> Occurrences<'a> {
    fn count(orders: &[EnrichedOrder], dimensions: &'a Dimensions) -> Self {
        let mut occurrences = Self::default();
        let mut unmatched = 0u64;
        for product in orders.iter().flat_map(|o| o.basket.products()) {
            match dimensions.placement(*product) {
                Some(placement) => {
                    *occurrences.departments.entry(placement.department).or_insert(0) += 1;
                    *occurrences.aisles.entry(placement.aisle).or_insert(0) += 1;
                }
                None => unmatched += 1,
            }
        }
        if unmatched > 0 {
            debug!(unmatched, "Skipped products without aisle or department");
        }
        occurrences
    }
}

/// Largest count first, ties by name
fn ranked<'a>(counts: &HashMap<&'a str, u64>) -> Vec<(&'a str, u64)> {
    let mut ranked: Vec<(&str, u64)> = counts.iter().map(|(k, v)| (*k, *v)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

fn top_departments(occurrences: &Occurrences<'_>, limit: usize) -> Vec<DepartmentShare> {
    let ranked = ranked(&occurrences.departments);
    let split = limit.min(ranked.len());
    let (top, rest) = ranked.split_at(split);

    let mut shares: Vec<DepartmentShare> = top
        .iter()
        .map(|(department, occurrences)| DepartmentShare {
            department: department.to_string(),
            occurrences: *occurrences,
        })
        .collect();
    if !rest.is_empty() {
        shares.push(DepartmentShare {
            department: OTHER_DEPARTMENTS.to_string(),
            occurrences: rest.iter().map(|(_, count)| count).sum(),
        });
    }
    shares
}

/// Aisles missing from the previous week are dropped before ranking
fn top_aisles(
    current: &Occurrences<'_>,
    previous: &Occurrences<'_>,
    limit: usize,
) -> Vec<AisleComparison> {
    ranked(&current.aisles)
        .into_iter()
        .filter_map(|(aisle, count)| {
            previous.aisles.get(aisle).map(|prev| AisleComparison {
                aisle: aisle.to_string(),
                current: count,
                previous: *prev,
            })
        })
        .take(limit)
        .collect()
}

fn active_users_pct(current: &HashSet<UserId>, previous: &HashSet<UserId>) -> Option<f64> {
    let union = current.union(previous).count();
    (union > 0).then(|| 100.0 * current.len() as f64 / union as f64)
}

/// Sunday on or after `date`
fn sunday_ending(date: NaiveDate) -> NaiveDate {
    let days_left = 6 - date.weekday().num_days_from_monday();
    date.checked_add_days(Days::new(u64::from(days_left)))
        .unwrap_or(date)
}

fn weekly_sales(volumes: &[Volume], until: NaiveDate) -> Vec<WeeklySales> {
    let mut weeks: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for volume in volumes.iter().filter(|v| v.date <= until) {
        let entry = weeks.entry(sunday_ending(volume.date)).or_default();
        entry.0 += volume.orders;
        entry.1 += volume.items;
    }
    weeks
        .into_iter()
        .map(|(week_ending, (orders, items))| WeeklySales {
            week_ending,
            orders,
            items,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Aisle, Basket, Department, EvalSet, Product};
    use crate::partition::WeekWindow;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, d).unwrap()
    }

    fn order(
        order_id: u32,
        user_id: u32,
        day: NaiveDate,
        hour: u8,
        basket: Vec<u32>,
    ) -> EnrichedOrder {
        let basket = Basket::new(basket);
        EnrichedOrder {
            order_id,
            user_id,
            eval_set: EvalSet::Prior,
            order_number: 2,
            order_dow: 0,
            order_hour_of_day: hour,
            days_since_prior_order: Some(order_id % 4),
            basket_size: basket.len(),
            basket,
            total_days_on_platform: 30,
            datetime: day.and_hms_opt(u32::from(hour), 0, 0).unwrap(),
            date: day,
        }
    }

    fn dimensions() -> Dimensions {
        let departments = [
            "produce",
            "dairy eggs",
            "snacks",
            "bakery",
            "frozen",
            "pantry",
            "beverages",
            "household",
        ];
        let products = (1..=8)
            .map(|id| Product {
                product_id: id,
                product_name: format!("product {id}"),
                aisle_id: id,
                department_id: id,
            })
            .collect();
        let aisles = (1..=8)
            .map(|id| Aisle {
                aisle_id: id,
                aisle: format!("aisle {id}"),
            })
            .collect();
        let departments = departments
            .iter()
            .zip(1..)
            .map(|(name, id)| Department {
                department_id: id,
                department: name.to_string(),
            })
            .collect();
        Dimensions::new(products, aisles, departments)
    }

    // Selected week: 2023-09-18 ..= 2023-09-24, previous: 2023-09-11 ..= 2023-09-17
    fn weeks() -> (WeekId, WeekId) {
        let window = WeekWindow::ending(date(9, 24));
        (window.id(), window.previous().id())
    }

    #[test]
    fn metric_card_relative_delta() {
        let card = MetricCard::new(15.0, 10.0);
        assert_eq!(card.relative_delta, Some(0.5));
        assert_eq!(MetricCard::new(3.0, 0.0).relative_delta, None);
    }

    #[test]
    fn counts_users_orders_and_means() {
        let (week, previous_week) = weeks();
        let current = vec![
            order(1, 1, date(9, 18), 8, vec![1, 2]),
            order(2, 1, date(9, 20), 8, vec![1, 2, 3, 4]),
            order(3, 2, date(9, 24), 8, vec![5, 6, 7]),
        ];
        let previous = vec![order(4, 3, date(9, 12), 8, vec![1])];
        let dims = dimensions();

        let report = WeekReport::build(
            ReportInputs {
                week,
                previous_week,
                current: &current,
                previous: &previous,
                new_users: &[],
                volumes: &[],
                dimensions: &dims,
            },
            &DashboardConfig::default(),
        );

        assert_eq!(report.users, MetricCard::new(2.0, 1.0));
        assert_eq!(report.orders.current, 3.0);
        assert_eq!(report.basket_size.current, 3.0);
        assert_eq!(report.basket_size.previous, 1.0);
        // deltas are order_id % 4: 1, 2, 3
        assert_eq!(report.days_between_orders.current, 2.0);
        assert_eq!(report.days_between_orders.previous, 0.0);
    }

    #[test]
    fn days_between_orders_skips_first_orders() {
        let mut first = order(1, 1, date(9, 18), 8, vec![1]);
        first.days_since_prior_order = None;
        let second = order(3, 1, date(9, 21), 8, vec![1]);
        assert_eq!(mean_days_between_orders(&[first, second]), 3.0);
    }

    #[test]
    fn new_users_counted_inside_each_week() {
        let (week, previous_week) = weeks();
        let new_users = vec![
            NewUser {
                user_id: 1,
                date: date(9, 10),
            },
            NewUser {
                user_id: 2,
                date: date(9, 11),
            },
            NewUser {
                user_id: 3,
                date: date(9, 17),
            },
            NewUser {
                user_id: 4,
                date: date(9, 18),
            },
            NewUser {
                user_id: 5,
                date: date(9, 24),
            },
            NewUser {
                user_id: 6,
                date: date(9, 25),
            },
        ];
        assert_eq!(new_user_count(&new_users, &week), 2);
        assert_eq!(new_user_count(&new_users, &previous_week), 2);
    }

    #[test]
    fn daily_orders_aligns_weekdays() {
        let (week, previous_week) = weeks();
        let current = vec![
            order(1, 1, date(9, 18), 8, vec![1]),
            order(2, 2, date(9, 18), 8, vec![1]),
            order(3, 3, date(9, 24), 8, vec![1]),
        ];
        let previous = vec![order(4, 1, date(9, 11), 8, vec![1])];

        let daily = daily_orders(&week, &previous_week, &current, &previous);

        assert_eq!(daily.len(), 7);
        assert_eq!(daily[0].weekday, "Monday");
        assert_eq!(daily[0].date, date(9, 18));
        assert_eq!(daily[0].previous_date, date(9, 11));
        assert_eq!((daily[0].current, daily[0].previous), (2, 1));
        assert_eq!(daily[6].weekday, "Sunday");
        assert_eq!(daily[6].current, 1);
    }

    #[test]
    fn time_of_day_lists_every_bucket() {
        let current = vec![
            order(1, 1, date(9, 18), 3, vec![1]),
            order(2, 1, date(9, 18), 11, vec![1]),
            order(3, 1, date(9, 18), 22, vec![1]),
        ];
        let buckets = time_of_day(&current, &[]);
        assert_eq!(buckets.len(), 6);
        assert_eq!(buckets[0].bucket, TimeOfDay::Night);
        assert_eq!(buckets[0].current, 1);
        assert_eq!(buckets[2].label, "morning");
        assert_eq!(buckets[5].current, 1);
        assert!(buckets.iter().all(|b| b.previous == 0));
    }

    #[test]
    fn top_departments_adds_other_bucket() {
        let dims = dimensions();
        // product n appears n times
        let basket: Vec<u32> = (1..=8).flat_map(|n| std::iter::repeat_n(n, n as usize)).collect();
        let orders = vec![order(1, 1, date(9, 18), 8, basket)];
        let occurrences = Occurrences::count(&orders, &dims);

        let top = top_departments(&occurrences, 6);

        assert_eq!(top.len(), 7);
        assert_eq!(top[0].department, "household");
        assert_eq!(top[0].occurrences, 8);
        assert_eq!(top[6].department, OTHER_DEPARTMENTS);
        assert_eq!(top[6].occurrences, 1 + 2);
        let total: u64 = top.iter().map(|d| d.occurrences).sum();
        assert_eq!(total, (1..=8).sum::<u64>());
    }

    #[test]
    fn no_other_bucket_when_everything_fits() {
        let dims = dimensions();
        let orders = vec![order(1, 1, date(9, 18), 8, vec![1, 2])];
        let top = top_departments(&Occurrences::count(&orders, &dims), 6);
        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|d| d.department != OTHER_DEPARTMENTS));
    }

    #[test]
    fn unknown_products_are_not_counted() {
        let dims = dimensions();
        let orders = vec![order(1, 1, date(9, 18), 8, vec![1, 999])];
        let occurrences = Occurrences::count(&orders, &dims);
        assert_eq!(occurrences.departments.values().sum::<u64>(), 1);
    }

    #[test]
    fn top_aisles_require_both_weeks() {
        let dims = dimensions();
        let current = vec![order(1, 1, date(9, 18), 8, vec![1, 1, 1, 2, 2, 3])];
        let previous = vec![order(2, 1, date(9, 11), 8, vec![1, 3, 3])];

        let top = top_aisles(
            &Occurrences::count(&current, &dims),
            &Occurrences::count(&previous, &dims),
            5,
        );

        assert_eq!(
            top,
            vec![
                AisleComparison {
                    aisle: "aisle 1".into(),
                    current: 3,
                    previous: 1
                },
                AisleComparison {
                    aisle: "aisle 3".into(),
                    current: 1,
                    previous: 2
                },
            ]
        );
    }

    #[test]
    fn active_users_pct_bounds() {
        let this: HashSet<UserId> = [1, 2, 3].into();
        let last: HashSet<UserId> = [2, 3].into();
        assert_eq!(active_users_pct(&this, &last), Some(100.0));

        let last: HashSet<UserId> = [3, 4, 5].into();
        assert_eq!(active_users_pct(&this, &last), Some(60.0));

        let empty = HashSet::new();
        assert_eq!(active_users_pct(&empty, &last), Some(0.0));
        assert_eq!(active_users_pct(&empty, &empty), None);
    }

    #[test]
    fn weekly_sales_group_by_sunday() {
        let volumes = vec![
            Volume {
                date: date(9, 16),
                orders: 1,
                items: 10,
            },
            Volume {
                date: date(9, 17),
                orders: 2,
                items: 20,
            },
            Volume {
                date: date(9, 18),
                orders: 3,
                items: 30,
            },
            Volume {
                date: date(9, 24),
                orders: 4,
                items: 40,
            },
            Volume {
                date: date(9, 25),
                orders: 5,
                items: 50,
            },
        ];

        let sales = weekly_sales(&volumes, date(9, 24));

        assert_eq!(
            sales,
            vec![
                WeeklySales {
                    week_ending: date(9, 17),
                    orders: 3,
                    items: 30,
                },
                WeeklySales {
                    week_ending: date(9, 24),
                    orders: 7,
                    items: 70,
                },
            ]
        );
    }

    #[test]
    fn sunday_ending_is_identity_on_sunday() {
        assert_eq!(sunday_ending(date(10, 1)), date(10, 1));
        assert_eq!(sunday_ending(date(9, 25)), date(10, 1));
    }
}
