//! Pure filter / sort / reduce primitives over expense records. Every view
//! recomputes from the full collection through these; nothing is cached.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};

use crate::error::{PennyError, Result};
use crate::models::{Category, Expense, MonthKey};

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Inclusive date bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    /// Case-insensitive substring of the description or category name.
    pub query: Option<String>,
    /// `None` means all categories.
    pub category: Option<Category>,
    pub month: Option<MonthKey>,
    pub range: DateRange,
}

impl ExpenseFilter {
    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(q) = self.query.as_deref() {
            let q = q.to_lowercase();
            if !q.is_empty()
                && !expense.description.to_lowercase().contains(&q)
                && !expense.category.name().to_lowercase().contains(&q)
            {
                return false;
            }
        }
        if let Some(c) = self.category {
            if expense.category != c {
                return false;
            }
        }
        if let Some(m) = self.month {
            if !m.contains(expense.date) {
                return false;
            }
        }
        self.range.contains(expense.date)
    }

    pub fn is_empty(&self) -> bool {
        self.query.as_deref().map_or(true, str::is_empty)
            && self.category.is_none()
            && self.month.is_none()
            && self.range.is_open()
    }
}

/// Parse a category filter where `All` (any case) means no filter.
pub fn parse_category_filter(s: &str) -> Result<Option<Category>> {
    if s.trim().eq_ignore_ascii_case("all") {
        Ok(None)
    } else {
        s.parse().map(Some)
    }
}

/// Parse a month filter where `All` (any case) means no filter.
pub fn parse_month_filter(s: &str) -> Result<Option<MonthKey>> {
    if s.trim().eq_ignore_ascii_case("all") {
        Ok(None)
    } else {
        s.parse().map(Some)
    }
}

/// The records matching every predicate in `filter`, in their original order.
pub fn filter<'a>(records: &'a [Expense], filter: &ExpenseFilter) -> Vec<&'a Expense> {
    records.iter().filter(|e| filter.matches(e)).collect()
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    DateAsc,
    #[default]
    DateDesc,
    AmountAsc,
    AmountDesc,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::DateDesc => "Newest First",
            SortKey::DateAsc => "Oldest First",
            SortKey::AmountDesc => "Highest Amount",
            SortKey::AmountAsc => "Lowest Amount",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortKey::DateDesc => "date-desc",
            SortKey::DateAsc => "date-asc",
            SortKey::AmountDesc => "amount-desc",
            SortKey::AmountAsc => "amount-asc",
        };
        f.write_str(s)
    }
}

impl FromStr for SortKey {
    type Err = PennyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date-desc" | "newest" => Ok(SortKey::DateDesc),
            "date-asc" | "oldest" => Ok(SortKey::DateAsc),
            "amount-desc" | "highest" => Ok(SortKey::AmountDesc),
            "amount-asc" | "lowest" => Ok(SortKey::AmountAsc),
            _ => Err(PennyError::UnknownSort(s.to_string())),
        }
    }
}

/// Stable sort; ties keep their existing relative order.
pub fn sort<'a>(mut records: Vec<&'a Expense>, key: SortKey) -> Vec<&'a Expense> {
    match key {
        SortKey::DateAsc => records.sort_by(|a, b| a.date.cmp(&b.date)),
        SortKey::DateDesc => records.sort_by(|a, b| b.date.cmp(&a.date)),
        SortKey::AmountAsc => records.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
        SortKey::AmountDesc => records.sort_by(|a, b| b.amount.total_cmp(&a.amount)),
    }
    records
}

// ---------------------------------------------------------------------------
// Reductions
// ---------------------------------------------------------------------------

pub fn sum_amount<'a>(records: impl IntoIterator<Item = &'a Expense>) -> f64 {
    records.into_iter().map(|e| e.amount).sum()
}

pub fn average<'a>(records: impl IntoIterator<Item = &'a Expense>) -> f64 {
    let (total, count) = records
        .into_iter()
        .fold((0.0, 0usize), |(t, c), e| (t + e.amount, c + 1));
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
    pub count: usize,
}

/// Per-category totals, largest first. Categories with no records are
/// omitted; equal totals keep first-seen order.
pub fn by_category<'a>(records: impl IntoIterator<Item = &'a Expense>) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for e in records {
        match totals.iter_mut().find(|t| t.category == e.category) {
            Some(t) => {
                t.total += e.amount;
                t.count += 1;
            }
            None => totals.push(CategoryTotal {
                category: e.category,
                total: e.amount,
                count: 1,
            }),
        }
    }
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayTotal {
    pub date: NaiveDate,
    /// Short weekday name, e.g. "Mon".
    pub label: String,
    pub total: f64,
}

/// One bucket per calendar day in the `window_days` ending at `anchor`
/// (inclusive), oldest first. Days without expenses report zero.
pub fn by_day<'a>(
    records: impl IntoIterator<Item = &'a Expense>,
    window_days: u32,
    anchor: NaiveDate,
) -> Vec<DayTotal> {
    let mut days: Vec<DayTotal> = (0..window_days as u64)
        .rev()
        .filter_map(|back| anchor.checked_sub_days(Days::new(back)))
        .map(|date| DayTotal {
            date,
            label: date.format("%a").to_string(),
            total: 0.0,
        })
        .collect();
    let Some(first) = days.first().map(|d| d.date) else {
        return days;
    };
    for e in records {
        if e.date < first || e.date > anchor {
            continue;
        }
        if let Some(day) = days.iter_mut().find(|d| d.date == e.date) {
            day.total += e.amount;
        }
    }
    days
}

/// Percentage change from `previous` to `current`, rounded to one decimal.
/// Returns 0 when `previous` is 0: a display policy, since the true
/// percentage is undefined there.
pub fn month_over_month_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    let pct = (current - previous) / previous * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Share of `total` taken by `amount`, in percent; 0 when `total` is 0.
pub fn category_share(amount: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        amount / total * 100.0
    }
}

/// Distinct months present in `records`, newest first.
pub fn months<'a>(records: impl IntoIterator<Item = &'a Expense>) -> Vec<MonthKey> {
    let set: BTreeSet<MonthKey> = records.into_iter().map(|e| MonthKey::of(e.date)).collect();
    set.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_date, PaymentMethod};

    fn exp(id: i64, date: &str, category: Category, amount: f64, description: &str) -> Expense {
        Expense {
            id,
            date: parse_date(date).unwrap(),
            category,
            amount,
            description: description.to_string(),
            payment_method: PaymentMethod::Cash,
            receipt: None,
        }
    }

    fn sample() -> Vec<Expense> {
        vec![
            exp(5, "2024-02-28", Category::Food, 12.0, "Lunch with team"),
            exp(4, "2024-02-01", Category::Bills, 80.0, "Electricity"),
            exp(3, "2024-01-15", Category::Transport, 20.0, "Train pass"),
            exp(2, "2024-01-15", Category::Food, 20.0, "Groceries"),
            exp(1, "2023-12-31", Category::Entertainment, 15.5, ""),
        ]
    }

    fn ids(records: &[&Expense]) -> Vec<i64> {
        records.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_sum_and_by_category_example() {
        let records = vec![
            exp(1, "2024-01-01", Category::Food, 10.0, ""),
            exp(2, "2024-01-02", Category::Transport, 20.0, ""),
        ];
        assert_eq!(sum_amount(&records), 30.0);
        let cats = by_category(&records);
        assert_eq!(cats.len(), 2);
        assert_eq!(cats[0].category, Category::Transport);
        assert_eq!(cats[0].total, 20.0);
        assert_eq!(cats[1].category, Category::Food);
        assert_eq!(cats[1].total, 10.0);
    }

    #[test]
    fn test_empty_reductions_are_zero() {
        let records: Vec<Expense> = Vec::new();
        assert_eq!(sum_amount(&records), 0.0);
        assert_eq!(average(&records), 0.0);
        assert!(by_category(&records).is_empty());
        assert!(months(&records).is_empty());
    }

    #[test]
    fn test_no_predicates_is_identity() {
        let records = sample();
        let f = ExpenseFilter::default();
        assert!(f.is_empty());
        assert_eq!(ids(&filter(&records, &f)), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_month_filter_example() {
        let records = vec![
            exp(1, "2024-01-15", Category::Food, 1.0, ""),
            exp(2, "2024-02-01", Category::Food, 1.0, ""),
            exp(3, "2024-02-28", Category::Food, 1.0, ""),
        ];
        let f = ExpenseFilter {
            month: Some("2024-02".parse().unwrap()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&records, &f)), vec![2, 3]);
    }

    #[test]
    fn test_query_matches_description_or_category() {
        let records = sample();
        let by_desc = ExpenseFilter {
            query: Some("GROC".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&records, &by_desc)), vec![2]);

        let by_cat = ExpenseFilter {
            query: Some("food".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&records, &by_cat)), vec![5, 2]);

        let blank = ExpenseFilter {
            query: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter(&records, &blank).len(), records.len());
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let records = sample();
        let f = ExpenseFilter {
            query: Some("gro".to_string()),
            category: Some(Category::Food),
            month: Some("2024-01".parse().unwrap()),
            range: DateRange::default(),
        };
        assert_eq!(ids(&filter(&records, &f)), vec![2]);
    }

    #[test]
    fn test_date_range_is_inclusive_with_open_ends() {
        let records = sample();
        let both = ExpenseFilter {
            range: DateRange {
                start: Some(parse_date("2024-01-15").unwrap()),
                end: Some(parse_date("2024-02-01").unwrap()),
            },
            ..Default::default()
        };
        assert_eq!(ids(&filter(&records, &both)), vec![4, 3, 2]);

        let from_only = ExpenseFilter {
            range: DateRange {
                start: Some(parse_date("2024-02-01").unwrap()),
                end: None,
            },
            ..Default::default()
        };
        assert_eq!(ids(&filter(&records, &from_only)), vec![5, 4]);

        let to_only = ExpenseFilter {
            range: DateRange {
                start: None,
                end: Some(parse_date("2023-12-31").unwrap()),
            },
            ..Default::default()
        };
        assert_eq!(ids(&filter(&records, &to_only)), vec![1]);
    }

    #[test]
    fn test_filtered_sum_never_exceeds_total() {
        let records = sample();
        let total = sum_amount(&records);
        let filters = [
            ExpenseFilter {
                category: Some(Category::Food),
                ..Default::default()
            },
            ExpenseFilter {
                query: Some("zzz".to_string()),
                ..Default::default()
            },
            ExpenseFilter {
                month: Some("2024-01".parse().unwrap()),
                ..Default::default()
            },
            ExpenseFilter::default(),
        ];
        for f in &filters {
            assert!(sum_amount(filter(&records, f)) <= total);
        }
    }

    #[test]
    fn test_category_filter_all_is_noop() {
        assert_eq!(parse_category_filter("All").unwrap(), None);
        assert_eq!(parse_category_filter("health").unwrap(), Some(Category::Health));
        assert!(parse_category_filter("nope").is_err());
        assert_eq!(parse_month_filter("all").unwrap(), None);
    }

    #[test]
    fn test_sort_is_stable() {
        let records = sample();
        let sorted = sort(records.iter().collect(), SortKey::DateDesc);
        // ids 3 and 2 share 2024-01-15 and keep their store order
        assert_eq!(ids(&sorted), vec![5, 4, 3, 2, 1]);
        let asc = sort(records.iter().collect(), SortKey::DateAsc);
        assert_eq!(ids(&asc), vec![1, 3, 2, 4, 5]);
        let by_amount = sort(records.iter().collect(), SortKey::AmountDesc);
        assert_eq!(ids(&by_amount), vec![4, 3, 2, 1, 5]);
        let by_amount_asc = sort(records.iter().collect(), SortKey::AmountAsc);
        assert_eq!(ids(&by_amount_asc), vec![5, 1, 3, 2, 4]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let records = sample();
        for key in [
            SortKey::DateAsc,
            SortKey::DateDesc,
            SortKey::AmountAsc,
            SortKey::AmountDesc,
        ] {
            let once = sort(records.iter().collect(), key);
            let twice = sort(once.clone(), key);
            assert_eq!(ids(&once), ids(&twice));
        }
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("amount-asc".parse::<SortKey>().unwrap(), SortKey::AmountAsc);
        assert_eq!("Newest".parse::<SortKey>().unwrap(), SortKey::DateDesc);
        assert_eq!(SortKey::default(), SortKey::DateDesc);
        assert!("random".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_by_category_ties_keep_first_seen_order() {
        let records = sample();
        let jan: Vec<&Expense> = filter(
            &records,
            &ExpenseFilter {
                month: Some("2024-01".parse().unwrap()),
                ..Default::default()
            },
        );
        let cats = by_category(jan.iter().copied());
        assert_eq!(cats[0].category, Category::Transport);
        assert_eq!(cats[1].category, Category::Food);
    }

    #[test]
    fn test_by_day_fills_window() {
        let records = sample();
        let days = by_day(&records, 7, parse_date("2024-02-02").unwrap());
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, parse_date("2024-01-27").unwrap());
        assert_eq!(days[6].date, parse_date("2024-02-02").unwrap());
        assert_eq!(days[5].total, 80.0);
        assert_eq!(days[5].label, "Thu");
        let zero_days = days.iter().filter(|d| d.total == 0.0).count();
        assert_eq!(zero_days, 6);
    }

    #[test]
    fn test_by_day_sums_same_day() {
        let records = sample();
        let days = by_day(&records, 1, parse_date("2024-01-15").unwrap());
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].total, 40.0);
        assert!(by_day(&records, 0, parse_date("2024-01-15").unwrap()).is_empty());
    }

    #[test]
    fn test_month_over_month_change() {
        assert_eq!(month_over_month_change(0.0, 0.0), 0.0);
        assert_eq!(month_over_month_change(150.0, 100.0), 50.0);
        assert_eq!(month_over_month_change(50.0, 100.0), -50.0);
        assert_eq!(month_over_month_change(100.0, 0.0), 0.0);
        assert_eq!(month_over_month_change(10.0, 3.0), 233.3);
    }

    #[test]
    fn test_average() {
        let records = sample();
        assert!((average(&records) - 29.5).abs() < 1e-9);
    }

    #[test]
    fn test_months_newest_first() {
        let records = sample();
        let m: Vec<String> = months(&records).iter().map(|m| m.to_string()).collect();
        assert_eq!(m, vec!["2024-02", "2024-01", "2023-12"]);
    }

    #[test]
    fn test_category_share() {
        assert_eq!(category_share(25.0, 100.0), 25.0);
        assert_eq!(category_share(25.0, 0.0), 0.0);
    }
}
