use chrono::NaiveDate;

use crate::aggregate::{self, CategoryTotal, DayTotal, ExpenseFilter, SortKey};
use crate::models::{Expense, MonthKey};

pub const DEFAULT_WEEK_WINDOW: u32 = 7;

// ---------------------------------------------------------------------------
// Dashboard summary
// ---------------------------------------------------------------------------

pub struct CategoryShare {
    pub total: CategoryTotal,
    pub pct: f64,
}

pub struct DashboardSummary {
    pub current_month: MonthKey,
    pub current_total: f64,
    pub previous_total: f64,
    pub change_pct: f64,
    pub categories: Vec<CategoryShare>,
    pub week: Vec<DayTotal>,
    /// Largest daily total in `week`, floored at 1 for bar scaling.
    pub max_day: f64,
    pub expense_count: usize,
}

pub fn get_dashboard(records: &[Expense], today: NaiveDate, window_days: u32) -> DashboardSummary {
    let current_month = MonthKey::of(today);
    let previous_month = current_month.previous();

    let current: Vec<&Expense> = aggregate::filter(
        records,
        &ExpenseFilter {
            month: Some(current_month),
            ..Default::default()
        },
    );
    let previous: Vec<&Expense> = aggregate::filter(
        records,
        &ExpenseFilter {
            month: Some(previous_month),
            ..Default::default()
        },
    );

    let current_total = aggregate::sum_amount(current.iter().copied());
    let previous_total = aggregate::sum_amount(previous.iter().copied());

    let categories = aggregate::by_category(current.iter().copied())
        .into_iter()
        .map(|total| CategoryShare {
            pct: aggregate::category_share(total.total, current_total),
            total,
        })
        .collect();

    let week = aggregate::by_day(records, window_days, today);
    let max_day = week.iter().map(|d| d.total).fold(1.0, f64::max);

    DashboardSummary {
        current_month,
        current_total,
        previous_total,
        change_pct: aggregate::month_over_month_change(current_total, previous_total),
        categories,
        week,
        max_day,
        expense_count: records.len(),
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

pub struct HistoryReport<'a> {
    pub rows: Vec<&'a Expense>,
    pub total: f64,
    pub count: usize,
}

pub fn get_history<'a>(
    records: &'a [Expense],
    filter: &ExpenseFilter,
    sort: SortKey,
) -> HistoryReport<'a> {
    let rows = aggregate::sort(aggregate::filter(records, filter), sort);
    let total = aggregate::sum_amount(rows.iter().copied());
    let count = rows.len();
    HistoryReport { rows, total, count }
}

// ---------------------------------------------------------------------------
// Filtered report
// ---------------------------------------------------------------------------

pub struct ReportSummary<'a> {
    /// Matching expenses in store order.
    pub rows: Vec<&'a Expense>,
    pub total: f64,
    pub count: usize,
    pub average: f64,
    pub by_category: Vec<CategoryTotal>,
}

pub fn get_report<'a>(records: &'a [Expense], filter: &ExpenseFilter) -> ReportSummary<'a> {
    let rows = aggregate::filter(records, filter);
    ReportSummary {
        total: aggregate::sum_amount(rows.iter().copied()),
        count: rows.len(),
        average: aggregate::average(rows.iter().copied()),
        by_category: aggregate::by_category(rows.iter().copied()),
        rows,
    }
}

/// Human-readable description of the active filters; empty when none are set.
pub fn filter_description(filter: &ExpenseFilter) -> String {
    if filter.is_empty() {
        return String::new();
    }
    let mut parts = Vec::new();
    match (filter.range.start, filter.range.end) {
        (Some(start), Some(end)) => parts.push(format!(
            "From {} to {}",
            crate::fmt::long_date(start),
            crate::fmt::long_date(end)
        )),
        (Some(start), None) => parts.push(format!("From {}", crate::fmt::long_date(start))),
        (None, Some(end)) => parts.push(format!("Until {}", crate::fmt::long_date(end))),
        (None, None) => {}
    }
    if let Some(month) = filter.month {
        parts.push(format!("Month: {}", month.label()));
    }
    if let Some(category) = filter.category {
        parts.push(format!("Category: {category}"));
    }
    if let Some(q) = filter.query.as_deref().filter(|q| !q.is_empty()) {
        parts.push(format!("Search: \"{q}\""));
    }
    parts.join(" ")
}
