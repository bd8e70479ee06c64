use colored::Colorize;

use crate::error::Result;
use crate::fmt::{bar, money, signed_pct};
use crate::reports;
use crate::settings::load_settings;

const BAR_WIDTH: usize = 24;

pub fn run() -> Result<()> {
    let store = super::open_store()?;
    if store.is_empty() {
        println!("No expenses yet. Start tracking with `penny add <amount>`.");
        return Ok(());
    }

    let today = chrono::Local::now().date_naive();
    let window = load_settings().week_window;
    let d = reports::get_dashboard(store.expenses(), today, window);

    println!("{}", d.current_month.label().bold());
    println!("  Current Month Total  {}", money(d.current_total).blue().bold());
    let change = signed_pct(d.change_pct);
    let change = if d.change_pct >= 0.0 { change.red() } else { change.green() };
    println!(
        "  vs Last Month        {change}  (last month: {})",
        money(d.previous_total)
    );

    println!("\n{}", "Spending by Category (This Month)".bold());
    if d.categories.is_empty() {
        println!("  No expenses this month");
    }
    for c in &d.categories {
        println!(
            "  {} {:<14} {:>12}  {} {:>5.1}%",
            c.total.category.icon(),
            c.total.category.name(),
            money(c.total.total),
            bar(c.pct, BAR_WIDTH).blue(),
            c.pct
        );
    }

    println!("\n{}", "Weekly Spending Trend".bold());
    for day in &d.week {
        let pct = day.total / d.max_day * 100.0;
        println!(
            "  {} {}  {}  {:>12}",
            day.label,
            day.date.format("%m-%d"),
            bar(pct, BAR_WIDTH).cyan(),
            money(day.total)
        );
    }
    Ok(())
}
