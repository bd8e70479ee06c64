use crate::aggregate;
use crate::db::DB_FILE;
use crate::error::Result;
use crate::fmt::{format_bytes, money};
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join(DB_FILE);

    let user = if settings.user_name.is_empty() {
        "(not set)"
    } else {
        &settings.user_name
    };
    println!("User:       {user}");
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `penny init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db_path)?.len();
    println!("DB size:    {}", format_bytes(size));

    let store = super::open_store()?;
    let receipts: Vec<usize> = store
        .expenses()
        .iter()
        .filter_map(|e| e.receipt.as_ref().map(String::len))
        .collect();
    let months = aggregate::months(store.expenses());

    println!();
    println!("Expenses:   {}", store.len());
    println!("Total:      {}", money(aggregate::sum_amount(store.expenses())));
    println!(
        "Receipts:   {} ({})",
        receipts.len(),
        format_bytes(receipts.iter().sum::<usize>() as u64)
    );
    match (months.last(), months.first()) {
        (Some(oldest), Some(newest)) => {
            println!("Months:     {} ({oldest} to {newest})", months.len())
        }
        _ => println!("Months:     0"),
    }
    Ok(())
}
