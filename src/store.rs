use rusqlite::Connection;

use crate::db::{get_item, set_item};
use crate::error::{PennyError, Result};
use crate::models::{Expense, NewExpense};

/// Storage key the whole expense collection lives under.
pub const STORAGE_KEY: &str = "expenses";

/// Where an unparseable collection is kept before the next write replaces it.
pub const UNREADABLE_KEY: &str = "expenses.unreadable";

/// The expense collection, newest insertion first, plus the connection it
/// persists to. Every mutation rewrites the whole collection.
pub struct ExpenseStore {
    conn: Connection,
    expenses: Vec<Expense>,
}

impl ExpenseStore {
    /// Load the persisted collection. Absent or malformed data yields an
    /// empty store.
    pub fn load(conn: Connection) -> Result<Self> {
        let expenses = match get_item(&conn, STORAGE_KEY)? {
            Some(blob) => match serde_json::from_str::<Vec<Expense>>(&blob) {
                Ok(expenses) => expenses,
                Err(e) => {
                    set_item(&conn, UNREADABLE_KEY, &blob)?;
                    tracing::warn!(
                        "stored expenses are unreadable, starting empty \
                         (original kept under key {UNREADABLE_KEY}): {e}"
                    );
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        tracing::debug!(count = expenses.len(), "loaded expenses");
        Ok(Self { conn, expenses })
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    /// The `n` most recently added expenses.
    pub fn recent(&self, n: usize) -> &[Expense] {
        &self.expenses[..n.min(self.expenses.len())]
    }

    pub fn add(&mut self, new: NewExpense) -> Result<Expense> {
        if !new.amount.is_finite() || new.amount <= 0.0 {
            return Err(PennyError::InvalidAmount(new.amount.to_string()));
        }
        let expense = Expense {
            id: self.next_id(chrono::Utc::now().timestamp_millis()),
            date: new.date,
            category: new.category,
            amount: new.amount,
            description: new.description,
            payment_method: new.payment_method,
            receipt: new.receipt,
        };
        self.expenses.insert(0, expense.clone());
        if let Err(e) = self.persist() {
            self.expenses.remove(0);
            return Err(e);
        }
        tracing::info!(id = expense.id, amount = expense.amount, "added expense");
        Ok(expense)
    }

    /// Remove the expense with `id`. Returns whether one was removed; an
    /// unknown id is not an error.
    pub fn remove(&mut self, id: i64) -> Result<bool> {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        let removed = self.expenses.len() < before;
        self.persist()?;
        if removed {
            tracing::info!(id, "removed expense");
        }
        Ok(removed)
    }

    /// Ids are creation timestamps in milliseconds, bumped past the current
    /// maximum when two records land in the same millisecond.
    fn next_id(&self, now_millis: i64) -> i64 {
        match self.expenses.iter().map(|e| e.id).max() {
            Some(max) if now_millis <= max => max + 1,
            _ => now_millis,
        }
    }

    fn persist(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.expenses)?;
        set_item(&self.conn, STORAGE_KEY, &blob)?;
        tracing::debug!(count = self.expenses.len(), bytes = blob.len(), "persisted expenses");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::get_connection;
    use crate::models::{parse_date, Category, PaymentMethod};

    fn test_db() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        (dir, path)
    }

    fn new_expense(date: &str, category: Category, amount: f64) -> NewExpense {
        NewExpense {
            date: parse_date(date).unwrap(),
            category,
            amount,
            description: String::new(),
            payment_method: PaymentMethod::Cash,
            receipt: None,
        }
    }

    #[test]
    fn test_load_empty_when_absent() {
        let (_dir, path) = test_db();
        let store = ExpenseStore::load(get_connection(&path).unwrap()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_empty_when_malformed() {
        let (_dir, path) = test_db();
        let conn = get_connection(&path).unwrap();
        set_item(&conn, STORAGE_KEY, "{not json").unwrap();
        let store = ExpenseStore::load(conn).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_blob_survives_next_write() {
        let (_dir, path) = test_db();
        let conn = get_connection(&path).unwrap();
        set_item(&conn, STORAGE_KEY, "{not json").unwrap();
        let mut store = ExpenseStore::load(conn).unwrap();
        store.add(new_expense("2024-01-01", Category::Food, 4.0)).unwrap();

        let conn = get_connection(&path).unwrap();
        assert_eq!(
            get_item(&conn, UNREADABLE_KEY).unwrap().as_deref(),
            Some("{not json")
        );
        assert_eq!(ExpenseStore::load(conn).unwrap().len(), 1);
    }

    #[test]
    fn test_add_prepends_and_persists() {
        let (_dir, path) = test_db();
        let mut store = ExpenseStore::load(get_connection(&path).unwrap()).unwrap();
        let first = store.add(new_expense("2024-01-01", Category::Food, 10.0)).unwrap();
        let second = store.add(new_expense("2024-01-02", Category::Bills, 20.0)).unwrap();
        assert_eq!(store.expenses()[0].id, second.id);
        assert_eq!(store.expenses()[1].id, first.id);
        assert!(second.id > first.id);

        let reloaded = ExpenseStore::load(get_connection(&path).unwrap()).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.expenses()[0].id, second.id);
    }

    #[test]
    fn test_add_then_load_round_trips_fields() {
        let (_dir, path) = test_db();
        let mut store = ExpenseStore::load(get_connection(&path).unwrap()).unwrap();
        let added = store
            .add(NewExpense {
                date: parse_date("2024-03-09").unwrap(),
                category: Category::Health,
                amount: 42.75,
                description: "Pharmacy".to_string(),
                payment_method: PaymentMethod::CreditCard,
                receipt: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
            })
            .unwrap();
        let reloaded = ExpenseStore::load(get_connection(&path).unwrap()).unwrap();
        assert_eq!(reloaded.get(added.id), Some(&added));
    }

    #[test]
    fn test_add_rejects_non_positive_amount() {
        let (_dir, path) = test_db();
        let mut store = ExpenseStore::load(get_connection(&path).unwrap()).unwrap();
        store.add(new_expense("2024-01-01", Category::Food, 10.0)).unwrap();
        for bad in [-5.0, 0.0, f64::NAN, f64::INFINITY] {
            let err = store.add(new_expense("2024-01-01", Category::Food, bad));
            assert!(matches!(err, Err(PennyError::InvalidAmount(_))));
        }
        assert_eq!(store.len(), 1);
        let reloaded = ExpenseStore::load(get_connection(&path).unwrap()).unwrap();
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_remove_twice_is_idempotent() {
        let (_dir, path) = test_db();
        let mut store = ExpenseStore::load(get_connection(&path).unwrap()).unwrap();
        let a = store.add(new_expense("2024-01-01", Category::Food, 10.0)).unwrap();
        store.add(new_expense("2024-01-02", Category::Food, 5.0)).unwrap();
        assert!(store.remove(a.id).unwrap());
        assert!(!store.remove(a.id).unwrap());
        assert_eq!(store.len(), 1);
        let reloaded = ExpenseStore::load(get_connection(&path).unwrap()).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.get(a.id).is_none());
    }

    #[test]
    fn test_next_id_bumps_on_collision() {
        let (_dir, path) = test_db();
        let mut store = ExpenseStore::load(get_connection(&path).unwrap()).unwrap();
        let a = store.add(new_expense("2024-01-01", Category::Food, 1.0)).unwrap();
        assert_eq!(store.next_id(a.id), a.id + 1);
        assert_eq!(store.next_id(a.id - 100), a.id + 1);
        assert_eq!(store.next_id(a.id + 100), a.id + 100);
    }

    #[test]
    fn test_recent_caps_at_len() {
        let (_dir, path) = test_db();
        let mut store = ExpenseStore::load(get_connection(&path).unwrap()).unwrap();
        for i in 1..=3 {
            store.add(new_expense("2024-01-01", Category::Food, i as f64)).unwrap();
        }
        assert_eq!(store.recent(5).len(), 3);
        assert_eq!(store.recent(2)[0].amount, 3.0);
    }
}
