use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::PennyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Bills,
    Entertainment,
    Health,
    Shopping,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Transport,
        Category::Bills,
        Category::Entertainment,
        Category::Health,
        Category::Shopping,
        Category::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Bills => "Bills",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health",
            Category::Shopping => "Shopping",
            Category::Other => "Other",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Food => "🍔",
            Category::Transport => "🚗",
            Category::Bills => "📄",
            Category::Entertainment => "🎬",
            Category::Health => "💊",
            Category::Shopping => "🛍️",
            Category::Other => "📌",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = PennyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| PennyError::UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Debit Card")]
    DebitCard,
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::Upi,
        PaymentMethod::BankTransfer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::DebitCard => "Debit Card",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::BankTransfer => "Bank Transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PaymentMethod {
    type Err = PennyError;

    /// Accepts the display name in any case, with `-` or `_` in place of spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(['-', '_'], " ");
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| PennyError::UnknownPaymentMethod(s.to_string()))
    }
}

/// One logged expense. Field names match the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub date: NaiveDate,
    pub category: Category,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    pub payment_method: PaymentMethod,
    /// Inline `data:<mime>;base64,...` payload.
    #[serde(default)]
    pub receipt: Option<String>,
}

impl Expense {
    /// Description if present, otherwise the category name.
    pub fn title(&self) -> &str {
        if self.description.trim().is_empty() {
            self.category.name()
        } else {
            &self.description
        }
    }

    pub fn has_receipt(&self) -> bool {
        self.receipt.is_some()
    }
}

/// Input for `ExpenseStore::add`, before validation and id assignment.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub category: Category,
    pub amount: f64,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub receipt: Option<String>,
}

/// A calendar month, `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// "January 2024"
    pub fn label(self) -> String {
        match self.first_day() {
            Some(d) => d.format("%B %Y").to_string(),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = PennyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PennyError::InvalidMonth(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        if y.len() != 4 || m.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }
}

pub fn parse_date(s: &str) -> crate::error::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| PennyError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!("food".parse::<Category>().unwrap(), Category::Food);
        assert_eq!(" Entertainment ".parse::<Category>().unwrap(), Category::Entertainment);
        assert!("Groceries".parse::<Category>().is_err());
    }

    #[test]
    fn test_payment_method_parse_variants() {
        assert_eq!("credit card".parse::<PaymentMethod>().unwrap(), PaymentMethod::CreditCard);
        assert_eq!("bank-transfer".parse::<PaymentMethod>().unwrap(), PaymentMethod::BankTransfer);
        assert_eq!("upi".parse::<PaymentMethod>().unwrap(), PaymentMethod::Upi);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_expense_json_field_names() {
        let e = Expense {
            id: 1700000000000,
            date: parse_date("2024-01-05").unwrap(),
            category: Category::Transport,
            amount: 12.5,
            description: "Bus".to_string(),
            payment_method: PaymentMethod::DebitCard,
            receipt: None,
        };
        let v: serde_json::Value = serde_json::to_value(&e).unwrap();
        assert_eq!(v["date"], "2024-01-05");
        assert_eq!(v["category"], "Transport");
        assert_eq!(v["paymentMethod"], "Debit Card");
        assert!(v["receipt"].is_null());
    }

    #[test]
    fn test_expense_reads_saved_browser_data() {
        let json = r#"{"date":"2024-02-01","category":"Bills","amount":99.99,
            "description":"","paymentMethod":"UPI","receipt":null,"id":1706745600000}"#;
        let e: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(e.id, 1706745600000);
        assert_eq!(e.payment_method, PaymentMethod::Upi);
        assert_eq!(e.title(), "Bills");
        assert!(!e.has_receipt());
    }

    #[test]
    fn test_month_key_parse_and_previous() {
        let m: MonthKey = "2024-01".parse().unwrap();
        assert_eq!(m.previous().to_string(), "2023-12");
        assert_eq!(m.label(), "January 2024");
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("2024/01".parse::<MonthKey>().is_err());
        assert!("24-01".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_month_key_contains() {
        let m: MonthKey = "2024-02".parse().unwrap();
        assert!(m.contains(parse_date("2024-02-29").unwrap()));
        assert!(!m.contains(parse_date("2024-03-01").unwrap()));
    }
}
