//! The module contains `Expense`, its category and payment status, and the
//! expense document schema.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, Money, ResultEngine,
    documents::{self, Document, NumberField, Timestamp},
    farms::Farm,
    util::normalize_optional_text,
};

/// Fixed set of expense categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Seeds,
    Fertilizer,
    Pesticides,
    Labour,
    Machinery,
    Irrigation,
    Transport,
    Equipment,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 9] = [
        Self::Seeds,
        Self::Fertilizer,
        Self::Pesticides,
        Self::Labour,
        Self::Machinery,
        Self::Irrigation,
        Self::Transport,
        Self::Equipment,
        Self::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Seeds => "Seeds",
            Self::Fertilizer => "Fertilizer",
            Self::Pesticides => "Pesticides",
            Self::Labour => "Labour",
            Self::Machinery => "Machinery",
            Self::Irrigation => "Irrigation",
            Self::Transport => "Transport",
            Self::Equipment => "Equipment",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExpenseCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| EngineError::InvalidValue(format!("unknown category: {trimmed}")))
    }
}

/// Payment status of an expense.
///
/// Stored values are binary: `Paid` (any casing) is paid, everything else,
/// including a missing field, counts as pending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    #[default]
    Pending,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Pending => "Pending",
        }
    }

    pub(crate) fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some(value) if value.trim().eq_ignore_ascii_case("paid") => Self::Paid,
            _ => Self::Pending,
        }
    }

    pub fn is_paid(self) -> bool {
        self == Self::Paid
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = EngineError;

    /// Strict parsing for user input (filters, forms).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paid" => Ok(Self::Paid),
            "pending" => Ok(Self::Pending),
            other => Err(EngineError::InvalidValue(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

/// A monetary record attributed to one farm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub farm_id: String,
    /// Name of the owning farm, attached when the expense is read.
    pub farm_name: String,
    pub amount: Money,
    pub category: ExpenseCategory,
    pub payment_status: PaymentStatus,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Validates a stored document into an expense of `farm`.
    ///
    /// Missing or malformed `amount`, `date` or `category` reject the record.
    pub fn from_document(document: Document, farm: &Farm) -> ResultEngine<Self> {
        let stored: ExpenseDocument = documents::decode(&document)?;
        let reject =
            |what: &str| EngineError::InvalidRecord(format!("expense {}: {what}", document.id));

        let amount = stored
            .amount
            .as_ref()
            .and_then(NumberField::to_f64)
            .ok_or_else(|| reject("missing or non-numeric amount"))?;
        let amount = Money::try_from_major(amount).map_err(|err| reject(&err.to_string()))?;

        let date = stored
            .date
            .and_then(Timestamp::to_utc)
            .ok_or_else(|| reject("missing or invalid date"))?;

        let category = stored
            .category
            .as_deref()
            .ok_or_else(|| reject("missing category"))?
            .parse::<ExpenseCategory>()
            .map_err(|err| reject(&err.to_string()))?;

        let created_at = stored
            .created_at
            .and_then(Timestamp::to_utc)
            .unwrap_or(document.created_at);

        Ok(Self {
            id: document.id,
            farm_id: farm.id.clone(),
            farm_name: farm.name.clone(),
            amount,
            category,
            payment_status: PaymentStatus::from_stored(stored.payment_status.as_deref()),
            date,
            description: normalize_optional_text(stored.description.as_deref()),
            created_at,
        })
    }
}

/// Fields required to record an expense.
#[derive(Clone, Debug, PartialEq)]
pub struct NewExpense {
    pub amount: Money,
    pub category: ExpenseCategory,
    pub payment_status: PaymentStatus,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
}

/// Partial expense update; `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpenseUpdate {
    pub amount: Option<Money>,
    pub category: Option<ExpenseCategory>,
    pub payment_status: Option<PaymentStatus>,
    pub date: Option<DateTime<Utc>>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
}

/// Stored shape of an expense document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExpenseDocument {
    #[serde(default)]
    pub(crate) amount: Option<NumberField>,
    #[serde(default)]
    pub(crate) category: Option<String>,
    #[serde(default)]
    pub(crate) payment_status: Option<String>,
    #[serde(default)]
    pub(crate) date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) created_at: Option<Timestamp>,
}

impl ExpenseDocument {
    pub(crate) fn new(input: &NewExpense, created_at: DateTime<Utc>) -> ResultEngine<Self> {
        let amount = Money::try_from_minor(input.amount.minor())?;
        Ok(Self {
            amount: Some(NumberField::Number(amount.to_major())),
            category: Some(input.category.label().to_string()),
            payment_status: Some(input.payment_status.as_str().to_string()),
            date: Some(Timestamp::Rfc3339(input.date)),
            description: normalize_optional_text(input.description.as_deref()),
            created_at: Some(Timestamp::Rfc3339(created_at)),
        })
    }

    pub(crate) fn from_expense(expense: &Expense) -> Self {
        Self {
            amount: Some(NumberField::Number(expense.amount.to_major())),
            category: Some(expense.category.label().to_string()),
            payment_status: Some(expense.payment_status.as_str().to_string()),
            date: Some(Timestamp::Rfc3339(expense.date)),
            description: expense.description.clone(),
            created_at: Some(Timestamp::Rfc3339(expense.created_at)),
        }
    }
}
