use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

pub mod farm {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FarmNew {
        pub farm_name: String,
        pub village: Option<String>,
        pub crop_type: Option<String>,
        pub season: Option<String>,
        /// Total area, acres by convention. Must be finite and >= 0.
        pub area: Option<f64>,
    }

    /// Partial update: absent fields keep their stored value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct FarmUpdate {
        pub farm_name: Option<String>,
        pub village: Option<String>,
        pub crop_type: Option<String>,
        pub season: Option<String>,
        pub area: Option<f64>,
        /// Removes the stored area; `area` is ignored when set.
        #[serde(default)]
        pub clear_area: bool,
    }

    /// Query string of `GET /farms`. Empty values impose no constraint.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct FarmList {
        /// Case-insensitive substring of the farm name or village.
        pub search: Option<String>,
        pub crop_category: Option<String>,
        pub season: Option<String>,
        /// `farm_name` (default), `created_at` or `total_area` (alias `area`).
        pub sort_by: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FarmView {
        pub id: String,
        pub farm_name: String,
        pub village: String,
        pub crop_type: String,
        pub crop_category: Option<String>,
        pub season: String,
        pub area: Option<f64>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FarmListResponse {
        pub farms: Vec<FarmView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
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

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub enum PaymentStatus {
        Paid,
        #[default]
        Pending,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        /// Must be >= 0.
        pub amount_minor: i64,
        pub category: ExpenseCategory,
        /// Defaults to `Pending`.
        pub payment_status: Option<PaymentStatus>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub date: DateTime<FixedOffset>,
        pub description: Option<String>,
    }

    /// Partial update: absent fields keep their stored value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub amount_minor: Option<i64>,
        pub category: Option<ExpenseCategory>,
        pub payment_status: Option<PaymentStatus>,
        pub date: Option<DateTime<FixedOffset>>,
        /// An empty string clears the description.
        pub description: Option<String>,
    }

    /// Query string of `GET /farms/{farm_id}/expenses`.
    ///
    /// Dates are `YYYY-MM-DD` and inclusive. Empty values impose no
    /// constraint.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseList {
        pub from_date: Option<String>,
        pub to_date: Option<String>,
        pub category: Option<String>,
        pub payment_status: Option<String>,
        /// `date` (default), `amount` or `category`.
        pub sort_by: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: String,
        pub farm_id: String,
        pub farm_name: String,
        pub amount_minor: i64,
        pub category: ExpenseCategory,
        pub payment_status: PaymentStatus,
        pub date: DateTime<Utc>,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTotal {
        pub category: ExpenseCategory,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseSummary {
        pub count: u64,
        pub total_minor: i64,
        pub paid_minor: i64,
        pub pending_minor: i64,
        pub by_category: Vec<CategoryTotal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
        pub summary: ExpenseSummary,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardStats {
        pub total_farms: u64,
        pub total_expenses_minor: i64,
        pub pending_amount_minor: i64,
        pub paid_amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardResponse {
        pub farms: Vec<farm::FarmView>,
        /// At most five, newest first.
        pub recent_expenses: Vec<expense::ExpenseView>,
        pub stats: DashboardStats,
    }
}

pub mod crops {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CropCategory {
        pub name: String,
        pub crops: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CropsResponse {
        pub categories: Vec<CropCategory>,
        pub seasons: Vec<String>,
    }
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
