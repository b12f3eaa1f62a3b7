use api_types::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{app, run_with_listener, spawn_with_listener};

mod crops;
mod dashboard;
mod expenses;
mod farms;
mod server;
mod user;

pub mod types {
    pub mod farm {
        pub use api_types::farm::{FarmList, FarmListResponse, FarmNew, FarmUpdate, FarmView};
    }

    pub mod expense {
        pub use api_types::expense::{
            CategoryTotal, ExpenseCategory, ExpenseList, ExpenseListResponse, ExpenseNew,
            ExpenseSummary, ExpenseUpdate, ExpenseView, PaymentStatus,
        };
    }

    pub mod dashboard {
        pub use api_types::dashboard::{DashboardResponse, DashboardStats};
    }

    pub mod crops {
        pub use api_types::crops::{CropCategory, CropsResponse};
    }
}

pub const DASHBOARD_FETCH_FAILED: &str = "Failed to load dashboard data";
pub const FARMS_FETCH_FAILED: &str = "Failed to load farms";
pub const EXPENSES_FETCH_FAILED: &str = "Failed to load expenses";

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
    /// A read that failed as a whole; the client only sees `banner`.
    Fetch {
        source: EngineError,
        banner: &'static str,
    },
}

impl ServerError {
    /// Wraps a read failure into its user-facing banner.
    pub fn fetch(banner: &'static str) -> impl FnOnce(EngineError) -> ServerError {
        move |source| ServerError::Fetch { source, banner }
    }
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Database(_) | EngineError::InvalidRecord(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::InvalidName(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidId(_)
        | EngineError::InvalidValue(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::InvalidRecord(reason) => {
            tracing::error!("invalid stored record: {reason}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Fetch { source, banner } => {
                tracing::error!("{banner}: {source}");
                (status_for_engine_error(&source), banner.to_string())
            }
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
