use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::features::requests::dtos::SortDirection;
use crate::features::requests::models::RequestStatus;
use crate::features::requests::services::scope::{RequestFilter, RequestSort, RequestSortBy};

/// Export filters; the list filters without paging
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQueryParams {
    /// Filter by status
    pub status: Option<RequestStatus>,
    /// Minimum amount (inclusive)
    #[param(value_type = Option<String>)]
    pub min_amount: Option<Decimal>,
    /// Maximum amount (inclusive)
    #[param(value_type = Option<String>)]
    pub max_amount: Option<Decimal>,
    /// Created on or after (YYYY-MM-DD)
    pub from_date: Option<NaiveDate>,
    /// Created on or before (YYYY-MM-DD)
    pub to_date: Option<NaiveDate>,
    /// Search in the owner's name or email
    pub search: Option<String>,
    /// Sort by field (default: created_at)
    #[serde(default)]
    pub sort_by: RequestSortBy,
    /// Sort direction (default: desc)
    #[serde(default)]
    pub sort: SortDirection,
}

impl ExportQueryParams {
    pub fn filter(&self) -> RequestFilter {
        RequestFilter {
            status: self.status,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            from_date: self.from_date,
            to_date: self.to_date,
            search: self.search.clone(),
        }
    }

    pub fn sort(&self) -> RequestSort {
        RequestSort {
            by: self.sort_by,
            direction: self.sort,
        }
    }
}
