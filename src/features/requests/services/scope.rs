//! Role scoping and filters shared by every request listing path.
//!
//! Queries built here assume `requests r` joined to `users o` (owner) and
//! `users m` (assigned manager), with a `WHERE` clause already open.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::requests::dtos::SortDirection;
use crate::features::requests::models::RequestStatus;
use crate::features::users::models::Role;

/// FROM clause every scoped query starts from
pub const SCOPED_FROM: &str = " FROM requests r \
     JOIN users o ON o.id = r.user_id \
     JOIN users m ON m.id = r.manager_id \
     WHERE TRUE";

/// Columns matching `PurchaseRequestView`
pub const VIEW_COLUMNS: &str = "r.id, r.title, r.description, r.reason, r.url, r.amount, \
     r.status, r.ai_score, r.ai_score_generated_at, r.user_id, r.manager_id, \
     r.created_at, r.updated_at, \
     o.full_name AS owner_name, o.email AS owner_email, \
     m.full_name AS manager_name, m.email AS manager_email";

/// Which requests a caller may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestScope {
    All,
    AssignedTo(Uuid),
    OwnedBy(Uuid),
}

impl RequestScope {
    pub fn for_user(user: &AuthenticatedUser) -> Self {
        match user.role {
            Role::Admin => RequestScope::All,
            Role::Manager => RequestScope::AssignedTo(user.id),
            Role::Employee => RequestScope::OwnedBy(user.id),
        }
    }

    pub fn push_predicate(&self, query: &mut QueryBuilder<'_, Postgres>) {
        match *self {
            RequestScope::All => {}
            RequestScope::AssignedTo(manager_id) => {
                query.push(" AND r.manager_id = ").push_bind(manager_id);
            }
            RequestScope::OwnedBy(owner_id) => {
                query.push(" AND r.user_id = ").push_bind(owner_id);
            }
        }
    }
}

/// Optional filters accepted by the list and export endpoints
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub search: Option<String>,
}

impl RequestFilter {
    pub fn push_predicates(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Some(status) = self.status {
            query.push(" AND r.status = ").push_bind(status);
        }
        if let Some(min) = self.min_amount {
            query.push(" AND r.amount >= ").push_bind(min);
        }
        if let Some(max) = self.max_amount {
            query.push(" AND r.amount <= ").push_bind(max);
        }
        if let Some(from) = self.from_date {
            query
                .push(" AND r.created_at >= ")
                .push_bind(from.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()));
        }
        if let Some(to) = self.to_date.and_then(|d| d.checked_add_days(Days::new(1))) {
            query
                .push(" AND r.created_at < ")
                .push_bind(to.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()));
        }
        if let Some(pattern) = self.search_pattern() {
            query
                .push(" AND (o.full_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR o.email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    /// `%term%` with LIKE wildcards in the term escaped
    fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty())?;

        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");

        Some(format!("%{}%", escaped))
    }
}

/// Sort fields for requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestSortBy {
    Amount,
    #[default]
    CreatedAt,
    Status,
    /// Assigned manager's name
    Assignee,
}

impl RequestSortBy {
    pub fn as_sql(&self) -> &'static str {
        match self {
            RequestSortBy::Amount => "r.amount",
            RequestSortBy::CreatedAt => "r.created_at",
            RequestSortBy::Status => "r.status",
            RequestSortBy::Assignee => "m.full_name",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSort {
    pub by: RequestSortBy,
    pub direction: SortDirection,
}

impl RequestSort {
    pub fn push_order_by(&self, query: &mut QueryBuilder<'_, Postgres>) {
        query.push(format!(
            " ORDER BY {} {}, r.id {}",
            self.by.as_sql(),
            self.direction.as_sql(),
            self.direction.as_sql()
        ));
    }
}

/// Start a `SELECT <columns>` over the scoped, filtered request set
pub fn scoped_query<'a>(
    columns: &str,
    scope: RequestScope,
    filter: &RequestFilter,
) -> QueryBuilder<'a, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {}{}", columns, SCOPED_FROM));
    scope.push_predicate(&mut query);
    filter.push_predicates(&mut query);
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::create_user;

    #[test]
    fn test_scope_follows_role() {
        let admin = create_user(Role::Admin);
        let manager = create_user(Role::Manager);
        let employee = create_user(Role::Employee);

        assert_eq!(RequestScope::for_user(&admin), RequestScope::All);
        assert_eq!(
            RequestScope::for_user(&manager),
            RequestScope::AssignedTo(manager.id)
        );
        assert_eq!(
            RequestScope::for_user(&employee),
            RequestScope::OwnedBy(employee.id)
        );
    }

    #[test]
    fn test_scope_predicates() {
        let id = Uuid::now_v7();

        let query = scoped_query("COUNT(*)", RequestScope::All, &RequestFilter::default());
        assert!(query.sql().ends_with("WHERE TRUE"));

        let query = scoped_query(
            "COUNT(*)",
            RequestScope::AssignedTo(id),
            &RequestFilter::default(),
        );
        assert!(query.sql().ends_with("WHERE TRUE AND r.manager_id = $1"));

        let query = scoped_query("COUNT(*)", RequestScope::OwnedBy(id), &RequestFilter::default());
        assert!(query.sql().ends_with("WHERE TRUE AND r.user_id = $1"));
    }

    #[test]
    fn test_filters_bind_in_order() {
        let filter = RequestFilter {
            status: Some(RequestStatus::Waiting),
            min_amount: Some(Decimal::from(100)),
            max_amount: Some(Decimal::from(5000)),
            from_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            to_date: NaiveDate::from_ymd_opt(2025, 1, 31),
            search: Some("kowal".to_string()),
        };

        let query = scoped_query(VIEW_COLUMNS, RequestScope::OwnedBy(Uuid::now_v7()), &filter);
        let sql = query.sql();

        assert!(sql.contains("r.user_id = $1"));
        assert!(sql.contains("r.status = $2"));
        assert!(sql.contains("r.amount >= $3"));
        assert!(sql.contains("r.amount <= $4"));
        assert!(sql.contains("r.created_at >= $5"));
        assert!(sql.contains("r.created_at < $6"));
        assert!(sql.contains("(o.full_name ILIKE $7 OR o.email ILIKE $8)"));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filter = RequestFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(filter.search_pattern().is_none());
    }

    #[test]
    fn test_search_escapes_wildcards() {
        let filter = RequestFilter {
            search: Some("50%_off".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.search_pattern().unwrap(), "%50\\%\\_off%");
    }

    #[test]
    fn test_order_by_assignee() {
        let mut query = scoped_query("r.id", RequestScope::All, &RequestFilter::default());
        RequestSort {
            by: RequestSortBy::Assignee,
            direction: SortDirection::Asc,
        }
        .push_order_by(&mut query);

        assert!(query.sql().ends_with("ORDER BY m.full_name ASC, r.id ASC"));
    }

    #[test]
    fn test_sort_by_parses_snake_case() {
        let by: RequestSortBy = serde_json::from_str("\"created_at\"").unwrap();
        assert_eq!(by, RequestSortBy::CreatedAt);
        let by: RequestSortBy = serde_json::from_str("\"assignee\"").unwrap();
        assert_eq!(by, RequestSortBy::Assignee);
    }
}
