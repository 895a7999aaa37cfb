//! Manager assignment for new requests.

use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::users::models::Role;

/// An active admin or manager considered for assignment
#[derive(Debug, Clone, FromRow)]
pub struct ApproverCandidate {
    pub id: Uuid,
    pub role: Role,
    pub manager_limit: Option<Decimal>,
}

/// Pick the approver for a request of `amount`.
///
/// The manager with the smallest limit still covering the amount wins, lowest
/// id on ties. Managers without a limit never qualify. With no qualifying
/// manager the admin is assigned (lowest id if there are several).
pub fn select_approver(amount: Decimal, candidates: &[ApproverCandidate]) -> Result<Uuid> {
    let manager = candidates
        .iter()
        .filter(|c| c.role == Role::Manager)
        .filter_map(|c| c.manager_limit.map(|limit| (limit, c.id)))
        .filter(|(limit, _)| *limit >= amount)
        .min();

    if let Some((_, id)) = manager {
        return Ok(id);
    }

    candidates
        .iter()
        .filter(|c| c.role == Role::Admin)
        .map(|c| c.id)
        .min()
        .ok_or_else(|| {
            AppError::Conflict("No manager or admin is available to approve this request".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(limit: i64) -> ApproverCandidate {
        ApproverCandidate {
            id: Uuid::now_v7(),
            role: Role::Manager,
            manager_limit: Some(Decimal::from(limit)),
        }
    }

    fn admin() -> ApproverCandidate {
        ApproverCandidate {
            id: Uuid::now_v7(),
            role: Role::Admin,
            manager_limit: None,
        }
    }

    #[test]
    fn test_smallest_sufficient_limit_wins() {
        let m1 = manager(2000);
        let m2 = manager(5000);
        let m3 = manager(20000);
        let candidates = vec![m3.clone(), m1, m2.clone(), admin()];

        assert_eq!(select_approver(Decimal::from(3000), &candidates).unwrap(), m2.id);
    }

    #[test]
    fn test_limit_equal_to_amount_qualifies() {
        let m = manager(3000);
        let candidates = vec![manager(10000), m.clone()];

        assert_eq!(select_approver(Decimal::from(3000), &candidates).unwrap(), m.id);
    }

    #[test]
    fn test_tie_broken_by_lowest_id() {
        let a = manager(5000);
        let b = manager(5000);
        let expected = a.id.min(b.id);

        assert_eq!(
            select_approver(Decimal::from(100), &[b, a]).unwrap(),
            expected
        );
    }

    #[test]
    fn test_falls_back_to_admin() {
        let admin = admin();
        let no_limit = ApproverCandidate {
            id: Uuid::now_v7(),
            role: Role::Manager,
            manager_limit: None,
        };
        let candidates = vec![manager(1000), no_limit, admin.clone()];

        assert_eq!(
            select_approver(Decimal::from(50000), &candidates).unwrap(),
            admin.id
        );
    }

    #[test]
    fn test_no_approver_available() {
        let result = select_approver(Decimal::from(50000), &[manager(1000)]);
        assert!(matches!(result, Err(AppError::Conflict(_))));

        assert!(select_approver(Decimal::from(1), &[]).is_err());
    }
}
