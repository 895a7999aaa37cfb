//! Authorization predicates for purchase requests and their notes and attachments.
//!
//! Every predicate failure is `Forbidden`; resolving the identity itself (and
//! failing with `Unauthorized`) happens earlier in the auth middleware.

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::models::Role;

/// The two users attached to a request besides admins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestParticipants {
    pub owner_id: Uuid,
    pub manager_id: Uuid,
}

/// Owner, assigned manager, or any admin
pub fn is_participant(user: &AuthenticatedUser, participants: &RequestParticipants) -> bool {
    user.role == Role::Admin
        || user.id == participants.owner_id
        || user.id == participants.manager_id
}

pub fn ensure_participant(
    user: &AuthenticatedUser,
    participants: &RequestParticipants,
) -> Result<()> {
    if is_participant(user, participants) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not have access to this request".to_string(),
        ))
    }
}

/// Only the owning employee may edit a request or attach files to it
pub fn ensure_owner(user: &AuthenticatedUser, participants: &RequestParticipants) -> Result<()> {
    if user.role == Role::Employee && user.id == participants.owner_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the employee who created this request can modify it".to_string(),
        ))
    }
}

/// Admins may decide any request; managers only the ones assigned to them
pub fn ensure_can_change_status(
    user: &AuthenticatedUser,
    participants: &RequestParticipants,
) -> Result<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Manager if user.id == participants.manager_id => Ok(()),
        Role::Manager => Err(AppError::Forbidden(
            "This request is assigned to another manager".to_string(),
        )),
        Role::Employee => Err(AppError::Forbidden(
            "Manager or admin access required".to_string(),
        )),
    }
}

/// Editing or deleting a note takes both participation in the request and authorship
pub fn ensure_note_author(
    user: &AuthenticatedUser,
    participants: &RequestParticipants,
    author_id: Uuid,
) -> Result<()> {
    ensure_participant(user, participants)?;

    if user.id != author_id {
        return Err(AppError::Forbidden(
            "Only the author can change this note".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::create_user;

    fn participants_for(owner: &AuthenticatedUser, manager: &AuthenticatedUser) -> RequestParticipants {
        RequestParticipants {
            owner_id: owner.id,
            manager_id: manager.id,
        }
    }

    #[test]
    fn test_participants_include_owner_manager_and_admin() {
        let owner = create_user(Role::Employee);
        let manager = create_user(Role::Manager);
        let admin = create_user(Role::Admin);
        let p = participants_for(&owner, &manager);

        assert!(is_participant(&owner, &p));
        assert!(is_participant(&manager, &p));
        assert!(is_participant(&admin, &p));
    }

    #[test]
    fn test_strangers_are_forbidden() {
        let owner = create_user(Role::Employee);
        let manager = create_user(Role::Manager);
        let p = participants_for(&owner, &manager);

        let other_employee = create_user(Role::Employee);
        let other_manager = create_user(Role::Manager);

        assert!(matches!(
            ensure_participant(&other_employee, &p),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_participant(&other_manager, &p),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_only_assigned_manager_or_admin_changes_status() {
        let owner = create_user(Role::Employee);
        let manager = create_user(Role::Manager);
        let p = participants_for(&owner, &manager);

        assert!(ensure_can_change_status(&manager, &p).is_ok());
        assert!(ensure_can_change_status(&create_user(Role::Admin), &p).is_ok());
        assert!(matches!(
            ensure_can_change_status(&create_user(Role::Manager), &p),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_can_change_status(&owner, &p),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_owner_check_is_employee_only() {
        let owner = create_user(Role::Employee);
        let manager = create_user(Role::Manager);
        let p = participants_for(&owner, &manager);

        assert!(ensure_owner(&owner, &p).is_ok());
        assert!(ensure_owner(&manager, &p).is_err());
        assert!(ensure_owner(&create_user(Role::Admin), &p).is_err());
    }

    #[test]
    fn test_note_author_requires_both_checks() {
        let owner = create_user(Role::Employee);
        let manager = create_user(Role::Manager);
        let p = participants_for(&owner, &manager);

        // Participant but not the author
        assert!(matches!(
            ensure_note_author(&manager, &p, owner.id),
            Err(AppError::Forbidden(_))
        ));

        // Author but no longer a participant (e.g. note on someone else's request)
        let outsider = create_user(Role::Employee);
        assert!(matches!(
            ensure_note_author(&outsider, &p, outsider.id),
            Err(AppError::Forbidden(_))
        ));

        assert!(ensure_note_author(&owner, &p, owner.id).is_ok());
        assert!(ensure_note_author(&create_user(Role::Admin), &p, owner.id).is_err());
    }
}
