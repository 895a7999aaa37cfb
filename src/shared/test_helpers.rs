#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;
#[cfg(test)]
use crate::features::users::models::Role;

#[cfg(test)]
use fake::{faker::internet::en::SafeEmail, Fake};
#[cfg(test)]
use uuid::Uuid;

#[cfg(test)]
pub fn create_user(role: Role) -> AuthenticatedUser {
    AuthenticatedUser {
        id: Uuid::now_v7(),
        email: SafeEmail().fake(),
        role,
    }
}
