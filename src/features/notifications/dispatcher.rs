use std::collections::HashSet;
use std::sync::Arc;

use minijinja::context;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::events::NotificationEvent;
use crate::features::users::models::UserContact;
use crate::features::users::UserService;
use crate::modules::mailer::{EmailMessage, Mailer};
use crate::shared::prompts::render_template;

/// Turns events into emails off the request path
#[derive(Clone)]
pub struct NotificationDispatcher {
    users: Arc<UserService>,
    mailer: Arc<dyn Mailer>,
    app_public_url: String,
}

impl NotificationDispatcher {
    pub fn new(users: Arc<UserService>, mailer: Arc<dyn Mailer>, app_public_url: String) -> Self {
        Self {
            users,
            mailer,
            app_public_url: app_public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Handle the event on a background task. Never fails.
    pub fn emit(&self, event: NotificationEvent) {
        let this = self.clone();

        tokio::spawn(async move {
            let name = event.name();
            if let Err(e) = this.handle(event).await {
                tracing::warn!("Notification '{}' failed: {}", name, e);
            }
        });
    }

    async fn handle(&self, event: NotificationEvent) -> Result<()> {
        match event {
            NotificationEvent::StatusChanged {
                request_id,
                title,
                owner_id,
                actor_id,
                status,
                reason,
            } => {
                let owner = self.contact(owner_id).await?;
                let actor_name = match self.users.find_contact(actor_id).await? {
                    Some(actor) => actor.full_name,
                    None => "an administrator".to_string(),
                };

                let body = render_template(
                    "emails/status_changed.jinja",
                    context! {
                        recipient_name => owner.full_name,
                        title => title,
                        status => status.as_str(),
                        actor_name => actor_name,
                        reason => reason,
                        link => self.request_link(request_id),
                    },
                )
                .map_err(|e| AppError::Internal(e.to_string()))?;

                let message = EmailMessage {
                    to: owner.email,
                    subject: format!("Your purchase request was {}", status),
                    body,
                };
                self.mailer.send(&message).await
            }
            NotificationEvent::NoteAdded {
                request_id,
                title,
                manager_id,
                author_id,
                body,
            } => {
                let staff = self.users.list_staff_contacts().await?;
                let manager = self.users.find_contact(manager_id).await?;
                let author_name = match self.users.find_contact(author_id).await? {
                    Some(author) => author.full_name,
                    None => "A participant".to_string(),
                };

                for recipient in note_recipients(staff, manager, author_id) {
                    let text = render_template(
                        "emails/note_added.jinja",
                        context! {
                            recipient_name => &recipient.full_name,
                            author_name => &author_name,
                            title => &title,
                            body => &body,
                            link => self.request_link(request_id),
                        },
                    )
                    .map_err(|e| AppError::Internal(e.to_string()))?;

                    let message = EmailMessage {
                        to: recipient.email,
                        subject: format!("New note on \"{}\"", title),
                        body: text,
                    };

                    // One bad address must not stop the rest
                    if let Err(e) = self.mailer.send(&message).await {
                        tracing::warn!("Failed to notify {} about a note: {}", message.to, e);
                    }
                }

                Ok(())
            }
        }
    }

    async fn contact(&self, id: Uuid) -> Result<UserContact> {
        self.users
            .find_contact(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    fn request_link(&self, request_id: Uuid) -> String {
        format!("{}/requests/{}", self.app_public_url, request_id)
    }
}

/// Admins, managers and the assigned manager, each once, never the author
pub fn note_recipients(
    staff: Vec<UserContact>,
    assigned_manager: Option<UserContact>,
    author_id: Uuid,
) -> Vec<UserContact> {
    let mut seen = HashSet::new();

    staff
        .into_iter()
        .chain(assigned_manager)
        .filter(|c| c.id != author_id)
        .filter(|c| seen.insert(c.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::Role;

    fn contact(role: Role) -> UserContact {
        let id = Uuid::now_v7();
        UserContact {
            id,
            email: format!("{}@example.com", id),
            full_name: format!("{} {}", role, id),
            role,
        }
    }

    #[test]
    fn test_author_is_excluded() {
        let admin = contact(Role::Admin);
        let manager = contact(Role::Manager);

        let recipients = note_recipients(vec![admin.clone(), manager.clone()], None, manager.id);

        assert_eq!(recipients, vec![admin]);
    }

    #[test]
    fn test_assigned_manager_is_not_duplicated() {
        let admin = contact(Role::Admin);
        let manager = contact(Role::Manager);
        let author = contact(Role::Employee);

        let recipients = note_recipients(
            vec![admin.clone(), manager.clone()],
            Some(manager.clone()),
            author.id,
        );

        assert_eq!(recipients, vec![admin, manager]);
    }

    #[test]
    fn test_assigned_admin_outside_staff_list_is_added() {
        let manager = contact(Role::Manager);
        let assigned = contact(Role::Admin);
        let author = contact(Role::Employee);

        let recipients = note_recipients(vec![manager.clone()], Some(assigned.clone()), author.id);

        assert_eq!(recipients, vec![manager, assigned]);
    }
}
