use uuid::Uuid;

use crate::features::requests::models::RequestStatus;

/// Something that happened to a purchase request that people should hear about
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    /// A manager or admin decided the request; the owner is told
    StatusChanged {
        request_id: Uuid,
        title: String,
        owner_id: Uuid,
        actor_id: Uuid,
        status: RequestStatus,
        reason: Option<String>,
    },
    /// A participant added a note; staff and the assigned manager are told
    NoteAdded {
        request_id: Uuid,
        title: String,
        manager_id: Uuid,
        author_id: Uuid,
        body: String,
    },
}

impl NotificationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            NotificationEvent::StatusChanged { .. } => "status_changed",
            NotificationEvent::NoteAdded { .. } => "note_added",
        }
    }
}
