pub mod attachment_service;

pub use attachment_service::{list_for_request, AttachmentService, UploadedFile};
