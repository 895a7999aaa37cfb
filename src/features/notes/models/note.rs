use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a note on a purchase request
#[derive(Debug, Clone, FromRow)]
pub struct Note {
    pub id: Uuid,
    pub request_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Note joined with its author's name
#[derive(Debug, Clone, FromRow)]
pub struct NoteView {
    #[sqlx(flatten)]
    pub note: Note,
    pub author_name: String,
}

/// Where a per-author note write lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MyNoteWrite {
    /// Overwrite this existing note
    Rewrite(Uuid),
    /// The author has no note on the request yet
    Create,
}

impl MyNoteWrite {
    /// Pick the author's most recent note among `notes`, ties broken by the later id
    pub fn choose(notes: &[Note], author_id: Uuid) -> Self {
        notes
            .iter()
            .filter(|n| n.author_id == author_id)
            .max_by_key(|n| (n.created_at, n.id))
            .map_or(Self::Create, |n| Self::Rewrite(n.id))
    }

    pub fn creates(&self) -> bool {
        matches!(self, Self::Create)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn note(author_id: Uuid, minutes_ago: i64) -> Note {
        Note {
            id: Uuid::now_v7(),
            request_id: Uuid::nil(),
            author_id,
            body: "Looks fine".to_string(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            updated_at: None,
        }
    }

    #[test]
    fn test_first_note_is_created() {
        let author = Uuid::now_v7();
        let others = vec![note(Uuid::now_v7(), 5), note(Uuid::now_v7(), 1)];

        let write = MyNoteWrite::choose(&others, author);
        assert_eq!(write, MyNoteWrite::Create);
        assert!(write.creates());
        assert_eq!(MyNoteWrite::choose(&[], author), MyNoteWrite::Create);
    }

    #[test]
    fn test_thread_notes_rewrite_only_the_latest() {
        let author = Uuid::now_v7();
        let older = note(author, 30);
        let latest = note(author, 2);
        let someone_else = note(Uuid::now_v7(), 0);
        let thread = vec![latest.clone(), someone_else, older];

        let write = MyNoteWrite::choose(&thread, author);
        assert_eq!(write, MyNoteWrite::Rewrite(latest.id));
        assert!(!write.creates());
    }

    #[test]
    fn test_same_timestamp_prefers_later_id() {
        let author = Uuid::now_v7();
        let first = note(author, 1);
        let mut second = note(author, 1);
        second.created_at = first.created_at;

        assert_eq!(
            MyNoteWrite::choose(&[second.clone(), first], author),
            MyNoteWrite::Rewrite(second.id)
        );
    }
}
