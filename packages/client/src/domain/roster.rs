//! Participant roster: who is in the session, in join order.

use super::value_object::{SessionId, Username};

/// Presence record of a remote participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRecord {
    pub session_id: SessionId,
    pub username: Username,
    /// Display color token assigned by the host
    pub color: String,
}

impl ParticipantRecord {
    pub fn new(session_id: SessionId, username: Username, color: impl Into<String>) -> Self {
        Self {
            session_id,
            username,
            color: color.into(),
        }
    }
}

/// Exactly one record per session id, kept in join order.
///
/// The local user is never stored here.
#[derive(Debug, Clone, Default)]
pub struct ParticipantRoster {
    participants: Vec<ParticipantRecord>,
}

impl ParticipantRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `record.session_id`.
    ///
    /// A replaced record keeps its original join position. Returns `true` if
    /// an existing record was replaced.
    pub fn add_participant(&mut self, record: ParticipantRecord) -> bool {
        match self
            .participants
            .iter_mut()
            .find(|existing| existing.session_id == record.session_id)
        {
            Some(existing) => {
                *existing = record;
                true
            }
            None => {
                self.participants.push(record);
                false
            }
        }
    }

    /// Remove the record for `session_id`; no-op if absent
    pub fn remove_participant(&mut self, session_id: &SessionId) -> Option<ParticipantRecord> {
        let index = self
            .participants
            .iter()
            .position(|record| &record.session_id == session_id)?;
        Some(self.participants.remove(index))
    }

    /// All current records in join order
    pub fn list_participants(&self) -> &[ParticipantRecord] {
        &self.participants
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&ParticipantRecord> {
        self.participants
            .iter()
            .find(|record| &record.session_id == session_id)
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.get(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn clear(&mut self) {
        self.participants.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(session_id: &str, username: &str, color: &str) -> ParticipantRecord {
        ParticipantRecord::new(
            SessionId::try_from(session_id).unwrap(),
            Username::try_from(username).unwrap(),
            color,
        )
    }

    fn ids(roster: &ParticipantRoster) -> Vec<&str> {
        roster
            .list_participants()
            .iter()
            .map(|record| record.session_id.as_str())
            .collect()
    }

    #[test]
    fn test_list_participants_in_join_order() {
        // テスト項目: 参加者は参加順に列挙される
        // given (前提条件):
        let mut roster = ParticipantRoster::new();

        // when (操作):
        roster.add_participant(record("user2", "Bob", "blue"));
        roster.add_participant(record("user1", "Alice", "red"));
        roster.add_participant(record("user3", "Carol", "green"));

        // then (期待する結果):
        assert_eq!(ids(&roster), vec!["user2", "user1", "user3"]);
    }

    #[test]
    fn test_add_participant_replaces_existing_record_in_place() {
        // テスト項目: 同じ session id の追加は重複せず、元の位置で上書きされる
        // given (前提条件):
        let mut roster = ParticipantRoster::new();
        roster.add_participant(record("user1", "Alice", "red"));
        roster.add_participant(record("user2", "Bob", "blue"));

        // when (操作):
        let replaced = roster.add_participant(record("user1", "Alicia", "orange"));

        // then (期待する結果):
        assert!(replaced);
        assert_eq!(roster.len(), 2);
        assert_eq!(ids(&roster), vec!["user1", "user2"]);
        let alice = roster.get(&SessionId::try_from("user1").unwrap()).unwrap();
        assert_eq!(alice.username.as_str(), "Alicia");
        assert_eq!(alice.color, "orange");
    }

    #[test]
    fn test_remove_absent_participant_is_noop() {
        // テスト項目: 存在しない参加者の削除は何もしない
        // given (前提条件):
        let mut roster = ParticipantRoster::new();
        roster.add_participant(record("user1", "Alice", "red"));

        // when (操作):
        let removed = roster.remove_participant(&SessionId::try_from("ghost").unwrap());

        // then (期待する結果):
        assert!(removed.is_none());
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_join_leave_sequence_reflects_net_membership() {
        // テスト項目: 参加・退出の列の後、残っている参加者だけがちょうど 1 回ずつ列挙される
        // given (前提条件):
        let mut roster = ParticipantRoster::new();

        // when (操作):
        roster.add_participant(record("a", "Alice", "red"));
        roster.add_participant(record("b", "Bob", "blue"));
        roster.add_participant(record("c", "Carol", "green"));
        roster.remove_participant(&SessionId::try_from("b").unwrap());
        roster.add_participant(record("a", "Alice", "red"));
        roster.add_participant(record("b", "Bob", "blue"));
        roster.remove_participant(&SessionId::try_from("c").unwrap());

        // then (期待する結果):
        assert_eq!(ids(&roster), vec!["a", "b"]);
    }
}
