//! Host-side queue of join requests awaiting a decision.

use super::value_object::{SessionId, Username};

/// A guest's unresolved request to join the local host's session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub session_id: SessionId,
    pub username: Username,
}

impl PendingRequest {
    pub fn new(session_id: SessionId, username: Username) -> Self {
        Self {
            session_id,
            username,
        }
    }

    /// Text shown to the host for this request
    pub fn prompt(&self) -> String {
        format!("{} wants to join.", self.username)
    }
}

/// Decision taken by the host on a pending request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinDecision {
    pub session_id: SessionId,
    pub approved: bool,
}

/// At most one outstanding request per session id, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct PendingRequestQueue {
    requests: Vec<PendingRequest>,
}

impl PendingRequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a request, replacing any outstanding one from the same session id.
    ///
    /// Returns `true` if an existing request was replaced.
    pub fn on_user_request(&mut self, request: PendingRequest) -> bool {
        match self
            .requests
            .iter_mut()
            .find(|existing| existing.session_id == request.session_id)
        {
            Some(existing) => {
                *existing = request;
                true
            }
            None => {
                self.requests.push(request);
                false
            }
        }
    }

    /// Remove the request and decide in its favor. `None` if no such request.
    pub fn approve(&mut self, session_id: &SessionId) -> Option<JoinDecision> {
        self.take(session_id).map(|request| JoinDecision {
            session_id: request.session_id,
            approved: true,
        })
    }

    /// Remove the request and turn it down. `None` if no such request.
    pub fn reject(&mut self, session_id: &SessionId) -> Option<JoinDecision> {
        self.take(session_id).map(|request| JoinDecision {
            session_id: request.session_id,
            approved: false,
        })
    }

    /// Drop the request silently, e.g. when the requester disconnected
    pub fn drop_requester(&mut self, session_id: &SessionId) -> bool {
        self.take(session_id).is_some()
    }

    fn take(&mut self, session_id: &SessionId) -> Option<PendingRequest> {
        let index = self
            .requests
            .iter()
            .position(|request| &request.session_id == session_id)?;
        Some(self.requests.remove(index))
    }

    pub fn list(&self) -> &[PendingRequest] {
        &self.requests
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.requests
            .iter()
            .any(|request| &request.session_id == session_id)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// The pending section is shown exactly when the queue is non-empty
    pub fn is_visible(&self) -> bool {
        !self.is_empty()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(session_id: &str, username: &str) -> PendingRequest {
        PendingRequest::new(
            SessionId::try_from(session_id).unwrap(),
            Username::try_from(username).unwrap(),
        )
    }

    fn id(value: &str) -> SessionId {
        SessionId::try_from(value).unwrap()
    }

    #[test]
    fn test_request_prompt_text() {
        // テスト項目: 参加リクエストの表示文言が "{username} wants to join." になる
        // given (前提条件):
        let request = request("user-123", "GuestUser");

        // when (操作):
        let prompt = request.prompt();

        // then (期待する結果):
        assert_eq!(prompt, "GuestUser wants to join.");
    }

    #[test]
    fn test_repeated_request_replaces_instead_of_duplicating() {
        // テスト項目: 同じ session id からの 2 回目のリクエストは置き換えになる
        // given (前提条件):
        let mut queue = PendingRequestQueue::new();
        queue.on_user_request(request("user-1", "Guest"));
        queue.on_user_request(request("user-2", "Other"));

        // when (操作):
        let replaced = queue.on_user_request(request("user-1", "Guest Renamed"));

        // then (期待する結果):
        assert!(replaced);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.list()[0].username.as_str(), "Guest Renamed");
    }

    #[test]
    fn test_approve_removes_entry_and_hides_section_when_empty() {
        // テスト項目: 承認でエントリが消え、キューが空なら非表示になる
        // given (前提条件):
        let mut queue = PendingRequestQueue::new();
        queue.on_user_request(request("user-1", "Guest"));
        assert!(queue.is_visible());

        // when (操作):
        let decision = queue.approve(&id("user-1"));

        // then (期待する結果):
        assert_eq!(
            decision,
            Some(JoinDecision {
                session_id: id("user-1"),
                approved: true,
            })
        );
        assert!(queue.is_empty());
        assert!(!queue.is_visible());
    }

    #[test]
    fn test_approve_keeps_section_visible_while_requests_remain() {
        // テスト項目: 他のリクエストが残っていれば表示されたままになる
        // given (前提条件):
        let mut queue = PendingRequestQueue::new();
        queue.on_user_request(request("user-1", "Guest"));
        queue.on_user_request(request("user-2", "Other"));

        // when (操作):
        queue.approve(&id("user-1"));

        // then (期待する結果):
        assert!(queue.is_visible());
        assert!(queue.contains(&id("user-2")));
    }

    #[test]
    fn test_reject_twice_is_noop_the_second_time() {
        // テスト項目: 同じ id を 2 回 reject しても 2 回目は何も起きない
        // given (前提条件):
        let mut queue = PendingRequestQueue::new();
        queue.on_user_request(request("user-1", "Guest"));

        // when (操作):
        let first = queue.reject(&id("user-1"));
        let second = queue.reject(&id("user-1"));

        // then (期待する結果):
        assert_eq!(
            first,
            Some(JoinDecision {
                session_id: id("user-1"),
                approved: false,
            })
        );
        assert_eq!(second, None);
    }

    #[test]
    fn test_drop_requester_emits_no_decision() {
        // テスト項目: リクエスト者の切断では判断を出さずにエントリだけ消える
        // given (前提条件):
        let mut queue = PendingRequestQueue::new();
        queue.on_user_request(request("user-1", "Guest"));

        // when (操作):
        let dropped = queue.drop_requester(&id("user-1"));

        // then (期待する結果):
        assert!(dropped);
        assert!(queue.is_empty());
        assert_eq!(queue.approve(&id("user-1")), None);
    }
}
