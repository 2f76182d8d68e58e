//! Value objects identifying connections and people.

use std::fmt;

use super::error::ValueObjectError;

/// Opaque identifier the host assigns to each connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Create a session id, rejecting blank values
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptySessionId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for SessionId {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name of a participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Create a username, rejecting blank values
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyUsername);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Username {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_rejects_blank_value() {
        // テスト項目: 空白のみの session id は作成できない
        // given (前提条件):
        let value = "   ".to_string();

        // when (操作):
        let result = SessionId::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptySessionId));
    }

    #[test]
    fn test_username_keeps_inner_spaces() {
        // テスト項目: 空白を含むユーザー名はそのまま保持される
        // given (前提条件):
        let value = "Test User";

        // when (操作):
        let username = Username::try_from(value).unwrap();

        // then (期待する結果):
        assert_eq!(username.as_str(), "Test User");
        assert_eq!(username.to_string(), "Test User");
    }

    #[test]
    fn test_username_rejects_empty_value() {
        // テスト項目: 空のユーザー名は作成できない
        // given (前提条件):
        let value = String::new();

        // when (操作):
        let result = Username::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyUsername));
    }
}
