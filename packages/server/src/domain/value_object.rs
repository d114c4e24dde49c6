//! Value Objects
//!
//! 接続の識別子と表示名を表す値オブジェクト。

use std::fmt;

use uuid::Uuid;

/// Identity of one upgraded connection.
///
/// 表示名ではなく接続そのものを識別する。アップグレード時に一度だけ生成される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// 新しい ConnectionId を生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name announced by a client.
///
/// An empty name means "connected, not yet identified".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(name: String) -> Self {
        Self(name)
    }

    /// Name of a connection that has not sent `username` yet
    pub fn unnamed() -> Self {
        Self(String::new())
    }

    pub fn is_unnamed(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for DisplayName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for DisplayName {
    fn from(name: &str) -> Self {
        Self::new(name.to_string())
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_generate_is_unique() {
        // テスト項目: 生成された ConnectionId はそれぞれ異なる
        // given (前提条件):
        let first = ConnectionId::generate();

        // when (操作):
        let second = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(first, second);
    }

    #[test]
    fn test_display_name_unnamed() {
        // テスト項目: 空文字の表示名は未命名として扱われる
        // given (前提条件):
        let unnamed = DisplayName::unnamed();
        let empty = DisplayName::from("");
        let alice = DisplayName::from("alice");

        // when (操作):

        // then (期待する結果):
        assert!(unnamed.is_unnamed());
        assert!(empty.is_unnamed());
        assert!(!alice.is_unnamed());
        assert_eq!(unnamed, DisplayName::default());
    }
}
