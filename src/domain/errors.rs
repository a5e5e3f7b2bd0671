use std::fmt;

/// 未知の資料種別タグ
///
/// 種別の変換に失敗した場合は常にこのエラーとし、書籍扱いにはしない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownItemType(pub String);

impl fmt::Display for UnknownItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown item type: {}", self.0)
    }
}

impl std::error::Error for UnknownItemType {}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnLoanError {
    /// 既に返却済み
    AlreadyReturned,
}

/// 罰金のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FineError {
    /// 金額が0以下
    NonPositiveAmount,
}

/// 管理者資格情報のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// ユーザー名またはパスワードが空
    Empty,
    /// ハッシュ化に失敗
    Hashing(String),
    /// 保存されたハッシュが不正
    MalformedHash(String),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Empty => write!(f, "username and password must not be empty"),
            CredentialError::Hashing(e) => write!(f, "password hashing failed: {}", e),
            CredentialError::MalformedHash(e) => write!(f, "stored password hash is malformed: {}", e),
        }
    }
}

impl std::error::Error for CredentialError {}
