use serde::{Deserialize, Serialize};

/// セッションストレージのキー定義
pub struct SessionKeys;

impl SessionKeys {
    /// ログイン中のユーザー情報のキー
    pub const USER: &'static str = "user";
    /// APIサーバーの認証トークンのキー
    pub const JWT: &'static str = "jwt";
}

/// ユーザー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    Employee,
    Admin,
}

/// ログイン中のユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(rename = "type")]
    pub user_type: UserType,
    /// 古いセッションではメールアドレスが保存されていないことがある
    #[serde(default)]
    pub email: Option<String>,
}

impl CurrentUser {
    pub fn employee<S: Into<String>>(email: S) -> Self {
        Self {
            user_type: UserType::Employee,
            email: Some(email.into()),
        }
    }

    pub fn is_employee(&self) -> bool {
        self.user_type == UserType::Employee
    }
}
