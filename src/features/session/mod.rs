// セッション機能モジュール
pub mod models;
pub mod storage;

use crate::shared::errors::{AppError, AppResult};
use models::{CurrentUser, SessionKeys};
use storage::SessionStorage;

/// ログイン中のユーザーを読み込む
///
/// 未ログインの場合はNone
pub fn load_current_user(storage: &dyn SessionStorage) -> AppResult<Option<CurrentUser>> {
    let Some(raw) = storage.get_item(SessionKeys::USER)? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| AppError::session(format!("ユーザー情報の解析に失敗しました: {e}")))
}

/// ログイン中のユーザーを保存する
pub fn save_current_user(storage: &dyn SessionStorage, user: &CurrentUser) -> AppResult<()> {
    storage.set_item(SessionKeys::USER, &serde_json::to_string(user)?)
}

/// APIサーバーの認証トークンを取得する
pub fn auth_token(storage: &dyn SessionStorage) -> AppResult<Option<String>> {
    storage.get_item(SessionKeys::JWT)
}

/// ログイン中のユーザーのメールアドレスを取得する
pub fn current_user_email(storage: &dyn SessionStorage) -> AppResult<Option<String>> {
    Ok(load_current_user(storage)?.and_then(|user| user.email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::MemorySessionStorage;

    #[test]
    fn test_save_and_load_current_user() {
        let storage = MemorySessionStorage::new();
        assert_eq!(load_current_user(&storage).unwrap(), None);

        let user = CurrentUser::employee("employee@test.tld");
        save_current_user(&storage, &user).unwrap();

        assert_eq!(load_current_user(&storage).unwrap(), Some(user));
        assert_eq!(
            current_user_email(&storage).unwrap().as_deref(),
            Some("employee@test.tld")
        );
    }

    #[test]
    fn test_corrupted_user_is_session_error() {
        let storage = MemorySessionStorage::new();
        storage.set_item(SessionKeys::USER, "not json").unwrap();

        assert!(matches!(
            load_current_user(&storage),
            Err(AppError::Session(_))
        ));
    }

    #[test]
    fn test_auth_token() {
        let storage = MemorySessionStorage::new();
        assert_eq!(auth_token(&storage).unwrap(), None);

        storage.set_item(SessionKeys::JWT, "jwt-token").unwrap();
        assert_eq!(auth_token(&storage).unwrap().as_deref(), Some("jwt-token"));
    }
}
