//! アクセスキーシークレット管理
//!
//! # セキュリティガイドライン
//! - シークレットは絶対にログに出力しないこと
//! - 永続化には OS のセキュアストレージ（keyring）を使用すること

use keyring::Entry;

const KEYRING_SERVICE: &str = "face-compare";

/// keyring 用のエントリを取得（ユーザー名はアクセスキーID）
fn secret_entry(access_key_id: &str) -> Result<Entry, String> {
    if access_key_id.is_empty() {
        return Err("Access key id is empty".to_string());
    }
    Entry::new(KEYRING_SERVICE, access_key_id)
        .map_err(|e| format!("Failed to access secure storage for access key secret: {e}"))
}

/// シークレットが設定されているかチェック
pub fn has_access_key_secret(access_key_id: &str) -> bool {
    if let Ok(entry) = secret_entry(access_key_id) {
        if let Ok(secret) = entry.get_secret() {
            return !secret.is_empty();
        }
    }
    false
}

/// シークレットを読み込み
///
/// # セキュリティ
/// シークレットはログに出力されません
pub fn load_access_key_secret(access_key_id: &str) -> Result<Vec<u8>, String> {
    let entry = secret_entry(access_key_id)?;
    let secret = entry
        .get_secret()
        .map_err(|e| format!("Failed to load access key secret from secure storage: {e}"))?;

    if secret.is_empty() {
        return Err("Access key secret is empty".to_string());
    }

    log::info!("Access key secret loaded successfully from secure storage");
    Ok(secret)
}

/// シークレットを保存
///
/// # セキュリティ
/// シークレットはログに出力されません
pub fn save_access_key_secret(access_key_id: &str, secret: &[u8]) -> Result<(), String> {
    if secret.is_empty() {
        return Err("Access key secret is empty".to_string());
    }

    let entry = secret_entry(access_key_id)?;
    entry
        .set_secret(secret)
        .map_err(|e| format!("Failed to save access key secret to secure storage: {e}"))?;

    log::info!("Access key secret saved successfully to secure storage");
    Ok(())
}

/// シークレットを削除
pub fn delete_access_key_secret(access_key_id: &str) -> Result<(), String> {
    let entry = secret_entry(access_key_id)?;
    entry
        .delete_credential()
        .map_err(|e| format!("Failed to delete access key secret from secure storage: {e}"))?;

    log::info!("Access key secret deleted successfully from secure storage");
    Ok(())
}
