//! 顔比較クライアントの設定
//!
//! # セキュリティガイドライン
//! - AccessKeySecret はログに出力しない（Debug 出力も伏字）
//! - 文字列への暗黙変換（Display）は提供しない

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// 顔比較 API のエンドポイント
pub const API_ENDPOINT: &str = "https://mosapi.meituan.com/mcs/v1";

pub const DEFAULT_FORMAT: &str = "json";
pub const DEFAULT_SIGNATURE_METHOD: &str = "HmacSHA256";
pub const DEFAULT_SIGNATURE_VERSION: &str = "2";
/// 誤検出許容率のしきい値（サービス側にそのまま渡す）
pub const DEFAULT_TRUE_NEGATIVE_RATE: &str = "99.9";

/// アクセスキーシークレット
///
/// Drop 時にバッファをゼロ埋めする。
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct AccessKeySecret(Vec<u8>);

impl AccessKeySecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    /// HMAC の鍵として使うためのバイト列
    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessKeySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessKeySecret(***)")
    }
}

/// 顔比較クライアントの設定（起動時に一度作成し、以後変更しない）
#[derive(Debug)]
pub struct ClientConfig {
    pub access_key_id: String,
    pub access_key_secret: AccessKeySecret,
    pub format: String,
    pub signature_method: String,
    pub signature_version: String,
    pub true_negative_rate: String,
    pub endpoint: String,
}

impl ClientConfig {
    /// デフォルト値で設定を作成
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: AccessKeySecret::new(access_key_secret),
            format: DEFAULT_FORMAT.to_string(),
            signature_method: DEFAULT_SIGNATURE_METHOD.to_string(),
            signature_version: DEFAULT_SIGNATURE_VERSION.to_string(),
            true_negative_rate: DEFAULT_TRUE_NEGATIVE_RATE.to_string(),
            endpoint: API_ENDPOINT.to_string(),
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_signature_method(mut self, method: impl Into<String>) -> Self {
        self.signature_method = method.into();
        self
    }

    pub fn with_signature_version(mut self, version: impl Into<String>) -> Self {
        self.signature_version = version.into();
        self
    }

    pub fn with_true_negative_rate(mut self, rate: impl Into<String>) -> Self {
        self.true_negative_rate = rate.into();
        self
    }

    /// エンドポイントを差し替える（ローカルのモックサーバー向け）
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = ClientConfig::new("AKID", "secret");

        assert_eq!(config.access_key_id, "AKID");
        assert_eq!(config.access_key_secret.expose(), b"secret");
        assert_eq!(config.format, "json");
        assert_eq!(config.signature_method, "HmacSHA256");
        assert_eq!(config.signature_version, "2");
        assert_eq!(config.true_negative_rate, "99.9");
        assert_eq!(config.endpoint, API_ENDPOINT);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::new("AKID", "secret")
            .with_format("xml")
            .with_signature_method("HmacSHA1")
            .with_signature_version("1")
            .with_true_negative_rate("99.0")
            .with_endpoint("http://127.0.0.1:8080/mcs/v1");

        assert_eq!(config.format, "xml");
        assert_eq!(config.signature_method, "HmacSHA1");
        assert_eq!(config.signature_version, "1");
        assert_eq!(config.true_negative_rate, "99.0");
        assert_eq!(config.endpoint, "http://127.0.0.1:8080/mcs/v1");
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let config = ClientConfig::new("AKID", "super-secret-value");
        let debug = format!("{:?}", config);

        assert!(debug.contains("AKID"));
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("AccessKeySecret(***)"));
    }

    #[test]
    fn test_zeroize_clears_secret() {
        let mut secret = AccessKeySecret::new("secret");
        secret.zeroize();

        assert!(secret.is_empty());
        assert_eq!(secret.expose(), b"");
    }

    #[test]
    fn test_empty_secret_is_allowed() {
        let secret = AccessKeySecret::new(Vec::new());
        assert!(secret.is_empty());
        assert_eq!(secret.expose(), b"");
    }
}
