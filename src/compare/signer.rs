//! リクエスト署名
//!
//! 固定順のパラメータから正規化文字列を組み立て、HMAC-SHA256 で署名する。
//! 署名対象とフォームボディは同じパラメータ列から作ること（順序・値が一致しないと署名エラーになる）。
//!
//! # セキュリティガイドライン
//! - シークレット・署名値はログに出力しない

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::config::ClientConfig;

type HmacSha256 = Hmac<Sha256>;

/// 顔比較のアクション名
pub const COMPARE_ACTION: &str = "PairVerifyFace";

/// タイムスタンプ形式（UTC・ミリ秒精度）例: 2024-01-02T03:04:05.123Z
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// 署名対象のリクエストパラメータ（順序付き）
pub type Params = Vec<(&'static str, String)>;

/// タイムスタンプを署名用の形式に整形
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// クエリ文字列用のエスケープ
///
/// 英数字と `-_.~` 以外はすべて %XX に変換し、空白は `+` にする。
pub fn query_escape(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}

/// 署名パラメータを固定順で構築
pub fn build_params(config: &ClientConfig, timestamp: &str) -> Params {
    vec![
        ("AWSAccessKeyId", config.access_key_id.clone()),
        ("Action", COMPARE_ACTION.to_string()),
        ("Format", config.format.clone()),
        ("SignatureMethod", config.signature_method.clone()),
        ("SignatureVersion", config.signature_version.clone()),
        ("Timestamp", timestamp.to_string()),
        ("true_negative_rate", config.true_negative_rate.clone()),
    ]
}

/// `key=value` を `&` で連結（並べ替えはしない）
pub fn encode_params(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", query_escape(key), query_escape(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// 署名対象の正規化文字列
///
/// `POST\n{host}\n{path}\n{params}`（末尾改行なし）
pub fn canonical_string(host: &str, path: &str, params: &[(&str, String)]) -> String {
    format!("POST\n{}\n{}\n{}", host, path, encode_params(params))
}

/// HMAC-SHA256 署名を base64（標準）で返す
pub fn sign(secret: &[u8], canonical: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(canonical.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}
