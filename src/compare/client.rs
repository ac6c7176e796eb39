//! 顔比較 API クライアント
//!
//! # セキュリティガイドライン
//! - シークレット・署名値はログに出力しない
//! - 画像データはログに出力しない（バイト数のみ）
//!
//! # 処理の流れ
//! パラメータ構築 → 署名 → POST（1回のみ、リトライなし） → レスポンスエンベロープのデコード

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use http_body_util::BodyExt;
use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::config::ClientConfig;
use super::error::CompareError;
use super::signer;
use super::transport::{HttpTransport, HyperTransport};

/// レスポンスエンベロープのキー
pub const RESPONSE_KEY: &str = "PairVerifyFaceResponse";

/// 成功時のレスポンスコード
pub const SUCCESS_CODE: i64 = 200;

/// 同一人物
pub const VERDICT_SAME: i32 = 0;
/// 別人
pub const VERDICT_DIFFERENT: i32 = 1;

/// 顔比較の結果
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareResult {
    /// 類似度（0.0〜1.0）
    pub pair_verify_similarity: f64,
    /// 0 は同一人物、1 は別人
    pub pair_verify_result: i32,
}

impl CompareResult {
    pub fn similarity(&self) -> f64 {
        self.pair_verify_similarity
    }

    pub fn verdict(&self) -> i32 {
        self.pair_verify_result
    }

    pub fn is_same_subject(&self) -> bool {
        self.pair_verify_result == VERDICT_SAME
    }
}

/// エンベロープ内のレスポンス
#[derive(Debug, Deserialize)]
struct PairVerifyResponse {
    #[serde(rename = "Code", default)]
    code: Option<i64>,
    #[serde(rename = "Err", default)]
    err: Option<String>,
    #[serde(rename = "Ret", default)]
    ret: Option<CompareResult>,
}

const RESPONSE_FIELDS: &[&str] = &["Code", "Err", "Ret"];
const RESULT_FIELDS: &[&str] = &["pair_verify_similarity", "pair_verify_result"];

/// フィールド名を大文字小文字を区別せずに正規の名前へそろえる（完全一致を優先）
fn fold_field_names(value: &mut Value, names: &[&str]) {
    let Value::Object(map) = value else {
        return;
    };
    for name in names {
        if map.contains_key(*name) {
            continue;
        }
        let found = map.keys().find(|key| key.eq_ignore_ascii_case(name)).cloned();
        if let Some(key) = found {
            if let Some(field) = map.remove(&key) {
                map.insert(name.to_string(), field);
            }
        }
    }
}

/// レスポンスボディをデコード
///
/// 先頭の JSON 値のみを読み、後続のデータは無視する。
/// HTTP ステータスはエラー扱いせず、エンベロープの `Code` で成否を判定する。
/// エンベロープのキーがない場合は成功扱いにせずデコードエラーとする。
pub fn decode_response(status: StatusCode, body: &[u8]) -> Result<CompareResult, CompareError> {
    let decode_error = |reason: String| {
        log::error!(
            "Failed to parse face compare response (status {}), response body length: {} bytes",
            status,
            body.len()
        );
        CompareError::Decode(format!("status {status}: {reason}"))
    };

    let envelope = serde_json::Deserializer::from_slice(body)
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| decode_error("empty response body".to_string()))?
        .map_err(|e| decode_error(e.to_string()))?;

    let mut envelope = match envelope {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => return Err(decode_error("expected a JSON object".to_string())),
    };

    let mut response = match envelope.remove(RESPONSE_KEY) {
        Some(value) if !value.is_null() => value,
        _ => {
            log::error!(
                "Face compare response has no {} (status {})",
                RESPONSE_KEY,
                status
            );
            return Err(CompareError::Decode(format!(
                "status {status}: missing {RESPONSE_KEY}"
            )));
        }
    };

    fold_field_names(&mut response, RESPONSE_FIELDS);
    if let Some(ret) = response.get_mut("Ret") {
        fold_field_names(ret, RESULT_FIELDS);
    }

    let response: PairVerifyResponse =
        serde_json::from_value(response).map_err(|e| decode_error(e.to_string()))?;

    let code = response.code.unwrap_or_default();
    if code != SUCCESS_CODE {
        let message = response.err.unwrap_or_default();
        log::error!("Face compare API returned code {} (status {})", code, status);
        return Err(CompareError::Remote { code, message });
    }

    let result = response.ret.unwrap_or_default();
    if !(0.0..=1.0).contains(&result.pair_verify_similarity) {
        log::warn!(
            "Face compare similarity out of range: {}",
            result.pair_verify_similarity
        );
    }
    if result.pair_verify_result != VERDICT_SAME && result.pair_verify_result != VERDICT_DIFFERENT {
        log::warn!(
            "Unknown face compare verdict: {}",
            result.pair_verify_result
        );
    }

    Ok(result)
}

/// 顔比較クライアントトレイト（テスト用モック対応）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FaceCompareClientTrait: Send + Sync {
    /// 2枚の画像（エンコード済みのバイト列）を比較
    async fn compare(&self, first: &[u8], second: &[u8]) -> Result<CompareResult, CompareError>;
}

/// 顔比較クライアント実装
pub struct FaceCompareClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    host: String,
    path: String,
}

impl FaceCompareClient {
    /// アクセスキーからクライアントを作成（デフォルト設定・HTTP/1.1 トランスポート）
    ///
    /// # セキュリティ
    /// シークレットはログに出力されません
    pub fn new(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<Vec<u8>>,
    ) -> Result<Self, CompareError> {
        Self::from_config(ClientConfig::new(access_key_id, access_key_secret))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, CompareError> {
        let transport = HyperTransport::new()?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// トランスポートを指定して作成（複数クライアントでの共有やモックへの差し替え用）
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, CompareError> {
        let (host, path) = split_endpoint(&config.endpoint)?;

        log::info!("FaceCompareClient created for host: {}", host);

        Ok(Self {
            config,
            transport,
            host,
            path,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 署名付きフォームボディを構築
    ///
    /// 署名対象と同じパラメータ列に Signature と画像を追加してエンコードする。
    fn build_form_body(&self, first: &[u8], second: &[u8], timestamp: &str) -> String {
        let mut form = signer::build_params(&self.config, timestamp);
        let canonical = signer::canonical_string(&self.host, &self.path, &form);
        let signature = signer::sign(self.config.access_key_secret.expose(), &canonical);

        form.push(("Signature", signature));
        form.push(("first_image_content", STANDARD.encode(first)));
        form.push(("second_image_content", STANDARD.encode(second)));

        signer::encode_params(&form)
    }

    /// タイムスタンプを指定して比較を実行
    async fn compare_at(
        &self,
        first: &[u8],
        second: &[u8],
        timestamp: &str,
    ) -> Result<CompareResult, CompareError> {
        log::info!(
            "Calling face compare API (image sizes: {} / {} bytes)",
            first.len(),
            second.len()
        );

        let body = self.build_form_body(first, second, timestamp);
        let response = self
            .transport
            .post_form(&self.config.endpoint, body)
            .await?;

        let status = response.status();
        // ボディはここで読み切られ、成功・失敗どちらでも解放される
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| {
                log::error!("Failed to read face compare response body: {e}");
                CompareError::Transport(format!("Failed to read response body: {e}"))
            })?
            .to_bytes();

        log::debug!(
            "Face compare response status {}, body length: {} bytes",
            status,
            body_bytes.len()
        );

        let result = decode_response(status, &body_bytes)?;

        log::info!(
            "Face compare completed: similarity={:.4}, verdict={}",
            result.pair_verify_similarity,
            result.pair_verify_result
        );
        Ok(result)
    }
}

#[async_trait]
impl FaceCompareClientTrait for FaceCompareClient {
    async fn compare(&self, first: &[u8], second: &[u8]) -> Result<CompareResult, CompareError> {
        let timestamp = signer::format_timestamp(Utc::now());
        self.compare_at(first, second, &timestamp).await
    }
}

/// エンドポイントを署名用のホスト（ポート付き）とパスに分解
fn split_endpoint(endpoint: &str) -> Result<(String, String), CompareError> {
    let url = url::Url::parse(endpoint)
        .map_err(|e| CompareError::InvalidEndpoint(format!("{endpoint}: {e}")))?;

    let host = url
        .host_str()
        .ok_or_else(|| CompareError::InvalidEndpoint(format!("{endpoint}: no host")))?;
    let host = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    Ok((host, url.path().to_string()))
}
