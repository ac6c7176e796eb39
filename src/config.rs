//! 設定ファイルの管理
//!
//! アクセスキーID・署名方式などシークレット以外の設定を face_compare_config.json で管理する。
//! シークレットは credentials（OS のセキュアストレージ）に分離する。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::compare::config::{
    API_ENDPOINT, DEFAULT_FORMAT, DEFAULT_SIGNATURE_METHOD, DEFAULT_SIGNATURE_VERSION,
    DEFAULT_TRUE_NEGATIVE_RATE,
};
use crate::compare::ClientConfig;

const CONFIG_FILENAME: &str = "face_compare_config.json";

/// 顔比較の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareSettings {
    pub access_key_id: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_signature_method")]
    pub signature_method: String,
    #[serde(default = "default_signature_version")]
    pub signature_version: String,
    #[serde(default = "default_true_negative_rate")]
    pub true_negative_rate: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// 送信タイムアウト（秒）。None の場合はタイムアウトなし
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn default_signature_method() -> String {
    DEFAULT_SIGNATURE_METHOD.to_string()
}

fn default_signature_version() -> String {
    DEFAULT_SIGNATURE_VERSION.to_string()
}

fn default_true_negative_rate() -> String {
    DEFAULT_TRUE_NEGATIVE_RATE.to_string()
}

fn default_endpoint() -> String {
    API_ENDPOINT.to_string()
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            access_key_id: String::new(),
            format: default_format(),
            signature_method: default_signature_method(),
            signature_version: default_signature_version(),
            true_negative_rate: default_true_negative_rate(),
            endpoint: default_endpoint(),
            request_timeout_secs: None,
        }
    }
}

impl CompareSettings {
    /// シークレットと組み合わせてクライアント設定を作成
    pub fn into_client_config(self, access_key_secret: impl Into<Vec<u8>>) -> ClientConfig {
        ClientConfig::new(self.access_key_id, access_key_secret)
            .with_format(self.format)
            .with_signature_method(self.signature_method)
            .with_signature_version(self.signature_version)
            .with_true_negative_rate(self.true_negative_rate)
            .with_endpoint(self.endpoint)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// 設定を読み込む。ファイルが存在しない場合はデフォルトを返し、保存する。
pub fn load(config_dir: &Path) -> Result<CompareSettings, String> {
    let path = config_dir.join(CONFIG_FILENAME);

    if path.exists() {
        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        serde_json::from_str(&contents).map_err(|e| format!("Invalid config JSON: {e}"))
    } else {
        let settings = CompareSettings::default();
        save(config_dir, &settings)?;
        log::info!("Created default config at {}", path.display());
        Ok(settings)
    }
}

/// 設定を保存する。
pub fn save(config_dir: &Path, settings: &CompareSettings) -> Result<(), String> {
    fs::create_dir_all(config_dir).map_err(|e| format!("Failed to create config dir: {e}"))?;

    let path = config_dir.join(CONFIG_FILENAME);
    let contents = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize config: {e}"))?;

    fs::write(&path, contents).map_err(|e| format!("Failed to write config file: {e}"))
}
