//! 顔比較（PairVerifyFace）API 連携モジュール
//!
//! # セキュリティガイドライン
//! このモジュールは2枚の顔画像を外部APIに送信して類似度を取得します。
//! 以下のルールを厳守してください：
//!
//! - **シークレットのログ出力禁止**: アクセスキーシークレット・署名値は絶対にログに出力しないこと
//! - **画像データのログ出力禁止**: 画像の内容（base64 含む）はログに出力しないこと
//! - **メトリクスのみ**: ログに出力できるのはバイト数、ステータスコード、結果の数値のみ

pub mod client;
pub mod config;
pub mod error;
pub mod signer;
pub mod transport;

pub use client::{
    decode_response, CompareResult, FaceCompareClient, FaceCompareClientTrait, VERDICT_DIFFERENT,
    VERDICT_SAME,
};
pub use config::{AccessKeySecret, ClientConfig, API_ENDPOINT};
pub use error::CompareError;
pub use transport::{HttpTransport, HyperTransport};
