//! 顔比較のエラー型

use thiserror::Error;

/// 顔比較リクエストのエラー
///
/// どのエラーもリトライせずにそのまま呼び出し側へ返す。
#[derive(Debug, Error)]
pub enum CompareError {
    /// 接続失敗・TLS エラー・タイムアウト・ボディ読み込み失敗
    #[error("transport error: {0}")]
    Transport(String),

    /// レスポンスが期待する JSON 形式ではない
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// サービスが Code != 200 を返した
    #[error("remote error (code {code}): {message}")]
    Remote { code: i64, message: String },

    /// エンドポイント URL が不正（リクエスト前に検出）
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl CompareError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_message() {
        let err = CompareError::Remote {
            code: 403,
            message: "invalid signature".to_string(),
        };

        assert!(err.is_remote());
        assert!(!err.is_transport());
        assert_eq!(err.to_string(), "remote error (code 403): invalid signature");
    }

    #[test]
    fn test_kind_predicates() {
        assert!(CompareError::Transport("refused".to_string()).is_transport());
        assert!(CompareError::Decode("eof".to_string()).is_decode());
        assert!(!CompareError::InvalidEndpoint("x".to_string()).is_decode());
    }
}
