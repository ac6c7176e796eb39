//! HTTP トランスポート
//!
//! 顔比較 API への POST を抽象化する。本番では hyper-util のクライアント（HTTP/1.1 固定）を使い、
//! テストではトレイトをモックに差し替える。

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request, Response};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;

use super::error::CompareError;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// レスポンスボディ（呼び出し側で一度だけ読み切り、スコープ終了で解放される）
pub type ResponseBody = UnsyncBoxBody<Bytes, BoxError>;

/// HTTP トランスポートトレイト（テスト用モック対応）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// フォームエンコード済みのボディを POST し、レスポンスを返す
    async fn post_form(
        &self,
        url: &str,
        body: String,
    ) -> Result<Response<ResponseBody>, CompareError>;
}

/// hyper-util クライアントによるトランスポート実装
///
/// 接続プールを内部に持つため、`Arc` で共有して並行に使ってよい。
pub struct HyperTransport {
    http_client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    timeout: Option<Duration>,
}

impl HyperTransport {
    /// HTTP/1.1 のみを使うトランスポートを作成（HTTP/2 へはアップグレードしない）
    ///
    /// hyper / hyper-util / hyper-rustls の `http2` feature を有効化していないため、
    /// ALPN でも h2 は提示されず、HTTP/2 のコードパス自体がビルドに含まれない。
    pub fn new() -> Result<Self, CompareError> {
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| CompareError::Transport(format!("Failed to create HTTPS connector: {e}")))?
            .https_or_http()
            .enable_http1()
            .build();

        let http_client = Client::builder(TokioExecutor::new()).build(https);

        log::info!("HyperTransport created (HTTP/1.1 only)");

        Ok(Self {
            http_client,
            timeout: None,
        })
    }

    /// 送信〜レスポンスヘッダー受信までのタイムアウトを設定（デフォルトはなし）
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl HttpTransport for HyperTransport {
    async fn post_form(
        &self,
        url: &str,
        body: String,
    ) -> Result<Response<ResponseBody>, CompareError> {
        // ボディには画像データが含まれるため長さのみ出力
        log::debug!("POST {} (body length: {} bytes)", url, body.len());

        let req = Request::builder()
            .method(Method::POST)
            .uri(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| CompareError::InvalidEndpoint(format!("Failed to build request: {e}")))?;

        let pending = self.http_client.request(req);
        let result = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, pending).await {
                Ok(result) => result,
                Err(_) => {
                    log::error!(
                        "Face compare request timed out after {} ms",
                        timeout.as_millis()
                    );
                    return Err(CompareError::Transport(format!(
                        "Request timed out after {} ms",
                        timeout.as_millis()
                    )));
                }
            },
            None => pending.await,
        };

        let response = result.map_err(|e| {
            log::error!("Failed to send face compare request: {e}");
            CompareError::Transport(format!("Failed to send request: {e}"))
        })?;

        Ok(response.map(|body| body.map_err(BoxError::from).boxed_unsync()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_no_timeout() {
        let transport = HyperTransport::new().unwrap();
        assert!(transport.timeout().is_none());
    }

    #[test]
    fn test_with_timeout() {
        let transport = HyperTransport::new()
            .unwrap()
            .with_timeout(Duration::from_secs(5));
        assert_eq!(transport.timeout(), Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // 一度バインドしたポートを閉じて、確実に接続拒否されるポートを得る
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport = HyperTransport::new().unwrap();
        let result = transport
            .post_form(&format!("http://127.0.0.1:{port}/mcs/v1"), String::new())
            .await;

        assert!(matches!(result, Err(CompareError::Transport(_))));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        // 接続は受け付けるが応答しないサーバー
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let transport = HyperTransport::new()
            .unwrap()
            .with_timeout(Duration::from_millis(200));
        let result = transport
            .post_form(&format!("http://127.0.0.1:{port}/mcs/v1"), String::new())
            .await;

        match result {
            Err(CompareError::Transport(msg)) => assert!(msg.contains("timed out")),
            other => panic!("expected timeout error, got {:?}", other.map(|r| r.status())),
        }
        drop(listener);
    }

    #[tokio::test]
    async fn test_request_is_sent_as_http1_1_form_post() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        // リクエストヘッダーを受け取り、固定のレスポンスを返すサーバー
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}")
                .await
                .unwrap();
            String::from_utf8_lossy(&head).to_string()
        });

        let transport = HyperTransport::new().unwrap();
        let response = transport
            .post_form(&format!("http://127.0.0.1:{port}/mcs/v1"), "a=b".to_string())
            .await
            .unwrap();
        assert_eq!(response.version(), hyper::Version::HTTP_11);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"{}");

        let head = server.await.unwrap();
        assert!(head.starts_with("POST /mcs/v1 HTTP/1.1\r\n"));
        assert!(head
            .to_ascii_lowercase()
            .contains("content-type: application/x-www-form-urlencoded"));
    }

    #[tokio::test]
    async fn test_invalid_uri_is_rejected_before_sending() {
        let transport = HyperTransport::new().unwrap();
        let result = transport.post_form("not a uri", String::new()).await;

        assert!(matches!(result, Err(CompareError::InvalidEndpoint(_))));
    }
}
