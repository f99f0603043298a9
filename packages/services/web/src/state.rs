//! Web 앱 상태

use std::sync::Arc;
use std::time::Duration;

use crate::client::{ApiClient, ChatClient, HttpApiClient, HttpChatClient};
use crate::config::Config;

/// 앱 상태
pub struct AppState {
    pub api: Arc<dyn ApiClient>,
    pub chat: Arc<dyn ChatClient>,
}

impl AppState {
    /// 설정의 URL로 HTTP 클라이언트 생성
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let connect_timeout = Duration::from_secs(config.http_connect_timeout_secs);
        let timeout = Duration::from_secs(config.http_timeout_secs);

        Ok(Self {
            api: Arc::new(HttpApiClient::new(&config.api_url, connect_timeout, timeout)?),
            chat: Arc::new(HttpChatClient::new(
                &config.chat_url,
                &config.chat_api_key,
                connect_timeout,
                timeout,
            )?),
        })
    }
}
