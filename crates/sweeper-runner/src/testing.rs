//! Scripted fakes shared by the runner's unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use sweeper_api::{ApiError, ApiResult, GameApi, LossReport, TokenPair, WinReport};
use sweeper_core::{CredentialState, RoundData, UserProfile};
use sweeper_telegram::{GatewayError, GatewayResult, PeerRef, TelegramGateway};

/// Default web-view URL the mock gateway hands back: decodes to a user with
/// id `7111`.
const DEFAULT_WEB_VIEW_URL: &str = "https://bybitcoinsweeper.com/#tgWebAppData=%7B%22id%22%3A7111%2C%22first_name%22%3A%22T%22%2C%22last_name%22%3A%22U%22%7D&tgWebAppVersion=7.0";

/// Knobs for one scripted gateway run.
pub(crate) struct GatewayScript {
    /// Fail `connect` fatally with this message.
    pub connect_error: Option<String>,
    /// What the chat-history scan reports.
    pub has_start_command: bool,
    /// Number of flood-wait answers before `resolve_bot_peer` succeeds.
    pub flood_waits: u32,
    /// Override for the returned web-view URL.
    pub web_view_url: Option<String>,
    /// Fail `request_web_view` transiently with this message.
    pub web_view_error: Option<String>,
}

impl GatewayScript {
    /// Everything succeeds on the first try.
    pub(crate) fn happy() -> Self {
        Self {
            connect_error: None,
            has_start_command: true,
            flood_waits: 0,
            web_view_url: None,
            web_view_error: None,
        }
    }
}

/// Scripted [`TelegramGateway`] with call counting.
pub(crate) struct MockGateway {
    script: GatewayScript,
    connected: bool,
    remaining_floods: u32,
    connect_calls: u32,
    resolve_calls: u32,
    start_bot_calls: u32,
    disconnect_calls: u32,
}

impl MockGateway {
    pub(crate) fn new(script: GatewayScript) -> Self {
        let remaining_floods = script.flood_waits;
        Self {
            script,
            connected: false,
            remaining_floods,
            connect_calls: 0,
            resolve_calls: 0,
            start_bot_calls: 0,
            disconnect_calls: 0,
        }
    }

    pub(crate) fn connect_calls(&self) -> u32 {
        self.connect_calls
    }

    pub(crate) fn resolve_calls(&self) -> u32 {
        self.resolve_calls
    }

    pub(crate) fn start_bot_calls(&self) -> u32 {
        self.start_bot_calls
    }

    pub(crate) fn disconnected(&self) -> bool {
        self.disconnect_calls > 0 && !self.connected
    }
}

#[async_trait]
impl TelegramGateway for MockGateway {
    async fn connect(&mut self) -> GatewayResult<()> {
        self.connect_calls = self.connect_calls.saturating_add(1);
        if let Some(msg) = &self.script.connect_error {
            return Err(GatewayError::AccountInvalid(msg.clone()));
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn has_start_command(&mut self, _bot: &str) -> GatewayResult<bool> {
        Ok(self.script.has_start_command)
    }

    async fn resolve_bot_peer(&mut self, bot: &str) -> GatewayResult<PeerRef> {
        self.resolve_calls = self.resolve_calls.saturating_add(1);
        if self.remaining_floods > 0 {
            self.remaining_floods = self.remaining_floods.saturating_sub(1);
            return Err(GatewayError::FloodWait { seconds: 5 });
        }
        Ok(PeerRef::new(bot))
    }

    async fn start_bot(
        &mut self,
        _peer: &PeerRef,
        _start_param: &str,
        _random_id: u64,
    ) -> GatewayResult<()> {
        self.start_bot_calls = self.start_bot_calls.saturating_add(1);
        Ok(())
    }

    async fn request_web_view(
        &mut self,
        _peer: &PeerRef,
        _url: &str,
        _start_param: &str,
    ) -> GatewayResult<String> {
        if let Some(msg) = &self.script.web_view_error {
            return Err(GatewayError::Transport(msg.clone()));
        }
        Ok(self
            .script
            .web_view_url
            .clone()
            .unwrap_or_else(|| DEFAULT_WEB_VIEW_URL.to_string()))
    }

    async fn disconnect(&mut self) -> GatewayResult<()> {
        self.disconnect_calls = self.disconnect_calls.saturating_add(1);
        self.connected = false;
        Ok(())
    }
}

/// Scripted [`GameApi`]: each endpoint pops from its own response queue.
/// An unscripted call answers with an HTTP-599-style error.
pub(crate) struct MockApi {
    refresh: Mutex<VecDeque<ApiResult<TokenPair>>>,
    login: Mutex<VecDeque<ApiResult<TokenPair>>>,
    me: Mutex<VecDeque<ApiResult<UserProfile>>>,
    start: Mutex<VecDeque<ApiResult<RoundData>>>,
    lose: Mutex<VecDeque<ApiResult<()>>>,
    win: Mutex<VecDeque<ApiResult<()>>>,
    refresh_count: AtomicU32,
    login_count: AtomicU32,
    me_count: AtomicU32,
    start_count: AtomicU32,
    lose_count: AtomicU32,
    win_count: AtomicU32,
    last_win: Mutex<Option<WinReport>>,
}

fn unscripted<T>() -> ApiResult<T> {
    Err(ApiError::Status {
        status: 599,
        body: "unscripted call".to_string(),
    })
}

impl MockApi {
    pub(crate) fn new() -> Self {
        Self {
            refresh: Mutex::new(VecDeque::new()),
            login: Mutex::new(VecDeque::new()),
            me: Mutex::new(VecDeque::new()),
            start: Mutex::new(VecDeque::new()),
            lose: Mutex::new(VecDeque::new()),
            win: Mutex::new(VecDeque::new()),
            refresh_count: AtomicU32::new(0),
            login_count: AtomicU32::new(0),
            me_count: AtomicU32::new(0),
            start_count: AtomicU32::new(0),
            lose_count: AtomicU32::new(0),
            win_count: AtomicU32::new(0),
            last_win: Mutex::new(None),
        }
    }

    pub(crate) fn push_refresh(&self, result: ApiResult<TokenPair>) {
        self.refresh.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_login(&self, result: ApiResult<TokenPair>) {
        self.login.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_me(&self, result: ApiResult<UserProfile>) {
        self.me.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_start(&self, result: ApiResult<RoundData>) {
        self.start.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_lose(&self, result: ApiResult<()>) {
        self.lose.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_win(&self, result: ApiResult<()>) {
        self.win.lock().unwrap().push_back(result);
    }

    pub(crate) fn refresh_calls(&self) -> u32 {
        self.refresh_count.load(Ordering::SeqCst)
    }

    pub(crate) fn login_calls(&self) -> u32 {
        self.login_count.load(Ordering::SeqCst)
    }

    pub(crate) fn me_calls(&self) -> u32 {
        self.me_count.load(Ordering::SeqCst)
    }

    pub(crate) fn start_calls(&self) -> u32 {
        self.start_count.load(Ordering::SeqCst)
    }

    pub(crate) fn lose_calls(&self) -> u32 {
        self.lose_count.load(Ordering::SeqCst)
    }

    pub(crate) fn win_calls(&self) -> u32 {
        self.win_count.load(Ordering::SeqCst)
    }

    /// The most recent win report, for asserting on its fields.
    pub(crate) fn last_win(&self) -> Option<WinReport> {
        self.last_win.lock().unwrap().clone()
    }
}

#[async_trait]
impl GameApi for MockApi {
    async fn refresh_token(&self, _refresh_token: &str) -> ApiResult<TokenPair> {
        self.refresh_count.fetch_add(1, Ordering::SeqCst);
        self.refresh.lock().unwrap().pop_front().unwrap_or_else(unscripted)
    }

    async fn login(&self, _init_data: &str, _referred_by: &str) -> ApiResult<TokenPair> {
        self.login_count.fetch_add(1, Ordering::SeqCst);
        self.login.lock().unwrap().pop_front().unwrap_or_else(unscripted)
    }

    async fn me(&self, _creds: &CredentialState) -> ApiResult<UserProfile> {
        self.me_count.fetch_add(1, Ordering::SeqCst);
        self.me.lock().unwrap().pop_front().unwrap_or_else(unscripted)
    }

    async fn start_round(&self, _creds: &CredentialState) -> ApiResult<RoundData> {
        self.start_count.fetch_add(1, Ordering::SeqCst);
        self.start.lock().unwrap().pop_front().unwrap_or_else(unscripted)
    }

    async fn report_loss(&self, _creds: &CredentialState, _report: &LossReport) -> ApiResult<()> {
        self.lose_count.fetch_add(1, Ordering::SeqCst);
        self.lose.lock().unwrap().pop_front().unwrap_or_else(unscripted)
    }

    async fn report_win(&self, _creds: &CredentialState, report: &WinReport) -> ApiResult<()> {
        self.win_count.fetch_add(1, Ordering::SeqCst);
        *self.last_win.lock().unwrap() = Some(report.clone());
        self.win.lock().unwrap().pop_front().unwrap_or_else(unscripted)
    }
}

/// A round payload created `created_secs_ago` seconds in the past.
pub(crate) fn round_created_secs_ago(id: &str, created_secs_ago: i64) -> RoundData {
    let created = chrono::Utc::now()
        .checked_sub_signed(chrono::Duration::seconds(created_secs_ago))
        .unwrap();
    serde_json::from_value(serde_json::json!({
        "id": id,
        "createdAt": created.to_rfc3339(),
        "rewards": {"bagCoins": 10, "bits": 2, "gifts": null},
    }))
    .unwrap()
}
