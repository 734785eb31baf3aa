//! 서버 세션.
//!
//! 서버 연결 하나를 소유하고 연결/끊김/재연결 상태를 관리한다.
//! 연결마다 세대 번호를 부여하여, 교체된 연결에서 늦게 온 통지는 무시한다.
//!
//! 재연결은 고정 간격으로 무제한 반복한다 (백오프, 시도 횟수 제한 없음).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use webstrates_core::config::ReconnectPolicy;
use webstrates_core::ports::sync::{LinkNotifier, SyncClient, SyncConnector};

use crate::event::{SessionEvent, SessionSender};
use crate::status::StatusReporter;
use crate::timer::{CountdownTimer, TimerEvent};

/// 연결 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// 연결 없음
    Disconnected,
    /// 연결 중
    Connecting,
    /// 연결됨
    Connected,
    /// 재연결 대기 중
    Reconnecting,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Reconnecting => write!(f, "Reconnecting"),
        }
    }
}

/// 서버 세션: 연결 수명주기와 재연결 정책
pub(crate) struct ServerSession {
    connector: Arc<dyn SyncConnector>,
    status: Arc<StatusReporter>,
    events: SessionSender,
    client: Option<Arc<dyn SyncClient>>,
    address: Option<String>,
    policy: ReconnectPolicy,
    delete_local_files: bool,
    state: ConnectionState,
    generation: u64,
    reconnect_timer: Option<CountdownTimer>,
}

impl ServerSession {
    pub(crate) fn new(
        connector: Arc<dyn SyncConnector>,
        status: Arc<StatusReporter>,
        events: SessionSender,
    ) -> Self {
        Self {
            connector,
            status,
            events,
            client: None,
            address: None,
            policy: ReconnectPolicy::disabled(),
            delete_local_files: false,
            state: ConnectionState::Disconnected,
            generation: 0,
            reconnect_timer: None,
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.state
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// 연결된 클라이언트 (연결 수립 전이면 `None`)
    pub(crate) fn connected_client(&self) -> Option<Arc<dyn SyncClient>> {
        match self.state {
            ConnectionState::Connected => self.client.clone(),
            _ => None,
        }
    }

    /// 현재 연결의 클라이언트 (연결 중 포함)
    pub(crate) fn client(&self) -> Option<Arc<dyn SyncClient>> {
        self.client.clone()
    }

    /// 새 연결 시작
    ///
    /// 이전 연결은 `delete_local_files`로 해제한 뒤 새 연결을 연다.
    pub(crate) async fn connect(
        &mut self,
        address: &str,
        policy: ReconnectPolicy,
        delete_local_files: bool,
    ) {
        self.cancel_reconnect();
        self.release_client(delete_local_files).await;

        self.generation += 1;
        let generation = self.generation;
        let events = self.events.clone();
        let link = LinkNotifier::new(move |event| {
            let _ = events.send(SessionEvent::Link { generation, event });
        });

        info!("서버 연결 시작: {} (세대 {})", address, generation);
        self.client = Some(self.connector.open(address, link));
        self.address = Some(address.to_string());
        self.policy = policy;
        self.delete_local_files = delete_local_files;
        self.state = ConnectionState::Connecting;
        self.status
            .set_connection_status(format!("Connecting to {address}"), Duration::ZERO);
    }

    /// 연결 수립 처리: 현재 연결의 통지면 `true`
    pub(crate) fn on_connected(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            debug!("이전 연결의 연결 통지 무시 (세대 {})", generation);
            return false;
        }
        if self.state == ConnectionState::Connected {
            return false;
        }

        self.state = ConnectionState::Connected;
        let address = self.address.as_deref().unwrap_or_default();
        info!("서버 연결됨: {}", address);
        self.status
            .set_connection_status(format!("Connected to {address}"), Duration::ZERO);
        true
    }

    /// 연결 끊김 처리: 연결 해제 후 정책에 따라 재연결 예약
    pub(crate) async fn on_disconnected(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            debug!("이전 연결의 끊김 통지 무시 (세대 {})", generation);
            return false;
        }

        let address = self.address.clone().unwrap_or_default();
        warn!("서버 연결 끊김: {}", address);
        self.status
            .set_connection_status(format!("Disconnected from {address}"), Duration::ZERO);

        self.release_client(self.delete_local_files).await;
        self.state = ConnectionState::Disconnected;

        if self.policy.enabled {
            self.schedule_reconnect();
        }
        true
    }

    /// 재연결 시각 도래: 같은 주소로 다시 연결
    pub(crate) async fn on_reconnect_due(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.state != ConnectionState::Reconnecting {
            debug!("취소된 재연결 무시 (세대 {})", generation);
            return false;
        }
        let Some(address) = self.address.clone() else {
            return false;
        };

        info!("재연결 시도: {}", address);
        self.connect(&address, self.policy, self.delete_local_files)
            .await;
        true
    }

    /// 연결 해제 (연결이 없으면 no-op)
    ///
    /// 대기 중인 재연결도 취소하며, 이후 도착하는 이전 연결 통지는 무시된다.
    pub(crate) async fn dispose(&mut self, delete_local_files: bool) {
        self.cancel_reconnect();
        self.release_client(delete_local_files).await;
        self.generation += 1;
        self.state = ConnectionState::Disconnected;
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation && self.client.is_some()
    }

    fn schedule_reconnect(&mut self) {
        let timeout = self.policy.timeout;
        let generation = self.generation;
        info!("{:?} 후 재연결 예약", timeout);

        self.state = ConnectionState::Reconnecting;
        self.status.set_connection_status("Reconnecting", timeout);

        let events = self.events.clone();
        let mut timer = CountdownTimer::new(timeout);
        timer.start(move |event| {
            if event == TimerEvent::Elapsed {
                let _ = events.send(SessionEvent::ReconnectDue { generation });
            }
        });
        self.reconnect_timer = Some(timer);
    }

    fn cancel_reconnect(&mut self) {
        if let Some(mut timer) = self.reconnect_timer.take() {
            timer.dispose();
        }
    }

    async fn release_client(&mut self, delete_local_files: bool) {
        if let Some(client) = self.client.take() {
            debug!("연결 해제 (로컬 파일 삭제: {})", delete_local_files);
            client.dispose(delete_local_files).await;
        }
    }
}
