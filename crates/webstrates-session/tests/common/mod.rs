//! 통합 테스트용 포트 대역.
//!
//! 인메모리 서버(문서 레지스트리), 커넥터, 클라이언트, 원격 문서,
//! 상태 싱크와 알림 기록기를 제공한다.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use webstrates_core::config_manager::ConfigManager;
use webstrates_core::error::CoreError;
use webstrates_core::models::document::LocalDocument;
use webstrates_core::models::event::{DocumentEvent, DocumentEventKind};
use webstrates_core::ports::notifier::UserNotifier;
use webstrates_core::ports::status::StatusSink;
use webstrates_core::ports::sync::{
    DocumentEventSink, LinkNotifier, RemoteDocument, SubscriptionId, SyncClient, SyncConnector,
};
use webstrates_session::{ControllerHandle, SessionController, SessionSnapshot, StatusReporter};

/// 테스트 로그 초기화 (`RUST_LOG`로 조절, 기본 warn)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("webstrates_session=warn")),
        )
        .with_test_writer()
        .try_init();
}

/// 서버 측 구독 집계: 모든 문서의 살아 있는 구독 수와 최고치
#[derive(Default)]
pub struct SubscriptionLedger {
    live: Mutex<usize>,
    peak: Mutex<usize>,
}

impl SubscriptionLedger {
    fn added(&self) {
        let mut live = self.live.lock();
        *live += 1;
        let mut peak = self.peak.lock();
        *peak = (*peak).max(*live);
    }

    fn removed(&self) {
        *self.live.lock() -= 1;
    }

    pub fn live(&self) -> usize {
        *self.live.lock()
    }

    pub fn peak(&self) -> usize {
        *self.peak.lock()
    }
}

/// 원격 문서 대역
pub struct FakeRemoteDocument {
    id: String,
    next_id: AtomicU64,
    subscriptions: Mutex<HashMap<u64, (DocumentEventKind, DocumentEventSink)>>,
    ledger: Arc<SubscriptionLedger>,
}

impl FakeRemoteDocument {
    /// 해당 종류를 구독한 수신기에 이벤트 전달
    pub fn emit(&self, event: DocumentEvent) {
        let sinks: Vec<_> = self
            .subscriptions
            .lock()
            .values()
            .filter(|(kind, _)| *kind == event.kind())
            .map(|(_, sink)| sink.clone())
            .collect();
        for sink in sinks {
            sink.emit(event.clone());
        }
    }

    pub fn live(&self) -> usize {
        self.subscriptions.lock().len()
    }

    pub fn subscribed_kinds(&self) -> Vec<DocumentEventKind> {
        let mut kinds: Vec<_> = self.subscriptions.lock().values().map(|(k, _)| *k).collect();
        kinds.sort_by_key(|k| DocumentEventKind::ALL.iter().position(|a| a == k));
        kinds
    }
}

impl RemoteDocument for FakeRemoteDocument {
    fn id(&self) -> &str {
        &self.id
    }

    fn subscribe(&self, kind: DocumentEventKind, sink: DocumentEventSink) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscriptions.lock().insert(id, (kind, sink));
        self.ledger.added();
        SubscriptionId(id)
    }

    fn unsubscribe(&self, subscription: SubscriptionId) {
        if self.subscriptions.lock().remove(&subscription.0).is_some() {
            self.ledger.removed();
        }
    }
}

/// 인메모리 서버: 커넥터와 클라이언트가 공유
#[derive(Default)]
pub struct FakeServer {
    documents: Mutex<HashMap<String, Arc<FakeRemoteDocument>>>,
    resolve_delays: Mutex<HashMap<String, Duration>>,
    pub ledger: Arc<SubscriptionLedger>,
}

impl FakeServer {
    /// 서버에 문서 생성
    pub fn add_document(&self, id: &str) -> Arc<FakeRemoteDocument> {
        let document = Arc::new(FakeRemoteDocument {
            id: id.to_string(),
            next_id: AtomicU64::new(1),
            subscriptions: Mutex::new(HashMap::new()),
            ledger: self.ledger.clone(),
        });
        self.documents
            .lock()
            .insert(id.to_string(), document.clone());
        document
    }

    /// 문서 조회 지연 설정
    pub fn delay_resolution(&self, id: &str, delay: Duration) {
        self.resolve_delays.lock().insert(id.to_string(), delay);
    }

    fn find(&self, id: &str) -> Option<Arc<FakeRemoteDocument>> {
        self.documents.lock().get(id).cloned()
    }

    fn delay(&self, id: &str) -> Duration {
        self.resolve_delays
            .lock()
            .get(id)
            .copied()
            .unwrap_or_default()
    }
}

/// 동기화 클라이언트 대역: 호출 기록
pub struct FakeClient {
    server: Arc<FakeServer>,
    pub address: String,
    pub saved: Mutex<Vec<LocalDocument>>,
    pub closed: Mutex<Vec<(LocalDocument, bool)>>,
    pub requested: Mutex<Vec<(String, PathBuf)>>,
    pub disposed: Mutex<Vec<bool>>,
    /// 설정하면 저장/닫기/요청이 네트워크 에러로 실패
    pub failing: AtomicBool,
}

impl FakeClient {
    fn check_link(&self) -> Result<(), CoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CoreError::Network(format!("{} 응답 없음", self.address)));
        }
        Ok(())
    }
}

#[async_trait]
impl SyncClient for FakeClient {
    async fn remote_document(
        &self,
        document: &LocalDocument,
    ) -> Result<Arc<dyn RemoteDocument>, CoreError> {
        let id = document.id();
        let delay = self.server.delay(&id);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match self.server.find(&id) {
            Some(remote) => Ok(remote),
            None => Err(CoreError::webstrate_not_found(id)),
        }
    }

    async fn request_document(&self, id: &str, local_path: &Path) -> Result<(), CoreError> {
        self.check_link()?;
        self.requested
            .lock()
            .push((id.to_string(), local_path.to_path_buf()));
        Ok(())
    }

    async fn save_document(&self, document: &LocalDocument) -> Result<(), CoreError> {
        self.check_link()?;
        self.saved.lock().push(document.clone());
        Ok(())
    }

    async fn close_document(
        &self,
        document: &LocalDocument,
        delete_local_file: bool,
    ) -> Result<(), CoreError> {
        self.check_link()?;
        self.closed.lock().push((document.clone(), delete_local_file));
        Ok(())
    }

    async fn dispose(&self, delete_local_files: bool) {
        self.disposed.lock().push(delete_local_files);
    }
}

/// 커넥터가 연 연결 하나
#[derive(Clone)]
pub struct OpenedLink {
    pub address: String,
    pub link: LinkNotifier,
    pub client: Arc<FakeClient>,
}

/// 커넥터 대역: 연 연결을 모두 기록
pub struct FakeConnector {
    server: Arc<FakeServer>,
    opened: Mutex<Vec<OpenedLink>>,
}

impl FakeConnector {
    pub fn new(server: Arc<FakeServer>) -> Self {
        Self {
            server,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().len()
    }

    pub fn opened(&self, index: usize) -> OpenedLink {
        self.opened.lock()[index].clone()
    }

    pub fn latest(&self) -> OpenedLink {
        self.opened
            .lock()
            .last()
            .cloned()
            .expect("연결 기록 없음")
    }
}

impl SyncConnector for FakeConnector {
    fn open(&self, address: &str, link: LinkNotifier) -> Arc<dyn SyncClient> {
        let client = Arc::new(FakeClient {
            server: self.server.clone(),
            address: address.to_string(),
            saved: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
            requested: Mutex::new(Vec::new()),
            disposed: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        });
        self.opened.lock().push(OpenedLink {
            address: address.to_string(),
            link,
            client: client.clone(),
        });
        client
    }
}

/// 상태 싱크 기록기
#[derive(Default)]
pub struct RecordingSink {
    texts: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn last(&self) -> Option<String> {
        self.texts.lock().last().cloned()
    }

    pub fn all(&self) -> Vec<String> {
        self.texts.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.texts.lock().len()
    }
}

impl StatusSink for RecordingSink {
    fn set_text(&self, text: &str) {
        self.texts.lock().push(text.to_string());
    }
}

/// 표시된 사용자 메시지
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Info(String),
    Warning(String),
    Error(String),
}

/// 사용자 메시지 기록기
#[derive(Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Shown>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Shown> {
        self.shown.lock().clone()
    }
}

#[async_trait]
impl UserNotifier for RecordingNotifier {
    async fn show_info(&self, message: &str) -> Result<(), CoreError> {
        self.shown.lock().push(Shown::Info(message.to_string()));
        Ok(())
    }

    async fn show_warning(&self, message: &str) -> Result<(), CoreError> {
        self.shown.lock().push(Shown::Warning(message.to_string()));
        Ok(())
    }

    async fn show_error(&self, message: &str) -> Result<(), CoreError> {
        self.shown.lock().push(Shown::Error(message.to_string()));
        Ok(())
    }
}

/// 실행 중인 컨트롤러와 대역 묶음
pub struct Harness {
    pub handle: ControllerHandle,
    pub server: Arc<FakeServer>,
    pub connector: Arc<FakeConnector>,
    pub notifier: Arc<RecordingNotifier>,
    pub status: Arc<StatusReporter>,
    pub connection_sink: Arc<RecordingSink>,
    pub operation_sink: Arc<RecordingSink>,
    pub task: tokio::task::JoinHandle<()>,
}

impl Harness {
    /// 워크스페이스 루트로 컨트롤러 시작
    pub fn start(workspace_root: Option<PathBuf>) -> Self {
        init_tracing();
        let server = Arc::new(FakeServer::default());
        let connector = Arc::new(FakeConnector::new(server.clone()));
        let notifier = Arc::new(RecordingNotifier::default());
        let connection_sink = Arc::new(RecordingSink::default());
        let operation_sink = Arc::new(RecordingSink::default());
        let status = Arc::new(StatusReporter::new(
            connection_sink.clone(),
            operation_sink.clone(),
        ));

        let (controller, handle) = SessionController::new(
            ConfigManager::new(workspace_root),
            connector.clone(),
            notifier.clone(),
            status.clone(),
        );
        let task = tokio::spawn(controller.run());

        Self {
            handle,
            server,
            connector,
            notifier,
            status,
            connection_sink,
            operation_sink,
            task,
        }
    }

    /// 대기 중인 작업을 모두 처리한 뒤 스냅샷
    pub async fn settle(&self) -> SessionSnapshot {
        tokio::time::sleep(Duration::from_millis(1)).await;
        self.handle.snapshot().await.expect("컨트롤러 실행 중")
    }

    /// 최신 연결을 수립 상태로 전환
    pub async fn connect_latest(&self) -> SessionSnapshot {
        self.settle().await;
        self.connector.latest().link.connected();
        self.settle().await
    }
}

/// 워크스페이스 안의 로컬 문서
pub fn doc(root: &Path, id: &str) -> LocalDocument {
    LocalDocument::new(root.join(id))
}

/// 워크스페이스 설정 파일 작성
pub fn write_config(root: &Path, json: &str) -> PathBuf {
    let dir = root.join(".webstrates");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    std::fs::write(&path, json).unwrap();
    path
}
