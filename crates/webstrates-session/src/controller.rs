//! 세션 컨트롤러.
//!
//! 서버 세션, 문서 구독 관리자, 상태 표시기를 와이어링하고
//! 편집기 이벤트를 저장/닫기/요청 또는 재바인딩으로 분배한다.
//! 모든 이벤트는 단일 큐에서 순서대로 처리된다.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};
use webstrates_core::config::WorkspaceConfig;
use webstrates_core::config_manager::ConfigManager;
use webstrates_core::error::CoreError;
use webstrates_core::models::document::LocalDocument;
use webstrates_core::models::error_code::{ErrorCode, Notice};
use webstrates_core::models::event::{DocumentEvent, LinkEvent};
use webstrates_core::ports::notifier::UserNotifier;
use webstrates_core::ports::sync::{DocumentEventSink, RemoteDocument, SyncConnector};

use crate::binding::{react, DocumentBindings, ERROR_LABEL};
use crate::event::{EditorEvent, SessionEvent, SessionSender, SessionSnapshot};
use crate::server_session::ServerSession;
use crate::status::StatusReporter;

/// 워크스페이스 없이 요청했을 때의 안내
const OPEN_WORKSPACE_FIRST: &str = "Open workspace first.";

/// 서버 연결 없이 저장/닫기/요청했을 때의 안내
const NOT_CONNECTED: &str = "Not connected to the Webstrates server.";

/// 시작 메시지와 표시 시간
const LOADED_MESSAGE: &str = "Webstrates Editor successfully loaded.";
const LOADED_MESSAGE_TIMEOUT: Duration = Duration::from_secs(3);

/// 컨트롤러 핸들: 호스트 편집기가 이벤트를 전달하는 진입점
///
/// 모든 핸들이 드롭되면 컨트롤러는 `shutdown()`과 같은 정리를 거쳐 종료한다.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ControllerHandle {
    /// 문서 열림
    pub fn document_opened(&self, document: LocalDocument) -> Result<(), CoreError> {
        self.send_editor(EditorEvent::DocumentOpened(document))
    }

    /// 문서 저장됨
    pub fn document_saved(&self, document: LocalDocument) -> Result<(), CoreError> {
        self.send_editor(EditorEvent::DocumentSaved(document))
    }

    /// 문서 닫힘
    pub fn document_closed(&self, document: LocalDocument) -> Result<(), CoreError> {
        self.send_editor(EditorEvent::DocumentClosed(document))
    }

    /// 포커스 변경
    pub fn focus_changed(&self, document: Option<LocalDocument>) -> Result<(), CoreError> {
        self.send_editor(EditorEvent::FocusChanged(document))
    }

    /// Webstrate 요청
    pub fn request_webstrate(
        &self,
        id: impl Into<String>,
        target: Option<LocalDocument>,
    ) -> Result<(), CoreError> {
        self.send_editor(EditorEvent::RequestWebstrate {
            id: id.into(),
            target,
        })
    }

    /// 워크스페이스 초기화
    pub fn init_workspace(&self) -> Result<(), CoreError> {
        self.send_editor(EditorEvent::InitWorkspace)
    }

    /// 편집기 이벤트 전달
    pub fn send_editor(&self, event: EditorEvent) -> Result<(), CoreError> {
        self.send(SessionEvent::Editor(event))
    }

    /// 앞선 이벤트를 모두 처리한 뒤의 상태 스냅샷
    pub async fn snapshot(&self) -> Result<SessionSnapshot, CoreError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionEvent::Snapshot(tx))?;
        rx.await.map_err(|_| stopped())
    }

    /// 컨트롤러 종료: 리소스 해제가 끝날 때까지 대기
    pub async fn shutdown(&self) -> Result<(), CoreError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionEvent::Shutdown(tx))?;
        rx.await.map_err(|_| stopped())
    }

    fn send(&self, event: SessionEvent) -> Result<(), CoreError> {
        self.tx.send(event).map_err(|_| stopped())
    }
}

fn stopped() -> CoreError {
    CoreError::Internal("세션 컨트롤러 종료됨".to_string())
}

/// 세션 컨트롤러
pub struct SessionController {
    config: ConfigManager,
    notifier: Arc<dyn UserNotifier>,
    status: Arc<StatusReporter>,
    session: ServerSession,
    bindings: DocumentBindings,
    focused: Option<LocalDocument>,
    tx: SessionSender,
    rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionController {
    /// 새 컨트롤러와 핸들 생성
    pub fn new(
        config: ConfigManager,
        connector: Arc<dyn SyncConnector>,
        notifier: Arc<dyn UserNotifier>,
        status: Arc<StatusReporter>,
    ) -> (Self, ControllerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let events = SessionSender::new(&tx);
        let session = ServerSession::new(connector, status.clone(), events.clone());
        let controller = Self {
            config,
            notifier,
            status,
            session,
            bindings: DocumentBindings::new(),
            focused: None,
            tx: events,
            rx,
        };
        (controller, ControllerHandle { tx })
    }

    /// 이벤트 루프 실행: 서버에 연결한 뒤 종료 요청(또는 모든 핸들 드롭)까지 이벤트 처리
    pub async fn run(mut self) {
        info!("Webstrates 세션 컨트롤러 시작");
        self.status
            .show_operation_message(LOADED_MESSAGE, LOADED_MESSAGE_TIMEOUT);
        self.connect_to_server().await;

        let mut shutdown_reply = None;
        while let Some(event) = self.rx.recv().await {
            debug!("세션 이벤트: {:?}", event);
            match event {
                SessionEvent::Editor(event) => self.handle_editor(event).await,
                SessionEvent::Link { generation, event } => {
                    self.handle_link(generation, event).await
                }
                SessionEvent::ReconnectDue { generation } => {
                    self.session.on_reconnect_due(generation).await;
                }
                SessionEvent::Resolved {
                    generation,
                    document,
                    result,
                } => self.handle_resolved(generation, document, result).await,
                SessionEvent::Document { generation, event } => {
                    self.handle_document(generation, event).await
                }
                SessionEvent::Snapshot(reply) => {
                    let _ = reply.send(self.snapshot());
                }
                SessionEvent::Shutdown(done) => {
                    shutdown_reply = Some(done);
                    break;
                }
            }
        }

        if shutdown_reply.is_none() {
            info!("컨트롤러 핸들이 모두 해제됨");
        }
        self.shutdown().await;
        if let Some(done) = shutdown_reply {
            let _ = done.send(());
        }
        info!("Webstrates 세션 컨트롤러 종료");
    }

    /// 설정을 다시 읽고 서버에 (재)연결
    async fn connect_to_server(&mut self) {
        let config = self.load_config().await;
        self.session
            .connect(
                &config.server_address,
                config.reconnect_policy(),
                config.delete_local_files_on_close,
            )
            .await;
    }

    /// 설정 로드: 실패하면 사용자에게 알리고 기본값 사용
    async fn load_config(&self) -> WorkspaceConfig {
        match self.config.load() {
            Ok(config) => config,
            Err(e) => {
                error!("설정 로드 실패, 기본값 사용: {e}");
                self.notify(&Notice::error(
                    "Invalid Webstrates configuration. Using default settings.",
                ))
                .await;
                WorkspaceConfig::default()
            }
        }
    }

    async fn handle_editor(&mut self, event: EditorEvent) {
        match event {
            EditorEvent::DocumentOpened(document) => self.bind(document),
            EditorEvent::FocusChanged(Some(document)) => {
                self.focused = Some(document.clone());
                self.bind(document);
            }
            EditorEvent::FocusChanged(None) => {
                self.focused = None;
            }
            EditorEvent::DocumentSaved(document) => self.save(document).await,
            EditorEvent::DocumentClosed(document) => self.close(document).await,
            EditorEvent::RequestWebstrate { id, target } => {
                self.request_webstrate(id, target).await
            }
            EditorEvent::InitWorkspace => self.init_workspace().await,
        }
    }

    async fn handle_link(&mut self, generation: u64, event: LinkEvent) {
        match event {
            LinkEvent::Connected => {
                if self.session.on_connected(generation) {
                    if let Some(document) = self.focused.clone() {
                        self.bind(document);
                    }
                }
            }
            LinkEvent::Disconnected => {
                self.session.on_disconnected(generation).await;
            }
        }
    }

    /// 문서 재바인딩: 열기/포커스/재연결 경로가 모두 이곳을 지난다
    fn bind(&mut self, document: LocalDocument) {
        let generation = self.bindings.begin(document.clone());

        let Some(client) = self.session.connected_client() else {
            debug!("서버 미연결 - 연결 후 바인딩: {}", document);
            return;
        };

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.remote_document(&document).await;
            let _ = tx.send(SessionEvent::Resolved {
                generation,
                document,
                result,
            });
        });
    }

    async fn handle_resolved(
        &mut self,
        generation: u64,
        document: LocalDocument,
        result: Result<Arc<dyn RemoteDocument>, CoreError>,
    ) {
        match result {
            Ok(remote) => {
                let sink = self.document_sink(generation);
                self.bindings.attach(generation, document, remote, sink);
            }
            Err(e) => {
                if !self.bindings.resolution_failed(generation, &document) {
                    return;
                }
                warn!("원격 문서 조회 실패: {}: {e}", document);
                self.notify(&ErrorCode::WebstrateNotFound.notice(&document.id()))
                    .await;
            }
        }
    }

    fn document_sink(&self, generation: u64) -> DocumentEventSink {
        let tx = self.tx.clone();
        DocumentEventSink::new(move |event| {
            let _ = tx.send(SessionEvent::Document { generation, event });
        })
    }

    async fn handle_document(&mut self, generation: u64, event: DocumentEvent) {
        if !self.bindings.is_active(generation) {
            debug!("이전 바인딩의 문서 이벤트 무시: {}", event.kind());
            return;
        }
        let document_id = self.bindings.remote_id().unwrap_or_default().to_string();

        let reaction = react(&event, &document_id);
        if let Some((label, spin)) = reaction.status {
            self.status.set_operation_status(label, spin);
        }
        if let Some(notice) = reaction.notice {
            if let DocumentEvent::Error(error) = &event {
                warn!("원격 문서 에러: {} ({:?})", document_id, error);
            }
            self.notify(&notice).await;
        }
    }

    /// 저장: 워크스페이스 설정 파일이면 재연결
    async fn save(&mut self, document: LocalDocument) {
        if self.config.is_config_file(document.path()) {
            info!("워크스페이스 설정 변경 - 서버 재연결");
            self.connect_to_server().await;
            return;
        }

        let Some(client) = self.session.client() else {
            warn!("서버 미연결 - 저장 불가: {}", document);
            self.notify(&Notice::error(NOT_CONNECTED)).await;
            return;
        };
        if let Err(e) = client.save_document(&document).await {
            warn!("Webstrate 저장 실패: {}: {e}", document);
            self.notify(&Notice::error(format!(
                "Failed to save webstrate '{}'.",
                document.id()
            )))
            .await;
        }
    }

    /// 닫기: 설정에 따라 로컬 파일 삭제, 바인딩 해제
    async fn close(&mut self, document: LocalDocument) {
        if self.bindings.release_document(&document) {
            debug!("닫힌 문서 바인딩 해제: {}", document);
        }
        if self.focused.as_ref() == Some(&document) {
            self.focused = None;
        }

        let delete_local_file = self.load_config().await.delete_local_files_on_close;
        let Some(client) = self.session.client() else {
            warn!("서버 미연결 - 닫기 통지 불가: {}", document);
            self.notify(&Notice::error(NOT_CONNECTED)).await;
            return;
        };
        if let Err(e) = client.close_document(&document, delete_local_file).await {
            warn!("Webstrate 닫기 실패: {}: {e}", document);
            self.notify(&Notice::error(format!(
                "Failed to close webstrate '{}'.",
                document.id()
            )))
            .await;
        }
    }

    async fn request_webstrate(&mut self, id: String, target: Option<LocalDocument>) {
        let Some(root) = self.config.workspace_root().map(|p| p.to_path_buf()) else {
            self.notify(&Notice::info(OPEN_WORKSPACE_FIRST)).await;
            return;
        };

        // 입력 취소
        let id = id.trim().to_string();
        if id.is_empty() {
            return;
        }

        let local_path: PathBuf = match target {
            Some(document) => document.path().to_path_buf(),
            None => root.join(&id),
        };

        let Some(client) = self.session.client() else {
            warn!("서버 미연결 - 요청 불가: {}", id);
            self.notify(&Notice::error(NOT_CONNECTED)).await;
            return;
        };

        // 요청한 문서가 열려 바인딩되면 다음 상태로 교체된다
        self.status
            .set_operation_status(format!("Requesting {id}"), Duration::ZERO);

        info!("Webstrate 요청: {} → {}", id, local_path.display());
        if let Err(e) = client.request_document(&id, &local_path).await {
            warn!("Webstrate 요청 실패: {}: {e}", id);
            self.status.set_operation_status(ERROR_LABEL, Duration::ZERO);
            self.notify(&Notice::error(format!("Failed to request webstrate '{id}'.")))
                .await;
        }
    }

    async fn init_workspace(&mut self) {
        let notice = match self.config.init_workspace() {
            Ok(true) => Notice::info("Webstrates workspace initialized."),
            Ok(false) => Notice::info("Webstrates workspace is already initialized."),
            Err(CoreError::NoWorkspace) => Notice::info(OPEN_WORKSPACE_FIRST),
            Err(e) => {
                error!("워크스페이스 초기화 실패: {e}");
                Notice::error("Failed to initialize Webstrates workspace.")
            }
        };
        self.notify(&notice).await;
    }

    async fn shutdown(&mut self) {
        info!("세션 정리 시작");
        self.bindings.release();
        let delete_local_files = self.load_config().await.delete_local_files_on_close;
        self.session.dispose(delete_local_files).await;
        self.status.dispose();
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            connection: self.session.state(),
            connection_generation: self.session.generation(),
            address: self.session.address().map(str::to_string),
            focused: self.focused.clone(),
            bound: self.bindings.bound_document().cloned(),
            live_subscriptions: self.bindings.live_subscriptions(),
        }
    }

    async fn notify(&self, notice: &Notice) {
        if let Err(e) = self.notifier.show(notice).await {
            warn!("사용자 메시지 표시 실패: {e}");
        }
    }
}
