//! 문서 구독 관리.
//!
//! 포커스된 로컬 문서 하나만 원격 문서의 여섯 가지 수명주기 이벤트에 바인딩한다.
//! 새 문서를 바인딩하기 전에 이전 문서의 구독을 모두 해제하고,
//! 세대(generation) 번호로 늦게 도착한 조회 결과와 이벤트를 걸러낸다.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use webstrates_core::models::document::LocalDocument;
use webstrates_core::models::error_code::{ErrorCode, Notice};
use webstrates_core::models::event::{DocumentEvent, DocumentEventKind};
use webstrates_core::ports::sync::{DocumentEventSink, RemoteDocument, SubscriptionId};

/// 문서 연결 시 스피너 시간
pub const CONNECT_SPIN: Duration = Duration::from_millis(1_000);

/// 업데이트 수신 시 스피너 시간
pub const UPDATE_SPIN: Duration = Duration::from_millis(3_000);

/// 동기화 상태 라벨
pub const SYNC_LABEL: &str = "Sync";

/// 에러 상태 라벨
pub const ERROR_LABEL: &str = "Error";

/// 구독 핸들: 드롭하면 구독 해제
pub struct Subscription {
    document: Arc<dyn RemoteDocument>,
    id: SubscriptionId,
}

impl Subscription {
    fn new(document: Arc<dyn RemoteDocument>, kind: DocumentEventKind, sink: DocumentEventSink) -> Self {
        let id = document.subscribe(kind, sink);
        Self { document, id }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.document.unsubscribe(self.id);
    }
}

/// 바인딩 하나의 여섯 구독 슬롯
#[derive(Default)]
struct BindingHandles {
    connect: Option<Subscription>,
    disconnect: Option<Subscription>,
    new: Option<Subscription>,
    update: Option<Subscription>,
    update_op: Option<Subscription>,
    error: Option<Subscription>,
}

impl BindingHandles {
    fn subscribe_all(document: &Arc<dyn RemoteDocument>, sink: &DocumentEventSink) -> Self {
        let mut handles = Self::default();
        for kind in DocumentEventKind::ALL {
            *handles.slot_mut(kind) = Some(Subscription::new(document.clone(), kind, sink.clone()));
        }
        handles
    }

    fn slot_mut(&mut self, kind: DocumentEventKind) -> &mut Option<Subscription> {
        match kind {
            DocumentEventKind::Connect => &mut self.connect,
            DocumentEventKind::Disconnect => &mut self.disconnect,
            DocumentEventKind::New => &mut self.new,
            DocumentEventKind::Update => &mut self.update,
            DocumentEventKind::UpdateOp => &mut self.update_op,
            DocumentEventKind::Error => &mut self.error,
        }
    }

    fn live(&self) -> usize {
        [
            &self.connect,
            &self.disconnect,
            &self.new,
            &self.update,
            &self.update_op,
            &self.error,
        ]
        .iter()
        .filter(|slot| slot.is_some())
        .count()
    }

    /// 모든 슬롯 해제, 해제한 개수 반환
    fn release_all(&mut self) -> usize {
        DocumentEventKind::ALL
            .into_iter()
            .filter_map(|kind| self.slot_mut(kind).take())
            .count()
    }
}

/// 활성 바인딩
struct ActiveBinding {
    document: LocalDocument,
    remote: Arc<dyn RemoteDocument>,
    handles: BindingHandles,
}

/// 문서 구독 관리자
///
/// 어느 순간에도 구독을 가진 문서는 최대 하나다.
#[derive(Default)]
pub struct DocumentBindings {
    generation: u64,
    /// 원격 문서 조회 중인 문서
    pending: Option<LocalDocument>,
    active: Option<ActiveBinding>,
}

impl DocumentBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// 현재 세대
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 재바인딩 시작: 이전 구독을 모두 해제하고 새 세대 번호 반환
    pub fn begin(&mut self, document: LocalDocument) -> u64 {
        self.release();
        debug!("문서 바인딩 시작: {} (세대 {})", document, self.generation);
        self.pending = Some(document);
        self.generation
    }

    /// 조회 결과가 현재 대기 중인 바인딩의 것인지
    pub fn is_pending(&self, generation: u64, document: &LocalDocument) -> bool {
        generation == self.generation && self.pending.as_ref() == Some(document)
    }

    /// 조회된 원격 문서에 여섯 이벤트 구독
    ///
    /// 오래된 조회 결과면 구독하지 않고 `false`.
    pub fn attach(
        &mut self,
        generation: u64,
        document: LocalDocument,
        remote: Arc<dyn RemoteDocument>,
        sink: DocumentEventSink,
    ) -> bool {
        if !self.is_pending(generation, &document) {
            debug!("오래된 조회 결과 무시: {} (세대 {})", document, generation);
            return false;
        }
        self.pending = None;

        let handles = BindingHandles::subscribe_all(&remote, &sink);
        info!("문서 바인딩 완료: {} → {}", document, remote.id());
        self.active = Some(ActiveBinding {
            document,
            remote,
            handles,
        });
        true
    }

    /// 조회 실패 처리: 현재 세대의 실패면 대기 상태 해제 후 `true`
    pub fn resolution_failed(&mut self, generation: u64, document: &LocalDocument) -> bool {
        if !self.is_pending(generation, document) {
            return false;
        }
        self.pending = None;
        true
    }

    /// 활성 바인딩과 대기 중인 조회를 모두 해제
    ///
    /// 세대를 올려 큐에 남은 이전 이벤트를 무효화한다.
    pub fn release(&mut self) -> bool {
        self.generation += 1;
        self.pending = None;
        match self.active.take() {
            Some(mut binding) => {
                let released = binding.handles.release_all();
                debug!("문서 바인딩 해제: {} (구독 {}개)", binding.document, released);
                true
            }
            None => false,
        }
    }

    /// 주어진 문서가 바인딩(또는 조회) 중이면 해제
    pub fn release_document(&mut self, document: &LocalDocument) -> bool {
        let bound = self.bound_document() == Some(document) || self.pending.as_ref() == Some(document);
        if bound {
            self.release();
        }
        bound
    }

    /// 이벤트가 현재 활성 바인딩의 것인지
    pub fn is_active(&self, generation: u64) -> bool {
        generation == self.generation && self.active.is_some()
    }

    /// 바인딩된 로컬 문서
    pub fn bound_document(&self) -> Option<&LocalDocument> {
        self.active.as_ref().map(|binding| &binding.document)
    }

    /// 조회 중인 로컬 문서
    pub fn pending_document(&self) -> Option<&LocalDocument> {
        self.pending.as_ref()
    }

    /// 바인딩된 원격 문서 ID
    pub fn remote_id(&self) -> Option<&str> {
        self.active.as_ref().map(|binding| binding.remote.id())
    }

    /// 살아 있는 구독 수
    pub fn live_subscriptions(&self) -> usize {
        self.active
            .as_ref()
            .map_or(0, |binding| binding.handles.live())
    }
}

/// 문서 이벤트에 대한 반응
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReaction {
    /// 작업 상태 (라벨, 스핀 시간: 0이면 무기한)
    pub status: Option<(&'static str, Duration)>,
    /// 사용자 알림
    pub notice: Option<Notice>,
}

/// 원격 문서 이벤트를 상태/알림으로 변환
pub fn react(event: &DocumentEvent, document_id: &str) -> DocumentReaction {
    match event {
        DocumentEvent::Connect => DocumentReaction {
            status: Some((SYNC_LABEL, CONNECT_SPIN)),
            notice: None,
        },
        DocumentEvent::Disconnect => DocumentReaction {
            status: Some((SYNC_LABEL, Duration::ZERO)),
            notice: None,
        },
        DocumentEvent::New => DocumentReaction {
            status: None,
            notice: Some(ErrorCode::WebstrateNotFound.notice(document_id)),
        },
        DocumentEvent::Update | DocumentEvent::UpdateOp => DocumentReaction {
            status: Some((SYNC_LABEL, UPDATE_SPIN)),
            notice: None,
        },
        DocumentEvent::Error(error) => {
            let notice = match error.as_ref().and_then(|e| e.error_code()) {
                Some(code) => code.notice(document_id),
                None => Notice::unknown_error(),
            };
            DocumentReaction {
                status: Some((ERROR_LABEL, Duration::ZERO)),
                notice: Some(notice),
            }
        }
    }
}
