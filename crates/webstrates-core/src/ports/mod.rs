//! 포트 인터페이스 (trait).
//!
//! 원격 동기화 클라이언트와 호스트 편집기는 세션 컨트롤러 바깥의 협력자다.
//! 각 어댑터가 이 trait들을 구현하며, `webstrates-session`에서 `Arc<dyn T>`로 주입한다.

pub mod notifier;
pub mod status;
pub mod sync;
