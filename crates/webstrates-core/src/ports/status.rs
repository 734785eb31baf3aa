//! 상태 표시 포트.
//!
//! 구현: 호스트 편집기의 상태 표시줄 항목

/// 상태 텍스트 출력 대상
///
/// 타이머 콜백에서 동기적으로 호출되므로 블로킹하지 않아야 한다.
pub trait StatusSink: Send + Sync {
    /// 표시 텍스트 교체
    fn set_text(&self, text: &str);
}
