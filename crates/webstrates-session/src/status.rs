//! 상태 표시기.
//!
//! 연결 상태(지속 텍스트 + 카운트다운)와 작업 상태(스피너 후 최종 라벨)를
//! 각각 독립된 타이머로 갱신한다. 표시기마다 살아 있는 타이머는 최대 하나이며,
//! 새 상태를 설정하면 이전 타이머를 먼저 해제한 뒤 새 타이머를 시작한다.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use webstrates_core::ports::status::StatusSink;

use crate::timer::{CountdownTimer, TimerEvent};

/// 스피너 프레임
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// 스피너 프레임 간격
pub const SPINNER_FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// 카운트다운 갱신 간격
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

/// 표시 중인 상태
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorDisplay {
    /// 화면에 보이는 텍스트
    pub text: String,
    /// 접미사/스피너를 제외한 라벨
    pub label: String,
    /// 스피너 애니메이션 중인지
    pub spinning: bool,
    /// 카운트다운 남은 시간
    pub remaining: Option<Duration>,
}

/// 타이머 하나를 소유하는 상태 표시기
pub struct StatusIndicator {
    name: &'static str,
    sink: Arc<dyn StatusSink>,
    display: Arc<Mutex<IndicatorDisplay>>,
    timer: Mutex<Option<CountdownTimer>>,
}

impl StatusIndicator {
    pub fn new(name: &'static str, sink: Arc<dyn StatusSink>) -> Self {
        Self {
            name,
            sink,
            display: Arc::new(Mutex::new(IndicatorDisplay::default())),
            timer: Mutex::new(None),
        }
    }

    /// 현재 표시 상태
    pub fn display(&self) -> IndicatorDisplay {
        self.display.lock().clone()
    }

    /// 현재 표시 텍스트
    pub fn text(&self) -> String {
        self.display.lock().text.clone()
    }

    /// 현재 라벨
    pub fn label(&self) -> String {
        self.display.lock().label.clone()
    }

    /// 살아 있는 타이머 여부
    pub fn has_live_timer(&self) -> bool {
        self.timer.lock().as_ref().is_some_and(CountdownTimer::is_running)
    }

    /// 카운트다운 상태 표시
    ///
    /// 틱마다 `"{label}... {n}s"`, 경과 후(또는 `countdown`이 0이면 즉시) `label`.
    pub fn show_countdown(&self, label: impl Into<String>, countdown: Duration) {
        let label = label.into();
        debug!("{} 상태: {} (카운트다운 {:?})", self.name, label, countdown);

        let timer = if countdown.is_zero() {
            CountdownTimer::new(Duration::ZERO)
        } else {
            CountdownTimer::new(countdown).with_interval(COUNTDOWN_INTERVAL)
        };

        let render = Renderer::new(self, label.clone());
        self.replace_timer(timer, move |event| match event {
            TimerEvent::Tick { remaining, .. } => {
                let remaining = remaining.unwrap_or_default();
                render.write(
                    format!("{label}... {}s", ceil_secs(remaining)),
                    false,
                    Some(remaining),
                );
            }
            TimerEvent::Elapsed => render.write(label.clone(), false, None),
        });
    }

    /// 스피너 상태 표시
    ///
    /// 프레임마다 `"{frame} {label}"`, `spin_timeout` 경과 후 `label`.
    /// `spin_timeout`이 0이면 다음 상태 설정까지 계속 회전한다.
    pub fn show_spinner(&self, label: impl Into<String>, spin_timeout: Duration) {
        let label = label.into();
        debug!("{} 상태: {} (스핀 {:?})", self.name, label, spin_timeout);

        let timer = CountdownTimer::new(spin_timeout).with_interval(SPINNER_FRAME_INTERVAL);
        let render = Renderer::new(self, label.clone());
        self.replace_timer(timer, move |event| match event {
            TimerEvent::Tick { count, .. } => {
                let frame = SPINNER_FRAMES[(count % SPINNER_FRAMES.len() as u64) as usize];
                render.write(format!("{frame} {label}"), true, None);
            }
            TimerEvent::Elapsed => render.write(label.clone(), false, None),
        });
    }

    /// 일시 메시지 표시: `timeout` 경과 후 지운다
    pub fn show_message(&self, text: impl Into<String>, timeout: Duration) {
        let text = text.into();
        debug!("{} 메시지: {} ({:?})", self.name, text, timeout);

        // 이전 타이머를 먼저 해제해야 메시지가 덮어써지지 않는다
        let mut slot = self.timer.lock();
        if let Some(mut previous) = slot.take() {
            previous.dispose();
        }

        let render = Renderer::new(self, text.clone());
        render.write(text, false, None);
        let mut timer = CountdownTimer::new(timeout);
        timer.start(move |event| {
            if event == TimerEvent::Elapsed {
                render.clear();
            }
        });
        *slot = Some(timer);
    }

    /// 타이머 해제 (표시 텍스트는 유지)
    pub fn dispose(&self) {
        if let Some(mut timer) = self.timer.lock().take() {
            timer.dispose();
        }
    }

    /// 이전 타이머 해제 후 새 타이머 시작
    fn replace_timer<F>(&self, mut timer: CountdownTimer, handler: F)
    where
        F: FnMut(TimerEvent) + Send + 'static,
    {
        let mut slot = self.timer.lock();
        if let Some(mut previous) = slot.take() {
            previous.dispose();
        }
        timer.start(handler);
        *slot = Some(timer);
    }
}

impl Drop for StatusIndicator {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// 타이머 콜백에서 표시 상태와 싱크를 함께 갱신
struct Renderer {
    sink: Arc<dyn StatusSink>,
    display: Arc<Mutex<IndicatorDisplay>>,
    label: String,
}

impl Renderer {
    fn new(indicator: &StatusIndicator, label: String) -> Self {
        Self {
            sink: indicator.sink.clone(),
            display: indicator.display.clone(),
            label,
        }
    }

    fn write(&self, text: String, spinning: bool, remaining: Option<Duration>) {
        let mut display = self.display.lock();
        self.sink.set_text(&text);
        *display = IndicatorDisplay {
            text,
            label: self.label.clone(),
            spinning,
            remaining,
        };
    }

    fn clear(&self) {
        let mut display = self.display.lock();
        self.sink.set_text("");
        *display = IndicatorDisplay::default();
    }
}

/// 남은 시간을 올림한 초
fn ceil_secs(remaining: Duration) -> u128 {
    remaining.as_millis().div_ceil(1_000)
}

/// 연결 상태와 작업 상태 표시기 묶음
///
/// 세션 컨트롤러가 생성해 `Arc`로 공유한다.
pub struct StatusReporter {
    connection: StatusIndicator,
    operation: StatusIndicator,
}

impl StatusReporter {
    pub fn new(connection_sink: Arc<dyn StatusSink>, operation_sink: Arc<dyn StatusSink>) -> Self {
        Self {
            connection: StatusIndicator::new("연결", connection_sink),
            operation: StatusIndicator::new("작업", operation_sink),
        }
    }

    /// 연결 상태 설정 (`countdown`이 0이면 카운트다운 없음)
    pub fn set_connection_status(&self, label: impl Into<String>, countdown: Duration) {
        self.connection.show_countdown(label, countdown);
    }

    /// 작업 상태 설정 (`spin_timeout`이 0이면 무기한 스피너)
    pub fn set_operation_status(&self, label: impl Into<String>, spin_timeout: Duration) {
        self.operation.show_spinner(label, spin_timeout);
    }

    /// 작업 표시기에 일시 메시지 표시
    pub fn show_operation_message(&self, text: impl Into<String>, timeout: Duration) {
        self.operation.show_message(text, timeout);
    }

    pub fn connection(&self) -> &StatusIndicator {
        &self.connection
    }

    pub fn operation(&self) -> &StatusIndicator {
        &self.operation
    }

    /// 두 표시기의 타이머 해제
    pub fn dispose(&self) {
        self.connection.dispose();
        self.operation.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        texts: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn last(&self) -> Option<String> {
            self.texts.lock().last().cloned()
        }

        fn count(&self) -> usize {
            self.texts.lock().len()
        }
    }

    impl StatusSink for RecordingSink {
        fn set_text(&self, text: &str) {
            self.texts.lock().push(text.to_string());
        }
    }

    fn reporter() -> (StatusReporter, Arc<RecordingSink>, Arc<RecordingSink>) {
        let connection = Arc::new(RecordingSink::default());
        let operation = Arc::new(RecordingSink::default());
        let reporter = StatusReporter::new(connection.clone(), operation.clone());
        (reporter, connection, operation)
    }

    #[tokio::test(start_paused = true)]
    async fn connection_status_without_countdown_is_immediate() {
        let (reporter, sink, _) = reporter();
        reporter.set_connection_status("Connected to X", Duration::ZERO);

        assert_eq!(reporter.connection().text(), "Connected to X");
        assert_eq!(sink.last().as_deref(), Some("Connected to X"));
        assert!(!reporter.connection().has_live_timer());
    }

    #[tokio::test(start_paused = true)]
    async fn connection_countdown_then_label() {
        let (reporter, sink, _) = reporter();
        reporter.set_connection_status("Reconnecting", Duration::from_secs(10));
        assert_eq!(reporter.connection().text(), "Reconnecting... 10s");

        tokio::time::sleep(Duration::from_millis(3_050)).await;
        assert_eq!(reporter.connection().text(), "Reconnecting... 7s");
        assert_eq!(
            reporter.connection().display().remaining,
            Some(Duration::from_secs(7))
        );

        tokio::time::sleep(Duration::from_secs(7)).await;
        assert_eq!(reporter.connection().text(), "Reconnecting");
        assert_eq!(sink.last().as_deref(), Some("Reconnecting"));
        assert!(!reporter.connection().has_live_timer());
    }

    #[tokio::test(start_paused = true)]
    async fn operation_spinner_cycles_then_settles() {
        let (reporter, sink, _) = reporter();
        reporter.set_operation_status("Sync", Duration::from_secs(3));

        let display = reporter.operation().display();
        assert_eq!(display.text, format!("{} Sync", SPINNER_FRAMES[0]));
        assert!(display.spinning);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(reporter.operation().text(), format!("{} Sync", SPINNER_FRAMES[1]));

        tokio::time::sleep(Duration::from_millis(3_000)).await;
        let display = reporter.operation().display();
        assert_eq!(display.text, "Sync");
        assert!(!display.spinning);
        // 연결 표시기는 건드리지 않음
        assert_eq!(sink.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_spin_timeout_spins_until_replaced() {
        let (reporter, _, operation_sink) = reporter();
        reporter.set_operation_status("Sync", Duration::ZERO);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(reporter.operation().display().spinning);
        assert!(reporter.operation().has_live_timer());

        reporter.set_operation_status("Error", Duration::from_millis(200));
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(reporter.operation().text(), "Error");
        assert_eq!(operation_sink.last().as_deref(), Some("Error"));
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_status_leaves_single_timer() {
        let (reporter, _, operation_sink) = reporter();
        reporter.set_operation_status("Sync", Duration::ZERO);
        reporter.set_operation_status("Requesting doc", Duration::ZERO);

        tokio::time::sleep(Duration::from_millis(1_000)).await;

        // 이전 라벨로 쓰인 텍스트는 교체 이후 나타나지 않음
        let texts = operation_sink.texts.lock().clone();
        let first_replacement = texts
            .iter()
            .position(|t| t.ends_with("Requesting doc"))
            .unwrap();
        assert!(texts[first_replacement..]
            .iter()
            .all(|t| t.ends_with("Requesting doc")));
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_stops_both_indicators() {
        let (reporter, connection_sink, operation_sink) = reporter();
        reporter.set_connection_status("Reconnecting", Duration::from_secs(10));
        reporter.set_operation_status("Sync", Duration::ZERO);

        reporter.dispose();
        let (c, o) = (connection_sink.count(), operation_sink.count());

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(connection_sink.count(), c);
        assert_eq!(operation_sink.count(), o);
        assert!(!reporter.connection().has_live_timer());
        assert!(!reporter.operation().has_live_timer());
    }

    #[tokio::test(start_paused = true)]
    async fn message_clears_after_timeout() {
        let (reporter, _, operation_sink) = reporter();
        reporter.show_operation_message("Loaded.", Duration::from_secs(3));
        assert_eq!(reporter.operation().text(), "Loaded.");

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert_eq!(reporter.operation().text(), "Loaded.");

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(reporter.operation().display(), IndicatorDisplay::default());
        assert_eq!(operation_sink.last().as_deref(), Some(""));
    }

    #[tokio::test(start_paused = true)]
    async fn message_is_replaced_by_next_status() {
        let (reporter, _, operation_sink) = reporter();
        reporter.show_operation_message("Loaded.", Duration::from_secs(3));
        reporter.set_operation_status("Sync", Duration::from_millis(500));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(reporter.operation().text(), "Sync");
        assert_eq!(operation_sink.last().as_deref(), Some("Sync"));
    }

    #[test]
    fn remaining_seconds_round_up() {
        assert_eq!(ceil_secs(Duration::from_millis(7_000)), 7);
        assert_eq!(ceil_secs(Duration::from_millis(6_001)), 7);
        assert_eq!(ceil_secs(Duration::ZERO), 0);
    }
}
