//! 카운트다운 타이머.
//!
//! 주기적인 `Tick`과 종료 시 `Elapsed`를 콜백으로 전달한다.
//! 콜백은 타이머 상태 잠금을 잡은 채 실행되고 `dispose()`도 같은 잠금을 잡으므로,
//! `dispose()`가 반환된 뒤에는 이미 예약된 틱이라도 전달되지 않는다.
//! 같은 이유로 콜백 안에서 자기 타이머를 `dispose()`하면 안 된다.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

/// 타이머 통지
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// 주기 틱
    Tick {
        /// 시작 이후 틱 순번 (시작 직후 0)
        count: u64,
        /// 남은 시간 (무기한 타이머는 `None`)
        remaining: Option<Duration>,
    },
    /// 설정 시간 경과 (마지막 통지)
    Elapsed,
}

type Handler = Box<dyn FnMut(TimerEvent) + Send>;

struct TimerState {
    /// `None`이면 해제됨 또는 종료됨
    handler: Option<Handler>,
    elapsed: bool,
}

impl TimerState {
    fn idle() -> Self {
        Self {
            handler: None,
            elapsed: false,
        }
    }
}

/// 재시작/취소 가능한 카운트다운 타이머
///
/// - `duration > 0`, 간격 없음: `duration` 후 `Elapsed`
/// - `duration > 0`, 간격 있음: 즉시 틱 후 간격마다 틱, `duration` 후 `Elapsed`
/// - `duration == 0`, 간격 없음: `start()` 안에서 즉시 `Elapsed`
/// - `duration == 0`, 간격 있음: 해제될 때까지 무기한 틱
///
/// tokio 런타임 안에서 시작해야 한다. 드롭하면 해제된다.
pub struct CountdownTimer {
    duration: Duration,
    interval: Option<Duration>,
    state: Arc<Mutex<TimerState>>,
    task: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    /// 총 시간으로 타이머 생성 (시작하지 않음)
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            interval: None,
            state: Arc::new(Mutex::new(TimerState::idle())),
            task: None,
        }
    }

    /// 틱 간격 설정
    pub fn with_interval(mut self, interval: Duration) -> Self {
        // 0 간격은 바쁜 루프가 된다
        self.interval = Some(interval.max(Duration::from_millis(1)));
        self
    }

    /// 무기한 틱 타이머 여부
    pub fn is_unbounded(&self) -> bool {
        self.duration.is_zero() && self.interval.is_some()
    }

    /// 통지를 보낼 수 있는 상태인지 (시작됨, 미해제, 미경과)
    pub fn is_running(&self) -> bool {
        self.state.lock().handler.is_some()
    }

    /// `Elapsed`까지 전달되었는지
    pub fn has_elapsed(&self) -> bool {
        self.state.lock().elapsed
    }

    /// 타이머 시작
    ///
    /// 이미 실행 중이면 이전 실행을 해제하고 처음부터 다시 시작한다.
    pub fn start<F>(&mut self, handler: F)
    where
        F: FnMut(TimerEvent) + Send + 'static,
    {
        self.dispose();

        let state = Arc::new(Mutex::new(TimerState {
            handler: Some(Box::new(handler)),
            elapsed: false,
        }));
        self.state = state.clone();

        let duration = self.duration;
        match self.interval {
            None if duration.is_zero() => {
                fire_elapsed(&state);
            }
            None => {
                let deadline = Instant::now() + duration;
                self.task = Some(tokio::spawn(async move {
                    sleep_until(deadline).await;
                    fire_elapsed(&state);
                }));
            }
            Some(interval) => {
                let bounded = !duration.is_zero();
                let remaining = bounded.then_some(duration);
                fire(&state, TimerEvent::Tick { count: 0, remaining });
                self.task = Some(tokio::spawn(run_ticks(state, duration, interval, bounded)));
            }
        }
    }

    /// 타이머 해제: 멱등
    ///
    /// 반환 후에는 어떤 통지도 전달되지 않는다.
    pub fn dispose(&mut self) {
        // 실행 중인 콜백이 끝날 때까지 대기한 뒤 핸들러 제거
        let handler = self.state.lock().handler.take();
        drop(handler);

        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("duration", &self.duration)
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

/// 틱 루프: 절대 시각 기준으로 예약하여 누적 지연이 없다
async fn run_ticks(
    state: Arc<Mutex<TimerState>>,
    duration: Duration,
    interval: Duration,
    bounded: bool,
) {
    let start = Instant::now();
    let deadline = bounded.then(|| start + duration);
    let mut next = start;
    let mut count = 0u64;

    loop {
        next += interval;

        if let Some(deadline) = deadline {
            if next >= deadline {
                sleep_until(deadline).await;
                fire_elapsed(&state);
                return;
            }
        }

        sleep_until(next).await;
        count += 1;
        let remaining = deadline.map(|d| d.saturating_duration_since(next));
        if !fire(&state, TimerEvent::Tick { count, remaining }) {
            trace!("해제된 타이머 틱 루프 종료");
            return;
        }
    }
}

/// 핸들러가 살아 있으면 통지 전달
fn fire(state: &Mutex<TimerState>, event: TimerEvent) -> bool {
    let mut state = state.lock();
    match state.handler.as_mut() {
        Some(handler) => {
            handler(event);
            true
        }
        None => false,
    }
}

/// `Elapsed` 전달 후 핸들러 제거
fn fire_elapsed(state: &Mutex<TimerState>) {
    let mut state = state.lock();
    if let Some(mut handler) = state.handler.take() {
        handler(TimerEvent::Elapsed);
        state.elapsed = true;
    }
}
