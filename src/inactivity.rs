use std::time::{Duration, Instant};

/// 기본 비활성 판정 시간 (5분).
pub const DEFAULT_THRESHOLD: Duration = Duration::from_secs(5 * 60);

/// 비활성 오버레이 문구.
pub const OVERLAY_MESSAGE: &str = "Dashboard is inactive! Please reload to continue.";

/// 마지막 상호작용 이후 경과 시간을 추적한다.
///
/// 한 번 비활성으로 판정되면 `last_active`를 갱신하지 않으므로 세션을 새로
/// 시작할 때까지 비활성 상태가 유지된다. 오버레이는 표시용일 뿐 요청을 막지 않는다.
#[derive(Debug, Clone)]
pub struct InactivityMonitor {
    last_active: Instant,
    threshold: Duration,
    inactive: bool,
    overlay_dismissed: bool,
}

impl InactivityMonitor {
    pub fn new(now: Instant, threshold: Duration) -> Self {
        Self {
            last_active: now,
            threshold,
            inactive: false,
            overlay_dismissed: false,
        }
    }

    /// 주기 틱 또는 사용자 상호작용마다 호출한다. 비활성이면 true.
    pub fn observe(&mut self, now: Instant) -> bool {
        let idle = now.saturating_duration_since(self.last_active);
        let inactive = idle > self.threshold;
        if inactive {
            if !self.inactive {
                tracing::info!(idle_secs = idle.as_secs(), "session became inactive");
            }
            // 매 패스마다 오버레이를 다시 그린다.
            self.overlay_dismissed = false;
        } else {
            self.last_active = now;
        }
        self.inactive = inactive;
        inactive
    }

    pub fn is_inactive(&self) -> bool {
        self.inactive
    }

    pub fn overlay_visible(&self) -> bool {
        self.inactive && !self.overlay_dismissed
    }

    /// 클릭 시 오버레이만 숨긴다. 비활성 상태는 그대로 둔다.
    pub fn dismiss_overlay(&mut self) {
        self.overlay_dismissed = true;
    }

    pub fn last_active(&self) -> Instant {
        self.last_active
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }
}
