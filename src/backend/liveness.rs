use std::time::Duration;

use super::Backend;

/// 잠든 서버를 깨울 때의 폴링 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakePolicy {
    pub poll_interval: Duration,
    pub ceiling: Duration,
}

impl Default for WakePolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            ceiling: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeOutcome {
    /// 첫 확인에서 이미 응답함
    AlreadyActive,
    /// 폴링 도중 응답함
    Woke { waited: Duration },
    /// 상한까지 기다렸지만 응답 없음. 호출자는 그대로 진행한다.
    GaveUp { waited: Duration },
}

pub fn is_backend_active<B: Backend + ?Sized>(backend: &B) -> bool {
    backend.ping()
}

/// 서버가 응답할 때까지 `poll_interval` 간격으로 확인한다.
///
/// 대기 시간은 `sleep`에 넘긴 간격의 합으로 센다. 취소 수단은 없다.
pub fn wait_for_backend<B, S>(backend: &B, policy: &WakePolicy, sleep: S) -> WakeOutcome
where
    B: Backend + ?Sized,
    S: FnMut(Duration),
{
    if backend.ping() {
        return WakeOutcome::AlreadyActive;
    }
    poll_until_awake(backend, policy, sleep)
}

/// 첫 확인이 이미 실패한 뒤의 폴링. 호출자가 직접 ping 했을 때 쓴다.
pub fn poll_until_awake<B, S>(backend: &B, policy: &WakePolicy, mut sleep: S) -> WakeOutcome
where
    B: Backend + ?Sized,
    S: FnMut(Duration),
{
    tracing::info!(
        interval_secs = policy.poll_interval.as_secs(),
        ceiling_secs = policy.ceiling.as_secs(),
        "backend asleep, polling"
    );
    let mut waited = Duration::ZERO;
    while waited < policy.ceiling {
        if backend.ping() {
            tracing::info!(waited_secs = waited.as_secs(), "backend woke up");
            return WakeOutcome::Woke { waited };
        }
        sleep(policy.poll_interval);
        waited += policy.poll_interval;
    }
    tracing::warn!(waited_secs = waited.as_secs(), "backend still asleep, continuing");
    WakeOutcome::GaveUp { waited }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{wire::UploadResponse, BackendError, Endpoint, UploadFile};
    use serde_json::Value;
    use std::cell::Cell;

    /// `wake_after`번째 ping부터 응답하는 가짜 서버.
    struct Sleepy {
        pings: Cell<u32>,
        wake_after: Option<u32>,
    }

    impl Backend for Sleepy {
        fn ping(&self) -> bool {
            let n = self.pings.get() + 1;
            self.pings.set(n);
            self.wake_after.is_some_and(|w| n >= w)
        }

        fn upload(&self, _file: &UploadFile) -> Result<UploadResponse, BackendError> {
            unreachable!()
        }

        fn get_json(&self, _e: Endpoint, _q: &[(&str, String)]) -> Result<Value, BackendError> {
            unreachable!()
        }
    }

    #[test]
    fn active_backend_does_not_sleep() {
        let backend = Sleepy {
            pings: Cell::new(0),
            wake_after: Some(1),
        };
        let mut slept = Vec::new();
        let outcome = wait_for_backend(&backend, &WakePolicy::default(), |d| slept.push(d));
        assert_eq!(outcome, WakeOutcome::AlreadyActive);
        assert!(slept.is_empty());
    }

    #[test]
    fn exits_early_when_backend_answers() {
        let backend = Sleepy {
            pings: Cell::new(0),
            wake_after: Some(4),
        };
        let mut slept = Duration::ZERO;
        let outcome = wait_for_backend(&backend, &WakePolicy::default(), |d| slept += d);
        assert_eq!(
            outcome,
            WakeOutcome::Woke {
                waited: Duration::from_secs(20)
            }
        );
        assert_eq!(slept, Duration::from_secs(20));
    }

    #[test]
    fn polling_starts_without_initial_ping() {
        let backend = Sleepy {
            pings: Cell::new(0),
            wake_after: Some(1),
        };
        let outcome = poll_until_awake(&backend, &WakePolicy::default(), |_| panic!("no nap"));
        assert_eq!(
            outcome,
            WakeOutcome::Woke {
                waited: Duration::ZERO
            }
        );
        assert_eq!(backend.pings.get(), 1);
    }

    #[test]
    fn gives_up_at_ceiling() {
        let backend = Sleepy {
            pings: Cell::new(0),
            wake_after: None,
        };
        let mut naps = 0;
        let outcome = wait_for_backend(&backend, &WakePolicy::default(), |_| naps += 1);
        assert_eq!(
            outcome,
            WakeOutcome::GaveUp {
                waited: Duration::from_secs(60)
            }
        );
        assert_eq!(naps, 6);
        assert_eq!(backend.pings.get(), 7);
    }
}
