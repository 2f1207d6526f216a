//! 按实体 id 的获取缓存
//!
//! 每个 id 对应一个小状态：未请求 / 在途 / 就绪 / 失败。
//! "每个 id 至多一个在途请求"不是靠零散的布尔旗标，而是由
//! [`FetchMap::get_or_fetch`] 的结构保证：第一个调用者真正执行获取，
//! 在途标记在 future 被轮询之前就已写入；并发到来的调用者排进等待
//! 列表，结算时（无论成败）拿到同一份结果。
//!
//! 就绪的条目在会话内永不逐出；失败的条目由下一次用户主动导航重试。

use futures::channel::oneshot;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::provider::ProviderError;

enum Slot<T> {
    /// 在途：等待同一结果的后来者
    InFlight(Vec<oneshot::Sender<Result<T, ProviderError>>>),
    Ready(T),
    Failed(ProviderError),
}

enum Entry<T> {
    Hit(Result<T, ProviderError>),
    Wait(oneshot::Receiver<Result<T, ProviderError>>),
    Run,
}

pub struct FetchMap<T> {
    slots: Rc<RefCell<HashMap<i64, Slot<T>>>>,
}

impl<T: Clone> FetchMap<T> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// 就绪值的快照
    pub fn ready(&self, id: i64) -> Option<T> {
        match self.slots.borrow().get(&id) {
            Some(Slot::Ready(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// 最近一次失败（若有）
    pub fn error(&self, id: i64) -> Option<ProviderError> {
        match self.slots.borrow().get(&id) {
            Some(Slot::Failed(error)) => Some(error.clone()),
            _ => None,
        }
    }

    pub fn is_in_flight(&self, id: i64) -> bool {
        matches!(self.slots.borrow().get(&id), Some(Slot::InFlight(_)))
    }

    /// 取缓存值，未命中则执行 `fetch` 并记录结果
    ///
    /// 并发调用同一 id 时只有第一个执行 `fetch`，其余等待同一结果。
    pub async fn get_or_fetch<F>(&self, id: i64, fetch: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        let entry = {
            let mut slots = self.slots.borrow_mut();
            match slots.get_mut(&id) {
                Some(Slot::Ready(value)) => Entry::Hit(Ok(value.clone())),
                Some(Slot::InFlight(waiters)) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Entry::Wait(rx)
                }
                // 未请求或上次失败：本调用者负责执行获取
                _ => {
                    slots.insert(id, Slot::InFlight(Vec::new()));
                    Entry::Run
                }
            }
        };

        match entry {
            Entry::Hit(result) => result,
            Entry::Wait(rx) => rx.await.unwrap_or_else(|_| {
                Err(ProviderError::Network("request was abandoned".to_string()))
            }),
            Entry::Run => {
                let result = fetch.await;

                // 结算：写回终态并唤醒等待者，在途标记随之消失
                let waiters = {
                    let mut slots = self.slots.borrow_mut();
                    let previous = match &result {
                        Ok(value) => slots.insert(id, Slot::Ready(value.clone())),
                        Err(error) => slots.insert(id, Slot::Failed(error.clone())),
                    };
                    match previous {
                        Some(Slot::InFlight(waiters)) => waiters,
                        _ => Vec::new(),
                    }
                };
                for waiter in waiters {
                    let _ = waiter.send(result.clone());
                }

                result
            }
        }
    }
}

impl<T: Clone> Default for FetchMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================
// 单元测试 (Unit Tests)
// =========================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn concurrent_callers_share_a_single_fetch() {
        let map: FetchMap<i32> = FetchMap::new();
        let calls = Cell::new(0);

        let first = map.get_or_fetch(1, async {
            calls.set(calls.get() + 1);
            tokio::task::yield_now().await;
            Ok(7)
        });
        let second = map.get_or_fetch(1, async {
            calls.set(calls.get() + 1);
            Ok(99)
        });

        let (a, b) = futures::join!(first, second);
        assert_eq!(a, Ok(7));
        assert_eq!(b, Ok(7));
        assert_eq!(calls.get(), 1);
        assert_eq!(map.ready(1), Some(7));
    }

    #[tokio::test]
    async fn ready_entries_short_circuit() {
        let map: FetchMap<i32> = FetchMap::new();
        let calls = Cell::new(0);

        for _ in 0..2 {
            let value = map
                .get_or_fetch(5, async {
                    calls.set(calls.get() + 1);
                    Ok(42)
                })
                .await;
            assert_eq!(value, Ok(42));
        }
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn failure_is_broadcast_and_clears_the_in_flight_marker() {
        let map: FetchMap<i32> = FetchMap::new();
        let boom = ProviderError::Network("boom".to_string());

        let failing = {
            let boom = boom.clone();
            map.get_or_fetch(1, async move {
                tokio::task::yield_now().await;
                Err(boom)
            })
        };
        let waiting = map.get_or_fetch(1, async { Ok(1) });

        let (a, b) = futures::join!(failing, waiting);
        assert_eq!(a, Err(boom.clone()));
        assert_eq!(b, Err(boom.clone()));
        assert!(!map.is_in_flight(1));
        assert_eq!(map.error(1), Some(boom));

        // A later user-initiated call retries and can succeed
        let retried = map.get_or_fetch(1, async { Ok(8) }).await;
        assert_eq!(retried, Ok(8));
        assert_eq!(map.ready(1), Some(8));
        assert_eq!(map.error(1), None);
    }

    #[tokio::test]
    async fn distinct_ids_do_not_interfere() {
        let map: FetchMap<i32> = FetchMap::new();
        let (a, b) = futures::join!(
            map.get_or_fetch(1, async { Ok(10) }),
            map.get_or_fetch(2, async { Ok(20) })
        );
        assert_eq!(a, Ok(10));
        assert_eq!(b, Ok(20));
    }
}
