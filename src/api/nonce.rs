//! 管理端请求的 nonce
//!
//! 每个 nonce 绑定一个动作，在 TTL 内有效。普通读取动作可以重复使用
//! 同一个 nonce；重置数据这类破坏性动作使用后立即失效。

use std::time::Duration;

use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NonceAction {
    Dashboard,
    Stats,
    CreateLink,
    ResetData,
}

pub struct NonceManager {
    issued: Cache<String, NonceAction>,
}

impl NonceManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            issued: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// 签发一个绑定到 `action` 的 nonce
    pub fn issue(&self, action: NonceAction) -> String {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        self.issued.insert(nonce.clone(), action);
        nonce
    }

    /// 为每个动作各签发一个
    pub fn issue_all(&self) -> Vec<(NonceAction, String)> {
        NonceAction::iter().map(|a| (a, self.issue(a))).collect()
    }

    /// 校验但不消耗
    pub fn verify(&self, action: NonceAction, nonce: &str) -> bool {
        !nonce.is_empty() && self.issued.get(nonce) == Some(action)
    }

    /// 校验并作废，同一个 nonce 只能成功一次
    pub fn consume(&self, action: NonceAction, nonce: &str) -> bool {
        if nonce.is_empty() {
            return false;
        }
        match self.issued.remove(nonce) {
            Some(bound) if bound == action => true,
            Some(bound) => {
                // 动作不匹配时放回去，不影响合法持有者
                self.issued.insert(nonce.to_string(), bound);
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> NonceManager {
        NonceManager::new(Duration::from_secs(60))
    }

    #[test]
    fn test_nonce_bound_to_action() {
        let m = manager();
        let nonce = m.issue(NonceAction::Dashboard);
        assert!(m.verify(NonceAction::Dashboard, &nonce));
        assert!(m.verify(NonceAction::Dashboard, &nonce));
        assert!(!m.verify(NonceAction::ResetData, &nonce));
        assert!(!m.verify(NonceAction::Dashboard, "forged"));
        assert!(!m.verify(NonceAction::Dashboard, ""));
    }

    #[test]
    fn test_consume_is_single_use() {
        let m = manager();
        let nonce = m.issue(NonceAction::ResetData);
        assert!(!m.consume(NonceAction::Dashboard, &nonce));
        assert!(m.consume(NonceAction::ResetData, &nonce));
        assert!(!m.consume(NonceAction::ResetData, &nonce));
    }

    #[test]
    fn test_issue_all_covers_every_action() {
        let m = manager();
        let all = m.issue_all();
        assert_eq!(all.len(), 4);
        for (action, nonce) in all {
            assert!(m.verify(action, &nonce));
        }
    }
}
