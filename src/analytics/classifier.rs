//! User-Agent 分类：设备类型、浏览器、操作系统
//!
//! 规则按顺序匹配，第一个命中的规则生效。注意 iPhone 的 UA 含有
//! "like Mac OS X"，因此 OS 会被归为 "Mac OS"；Android 的 UA 含有
//! "Linux"，OS 会被归为 "Linux"。这是既定行为，测试里有覆盖。

use std::sync::LazyLock;

use moka::sync::Cache;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use xxhash_rust::xxh64::xxh64;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub device_type: DeviceType,
    pub browser: String,
    pub os: String,
}

static TABLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)tablet|ipad|playbook|silk").expect("valid tablet regex"));

// 区分大小写
static MOBILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"Mobile|Android|iP(hone|od)|IEMobile|BlackBerry|Kindle|Silk-Accelerated|(hpw|web)OS|Opera M(obi|ini)",
    )
    .expect("valid mobile regex")
});

static OS_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)windows|win32|win64", "Windows"),
        (r"(?i)macintosh|mac os x", "Mac OS"),
        (r"(?i)linux", "Linux"),
        (r"(?i)android", "Android"),
        (r"(?i)iphone|ipad|ipod", "iOS"),
    ]
    .into_iter()
    .map(|(pattern, name)| (Regex::new(pattern).expect("valid os regex"), name))
    .collect()
});

/// 存在某个 "android"，其后任意位置都没有 "mobile"（大小写不敏感）
///
/// 只需检查最后一个 "android"
fn android_without_mobile(lower: &str) -> bool {
    match lower.rfind("android") {
        Some(idx) => !lower[idx..].contains("mobile"),
        None => false,
    }
}

pub fn device_type(user_agent: &str) -> DeviceType {
    let lower = user_agent.to_lowercase();
    if TABLET_RE.is_match(user_agent) || android_without_mobile(&lower) {
        DeviceType::Tablet
    } else if MOBILE_RE.is_match(user_agent) {
        DeviceType::Mobile
    } else {
        DeviceType::Desktop
    }
}

pub fn browser(user_agent: &str) -> &'static str {
    let ua = user_agent.to_lowercase();
    if ua.contains("msie") || ua.contains("trident") {
        "Internet Explorer"
    } else if ua.contains("firefox") {
        "Firefox"
    } else if ua.contains("chrome") {
        // "edg" 同时覆盖 Edge 和 Edg
        if ua.contains("edg") {
            "Edge"
        } else if ua.contains("opr") {
            "Opera"
        } else {
            "Chrome"
        }
    } else if ua.contains("safari") {
        "Safari"
    } else if ua.contains("opera") {
        "Opera"
    } else {
        "Unknown"
    }
}

pub fn operating_system(user_agent: &str) -> &'static str {
    OS_RULES
        .iter()
        .find(|(re, _)| re.is_match(user_agent))
        .map(|(_, name)| *name)
        .unwrap_or("Unknown")
}

/// 对 UA 字符串做完整分类；空字符串得到 Desktop / Unknown / Unknown
pub fn classify(user_agent: &str) -> Classification {
    Classification {
        device_type: device_type(user_agent),
        browser: browser(user_agent).to_string(),
        os: operating_system(user_agent).to_string(),
    }
}

/// 按 UA 哈希缓存分类结果，跳转热路径上避免重复跑正则
pub struct ClassifierCache {
    cache: Cache<u64, Classification>,
}

impl ClassifierCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity).build(),
        }
    }

    pub fn classify(&self, user_agent: &str) -> Classification {
        let key = xxh64(user_agent.as_bytes(), 0);
        self.cache.get_with(key, || classify(user_agent))
    }
}

impl Default for ClassifierCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}
