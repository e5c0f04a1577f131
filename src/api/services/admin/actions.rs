//! AJAX 动作表：每个动作绑定 nonce、所需权限和处理逻辑

use serde_json::Value;
use strum::{AsRefStr, EnumIter, EnumString};
use tracing::{debug, info};

use crate::api::AppState;
use crate::api::middleware::{Capability, Grants};
use crate::api::nonce::NonceAction;
use crate::errors::{LinkTrackerError, Result};
use crate::services::CreateLinkRequest;

use super::types::AjaxRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum AdminAction {
    GetDashboardSummary,
    GetClicksOverTime,
    GetTopLinks,
    GetTopReferrers,
    GetDeviceData,
    DebugDateRange,
    CreateLink,
    ResetData,
    GetStats,
    GetDataCount,
    ListLinks,
    DeleteLink,
}

impl AdminAction {
    pub fn nonce_action(self) -> NonceAction {
        match self {
            AdminAction::GetStats => NonceAction::Stats,
            AdminAction::CreateLink => NonceAction::CreateLink,
            AdminAction::ResetData => NonceAction::ResetData,
            _ => NonceAction::Dashboard,
        }
    }

    pub fn capability(self) -> Capability {
        match self {
            AdminAction::CreateLink => Capability::PublishPosts,
            AdminAction::ResetData | AdminAction::DeleteLink => Capability::ManageOptions,
            _ => Capability::Read,
        }
    }

    /// 破坏性动作的 nonce 只能用一次
    pub fn consumes_nonce(self) -> bool {
        self == AdminAction::ResetData
    }
}

/// nonce 与权限检查：先 nonce 再权限
pub fn authorize(
    state: &AppState,
    action: AdminAction,
    grants: Grants,
    nonce: &str,
) -> Result<()> {
    let nonce_ok = if action.consumes_nonce() {
        // 权限不足时不应白白消耗 nonce
        if !grants.allows(action.capability()) {
            state.nonces.verify(action.nonce_action(), nonce)
        } else {
            state.nonces.consume(action.nonce_action(), nonce)
        }
    } else {
        state.nonces.verify(action.nonce_action(), nonce)
    };
    if !nonce_ok {
        return Err(LinkTrackerError::invalid_nonce("Invalid nonce"));
    }
    if !grants.allows(action.capability()) {
        return Err(LinkTrackerError::permission_denied("Permission denied"));
    }
    Ok(())
}

fn parse_link_id(req: &AjaxRequest) -> Result<i64> {
    req.link_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| LinkTrackerError::validation("Invalid post ID"))
}

pub async fn run(state: &AppState, action: AdminAction, req: AjaxRequest) -> Result<Value> {
    debug!("Admin action {}", action.as_ref());
    let value = match action {
        AdminAction::GetDashboardSummary => {
            let range = state.stats.resolve_range(&req.range_params())?;
            serde_json::to_value(state.stats.dashboard_summary(&range).await)?
        }
        AdminAction::GetClicksOverTime => {
            let range = state.stats.resolve_range(&req.range_params())?;
            serde_json::to_value(state.stats.clicks_over_time(&range).await)?
        }
        AdminAction::GetTopLinks => {
            let range = state.stats.resolve_range(&req.range_params())?;
            serde_json::to_value(state.stats.top_links(&range).await)?
        }
        AdminAction::GetTopReferrers => {
            let range = state.stats.resolve_range(&req.range_params())?;
            serde_json::to_value(state.stats.top_referrers(&range).await)?
        }
        AdminAction::GetDeviceData => {
            let range = state.stats.resolve_range(&req.range_params())?;
            serde_json::to_value(state.stats.device_breakdown(&range).await)?
        }
        AdminAction::DebugDateRange => {
            serde_json::to_value(state.stats.debug_date_range(&req.range_params()).await?)?
        }
        AdminAction::GetStats => {
            let link_id = parse_link_id(&req)?;
            serde_json::to_value(state.stats.link_stats(link_id).await?)?
        }
        AdminAction::GetDataCount => serde_json::to_value(state.stats.data_count().await)?,
        AdminAction::CreateLink => {
            let created = state
                .links
                .create_link(CreateLinkRequest {
                    title: req.title.unwrap_or_default(),
                    destination_url: req.destination_url.unwrap_or_default(),
                    campaign: req.campaign,
                })
                .await?;
            serde_json::to_value(created)?
        }
        AdminAction::ListLinks => serde_json::to_value(state.links.list_links().await?)?,
        AdminAction::DeleteLink => {
            let link_id = parse_link_id(&req)?;
            state.links.delete_link(link_id).await?;
            info!("Deleted tracked link {}", link_id);
            serde_json::json!({ "deleted": link_id })
        }
        AdminAction::ResetData => serde_json::to_value(state.demo.reset().await?)?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_action_names() {
        assert_eq!(
            AdminAction::from_str("get_dashboard_summary").unwrap(),
            AdminAction::GetDashboardSummary
        );
        assert_eq!(AdminAction::DebugDateRange.as_ref(), "debug_date_range");
        assert!(AdminAction::from_str("drop_tables").is_err());
        assert_eq!(AdminAction::iter().count(), 12);
    }

    #[test]
    fn test_nonce_and_capability_table() {
        assert_eq!(AdminAction::GetStats.nonce_action(), NonceAction::Stats);
        assert_eq!(AdminAction::GetTopLinks.nonce_action(), NonceAction::Dashboard);
        assert_eq!(AdminAction::CreateLink.capability(), Capability::PublishPosts);
        assert_eq!(AdminAction::ResetData.capability(), Capability::ManageOptions);
        assert!(AdminAction::ResetData.consumes_nonce());
        assert!(!AdminAction::GetDataCount.consumes_nonce());
    }

    #[test]
    fn test_parse_link_id() {
        let mut req = AjaxRequest::default();
        assert!(parse_link_id(&req).is_err());
        req.link_id = Some("abc".into());
        assert!(parse_link_id(&req).is_err());
        req.link_id = Some(" 12 ".into());
        assert_eq!(parse_link_id(&req).unwrap(), 12);
    }
}
