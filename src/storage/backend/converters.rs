use std::str::FromStr;

use chrono::NaiveDateTime;
use sea_orm::ActiveValue::{NotSet, Set};

use crate::storage::{ClickEvent, LinkStatus, NewLink, TrackedLink};
use migration::entities::{link_click, tracked_link};

/// 将 Sea-ORM Model 转换为 TrackedLink；未知状态按 draft 处理
pub fn model_to_tracked_link(model: tracked_link::Model) -> TrackedLink {
    TrackedLink {
        id: model.id,
        title: model.title,
        destination_url: model.destination_url,
        short_code: model.short_code,
        total_clicks: model.total_clicks.max(0),
        unique_visitors: model.unique_visitors.max(0),
        campaign: model.campaign.filter(|c| !c.is_empty()),
        status: LinkStatus::from_str(&model.status).unwrap_or(LinkStatus::Draft),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn new_link_to_active_model(link: &NewLink, now: NaiveDateTime) -> tracked_link::ActiveModel {
    tracked_link::ActiveModel {
        id: NotSet,
        title: Set(link.title.clone()),
        destination_url: Set(link.destination_url.clone()),
        short_code: Set(link.short_code.clone()),
        total_clicks: Set(0),
        unique_visitors: Set(0),
        campaign: Set(link.campaign.clone()),
        status: Set(link.status.as_ref().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

pub fn click_to_active_model(click: &ClickEvent) -> link_click::ActiveModel {
    link_click::ActiveModel {
        id: NotSet,
        link_id: Set(click.link_id),
        visitor_id: Set(click.visitor_id.clone()),
        ip_address: Set(click.ip_address.clone()),
        user_agent: Set(click.user_agent.clone()),
        referrer: Set(click.referrer.clone()),
        device_type: Set(click.classification.device_type.as_ref().to_string()),
        browser: Set(click.classification.browser.clone()),
        os: Set(click.classification.os.clone()),
        clicked_at: Set(click.clicked_at),
        utm_source: Set(click.utm.source.clone()),
        utm_medium: Set(click.utm.medium.clone()),
        utm_campaign: Set(click.utm.campaign.clone()),
        utm_term: Set(click.utm.term.clone()),
        utm_content: Set(click.utm.content.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::classify;
    use crate::storage::UtmParams;
    use sea_orm::ActiveValue;

    fn ts() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2025-05-27 10:11:12", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_model_to_tracked_link() {
        let model = tracked_link::Model {
            id: 7,
            title: "Docs".to_string(),
            destination_url: "https://example.com/docs".to_string(),
            short_code: "aB3xY9".to_string(),
            total_clicks: 12,
            unique_visitors: -1,
            campaign: Some(String::new()),
            status: "publish".to_string(),
            created_at: ts(),
            updated_at: ts(),
        };
        let link = model_to_tracked_link(model);
        assert_eq!(link.id, 7);
        assert_eq!(link.status, LinkStatus::Publish);
        assert_eq!(link.unique_visitors, 0);
        assert_eq!(link.campaign, None);
    }

    #[test]
    fn test_unknown_status_is_draft() {
        let model = tracked_link::Model {
            id: 1,
            title: String::new(),
            destination_url: String::new(),
            short_code: "x".to_string(),
            total_clicks: 0,
            unique_visitors: 0,
            campaign: None,
            status: "pending".to_string(),
            created_at: ts(),
            updated_at: ts(),
        };
        assert_eq!(model_to_tracked_link(model).status, LinkStatus::Draft);
    }

    #[test]
    fn test_click_to_active_model() {
        let ua = "Mozilla/5.0 (iPad; CPU OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Mobile/15E148 Safari/604.1";
        let click = ClickEvent {
            link_id: 3,
            visitor_id: "0123456789abcdef0123456789abcdef".to_string(),
            ip_address: "10.0.0.1".to_string(),
            user_agent: ua.to_string(),
            referrer: String::new(),
            classification: classify(ua),
            clicked_at: ts(),
            utm: UtmParams {
                source: "newsletter".to_string(),
                ..Default::default()
            },
        };
        let am = click_to_active_model(&click);
        assert_eq!(am.link_id, ActiveValue::Set(3));
        assert_eq!(am.device_type, ActiveValue::Set("Tablet".to_string()));
        assert_eq!(am.utm_source, ActiveValue::Set("newsletter".to_string()));
        assert_eq!(am.utm_medium, ActiveValue::Set(String::new()));
        assert!(matches!(am.id, ActiveValue::NotSet));
    }
}
