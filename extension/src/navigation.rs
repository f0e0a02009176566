// Page-load watcher that asks the content script to start listening

use crate::config::NavigationConfig;
use crate::error::Result;
use crate::model::TabNotification;
use crate::platform::{TabId, Tabs};
use serde::Deserialize;

/// `details` object of `chrome.webNavigation.onCompleted`.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent {
    pub url: String,
    /// 0 for the top-level frame.
    #[serde(default)]
    pub frame_id: Option<i64>,
}

impl NavigationEvent {
    pub fn top_level(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            frame_id: Some(0),
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.frame_id.map_or(true, |id| id == 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Not a top-level load of the messaging site.
    Ignored,
    NoActiveTab,
    Notified(TabId),
}

/// Tells the content script to start observing once the messaging site loads.
pub struct NavigationWatcher {
    target_domain: String,
}

impl NavigationWatcher {
    pub fn new(config: &NavigationConfig) -> Self {
        Self {
            target_domain: config.target_domain.clone(),
        }
    }

    pub fn matches(&self, event: &NavigationEvent) -> bool {
        event.is_top_level() && event.url.contains(&self.target_domain)
    }

    pub async fn on_completed<T>(&self, tabs: &T, event: &NavigationEvent) -> Result<NavigationOutcome>
    where
        T: Tabs + ?Sized,
    {
        if !self.matches(event) {
            return Ok(NavigationOutcome::Ignored);
        }

        let Some(tab) = tabs.active_tab().await? else {
            log::debug!("No active tab for {}, dropping notification", event.url);
            return Ok(NavigationOutcome::NoActiveTab);
        };

        let payload = serde_json::to_value(TabNotification::inject_listeners())?;
        tabs.send_message(tab, &payload).await?;
        log::info!("Asked tab {} to inject listeners", tab);

        Ok(NavigationOutcome::Notified(tab))
    }
}
