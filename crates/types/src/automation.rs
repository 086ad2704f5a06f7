//! Contract for the UI automation driver that replays recorded steps.
//!
//! The driver itself (window discovery, capability negotiation, the remote
//! session) lives outside this workspace. Callers own an
//! [`AutomationSession`] value and drive its lifecycle explicitly with
//! [`AutomationSession::invoke`] and [`AutomationSession::close`].

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Describes how to find a UI element. The first non-blank field wins, in the
/// order automation id, name, xpath.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locator {
    #[serde(default)]
    pub automation_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub xpath: String,
}

/// A resolved locator naming exactly one lookup strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocatorStrategy {
    AutomationId(String),
    Name(String),
    XPath(String),
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorStrategy::AutomationId(value) => write!(f, "automationId={value}"),
            LocatorStrategy::Name(value) => write!(f, "name={value}"),
            LocatorStrategy::XPath(value) => write!(f, "xpath={value}"),
        }
    }
}

impl Locator {
    pub fn by_automation_id(value: impl Into<String>) -> Self {
        Self {
            automation_id: value.into(),
            ..Self::default()
        }
    }

    pub fn by_name(value: impl Into<String>) -> Self {
        Self {
            name: value.into(),
            ..Self::default()
        }
    }

    pub fn by_xpath(value: impl Into<String>) -> Self {
        Self {
            xpath: value.into(),
            ..Self::default()
        }
    }

    /// Pick the lookup strategy, honoring first-non-blank-wins precedence.
    pub fn resolve(&self) -> Result<LocatorStrategy, AutomationError> {
        let automation_id = self.automation_id.trim();
        if !automation_id.is_empty() {
            return Ok(LocatorStrategy::AutomationId(automation_id.to_string()));
        }
        let name = self.name.trim();
        if !name.is_empty() {
            return Ok(LocatorStrategy::Name(name.to_string()));
        }
        let xpath = self.xpath.trim();
        if !xpath.is_empty() {
            return Ok(LocatorStrategy::XPath(xpath.to_string()));
        }
        Err(AutomationError::EmptyLocator)
    }
}

/// Failures reported by an automation driver.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("locator has no automation id, name, or xpath")]
    EmptyLocator,

    #[error("no active automation session for '{app_id}'")]
    NotConnected { app_id: String },

    #[error("element not found: {locator}")]
    ElementNotFound { locator: LocatorStrategy },

    #[error("screenshot could not be written to {path}: {reason}")]
    Screenshot { path: String, reason: String },

    #[error("automation driver error: {message}")]
    Driver { message: String },
}

/// Operations the test runner needs from a UI automation driver.
#[async_trait]
pub trait AutomationSession: Send {
    /// Launch or attach to the application window.
    async fn invoke(&mut self, app_id: &str, window_title: &str) -> Result<(), AutomationError>;

    async fn click(&mut self, locator: &Locator) -> Result<(), AutomationError>;

    async fn set_value(&mut self, locator: &Locator, value: &str) -> Result<(), AutomationError>;

    /// Capture the attached window to `path`.
    async fn screenshot(&mut self, path: &Path) -> Result<(), AutomationError>;

    /// Capture the window with the located element outlined.
    async fn screenshot_highlighting(&mut self, path: &Path, locator: &Locator) -> Result<(), AutomationError>;

    /// End the session and release the application window.
    async fn close(&mut self, app_id: &str) -> Result<(), AutomationError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[derive(Debug, Default)]
    struct RecordingSession {
        attached: Option<String>,
        actions: Vec<String>,
    }

    impl RecordingSession {
        fn require_attached(&self) -> Result<(), AutomationError> {
            if self.attached.is_some() {
                Ok(())
            } else {
                Err(AutomationError::NotConnected { app_id: String::new() })
            }
        }
    }

    #[async_trait]
    impl AutomationSession for RecordingSession {
        async fn invoke(&mut self, app_id: &str, window_title: &str) -> Result<(), AutomationError> {
            self.attached = Some(app_id.to_string());
            self.actions.push(format!("invoke {app_id} '{window_title}'"));
            Ok(())
        }

        async fn click(&mut self, locator: &Locator) -> Result<(), AutomationError> {
            self.require_attached()?;
            self.actions.push(format!("click {}", locator.resolve()?));
            Ok(())
        }

        async fn set_value(&mut self, locator: &Locator, value: &str) -> Result<(), AutomationError> {
            self.require_attached()?;
            self.actions.push(format!("set {} = {value}", locator.resolve()?));
            Ok(())
        }

        async fn screenshot(&mut self, path: &Path) -> Result<(), AutomationError> {
            self.require_attached()?;
            self.actions.push(format!("screenshot {}", path.display()));
            Ok(())
        }

        async fn screenshot_highlighting(&mut self, path: &Path, locator: &Locator) -> Result<(), AutomationError> {
            self.require_attached()?;
            self.actions
                .push(format!("screenshot {} highlighting {}", path.display(), locator.resolve()?));
            Ok(())
        }

        async fn close(&mut self, app_id: &str) -> Result<(), AutomationError> {
            match self.attached.take() {
                Some(attached) if attached == app_id => {
                    self.actions.push(format!("close {app_id}"));
                    Ok(())
                }
                _ => Err(AutomationError::NotConnected { app_id: app_id.to_string() }),
            }
        }
    }

    #[test]
    fn first_non_blank_locator_field_wins() {
        let locator = Locator {
            automation_id: "  ".to_string(),
            name: "Submit".to_string(),
            xpath: "//Button".to_string(),
        };
        assert_eq!(locator.resolve().unwrap(), LocatorStrategy::Name("Submit".to_string()));

        let all = Locator {
            automation_id: "btnOk".to_string(),
            name: "OK".to_string(),
            xpath: "//Button".to_string(),
        };
        assert_eq!(all.resolve().unwrap(), LocatorStrategy::AutomationId("btnOk".to_string()));
        assert_eq!(
            Locator::by_xpath("//Edit").resolve().unwrap(),
            LocatorStrategy::XPath("//Edit".to_string())
        );
    }

    #[test]
    fn locator_deserializes_from_partial_json() {
        let locator: Locator = serde_json::from_str(r#"{"automationId": "CalculatorResults"}"#).unwrap();
        assert_eq!(locator, Locator::by_automation_id("CalculatorResults"));
    }

    #[test]
    fn blank_locator_is_rejected() {
        assert!(matches!(Locator::default().resolve(), Err(AutomationError::EmptyLocator)));
    }

    #[tokio::test]
    async fn session_lifecycle_is_explicit() {
        let mut session = RecordingSession::default();
        let button = Locator::by_automation_id("num1Button");

        assert!(session.click(&button).await.is_err());

        session.invoke("Microsoft.WindowsCalculator", "Calculator").await.unwrap();
        session.click(&button).await.unwrap();
        session.set_value(&Locator::by_name("Display"), "1").await.unwrap();
        session
            .screenshot_highlighting(&PathBuf::from("shot.png"), &button)
            .await
            .unwrap();
        session.close("Microsoft.WindowsCalculator").await.unwrap();

        assert!(session.close("Microsoft.WindowsCalculator").await.is_err());
        assert_eq!(session.actions.len(), 5);
        assert_eq!(session.actions[1], "click automationId=num1Button");
    }
}
