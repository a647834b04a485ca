use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::TimecardError;
use crate::selector::Selector;

/// Opaque handle to an element on the remote page.
///
/// The handle is only meaningful to the adapter that produced it and only
/// for as long as the page it came from is still current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a bounded wait.
///
/// Expiry of a wait is a typed result, not an error: optional steps match on
/// `Absent` directly, required steps convert it into their own error via
/// [`Probe::require`]. Only transport/driver faults surface as `Err` from the
/// adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Found(ElementRef),
    Absent,
}

impl Probe {
    /// The element, if the wait resolved.
    pub fn found(self) -> Option<ElementRef> {
        match self {
            Probe::Found(el) => Some(el),
            Probe::Absent => None,
        }
    }

    /// Convert `Absent` into the caller's error for a required step.
    pub fn require(
        self,
        on_absent: impl FnOnce() -> TimecardError,
    ) -> Result<ElementRef, TimecardError> {
        match self {
            Probe::Found(el) => Ok(el),
            Probe::Absent => Err(on_absent()),
        }
    }
}

/// Capability for driving the remote application's UI.
///
/// The automation core consumes this trait and never assumes a concrete
/// driver; [`crate::webdriver::WebDriverAdapter`] implements it over the
/// WebDriver wire protocol and the test suite substitutes a scripted fake.
/// All waits are bounded polls, never indefinite blocks.
#[async_trait]
pub trait RemoteUiAdapter: Send + Sync {
    /// Acquire the underlying driver resource (e.g. start a browser session).
    async fn connect(&self) -> Result<(), TimecardError>;

    /// Release the underlying driver resource. Idempotent; safe to call on a
    /// never-connected or already-shut-down adapter.
    async fn shutdown(&self) -> Result<(), TimecardError>;

    async fn navigate(&self, url: &str) -> Result<(), TimecardError>;

    async fn current_location(&self) -> Result<String, TimecardError>;

    /// Point-in-time lookup; `None` when nothing matches right now.
    async fn locate(&self, selector: &Selector) -> Result<Option<ElementRef>, TimecardError>;

    /// All current matches, in document order.
    async fn locate_all(&self, selector: &Selector) -> Result<Vec<ElementRef>, TimecardError>;

    /// Point-in-time lookup scoped under `root`.
    async fn locate_within(
        &self,
        root: &ElementRef,
        selector: &Selector,
    ) -> Result<Option<ElementRef>, TimecardError>;

    /// Poll until the selector matches or the bound expires.
    async fn wait_for(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<Probe, TimecardError>;

    /// Poll under `root` until the selector matches or the bound expires.
    async fn wait_within(
        &self,
        root: &ElementRef,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<Probe, TimecardError>;

    async fn click(&self, el: &ElementRef) -> Result<(), TimecardError>;

    /// Scroll the element into view and activate it through the page's own
    /// scripting, for controls the driver refuses to click directly.
    async fn force_click(&self, el: &ElementRef) -> Result<(), TimecardError>;

    async fn clear(&self, el: &ElementRef) -> Result<(), TimecardError>;

    async fn type_text(&self, el: &ElementRef, text: &str) -> Result<(), TimecardError>;

    async fn read_text(&self, el: &ElementRef) -> Result<String, TimecardError>;
}
