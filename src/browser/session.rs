use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, Tab};

use crate::browser::config::{ConnectionOptions, LaunchOptions};
use crate::dom::ElementNode;
use crate::download::DownloadBackend;
use crate::error::{GrabError, Result};
use crate::walker::PostSlides;

/// Selectors tried when locating a post root, most specific first
const POST_ROOT_SELECTORS: &[&str] = &[
    "article[role='presentation']",
    "main article",
    "article",
    "main section",
];

/// Browser session that manages a Chrome/Chromium instance
pub struct BrowserSession {
    browser: Browser,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Slide walks and staggered bulk downloads take minutes; the default
        // 30s idle timeout would drop the session mid-operation
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }
        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }
        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| GrabError::LaunchFailed(e.to_string()))?;

        browser
            .new_tab()
            .map_err(|e| GrabError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser =
            Browser::connect(options.ws_url).map_err(|e| GrabError::ConnectionFailed(e.to_string()))?;

        Ok(Self { browser })
    }

    /// Launch a browser with default options
    pub fn new() -> Result<Self> {
        Self::launch(LaunchOptions::default())
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| GrabError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// The tab operations run against: the visible tab when attached to a
    /// user's browser, otherwise the first one
    pub fn tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        for tab in &tabs {
            match tab.evaluate("document.visibilityState === 'visible'", false) {
                Ok(remote) => {
                    if remote.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                        return Ok(tab.clone());
                    }
                }
                Err(e) => {
                    log::debug!("Failed to check tab visibility: {}", e);
                    continue;
                }
            }
        }

        tabs.first().cloned().ok_or_else(|| {
            GrabError::TabOperationFailed("No tab available".to_string())
        })
    }

    /// Navigate the tab to a URL
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab()?
            .navigate_to(url)
            .map_err(|e| GrabError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Wait for navigation to complete
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab()?
            .wait_until_navigated()
            .map_err(|e| GrabError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// URL of the current page
    pub fn current_url(&self) -> Result<String> {
        Ok(self.tab()?.get_url())
    }

    /// Locate the post on the current page.
    ///
    /// A page without a recognizable post root is not an error; the feature
    /// simply has nothing to offer there, so this returns `Ok(None)`.
    pub fn find_post(&self) -> Result<Option<LivePost>> {
        let tab = self.tab()?;
        for selector in POST_ROOT_SELECTORS {
            let found = match tab.find_element(selector) {
                Ok(_) => true,
                Err(e) => {
                    log::debug!("selector '{}' matched nothing: {}", selector, e);
                    false
                }
            };
            if found {
                log::debug!("post root matched selector '{}'", selector);
                return Ok(Some(LivePost::new(tab, *selector)));
            }
        }
        Ok(None)
    }

    /// Last-resort download backend running in the current page
    pub fn click_through_backend(&self) -> Result<ClickThroughBackend> {
        Ok(ClickThroughBackend { tab: self.tab()? })
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close the browser by closing all of its tabs
    pub fn close(&self) -> Result<()> {
        let tabs = self.get_tabs()?;
        for tab in tabs {
            let _ = tab.close(false);
        }
        Ok(())
    }
}

/// Handle to a post on the live page.
///
/// Snapshots and slide stepping go through in-page scripts; the handle keeps
/// only the tab and the selector that matched the post root.
pub struct LivePost {
    tab: Arc<Tab>,
    root_selector: String,
}

impl LivePost {
    pub fn new(tab: Arc<Tab>, root_selector: impl Into<String>) -> Self {
        Self { tab, root_selector: root_selector.into() }
    }

    pub fn selector(&self) -> &str {
        &self.root_selector
    }

    /// URL of the page the post lives on
    pub fn page_url(&self) -> String {
        self.tab.get_url()
    }

    fn step(&self, labels: &[&str]) -> Result<bool> {
        let script = format!(
            "({})({}, {})",
            include_str!("step_slide.js"),
            js_string(&self.root_selector),
            js_string_array(labels),
        );
        let result = self
            .tab
            .evaluate(&script, false)
            .map_err(|e| GrabError::EvaluationFailed(e.to_string()))?;

        match result.value.as_ref().and_then(|v| v.as_str()) {
            Some("clicked") => Ok(true),
            Some(outcome) => {
                log::debug!("slide control ({}): {}", labels.join("/"), outcome);
                Ok(false)
            }
            None => Ok(false),
        }
    }
}

impl PostSlides for LivePost {
    fn snapshot(&mut self) -> Result<ElementNode> {
        let script = format!(
            "({})({})",
            include_str!("snapshot_post.js"),
            js_string(&self.root_selector),
        );
        let result = self
            .tab
            .evaluate(&script, false)
            .map_err(|e| GrabError::SnapshotFailed(e.to_string()))?;

        let json_value = result.value.ok_or_else(|| {
            GrabError::ElementNotFound(format!("post root '{}' no longer present", self.root_selector))
        })?;
        if json_value.is_null() {
            return Err(GrabError::ElementNotFound(format!(
                "post root '{}' no longer present",
                self.root_selector
            )));
        }

        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| GrabError::SnapshotFailed(format!("Failed to get JSON string: {}", e)))?;
        serde_json::from_str(&json_str)
            .map_err(|e| GrabError::SnapshotFailed(format!("Failed to parse snapshot JSON: {}", e)))
    }

    fn advance(&mut self) -> Result<bool> {
        self.step(&["next"])
    }

    fn retreat(&mut self) -> Result<bool> {
        self.step(&["previous", "prev"])
    }
}

/// In-page anchor-click download: builds a hyperlink with a forced-download
/// attribute and clicks it. The weakest stage of the chain, but it works
/// when direct fetching is blocked by the CDN.
pub struct ClickThroughBackend {
    tab: Arc<Tab>,
}

impl DownloadBackend for ClickThroughBackend {
    fn name(&self) -> &'static str {
        "click-through"
    }

    fn submit(&self, url: &str, filename: &str) -> Result<()> {
        let script = format!(
            "({})({}, {})",
            include_str!("click_download.js"),
            js_string(url),
            js_string(filename),
        );
        self.tab
            .evaluate(&script, false)
            .map_err(|e| GrabError::BackendFailed {
                backend: self.name().to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

/// JSON-escape a string for embedding in an in-page script call
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn js_string_array(values: &[&str]) -> String {
    serde_json::Value::Array(
        values
            .iter()
            .map(|v| serde_json::Value::String((*v).to_string()))
            .collect(),
    )
    .to_string()
}
