//! Outbound port: the browser being driven.

/// A blocking browser automation backend.
///
/// Calls may block for seconds (page loads, element waits). The service
/// only invokes the driver from a blocking thread and never concurrently.
pub trait BrowserDriver: Send + 'static {
    /// Load `url`. Returns false if navigation failed.
    fn go_to(&mut self, url: &str) -> anyhow::Result<bool>;

    /// Visible text of the current page, `None` if it could not be read.
    fn get_text(&mut self) -> anyhow::Result<Option<String>>;

    /// Click the element matching the XPath `selector`.
    fn click_element(&mut self, selector: &str) -> anyhow::Result<bool>;

    /// Fill inputs given as `name(value)` entries.
    fn fill_form(&mut self, input_list: &[String]) -> anyhow::Result<bool>;

    /// Links on the current page worth following.
    fn get_navigable(&mut self) -> anyhow::Result<Vec<String>>;

    /// Save a screenshot as `filename`.
    fn screenshot(&mut self, filename: &str) -> anyhow::Result<bool>;

    /// Where the last screenshot was written.
    fn screenshot_path(&self) -> String;

    fn get_current_url(&mut self) -> anyhow::Result<String>;

    fn go_back(&mut self) -> anyhow::Result<()>;

    /// Descriptions of the form inputs on the current page.
    fn get_form_inputs(&mut self) -> anyhow::Result<Vec<String>>;
}
