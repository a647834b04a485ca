/// Represents ways to locate an element on the remote page.
///
/// Selectors are opaque tokens from the point of view of the automation
/// core; only the adapter interprets them. The variants map onto the
/// location strategies every mainstream web driver understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Select by element id attribute
    Id(String),
    /// Select using a CSS selector
    Css(String),
    /// Select using an XPath query
    XPath(String),
    /// Select an anchor by its exact visible text
    LinkText(String),
    /// Select an anchor whose visible text contains the given fragment
    PartialLinkText(String),
    /// Represents an invalid selector string, with a reason.
    Invalid(String),
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Id(v) => write!(f, "id:{v}"),
            Selector::Css(v) => write!(f, "css:{v}"),
            Selector::XPath(v) => write!(f, "xpath:{v}"),
            Selector::LinkText(v) => write!(f, "text:{v}"),
            Selector::PartialLinkText(v) => write!(f, "text*:{v}"),
            Selector::Invalid(reason) => write!(f, "invalid:{reason}"),
        }
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        match s {
            _ if s.starts_with("id:") => Selector::Id(s[3..].trim().to_string()),
            _ if s.starts_with('#') => Selector::Id(s[1..].to_string()),
            _ if s.to_lowercase().starts_with("css:") => {
                Selector::Css(s[4..].trim().to_string())
            }
            _ if s.to_lowercase().starts_with("xpath:") => {
                Selector::XPath(s[6..].trim().to_string())
            }
            _ if s.starts_with('/') => Selector::XPath(s.to_string()),
            _ if s.starts_with("text*:") => Selector::PartialLinkText(s[6..].to_string()),
            _ if s.starts_with("text:") => Selector::LinkText(s[5..].to_string()),
            _ => Selector::Invalid(format!(
                "Unknown selector format: \"{s}\". Use prefixes like 'id:', 'css:', 'xpath:', 'text:', or 'text*:' to specify the selector type."
            )),
        }
    }
}
