//! Typed contact fields: phones, emails, addresses, and the rest.

/// Phone number classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PhoneType {
    #[default]
    Mobile,
    Home,
    Work,
    Fax,
    Pager,
    Other,
    Custom,
}

impl PhoneType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "Mobile",
            Self::Home => "Home",
            Self::Work => "Work",
            Self::Fax => "Fax",
            Self::Pager => "Pager",
            Self::Other => "Other",
            Self::Custom => "Custom",
        }
    }

    /// Inverse of [`as_str`](Self::as_str); unknown names fall back to
    /// the default.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Home" => Self::Home,
            "Work" => Self::Work,
            "Fax" => Self::Fax,
            "Pager" => Self::Pager,
            "Other" => Self::Other,
            "Custom" => Self::Custom,
            _ => Self::Mobile,
        }
    }
}

impl std::fmt::Display for PhoneType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Email address classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EmailType {
    #[default]
    Home,
    Work,
    Other,
    Custom,
}

impl EmailType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Work => "Work",
            Self::Other => "Other",
            Self::Custom => "Custom",
        }
    }

    /// Inverse of [`as_str`](Self::as_str); unknown names fall back to
    /// the default.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Work" => Self::Work,
            "Other" => Self::Other,
            "Custom" => Self::Custom,
            _ => Self::Home,
        }
    }
}

impl std::fmt::Display for EmailType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Postal address classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressType {
    #[default]
    Home,
    Work,
    Other,
    Custom,
}

impl AddressType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Work => "Work",
            Self::Other => "Other",
            Self::Custom => "Custom",
        }
    }

    /// Inverse of [`as_str`](Self::as_str); unknown names fall back to
    /// the default.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Work" => Self::Work,
            "Other" => Self::Other,
            "Custom" => Self::Custom,
            _ => Self::Home,
        }
    }
}

impl std::fmt::Display for AddressType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Website classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WebsiteType {
    Home,
    Work,
    Blog,
    Portfolio,
    #[default]
    Other,
    Custom,
}

impl WebsiteType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Work => "Work",
            Self::Blog => "Blog",
            Self::Portfolio => "Portfolio",
            Self::Other => "Other",
            Self::Custom => "Custom",
        }
    }

    /// Inverse of [`as_str`](Self::as_str); unknown names fall back to
    /// the default.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Home" => Self::Home,
            "Work" => Self::Work,
            "Blog" => Self::Blog,
            "Portfolio" => Self::Portfolio,
            "Custom" => Self::Custom,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for WebsiteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instant messaging service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImProtocol {
    WhatsApp,
    Telegram,
    Signal,
    Skype,
    Discord,
    Slack,
    Messenger,
    Instagram,
    Snapchat,
    Line,
    Viber,
    WeChat,
    Qq,
    Icq,
    Aim,
    Jabber,
    #[default]
    Other,
    Custom,
}

impl ImProtocol {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WhatsApp => "WhatsApp",
            Self::Telegram => "Telegram",
            Self::Signal => "Signal",
            Self::Skype => "Skype",
            Self::Discord => "Discord",
            Self::Slack => "Slack",
            Self::Messenger => "Messenger",
            Self::Instagram => "Instagram",
            Self::Snapchat => "Snapchat",
            Self::Line => "LINE",
            Self::Viber => "Viber",
            Self::WeChat => "WeChat",
            Self::Qq => "QQ",
            Self::Icq => "ICQ",
            Self::Aim => "AIM",
            Self::Jabber => "Jabber",
            Self::Other => "Other",
            Self::Custom => "Custom",
        }
    }

    /// Inverse of [`as_str`](Self::as_str); unknown names fall back to
    /// the default.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "WhatsApp" => Self::WhatsApp,
            "Telegram" => Self::Telegram,
            "Signal" => Self::Signal,
            "Skype" => Self::Skype,
            "Discord" => Self::Discord,
            "Slack" => Self::Slack,
            "Messenger" => Self::Messenger,
            "Instagram" => Self::Instagram,
            "Snapchat" => Self::Snapchat,
            "LINE" => Self::Line,
            "Viber" => Self::Viber,
            "WeChat" => Self::WeChat,
            "QQ" => Self::Qq,
            "ICQ" => Self::Icq,
            "AIM" => Self::Aim,
            "Jabber" => Self::Jabber,
            "Custom" => Self::Custom,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for ImProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dated event attached to a contact (anniversary and the like).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventType {
    Anniversary,
    /// Alternative to the contact-level birthday field.
    Birthday,
    Custom,
    #[default]
    Other,
}

impl EventType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anniversary => "Anniversary",
            Self::Birthday => "Birthday",
            Self::Custom => "Custom Event",
            Self::Other => "Other",
        }
    }

    /// Inverse of [`as_str`](Self::as_str); unknown names fall back to
    /// the default.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Anniversary" => Self::Anniversary,
            "Birthday" => Self::Birthday,
            "Custom Event" => Self::Custom,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single phone number with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber {
    pub number: String,
    pub kind: PhoneType,
    /// Free-form label, meaningful when `kind` is [`PhoneType::Custom`].
    pub label: Option<String>,
}

impl PhoneNumber {
    #[must_use]
    pub fn new(number: impl Into<String>, kind: PhoneType) -> Self {
        Self {
            number: number.into(),
            kind,
            label: None,
        }
    }

    /// Label shown in lists: a non-blank custom label wins over the type name.
    #[must_use]
    pub fn display_kind(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label,
            _ => self.kind.as_str(),
        }
    }
}

/// A single email address with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub address: String,
    pub kind: EmailType,
    /// Free-form label, meaningful when `kind` is [`EmailType::Custom`].
    pub label: Option<String>,
}

impl Email {
    #[must_use]
    pub fn new(address: impl Into<String>, kind: EmailType) -> Self {
        Self {
            address: address.into(),
            kind,
            label: None,
        }
    }

    #[must_use]
    pub fn display_kind(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label,
            _ => self.kind.as_str(),
        }
    }
}

/// A postal address. Empty components are simply absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub kind: AddressType,
    pub label: Option<String>,
}

impl Address {
    #[must_use]
    pub fn display_kind(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label,
            _ => self.kind.as_str(),
        }
    }
}

/// A website URL with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Website {
    pub url: String,
    pub kind: WebsiteType,
}

/// An instant-messaging handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantMessage {
    pub handle: String,
    pub protocol: ImProtocol,
}

/// A dated event. `date` is ISO `YYYY-MM-DD`, or `--MM-DD` for events
/// that recur without a known year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub date: String,
    pub kind: EventType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_kind_prefers_custom_label() {
        let phone = PhoneNumber {
            number: "555-0100".to_string(),
            kind: PhoneType::Custom,
            label: Some("Satellite".to_string()),
        };
        assert_eq!(phone.display_kind(), "Satellite");
    }

    #[test]
    fn display_kind_ignores_blank_label() {
        let phone = PhoneNumber {
            number: "555-0100".to_string(),
            kind: PhoneType::Work,
            label: Some("   ".to_string()),
        };
        assert_eq!(phone.display_kind(), "Work");
    }

    #[test]
    fn display_kind_falls_back_to_type() {
        let email = Email::new("a@example.com", EmailType::Home);
        assert_eq!(email.display_kind(), "Home");
    }

    #[test]
    fn from_name_inverts_as_str() {
        assert_eq!(PhoneType::from_name(PhoneType::Pager.as_str()), PhoneType::Pager);
        assert_eq!(EventType::from_name(EventType::Custom.as_str()), EventType::Custom);
        assert_eq!(ImProtocol::from_name("LINE"), ImProtocol::Line);
    }

    #[test]
    fn from_name_falls_back_on_unknown() {
        assert_eq!(PhoneType::from_name("Carrier Pigeon"), PhoneType::Mobile);
        assert_eq!(EmailType::from_name(""), EmailType::Home);
        assert_eq!(WebsiteType::from_name("Unknown"), WebsiteType::Other);
    }
}
