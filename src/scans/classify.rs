use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QrKind {
    Url,
    Email,
    Phone,
    Wifi,
    Contact,
    Text,
}

/// Display decoration for a payload. Not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub kind: QrKind,
    pub icon: &'static str,
    pub color: &'static str,
}

impl QrKind {
    pub fn icon(self) -> &'static str {
        match self {
            QrKind::Url => "link",
            QrKind::Email => "mail",
            QrKind::Phone => "call",
            QrKind::Wifi => "wifi",
            QrKind::Contact => "person",
            QrKind::Text => "document-text",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            QrKind::Url => "#007AFF",
            QrKind::Email => "#FF9500",
            QrKind::Phone => "#34C759",
            QrKind::Wifi => "#5856D6",
            QrKind::Contact => "#FF2D55",
            QrKind::Text => "#8E8E93",
        }
    }
}

/// First matching rule wins. Prefix checks are case-sensitive.
pub fn classify(qr_data: &str) -> Classification {
    let kind = if qr_data.starts_with("http://") || qr_data.starts_with("https://") {
        QrKind::Url
    } else if qr_data.starts_with("mailto:") {
        QrKind::Email
    } else if qr_data.starts_with("tel:") {
        QrKind::Phone
    } else if qr_data.starts_with("WiFi:") {
        QrKind::Wifi
    } else if qr_data.contains("Contact:") || qr_data.contains("VCARD") {
        QrKind::Contact
    } else {
        QrKind::Text
    };
    Classification {
        kind,
        icon: kind.icon(),
        color: kind.color(),
    }
}
