//! Email payloads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Content type used by [`Attachment::pdf`].
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// One address or a list of addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(addr) => vec![addr.clone()],
            Self::Many(list) => list.clone(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::One(addr) => std::slice::from_ref(addr),
            Self::Many(list) => list,
        };
        slice.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for Recipients {
    fn from(addr: &str) -> Self {
        Self::One(addr.to_string())
    }
}

impl From<String> for Recipients {
    fn from(addr: String) -> Self {
        Self::One(addr)
    }
}

impl From<Vec<String>> for Recipients {
    fn from(list: Vec<String>) -> Self {
        Self::Many(list)
    }
}

impl From<Vec<&str>> for Recipients {
    fn from(list: Vec<&str>) -> Self {
        Self::Many(list.into_iter().map(String::from).collect())
    }
}

/// A file attached to a message. `content` is base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    pub content: String,
    pub content_type: String,
}

impl Attachment {
    /// Encode raw bytes.
    pub fn from_bytes(
        filename: impl Into<String>,
        bytes: &[u8],
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content: STANDARD.encode(bytes),
            content_type: content_type.into(),
        }
    }

    pub fn pdf(filename: impl Into<String>, bytes: &[u8]) -> Self {
        Self::from_bytes(filename, bytes, PDF_CONTENT_TYPE)
    }
}

/// An outbound message. Consumed by exactly one send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub to: Recipients,
    /// Falls back to the configured sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub subject: String,
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<Recipients>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Recipients>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

impl EmailMessage {
    pub fn new(
        to: impl Into<Recipients>,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            from: None,
            subject: subject.into(),
            html: html.into(),
            text: None,
            cc: None,
            bcc: None,
            attachments: None,
        }
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn cc(mut self, cc: impl Into<Recipients>) -> Self {
        self.cc = Some(cc.into());
        self
    }

    pub fn bcc(mut self, bcc: impl Into<Recipients>) -> Self {
        self.bcc = Some(bcc.into());
        self
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.get_or_insert_with(Vec::new).push(attachment);
        self
    }

    /// Sender, or an empty string when unset.
    pub fn sender(&self) -> &str {
        self.from.as_deref().unwrap_or_default()
    }

    /// Number of addresses across `to`, `cc` and `bcc`.
    pub fn recipient_count(&self) -> usize {
        self.to.len()
            + self.cc.as_ref().map_or(0, Recipients::len)
            + self.bcc.as_ref().map_or(0, Recipients::len)
    }
}
