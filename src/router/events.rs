use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound platform event, already verified and parsed by the transport
/// layer. The router treats it as an opaque validated struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    /// Event category.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Command name, component custom id, or modal custom id.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form payload fields (command options, modal field values).
    #[serde(default)]
    pub payload: Value,
    /// Channel the event arrived in, when the platform supplies one.
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Thread the event targets, when it happened inside a thread.
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Platform id of the message the event is attached to.
    #[serde(default)]
    pub message_id: Option<String>,
    /// Display identity of the event's author.
    #[serde(default)]
    pub author: Option<String>,
}

/// Inbound event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Handshake,
    Command,
    Component,
    Modal,
    Message,
}

impl InboundEvent {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// A string field from the payload, empty when absent.
    pub fn payload_str(&self, key: &str) -> &str {
        self.payload
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

/// Outbound response descriptor. The transport renders this into
/// platform-specific wire format; the router never builds wire JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub kind: ResponseKind,
    pub visibility: Visibility,
    pub body: ResponseBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Reply to the interaction right away.
    Immediate,
    /// Acknowledge now, content follows separately.
    Deferred,
    /// Open a modal with text inputs.
    ModalRequest,
    /// Replace the message the interaction was attached to.
    UpdateMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible only to the event's author.
    Private,
    /// Visible to the whole channel.
    Public,
}

/// Renderable body of a response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(default)]
    pub text: String,
    /// Structured name/value pairs (stanza fields, reaction hints).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    /// Interactive controls the transport should attach.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<Control>,
    /// Text inputs to collect, for modal requests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<TextInput>,
    /// Custom id of the modal being requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modal_id: Option<String>,
    /// Modal title, for modal requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modal_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// A button attached to the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    pub custom_id: String,
    pub label: String,
}

/// A text input inside a requested modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInput {
    pub custom_id: String,
    pub label: String,
    #[serde(default)]
    pub paragraph: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefill: Option<String>,
}

impl Response {
    pub fn immediate(text: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Immediate,
            visibility: Visibility::Public,
            body: ResponseBody {
                text: text.into(),
                ..Default::default()
            },
        }
    }

    pub fn private(text: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Immediate,
            visibility: Visibility::Private,
            body: ResponseBody {
                text: text.into(),
                ..Default::default()
            },
        }
    }

    pub fn update(text: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::UpdateMessage,
            visibility: Visibility::Public,
            body: ResponseBody {
                text: text.into(),
                ..Default::default()
            },
        }
    }

    pub fn modal(
        modal_id: impl Into<String>,
        title: impl Into<String>,
        inputs: Vec<TextInput>,
    ) -> Self {
        Self {
            kind: ResponseKind::ModalRequest,
            visibility: Visibility::Private,
            body: ResponseBody {
                modal_id: Some(modal_id.into()),
                modal_title: Some(title.into()),
                inputs,
                ..Default::default()
            },
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.body.fields = fields;
        self
    }

    pub fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.body.controls = controls;
        self
    }
}
