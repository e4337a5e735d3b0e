// SPDX-FileCopyrightText: 2026 Vendra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire row shapes and defensive decoding for realtime events.
//!
//! The upstream store pushes rows with camelCase Spanish field names.
//! The structured payload fields (`functionCallArgs`,
//! `functionResponseData`) sometimes arrive as JSON-encoded strings;
//! they are decoded through a single decode-or-mark-degraded path so a
//! bad payload never silently removes a message from the transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use vendra_core::types::{
    AgentId, AgentRef, ChatMessage, ConversationId, ConversationStatus, MediaRef, MessageId,
    MessagePart, MessageRole,
};
use vendra_core::VendraError;

/// Wire shape of a message row as delivered by the realtime channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRow {
    pub id: String,
    pub conversacion_id: String,
    pub role: String,
    #[serde(default)]
    pub parte_tipo: Option<String>,
    #[serde(default)]
    pub mensaje: Option<String>,
    #[serde(default)]
    pub function_call_nombre: Option<String>,
    #[serde(default)]
    pub function_call_args: Option<Value>,
    #[serde(default)]
    pub function_response_data: Option<Value>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub agente_crm: Option<AgentRow>,
    pub created_at: DateTime<Utc>,
}

/// Wire shape of the nested agent reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRow {
    pub id: String,
    #[serde(default)]
    pub nombre: Option<String>,
}

impl From<AgentRow> for AgentRef {
    fn from(row: AgentRow) -> Self {
        AgentRef {
            id: AgentId(row.id),
            name: row.nombre,
        }
    }
}

/// Wire shape of a conversation row pushed on status/agent changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRow {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub agente_crm: Option<AgentRow>,
    pub updated_at: DateTime<Utc>,
}

/// A decoded conversation row patch, ready for the staleness check.
#[derive(Debug, Clone, PartialEq)]
pub struct RowUpdate {
    pub id: ConversationId,
    pub status: ConversationStatus,
    pub assigned_agent: Option<AgentRef>,
    pub updated_at: DateTime<Utc>,
}

/// Decode a raw message event row into a [`ChatMessage`].
///
/// An unparseable row shape (missing id, unparseable timestamp) is an
/// error -- the caller logs and skips it, since no transcript entry can
/// be keyed without an id. Payload-level problems degrade into
/// [`MessagePart::ParseError`] instead.
pub fn decode_message(row: &Value) -> Result<ChatMessage, VendraError> {
    let row: MessageRow = serde_json::from_value(row.clone())
        .map_err(|e| VendraError::Decode(format!("message row: {e}")))?;

    let role: MessageRole = row
        .role
        .parse()
        .map_err(|_| VendraError::Decode(format!("unknown message role `{}`", row.role)))?;

    let part = decode_part(&row);

    let media = row.media_url.map(|url| MediaRef {
        url,
        media_type: row.media_type,
    });

    Ok(ChatMessage {
        id: MessageId(row.id),
        conversation_id: ConversationId(row.conversacion_id),
        role,
        part,
        media,
        agent: row.agente_crm.map(AgentRef::from),
        created_at: row.created_at,
    })
}

/// Decode the polymorphic payload fields of a message row.
///
/// A missing or unknown `parteTipo` with plain text falls back to TEXT;
/// structured variants that fail to parse yield the degraded marker.
fn decode_part(row: &MessageRow) -> MessagePart {
    match row.parte_tipo.as_deref() {
        None | Some("TEXT") => MessagePart::Text {
            text: row.mensaje.clone().unwrap_or_default(),
        },
        Some("FUNCTION_CALL") => {
            let Some(name) = row.function_call_nombre.clone() else {
                return MessagePart::ParseError {
                    raw: row.function_call_args.clone().unwrap_or_default().to_string(),
                    detail: "FUNCTION_CALL without functionCallNombre".to_string(),
                };
            };
            match decode_embedded(row.function_call_args.clone()) {
                Ok(args) => MessagePart::FunctionCall { name, args },
                Err((raw, detail)) => MessagePart::ParseError { raw, detail },
            }
        }
        Some("FUNCTION_RESPONSE") => match decode_embedded(row.function_response_data.clone()) {
            Ok(data) => MessagePart::FunctionResponse { data },
            Err((raw, detail)) => MessagePart::ParseError { raw, detail },
        },
        Some(other) => MessagePart::ParseError {
            raw: row.mensaje.clone().unwrap_or_default(),
            detail: format!("unknown parteTipo `{other}`"),
        },
    }
}

/// Decode a payload value that may be a JSON-encoded string.
///
/// Objects pass through unchanged; strings are parsed as JSON. A string
/// that fails to parse is returned as the degraded pair (raw, detail).
fn decode_embedded(value: Option<Value>) -> Result<Value, (String, String)> {
    match value {
        None => Ok(Value::Null),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(&s) {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err((s, format!("embedded JSON parse failed: {e}"))),
        },
        Some(other) => Ok(other),
    }
}

/// Decode a raw conversation row event into a [`RowUpdate`].
///
/// Any malformed field is an error here: row patches carry no content
/// worth degrading, so the merger logs and skips them.
pub fn decode_row_update(row: &Value) -> Result<RowUpdate, VendraError> {
    let row: ConversationRow = serde_json::from_value(row.clone())
        .map_err(|e| VendraError::Decode(format!("conversation row: {e}")))?;

    let status: ConversationStatus = row
        .status
        .parse()
        .map_err(|_| VendraError::Decode(format!("unknown conversation status `{}`", row.status)))?;

    Ok(RowUpdate {
        id: ConversationId(row.id),
        status,
        assigned_agent: row.agente_crm.map(AgentRef::from),
        updated_at: row.updated_at,
    })
}

/// Serialize a [`ChatMessage`] back into its wire row form.
///
/// Used by in-process transports (and the demo backend) to produce the
/// same rows the production channel would push.
pub fn message_to_row(msg: &ChatMessage) -> Value {
    let (parte_tipo, mensaje, fc_nombre, fc_args, fr_data) = match &msg.part {
        MessagePart::Text { text } => ("TEXT", Some(text.clone()), None, None, None),
        MessagePart::FunctionCall { name, args } => (
            "FUNCTION_CALL",
            None,
            Some(name.clone()),
            Some(args.clone()),
            None,
        ),
        MessagePart::FunctionResponse { data } => {
            ("FUNCTION_RESPONSE", None, None, None, Some(data.clone()))
        }
        MessagePart::ParseError { raw, .. } => ("TEXT", Some(raw.clone()), None, None, None),
    };

    let row = MessageRow {
        id: msg.id.0.clone(),
        conversacion_id: msg.conversation_id.0.clone(),
        role: msg.role.to_string(),
        parte_tipo: Some(parte_tipo.to_string()),
        mensaje,
        function_call_nombre: fc_nombre,
        function_call_args: fc_args,
        function_response_data: fr_data,
        media_url: msg.media.as_ref().map(|m| m.url.clone()),
        media_type: msg.media.as_ref().and_then(|m| m.media_type.clone()),
        agente_crm: msg.agent.as_ref().map(|a| AgentRow {
            id: a.id.0.clone(),
            nombre: a.name.clone(),
        }),
        created_at: msg.created_at,
    };

    serde_json::to_value(row).unwrap_or(Value::Null)
}

/// Serialize a conversation into its wire row form.
pub fn conversation_to_row(conversation: &vendra_core::types::Conversation) -> Value {
    let row = ConversationRow {
        id: conversation.id.0.clone(),
        status: conversation.status.to_string(),
        agente_crm: conversation.assigned_agent.as_ref().map(|a| AgentRow {
            id: a.id.0.clone(),
            nombre: a.name.clone(),
        }),
        updated_at: conversation.updated_at,
    };

    serde_json::to_value(row).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_plain_text_row() {
        let row = json!({
            "id": "m1",
            "conversacionId": "conv-1",
            "role": "user",
            "parteTipo": "TEXT",
            "mensaje": "hola, quiero informes",
            "createdAt": "2026-03-01T10:00:00Z"
        });

        let msg = decode_message(&row).unwrap();
        assert_eq!(msg.id, MessageId::from("m1"));
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.part.as_text(), Some("hola, quiero informes"));
    }

    #[test]
    fn missing_parte_tipo_defaults_to_text() {
        let row = json!({
            "id": "m2",
            "conversacionId": "conv-1",
            "role": "assistant",
            "mensaje": "claro, con gusto",
            "createdAt": "2026-03-01T10:00:05Z"
        });

        let msg = decode_message(&row).unwrap();
        assert_eq!(msg.part.as_text(), Some("claro, con gusto"));
    }

    #[test]
    fn function_call_args_may_arrive_as_encoded_string() {
        let row = json!({
            "id": "m3",
            "conversacionId": "conv-1",
            "role": "assistant",
            "parteTipo": "FUNCTION_CALL",
            "functionCallNombre": "agendar_cita",
            "functionCallArgs": "{\"fecha\":\"2026-03-02\"}",
            "createdAt": "2026-03-01T10:00:10Z"
        });

        let msg = decode_message(&row).unwrap();
        match msg.part {
            MessagePart::FunctionCall { name, args } => {
                assert_eq!(name, "agendar_cita");
                assert_eq!(args["fecha"], "2026-03-02");
            }
            other => panic!("expected FunctionCall, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_args_degrade_instead_of_dropping() {
        let row = json!({
            "id": "m4",
            "conversacionId": "conv-1",
            "role": "assistant",
            "parteTipo": "FUNCTION_RESPONSE",
            "functionResponseData": "{not-json",
            "createdAt": "2026-03-01T10:00:15Z"
        });

        let msg = decode_message(&row).unwrap();
        match msg.part {
            MessagePart::ParseError { raw, detail } => {
                assert_eq!(raw, "{not-json");
                assert!(detail.contains("parse failed"));
            }
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn unknown_parte_tipo_degrades() {
        let row = json!({
            "id": "m5",
            "conversacionId": "conv-1",
            "role": "system",
            "parteTipo": "UI_COMPONENT",
            "mensaje": "payload",
            "createdAt": "2026-03-01T10:00:20Z"
        });

        let msg = decode_message(&row).unwrap();
        assert!(matches!(msg.part, MessagePart::ParseError { .. }));
    }

    #[test]
    fn row_without_id_is_an_error() {
        let row = json!({
            "conversacionId": "conv-1",
            "role": "user",
            "mensaje": "x",
            "createdAt": "2026-03-01T10:00:00Z"
        });
        assert!(decode_message(&row).is_err());
    }

    #[test]
    fn unknown_role_is_an_error() {
        let row = json!({
            "id": "m6",
            "conversacionId": "conv-1",
            "role": "bot",
            "mensaje": "x",
            "createdAt": "2026-03-01T10:00:00Z"
        });
        assert!(decode_message(&row).is_err());
    }

    #[test]
    fn decodes_conversation_row() {
        let row = json!({
            "id": "conv-1",
            "status": "hitl_activo",
            "agenteCrm": {"id": "agent-1", "nombre": "Val"},
            "updatedAt": "2026-03-01T11:00:00Z"
        });

        let update = decode_row_update(&row).unwrap();
        assert_eq!(update.status, ConversationStatus::HitlActive);
        assert_eq!(
            update.assigned_agent.and_then(|a| a.name),
            Some("Val".to_string())
        );
    }

    #[test]
    fn unknown_status_string_is_an_error() {
        let row = json!({
            "id": "conv-1",
            "status": "abierta_v2",
            "updatedAt": "2026-03-01T11:00:00Z"
        });
        assert!(decode_row_update(&row).is_err());
    }

    #[test]
    fn message_row_round_trips_through_wire_form() {
        let original = ChatMessage {
            id: MessageId::from("m7"),
            conversation_id: ConversationId::from("conv-1"),
            role: MessageRole::Agent,
            part: MessagePart::text("respuesta manual"),
            media: None,
            agent: Some(AgentRef {
                id: AgentId::from("agent-1"),
                name: Some("Val".to_string()),
            }),
            created_at: "2026-03-01T12:00:00Z".parse().unwrap(),
        };

        let row = message_to_row(&original);
        let decoded = decode_message(&row).unwrap();
        assert_eq!(decoded, original);
    }
}
