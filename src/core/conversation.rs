//! # Conversation Items
//!
//! One discrete entry in a context's transcript. Items arrive as untyped JSON;
//! [`ConversationItem::from_value`] is the gate that decides whether a value is
//! canonical. Canonical items expose their payload through [`ItemBody`], a
//! tagged enum with one variant per kind, so every consumer matches
//! exhaustively on the kind.
//!
//! ```text
//! item_type        payload field   body
//! ───────────────  ──────────────  ─────────────────────────
//! user_input       user_input      ItemBody::UserInput
//! assistant_turn   turn            ItemBody::AssistantTurn
//! assistant        assistant       ItemBody::Assistant      (v1)
//! tool_call        tool_call       ItemBody::ToolCall       (v1)
//! tool_result      tool_result     ItemBody::ToolResult     (v1)
//! system           system          ItemBody::System
//! handoff          handoff         ItemBody::Handoff
//! ```

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    UserInput,
    AssistantTurn,
    Assistant,
    ToolCall,
    ToolResult,
    System,
    Handoff,
}

impl ItemType {
    /// Name of the JSON field that carries this kind's payload.
    pub fn payload_field(self) -> &'static str {
        match self {
            ItemType::UserInput => "user_input",
            ItemType::AssistantTurn => "turn",
            ItemType::Assistant => "assistant",
            ItemType::ToolCall => "tool_call",
            ItemType::ToolResult => "tool_result",
            ItemType::System => "system",
            ItemType::Handoff => "handoff",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemType::UserInput => "User",
            ItemType::AssistantTurn => "Assistant",
            ItemType::Assistant => "Assistant",
            ItemType::ToolCall => "Tool Call",
            ItemType::ToolResult => "Tool Result",
            ItemType::System => "System",
            ItemType::Handoff => "Handoff",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Streaming,
    Complete,
    Error,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// How an item status is drawn. Unknown statuses draw as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIndicator {
    Spinner,
    PulsingDot,
    Failed,
    Cancelled,
    Done,
}

impl ItemStatus {
    pub fn indicator(self) -> StatusIndicator {
        match self {
            ItemStatus::Streaming => StatusIndicator::Spinner,
            ItemStatus::Pending => StatusIndicator::PulsingDot,
            ItemStatus::Error => StatusIndicator::Failed,
            ItemStatus::Cancelled => StatusIndicator::Cancelled,
            ItemStatus::Complete | ItemStatus::Unknown => StatusIndicator::Done,
        }
    }
}

/// Item timestamps come as unix milliseconds, either a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Float(f64),
    Text(String),
}

impl Timestamp {
    pub fn as_millis(&self) -> Option<i64> {
        match self {
            Timestamp::Millis(ms) => Some(*ms),
            Timestamp::Float(ms) if ms.is_finite() => Some(*ms as i64),
            Timestamp::Float(_) => None,
            Timestamp::Text(s) => parse_leading_int(s),
        }
    }

    /// Local wall-clock time, e.g. `14:03:27`.
    pub fn format_local(&self) -> Option<String> {
        let ms = self.as_millis()?;
        let dt: DateTime<Local> = DateTime::<Utc>::from_timestamp_millis(ms)?.with_timezone(&Local);
        Some(dt.format("%H:%M:%S").to_string())
    }
}

/// Leading decimal integer of a string, ignoring surrounding whitespace and
/// anything after the digits (`"1700000000000ms"` → 1700000000000).
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse::<i64>().ok().map(|n| n * sign)
}

// ============================================================================
// Item envelope
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationItem {
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_input: Option<UserInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn: Option<AssistantTurn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant: Option<Assistant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCallData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ToolResultData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff: Option<HandoffInfo>,
}

/// The payload matching an item's kind.
#[derive(Debug, Clone, Copy)]
pub enum ItemBody<'a> {
    UserInput(&'a UserInput),
    AssistantTurn(&'a AssistantTurn),
    Assistant(&'a Assistant),
    ToolCall(&'a ToolCallData),
    ToolResult(&'a ToolResultData),
    System(&'a SystemMessage),
    Handoff(&'a HandoffInfo),
}

impl ConversationItem {
    /// An item of the given kind with no payload attached.
    pub fn empty(item_type: ItemType) -> Self {
        Self {
            item_type,
            status: None,
            timestamp: None,
            user_input: None,
            turn: None,
            assistant: None,
            tool_call: None,
            tool_result: None,
            system: None,
            handoff: None,
        }
    }

    /// Parse an untyped value as a canonical item.
    ///
    /// Canonical means: an object whose `item_type` is a known kind, whose
    /// payload field for that kind is present as an object, and which
    /// deserializes as a whole. Payload fields for other kinds are tolerated
    /// and ignored by [`body`](Self::body).
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let item_type: ItemType = serde_json::from_value(obj.get("item_type")?.clone()).ok()?;
        if !obj.get(item_type.payload_field()).is_some_and(Value::is_object) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// The payload selected by `item_type`. `None` when that field is absent,
    /// even if another kind's payload is populated.
    pub fn body(&self) -> Option<ItemBody<'_>> {
        match self.item_type {
            ItemType::UserInput => self.user_input.as_ref().map(ItemBody::UserInput),
            ItemType::AssistantTurn => self.turn.as_ref().map(ItemBody::AssistantTurn),
            ItemType::Assistant => self.assistant.as_ref().map(ItemBody::Assistant),
            ItemType::ToolCall => self.tool_call.as_ref().map(ItemBody::ToolCall),
            ItemType::ToolResult => self.tool_result.as_ref().map(ItemBody::ToolResult),
            ItemType::System => self.system.as_ref().map(ItemBody::System),
            ItemType::Handoff => self.handoff.as_ref().map(ItemBody::Handoff),
        }
    }
}

/// Structural guard for untyped values. See [`ConversationItem::from_value`].
pub fn is_conversation_item(value: &Value) -> bool {
    ConversationItem::from_value(value).is_some()
}

// ============================================================================
// Payloads
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantTurn {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallItem>,
    #[serde(default)]
    pub agent: Option<String>,
    /// Zero-based.
    #[serde(default, deserialize_with = "lenient_int")]
    pub turn_number: Option<u32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub max_turns: Option<u32>,
    #[serde(default)]
    pub metrics: Option<TurnMetrics>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl AssistantTurn {
    /// `(current, max)` as 1-based "turn X of Y", only when `max_turns > 0`.
    pub fn progress(&self) -> Option<(u32, u32)> {
        match (self.turn_number, self.max_turns) {
            (Some(n), Some(max)) if max > 0 => Some((n + 1, max)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnMetrics {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub input_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub output_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    #[default]
    Pending,
    Running,
    Streaming,
    Complete,
    Error,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl ToolCallStatus {
    /// Pending, running and streaming calls pulse.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            ToolCallStatus::Pending | ToolCallStatus::Running | ToolCallStatus::Streaming
        )
    }
}

/// A tool call nested inside an assistant turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallItem {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default)]
    pub status: ToolCallStatus,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub streaming_output: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub streaming_output_truncated: bool,
    #[serde(default)]
    pub result: Option<ToolCallResult>,
    #[serde(default)]
    pub error: Option<ToolCallError>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub content_truncated: bool,
    #[serde(default, deserialize_with = "lenient_int")]
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallError {
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub exit_code: Option<i32>,
}

/// Which text fills a tool call's output section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutput<'a> {
    Streaming(&'a str),
    Result(&'a str),
    Error(&'a str),
}

impl ToolOutput<'_> {
    pub fn text(&self) -> &str {
        match self {
            ToolOutput::Streaming(s) | ToolOutput::Result(s) | ToolOutput::Error(s) => s,
        }
    }
}

impl ToolCallItem {
    /// Streaming output, else finalized result content, else the error message.
    pub fn output(&self) -> Option<ToolOutput<'_>> {
        if let Some(s) = non_empty(&self.streaming_output) {
            return Some(ToolOutput::Streaming(s));
        }
        if let Some(s) = self.result.as_ref().and_then(|r| non_empty(&r.content)) {
            return Some(ToolOutput::Result(s));
        }
        self.error
            .as_ref()
            .map(|e| e.message.as_str())
            .filter(|s| !s.is_empty())
            .map(ToolOutput::Error)
    }

    pub fn is_error(&self) -> bool {
        self.status == ToolCallStatus::Error || self.error.is_some()
    }

    pub fn is_truncated(&self) -> bool {
        self.streaming_output_truncated || self.result.as_ref().is_some_and(|r| r.content_truncated)
    }

    /// Duration worth showing: present and non-zero.
    pub fn visible_duration_ms(&self) -> Option<u64> {
        self.duration_ms.filter(|&ms| ms > 0)
    }
}

/// v1 standalone tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallData {
    #[serde(default)]
    pub call_id: String,
    pub name: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default)]
    pub description: Option<String>,
}

/// v1 standalone tool result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResultData {
    #[serde(default)]
    pub call_id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub streaming_output: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_error: bool,
    #[serde(default, deserialize_with = "lenient_int")]
    pub exit_code: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub duration_ms: Option<u64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub output_truncated: bool,
}

impl ToolResultData {
    /// Streaming output wins over final content.
    pub fn output(&self) -> Option<&str> {
        non_empty(&self.streaming_output).or(non_empty(&self.content))
    }
}

/// v1 assistant message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assistant {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub input_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub output_tokens: Option<u64>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemKind {
    #[default]
    Info,
    Warning,
    Error,
    Guardrail,
    RateLimit,
    Rewind,
    #[serde(other)]
    Unknown,
}

impl SystemKind {
    /// Kind used for styling. Unknown kinds look like `info`.
    pub fn treatment(self) -> SystemKind {
        match self {
            SystemKind::Unknown => SystemKind::Info,
            known => known,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemMessage {
    #[serde(default)]
    pub kind: SystemKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandoffInfo {
    pub from_agent: String,
    pub to_agent: String,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

/// Counters, durations and exit codes. Producers sometimes emit floats
/// (`812.5`) or `null`; floats are rounded, and anything that is not a
/// number in range for `T` reads as absent.
fn lenient_int<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(whole_number(&value).and_then(|n| T::try_from(n).ok()))
}

fn whole_number(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64()
        .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
}

/// Flags read as `false` unless they are literally `true`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

// ============================================================================
// Tool presentation
// ============================================================================

/// Coarse tool family, keyed off the tool name. Drives glyph and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Shell,
    Read,
    Edit,
    Search,
    Web,
    Spawn,
    Other,
}

impl ToolKind {
    pub fn from_name(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));
        if has(&["bash", "shell", "exec", "command", "terminal"]) {
            ToolKind::Shell
        } else if has(&["spawn", "task", "agent", "delegate"]) {
            ToolKind::Spawn
        } else if has(&["write", "edit", "patch", "replace", "create_file"]) {
            ToolKind::Edit
        } else if has(&["read", "view", "cat", "open"]) {
            ToolKind::Read
        } else if has(&["grep", "glob", "search", "find", "list", "ls"]) {
            ToolKind::Search
        } else if has(&["web", "fetch", "http", "url", "browse"]) {
            ToolKind::Web
        } else {
            ToolKind::Other
        }
    }
}

/// Pretty-print tool arguments. Strings holding JSON are parsed first; other
/// strings are shown as-is.
pub fn format_tool_args(args: &Value) -> String {
    match args {
        Value::Null => String::new(),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed @ (Value::Object(_) | Value::Array(_))) => {
                serde_json::to_string_pretty(&parsed).unwrap_or_else(|_| raw.clone())
            }
            _ => raw.clone(),
        },
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn guard_accepts_well_formed_item() {
        let value = json!({
            "item_type": "user_input",
            "user_input": {"text": "hi", "files": ["a.rs"]},
            "status": "complete",
            "timestamp": "1700000000000"
        });
        assert!(is_conversation_item(&value));
    }

    #[test]
    fn guard_accepts_float_and_null_metrics() {
        let value = json!({
            "item_type": "assistant_turn",
            "turn": {
                "turn_number": 1.0,
                "metrics": {"input_tokens": 1200.0, "output_tokens": null, "duration_ms": 812.5},
                "tool_calls": [{
                    "name": "bash",
                    "duration_ms": 40.2,
                    "streaming_output_truncated": null,
                    "result": {"content": "ok", "exit_code": 0.0, "content_truncated": null}
                }]
            }
        });
        let item = ConversationItem::from_value(&value).unwrap();
        let turn = item.turn.unwrap();
        assert_eq!(turn.turn_number, Some(1));
        let metrics = turn.metrics.unwrap();
        assert_eq!(metrics.input_tokens, Some(1200));
        assert_eq!(metrics.output_tokens, None);
        assert_eq!(metrics.duration_ms, Some(813));
        let call = &turn.tool_calls[0];
        assert_eq!(call.duration_ms, Some(40));
        assert!(!call.streaming_output_truncated);
        assert_eq!(call.result.as_ref().unwrap().exit_code, Some(0));
    }

    #[test]
    fn out_of_range_numbers_read_as_absent() {
        let value = json!({
            "item_type": "tool_result",
            "tool_result": {"duration_ms": -5, "exit_code": "1", "is_error": null}
        });
        let item = ConversationItem::from_value(&value).unwrap();
        let result = item.tool_result.unwrap();
        assert_eq!(result.duration_ms, None);
        assert_eq!(result.exit_code, None);
        assert!(!result.is_error);
    }

    #[test]
    fn guard_rejects_unknown_kind_and_missing_payload() {
        assert!(!is_conversation_item(&json!({"item_type": "telemetry", "telemetry": {}})));
        assert!(!is_conversation_item(&json!({"item_type": "system"})));
        assert!(!is_conversation_item(&json!({"item_type": "system", "system": "oops"})));
        assert!(!is_conversation_item(&json!("not an object")));
        assert!(!is_conversation_item(&json!({"role": "user", "content": "legacy"})));
    }

    #[test]
    fn guard_rejects_malformed_payload() {
        // handoff requires both agents
        let value = json!({"item_type": "handoff", "handoff": {"from_agent": "a"}});
        assert!(!is_conversation_item(&value));
    }

    #[test]
    fn body_follows_item_type_not_populated_fields() {
        let value = json!({
            "item_type": "tool_call",
            "tool_call": {"call_id": "c1", "name": "bash", "args": {"cmd": "ls"}},
            "turn": {"text": "stray"}
        });
        let item = ConversationItem::from_value(&value).unwrap();
        assert!(matches!(item.body(), Some(ItemBody::ToolCall(tc)) if tc.call_id == "c1"));
    }

    #[test]
    fn body_is_none_when_payload_missing() {
        let mut item = ConversationItem::empty(ItemType::AssistantTurn);
        item.assistant = Some(Assistant::default());
        assert!(item.body().is_none());
    }

    #[test]
    fn timestamp_number_and_string_agree() {
        let n: Timestamp = serde_json::from_value(json!(1_700_000_000_123i64)).unwrap();
        let s: Timestamp = serde_json::from_value(json!("1700000000123")).unwrap();
        assert_eq!(n.as_millis(), Some(1_700_000_000_123));
        assert_eq!(n.as_millis(), s.as_millis());
        assert_eq!(n.format_local(), s.format_local());
        assert!(n.format_local().is_some());
    }

    #[test]
    fn timestamp_garbage_string_is_none() {
        assert_eq!(Timestamp::Text("soon".into()).as_millis(), None);
        assert_eq!(Timestamp::Text(" 42abc".into()).as_millis(), Some(42));
    }

    #[test]
    fn status_indicator_mapping() {
        assert_eq!(ItemStatus::Streaming.indicator(), StatusIndicator::Spinner);
        assert_eq!(ItemStatus::Pending.indicator(), StatusIndicator::PulsingDot);
        assert_eq!(ItemStatus::Error.indicator(), StatusIndicator::Failed);
        assert_eq!(ItemStatus::Cancelled.indicator(), StatusIndicator::Cancelled);
        assert_eq!(ItemStatus::Complete.indicator(), StatusIndicator::Done);
        let unknown: ItemStatus = serde_json::from_value(json!("paused")).unwrap();
        assert_eq!(unknown.indicator(), StatusIndicator::Done);
    }

    #[test]
    fn unknown_system_kind_is_treated_as_info() {
        let msg: SystemMessage =
            serde_json::from_value(json!({"kind": "compaction", "content": "x"})).unwrap();
        assert_eq!(msg.kind, SystemKind::Unknown);
        assert_eq!(msg.kind.treatment(), SystemKind::Info);
        assert_eq!(SystemKind::RateLimit.treatment(), SystemKind::RateLimit);
    }

    #[test]
    fn tool_output_precedence() {
        let mut tc = ToolCallItem {
            name: "bash".into(),
            streaming_output: Some("partial".into()),
            result: Some(ToolCallResult {
                content: Some("final".into()),
                ..Default::default()
            }),
            error: Some(ToolCallError {
                message: "boom".into(),
                exit_code: Some(2),
            }),
            ..Default::default()
        };
        assert_eq!(tc.output(), Some(ToolOutput::Streaming("partial")));
        tc.streaming_output = None;
        assert_eq!(tc.output(), Some(ToolOutput::Result("final")));
        tc.result = None;
        assert_eq!(tc.output(), Some(ToolOutput::Error("boom")));
        tc.error = None;
        assert_eq!(tc.output(), None);
    }

    #[test]
    fn tool_call_flags() {
        let tc = ToolCallItem {
            name: "read_file".into(),
            result: Some(ToolCallResult {
                content_truncated: true,
                ..Default::default()
            }),
            duration_ms: Some(0),
            ..Default::default()
        };
        assert!(tc.is_truncated());
        assert!(!tc.is_error());
        assert_eq!(tc.visible_duration_ms(), None);
        assert!(tc.status.is_in_flight());
    }

    #[test]
    fn unknown_tool_status_is_not_in_flight() {
        let status: ToolCallStatus = serde_json::from_value(json!("queued_remote")).unwrap();
        assert_eq!(status, ToolCallStatus::Unknown);
        assert!(!status.is_in_flight());
    }

    #[test]
    fn turn_progress_requires_positive_max() {
        let mut turn = AssistantTurn {
            turn_number: Some(2),
            max_turns: Some(10),
            ..Default::default()
        };
        assert_eq!(turn.progress(), Some((3, 10)));
        turn.max_turns = Some(0);
        assert_eq!(turn.progress(), None);
    }

    #[test]
    fn tool_kind_from_name() {
        assert_eq!(ToolKind::from_name("Bash"), ToolKind::Shell);
        assert_eq!(ToolKind::from_name("read_file"), ToolKind::Read);
        assert_eq!(ToolKind::from_name("str_replace_editor"), ToolKind::Edit);
        assert_eq!(ToolKind::from_name("grep"), ToolKind::Search);
        assert_eq!(ToolKind::from_name("web_fetch"), ToolKind::Web);
        assert_eq!(ToolKind::from_name("spawn_subagent"), ToolKind::Spawn);
        assert_eq!(ToolKind::from_name("frobnozzle"), ToolKind::Other);
    }

    #[test]
    fn format_args_pretty_prints_objects_and_json_strings() {
        assert_eq!(format_tool_args(&json!({"a": 1})), "{\n  \"a\": 1\n}");
        assert_eq!(format_tool_args(&json!("{\"a\":1}")), "{\n  \"a\": 1\n}");
        assert_eq!(format_tool_args(&json!("ls -la")), "ls -la");
        assert_eq!(format_tool_args(&Value::Null), "");
    }
}
