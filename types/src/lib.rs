use std::{fmt, str::FromStr};

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{value::RawValue, Value};

/// Status value the server uses to mark a successful response.
pub const STATUS_SUCCESS: &str = "success";

/// Status value used for client-side and transport failures.
pub const STATUS_ERROR: &str = "error";

/// Identifier of a task or question.
///
/// The server is free to send either a JSON number or a JSON string. The
/// variant that was received is kept so it can be echoed back unchanged.
/// Anything else (a float, `null`) is carried as-is in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(i64),
    Text(String),
    Other(Value),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Number(n) => write!(f, "{}", n),
            Id::Text(s) => f.write_str(s),
            Id::Other(value) => write!(f, "{}", value),
        }
    }
}

impl FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.parse::<i64>() {
            Ok(n) if s.bytes().all(|b| b.is_ascii_digit()) => Ok(Id::Number(n)),
            _ => Ok(Id::Text(s.to_string())),
        }
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id::Number(value)
    }
}

/// Which tasks a `gettasks` request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSelector {
    /// Every task of the team, sent as `"all"`.
    All,
    /// A single task's full detail.
    Task(Id),
}

const SELECT_ALL: &str = "all";

impl Serialize for TaskSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TaskSelector::All => serializer.serialize_str(SELECT_ALL),
            TaskSelector::Task(id) => id.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TaskSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Id::deserialize(deserializer)? {
            Id::Text(s) if s == SELECT_ALL => Ok(TaskSelector::All),
            id => Ok(TaskSelector::Task(id)),
        }
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Open,
    Completed,
    Locked,
    /// Any state this client does not know about, including a missing,
    /// `null` or non-string one.
    #[default]
    #[serde(other)]
    Unknown,
}

impl TaskState {
    fn from_value(value: Value) -> Self {
        match value {
            Value::String(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => TaskState::Unknown,
        }
    }
}

fn lenient_state<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TaskState, D::Error> {
    Value::deserialize(deserializer).map(TaskState::from_value)
}

fn lenient_optional_state<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<TaskState>, D::Error> {
    lenient_state(deserializer).map(Some)
}

/// Point value of a task, kept as whatever JSON the server sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Points(pub Value);

impl From<i64> for Points {
    fn from(value: i64) -> Self {
        Points(value.into())
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            Value::Null => f.write_str("-"),
            value => write!(f, "{}", value),
        }
    }
}

/// A task as it appears in the task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    #[serde(rename = "ID")]
    pub id: Id,

    #[serde(default)]
    pub points: Points,

    #[serde(default, deserialize_with = "lenient_state")]
    pub state: TaskState,
}

/// Payload of a successful `gettasks` request for `"all"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskList {
    pub task_list: Vec<TaskSummary>,
}

/// Full detail of a single task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDetail {
    #[serde(rename = "ID")]
    pub id: Id,

    #[serde(default)]
    pub points: Points,

    #[serde(
        default,
        deserialize_with = "lenient_optional_state",
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<TaskState>,

    #[serde(default)]
    pub questions: Vec<Question>,

    /// Integrity hash, when the server embeds it in the task itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "ID")]
    pub id: Id,
    pub params: QuestionParams,
}

/// Parameters of a question. `kind` selects an arithmetic operation; map
/// questions carry `map` instead. Operands are kept as raw JSON so an odd
/// value only makes that one question unanswerable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionParams {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number1: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number2: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<Value>,
}

/// One answered question. `answer` is `null` when no answer could be computed,
/// a number for arithmetic questions and a pair of city names for map ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub id: Id,
    pub answer: Value,
}

/// Body of a `gettasks` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskQuery {
    pub id: TaskSelector,
    pub teamcode: String,
}

/// Body of an `answer` request.
///
/// `original_data` and `original_hash` echo what the detail fetch returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub id: Id,
    pub teamcode: String,
    pub original_data: Box<RawValue>,
    pub original_hash: Option<String>,
    pub answer_data: Vec<AnswerEntry>,
}

/// The `{status, data?, message?, hash?}` shape wrapping every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub status: String,

    /// Raw payload, kept verbatim so it can be echoed back byte for byte.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<RawValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Envelope {
    pub fn success(data: Option<Box<RawValue>>) -> Self {
        Envelope {
            status: STATUS_SUCCESS.to_string(),
            data,
            message: None,
            hash: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Envelope {
            status: STATUS_ERROR.to_string(),
            data: None,
            message: Some(message.into()),
            hash: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// The server message if one was sent, the fallback otherwise.
    pub fn message_or(&self, fallback: &str) -> String {
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Decode the payload into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let raw = self.data.as_deref().map(RawValue::get).unwrap_or("null");
        serde_json::from_str(raw)
    }
}
