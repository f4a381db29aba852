use serde::{Deserialize, Deserializer, Serialize};

/// A story as returned by `GET /api/v3/stories/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub app_url: String,
    pub workflow_state_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub states: Vec<WorkflowState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(rename = "type")]
    pub kind: WorkflowStateType,
}

/// Coarse status category of a workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkflowStateType {
    Unstarted,
    Started,
    Done,
    Other(String),
}

impl WorkflowStateType {
    pub fn as_str(&self) -> &str {
        match self {
            WorkflowStateType::Unstarted => "unstarted",
            WorkflowStateType::Started => "started",
            WorkflowStateType::Done => "done",
            WorkflowStateType::Other(value) => value,
        }
    }
}

impl From<String> for WorkflowStateType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "unstarted" => WorkflowStateType::Unstarted,
            "started" => WorkflowStateType::Started,
            "done" => WorkflowStateType::Done,
            _ => WorkflowStateType::Other(value),
        }
    }
}

impl From<WorkflowStateType> for String {
    fn from(value: WorkflowStateType) -> Self {
        value.as_str().to_string()
    }
}

/// What a rendered slot currently knows about a ticket.
#[derive(Debug, Clone, PartialEq)]
pub enum TicketView {
    Loading { key: String },
    Ready(Ticket),
    Failed { key: String, message: String },
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(id) => id.to_string(),
        RawId::Text(id) => id,
    })
}
