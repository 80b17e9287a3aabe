use dnd_grader::PlacementOrder;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub const TESTCASE_SCHEMA_V1: &str = "dnd-tool-case.v1";

/// Checks shared by every submission of a demo, plus the submissions and
/// their expected verdicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub schema_version: String,
    #[serde(default)]
    pub order: PlacementOrder,
    #[serde(default)]
    pub rules: Option<JsonValue>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub submissions: Vec<SubmissionCase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionCase {
    pub name: String,
    pub submission: JsonValue,
    pub expect: ExpectedVerdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedVerdict {
    Correct,
    Incorrect,
}

impl ExpectedVerdict {
    pub fn from_correct(correct: bool) -> Self {
        if correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
        }
    }
}
