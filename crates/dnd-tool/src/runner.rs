use std::path::Path;

use dnd_api::{evaluate, EvaluateOptions};
use log::debug;

use crate::source::{read_exercise_from_dir, read_test_case};
use crate::{DndToolError, ExpectedVerdict, TestCase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub name: String,
    pub verdict: ExpectedVerdict,
    pub one_per_target_conflicts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcomes: Vec<SubmissionOutcome>,
}

pub fn run_case(demo_dir: &Path, case: &TestCase) -> Result<RunReport, DndToolError> {
    if case.submissions.is_empty() {
        return Err(DndToolError::CaseEmpty {
            path: demo_dir.to_path_buf(),
        });
    }

    let exercise_xml = read_exercise_from_dir(demo_dir)?;
    let rules_json = case
        .rules
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(DndToolError::CaseSerialize)?;

    let mut outcomes = Vec::with_capacity(case.submissions.len());
    for submission in &case.submissions {
        let submission_json =
            serde_json::to_string(&submission.submission).map_err(DndToolError::CaseSerialize)?;
        let verdict = evaluate(EvaluateOptions {
            submission_json,
            exercise_xml: Some(exercise_xml.clone()),
            rules_json: rules_json.clone(),
            constraints: case.constraints.clone(),
            order: case.order,
        })
        .map_err(|source| DndToolError::Grading {
            name: submission.name.clone(),
            source,
        })?;
        debug!("{}: {:?}", submission.name, verdict);
        outcomes.push(SubmissionOutcome {
            name: submission.name.clone(),
            verdict: ExpectedVerdict::from_correct(verdict.correct),
            one_per_target_conflicts: verdict.one_per_target_conflicts,
        });
    }

    Ok(RunReport { outcomes })
}

pub fn assert_case(demo_dir: &Path, case_path: &Path) -> Result<RunReport, DndToolError> {
    let case = read_test_case(case_path)?;
    let report = run_case(demo_dir, &case)?;

    for (expected, actual) in case.submissions.iter().zip(report.outcomes.iter()) {
        if expected.expect != actual.verdict {
            return Err(DndToolError::VerdictMismatch {
                name: expected.name.clone(),
                expected: expected.expect.label().to_string(),
                actual: actual.verdict.label().to_string(),
            });
        }
    }

    Ok(report)
}

#[cfg(test)]
mod runner_tests {
    use super::*;

    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use serde_json::json;

    use crate::{SubmissionCase, TESTCASE_SCHEMA_V1};

    const EXERCISE_XML: &str = r#"<drag_and_drop_input one_per_target="true">
  <draggable id="d_1" label="one"/>
  <draggable id="d_2" label="two"/>
  <target id="t_1" x="40" y="1" w="32" h="32"/>
  <target id="t_2" x="80" y="2" w="32" h="32"/>
</drag_and_drop_input>"#;

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should move forward")
            .as_nanos();
        std::env::temp_dir().join(format!("dnd-tool-runner-{}-{}", name, nanos))
    }

    fn write_file(path: &Path, content: &str) {
        let parent = path.parent().expect("path should have parent");
        fs::create_dir_all(parent).expect("parent dir should be created");
        fs::write(path, content).expect("file should be written");
    }

    fn demo(name: &str) -> PathBuf {
        let root = temp_dir(name);
        write_file(&root.join("exercise.xml"), EXERCISE_XML);
        root
    }

    fn submission(name: &str, value: serde_json::Value, expect: ExpectedVerdict) -> SubmissionCase {
        SubmissionCase {
            name: name.to_string(),
            submission: value,
            expect,
        }
    }

    fn exact_case(submissions: Vec<SubmissionCase>) -> TestCase {
        TestCase {
            schema_version: TESTCASE_SCHEMA_V1.to_string(),
            order: Default::default(),
            rules: Some(json!([
                {"draggables": ["d_1"], "targets": ["t_1"], "rule": "exact"}
            ])),
            constraints: Vec::new(),
            submissions,
        }
    }

    #[test]
    fn run_case_grades_every_submission() {
        let root = demo("grades");
        let case = exact_case(vec![
            submission("right", json!([{"d_1": "t_1"}]), ExpectedVerdict::Correct),
            submission("wrong", json!([{"d_1": "t_2"}]), ExpectedVerdict::Incorrect),
            submission(
                "crowded",
                json!([{"d_1": "t_1"}, {"d_2": "t_1"}]),
                ExpectedVerdict::Incorrect,
            ),
        ]);
        let report = run_case(&root, &case).expect("run should pass");
        let verdicts: Vec<ExpectedVerdict> =
            report.outcomes.iter().map(|outcome| outcome.verdict).collect();
        assert_eq!(
            verdicts,
            vec![
                ExpectedVerdict::Correct,
                ExpectedVerdict::Incorrect,
                ExpectedVerdict::Incorrect
            ]
        );
        assert_eq!(report.outcomes[2].one_per_target_conflicts, vec!["t_1".to_string()]);
    }

    #[test]
    fn run_case_reports_empty_cases_and_grading_errors() {
        let root = demo("errors");
        let error = run_case(&root, &exact_case(Vec::new())).expect_err("empty case");
        assert!(matches!(error, DndToolError::CaseEmpty { .. }));

        let bad = exact_case(vec![submission(
            "not-a-list",
            json!({"d_1": "t_1"}),
            ExpectedVerdict::Correct,
        )]);
        let error = run_case(&root, &bad).expect_err("bad submission");
        assert!(matches!(error, DndToolError::Grading { .. }));
    }

    #[test]
    fn assert_case_reports_verdict_mismatch() {
        let root = demo("mismatch");
        write_file(
            &root.join("testcase.json"),
            r#"{
  "schemaVersion": "dnd-tool-case.v1",
  "rules": [{"draggables": ["d_1"], "targets": ["t_1"], "rule": "exact"}],
  "submissions": [
    {"name": "claims-correct", "submission": [{"d_1": "t_2"}], "expect": "correct"}
  ]
}"#,
        );
        let error = assert_case(&root, &root.join("testcase.json")).expect_err("mismatch");
        assert!(matches!(error, DndToolError::VerdictMismatch { .. }));
    }

    #[test]
    fn assert_case_passes_with_matching_verdicts() {
        let root = demo("pass");
        write_file(
            &root.join("testcase.json"),
            r#"{
  "schemaVersion": "dnd-tool-case.v1",
  "constraints": ["draggables['d_2'].count == 1 and draggables['d_2'][0].x == 80"],
  "submissions": [
    {"name": "on-t2", "submission": [{"d_2": "t_2"}], "expect": "correct"},
    {"name": "on-t1", "submission": [{"d_2": "t_1"}], "expect": "incorrect"}
  ]
}"#,
        );
        let report = assert_case(&root, &root.join("testcase.json")).expect("assert should pass");
        assert_eq!(report.outcomes.len(), 2);
    }
}
