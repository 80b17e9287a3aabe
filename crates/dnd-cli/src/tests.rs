use super::*;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const EXERCISE_XML: &str = r#"<customresponse>
  <drag_and_drop_input img="/static/images/grid_test/610x610_blank.png" one_per_target="true">
    <draggable id="baby" can_reuse="true"/>
    <draggable id="sun" can_reuse="true"/>
    <target id="base_target" type="grid" x="5" y="5" w="600" h="600" col="30" row="30"/>
  </drag_and_drop_input>
</customresponse>"#;

const SUBMISSION: &str = r#"[{"sun": "base_target{2}{2}"}, {"baby": "base_target{5}{10}"}]"#;

fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be monotonic")
        .as_nanos();
    std::env::temp_dir().join(format!("dnd-cli-{}-{}", name, nanos))
}

fn write_file(path: &Path, content: &str) -> String {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent should be created");
    }
    fs::write(path, content).expect("file should be written");
    path.to_string_lossy().to_string()
}

fn fixture_files(name: &str) -> (String, String) {
    let root = temp_path(name);
    let exercise = write_file(&root.join("exercise.xml"), EXERCISE_XML);
    let submission = write_file(&root.join("submission.json"), SUBMISSION);
    (exercise, submission)
}

#[test]
fn resolve_source_path_validates_existence_and_kind() {
    let missing = temp_path("missing");
    let error = resolve_source_path(missing.to_string_lossy().as_ref())
        .expect_err("missing file should fail");
    assert_eq!(error.code, "CLI_SOURCE_NOT_FOUND");

    let dir = temp_path("dir");
    fs::create_dir_all(&dir).expect("dir");
    let error =
        resolve_source_path(dir.to_string_lossy().as_ref()).expect_err("directory should fail");
    assert_eq!(error.code, "CLI_SOURCE_NOT_FILE");

    let file = temp_path("file.json");
    write_file(&file, "[]");
    assert_eq!(
        read_source_file(file.to_string_lossy().as_ref()).expect("read should pass"),
        "[]"
    );
}

#[test]
fn grade_command_emits_verdict() {
    let root = temp_path("grade");
    let submission = write_file(&root.join("submission.json"), SUBMISSION);
    let rules = write_file(
        &root.join("rules.json"),
        r#"[{"draggables": ["sun", "baby"], "targets": ["base_target"], "rule": "anyof"}]"#,
    );
    let code = run_cli_from_args([
        "dnd-cli",
        "grade",
        "--submission",
        &submission,
        "--rules",
        &rules,
    ]);
    assert_eq!(code, 0);

    let code = run(Cli {
        command: Mode::Grade(GradeArgs {
            submission,
            rules: root.join("missing.json").to_string_lossy().to_string(),
        }),
    });
    assert_eq!(code.expect_err("missing rules").code, "CLI_SOURCE_NOT_FOUND");
}

#[test]
fn check_command_reads_every_constraint_file() {
    let (exercise, submission) = fixture_files("check");
    let root = temp_path("check-constraints");
    let first = write_file(&root.join("count.txt"), "draggables['sun'].count == 1");
    let second = write_file(
        &root.join("order.txt"),
        "draggables['sun'][0].y < draggables['baby'][0].y",
    );

    let code = run(Cli {
        command: Mode::Check(CheckArgs {
            exercise,
            submission,
            constraints: vec![first, second],
            order: OrderArg::Submission,
        }),
    })
    .expect("check should run");
    assert_eq!(code, 0);
}

#[test]
fn check_command_surfaces_constraint_authoring_errors() {
    let (exercise, submission) = fixture_files("check-error");
    let constraint = write_file(
        &temp_path("check-error-constraint").join("bad.txt"),
        "draggables['sun'].colour == 'red'",
    );
    let error = run(Cli {
        command: Mode::Check(CheckArgs {
            exercise,
            submission,
            constraints: vec![constraint],
            order: OrderArg::Reading,
        }),
    })
    .expect_err("unknown property should fail");
    assert_eq!(error.code, "EXPR_UNKNOWN_PROPERTY");
}

#[test]
fn evaluate_command_runs_without_exercise_when_only_rules_are_given() {
    let root = temp_path("evaluate");
    let submission = write_file(&root.join("submission.json"), SUBMISSION);
    let rules = write_file(
        &root.join("rules.json"),
        r#"[{"draggables": ["sun"], "targets": ["base_target"], "rule": "exact"}]"#,
    );
    let code = run(Cli {
        command: Mode::Evaluate(EvaluateArgs {
            exercise: None,
            submission,
            rules: Some(rules),
            constraints: Vec::new(),
            order: OrderArg::Reading,
        }),
    })
    .expect("evaluate should run");
    assert_eq!(code, 0);
}

#[test]
fn inspect_command_reports_bad_exercise_xml() {
    let root = temp_path("inspect");
    let exercise = write_file(&root.join("exercise.xml"), "<drag_and_drop_input>");
    let submission = write_file(&root.join("submission.json"), SUBMISSION);
    let error = run(Cli {
        command: Mode::Inspect(InspectArgs {
            exercise,
            submission,
            order: OrderArg::Reading,
        }),
    })
    .expect_err("bad xml should fail");
    assert_eq!(error.code, "XML_PARSE_ERROR");

    let (exercise, submission) = fixture_files("inspect-ok");
    let code = run(Cli {
        command: Mode::Inspect(InspectArgs {
            exercise,
            submission,
            order: OrderArg::Reading,
        }),
    })
    .expect("inspect should run");
    assert_eq!(code, 0);
}

#[test]
fn labels_cover_every_outcome() {
    assert_eq!(verdict_label(true), "correct");
    assert_eq!(verdict_label(false), "incorrect");
    assert_eq!(check_label(Some(true)), "PASS");
    assert_eq!(check_label(Some(false)), "FAIL");
    assert_eq!(check_label(None), "NONE");
}

#[test]
fn invalid_arguments_return_clap_exit_code() {
    assert_eq!(run_cli_from_args(["dnd-cli", "grade"]), 2);
    assert_eq!(run_cli_from_args(["dnd-cli", "--help"]), 0);
    assert_eq!(run_cli_from_args(["dnd-cli", "evaluate", "--order", "diagonal"]), 2);
}
