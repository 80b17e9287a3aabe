use dnd_core::{DndError, ExerciseDefinition, Submission};
use dnd_grader::{grade_rules, parse_rules_json, IndexOptions, PlacedIndex, Rule};
use dnd_parser::parse_exercise;
use log::debug;
use serde::Serialize;

pub use dnd_grader::PlacementOrder;

#[derive(Debug, Clone, Default)]
pub struct EvaluateOptions {
    pub submission_json: String,
    pub exercise_xml: Option<String>,
    pub rules_json: Option<String>,
    pub constraints: Vec<String>,
    pub order: PlacementOrder,
}

/// Outcome of [`evaluate`]. `None` marks a check that was not requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub correct: bool,
    pub rules: Option<bool>,
    pub constraints: Option<bool>,
    pub one_per_target_conflicts: Vec<String>,
}

pub fn get_all_draggables(
    submission_json: &str,
    exercise_xml: &str,
) -> Result<PlacedIndex, DndError> {
    get_all_draggables_with(submission_json, exercise_xml, IndexOptions::default())
}

pub fn get_all_draggables_with(
    submission_json: &str,
    exercise_xml: &str,
    options: IndexOptions,
) -> Result<PlacedIndex, DndError> {
    let exercise = parse_exercise(exercise_xml)?;
    let submission = Submission::from_json_str(submission_json)?;
    Ok(PlacedIndex::build(&exercise, &submission, options))
}

pub fn grade(submission_json: &str, rules_json: &str) -> Result<bool, DndError> {
    let rules = parse_rules_json(rules_json)?;
    grade_with_rules(submission_json, &rules)
}

pub fn grade_with_rules(submission_json: &str, rules: &[Rule]) -> Result<bool, DndError> {
    let submission = Submission::from_json_str(submission_json)?;
    grade_rules(&submission, rules)
}

pub fn check_constraints(
    submission_json: &str,
    exercise_xml: &str,
    constraints: &[&str],
) -> Result<bool, DndError> {
    let index = get_all_draggables(submission_json, exercise_xml)?;
    dnd_grader::check_constraints(&index, constraints)
}

/// Runs every requested check and reports the combined verdict. Rules,
/// constraints and the exercise's `one_per_target` flag must all hold.
pub fn evaluate(options: EvaluateOptions) -> Result<Verdict, DndError> {
    if options.rules_json.is_none() && options.constraints.is_empty() {
        return Err(DndError::new(
            "API_NO_CHECKS",
            "Expected an answer rule list, constraints, or both.",
        ));
    }
    if !options.constraints.is_empty() && options.exercise_xml.is_none() {
        return Err(DndError::new(
            "API_EXERCISE_REQUIRED",
            "Constraints need the exercise definition to resolve positions.",
        ));
    }

    let submission = Submission::from_json_str(&options.submission_json)?;
    let exercise = options
        .exercise_xml
        .as_deref()
        .map(parse_exercise)
        .transpose()?;

    let rules = match options.rules_json.as_deref() {
        Some(raw) => Some(grade_rules(&submission, &parse_rules_json(raw)?)?),
        None => None,
    };

    let index = exercise.as_ref().map(|exercise| {
        PlacedIndex::build(
            exercise,
            &submission,
            IndexOptions {
                order: options.order,
            },
        )
    });

    let constraints = match &index {
        Some(index) if !options.constraints.is_empty() => {
            let sources: Vec<&str> = options.constraints.iter().map(String::as_str).collect();
            Some(dnd_grader::check_constraints(index, &sources)?)
        }
        _ => None,
    };

    let one_per_target_conflicts = match (&exercise, &index) {
        (Some(ExerciseDefinition { one_per_target: true, .. }), Some(index)) => {
            index.one_per_target_conflicts()
        }
        _ => Vec::new(),
    };

    let correct = rules.unwrap_or(true)
        && constraints.unwrap_or(true)
        && one_per_target_conflicts.is_empty();
    debug!(
        "verdict: correct={} rules={:?} constraints={:?} conflicts={}",
        correct,
        rules,
        constraints,
        one_per_target_conflicts.len()
    );

    Ok(Verdict {
        correct,
        rules,
        constraints,
        one_per_target_conflicts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnd_grader::PlacedInstance;

    const GRID_XML: &str = r#"
<customresponse>
  <text>
    <h4>Babies and Sun</h4><br/>
    <h4>Drag two babies and one sun. All babies must be under the sun.</h4>
  </text>
  <drag_and_drop_input img="/static/images/grid_test/610x610_blank.png" target_outline="true">
    <draggable id="baby" icon="/static/images/grid_test/baby.png" can_reuse="true"/>
    <draggable id="sun" icon="/static/images/grid_test/sun.png" can_reuse="true"/>
    <target id="base_target" type="grid" x="5" y="5" w="600" h="600" col="30" row="30"/>
  </drag_and_drop_input>
</customresponse>
"#;

    const HOUSE_XML: &str = r#"
<customresponse>
  <drag_and_drop_input img="/static/images/grid_test/610x610_blank.png" target_outline="true">
    <draggable id="house" icon="/static/images/grid_test/house.png" can_reuse="true">
      <target id="1" x="0" y="0" w="32" h="32"/>
      <target id="2" x="34" y="0" w="32" h="32"/>
      <target id="3" x="68" y="0" w="32" h="32"/>
    </draggable>
    <draggable id="baby" icon="/static/images/grid_test/baby.png" can_reuse="true"/>
    <draggable id="sun" icon="/static/images/grid_test/sun.png" can_reuse="true"/>
    <target id="base_target" type="grid" x="5" y="5" w="600" h="600" col="30" row="30"/>
  </drag_and_drop_input>
</customresponse>
"#;

    const FACTORY_XML: &str = r#"
<customresponse>
  <drag_and_drop_input one_per_target="True" img="/static/image.jpg">
    <draggable id="d_0" label="label_0"/>
    <draggable id="d_1" label="label_1"/>
    <draggable id="d_2" label="label_2"/>
    <target id="t_0" x="0" y="0" w="32" h="32"/>
    <target id="t_1" x="40" y="1" w="32" h="32"/>
    <target id="t_2" x="80" y="2" w="32" h="32"/>
    <target id="t_3" x="120" y="3" w="32" h="32"/>
    <target id="t_4" x="160" y="4" w="32" h="32"/>
    <target id="t_5" x="200" y="5" w="32" h="32"/>
  </drag_and_drop_input>
</customresponse>
"#;

    const GRID_CONSTRAINTS: &str = r#"[
    dragabbles['sun'].count == 1,
    dragabbles['baby'].count == 2,
    dragabbles['sun'].on('base_target')[0].y <
        dragabbles['baby'].on('base_target')[0].y,
    dragabbles['sun'].on('base_target')[0].y <
        dragabbles['baby'].on('base_target')[1].y
]"#;

    const GRID_RULES: &str =
        r#"[{"draggables": ["sun", "baby"], "targets": ["base_target"], "rule": "anyof"}]"#;

    const NESTED_CONSTRAINTS: &str = r#"[
    dragabbles['house'].count == 1,
    dragabbles['sun'].count == 2 or dragabbles['baby'].count == 2
]"#;

    const NESTED_RULES: &str = r#"[
  {"draggables": ["house"], "targets": ["base_target"], "rule": "exact"},
  {"draggables": ["sun", "baby"],
   "targets": ["base_target[house][1]", "base_target[house][2]", "base_target[house][3]"],
   "rule": "anyof"}
]"#;

    fn point(instance: Option<&PlacedInstance>) -> (f64, f64) {
        let position = instance
            .and_then(|instance| instance.position)
            .expect("instance should be resolved");
        (position.x, position.y)
    }

    #[test]
    fn grid_answer_passes_constraints_and_rules_in_any_order() {
        for submission in [
            r#"[{"sun": "base_target{2}{2}"}, {"baby": "base_target{5}{10}"}, {"baby": "base_target{20}{20}"}]"#,
            r#"[{"sun": "base_target{2}{2}"}, {"baby": "base_target{20}{20}"}, {"baby": "base_target{5}{10}"}]"#,
        ] {
            assert!(check_constraints(submission, GRID_XML, &[GRID_CONSTRAINTS]).expect("check"));
            assert!(grade(submission, GRID_RULES).expect("grade"));

            let index = get_all_draggables(submission, GRID_XML).expect("index");
            let sun = index.get("sun").expect("sun").on("base_target");
            let baby = index.get("baby").expect("baby").on("base_target");
            assert_eq!(point(sun.get(0)), (55.0, 55.0));
            assert_eq!(point(baby.get(0)), (115.0, 215.0));
            assert_eq!(point(baby.get(1)), (415.0, 415.0));
        }
    }

    #[test]
    fn grid_answer_fails_when_a_constraint_breaks() {
        let passing = r#"[{"sun": "base_target{2}{2}"}, {"baby": "base_target{5}{10}"}, {"baby": "base_target{20}{20}"}]"#;
        assert!(check_constraints(passing, GRID_XML, &[GRID_CONSTRAINTS]).expect("check"));

        for failing in [
            r#"[{"sun": "base_target{2}{2}"}, {"baby": "base_target{20}{20}"}]"#,
            r#"[{"baby": "base_target{5}{10}"}, {"baby": "base_target{20}{20}"}]"#,
            r#"[{"sun": "base_target{2}{2}"}, {"sun": "base_target{2}{5}"}, {"baby": "base_target{5}{10}"}, {"baby": "base_target{20}{20}"}]"#,
            r#"[{"sun": "base_target{2}{11}"}, {"baby": "base_target{5}{10}"}, {"baby": "base_target{20}{20}"}]"#,
        ] {
            assert!(
                !check_constraints(failing, GRID_XML, &[GRID_CONSTRAINTS]).expect("check"),
                "{}",
                failing
            );
        }
    }

    #[test]
    fn uneven_grid_division_keeps_fractional_centres() {
        let xml = r#"
<customresponse>
  <drag_and_drop_input img="/static/images/grid_test/610x610_blank.png" target_outline="true">
    <draggable id="baby" icon="/static/images/grid_test/baby.png" can_reuse="true"/>
    <target id="base_target" type="grid" x="5" y="5" w="100" h="100" col="8" row="8"/>
  </drag_and_drop_input>
</customresponse>
"#;
        let submission = r#"[
  {"baby": "base_target{5}{8}"},
  {"baby": "base_target{6}{10}"},
  {"baby": "base_target{0}{0}"},
  {"baby": "base_target{1}{1}"}
]"#;
        let index = get_all_draggables(submission, xml).expect("index");
        let baby = index.get("baby").expect("baby");
        let xs: Vec<f64> = (0..4)
            .map(|i| baby.get(i).and_then(PlacedInstance::x).expect("x"))
            .collect();
        assert_eq!(xs, vec![11.25, 23.75, 73.75, 86.25]);
    }

    #[test]
    fn nested_draggables_grade_through_rules_and_constraints() {
        let full = r#"[
  {"house": "base_target{5}{10}"},
  {"baby": {"1": {"house": "base_target"}}},
  {"baby": {"2": {"house": "base_target"}}},
  {"sun": {"3": {"house": "base_target"}}}
]"#;
        assert!(check_constraints(full, HOUSE_XML, &[NESTED_CONSTRAINTS]).expect("check"));
        assert!(grade(full, NESTED_RULES).expect("grade"));

        for failing in [
            r#"[{"house": "base_target{5}{10}"}, {"baby": {"1": {"house": "base_target"}}}]"#,
            r#"[{"house": "base_target{5}{10}"}, {"sun": {"1": {"house": "base_target"}}}, {"baby": {"3": {"house": "base_target"}}}]"#,
        ] {
            assert!(!check_constraints(failing, HOUSE_XML, &[NESTED_CONSTRAINTS]).expect("check"));
        }
    }

    #[test]
    fn draggables_read_top_to_bottom_then_left_to_right() {
        let submission = r#"[
  {"house": "base_target{5}{10}"},
  {"house": "base_target{6}{10}"},
  {"house": "base_target{2}{10}"},
  {"house": "base_target{1}{5}"},
  {"house": "base_target{27}{1}"},
  {"house": "base_target{4}{1}"},
  {"house": "base_target{10}{10}"},
  {"sun": {"1": {"house": "base_target"}}},
  {"sun": {"2": {"house": "base_target"}}},
  {"baby": {"3": {"house": "base_target"}}}
]"#;
        let index = get_all_draggables(submission, HOUSE_XML).expect("index");
        let house = index.get("house").expect("house");
        assert_eq!(house.count(), 7);
        let expected = [
            (95.0, 35.0),
            (555.0, 35.0),
            (35.0, 115.0),
            (55.0, 215.0),
            (115.0, 215.0),
            (135.0, 215.0),
            (215.0, 215.0),
        ];
        for (i, coords) in expected.iter().enumerate() {
            assert_eq!(point(house.get(i)), *coords, "house[{}]", i);
        }

        let ordered = get_all_draggables_with(
            submission,
            HOUSE_XML,
            IndexOptions {
                order: PlacementOrder::Submission,
            },
        )
        .expect("index");
        let house = ordered.get("house").expect("house");
        assert_eq!(house.count(), 7);
        assert_eq!(point(house.get(0)), (115.0, 215.0));
    }

    #[test]
    fn bad_draggables_make_constraints_false_without_errors() {
        let submission = r#"[
  {"house": "base_target{5}{10}"},
  {"baby": {"1": {"house": "base_target"}}},
  {"baby": {"2": {"house": "base_target"}}}
]"#;
        assert!(!check_constraints(submission, HOUSE_XML, &["[dragabbles['BAD_sun'].count == 2]"])
            .expect("check"));
        assert!(!check_constraints(
            submission,
            HOUSE_XML,
            &["[dragabbles['house'].on('BAD_base_target')[0].contains('BAD_sun', 'BAD_sun')]"]
        )
        .expect("check"));
    }

    #[test]
    fn factory_exercise_grades_anyof_by_target_id() {
        let rules =
            r#"[{"draggables": ["d_1", "d_2"], "targets": ["t_2", "t_3", "t_4"], "rule": "anyof"}]"#;
        assert!(grade(r#"[{"d_1": "t_2"}, {"d_2": "t_5"}]"#, rules).expect("grade"));
        assert!(!grade(r#"[{"d_1": "t_0"}, {"d_2": "t_5"}]"#, rules).expect("grade"));

        let index = get_all_draggables(r#"[{"d_1": "t_3"}]"#, FACTORY_XML).expect("index");
        let d_1 = index.get("d_1").expect("d_1");
        assert_eq!(point(d_1.get(0)), (120.0, 3.0));
    }

    #[test]
    fn evaluate_combines_rules_constraints_and_one_per_target() {
        let rules =
            r#"[{"draggables": ["d_1", "d_2"], "targets": ["t_2", "t_3", "t_4"], "rule": "anyof"}]"#;
        let verdict = evaluate(EvaluateOptions {
            submission_json: r#"[{"d_1": "t_2"}, {"d_2": "t_4"}]"#.to_string(),
            exercise_xml: Some(FACTORY_XML.to_string()),
            rules_json: Some(rules.to_string()),
            constraints: vec!["draggables['d_1'].count == 1".to_string()],
            order: PlacementOrder::Reading,
        })
        .expect("evaluate");
        assert_eq!(
            verdict,
            Verdict {
                correct: true,
                rules: Some(true),
                constraints: Some(true),
                one_per_target_conflicts: Vec::new(),
            }
        );

        let crowded = evaluate(EvaluateOptions {
            submission_json: r#"[{"d_1": "t_2"}, {"d_2": "t_2"}]"#.to_string(),
            exercise_xml: Some(FACTORY_XML.to_string()),
            rules_json: Some(rules.to_string()),
            ..EvaluateOptions::default()
        })
        .expect("evaluate");
        assert!(!crowded.correct);
        assert_eq!(crowded.rules, Some(true));
        assert_eq!(crowded.constraints, None);
        assert_eq!(crowded.one_per_target_conflicts, vec!["t_2".to_string()]);
    }

    #[test]
    fn evaluate_reports_missing_inputs_and_bad_submissions() {
        let error = evaluate(EvaluateOptions {
            submission_json: "[]".to_string(),
            ..EvaluateOptions::default()
        })
        .expect_err("nothing to check");
        assert_eq!(error.code, "API_NO_CHECKS");

        let error = evaluate(EvaluateOptions {
            submission_json: "[]".to_string(),
            constraints: vec!["true".to_string()],
            ..EvaluateOptions::default()
        })
        .expect_err("exercise missing");
        assert_eq!(error.code, "API_EXERCISE_REQUIRED");

        let error = grade(r#"{"d_1": "t_2"}"#, "[]").expect_err("bad submission");
        assert!(error.is_submission_error());
    }
}
