use std::ffi::OsString;

use clap::Parser;
use dnd_api::{evaluate, get_all_draggables_with, EvaluateOptions, Verdict};
use dnd_core::DndError;
use dnd_grader::IndexOptions;
use log::{debug, warn};

mod cli_args;
mod error_map;
mod source_loader;

pub(crate) use cli_args::{CheckArgs, Cli, EvaluateArgs, GradeArgs, InspectArgs, Mode};
#[cfg(test)]
pub(crate) use cli_args::OrderArg;
pub(crate) use error_map::{
    emit_error, map_cli_output_serialize, map_cli_source_path, map_cli_source_read,
};
pub(crate) use source_loader::{read_source_file, read_source_files};
#[cfg(test)]
pub(crate) use source_loader::resolve_source_path;

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            if let Err(print_error) = error.print() {
                warn!("failed to print argument error: {}", print_error);
            }
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, DndError> {
    match cli.command {
        Mode::Grade(args) => run_grade(args),
        Mode::Check(args) => run_check(args),
        Mode::Evaluate(args) => run_evaluate(args),
        Mode::Inspect(args) => run_inspect(args),
    }
}

fn run_grade(args: GradeArgs) -> Result<i32, DndError> {
    let submission = read_source_file(&args.submission)?;
    let rules = read_source_file(&args.rules)?;
    let correct = dnd_api::grade(&submission, &rules)?;
    emit_verdict(correct);
    Ok(0)
}

fn run_check(args: CheckArgs) -> Result<i32, DndError> {
    let verdict = evaluate(EvaluateOptions {
        submission_json: read_source_file(&args.submission)?,
        exercise_xml: Some(read_source_file(&args.exercise)?),
        rules_json: None,
        constraints: read_source_files(&args.constraints)?,
        order: args.order.into(),
    })?;
    emit_verdict(verdict.constraints.unwrap_or(false));
    Ok(0)
}

fn run_evaluate(args: EvaluateArgs) -> Result<i32, DndError> {
    let exercise_xml = args
        .exercise
        .as_deref()
        .map(read_source_file)
        .transpose()?;
    let rules_json = args.rules.as_deref().map(read_source_file).transpose()?;
    let verdict = evaluate(EvaluateOptions {
        submission_json: read_source_file(&args.submission)?,
        exercise_xml,
        rules_json,
        constraints: read_source_files(&args.constraints)?,
        order: args.order.into(),
    })?;
    emit_evaluation(&verdict);
    Ok(0)
}

fn run_inspect(args: InspectArgs) -> Result<i32, DndError> {
    let exercise = read_source_file(&args.exercise)?;
    let submission = read_source_file(&args.submission)?;
    let index = get_all_draggables_with(
        &submission,
        &exercise,
        IndexOptions {
            order: args.order.into(),
        },
    )?;
    let payload = serde_json::to_string(&index).map_err(map_cli_output_serialize)?;
    println!("RESULT:OK");
    println!("PLACEMENTS_JSON:{}", payload);
    Ok(0)
}

fn verdict_label(correct: bool) -> &'static str {
    if correct {
        "correct"
    } else {
        "incorrect"
    }
}

fn check_label(outcome: Option<bool>) -> &'static str {
    match outcome {
        Some(true) => "PASS",
        Some(false) => "FAIL",
        None => "NONE",
    }
}

fn emit_verdict(correct: bool) {
    debug!("verdict {}", verdict_label(correct));
    println!("RESULT:OK");
    println!("VERDICT:{}", verdict_label(correct));
}

fn emit_evaluation(verdict: &Verdict) {
    emit_verdict(verdict.correct);
    println!("RULES:{}", check_label(verdict.rules));
    println!("CONSTRAINTS:{}", check_label(verdict.constraints));
    for path in &verdict.one_per_target_conflicts {
        println!(
            "CONFLICT_JSON:{}",
            serde_json::to_string(path).unwrap_or_else(|_| "\"\"".to_string())
        );
    }
}

#[cfg(test)]
mod tests;
