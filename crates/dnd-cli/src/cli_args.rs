use clap::{Args, Parser, Subcommand, ValueEnum};
use dnd_grader::PlacementOrder;

#[derive(Debug, Parser)]
#[command(name = "dnd-cli")]
#[command(about = "Drag-and-drop answer grading CLI")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Grade(GradeArgs),
    Check(CheckArgs),
    Evaluate(EvaluateArgs),
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub(crate) struct GradeArgs {
    #[arg(long = "submission")]
    pub(crate) submission: String,
    #[arg(long = "rules")]
    pub(crate) rules: String,
}

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    #[arg(long = "exercise")]
    pub(crate) exercise: String,
    #[arg(long = "submission")]
    pub(crate) submission: String,
    /// One constraint program per file; repeat to add more.
    #[arg(long = "constraints", required = true)]
    pub(crate) constraints: Vec<String>,
    #[arg(long = "order", value_enum, default_value_t = OrderArg::Reading)]
    pub(crate) order: OrderArg,
}

#[derive(Debug, Args)]
pub(crate) struct EvaluateArgs {
    #[arg(long = "exercise")]
    pub(crate) exercise: Option<String>,
    #[arg(long = "submission")]
    pub(crate) submission: String,
    #[arg(long = "rules")]
    pub(crate) rules: Option<String>,
    #[arg(long = "constraints")]
    pub(crate) constraints: Vec<String>,
    #[arg(long = "order", value_enum, default_value_t = OrderArg::Reading)]
    pub(crate) order: OrderArg,
}

#[derive(Debug, Args)]
pub(crate) struct InspectArgs {
    #[arg(long = "exercise")]
    pub(crate) exercise: String,
    #[arg(long = "submission")]
    pub(crate) submission: String,
    #[arg(long = "order", value_enum, default_value_t = OrderArg::Reading)]
    pub(crate) order: OrderArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OrderArg {
    Reading,
    Submission,
}

impl From<OrderArg> for PlacementOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Reading => PlacementOrder::Reading,
            OrderArg::Submission => PlacementOrder::Submission,
        }
    }
}
