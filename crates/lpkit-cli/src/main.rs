mod error;
mod model_file;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use lpkit_model::Model;
use lpkit_solver::{
    Analyser, CoefficientRange, IntegerSolution, IntegerSolver, ObjectiveSensitivityAnalyser, Solution,
    SolutionStatus, Solver,
};
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use error::CliError;
use model_file::ModelFile;

#[derive(Parser)]
#[command(name = "lpkit")]
#[command(about = "Solve linear and integer programs described in JSON", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a model and print the optimal assignment
    Solve {
        /// The JSON model file
        file: PathBuf,
        /// Restrict every variable to integer values
        #[arg(short, long)]
        integer: bool,
        /// Wall-clock limit for branch and bound, in seconds (`inf` for none)
        #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
        timelimit: Option<f64>,
        /// Show cost coefficient sensitivity ranges
        #[arg(short, long)]
        analysis: bool,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Print the dual of a model
    Dual {
        /// The JSON model file
        file: PathBuf,
    },
    /// Check a model file for errors
    Check {
        /// The JSON model file
        file: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(Serialize)]
struct VariableValue<'a> {
    name: &'a str,
    value: f64,
}

#[derive(Serialize)]
struct SearchReport {
    nodes: usize,
    interrupted: bool,
    seconds: f64,
}

#[derive(Serialize)]
struct Report<'a> {
    model: &'a str,
    status: Option<SolutionStatus>,
    objective_value: Option<f64>,
    assignment: Option<Vec<VariableValue<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch_and_bound: Option<SearchReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sensitivity: Option<Vec<CoefficientRange>>,
}

impl<'a> Report<'a> {
    fn new(model: &'a Model, status: Option<SolutionStatus>, assignment: Option<&[f64]>, objective_value: Option<f64>) -> Self {
        Self {
            model: model.name(),
            status,
            objective_value,
            assignment: assignment.map(|values| {
                model
                    .variables()
                    .iter()
                    .zip(values)
                    .map(|(v, &value)| VariableValue { name: v.name(), value })
                    .collect()
            }),
            branch_and_bound: None,
            sensitivity: None,
        }
    }
}

/// Accepts any non-negative number of seconds, including `inf`.
fn parse_seconds(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if secs.is_nan() || secs < 0.0 {
        return Err(format!("expected a non-negative number of seconds, got {s}"));
    }
    Ok(secs)
}

/// Seconds too large for a `Duration` (such as `inf`) mean no limit.
fn integer_solver(timelimit: Option<f64>) -> IntegerSolver {
    let solver = IntegerSolver::new();
    match timelimit.and_then(|secs| Duration::try_from_secs_f64(secs).ok()) {
        Some(limit) => solver.with_timelimit(limit),
        None => solver,
    }
}

fn init_tracing(verbose: u8) -> Result<(), String> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode, CliError> {
    match command {
        Commands::Solve {
            file,
            integer,
            timelimit,
            analysis,
            format,
        } => {
            let model_file = ModelFile::read(&file)?;
            let model = model_file.to_model()?;

            if integer || model_file.integer {
                let solver = integer_solver(timelimit);
                if analysis {
                    tracing::warn!("sensitivity analysis is only available for linear models");
                }
                let solution = solver.solve(&model)?;
                print_integer_solution(&model, &solution, format)
            } else {
                let solution = Solver::new().solve(&model)?;
                print_solution(&model, &solution, analysis, format)
            }
        }
        Commands::Dual { file } => {
            let model = ModelFile::read(&file)?.to_model()?;
            let dual = model.dual()?;
            print!("{}", dual);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { file } => {
            let model = match ModelFile::read(&file).and_then(|f| f.to_model()) {
                Ok(model) => model,
                Err(e) => {
                    eprintln!("✗ {} has errors:", file.display());
                    eprintln!("  {}", e);
                    return Ok(ExitCode::FAILURE);
                }
            };
            if let Err(e) = model.validate() {
                eprintln!("✗ {} can't be solved:", file.display());
                eprintln!("  {}", e);
                return Ok(ExitCode::FAILURE);
            }

            println!("✓ {} is valid", file.display());
            println!("  {} variables", model.num_variables());
            println!("  {} constraints", model.num_constraints());
            if let Some(objective) = model.objective() {
                println!("  objective: {}", objective.kind());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn status_line(status: SolutionStatus) -> &'static str {
    match status {
        SolutionStatus::Optimal => "OPTIMAL",
        SolutionStatus::Infeasible => "INFEASIBLE",
        SolutionStatus::Unbounded => "UNBOUNDED",
    }
}

fn exit_code(status: Option<SolutionStatus>) -> ExitCode {
    match status {
        Some(SolutionStatus::Optimal) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

fn print_json(report: &Report<'_>) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn print_solution(model: &Model, solution: &Solution, analysis: bool, format: Format) -> Result<ExitCode, CliError> {
    let status = solution.status();

    match format {
        Format::Json => {
            let mut report = Report::new(model, Some(status), solution.assignment(), solution.objective_value());
            if analysis && solution.has_assignment() {
                report.sensitivity = Some(ObjectiveSensitivityAnalyser.coefficient_ranges(solution)?);
            }
            print_json(&report)?;
        }
        Format::Pretty => {
            println!("Model: {}", model.name());
            println!("Status: {}", status_line(status));
            println!();
            println!("{}", solution);

            if analysis && solution.has_assignment() {
                println!();
                let analyser = Analyser::new();
                let results = analyser.analyse(solution)?;
                analyser.interpret_results(solution, &results, &mut |line| println!("{}", line));
            }
        }
    }
    Ok(exit_code(Some(status)))
}

fn print_integer_solution(model: &Model, solution: &IntegerSolution, format: Format) -> Result<ExitCode, CliError> {
    let status = solution.solution().map(Solution::status);

    match format {
        Format::Json => {
            let mut report = Report::new(model, status, solution.assignment(), solution.objective_value());
            report.branch_and_bound = Some(SearchReport {
                nodes: solution.nodes(),
                interrupted: solution.is_interrupted(),
                seconds: solution.total_time().as_secs_f64(),
            });
            print_json(&report)?;
        }
        Format::Pretty => {
            println!("Model: {}", model.name());
            match status {
                Some(status) => println!("Status: {}", status_line(status)),
                None => println!("Status: INTERRUPTED"),
            }
            println!("Nodes: {} ({:.3}s)", solution.nodes(), solution.total_time().as_secs_f64());
            println!();
            println!("{}", solution);
        }
    }
    Ok(exit_code(status))
}
