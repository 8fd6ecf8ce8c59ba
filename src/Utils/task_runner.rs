//! # Task Runner
//!
//! Turns the sections of a task document (see [`crate::Utils::task_parser`]) into solver
//! calls and renders what came back.
//!
//! ## Section titles
//! - root finding: `bisection`, `false_position`, `fixed_point`, `newton`,
//!   `multiple_roots`, `secant`, `compare_roots`
//! - interpolation: `vandermonde`, `newton_interpolation`, `lagrange`, `linear_spline`,
//!   `cubic_spline`, `compare_interpolation`
//! - linear systems: `jacobi`, `gauss_seidel`, `sor`, `compare_linear`
//! - `settings`: `loglevel`, `log_file`, `save_traces`
//!
//! ## Keys
//! - `fx`, `gx`, `a`, `b`, `x0`, `x1` for root finding, passed on as text
//! - `x`, `y` for interpolation
//! - `A` (rows separated by `;`), `b`, `x0` (zeros if absent) and `w` for linear systems
//! - `tol`, `niter`, `relative` for every iterative method
//!
//! A missing required key or an unreadable value fails while building the task; anything
//! that goes wrong inside a solver is part of the report.
use crate::Utils::logger::parse_level;
use crate::Utils::task_parser::{TaskError, TaskSection, parse_document};
use crate::numerical::compare::Comparison;
use crate::numerical::engine;
use crate::numerical::interpolation::Interpolant;
use crate::numerical::interpolation::splines::SplineResult;
use crate::numerical::iteration_trace::{MethodFamily, MethodId, TraceRow};
use crate::numerical::root_finding::RootSolution;
use crate::numerical::solver_outcome::{IterationControl, SolverOutcome};
use crate::somelinalg::iterative_solvers_cpu::StationarySolution;
use log::{info, warn};
use simplelog::LevelFilter;
use std::fmt;
use std::fs;
use std::path::Path;
use tabled::{builder::Builder, settings::Style};

#[derive(Debug, Clone, PartialEq)]
pub struct RootTask {
    pub fx: String,
    pub gx: Option<String>,
    pub bracket: Option<(String, String)>,
    pub x0: Option<String>,
    pub x1: Option<String>,
    pub control: IterationControl,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointsTask {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearTask {
    pub a: Vec<Vec<f64>>,
    pub b: Vec<f64>,
    pub x0: Vec<f64>,
    pub w: Option<f64>,
    pub control: IterationControl,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Root(MethodId, RootTask),
    Interpolation(MethodId, PointsTask),
    Linear(MethodId, LinearTask),
    CompareRoots(RootTask),
    CompareInterpolation(PointsTask),
    CompareLinear(LinearTask),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub loglevel: LevelFilter,
    pub log_file: bool,
    /// Write the trace of every run to `<n>_<title>.csv`.
    pub save_traces: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            loglevel: LevelFilter::Info,
            log_file: false,
            save_traces: false,
        }
    }
}

impl Settings {
    fn from_section(section: &TaskSection) -> Result<Self, TaskError> {
        let mut settings = Settings::default();
        if let Some(level) = section.get("loglevel") {
            settings.loglevel = parse_level(level).map_err(|e| TaskError::InvalidValue {
                task: section.title.clone(),
                key: "loglevel".to_string(),
                reason: e.to_string(),
            })?;
        }
        settings.log_file = section.flag("log_file")?.unwrap_or(false);
        settings.save_traces = section.flag("save_traces")?.unwrap_or(false);
        Ok(settings)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskDocument {
    pub settings: Settings,
    pub tasks: Vec<Task>,
}

impl TaskDocument {
    pub fn parse(input: &str) -> Result<Self, TaskError> {
        let mut settings = Settings::default();
        let mut tasks = Vec::new();
        for section in parse_document(input)? {
            if section.title == "settings" {
                settings = Settings::from_section(&section)?;
            } else {
                tasks.push(Task::from_section(&section)?);
            }
        }
        Ok(Self { settings, tasks })
    }

    pub fn from_file(path: &Path) -> Result<Self, TaskError> {
        let input = fs::read_to_string(path)
            .map_err(|e| TaskError::Io(format!("{}: {}", path.display(), e)))?;
        Self::parse(&input)
    }
}

fn method_by_title(title: &str) -> Option<MethodId> {
    let method = match title {
        "bisection" => MethodId::Bisection,
        "false_position" => MethodId::FalsePosition,
        "fixed_point" => MethodId::FixedPoint,
        "newton" => MethodId::Newton,
        "multiple_roots" => MethodId::MultipleRoots,
        "secant" => MethodId::Secant,
        "vandermonde" => MethodId::Vandermonde,
        "newton_interpolation" | "newton_divided_differences" => {
            MethodId::NewtonDividedDifferences
        }
        "lagrange" => MethodId::Lagrange,
        "linear_spline" => MethodId::LinearSpline,
        "cubic_spline" => MethodId::CubicSpline,
        "jacobi" => MethodId::Jacobi,
        "gauss_seidel" => MethodId::GaussSeidel,
        "sor" => MethodId::Sor,
        _ => return None,
    };
    Some(method)
}

fn root_task(section: &TaskSection, required: &[&str]) -> Result<RootTask, TaskError> {
    for key in required {
        section.required(key)?;
    }
    let bracket = match (section.text("a"), section.text("b")) {
        (Some(a), Some(b)) => Some((a, b)),
        _ => None,
    };
    Ok(RootTask {
        fx: section.required("fx")?.to_string(),
        gx: section.text("gx"),
        bracket,
        x0: section.text("x0"),
        x1: section.text("x1"),
        control: section.control()?,
    })
}

fn points_task(section: &TaskSection) -> Result<PointsTask, TaskError> {
    section.required("x")?;
    section.required("y")?;
    Ok(PointsTask {
        x: section.vector("x")?.unwrap_or_default(),
        y: section.vector("y")?.unwrap_or_default(),
    })
}

fn linear_task(section: &TaskSection, needs_w: bool) -> Result<LinearTask, TaskError> {
    section.required("A")?;
    section.required("b")?;
    if needs_w {
        section.required("w")?;
    }
    let b = section.vector("b")?.unwrap_or_default();
    let x0 = section.vector("x0")?.unwrap_or_else(|| vec![0.0; b.len()]);
    Ok(LinearTask {
        a: section.matrix("A")?.unwrap_or_default(),
        b,
        x0,
        w: section.number("w")?,
        control: section.control()?,
    })
}

impl Task {
    pub fn from_section(section: &TaskSection) -> Result<Self, TaskError> {
        match section.title.as_str() {
            "compare_roots" => return Ok(Task::CompareRoots(root_task(section, &[])?)),
            "compare_interpolation" => {
                return Ok(Task::CompareInterpolation(points_task(section)?));
            }
            "compare_linear" => return Ok(Task::CompareLinear(linear_task(section, true)?)),
            _ => {}
        }
        let method = method_by_title(&section.title)
            .ok_or_else(|| TaskError::UnknownTask(section.title.clone()))?;
        let task = match method {
            MethodId::Bisection | MethodId::FalsePosition => {
                Task::Root(method, root_task(section, &["a", "b"])?)
            }
            MethodId::FixedPoint => Task::Root(method, root_task(section, &["gx", "x0"])?),
            MethodId::Newton | MethodId::MultipleRoots => {
                Task::Root(method, root_task(section, &["x0"])?)
            }
            MethodId::Secant => Task::Root(method, root_task(section, &["x0", "x1"])?),
            MethodId::Vandermonde
            | MethodId::NewtonDividedDifferences
            | MethodId::Lagrange
            | MethodId::LinearSpline
            | MethodId::CubicSpline => Task::Interpolation(method, points_task(section)?),
            MethodId::Jacobi | MethodId::GaussSeidel => {
                Task::Linear(method, linear_task(section, false)?)
            }
            MethodId::Sor => Task::Linear(method, linear_task(section, true)?),
        };
        Ok(task)
    }

    pub fn title(&self) -> String {
        match self {
            Task::Root(method, _) | Task::Interpolation(method, _) | Task::Linear(method, _) => {
                method.to_string()
            }
            Task::CompareRoots(_) => "Root finding comparison".to_string(),
            Task::CompareInterpolation(_) => "Interpolation comparison".to_string(),
            Task::CompareLinear(_) => "Linear system comparison".to_string(),
        }
    }

    pub fn run(&self) -> TaskReport {
        info!("running task: {}", self.title());
        match self {
            Task::Root(method, task) => run_root(*method, task),
            Task::Interpolation(method, task) => run_interpolation(*method, task),
            Task::Linear(method, task) => run_linear(*method, task),
            Task::CompareRoots(task) => run_compare_roots(task),
            Task::CompareInterpolation(task) => {
                comparison_report(engine::compare_interpolation(&task.x, &task.y))
            }
            Task::CompareLinear(task) => {
                let c = &task.control;
                comparison_report(engine::compare_linear(
                    &task.a,
                    &task.b,
                    &task.x0,
                    task.w.unwrap_or(1.0),
                    c.tolerance,
                    c.max_iterations,
                    c.relative_error,
                ))
            }
        }
    }
}

/// Rendered outcome of one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskReport {
    pub title: String,
    pub converged: bool,
    pub body: String,
    /// Trace records, header first, when the run produced a trace.
    pub trace: Option<Vec<Vec<String>>>,
}

impl TaskReport {
    fn failed(title: String, reason: String) -> Self {
        warn!("{}: {}", title, reason);
        Self {
            title,
            converged: false,
            body: format!("Failed: {}", reason),
            trace: None,
        }
    }
}

impl fmt::Display for TaskReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "=== {} ===", self.title)?;
        write!(f, "{}", self.body)
    }
}

/// Text table of a matrix, rows as given.
pub fn matrix_table(rows: &[Vec<f64>], header: Option<&[String]>) -> String {
    let mut builder = Builder::default();
    if let Some(header) = header {
        builder.push_record(header.to_vec());
    }
    for row in rows {
        builder.push_record(row.iter().map(|v| v.to_string()));
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

fn format_vector(v: &[f64]) -> String {
    let items: Vec<String> = v.iter().map(|x| x.to_string()).collect();
    format!("[{}]", items.join(", "))
}

fn root_report<R: TraceRow>(
    method: MethodId,
    outcome: SolverOutcome<RootSolution<R>>,
) -> TaskReport {
    match outcome {
        SolverOutcome::Converged(solution) => {
            let mut body = format!(
                "root = {}\niterations = {}",
                solution.root,
                solution.iterations()
            );
            if let Some(trace) = &solution.trace {
                body.push('\n');
                body.push_str(&trace.to_table());
            }
            TaskReport {
                title: method.to_string(),
                converged: true,
                body,
                trace: solution.trace.as_ref().map(|trace| trace.records()),
            }
        }
        SolverOutcome::Failed(error) => TaskReport::failed(method.to_string(), error.to_string()),
    }
}

fn run_root(method: MethodId, task: &RootTask) -> TaskReport {
    // presence of the inputs each method needs is checked when the task is built
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let (a, b) = task.bracket.clone().unwrap_or_default();
    let (x0, x1, gx) = (text(&task.x0), text(&task.x1), text(&task.gx));
    let (tol, niter, rel) = (
        task.control.tolerance,
        task.control.max_iterations,
        task.control.relative_error,
    );
    let fx = task.fx.as_str();
    match method {
        MethodId::Bisection => root_report(method, engine::bisection(&a, &b, fx, tol, niter, rel)),
        MethodId::FalsePosition => root_report(
            method,
            engine::false_position(&a, &b, fx, tol, niter, rel),
        ),
        MethodId::FixedPoint => root_report(
            method,
            engine::fixed_point(&x0, fx, &gx, tol, niter, rel),
        ),
        MethodId::Newton => root_report(method, engine::newton(&x0, fx, tol, niter, rel)),
        MethodId::MultipleRoots => {
            root_report(method, engine::multiple_roots(&x0, fx, tol, niter, rel))
        }
        MethodId::Secant => root_report(method, engine::secant(&x0, &x1, fx, tol, niter, rel)),
        other => TaskReport::failed(
            other.to_string(),
            format!("{} is not a root finding method", other),
        ),
    }
}

fn interpolation_report<I: Interpolant>(
    method: MethodId,
    outcome: SolverOutcome<I>,
    details: impl Fn(&I) -> String,
) -> TaskReport {
    match outcome {
        SolverOutcome::Converged(result) => TaskReport {
            title: method.to_string(),
            converged: true,
            body: format!("{}\n{}", details(&result), result.render()),
            trace: None,
        },
        SolverOutcome::Failed(error) => TaskReport::failed(method.to_string(), error.to_string()),
    }
}

fn run_interpolation(method: MethodId, task: &PointsTask) -> TaskReport {
    let (x, y) = (task.x.as_slice(), task.y.as_slice());
    match method {
        MethodId::Vandermonde => interpolation_report(method, engine::vandermonde(x, y), |r| {
            format!(
                "Vandermonde matrix:\n{}\ncoefficients = {}",
                matrix_table(&r.matrix, None),
                format_vector(&r.coefficients)
            )
        }),
        MethodId::NewtonDividedDifferences => {
            interpolation_report(method, engine::newton_interpolation(x, y), |r| {
                format!(
                    "Divided differences:\n{}\ncoefficients = {}",
                    matrix_table(&r.table.rows, Some(&r.table.columns)),
                    format_vector(&r.coefficients)
                )
            })
        }
        MethodId::Lagrange => interpolation_report(method, engine::lagrange(x, y), |r| {
            let basis: Vec<String> = r
                .basis
                .iter()
                .enumerate()
                .map(|(k, term)| format!("L{}(x) = {}", k, term))
                .collect();
            format!("{}\nLaTeX: {}", basis.join("\n"), r.tex_polynomial)
        }),
        MethodId::LinearSpline => {
            interpolation_report(method, engine::linear_spline(x, y), spline_details)
        }
        MethodId::CubicSpline => interpolation_report(method, engine::cubic_spline(x, y), spline_details),
        other => TaskReport::failed(
            other.to_string(),
            format!("{} is not an interpolation method", other),
        ),
    }
}

fn spline_details(result: &SplineResult) -> String {
    format!(
        "System matrix:\n{}\nright-hand side = {}",
        matrix_table(&result.matrix, None),
        format_vector(&result.rhs)
    )
}

fn run_linear(method: MethodId, task: &LinearTask) -> TaskReport {
    let c = &task.control;
    let (tol, niter, rel) = (c.tolerance, c.max_iterations, c.relative_error);
    let outcome: SolverOutcome<StationarySolution> = match method {
        MethodId::Jacobi => engine::jacobi(&task.a, &task.b, &task.x0, tol, niter, rel),
        MethodId::GaussSeidel => {
            engine::gauss_seidel(&task.a, &task.b, &task.x0, tol, niter, rel)
        }
        MethodId::Sor => engine::sor(
            &task.a,
            &task.b,
            &task.x0,
            task.w.unwrap_or(1.0),
            tol,
            niter,
            rel,
        ),
        other => {
            return TaskReport::failed(
                other.to_string(),
                format!("{} is not a linear system method", other),
            );
        }
    };
    match outcome {
        SolverOutcome::Converged(solution) => TaskReport {
            title: method.to_string(),
            converged: true,
            body: format!(
                "x = {}\niterations = {}\nT:\n{}\nC = {}\n{}",
                format_vector(&solution.x),
                solution.trace.iterations(),
                matrix_table(&solution.t, None),
                format_vector(&solution.c),
                solution.trace.to_table()
            ),
            trace: Some(solution.trace.records()),
        },
        SolverOutcome::Failed(error) => TaskReport::failed(method.to_string(), error.to_string()),
    }
}

fn run_compare_roots(task: &RootTask) -> TaskReport {
    let problem = engine::root_problem(
        &task.fx,
        task.gx.as_deref(),
        task.bracket.as_ref().map(|(a, b)| (a.as_str(), b.as_str())),
        task.x0.as_deref(),
        task.x1.as_deref(),
    );
    match problem {
        Ok(problem) => {
            let c = &task.control;
            comparison_report(engine::compare_roots(
                &problem,
                c.tolerance,
                c.max_iterations,
                c.relative_error,
            ))
        }
        Err(error) => {
            TaskReport::failed("Root finding comparison".to_string(), error.to_string())
        }
    }
}

fn comparison_report(comparison: Comparison) -> TaskReport {
    let best = comparison.best().map(|report| report.method.to_string());
    let title = match comparison.family {
        MethodFamily::RootFinding => "Root finding comparison",
        MethodFamily::Interpolation => "Interpolation comparison",
        MethodFamily::LinearSystem => "Linear system comparison",
    };
    let verdict = match &best {
        Some(method) => format!("best method: {}", method),
        None => "no method converged".to_string(),
    };
    TaskReport {
        title: title.to_string(),
        converged: best.is_some(),
        body: format!("{}\n{}", comparison.to_table(), verdict),
        trace: None,
    }
}
