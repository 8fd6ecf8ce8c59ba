#![allow(non_snake_case)]
use log::{error, info};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use veritas_numeris::Utils::logger::{init_logger, save_records_to_csv};
use veritas_numeris::Utils::task_runner::TaskDocument;

const DEMO: &str = "
settings
    loglevel: info

bisection
    fx: x^2 - 2
    a: 1
    b: 2
    tol: 1e-6

newton
    fx: cos(x) - x
    x0: pi/4
    tol: 1e-10

compare_roots
    fx: x^3 - 2x - 5
    a: 2
    b: 3
    x0: 2
    x1: 3

lagrange
    x: -1, 0, 1
    y: 1, 0, 1

cubic_spline
    x: 0, 1, 2, 3
    y: 0, 1, 0, 1

compare_linear
    A: 4, -1, 0; -1, 4, -1; 0, -1, 4
    b: 2, 4, 10
    w: 1.1
    tol: 1e-8
";

fn main() -> ExitCode {
    let path = env::args().nth(1).map(PathBuf::from);
    let document = match &path {
        Some(path) => TaskDocument::from_file(path),
        None => {
            println!("usage: veritas <task file>; running the built-in demo");
            TaskDocument::parse(DEMO)
        }
    };
    let document = match document {
        Ok(document) => document,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let settings = &document.settings;
    if let Err(e) = init_logger(settings.loglevel, settings.log_file) {
        eprintln!("{}", e);
    }
    info!("{} tasks", document.tasks.len());

    let mut failed = 0;
    for (n, task) in document.tasks.iter().enumerate() {
        let report = task.run();
        println!("{}\n", report);
        if !report.converged {
            failed += 1;
        }
        if let (true, Some(records)) = (settings.save_traces, &report.trace) {
            let file_name = format!("{}_{}.csv", n + 1, report.title.replace(' ', "_"));
            if let Err(e) = save_records_to_csv(records, Path::new(&file_name)) {
                error!("cannot save {}: {}", file_name, e);
            }
        }
    }
    info!(
        "{} of {} tasks converged",
        document.tasks.len() - failed,
        document.tasks.len()
    );
    ExitCode::SUCCESS
}
