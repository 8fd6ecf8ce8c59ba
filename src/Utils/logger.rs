//! Log setup for the binary and csv export of iteration traces.
use crate::numerical::iteration_trace::{IterationTrace, TraceRow};
use chrono::Local;
use csv::Writer;
use log::info;
use simplelog::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("loglevel must be debug, info, warn, error or off, got '{0}'")]
    UnknownLevel(String),
    #[error("cannot create log file: {0}")]
    File(#[from] std::io::Error),
    #[error("logger is already installed")]
    AlreadyInstalled,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Maps a level name from a task file to a filter.
pub fn parse_level(name: &str) -> Result<LevelFilter, LoggerError> {
    match name.trim().to_lowercase().as_str() {
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" | "none" => Ok(LevelFilter::Off),
        other => Err(LoggerError::UnknownLevel(other.to_string())),
    }
}

/// Installs a terminal logger and, if `log_file` is set, a file logger writing to
/// `log_<date>_<time>.txt` in the working directory. Returns the file name when one is
/// created.
pub fn init_logger(level: LevelFilter, log_file: bool) -> Result<Option<String>, LoggerError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    let mut name = None;
    if log_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let file_name = format!("log_{}.txt", date_and_time);
        loggers.push(WriteLogger::new(
            level,
            Config::default(),
            File::create(&file_name)?,
        ));
        name = Some(file_name);
    }
    CombinedLogger::init(loggers).map_err(|_| LoggerError::AlreadyInstalled)?;
    info!("logger started with level {}", level);
    Ok(name)
}

/// Writes records (header first) to a csv file.
pub fn save_records_to_csv(records: &[Vec<String>], path: &Path) -> Result<(), SaveError> {
    let mut writer = Writer::from_path(path)?;
    for record in records {
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a trace to a csv file, one line per row, with the column names as header.
pub fn save_trace_to_csv<R: TraceRow>(
    trace: &IterationTrace<R>,
    path: &Path,
) -> Result<(), SaveError> {
    save_records_to_csv(&trace.records(), path)?;
    info!("{} trace saved to {}", trace.method(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::root_finding::RootFinder;
    use crate::symbolic::symbolic_engine::Expr;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("info").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level(" WARN ").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::Off);
        assert!(matches!(
            parse_level("loud"),
            Err(LoggerError::UnknownLevel(name)) if name == "loud"
        ));
    }

    #[test]
    fn test_save_trace_to_csv() {
        let f = Expr::parse_expression("x^2 - 2").unwrap();
        let solution = RootFinder::default().bisection(&f, 1.0, 2.0).unwrap();
        let trace = solution.trace.unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("bisection.csv");
        save_trace_to_csv(&trace, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], trace.columns().join(","));
        assert_eq!(lines.len(), trace.rows().len() + 1);
        assert!(lines[1].starts_with("0,1,1.5,2,"));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("trace.csv");
        let records = vec![vec!["n".to_string()], vec!["0".to_string()]];
        assert!(save_records_to_csv(&records, &path).is_err());
    }
}
