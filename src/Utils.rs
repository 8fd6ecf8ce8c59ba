//! different utility modules used throughout the project
/// logger setup and saving traces into csv files
pub mod logger;
/// parse task documents with structure like "title key1: value1, value2 key2: value3" into sections
pub mod task_parser;
/// build solver tasks from parsed sections, run them and render the reports
pub mod task_runner;
