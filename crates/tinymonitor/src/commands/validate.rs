use std::path::Path;
use std::process::ExitCode;

use tinymon_config::Config;

use super::locate_config;

pub fn execute(config_path: Option<&Path>) -> ExitCode {
    let Some(path) = locate_config(config_path) else {
        println!("No configuration file found.");
        println!("Specify a file with: tinymonitor validate -c /path/to/config.toml");
        return ExitCode::FAILURE;
    };

    println!("Validating: {}", path.display());

    let problems = check(&path);
    if problems.is_empty() {
        println!("Configuration is valid.");
        return ExitCode::SUCCESS;
    }

    println!();
    println!("Configuration errors:");
    for problem in &problems {
        println!("  - {problem}");
    }
    println!();
    ExitCode::FAILURE
}

/// 读取并校验单个文件，返回所有问题
fn check(path: &Path) -> Vec<String> {
    match Config::from_file(path) {
        Ok(config) => match config.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(ToString::to_string).collect(),
        },
        Err(e) => vec![e.to_string()],
    }
}
