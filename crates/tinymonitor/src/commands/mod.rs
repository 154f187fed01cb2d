pub mod info;
pub mod run;
pub mod test_alert;
pub mod validate;

use std::path::{Path, PathBuf};

use tinymon_config::search_paths;

/// 显式路径或默认查找顺序中第一个存在的配置文件
pub(crate) fn locate_config(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => search_paths().into_iter().find(|path| path.is_file()),
    }
}

pub fn print_version() {
    println!("tinymonitor {}", env!("CARGO_PKG_VERSION"));
    println!(
        "  OS/Arch:    {}/{}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
}
