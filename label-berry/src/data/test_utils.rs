//! 测试用的临时文件路径.

use std::path::PathBuf;

/// 当前测试进程专属的临时目录下名为 `name` 的文件路径. 目录不存在时会被创建.
///
/// 不同进程的路径互不相同, 同一进程内由调用方保证 `name` 不重复.
pub fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("label-berry-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}
