use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// 原子写入文件
///
/// 先在目标目录下写临时文件，再重命名到目标路径；父目录不存在时自动创建，
/// 目标已存在时覆盖。任何一步失败，临时文件都会在句柄释放时删除。
pub fn write_atomically(path: &Path, data: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(data)?;
    file.flush()?;
    file.persist(path).map_err(|e| e.error)?;

    Ok(())
}
