use crate::parser::grammar::RequestGrammar;
use crate::parser::types::{ParseError, ParseResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 递归查找目录下所有 `.txt` / `.http` 请求文件，按路径排序
pub fn discover_request_files<P: AsRef<Path>>(dir: P) -> ParseResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ParseError::DirectoryNotFound {
            dir: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    walk(dir, &mut files)?;
    files.sort();

    debug!(dir = %dir.display(), count = files.len(), "Discovered request files");
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> ParseResult<()> {
    let read_error = |source: std::io::Error| ParseError::Io {
        file: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else if RequestGrammar::from_path(&path).is_some() {
            files.push(path);
        }
    }

    Ok(())
}

/// 由请求文件名得到场景名：`get-users.http` → `get_users`
pub fn scenario_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .unwrap_or_default()
        .replace('-', "_")
}
