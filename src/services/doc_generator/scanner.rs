//! 目录扫描器
//!
//! 遍历输入目录，按文件名排序依次产出头文件的 [`SourceUnit`]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::extractor::extract_blocks;
use super::types::SourceUnit;
use crate::config::MakeDocConfig;

/// 目录扫描器
pub struct SourceScanner {
    /// 支持的扩展名（小写，不含点）
    extensions: Vec<String>,
    /// 编译后的忽略模式（glob patterns）
    exclude_patterns: Vec<glob::Pattern>,
}

impl SourceScanner {
    /// 创建新的目录扫描器
    pub fn new(config: &MakeDocConfig) -> Self {
        let exclude_patterns = config
            .exclude
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Invalid exclude pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();

        let extensions = config
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();

        Self {
            extensions,
            exclude_patterns,
        }
    }

    /// 扫描目录
    ///
    /// 根目录不存在、不是目录或不可读时立即返回错误；
    /// 其余错误在迭代过程中逐项返回
    pub fn scan<'a>(
        &'a self,
        root: &Path,
    ) -> Result<impl Iterator<Item = Result<SourceUnit, ScanError>> + 'a, ScanError> {
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }
        fs::read_dir(root).map_err(|e| ScanError::IoError(root.to_path_buf(), e))?;

        debug!("Scanning {}", root.display());

        let root = root.to_path_buf();
        let filter_root = root.clone();

        let units = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| entry.depth() == 0 || !self.should_ignore(entry, &filter_root))
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    // 通过 path 判断，指向文件的符号链接也会被处理
                    if entry.path().is_file() && self.is_supported_file(entry.path()) {
                        Some(load_unit(entry.path(), &root))
                    } else {
                        None
                    }
                }
                Err(e) => Some(Err(ScanError::from_walk(e, &root))),
            });

        Ok(units)
    }

    /// 检查是否应该忽略该条目
    fn should_ignore(&self, entry: &DirEntry, root: &Path) -> bool {
        let name = entry.file_name().to_string_lossy();

        // 忽略隐藏文件/目录（以 . 开头）
        if name.starts_with('.') {
            return true;
        }

        let relative = relative_path(entry.path(), root);
        let ignored = self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&name) || pattern.matches(&relative));
        if ignored {
            debug!("Ignoring: {}", relative);
        }
        ignored
    }

    /// 检查是否是支持的文件类型
    fn is_supported_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.contains(&ext))
    }
}

/// 读取并解析一个头文件
fn load_unit(path: &Path, root: &Path) -> Result<SourceUnit, ScanError> {
    let bytes = fs::read(path).map_err(|e| ScanError::IoError(path.to_path_buf(), e))?;
    let content =
        String::from_utf8(bytes).map_err(|_| ScanError::InvalidUtf8(path.to_path_buf()))?;

    let blocks = extract_blocks(&content);
    let relative_path = relative_path(path, root);
    debug!("Scanned {}: {} blocks", relative_path, blocks.len());

    Ok(SourceUnit {
        path: path.to_path_buf(),
        relative_path,
        blocks,
    })
}

/// 相对路径，统一使用 `/`
fn relative_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| path.to_string_lossy().replace('\\', "/"))
}

/// 扫描错误类型
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("路径不存在: {0}")]
    PathNotFound(PathBuf),

    #[error("路径不是目录: {0}")]
    NotADirectory(PathBuf),

    #[error("IO错误 ({0}): {1}")]
    IoError(PathBuf, #[source] io::Error),

    #[error("文件不是有效的 UTF-8: {0}")]
    InvalidUtf8(PathBuf),
}

impl ScanError {
    fn from_walk(err: walkdir::Error, root: &Path) -> Self {
        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        let io_err = err
            .into_io_error()
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop detected"));
        ScanError::IoError(path, io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut f = File::create(path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        write_file(&root.join("zlib.h"), "int deflate(int level);\n");
        write_file(&root.join("net/socket.h"), "int sock_open(int port);\n");
        write_file(&root.join("net/http.hpp"), "int http_get(const char *url);\n");
        write_file(&root.join("net/http.c"), "int http_get(const char *url) { return 0; }\n");
        write_file(&root.join("README.md"), "# sdk\n");
        write_file(&root.join(".cache/old.h"), "int stale(void);\n");
        write_file(&root.join("third_party/vendor.h"), "int vendor(void);\n");

        dir
    }

    fn scan_paths(scanner: &SourceScanner, root: &Path) -> Vec<String> {
        scanner
            .scan(root)
            .unwrap()
            .map(|u| u.unwrap().relative_path)
            .collect()
    }

    #[test]
    fn test_scan_directory() {
        let test_dir = create_test_dir();
        let scanner = SourceScanner::new(&MakeDocConfig::default());

        let paths = scan_paths(&scanner, test_dir.path());
        assert_eq!(
            paths,
            vec!["net/http.hpp", "net/socket.h", "third_party/vendor.h", "zlib.h"]
        );
    }

    #[test]
    fn test_scan_extracts_blocks() {
        let test_dir = create_test_dir();
        let scanner = SourceScanner::new(&MakeDocConfig::default());

        let unit = scanner
            .scan(test_dir.path())
            .unwrap()
            .map(Result::unwrap)
            .find(|u| u.relative_path == "net/socket.h")
            .unwrap();
        assert_eq!(unit.blocks.len(), 1);
        assert_eq!(unit.blocks[0].name, "sock_open");
        assert_eq!(unit.path, test_dir.path().join("net/socket.h"));
    }

    #[test]
    fn test_exclude_patterns() {
        let test_dir = create_test_dir();
        let config = MakeDocConfig {
            exclude: vec!["third_party".to_string(), "net/http.*".to_string()],
            ..Default::default()
        };
        let scanner = SourceScanner::new(&config);

        let paths = scan_paths(&scanner, test_dir.path());
        assert_eq!(paths, vec!["net/socket.h", "zlib.h"]);
    }

    #[test]
    fn test_custom_extensions() {
        let test_dir = create_test_dir();
        let config = MakeDocConfig {
            extensions: vec![".C".to_string()],
            ..Default::default()
        };
        let scanner = SourceScanner::new(&config);

        assert_eq!(scan_paths(&scanner, test_dir.path()), vec!["net/http.c"]);
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let scanner = SourceScanner::new(&MakeDocConfig::default());

        let err = scanner.scan(&dir.path().join("missing")).err().unwrap();
        assert!(matches!(err, ScanError::PathNotFound(_)));
    }

    #[test]
    fn test_root_is_file() {
        let test_dir = create_test_dir();
        let scanner = SourceScanner::new(&MakeDocConfig::default());

        let err = scanner.scan(&test_dir.path().join("zlib.h")).err().unwrap();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }

    #[test]
    fn test_invalid_utf8_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("gbk.h"), [0xc4u8, 0xe3, 0xba, 0xc3, 0xff]).unwrap();
        let scanner = SourceScanner::new(&MakeDocConfig::default());

        let results: Vec<_> = scanner.scan(dir.path()).unwrap().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(ScanError::InvalidUtf8(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_header_is_scanned() {
        let dir = TempDir::new().unwrap();
        let vendor = TempDir::new().unwrap();
        write_file(&vendor.path().join("real.h"), "int real_fn(void);\n");
        std::os::unix::fs::symlink(vendor.path().join("real.h"), dir.path().join("link.h"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.h"), dir.path().join("dangling.h"))
            .unwrap();
        let scanner = SourceScanner::new(&MakeDocConfig::default());

        let units: Vec<SourceUnit> = scanner
            .scan(dir.path())
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].relative_path, "link.h");
        assert_eq!(units[0].blocks[0].name, "real_fn");
    }

    #[test]
    fn test_is_supported_file() {
        let scanner = SourceScanner::new(&MakeDocConfig::default());

        assert!(scanner.is_supported_file(Path::new("socket.h")));
        assert!(scanner.is_supported_file(Path::new("http.HPP")));
        assert!(!scanner.is_supported_file(Path::new("http.c")));
        assert!(!scanner.is_supported_file(Path::new("Makefile")));
    }
}
