#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub use tmplwatch_test_utils::{FakeCommandRunner, init_tracing, with_timeout};

/// Config with one item of every entity kind, shorthand and object mixed.
pub const FULL_CONFIG: &str = r#"
- watch: true
  dependencies:
    - deps/base.yml
    - path: deps/extra.yml
      on_change: [make, deps]
  templates:
    - tpl/page.tpl
  datasources:
    - https://example.com/feed.json
    - url: file:///data/items.json
      alias: item-[name]
  files:
    - input_path: tpl/index.tpl
      output_path: out/[name].html
  on_change:
    command: [make, site]
    stdout: true
- datasources:
    - file:///data/other.json
  args: [--verbose]
"#;

/// Write `content` to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(&path, content).expect("write test file");
    path
}
