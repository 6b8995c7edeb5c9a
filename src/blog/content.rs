use crate::error::ArchiveError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONTENT_FILE: &str = "content.md";
pub const ASSET_MARKER: &str = "file:";

pub fn content_dir(basedir: &Path, position: usize) -> PathBuf {
    basedir.join(position.to_string())
}

pub fn content_path(basedir: &Path, position: usize) -> PathBuf {
    content_dir(basedir, position).join(CONTENT_FILE)
}

/// Split on `\n`, `\r\n` or a lone `\r`. A trailing terminator yields a final empty line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                out.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                out.push(&text[start..i]);
                i += 1;
                if i < bytes.len() && bytes[i] == b'\n' {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    out.push(&text[start..]);
    out
}

/// Point every `file:` marker at the entry's own directory.
///
/// Plain substring replacement: `file://` URLs are rewritten too. Every line,
/// including the last, is followed by `\n`.
pub fn rewrite_links(text: &str, basedir: &Path, position: usize) -> String {
    let replacement = format!("{ASSET_MARKER}{}/{position}/", basedir.display());
    let mut out = String::with_capacity(text.len() + 16);
    for line in split_lines(text) {
        out.push_str(&line.replace(ASSET_MARKER, &replacement));
        out.push('\n');
    }
    out
}

pub fn read_raw(basedir: &Path, position: usize) -> Result<String, ArchiveError> {
    let path = content_path(basedir, position);
    fs::read_to_string(&path).map_err(|err| ArchiveError::ContentMissing {
        position,
        path,
        reason: err.to_string(),
    })
}

pub fn read_rewritten(basedir: &Path, position: usize) -> Result<String, ArchiveError> {
    let raw = read_raw(basedir, position)?;
    Ok(rewrite_links(&raw, basedir, position))
}

/// Undo record for a content write made ahead of an index save.
#[derive(Debug)]
pub struct ContentWrite {
    pub path: PathBuf,
    dir: PathBuf,
    previous: Option<Vec<u8>>,
    created_dir: bool,
}

impl ContentWrite {
    pub fn rollback(self) -> io::Result<()> {
        match self.previous {
            Some(bytes) => fs::write(&self.path, bytes),
            None => {
                if self.path.exists() {
                    fs::remove_file(&self.path)?;
                }
                if self.created_dir {
                    // Only removes the directory when nothing else landed in it.
                    let _ = fs::remove_dir(&self.dir);
                }
                Ok(())
            }
        }
    }
}

pub fn write_content(basedir: &Path, position: usize, body: &str) -> io::Result<ContentWrite> {
    write_content_with(basedir, position, |path| fs::write(path, body))
}

fn write_content_with<F>(basedir: &Path, position: usize, write: F) -> io::Result<ContentWrite>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    let dir = content_dir(basedir, position);
    let created_dir = !dir.exists();
    fs::create_dir_all(&dir)?;

    let path = dir.join(CONTENT_FILE);
    let staged = match fs::read(&path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
    .and_then(|previous| write(&path).map(|_| previous));

    match staged {
        Ok(previous) => Ok(ContentWrite {
            path,
            dir,
            previous,
            created_dir,
        }),
        Err(err) => {
            if created_dir {
                let _ = fs::remove_file(&path);
                let _ = fs::remove_dir(&dir);
            }
            Err(err)
        }
    }
}
