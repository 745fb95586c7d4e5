//! Change-aware persistence.
//!
//! Every artifact is compared with what is already on disk and rewritten only
//! when it differs. CSV artifacts compare structurally (columns, rows, cells,
//! in order); HTML and text artifacts compare by rendered content. A missing
//! or unreadable prior file always forces a write.

use std::path::Path;

use katilim_recon::{RunContext, Table};

use crate::error::PersistError;

/// What ends up on disk.
#[derive(Debug, Clone, Copy)]
pub enum Artifact<'a> {
    Csv { table: &'a Table, bom: bool },
    Html(&'a Table),
    Text(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

impl WriteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write `artifact` to `path` unless the file already holds the same content.
pub fn persist(
    ctx: &mut RunContext<'_>,
    artifact: Artifact<'_>,
    path: &Path,
) -> Result<WriteOutcome, PersistError> {
    let rendered = render(artifact).map_err(|message| PersistError::Encode {
        path: path.to_path_buf(),
        message,
    })?;

    if path.exists() {
        match matches_existing(artifact, &rendered, path) {
            Ok(true) => {
                ctx.info(format!("{} unchanged", path.display()));
                return Ok(WriteOutcome::Unchanged);
            }
            Ok(false) => {}
            Err(e) => ctx.warn(format!(
                "cannot read existing {} ({e}), rewriting",
                path.display()
            )),
        }
    }

    write(path, &rendered)?;
    ctx.info(format!("{} updated", path.display()));
    Ok(WriteOutcome::Written)
}

fn render(artifact: Artifact<'_>) -> Result<String, String> {
    match artifact {
        Artifact::Csv { table, bom } => crate::csv::to_csv_string(table, bom),
        Artifact::Html(table) => Ok(crate::html::render_table(table)),
        Artifact::Text(text) => Ok(text.to_string()),
    }
}

fn matches_existing(artifact: Artifact<'_>, rendered: &str, path: &Path) -> Result<bool, String> {
    let existing = crate::csv::read_file_as_utf8(path)?;
    match artifact {
        Artifact::Csv { table, .. } => {
            let prior = crate::csv::parse_table(&existing, b',')?;
            Ok(prior == *table)
        }
        Artifact::Html(_) | Artifact::Text(_) => Ok(existing == rendered),
    }
}

fn write(path: &Path, contents: &str) -> Result<(), PersistError> {
    let err = |e: std::io::Error| PersistError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(err)?;
        }
    }
    std::fs::write(path, contents).map_err(err)
}
