//! Loading dump text from a `.sql` file or a `.gz` / `.zip` archive holding one.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("We can't find the SQL file {0}")]
    MissingFile(PathBuf),

    #[error("Please provide a .sql file or an archive (gz, or zip) with one .sql file inside.")]
    UnsupportedExtension(PathBuf),

    #[error("There is no .sql file in the archive.")]
    NoSqlInArchive,

    #[error("There are more than one .sql file in the archive. Please provide only one .sql file.")]
    MultipleSqlInArchive,

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("We are unable to extract the archive. {0}")]
    Archive(String),
}

pub type Result<T, E = InputError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpKind {
    Sql,
    Gzip,
    Zip,
}

impl DumpKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("sql") => Ok(DumpKind::Sql),
            Some("gz") => Ok(DumpKind::Gzip),
            Some("zip") => Ok(DumpKind::Zip),
            _ => Err(InputError::UnsupportedExtension(path.to_path_buf())),
        }
    }

    pub fn is_archive(&self) -> bool {
        !matches!(self, DumpKind::Sql)
    }
}

/// Reads the dump at `path`, decompressing it when it is an archive.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub fn load_dump(path: &Path) -> Result<String> {
    let kind = DumpKind::from_path(path)?;
    if !path.is_file() {
        return Err(InputError::MissingFile(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|source| io_error(path, source))?;

    let bytes = match kind {
        DumpKind::Sql => read_all(path, BufReader::new(file))?,
        DumpKind::Gzip => read_gzip(path, file)?,
        DumpKind::Zip => read_zip(file)?,
    };
    log::info!("Loaded {} bytes of SQL from {}", bytes.len(), path.display());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn io_error(path: &Path, source: std::io::Error) -> InputError {
    InputError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_all(path: &Path, mut reader: impl Read) -> Result<Vec<u8>> {
    let mut bytes = vec![];
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| io_error(path, source))?;
    Ok(bytes)
}

fn is_sql_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".sql")
}

/// A gzip stream holds a single member, named by its header or by the archive stem.
fn read_gzip(path: &Path, file: File) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let header_name = decoder
        .header()
        .and_then(|header| header.filename())
        .map(|name| String::from_utf8_lossy(name).into_owned());
    let member_name = header_name.or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
    });
    if !member_name.as_deref().is_some_and(is_sql_name) {
        return Err(InputError::NoSqlInArchive);
    }

    let mut bytes = vec![];
    decoder
        .read_to_end(&mut bytes)
        .map_err(|err| InputError::Archive(err.to_string()))?;
    Ok(bytes)
}

fn read_zip(file: File) -> Result<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|err| InputError::Archive(err.to_string()))?;

    let sql_entries: Vec<String> = archive
        .file_names()
        .filter(|name| is_sql_name(name))
        .map(str::to_owned)
        .collect();
    let entry_name = match sql_entries.as_slice() {
        [] => return Err(InputError::NoSqlInArchive),
        [name] => name,
        _ => return Err(InputError::MultipleSqlInArchive),
    };
    log::debug!("Extracting {} from zip archive", entry_name);

    let mut entry = archive
        .by_name(entry_name)
        .map_err(|err| InputError::Archive(err.to_string()))?;
    let mut bytes = vec![];
    entry
        .read_to_end(&mut bytes)
        .map_err(|err| InputError::Archive(err.to_string()))?;
    Ok(bytes)
}
