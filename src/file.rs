//! Handling of proto3 source files

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    error::{ErrorKind, ParseError},
    model::Model,
    parse::parse_named,
    Error,
};

/// The maximum length of a source file, in bytes.
pub const MAX_FILE_LEN: u64 = i32::MAX as u64;

/// A parsed proto3 source file.
#[derive(Debug, Clone)]
pub struct File {
    path: Option<PathBuf>,
    source: String,
    model: Model,
}

impl File {
    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is larger than [`MAX_FILE_LEN`], is not
    /// valid UTF-8, or does not parse.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::fs;
    /// # use proto3_lines::file::File;
    /// # let tempdir = tempfile::TempDir::new().unwrap();
    /// # std::env::set_current_dir(&tempdir).unwrap();
    /// fs::write("foo.proto", "syntax = 'proto3';\npackage foo;\n").unwrap();
    ///
    /// let file = File::open("foo.proto").unwrap();
    /// assert_eq!(file.path(), Some("foo.proto".as_ref()));
    /// assert_eq!(file.model().package_name(), "foo");
    ///
    /// assert!(File::open("notfound.proto").unwrap_err().is_io());
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let source = read_source(path)?;
        let model = parse_named(&path.display().to_string(), &source)?;

        Ok(File {
            path: Some(path.to_owned()),
            source,
            model,
        })
    }

    /// Parses a proto3 source string into a new instance of [`File`].
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid source file.
    ///
    /// # Examples
    ///
    /// ```
    /// # use proto3_lines::file::File;
    /// let file = File::from_source("syntax = 'proto3';\npackage foo;\n").unwrap();
    /// assert_eq!(file.path(), None);
    /// assert_eq!(file.source(), "syntax = 'proto3';\npackage foo;\n");
    /// assert_eq!(file.model().syntax(), "proto3");
    /// ```
    pub fn from_source(source: &str) -> Result<Self, ParseError> {
        let model = parse_named("", source)?;

        Ok(File {
            path: None,
            source: source.to_owned(),
            model,
        })
    }

    /// If this is a physical file on the filesystem, returns the path to the file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The full content of the file.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Consumes the file, returning the parsed model.
    pub fn into_model(self) -> Model {
        self.model
    }
}

pub(crate) fn read_source(path: &Path) -> Result<String, Error> {
    let map_io_err = |err: io::Error| -> Error {
        Error::from_kind(ErrorKind::OpenFile {
            path: path.to_owned(),
            err,
        })
    };

    let file = fs::File::open(path).map_err(map_io_err)?;
    let metadata = file.metadata().map_err(map_io_err)?;

    if metadata.len() > MAX_FILE_LEN {
        return Err(Error::from_kind(ErrorKind::FileTooLarge {
            path: path.to_owned(),
        }));
    }

    let mut buf = Vec::with_capacity(metadata.len() as usize);
    file.take(MAX_FILE_LEN)
        .read_to_end(&mut buf)
        .map_err(map_io_err)?;

    debug!(path = %path.display(), len = buf.len(), "read source file");

    String::from_utf8(buf).map_err(|_| {
        Error::from_kind(ErrorKind::FileInvalidUtf8 {
            path: path.to_owned(),
        })
    })
}
