use std::error;
use std::fmt;
use std::result;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    HostError,
    InconsistentState,
    IoError,
    MalformedData,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub description: String,
    pub source: Option<Box<dyn error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind, description: String) -> Self {
        Error {
            kind,
            description,
            source: None,
        }
    }

    pub fn with_source<E: error::Error + Send + Sync + 'static>(
        kind: ErrorKind,
        description: String,
        source: E,
    ) -> Self {
        Error {
            kind,
            description,
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.description, source),
            None => write!(f, "{}", self.description),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn error::Error + 'static))
    }
}

pub type Result<T> = result::Result<T, Error>;

pub trait IntoResult<T> {
    fn res<D: FnOnce() -> String>(self, describe: D) -> Result<T>;
}

impl<T, E: error::Error + Send + Sync + 'static> IntoResult<T>
    for result::Result<T, E>
{
    fn res<D: FnOnce() -> String>(self, describe: D) -> Result<T> {
        self.map_err(|e| Error::with_source(ErrorKind::IoError, describe(), e))
    }
}
