//! Error types.

use std::fmt::{self, Formatter, Display};


pub type Result<I> = std::result::Result<I, Error>;

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    error: Box<dyn std::error::Error + Send + Sync>,
    /// Field names from the root of the tree down to the failing node,
    /// innermost last.
    path: Vec<String>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ErrorKind {
    /// Underlying IO error.
    Io,

    /// The structured text does not have the shape the node expects, for
    /// example an array where an object was required, or an identifier
    /// containing whitespace.
    Structure,

    /// A value was offered to a list or a variant whose declared element or
    /// candidate types do not include that value's type. The container is
    /// left unchanged.
    TypeMismatch,

    /// A variant was encoded before any value was assigned to it.
    Unset,

    /// A number does not fit in the fixed-width binary field it is written
    /// to.
    Range,

    /// Geometry could not be derived from the given vertex data, usually
    /// because array lengths do not line up or a shape is degenerate.
    Geometry,

    /// Two different types were registered under the same type code, or the
    /// reserved code was used. This is a programming error.
    TypeCode,

    /// Some "other" error type. Nodes will not themselves produce this.
    Other,
}

impl Error {
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error {
            kind,
            error: error.into(),
            path: Vec::new(),
        }
    }

    pub fn other<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Other, error)
    }

    /// Record that this error happened inside the field or element `name`.
    /// Called while the error propagates outward, so segments are prepended.
    pub fn within(mut self, name: impl Into<String>) -> Self {
        self.path.insert(0, name.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.error
    }

    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self.error
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, error)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match *self {
            ErrorKind::Io => "IO error",
            ErrorKind::Structure => "malformed structure",
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::Unset => "unset value",
            ErrorKind::Range => "value out of range",
            ErrorKind::Geometry => "geometry error",
            ErrorKind::TypeCode => "type code conflict",
            ErrorKind::Other => "unknown error",
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&self.kind, f)?;
        if !self.path.is_empty() {
            f.write_str(" at ")?;
            f.write_str(&self.path.join("."))?;
        }
        f.write_str(", ")?;
        Display::fmt(&self.error, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner())
    }
}


/// Construct an `Error` of the given kind from format args.
#[macro_export]
macro_rules! err {
    ($k:ident, $($e:tt)*)=>{
        $crate::error::Error::new(
            $crate::error::ErrorKind::$k,
            format!($($e)*),
        )
    };
}

#[macro_export]
macro_rules! bail {
    ($($e:tt)*)=>{ return Err($crate::err!($($e)*)) };
}

#[macro_export]
macro_rules! ensure {
    ($c:expr, $($e:tt)*)=>{
        if !$c {
            $crate::bail!($($e)*);
        }
    };
}


/// Extension trait to `Result` for attaching tree location to errors.
pub trait ResultExt<I>: Sized {
    fn within(self, name: &str) -> Result<I>;
}

impl<I> ResultExt<I> for Result<I> {
    fn within(self, name: &str) -> Result<I> {
        self.map_err(|e| e.within(name))
    }
}


#[test]
fn test_error_path_display() {
    let e: Result<()> = Err(crate::err!(Structure, "expected {}", "array"));
    let e = e
        .within("vertices")
        .within("mesh")
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Structure);
    assert_eq!(e.path(), &["mesh".to_owned(), "vertices".to_owned()]);
    assert_eq!(e.to_string(), "malformed structure at mesh.vertices, expected array");
}
