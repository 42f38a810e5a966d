//! Errores fatales de generación de código.
//!
//! Ningún error de este módulo es recuperable: cualquiera de ellos
//! aborta la unidad de compilación en curso. Se distinguen tres
//! clases, ver [`ErrorClass`].

use crate::source::{Line, Located};
use std::{
    error::Error,
    fmt::{self, Display},
};
use thiserror::Error;

/// Resultado de toda operación falible del generador.
pub type Codegen<T> = Result<T, Located<CodegenError>>;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodegenError {
    #[error("Attempt to set a precision not supported by this generator")]
    UnsupportedPrecision,

    #[error("Attempt to change precision after the standard library was built")]
    PrecisionAfterInit,

    #[error("Unknown target language '{0}'")]
    UnknownLanguage(String),

    #[error("Unknown numeric precision '{0}'")]
    UnknownPrecision(String),

    #[error("Subclass supports struct operators but does not define appropriate standard types")]
    MissingStandardTypes,

    #[error("Support half type but not references???")]
    HalfWithoutReferences,

    #[error("Code Generator does not yet implement return of a varying type from a function")]
    VaryingReturn,

    #[error("Function not yet implemented")]
    SizeOperator,

    #[error("Too many arguments in function call")]
    TooManyArguments,

    #[error("Missing argument in function call (no default value)")]
    MissingDefault,

    #[error("Code Generator does not yet implement complex default value handling for functions")]
    ComplexDefault,

    #[error("Invalid set of array subscripts")]
    InvalidSubscripts,

    #[error("Unknown argument size")]
    UnknownArgumentSize,

    #[error("Unhandled differing array sizes")]
    DifferingArraySizes,

    #[error("Unhandled missing array size")]
    MissingArraySize,

    #[error("Unhandled array type coersion")]
    ArrayCoercion,

    #[error("Unimplemented size of variable array passing")]
    TooManyFreeDimensions,

    #[error("Attempt to initialize unknown array size")]
    UnknownInitSize,

    #[error("Language does not support the half type")]
    HalfUnsupported,

    #[error("Current language does not support the half data type, please promote to float")]
    HalfArray,

    #[error("Currently unhandled core data type for array")]
    ArrayCoreType,

    #[error("Empty array size list")]
    EmptyArray,

    #[error("Invalid push/pop pairs for indent level")]
    IndentStack,

    #[error("Invalid push/pop pairs for stream stack")]
    StreamStack,

    #[error("Function declaration outside of module")]
    OutsideModule,

    #[error("Attempt to register main routine '{0}' twice")]
    DuplicateMain(String),

    #[error("Delayed init on normal variable")]
    DelayedLocalInit,

    #[error("Unknown module pointer")]
    UnknownModule,

    #[error("Found more main routines than were defined")]
    ExtraMains,

    #[error("Unable to find all main routine definitions")]
    MissingMains,
}

/// Clasificación de un error fatal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// El dialecto rechaza la configuración pedida.
    Configuration,

    /// El programa de entrada usa algo que el generador no implementa.
    Unsupported,

    /// Defecto del propio generador.
    Internal,
}

impl CodegenError {
    pub fn class(&self) -> ErrorClass {
        use CodegenError::*;

        match self {
            UnsupportedPrecision
            | PrecisionAfterInit
            | UnknownLanguage(_)
            | UnknownPrecision(_)
            | HalfWithoutReferences => ErrorClass::Configuration,

            IndentStack | StreamStack | OutsideModule | DuplicateMain(_) | DelayedLocalInit
            | UnknownModule | ExtraMains | MissingMains => ErrorClass::Internal,

            _ => ErrorClass::Unsupported,
        }
    }

    /// Asocia una línea de origen.
    pub fn at(self, line: Line) -> Located<Self> {
        Located::at(self, line)
    }
}

impl Located<CodegenError> {
    /// Diagnóstico listo para el usuario. Los defectos del generador se
    /// reportan aparte de los errores del programa de entrada.
    pub fn into_diagnostics(self) -> Diagnostics {
        let kind = match self.val().class() {
            ErrorClass::Internal => "internal error",
            ErrorClass::Configuration | ErrorClass::Unsupported => "error",
        };

        Diagnostics::from(self).kind(kind)
    }
}

impl From<CodegenError> for Located<CodegenError> {
    fn from(error: CodegenError) -> Self {
        Located::unlocated(error)
    }
}

impl<E: Error> Display for Located<E> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line().number() {
            Some(line) => write!(fmt, "{} (line {})", self.val(), line),
            None => write!(fmt, "{}", self.val()),
        }
    }
}

impl<E: Error> Error for Located<E> {}

mod sealed {
    pub trait Sealed {}
}

pub trait LocatedError: sealed::Sealed {
    fn source(&self) -> &dyn Error;
    fn line(&self) -> Line;
}

pub struct Diagnostics {
    kind: &'static str,
    errors: Vec<Box<dyn 'static + LocatedError>>,
}

impl Diagnostics {
    pub fn kind(self, kind: &'static str) -> Self {
        Diagnostics { kind, ..self }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics {
            kind: "error",
            errors: Default::default(),
        }
    }
}

impl<E: 'static + LocatedError> From<E> for Diagnostics {
    fn from(error: E) -> Self {
        Diagnostics {
            errors: vec![Box::new(error)],
            ..Default::default()
        }
    }
}

impl Display for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Diagnostics { kind, errors } = self;

        if errors.is_empty() {
            return writeln!(fmt, "No errors were reported");
        }

        for error in errors {
            writeln!(fmt, "{}: {}", kind, error.source())?;
            if error.line().number().is_some() {
                writeln!(fmt, " --> {}", error.line())?;
            }

            writeln!(fmt)?;
        }

        let error_or_errors = if errors.len() == 1 { "error" } else { "errors" };
        writeln!(
            fmt,
            "Code generation failed with {} {}",
            errors.len(),
            error_or_errors
        )
    }
}

impl<E: Error> sealed::Sealed for Located<E> {}

impl<E: Error> LocatedError for Located<E> {
    fn source(&self) -> &dyn Error {
        self.as_ref()
    }

    fn line(&self) -> Line {
        Located::line(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classes() {
        assert_eq!(
            CodegenError::UnsupportedPrecision.class(),
            ErrorClass::Configuration
        );
        assert_eq!(CodegenError::SizeOperator.class(), ErrorClass::Unsupported);
        assert_eq!(CodegenError::StreamStack.class(), ErrorClass::Internal);
        assert_eq!(
            CodegenError::DuplicateMain("m".into()).class(),
            ErrorClass::Internal
        );
    }

    #[test]
    fn diagnostics_report_line() {
        let error = CodegenError::TooManyArguments.at(Line::at(4));
        let text = Diagnostics::from(error).to_string();

        assert!(text.starts_with("error: Too many arguments in function call\n"));
        assert!(text.contains(" --> line 4"));
        assert!(text.ends_with("Code generation failed with 1 error\n"));
    }

    #[test]
    fn internal_faults_are_marked() {
        let text = CodegenError::StreamStack.at(Line::at(2)).into_diagnostics().to_string();
        assert!(text.starts_with("internal error: "));

        let text = CodegenError::SizeOperator.at(Line::at(2)).into_diagnostics().to_string();
        assert!(text.starts_with("error: "));
    }

    #[test]
    fn unlocated_display() {
        let error: Located<CodegenError> = CodegenError::MissingMains.into();
        assert_eq!(error.to_string(), "Unable to find all main routine definitions");
    }
}
