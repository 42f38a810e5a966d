//! Rastreo de ubicaciones originales en código fuente.
//!
//! El árbol que consume el generador ya fue construido y verificado
//! por un front end externo, por lo que la única información de
//! ubicación que sobrevive es el número de línea de cada nodo. Los
//! errores fatales la arrastran cuando se conoce.

use std::fmt::{self, Display, Formatter};

/// Número de línea en el archivo de origen, si se conoce.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Line(Option<u32>);

impl Line {
    /// Línea desconocida.
    pub const UNKNOWN: Line = Line(None);

    /// Construye una línea conocida.
    pub fn at(line: u32) -> Self {
        Line(Some(line))
    }

    /// Obtiene el número de línea.
    pub fn number(self) -> Option<u32> {
        self.0
    }
}

impl From<u32> for Line {
    fn from(line: u32) -> Self {
        Line::at(line)
    }
}

impl Display for Line {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(line) => write!(formatter, "line {}", line),
            None => write!(formatter, "<unknown line>"),
        }
    }
}

/// Un objeto cualquiera con una línea original asociada.
#[derive(Debug, Clone, PartialEq)]
pub struct Located<T> {
    line: Line,
    value: T,
}

impl<T> Located<T> {
    /// Obtiene el valor.
    pub fn val(&self) -> &T {
        &self.value
    }

    /// Obtiene la línea.
    pub fn line(&self) -> Line {
        self.line
    }

    /// Descarta la ubicación y toma ownership del valor.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Construye a partir de un valor y una línea.
    pub fn at(value: T, line: Line) -> Self {
        Located { value, line }
    }

    /// Construye sin ubicación conocida.
    pub fn unlocated(value: T) -> Self {
        Located::at(value, Line::UNKNOWN)
    }

    /// Completa la línea si todavía no se conoce.
    pub fn or_at(self, line: Line) -> Self {
        match self.line.number() {
            Some(_) => self,
            None => Located { line, ..self },
        }
    }
}

impl<T> AsRef<T> for Located<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn or_at_keeps_known_line() {
        let known = Located::at('x', Line::at(3)).or_at(Line::at(7));
        assert_eq!(known.line(), Line::at(3));

        let unknown = Located::unlocated('x').or_at(Line::at(7));
        assert_eq!(unknown.line().number(), Some(7));
    }

    #[test]
    fn line_display() {
        assert_eq!(Line::at(12).to_string(), "line 12");
        assert_eq!(Line::UNKNOWN.to_string(), "<unknown line>");
    }
}
