//! Dialectos de salida.
//!
//! Cada lenguaje objetivo responde un conjunto pequeño de consultas de
//! capacidad y de formato a través de [`Dialect`]. Los métodos con
//! implementación por omisión forman la base común de los lenguajes
//! tipo C; cada dialecto concreto sobreescribe únicamente lo que lo
//! distingue. Ninguna consulta tiene efectos secundarios y sus
//! respuestas no cambian durante una compilación.
//!
//! El generador elige un dialecto una sola vez a partir de un
//! [`Language`] y lo consulta durante la traducción, la fabricación
//! de la biblioteca estándar y la emisión.

use crate::{
    codegen::{
        fragment::{FunctionFragment, StdType, TypeFragment},
        stdlib::{self, Library},
    },
    error::{Codegen, CodegenError},
};

use bitflags::bitflags;
use std::{collections::BTreeMap, fmt, str::FromStr};
use unicase::UniCase;

mod c;
mod cpp;
mod cuda;
mod glsl;
mod opencl;

pub use c::C;
pub use cpp::Cpp;
pub use cuda::Cuda;
pub use glsl::Glsl;
pub use opencl::OpenCl;

/// Lenguaje objetivo.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    C,
    Cpp03,
    Cpp11,
    Cuda,
    Glsl,
    OpenCl,

    /// C++03 para plugins de Nuke.
    Nuke,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::C,
        Language::Cpp03,
        Language::Cpp11,
        Language::Cuda,
        Language::Glsl,
        Language::OpenCl,
        Language::Nuke,
    ];

    pub fn name(self) -> &'static str {
        use Language::*;

        match self {
            C => "c",
            Cpp03 => "c++03",
            Cpp11 => "c++11",
            Cuda => "cuda",
            Glsl => "glsl",
            OpenCl => "opencl",
            Nuke => "nuke",
        }
    }

    /// Construye el dialecto correspondiente.
    pub fn dialect(self) -> Box<dyn Dialect> {
        use Language::*;

        match self {
            C => Box::new(c::C),
            Cpp03 | Cpp11 | Nuke => Box::new(Cpp::new(self)),
            Cuda => Box::new(cuda::Cuda),
            Glsl => Box::new(glsl::Glsl),
            OpenCl => Box::new(opencl::OpenCl),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = CodegenError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = UniCase::new(name);
        let alias = |language: Language| match language {
            Language::Cpp03 => UniCase::new("c++") == name || UniCase::new("cpp") == name,
            Language::Cpp11 => UniCase::new("cpp11") == name,
            _ => false,
        };

        Language::ALL
            .iter()
            .copied()
            .find(|&language| UniCase::new(language.name()) == name || alias(language))
            .ok_or_else(|| CodegenError::UnknownLanguage(name.to_string()))
    }
}

/// Precisión numérica de `ctl_number_t`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Precision {
    Float,
    Double,
    LongDouble,
}

impl Precision {
    pub fn type_name(self) -> &'static str {
        match self {
            Precision::Float => "float",
            Precision::Double => "double",
            Precision::LongDouble => "long double",
        }
    }

    /// Sufijo de las funciones de `math.h`.
    pub fn function_suffix(self) -> &'static str {
        match self {
            Precision::Float => "f",
            Precision::Double => "",
            Precision::LongDouble => "l",
        }
    }

    /// Sufijo de literales de punto flotante.
    pub fn literal_suffix(self) -> &'static str {
        match self {
            Precision::Float => "F",
            Precision::Double => "",
            Precision::LongDouble => "L",
        }
    }
}

impl Default for Precision {
    fn default() -> Self {
        Precision::Float
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.type_name())
    }
}

impl FromStr for Precision {
    type Err = CodegenError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = UniCase::new(name);
        [Precision::Float, Precision::Double, Precision::LongDouble]
            .iter()
            .copied()
            .find(|precision| {
                UniCase::new(precision.type_name()) == name
                    || (*precision == Precision::LongDouble && UniCase::new("long_double") == name)
            })
            .ok_or_else(|| CodegenError::UnknownPrecision(name.to_string()))
    }
}

bitflags! {
    /// Resumen de las capacidades booleanas de un dialecto.
    pub struct Capabilities: u32 {
        const NAMESPACES          = 1 << 0;
        const REFERENCES          = 1 << 1;
        const POINTERS            = 1 << 2;
        const HALF                = 1 << 3;
        const STRUCT_OPERATORS    = 1 << 4;
        const STRUCT_CONSTRUCTORS = 1 << 5;
        const ARRAY_INITIALIZERS  = 1 << 6;
        const PRINT               = 1 << 7;
        const DYNAMIC_INIT        = 1 << 8;
        const FUNCTION_INIT       = 1 << 9;
        const STRUCT_TYPEDEFS     = 1 << 10;
    }
}

/// Consultas de capacidad y formato de un lenguaje objetivo.
pub trait Dialect {
    fn language(&self) -> Language;

    /// Los módulos se envuelven en `namespace`.
    fn supports_namespaces(&self) -> bool;

    /// Parámetros de salida por referencia (`&`).
    fn supports_references(&self) -> bool;

    /// Parámetros de salida por puntero, con `*` al usarlos.
    fn supports_pointers(&self) -> bool {
        self.supports_references()
    }

    fn supports_half_type(&self) -> bool;

    /// Los tipos vector y matriz estándar tienen operadores propios.
    fn supports_struct_operators(&self) -> bool;

    fn supports_struct_constructors(&self) -> bool {
        self.supports_struct_operators()
    }

    /// Agregados anidados se inicializan con llaves en vez de
    /// constructores.
    fn supports_array_initializers(&self) -> bool {
        false
    }

    /// Si es falso, las llamadas a `print_*` se omiten.
    fn supports_print(&self) -> bool {
        true
    }

    /// El lenguaje puede correr código de inicialización de módulo
    /// automáticamente mediante un constructor estático.
    fn needs_module_dynamic_initialization(&self) -> bool;

    /// Algunos globales deben inicializarse dentro de una función en
    /// vez de con un inicializador estático.
    fn uses_function_initializers(&self) -> bool;

    /// Las estructuras de usuario se declaran con `typedef struct`.
    fn needs_struct_typedefs(&self) -> bool {
        !self.supports_namespaces()
    }

    /// Los parámetros escribibles llevan el calificador `out`.
    fn uses_out_qualifiers(&self) -> bool {
        false
    }

    fn supports_precision(&self, _precision: Precision) -> bool {
        true
    }

    /// Prefijo para acceder a símbolos de otro módulo.
    fn namespace_tag(&self, module: &str) -> String {
        format!("{}_", module)
    }

    fn inline_keyword(&self) -> &'static str {
        "inline"
    }

    /// Prefijo de toda función generada y de sus declaraciones adelantadas.
    fn function_prefix(&self) -> &'static str {
        "static"
    }

    /// Prefijo de variables globales.
    fn global_prefix(&self) -> &'static str {
        ""
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    fn const_literal(&self, _global: bool) -> &'static str {
        "const"
    }

    fn begin_comment(&self) -> &'static str {
        "//"
    }

    fn end_comment(&self) -> &'static str {
        ""
    }

    /// Inicio de una conversión explícita al tipo dado.
    fn begin_cast(&self, ty: &str) -> String {
        format!("({})( ", ty)
    }

    fn end_cast(&self) -> &'static str {
        " )"
    }

    /// Selector de componentes al reducir un vector más grande.
    fn swizzle(&self, _count: usize) -> Option<&'static str> {
        None
    }

    fn precision_function_suffix(&self, precision: Precision) -> &'static str {
        precision.function_suffix()
    }

    fn standard_includes(&self) -> Vec<&'static str> {
        let mut includes = vec!["math.h", "stdint.h", "limits.h", "float.h"];
        if self.supports_half_type() {
            includes.push("half.h");
        }

        includes
    }

    /// Definición de `ctl_number_t`.
    fn number_typedef(&self, precision: Precision) -> String {
        format!("typedef {} ctl_number_t;", precision.type_name())
    }

    /// Si es falso, no se emite preámbulo de biblioteca alguno.
    fn emits_standard_setup(&self) -> bool {
        true
    }

    /// Reemplazos sobre la tabla de nombres estándar.
    fn std_name_overrides(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    /// Tabla de tipos estándar.
    fn standard_types(&self, lib: &Library) -> Codegen<BTreeMap<StdType, TypeFragment>> {
        if self.supports_struct_operators() {
            Err(CodegenError::MissingStandardTypes.into())
        } else {
            Ok(stdlib::c_types(lib))
        }
    }

    fn print_bodies(&self, lib: &Library) -> Vec<FunctionFragment> {
        stdlib::c_print_bodies(lib)
    }

    fn math_bodies(&self, lib: &Library) -> Vec<FunctionFragment> {
        stdlib::c_math_bodies(lib)
    }

    fn half_bodies(&self, lib: &Library) -> Vec<FunctionFragment> {
        if lib.half {
            stdlib::c_half_bodies(lib)
        } else {
            Vec::new()
        }
    }

    fn color_bodies(&self, lib: &Library) -> Vec<FunctionFragment> {
        stdlib::c_color_bodies(lib)
    }

    fn interp_bodies(&self, lib: &Library) -> Codegen<Vec<FunctionFragment>> {
        stdlib::c_interp_bodies(lib)
    }

    fn capabilities(&self) -> Capabilities {
        let mut capabilities = Capabilities::empty();
        let flags = [
            (Capabilities::NAMESPACES, self.supports_namespaces()),
            (Capabilities::REFERENCES, self.supports_references()),
            (Capabilities::POINTERS, self.supports_pointers()),
            (Capabilities::HALF, self.supports_half_type()),
            (Capabilities::STRUCT_OPERATORS, self.supports_struct_operators()),
            (
                Capabilities::STRUCT_CONSTRUCTORS,
                self.supports_struct_constructors(),
            ),
            (
                Capabilities::ARRAY_INITIALIZERS,
                self.supports_array_initializers(),
            ),
            (Capabilities::PRINT, self.supports_print()),
            (
                Capabilities::DYNAMIC_INIT,
                self.needs_module_dynamic_initialization(),
            ),
            (Capabilities::FUNCTION_INIT, self.uses_function_initializers()),
            (Capabilities::STRUCT_TYPEDEFS, self.needs_struct_typedefs()),
        ];

        for (flag, enabled) in flags.iter().copied() {
            capabilities.set(flag, enabled);
        }

        capabilities
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_languages() {
        assert_eq!("C++11".parse::<Language>(), Ok(Language::Cpp11));
        assert_eq!("cpp".parse::<Language>(), Ok(Language::Cpp03));
        assert_eq!("OpenCL".parse::<Language>(), Ok(Language::OpenCl));
        assert_eq!(
            "fortran".parse::<Language>(),
            Err(CodegenError::UnknownLanguage("fortran".into()))
        );
    }

    #[test]
    fn parse_precisions() {
        assert_eq!("Long Double".parse::<Precision>(), Ok(Precision::LongDouble));
        assert_eq!("DOUBLE".parse::<Precision>(), Ok(Precision::Double));
        assert!("quad".parse::<Precision>().is_err());
    }

    #[test]
    fn capability_sets() {
        let cpp = Language::Cpp03.dialect().capabilities();
        assert!(cpp.contains(Capabilities::NAMESPACES | Capabilities::DYNAMIC_INIT));
        assert!(cpp.contains(Capabilities::FUNCTION_INIT));
        assert!(!cpp.contains(Capabilities::STRUCT_TYPEDEFS));

        let cpp11 = Language::Cpp11.dialect().capabilities();
        assert!(!cpp11.contains(Capabilities::FUNCTION_INIT));

        let opencl = Language::OpenCl.dialect().capabilities();
        assert!(opencl.contains(Capabilities::POINTERS));
        assert!(!opencl.contains(Capabilities::REFERENCES));
        assert!(!opencl.contains(Capabilities::PRINT));
    }

    #[test]
    fn precision_support() {
        assert!(!Language::Cuda.dialect().supports_precision(Precision::LongDouble));
        assert!(Language::Cpp11.dialect().supports_precision(Precision::LongDouble));
        assert!(!Language::Glsl.dialect().supports_precision(Precision::Double));
    }
}
