use super::{Dialect, Language};

/// C portable, sin namespaces ni referencias.
///
/// Los parámetros de salida se pasan por puntero y los módulos se
/// distinguen con el prefijo `<módulo>_` en cada nombre.
#[derive(Copy, Clone, Debug, Default)]
pub struct C;

impl Dialect for C {
    fn language(&self) -> Language {
        Language::C
    }

    fn supports_namespaces(&self) -> bool {
        false
    }

    fn supports_references(&self) -> bool {
        false
    }

    fn supports_pointers(&self) -> bool {
        true
    }

    fn supports_half_type(&self) -> bool {
        false
    }

    fn supports_struct_operators(&self) -> bool {
        false
    }

    fn needs_module_dynamic_initialization(&self) -> bool {
        false
    }

    fn uses_function_initializers(&self) -> bool {
        true
    }

    fn global_prefix(&self) -> &'static str {
        "static"
    }

    fn standard_includes(&self) -> Vec<&'static str> {
        vec!["math.h", "stdint.h", "limits.h", "float.h", "stdbool.h"]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dialect::Precision;

    #[test]
    fn prefixes_and_casts() {
        assert_eq!(C.namespace_tag("gamma"), "gamma_");
        assert_eq!(C.begin_cast("int"), "(int)( ");
        assert_eq!(C.end_cast(), " )");
        assert_eq!(C.precision_function_suffix(Precision::Float), "f");
        assert!(C.needs_struct_typedefs());
        assert!(C.standard_includes().contains(&"stdbool.h"));
    }
}
