use super::{cpp, Dialect, Language, Precision};
use crate::{
    codegen::{
        fragment::{StdType, TypeFragment},
        stdlib::Library,
    },
    error::Codegen,
};

use std::collections::BTreeMap;

/// Código de dispositivo CUDA.
///
/// Comparte la tabla de tipos de C++ pero no tiene namespaces ni
/// inicialización dinámica, y no admite `long double`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Cuda;

impl Dialect for Cuda {
    fn language(&self) -> Language {
        Language::Cuda
    }

    fn supports_namespaces(&self) -> bool {
        false
    }

    fn supports_references(&self) -> bool {
        true
    }

    fn supports_half_type(&self) -> bool {
        false
    }

    fn supports_struct_operators(&self) -> bool {
        true
    }

    fn needs_module_dynamic_initialization(&self) -> bool {
        false
    }

    fn uses_function_initializers(&self) -> bool {
        false
    }

    fn needs_struct_typedefs(&self) -> bool {
        false
    }

    fn supports_precision(&self, precision: Precision) -> bool {
        precision != Precision::LongDouble
    }

    fn inline_keyword(&self) -> &'static str {
        "__inline__"
    }

    fn function_prefix(&self) -> &'static str {
        "__device__"
    }

    fn global_prefix(&self) -> &'static str {
        "__device__"
    }

    fn standard_includes(&self) -> Vec<&'static str> {
        vec!["math.h", "stdint.h", "limits.h", "float.h", "iostream", "stdexcept"]
    }

    fn standard_types(&self, lib: &Library) -> Codegen<BTreeMap<StdType, TypeFragment>> {
        Ok(cpp::cpp_types(lib))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn device_prefixes() {
        let lib = Library::new(&Cuda, Precision::Float);
        assert_eq!(lib.func_pref, "__device__ __inline__\n");
        assert_eq!(Cuda.begin_cast("int"), "(int)( ");
        assert_eq!(Cuda.namespace_tag("m"), "m_");
    }

    #[test]
    fn print_bodies_are_empty_stubs() {
        let lib = Library::new(&Cuda, Precision::Float);
        let bodies = Cuda.print_bodies(&lib);

        assert!(bodies.iter().all(|body| body.body.ends_with("{}")));
        assert!(!bodies.iter().any(|body| body.name == "print_half"));
    }
}
