use super::{Dialect, Language, Precision};
use crate::{
    codegen::{
        fragment::{FunctionFragment, StdType, TypeFragment},
        stdlib::Library,
    },
    error::Codegen,
};

use std::collections::BTreeMap;

/// Sombreadores GLSL.
///
/// Los vectores y matrices son tipos nativos del lenguaje, de modo que
/// la tabla de tipos no declara nada. Solo existe precisión simple.
#[derive(Copy, Clone, Debug, Default)]
pub struct Glsl;

impl Dialect for Glsl {
    fn language(&self) -> Language {
        Language::Glsl
    }

    fn supports_namespaces(&self) -> bool {
        false
    }

    fn supports_references(&self) -> bool {
        false
    }

    fn supports_pointers(&self) -> bool {
        false
    }

    fn supports_half_type(&self) -> bool {
        false
    }

    fn supports_struct_operators(&self) -> bool {
        true
    }

    fn supports_print(&self) -> bool {
        false
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

    fn uses_out_qualifiers(&self) -> bool {
        true
    }

    fn supports_precision(&self, precision: Precision) -> bool {
        precision == Precision::Float
    }

    fn inline_keyword(&self) -> &'static str {
        ""
    }

    fn function_prefix(&self) -> &'static str {
        ""
    }

    fn begin_cast(&self, ty: &str) -> String {
        format!("{}( ", ty)
    }

    fn swizzle(&self, count: usize) -> Option<&'static str> {
        match count {
            3 => Some(".xyz"),
            _ => None,
        }
    }

    fn precision_function_suffix(&self, _precision: Precision) -> &'static str {
        ""
    }

    fn emits_standard_setup(&self) -> bool {
        false
    }

    fn standard_types(&self, _lib: &Library) -> Codegen<BTreeMap<StdType, TypeFragment>> {
        let builtin = [
            (StdType::Float, "float"),
            (StdType::Vec2f, "vec2"),
            (StdType::Vec2i, "ivec2"),
            (StdType::Vec3f, "vec3"),
            (StdType::Vec3i, "ivec3"),
            (StdType::Vec4f, "vec4"),
            (StdType::Vec4i, "ivec4"),
            (StdType::Mat3f, "mat3"),
            (StdType::Mat4f, "mat4"),
        ];

        Ok(builtin
            .iter()
            .map(|&(key, name)| (key, TypeFragment::new(name, "").with_maker(name)))
            .collect())
    }

    fn print_bodies(&self, _lib: &Library) -> Vec<FunctionFragment> {
        Vec::new()
    }

    fn math_bodies(&self, _lib: &Library) -> Vec<FunctionFragment> {
        let body = |name: &str, text: &str| FunctionFragment::new(name, text.to_owned());

        vec![
            body(
                "mult_f_f3",
                "vec3 mult_f_f3( const float a, const vec3 b ) { return a * b; }",
            ),
            body(
                "mult_f3_f33",
                "vec3 mult_f3_f33( const vec3 a, const mat3 b ) { return b * a; }",
            ),
            body(
                "pow10",
                "float pow10( const float x ) { return pow( 10.0, x ); }",
            ),
            body(
                "log10",
                "float log10( const float x ) { return ( 1.0 / log( 10.0 ) ) * log( x ); }",
            ),
        ]
    }

    fn half_bodies(&self, _lib: &Library) -> Vec<FunctionFragment> {
        Vec::new()
    }

    fn color_bodies(&self, _lib: &Library) -> Vec<FunctionFragment> {
        Vec::new()
    }

    fn interp_bodies(&self, _lib: &Library) -> Codegen<Vec<FunctionFragment>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtin_types_declare_nothing() {
        let lib = Library::new(&Glsl, Precision::Float);
        let types = Glsl.standard_types(&lib).unwrap();

        assert_eq!(types[&StdType::Mat4f].name, "mat4");
        assert!(types.values().all(|fragment| fragment.declare.is_empty()));
    }

    #[test]
    fn casts_and_swizzles() {
        assert_eq!(Glsl.begin_cast("float"), "float( ");
        assert_eq!(Glsl.swizzle(3), Some(".xyz"));
        assert_eq!(Glsl.swizzle(2), None);
    }
}
