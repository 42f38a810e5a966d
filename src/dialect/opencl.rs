use super::{Dialect, Language, Precision};
use crate::{
    codegen::{
        fragment::{FunctionFragment, StdType, TypeFragment, UsageRecord},
        stdlib::{self, Library},
    },
    error::Codegen,
};

use std::collections::BTreeMap;

/// Kernels OpenCL C.
///
/// Usa los vectores nativos `floatN`/`intN` y define `ctl_number_t`
/// como parte de la tabla de tipos, ya que no hay preámbulo estándar.
#[derive(Copy, Clone, Debug, Default)]
pub struct OpenCl;

impl Dialect for OpenCl {
    fn language(&self) -> Language {
        Language::OpenCl
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

    fn supports_array_initializers(&self) -> bool {
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

    fn supports_precision(&self, precision: Precision) -> bool {
        precision == Precision::Float
    }

    fn function_prefix(&self) -> &'static str {
        ""
    }

    fn const_literal(&self, global: bool) -> &'static str {
        if global {
            "__constant"
        } else {
            "const"
        }
    }

    fn begin_cast(&self, ty: &str) -> String {
        format!("({})(", ty)
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

    fn std_name_overrides(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("HALF_POS_INF", "0x7c00"),
            ("HALF_NEG_INF", "0xfc00"),
            ("HALF_NAN", "0x7c01"),
            ("HALF_MIN", "0x1.0p-14f"),
            ("HALF_MAX", "0x1.ffcp15f"),
        ]
    }

    fn standard_types(&self, lib: &Library) -> Codegen<BTreeMap<StdType, TypeFragment>> {
        let mut types = BTreeMap::new();
        types.insert(
            StdType::Float,
            TypeFragment::new("float", "#define ctl_number_t float"),
        );

        let vectors = [
            (StdType::Vec2f, "float2", "ctl_vec2f_t", Some("make_vec2f")),
            (StdType::Vec3f, "float3", "ctl_vec3f_t", Some("make_vec3f")),
            (StdType::Vec4f, "float4", "ctl_vec4f_t", None),
            (StdType::Vec8f, "float8", "ctl_vec8f_t", None),
            (StdType::Vec2i, "int2", "ctl_vec2i_t", Some("make_vec2i")),
            (StdType::Vec3i, "int3", "ctl_vec3i_t", Some("make_vec3i")),
            (StdType::Vec4i, "int4", "ctl_vec4i_t", None),
            (StdType::Vec8i, "int8", "ctl_vec8i_t", None),
        ];

        for (key, native, alias, maker) in vectors.iter().copied() {
            let mut declare = format!("typedef {} {};", native, alias);
            if let Some(maker) = maker {
                declare += &format!("\n#define {} ({})", maker, native);
            }

            let fragment = TypeFragment::new(native, &declare).with_maker(&format!("({})", native));
            types.insert(key, fragment);
        }

        let matrices = stdlib::c_types(lib);
        for key in [StdType::Mat3f, StdType::Mat4f].iter() {
            if let Some(matrix) = matrices.get(key) {
                types.insert(*key, matrix.clone());
            }
        }

        let chroma = TypeFragment::new(
            "Chromaticities",
            "typedef struct { float2 red; float2 green; float2 blue; float2 white; } Chromaticities;",
        )
        .uses(UsageRecord::standard(&["float2"], &[]));

        types.insert(StdType::Chromaticities, chroma);
        Ok(types)
    }

    fn print_bodies(&self, lib: &Library) -> Vec<FunctionFragment> {
        vec![
            FunctionFragment::new("assert", format!("{}void assert( bool v ) {{}}", lib.func_pref)),
            FunctionFragment::new(
                "print_float",
                format!(
                    "{}void print_float( ctl_number_t v ) {{ printf( \"%f\", v ); }}",
                    lib.func_pref
                ),
            ),
        ]
    }

    fn half_bodies(&self, _lib: &Library) -> Vec<FunctionFragment> {
        Vec::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn native_vectors() {
        let lib = Library::new(&OpenCl, Precision::Float);
        let types = OpenCl.standard_types(&lib).unwrap();

        let vec3 = &types[&StdType::Vec3f];
        assert_eq!(vec3.name, "float3");
        assert_eq!(vec3.maker, "(float3)");
        assert_eq!(vec3.declare, "typedef float3 ctl_vec3f_t;\n#define make_vec3f (float3)");

        assert_eq!(types[&StdType::Float].declare, "#define ctl_number_t float");
        assert_eq!(types[&StdType::Mat3f].maker, "make_mat33f");
    }

    #[test]
    fn constant_address_space() {
        assert_eq!(OpenCl.const_literal(true), "__constant");
        assert_eq!(OpenCl.const_literal(false), "const");
        assert_eq!(OpenCl.begin_cast("float"), "(float)(");
    }
}
