use super::{Dialect, Language};
use crate::{
    codegen::{
        fragment::{FunctionFragment, StdType, TypeFragment, UsageRecord},
        stdlib::Library,
    },
    error::Codegen,
};

use std::collections::BTreeMap;

const LANES: [&str; 4] = ["x", "y", "z", "w"];

/// C++03, C++11 y el dialecto de plugins de Nuke.
///
/// Solo C++11 inicializa globales directamente con llamadas; los demás
/// difieren esas inicializaciones a un constructor estático por
/// módulo.
#[derive(Copy, Clone, Debug)]
pub struct Cpp {
    language: Language,
}

impl Cpp {
    pub fn new(language: Language) -> Self {
        Cpp { language }
    }

    fn is_cpp11(&self) -> bool {
        self.language == Language::Cpp11
    }
}

impl Dialect for Cpp {
    fn language(&self) -> Language {
        self.language
    }

    fn supports_namespaces(&self) -> bool {
        true
    }

    fn supports_references(&self) -> bool {
        true
    }

    fn supports_half_type(&self) -> bool {
        true
    }

    fn supports_struct_operators(&self) -> bool {
        true
    }

    fn needs_module_dynamic_initialization(&self) -> bool {
        true
    }

    fn uses_function_initializers(&self) -> bool {
        !self.is_cpp11()
    }

    fn namespace_tag(&self, module: &str) -> String {
        format!("{}::", module)
    }

    fn begin_cast(&self, ty: &str) -> String {
        format!("static_cast<{}>( ", ty)
    }

    fn standard_includes(&self) -> Vec<&'static str> {
        let mut includes = vec!["math.h", "stdint.h", "limits.h", "float.h", "half.h"];
        includes.extend_from_slice(&["iostream", "stdexcept"]);
        includes
    }

    fn standard_types(&self, lib: &Library) -> Codegen<BTreeMap<StdType, TypeFragment>> {
        Ok(cpp_types(lib))
    }

    fn print_bodies(&self, lib: &Library) -> Vec<FunctionFragment> {
        cpp_print_bodies(lib)
    }
}

/// Tabla de tipos con constructores y `operator[]`.
pub(crate) fn cpp_types(lib: &Library) -> BTreeMap<StdType, TypeFragment> {
    let mut types = BTreeMap::new();

    let vectors = [
        (StdType::Vec2f, "ctl_vec2f_t", "make_vec2f", "ctl_number_t", 2),
        (StdType::Vec2i, "ctl_vec2i_t", "make_vec2i", "int", 2),
        (StdType::Vec3f, "ctl_vec3f_t", "make_vec3f", "ctl_number_t", 3),
        (StdType::Vec3i, "ctl_vec3i_t", "make_vec3i", "int", 3),
        (StdType::Vec4f, "ctl_vec4f_t", "make_vec4f", "ctl_number_t", 4),
        (StdType::Vec4i, "ctl_vec4i_t", "make_vec4i", "int", 4),
    ];

    for (key, name, maker, scalar, lanes) in vectors.iter().copied() {
        types.insert(key, vector(lib, name, maker, scalar, lanes));
    }

    types.insert(StdType::Mat3f, matrix("ctl_mat33f_t", 3));
    types.insert(StdType::Mat4f, matrix("ctl_mat44f_t", 4));

    let aggregates = [
        (StdType::Chromaticities, "Chromaticities", "ctl_vec2f_t", &["red", "green", "blue", "white"][..]),
        (StdType::Box2i, "Box2i", "ctl_vec2i_t", &["min", "max"][..]),
        (StdType::Box2f, "Box2f", "ctl_vec2f_t", &["min", "max"][..]),
    ];

    for (key, name, member_type, members) in aggregates.iter().copied() {
        let members: String = members
            .iter()
            .map(|member| format!(" {} {};", member_type, member))
            .collect();

        let declare = format!("struct {} {{{} }};", name, members);
        let fragment = TypeFragment::new(name, &declare)
            .with_maker(name)
            .uses(UsageRecord::standard(&[member_type], &[]));

        types.insert(key, fragment);
    }

    types
}

fn vector(lib: &Library, name: &str, maker: &str, scalar: &str, lanes: usize) -> TypeFragment {
    let lanes = &LANES[..lanes];
    let args = ["a", "b", "c", "d"];

    let zeros = lanes
        .iter()
        .map(|lane| format!("{}( 0 )", lane))
        .collect::<Vec<_>>()
        .join(", ");

    let params = args[..lanes.len()]
        .iter()
        .map(|arg| format!("{} {}", scalar, arg))
        .collect::<Vec<_>>()
        .join(", ");

    let inits = lanes
        .iter()
        .zip(args.iter())
        .map(|(lane, arg)| format!("{}( {} )", lane, arg))
        .collect::<Vec<_>>()
        .join(", ");

    let fields: String = lanes
        .iter()
        .map(|lane| format!("            {} {};\n", scalar, lane))
        .collect();

    let mut declare = format!("struct {}\n{{\n", name);
    declare += &format!("    inline {}( void ) : {} {{}}\n", name, zeros);
    declare += &format!("    inline {}( {} ) : {} {{}}\n", name, params, inits);
    declare += &format!("    inline {} &operator[]( int i ) {{ return vals[i]; }}\n", scalar);
    declare += &format!("    inline {} operator[]( int i ) const {{ return vals[i]; }}\n", scalar);
    declare += "    union\n    {\n";
    declare += &format!("        {} vals[{}];\n", scalar, lanes.len());
    declare += "        struct\n        {\n";
    declare += &fields;
    declare += "        };\n    };\n};";

    let maker_params = lanes
        .iter()
        .map(|lane| format!("{} {}", scalar, lane))
        .collect::<Vec<_>>()
        .join(", ");

    let constfunc = format!(
        "{}{} {}( {} ) {{ return {}( {} ); }}",
        lib.func_pref,
        name,
        maker,
        maker_params,
        name,
        lanes.join(", ")
    );

    TypeFragment::new(name, &declare)
        .with_maker(name)
        .with_constructor(constfunc)
}

fn matrix(name: &str, order: usize) -> TypeFragment {
    let cells: Vec<(usize, usize)> = (0..order)
        .flat_map(|i| (0..order).map(move |j| (i, j)))
        .collect();

    let params = cells
        .iter()
        .map(|(i, j)| format!("ctl_number_t m{}{}", i, j))
        .collect::<Vec<_>>()
        .join(", ");

    let stores: String = cells
        .iter()
        .map(|(i, j)| format!(" vals[{i}][{j}] = m{i}{j};", i = i, j = j))
        .collect();

    let mut declare = format!("struct {}\n{{\n", name);
    declare += &format!("    inline {}( void ) {{ identity(); }}\n", name);
    declare += &format!("    inline {}( {} ) {{{} }}\n", name, params, stores);
    declare += "    inline void identity( void )\n    {\n";
    declare += &format!("        for ( int i = 0; i < {}; ++i )\n", order);
    declare += &format!("            for ( int j = 0; j < {}; ++j )\n", order);
    declare += "                vals[i][j] = (i == j) ? ctl_number_t( 1 ) : ctl_number_t( 0 );\n";
    declare += "    }\n";
    declare += "    inline ctl_number_t *operator[]( int i ) { return vals[i]; }\n";
    declare += "    inline const ctl_number_t *operator[]( int i ) const { return vals[i]; }\n";
    declare += &format!("    ctl_number_t vals[{}][{}];\n}};", order, order);

    TypeFragment::new(name, &declare).with_maker(name)
}

fn cpp_print_bodies(lib: &Library) -> Vec<FunctionFragment> {
    let pref = &lib.func_pref;
    let body = |name: &str, text: &str| FunctionFragment::new(name, format!("{}{}", pref, text));

    vec![
        body(
            "assert",
            "void assert( bool v ) { if ( !v ) throw std::logic_error( \"Assertion failure\" ); }",
        ),
        body(
            "print_bool",
            "void print_bool( bool v ) { std::cout << ( v ? \"true\" : \"false\" ); }",
        ),
        body("print_int", "void print_int( int v ) { std::cout << v; }"),
        body(
            "print_unsigned_int",
            "void print_unsigned_int( unsigned int v ) { std::cout << v; }",
        ),
        body("print_half", "void print_half( const half &v ) { std::cout << v; }"),
        body("print_float", "void print_float( ctl_number_t v ) { std::cout << v; }"),
        FunctionFragment::new(
            "print_string",
            format!(
                "{pref}void print_string( const char *v ) {{ std::cout << v; }}\n\
                 {pref}void print_string( const std::string &v ) {{ std::cout << v; }}",
                pref = pref
            ),
        ),
    ]
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dialect::Precision;

    #[test]
    fn vector_types_have_constructors() {
        let dialect = Cpp::new(Language::Cpp03);
        let lib = Library::new(&dialect, Precision::Float);
        let types = dialect.standard_types(&lib).unwrap();

        let vec3i = &types[&StdType::Vec3i];
        assert_eq!(vec3i.maker, "ctl_vec3i_t");
        assert!(vec3i
            .declare
            .contains("inline ctl_vec3i_t( int a, int b, int c ) : x( a ), y( b ), z( c ) {}"));
        assert!(vec3i
            .constfunc
            .ends_with("ctl_vec3i_t make_vec3i( int x, int y, int z ) { return ctl_vec3i_t( x, y, z ); }"));

        let chroma = &types[&StdType::Chromaticities];
        assert_eq!(
            chroma.declare,
            "struct Chromaticities { ctl_vec2f_t red; ctl_vec2f_t green; ctl_vec2f_t blue; ctl_vec2f_t white; };"
        );
        assert!(chroma.usage.module(None).unwrap().types.contains("ctl_vec2f_t"));
    }

    #[test]
    fn matrix_identity_default() {
        let mat = matrix("ctl_mat33f_t", 3);
        assert!(mat.declare.contains("inline ctl_mat33f_t( void ) { identity(); }"));
        assert!(mat.declare.contains("vals[2][2] = m22;"));
        assert!(mat.declare.ends_with("ctl_number_t vals[3][3];\n};"));
    }

    #[test]
    fn print_goes_to_stdout() {
        let dialect = Cpp::new(Language::Cpp11);
        let lib = Library::new(&dialect, Precision::Double);
        let bodies = dialect.print_bodies(&lib);

        assert!(bodies.iter().any(|body| body.name == "print_half"));
        let string = bodies.iter().find(|body| body.name == "print_string").unwrap();
        assert!(string.body.contains("const std::string &v"));
    }
}
