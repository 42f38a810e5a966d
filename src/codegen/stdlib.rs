//! Fabricación de la biblioteca estándar de CTL.
//!
//! La biblioteca es un módulo sintético cuyos fragmentos son texto
//! fijo parametrizado por el dialecto y la precisión. Cada fragmento
//! declara en su registro de uso todo tipo y función de la biblioteca
//! que su texto referencia, de modo que el cierre de emisión trata a
//! la biblioteca igual que al código de usuario.

use super::fragment::{FunctionFragment, ModuleDefinition, StdType, TypeFragment, UsageRecord};
use crate::{
    dialect::{Dialect, Precision},
    error::{Codegen, CodegenError},
};

use std::collections::{BTreeMap, HashMap};

/// Nombre del módulo sintético.
pub const STD_MODULE: &str = "ctlcc";

/// Namespace o prefijo de la biblioteca.
pub const STD_NAMESPACE: &str = "_ctlcc_";

/// Parámetros de fabricación de los cuerpos.
#[derive(Clone, Debug)]
pub struct Library {
    pub precision: Precision,

    /// Prefijo de cada función, ya con salto de línea.
    pub func_pref: String,

    /// Sufijo de funciones de `math.h`.
    pub prec_suffix: &'static str,

    pub references: bool,
    pub half: bool,

    /// Épsilon de la precisión activa, p. ej. `FLT_EPSILON`.
    pub flt_epsilon: String,
}

impl Library {
    pub fn new(dialect: &dyn Dialect, precision: Precision) -> Self {
        let keywords: Vec<&str> = [dialect.function_prefix(), dialect.inline_keyword()]
            .iter()
            .copied()
            .filter(|keyword| !keyword.is_empty())
            .collect();

        let func_pref = if keywords.is_empty() {
            String::new()
        } else {
            format!("{}\n", keywords.join(" "))
        };

        Library {
            precision,
            func_pref,
            prec_suffix: dialect.precision_function_suffix(precision),
            references: dialect.supports_references(),
            half: dialect.supports_half_type(),
            flt_epsilon: format!("{}_EPSILON", constant_prefix(precision)),
        }
    }

    /// Tipo de un argumento de solo lectura.
    fn arg(&self, ty: &str) -> String {
        if self.references {
            format!("const {} &", ty)
        } else {
            format!("{} ", ty)
        }
    }

    /// Sustituye marcadores en el texto de un cuerpo.
    fn expand(&self, text: &str) -> String {
        let text = text
            .replace("$VEC3 ", &self.arg("ctl_vec3f_t"))
            .replace("$IVEC3 ", &self.arg("ctl_vec3i_t"))
            .replace("$M33 ", &self.arg("ctl_mat33f_t"))
            .replace("$M44 ", &self.arg("ctl_mat44f_t"))
            .replace("$CHROMA ", &self.arg("Chromaticities"))
            .replace("$EPS", &self.flt_epsilon)
            .replace("$S", self.prec_suffix);

        format!("{}{}", self.func_pref, text)
    }

    fn body(&self, name: &str, text: &str) -> FunctionFragment {
        FunctionFragment::new(name, self.expand(text))
    }
}

fn constant_prefix(precision: Precision) -> &'static str {
    match precision {
        Precision::Float => "FLT",
        Precision::Double => "DBL",
        Precision::LongDouble => "LDBL",
    }
}

/// Funciones de CTL que se traducen a `math.h`.
pub fn std_math(dialect: &dyn Dialect, precision: Precision) -> HashMap<String, String> {
    let suffix = dialect.precision_function_suffix(precision);
    let mut names = HashMap::new();

    for (ctl, native) in &[
        ("isfinite_f", "isfinite"),
        ("isnormal_f", "isnormal"),
        ("isnan_f", "isnan"),
        ("isinf_f", "isinf"),
        ("min", "min"),
        ("max", "max"),
        ("min3", "min"),
        ("max3", "max"),
        ("pow3", "pow"),
    ] {
        names.insert(ctl.to_string(), native.to_string());
    }

    for name in &[
        "acos", "asin", "atan", "atan2", "cos", "sin", "tan", "cosh", "sinh", "tanh", "exp", "log",
        "log10", "pow", "sqrt", "fabs", "floor", "fmod", "hypot",
    ] {
        names.insert(name.to_string(), format!("{}{}", name, suffix));
    }

    names
}

/// Constantes de CTL con su traducción por precisión.
pub fn std_names(dialect: &dyn Dialect, precision: Precision) -> HashMap<String, String> {
    let prefix = constant_prefix(precision);
    let (float_suffix, math_suffix) = match precision {
        Precision::Float => ("F", ""),
        Precision::Double => ("", ""),
        Precision::LongDouble => ("L", "l"),
    };

    let suffix = dialect.precision_function_suffix(precision);
    let mut names = HashMap::new();
    let mut name = |ctl: &str, native: String| {
        names.insert(ctl.to_owned(), native);
    };

    name("M_E", format!("M_E{}", math_suffix));
    name("M_PI", format!("M_PI{}", math_suffix));
    name("FLT_MAX", format!("{}_MAX", prefix));
    name("FLT_MIN", format!("{}_MIN", prefix));
    name("FLT_EPSILON", format!("{}_EPSILON", prefix));
    name("FLT_POS_INF", format!("HUGE_VAL{}", float_suffix));
    name("FLT_NEG_INF", format!("(-HUGE_VAL{})", float_suffix));
    name("FLT_NAN", format!("__builtin_nan{}(\"\")", suffix));
    name("HALF_POS_INF", "half::posInf()".to_owned());
    name("HALF_NEG_INF", "half::negInf()".to_owned());
    name("HALF_NAN", "half::qNan()".to_owned());

    for same in &[
        "HALF_MAX",
        "HALF_MIN",
        "HALF_EPSILON",
        "INT_MAX",
        "INT_MIN",
        "UINT_MAX",
    ] {
        name(*same, same.to_string());
    }

    for (ctl, native) in dialect.std_name_overrides() {
        name(ctl, native.to_owned());
    }

    names
}

/// Construye el módulo de la biblioteca estándar.
pub fn build_standard_library(dialect: &dyn Dialect, precision: Precision) -> Codegen<ModuleDefinition> {
    let lib = Library::new(dialect, precision);
    let mut module = ModuleDefinition::new(STD_MODULE, None);

    module.prefix = format!(
        "\n{} Auto-generated standard library of CTL functions{}\n",
        dialect.begin_comment(),
        dialect.end_comment()
    );

    if dialect.supports_namespaces() {
        module.prefix += &format!("namespace {} {{\n", STD_NAMESPACE);
        module.suffix = format!("\n}} // namespace {}\n", STD_NAMESPACE);
    } else {
        module.call_prefix = STD_NAMESPACE.to_owned();
    }

    module.types = dialect.standard_types(&lib)?;

    let functions = &mut module.functions;
    functions.extend(dialect.print_bodies(&lib));
    functions.extend(dialect.math_bodies(&lib));
    functions.extend(dialect.half_bodies(&lib));
    functions.extend(dialect.color_bodies(&lib));
    functions.extend(dialect.interp_bodies(&lib)?);

    // Si la tabla define el escalar, todo el texto de la biblioteca
    // depende de esa definición
    let number = module
        .types
        .get(&StdType::Float)
        .filter(|fragment| !fragment.declare.is_empty())
        .map(|fragment| fragment.name.clone());

    if let Some(number) = number {
        for (key, fragment) in module.types.iter_mut() {
            if *key != StdType::Float {
                fragment.usage.record_type(None, &number);
            }
        }

        for function in module.functions.iter_mut() {
            function.usage.record_type(None, &number);
        }
    }

    Ok(module)
}

fn c_vector(lib: &Library, name: &str, maker: &str, scalar: &str, lanes: &[&str]) -> TypeFragment {
    let fields: String = lanes
        .iter()
        .map(|lane| format!("            {} {};\n", scalar, lane))
        .collect();

    let declare = format!(
        "typedef struct {name}\n{{\n    union\n    {{\n        {scalar} vals[{count}];\n        struct\n        {{\n{fields}        }};\n    }};\n}} {name};",
        name = name,
        scalar = scalar,
        count = lanes.len(),
        fields = fields
    );

    let params = lanes
        .iter()
        .map(|lane| format!("{} {}", scalar, lane))
        .collect::<Vec<_>>()
        .join(", ");

    let stores: String = lanes
        .iter()
        .map(|lane| format!(" r.{lane} = {lane};", lane = lane))
        .collect();

    let constfunc = format!(
        "{}{} {}( {} )\n{{ {} r;{} return r; }}",
        lib.func_pref, name, maker, params, name, stores
    );

    TypeFragment::new(name, &declare)
        .with_maker(maker)
        .with_constructor(constfunc)
}

fn c_matrix(lib: &Library, name: &str, maker: &str, order: usize) -> TypeFragment {
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
        .map(|(i, j)| format!("    r.vals[{i}][{j}] = m{i}{j};\n", i = i, j = j))
        .collect();

    let declare = format!(
        "typedef struct {name} {{ ctl_number_t vals[{n}][{n}]; }} {name};",
        name = name,
        n = order
    );

    let constfunc = format!(
        "{}{} {}( {} )\n{{\n    {} r;\n{}    return r;\n}}",
        lib.func_pref, name, maker, params, name, stores
    );

    TypeFragment::new(name, &declare)
        .with_maker(maker)
        .with_constructor(constfunc)
}

/// Tabla de tipos de dialectos tipo C sin operadores.
pub fn c_types(lib: &Library) -> BTreeMap<StdType, TypeFragment> {
    let xy = ["x", "y"];
    let xyz = ["x", "y", "z"];
    let xyzw = ["x", "y", "z", "w"];

    let mut types = BTreeMap::new();
    let vectors: [(StdType, &str, &str, &str, &[&str]); 6] = [
        (StdType::Vec2f, "ctl_vec2f_t", "make_vec2f", "ctl_number_t", &xy),
        (StdType::Vec2i, "ctl_vec2i_t", "make_vec2i", "int", &xy),
        (StdType::Vec3f, "ctl_vec3f_t", "make_vec3f", "ctl_number_t", &xyz),
        (StdType::Vec3i, "ctl_vec3i_t", "make_vec3i", "int", &xyz),
        (StdType::Vec4f, "ctl_vec4f_t", "make_vec4f", "ctl_number_t", &xyzw),
        (StdType::Vec4i, "ctl_vec4i_t", "make_vec4i", "int", &xyzw),
    ];

    for (key, name, maker, scalar, lanes) in vectors.iter() {
        types.insert(*key, c_vector(lib, name, maker, scalar, lanes));
    }

    types.insert(StdType::Mat3f, c_matrix(lib, "ctl_mat33f_t", "make_mat33f", 3));
    types.insert(StdType::Mat4f, c_matrix(lib, "ctl_mat44f_t", "make_mat44f", 4));

    let aggregates: [(StdType, &str, &str, &[&str]); 3] = [
        (StdType::Chromaticities, "Chromaticities", "ctl_vec2f_t", &["red", "green", "blue", "white"]),
        (StdType::Box2i, "Box2i", "ctl_vec2i_t", &["min", "max"]),
        (StdType::Box2f, "Box2f", "ctl_vec2f_t", &["min", "max"]),
    ];

    for (key, name, member_type, members) in aggregates.iter() {
        let members: String = members
            .iter()
            .map(|member| format!(" {} {};", member_type, member))
            .collect();

        let declare = format!("typedef struct {name} {{{members} }} {name};", name = name, members = members);
        let fragment = TypeFragment::new(name, &declare).uses(UsageRecord::standard(&[*member_type], &[]));
        types.insert(*key, fragment);
    }

    types
}

pub fn c_print_bodies(lib: &Library) -> Vec<FunctionFragment> {
    let mut bodies = vec![
        lib.body("assert", "void assert( bool v ) {}"),
        lib.body("print_bool", "void print_bool( bool v ) {}"),
        lib.body("print_int", "void print_int( int v ) {}"),
        lib.body("print_unsigned_int", "void print_unsigned_int( unsigned int v ) {}"),
    ];

    if lib.half {
        bodies.push(lib.body("print_half", "void print_half( half v ) {}"));
    }

    bodies.push(lib.body("print_float", "void print_float( ctl_number_t v ) {}"));
    bodies.push(lib.body("print_string", "void print_string( const char *v ) {}"));
    bodies
}

pub fn c_math_bodies(lib: &Library) -> Vec<FunctionFragment> {
    let mat33 = &["ctl_mat33f_t"][..];
    let mat44 = &["ctl_mat44f_t"][..];
    let vec3 = &["ctl_vec3f_t"][..];

    let mut bodies = vec![
        lib.body(
            "pow10",
            "ctl_number_t pow10( ctl_number_t y ) { return pow$S( (ctl_number_t)( 10.0 ), y ); }",
        ),
        lib.body("_min_i", "int _min_i( int a, int b ) { return a < b ? a : b; }"),
        lib.body(
            "_clamp",
            "ctl_number_t _clamp( ctl_number_t v, ctl_number_t low, ctl_number_t high ) { return fmax$S( low, fmin$S( v, high ) ); }",
        ),
        lib.body(
            "_lerp",
            "ctl_number_t _lerp( ctl_number_t a, ctl_number_t b, ctl_number_t mix ) { return a + mix * ( b - a ); }",
        ),
        lib.body("_lerp_f3", LERP_F3)
            .uses(UsageRecord::standard(vec3, &["_lerp"])),
        lib.body("mult_f33_f33", MULT_F33_F33)
            .uses(UsageRecord::standard(mat33, &[])),
        lib.body("mult_f_f33", MULT_F_F33)
            .uses(UsageRecord::standard(mat33, &[])),
        lib.body("add_f33_f33", ADD_F33_F33)
            .uses(UsageRecord::standard(mat33, &[])),
        lib.body("invert_f33", INVERT_F33)
            .uses(UsageRecord::standard(mat33, &["assert"])),
        lib.body("transpose_f33", TRANSPOSE_F33)
            .uses(UsageRecord::standard(mat33, &[])),
        lib.body("mult_f3_f33", MULT_F3_F33)
            .uses(UsageRecord::standard(&["ctl_vec3f_t", "ctl_mat33f_t"], &[])),
    ];

    let vector_ops = [
        ("mult_f_f3", MULT_F_F3),
        ("add_f3_f3", ADD_F3_F3),
        ("sub_f3_f3", SUB_F3_F3),
        ("cross_f3_f3", CROSS_F3_F3),
        ("dot_f3_f3", DOT_F3_F3),
        ("length_f3", LENGTH_F3),
    ];

    for (name, text) in vector_ops.iter() {
        bodies.push(lib.body(name, text).uses(UsageRecord::standard(vec3, &[])));
    }

    bodies.extend(vec![
        lib.body("mult_f44_f44", MULT_F44_F44)
            .uses(UsageRecord::standard(mat44, &[])),
        lib.body("mult_f_f44", MULT_F_F44)
            .uses(UsageRecord::standard(mat44, &[])),
        lib.body("add_f44_f44", ADD_F44_F44)
            .uses(UsageRecord::standard(mat44, &[])),
        lib.body("invert_f44", INVERT_F44)
            .uses(UsageRecord::standard(mat44, &["assert"])),
        lib.body("transpose_f44", TRANSPOSE_F44)
            .uses(UsageRecord::standard(mat44, &[])),
        lib.body("mult_f3_f44", MULT_F3_F44)
            .uses(UsageRecord::standard(&["ctl_vec3f_t", "ctl_mat44f_t"], &[])),
    ]);

    bodies
}

pub fn c_half_bodies(lib: &Library) -> Vec<FunctionFragment> {
    vec![
        lib.body(
            "exp_h",
            "half exp_h( ctl_number_t v ) { return half( float( exp$S( v ) ) ); }",
        ),
        lib.body(
            "log_h",
            "ctl_number_t log_h( half v ) { return log$S( float( v ) ); }",
        ),
        lib.body(
            "log10_h",
            "ctl_number_t log10_h( half v ) { return log10$S( float( v ) ); }",
        ),
        lib.body(
            "pow_h",
            "half pow_h( half x, ctl_number_t y ) { return half( float( pow$S( float( x ), y ) ) ); }",
        ),
        lib.body(
            "pow10_h",
            "half pow10_h( ctl_number_t y ) { return half( float( pow$S( 10.0, y ) ) ); }",
        ),
        lib.body("isfinite_h", "bool isfinite_h( half v ) { return v.isFinite(); }"),
        lib.body("isnormal_h", "bool isnormal_h( half v ) { return v.isNormalized(); }"),
        lib.body("isnan_h", "bool isnan_h( half v ) { return v.isNan(); }"),
        lib.body("isinf_h", "bool isinf_h( half v ) { return v.isInfinity(); }"),
    ]
}

pub fn c_color_bodies(lib: &Library) -> Vec<FunctionFragment> {
    let vec3 = &["ctl_vec3f_t"][..];
    let chroma = &["ctl_mat44f_t", "Chromaticities"][..];

    vec![
        lib.body("_cspace_f", CSPACE_F),
        lib.body("_cspace_fInverse", CSPACE_F_INVERSE),
        lib.body(
            "_cspace_uprime",
            "ctl_number_t _cspace_uprime( $VEC3 XYZ ) { return ( XYZ.x * (ctl_number_t)( 4 ) ) / ( XYZ.x + (ctl_number_t)( 15 ) * XYZ.y + (ctl_number_t)( 3 ) * XYZ.z ); }",
        )
        .uses(UsageRecord::standard(vec3, &[])),
        lib.body(
            "_cspace_vprime",
            "ctl_number_t _cspace_vprime( $VEC3 XYZ ) { return ( XYZ.y * (ctl_number_t)( 9 ) ) / ( XYZ.x + (ctl_number_t)( 15 ) * XYZ.y + (ctl_number_t)( 3 ) * XYZ.z ); }",
        )
        .uses(UsageRecord::standard(vec3, &[])),
        lib.body("RGBtoXYZ", RGB_TO_XYZ)
            .uses(UsageRecord::standard(chroma, &[])),
        lib.body(
            "XYZtoRGB",
            "ctl_mat44f_t XYZtoRGB( $CHROMA chroma, ctl_number_t Y ) { return invert_f44( RGBtoXYZ( chroma, Y ) ); }",
        )
        .uses(UsageRecord::standard(chroma, &["invert_f44", "RGBtoXYZ"])),
        lib.body("XYZtoLuv", XYZ_TO_LUV).uses(UsageRecord::standard(
            vec3,
            &["_cspace_f", "_cspace_uprime", "_cspace_vprime"],
        )),
        lib.body("LuvtoXYZ", LUV_TO_XYZ).uses(UsageRecord::standard(
            vec3,
            &["_cspace_fInverse", "_cspace_uprime", "_cspace_vprime"],
        )),
        lib.body("XYZtoLab", XYZ_TO_LAB)
            .uses(UsageRecord::standard(vec3, &["_cspace_f"])),
        lib.body("LabtoXYZ", LAB_TO_XYZ)
            .uses(UsageRecord::standard(vec3, &["_cspace_fInverse"])),
    ]
}

pub fn c_interp_bodies(lib: &Library) -> Codegen<Vec<FunctionFragment>> {
    let lookup_vectors = &["ctl_vec3f_t", "ctl_vec3i_t"][..];

    let mut bodies = vec![
        lib.body("lookup1D", LOOKUP_1D)
            .uses(UsageRecord::standard(&[], &["_clamp", "_min_i", "_lerp"])),
        lib.body("lookupCubic1D", LOOKUP_CUBIC_1D)
            .uses(UsageRecord::standard(&[], &["_clamp", "lookup1D"])),
        lib.body("lookup3D_f3", LOOKUP_3D_F3).uses(UsageRecord::standard(
            lookup_vectors,
            &["_clamp", "_min_i", "_lerp_f3", "make_vec3f"],
        )),
    ];

    let lookup3d_f = if lib.references {
        LOOKUP_3D_F_REFERENCES
    } else {
        LOOKUP_3D_F_POINTERS
    };

    bodies.push(
        lib.body("lookup3D_f", lookup3d_f)
            .uses(UsageRecord::standard(lookup_vectors, &["lookup3D_f3"])),
    );

    if lib.half {
        if !lib.references {
            return Err(CodegenError::HalfWithoutReferences.into());
        }

        bodies.push(
            lib.body("lookup3D_h", LOOKUP_3D_H)
                .uses(UsageRecord::standard(lookup_vectors, &["lookup3D_f3"])),
        );
    }

    bodies.push(
        lib.body("interpolate1D", INTERPOLATE_1D)
            .uses(UsageRecord::standard(&[], &["_lerp"])),
    );

    bodies.push(
        lib.body("interpolateCubic1D", INTERPOLATE_CUBIC_1D)
            .uses(UsageRecord::standard(&[], &["interpolate1D"])),
    );

    Ok(bodies)
}

const LERP_F3: &str = "ctl_vec3f_t _lerp_f3( $VEC3 a, $VEC3 b, ctl_number_t mix )
{
    ctl_vec3f_t r;
    r.x = _lerp( a.x, b.x, mix );
    r.y = _lerp( a.y, b.y, mix );
    r.z = _lerp( a.z, b.z, mix );
    return r;
}";

const MULT_F33_F33: &str = "ctl_mat33f_t mult_f33_f33( $M33 a, $M33 b )
{
    ctl_mat33f_t r;
    int i, j;
    for ( i = 0; i < 3; ++i )
        for ( j = 0; j < 3; ++j )
            r.vals[i][j] = a.vals[i][0] * b.vals[0][j] + a.vals[i][1] * b.vals[1][j] + a.vals[i][2] * b.vals[2][j];
    return r;
}";

const MULT_F_F33: &str = "ctl_mat33f_t mult_f_f33( ctl_number_t a, $M33 b )
{
    ctl_mat33f_t r;
    int i, j;
    for ( i = 0; i < 3; ++i )
        for ( j = 0; j < 3; ++j )
            r.vals[i][j] = a * b.vals[i][j];
    return r;
}";

const ADD_F33_F33: &str = "ctl_mat33f_t add_f33_f33( $M33 a, $M33 b )
{
    ctl_mat33f_t r;
    int i, j;
    for ( i = 0; i < 3; ++i )
        for ( j = 0; j < 3; ++j )
            r.vals[i][j] = a.vals[i][j] + b.vals[i][j];
    return r;
}";

const INVERT_F33: &str = "ctl_mat33f_t invert_f33( $M33 a )
{
    ctl_mat33f_t r;
    ctl_number_t det = a.vals[0][0] * a.vals[1][1] * a.vals[2][2] + a.vals[0][1] * a.vals[1][2] * a.vals[2][0] + a.vals[0][2] * a.vals[1][0] * a.vals[2][1] - a.vals[2][0] * a.vals[1][1] * a.vals[0][2] - a.vals[2][1] * a.vals[1][2] * a.vals[0][0] - a.vals[2][2] * a.vals[1][0] * a.vals[0][1];
    if ( fabs$S( det ) > $EPS )
    {
        det = (ctl_number_t)( 1.0 ) / det;
        r.vals[0][0] = ( a.vals[1][1] * a.vals[2][2] - a.vals[1][2] * a.vals[2][1] ) * det;
        r.vals[0][1] = ( a.vals[0][2] * a.vals[2][1] - a.vals[0][1] * a.vals[2][2] ) * det;
        r.vals[0][2] = ( a.vals[0][1] * a.vals[1][2] - a.vals[0][2] * a.vals[1][1] ) * det;
        r.vals[1][0] = ( a.vals[1][2] * a.vals[2][0] - a.vals[1][0] * a.vals[2][2] ) * det;
        r.vals[1][1] = ( a.vals[0][0] * a.vals[2][2] - a.vals[0][2] * a.vals[2][0] ) * det;
        r.vals[1][2] = ( a.vals[0][2] * a.vals[1][0] - a.vals[0][0] * a.vals[1][2] ) * det;
        r.vals[2][0] = ( a.vals[1][0] * a.vals[2][1] - a.vals[1][1] * a.vals[2][0] ) * det;
        r.vals[2][1] = ( a.vals[0][1] * a.vals[2][0] - a.vals[0][0] * a.vals[2][1] ) * det;
        r.vals[2][2] = ( a.vals[0][0] * a.vals[1][1] - a.vals[0][1] * a.vals[1][0] ) * det;
    }
    else
    {
        int i, j;
        assert( false );
        for ( i = 0; i < 3; ++i )
            for ( j = 0; j < 3; ++j )
                r.vals[i][j] = i == j ? (ctl_number_t)( 1 ) : (ctl_number_t)( 0 );
    }
    return r;
}";

const TRANSPOSE_F33: &str = "ctl_mat33f_t transpose_f33( $M33 a )
{
    ctl_mat33f_t r;
    int i, j;
    for ( i = 0; i < 3; ++i )
        for ( j = 0; j < 3; ++j )
            r.vals[j][i] = a.vals[i][j];
    return r;
}";

const MULT_F3_F33: &str = "ctl_vec3f_t mult_f3_f33( $VEC3 a, $M33 b )
{
    ctl_vec3f_t r;
    r.x = a.x * b.vals[0][0] + a.y * b.vals[1][0] + a.z * b.vals[2][0];
    r.y = a.x * b.vals[0][1] + a.y * b.vals[1][1] + a.z * b.vals[2][1];
    r.z = a.x * b.vals[0][2] + a.y * b.vals[1][2] + a.z * b.vals[2][2];
    return r;
}";

const MULT_F_F3: &str = "ctl_vec3f_t mult_f_f3( ctl_number_t a, $VEC3 b )
{
    ctl_vec3f_t r;
    r.x = a * b.x;
    r.y = a * b.y;
    r.z = a * b.z;
    return r;
}";

const ADD_F3_F3: &str = "ctl_vec3f_t add_f3_f3( $VEC3 a, $VEC3 b )
{
    ctl_vec3f_t r;
    r.x = a.x + b.x;
    r.y = a.y + b.y;
    r.z = a.z + b.z;
    return r;
}";

const SUB_F3_F3: &str = "ctl_vec3f_t sub_f3_f3( $VEC3 a, $VEC3 b )
{
    ctl_vec3f_t r;
    r.x = a.x - b.x;
    r.y = a.y - b.y;
    r.z = a.z - b.z;
    return r;
}";

const CROSS_F3_F3: &str = "ctl_vec3f_t cross_f3_f3( $VEC3 a, $VEC3 b )
{
    ctl_vec3f_t r;
    r.x = a.y * b.z - a.z * b.y;
    r.y = a.z * b.x - a.x * b.z;
    r.z = a.x * b.y - a.y * b.x;
    return r;
}";

const DOT_F3_F3: &str = "ctl_number_t dot_f3_f3( $VEC3 a, $VEC3 b )
{
    return a.x * b.x + a.y * b.y + a.z * b.z;
}";

const LENGTH_F3: &str = "ctl_number_t length_f3( $VEC3 a )
{
    return sqrt$S( a.x * a.x + a.y * a.y + a.z * a.z );
}";

const MULT_F44_F44: &str = "ctl_mat44f_t mult_f44_f44( $M44 a, $M44 b )
{
    ctl_mat44f_t r;
    ctl_number_t t[4];
    int i, j;
    for ( i = 0; i < 4; ++i )
    {
        for ( j = 0; j < 4; ++j )
            t[j] = a.vals[i][j];
        for ( j = 0; j < 4; ++j )
            r.vals[i][j] = t[0] * b.vals[0][j] + t[1] * b.vals[1][j] + t[2] * b.vals[2][j] + t[3] * b.vals[3][j];
    }
    return r;
}";

const MULT_F_F44: &str = "ctl_mat44f_t mult_f_f44( ctl_number_t a, $M44 b )
{
    ctl_mat44f_t r;
    int i, j;
    for ( i = 0; i < 4; ++i )
        for ( j = 0; j < 4; ++j )
            r.vals[i][j] = a * b.vals[i][j];
    return r;
}";

const ADD_F44_F44: &str = "ctl_mat44f_t add_f44_f44( $M44 a, $M44 b )
{
    ctl_mat44f_t r;
    int i, j;
    for ( i = 0; i < 4; ++i )
        for ( j = 0; j < 4; ++j )
            r.vals[i][j] = a.vals[i][j] + b.vals[i][j];
    return r;
}";

// Gauss-Jordan con pivoteo parcial; s parte de la identidad
const INVERT_F44: &str = "ctl_mat44f_t invert_f44( $M44 a )
{
    ctl_mat44f_t s, t;
    int i, j, k;
    for ( i = 0; i < 4; ++i )
        for ( j = 0; j < 4; ++j )
        {
            t.vals[i][j] = a.vals[i][j];
            s.vals[i][j] = i == j ? (ctl_number_t)( 1 ) : (ctl_number_t)( 0 );
        }
    for ( i = 0; i < 3; ++i )
    {
        int pivot = i;
        ctl_number_t pivotsize = fabs$S( t.vals[i][i] );
        for ( j = i + 1; j < 4; ++j )
        {
            ctl_number_t tmp = fabs$S( t.vals[j][i] );
            if ( tmp > pivotsize )
            {
                pivot = j;
                pivotsize = tmp;
            }
        }
        if ( pivotsize == 0 )
        {
            assert( false );
            for ( j = 0; j < 16; ++j )
                s.vals[j / 4][j % 4] = j / 4 == j % 4 ? (ctl_number_t)( 1 ) : (ctl_number_t)( 0 );
            return s;
        }
        if ( pivot != i )
        {
            for ( j = 0; j < 4; ++j )
            {
                ctl_number_t tmp;
                tmp = t.vals[i][j];
                t.vals[i][j] = t.vals[pivot][j];
                t.vals[pivot][j] = tmp;
                tmp = s.vals[i][j];
                s.vals[i][j] = s.vals[pivot][j];
                s.vals[pivot][j] = tmp;
            }
        }
        for ( j = i + 1; j < 4; ++j )
        {
            ctl_number_t f = t.vals[j][i] / t.vals[i][i];
            for ( k = 0; k < 4; ++k )
            {
                t.vals[j][k] -= f * t.vals[i][k];
                s.vals[j][k] -= f * s.vals[i][k];
            }
        }
    }
    for ( i = 3; i >= 0; --i )
    {
        ctl_number_t f = t.vals[i][i];
        if ( f == 0 )
        {
            assert( false );
            for ( j = 0; j < 16; ++j )
                s.vals[j / 4][j % 4] = j / 4 == j % 4 ? (ctl_number_t)( 1 ) : (ctl_number_t)( 0 );
            return s;
        }
        for ( j = 0; j < 4; ++j )
        {
            t.vals[i][j] /= f;
            s.vals[i][j] /= f;
        }
        for ( j = 0; j < i; ++j )
        {
            f = t.vals[j][i];
            for ( k = 0; k < 4; ++k )
            {
                t.vals[j][k] -= f * t.vals[i][k];
                s.vals[j][k] -= f * s.vals[i][k];
            }
        }
    }
    return s;
}";

const TRANSPOSE_F44: &str = "ctl_mat44f_t transpose_f44( $M44 a )
{
    ctl_mat44f_t r;
    int i, j;
    for ( i = 0; i < 4; ++i )
        for ( j = 0; j < 4; ++j )
            r.vals[j][i] = a.vals[i][j];
    return r;
}";

const MULT_F3_F44: &str = "ctl_vec3f_t mult_f3_f44( $VEC3 a, $M44 b )
{
    ctl_vec3f_t r;
    ctl_number_t w;
    r.x = a.x * b.vals[0][0] + a.y * b.vals[1][0] + a.z * b.vals[2][0] + b.vals[3][0];
    r.y = a.x * b.vals[0][1] + a.y * b.vals[1][1] + a.z * b.vals[2][1] + b.vals[3][1];
    r.z = a.x * b.vals[0][2] + a.y * b.vals[1][2] + a.z * b.vals[2][2] + b.vals[3][2];
    w = a.x * b.vals[0][3] + a.y * b.vals[1][3] + a.z * b.vals[2][3] + b.vals[3][3];
    r.x /= w;
    r.y /= w;
    r.z /= w;
    return r;
}";

const CSPACE_F: &str = "ctl_number_t _cspace_f( ctl_number_t x ) { if ( x > (ctl_number_t)( 0.008856 ) ) return pow$S( x, (ctl_number_t)( 1.0 / 3.0 ) ); return (ctl_number_t)( 7.787 ) * x + (ctl_number_t)( 16.0 / 116.0 ); }";

const CSPACE_F_INVERSE: &str = "ctl_number_t _cspace_fInverse( ctl_number_t t ) { if ( t > (ctl_number_t)( 0.206892 ) ) return t * t * t; return (ctl_number_t)( 1.0 / 7.787 ) * ( t - (ctl_number_t)( 16.0 / 116.0 ) ); }";

const RGB_TO_XYZ: &str = "ctl_mat44f_t RGBtoXYZ( $CHROMA chroma, ctl_number_t Y )
{
    const ctl_number_t one = (ctl_number_t)( 1 );
    ctl_number_t X = chroma.white.x * Y / chroma.white.y;
    ctl_number_t Z = ( one - chroma.white.x - chroma.white.y ) * Y / chroma.white.y;
    ctl_number_t d = chroma.red.x * ( chroma.blue.y - chroma.green.y ) + chroma.blue.x * ( chroma.green.y - chroma.red.y ) + chroma.green.x * ( chroma.red.y - chroma.blue.y );
    ctl_number_t Sr = ( X * ( chroma.blue.y - chroma.green.y ) - chroma.green.x * ( Y * ( chroma.blue.y - one ) + chroma.blue.y * ( X + Z ) ) + chroma.blue.x * ( Y * ( chroma.green.y - one ) + chroma.green.y * ( X + Z ) ) ) / d;
    ctl_number_t Sg = ( X * ( chroma.red.y - chroma.blue.y ) + chroma.red.x * ( Y * ( chroma.blue.y - one ) + chroma.blue.y * ( X + Z ) ) - chroma.blue.x * ( Y * ( chroma.red.y - one ) + chroma.red.y * ( X + Z ) ) ) / d;
    ctl_number_t Sb = ( X * ( chroma.green.y - chroma.red.y ) - chroma.red.x * ( Y * ( chroma.green.y - one ) + chroma.green.y * ( X + Z ) ) + chroma.green.x * ( Y * ( chroma.red.y - one ) + chroma.red.y * ( X + Z ) ) ) / d;
    ctl_mat44f_t M;
    M.vals[0][0] = Sr * chroma.red.x;
    M.vals[0][1] = Sr * chroma.red.y;
    M.vals[0][2] = Sr * ( one - chroma.red.x - chroma.red.y );
    M.vals[1][0] = Sg * chroma.green.x;
    M.vals[1][1] = Sg * chroma.green.y;
    M.vals[1][2] = Sg * ( one - chroma.green.x - chroma.green.y );
    M.vals[2][0] = Sb * chroma.blue.x;
    M.vals[2][1] = Sb * chroma.blue.y;
    M.vals[2][2] = Sb * ( one - chroma.blue.x - chroma.blue.y );
    M.vals[0][3] = M.vals[1][3] = M.vals[2][3] = (ctl_number_t)( 0 );
    M.vals[3][0] = M.vals[3][1] = M.vals[3][2] = (ctl_number_t)( 0 );
    M.vals[3][3] = one;
    return M;
}";

const XYZ_TO_LUV: &str = "ctl_vec3f_t XYZtoLuv( $VEC3 XYZ, $VEC3 XYZn )
{
    ctl_vec3f_t r;
    r.x = (ctl_number_t)( 116 ) * _cspace_f( XYZ.y / XYZn.y ) - (ctl_number_t)( 16 );
    r.y = (ctl_number_t)( 13 ) * r.x * ( _cspace_uprime( XYZ ) - _cspace_uprime( XYZn ) );
    r.z = (ctl_number_t)( 13 ) * r.x * ( _cspace_vprime( XYZ ) - _cspace_vprime( XYZn ) );
    return r;
}";

const LUV_TO_XYZ: &str = "ctl_vec3f_t LuvtoXYZ( $VEC3 Luv, $VEC3 XYZn )
{
    ctl_vec3f_t r;
    ctl_number_t unprime = _cspace_uprime( XYZn );
    ctl_number_t vnprime = _cspace_vprime( XYZn );
    ctl_number_t fY = ( Luv.x + (ctl_number_t)( 16 ) ) / (ctl_number_t)( 116 );
    ctl_number_t d;
    r.y = XYZn.y * _cspace_fInverse( fY );
    d = (ctl_number_t)( 4 ) * ( (ctl_number_t)( 13 ) * Luv.x * vnprime + Luv.z );
    r.x = (ctl_number_t)( 9 ) * ( (ctl_number_t)( 13 ) * Luv.x * unprime + Luv.y ) * r.y / d;
    r.z = -( (ctl_number_t)( 3 ) * Luv.y + (ctl_number_t)( 13 ) * Luv.x * ( (ctl_number_t)( -12 ) + (ctl_number_t)( 3 ) * unprime + (ctl_number_t)( 20 ) * vnprime ) + (ctl_number_t)( 20 ) * Luv.z ) * r.y / d;
    return r;
}";

const XYZ_TO_LAB: &str = "ctl_vec3f_t XYZtoLab( $VEC3 XYZ, $VEC3 XYZn )
{
    ctl_vec3f_t r;
    ctl_number_t tmpY = _cspace_f( XYZ.y / XYZn.y );
    r.x = (ctl_number_t)( 116 ) * tmpY - (ctl_number_t)( 16 );
    r.y = (ctl_number_t)( 500 ) * ( _cspace_f( XYZ.x / XYZn.x ) - tmpY );
    r.z = (ctl_number_t)( 200 ) * ( tmpY - _cspace_f( XYZ.z / XYZn.z ) );
    return r;
}";

const LAB_TO_XYZ: &str = "ctl_vec3f_t LabtoXYZ( $VEC3 Lab, $VEC3 XYZn )
{
    ctl_vec3f_t r;
    ctl_number_t fY = ( Lab.x + (ctl_number_t)( 16 ) ) / (ctl_number_t)( 116 );
    ctl_number_t fX = Lab.y / (ctl_number_t)( 500 ) + fY;
    ctl_number_t fZ = fY - Lab.z / (ctl_number_t)( 200 );
    r.x = XYZn.x * _cspace_fInverse( fX );
    r.y = XYZn.y * _cspace_fInverse( fY );
    r.z = XYZn.z * _cspace_fInverse( fZ );
    return r;
}";

const LOOKUP_1D: &str = "ctl_number_t lookup1D( const ctl_number_t table[], int size, ctl_number_t pMin, ctl_number_t pMax, ctl_number_t p )
{
    int iMax = size - 1;
    ctl_number_t r = ( _clamp( p, pMin, pMax ) - pMin ) / ( pMax - pMin ) * iMax;
    int i = (int)( r );
    ctl_number_t u = r - (ctl_number_t)( i );
    ctl_number_t t0 = table[i];
    ctl_number_t t1 = table[_min_i( i + 1, iMax )];
    return _lerp( t0, t1, u );
}";

const LOOKUP_CUBIC_1D: &str = "ctl_number_t lookupCubic1D( const ctl_number_t table[], int size, ctl_number_t pMin, ctl_number_t pMax, ctl_number_t p )
{
    const ctl_number_t kHalf = (ctl_number_t)( 0.5 );
    const ctl_number_t kOne = (ctl_number_t)( 1 );
    const ctl_number_t kTwo = (ctl_number_t)( 2 );
    const ctl_number_t kThree = (ctl_number_t)( 3 );
    int iMax, i;
    ctl_number_t r, dy, m0, m1, t, t2, t3;
    if ( size < 3 ) return lookup1D( table, size, pMin, pMax, p );
    iMax = size - 1;
    r = ( _clamp( p, pMin, pMax ) - pMin ) / ( pMax - pMin ) * iMax;
    if ( r >= iMax ) return table[iMax];
    i = (int)( r );
    dy = table[i + 1] - table[i];
    if ( i < iMax - 1 )
    {
        m1 = ( dy + ( table[i + 2] - table[i + 1] ) ) * kHalf;
        if ( i > 0 )
            m0 = ( dy + ( table[i] - table[i - 1] ) ) * kHalf;
        else
            m0 = ( kThree * dy - m1 ) * kHalf;
    }
    else
    {
        m0 = ( dy + ( table[i] - table[i - 1] ) ) * kHalf;
        m1 = ( kThree * dy - m0 ) * kHalf;
    }
    t = r - (ctl_number_t)( i );
    t2 = t * t;
    t3 = t2 * t;
    return table[i] * ( kTwo * t3 - kThree * t2 + kOne ) +
           m0 * ( t3 - kTwo * t2 + t ) +
           table[i + 1] * ( kThree * t2 - kTwo * t3 ) +
           m1 * ( t3 - t2 );
}";

const LOOKUP_3D_F3: &str = "ctl_vec3f_t lookup3D_f3( const ctl_number_t table[], $IVEC3 size, $VEC3 pMin, $VEC3 pMax, $VEC3 p )
{
    int iMax = size.x - 1;
    ctl_number_t r = ( _clamp( p.x, pMin.x, pMax.x ) - pMin.x ) / ( pMax.x - pMin.x ) * iMax;
    int jMax = size.y - 1;
    ctl_number_t s = ( _clamp( p.y, pMin.y, pMax.y ) - pMin.y ) / ( pMax.y - pMin.y ) * jMax;
    int kMax = size.z - 1;
    ctl_number_t t = ( _clamp( p.z, pMin.z, pMax.z ) - pMin.z ) / ( pMax.z - pMin.z ) * kMax;
    int i = (int)( r );
    int i1 = _min_i( i + 1, iMax );
    ctl_number_t u = r - (ctl_number_t)( i );
    int j = (int)( s );
    int j1 = _min_i( j + 1, jMax );
    ctl_number_t v = s - (ctl_number_t)( j );
    int k = (int)( t );
    int k1 = _min_i( k + 1, kMax );
    ctl_number_t w = t - (ctl_number_t)( k );
    const ctl_number_t *aP = table + ( ( i * size.y + j ) * size.z + k ) * 3;
    const ctl_number_t *bP = table + ( ( i1 * size.y + j ) * size.z + k ) * 3;
    const ctl_number_t *cP = table + ( ( i * size.y + j1 ) * size.z + k ) * 3;
    const ctl_number_t *dP = table + ( ( i1 * size.y + j1 ) * size.z + k ) * 3;
    const ctl_number_t *eP = table + ( ( i * size.y + j ) * size.z + k1 ) * 3;
    const ctl_number_t *fP = table + ( ( i1 * size.y + j ) * size.z + k1 ) * 3;
    const ctl_number_t *gP = table + ( ( i * size.y + j1 ) * size.z + k1 ) * 3;
    const ctl_number_t *hP = table + ( ( i1 * size.y + j1 ) * size.z + k1 ) * 3;
    const ctl_vec3f_t a = make_vec3f( aP[0], aP[1], aP[2] );
    const ctl_vec3f_t b = make_vec3f( bP[0], bP[1], bP[2] );
    const ctl_vec3f_t c = make_vec3f( cP[0], cP[1], cP[2] );
    const ctl_vec3f_t d = make_vec3f( dP[0], dP[1], dP[2] );
    const ctl_vec3f_t e = make_vec3f( eP[0], eP[1], eP[2] );
    const ctl_vec3f_t f = make_vec3f( fP[0], fP[1], fP[2] );
    const ctl_vec3f_t g = make_vec3f( gP[0], gP[1], gP[2] );
    const ctl_vec3f_t h = make_vec3f( hP[0], hP[1], hP[2] );
    return _lerp_f3( _lerp_f3( _lerp_f3( a, b, u ), _lerp_f3( c, d, u ), v ),
                     _lerp_f3( _lerp_f3( e, f, u ), _lerp_f3( g, h, u ), v ), w );
}";

const LOOKUP_3D_F_REFERENCES: &str = "void lookup3D_f( const ctl_number_t table[], const ctl_vec3i_t &size, const ctl_vec3f_t &pMin, const ctl_vec3f_t &pMax, ctl_number_t p0, ctl_number_t p1, ctl_number_t p2, ctl_number_t &o0, ctl_number_t &o1, ctl_number_t &o2 )
{
    ctl_vec3f_t out = lookup3D_f3( table, size, pMin, pMax, make_vec3f( p0, p1, p2 ) );
    o0 = out.x;
    o1 = out.y;
    o2 = out.z;
}";

const LOOKUP_3D_F_POINTERS: &str = "void lookup3D_f( const ctl_number_t table[], ctl_vec3i_t size, ctl_vec3f_t pMin, ctl_vec3f_t pMax, ctl_number_t p0, ctl_number_t p1, ctl_number_t p2, ctl_number_t *o0, ctl_number_t *o1, ctl_number_t *o2 )
{
    ctl_vec3f_t out = lookup3D_f3( table, size, pMin, pMax, make_vec3f( p0, p1, p2 ) );
    *o0 = out.x;
    *o1 = out.y;
    *o2 = out.z;
}";

const LOOKUP_3D_H: &str = "void lookup3D_h( const ctl_number_t table[], const ctl_vec3i_t &size, const ctl_vec3f_t &pMin, const ctl_vec3f_t &pMax, const half &p0, const half &p1, const half &p2, half &o0, half &o1, half &o2 )
{
    ctl_vec3f_t out = lookup3D_f3( table, size, pMin, pMax, make_vec3f( p0, p1, p2 ) );
    o0 = out.x;
    o1 = out.y;
    o2 = out.z;
}";

// Las tablas de pares llegan aplanadas: x en 2k, y en 2k + 1
const INTERPOLATE_1D: &str = "ctl_number_t interpolate1D( const ctl_number_t table[], int size, ctl_number_t p )
{
    int i = 0;
    int j = size;
    ctl_number_t t;
    if ( size < 1 ) return (ctl_number_t)( 0 );
    if ( p < table[0] ) return table[1];
    if ( p >= table[2 * ( size - 1 )] ) return table[2 * ( size - 1 ) + 1];
    while ( i < j - 1 )
    {
        int k = ( i + j ) / 2;
        if ( table[2 * k] == p ) return table[2 * k + 1];
        else if ( table[2 * k] < p ) i = k;
        else j = k;
    }
    t = ( p - table[2 * i] ) / ( table[2 * i + 2] - table[2 * i] );
    return _lerp( table[2 * i + 1], table[2 * i + 3], t );
}";

const INTERPOLATE_CUBIC_1D: &str = "ctl_number_t interpolateCubic1D( const ctl_number_t table[], int size, ctl_number_t p )
{
    const ctl_number_t kHalf = (ctl_number_t)( 0.5 );
    const ctl_number_t kOne = (ctl_number_t)( 1 );
    const ctl_number_t kTwo = (ctl_number_t)( 2 );
    const ctl_number_t kThree = (ctl_number_t)( 3 );
    int i = 0;
    int j = size;
    ctl_number_t dx, dy, m0 = 0, m1 = 0, t, t2, t3;
    if ( size < 3 ) return interpolate1D( table, size, p );
    if ( p < table[0] ) return table[1];
    if ( p >= table[2 * ( size - 1 )] ) return table[2 * ( size - 1 ) + 1];
    while ( i < j - 1 )
    {
        int k = ( i + j ) / 2;
        if ( table[2 * k] == p ) return table[2 * k + 1];
        else if ( table[2 * k] < p ) i = k;
        else j = k;
    }
    dx = table[2 * i + 2] - table[2 * i];
    dy = table[2 * i + 3] - table[2 * i + 1];
    if ( i > 0 ) m0 = kHalf * ( dy + dx * ( table[2 * i + 1] - table[2 * i - 1] ) / ( table[2 * i] - table[2 * i - 2] ) );
    if ( i < size - 2 ) m1 = kHalf * ( dy + dx * ( table[2 * i + 5] - table[2 * i + 3] ) / ( table[2 * i + 4] - table[2 * i + 2] ) );
    if ( i <= 0 ) m0 = kHalf * ( kThree * dy - m1 );
    if ( i >= size - 2 ) m1 = kHalf * ( kThree * dy - m0 );
    t = ( p - table[2 * i] ) / dx;
    t2 = t * t;
    t3 = t2 * t;
    return table[2 * i + 1] * ( kTwo * t3 - kThree * t2 + kOne ) +
           m0 * ( t3 - kTwo * t2 + t ) +
           table[2 * i + 3] * ( kThree * t2 - kTwo * t3 ) +
           m1 * ( t3 - t2 );
}";

#[cfg(test)]
mod test {
    use super::*;
    use crate::dialect::{Language, C};

    fn library(language: Language, precision: Precision) -> ModuleDefinition {
        let dialect = language.dialect();
        build_standard_library(dialect.as_ref(), precision).unwrap()
    }

    fn function<'a>(module: &'a ModuleDefinition, name: &str) -> &'a FunctionFragment {
        let index = module.function_named(name).unwrap();
        &module.functions[index]
    }

    #[test]
    fn function_prefix_and_suffix() {
        let lib = Library::new(&C, Precision::LongDouble);
        assert_eq!(lib.func_pref, "static inline\n");
        assert_eq!(lib.prec_suffix, "l");
        assert_eq!(lib.flt_epsilon, "LDBL_EPSILON");

        let glsl = Language::Glsl.dialect();
        assert_eq!(Library::new(glsl.as_ref(), Precision::Float).func_pref, "");
    }

    #[test]
    fn transitive_dependencies_are_recorded() {
        let module = library(Language::C, Precision::Float);

        let xyz_to_rgb = function(&module, "XYZtoRGB").usage.module(None).unwrap();
        assert!(xyz_to_rgb.functions.contains("invert_f44"));
        assert!(xyz_to_rgb.functions.contains("RGBtoXYZ"));
        assert!(xyz_to_rgb.types.contains("Chromaticities"));

        let lerp = function(&module, "_lerp_f3").usage.module(None).unwrap();
        assert!(lerp.functions.contains("_lerp"));

        let invert = function(&module, "invert_f33");
        assert!(invert.body.contains("fabsf( det ) > FLT_EPSILON"));
        assert!(invert.usage.module(None).unwrap().functions.contains("assert"));
    }

    #[test]
    fn cubic_lookup_has_its_own_name() {
        let module = library(Language::C, Precision::Double);
        let cubic = function(&module, "lookupCubic1D");
        assert!(cubic.body.contains("ctl_number_t lookupCubic1D( const ctl_number_t table[]"));
    }

    #[test]
    fn pointer_outputs_without_references() {
        let module = library(Language::C, Precision::Float);
        let lookup = function(&module, "lookup3D_f");
        assert!(lookup.body.contains("ctl_number_t *o0"));
        assert!(lookup.body.contains("*o2 = out.z;"));
        assert!(module.function_named("lookup3D_h").is_none());
        assert!(module.function_named("print_half").is_none());
    }

    #[test]
    fn references_and_half_in_cpp() {
        let module = library(Language::Cpp03, Precision::Float);
        assert!(function(&module, "mult_f3_f33")
            .body
            .contains("mult_f3_f33( const ctl_vec3f_t &a, const ctl_mat33f_t &b )"));
        assert!(module.function_named("lookup3D_h").is_some());
        assert!(module.function_named("exp_h").is_some());
        assert_eq!(module.suffix, "\n} // namespace _ctlcc_\n");
        assert!(module.prefix.ends_with("namespace _ctlcc_ {\n"));
    }

    #[test]
    fn half_requires_references() {
        let lib = Library {
            references: false,
            half: true,
            ..Library::new(&C, Precision::Float)
        };

        assert_eq!(
            c_interp_bodies(&lib).unwrap_err().into_inner(),
            CodegenError::HalfWithoutReferences
        );
    }

    #[test]
    fn missing_type_table() {
        struct Bare;

        impl Dialect for Bare {
            fn language(&self) -> Language {
                Language::Cpp03
            }

            fn supports_namespaces(&self) -> bool {
                true
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
                true
            }

            fn uses_function_initializers(&self) -> bool {
                false
            }
        }

        assert_eq!(
            build_standard_library(&Bare, Precision::Float)
                .unwrap_err()
                .into_inner(),
            CodegenError::MissingStandardTypes
        );
    }

    #[test]
    fn opencl_number_define_is_a_dependency() {
        let module = library(Language::OpenCl, Precision::Float);
        let lookup = function(&module, "lookup1D").usage.module(None).unwrap();
        assert!(lookup.types.contains("float"));
        assert!(module.function_named("print_int").is_none());
    }

    #[test]
    fn names_by_precision() {
        let names = std_names(&C, Precision::LongDouble);
        assert_eq!(names["M_PI"], "M_PIl");
        assert_eq!(names["FLT_MAX"], "LDBL_MAX");
        assert_eq!(names["FLT_NEG_INF"], "(-HUGE_VALL)");
        assert_eq!(names["FLT_NAN"], "__builtin_nanl(\"\")");

        let names = std_names(&C, Precision::Float);
        assert_eq!(names["FLT_POS_INF"], "HUGE_VALF");
        assert_eq!(names["HALF_NAN"], "half::qNan()");

        let opencl = Language::OpenCl.dialect();
        let names = std_names(opencl.as_ref(), Precision::Float);
        assert_eq!(names["HALF_MAX"], "0x1.ffcp15f");
    }

    #[test]
    fn math_by_precision() {
        let math = std_math(&C, Precision::Float);
        assert_eq!(math["isfinite_f"], "isfinite");
        assert_eq!(math["atan2"], "atan2f");
        assert_eq!(math["pow3"], "pow");

        let math = std_math(&C, Precision::Double);
        assert_eq!(math["sqrt"], "sqrt");
    }
}
