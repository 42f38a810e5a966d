use ctlcc::{
    ast::{Ast, ExprId, ModuleId, Param, Stmt, SymbolId, Token, TypeId},
    codegen::{EmitMode, Generator},
    dialect::Language,
    error::CodegenError,
    source::Line,
};

fn returns(ast: &mut Ast, value: f32) -> Vec<Stmt> {
    let value = ast.float_lit(value);
    vec![Stmt::Return {
        value: Some(value),
        ty: TypeId::FLOAT,
        line: Line::UNKNOWN,
    }]
}

/// Función sin parámetros que devuelve una constante.
fn constant_function(ast: &mut Ast, module: ModuleId, name: &str, value: f32) -> SymbolId {
    let function = ast.declare_function(Some(module), name, TypeId::FLOAT, vec![]);
    let body = returns(ast, value);
    ast.define_function(module, function, body);
    function
}

/// Rutina principal que devuelve `value`.
fn main_returning(ast: &mut Ast, module: ModuleId, value: ExprId) -> SymbolId {
    let main = ast.declare_function(Some(module), "main", TypeId::FLOAT, vec![]);
    ast.define_function(
        module,
        main,
        vec![Stmt::Return {
            value: Some(value),
            ty: TypeId::FLOAT,
            line: Line::UNKNOWN,
        }],
    );

    main
}

fn generate(language: Language, ast: &Ast, mode: EmitMode) -> String {
    let mut generator = Generator::new(language);
    generator.translate_all(ast).unwrap();
    generator.code(mode).unwrap()
}

fn position(text: &str, needle: &str) -> usize {
    text.find(needle)
        .unwrap_or_else(|| panic!("`{}` not found in:\n{}", needle, text))
}

fn two_modules() -> Ast {
    let mut ast = Ast::new();
    ast.declare_standard_library();

    let util = ast.add_module("util", "util.ctl");
    let helper = constant_function(&mut ast, util, "helper", 1.5);
    constant_function(&mut ast, util, "unused", 3.0);

    let app = ast.add_module("app", "app.ctl");
    let call = ast.call(helper, vec![]);
    main_returning(&mut ast, app, call);

    ast
}

#[test_log::test]
fn reachable_closure_is_minimal_and_ordered() {
    let text = generate(Language::Cpp11, &two_modules(), EmitMode::Reachable);

    let helper = position(&text, "\nhelper( void )");
    let main = position(&text, "\napp( void )");
    assert!(helper < main);
    assert_eq!(text.matches("\nhelper( void )").count(), 1);

    assert!(text.contains("return util::helper();"));
    assert!(!text.contains("unused"));
    assert!(!text.contains("lookup1D"));
}

#[test_log::test]
fn all_mode_keeps_everything() {
    let text = generate(Language::Cpp11, &two_modules(), EmitMode::All);

    assert!(text.contains("\nunused( void )"));
    assert!(text.contains("lookup1D"));
    assert!(text.contains("invert_f44"));
}

#[test_log::test]
fn emission_is_repeatable() {
    let ast = two_modules();
    let mut generator = Generator::new(Language::C);
    generator.translate_all(&ast).unwrap();

    let first = generator.code(EmitMode::Reachable).unwrap();
    let second = generator.code(EmitMode::Reachable).unwrap();
    assert_eq!(first, second);

    // La rutina principal queda calificada con el prefijo del módulo
    let main = &generator.main_routines()["app"];
    assert_eq!(main.qualified, "app_app");
    assert!(first.contains("util_helper()"));
}

#[test_log::test]
fn standard_library_closure_follows_usage() {
    let mut ast = Ast::new();
    ast.declare_standard_library();

    let grade = ast.add_module("grade", "grade.ctl");
    let f5 = ast.array(TypeId::FLOAT, 5);
    let values = ast.float_values(f5, &[0.0, 0.1, 0.4, 0.9, 1.0]);
    let table = ast.define_constant(grade, "table", f5, Some(values));

    let lookup = ast.standard("lookup1D").unwrap();
    let table = ast.name(table);
    let (min, max, p) = (ast.float_lit(0.0), ast.float_lit(1.0), ast.float_lit(0.5));
    let call = ast.call(lookup, vec![table, min, max, p]);
    main_returning(&mut ast, grade, call);

    let text = generate(Language::C, &ast, EmitMode::Reachable);
    assert!(text.contains("lookup1D( grade_table, (int)( 5 ), 0.0F, 1.0F, 0.5F )"));
    assert!(text.contains("ctl_number_t lookup1D("));
    assert!(!text.contains("invert_f44"));

    // La tabla se declara antes de la función que la usa
    assert!(position(&text, "grade_table[5]") < position(&text, "\ngrade_grade( void )"));
}

#[test_log::test]
fn literal_constants_fold_into_uses() {
    let mut ast = Ast::new();
    let module = ast.add_module("lit", "lit.ctl");
    let value = ast.float_lit(2.5);
    let scale = ast.define_constant(module, "scale", TypeId::FLOAT, Some(value));

    let (a, b, c) = (ast.name(scale), ast.name(scale), ast.name(scale));
    let product = ast.binary(Token::Times, a, b);
    let sum = ast.binary(Token::Plus, product, c);
    main_returning(&mut ast, module, sum);

    let text = generate(Language::Cpp11, &ast, EmitMode::All);
    assert!(text.contains("return ( 2.5F * 2.5F ) + 2.5F;"));
    assert_eq!(text.matches("2.5F").count(), 3);
    assert!(!text.contains("scale"));
}

#[test_log::test]
fn two_free_dimensions_pass_a_size_vector() {
    let mut ast = Ast::new();
    let module = ast.add_module("m", "m.ctl");

    let open = ast.array_of(TypeId::FLOAT, &[0, 0]);
    let sum = ast.declare_function(Some(module), "sum", TypeId::FLOAT, vec![Param::new("t", open)]);
    let body = returns(&mut ast, 0.0);
    ast.define_function(module, sum, body);

    let grid = ast.array_of(TypeId::FLOAT, &[2, 3]);
    let values = ast.float_values(grid, &[0.0; 6]);
    let table = ast.define_constant(module, "grid", grid, Some(values));
    let table = ast.name(table);
    let call = ast.call(sum, vec![table]);
    main_returning(&mut ast, module, call);

    let text = generate(Language::C, &ast, EmitMode::Reachable);
    assert!(text.contains("make_vec2i( 2, 3 )"));
}

#[test_log::test]
fn default_arguments_fill_missing_parameters() {
    let mut ast = Ast::new();
    let module = ast.add_module("m", "m.ctl");

    let two = ast.float_lit(2.0);
    let scaled = ast.declare_function(
        Some(module),
        "scaled",
        TypeId::FLOAT,
        vec![
            Param::new("v", TypeId::FLOAT),
            Param::new("k", TypeId::FLOAT).with_default(two),
        ],
    );

    let body = returns(&mut ast, 1.0);
    ast.define_function(module, scaled, body);

    let one = ast.float_lit(1.0);
    let call = ast.call(scaled, vec![one]);
    main_returning(&mut ast, module, call);

    let text = generate(Language::Cpp11, &ast, EmitMode::Reachable);
    assert!(text.contains("scaled( 1.0F, 2.0F )"));
}

/// Global inicializada con una llamada a una función del mismo módulo.
fn deferred_global() -> Ast {
    let mut ast = Ast::new();
    let module = ast.add_module("m", "m.ctl");

    let some_func = constant_function(&mut ast, module, "someFunc", 1.5);
    let call = ast.call(some_func, vec![]);
    let x = ast.define_constant(module, "x", TypeId::FLOAT, Some(call));

    let x = ast.name(x);
    let main = ast.declare_function(Some(module), "m", TypeId::FLOAT, vec![]);
    ast.define_function(
        module,
        main,
        vec![Stmt::Return {
            value: Some(x),
            ty: TypeId::FLOAT,
            line: Line::UNKNOWN,
        }],
    );

    ast
}

#[test_log::test]
fn function_initializers_are_deferred() {
    let ast = deferred_global();
    let mut generator = Generator::new(Language::Cpp03);
    generator.translate_all(&ast).unwrap();
    let text = generator.code(EmitMode::Reachable).unwrap();

    let forward = position(&text, "static ctl_number_t someFunc( void );");
    let global = position(&text, "ctl_number_t x;");
    assert!(forward < global);

    let init = position(&text, "struct __ctlcc_InitVals_m");
    assert!(global < init);
    assert!(text[init..].contains("x = someFunc();"));
    assert!(text.contains("static __ctlcc_InitVals_m __ctlcc_GlobalInitializer_m;"));

    let header = generator.header_code().unwrap();
    assert!(header.contains("namespace m {"));
    assert!(header.contains("ctl_number_t m( void );"));
    assert!(!header.contains("void init( void );"));
}

#[test_log::test]
fn c_headers_warn_about_initialization() {
    let ast = deferred_global();
    let mut generator = Generator::new(Language::C);
    generator.translate_all(&ast).unwrap();

    let header = generator.header_code().unwrap();
    assert!(header.contains("Initialization routine must be called prior to usage"));
    assert!(header.contains("void m_init( void );"));

    let text = generator.code(EmitMode::Reachable).unwrap();
    assert!(text.contains("\nvoid m_init( void )\n{"));
}

#[test_log::test]
fn glsl_drops_prints_and_rejects_half() {
    let mut ast = Ast::new();
    ast.declare_standard_library();
    let module = ast.add_module("shade", "shade.ctl");

    let print = ast.standard("print_float").unwrap();
    let value = ast.float_lit(1.0);
    let call = ast.call(print, vec![value]);
    let main = ast.declare_function(Some(module), "main", TypeId::VOID, vec![]);
    ast.define_function(
        module,
        main,
        vec![Stmt::Expr {
            expr: call,
            line: Line::UNKNOWN,
        }],
    );

    let text = generate(Language::Glsl, &ast, EmitMode::Reachable);
    assert!(!text.contains("print_float"));

    let mut ast = Ast::new();
    let module = ast.add_module("shade", "shade.ctl");
    let half = ast.half_lit(0.5);
    let half = ast.at_line(half, Line::at(3));
    main_returning(&mut ast, module, half);

    let error = Generator::new(Language::Glsl).translate_all(&ast).unwrap_err();
    assert_eq!(error.line(), Line::at(3));
    assert_eq!(error.into_inner(), CodegenError::HalfUnsupported);
}

#[test_log::test]
fn duplicate_mains_are_rejected() {
    let mut ast = Ast::new();
    for _ in 0..2 {
        let module = ast.add_module("twin", "twin.ctl");
        let zero = ast.float_lit(0.0);
        main_returning(&mut ast, module, zero);
    }

    let error = Generator::new(Language::Cpp11).translate_all(&ast).unwrap_err();
    assert_eq!(error.into_inner(), CodegenError::DuplicateMain("twin".into()));
}

#[test_log::test]
fn call_argument_errors_carry_lines() {
    let mut ast = Ast::new();
    let module = ast.add_module("m", "m.ctl");
    let unary = ast.declare_function(
        Some(module),
        "unary",
        TypeId::FLOAT,
        vec![Param::new("v", TypeId::FLOAT)],
    );

    let body = returns(&mut ast, 0.0);
    ast.define_function(module, unary, body);

    let (a, b) = (ast.float_lit(1.0), ast.float_lit(2.0));
    let call = ast.call(unary, vec![a, b]);
    let call = ast.at_line(call, Line::at(8));
    main_returning(&mut ast, module, call);

    let error = Generator::new(Language::C).translate_all(&ast).unwrap_err();
    assert_eq!(error.line(), Line::at(8));
    assert_eq!(error.into_inner(), CodegenError::TooManyArguments);

    let mut ast = Ast::new();
    let module = ast.add_module("m", "m.ctl");
    let unary = ast.declare_function(
        Some(module),
        "unary",
        TypeId::FLOAT,
        vec![Param::new("v", TypeId::FLOAT)],
    );

    let body = returns(&mut ast, 0.0);
    ast.define_function(module, unary, body);

    let call = ast.call(unary, vec![]);
    let call = ast.at_line(call, Line::at(11));
    main_returning(&mut ast, module, call);

    let error = Generator::new(Language::C).translate_all(&ast).unwrap_err();
    assert_eq!(error.line(), Line::at(11));
    assert_eq!(error.into_inner(), CodegenError::MissingDefault);
}

#[test_log::test]
fn varying_returns_are_fatal() {
    let mut ast = Ast::new();
    let module = ast.add_module("m", "m.ctl");
    let zero = ast.float_lit(0.0);
    let main = main_returning(&mut ast, module, zero);
    ast.set_returns_varying(main);
    ast.module_mut(module).functions[0].line = Line::at(2);

    let error = Generator::new(Language::Cpp11).translate_all(&ast).unwrap_err();
    assert_eq!(error.line(), Line::at(2));
    assert_eq!(error.into_inner(), CodegenError::VaryingReturn);
}

#[test_log::test]
fn closure_fails_for_untranslated_modules() {
    let mut ast = Ast::new();
    let util = ast.add_module("util", "util.ctl");
    let helper = constant_function(&mut ast, util, "helper", 1.0);
    let app = ast.add_module("app", "app.ctl");
    let call = ast.call(helper, vec![]);
    main_returning(&mut ast, app, call);

    let mut generator = Generator::new(Language::Cpp11);
    generator.translate(&ast, app).unwrap();
    assert_eq!(
        generator.code(EmitMode::Reachable).unwrap_err().into_inner(),
        CodegenError::UnknownModule
    );
}

#[test_log::test]
fn unregistered_entry_points_stay_out() {
    let mut ast = Ast::new();

    let a = ast.add_module("a", "a.ctl");
    let shared = constant_function(&mut ast, a, "forA", 1.0);
    let call = ast.call(shared, vec![]);
    main_returning(&mut ast, a, call);

    // `b` se traduce completo pero ninguna de sus funciones es principal
    let b = ast.add_module("b", "b.ctl");
    let exclusive = constant_function(&mut ast, b, "onlyB", 2.0);
    let call = ast.call(exclusive, vec![]);
    let entry = ast.declare_function(Some(b), "entry", TypeId::FLOAT, vec![]);
    ast.define_function(
        b,
        entry,
        vec![Stmt::Return {
            value: Some(call),
            ty: TypeId::FLOAT,
            line: Line::UNKNOWN,
        }],
    );

    let mut generator = Generator::new(Language::Cuda);
    generator.translate_all(&ast).unwrap();
    assert_eq!(generator.main_routines().len(), 1);

    let text = generator.code(EmitMode::Reachable).unwrap();
    assert!(text.contains("forA"));
    assert!(!text.contains("onlyB"));
    assert!(!text.contains("entry"));
    assert!(!text.contains("namespace b"));
}

#[test_log::test]
fn modules_follow_their_dependencies() {
    let mut ast = Ast::new();

    // `app` se traduce antes que `util`, del cual depende
    let app = ast.add_module("app", "app.ctl");
    let util = ast.add_module("util", "util.ctl");
    let helper = constant_function(&mut ast, util, "helper", 1.5);
    let call = ast.call(helper, vec![]);
    main_returning(&mut ast, app, call);

    let text = generate(Language::Cpp11, &ast, EmitMode::Reachable);
    assert!(position(&text, "namespace util {") < position(&text, "namespace app {"));
    assert!(position(&text, "\nhelper( void )") < position(&text, "\napp( void )"));
    assert!(text.contains("return util::helper();"));

    let text = generate(Language::Cpp11, &ast, EmitMode::All);
    assert!(position(&text, "namespace util {") < position(&text, "namespace app {"));
}

#[test_log::test]
fn core_arrays_use_constructors_in_cpp() {
    let mut ast = Ast::new();
    let module = ast.add_module("m", "m.ctl");

    let f3 = ast.array(TypeId::FLOAT, 3);
    let values = ast.float_values(f3, &[1.0, 2.0, 3.0]);
    ast.define_constant(module, "v", f3, Some(values));

    let f33 = ast.array_of(TypeId::FLOAT, &[3, 3]);
    let values = ast.float_values(f33, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    ast.define_constant(module, "k", f33, Some(values));

    for &language in &[Language::Cpp11, Language::Cpp03] {
        let text = generate(language, &ast, EmitMode::All);
        assert!(text.contains("const ctl_vec3f_t v( 1.0F, 2.0F, 3.0F );"));
        assert!(text.contains("const ctl_mat33f_t k( 1.0F, 0.0F, 0.0F, "));
    }
}

#[test_log::test]
fn cpp11_assigns_function_initializers() {
    let ast = deferred_global();
    let text = generate(Language::Cpp11, &ast, EmitMode::Reachable);

    let global = position(&text, "const ctl_number_t x = someFunc();");
    assert!(position(&text, "static ctl_number_t someFunc( void );") < global);
    assert!(!text.contains("__ctlcc_InitVals"));
    assert!(text.contains("\nstatic ctl_number_t\nm( void )"));
}

#[test_log::test]
fn forward_declarations_take_the_dialect_prefix() {
    let ast = deferred_global();

    for &language in &[Language::OpenCl, Language::Glsl] {
        let text = generate(language, &ast, EmitMode::Reachable);
        let forward = text
            .lines()
            .find(|line| line.ends_with(" m_someFunc( void );"))
            .unwrap_or_else(|| panic!("no forward declaration in:\n{}", text));

        assert!(!forward.contains("static"));
        assert!(position(&text, forward) < position(&text, "m_x = m_someFunc();"));
        assert!(!text.contains("static "));
    }

    let text = generate(Language::Cuda, &ast, EmitMode::Reachable);
    assert!(text.contains("\n__device__ ctl_number_t m_someFunc( void );"));
    assert!(text.contains("\n__device__ ctl_number_t\nm_m( void )"));
}
