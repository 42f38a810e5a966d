//! Generación de código fuente a partir del árbol de CTL.
//!
//! # Traducción
//! [`Generator::translate`] recorre una sola vez cada módulo fuente y
//! deja, por cada tipo, global y función declarados, un fragmento con
//! su texto ya traducido y el registro de los nombres que ese texto
//! referencia. Las decisiones que dependen del lenguaje objetivo se
//! toman consultando al [`Dialect`] activo; la traducción misma es
//! común a todos los dialectos. El estado mutable de un recorrido vive
//! en un [`TranslationContext`] que se pasa explícitamente a cada
//! visitante.
//!
//! # Emisión
//! [`Generator::code`] ensambla el texto final. En modo
//! [`EmitMode::All`] se emite todo fragmento en orden de declaración.
//! En modo [`EmitMode::Reachable`] se hace un cierre en profundidad
//! sobre el grafo de usos a partir de las rutinas principales, de
//! modo que cada dependencia aparece exactamente una vez y antes que
//! quien la usa.

use crate::{
    ast::{Ast, ModuleId, SymbolId, TypeId},
    dialect::{Dialect, Language, Precision},
    error::{Codegen, CodegenError},
};

use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};

pub mod fragment;
pub mod stdlib;
pub mod writer;

mod emit;
mod expr;
mod translate;

use fragment::{ModuleDefinition, StdType, UsageRecord};
use writer::Writer;

/// Conjunto de fragmentos a emitir.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EmitMode {
    /// Todo fragmento de todo módulo.
    All,

    /// Solo lo alcanzable desde las rutinas principales registradas.
    Reachable,
}

/// Punto de entrada exportado por un módulo.
#[derive(Clone, Debug, PartialEq)]
pub struct MainRoutine {
    pub name: String,

    /// Nombre con el que se invoca desde fuera del código generado.
    pub qualified: String,

    pub module: ModuleId,
    pub symbol: SymbolId,
}

/// Estrategia de inicialización de una variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum InitType {
    /// Fuera de una inicialización.
    None,

    /// `T name( args );`
    Ctor,

    /// Declaración sin valor y asignación diferida.
    Func,

    /// `T name = expr;`
    Assign,
}

/// Forma colapsada de un tipo arreglo.
///
/// Los tamaños van de la dimensión exterior a la interior. Las
/// dimensiones absorbidas por un vector o matriz estándar se marcan
/// con signo negativo y no se subindexan aritméticamente. Un cero
/// indica que quien llama provee el tamaño.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ArrayInfo {
    pub sizes: Vec<i64>,
    pub core: String,
    pub maker: String,
    pub std_type: Option<StdType>,
}

impl ArrayInfo {
    /// El núcleo es un vector o matriz estándar.
    pub fn is_core(&self) -> bool {
        self.std_type.is_some()
    }
}

/// Valor de un argumento por omisión.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DefaultValue {
    pub text: String,

    /// Si no es `None`, `text` es el nombre sin calificar de un global
    /// de ese módulo.
    pub owner: Option<ModuleId>,
}

/// Estado de un recorrido de traducción.
///
/// Los cambios de flujo de salida, de registro de uso y de modo de
/// inicialización se hacen únicamente a través de los métodos de
/// alcance de este tipo, que restauran el estado anterior en toda
/// salida, incluidas las salidas por error.
pub struct TranslationContext<'a> {
    ast: &'a Ast,
    writer: Writer,
    usage: Vec<UsageRecord>,
    definition: Option<ModuleDefinition>,
    module: Option<ModuleId>,
    module_name: String,
    mod_prefix: String,
    init: InitType,
    init_target: String,
    output_vars: HashSet<String>,
    in_function: bool,
    in_else: bool,
    expr_level: usize,
}

impl<'a> TranslationContext<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        TranslationContext {
            ast,
            writer: Writer::new(),
            usage: Vec::new(),
            definition: None,
            module: None,
            module_name: String::new(),
            mod_prefix: String::new(),
            init: InitType::None,
            init_target: String::new(),
            output_vars: HashSet::new(),
            in_function: false,
            in_else: false,
            expr_level: 0,
        }
    }

    /// Ejecuta `f` sobre un flujo nuevo y retorna lo escrito.
    fn capture<F>(&mut self, f: F) -> Codegen<String>
    where
        F: FnOnce(&mut Self) -> Codegen<()>,
    {
        self.writer.push_stream();
        let result = f(self);
        let text = self.writer.pop_stream()?;

        result.map(|()| text)
    }

    /// Ejecuta `f` registrando usos en un registro nuevo.
    fn tracking<T, F>(&mut self, f: F) -> Codegen<(T, UsageRecord)>
    where
        F: FnOnce(&mut Self) -> Codegen<T>,
    {
        self.usage.push(UsageRecord::new());
        let result = f(self);
        let usage = self.usage.pop().unwrap_or_default();

        result.map(|value| (value, usage))
    }

    /// Ejecuta `f` con un modo y destino de inicialización.
    fn initializing<T, F>(&mut self, init: InitType, target: &str, f: F) -> Codegen<T>
    where
        F: FnOnce(&mut Self) -> Codegen<T>,
    {
        let init = std::mem::replace(&mut self.init, init);
        let target = std::mem::replace(&mut self.init_target, target.to_owned());
        let result = f(self);

        self.init = init;
        self.init_target = target;
        result
    }

    fn record_type(&mut self, module: Option<ModuleId>, name: &str) {
        if let Some(usage) = self.usage.last_mut() {
            usage.record_type(module, name);
        }
    }

    fn record_function(&mut self, module: Option<ModuleId>, name: &str) {
        if let Some(usage) = self.usage.last_mut() {
            usage.record_function(module, name);
        }
    }

    fn record_variable(&mut self, module: Option<ModuleId>, name: &str) {
        if let Some(usage) = self.usage.last_mut() {
            usage.record_variable(module, name);
        }
    }

    fn definition(&mut self) -> Codegen<&mut ModuleDefinition> {
        self.definition
            .as_mut()
            .ok_or_else(|| CodegenError::OutsideModule.into())
    }
}

/// Generador de código para un dialecto y una precisión.
pub struct Generator {
    dialect: Box<dyn Dialect>,
    precision: Precision,

    /// La biblioteca estándar, si existe, siempre es el primer módulo.
    modules: Vec<ModuleDefinition>,

    mains: BTreeMap<String, MainRoutine>,
    std_math: HashMap<String, String>,
    std_names: HashMap<String, String>,
    global_literals: HashMap<SymbolId, String>,
    default_mappings: HashMap<SymbolId, DefaultValue>,
    global_init: HashMap<SymbolId, InitType>,
    funcs_used_in_init: HashSet<SymbolId>,
    namespace_tags: HashMap<ModuleId, String>,
    struct_owners: HashMap<String, Option<ModuleId>>,
    arrays: HashMap<TypeId, ArrayInfo>,
}

impl Generator {
    pub fn new(language: Language) -> Self {
        Generator {
            dialect: language.dialect(),
            precision: Precision::default(),
            modules: Vec::new(),
            mains: BTreeMap::new(),
            std_math: HashMap::new(),
            std_names: HashMap::new(),
            global_literals: HashMap::new(),
            default_mappings: HashMap::new(),
            global_init: HashMap::new(),
            funcs_used_in_init: HashSet::new(),
            namespace_tags: HashMap::new(),
            struct_owners: HashMap::new(),
            arrays: HashMap::new(),
        }
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Cambia la precisión numérica. Una vez construida la biblioteca
    /// estándar la precisión queda fija.
    pub fn set_precision(&mut self, precision: Precision) -> Codegen<()> {
        if !self.dialect.supports_precision(precision) {
            return Err(CodegenError::UnsupportedPrecision.into());
        } else if self.std_library_ready() && precision != self.precision {
            return Err(CodegenError::PrecisionAfterInit.into());
        }

        self.precision = precision;
        Ok(())
    }

    /// Cambia el lenguaje objetivo, conservando la precisión y
    /// descartando todo lo traducido hasta el momento.
    pub fn set_language(&mut self, language: Language) -> Codegen<()> {
        if !language.dialect().supports_precision(self.precision) {
            return Err(CodegenError::UnsupportedPrecision.into());
        }

        *self = Generator {
            precision: self.precision,
            ..Generator::new(language)
        };

        Ok(())
    }

    /// Construye la biblioteca estándar. Es idempotente.
    pub fn init_std_library(&mut self) -> Codegen<()> {
        if self.std_library_ready() {
            return Ok(());
        }

        let dialect = self.dialect.as_ref();
        let library = stdlib::build_standard_library(dialect, self.precision)?;

        self.std_math = stdlib::std_math(dialect, self.precision);
        self.std_names = stdlib::std_names(dialect, self.precision);
        self.modules.insert(0, library);

        debug!(
            "Standard library ready for {} ({}), capabilities: {:?}",
            dialect.language(),
            self.precision,
            dialect.capabilities()
        );

        Ok(())
    }

    /// Traduce un módulo del árbol.
    pub fn translate(&mut self, ast: &Ast, module: ModuleId) -> Codegen<()> {
        self.init_std_library()?;

        let mut cx = TranslationContext::new(ast);
        self.module(&mut cx, module)?;
        cx.writer.finish().map(drop)
    }

    /// Traduce todos los módulos del árbol en orden.
    pub fn translate_all(&mut self, ast: &Ast) -> Codegen<()> {
        ast.modules()
            .try_for_each(|module| self.translate(ast, module))
    }

    pub fn main_routines(&self) -> &BTreeMap<String, MainRoutine> {
        &self.mains
    }

    pub fn modules(&self) -> &[ModuleDefinition] {
        &self.modules
    }

    fn std_library_ready(&self) -> bool {
        self.modules
            .first()
            .map_or(false, |module| module.key.is_none())
    }

    fn std_type(&self, key: StdType) -> Option<&fragment::TypeFragment> {
        self.modules
            .first()
            .filter(|module| module.key.is_none())
            .and_then(|module| module.types.get(&key))
    }

    /// Nombre del escalar de punto flotante.
    fn number_type(&self) -> String {
        self.std_type(StdType::Float)
            .map_or_else(|| "ctl_number_t".to_owned(), |fragment| fragment.name.clone())
    }

    /// Nombre y constructor de un tipo estándar.
    fn std_type_names(&self, key: StdType, name: &str, maker: &str) -> (String, String) {
        match self.std_type(key) {
            Some(fragment) => (fragment.name.clone(), fragment.maker.clone()),
            None => (name.to_owned(), maker.to_owned()),
        }
    }

    /// Prefijo con el que se accede desde el módulo actual a un símbolo
    /// de `owner`.
    fn qualifier(&self, cx: &TranslationContext<'_>, owner: Option<ModuleId>) -> String {
        match owner {
            Some(owner) if Some(owner) == cx.module => cx.mod_prefix.clone(),
            // El dueño puede traducirse después del módulo actual
            Some(owner) => self
                .dialect
                .namespace_tag(&clean_name(&cx.ast.module(owner).name)),
            None => String::new(),
        }
    }
}

/// Reemplaza todo carácter que no sea válido en un identificador.
pub fn clean_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Quita el calificador global `::` inicial y aplana los demás.
pub fn remove_ns_quals(name: &str) -> String {
    name.strip_prefix("::").unwrap_or(name).replace("::", "__")
}

/// Escapa una cadena para un literal de C.
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            c if c.is_ascii_control() => escaped.push_str(&format!("\\{:03o}", c as u32)),
            c => escaped.push(c),
        }
    }

    escaped
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(clean_name("my-module.v2"), "my_module_v2");
        assert_eq!(remove_ns_quals("::lookup1D"), "lookup1D");
        assert_eq!(remove_ns_quals("a::b::c"), "a__b__c");
        assert_eq!(escape_literal("say \"hi\"\n\x01"), "say \\\"hi\\\"\\n\\001");
    }

    #[test]
    fn precision_is_fixed_after_init() {
        let mut generator = Generator::new(Language::Cpp03);
        generator.set_precision(Precision::Double).unwrap();
        generator.init_std_library().unwrap();
        generator.init_std_library().unwrap();

        assert_eq!(generator.modules().len(), 1);
        assert!(generator.set_precision(Precision::Double).is_ok());
        assert_eq!(
            generator
                .set_precision(Precision::Float)
                .unwrap_err()
                .into_inner(),
            CodegenError::PrecisionAfterInit
        );
    }

    #[test]
    fn unsupported_precision() {
        let mut generator = Generator::new(Language::Glsl);
        assert_eq!(
            generator
                .set_precision(Precision::Double)
                .unwrap_err()
                .into_inner(),
            CodegenError::UnsupportedPrecision
        );

        let mut generator = Generator::new(Language::Cpp11);
        generator.set_precision(Precision::LongDouble).unwrap();
        assert!(generator.set_language(Language::Cuda).is_err());
        assert!(generator.set_language(Language::C).is_ok());
        assert_eq!(generator.precision(), Precision::LongDouble);
        assert_eq!(generator.dialect().language(), Language::C);
    }
}
