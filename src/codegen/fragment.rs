//! Fragmentos de salida pendientes de emisión.
//!
//! Un fragmento es el texto ya traducido de un tipo, una global o una
//! función, junto con su registro de uso: los nombres que su texto
//! referencia directamente, agrupados por módulo dueño. El texto se
//! fija una sola vez durante la traducción; lo único que cambia
//! después son las marcas de emisión, y solo de falso a verdadero
//! dentro de una pasada de cierre.

use crate::ast::ModuleId;
use std::collections::{btree_map, BTreeMap, BTreeSet};

/// Nombres referenciados dentro de un mismo módulo dueño.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModuleUsage {
    pub types: BTreeSet<String>,
    pub functions: BTreeSet<String>,
    pub variables: BTreeSet<String>,
}

/// Registro de uso de un fragmento.
///
/// La llave `None` corresponde a la biblioteca estándar y a todo
/// símbolo sin módulo.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UsageRecord(BTreeMap<Option<ModuleId>, ModuleUsage>);

impl UsageRecord {
    pub fn new() -> Self {
        UsageRecord::default()
    }

    /// Registro de la biblioteca estándar con tipos y funciones dados.
    pub fn standard(types: &[&str], functions: &[&str]) -> Self {
        let mut record = UsageRecord::new();
        for name in types {
            record.record_type(None, name);
        }

        for name in functions {
            record.record_function(None, name);
        }

        record
    }

    pub fn record_type(&mut self, module: Option<ModuleId>, name: &str) {
        self.entry(module).types.insert(name.to_owned());
    }

    pub fn record_function(&mut self, module: Option<ModuleId>, name: &str) {
        self.entry(module).functions.insert(name.to_owned());
    }

    pub fn record_variable(&mut self, module: Option<ModuleId>, name: &str) {
        self.entry(module).variables.insert(name.to_owned());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Option<ModuleId>, ModuleUsage> {
        self.0.iter()
    }

    /// Obtiene los usos de un módulo dueño.
    pub fn module(&self, module: Option<ModuleId>) -> Option<&ModuleUsage> {
        self.0.get(&module)
    }

    fn entry(&mut self, module: Option<ModuleId>) -> &mut ModuleUsage {
        self.0.entry(module).or_default()
    }
}

/// Tipos agregados predefinidos, más uno por cada estructura de
/// usuario en orden de declaración.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StdType {
    Float,
    Vec2f,
    Vec2i,
    Vec3f,
    Vec3i,
    Vec4f,
    Vec4i,
    Vec8f,
    Vec8i,
    Mat3f,
    Mat4f,
    Chromaticities,
    Box2i,
    Box2f,
    Struct(usize),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypeFragment {
    pub name: String,
    pub declare: String,

    /// Función o constructor para construir valores, si hay.
    pub maker: String,

    /// Texto de la función constructora, emitido tras la declaración.
    pub constfunc: String,

    pub usage: UsageRecord,
    pub(crate) emitted: bool,
}

impl TypeFragment {
    pub fn new(name: &str, declare: &str) -> Self {
        TypeFragment {
            name: name.to_owned(),
            declare: declare.to_owned(),
            ..Default::default()
        }
    }

    pub fn with_maker(self, maker: &str) -> Self {
        TypeFragment {
            maker: maker.to_owned(),
            ..self
        }
    }

    pub fn with_constructor(self, constfunc: String) -> Self {
        TypeFragment { constfunc, ..self }
    }

    pub fn uses(self, usage: UsageRecord) -> Self {
        TypeFragment { usage, ..self }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlobalFragment {
    pub module: Option<ModuleId>,
    pub name: String,
    pub declare: String,

    /// Inicialización diferida; vacía si la declaración basta.
    pub delayed_init: String,

    pub usage: UsageRecord,
    pub(crate) emitted: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FunctionFragment {
    pub name: String,

    /// Declaración pública, solo para rutinas principales.
    pub header: String,

    /// Declaración adelantada, solo si la función se usa al
    /// inicializar globales.
    pub forward_decl: String,

    pub body: String,
    pub usage: UsageRecord,
    pub(crate) emitted: bool,
    pub(crate) emitted_forward: bool,
}

impl FunctionFragment {
    pub fn new(name: &str, body: String) -> Self {
        FunctionFragment {
            name: name.to_owned(),
            body,
            ..Default::default()
        }
    }

    pub fn uses(self, usage: UsageRecord) -> Self {
        FunctionFragment { usage, ..self }
    }
}

/// Texto acumulado por una pasada de cierre, por sección.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ModuleOutput {
    pub types: String,
    pub forward: String,
    pub variables: String,
    pub functions: String,
}

impl ModuleOutput {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.forward.is_empty()
            && self.variables.is_empty()
            && self.functions.is_empty()
    }
}

/// Todos los fragmentos de un módulo fuente, o de la biblioteca
/// estándar sintética.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModuleDefinition {
    pub name: String,

    /// Identidad del módulo; `None` para la biblioteca estándar.
    pub key: Option<ModuleId>,

    /// Prefijo de nombres en dialectos sin namespaces.
    pub call_prefix: String,

    pub prefix: String,
    pub suffix: String,
    pub types: BTreeMap<StdType, TypeFragment>,
    pub variables: Vec<GlobalFragment>,
    pub functions: Vec<FunctionFragment>,
    pub init_code: String,
    pub(crate) output: ModuleOutput,
}

impl ModuleDefinition {
    pub fn new(name: &str, key: Option<ModuleId>) -> Self {
        ModuleDefinition {
            name: name.to_owned(),
            key,
            ..Default::default()
        }
    }

    /// Indica si algún global requiere inicialización diferida.
    pub fn needs_init(&self) -> bool {
        self.variables
            .iter()
            .any(|global| !global.delayed_init.is_empty())
    }

    /// Descarta marcas y texto de una pasada de cierre anterior.
    pub(crate) fn reset(&mut self) {
        self.output = Default::default();
        self.init_code.clear();

        for fragment in self.types.values_mut() {
            fragment.emitted = false;
        }

        for global in &mut self.variables {
            global.emitted = false;
        }

        for function in &mut self.functions {
            function.emitted = false;
            function.emitted_forward = false;
        }
    }

    /// Módulos dueños de algo que usan los fragmentos de este módulo,
    /// sin contarlo a él mismo.
    pub fn dependencies(&self) -> BTreeSet<Option<ModuleId>> {
        let usages = self
            .types
            .values()
            .map(|fragment| &fragment.usage)
            .chain(self.variables.iter().map(|global| &global.usage))
            .chain(self.functions.iter().map(|function| &function.usage));

        usages
            .flat_map(|usage| usage.iter().map(|(&owner, _)| owner))
            .filter(|&owner| owner != self.key)
            .collect()
    }

    pub fn type_named(&self, name: &str) -> Option<StdType> {
        self.types
            .iter()
            .find(|(_, fragment)| fragment.name == name)
            .map(|(&key, _)| key)
    }

    pub fn variable_named(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|global| global.name == name)
    }

    pub fn function_named(&self, name: &str) -> Option<usize> {
        self.functions
            .iter()
            .position(|function| function.name == name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn standard_usage_groups_under_none() {
        let usage = UsageRecord::standard(&["ctl_vec3f_t"], &["_lerp", "_clamp"]);
        let standard = usage.module(None).unwrap();

        assert!(standard.types.contains("ctl_vec3f_t"));
        assert_eq!(
            standard.functions.iter().collect::<Vec<_>>(),
            vec!["_clamp", "_lerp"]
        );
        assert!(standard.variables.is_empty());
    }

    #[test]
    fn reset_clears_flags() {
        let mut module = ModuleDefinition::new("m", None);
        module
            .functions
            .push(FunctionFragment::new("f", "void f() {}".into()));

        module.functions[0].emitted = true;
        module.functions[0].emitted_forward = true;
        module.init_code.push_str("x = 1;");
        module.output.functions.push_str("void f() {}");

        module.reset();
        assert!(!module.functions[0].emitted);
        assert!(!module.functions[0].emitted_forward);
        assert!(module.init_code.is_empty());
        assert!(module.output.is_empty());
    }

    #[test]
    fn dependencies_skip_own_module() {
        let mut ast = crate::ast::Ast::new();
        let (own, other) = (ast.add_module("own", "own.ctl"), ast.add_module("other", "other.ctl"));

        let mut module = ModuleDefinition::new("own", Some(own));
        let mut usage = UsageRecord::new();
        usage.record_function(Some(own), "local");
        usage.record_variable(Some(other), "shared");
        usage.record_type(None, "ctl_vec3f_t");
        module.functions.push(FunctionFragment::new("f", String::new()).uses(usage));

        let dependencies: Vec<_> = module.dependencies().into_iter().collect();
        assert_eq!(dependencies, vec![None, Some(other)]);
    }
}
