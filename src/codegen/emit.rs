//! Ensamblado del texto final a partir de los fragmentos traducidos.

use super::{
    fragment::{StdType, UsageRecord},
    writer::Writer,
    EmitMode, Generator,
};

use crate::{
    ast::ModuleId,
    error::{Codegen, CodegenError},
};

use log::{debug, trace};

impl Generator {
    /// Texto de todos los módulos traducidos.
    ///
    /// En modo [`EmitMode::Reachable`] cada dependencia se emite una
    /// sola vez, antes de su primer uso y en la sección de su módulo
    /// dueño. Cada llamada parte de cero: repetirla produce el mismo
    /// texto.
    pub fn code(&mut self, mode: EmitMode) -> Codegen<String> {
        for module in &mut self.modules {
            module.reset();
        }

        let mut writer = Writer::new();
        match mode {
            EmitMode::All => self.all_code(&mut writer)?,
            EmitMode::Reachable => {
                self.reachable_closure()?;
                self.reachable_code(&mut writer)?;
            }
        }

        writer.finish()
    }

    /// Declaraciones públicas de las rutinas principales y de las
    /// rutinas de inicialización que deben invocarse manualmente.
    pub fn header_code(&self) -> Codegen<String> {
        let dialect = self.dialect.as_ref();
        let (begin_comment, end_comment) = (dialect.begin_comment(), dialect.end_comment());
        let namespaces = dialect.supports_namespaces();

        let mut writer = Writer::new();
        emit!(writer, "{} Auto generated function definitions{}\n", begin_comment, end_comment);
        writer.newline_and_indent();
        emit!(writer, "{}\n", dialect.number_typedef(self.precision));

        for module in &self.modules {
            let headers: Vec<&str> = module
                .functions
                .iter()
                .filter(|function| !function.header.is_empty())
                .map(|function| function.header.as_str())
                .collect();

            if headers.is_empty() {
                continue;
            }

            let needs_init = !dialect.needs_module_dynamic_initialization() && module.needs_init();
            let warning = format!(
                "{} Initialization routine must be called prior to usage or undefined results will occur{}",
                begin_comment, end_comment
            );

            writer.newline_and_indent();
            if namespaces {
                emit!(writer, "namespace {} {{", module.name);
                writer.newline_and_indent();
                if needs_init {
                    emit!(writer, "{}", warning);
                    writer.newline_and_indent();
                    emit!(writer, "void init( void );");
                    writer.newline_and_indent();
                }
            } else if needs_init {
                emit!(writer, "{}", warning);
                writer.newline_and_indent();
                emit!(writer, "void {}_init( void );", module.name);
                writer.newline_and_indent();
            }

            emit!(writer, "{}", headers.join("\n"));
            if namespaces {
                writer.newline_and_indent();
                emit!(writer, "}} {} namespace {}{}", begin_comment, module.name, end_comment);
            }

            writer.newline_and_indent();
        }

        writer.finish()
    }

    /// Preámbulo de la unidad: inclusiones y el tipo numérico.
    pub fn std_library_and_setup(&self) -> Codegen<String> {
        let dialect = self.dialect.as_ref();
        if !dialect.emits_standard_setup() {
            return Ok(String::new());
        }

        let mut writer = Writer::new();
        emit!(
            writer,
            "{} Autogenerated code from ctlcc{}\n",
            dialect.begin_comment(),
            dialect.end_comment()
        );

        for include in dialect.standard_includes() {
            writer.newline_and_indent();
            emit!(writer, "#include <{}>", include);
        }

        writer.newline_and_indent();
        emit!(writer, "\n{}\n", dialect.number_typedef(self.precision));
        writer.finish()
    }

    /// Índices de los módulos en orden de emisión: cada módulo después
    /// de todos los que usa. Entre módulos de un ciclo se conserva el
    /// orden de traducción.
    fn module_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.modules.len());
        let mut visited = vec![false; self.modules.len()];
        for index in 0..self.modules.len() {
            self.visit_module(index, &mut visited, &mut order);
        }

        order
    }

    fn visit_module(&self, index: usize, visited: &mut [bool], order: &mut Vec<usize>) {
        if visited[index] {
            return;
        }

        visited[index] = true;
        for owner in self.modules[index].dependencies() {
            if let Some(dependency) = self.modules.iter().position(|module| module.key == owner) {
                self.visit_module(dependency, visited, order);
            }
        }

        order.push(index);
    }

    fn all_code(&self, writer: &mut Writer) -> Codegen<()> {
        for index in self.module_order() {
            let module = &self.modules[index];
            if !module.prefix.is_empty() {
                writer.newline_and_indent();
                emit!(writer, "{}", module.prefix);
            }

            for fragment in module.types.values() {
                if fragment.declare.is_empty() && fragment.constfunc.is_empty() {
                    continue;
                }

                writer.newline_and_indent();
                emit!(writer, "{}", fragment.declare);
                if !fragment.constfunc.is_empty() {
                    writer.newline_and_indent();
                    emit!(writer, "{}\n", fragment.constfunc);
                }
            }

            for function in &module.functions {
                if !function.forward_decl.is_empty() {
                    writer.newline_and_indent();
                    emit!(writer, "{}\n", function.forward_decl);
                }
            }

            let mut init = String::new();
            for global in &module.variables {
                if !global.declare.is_empty() {
                    writer.newline_and_indent();
                    emit!(writer, "{}", global.declare);
                }

                if !global.delayed_init.is_empty() {
                    init.push_str(&self.init_entry(&global.name, &global.delayed_init));
                }
            }

            for function in &module.functions {
                writer.newline_and_indent();
                emit!(writer, "{}\n", function.body);
            }

            if !init.is_empty() {
                self.output_init_code(writer, &module.name, &init)?;
            }

            if !module.suffix.is_empty() {
                writer.newline_and_indent();
                emit!(writer, "{}", module.suffix);
            }
        }

        Ok(())
    }

    /// Cierre de dependencias desde las rutinas principales.
    fn reachable_closure(&mut self) -> Codegen<()> {
        let mut found = Vec::new();
        for (index, module) in self.modules.iter().enumerate() {
            for (at, function) in module.functions.iter().enumerate() {
                let is_main = self
                    .mains
                    .values()
                    .any(|main| module.key == Some(main.module) && main.name == function.name);

                if is_main {
                    found.push((index, at));
                }
            }
        }

        let defined = self.mains.len();
        if found.len() > defined {
            return Err(CodegenError::ExtraMains.into());
        } else if found.len() < defined {
            return Err(CodegenError::MissingMains.into());
        }

        for (index, at) in found {
            debug!(
                "Emitting closure of main routine {}",
                self.modules[index].functions[at].name
            );

            self.emit_function(index, at, false)?;
        }

        Ok(())
    }

    fn reachable_code(&self, writer: &mut Writer) -> Codegen<()> {
        for index in self.module_order() {
            let module = &self.modules[index];
            let output = &module.output;
            if output.is_empty() {
                continue;
            }

            if !module.prefix.is_empty() {
                writer.newline_and_indent();
                emit!(writer, "{}", module.prefix);
            }

            for section in &[&output.types, &output.forward, &output.variables, &output.functions] {
                if !section.is_empty() {
                    writer.newline_and_indent();
                    emit!(writer, "{}", section);
                }
            }

            if !module.init_code.is_empty() {
                self.output_init_code(writer, &module.name, &module.init_code)?;
            }

            if !module.suffix.is_empty() {
                writer.newline_and_indent();
                emit!(writer, "{}", module.suffix);
            }
        }

        writer.newline_and_indent();
        Ok(())
    }

    /// Emite las dependencias de un registro de uso. `current` es el
    /// módulo de la global cuyo inicializador se recorre, si hay: sus
    /// funciones necesitan además la declaración adelantada.
    fn emit_usage(&mut self, usage: &UsageRecord, current: Option<ModuleId>) -> Codegen<()> {
        for (&owner, names) in usage.iter() {
            let index = self
                .modules
                .iter()
                .position(|module| module.key == owner)
                .ok_or(CodegenError::UnknownModule)?;

            for name in &names.types {
                // Los tipos que no están en la tabla vienen del lenguaje
                if let Some(key) = self.modules[index].type_named(name) {
                    self.emit_type(index, key)?;
                }
            }

            for name in &names.variables {
                if let Some(at) = self.modules[index].variable_named(name) {
                    self.emit_global(index, at)?;
                }
            }

            if current.is_some() && current == owner {
                for name in &names.functions {
                    if let Some(at) = self.modules[index].function_named(name) {
                        self.emit_function(index, at, true)?;
                    }
                }
            }

            for name in &names.functions {
                if let Some(at) = self.modules[index].function_named(name) {
                    self.emit_function(index, at, false)?;
                }
            }
        }

        Ok(())
    }

    // Las marcas se fijan antes de recorrer las dependencias para que
    // un ciclo en el grafo de usos termine.

    fn emit_type(&mut self, index: usize, key: StdType) -> Codegen<()> {
        let usage = match self.modules[index].types.get_mut(&key) {
            Some(fragment) if !fragment.emitted => {
                fragment.emitted = true;
                fragment.usage.clone()
            }

            _ => return Ok(()),
        };

        self.emit_usage(&usage, None)?;

        let module = &mut self.modules[index];
        if let Some(fragment) = module.types.get(&key) {
            trace!("Emitting type {}", fragment.name);

            let output = &mut module.output.types;
            if !fragment.declare.is_empty() {
                output.push('\n');
                output.push_str(&fragment.declare);
            }

            if !fragment.constfunc.is_empty() {
                output.push('\n');
                output.push_str(&fragment.constfunc);
                output.push('\n');
            }
        }

        Ok(())
    }

    fn emit_global(&mut self, index: usize, at: usize) -> Codegen<()> {
        let global = &mut self.modules[index].variables[at];
        if global.emitted {
            return Ok(());
        }

        global.emitted = true;
        let (usage, owner) = (global.usage.clone(), global.module);
        self.emit_usage(&usage, owner)?;

        let global = &self.modules[index].variables[at];
        trace!("Emitting global {}", global.name);

        let declare = global.declare.clone();
        let init = if global.delayed_init.is_empty() {
            String::new()
        } else {
            self.init_entry(&global.name, &global.delayed_init)
        };

        let module = &mut self.modules[index];
        if !declare.is_empty() {
            module.output.variables.push('\n');
            module.output.variables.push_str(&declare);
        }

        module.init_code.push_str(&init);
        Ok(())
    }

    fn emit_function(&mut self, index: usize, at: usize, forward_only: bool) -> Codegen<()> {
        let function = &mut self.modules[index].functions[at];
        let flag = if forward_only {
            &mut function.emitted_forward
        } else {
            &mut function.emitted
        };

        if *flag {
            return Ok(());
        }

        *flag = true;
        let usage = function.usage.clone();
        self.emit_usage(&usage, None)?;

        let module = &mut self.modules[index];
        let function = &module.functions[at];
        if forward_only {
            trace!("Emitting forward declaration of {}", function.name);
            module.output.forward.push_str(&function.forward_decl);
        } else {
            trace!("Emitting function {}", function.name);

            let output = &mut module.output.functions;
            output.push('\n');
            output.push_str(&function.body);
            output.push('\n');
        }

        Ok(())
    }

    fn init_entry(&self, name: &str, delayed: &str) -> String {
        format!(
            "\n    {} Initializing {}...{}{}",
            self.dialect.begin_comment(),
            name,
            self.dialect.end_comment(),
            delayed
        )
    }

    /// Rutina que ejecuta las inicializaciones diferidas de un módulo.
    fn output_init_code(&self, writer: &mut Writer, module: &str, init: &str) -> Codegen<()> {
        writer.newline_and_indent();

        if self.dialect.needs_module_dynamic_initialization() {
            emit!(writer, "struct __ctlcc_InitVals_{}", module);
            writer.push_block();
            writer.newline_and_indent();
            emit!(writer, "__ctlcc_InitVals_{}( void )", module);
            writer.push_block();
            emit!(writer, "{}", init);
            writer.pop_block()?;
            writer.pop_block()?;
            emit!(writer, ";");
            writer.newline_and_indent();
            emit!(
                writer,
                "static __ctlcc_InitVals_{0} __ctlcc_GlobalInitializer_{0};\n\n",
                module
            );
        } else if self.dialect.supports_namespaces() {
            emit!(writer, "void init( void )\n{{{}\n}}\n", init);
        } else {
            emit!(writer, "void {}_init( void )\n{{{}\n}}\n", module, init);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dialect::Language;

    #[test]
    fn init_routines() {
        let init = "\n    x = f();";

        let mut writer = Writer::new();
        Generator::new(Language::C)
            .output_init_code(&mut writer, "m", init)
            .unwrap();

        assert_eq!(
            writer.finish().unwrap(),
            "\nvoid m_init( void )\n{\n    x = f();\n}\n"
        );

        let mut writer = Writer::new();
        Generator::new(Language::Cpp03)
            .output_init_code(&mut writer, "m", init)
            .unwrap();

        let text = writer.finish().unwrap();
        assert!(text.starts_with("\nstruct __ctlcc_InitVals_m\n{\n    __ctlcc_InitVals_m( void )"));
        assert!(text.ends_with("static __ctlcc_InitVals_m __ctlcc_GlobalInitializer_m;\n\n"));
    }

    #[test]
    fn setup_preamble() {
        let generator = Generator::new(Language::C);
        let setup = generator.std_library_and_setup().unwrap();

        assert!(setup.starts_with("// Autogenerated code from ctlcc\n"));
        assert!(setup.contains("\n#include <math.h>"));
        assert!(setup.ends_with("\ntypedef float ctl_number_t;\n"));
    }

    #[test]
    fn closure_needs_translated_modules() {
        let mut generator = Generator::new(Language::Cpp11);
        assert_eq!(generator.code(EmitMode::Reachable).unwrap(), "\n");

        let mut usage = UsageRecord::new();
        usage.record_function(None, "lookup1D");
        assert_eq!(
            generator.emit_usage(&usage, None).unwrap_err().into_inner(),
            CodegenError::UnknownModule
        );
    }

    #[test]
    fn empty_type_declarations_leave_no_text() {
        use crate::codegen::fragment::{ModuleDefinition, TypeFragment};

        let mut generator = Generator::new(Language::Glsl);
        let mut module = ModuleDefinition::new("std", None);
        module.types.insert(StdType::Vec3f, TypeFragment::new("vec3", ""));
        generator.modules.push(module);

        let mut writer = Writer::new();
        generator.all_code(&mut writer).unwrap();
        assert_eq!(writer.finish().unwrap(), "");

        generator.emit_type(0, StdType::Vec3f).unwrap();
        assert!(generator.modules[0].output.is_empty());
    }
}
