//! Traducción de módulos, declaraciones y sentencias a fragmentos.

use super::{
    clean_name,
    fragment::{FunctionFragment, GlobalFragment, ModuleDefinition, StdType, TypeFragment},
    remove_ns_quals,
    stdlib::STD_NAMESPACE,
    DefaultValue, Generator, InitType, MainRoutine, TranslationContext,
};

use crate::{
    ast::{Access, DataType, ExprId, ExprKind, FunctionNode, ModuleId, Param, Stmt, TypeId, VariableDecl},
    error::{Codegen, CodegenError},
};

use log::{debug, trace};

impl Generator {
    pub(super) fn module(&mut self, cx: &mut TranslationContext<'_>, id: ModuleId) -> Codegen<()> {
        let ast = cx.ast;
        let node = ast.module(id);
        let name = clean_name(&node.name);
        let tag = self.dialect.namespace_tag(&name);

        debug!("Entering module {} ({})", node.name, node.file);

        cx.module = Some(id);
        cx.module_name = name.clone();
        cx.mod_prefix.clear();
        self.namespace_tags.insert(id, tag.clone());

        // Las funciones pueden referirse a constantes aún no declaradas
        self.extract_literal_constants(cx, id)?;

        let mut definition = ModuleDefinition::new(&name, Some(id));
        let namespaces = self.dialect.supports_namespaces();
        let (begin_comment, end_comment) = (self.dialect.begin_comment(), self.dialect.end_comment());

        definition.prefix = cx.capture(|cx| {
            cx.writer.newline_and_indent();
            emit!(
                cx.writer,
                "{} Module {} ({}){}\n",
                begin_comment,
                node.name,
                node.file,
                end_comment
            );

            cx.writer.newline_and_indent();
            if namespaces {
                emit!(cx.writer, "namespace {} {{", name);
                cx.writer.newline_and_indent();
                emit!(cx.writer, "using namespace {};", STD_NAMESPACE);
                cx.writer.newline_and_indent();
            }

            Ok(())
        })?;

        if !namespaces {
            cx.mod_prefix = tag.clone();
            definition.call_prefix = tag;
        }

        for (index, &ty) in node.structs.iter().enumerate() {
            let fragment = self.structure(cx, ty)?;
            definition.types.insert(StdType::Struct(index), fragment);
        }

        cx.definition = Some(definition);

        for constant in &node.constants {
            self.global(cx, constant)?;
        }

        for function in &node.functions {
            self.function(cx, function)?;
        }

        let suffix = cx.capture(|cx| {
            cx.writer.newline_and_indent();
            if namespaces {
                emit!(cx.writer, "}} // namespace {}", cx.module_name);
                cx.writer.newline_and_indent();
            }

            Ok(())
        })?;

        let mut definition = cx.definition.take().ok_or(CodegenError::OutsideModule)?;
        definition.suffix = suffix;

        debug!(
            "Leaving module {}: {} types, {} globals, {} functions",
            definition.name,
            definition.types.len(),
            definition.variables.len(),
            definition.functions.len()
        );

        self.modules.push(definition);
        cx.module = None;

        Ok(())
    }

    /// Pliega constantes de puros literales y marca las funciones del
    /// módulo que se llaman al inicializar globales.
    fn extract_literal_constants(&mut self, cx: &mut TranslationContext<'_>, id: ModuleId) -> Codegen<()> {
        let ast = cx.ast;
        for constant in &ast.module(id).constants {
            let init = match constant.init {
                Some(init) => init,
                None => continue,
            };

            if self.is_all_literals(cx, init) {
                if let ExprKind::Value { .. } = ast.expr(init).kind {
                    continue;
                }

                let text = cx.capture(|cx| self.expr(cx, init))?;
                self.global_literals.insert(constant.symbol, text);
            } else {
                self.collect_init_calls(cx, init);
            }
        }

        Ok(())
    }

    fn is_all_literals(&self, cx: &TranslationContext<'_>, id: ExprId) -> bool {
        let expr = cx.ast.expr(id);
        match &expr.kind {
            ExprKind::Value { elements } => elements.iter().all(|&element| self.is_all_literals(cx, element)),
            ExprKind::Binary { left, right, .. } => {
                self.is_all_literals(cx, *left) && self.is_all_literals(cx, *right)
            }

            ExprKind::Unary { operand, .. } => self.is_all_literals(cx, *operand),
            _ => expr.is_literal(),
        }
    }

    /// Registra toda función del módulo actual llamada dentro de `id`.
    /// Retorna si alguna se encontró.
    fn collect_init_calls(&mut self, cx: &TranslationContext<'_>, id: ExprId) -> bool {
        let ast = cx.ast;
        match &ast.expr(id).kind {
            ExprKind::Call { function, arguments } => {
                let mut found = false;
                if let ExprKind::Name { symbol, .. } = ast.expr(*function).kind {
                    if ast.symbol(symbol).module == cx.module {
                        self.funcs_used_in_init.insert(symbol);
                        found = true;
                    }
                }

                for &argument in arguments {
                    found |= self.collect_init_calls(cx, argument);
                }

                found
            }

            ExprKind::Value { elements } => elements
                .iter()
                .fold(false, |found, &element| self.collect_init_calls(cx, element) | found),

            ExprKind::Binary { left, right, .. } => {
                let left = self.collect_init_calls(cx, *left);
                self.collect_init_calls(cx, *right) | left
            }

            ExprKind::Unary { operand, .. } => self.collect_init_calls(cx, *operand),
            _ => false,
        }
    }

    /// Indica si la expresión lee una global del módulo actual que se
    /// inicializa de forma diferida.
    fn uses_uninit_globals(&self, cx: &TranslationContext<'_>, id: ExprId) -> bool {
        let ast = cx.ast;
        match &ast.expr(id).kind {
            ExprKind::Name { symbol, .. } => {
                ast.symbol(*symbol).module == cx.module
                    && self.global_init.get(symbol) == Some(&InitType::Func)
            }

            ExprKind::Value { elements } => elements.iter().any(|&element| self.uses_uninit_globals(cx, element)),
            ExprKind::Call { arguments, .. } => {
                arguments.iter().any(|&argument| self.uses_uninit_globals(cx, argument))
            }

            ExprKind::Binary { left, right, .. } => {
                self.uses_uninit_globals(cx, *left) || self.uses_uninit_globals(cx, *right)
            }

            ExprKind::Unary { operand, .. } => self.uses_uninit_globals(cx, *operand),
            _ => false,
        }
    }

    fn calls_module_functions(&self, cx: &TranslationContext<'_>, id: ExprId) -> bool {
        let ast = cx.ast;
        match &ast.expr(id).kind {
            ExprKind::Call { function, arguments } => {
                let local = match ast.expr(*function).kind {
                    ExprKind::Name { symbol, .. } => ast.symbol(symbol).module == cx.module,
                    _ => false,
                };

                local || arguments.iter().any(|&argument| self.calls_module_functions(cx, argument))
            }

            ExprKind::Value { elements } => elements.iter().any(|&element| self.calls_module_functions(cx, element)),
            ExprKind::Binary { left, right, .. } => {
                self.calls_module_functions(cx, *left) || self.calls_module_functions(cx, *right)
            }

            ExprKind::Unary { operand, .. } => self.calls_module_functions(cx, *operand),
            _ => false,
        }
    }

    /// Una expresión cuyo valor no cambia tras la inicialización.
    fn is_const_expr(&self, cx: &TranslationContext<'_>, id: ExprId) -> bool {
        let ast = cx.ast;
        match &ast.expr(id).kind {
            ExprKind::Call { .. } | ExprKind::Size { .. } => false,
            ExprKind::Name { symbol, .. } => ast.symbol(*symbol).value().is_some(),
            ExprKind::Binary { left, right, .. } => {
                self.is_const_expr(cx, *left) && self.is_const_expr(cx, *right)
            }

            ExprKind::Unary { operand, .. } => self.is_const_expr(cx, *operand),
            ExprKind::Value { elements } => elements.iter().all(|&element| self.is_const_expr(cx, element)),
            ExprKind::Index { array, index } => self.is_const_expr(cx, *array) && self.is_const_expr(cx, *index),
            ExprKind::Member { object, .. } => self.is_const_expr(cx, *object),
            _ => true,
        }
    }

    fn structure(&mut self, cx: &mut TranslationContext<'_>, ty: TypeId) -> Codegen<TypeFragment> {
        let ast = cx.ast;
        let (name, members) = match ast.ty(ty) {
            DataType::Struct { name, members } => (remove_ns_quals(name), members),
            _ => return Err(CodegenError::ArrayCoreType.into()),
        };

        self.struct_owners.insert(name.clone(), cx.module);

        let typedefs = self.dialect.needs_struct_typedefs();
        let (declare, usage) = cx.tracking(|cx| {
            cx.capture(|cx| {
                cx.writer.newline_and_indent();
                if typedefs {
                    emit!(cx.writer, "typedef struct ctl_typedef_{}{}", cx.mod_prefix, name);
                } else {
                    emit!(cx.writer, "struct {}{}", cx.mod_prefix, name);
                }

                cx.writer.push_block();
                for member in members {
                    cx.writer.newline_and_indent();
                    self.declare(cx, &member.name, member.ty, false, None, false)?;
                    emit!(cx.writer, ";");
                }

                cx.writer.pop_block()?;
                if typedefs {
                    emit!(cx.writer, " {}{};\n", cx.mod_prefix, name);
                } else {
                    emit!(cx.writer, ";\n");
                }

                Ok(())
            })
        })?;

        trace!("Struct {} uses {:?}", name, usage);
        Ok(TypeFragment::new(&name, &declare).uses(usage))
    }

    fn global(&mut self, cx: &mut TranslationContext<'_>, decl: &VariableDecl) -> Codegen<()> {
        if self.global_literals.contains_key(&decl.symbol) {
            return Ok(());
        }

        let ast = cx.ast;
        let info = ast.symbol(decl.symbol);
        let name = remove_ns_quals(&decl.name);

        let mut is_const = !info.is_writable();
        let mut deferred = false;
        if let Some(init) = decl.init {
            if self.dialect.uses_function_initializers()
                && (self.calls_module_functions(cx, init) || self.uses_uninit_globals(cx, init))
            {
                is_const = false;
                deferred = true;
            }
        }

        let mut fragment = GlobalFragment {
            module: cx.module,
            name: name.clone(),
            ..Default::default()
        };

        let global_prefix = self.dialect.global_prefix();
        let ((declare, delayed), usage) = cx.tracking(|cx| {
            let mut delayed = String::new();
            let mut init = InitType::Assign;

            let declare = cx.capture(|cx| {
                if !global_prefix.is_empty() {
                    emit!(cx.writer, "{} ", global_prefix);
                }

                init = self.declare(cx, &decl.name, info.ty, is_const, None, true)?;
                if deferred {
                    init = InitType::Func;
                }

                if !name.contains('$') {
                    let target = format!("{}{}", cx.mod_prefix, name);
                    delayed = self.do_init(cx, init, info.ty, decl.init, &target)?;
                }

                Ok(())
            })?;

            if name.contains('$') {
                if let Some(value) = decl.init {
                    let default = self.default_value(cx, init, value, decl)?;
                    self.default_mappings.insert(decl.symbol, default);
                }

                // Solo interesa el registro de uso
                return Ok((String::new(), String::new()));
            }

            self.global_init.insert(decl.symbol, init);
            Ok((declare, delayed))
        })?;

        fragment.declare = declare;
        fragment.delayed_init = delayed;
        fragment.usage = usage;

        trace!("Global {} uses {:?}", fragment.name, fragment.usage);
        cx.definition()?.variables.push(fragment);

        Ok(())
    }

    /// Valor de sustitución de un argumento por omisión.
    fn default_value(
        &mut self,
        cx: &mut TranslationContext<'_>,
        init: InitType,
        value: ExprId,
        decl: &VariableDecl,
    ) -> Codegen<DefaultValue> {
        let ast = cx.ast;
        match &ast.expr(value).kind {
            ExprKind::Name { name, symbol } if self.global_init.contains_key(symbol) => Ok(DefaultValue {
                text: remove_ns_quals(name),
                owner: ast.symbol(*symbol).module,
            }),

            ExprKind::Name { .. } => {
                let text = cx.capture(|cx| self.expr(cx, value))?;
                Ok(DefaultValue { text, owner: None })
            }

            _ if init == InitType::Func => Err(CodegenError::ComplexDefault.at(decl.line)),
            _ => {
                let text = cx.initializing(init, "", |cx| cx.capture(|cx| self.expr(cx, value)))?;
                Ok(DefaultValue { text, owner: None })
            }
        }
    }

    fn local(&mut self, cx: &mut TranslationContext<'_>, decl: &VariableDecl) -> Codegen<()> {
        let ast = cx.ast;
        let info = ast.symbol(decl.symbol);
        let is_const = !info.is_writable() && decl.init.map_or(false, |init| self.is_const_expr(cx, init));

        cx.writer.newline_and_indent();
        let init = self.declare(cx, &decl.name, info.ty, is_const, None, false)?;

        let target = remove_ns_quals(&decl.name);
        let delayed = self.do_init(cx, init, info.ty, decl.init, &target)?;
        if !delayed.is_empty() {
            return Err(CodegenError::DelayedLocalInit.at(decl.line));
        }

        Ok(())
    }

    /// Emite la inicialización de una declaración ya escrita. Retorna
    /// el texto diferido, que solo existe para globales con `Func`.
    fn do_init(
        &mut self,
        cx: &mut TranslationContext<'_>,
        init: InitType,
        ty: TypeId,
        value: Option<ExprId>,
        target: &str,
    ) -> Codegen<String> {
        let ast = cx.ast;
        let value = match value {
            Some(value) => value,
            None => {
                match ast.ty(ty) {
                    DataType::Bool => emit!(cx.writer, " = {};", self.dialect.bool_literal(false)),
                    DataType::Int | DataType::UInt | DataType::Half | DataType::Float => {
                        emit!(cx.writer, " = 0;")
                    }

                    _ => emit!(cx.writer, ";"),
                }

                return Ok(String::new());
            }
        };

        cx.initializing(init, target, |cx| match init {
            InitType::Ctor => {
                emit!(cx.writer, "( ");
                self.expr(cx, value)?;
                emit!(cx.writer, " );");
                Ok(String::new())
            }

            InitType::Func => {
                emit!(cx.writer, ";");

                let text = cx.capture(|cx| {
                    if let ExprKind::Value { .. } = ast.expr(value).kind {
                        return self.expr(cx, value);
                    }

                    cx.writer.push_indent();
                    cx.writer.newline_and_indent();
                    emit!(cx.writer, "{} = ", target);
                    self.cast_from(cx, ty, value)?;
                    emit!(cx.writer, ";");
                    cx.writer.pop_indent()
                })?;

                if cx.in_function {
                    cx.writer.push_block();
                    cx.writer.out().push_str(&text);
                    cx.writer.pop_block()?;
                    Ok(String::new())
                } else {
                    Ok(text)
                }
            }

            InitType::Assign | InitType::None => {
                emit!(cx.writer, " = ");
                self.expr(cx, value)?;
                emit!(cx.writer, ";");
                Ok(String::new())
            }
        })
    }

    /// Escribe una declaración de tipo y nombre. Un nombre vacío
    /// escribe solo el tipo.
    pub(super) fn declare(
        &mut self,
        cx: &mut TranslationContext<'_>,
        name: &str,
        ty: TypeId,
        is_const: bool,
        param: Option<Access>,
        global: bool,
    ) -> Codegen<InitType> {
        let ast = cx.ast;
        let mut init = InitType::Assign;
        let mut post_decl = String::new();
        let mut writable = param.map_or(false, Access::is_writable);
        let mut by_reference = false;

        let out_qualifiers = self.dialect.uses_out_qualifiers();
        if writable && out_qualifiers {
            match param {
                Some(Access::Write) => emit!(cx.writer, "out "),
                _ => emit!(cx.writer, "inout "),
            }
        }

        let const_word = self.dialect.const_literal(global);

        match ast.ty(ty) {
            DataType::Void => emit!(cx.writer, "void"),
            DataType::Bool | DataType::Int | DataType::UInt | DataType::Half | DataType::Float => {
                let scalar = self.scalar_name(ty)?;
                if is_const {
                    emit!(cx.writer, "{} ", const_word);
                }

                emit!(cx.writer, "{}", scalar);
            }

            DataType::String => {
                if is_const {
                    emit!(cx.writer, "const char *");
                } else {
                    emit!(cx.writer, "char *");
                }
            }

            DataType::Struct { name: struct_name, .. } => {
                if self.dialect.uses_function_initializers() {
                    init = InitType::Func;
                }

                by_reference = param == Some(Access::Read) && self.dialect.supports_references();
                if is_const && (init == InitType::Assign || by_reference) {
                    emit!(cx.writer, "{} ", const_word);
                }

                let plain = remove_ns_quals(struct_name);
                let owner = self.struct_owners.get(&plain).copied().flatten();
                cx.record_type(owner, &plain);

                let qualifier = self.qualifier(cx, owner);
                emit!(cx.writer, "{}{}", qualifier, plain);
            }

            DataType::Array { .. } => {
                let info = self.collapse(cx, ty)?;
                if info.is_core() {
                    cx.record_type(None, &info.core);
                }

                post_decl = array_suffix(&info.sizes);
                if post_decl.is_empty()
                    && info.is_core()
                    && self.dialect.supports_struct_operators()
                    && self.dialect.supports_struct_constructors()
                {
                    init = InitType::Ctor;
                }

                if is_const {
                    emit!(cx.writer, "{} ", const_word);
                }

                emit!(cx.writer, "{}", info.core);
                writable = writable && post_decl.is_empty();
            }
        }

        if name.is_empty() {
            return Ok(init);
        }

        if writable && !out_qualifiers {
            if self.dialect.supports_references() {
                emit!(cx.writer, " &");
            } else if self.dialect.supports_pointers() {
                emit!(cx.writer, " *");
            } else {
                emit!(cx.writer, " ");
            }
        } else if by_reference {
            emit!(cx.writer, " &");
        } else {
            emit!(cx.writer, " ");
        }

        if global {
            emit!(cx.writer, "{}", cx.mod_prefix);
        }

        emit!(cx.writer, "{}{}", remove_ns_quals(name), post_decl);
        Ok(init)
    }

    fn function(&mut self, cx: &mut TranslationContext<'_>, node: &FunctionNode) -> Codegen<()> {
        let ast = cx.ast;
        let signature = match ast.signature(node.symbol) {
            Some(signature) => signature,
            None => return Ok(()),
        };

        if signature.returns_varying {
            return Err(CodegenError::VaryingReturn.at(node.line));
        }

        cx.output_vars.clear();

        let mut name = remove_ns_quals(&node.name);
        let mut is_main = name == cx.module_name;
        if name == "main" {
            name = cx.module_name.clone();
            is_main = true;
        }

        let used_in_init = self.funcs_used_in_init.contains(&node.symbol);
        let function_prefix = self.dialect.function_prefix();
        let inline = self.dialect.inline_keyword();

        let (mut fragment, usage) = cx.tracking(|cx| {
            let mut fragment = FunctionFragment::new(&name, String::new());

            if is_main {
                self.register_main(cx, &name, node.symbol)?;
                fragment.header = cx.capture(|cx| {
                    self.declare(cx, "", signature.ret, false, None, false)?;
                    emit!(cx.writer, " {}{}", cx.mod_prefix, name);
                    self.parameters(cx, &signature.params, false)?;
                    emit!(cx.writer, ";");
                    Ok(())
                })?;
            }

            if used_in_init {
                fragment.forward_decl = cx.capture(|cx| {
                    cx.writer.newline_and_indent();
                    if !function_prefix.is_empty() {
                        emit!(cx.writer, "{} ", function_prefix);
                    }

                    self.declare(cx, "", signature.ret, false, None, false)?;
                    emit!(cx.writer, " {}{}", cx.mod_prefix, name);
                    self.parameters(cx, &signature.params, false)?;
                    emit!(cx.writer, ";");
                    Ok(())
                })?;
            }

            fragment.body = cx.capture(|cx| {
                cx.writer.newline_and_indent();
                if !function_prefix.is_empty() {
                    emit!(cx.writer, "{} ", function_prefix);
                }

                if !is_main && !used_in_init && !inline.is_empty() {
                    emit!(cx.writer, "{} ", inline);
                }

                self.declare(cx, "", signature.ret, false, None, false)?;
                cx.writer.newline_and_indent();
                emit!(cx.writer, "{}{}", cx.mod_prefix, name);
                self.parameters(cx, &signature.params, true)?;

                cx.writer.push_block();
                cx.in_function = true;
                let body = node.body.iter().try_for_each(|stmt| self.statement(cx, stmt));
                cx.in_function = false;
                body?;

                cx.writer.pop_block()?;
                emit!(cx.writer, "\n\n");
                Ok(())
            })?;

            Ok(fragment)
        })?;

        fragment.usage = usage;
        trace!("Function {} uses {:?}", fragment.name, fragment.usage);

        cx.definition()?.functions.push(fragment);
        Ok(())
    }

    fn register_main(
        &mut self,
        cx: &TranslationContext<'_>,
        name: &str,
        symbol: crate::ast::SymbolId,
    ) -> Codegen<()> {
        if self.mains.contains_key(name) {
            return Err(CodegenError::DuplicateMain(name.to_owned()).into());
        }

        let module = cx.module.ok_or(CodegenError::OutsideModule)?;
        let qualified = format!("{}{}", self.qualifier_of(module), name);

        debug!("Registering main routine {} as {}", name, qualified);
        self.mains.insert(
            name.to_owned(),
            MainRoutine {
                name: name.to_owned(),
                qualified,
                module,
                symbol,
            },
        );

        Ok(())
    }

    fn qualifier_of(&self, module: ModuleId) -> String {
        self.namespace_tags.get(&module).cloned().unwrap_or_default()
    }

    /// Lista de parámetros entre paréntesis, incluyendo los tamaños
    /// implícitos. En el cuerpo además se registran las salidas y los
    /// valores por omisión.
    fn parameters(&mut self, cx: &mut TranslationContext<'_>, params: &[Param], body: bool) -> Codegen<()> {
        if params.is_empty() {
            emit!(cx.writer, "( void )");
            return Ok(());
        }

        emit!(cx.writer, "( ");
        for (index, param) in params.iter().enumerate() {
            if index > 0 {
                emit!(cx.writer, ", ");
            }

            let access = param.access;
            self.declare(cx, &param.name, param.ty, access == Access::Read, Some(access), false)?;
            self.size_parameter(cx, param)?;

            if body {
                if access.is_writable() {
                    cx.output_vars.insert(remove_ns_quals(&param.name));
                }

                self.parameter_default(cx, param)?;
            }
        }

        emit!(cx.writer, " )");
        Ok(())
    }

    /// Parámetro implícito con el tamaño de las dimensiones libres.
    fn size_parameter(&mut self, cx: &mut TranslationContext<'_>, param: &Param) -> Codegen<()> {
        let free = self.free_dimensions(cx, param.ty)?;
        let name = remove_ns_quals(&param.name);

        let key = match free {
            0 => return Ok(()),
            1 => {
                emit!(cx.writer, ", int {}_size", name);
                return Ok(());
            }

            2 => StdType::Vec2i,
            3 => StdType::Vec3i,
            _ => return Err(CodegenError::TooManyFreeDimensions.into()),
        };

        let fallback = if free == 2 { "ctl_vec2i_t" } else { "ctl_vec3i_t" };
        let (ty, _) = self.std_type_names(key, fallback, "");
        cx.record_type(None, &ty);

        if self.dialect.supports_references() {
            emit!(cx.writer, ", const {} &{}_size", ty, name);
        } else {
            emit!(cx.writer, ", {} {}_size", ty, name);
        }

        Ok(())
    }

    pub(super) fn free_dimensions(&mut self, cx: &TranslationContext<'_>, ty: TypeId) -> Codegen<usize> {
        match cx.ast.ty(ty) {
            DataType::Array { .. } => {
                let info = self.collapse(cx, ty)?;
                Ok(info.sizes.iter().filter(|&&size| size == 0).count())
            }

            _ => Ok(0),
        }
    }

    fn parameter_default(&mut self, cx: &mut TranslationContext<'_>, param: &Param) -> Codegen<()> {
        let ast = cx.ast;
        let default = match param.default {
            Some(default) => default,
            None => return Ok(()),
        };

        let symbol = match ast.expr(default).kind {
            ExprKind::Name { symbol, .. } => symbol,
            _ => return Ok(()),
        };

        let value = match ast.symbol(symbol).value() {
            Some(value) => value,
            None => return Ok(()),
        };

        let mapping = match &ast.expr(value).kind {
            ExprKind::Name { name, symbol } if self.global_init.contains_key(symbol) => DefaultValue {
                text: remove_ns_quals(name),
                owner: ast.symbol(*symbol).module,
            },

            _ => DefaultValue {
                text: cx.capture(|cx| self.expr(cx, value))?,
                owner: None,
            },
        };

        self.default_mappings.insert(symbol, mapping);
        Ok(())
    }

    /// Traduce una sentencia. Los errores sin línea toman la de la
    /// sentencia.
    fn statement(&mut self, cx: &mut TranslationContext<'_>, stmt: &Stmt) -> Codegen<()> {
        self.statement_kind(cx, stmt)
            .map_err(|error| error.or_at(stmt.line()))
    }

    fn statement_kind(&mut self, cx: &mut TranslationContext<'_>, stmt: &Stmt) -> Codegen<()> {
        let ast = cx.ast;
        let in_else = std::mem::replace(&mut cx.in_else, false);

        match stmt {
            Stmt::Variable(decl) => self.local(cx, decl),

            Stmt::Assign { lhs, rhs, .. } => {
                cx.writer.newline_and_indent();
                self.expr(cx, *lhs)?;
                emit!(cx.writer, " = ");
                self.cast_from(cx, ast.expr(*lhs).ty, *rhs)?;
                emit!(cx.writer, ";");
                Ok(())
            }

            Stmt::Expr { expr, .. } => {
                if !self.dialect.supports_print() && self.is_print_call(cx, *expr) {
                    return Ok(());
                }

                cx.writer.newline_and_indent();
                self.expr(cx, *expr)?;
                emit!(cx.writer, ";");
                Ok(())
            }

            Stmt::If {
                condition,
                then,
                otherwise,
                ..
            } => {
                if in_else {
                    emit!(cx.writer, " ");
                } else {
                    cx.writer.newline_and_indent();
                }

                emit!(cx.writer, "if ( ");
                self.cast_from(cx, TypeId::BOOL, *condition)?;
                emit!(cx.writer, " )");
                self.branch(cx, then)?;

                if otherwise.is_empty() {
                    return Ok(());
                }

                cx.writer.newline_and_indent();
                emit!(cx.writer, "else");

                match otherwise.as_slice() {
                    [chained @ Stmt::If { .. }] => {
                        cx.in_else = true;
                        self.statement(cx, chained)
                    }

                    _ => self.branch(cx, otherwise),
                }
            }

            Stmt::Return { value, ty, .. } => {
                cx.writer.newline_and_indent();
                emit!(cx.writer, "return");
                if let Some(value) = value {
                    emit!(cx.writer, " ");
                    self.cast_from(cx, *ty, *value)?;
                }

                emit!(cx.writer, ";");
                Ok(())
            }

            Stmt::While { condition, body, .. } => {
                cx.writer.newline_and_indent();
                emit!(cx.writer, "while ( ");
                self.cast_from(cx, TypeId::BOOL, *condition)?;
                emit!(cx.writer, " )");
                self.block(cx, body)
            }

            Stmt::For {
                init,
                condition,
                update,
                body,
                ..
            } => self.for_loop(cx, init, *condition, update, body),
        }
    }

    /// Una sola sentencia va sangrada; varias van en un bloque.
    fn branch(&mut self, cx: &mut TranslationContext<'_>, stmts: &[Stmt]) -> Codegen<()> {
        match stmts {
            [single] => {
                cx.writer.push_indent();
                self.statement(cx, single)?;
                cx.writer.pop_indent()
            }

            _ => self.block(cx, stmts),
        }
    }

    fn block(&mut self, cx: &mut TranslationContext<'_>, stmts: &[Stmt]) -> Codegen<()> {
        cx.writer.push_block();
        for stmt in stmts {
            self.statement(cx, stmt)?;
        }

        cx.writer.pop_block()
    }

    fn for_loop(
        &mut self,
        cx: &mut TranslationContext<'_>,
        init: &[Stmt],
        condition: ExprId,
        update: &[Stmt],
        body: &[Stmt],
    ) -> Codegen<()> {
        let header = match (init, update) {
            ([init], [update]) => {
                let init = cx.capture(|cx| self.statement(cx, init))?;
                let update = cx.capture(|cx| self.statement(cx, update))?;
                let (init, update) = (init.trim(), update.trim());

                if init.contains('\n') || update.contains('\n') {
                    None
                } else {
                    let strip = |text: &str| text.strip_suffix(';').unwrap_or(text).to_owned();
                    Some((strip(init), strip(update)))
                }
            }

            _ => None,
        };

        if let Some((init, update)) = header {
            cx.writer.newline_and_indent();
            emit!(cx.writer, "for ( {}; ", init);
            self.cast_from(cx, TypeId::BOOL, condition)?;
            emit!(cx.writer, "; {} )", update);
            return self.block(cx, body);
        }

        cx.writer.push_block();
        for stmt in init {
            self.statement(cx, stmt)?;
        }

        cx.writer.newline_and_indent();
        emit!(cx.writer, "while ( ");
        self.cast_from(cx, TypeId::BOOL, condition)?;
        emit!(cx.writer, " )");

        cx.writer.push_block();
        for stmt in body.iter().chain(update) {
            self.statement(cx, stmt)?;
        }

        cx.writer.pop_block()?;
        cx.writer.pop_block()
    }

    fn is_print_call(&self, cx: &TranslationContext<'_>, id: ExprId) -> bool {
        let ast = cx.ast;
        match ast.expr(id).kind {
            ExprKind::Call { function, .. } => match &ast.expr(function).kind {
                ExprKind::Name { name, symbol } => {
                    ast.symbol(*symbol).module.is_none() && is_std_print(&remove_ns_quals(name))
                }

                _ => false,
            },

            _ => false,
        }
    }
}

fn is_std_print(name: &str) -> bool {
    matches!(
        name,
        "print_bool" | "print_int" | "print_unsigned_int" | "print_half" | "print_float" | "print_string"
    )
}

/// Dimensiones de arreglo que quedan tras colapsar vectores y matrices.
fn array_suffix(sizes: &[i64]) -> String {
    let mut suffix = String::new();
    let mut need_open = true;
    let mut factors = 0;

    for &size in sizes {
        if size < 0 {
            break;
        }

        if need_open {
            suffix.push('[');
            need_open = false;
        }

        if size == 0 {
            suffix.push(']');
            need_open = true;
            factors = 0;
            continue;
        }

        if factors > 0 {
            suffix.push_str(" * ");
        }

        suffix.push_str(&size.to_string());
        factors += 1;
    }

    if !need_open {
        suffix.push(']');
    }

    suffix
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        ast::Ast,
        dialect::Language,
    };

    #[test]
    fn array_suffixes() {
        assert_eq!(array_suffix(&[5]), "[5]");
        assert_eq!(array_suffix(&[2, 3]), "[2 * 3]");
        assert_eq!(array_suffix(&[0, 0, 0, 3]), "[][][][3]");
        assert_eq!(array_suffix(&[-3]), "");
        assert_eq!(array_suffix(&[-4, -4]), "");
        assert_eq!(array_suffix(&[0]), "[]");
    }

    fn translate(language: Language, ast: &Ast) -> Generator {
        let mut generator = Generator::new(language);
        generator.translate_all(ast).unwrap();
        generator
    }

    #[test]
    fn struct_declarations() {
        let mut ast = Ast::new();
        let module = ast.add_module("shapes", "shapes.ctl");
        let f3 = ast.array(TypeId::FLOAT, 3);
        ast.define_struct(module, "Pixel", &[("rgb", f3), ("alpha", TypeId::FLOAT)]);

        let cpp = translate(Language::Cpp11, &ast);
        let pixel = &cpp.modules()[1].types[&StdType::Struct(0)];
        assert_eq!(pixel.name, "Pixel");
        assert_eq!(
            pixel.declare,
            "\nstruct Pixel\n{\n    ctl_vec3f_t rgb;\n    ctl_number_t alpha;\n};\n"
        );

        let usage = pixel.usage.module(None).unwrap();
        assert!(usage.types.contains("ctl_vec3f_t"));

        let c = translate(Language::C, &ast);
        let pixel = &c.modules()[1].types[&StdType::Struct(0)];
        assert!(pixel.declare.starts_with("\ntypedef struct ctl_typedef_shapes_Pixel\n{"));
        assert!(pixel.declare.ends_with("} shapes_Pixel;\n"));
    }

    #[test]
    fn module_prefix_and_suffix() {
        let mut ast = Ast::new();
        ast.add_module("grade", "grade.ctl");

        let cpp = translate(Language::Cpp03, &ast);
        let module = &cpp.modules()[1];
        assert_eq!(
            module.prefix,
            "\n// Module grade (grade.ctl)\n\nnamespace grade {\nusing namespace _ctlcc_;\n"
        );
        assert_eq!(module.suffix, "\n} // namespace grade\n");
        assert!(module.call_prefix.is_empty());

        let c = translate(Language::C, &ast);
        assert_eq!(c.modules()[1].call_prefix, "grade_");
        assert_eq!(c.modules()[1].suffix, "\n");
    }

    #[test]
    fn literal_constants_are_folded() {
        let mut ast = Ast::new();
        let module = ast.add_module("m", "m.ctl");
        let two = ast.float_lit(2.0);
        let half = ast.float_lit(0.5);
        let sum = ast.binary(crate::ast::Token::Plus, two, half);
        ast.define_constant(module, "k", TypeId::FLOAT, Some(sum));

        let generator = translate(Language::C, &ast);
        assert!(generator.modules()[1].variables.is_empty());
        assert_eq!(generator.global_literals.values().next().unwrap(), "2.0F + 0.5F");
    }

    #[test]
    fn local_declarations() {
        let mut ast = Ast::new();
        let module = ast.add_module("m", "m.ctl");
        let one = ast.int_lit(1);
        let count = ast.local("count", TypeId::INT, false, Some(one));
        let flag = ast.local("flag", TypeId::BOOL, true, None);
        let function = ast.declare_function(Some(module), "helper", TypeId::VOID, vec![]);
        ast.define_function(module, function, vec![count, flag]);

        let generator = translate(Language::Cpp11, &ast);
        let body = &generator.modules()[1].functions[0].body;
        assert_eq!(
            body,
            "\nstatic inline void\nhelper( void )\n{\n    const int count = 1;\n    bool flag = false;\n}\n\n"
        );
    }

    #[test]
    fn errors_take_the_statement_line() {
        let mut ast = Ast::new();
        let module = ast.add_module("m", "m.ctl");
        let table = ast.array(TypeId::FLOAT, 3);
        let local = ast.local("table", table, true, None);
        let symbol = match &local {
            Stmt::Variable(decl) => decl.symbol,
            _ => unreachable!(),
        };

        let name = ast.name(symbol);
        let size = ast.size(name);
        let function = ast.declare_function(Some(module), "count", TypeId::VOID, vec![]);
        ast.define_function(
            module,
            function,
            vec![
                local,
                Stmt::Expr {
                    expr: size,
                    line: crate::source::Line::at(5),
                },
            ],
        );

        let error = Generator::new(Language::C).translate_all(&ast).unwrap_err();
        assert_eq!(error.line().number(), Some(5));
        assert_eq!(error.into_inner(), CodegenError::SizeOperator);
    }
}
