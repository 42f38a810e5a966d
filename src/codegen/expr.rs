//! Traducción de expresiones.

use super::{escape_literal, fragment::StdType, remove_ns_quals, ArrayInfo, Generator, InitType, TranslationContext};

use crate::{
    ast::{DataType, ExprId, ExprKind, SymbolId, Token, TypeId},
    error::{Codegen, CodegenError},
    source::Line,
};

impl Generator {
    pub(super) fn expr(&mut self, cx: &mut TranslationContext<'_>, id: ExprId) -> Codegen<()> {
        let ast = cx.ast;
        let expr = ast.expr(id);

        match &expr.kind {
            ExprKind::Bool(value) => emit!(cx.writer, "{}", self.dialect.bool_literal(*value)),
            ExprKind::Int(value) => emit!(cx.writer, "{}", value),
            ExprKind::UInt(value) => emit!(cx.writer, "{}", value),
            ExprKind::Half(value) => {
                if !self.dialect.supports_half_type() {
                    return Err(CodegenError::HalfUnsupported.at(expr.line));
                }

                emit!(cx.writer, "half( {:?}F )", value);
            }

            ExprKind::Float(value) => {
                emit!(cx.writer, "{:?}{}", value, self.precision.literal_suffix())
            }

            ExprKind::String(value) => emit!(cx.writer, "\"{}\"", escape_literal(value)),
            ExprKind::Name { name, symbol } => return self.name(cx, name, *symbol),

            ExprKind::Binary {
                op,
                operand_type,
                left,
                right,
            } => {
                cx.expr_level += 1;
                let result = self.binary(cx, *op, *operand_type, *left, *right);
                cx.expr_level -= 1;
                return result;
            }

            ExprKind::Unary { op, operand } => {
                cx.expr_level += 1;
                emit!(cx.writer, "{}", token(*op));
                let result = self.cast_from(cx, expr.ty, *operand);
                cx.expr_level -= 1;
                return result;
            }

            ExprKind::Index { .. } => return self.index(cx, id),
            ExprKind::Member { object, member } => {
                self.expr(cx, *object)?;
                emit!(cx.writer, ".{}", member);
            }

            ExprKind::Size { .. } => return Err(CodegenError::SizeOperator.at(expr.line)),
            ExprKind::Call { function, arguments } => {
                return self.call(cx, expr.line, *function, arguments)
            }

            ExprKind::Value { elements } => {
                let target = cx.init_target.clone();
                let mut index = 0;
                return self.value_recurse(cx, elements, expr.ty, &mut index, &target);
            }
        }

        Ok(())
    }

    fn name(&mut self, cx: &mut TranslationContext<'_>, name: &str, symbol: SymbolId) -> Codegen<()> {
        if let Some(literal) = self.global_literals.get(&symbol) {
            emit!(cx.writer, "{}", literal);
            return Ok(());
        }

        let ast = cx.ast;
        let info = ast.symbol(symbol);
        let plain = remove_ns_quals(name);

        if info.is_function() {
            match info.module {
                Some(_) => {
                    let qualifier = self.qualifier(cx, info.module);
                    emit!(cx.writer, "{}{}", qualifier, plain);
                }

                None => {
                    let mapped = self.std_math.get(&plain).unwrap_or(&plain);
                    emit!(cx.writer, "{}", mapped);
                }
            }

            cx.record_function(info.module, &plain);
            return Ok(());
        }

        if self.global_init.contains_key(&symbol) {
            let qualifier = self.qualifier(cx, info.module);
            emit!(cx.writer, "{}{}", qualifier, plain);
            cx.record_variable(info.module, &plain);
            return Ok(());
        }

        if let Some(mapped) = self.std_names.get(&plain) {
            emit!(cx.writer, "{}", mapped);
        } else if !self.dialect.supports_references()
            && self.dialect.supports_pointers()
            && cx.output_vars.contains(&plain)
        {
            emit!(cx.writer, "(*{})", plain);
        } else {
            emit!(cx.writer, "{}", plain);
        }

        Ok(())
    }

    fn binary(
        &mut self,
        cx: &mut TranslationContext<'_>,
        op: Token,
        operand_type: TypeId,
        left: ExprId,
        right: ExprId,
    ) -> Codegen<()> {
        // Los paréntesis del fuente se pierden al analizarlo
        let nested = cx.expr_level > 1;
        if nested {
            emit!(cx.writer, "( ");
        }

        self.cast_from(cx, operand_type, left)?;
        emit!(cx.writer, " {} ", token(op));
        self.cast_from(cx, operand_type, right)?;

        if nested {
            emit!(cx.writer, " )");
        }

        Ok(())
    }

    /// Subíndices encadenados sobre un arreglo multidimensional se
    /// aplanan en un solo desplazamiento. Las dimensiones absorbidas por
    /// vectores y matrices se conservan como subíndices propios.
    fn index(&mut self, cx: &mut TranslationContext<'_>, id: ExprId) -> Codegen<()> {
        let ast = cx.ast;
        let line = ast.expr(id).line;
        let (mut root, index) = match ast.expr(id).kind {
            ExprKind::Index { array, index } => (array, index),
            _ => return self.expr(cx, id),
        };

        let mut parents = Vec::new();
        while let ExprKind::Index { array, index } = ast.expr(root).kind {
            parents.push(index);
            root = array;
        }

        parents.reverse();
        let mut subscripts = Vec::with_capacity(parents.len());
        for parent in parents {
            subscripts.push(cx.capture(|cx| self.cast_from(cx, TypeId::INT, parent))?);
        }

        let info = self.collapse(cx, ast.expr(root).ty)?;
        self.expr(cx, root)?;
        if info.is_core() && !self.dialect.supports_struct_operators() {
            emit!(cx.writer, ".vals");
        }

        emit!(cx.writer, "[");

        let sizes = &info.sizes;
        let mut need_add = false;
        if !subscripts.is_empty() && subscripts.len() + 1 != sizes.len() {
            return Err(CodegenError::InvalidSubscripts.at(line));
        }

        for (at, subscript) in subscripts.iter().enumerate() {
            if sizes[at] < 0 {
                emit!(cx.writer, "{}][", subscript);
                continue;
            }

            let under: i64 = sizes[at + 1..]
                .iter()
                .take_while(|&&size| size >= 0)
                .product();

            if need_add {
                emit!(cx.writer, " + ");
            }

            emit!(cx.writer, "({}) * {}", subscript, under);
            if sizes[at + 1] < 0 {
                emit!(cx.writer, "][");
                need_add = false;
            } else {
                need_add = true;
            }
        }

        if need_add {
            emit!(cx.writer, " + ");
        }

        self.cast_from(cx, TypeId::INT, index)?;
        emit!(cx.writer, "]");
        Ok(())
    }

    fn call(
        &mut self,
        cx: &mut TranslationContext<'_>,
        line: Line,
        function: ExprId,
        arguments: &[ExprId],
    ) -> Codegen<()> {
        let ast = cx.ast;
        let params = match ast.expr(function).kind {
            ExprKind::Name { symbol, .. } => ast
                .signature(symbol)
                .map_or(&[][..], |signature| signature.params.as_slice()),

            _ => &[],
        };

        self.expr(cx, function)?;
        if arguments.is_empty() && params.is_empty() {
            emit!(cx.writer, "()");
            return Ok(());
        }

        let take_address = !self.dialect.supports_references() && self.dialect.supports_pointers();

        emit!(cx.writer, "( ");
        for (at, &argument) in arguments.iter().enumerate() {
            let param = params
                .get(at)
                .ok_or_else(|| CodegenError::TooManyArguments.at(line))?;

            if at > 0 {
                emit!(cx.writer, ", ");
            }

            if take_address && param.access.is_writable() {
                emit!(cx.writer, "&");
            }

            self.cast_from(cx, param.ty, argument)?;
            if self.free_dimensions(cx, param.ty)? > 0 {
                self.size_argument(cx, line, argument, param.ty)?;
            }
        }

        for (at, param) in params.iter().enumerate().skip(arguments.len()) {
            if at > 0 {
                emit!(cx.writer, ", ");
            }

            let default = param
                .default
                .ok_or_else(|| CodegenError::MissingDefault.at(line))?;

            self.default_argument(cx, default)?;
            if self.free_dimensions(cx, param.ty)? > 0 {
                self.size_argument(cx, line, default, param.ty)?;
            }
        }

        emit!(cx.writer, " )");
        Ok(())
    }

    fn default_argument(&mut self, cx: &mut TranslationContext<'_>, default: ExprId) -> Codegen<()> {
        let ast = cx.ast;
        let symbol = match ast.expr(default).kind {
            ExprKind::Name { symbol, .. } => symbol,
            _ => return self.expr(cx, default),
        };

        if let Some(literal) = self.global_literals.get(&symbol) {
            emit!(cx.writer, "{}", literal);
            return Ok(());
        }

        let mapping = match self.default_mappings.get(&symbol) {
            Some(mapping) => mapping.clone(),
            None => return self.expr(cx, default),
        };

        let info = ast.symbol(symbol);
        if info.module.is_some() {
            cx.record_variable(info.module, &remove_ns_quals(&info.name));
        }

        match mapping.owner {
            Some(owner) => {
                let qualifier = self.qualifier(cx, Some(owner));
                emit!(cx.writer, "{}{}", qualifier, mapping.text);
                cx.record_variable(Some(owner), &mapping.text);
            }

            None => emit!(cx.writer, "{}", mapping.text),
        }

        Ok(())
    }

    /// Tamaño de las dimensiones libres del parámetro, tomado de la
    /// forma concreta del argumento.
    fn size_argument(
        &mut self,
        cx: &mut TranslationContext<'_>,
        line: Line,
        argument: ExprId,
        param: TypeId,
    ) -> Codegen<()> {
        let ast = cx.ast;
        let argument = ast.expr(argument).ty;
        if !matches!(ast.ty(argument), DataType::Array { .. }) {
            return Err(CodegenError::ArrayCoercion.at(line));
        }

        let given = self.collapse(cx, argument)?;
        let expected = self.collapse(cx, param)?;
        if given.sizes.len() != expected.sizes.len() {
            return Err(CodegenError::DifferingArraySizes.at(line));
        }

        let mut sizes = Vec::new();
        for (&actual, &free) in given.sizes.iter().zip(&expected.sizes) {
            if free == 0 {
                if actual == 0 {
                    return Err(CodegenError::UnknownArgumentSize.at(line));
                }

                sizes.push(actual.abs().to_string());
            }
        }

        let key = match sizes.len() {
            0 => return Err(CodegenError::MissingArraySize.at(line)),
            1 => {
                let cast = self.dialect.begin_cast("int");
                emit!(cx.writer, ", {}{}{}", cast, sizes[0], self.dialect.end_cast());
                return Ok(());
            }

            2 => StdType::Vec2i,
            3 => StdType::Vec3i,
            _ => return Err(CodegenError::TooManyFreeDimensions.at(line)),
        };

        let (fallback, fallback_maker) = std_fallback(key);
        let (name, maker) = self.std_type_names(key, fallback, fallback_maker);
        cx.record_type(None, &name);

        emit!(cx.writer, ", {}( {} )", maker, sizes.join(", "));
        Ok(())
    }

    /// Escribe `id` convertido explícitamente a `target` cuando hace
    /// falta.
    pub(super) fn cast_from(&mut self, cx: &mut TranslationContext<'_>, target: TypeId, id: ExprId) -> Codegen<()> {
        let ast = cx.ast;
        let (to, from) = (ast.ty(target), ast.ty(ast.expr(id).ty));

        if to.is_scalar() {
            if !from.is_scalar() || to == from {
                return self.expr(cx, id);
            }

            let name = self.scalar_name(target)?;
            emit!(cx.writer, "{}", self.dialect.begin_cast(&name));
            self.expr(cx, id)?;
            emit!(cx.writer, "{}", self.dialect.end_cast());
            return Ok(());
        }

        if let (DataType::Array { element: into, size: wanted }, DataType::Array { element: out, size: given }) = (to, from) {
            let float = |ty: TypeId| matches!(ast.ty(ty), DataType::Float);
            if float(*into) && float(*out) && given > wanted {
                if let Some(swizzle) = self.dialect.swizzle(*wanted) {
                    self.expr(cx, id)?;
                    emit!(cx.writer, "{}", swizzle);
                    return Ok(());
                }
            }
        }

        self.expr(cx, id)
    }

    pub(super) fn scalar_name(&self, ty: TypeId) -> Codegen<String> {
        match ty {
            TypeId::BOOL => Ok("bool".to_owned()),
            TypeId::INT => Ok("int".to_owned()),
            TypeId::UINT => Ok("unsigned int".to_owned()),
            TypeId::HALF if self.dialect.supports_half_type() => Ok("half".to_owned()),
            TypeId::HALF => Err(CodegenError::HalfUnsupported.into()),
            TypeId::FLOAT => Ok(self.number_type()),
            _ => Err(CodegenError::ArrayCoreType.into()),
        }
    }

    /// Forma colapsada de un tipo arreglo, cacheada por tipo.
    pub(super) fn collapse(&mut self, cx: &TranslationContext<'_>, ty: TypeId) -> Codegen<ArrayInfo> {
        if let Some(info) = self.arrays.get(&ty) {
            return Ok(info.clone());
        }

        let ast = cx.ast;
        let (sizes, core) = ast.array_shape(ty);
        if sizes.is_empty() {
            return Err(CodegenError::EmptyArray.into());
        }

        let (base, float) = match ast.ty(core) {
            DataType::Float => (self.number_type(), true),
            DataType::Int => ("int".to_owned(), false),
            DataType::Half if self.dialect.supports_half_type() => ("half".to_owned(), false),
            DataType::Half => return Err(CodegenError::HalfArray.into()),
            _ => return Err(CodegenError::ArrayCoreType.into()),
        };

        let is_int = matches!(ast.ty(core), DataType::Int);
        let mut info = ArrayInfo {
            sizes: sizes.iter().map(|&size| size as i64).collect(),
            core: base,
            ..Default::default()
        };

        let key = match sizes.as_slice() {
            [3, 3] if float => Some(StdType::Mat3f),
            [4, 4] if float => Some(StdType::Mat4f),
            [2] if float => Some(StdType::Vec2f),
            [3] if float => Some(StdType::Vec3f),
            [4] if float => Some(StdType::Vec4f),
            [2] if is_int => Some(StdType::Vec2i),
            [3] if is_int => Some(StdType::Vec3i),
            [4] if is_int => Some(StdType::Vec4i),
            _ => None,
        };

        if let Some(key) = key {
            let (fallback, fallback_maker) = std_fallback(key);
            let (name, maker) = self.std_type_names(key, fallback, fallback_maker);

            for size in &mut info.sizes {
                *size = -*size;
            }

            info.core = name;
            info.maker = maker;
            info.std_type = Some(key);
        }

        self.arrays.insert(ty, info.clone());
        Ok(info)
    }

    /// Recorre un agregado aplanado consumiendo elementos desde `index`.
    fn value_recurse(
        &mut self,
        cx: &mut TranslationContext<'_>,
        elements: &[ExprId],
        ty: TypeId,
        index: &mut usize,
        target: &str,
    ) -> Codegen<()> {
        let ast = cx.ast;
        let init = cx.init;

        match ast.ty(ty) {
            DataType::Array { .. } => {
                let info = self.collapse(cx, ty)?;
                let (_, core) = ast.array_shape(ty);

                let (mut items, mut chunk) = (1, 1);
                for &size in &info.sizes {
                    match size {
                        0 => return Err(CodegenError::UnknownInitSize.into()),
                        size if size > 0 => items *= size as usize,
                        size => chunk *= size.unsigned_abs() as usize,
                    }
                }

                if info.is_core() {
                    cx.record_type(None, &info.core);
                }

                match init {
                    InitType::Func => {
                        cx.writer.push_indent();
                        for item in 0..items {
                            cx.writer.newline_and_indent();
                            if items > 1 {
                                emit!(cx.writer, "{}[{}] = ", target, item);
                            } else {
                                emit!(cx.writer, "{} = ", target);
                            }

                            if info.is_core() {
                                emit!(cx.writer, "{}( ", info.maker);
                                self.chunk(cx, elements, core, index, chunk)?;
                                emit!(cx.writer, " );");
                            } else {
                                self.chunk(cx, elements, core, index, chunk)?;
                                emit!(cx.writer, ";");
                            }
                        }

                        cx.writer.pop_indent()
                    }

                    InitType::Ctor => self.chunk(cx, elements, core, index, items * chunk),

                    InitType::Assign | InitType::None => {
                        let wrap = info.is_core()
                            && (init == InitType::None
                                || (self.dialect.supports_struct_constructors()
                                    && !self.dialect.supports_array_initializers()));

                        let item = |generator: &mut Self,
                                    cx: &mut TranslationContext<'_>,
                                    index: &mut usize|
                         -> Codegen<()> {
                            if wrap {
                                emit!(cx.writer, "{}( ", info.maker);
                                generator.chunk(cx, elements, core, index, chunk)?;
                                emit!(cx.writer, " )");
                            } else if chunk > 1 {
                                emit!(cx.writer, "{{ ");
                                generator.chunk(cx, elements, core, index, chunk)?;
                                emit!(cx.writer, " }}");
                            } else {
                                generator.chunk(cx, elements, core, index, chunk)?;
                            }

                            Ok(())
                        };

                        if items == 1 {
                            return item(self, cx, index);
                        }

                        let line_per_item = items > 4;
                        emit!(cx.writer, "{{");
                        cx.writer.push_indent();

                        for at in 0..items {
                            if at > 0 {
                                emit!(cx.writer, ",");
                            }

                            if line_per_item {
                                cx.writer.newline_and_indent();
                            } else {
                                emit!(cx.writer, " ");
                            }

                            item(self, cx, index)?;
                        }

                        cx.writer.pop_indent()?;
                        if line_per_item {
                            cx.writer.newline_and_indent();
                            emit!(cx.writer, "}}");
                        } else {
                            emit!(cx.writer, " }}");
                        }

                        Ok(())
                    }
                }
            }

            DataType::Struct { members, .. } => match init {
                InitType::Func => {
                    for member in members {
                        let target = format!("{}.{}", target, member.name);
                        self.value_recurse(cx, elements, member.ty, index, &target)?;
                    }

                    Ok(())
                }

                _ => {
                    let braces = init != InitType::Ctor;
                    if braces {
                        emit!(cx.writer, "{{ ");
                    }

                    for (at, member) in members.iter().enumerate() {
                        if at > 0 {
                            emit!(cx.writer, ", ");
                        }

                        self.value_recurse(cx, elements, member.ty, index, target)?;
                    }

                    if braces {
                        emit!(cx.writer, " }}");
                    }

                    Ok(())
                }
            },

            _ => {
                let element = next_element(elements, index)?;
                if init == InitType::Func {
                    cx.writer.push_indent();
                    cx.writer.newline_and_indent();
                    emit!(cx.writer, "{} = ", target);
                    self.cast_from(cx, ty, element)?;
                    emit!(cx.writer, ";");
                    cx.writer.pop_indent()
                } else {
                    self.cast_from(cx, ty, element)
                }
            }
        }
    }

    /// `count` elementos consecutivos separados por comas.
    fn chunk(
        &mut self,
        cx: &mut TranslationContext<'_>,
        elements: &[ExprId],
        core: TypeId,
        index: &mut usize,
        count: usize,
    ) -> Codegen<()> {
        for at in 0..count {
            if at > 0 {
                emit!(cx.writer, ", ");
            }

            let element = next_element(elements, index)?;
            self.cast_from(cx, core, element)?;
        }

        Ok(())
    }
}

fn next_element(elements: &[ExprId], index: &mut usize) -> Codegen<ExprId> {
    let element = elements
        .get(*index)
        .copied()
        .ok_or(CodegenError::UnknownInitSize)?;

    *index += 1;
    Ok(element)
}

/// Nombres de los tipos estándar cuando el dialecto no los define.
fn std_fallback(key: StdType) -> (&'static str, &'static str) {
    match key {
        StdType::Vec2f => ("ctl_vec2f_t", "make_vec2f"),
        StdType::Vec2i => ("ctl_vec2i_t", "make_vec2i"),
        StdType::Vec3f => ("ctl_vec3f_t", "make_vec3f"),
        StdType::Vec3i => ("ctl_vec3i_t", "make_vec3i"),
        StdType::Vec4f => ("ctl_vec4f_t", "make_vec4f"),
        StdType::Vec4i => ("ctl_vec4i_t", "make_vec4i"),
        StdType::Mat3f => ("ctl_mat33f_t", "make_mat33f"),
        StdType::Mat4f => ("ctl_mat44f_t", "make_mat44f"),
        _ => ("ctl_number_t", ""),
    }
}

fn token(op: Token) -> &'static str {
    use Token::*;

    match op {
        And => "&&",
        Or => "||",
        BitAnd => "&",
        BitNot => "~",
        BitOr => "|",
        BitXor => "^",
        LeftShift => "<<",
        RightShift => ">>",
        Div => "/",
        Minus => "-",
        Mod => "%",
        Plus => "+",
        Times => "*",
        Equal => "==",
        NotEqual => "!=",
        Greater => ">",
        GreaterEqual => ">=",
        Less => "<",
        LessEqual => "<=",
        Not => "!",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        ast::{Ast, Param, Stmt},
        dialect::Language,
    };

    /// Traduce una función `sample` cuyo cuerpo es `stmts`.
    fn body(language: Language, ast: &mut Ast, stmts: Vec<Stmt>) -> String {
        let module = ast.modules().next().unwrap_or_else(|| ast.add_module("m", "m.ctl"));
        let sample = ast.declare_function(Some(module), "sample", TypeId::VOID, vec![]);
        ast.define_function(module, sample, stmts);

        let mut generator = Generator::new(language);
        generator.translate_all(ast).unwrap();

        let module = generator.modules().last().unwrap();
        let function = module.functions.iter().find(|function| function.name == "sample").unwrap();
        function.body.clone()
    }

    fn assign(ast: &mut Ast, name: &str, ty: TypeId, value: ExprId) -> Vec<Stmt> {
        let local = ast.local(name, ty, true, None);
        let symbol = match &local {
            Stmt::Variable(decl) => decl.symbol,
            _ => unreachable!(),
        };

        let lhs = ast.name(symbol);
        vec![
            local,
            Stmt::Assign {
                lhs,
                rhs: value,
                line: Line::UNKNOWN,
            },
        ]
    }

    #[test]
    fn nested_binaries_get_parentheses() {
        let mut ast = Ast::new();
        let (a, b, c) = (ast.float_lit(1.0), ast.float_lit(2.0), ast.float_lit(3.0));
        let sum = ast.binary(Token::Plus, a, b);
        let product = ast.binary(Token::Times, sum, c);
        let stmts = assign(&mut ast, "x", TypeId::FLOAT, product);

        let text = body(Language::C, &mut ast, stmts);
        assert!(text.contains("x = ( 1.0F + 2.0F ) * 3.0F;"), "{}", text);
    }

    #[test]
    fn scalar_casts() {
        let mut ast = Ast::new();
        let one = ast.int_lit(1);
        let stmts = assign(&mut ast, "x", TypeId::FLOAT, one);

        let text = body(Language::Cpp11, &mut ast, stmts);
        assert!(text.contains("x = static_cast<ctl_number_t>( 1 );"), "{}", text);
    }

    #[test]
    fn flattened_subscripts() {
        let mut ast = Ast::new();
        let grid = ast.array_of(TypeId::FLOAT, &[2, 5]);
        let module = ast.add_module("m", "m.ctl");
        let table = ast.define_constant(module, "table", grid, None);

        let (i, j) = (ast.int_lit(1), ast.int_lit(4));
        let name = ast.name(table);
        let row = ast.index(name, i);
        let cell = ast.index(row, j);
        let stmts = assign(&mut ast, "x", TypeId::FLOAT, cell);

        let text = body(Language::Cpp11, &mut ast, stmts);
        assert!(text.contains("x = table[(1) * 5 + 4];"), "{}", text);
    }

    #[test]
    fn vector_subscripts_use_vals_without_operators() {
        let mut ast = Ast::new();
        let f3 = ast.array(TypeId::FLOAT, 3);
        let module = ast.add_module("m", "m.ctl");
        let v = ast.define_constant(module, "v", f3, None);

        let zero = ast.int_lit(0);
        let name = ast.name(v);
        let first = ast.index(name, zero);
        let stmts = assign(&mut ast, "x", TypeId::FLOAT, first);

        let text = body(Language::C, &mut ast, stmts);
        assert!(text.contains("x = m_v.vals[0];"), "{}", text);
    }

    #[test]
    fn pointer_outputs_are_dereferenced() {
        let mut ast = Ast::new();
        let module = ast.add_module("m", "m.ctl");
        let out = ast.declare_variable(None, "result", TypeId::FLOAT, true);
        let function = ast.declare_function(
            Some(module),
            "store",
            TypeId::VOID,
            vec![Param::output("result", TypeId::FLOAT)],
        );

        let lhs = ast.name(out);
        let value = ast.float_lit(0.5);
        ast.define_function(
            module,
            function,
            vec![Stmt::Assign {
                lhs,
                rhs: value,
                line: Line::UNKNOWN,
            }],
        );

        let mut generator = Generator::new(Language::C);
        generator.translate_all(&ast).unwrap();
        let text = &generator.modules()[1].functions[0].body;
        assert!(text.contains("m_store( ctl_number_t *result )"), "{}", text);
        assert!(text.contains("(*result) = 0.5F;"), "{}", text);

        let mut generator = Generator::new(Language::Cpp11);
        generator.translate_all(&ast).unwrap();
        let text = &generator.modules()[1].functions[0].body;
        assert!(text.contains("store( ctl_number_t &result )"), "{}", text);
        assert!(text.contains("    result = 0.5F;"), "{}", text);
    }

    #[test]
    fn size_operator_is_unsupported() {
        let mut ast = Ast::new();
        let f0 = ast.array(TypeId::FLOAT, 0);
        let table = ast.declare_variable(None, "table", f0, false);
        let name = ast.name(table);
        let size = ast.size(name);
        let size = ast.at_line(size, Line::at(12));
        let stmts = assign(&mut ast, "n", TypeId::INT, size);

        let module = ast.add_module("m", "m.ctl");
        let sample = ast.declare_function(Some(module), "sample", TypeId::VOID, vec![]);
        ast.define_function(module, sample, stmts);

        let mut generator = Generator::new(Language::C);
        let error = generator.translate_all(&ast).unwrap_err();
        assert_eq!(error.line(), Line::at(12));
        assert_eq!(error.into_inner(), CodegenError::SizeOperator);
    }

    #[test]
    fn shifts_keep_their_direction() {
        let mut ast = Ast::new();
        let (a, b) = (ast.int_lit(8), ast.int_lit(2));
        let shift = ast.binary(Token::RightShift, a, b);
        let stmts = assign(&mut ast, "n", TypeId::INT, shift);

        let text = body(Language::C, &mut ast, stmts);
        assert!(text.contains("n = 8 >> 2;"), "{}", text);
        assert_eq!(token(Token::LeftShift), "<<");
    }
}
