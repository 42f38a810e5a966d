//! Árbol sintáctico de entrada.
//!
//! El generador no analiza código fuente CTL: recibe un árbol ya
//! resuelto y verificado por un front end externo. Todos los nodos
//! viven en arenas dentro de [`Ast`] y se refieren entre sí por
//! índices estables ([`TypeId`], [`ExprId`], [`SymbolId`],
//! [`ModuleId`]), de modo que cualquier caché del generador puede
//! indexarse por identidad de nodo sin depender de direcciones.
//!
//! Además de las estructuras, este módulo expone una API de
//! construcción usada por el driver y por las pruebas, y la
//! declaración de los símbolos de la biblioteca estándar de CTL.

use crate::source::Line;
use std::collections::BTreeMap;

/// Índice de un tipo de dato.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(usize);

/// Índice de una expresión.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExprId(usize);

/// Índice de un símbolo.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(usize);

/// Índice de un módulo fuente.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(usize);

impl TypeId {
    pub const VOID: TypeId = TypeId(0);
    pub const BOOL: TypeId = TypeId(1);
    pub const INT: TypeId = TypeId(2);
    pub const UINT: TypeId = TypeId(3);
    pub const HALF: TypeId = TypeId(4);
    pub const FLOAT: TypeId = TypeId(5);
    pub const STRING: TypeId = TypeId(6);
}

/// Tipo de dato resuelto.
#[derive(Clone, Debug, PartialEq)]
pub enum DataType {
    Void,
    Bool,
    Int,
    UInt,
    Half,
    Float,
    String,
    Struct {
        name: String,
        members: Vec<Member>,
    },

    /// Arreglo posiblemente anidado. Un tamaño cero significa que
    /// quien llama provee el tamaño.
    Array {
        element: TypeId,
        size: usize,
    },
}

impl DataType {
    /// Tipos escalares: los únicos con conversión explícita.
    pub fn is_scalar(&self) -> bool {
        use DataType::*;
        matches!(self, Bool | Int | UInt | Half | Float)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    pub name: String,
    pub ty: TypeId,
}

/// Operadores.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Token {
    And,
    Or,
    BitAnd,
    BitNot,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
    Div,
    Minus,
    Mod,
    Plus,
    Times,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Not,
}

impl Token {
    /// Operadores cuyo resultado es booleano.
    pub fn is_predicate(self) -> bool {
        use Token::*;
        matches!(
            self,
            And | Or | Equal | NotEqual | Greater | GreaterEqual | Less | LessEqual | Not
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Half(f32),
    Float(f32),
    String(String),

    /// Referencia a un símbolo, con el nombre tal como aparece en fuente.
    Name {
        name: String,
        symbol: SymbolId,
    },

    Binary {
        op: Token,
        operand_type: TypeId,
        left: ExprId,
        right: ExprId,
    },

    Unary {
        op: Token,
        operand: ExprId,
    },

    Index {
        array: ExprId,
        index: ExprId,
    },

    Member {
        object: ExprId,
        member: String,
    },

    /// Operador `size` sobre un arreglo.
    Size {
        array: ExprId,
    },

    /// Llamada; `function` es siempre un nodo `Name`.
    Call {
        function: ExprId,
        arguments: Vec<ExprId>,
    },

    /// Agregado de valores para arreglos y estructuras, aplanado.
    Value {
        elements: Vec<ExprId>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: TypeId,
    pub line: Line,
}

impl Expr {
    pub fn is_literal(&self) -> bool {
        use ExprKind::*;
        matches!(
            self.kind,
            Bool(_) | Int(_) | UInt(_) | Half(_) | Float(_) | String(_)
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDecl {
    pub name: String,
    pub symbol: SymbolId,
    pub init: Option<ExprId>,
    pub line: Line,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Variable(VariableDecl),

    Assign {
        lhs: ExprId,
        rhs: ExprId,
        line: Line,
    },

    Expr {
        expr: ExprId,
        line: Line,
    },

    If {
        condition: ExprId,
        then: Vec<Stmt>,
        otherwise: Vec<Stmt>,
        line: Line,
    },

    /// `ty` es el tipo de retorno de la función que contiene al nodo.
    Return {
        value: Option<ExprId>,
        ty: TypeId,
        line: Line,
    },

    While {
        condition: ExprId,
        body: Vec<Stmt>,
        line: Line,
    },

    For {
        init: Vec<Stmt>,
        condition: ExprId,
        update: Vec<Stmt>,
        body: Vec<Stmt>,
        line: Line,
    },
}

impl Stmt {
    pub fn line(&self) -> Line {
        match self {
            Stmt::Variable(decl) => decl.line,
            Stmt::Assign { line, .. }
            | Stmt::Expr { line, .. }
            | Stmt::If { line, .. }
            | Stmt::Return { line, .. }
            | Stmt::While { line, .. }
            | Stmt::For { line, .. } => *line,
        }
    }
}

/// Modo de acceso de un parámetro.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

impl Access {
    pub fn is_writable(self) -> bool {
        self != Access::Read
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeId,
    pub access: Access,
    pub varying: bool,
    pub default: Option<ExprId>,
}

impl Param {
    pub fn new(name: &str, ty: TypeId) -> Self {
        Param {
            name: name.to_owned(),
            ty,
            access: Access::Read,
            varying: false,
            default: None,
        }
    }

    pub fn output(name: &str, ty: TypeId) -> Self {
        Param {
            access: Access::Write,
            ..Param::new(name, ty)
        }
    }

    pub fn with_access(self, access: Access) -> Self {
        Param { access, ..self }
    }

    pub fn varying(self) -> Self {
        Param {
            varying: true,
            ..self
        }
    }

    pub fn with_default(self, default: ExprId) -> Self {
        Param {
            default: Some(default),
            ..self
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionSig {
    pub ret: TypeId,
    pub params: Vec<Param>,
    pub returns_varying: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SymbolKind {
    Function(FunctionSig),
    Variable {
        writable: bool,
        value: Option<ExprId>,
    },
}

/// Entrada de la tabla de símbolos.
///
/// `module` es `None` para símbolos de la biblioteca estándar o
/// globales sin módulo.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolInfo {
    pub name: String,
    pub module: Option<ModuleId>,
    pub ty: TypeId,
    pub kind: SymbolKind,
}

impl SymbolInfo {
    pub fn function(&self) -> Option<&FunctionSig> {
        match &self.kind {
            SymbolKind::Function(signature) => Some(signature),
            SymbolKind::Variable { .. } => None,
        }
    }

    pub fn is_function(&self) -> bool {
        self.function().is_some()
    }

    pub fn is_writable(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable { writable: true, .. })
    }

    pub fn value(&self) -> Option<ExprId> {
        match self.kind {
            SymbolKind::Variable { value, .. } => value,
            SymbolKind::Function(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionNode {
    pub name: String,
    pub symbol: SymbolId,
    pub body: Vec<Stmt>,
    pub line: Line,
}

/// Raíz de un módulo fuente.
#[derive(Clone, Debug, PartialEq)]
pub struct ModuleNode {
    pub name: String,
    pub file: String,
    pub structs: Vec<TypeId>,
    pub constants: Vec<VariableDecl>,
    pub functions: Vec<FunctionNode>,
}

/// Arenas del árbol de una unidad de compilación.
#[derive(Clone, Debug)]
pub struct Ast {
    types: Vec<DataType>,
    exprs: Vec<Expr>,
    symbols: Vec<SymbolInfo>,
    modules: Vec<ModuleNode>,
    standard: BTreeMap<String, SymbolId>,
}

impl Default for Ast {
    fn default() -> Self {
        Ast::new()
    }
}

impl Ast {
    pub fn new() -> Self {
        use DataType::*;

        Ast {
            // Mismo orden que las constantes de `TypeId`
            types: vec![Void, Bool, Int, UInt, Half, Float, String],
            exprs: Vec::new(),
            symbols: Vec::new(),
            modules: Vec::new(),
            standard: BTreeMap::new(),
        }
    }

    pub fn ty(&self, id: TypeId) -> &DataType {
        &self.types[id.0]
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0]
    }

    pub fn symbol(&self, id: SymbolId) -> &SymbolInfo {
        &self.symbols[id.0]
    }

    pub fn module(&self, id: ModuleId) -> &ModuleNode {
        &self.modules[id.0]
    }

    pub fn modules(&self) -> impl Iterator<Item = ModuleId> {
        (0..self.modules.len()).map(ModuleId)
    }

    pub fn module_mut(&mut self, id: ModuleId) -> &mut ModuleNode {
        &mut self.modules[id.0]
    }

    /// Busca un símbolo de la biblioteca estándar.
    pub fn standard(&self, name: &str) -> Option<SymbolId> {
        self.standard.get(name).copied()
    }

    /// Tipo de retorno de una expresión de llamada o firma.
    pub fn signature(&self, symbol: SymbolId) -> Option<&FunctionSig> {
        self.symbol(symbol).function()
    }

    /// Tamaños de un arreglo anidado, de la dimensión exterior a la
    /// interior, y su tipo núcleo. Para un no-arreglo la lista es vacía.
    pub fn array_shape(&self, mut ty: TypeId) -> (Vec<usize>, TypeId) {
        let mut sizes = Vec::new();
        while let DataType::Array { element, size } = *self.ty(ty) {
            sizes.push(size);
            ty = element;
        }

        (sizes, ty)
    }

    pub fn add_type(&mut self, ty: DataType) -> TypeId {
        self.types.push(ty);
        TypeId(self.types.len() - 1)
    }

    pub fn array(&mut self, element: TypeId, size: usize) -> TypeId {
        self.add_type(DataType::Array { element, size })
    }

    /// Construye `core[sizes[0]][sizes[1]]...`.
    pub fn array_of(&mut self, core: TypeId, sizes: &[usize]) -> TypeId {
        sizes
            .iter()
            .rev()
            .fold(core, |element, &size| self.array(element, size))
    }

    pub fn structure(&mut self, name: &str, members: &[(&str, TypeId)]) -> TypeId {
        let members = members
            .iter()
            .map(|&(name, ty)| Member {
                name: name.to_owned(),
                ty,
            })
            .collect();

        self.add_type(DataType::Struct {
            name: name.to_owned(),
            members,
        })
    }

    pub fn add_expr(&mut self, kind: ExprKind, ty: TypeId) -> ExprId {
        self.exprs.push(Expr {
            kind,
            ty,
            line: Line::UNKNOWN,
        });

        ExprId(self.exprs.len() - 1)
    }

    /// Asocia una línea a una expresión ya construida.
    pub fn at_line(&mut self, expr: ExprId, line: Line) -> ExprId {
        self.exprs[expr.0].line = line;
        expr
    }

    pub fn bool_lit(&mut self, value: bool) -> ExprId {
        self.add_expr(ExprKind::Bool(value), TypeId::BOOL)
    }

    pub fn int_lit(&mut self, value: i32) -> ExprId {
        self.add_expr(ExprKind::Int(value), TypeId::INT)
    }

    pub fn uint_lit(&mut self, value: u32) -> ExprId {
        self.add_expr(ExprKind::UInt(value), TypeId::UINT)
    }

    pub fn half_lit(&mut self, value: f32) -> ExprId {
        self.add_expr(ExprKind::Half(value), TypeId::HALF)
    }

    pub fn float_lit(&mut self, value: f32) -> ExprId {
        self.add_expr(ExprKind::Float(value), TypeId::FLOAT)
    }

    pub fn string_lit(&mut self, value: &str) -> ExprId {
        self.add_expr(ExprKind::String(value.to_owned()), TypeId::STRING)
    }

    pub fn name(&mut self, symbol: SymbolId) -> ExprId {
        let info = self.symbol(symbol);
        let (name, ty) = (info.name.clone(), info.ty);

        self.add_expr(ExprKind::Name { name, symbol }, ty)
    }

    pub fn call(&mut self, function: SymbolId, arguments: Vec<ExprId>) -> ExprId {
        let ret = self
            .signature(function)
            .map(|signature| signature.ret)
            .unwrap_or(TypeId::VOID);

        let function = self.name(function);
        self.add_expr(
            ExprKind::Call {
                function,
                arguments,
            },
            ret,
        )
    }

    /// Operación binaria. Se opera en flotante si alguno de los dos
    /// lados lo es; de otro modo en el tipo del lado izquierdo.
    pub fn binary(&mut self, op: Token, left: ExprId, right: ExprId) -> ExprId {
        let (left_ty, right_ty) = (self.expr(left).ty, self.expr(right).ty);
        let operand_type = if left_ty == TypeId::FLOAT || right_ty == TypeId::FLOAT {
            TypeId::FLOAT
        } else {
            left_ty
        };

        let ty = if op.is_predicate() {
            TypeId::BOOL
        } else {
            operand_type
        };

        self.add_expr(
            ExprKind::Binary {
                op,
                operand_type,
                left,
                right,
            },
            ty,
        )
    }

    pub fn unary(&mut self, op: Token, operand: ExprId) -> ExprId {
        let ty = if op.is_predicate() {
            TypeId::BOOL
        } else {
            self.expr(operand).ty
        };

        self.add_expr(ExprKind::Unary { op, operand }, ty)
    }

    pub fn index(&mut self, array: ExprId, index: ExprId) -> ExprId {
        let ty = match *self.ty(self.expr(array).ty) {
            DataType::Array { element, .. } => element,
            _ => TypeId::VOID,
        };

        self.add_expr(ExprKind::Index { array, index }, ty)
    }

    pub fn member(&mut self, object: ExprId, member: &str) -> ExprId {
        let ty = match self.ty(self.expr(object).ty) {
            DataType::Struct { members, .. } => members
                .iter()
                .find(|candidate| candidate.name == member)
                .map(|found| found.ty)
                .unwrap_or(TypeId::VOID),

            _ => TypeId::VOID,
        };

        let member = member.to_owned();
        self.add_expr(ExprKind::Member { object, member }, ty)
    }

    pub fn size(&mut self, array: ExprId) -> ExprId {
        self.add_expr(ExprKind::Size { array }, TypeId::INT)
    }

    pub fn value(&mut self, ty: TypeId, elements: Vec<ExprId>) -> ExprId {
        self.add_expr(ExprKind::Value { elements }, ty)
    }

    /// Agregado de literales flotantes.
    pub fn float_values(&mut self, ty: TypeId, values: &[f32]) -> ExprId {
        let elements = values.iter().map(|&value| self.float_lit(value)).collect();
        self.value(ty, elements)
    }

    pub fn add_module(&mut self, name: &str, file: &str) -> ModuleId {
        self.modules.push(ModuleNode {
            name: name.to_owned(),
            file: file.to_owned(),
            structs: Vec::new(),
            constants: Vec::new(),
            functions: Vec::new(),
        });

        ModuleId(self.modules.len() - 1)
    }

    pub fn add_symbol(&mut self, info: SymbolInfo) -> SymbolId {
        self.symbols.push(info);
        SymbolId(self.symbols.len() - 1)
    }

    pub fn declare_function(
        &mut self,
        module: Option<ModuleId>,
        name: &str,
        ret: TypeId,
        params: Vec<Param>,
    ) -> SymbolId {
        self.add_symbol(SymbolInfo {
            name: name.to_owned(),
            module,
            ty: ret,
            kind: SymbolKind::Function(FunctionSig {
                ret,
                params,
                returns_varying: false,
            }),
        })
    }

    pub fn declare_variable(
        &mut self,
        module: Option<ModuleId>,
        name: &str,
        ty: TypeId,
        writable: bool,
    ) -> SymbolId {
        self.add_symbol(SymbolInfo {
            name: name.to_owned(),
            module,
            ty,
            kind: SymbolKind::Variable {
                writable,
                value: None,
            },
        })
    }

    /// Marca el retorno de una función como `varying`.
    pub fn set_returns_varying(&mut self, function: SymbolId) {
        if let SymbolKind::Function(signature) = &mut self.symbols[function.0].kind {
            signature.returns_varying = true;
        }
    }

    /// Fija el valor conocido de una variable.
    pub fn set_value(&mut self, variable: SymbolId, init: ExprId) {
        if let SymbolKind::Variable { value, .. } = &mut self.symbols[variable.0].kind {
            *value = Some(init);
        }
    }

    /// Declara una constante de módulo con inicializador opcional.
    pub fn define_constant(
        &mut self,
        module: ModuleId,
        name: &str,
        ty: TypeId,
        init: Option<ExprId>,
    ) -> SymbolId {
        let symbol = self.declare_variable(Some(module), name, ty, false);
        if let Some(init) = init {
            self.set_value(symbol, init);
        }

        self.module_mut(module).constants.push(VariableDecl {
            name: name.to_owned(),
            symbol,
            init,
            line: Line::UNKNOWN,
        });

        symbol
    }

    /// Agrega el cuerpo de una función ya declarada a su módulo.
    pub fn define_function(&mut self, module: ModuleId, symbol: SymbolId, body: Vec<Stmt>) {
        let name = self.symbol(symbol).name.clone();
        self.module_mut(module).functions.push(FunctionNode {
            name,
            symbol,
            body,
            line: Line::UNKNOWN,
        });
    }

    /// Declara una estructura en un módulo.
    pub fn define_struct(
        &mut self,
        module: ModuleId,
        name: &str,
        members: &[(&str, TypeId)],
    ) -> TypeId {
        let ty = self.structure(name, members);
        self.module_mut(module).structs.push(ty);
        ty
    }

    /// Declara una variable local, lista para un `Stmt::Variable`.
    pub fn local(&mut self, name: &str, ty: TypeId, writable: bool, init: Option<ExprId>) -> Stmt {
        let symbol = self.declare_variable(None, name, ty, writable);
        if let Some(init) = init {
            if !writable {
                self.set_value(symbol, init);
            }
        }

        Stmt::Variable(VariableDecl {
            name: name.to_owned(),
            symbol,
            init,
            line: Line::UNKNOWN,
        })
    }

    /// Declara los símbolos de la biblioteca estándar de CTL. Es
    /// idempotente.
    pub fn declare_standard_library(&mut self) {
        if !self.standard.is_empty() {
            return;
        }

        let (b, i, u, h, f, s, v) = (
            TypeId::BOOL,
            TypeId::INT,
            TypeId::UINT,
            TypeId::HALF,
            TypeId::FLOAT,
            TypeId::STRING,
            TypeId::VOID,
        );

        let f2 = self.array(f, 2);
        let i2 = self.array(i, 2);
        let f3 = self.array(f, 3);
        let f33 = self.array_of(f, &[3, 3]);
        let f44 = self.array_of(f, &[4, 4]);
        let f0 = self.array(f, 0);
        let f02 = self.array_of(f, &[0, 2]);
        let f0003 = self.array_of(f, &[0, 0, 0, 3]);

        let chromaticities = self.structure(
            "Chromaticities",
            &[("red", f2), ("green", f2), ("blue", f2), ("white", f2)],
        );

        let box2i = self.structure("Box2i", &[("min", i2), ("max", i2)]);
        let box2f = self.structure("Box2f", &[("min", f2), ("max", f2)]);
        for (name, ty) in &[
            ("Chromaticities", chromaticities),
            ("Box2i", box2i),
            ("Box2f", box2f),
        ] {
            let symbol = self.declare_variable(None, name, *ty, false);
            self.standard.insert(name.to_string(), symbol);
        }

        let function = |ast: &mut Ast, name: &str, ret: TypeId, params: &[TypeId]| {
            let params = params
                .iter()
                .enumerate()
                .map(|(index, &ty)| Param::new(&format!("a{}", index), ty))
                .collect();

            let symbol = ast.declare_function(None, name, ret, params);
            ast.standard.insert(name.to_owned(), symbol);
        };

        function(self, "assert", v, &[b]);
        function(self, "print_bool", v, &[b]);
        function(self, "print_int", v, &[i]);
        function(self, "print_unsigned_int", v, &[u]);
        function(self, "print_half", v, &[h]);
        function(self, "print_float", v, &[f]);
        function(self, "print_string", v, &[s]);

        for name in &["isfinite_f", "isnormal_f", "isnan_f", "isinf_f"] {
            function(self, name, b, &[f]);
        }

        for name in &["isfinite_h", "isnormal_h", "isnan_h", "isinf_h"] {
            function(self, name, b, &[h]);
        }

        for name in &[
            "acos", "asin", "atan", "cos", "sin", "tan", "cosh", "sinh", "tanh", "exp", "log",
            "log10", "pow10", "sqrt", "fabs", "floor",
        ] {
            function(self, name, f, &[f]);
        }

        for name in &["atan2", "pow", "fmod", "hypot"] {
            function(self, name, f, &[f, f]);
        }

        function(self, "exp_h", h, &[f]);
        function(self, "log_h", f, &[h]);
        function(self, "log10_h", f, &[h]);
        function(self, "pow_h", h, &[h, f]);
        function(self, "pow10_h", h, &[f]);

        function(self, "mult_f33_f33", f33, &[f33, f33]);
        function(self, "mult_f44_f44", f44, &[f44, f44]);
        function(self, "mult_f_f33", f33, &[f, f33]);
        function(self, "mult_f_f44", f44, &[f, f44]);
        function(self, "add_f33_f33", f33, &[f33, f33]);
        function(self, "add_f44_f44", f44, &[f44, f44]);
        function(self, "invert_f33", f33, &[f33]);
        function(self, "invert_f44", f44, &[f44]);
        function(self, "transpose_f33", f33, &[f33]);
        function(self, "transpose_f44", f44, &[f44]);
        function(self, "mult_f3_f33", f3, &[f3, f33]);
        function(self, "mult_f3_f44", f3, &[f3, f44]);
        function(self, "mult_f_f3", f3, &[f, f3]);
        function(self, "add_f3_f3", f3, &[f3, f3]);
        function(self, "sub_f3_f3", f3, &[f3, f3]);
        function(self, "cross_f3_f3", f3, &[f3, f3]);
        function(self, "dot_f3_f3", f, &[f3, f3]);
        function(self, "length_f3", f, &[f3]);

        function(self, "RGBtoXYZ", f44, &[chromaticities, f]);
        function(self, "XYZtoRGB", f44, &[chromaticities, f]);
        for name in &["LuvtoXYZ", "XYZtoLuv", "LabtoXYZ", "XYZtoLab"] {
            function(self, name, f3, &[f3, f3]);
        }

        function(self, "lookup1D", f, &[f0, f, f, f]);
        function(self, "lookupCubic1D", f, &[f0, f, f, f]);
        function(self, "lookup3D_f3", f3, &[f0003, f3, f3, f3]);
        function(self, "interpolate1D", f, &[f02, f]);
        function(self, "interpolateCubic1D", f, &[f02, f]);

        // Salidas por parámetro
        for (name, scalar) in &[("lookup3D_f", f), ("lookup3D_h", h)] {
            let mut params = vec![
                Param::new("table", f0003),
                Param::new("pMin", f3),
                Param::new("pMax", f3),
            ];

            for input in &["p0", "p1", "p2"] {
                params.push(Param::new(input, *scalar));
            }

            for output in &["o0", "o1", "o2"] {
                params.push(Param::output(output, *scalar));
            }

            let symbol = self.declare_function(None, name, v, params);
            self.standard.insert(name.to_string(), symbol);
        }

    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn array_shape_outer_first() {
        let mut ast = Ast::new();
        let table = ast.array_of(TypeId::FLOAT, &[4, 0, 3]);

        assert_eq!(ast.array_shape(table), (vec![4, 0, 3], TypeId::FLOAT));
        assert_eq!(ast.array_shape(TypeId::INT), (vec![], TypeId::INT));
    }

    #[test]
    fn binary_types() {
        let mut ast = Ast::new();
        let one = ast.int_lit(1);
        let half = ast.float_lit(0.5);

        let sum = ast.binary(Token::Plus, one, half);
        assert_eq!(ast.expr(sum).ty, TypeId::FLOAT);

        let less = ast.binary(Token::Less, one, one);
        assert_eq!(ast.expr(less).ty, TypeId::BOOL);
        match ast.expr(less).kind {
            ExprKind::Binary { operand_type, .. } => assert_eq!(operand_type, TypeId::INT),
            _ => unreachable!(),
        }
    }

    #[test]
    fn standard_library_is_idempotent() {
        let mut ast = Ast::new();
        ast.declare_standard_library();
        let lookup = ast.standard("lookup1D");
        ast.declare_standard_library();

        assert!(lookup.is_some());
        assert_eq!(ast.standard("lookup1D"), lookup);

        let lookup3d = ast.standard("lookup3D_f").unwrap();
        let signature = ast.signature(lookup3d).unwrap();
        assert_eq!(signature.params.len(), 9);
        assert!(signature.params[8].access.is_writable());
    }

    #[test]
    fn member_type_lookup() {
        let mut ast = Ast::new();
        let module = ast.add_module("m", "m.ctl");
        let pair = ast.define_struct(module, "Pair", &[("a", TypeId::INT), ("b", TypeId::FLOAT)]);
        let variable = ast.define_constant(module, "p", pair, None);

        let name = ast.name(variable);
        let b = ast.member(name, "b");
        assert_eq!(ast.expr(b).ty, TypeId::FLOAT);
    }
}
