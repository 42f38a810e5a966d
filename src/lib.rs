//! Generador de código para CTL (Color Transformation Language).
//!
//! # Entrada
//! El generador no incluye front end: consume un árbol ya resuelto y
//! verificado, descrito en [`ast`], junto con su tabla de símbolos.
//! Las ubicaciones de origen que sobreviven son números de línea, ver
//! [`source`].
//!
//! # Dialectos
//! Todo lo que depende del lenguaje objetivo se pregunta a un
//! [`dialect::Dialect`]: C, C++03, C++11, CUDA, GLSL, OpenCL y el
//! dialecto de plugins de Nuke. Sus respuestas son datos; la
//! traducción en sí es común a todos.
//!
//! # Generación
//! [`codegen`] traduce cada módulo a fragmentos de texto con registro
//! de dependencias y luego los ensambla, ya sea completos o solo lo
//! alcanzable desde las rutinas principales. Cualquier error aborta
//! la unidad en curso, ver [`error`].

#[macro_use]
mod macros;

pub mod ast;
pub mod codegen;
pub mod dialect;
pub mod error;
pub mod source;
