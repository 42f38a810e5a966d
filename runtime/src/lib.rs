//! Implementaciones de referencia de la biblioteca estándar de CTL.
//!
//! # Propósito
//! El generador emite el texto de las funciones de biblioteca en el
//! lenguaje objetivo. Este crate implementa los mismos núcleos
//! numéricos en Rust para poder verificar sus resultados: operaciones
//! de matrices, búsquedas en tablas 1D y 3D, interpolación en tablas
//! de pares y conversiones entre espacios de color.
//!
//! # Uso
//! Los módulos [`matrix`], [`lookup`] y [`color`] exponen una API en
//! Rust. Además, [`builtin`] exporta símbolos "unmangled" con la
//! convención de llamada de C, de modo que código emitido para C
//! pueda enlazarse contra esta biblioteca en vez de contra el texto
//! generado.

pub mod builtin;
pub mod color;
pub mod lookup;
pub mod matrix;

pub use matrix::{Mat, Vec3};
