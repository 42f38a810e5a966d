// Escribe texto formateado al flujo actual de un escritor.
macro_rules! emit {
    ($writer:expr, $($format:tt)*) => {
        $writer.out().push_str(&format!($($format)*))
    };
}
