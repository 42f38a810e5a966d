use crate::error::{Codegen, CodegenError};

const INDENT: &str = "    ";

/// Destino de texto con una pila de flujos y un nivel de sangría.
///
/// Todo texto se escribe al flujo en el tope de la pila. Los flujos
/// se apilan para capturar fragmentos y se desapilan en orden LIFO;
/// desbalancear la pila o la sangría es un defecto interno.
#[derive(Debug, Default)]
pub struct Writer {
    root: String,
    stack: Vec<String>,
    indent: usize,
}

impl Writer {
    pub fn new() -> Self {
        Writer::default()
    }

    /// Flujo actual.
    pub fn out(&mut self) -> &mut String {
        match self.stack.last_mut() {
            Some(stream) => stream,
            None => &mut self.root,
        }
    }

    pub fn push_stream(&mut self) {
        self.stack.push(String::new());
    }

    /// Retira el flujo actual y retorna su contenido.
    pub fn pop_stream(&mut self) -> Codegen<String> {
        self.stack
            .pop()
            .ok_or_else(|| CodegenError::StreamStack.into())
    }

    pub fn push_indent(&mut self) {
        self.indent += 1;
    }

    pub fn pop_indent(&mut self) -> Codegen<()> {
        match self.indent.checked_sub(1) {
            Some(indent) => {
                self.indent = indent;
                Ok(())
            }

            None => Err(CodegenError::IndentStack.into()),
        }
    }

    pub fn add_indent(&mut self) {
        let indent = INDENT.repeat(self.indent);
        self.out().push_str(&indent);
    }

    pub fn newline_and_indent(&mut self) {
        self.out().push('\n');
        self.add_indent();
    }

    /// Abre un bloque `{` en una línea propia.
    pub fn push_block(&mut self) {
        self.newline_and_indent();
        self.out().push('{');
        self.push_indent();
    }

    pub fn pop_block(&mut self) -> Codegen<()> {
        self.pop_indent()?;
        self.newline_and_indent();
        self.out().push('}');
        Ok(())
    }

    /// Consume el escritor. Los flujos apilados que no se retiraron
    /// son un defecto interno.
    pub fn finish(self) -> Codegen<String> {
        if self.stack.is_empty() {
            Ok(self.root)
        } else {
            Err(CodegenError::StreamStack.into())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn blocks_and_streams() {
        let mut writer = Writer::new();
        emit!(writer, "void f( void )");
        writer.push_block();

        writer.push_stream();
        writer.newline_and_indent();
        emit!(writer, "return;");
        let body = writer.pop_stream().unwrap();

        writer.out().push_str(&body);
        writer.pop_block().unwrap();

        assert_eq!(writer.finish().unwrap(), "void f( void )\n{\n    return;\n}");
    }

    #[test]
    fn unbalanced_stacks() {
        let mut writer = Writer::new();
        assert_eq!(
            writer.pop_stream().unwrap_err().into_inner(),
            CodegenError::StreamStack
        );
        assert_eq!(
            writer.pop_indent().unwrap_err().into_inner(),
            CodegenError::IndentStack
        );

        writer.push_stream();
        assert!(writer.finish().is_err());
    }
}
