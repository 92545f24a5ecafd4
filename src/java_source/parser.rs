//! Structural parser over the token stream.
//!
//! Only declarations are modelled. Method bodies, initializers and nested
//! types are skipped by bracket balancing.

use super::ast::{
    Annotation, AnnotationValue, CompilationUnit, ElementValue, FieldDeclaration, Import,
    MethodDeclaration, TypeDeclaration, TypeKind, TypeRef,
};
use super::errors::JavaSourceError;
use super::lexer::{tokenize, Token, TokenKind};

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "transient",
    "volatile",
    "synchronized",
    "native",
    "strictfp",
    "default",
    "sealed",
];

pub fn parse_compilation_unit(src: &str) -> Result<CompilationUnit, JavaSourceError> {
    let tokens = tokenize(src)?;
    UnitParser {
        src,
        tokens: &tokens,
        pos: 0,
    }
    .compilation_unit()
}

struct UnitParser<'a> {
    src: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> UnitParser<'a> {
    fn compilation_unit(&mut self) -> Result<CompilationUnit, JavaSourceError> {
        let mut unit = CompilationUnit::default();

        while self.peek().is_some() {
            if self.eat_symbol(';') {
                continue;
            }
            let start = self.pos;
            // package-level annotations (package-info.java) are dropped
            self.modifiers_and_annotations()?;

            if self.eat_ident("package") {
                unit.package = Some(self.qualified_name()?);
                self.expect_symbol(';', "`;` after package name")?;
            } else if self.eat_ident("import") {
                unit.imports.push(self.import()?);
            } else {
                self.pos = start;
                unit.types.push(self.type_declaration()?);
            }
        }

        Ok(unit)
    }

    fn import(&mut self) -> Result<Import, JavaSourceError> {
        let is_static = self.eat_ident("static");
        let mut path = self.expect_ident("imported name")?;
        let mut is_wildcard = false;
        while self.eat_symbol('.') {
            if self.eat_symbol('*') {
                is_wildcard = true;
                break;
            }
            path.push('.');
            path.push_str(&self.expect_ident("imported name")?);
        }
        self.expect_symbol(';', "`;` after import")?;
        Ok(Import {
            path,
            is_static,
            is_wildcard,
        })
    }

    fn type_declaration(&mut self) -> Result<TypeDeclaration, JavaSourceError> {
        let annotations = self.modifiers_and_annotations()?;

        let kind = if self.eat_ident("class") {
            TypeKind::Class
        } else if self.eat_ident("interface") {
            TypeKind::Interface
        } else if self.eat_ident("enum") {
            TypeKind::Enum
        } else if self.eat_ident("record") {
            TypeKind::Record
        } else if self.at_annotation_type() {
            self.pos += 2;
            TypeKind::Annotation
        } else {
            return Err(self.unexpected("a type declaration"));
        };

        let name = self.expect_ident("type name")?;
        if self.peek_symbol('<') {
            self.skip_balanced('<', '>')?;
        }
        if kind == TypeKind::Record && self.peek_symbol('(') {
            self.skip_balanced('(', ')')?;
        }

        let mut extends = Vec::new();
        let mut implements = Vec::new();
        loop {
            if self.eat_ident("extends") {
                extends = self.type_list()?;
            } else if self.eat_ident("implements") {
                implements = self.type_list()?;
            } else if self.eat_ident("permits") {
                self.type_list()?;
            } else {
                break;
            }
        }

        self.expect_symbol('{', "`{` opening the type body")?;
        let (fields, methods) = self.type_body(kind)?;

        Ok(TypeDeclaration {
            kind,
            name,
            annotations,
            extends,
            implements,
            fields,
            methods,
        })
    }

    fn type_body(
        &mut self,
        kind: TypeKind,
    ) -> Result<(Vec<FieldDeclaration>, Vec<MethodDeclaration>), JavaSourceError> {
        let mut fields = Vec::new();
        let mut methods = Vec::new();

        if kind == TypeKind::Enum {
            self.skip_enum_constants()?;
        }

        loop {
            let Some(token) = self.peek() else {
                return Err(JavaSourceError::UnexpectedEof {
                    expected: "`}` closing the type body",
                });
            };
            if token.is_symbol('}') {
                self.pos += 1;
                break;
            }
            if token.is_symbol(';') {
                self.pos += 1;
                continue;
            }

            let member_start = self.pos;
            let annotations = self.modifiers_and_annotations()?;

            // instance or static initializer
            if self.peek_symbol('{') {
                self.skip_balanced('{', '}')?;
                continue;
            }

            if self.at_nested_type() {
                self.pos = member_start;
                self.type_declaration()?;
                continue;
            }

            if self.peek_symbol('<') {
                self.skip_balanced('<', '>')?;
            }

            // constructor
            if self.peek().and_then(Token::ident).is_some() && self.peek_symbol_at(1, '(') {
                self.pos += 1;
                self.skip_balanced('(', ')')?;
                self.skip_method_rest()?;
                continue;
            }

            let type_ref = self.type_ref()?;
            let name = self.expect_ident("member name")?;

            if self.peek_symbol('(') {
                self.skip_balanced('(', ')')?;
                self.skip_method_rest()?;
                methods.push(MethodDeclaration {
                    annotations,
                    name,
                    return_type: Some(type_ref),
                });
                continue;
            }

            let mut names = vec![name];
            loop {
                self.skip_dims();
                if self.eat_symbol('=') {
                    self.skip_initializer()?;
                }
                if self.eat_symbol(',') {
                    names.push(self.expect_ident("field name")?);
                    continue;
                }
                self.expect_symbol(';', "`;` after field declaration")?;
                break;
            }
            fields.push(FieldDeclaration {
                annotations,
                type_ref,
                names,
            });
        }

        Ok((fields, methods))
    }

    fn modifiers_and_annotations(&mut self) -> Result<Vec<Annotation>, JavaSourceError> {
        let mut annotations = Vec::new();
        loop {
            if self.peek_symbol('@') && !self.at_annotation_type() {
                annotations.push(self.annotation()?);
            } else if self
                .peek()
                .and_then(Token::ident)
                .is_some_and(|s| MODIFIERS.contains(&s))
            {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(annotations)
    }

    fn annotation(&mut self) -> Result<Annotation, JavaSourceError> {
        self.expect_symbol('@', "`@`")?;
        let qualified = self.qualified_name()?;
        let name = qualified
            .rsplit('.')
            .next()
            .unwrap_or(&qualified)
            .to_string();

        if !self.eat_symbol('(') {
            return Ok(Annotation {
                name,
                value: AnnotationValue::Marker,
            });
        }
        if self.eat_symbol(')') {
            return Ok(Annotation {
                name,
                value: AnnotationValue::Named(Vec::new()),
            });
        }

        let is_named = self.peek().and_then(Token::ident).is_some()
            && self.peek_symbol_at(1, '=')
            && !self.peek_symbol_at(2, '=');

        let value = if is_named {
            let mut pairs = Vec::new();
            loop {
                let member = self.expect_ident("annotation member name")?;
                self.expect_symbol('=', "`=` after annotation member name")?;
                pairs.push((member, self.element_value()?));
                if !self.eat_symbol(',') {
                    break;
                }
            }
            AnnotationValue::Named(pairs)
        } else {
            AnnotationValue::Single(self.element_value()?)
        };
        self.expect_symbol(')', "`)` closing the annotation")?;

        Ok(Annotation { name, value })
    }

    /// Consumes tokens up to the next `,` or `)` at nesting depth zero.
    fn element_value(&mut self) -> Result<ElementValue, JavaSourceError> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Symbol('(' | '[' | '{') => depth += 1,
                TokenKind::Symbol(')' | ']' | '}') if depth > 0 => depth -= 1,
                TokenKind::Symbol(',' | ')') if depth == 0 => break,
                _ => {}
            }
            self.pos += 1;
        }

        let slice = &self.tokens[start..self.pos];
        let (Some(first), Some(last)) = (slice.first(), slice.last()) else {
            return Err(self.unexpected("an annotation value"));
        };
        Ok(ElementValue {
            raw: self.src[first.start..last.end].to_string(),
            constant: string_constant(slice),
        })
    }

    fn type_list(&mut self) -> Result<Vec<TypeRef>, JavaSourceError> {
        let mut types = vec![self.type_ref()?];
        while self.eat_symbol(',') {
            types.push(self.type_ref()?);
        }
        Ok(types)
    }

    fn type_ref(&mut self) -> Result<TypeRef, JavaSourceError> {
        // type-use annotations such as `@NonNull String`
        while self.peek_symbol('@') {
            self.annotation()?;
        }

        let mut name = self.expect_ident("a type")?;
        let mut args = Vec::new();
        loop {
            if self.peek_symbol('<') {
                args = self.type_args()?;
            }
            if self.peek_symbol('.') && self.peek_at(1).and_then(Token::ident).is_some() {
                self.pos += 1;
                name.push('.');
                name.push_str(&self.expect_ident("a type")?);
                continue;
            }
            break;
        }
        let array_dims = self.skip_dims();
        // varargs
        while self.peek_symbol('.') {
            self.pos += 1;
        }

        Ok(TypeRef {
            name,
            args,
            array_dims,
        })
    }

    fn type_args(&mut self) -> Result<Vec<TypeRef>, JavaSourceError> {
        self.expect_symbol('<', "`<`")?;
        let mut args = Vec::new();
        // diamond
        if self.eat_symbol('>') {
            return Ok(args);
        }
        loop {
            if self.eat_symbol('?') {
                if self.eat_ident("extends") || self.eat_ident("super") {
                    args.push(self.type_ref()?);
                } else {
                    args.push(TypeRef::simple("?"));
                }
            } else {
                args.push(self.type_ref()?);
            }
            if self.eat_symbol(',') {
                continue;
            }
            self.expect_symbol('>', "`>` closing type arguments")?;
            return Ok(args);
        }
    }

    fn qualified_name(&mut self) -> Result<String, JavaSourceError> {
        let mut name = self.expect_ident("a name")?;
        while self.peek_symbol('.') && self.peek_at(1).and_then(Token::ident).is_some() {
            self.pos += 1;
            name.push('.');
            name.push_str(&self.expect_ident("a name")?);
        }
        Ok(name)
    }

    fn skip_dims(&mut self) -> usize {
        let mut dims = 0;
        while self.peek_symbol('[') && self.peek_symbol_at(1, ']') {
            self.pos += 2;
            dims += 1;
        }
        dims
    }

    /// Skips `throws` clauses, annotation `default` values and the body or `;`.
    fn skip_method_rest(&mut self) -> Result<(), JavaSourceError> {
        while let Some(token) = self.peek() {
            if token.is_symbol('{') {
                return self.skip_balanced('{', '}');
            }
            self.pos += 1;
            if token.is_symbol(';') {
                return Ok(());
            }
        }
        Err(JavaSourceError::UnexpectedEof {
            expected: "a method body or `;`",
        })
    }

    /// Skips a field initializer, stopping before the `,` of the next
    /// declarator or the terminating `;`.
    fn skip_initializer(&mut self) -> Result<(), JavaSourceError> {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Symbol('(' | '[' | '{') => depth += 1,
                TokenKind::Symbol(')' | ']' | '}') if depth > 0 => depth -= 1,
                TokenKind::Symbol(';') if depth == 0 => return Ok(()),
                // `new HashMap<String, Long>()` also has a comma at depth zero
                TokenKind::Symbol(',') if depth == 0 && self.at_declarator(1) => return Ok(()),
                _ => {}
            }
            self.pos += 1;
        }
        Err(JavaSourceError::UnexpectedEof {
            expected: "`;` after field initializer",
        })
    }

    fn at_declarator(&self, offset: usize) -> bool {
        self.peek_at(offset).and_then(Token::ident).is_some()
            && self.peek_at(offset + 1).is_some_and(|t| {
                t.is_symbol('=') || t.is_symbol(',') || t.is_symbol(';') || t.is_symbol('[')
            })
    }

    fn skip_enum_constants(&mut self) -> Result<(), JavaSourceError> {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Symbol('(' | '{') => depth += 1,
                TokenKind::Symbol(')') if depth > 0 => depth -= 1,
                TokenKind::Symbol('}') if depth > 0 => depth -= 1,
                TokenKind::Symbol('}') => return Ok(()),
                TokenKind::Symbol(';') if depth == 0 => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(JavaSourceError::UnexpectedEof {
            expected: "the end of the enum constants",
        })
    }

    fn skip_balanced(&mut self, open: char, close: char) -> Result<(), JavaSourceError> {
        self.expect_symbol(open, "an opening bracket")?;
        let mut depth = 1usize;
        while let Some(token) = self.bump() {
            if token.is_symbol(open) {
                depth += 1;
            } else if token.is_symbol(close) {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
        }
        Err(JavaSourceError::UnexpectedEof {
            expected: "a closing bracket",
        })
    }

    fn at_annotation_type(&self) -> bool {
        self.peek_symbol('@') && self.peek_at(1).is_some_and(|t| t.is_ident("interface"))
    }

    fn at_nested_type(&self) -> bool {
        self.at_annotation_type()
            || self.peek().is_some_and(|t| {
                t.is_ident("class") || t.is_ident("interface") || t.is_ident("enum")
            })
            || (self.peek().is_some_and(|t| t.is_ident("record"))
                && self.peek_at(1).and_then(Token::ident).is_some()
                && self.peek_at(2).is_some_and(|t| t.is_symbol('(') || t.is_symbol('<')))
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    fn peek_symbol(&self, c: char) -> bool {
        self.peek_symbol_at(0, c)
    }

    fn peek_symbol_at(&self, offset: usize, c: char) -> bool {
        self.peek_at(offset).is_some_and(|t| t.is_symbol(c))
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat_symbol(&mut self, c: char) -> bool {
        if self.peek_symbol(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, text: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_ident(text)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, c: char, expected: &'static str) -> Result<(), JavaSourceError> {
        if self.eat_symbol(c) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_ident(&mut self, expected: &'static str) -> Result<String, JavaSourceError> {
        match self.peek().and_then(Token::ident) {
            Some(ident) => {
                self.pos += 1;
                Ok(ident.to_string())
            }
            None => Err(self.unexpected(expected)),
        }
    }

    fn unexpected(&self, expected: &'static str) -> JavaSourceError {
        match self.peek() {
            Some(token) => JavaSourceError::UnexpectedToken {
                found: format!("`{}`", &self.src[token.start..token.end]),
                offset: token.start,
                expected,
            },
            None => JavaSourceError::UnexpectedEof { expected },
        }
    }
}

/// Evaluates `"a" + "b" + ...`; anything else is not a constant.
fn string_constant(tokens: &[Token]) -> Option<String> {
    let mut value = String::new();
    let mut expect_literal = true;
    for token in tokens {
        match (&token.kind, expect_literal) {
            (TokenKind::Str(s), true) => value.push_str(s),
            (TokenKind::Symbol('+'), false) => {}
            _ => return None,
        }
        expect_literal = !expect_literal;
    }
    (!expect_literal).then_some(value)
}
