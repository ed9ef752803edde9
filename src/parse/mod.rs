//! Textual program format.
//!
//! ```text
//! class A {
//!     field f;
//!     static method main() {
//!         a = new A;
//!         b = new B;
//!         a.A::f = b;
//!         c = a.A::f;
//!         r = invokevirtual c.B::get(a);
//!         return r;
//!     }
//! }
//! entry A::main;
//! ```

mod ast;
mod grammar;
mod lexer;

use chumsky::{input::Stream, prelude::*};
use thiserror::Error;

use crate::ir::*;
use ast::*;
use lexer::Token;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: unrecognized input `{text}`")]
    Lex { line: usize, text: String },
    #[error("line {line}: expected {expected}, found `{found}`")]
    Unexpected {
        line: usize,
        expected: String,
        found: String,
    },
    #[error("unexpected end of input, expected {0}")]
    Eof(String),
    #[error("line {line}: `{name}` is a reserved word")]
    Reserved { line: usize, name: String },
    #[error("line {line}: abstract method `{method}` has a body")]
    AbstractBody { line: usize, method: String },
    #[error("line {line}: no method `{class}::{method}`")]
    UnknownEntry {
        line: usize,
        class: String,
        method: String,
    },
    #[error("line {line}: `{class}::{method}` is overloaded")]
    AmbiguousEntry {
        line: usize,
        class: String,
        method: String,
    },
    #[error(transparent)]
    Build(#[from] BuildError),
}

const KEYWORDS: &[&str] = &[
    "abstract",
    "class",
    "entry",
    "extends",
    "field",
    "implements",
    "interface",
    "invoke",
    "invokedynamic",
    "invokeinterface",
    "invokespecial",
    "invokestatic",
    "invokevirtual",
    "method",
    "new",
    "null",
    "return",
    "static",
];

pub fn parse_program(src: &str) -> Result<Program, ParseError> {
    let tokens = lexer::lex(src)?;
    let eoi = SimpleSpan::from(src.len()..src.len());
    let stream = Stream::from_iter(tokens).map(eoi, |(token, span)| (token, span));
    let items = grammar::program()
        .parse(stream)
        .into_result()
        .map_err(|errors| parse_error_from_chumsky(src, errors))?;

    let mut lowerer = Lowerer {
        src,
        builder: ProgramBuilder::new(),
    };
    lowerer.lower(&items)?;
    Ok(lowerer.builder.build())
}

/// Reports the first error chumsky produced.
fn parse_error_from_chumsky(src: &str, errors: Vec<Rich<'_, Token<'_>, SimpleSpan>>) -> ParseError {
    let Some(error) = errors.into_iter().next() else {
        return ParseError::Eof("input".to_string());
    };
    let mut expected: Vec<_> = error.expected().map(|e| e.to_string()).collect();
    expected.sort();
    expected.dedup();
    let expected = if expected.is_empty() {
        "something else".to_string()
    } else {
        expected.join(", ")
    };
    match error.found() {
        Some(found) => ParseError::Unexpected {
            line: lexer::line_of(src, error.span().start),
            expected,
            found: found.to_string(),
        },
        None => ParseError::Eof(expected),
    }
}

struct Lowerer<'src> {
    src: &'src str,
    builder: ProgramBuilder,
}

impl<'src> Lowerer<'src> {
    fn line(&self, span: SimpleSpan) -> usize {
        lexer::line_of(self.src, span.start)
    }

    /// The text of a name that is not a keyword.
    fn name(&self, name: Name<'src>) -> Result<&'src str, ParseError> {
        if KEYWORDS.contains(&name.text) {
            return Err(ParseError::Reserved {
                line: self.line(name.span),
                name: name.text.to_string(),
            });
        }
        Ok(name.text)
    }

    fn class(&mut self, name: Name<'src>) -> Result<ClassId, ParseError> {
        let name = self.name(name)?;
        Ok(self.builder.class(name))
    }

    fn var(&mut self, method: MethodId, name: Name<'src>) -> Result<VarId, ParseError> {
        let name = self.name(name)?;
        Ok(self.builder.var(method, name))
    }

    fn field_ref(&mut self, field: FieldDef<'src>) -> Result<FieldRef, ParseError> {
        Ok(FieldRef {
            class: self.class(field.class)?,
            name: self.name(field.name)?.to_string(),
        })
    }

    fn lower(&mut self, items: &[Item<'src>]) -> Result<(), ParseError> {
        let mut entry = None;
        for item in items {
            match item {
                Item::Class(class) => self.lower_class(class)?,
                Item::Entry {
                    class,
                    method,
                    span,
                } => entry = Some((*class, *method, *span)),
            }
        }
        let Some((class, method, span)) = entry else { return Ok(()) };
        let line = self.line(span);
        let class = self.name(class)?;
        let method = self.name(method)?;
        match self.builder.find_methods(class, method).as_slice() {
            [m] => {
                self.builder.set_entry(*m);
                Ok(())
            }
            [] => Err(ParseError::UnknownEntry {
                line,
                class: class.to_string(),
                method: method.to_string(),
            }),
            _ => Err(ParseError::AmbiguousEntry {
                line,
                class: class.to_string(),
                method: method.to_string(),
            }),
        }
    }

    fn lower_class(&mut self, def: &ClassDef<'src>) -> Result<(), ParseError> {
        let name = self.name(def.name)?;
        let superclass = def.superclass.map(|s| self.class(s)).transpose()?;
        let interfaces = def
            .interfaces
            .iter()
            .map(|i| self.class(*i))
            .collect::<Result<Vec<_>, _>>()?;
        let decl = ClassDecl {
            superclass,
            interfaces,
            is_interface: def.is_interface,
            is_abstract: def.is_abstract,
        };
        let class = self.builder.declare_class(name, decl)?;
        for member in &def.members {
            self.lower_member(class, member)?;
        }
        Ok(())
    }

    fn lower_member(&mut self, class: ClassId, member: &Member<'src>) -> Result<(), ParseError> {
        let name = self.name(member.name)?;
        let is_static = member.modifiers.contains(&Modifier::Static);
        match &member.kind {
            MemberKind::Field => {
                self.builder.add_field(class, name, is_static)?;
            }
            MemberKind::Method { params, body } => {
                if member.modifiers.contains(&Modifier::Abstract) && body.is_some() {
                    return Err(ParseError::AbstractBody {
                        line: self.line(member.name.span),
                        method: name.to_string(),
                    });
                }
                let params = params
                    .iter()
                    .map(|p| self.name(*p))
                    .collect::<Result<Vec<_>, _>>()?;
                let method =
                    self.builder
                        .add_method(class, name, &params, is_static, body.is_none())?;
                for stmt in body.iter().flatten() {
                    let stmt = self.lower_stmt(method, stmt)?;
                    self.builder.push_stmt(method, stmt);
                }
            }
        }
        Ok(())
    }

    fn lower_stmt(&mut self, method: MethodId, stmt: &StmtDef<'src>) -> Result<Stmt, ParseError> {
        let stmt = match stmt {
            StmtDef::Assign { lhs, rhs } => {
                let lhs = self.var(method, *lhs)?;
                self.lower_rhs(method, lhs, rhs)?
            }
            StmtDef::StoreField { base, field, rhs } => Stmt::StoreField {
                base: Some(self.var(method, *base)?),
                field: self.field_ref(*field)?,
                rhs: self.var(method, *rhs)?,
            },
            StmtDef::StoreStatic { field, rhs } => Stmt::StoreField {
                base: None,
                field: self.field_ref(*field)?,
                rhs: self.var(method, *rhs)?,
            },
            StmtDef::StoreArray { base, rhs } => Stmt::StoreArray {
                base: self.var(method, *base)?,
                rhs: self.var(method, *rhs)?,
            },
            StmtDef::Invoke(invoke) => Stmt::Invoke(self.lower_invoke(method, None, invoke)?),
            StmtDef::Return(var) => {
                Stmt::Return(var.map(|v| self.var(method, v)).transpose()?)
            }
        };
        Ok(stmt)
    }

    fn lower_rhs(&mut self, method: MethodId, lhs: VarId, rhs: &Rhs<'src>) -> Result<Stmt, ParseError> {
        let stmt = match rhs {
            Rhs::New { class, array } => Stmt::New {
                lhs,
                class: self.class(*class)?,
                array: *array,
            },
            Rhs::Const => Stmt::Const { lhs },
            Rhs::Copy(rhs) => Stmt::Copy {
                lhs,
                rhs: self.var(method, *rhs)?,
            },
            Rhs::LoadField { base, field } => Stmt::LoadField {
                lhs,
                base: Some(self.var(method, *base)?),
                field: self.field_ref(*field)?,
            },
            Rhs::LoadStatic(field) => Stmt::LoadField {
                lhs,
                base: None,
                field: self.field_ref(*field)?,
            },
            Rhs::LoadArray(base) => Stmt::LoadArray {
                lhs,
                base: self.var(method, *base)?,
            },
            Rhs::Invoke(invoke) => Stmt::Invoke(self.lower_invoke(method, Some(lhs), invoke)?),
        };
        Ok(stmt)
    }

    fn lower_invoke(
        &mut self,
        method: MethodId,
        lhs: Option<VarId>,
        def: &InvokeDef<'src>,
    ) -> Result<Invoke, ParseError> {
        let receiver = def.receiver.map(|r| self.var(method, r)).transpose()?;
        let class = self.class(def.class)?;
        let name = self.name(def.method)?;
        let args = def
            .args
            .iter()
            .map(|a| self.var(method, *a))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Invoke {
            lhs,
            kind: def.kind,
            method: MethodRef {
                class,
                subsig: Subsignature::new(name, args.len()),
            },
            receiver,
            args,
        })
    }
}

#[cfg(test)]
mod tests;
