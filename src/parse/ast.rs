//! Syntax tree produced by the grammar and consumed by lowering.

use chumsky::span::SimpleSpan;

use crate::ir::CallKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Name<'src> {
    pub text: &'src str,
    pub span: SimpleSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item<'src> {
    Class(ClassDef<'src>),
    Entry {
        class: Name<'src>,
        method: Name<'src>,
        span: SimpleSpan,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef<'src> {
    pub name: Name<'src>,
    pub is_interface: bool,
    pub is_abstract: bool,
    pub superclass: Option<Name<'src>>,
    pub interfaces: Vec<Name<'src>>,
    pub members: Vec<Member<'src>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Static,
    Abstract,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member<'src> {
    pub modifiers: Vec<Modifier>,
    pub name: Name<'src>,
    pub kind: MemberKind<'src>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind<'src> {
    Field,
    Method {
        params: Vec<Name<'src>>,
        /// `None` for a declaration ending in `;`.
        body: Option<Vec<StmtDef<'src>>>,
    },
}

/// `C::f`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef<'src> {
    pub class: Name<'src>,
    pub name: Name<'src>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeDef<'src> {
    pub kind: CallKind,
    pub receiver: Option<Name<'src>>,
    pub class: Name<'src>,
    pub method: Name<'src>,
    pub args: Vec<Name<'src>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtDef<'src> {
    Assign { lhs: Name<'src>, rhs: Rhs<'src> },
    StoreField {
        base: Name<'src>,
        field: FieldDef<'src>,
        rhs: Name<'src>,
    },
    StoreStatic {
        field: FieldDef<'src>,
        rhs: Name<'src>,
    },
    StoreArray { base: Name<'src>, rhs: Name<'src> },
    Invoke(InvokeDef<'src>),
    Return(Option<Name<'src>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rhs<'src> {
    New { class: Name<'src>, array: bool },
    Const,
    Copy(Name<'src>),
    LoadField { base: Name<'src>, field: FieldDef<'src> },
    LoadStatic(FieldDef<'src>),
    LoadArray(Name<'src>),
    Invoke(InvokeDef<'src>),
}
