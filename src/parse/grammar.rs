//! Parser combinators for the textual program format.

use chumsky::prelude::*;

use super::{ast::*, lexer::Token};
use crate::ir::CallKind;

pub trait TokenInput<'tokens, 'src: 'tokens>:
    chumsky::input::ValueInput<'tokens, Token = Token<'src>, Span = SimpleSpan>
{
}

impl<'tokens, 'src: 'tokens, I> TokenInput<'tokens, 'src> for I where
    I: chumsky::input::ValueInput<'tokens, Token = Token<'src>, Span = SimpleSpan>
{
}

pub type ParserError<'tokens, 'src> = extra::Err<Rich<'tokens, Token<'src>, SimpleSpan>>;

/// Matches the identifier `kw` exactly.
fn keyword<'tokens, 'src: 'tokens, I>(
    kw: &'static str,
) -> impl Parser<'tokens, I, (), ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    select! { Token::Ident(id) if id == kw => () }.labelled(format!("`{}`", kw))
}

/// Any identifier. Keywords are accepted here and rejected during lowering.
fn name<'tokens, 'src: 'tokens, I>() -> impl Parser<'tokens, I, Name<'src>, ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    select! { Token::Ident(text) = e => Name { text, span: e.span() } }.labelled("name")
}

fn name_list<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, Vec<Name<'src>>, ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    name()
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>()
}

fn paren_names<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, Vec<Name<'src>>, ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    name()
        .separated_by(just(Token::Comma))
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LParen), just(Token::RParen))
}

/// `C::f`
fn field_def<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, FieldDef<'src>, ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    name()
        .then_ignore(just(Token::DoubleColon))
        .then(name())
        .map(|(class, name)| FieldDef { class, name })
}

/// `[i]`, `[0]` or `[]`; the index is not recorded.
fn array_index<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, (), ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    select! { Token::Ident(_) => (), Token::Int(_) => () }
        .labelled("array index")
        .or_not()
        .ignored()
        .delimited_by(just(Token::LBracket), just(Token::RBracket))
}

/// `= y` of a store.
fn assigned<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, Name<'src>, ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    just(Token::Equal).ignore_then(name())
}

/// `C::m(a, b)`
fn call_target<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, ((Name<'src>, Name<'src>), Vec<Name<'src>>), ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    name()
        .then_ignore(just(Token::DoubleColon))
        .then(name())
        .then(paren_names())
}

fn invoke<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, InvokeDef<'src>, ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    let static_call = keyword("invokestatic")
        .ignore_then(call_target())
        .map(|((class, method), args)| InvokeDef {
            kind: CallKind::Static,
            receiver: None,
            class,
            method,
            args,
        });
    let kind = select! {
        Token::Ident("invokespecial") => CallKind::Special,
        Token::Ident("invokevirtual") => CallKind::Virtual,
        Token::Ident("invokeinterface") => CallKind::Interface,
        Token::Ident("invokedynamic") => CallKind::Dynamic,
        Token::Ident("invoke") => CallKind::Other,
    };
    let instance_call = kind
        .then(name().then_ignore(just(Token::Dot)))
        .then(call_target())
        .map(|((kind, receiver), ((class, method), args))| InvokeDef {
            kind,
            receiver: Some(receiver),
            class,
            method,
            args,
        });
    choice((static_call, instance_call)).labelled("invocation")
}

#[derive(Debug, Clone)]
enum Access<'src> {
    Field(FieldDef<'src>),
    Static(Name<'src>),
    Array,
}

fn rhs<'tokens, 'src: 'tokens, I>() -> impl Parser<'tokens, I, Rhs<'src>, ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    let new = keyword("new")
        .ignore_then(name())
        .then(just(Token::LBracket).then(just(Token::RBracket)).or_not())
        .map(|(class, array)| Rhs::New {
            class,
            array: array.is_some(),
        });
    let constant = select! { Token::Int(_) => Rhs::Const, Token::Ident("null") => Rhs::Const };
    let access = choice((
        just(Token::Dot).ignore_then(field_def()).map(Access::Field),
        just(Token::DoubleColon).ignore_then(name()).map(Access::Static),
        array_index().to(Access::Array),
    ));
    let place = name()
        .then(access.or_not())
        .map(|(first, access)| match access {
            None => Rhs::Copy(first),
            Some(Access::Field(field)) => Rhs::LoadField { base: first, field },
            Some(Access::Static(name)) => Rhs::LoadStatic(FieldDef { class: first, name }),
            Some(Access::Array) => Rhs::LoadArray(first),
        });
    choice((invoke().map(Rhs::Invoke), new, constant, place)).labelled("expression")
}

#[derive(Debug, Clone)]
enum Target<'src> {
    Var(Rhs<'src>),
    Field(FieldDef<'src>, Name<'src>),
    Static(Name<'src>, Name<'src>),
    Array(Name<'src>),
}

fn stmt<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, StmtDef<'src>, ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    let ret = keyword("return")
        .ignore_then(name().or_not())
        .map(StmtDef::Return);
    let target = choice((
        just(Token::Equal).ignore_then(rhs()).map(Target::Var),
        just(Token::Dot)
            .ignore_then(field_def())
            .then(assigned())
            .map(|(field, rhs)| Target::Field(field, rhs)),
        just(Token::DoubleColon)
            .ignore_then(name())
            .then(assigned())
            .map(|(field, rhs)| Target::Static(field, rhs)),
        array_index().ignore_then(assigned()).map(Target::Array),
    ));
    let place = name().then(target).map(|(first, target)| match target {
        Target::Var(rhs) => StmtDef::Assign { lhs: first, rhs },
        Target::Field(field, rhs) => StmtDef::StoreField {
            base: first,
            field,
            rhs,
        },
        Target::Static(name, rhs) => StmtDef::StoreStatic {
            field: FieldDef { class: first, name },
            rhs,
        },
        Target::Array(rhs) => StmtDef::StoreArray { base: first, rhs },
    });
    choice((ret, invoke().map(StmtDef::Invoke), place))
        .labelled("statement")
        .then_ignore(just(Token::Semicolon))
}

fn member<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, Member<'src>, ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    let modifiers = choice((
        keyword("static").to(Modifier::Static),
        keyword("abstract").to(Modifier::Abstract),
    ))
    .repeated()
    .collect::<Vec<_>>();
    let field = keyword("field")
        .ignore_then(name())
        .then_ignore(just(Token::Semicolon))
        .map(|name| (name, MemberKind::Field));
    let body = stmt()
        .repeated()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LBrace), just(Token::RBrace))
        .map(Some)
        .or(just(Token::Semicolon).to(None));
    let method = keyword("method")
        .ignore_then(name())
        .then(paren_names())
        .then(body)
        .map(|((name, params), body)| (name, MemberKind::Method { params, body }));
    modifiers
        .then(choice((field, method)))
        .map(|(modifiers, (name, kind))| Member {
            modifiers,
            name,
            kind,
        })
        .labelled("member")
}

fn class_body<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, Vec<Member<'src>>, ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    member()
        .repeated()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LBrace), just(Token::RBrace))
}

fn class_def<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, ClassDef<'src>, ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    let class = keyword("abstract")
        .or_not()
        .then_ignore(keyword("class"))
        .then(name())
        .then(keyword("extends").ignore_then(name()).or_not())
        .then(keyword("implements").ignore_then(name_list()).or_not())
        .then(class_body())
        .map(|((((is_abstract, name), superclass), interfaces), members)| ClassDef {
            name,
            is_interface: false,
            is_abstract: is_abstract.is_some(),
            superclass,
            interfaces: interfaces.unwrap_or_default(),
            members,
        });
    let interface = keyword("interface")
        .ignore_then(name())
        .then(keyword("extends").ignore_then(name_list()).or_not())
        .then(class_body())
        .map(|((name, interfaces), members)| ClassDef {
            name,
            is_interface: true,
            is_abstract: false,
            superclass: None,
            interfaces: interfaces.unwrap_or_default(),
            members,
        });
    choice((class, interface))
}

fn item<'tokens, 'src: 'tokens, I>() -> impl Parser<'tokens, I, Item<'src>, ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    let entry = keyword("entry")
        .ignore_then(name())
        .then_ignore(just(Token::DoubleColon))
        .then(name())
        .then_ignore(just(Token::Semicolon))
        .map_with(|(class, method), extra| Item::Entry {
            class,
            method,
            span: extra.span(),
        });
    choice((entry, class_def().map(Item::Class))).labelled("item")
}

pub fn program<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, Vec<Item<'src>>, ParserError<'tokens, 'src>>
where
    I: TokenInput<'tokens, 'src>,
{
    item().repeated().collect::<Vec<_>>().then_ignore(end())
}
