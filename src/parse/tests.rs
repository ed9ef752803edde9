use super::*;

fn parse(code: &str) -> Program {
    parse_program(code).unwrap()
}

fn method(program: &Program, class: &str, name: &str) -> MethodId {
    let ms = program.find_methods(class, name);
    assert_eq!(ms.len(), 1, "{}::{}", class, name);
    ms[0]
}

fn stmts(program: &Program, class: &str, name: &str) -> Vec<Stmt> {
    let m = method(program, class, name);
    program
        .method(m)
        .stmts
        .iter()
        .map(|s| program.stmt(*s).clone())
        .collect()
}

fn var(program: &Program, class: &str, name: &str, var: &str) -> VarId {
    program
        .find_var(method(program, class, name), var)
        .unwrap()
}

#[test]
fn test_lex() {
    let src = "a.B::f = c; // x\n/* y\n z */ d[0]";
    let tokens = lexer::lex(src).unwrap();
    let lines: Vec<_> = tokens
        .iter()
        .map(|(token, span)| (*token, lexer::line_of(src, span.start)))
        .collect();
    assert_eq!(
        lines,
        vec![
            (Token::Ident("a"), 1),
            (Token::Dot, 1),
            (Token::Ident("B"), 1),
            (Token::DoubleColon, 1),
            (Token::Ident("f"), 1),
            (Token::Equal, 1),
            (Token::Ident("c"), 1),
            (Token::Semicolon, 1),
            (Token::Ident("d"), 3),
            (Token::LBracket, 3),
            (Token::Int("0"), 3),
            (Token::RBracket, 3),
        ]
    );
    let (_, span) = tokens[3];
    assert_eq!(&src[span.start..span.end], "::");
}

#[test]
fn test_lex_error() {
    assert_eq!(
        parse_program("class A {\n  #\n}").unwrap_err(),
        ParseError::Lex {
            line: 2,
            text: "#".to_string()
        }
    );
}

#[test]
fn test_classes() {
    let program = parse(
        "
        interface I { }
        interface J extends I, K { }
        abstract class A implements I { }
        class B extends A implements J { }
        ",
    );
    let class = |name| program.class_by_name(name).unwrap();
    let i = program.class(class("I"));
    assert!(i.is_interface && i.declared);
    assert_eq!(program.class(class("J")).interfaces, vec![class("I"), class("K")]);
    assert!(!program.class(class("K")).declared);
    let a = program.class(class("A"));
    assert!(a.is_abstract && !a.is_interface);
    assert_eq!(a.superclass, None);
    let b = program.class(class("B"));
    assert_eq!(b.superclass, Some(class("A")));
    assert_eq!(b.interfaces, vec![class("J")]);
    assert_eq!(program.num_classes(), 5);
}

#[test]
fn test_members() {
    let program = parse(
        "
        abstract class A {
            field f;
            static field g;
            method m(a, b) { }
            static method s() { }
            abstract method n();
            method o(x);
        }
        ",
    );
    let a = program.class_by_name("A").unwrap();
    let fields: Vec<_> = program
        .class(a)
        .fields
        .iter()
        .map(|f| (program.field(*f).name.as_str(), program.field(*f).is_static))
        .collect();
    assert_eq!(fields, vec![("f", false), ("g", true)]);

    let m = program.method(method(&program, "A", "m"));
    assert!(!m.is_static && !m.is_abstract);
    assert_eq!(m.params.len(), 2);
    assert_eq!(program.var(m.this.unwrap()).name, "this");
    assert_eq!(m.subsig(), Subsignature::new("m", 2));

    let s = program.method(method(&program, "A", "s"));
    assert!(s.is_static);
    assert_eq!(s.this, None);

    assert!(program.method(method(&program, "A", "n")).is_abstract);
    assert!(program.method(method(&program, "A", "o")).is_abstract);
}

#[test]
fn test_overloads() {
    let program = parse(
        "
        class A {
            method m() { }
            method m(x) { }
        }
        ",
    );
    assert_eq!(program.find_methods("A", "m").len(), 2);
    assert_eq!(program.num_methods(), 2);
    assert_eq!(program.find_methods("A", "n"), vec![]);
    assert_eq!(program.find_methods("B", "m"), vec![]);
}

#[test]
fn test_statements() {
    let program = parse(
        "
        class A {
            static field g;
            field f;
            static method main(p) {
                a = new A;
                arr = new A[];
                b = a;
                c = a.A::f;
                a.A::f = b;
                d = A::g;
                A::g = d;
                e = arr[i];
                arr[0] = e;
                arr[] = e;
                k = 42;
                n = null;
                return b;
            }
        }
        ",
    );
    let v = |name| var(&program, "A", "main", name);
    let class = program.class_by_name("A").unwrap();
    let f = FieldRef {
        class,
        name: "f".to_string(),
    };
    let g = FieldRef {
        class,
        name: "g".to_string(),
    };
    assert_eq!(
        stmts(&program, "A", "main"),
        vec![
            Stmt::New {
                lhs: v("a"),
                class,
                array: false
            },
            Stmt::New {
                lhs: v("arr"),
                class,
                array: true
            },
            Stmt::Copy {
                lhs: v("b"),
                rhs: v("a")
            },
            Stmt::LoadField {
                lhs: v("c"),
                base: Some(v("a")),
                field: f.clone()
            },
            Stmt::StoreField {
                base: Some(v("a")),
                field: f,
                rhs: v("b")
            },
            Stmt::LoadField {
                lhs: v("d"),
                base: None,
                field: g.clone()
            },
            Stmt::StoreField {
                base: None,
                field: g,
                rhs: v("d")
            },
            Stmt::LoadArray {
                lhs: v("e"),
                base: v("arr")
            },
            Stmt::StoreArray {
                base: v("arr"),
                rhs: v("e")
            },
            Stmt::StoreArray {
                base: v("arr"),
                rhs: v("e")
            },
            Stmt::Const { lhs: v("k") },
            Stmt::Const { lhs: v("n") },
            Stmt::Return(Some(v("b"))),
        ]
    );
    let main = program.method(method(&program, "A", "main"));
    assert_eq!(main.return_vars, vec![v("b")]);
    assert_eq!(main.params, vec![v("p")]);
}

#[test]
fn test_invokes() {
    let program = parse(
        "
        class A {
            static method main() {
                x = invokestatic A::main();
                invokevirtual x.B::m(x, y);
                invokespecial x.B::init();
                z = invokeinterface x.I::n();
                invokedynamic x.B::m(y);
                invoke x.B::m();
                return;
            }
        }
        ",
    );
    let v = |name| var(&program, "A", "main", name);
    let main = method(&program, "A", "main");
    let sites: Vec<_> = program.call_sites_in(main).collect();
    assert_eq!(sites.len(), 6);

    let invoke = |i: usize| program.invoke(sites[i]).unwrap();
    assert_eq!(invoke(0).kind, CallKind::Static);
    assert_eq!(invoke(0).lhs, Some(v("x")));
    assert_eq!(invoke(0).receiver, None);
    assert_eq!(invoke(0).method.subsig, Subsignature::new("main", 0));

    assert_eq!(invoke(1).kind, CallKind::Virtual);
    assert_eq!(invoke(1).lhs, None);
    assert_eq!(invoke(1).receiver, Some(v("x")));
    assert_eq!(invoke(1).args, vec![v("x"), v("y")]);
    assert_eq!(
        program.class(invoke(1).method.class).name,
        "B".to_string()
    );

    assert_eq!(invoke(2).kind, CallKind::Special);
    assert_eq!(invoke(3).kind, CallKind::Interface);
    assert_eq!(invoke(3).lhs, Some(v("z")));
    assert_eq!(invoke(4).kind, CallKind::Dynamic);
    assert_eq!(invoke(5).kind, CallKind::Other);

    let relations = program.relations(v("x"));
    assert_eq!(relations.invokes.len(), 5);
    assert_eq!(
        stmts(&program, "A", "main").last(),
        Some(&Stmt::Return(None))
    );
    assert!(program.method(main).return_vars.is_empty());
}

#[test]
fn test_relations() {
    let program = parse(
        "
        class A {
            static method main() {
                a.A::f = b;
                c = a.A::f;
                a[0] = b;
                d = a[0];
                invokevirtual a.A::m(b);
            }
        }
        ",
    );
    let v = |name| var(&program, "A", "main", name);
    let r = program.relations(v("a"));
    assert_eq!(r.store_fields.len(), 1);
    assert_eq!(r.load_fields.len(), 1);
    assert_eq!(r.store_arrays.len(), 1);
    assert_eq!(r.load_arrays.len(), 1);
    assert_eq!(r.invokes.len(), 1);
    let r = program.relations(v("b"));
    assert!(r.store_fields.is_empty() && r.invokes.is_empty());
}

#[test]
fn test_labels() {
    let program = parse(
        "
        class A {
            field f;
            static method main() {
                a = new A;
                b = a;
            }
        }
        ",
    );
    let main = method(&program, "A", "main");
    let b = var(&program, "A", "main", "b");
    assert_eq!(program.method_name(main), "A::main");
    assert_eq!(program.var_name(b), "A::main/b");
    assert_eq!(program.stmt_label(program.method(main).stmts[1]), "A::main#1");
    let f = program.class(program.class_by_name("A").unwrap()).fields[0];
    assert_eq!(program.field_name(f), "A::f");
}

#[test]
fn test_entry() {
    let program = parse(
        "
        entry A::start;
        class A {
            static method start() { }
        }
        ",
    );
    assert_eq!(program.entry(), Some(method(&program, "A", "start")));

    assert_eq!(
        parse_program("class A { }\nentry A::start;").unwrap_err(),
        ParseError::UnknownEntry {
            line: 2,
            class: "A".to_string(),
            method: "start".to_string()
        }
    );
    assert!(matches!(
        parse_program("class A { method m() { } method m(x) { } } entry A::m;"),
        Err(ParseError::AmbiguousEntry { .. })
    ));
}

#[test]
fn test_reserved() {
    assert_eq!(
        parse_program("class new { }").unwrap_err(),
        ParseError::Reserved {
            line: 1,
            name: "new".to_string()
        }
    );
    assert!(matches!(
        parse_program("class A { method m(return) { } }"),
        Err(ParseError::Reserved { .. })
    ));
    assert_eq!(
        parse_program("class A {\n method m() {\n x = static; } }").unwrap_err(),
        ParseError::Reserved {
            line: 3,
            name: "static".to_string()
        }
    );
    assert!(matches!(
        parse_program("class A { method m() { invokevirtual x.new::m(); } }"),
        Err(ParseError::Reserved { .. })
    ));
}

#[test]
fn test_abstract_body() {
    assert_eq!(
        parse_program("class A {\n abstract method m() { } }").unwrap_err(),
        ParseError::AbstractBody {
            line: 2,
            method: "m".to_string()
        }
    );
}

#[test]
fn test_unexpected() {
    let err = parse_program("class A {\n method m() {\n x = ; } }").unwrap_err();
    assert!(
        matches!(&err, ParseError::Unexpected { line: 3, found, .. } if found == ";"),
        "{}",
        err
    );
    assert!(matches!(
        parse_program("field f;"),
        Err(ParseError::Unexpected { line: 1, found, .. }) if found == "field"
    ));
    assert!(matches!(
        parse_program("class A { method m() { x.f = y; } }"),
        Err(ParseError::Unexpected { found, .. }) if found == "="
    ));
    assert!(matches!(
        parse_program("class A { method m() { invokevirtual A::m(); } }"),
        Err(ParseError::Unexpected { found, .. }) if found == "::"
    ));
    assert!(matches!(
        parse_program("class A { method m(a,) { } }"),
        Err(ParseError::Unexpected { .. })
    ));
    assert!(matches!(
        parse_program("interface I implements J { }"),
        Err(ParseError::Unexpected { found, .. }) if found == "implements"
    ));
}

#[test]
fn test_eof() {
    assert!(matches!(
        parse_program("class A {"),
        Err(ParseError::Eof(_))
    ));
    assert!(matches!(
        parse_program("class A { method m() { x = a"),
        Err(ParseError::Eof(_))
    ));
    assert!(matches!(
        parse_program("entry A::"),
        Err(ParseError::Eof(expected)) if expected.contains("name")
    ));
}

#[test]
fn test_duplicates() {
    assert_eq!(
        parse_program("class A { } class A { }").unwrap_err(),
        ParseError::Build(BuildError::DuplicateClass("A".to_string()))
    );
    assert!(matches!(
        parse_program("class A { field f; static field f; }"),
        Err(ParseError::Build(BuildError::DuplicateField { .. }))
    ));
    assert!(matches!(
        parse_program("class A { method m(x) { } method m(y) { } }"),
        Err(ParseError::Build(BuildError::DuplicateMethod { .. }))
    ));
    assert!(matches!(
        parse_program("class A { method m(x, x) { } }"),
        Err(ParseError::Build(BuildError::DuplicateParam { .. }))
    ));
}

#[test]
fn test_empty() {
    let program = parse("// nothing\n");
    assert_eq!(program.num_classes(), 0);
    assert_eq!(program.entry(), None);
}
