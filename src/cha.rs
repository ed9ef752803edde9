//! Call graph construction by class hierarchy analysis.

use std::collections::VecDeque;

use crate::{
    call_graph::{CallGraph, Edge},
    hierarchy::ClassHierarchy,
    ir::*,
};

pub fn build_call_graph(program: &Program, entry: MethodId) -> CallGraph {
    let hierarchy = ClassHierarchy::new(program);
    let mut call_graph = CallGraph::new();
    call_graph.add_entry_method(entry);

    let mut worklist = VecDeque::from([entry]);
    while let Some(method) = worklist.pop_front() {
        if !call_graph.add_reachable_method(method) {
            continue;
        }
        for site in program.call_sites_in(method) {
            let Some(invoke) = program.invoke(site) else { continue };
            let callees = resolve(&hierarchy, invoke);
            if callees.is_empty() {
                tracing::debug!("no {} target for {}", invoke.kind, program.stmt_label(site));
            }
            for callee in callees {
                call_graph.add_edge(Edge::new(invoke.kind, site, callee));
                worklist.push_back(callee);
            }
        }
    }

    tracing::info!(
        "cha: {} reachable methods, {} call edges",
        call_graph.reachable_methods().len(),
        call_graph.num_edges()
    );
    call_graph
}

/// Every method `invoke` may reach given only the declared class of its
/// target.
pub fn resolve(hierarchy: &ClassHierarchy<'_>, invoke: &Invoke) -> Vec<MethodId> {
    if matches!(invoke.kind, CallKind::Static | CallKind::Special) {
        return hierarchy.resolve_callee(None, invoke).into_iter().collect();
    }
    let mut callees: Vec<_> = hierarchy
        .all_subtypes_of(invoke.method.class)
        .into_iter()
        .filter_map(|c| hierarchy.resolve_callee(Some(c), invoke))
        .collect();
    callees.sort();
    callees.dedup();
    callees
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{andersen, config::Config, parse};

    fn method(program: &Program, name: &str) -> MethodId {
        let (class, method) = name.split_once("::").unwrap();
        let ms = program.find_methods(class, method);
        assert_eq!(ms.len(), 1, "{}", name);
        ms[0]
    }

    fn names(program: &Program, methods: &[MethodId]) -> Vec<String> {
        let mut names: Vec<_> = methods.iter().map(|m| program.method_name(*m)).collect();
        names.sort();
        names
    }

    const CODE: &str = "
        interface I {
            method m();
        }
        abstract class A implements I {
            abstract method m();
            method n() { }
        }
        class B extends A {
            method m() { }
        }
        class C extends B {
            method m() { }
            method n() { }
        }
        class D implements I {
            method m() { }
        }
        class Main {
            static method main() {
                b = new B;
                invokeinterface b.I::m();
                invokevirtual b.A::n();
                invokespecial b.A::n();
                invokestatic Main::helper();
            }
            static method helper() { }
            static method dead() { }
        }
    ";

    #[test]
    fn test_resolve() {
        let program = parse::parse_program(CODE).unwrap();
        let hierarchy = ClassHierarchy::new(&program);
        let main = method(&program, "Main::main");
        let sites: Vec<_> = program.call_sites_in(main).collect();
        let resolve = |i: usize| {
            let callees = resolve(&hierarchy, program.invoke(sites[i]).unwrap());
            names(&program, &callees)
        };
        assert_eq!(resolve(0), vec!["B::m", "C::m", "D::m"]);
        assert_eq!(resolve(1), vec!["A::n", "C::n"]);
        assert_eq!(resolve(2), vec!["A::n"]);
        assert_eq!(resolve(3), vec!["Main::helper"]);
    }

    #[test]
    fn test_build() {
        let program = parse::parse_program(CODE).unwrap();
        let main = method(&program, "Main::main");
        let cg = build_call_graph(&program, main);
        assert_eq!(cg.entry_methods(), &[main]);
        assert_eq!(
            names(&program, cg.reachable_methods()),
            vec!["A::n", "B::m", "C::m", "C::n", "D::m", "Main::helper", "Main::main"]
        );
        assert_eq!(cg.num_edges(), 7);
        assert!(!cg.contains(method(&program, "Main::dead")));

        let sites: Vec<_> = program.call_sites_in(main).collect();
        assert_eq!(
            names(&program, cg.callees_of(sites[0])),
            vec!["B::m", "C::m", "D::m"]
        );
        assert!(cg.has_edge(sites[2], method(&program, "A::n")));
        assert!(!cg.has_edge(sites[2], method(&program, "C::n")));
        assert_eq!(cg.callers_of(method(&program, "A::n")), &[sites[1], sites[2]]);
    }

    #[test]
    fn test_unresolved_targets() {
        let program = parse::parse_program(
            "
            class A {
                static method main() {
                    a = new A;
                    invokevirtual a.A::missing();
                    invokestatic A::missing();
                    invokevirtual a.Phantom::m();
                    invokestatic A::main();
                }
            }
            ",
        )
        .unwrap();
        let main = method(&program, "A::main");
        let cg = build_call_graph(&program, main);
        assert_eq!(cg.reachable_methods(), &[main]);
        assert_eq!(cg.num_edges(), 1);
    }

    #[test]
    fn test_points_to_graph_is_subgraph() {
        let program = parse::parse_program(
            "
            class A {
                field f;
                method m(p) {
                    this.A::f = p;
                    r = this.A::f;
                    return r;
                }
                method n() { }
            }
            class B extends A {
                method m(p) {
                    invokevirtual p.A::n();
                    return this;
                }
            }
            class C extends A {
                method n() { }
            }
            class Main {
                static method main() {
                    a = new A;
                    b = new B;
                    c = new C;
                    x = invokevirtual a.A::m(b);
                    y = invokevirtual x.A::m(c);
                    invokespecial y.A::n();
                }
            }
            ",
        )
        .unwrap();
        let main = method(&program, "Main::main");
        let cha = build_call_graph(&program, main);
        let pta = andersen::analyze(&program, &Config::default()).unwrap();
        let pta = pta.call_graph();

        let cha_edges: HashSet<_> = cha.edges().iter().collect();
        for edge in pta.edges() {
            assert!(cha_edges.contains(edge), "{:?}", edge);
        }
        for m in pta.reachable_methods() {
            assert!(cha.contains(*m));
        }
        assert!(pta.num_edges() < cha.num_edges());
    }
}
