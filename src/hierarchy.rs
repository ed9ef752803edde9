use std::collections::HashMap;

use crate::ir::*;

/// Subtype queries and method dispatch over one [`Program`].
pub struct ClassHierarchy<'p> {
    program: &'p Program,
    subclasses: HashMap<ClassId, Vec<ClassId>>,
    implementors: HashMap<ClassId, Vec<ClassId>>,
    subinterfaces: HashMap<ClassId, Vec<ClassId>>,
}

impl<'p> ClassHierarchy<'p> {
    pub fn new(program: &'p Program) -> Self {
        let mut subclasses: HashMap<_, Vec<_>> = HashMap::new();
        let mut implementors: HashMap<_, Vec<_>> = HashMap::new();
        let mut subinterfaces: HashMap<_, Vec<_>> = HashMap::new();
        for (id, class) in program.classes() {
            if let Some(sup) = class.superclass {
                subclasses.entry(sup).or_default().push(id);
            }
            for i in &class.interfaces {
                if class.is_interface {
                    subinterfaces.entry(*i).or_default().push(id);
                } else {
                    implementors.entry(*i).or_default().push(id);
                }
            }
        }
        Self {
            program,
            subclasses,
            implementors,
            subinterfaces,
        }
    }

    #[inline]
    pub fn program(&self) -> &'p Program {
        self.program
    }

    #[inline]
    pub fn superclass_of(&self, class: ClassId) -> Option<ClassId> {
        self.program.class(class).superclass
    }

    pub fn direct_subclasses_of(&self, class: ClassId) -> &[ClassId] {
        self.subclasses.get(&class).map_or(&[], |v| v.as_slice())
    }

    pub fn direct_implementors_of(&self, interface: ClassId) -> &[ClassId] {
        self.implementors.get(&interface).map_or(&[], |v| v.as_slice())
    }

    pub fn direct_subinterfaces_of(&self, interface: ClassId) -> &[ClassId] {
        self.subinterfaces
            .get(&interface)
            .map_or(&[], |v| v.as_slice())
    }

    /// Looks up a concrete method with `subsig`, starting at `class` and
    /// walking up the superclass chain.
    pub fn dispatch(&self, class: ClassId, subsig: &Subsignature) -> Option<MethodId> {
        self.program.superclass_chain(class).find_map(|c| {
            let m = self.program.class(c).declared_method(subsig)?;
            if self.program.method(m).is_abstract {
                None
            } else {
                Some(m)
            }
        })
    }

    /// Resolves the callee of `invoke` given the runtime class of the
    /// receiver. The receiver class is ignored for static and special calls.
    pub fn resolve_callee(&self, recv: Option<ClassId>, invoke: &Invoke) -> Option<MethodId> {
        let subsig = &invoke.method.subsig;
        let callee = match invoke.kind {
            CallKind::Static => {
                let m = self.dispatch(invoke.method.class, subsig)?;
                if !self.program.method(m).is_static {
                    return None;
                }
                m
            }
            CallKind::Special => self.dispatch(invoke.method.class, subsig)?,
            CallKind::Virtual | CallKind::Interface | CallKind::Dynamic | CallKind::Other => {
                self.dispatch(recv?, subsig)?
            }
        };
        if !invoke.kind.is_static() && self.program.method(callee).is_static {
            return None;
        }
        Some(callee)
    }

    /// `class` and every class or interface below it.
    pub fn all_subtypes_of(&self, class: ClassId) -> Vec<ClassId> {
        let mut visited = vec![false; self.program.num_classes()];
        let mut worklist = vec![class];
        let mut subtypes = vec![];
        while let Some(c) = worklist.pop() {
            if std::mem::replace(&mut visited[c.index()], true) {
                continue;
            }
            subtypes.push(c);
            worklist.extend_from_slice(self.direct_subclasses_of(c));
            if self.program.class(c).is_interface {
                worklist.extend_from_slice(self.direct_implementors_of(c));
                worklist.extend_from_slice(self.direct_subinterfaces_of(c));
            }
        }
        subtypes.sort();
        subtypes
    }
}
