//! Program representation consumed by the analyses.
//!
//! Every entity lives in a `Vec` arena owned by [`Program`] and is addressed by
//! a `Copy` handle, so analyses can keep handles in their own tables while the
//! program stays immutable.

use std::collections::HashMap;

use thiserror::Error;

macro_rules! index_type {
    ($name:ident, $prefix:literal) => {
        #[repr(transparent)]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub fn new(i: usize) -> Self {
                assert!(i <= u32::MAX as usize, "{} index out of range: {}", stringify!($name), i);
                Self(i as u32)
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

pub(crate) use index_type;

index_type!(ClassId, "c");
index_type!(FieldId, "f");
index_type!(MethodId, "m");
index_type!(VarId, "v");
index_type!(StmtId, "s");

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subsignature {
    pub name: String,
    pub arity: usize,
}

impl Subsignature {
    pub fn new(name: &str, arity: usize) -> Self {
        Self {
            name: name.to_string(),
            arity,
        }
    }
}

impl std::fmt::Display for Subsignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallKind {
    Static,
    Special,
    Virtual,
    Interface,
    Dynamic,
    Other,
}

impl CallKind {
    #[inline]
    pub fn is_static(self) -> bool {
        self == CallKind::Static
    }
}

impl std::fmt::Display for CallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CallKind::Static => "static",
            CallKind::Special => "special",
            CallKind::Virtual => "virtual",
            CallKind::Interface => "interface",
            CallKind::Dynamic => "dynamic",
            CallKind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// A field named at a use site; resolved against the declaring class chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub class: ClassId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub class: ClassId,
    pub subsig: Subsignature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoke {
    pub lhs: Option<VarId>,
    pub kind: CallKind,
    pub method: MethodRef,
    /// `None` only for static calls.
    pub receiver: Option<VarId>,
    pub args: Vec<VarId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    New {
        lhs: VarId,
        class: ClassId,
        array: bool,
    },
    Copy {
        lhs: VarId,
        rhs: VarId,
    },
    /// `lhs = base.f`, or `lhs = C.f` when `base` is `None`.
    LoadField {
        lhs: VarId,
        base: Option<VarId>,
        field: FieldRef,
    },
    /// `base.f = rhs`, or `C.f = rhs` when `base` is `None`.
    StoreField {
        base: Option<VarId>,
        field: FieldRef,
        rhs: VarId,
    },
    LoadArray {
        lhs: VarId,
        base: VarId,
    },
    StoreArray {
        base: VarId,
        rhs: VarId,
    },
    Invoke(Invoke),
    Return(Option<VarId>),
    /// Assignment of a non-reference value.
    Const {
        lhs: VarId,
    },
}

#[derive(Debug, Clone)]
pub struct Class {
    pub name: String,
    pub superclass: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
    pub is_interface: bool,
    pub is_abstract: bool,
    /// False for classes that are only referenced.
    pub declared: bool,
    pub fields: Vec<FieldId>,
    pub methods: HashMap<Subsignature, MethodId>,
}

impl Class {
    fn phantom(name: &str) -> Self {
        Self {
            name: name.to_string(),
            superclass: None,
            interfaces: vec![],
            is_interface: false,
            is_abstract: false,
            declared: false,
            fields: vec![],
            methods: HashMap::new(),
        }
    }

    #[inline]
    pub fn declared_method(&self, subsig: &Subsignature) -> Option<MethodId> {
        self.methods.get(subsig).copied()
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub class: ClassId,
    pub is_static: bool,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub class: ClassId,
    pub is_static: bool,
    pub is_abstract: bool,
    pub params: Vec<VarId>,
    pub this: Option<VarId>,
    pub return_vars: Vec<VarId>,
    pub stmts: Vec<StmtId>,
    pub vars: Vec<VarId>,
}

impl Method {
    #[inline]
    pub fn subsig(&self) -> Subsignature {
        Subsignature::new(&self.name, self.params.len())
    }
}

#[derive(Debug, Clone)]
pub struct Var {
    pub name: String,
    pub method: MethodId,
}

/// Statements in which a variable is the base of an access or the receiver of
/// a call.
#[derive(Debug, Clone, Default)]
pub struct VarRelations {
    pub store_fields: Vec<StmtId>,
    pub load_fields: Vec<StmtId>,
    pub store_arrays: Vec<StmtId>,
    pub load_arrays: Vec<StmtId>,
    pub invokes: Vec<StmtId>,
}

#[derive(Debug, Default)]
pub struct Program {
    classes: Vec<Class>,
    fields: Vec<Field>,
    methods: Vec<Method>,
    vars: Vec<Var>,
    stmts: Vec<Stmt>,
    sites: Vec<(MethodId, usize)>,
    relations: Vec<VarRelations>,
    class_names: HashMap<String, ClassId>,
    entry: Option<MethodId>,
}

impl Program {
    #[inline]
    pub fn class(&self, class: ClassId) -> &Class {
        &self.classes[class.index()]
    }

    #[inline]
    pub fn field(&self, field: FieldId) -> &Field {
        &self.fields[field.index()]
    }

    #[inline]
    pub fn method(&self, method: MethodId) -> &Method {
        &self.methods[method.index()]
    }

    #[inline]
    pub fn var(&self, var: VarId) -> &Var {
        &self.vars[var.index()]
    }

    #[inline]
    pub fn stmt(&self, stmt: StmtId) -> &Stmt {
        &self.stmts[stmt.index()]
    }

    #[inline]
    pub fn relations(&self, var: VarId) -> &VarRelations {
        &self.relations[var.index()]
    }

    #[inline]
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn num_methods(&self) -> usize {
        self.methods.len()
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &Class)> + '_ {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, c)| (ClassId::new(i), c))
    }

    pub fn methods(&self) -> impl Iterator<Item = (MethodId, &Method)> + '_ {
        self.methods
            .iter()
            .enumerate()
            .map(|(i, m)| (MethodId::new(i), m))
    }

    #[inline]
    pub fn entry(&self) -> Option<MethodId> {
        self.entry
    }

    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.class_names.get(name).copied()
    }

    /// Methods declared in `class` named `name`, of any arity.
    pub fn find_methods(&self, class: &str, name: &str) -> Vec<MethodId> {
        let Some(class) = self.class_by_name(class) else { return vec![] };
        let mut methods: Vec<_> = self
            .class(class)
            .methods
            .values()
            .copied()
            .filter(|m| self.method(*m).name == name)
            .collect();
        methods.sort();
        methods
    }

    pub fn find_var(&self, method: MethodId, name: &str) -> Option<VarId> {
        self.method(method)
            .vars
            .iter()
            .copied()
            .find(|v| self.var(*v).name == name)
    }

    /// The class itself followed by its superclasses, nearest first.
    pub fn superclass_chain(&self, class: ClassId) -> SuperclassChain<'_> {
        SuperclassChain {
            program: self,
            next: Some(class),
            budget: self.classes.len(),
        }
    }

    pub fn resolve_field(&self, field: &FieldRef) -> Option<FieldId> {
        self.superclass_chain(field.class).find_map(|c| {
            self.class(c)
                .fields
                .iter()
                .copied()
                .find(|f| self.field(*f).name == field.name)
        })
    }

    pub fn invoke(&self, stmt: StmtId) -> Option<&Invoke> {
        match self.stmt(stmt) {
            Stmt::Invoke(invoke) => Some(invoke),
            _ => None,
        }
    }

    pub fn call_sites_in(&self, method: MethodId) -> impl Iterator<Item = StmtId> + '_ {
        self.method(method)
            .stmts
            .iter()
            .copied()
            .filter(|s| matches!(self.stmt(*s), Stmt::Invoke(_)))
    }

    /// The enclosing method and position of a statement.
    #[inline]
    pub fn site(&self, stmt: StmtId) -> (MethodId, usize) {
        self.sites[stmt.index()]
    }

    pub fn method_name(&self, method: MethodId) -> String {
        let method = self.method(method);
        format!("{}::{}", self.class(method.class).name, method.name)
    }

    pub fn field_name(&self, field: FieldId) -> String {
        let field = self.field(field);
        format!("{}::{}", self.class(field.class).name, field.name)
    }

    pub fn var_name(&self, var: VarId) -> String {
        let v = self.var(var);
        format!("{}/{}", self.method_name(v.method), v.name)
    }

    pub fn stmt_label(&self, stmt: StmtId) -> String {
        let (method, i) = self.site(stmt);
        format!("{}#{}", self.method_name(method), i)
    }
}

pub struct SuperclassChain<'a> {
    program: &'a Program,
    next: Option<ClassId>,
    budget: usize,
}

impl Iterator for SuperclassChain<'_> {
    type Item = ClassId;

    fn next(&mut self) -> Option<ClassId> {
        if self.budget == 0 {
            return None;
        }
        self.budget -= 1;
        let class = self.next?;
        self.next = self.program.class(class).superclass;
        Some(class)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("class `{0}` is declared more than once")]
    DuplicateClass(String),
    #[error("field `{class}::{name}` is declared more than once")]
    DuplicateField { class: String, name: String },
    #[error("method `{class}::{subsig}` is declared more than once")]
    DuplicateMethod { class: String, subsig: Subsignature },
    #[error("parameter `{param}` of `{class}::{method}` is declared more than once")]
    DuplicateParam {
        class: String,
        method: String,
        param: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ClassDecl {
    pub superclass: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
    pub is_interface: bool,
    pub is_abstract: bool,
}

#[derive(Debug, Default)]
pub struct ProgramBuilder {
    program: Program,
    var_names: HashMap<(MethodId, String), VarId>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the class named `name`, creating an undeclared one if needed.
    pub fn class(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.program.class_names.get(name) {
            return *id;
        }
        let id = ClassId::new(self.program.classes.len());
        self.program.classes.push(Class::phantom(name));
        self.program.class_names.insert(name.to_string(), id);
        id
    }

    pub fn declare_class(&mut self, name: &str, decl: ClassDecl) -> Result<ClassId, BuildError> {
        let id = self.class(name);
        let class = &mut self.program.classes[id.index()];
        if class.declared {
            return Err(BuildError::DuplicateClass(name.to_string()));
        }
        class.declared = true;
        class.superclass = decl.superclass;
        class.interfaces = decl.interfaces;
        class.is_interface = decl.is_interface;
        class.is_abstract = decl.is_abstract || decl.is_interface;
        Ok(id)
    }

    pub fn add_field(
        &mut self,
        class: ClassId,
        name: &str,
        is_static: bool,
    ) -> Result<FieldId, BuildError> {
        let c = &self.program.classes[class.index()];
        if c.fields
            .iter()
            .any(|f| self.program.fields[f.index()].name == name)
        {
            return Err(BuildError::DuplicateField {
                class: c.name.clone(),
                name: name.to_string(),
            });
        }
        let id = FieldId::new(self.program.fields.len());
        self.program.fields.push(Field {
            name: name.to_string(),
            class,
            is_static,
        });
        self.program.classes[class.index()].fields.push(id);
        Ok(id)
    }

    pub fn add_method(
        &mut self,
        class: ClassId,
        name: &str,
        params: &[&str],
        is_static: bool,
        is_abstract: bool,
    ) -> Result<MethodId, BuildError> {
        let subsig = Subsignature::new(name, params.len());
        let class_name = self.program.classes[class.index()].name.clone();
        if self.program.classes[class.index()]
            .methods
            .contains_key(&subsig)
        {
            return Err(BuildError::DuplicateMethod {
                class: class_name,
                subsig,
            });
        }
        for (i, p) in params.iter().enumerate() {
            if params[..i].contains(p) || (!is_static && *p == "this") {
                return Err(BuildError::DuplicateParam {
                    class: class_name,
                    method: name.to_string(),
                    param: p.to_string(),
                });
            }
        }

        let id = MethodId::new(self.program.methods.len());
        self.program.methods.push(Method {
            name: name.to_string(),
            class,
            is_static,
            is_abstract,
            params: vec![],
            this: None,
            return_vars: vec![],
            stmts: vec![],
            vars: vec![],
        });
        self.program.classes[class.index()]
            .methods
            .insert(subsig, id);

        if !is_static {
            let this = self.var(id, "this");
            self.program.methods[id.index()].this = Some(this);
        }
        let params: Vec<_> = params.iter().map(|p| self.var(id, p)).collect();
        self.program.methods[id.index()].params = params;
        Ok(id)
    }

    /// Returns the local `name` of `method`, creating it on first use.
    pub fn var(&mut self, method: MethodId, name: &str) -> VarId {
        if let Some(id) = self.var_names.get(&(method, name.to_string())) {
            return *id;
        }
        let id = VarId::new(self.program.vars.len());
        self.program.vars.push(Var {
            name: name.to_string(),
            method,
        });
        self.program.methods[method.index()].vars.push(id);
        self.var_names.insert((method, name.to_string()), id);
        id
    }

    pub fn push_stmt(&mut self, method: MethodId, stmt: Stmt) -> StmtId {
        let id = StmtId::new(self.program.stmts.len());
        let m = &mut self.program.methods[method.index()];
        if let Stmt::Return(Some(v)) = &stmt {
            if !m.return_vars.contains(v) {
                m.return_vars.push(*v);
            }
        }
        self.program.sites.push((method, m.stmts.len()));
        m.stmts.push(id);
        self.program.stmts.push(stmt);
        id
    }

    pub fn find_methods(&self, class: &str, name: &str) -> Vec<MethodId> {
        self.program.find_methods(class, name)
    }

    pub fn set_entry(&mut self, method: MethodId) {
        self.program.entry = Some(method);
    }

    pub fn build(mut self) -> Program {
        let mut relations = vec![VarRelations::default(); self.program.vars.len()];
        for (i, stmt) in self.program.stmts.iter().enumerate() {
            let id = StmtId::new(i);
            match stmt {
                Stmt::LoadField {
                    base: Some(base), ..
                } => relations[base.index()].load_fields.push(id),
                Stmt::StoreField {
                    base: Some(base), ..
                } => relations[base.index()].store_fields.push(id),
                Stmt::LoadArray { base, .. } => relations[base.index()].load_arrays.push(id),
                Stmt::StoreArray { base, .. } => relations[base.index()].store_arrays.push(id),
                Stmt::Invoke(Invoke {
                    receiver: Some(recv),
                    ..
                }) => relations[recv.index()].invokes.push(id),
                _ => {}
            }
        }
        self.program.relations = relations;
        self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_bounds() {
        let max = u32::MAX as usize;
        assert_eq!(ClassId::new(max).index(), max);
        assert_eq!(format!("{:?}", VarId::new(3)), "v3");
    }

    #[test]
    #[should_panic(expected = "index out of range")]
    fn test_index_overflow() {
        ClassId::new(u32::MAX as usize + 1);
    }

    #[test]
    fn test_builder() {
        let mut builder = ProgramBuilder::new();
        let a = builder.declare_class("A", ClassDecl::default()).unwrap();
        builder.add_field(a, "f", false).unwrap();
        let m = builder.add_method(a, "m", &["p"], false, false).unwrap();
        let p = builder.var(m, "p");
        let this = builder.var(m, "this");
        builder.push_stmt(m, Stmt::Copy { lhs: this, rhs: p });
        builder.push_stmt(m, Stmt::Return(Some(p)));
        assert_eq!(
            builder.add_method(a, "m", &["q"], false, false),
            Err(BuildError::DuplicateMethod {
                class: "A".to_string(),
                subsig: Subsignature::new("m", 1)
            })
        );
        let program = builder.build();

        assert_eq!(program.num_classes(), 1);
        assert_eq!(program.num_methods(), 1);
        let method = program.method(m);
        assert_eq!(method.params, vec![p]);
        assert_eq!(method.this, Some(this));
        assert_eq!(method.return_vars, vec![p]);
        let field = |name: &str| FieldRef {
            class: a,
            name: name.to_string(),
        };
        assert_eq!(
            program.resolve_field(&field("f")).map(|f| program.field_name(f)),
            Some("A::f".to_string())
        );
        assert_eq!(program.resolve_field(&field("g")), None);
    }
}
