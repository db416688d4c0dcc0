use indexmap::IndexMap;

use crate::{ast::Field, diagnostics::SourceSpan, types::Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
    Type,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub kind: SymbolKind,
    pub mutable: bool,
    pub used: bool,
    pub span: Option<SourceSpan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
    Loop,
    Struct,
    Impl,
    Module,
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    symbols: IndexMap<String, Symbol>,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            symbols: IndexMap::new(),
        }
    }

    /// Symbols declared in this scope that were never read.
    pub fn unused(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values().filter(|symbol| {
            !symbol.used
                && matches!(symbol.kind, SymbolKind::Variable | SymbolKind::Parameter)
                && !symbol.name.starts_with('_')
        })
    }
}

/// Lexically scoped symbol table. The global scope is never popped.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    structs: IndexMap<String, Vec<Field>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Global)],
            structs: IndexMap::new(),
        }
    }

    pub fn enter_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope::new(kind));
    }

    pub fn exit_scope(&mut self) -> Scope {
        debug_assert!(self.scopes.len() > 1, "global scope must stay");
        self.scopes.pop().unwrap_or_else(|| Scope::new(ScopeKind::Global))
    }

    pub fn in_function(&self) -> bool {
        self.scopes
            .iter()
            .any(|scope| scope.kind == ScopeKind::Function)
    }

    /// Declare a symbol in the current scope. Returns the previous
    /// declaration when the name is already taken here.
    pub fn define(&mut self, symbol: Symbol) -> Result<(), Symbol> {
        let scope = self
            .scopes
            .last_mut()
            .unwrap_or_else(|| unreachable!("global scope must stay"));
        if let Some(existing) = scope.symbols.get(&symbol.name) {
            return Err(existing.clone());
        }
        scope.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name))
    }

    pub fn mark_used(&mut self, name: &str) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(symbol) = scope.symbols.get_mut(name) {
                symbol.used = true;
                return;
            }
        }
    }

    /// Unused symbols of the never-popped global scope.
    pub fn global_unused(&self) -> Vec<Symbol> {
        self.scopes[0].unused().cloned().collect()
    }

    pub fn define_struct(&mut self, name: &str, fields: Vec<Field>) -> bool {
        if self.structs.contains_key(name) {
            return false;
        }
        self.structs.insert(name.to_string(), fields);
        true
    }

    pub fn struct_exists(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(name: &str, ty: Type) -> Symbol {
        Symbol {
            name: name.to_string(),
            ty,
            kind: SymbolKind::Variable,
            mutable: false,
            used: false,
            span: None,
        }
    }

    #[test]
    fn inner_scopes_shadow_outer() {
        let mut table = SymbolTable::new();
        table.define(symbol("x", Type::Int)).unwrap();
        table.enter_scope(ScopeKind::Block);
        table.define(symbol("x", Type::Str)).unwrap();
        assert_eq!(table.resolve("x").unwrap().ty, Type::Str);
        table.exit_scope();
        assert_eq!(table.resolve("x").unwrap().ty, Type::Int);
    }

    #[test]
    fn redefinition_in_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        table.define(symbol("x", Type::Int)).unwrap();
        assert!(table.define(symbol("x", Type::Int)).is_err());
    }

    #[test]
    fn unused_tracking() {
        let mut table = SymbolTable::new();
        table.enter_scope(ScopeKind::Block);
        table.define(symbol("a", Type::Int)).unwrap();
        table.define(symbol("b", Type::Int)).unwrap();
        table.mark_used("a");
        let scope = table.exit_scope();
        let unused: Vec<_> = scope.unused().map(|s| s.name.clone()).collect();
        assert_eq!(unused, vec!["b"]);
    }

    #[test]
    fn underscore_names_are_exempt() {
        let mut table = SymbolTable::new();
        table.enter_scope(ScopeKind::Block);
        table.define(symbol("_scratch", Type::Int)).unwrap();
        let scope = table.exit_scope();
        assert_eq!(scope.unused().count(), 0);
    }
}
