//! Read-only traversal of the syntax tree.
//!
//! Every `visit_*` method defaults to the matching `walk_*` function, which
//! visits the node's children. Override a method to act on a node, and call
//! the `walk_*` function from it to keep descending.
//!
//! ```
//! use starling_frontend::ast::Expr;
//! use starling_frontend::visit::{self, Visitor};
//!
//! struct CountExprs(usize);
//!
//! impl<'ast> Visitor<'ast> for CountExprs {
//!     fn visit_expr(&mut self, expr: &'ast Expr) {
//!         self.0 += 1;
//!         visit::walk_expr(self, expr);
//!     }
//! }
//! ```

use crate::ast::*;

pub trait Visitor<'ast>: Sized {
    fn visit_module(&mut self, module: &'ast Module) {
        walk_module(self, module);
    }

    fn visit_item(&mut self, item: &'ast Item) {
        walk_item(self, item);
    }

    fn visit_function(&mut self, function: &'ast Function) {
        walk_function(self, function);
    }

    fn visit_generic_param(&mut self, param: &'ast GenericParam) {
        walk_generic_param(self, param);
    }

    fn visit_where_predicate(&mut self, predicate: &'ast WherePredicate) {
        walk_where_predicate(self, predicate);
    }

    fn visit_struct_kind(&mut self, kind: &'ast StructKind) {
        walk_struct_kind(self, kind);
    }

    fn visit_method(&mut self, method: &'ast Method) {
        self.visit_function(&method.function);
    }

    fn visit_block(&mut self, block: &'ast Block) {
        for stmt in &block.stmts {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    fn visit_pattern(&mut self, pattern: &'ast Pattern) {
        walk_pattern(self, pattern);
    }

    fn visit_type(&mut self, ty: &'ast Type) {
        walk_type(self, ty);
    }

    fn visit_path(&mut self, path: &'ast Path) {
        for ident in &path.segments {
            self.visit_ident(ident);
        }
    }

    fn visit_ident(&mut self, _ident: &'ast Ident) {}
}

pub fn walk_module<'ast, V: Visitor<'ast>>(v: &mut V, module: &'ast Module) {
    for item in &module.items {
        v.visit_item(item);
    }
}

pub fn walk_item<'ast, V: Visitor<'ast>>(v: &mut V, item: &'ast Item) {
    match &item.kind {
        ItemKind::Import { path, alias } => {
            v.visit_path(path);
            if let Some(alias) = alias {
                v.visit_ident(alias);
            }
        }

        ItemKind::Function(function) => v.visit_function(function),

        ItemKind::Struct(s) => {
            v.visit_ident(&s.name);
            walk_generics(v, &s.generics, &s.where_clause);
            v.visit_struct_kind(&s.kind);
            walk_types(v, &s.implements);
            for method in &s.methods {
                v.visit_method(method);
            }
        }

        ItemKind::Enum(e) => {
            v.visit_ident(&e.name);
            walk_generics(v, &e.generics, &e.where_clause);
            walk_types(v, &e.implements);
            for variant in &e.variants {
                v.visit_ident(&variant.name);
                v.visit_struct_kind(&variant.kind);
            }
            for method in &e.methods {
                v.visit_method(method);
            }
        }

        ItemKind::Interface(i) => {
            v.visit_ident(&i.name);
            walk_generics(v, &i.generics, &i.where_clause);
            walk_types(v, &i.supertraits);
            for method in &i.methods {
                v.visit_method(method);
            }
        }

        ItemKind::TypeAlias(alias) => {
            v.visit_ident(&alias.name);
            walk_generics(v, &alias.generics, &[]);
            v.visit_type(&alias.ty);
        }

        ItemKind::ParseError => {}
    }
}

pub fn walk_function<'ast, V: Visitor<'ast>>(v: &mut V, function: &'ast Function) {
    let signature = &function.signature;

    v.visit_ident(&signature.name);
    walk_generics(v, &signature.generics, &signature.where_clause);

    for param in &signature.params {
        match &param.kind {
            ParamKind::SelfParam { ty } => {
                if let Some(ty) = ty {
                    v.visit_type(ty);
                }
            }
            ParamKind::Regular { pattern, ty } => {
                v.visit_pattern(pattern);
                v.visit_type(ty);
            }
        }
    }

    if let Some(ty) = &signature.return_type {
        v.visit_type(ty);
    }
    if let Some(body) = &function.body {
        v.visit_block(body);
    }
}

pub fn walk_generic_param<'ast, V: Visitor<'ast>>(v: &mut V, param: &'ast GenericParam) {
    v.visit_ident(&param.name);
    walk_types(v, &param.bounds);
    if let Some(default) = &param.default {
        v.visit_type(default);
    }
}

pub fn walk_where_predicate<'ast, V: Visitor<'ast>>(v: &mut V, predicate: &'ast WherePredicate) {
    v.visit_type(&predicate.ty);
    walk_types(v, &predicate.bounds);
}

pub fn walk_struct_kind<'ast, V: Visitor<'ast>>(v: &mut V, kind: &'ast StructKind) {
    match kind {
        StructKind::Unit => {}
        StructKind::Tuple(fields) => {
            for field in fields {
                v.visit_type(&field.ty);
            }
        }
        StructKind::Record(fields) => {
            for field in fields {
                v.visit_ident(&field.name);
                v.visit_type(&field.ty);
            }
        }
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast>>(v: &mut V, stmt: &'ast Stmt) {
    match &stmt.kind {
        StmtKind::Let { pattern, ty, value } => {
            v.visit_pattern(pattern);
            if let Some(ty) = ty {
                v.visit_type(ty);
            }
            v.visit_expr(value);
        }
        StmtKind::Expr { expr, .. } | StmtKind::Defer(expr) => v.visit_expr(expr),
        StmtKind::Return(expr) => {
            if let Some(expr) = expr {
                v.visit_expr(expr);
            }
        }
        StmtKind::Break | StmtKind::Continue | StmtKind::Empty | StmtKind::ParseError => {}
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast>>(v: &mut V, expr: &'ast Expr) {
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Identifier(_) | ExprKind::Underscore => {}

        ExprKind::Parenthesized(inner) => v.visit_expr(inner),
        ExprKind::Tuple(elems) | ExprKind::List(elems) => walk_exprs(v, elems),
        ExprKind::Block(block) | ExprKind::Loop(block) => v.visit_block(block),

        ExprKind::Prefix { expr, .. } | ExprKind::Postfix { expr, .. } => v.visit_expr(expr),
        ExprKind::Binary { lhs, rhs, .. } | ExprKind::Assign { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::Cast { expr, ty } => {
            v.visit_expr(expr);
            v.visit_type(ty);
        }

        ExprKind::Call { callee, args } => {
            v.visit_expr(callee);
            walk_exprs(v, args);
        }
        ExprKind::Index { expr, index } => {
            v.visit_expr(expr);
            v.visit_expr(index);
        }
        ExprKind::Field { expr, field } => {
            v.visit_expr(expr);
            v.visit_ident(field);
        }
        ExprKind::Struct { path, fields } => {
            v.visit_path(path);
            for field in fields {
                v.visit_ident(&field.name);
                if let Some(value) = &field.value {
                    v.visit_expr(value);
                }
            }
        }

        ExprKind::If { cond, then, else_ } => {
            v.visit_expr(cond);
            v.visit_block(then);
            if let Some(else_) = else_ {
                v.visit_expr(else_);
            }
        }
        ExprKind::Match { scrutinee, arms } => {
            v.visit_expr(scrutinee);
            for arm in arms {
                v.visit_pattern(&arm.pattern);
                v.visit_expr(&arm.body);
            }
        }
        ExprKind::While { cond, body } => {
            v.visit_expr(cond);
            v.visit_block(body);
        }
        ExprKind::For {
            pattern,
            iterable,
            body,
        } => {
            v.visit_pattern(pattern);
            v.visit_expr(iterable);
            v.visit_block(body);
        }
        ExprKind::Lambda {
            params,
            return_type,
            body,
        } => {
            for param in params {
                v.visit_pattern(&param.pattern);
                if let Some(ty) = &param.ty {
                    v.visit_type(ty);
                }
            }
            if let Some(ty) = return_type {
                v.visit_type(ty);
            }
            v.visit_expr(body);
        }

        ExprKind::ParseError => {}
    }
}

pub fn walk_pattern<'ast, V: Visitor<'ast>>(v: &mut V, pattern: &'ast Pattern) {
    match &pattern.kind {
        PatternKind::Identifier { name, sub } => {
            v.visit_ident(name);
            if let Some(sub) = sub {
                v.visit_pattern(sub);
            }
        }
        PatternKind::Struct { path, fields, .. } => {
            v.visit_path(path);
            for field in fields {
                v.visit_ident(&field.name);
                if let Some(pattern) = &field.pattern {
                    v.visit_pattern(pattern);
                }
            }
        }
        PatternKind::TupleLike { path, elems } => {
            v.visit_path(path);
            walk_patterns(v, elems);
        }
        PatternKind::Tuple(elems) | PatternKind::List(elems) | PatternKind::Or(elems) => {
            walk_patterns(v, elems);
        }
        PatternKind::Grouped(inner) => v.visit_pattern(inner),
        PatternKind::Path(path) => v.visit_path(path),

        PatternKind::Literal { .. }
        | PatternKind::Wildcard
        | PatternKind::Rest
        | PatternKind::ParseError => {}
    }
}

pub fn walk_type<'ast, V: Visitor<'ast>>(v: &mut V, ty: &'ast Type) {
    match &ty.kind {
        TypeKind::Path { path, args } => {
            v.visit_path(path);
            walk_types(v, args);
        }
        TypeKind::Tuple(types) | TypeKind::Dyn(types) => walk_types(v, types),
        TypeKind::Function { params, ret } => {
            walk_types(v, params);
            if let Some(ret) = ret {
                v.visit_type(ret);
            }
        }
        TypeKind::Infer | TypeKind::ParseError => {}
    }
}

fn walk_generics<'ast, V: Visitor<'ast>>(
    v: &mut V,
    generics: &'ast [GenericParam],
    where_clause: &'ast [WherePredicate],
) {
    for param in generics {
        v.visit_generic_param(param);
    }
    for predicate in where_clause {
        v.visit_where_predicate(predicate);
    }
}

fn walk_exprs<'ast, V: Visitor<'ast>>(v: &mut V, exprs: &'ast [Expr]) {
    for expr in exprs {
        v.visit_expr(expr);
    }
}

fn walk_patterns<'ast, V: Visitor<'ast>>(v: &mut V, patterns: &'ast [Pattern]) {
    for pattern in patterns {
        v.visit_pattern(pattern);
    }
}

fn walk_types<'ast, V: Visitor<'ast>>(v: &mut V, types: &'ast [Type]) {
    for ty in types {
        v.visit_type(ty);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use starling_interner::Interner;

    use super::*;

    /// Every name the tree mentions, in visiting order.
    struct Names<'i> {
        interner: &'i Interner,
        names: Vec<String>,
    }

    impl<'ast> Visitor<'ast> for Names<'_> {
        fn visit_ident(&mut self, ident: &'ast Ident) {
            self.names.push(self.interner[ident.name].to_owned());
        }

        fn visit_expr(&mut self, expr: &'ast Expr) {
            if let ExprKind::Identifier(name) = expr.kind {
                self.names.push(self.interner[name].to_owned());
            }
            walk_expr(self, expr);
        }
    }

    fn names(source: &str) -> Vec<String> {
        let interner = Interner::new();
        let (module, errors) = crate::parse(source, &interner);
        assert_eq!(errors, vec![]);

        let mut visitor = Names {
            interner: &interner,
            names: vec![],
        };
        visitor.visit_module(&module);
        visitor.names
    }

    #[test]
    fn reaches_every_name() {
        assert_eq!(
            names(
                "import std.io as io;\n\
                 struct Point[T: Num] { x: T }\n\
                 fun add(p: Point[i32], q: i32): i32 {\n\
                     let Point { x } = p;\n\
                     match q { n @ 1 -> x + n, _ -> |k| k * q }\n\
                 }\n"
            ),
            [
                "std", "io", "io", "Point", "T", "Num", "x", "T", "add", "p", "Point", "i32",
                "q", "i32", "i32", "Point", "x", "p", "q", "n", "x", "n", "k", "k", "q",
            ]
        );
    }

    #[test]
    fn overriding_without_walking_prunes() {
        struct TopLevelExprs(usize);

        impl<'ast> Visitor<'ast> for TopLevelExprs {
            fn visit_expr(&mut self, _expr: &'ast Expr) {
                self.0 += 1;
            }
        }

        let interner = Interner::new();
        let (module, _) = crate::parse("fun f() { g(1 + 2); let _ = _; }", &interner);

        let mut visitor = TopLevelExprs(0);
        visitor.visit_module(&module);
        assert_eq!(visitor.0, 2);
    }
}
