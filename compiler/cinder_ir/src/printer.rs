//! Source-like rendering of checked declarations.
//!
//! Backs the `.printAST` toggle: after an increment commits, its
//! declarations are printed the way the engine understood them, with
//! extracted globals, implicit conversions and deferred names visible.

use std::fmt::Write;

use crate::{
    Callee, Decl, DeclId, DeclKind, DeclLookup, FnBody, HExpr, HExprKind, HStmt, HStmtKind, Name,
    Place, StringInterner, Type,
};

/// Render `decls` in order, one declaration after another.
pub fn print_decls<'a>(
    decls: impl IntoIterator<Item = &'a Decl>,
    lookup: &dyn DeclLookup,
    interner: &StringInterner,
) -> String {
    let mut printer = DeclPrinter {
        lookup,
        interner,
        out: String::new(),
        indent: 0,
        slots: Vec::new(),
    };
    for decl in decls {
        printer.decl(decl);
    }
    printer.out
}

struct DeclPrinter<'a> {
    lookup: &'a dyn DeclLookup,
    interner: &'a StringInterner,
    out: String,
    indent: usize,
    /// Names of frame slots in the function being printed.
    slots: Vec<Name>,
}

impl DeclPrinter<'_> {
    fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    fn decl_name(&self, id: DeclId) -> &'static str {
        self.lookup
            .decl(id)
            .map_or("<unknown>", |decl| self.name(decl.name))
    }

    fn ty(&self, ty: &Type) -> String {
        ty.display(self.interner).to_string()
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn decl(&mut self, decl: &Decl) {
        let name = self.name(decl.name);
        match &decl.kind {
            DeclKind::Variable(var) => {
                let konst = if var.is_const { "const " } else { "" };
                let mut text = format!("{konst}{} {name}", self.ty(&var.ty));
                if let Some(init) = &var.init {
                    self.slots.clear();
                    let _ = write!(text, " = {}", self.expr(init));
                }
                text.push(';');
                self.line(&text);
            }
            DeclKind::Function(info) => {
                let params: Vec<String> = info
                    .sig
                    .params
                    .iter()
                    .zip(&info.params)
                    .map(|(ty, param)| {
                        if *param == Name::EMPTY {
                            self.ty(ty)
                        } else {
                            format!("{} {}", self.ty(ty), self.name(*param))
                        }
                    })
                    .collect();
                let head = format!("{} {name}({})", self.ty(&info.sig.ret), params.join(", "));
                match &info.body {
                    None => self.line(&format!("{head};")),
                    Some(body) => {
                        self.slots = info.params.clone();
                        self.body(&head, body);
                    }
                }
            }
            DeclKind::Enum { enumerators } => {
                let items: Vec<String> = enumerators
                    .iter()
                    .filter_map(|id| self.lookup.decl(*id))
                    .map(|e| match e.kind {
                        DeclKind::Enumerator { value, .. } => {
                            format!("{} = {value}", self.name(e.name))
                        }
                        _ => self.name(e.name).to_owned(),
                    })
                    .collect();
                self.line(&format!("enum {name} {{ {} }};", items.join(", ")));
            }
            // Printed as part of their enum.
            DeclKind::Enumerator { .. } => {}
            DeclKind::Typedef(ty) => {
                let text = format!("typedef {} {name};", self.ty(ty));
                self.line(&text);
            }
            DeclKind::Wrapper(body) => {
                self.slots.clear();
                self.body(&format!("void {name}()"), body);
            }
        }
    }

    fn body(&mut self, head: &str, body: &FnBody) {
        self.line(&format!("{head} {{"));
        self.indent += 1;
        for stmt in &body.stmts {
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.line("}");
    }

    fn stmt(&mut self, stmt: &HStmt) {
        match &stmt.kind {
            HStmtKind::Expr(expr) => {
                let text = format!("{};", self.expr(expr));
                self.line(&text);
            }
            HStmtKind::Local {
                slot,
                name,
                ty,
                init,
            } => {
                if self.slots.len() <= slot.index() {
                    self.slots.resize(slot.index() + 1, Name::EMPTY);
                }
                self.slots[slot.index()] = *name;
                let mut text = format!("{} {}", self.ty(ty), self.name(*name));
                if let Some(init) = init {
                    let _ = write!(text, " = {}", self.expr(init));
                }
                text.push(';');
                self.line(&text);
            }
            HStmtKind::InitGlobal { decl, init } => {
                let text = format!("{} = {};", self.decl_name(*decl), self.expr(init));
                self.line(&text);
            }
            HStmtKind::Block(stmts) => {
                self.line("{");
                self.indent += 1;
                for s in stmts {
                    self.stmt(s);
                }
                self.indent -= 1;
                self.line("}");
            }
            HStmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let text = format!("if ({})", self.expr(cond));
                self.line(&text);
                self.nested(then_branch);
                if let Some(else_branch) = else_branch {
                    self.line("else");
                    self.nested(else_branch);
                }
            }
            HStmtKind::While { cond, body } => {
                let text = format!("while ({})", self.expr(cond));
                self.line(&text);
                self.nested(body);
            }
            HStmtKind::DoWhile { body, cond } => {
                self.line("do");
                self.nested(body);
                let text = format!("while ({});", self.expr(cond));
                self.line(&text);
            }
            HStmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                if let Some(init) = init {
                    self.stmt(init);
                }
                let cond = cond.as_ref().map(|c| self.expr(c)).unwrap_or_default();
                let step = step.as_ref().map(|s| self.expr(s)).unwrap_or_default();
                self.line(&format!("for (; {cond}; {step})"));
                self.nested(body);
            }
            HStmtKind::Return(value) => {
                let text = match value {
                    Some(v) => format!("return {};", self.expr(v)),
                    None => "return;".to_owned(),
                };
                self.line(&text);
            }
            HStmtKind::Break => self.line("break;"),
            HStmtKind::Continue => self.line("continue;"),
            HStmtKind::Throw(value) => {
                let text = match value {
                    Some(v) => format!("throw {};", self.expr(v)),
                    None => "throw;".to_owned(),
                };
                self.line(&text);
            }
            HStmtKind::Value(expr) => {
                let text = format!("{} // value", self.expr(expr));
                self.line(&text);
            }
        }
    }

    fn nested(&mut self, stmt: &HStmt) {
        if matches!(stmt.kind, HStmtKind::Block(_)) {
            self.stmt(stmt);
        } else {
            self.indent += 1;
            self.stmt(stmt);
            self.indent -= 1;
        }
    }

    fn place(&self, place: &Place) -> String {
        match place {
            Place::Local(slot) => self.local(slot.index()),
            Place::Global(id) => self.decl_name(*id).to_owned(),
            Place::Deferred(d) => format!("@{}", self.name(d.name)),
        }
    }

    fn local(&self, index: usize) -> String {
        match self.slots.get(index) {
            Some(name) if *name != Name::EMPTY => self.name(*name).to_owned(),
            _ => format!("_{index}"),
        }
    }

    fn expr(&self, expr: &HExpr) -> String {
        match &expr.kind {
            HExprKind::Int(v) => v.to_string(),
            HExprKind::Float(v) => format!("{v:?}"),
            HExprKind::Bool(v) => v.to_string(),
            HExprKind::Char(c) => format!("{c:?}"),
            HExprKind::Str(s) => format!("{:?}", self.name(*s)),
            HExprKind::Local(slot) => self.local(slot.index()),
            HExprKind::Global(id) | HExprKind::FunctionRef(id) => self.decl_name(*id).to_owned(),
            HExprKind::Deferred(d) => format!("@{}", self.name(d.name)),
            HExprKind::Unary { op, operand } => format!("{}{}", op.as_str(), self.expr(operand)),
            HExprKind::Binary { op, lhs, rhs } => {
                format!("({} {} {})", self.expr(lhs), op.as_str(), self.expr(rhs))
            }
            HExprKind::Logical { is_and, lhs, rhs } => {
                let op = if *is_and { "&&" } else { "||" };
                format!("({} {op} {})", self.expr(lhs), self.expr(rhs))
            }
            HExprKind::Assign { place, op, value } => {
                let op = op.map_or("", |op| op.as_str());
                format!("{} {op}= {}", self.place(place), self.expr(value))
            }
            HExprKind::IncDec {
                place,
                increment,
                prefix,
            } => {
                let op = if *increment { "++" } else { "--" };
                if *prefix {
                    format!("{op}{}", self.place(place))
                } else {
                    format!("{}{op}", self.place(place))
                }
            }
            HExprKind::Call { callee, args } => {
                let callee = match callee {
                    Callee::Direct(id) => self.decl_name(*id).to_owned(),
                    Callee::Indirect(e) => format!("({})", self.expr(e)),
                    Callee::Builtin(b) => b.name().to_owned(),
                    Callee::Deferred(d) => format!("@{}", self.name(d.name)),
                };
                let args: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
                format!("{callee}({})", args.join(", "))
            }
            HExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => format!(
                "({} ? {} : {})",
                self.expr(cond),
                self.expr(then_expr),
                self.expr(else_expr)
            ),
            HExprKind::Convert(inner) => {
                format!("({}){}", self.ty(&expr.ty), self.expr(inner))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FunctionInfo, LocalId, Signature, Span, VariableInfo};
    use pretty_assertions::assert_eq;

    struct Decls(Vec<Decl>);

    impl DeclLookup for Decls {
        fn decl(&self, id: DeclId) -> Option<&Decl> {
            self.0.get(id.index())
        }
    }

    #[test]
    fn test_print_function_and_global() {
        let interner = StringInterner::new();
        let f = interner.intern("f");
        let x = interner.intern("x");
        let g = interner.intern("g");
        let local = |slot| HExpr::new(HExprKind::Local(LocalId(slot)), Type::Int, Span::DUMMY);
        let body = FnBody {
            stmts: vec![HStmt::new(
                HStmtKind::Return(Some(HExpr::new(
                    HExprKind::Binary {
                        op: crate::BinaryOp::Add,
                        lhs: Box::new(local(0)),
                        rhs: Box::new(HExpr::new(HExprKind::Int(1), Type::Int, Span::DUMMY)),
                    },
                    Type::Int,
                    Span::DUMMY,
                ))),
                Span::DUMMY,
            )],
            frame_size: 1,
        };
        let decls = Decls(vec![
            Decl {
                id: DeclId::from_raw(0),
                name: f,
                span: Span::DUMMY,
                kind: DeclKind::Function(FunctionInfo {
                    sig: Signature {
                        ret: Type::Int,
                        params: vec![Type::Int],
                    },
                    params: vec![x],
                    body: Some(body),
                }),
            },
            Decl {
                id: DeclId::from_raw(1),
                name: g,
                span: Span::DUMMY,
                kind: DeclKind::Variable(VariableInfo {
                    ty: Type::Int,
                    is_const: true,
                    init: Some(HExpr::new(
                        HExprKind::Call {
                            callee: Callee::Direct(DeclId::from_raw(0)),
                            args: vec![HExpr::new(HExprKind::Int(2), Type::Int, Span::DUMMY)],
                        },
                        Type::Int,
                        Span::DUMMY,
                    )),
                }),
            },
        ]);

        let text = print_decls(&decls.0, &decls, &interner);
        assert_eq!(
            text,
            "int f(int x) {\n  return (x + 1);\n}\nconst int g = f(2);\n"
        );
    }
}
