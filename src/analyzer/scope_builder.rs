//! # Scope Builder
//!
//! Constructs the arena scope tree and the binding records for one source
//! AST. Scopes open at the module root, function and arrow bodies, blocks,
//! block-scoped `for` headers, catch clauses, class bodies and `with`
//! statements. Hoisting runs once per function or module entry: `var`
//! declarations surface in the nearest function scope, `function`
//! declarations hoist with both name and value.
//!
//! Identifier references resolve through the scope chain in the same pass;
//! class-body scopes hold method names only and are skipped during lexical
//! resolution. A reference that crosses a function boundary marks its
//! binding as captured.

use std::collections::HashMap;

use crate::analyzer::{
    Analysis, AnalysisResult, Binding, BindingId, BindingKind, KNOWN_GLOBALS, ModuleShape,
    RiskFlag, ScopeId, ScopeKind, ScopeTree,
};
use crate::diagnostics::{DiagnosticBus, codes};
use crate::parser::ast_types::{
    Arrow, ArrowBody, ArrayElement, AssignTarget, CallArg, CatchClause, Class, ClassElement,
    Expression, ExportDefaultKind, ForHead, ForInit, Function, Identifier, ImportSpecifier,
    ObjectProperty, Param, Pattern, Program, ProgramSourceType, PropertyKey, Span, Statement,
    SwitchCase, VariableDeclarationKind,
};

/// Builds scopes, bindings and the binding map for the program
pub fn build_scopes(
    ast: &Program,
    file: &str,
    bus: &mut DiagnosticBus,
) -> AnalysisResult<Analysis> {
    let mut scopes = ScopeTree::default();
    let root_kind = match ast.source_type {
        ProgramSourceType::Module => ScopeKind::Module,
        ProgramSourceType::Script => ScopeKind::Global,
    };
    let root = scopes.push(root_kind, None);

    let mut binder = Binder {
        file,
        bus,
        scopes,
        bindings: Vec::new(),
        binding_map: HashMap::new(),
        scope_map: HashMap::new(),
        risk_set: HashMap::new(),
        current: root,
    };
    binder.scope_map.insert(ast.span, root);

    binder.hoist_statements(&ast.body);
    for statement in &ast.body {
        binder.bind_statement(statement);
    }

    Ok(Analysis {
        scopes: binder.scopes,
        bindings: binder.bindings,
        binding_map: binder.binding_map,
        risk_set: binder.risk_set,
        this_kinds: HashMap::new(),
        scope_map: binder.scope_map,
        // Filled in by semantic analysis
        module_shape: ModuleShape::Script,
        constructor_functions: Default::default(),
    })
}

struct Binder<'a> {
    file: &'a str,
    bus: &'a mut DiagnosticBus,
    scopes: ScopeTree,
    bindings: Vec<Binding>,
    binding_map: HashMap<Span, BindingId>,
    scope_map: HashMap<Span, ScopeId>,
    risk_set: HashMap<Span, Vec<RiskFlag>>,
    current: ScopeId,
}

impl Binder<'_> {
    fn enter(&mut self, kind: ScopeKind, span: Span) -> ScopeId {
        let id = self.scopes.push(kind, Some(self.current));
        self.scope_map.insert(span, id);
        self.current = id;
        id
    }

    fn leave(&mut self) {
        if let Some(parent) = self.scopes.get(self.current).parent {
            self.current = parent;
        }
    }

    fn flag(&mut self, span: Span, flag: RiskFlag) {
        self.risk_set.entry(span).or_default().push(flag);
    }

    /// Declares a binding in `scope`. Block-scoped kinds must be unique per
    /// scope; `var`, `function` and parameters merge with an existing
    /// binding of the same name.
    fn declare_in(
        &mut self,
        scope: ScopeId,
        id: &Identifier,
        kind: BindingKind,
        hoisted: bool,
    ) -> BindingId {
        if let Some(&existing) = self.scopes.get(scope).names.get(&id.name) {
            let existing_binding = &self.bindings[existing as usize];
            let mergeable = matches!(
                kind,
                BindingKind::Var | BindingKind::Function | BindingKind::Param
            ) && matches!(
                existing_binding.kind,
                BindingKind::Var | BindingKind::Function | BindingKind::Param
            );
            if mergeable {
                self.binding_map.insert(id.span, existing);
                return existing;
            }
            // A block-scoped declaration colliding with a var hoisted out of
            // an inner scope is the shadowing case; the block-scoped binding
            // takes over the name.
            let shadowed_hoisted_var =
                existing_binding.kind == BindingKind::Var && existing_binding.hoisted;
            if shadowed_hoisted_var {
                self.bus.warn(
                    self.file,
                    id.span.line,
                    id.span.column,
                    codes::VAR_SHADOW,
                    format!("'{}' is shadowed by a var hoisted from an inner scope", id.name),
                );
            } else {
                self.bus.error(
                    self.file,
                    id.span.line,
                    id.span.column,
                    codes::DUP_LET,
                    format!("'{}' has already been declared in this scope", id.name),
                );
                self.binding_map.insert(id.span, existing);
                return existing;
            }
        }

        let binding_id = self.bindings.len() as BindingId;
        self.bindings.push(Binding {
            id: binding_id,
            name: id.name.clone(),
            kind,
            scope_id: scope,
            declaration: id.span,
            references: Vec::new(),
            captured: false,
            assignments: 0,
            hoisted,
        });
        let scope = self.scopes.get_mut(scope);
        scope.bindings.push(binding_id);
        scope.names.insert(id.name.clone(), binding_id);
        self.binding_map.insert(id.span, binding_id);
        binding_id
    }

    fn declare(&mut self, id: &Identifier, kind: BindingKind) -> BindingId {
        self.declare_in(self.current, id, kind, false)
    }

    /// Nearest function or module scope for hoisting targets
    fn hoist_target(&self) -> ScopeId {
        self.scopes
            .nearest(self.current, |s| {
                matches!(
                    s.kind,
                    ScopeKind::Function | ScopeKind::Module | ScopeKind::Global
                )
            })
            .unwrap_or(self.scopes.root())
    }

    /// Resolves a name through the scope chain. Class-body scopes hold
    /// method names only and are skipped. Returns the binding id and
    /// whether the lookup crossed a function boundary.
    fn resolve(&self, name: &str) -> Option<(BindingId, bool)> {
        let mut crossed_function = false;
        let mut current = Some(self.current);
        while let Some(id) = current {
            let scope = self.scopes.get(id);
            if scope.kind != ScopeKind::ClassBody {
                if let Some(&binding) = scope.names.get(name) {
                    return Some((binding, crossed_function));
                }
            }
            if scope.kind == ScopeKind::Function {
                crossed_function = true;
            }
            current = scope.parent;
        }
        None
    }

    /// Records a read or write reference to an identifier occurrence
    fn reference(&mut self, id: &Identifier, write: bool) {
        match self.resolve(&id.name) {
            Some((binding_id, crossed_function)) => {
                self.binding_map.insert(id.span, binding_id);
                let binding = &mut self.bindings[binding_id as usize];
                binding.references.push(id.span);
                if write {
                    binding.assignments += 1;
                }
                if crossed_function {
                    binding.captured = true;
                }
            }
            None => {
                if !KNOWN_GLOBALS.contains(&id.name.as_str()) {
                    self.bus.info(
                        self.file,
                        id.span.line,
                        id.span.column,
                        codes::UNRESOLVED,
                        format!("'{}' does not resolve to any declaration", id.name),
                    );
                }
            }
        }
    }

    // ---- hoisting -------------------------------------------------------

    /// Pre-declares `var` and `function` names of a function or module body
    /// into the current (function-level) scope. Does not descend into
    /// nested functions or classes.
    fn hoist_statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.hoist_statement(statement);
        }
    }

    fn hoist_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::VariableDeclaration { declarations, kind, .. } => {
                if *kind == VariableDeclarationKind::Var {
                    for declarator in declarations {
                        self.hoist_pattern(&declarator.id);
                    }
                }
            }
            Statement::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    let target = self.hoist_target();
                    self.declare_in(target, id, BindingKind::Function, true);
                }
            }
            Statement::BlockStatement { body, .. } => self.hoist_statements(body),
            Statement::IfStatement { consequent, alternate, .. } => {
                self.hoist_statement(consequent);
                if let Some(alternate) = alternate {
                    self.hoist_statement(alternate);
                }
            }
            Statement::WhileStatement { body, .. }
            | Statement::DoWhileStatement { body, .. }
            | Statement::LabeledStatement { body, .. }
            | Statement::WithStatement { body, .. } => self.hoist_statement(body),
            Statement::ForStatement { init, body, .. } => {
                if let Some(ForInit::VariableDeclaration { declarations, kind, .. }) = init {
                    if *kind == VariableDeclarationKind::Var {
                        for declarator in declarations {
                            self.hoist_pattern(&declarator.id);
                        }
                    }
                }
                self.hoist_statement(body);
            }
            Statement::ForInStatement { left, body, .. }
            | Statement::ForOfStatement { left, body, .. } => {
                if let ForHead::Declaration { kind, id } = left {
                    if *kind == VariableDeclarationKind::Var {
                        self.hoist_pattern(id);
                    }
                }
                self.hoist_statement(body);
            }
            Statement::SwitchStatement { cases, .. } => {
                for case in cases {
                    self.hoist_statements(&case.consequent);
                }
            }
            Statement::TryStatement { block, handler, finalizer, .. } => {
                self.hoist_statements(block);
                if let Some(handler) = handler {
                    self.hoist_statements(&handler.body);
                }
                if let Some(finalizer) = finalizer {
                    self.hoist_statements(finalizer);
                }
            }
            Statement::ExportNamedDeclaration { declaration, .. } => {
                if let Some(declaration) = declaration {
                    self.hoist_statement(declaration);
                }
            }
            _ => {}
        }
    }

    fn hoist_pattern(&mut self, pattern: &Pattern) {
        let mut names = Vec::new();
        pattern.bound_names(&mut names);
        let target = self.hoist_target();
        for id in names {
            self.declare_in(target, id, BindingKind::Var, true);
        }
    }

    // ---- statements -----------------------------------------------------

    fn bind_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::VariableDeclaration { declarations, kind, .. } => {
                self.bind_variable_declaration(declarations, *kind);
            }
            Statement::FunctionDeclaration(func) => self.bind_function(func),
            Statement::ClassDeclaration(class) => self.bind_class(class, true),
            Statement::ExpressionStatement { expression, .. } => self.bind_expression(expression),
            Statement::BlockStatement { body, span } => {
                self.enter(ScopeKind::Block, *span);
                for statement in body {
                    self.bind_statement(statement);
                }
                self.leave();
            }
            Statement::ReturnStatement { argument, .. } => {
                if let Some(argument) = argument {
                    self.bind_expression(argument);
                }
            }
            Statement::IfStatement { test, consequent, alternate, .. } => {
                self.bind_expression(test);
                self.bind_statement(consequent);
                if let Some(alternate) = alternate {
                    self.bind_statement(alternate);
                }
            }
            Statement::ForStatement { init, test, update, body, span } => {
                let block_scoped = matches!(
                    init,
                    Some(ForInit::VariableDeclaration {
                        kind: VariableDeclarationKind::Let | VariableDeclarationKind::Const,
                        ..
                    })
                );
                if block_scoped {
                    self.enter(ScopeKind::Block, *span);
                }
                if let Some(init) = init {
                    match init {
                        ForInit::VariableDeclaration { declarations, kind, .. } => {
                            self.bind_variable_declaration(declarations, *kind);
                        }
                        ForInit::Expression(expression) => self.bind_expression(expression),
                    }
                }
                if let Some(test) = test {
                    self.bind_expression(test);
                }
                if let Some(update) = update {
                    self.bind_expression(update);
                }
                self.bind_statement(body);
                if block_scoped {
                    self.leave();
                }
            }
            Statement::ForInStatement { left, right, body, span }
            | Statement::ForOfStatement { left, right, body, span } => {
                self.bind_expression(right);
                let block_scoped = matches!(
                    left,
                    ForHead::Declaration {
                        kind: VariableDeclarationKind::Let | VariableDeclarationKind::Const,
                        ..
                    }
                );
                if block_scoped {
                    self.enter(ScopeKind::Block, *span);
                }
                match left {
                    ForHead::Declaration { kind, id } => {
                        let binding_kind = match kind {
                            VariableDeclarationKind::Var => BindingKind::Var,
                            VariableDeclarationKind::Let => BindingKind::Let,
                            VariableDeclarationKind::Const => BindingKind::Const,
                        };
                        self.bind_pattern_declaration(id, binding_kind);
                    }
                    ForHead::Target(target) => self.bind_assign_target(target),
                }
                self.bind_statement(body);
                if block_scoped {
                    self.leave();
                }
            }
            Statement::WhileStatement { test, body, .. } => {
                self.bind_expression(test);
                self.bind_statement(body);
            }
            Statement::DoWhileStatement { body, test, .. } => {
                self.bind_statement(body);
                self.bind_expression(test);
            }
            Statement::SwitchStatement { discriminant, cases, span } => {
                self.bind_expression(discriminant);
                self.enter(ScopeKind::Block, *span);
                for SwitchCase { test, consequent, .. } in cases {
                    if let Some(test) = test {
                        self.bind_expression(test);
                    }
                    for statement in consequent {
                        self.bind_statement(statement);
                    }
                }
                self.leave();
            }
            Statement::TryStatement { block, handler, finalizer, span } => {
                self.enter(ScopeKind::Block, *span);
                for statement in block {
                    self.bind_statement(statement);
                }
                self.leave();
                if let Some(handler) = handler {
                    self.bind_catch(handler);
                }
                if let Some(finalizer) = finalizer {
                    self.enter(ScopeKind::Block, *span);
                    for statement in finalizer {
                        self.bind_statement(statement);
                    }
                    self.leave();
                }
            }
            Statement::ThrowStatement { argument, .. } => self.bind_expression(argument),
            Statement::LabeledStatement { body, .. } => self.bind_statement(body),
            Statement::WithStatement { object, body, span } => {
                self.bind_expression(object);
                self.enter(ScopeKind::With, *span);
                self.bind_statement(body);
                self.leave();
            }
            Statement::ImportDeclaration { specifiers, .. } => {
                for specifier in specifiers {
                    let local = match specifier {
                        ImportSpecifier::Default { local }
                        | ImportSpecifier::Namespace { local }
                        | ImportSpecifier::Named { local, .. } => local,
                    };
                    self.declare(&local.clone(), BindingKind::Import);
                }
            }
            Statement::ExportNamedDeclaration { declaration, specifiers, .. } => {
                if let Some(declaration) = declaration {
                    self.bind_statement(declaration);
                }
                for specifier in specifiers {
                    let id = Identifier {
                        name: specifier.local.clone(),
                        span: specifier.span,
                    };
                    self.reference(&id, false);
                }
            }
            Statement::ExportDefaultDeclaration { declaration, .. } => match declaration {
                ExportDefaultKind::Function(func) => self.bind_function(func),
                ExportDefaultKind::Class(class) => self.bind_class(class, true),
                ExportDefaultKind::Expression(expression) => self.bind_expression(expression),
            },
            Statement::BreakStatement { .. }
            | Statement::ContinueStatement { .. }
            | Statement::EmptyStatement { .. }
            | Statement::Unsupported { .. } => {}
        }
    }

    fn bind_variable_declaration(
        &mut self,
        declarations: &[crate::parser::ast_types::VariableDeclarator],
        kind: VariableDeclarationKind,
    ) {
        for declarator in declarations {
            match kind {
                VariableDeclarationKind::Var => {
                    // Already hoisted; map the declaring identifiers onto the
                    // hoisted bindings and check block-scoped shadowing.
                    let mut names = Vec::new();
                    declarator.id.bound_names(&mut names);
                    for id in names {
                        self.check_var_shadow(id);
                        if let Some((binding_id, _)) = self.resolve(&id.name) {
                            self.binding_map.insert(id.span, binding_id);
                            if declarator.init.is_some() {
                                self.bindings[binding_id as usize].assignments += 1;
                            }
                        }
                    }
                }
                VariableDeclarationKind::Let => {
                    self.bind_pattern_declaration(&declarator.id, BindingKind::Let);
                }
                VariableDeclarationKind::Const => {
                    self.bind_pattern_declaration(&declarator.id, BindingKind::Const);
                }
            }
            self.bind_pattern_defaults(&declarator.id);
            if let Some(init) = &declarator.init {
                self.bind_expression(init);
            }
        }
    }

    /// Warns when an inner `var` shadows a block-scoped binding visible at
    /// the declaration site but living outside the hoist target scope.
    fn check_var_shadow(&mut self, id: &Identifier) {
        let target = self.hoist_target();
        let mut current = Some(self.current);
        while let Some(scope_id) = current {
            if scope_id == target {
                break;
            }
            let scope = self.scopes.get(scope_id);
            if let Some(&binding_id) = scope.names.get(&id.name) {
                if matches!(
                    self.bindings[binding_id as usize].kind,
                    BindingKind::Let | BindingKind::Const | BindingKind::Class
                ) {
                    self.bus.warn(
                        self.file,
                        id.span.line,
                        id.span.column,
                        codes::VAR_SHADOW,
                        format!("var '{}' shadows a block-scoped declaration", id.name),
                    );
                    return;
                }
            }
            current = scope.parent;
        }
    }

    /// Declares every name bound by a pattern; nested destructuring is
    /// flagged as a risk.
    fn bind_pattern_declaration(&mut self, pattern: &Pattern, kind: BindingKind) {
        if is_complex_destructuring(pattern) {
            let span = pattern.span();
            self.flag(span, RiskFlag::ComplexDestructuring);
            self.bus.info(
                self.file,
                span.line,
                span.column,
                codes::DESTRUCTURE,
                "nested destructuring is flattened through temporaries".to_string(),
            );
        }
        let mut names = Vec::new();
        pattern.bound_names(&mut names);
        for id in names {
            let id = id.clone();
            self.declare(&id, kind);
        }
    }

    /// Binds references inside pattern default expressions and computed keys
    fn bind_pattern_defaults(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::Identifier(_) => {}
            Pattern::Object { properties, .. } => {
                for property in properties {
                    if let PropertyKey::Computed(expression) = &property.key {
                        self.bind_expression(expression);
                    }
                    self.bind_pattern_defaults(&property.value);
                }
            }
            Pattern::Array { elements, rest, .. } => {
                for element in elements.iter().flatten() {
                    self.bind_pattern_defaults(element);
                }
                if let Some(rest) = rest {
                    self.bind_pattern_defaults(rest);
                }
            }
            Pattern::Assignment { target, default, .. } => {
                self.bind_pattern_defaults(target);
                self.bind_expression(default);
            }
        }
    }

    fn bind_function(&mut self, func: &Function) {
        // The name itself was hoisted into the enclosing scope
        self.enter(ScopeKind::Function, func.span);
        self.bind_params(&func.params);
        self.hoist_statements(&func.body);
        for statement in &func.body {
            self.bind_statement(statement);
        }
        self.leave();
    }

    fn bind_params(&mut self, params: &[Param]) {
        for param in params {
            self.bind_pattern_declaration(&param.pattern, BindingKind::Param);
            self.bind_pattern_defaults(&param.pattern);
            if let Some(default) = &param.default {
                self.bind_expression(default);
            }
        }
    }

    fn bind_arrow(&mut self, arrow: &Arrow) {
        self.enter(ScopeKind::Function, arrow.span);
        self.bind_params(&arrow.params);
        match &arrow.body {
            ArrowBody::Expression(expression) => self.bind_expression(expression),
            ArrowBody::Block(body) => {
                self.hoist_statements(body);
                for statement in body {
                    self.bind_statement(statement);
                }
            }
        }
        self.leave();
    }

    fn bind_class(&mut self, class: &Class, declare_name: bool) {
        if declare_name {
            if let Some(id) = &class.id {
                let id = id.clone();
                self.declare(&id, BindingKind::Class);
            }
        }
        if let Some(super_class) = &class.super_class {
            self.bind_expression(super_class);
        }
        self.enter(ScopeKind::ClassBody, class.span);
        for element in &class.body {
            match element {
                ClassElement::MethodDefinition { key, value, .. } => {
                    // Method names live in the class-body scope only; they
                    // are not lexical bindings for method bodies.
                    if let Some(name) = key.static_name() {
                        let id = Identifier {
                            name: name.to_string(),
                            span: key.span(),
                        };
                        self.declare(&id, BindingKind::Function);
                    }
                    if let PropertyKey::Computed(expression) = key {
                        self.bind_expression(expression);
                    }
                    self.bind_function_like(value);
                }
                ClassElement::PropertyDefinition { key, value, .. } => {
                    if let PropertyKey::Computed(expression) = key {
                        self.bind_expression(expression);
                    }
                    if let Some(value) = value {
                        self.bind_expression(value);
                    }
                }
            }
        }
        self.leave();
    }

    /// Method bodies: function scopes that do not inherit class-body names
    fn bind_function_like(&mut self, func: &Function) {
        self.enter(ScopeKind::Function, func.span);
        self.bind_params(&func.params);
        self.hoist_statements(&func.body);
        for statement in &func.body {
            self.bind_statement(statement);
        }
        self.leave();
    }

    fn bind_catch(&mut self, handler: &CatchClause) {
        self.enter(ScopeKind::Catch, handler.span);
        if let Some(param) = &handler.param {
            self.bind_pattern_declaration(param, BindingKind::CatchParam);
        }
        // The catch scope binds only the parameter; the body opens its own
        // block scope.
        self.enter(ScopeKind::Block, handler.span);
        self.hoist_statements(&handler.body);
        for statement in &handler.body {
            self.bind_statement(statement);
        }
        self.leave();
        self.leave();
    }

    // ---- expressions ----------------------------------------------------

    fn bind_expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Identifier(id) => self.reference(id, false),
            Expression::Literal(_)
            | Expression::This { .. }
            | Expression::Unsupported { .. } => {}
            Expression::Binary { left, right, .. } => {
                self.bind_expression(left);
                self.bind_expression(right);
            }
            Expression::Logical { left, right, .. } => {
                self.bind_expression(left);
                self.bind_expression(right);
            }
            Expression::Unary { argument, .. } => self.bind_expression(argument),
            Expression::Assignment { target, value, .. } => {
                self.bind_assign_target(target);
                self.bind_expression(value);
            }
            Expression::Update { target, .. } => self.bind_assign_target(target),
            Expression::Call { callee, arguments, .. }
            | Expression::New { callee, arguments, .. } => {
                self.bind_expression(callee);
                for argument in arguments {
                    match argument {
                        CallArg::Expression(expression) => self.bind_expression(expression),
                        CallArg::Spread { argument, .. } => self.bind_expression(argument),
                    }
                }
            }
            Expression::Member { object, property, computed, .. } => {
                self.bind_expression(object);
                // Non-computed property names are never bindings
                if *computed {
                    self.bind_expression(property);
                }
            }
            Expression::Conditional { test, consequent, alternate, .. } => {
                self.bind_expression(test);
                self.bind_expression(consequent);
                self.bind_expression(alternate);
            }
            Expression::Sequence { expressions, .. } => {
                for expression in expressions {
                    self.bind_expression(expression);
                }
            }
            Expression::FunctionExpression(func) => {
                // A named function expression binds its own name inside the
                // function scope; binding it there keeps recursion resolvable.
                self.enter(ScopeKind::Function, func.span);
                if let Some(id) = &func.id {
                    let id = id.clone();
                    self.declare(&id, BindingKind::Function);
                }
                self.bind_params(&func.params);
                self.hoist_statements(&func.body);
                for statement in &func.body {
                    self.bind_statement(statement);
                }
                self.leave();
            }
            Expression::ArrowFunction(arrow) => self.bind_arrow(arrow),
            Expression::ClassExpression(class) => self.bind_class(class, false),
            Expression::Object { properties, .. } => {
                for property in properties {
                    match property {
                        ObjectProperty::Property { key, value, .. } => {
                            if let PropertyKey::Computed(expression) = key {
                                self.bind_expression(expression);
                            }
                            self.bind_expression(value);
                        }
                        ObjectProperty::Spread { argument, .. } => self.bind_expression(argument),
                    }
                }
            }
            Expression::Array { elements, .. } => {
                for element in elements {
                    match element {
                        ArrayElement::Expression(expression) => self.bind_expression(expression),
                        ArrayElement::Spread { argument, .. } => self.bind_expression(argument),
                        ArrayElement::Hole { .. } => {}
                    }
                }
            }
            Expression::TemplateLiteral { expressions, .. } => {
                for expression in expressions {
                    self.bind_expression(expression);
                }
            }
        }
    }

    fn bind_assign_target(&mut self, target: &AssignTarget) {
        match target {
            AssignTarget::Identifier(id) => self.reference(id, true),
            AssignTarget::Member { object, property, computed, .. } => {
                self.bind_expression(object);
                if *computed {
                    self.bind_expression(property);
                }
            }
            AssignTarget::Unsupported { .. } => {}
        }
    }
}

/// A pattern is complex when destructuring nests inside destructuring
fn is_complex_destructuring(pattern: &Pattern) -> bool {
    fn depth(pattern: &Pattern) -> u32 {
        match pattern {
            Pattern::Identifier(_) => 0,
            Pattern::Assignment { target, .. } => depth(target),
            Pattern::Object { properties, .. } => {
                1 + properties
                    .iter()
                    .map(|p| depth(&p.value))
                    .max()
                    .unwrap_or(0)
            }
            Pattern::Array { elements, rest, .. } => {
                let inner = elements
                    .iter()
                    .flatten()
                    .map(depth)
                    .max()
                    .unwrap_or(0);
                let rest = rest.as_ref().map(|r| depth(r)).unwrap_or(0);
                1 + inner.max(rest)
            }
        }
    }
    depth(pattern) >= 2
}
