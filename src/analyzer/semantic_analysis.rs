//! # Semantic Analysis
//!
//! Second half of the analyzer stage: classifies the `this` binding of every
//! function body, recognizes prototype and dynamic-access patterns that the
//! translation cannot fully preserve, and determines the module shape.
//!
//! ## Key Responsibilities
//!
//! - Classify `this` per function: instance, constructor, ordinary, or none
//! - Collect functions observed as constructors (`new F(…)` or
//!   `F.prototype.x = …`)
//! - Flag eval/with/arguments usage, prototype mutation, dynamic property
//!   writes and computed deletes in the risk set
//! - Detect script / ESM / CommonJS / mixed module shape

use crate::analyzer::{Analysis, ModuleShape, RiskFlag, ThisKind};
use crate::diagnostics::{DiagnosticBus, codes};
use crate::parser::ast_types::{
    ArrayElement, Arrow, ArrowBody, AssignTarget, CallArg, Class, ClassElement, Expression,
    ExportDefaultKind, ForInit, Function, Literal, ObjectProperty, Pattern, Program,
    ProgramSourceType, PropertyKey, Span, Statement,
};

/// Runs semantic classification over the program, filling the analysis
/// in place.
pub fn classify(ast: &Program, file: &str, analysis: &mut Analysis, bus: &mut DiagnosticBus) {
    collect_constructor_functions(ast, analysis);
    analysis.module_shape = detect_module_shape(ast, file, bus);

    let mut classifier = Classifier {
        file,
        bus,
        analysis,
        this_stack: Vec::new(),
    };
    for statement in &ast.body {
        classifier.visit_statement(statement);
    }
}

/// One-level traversal callback used by the shallow walkers
trait Visit {
    fn statement(&mut self, statement: &Statement);
    fn expression(&mut self, expression: &Expression);
}

/// First pass: names of functions that appear as `new` callees or whose
/// `prototype` is written to.
fn collect_constructor_functions(ast: &Program, analysis: &mut Analysis) {
    let mut on_expression = |expression: &Expression| match expression {
        Expression::New { callee, .. } => {
            if let Some(name) = callee.as_identifier_name() {
                analysis.constructor_functions.insert(name.to_string());
            }
        }
        Expression::Assignment {
            target: AssignTarget::Member { object, property, computed, .. },
            ..
        } => {
            // `X.prototype = …` marks X as a constructor
            if !*computed && property.as_identifier_name() == Some("prototype") {
                if let Some(name) = object.as_identifier_name() {
                    analysis.constructor_functions.insert(name.to_string());
                }
            }
            // `X.prototype.Y = …` marks X through the nested member
            if let Expression::Member { object: base, property: inner, computed: false, .. } =
                object.as_ref()
            {
                if inner.as_identifier_name() == Some("prototype") {
                    if let Some(name) = base.as_identifier_name() {
                        analysis.constructor_functions.insert(name.to_string());
                    }
                }
            }
        }
        _ => {}
    };
    for statement in &ast.body {
        walk_statement_deep(statement, &mut on_expression);
    }
}

/// Detects how the file declares imports and exports
fn detect_module_shape(ast: &Program, file: &str, bus: &mut DiagnosticBus) -> ModuleShape {
    let mut has_esm = false;
    let mut has_cjs = false;

    for statement in &ast.body {
        match statement {
            Statement::ImportDeclaration { .. }
            | Statement::ExportNamedDeclaration { .. }
            | Statement::ExportDefaultDeclaration { .. } => has_esm = true,
            _ => {}
        }
        walk_statement_deep(statement, &mut |expression| {
            if is_commonjs_shape(expression) {
                has_cjs = true;
            }
        });
    }

    match (has_esm, has_cjs) {
        (true, true) => {
            bus.warn(
                file,
                ast.span.line,
                ast.span.column,
                codes::MIXED_MODULE,
                "file mixes ES-module and CommonJS forms; ESM wins for the export record"
                    .to_string(),
            );
            ModuleShape::Mixed
        }
        (true, false) => ModuleShape::Esm,
        (false, true) => ModuleShape::CommonJs,
        (false, false) => match ast.source_type {
            ProgramSourceType::Module => ModuleShape::Esm,
            ProgramSourceType::Script => ModuleShape::Script,
        },
    }
}

/// `require("m")`, `module.exports = …` and `exports.x = …` recognized
/// by shape
fn is_commonjs_shape(expression: &Expression) -> bool {
    match expression {
        Expression::Call { callee, arguments, .. } => {
            callee.as_identifier_name() == Some("require")
                && matches!(
                    arguments.first(),
                    Some(CallArg::Expression(Expression::Literal(Literal::String { .. })))
                )
        }
        Expression::Assignment {
            target: AssignTarget::Member { object, property, computed: false, .. },
            ..
        } => match object.as_identifier_name() {
            Some("module") => property.as_identifier_name() == Some("exports"),
            Some("exports") => true,
            _ => false,
        },
        _ => false,
    }
}

struct Classifier<'a> {
    file: &'a str,
    bus: &'a mut DiagnosticBus,
    analysis: &'a mut Analysis,
    /// `this` classification of the enclosing function chain
    this_stack: Vec<ThisKind>,
}

impl Visit for Classifier<'_> {
    fn statement(&mut self, statement: &Statement) {
        self.visit_statement(statement);
    }

    fn expression(&mut self, expression: &Expression) {
        self.visit_expression(expression);
    }
}

impl Classifier<'_> {
    fn flag(&mut self, span: Span, flag: RiskFlag) {
        self.analysis.risk_set.entry(span).or_default().push(flag);
    }

    /// Constructor observation resolves through the function's own name or,
    /// for anonymous function expressions, through the name they are bound
    /// to (`var Point = function(x) {…}; new Point(1)`).
    fn function_this_kind(&self, func: &Function, bound_name: Option<&str>) -> ThisKind {
        let observed = func
            .id
            .as_ref()
            .is_some_and(|id| self.analysis.constructor_functions.contains(&id.name))
            || bound_name
                .is_some_and(|name| self.analysis.constructor_functions.contains(name));
        if observed {
            ThisKind::Constructor
        } else {
            ThisKind::Ordinary
        }
    }

    fn enter_function(&mut self, func: &Function, kind: ThisKind) {
        self.analysis.this_kinds.insert(func.span, kind);
        self.this_stack.push(kind);
        for param in &func.params {
            if let Some(default) = &param.default {
                self.visit_expression(default);
            }
        }
        for statement in &func.body {
            self.visit_statement(statement);
        }
        self.this_stack.pop();
    }

    fn enter_arrow(&mut self, arrow: &Arrow) {
        // Arrows inherit `this` from the enclosing function; at module
        // level there is none.
        let inherited = self.this_stack.last().copied().unwrap_or(ThisKind::None);
        self.analysis.this_kinds.insert(arrow.span, inherited);
        self.this_stack.push(inherited);
        for param in &arrow.params {
            if let Some(default) = &param.default {
                self.visit_expression(default);
            }
        }
        match &arrow.body {
            ArrowBody::Expression(expression) => self.visit_expression(expression),
            ArrowBody::Block(body) => {
                for statement in body {
                    self.visit_statement(statement);
                }
            }
        }
        self.this_stack.pop();
    }

    fn visit_class(&mut self, class: &Class) {
        if let Some(super_class) = &class.super_class {
            self.visit_expression(super_class);
        }
        for element in &class.body {
            match element {
                ClassElement::MethodDefinition { value, .. } => {
                    // Constructor and methods both see the instance
                    self.enter_function(value, ThisKind::Instance);
                }
                ClassElement::PropertyDefinition { value, .. } => {
                    if let Some(value) = value {
                        self.visit_expression(value);
                    }
                }
            }
        }
    }

    fn visit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::FunctionDeclaration(func) => {
                let kind = self.function_this_kind(func, None);
                self.enter_function(func, kind);
            }
            Statement::ClassDeclaration(class) => self.visit_class(class),
            Statement::VariableDeclaration { declarations, .. } => {
                for declarator in declarations {
                    match (&declarator.id, &declarator.init) {
                        // The declared name carries the constructor
                        // observation for anonymous function expressions
                        (Pattern::Identifier(id), Some(Expression::FunctionExpression(func))) => {
                            let kind = self.function_this_kind(func, Some(&id.name));
                            self.enter_function(func, kind);
                        }
                        _ => {
                            if let Some(init) = &declarator.init {
                                self.visit_expression(init);
                            }
                        }
                    }
                }
            }
            Statement::WithStatement { object, body, span } => {
                self.flag(*span, RiskFlag::With);
                self.bus.warn(
                    self.file,
                    span.line,
                    span.column,
                    codes::WITH,
                    "with statement makes scope resolution ambiguous".to_string(),
                );
                self.visit_expression(object);
                self.visit_statement(body);
            }
            Statement::ExportDefaultDeclaration { declaration, .. } => match declaration {
                ExportDefaultKind::Function(func) => {
                    let kind = self.function_this_kind(func, None);
                    self.enter_function(func, kind);
                }
                ExportDefaultKind::Class(class) => self.visit_class(class),
                ExportDefaultKind::Expression(expression) => self.visit_expression(expression),
            },
            other => walk_statement_shallow(other, self),
        }
    }

    fn visit_expression(&mut self, expression: &Expression) {
        match expression {
            Expression::This { span } => match self.this_stack.last() {
                None => {
                    self.flag(*span, RiskFlag::TopLevelThis);
                    self.bus.warn(
                        self.file,
                        span.line,
                        span.column,
                        codes::THIS,
                        "top-level this is undefined in the translated module".to_string(),
                    );
                }
                Some(ThisKind::Ordinary) | Some(ThisKind::None) => {
                    self.bus.warn(
                        self.file,
                        span.line,
                        span.column,
                        codes::THIS,
                        "this in an ordinary function has no stable binding".to_string(),
                    );
                }
                _ => {}
            },
            Expression::Identifier(id) => {
                if id.name == "arguments" {
                    self.flag(id.span, RiskFlag::Arguments);
                    self.bus.warn(
                        self.file,
                        id.span.line,
                        id.span.column,
                        codes::ARGUMENTS,
                        "arguments object is not preserved by the translation".to_string(),
                    );
                }
            }
            Expression::Call { callee, arguments, span } => {
                if callee.as_identifier_name() == Some("eval") {
                    self.flag(*span, RiskFlag::Eval);
                    self.bus.warn(
                        self.file,
                        span.line,
                        span.column,
                        codes::EVAL,
                        "eval is not translated; emitted call will fail at runtime".to_string(),
                    );
                }
                if is_prototype_api_call(callee) {
                    self.flag(*span, RiskFlag::PrototypeMutation);
                    self.bus.info(
                        self.file,
                        span.line,
                        span.column,
                        codes::PROTO,
                        "dynamic prototype construction relies on the runtime facade".to_string(),
                    );
                }
                self.visit_expression(callee);
                for argument in arguments {
                    match argument {
                        CallArg::Expression(expression) => self.visit_expression(expression),
                        CallArg::Spread { argument, .. } => self.visit_expression(argument),
                    }
                }
            }
            Expression::Assignment { target, value, span, .. } => {
                match target {
                    AssignTarget::Member { object, property, computed, .. } => {
                        if is_prototype_member(object) {
                            self.flag(*span, RiskFlag::PrototypeMutation);
                            self.bus.warn(
                                self.file,
                                span.line,
                                span.column,
                                codes::PROTO,
                                "prototype mutation is approximated by class attributes"
                                    .to_string(),
                            );
                        }
                        if *computed && !matches!(property.as_ref(), Expression::Literal(_)) {
                            self.flag(*span, RiskFlag::DynamicPropertyWrite);
                            self.bus.info(
                                self.file,
                                span.line,
                                span.column,
                                codes::DYN_WRITE,
                                "computed property write with a dynamic key".to_string(),
                            );
                        }
                        self.visit_expression(object);
                        if *computed {
                            self.visit_expression(property);
                        }
                        // A function assigned to a prototype property sees
                        // the instance
                        if is_prototype_member(object) {
                            if let Expression::FunctionExpression(func) = value.as_ref() {
                                self.enter_function(func, ThisKind::Constructor);
                                return;
                            }
                        }
                    }
                    AssignTarget::Identifier(id) => {
                        // `Point = function(x) {…}` classifies through the
                        // assigned name
                        if let Expression::FunctionExpression(func) = value.as_ref() {
                            let kind = self.function_this_kind(func, Some(&id.name));
                            self.enter_function(func, kind);
                            return;
                        }
                    }
                    AssignTarget::Unsupported { .. } => {}
                }
                self.visit_expression(value);
            }
            Expression::Unary { operator, argument, span } => {
                if *operator == crate::parser::ast_types::UnaryOperator::Delete {
                    if let Expression::Member { computed: true, .. } = argument.as_ref() {
                        self.flag(*span, RiskFlag::DeleteComputed);
                        self.bus.info(
                            self.file,
                            span.line,
                            span.column,
                            codes::DELETE,
                            "delete of a computed member".to_string(),
                        );
                    }
                }
                self.visit_expression(argument);
            }
            Expression::FunctionExpression(func) => {
                let kind = self.function_this_kind(func, None);
                self.enter_function(func, kind);
            }
            Expression::ArrowFunction(arrow) => self.enter_arrow(arrow),
            Expression::ClassExpression(class) => self.visit_class(class),
            other => {
                walk_expression_shallow(other, &mut |e| self.visit_expression(e));
            }
        }
    }
}

/// `X.prototype` member chains
fn is_prototype_member(object: &Expression) -> bool {
    matches!(
        object,
        Expression::Member { property, computed: false, .. }
            if property.as_identifier_name() == Some("prototype")
    )
}

/// `Object.create(…)` and `Object.defineProperty(…)`
fn is_prototype_api_call(callee: &Expression) -> bool {
    if let Expression::Member { object, property, computed: false, .. } = callee {
        if object.as_identifier_name() == Some("Object") {
            return matches!(
                property.as_identifier_name(),
                Some("create") | Some("defineProperty")
            );
        }
    }
    false
}

/// Applies `visit` to every expression reachable from the statement,
/// descending through nested statements, function bodies and class methods.
fn walk_statement_deep<F: FnMut(&Expression)>(statement: &Statement, visit: &mut F) {
    struct Walker<'f, F>(&'f mut F);

    impl<F: FnMut(&Expression)> Visit for Walker<'_, F> {
        fn statement(&mut self, statement: &Statement) {
            walk_statement_deep(statement, self.0);
        }

        fn expression(&mut self, expression: &Expression) {
            walk_expression_deep(expression, self.0);
        }
    }

    match statement {
        Statement::FunctionDeclaration(func) => {
            for statement in &func.body {
                walk_statement_deep(statement, visit);
            }
        }
        Statement::ClassDeclaration(class) => walk_class_deep(class, visit),
        Statement::ExportDefaultDeclaration { declaration, .. } => match declaration {
            ExportDefaultKind::Function(func) => {
                for statement in &func.body {
                    walk_statement_deep(statement, visit);
                }
            }
            ExportDefaultKind::Class(class) => walk_class_deep(class, visit),
            ExportDefaultKind::Expression(expression) => walk_expression_deep(expression, visit),
        },
        other => walk_statement_shallow(other, &mut Walker(visit)),
    }
}

fn walk_class_deep<F: FnMut(&Expression)>(class: &Class, visit: &mut F) {
    if let Some(super_class) = &class.super_class {
        walk_expression_deep(super_class, visit);
    }
    for element in &class.body {
        match element {
            ClassElement::MethodDefinition { value, .. } => {
                for statement in &value.body {
                    walk_statement_deep(statement, visit);
                }
            }
            ClassElement::PropertyDefinition { value, .. } => {
                if let Some(value) = value {
                    walk_expression_deep(value, visit);
                }
            }
        }
    }
}

fn walk_expression_deep<F: FnMut(&Expression)>(expression: &Expression, visit: &mut F) {
    visit(expression);
    match expression {
        Expression::FunctionExpression(func) => {
            for statement in &func.body {
                walk_statement_deep(statement, visit);
            }
        }
        Expression::ArrowFunction(arrow) => match &arrow.body {
            ArrowBody::Expression(expression) => walk_expression_deep(expression, visit),
            ArrowBody::Block(body) => {
                for statement in body {
                    walk_statement_deep(statement, visit);
                }
            }
        },
        Expression::ClassExpression(class) => walk_class_deep(class, visit),
        other => walk_expression_shallow(other, &mut |e| walk_expression_deep(e, visit)),
    }
}

/// Visits the direct sub-statements and sub-expressions of one statement
/// without entering function bodies.
fn walk_statement_shallow(statement: &Statement, v: &mut impl Visit) {
    match statement {
        Statement::VariableDeclaration { declarations, .. } => {
            for declarator in declarations {
                if let Some(init) = &declarator.init {
                    v.expression(init);
                }
            }
        }
        Statement::ExpressionStatement { expression, .. } => v.expression(expression),
        Statement::BlockStatement { body, .. } => {
            for statement in body {
                v.statement(statement);
            }
        }
        Statement::ReturnStatement { argument, .. } => {
            if let Some(argument) = argument {
                v.expression(argument);
            }
        }
        Statement::IfStatement { test, consequent, alternate, .. } => {
            v.expression(test);
            v.statement(consequent);
            if let Some(alternate) = alternate {
                v.statement(alternate);
            }
        }
        Statement::ForStatement { init, test, update, body, .. } => {
            match init {
                Some(ForInit::VariableDeclaration { declarations, .. }) => {
                    for declarator in declarations {
                        if let Some(init) = &declarator.init {
                            v.expression(init);
                        }
                    }
                }
                Some(ForInit::Expression(expression)) => v.expression(expression),
                None => {}
            }
            if let Some(test) = test {
                v.expression(test);
            }
            if let Some(update) = update {
                v.expression(update);
            }
            v.statement(body);
        }
        Statement::ForInStatement { right, body, .. }
        | Statement::ForOfStatement { right, body, .. } => {
            v.expression(right);
            v.statement(body);
        }
        Statement::WhileStatement { test, body, .. } => {
            v.expression(test);
            v.statement(body);
        }
        Statement::DoWhileStatement { body, test, .. } => {
            v.statement(body);
            v.expression(test);
        }
        Statement::SwitchStatement { discriminant, cases, .. } => {
            v.expression(discriminant);
            for case in cases {
                if let Some(test) = &case.test {
                    v.expression(test);
                }
                for statement in &case.consequent {
                    v.statement(statement);
                }
            }
        }
        Statement::TryStatement { block, handler, finalizer, .. } => {
            for statement in block {
                v.statement(statement);
            }
            if let Some(handler) = handler {
                for statement in &handler.body {
                    v.statement(statement);
                }
            }
            if let Some(finalizer) = finalizer {
                for statement in finalizer {
                    v.statement(statement);
                }
            }
        }
        Statement::ThrowStatement { argument, .. } => v.expression(argument),
        Statement::LabeledStatement { body, .. } => v.statement(body),
        Statement::WithStatement { object, body, .. } => {
            v.expression(object);
            v.statement(body);
        }
        Statement::ExportNamedDeclaration { declaration, .. } => {
            if let Some(declaration) = declaration {
                v.statement(declaration);
            }
        }
        Statement::ExportDefaultDeclaration { declaration, .. } => {
            if let ExportDefaultKind::Expression(expression) = declaration {
                v.expression(expression);
            }
        }
        _ => {}
    }
}

/// Visits the direct sub-expressions of one expression
fn walk_expression_shallow(expression: &Expression, visit: &mut impl FnMut(&Expression)) {
    match expression {
        Expression::Binary { left, right, .. } | Expression::Logical { left, right, .. } => {
            visit(left);
            visit(right);
        }
        Expression::Unary { argument, .. } => visit(argument),
        Expression::Assignment { target, value, .. } => {
            if let AssignTarget::Member { object, property, computed, .. } = target {
                visit(object);
                if *computed {
                    visit(property);
                }
            }
            visit(value);
        }
        Expression::Update { target, .. } => {
            if let AssignTarget::Member { object, property, computed, .. } = target {
                visit(object);
                if *computed {
                    visit(property);
                }
            }
        }
        Expression::Call { callee, arguments, .. } | Expression::New { callee, arguments, .. } => {
            visit(callee);
            for argument in arguments {
                match argument {
                    CallArg::Expression(expression) => visit(expression),
                    CallArg::Spread { argument, .. } => visit(argument),
                }
            }
        }
        Expression::Member { object, property, computed, .. } => {
            visit(object);
            if *computed {
                visit(property);
            }
        }
        Expression::Conditional { test, consequent, alternate, .. } => {
            visit(test);
            visit(consequent);
            visit(alternate);
        }
        Expression::Sequence { expressions, .. } => {
            for expression in expressions {
                visit(expression);
            }
        }
        Expression::Object { properties, .. } => {
            for property in properties {
                match property {
                    ObjectProperty::Property { key, value, .. } => {
                        if let PropertyKey::Computed(expression) = key {
                            visit(expression);
                        }
                        visit(value);
                    }
                    ObjectProperty::Spread { argument, .. } => visit(argument),
                }
            }
        }
        Expression::Array { elements, .. } => {
            for element in elements {
                match element {
                    ArrayElement::Expression(expression) => visit(expression),
                    ArrayElement::Spread { argument, .. } => visit(argument),
                    ArrayElement::Hole { .. } => {}
                }
            }
        }
        Expression::TemplateLiteral { expressions, .. } => {
            for expression in expressions {
                visit(expression);
            }
        }
        _ => {}
    }
}
