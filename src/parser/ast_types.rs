//! # Source AST Types
//!
//! This module defines the source-side Abstract Syntax Tree: an owned,
//! serializable representation of the OXC AST covering the ES5 surface plus
//! the supported ES6 subset. The borrowed OXC tree is converted into this
//! tree immediately after parsing so later stages (and the cache) never
//! touch the arena-allocated original.
//!
//! Every node carries a [`Span`] with byte offsets and line/column positions;
//! spans double as stable node keys for the analyzer's binding map and risk
//! set. Constructs outside the supported subset are preserved as
//! [`Expression::Unsupported`]/[`Statement::Unsupported`] nodes so the
//! transformer can report them with a location instead of silently dropping
//! them.

use oxc_ast::ast as oxc;
use oxc_span::GetSpan;
use serde::{Deserialize, Serialize};

/// Source position of a node: byte offsets plus line/column start and end.
///
/// Line numbers are 1-based, columns 0-based. The (start, end) byte range is
/// unique per node occurrence and is used as the node key in analysis maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Span {
    /// A zero-width span for synthesized nodes
    pub const SYNTHETIC: Span = Span {
        start: 0,
        end: 0,
        line: 0,
        column: 0,
        end_line: 0,
        end_column: 0,
    };
}

/// Root program node containing all statements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// Program body containing statements
    pub body: Vec<Statement>,
    /// Source type (script or module)
    pub source_type: ProgramSourceType,
    pub span: Span,
}

/// Program source type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgramSourceType {
    Script,
    Module,
}

/// Variable declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableDeclarationKind {
    Var,
    Let,
    Const,
}

/// JavaScript statements
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    /// Variable declaration: var, let, const
    VariableDeclaration {
        declarations: Vec<VariableDeclarator>,
        kind: VariableDeclarationKind,
        span: Span,
    },
    /// Function declaration
    FunctionDeclaration(Function),
    /// Class declaration
    ClassDeclaration(Class),
    /// Expression statement
    ExpressionStatement { expression: Expression, span: Span },
    /// Block statement
    BlockStatement { body: Vec<Statement>, span: Span },
    /// Return statement
    ReturnStatement {
        argument: Option<Expression>,
        span: Span,
    },
    /// If statement
    IfStatement {
        test: Expression,
        consequent: Box<Statement>,
        alternate: Option<Box<Statement>>,
        span: Span,
    },
    /// C-style for loop
    ForStatement {
        init: Option<ForInit>,
        test: Option<Expression>,
        update: Option<Expression>,
        body: Box<Statement>,
        span: Span,
    },
    /// for (k in obj)
    ForInStatement {
        left: ForHead,
        right: Expression,
        body: Box<Statement>,
        span: Span,
    },
    /// for (x of iterable)
    ForOfStatement {
        left: ForHead,
        right: Expression,
        body: Box<Statement>,
        span: Span,
    },
    /// While loop
    WhileStatement {
        test: Expression,
        body: Box<Statement>,
        span: Span,
    },
    /// do { } while (test)
    DoWhileStatement {
        body: Box<Statement>,
        test: Expression,
        span: Span,
    },
    /// Switch statement with case list
    SwitchStatement {
        discriminant: Expression,
        cases: Vec<SwitchCase>,
        span: Span,
    },
    /// try/catch/finally
    TryStatement {
        block: Vec<Statement>,
        handler: Option<CatchClause>,
        finalizer: Option<Vec<Statement>>,
        span: Span,
    },
    /// Throw statement
    ThrowStatement { argument: Expression, span: Span },
    /// Break, optionally labeled
    BreakStatement { label: Option<String>, span: Span },
    /// Continue, optionally labeled
    ContinueStatement { label: Option<String>, span: Span },
    /// Labeled statement
    LabeledStatement {
        label: String,
        body: Box<Statement>,
        span: Span,
    },
    /// Empty statement (bare semicolon)
    EmptyStatement { span: Span },
    /// with statement; scope resolution inside is ambiguous
    WithStatement {
        object: Expression,
        body: Box<Statement>,
        span: Span,
    },
    /// Import declaration (ES6 modules)
    ImportDeclaration {
        specifiers: Vec<ImportSpecifier>,
        source: String,
        span: Span,
    },
    /// Named export declaration (ES6 modules)
    ExportNamedDeclaration {
        declaration: Option<Box<Statement>>,
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
        span: Span,
    },
    /// Default export declaration (ES6 modules)
    ExportDefaultDeclaration {
        declaration: ExportDefaultKind,
        span: Span,
    },
    /// Syntactically valid construct outside the supported subset
    Unsupported { construct: String, span: Span },
}

/// Default export payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExportDefaultKind {
    Function(Function),
    Class(Class),
    Expression(Box<Expression>),
}

/// Variable declarator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDeclarator {
    pub id: Pattern,
    pub init: Option<Expression>,
    pub span: Span,
}

/// Head of a for-in/for-of loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ForHead {
    /// `for (let x of …)`: declares a binding
    Declaration {
        kind: VariableDeclarationKind,
        id: Pattern,
    },
    /// `for (x of …)`: assigns to an existing target
    Target(AssignTarget),
}

/// For loop initialization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ForInit {
    VariableDeclaration {
        declarations: Vec<VariableDeclarator>,
        kind: VariableDeclarationKind,
        span: Span,
    },
    Expression(Expression),
}

/// Single case in a switch statement; `test` is `None` for `default:`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchCase {
    pub test: Option<Expression>,
    pub consequent: Vec<Statement>,
    pub span: Span,
}

/// Catch clause of a try statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchClause {
    pub param: Option<Pattern>,
    pub body: Vec<Statement>,
    pub span: Span,
}

/// Function declaration or expression (also carries method bodies)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub id: Option<Identifier>,
    pub params: Vec<Param>,
    pub body: Vec<Statement>,
    pub is_async: bool,
    pub is_generator: bool,
    pub span: Span,
}

/// Formal parameter with optional default; `rest` marks a `...name` trailer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub pattern: Pattern,
    pub default: Option<Expression>,
    pub rest: bool,
    pub span: Span,
}

/// Arrow function expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arrow {
    pub params: Vec<Param>,
    pub body: ArrowBody,
    pub is_async: bool,
    pub span: Span,
}

/// Arrow function body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArrowBody {
    Expression(Box<Expression>),
    Block(Vec<Statement>),
}

/// Class declaration or expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    pub id: Option<Identifier>,
    pub super_class: Option<Box<Expression>>,
    pub body: Vec<ClassElement>,
    pub span: Span,
}

/// Class element (method or property)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClassElement {
    MethodDefinition {
        key: PropertyKey,
        value: Function,
        kind: MethodKind,
        is_static: bool,
        span: Span,
    },
    PropertyDefinition {
        key: PropertyKey,
        value: Option<Expression>,
        is_static: bool,
        span: Span,
    },
}

/// Method kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

/// Import specifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ImportSpecifier {
    /// `import X from "m"`
    Default { local: Identifier },
    /// `import * as ns from "m"`
    Namespace { local: Identifier },
    /// `import { a, b as c } from "m"`
    Named { imported: String, local: Identifier },
}

/// Export specifier (`export { local as exported }`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
    pub span: Span,
}

/// JavaScript expressions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    /// Identifier reference
    Identifier(Identifier),
    /// Literal values
    Literal(Literal),
    /// `this`
    This { span: Span },
    /// Binary expression (a + b, a === b, a in b, …)
    Binary {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
        span: Span,
    },
    /// Logical expression (&&, ||, ??)
    Logical {
        left: Box<Expression>,
        operator: LogicalOperator,
        right: Box<Expression>,
        span: Span,
    },
    /// Unary expression (!a, -a, typeof a, delete a.b, …)
    Unary {
        operator: UnaryOperator,
        argument: Box<Expression>,
        span: Span,
    },
    /// Assignment expression (a = b, a += b, …)
    Assignment {
        target: AssignTarget,
        operator: AssignmentOperator,
        value: Box<Expression>,
        span: Span,
    },
    /// Update expression (++a, a--)
    Update {
        operator: UpdateOperator,
        prefix: bool,
        target: AssignTarget,
        span: Span,
    },
    /// Function call
    Call {
        callee: Box<Expression>,
        arguments: Vec<CallArg>,
        span: Span,
    },
    /// Constructor call
    New {
        callee: Box<Expression>,
        arguments: Vec<CallArg>,
        span: Span,
    },
    /// Member access; `property` is an [`Expression::Identifier`] when
    /// `computed` is false
    Member {
        object: Box<Expression>,
        property: Box<Expression>,
        computed: bool,
        span: Span,
    },
    /// Conditional expression (a ? b : c)
    Conditional {
        test: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
        span: Span,
    },
    /// Comma sequence (a, b, c)
    Sequence {
        expressions: Vec<Expression>,
        span: Span,
    },
    /// Function expression
    FunctionExpression(Function),
    /// Arrow function expression
    ArrowFunction(Arrow),
    /// Class expression
    ClassExpression(Class),
    /// Object literal
    Object {
        properties: Vec<ObjectProperty>,
        span: Span,
    },
    /// Array literal; elision holes are preserved
    Array {
        elements: Vec<ArrayElement>,
        span: Span,
    },
    /// Template literal (quasis + expressions)
    TemplateLiteral {
        quasis: Vec<TemplateElement>,
        expressions: Vec<Expression>,
        span: Span,
    },
    /// Syntactically valid construct outside the supported subset
    Unsupported { construct: String, span: Span },
}

/// Assignment target: identifier or member access
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AssignTarget {
    Identifier(Identifier),
    Member {
        object: Box<Expression>,
        property: Box<Expression>,
        computed: bool,
        span: Span,
    },
    /// Destructuring assignment target outside declaration position
    Unsupported { construct: String, span: Span },
}

/// Call or construction argument
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CallArg {
    Expression(Expression),
    Spread { argument: Expression, span: Span },
}

/// Array literal element
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArrayElement {
    Expression(Expression),
    Spread { argument: Expression, span: Span },
    /// Elision hole (`[1, , 3]`)
    Hole { span: Span },
}

/// Object literal property
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectProperty {
    Property {
        key: PropertyKey,
        value: Expression,
        kind: PropertyKind,
        shorthand: bool,
        computed: bool,
        span: Span,
    },
    Spread { argument: Expression, span: Span },
}

/// Property kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

/// Property key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PropertyKey {
    Identifier { name: String, span: Span },
    String { value: String, span: Span },
    Number { value: f64, span: Span },
    Computed(Box<Expression>),
}

impl PropertyKey {
    /// Static key name if the key is not computed
    pub fn static_name(&self) -> Option<&str> {
        match self {
            PropertyKey::Identifier { name, .. } => Some(name),
            PropertyKey::String { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            PropertyKey::Identifier { span, .. }
            | PropertyKey::String { span, .. }
            | PropertyKey::Number { span, .. } => *span,
            PropertyKey::Computed(expr) => expr.span(),
        }
    }
}

/// Template element (quasi)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateElement {
    /// Cooked value (escape sequences resolved)
    pub value: String,
    pub tail: bool,
    pub span: Span,
}

/// Patterns (parameters and destructuring in declaration position)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    Identifier(Identifier),
    Object {
        properties: Vec<ObjectPatternProperty>,
        rest: Option<Identifier>,
        span: Span,
    },
    Array {
        elements: Vec<Option<Pattern>>,
        rest: Option<Box<Pattern>>,
        span: Span,
    },
    /// `x = default` inside a destructuring pattern or parameter list
    Assignment {
        target: Box<Pattern>,
        default: Expression,
        span: Span,
    },
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Identifier(id) => id.span,
            Pattern::Object { span, .. }
            | Pattern::Array { span, .. }
            | Pattern::Assignment { span, .. } => *span,
        }
    }

    /// Collects all identifiers bound by this pattern, in source order
    pub fn bound_names<'a>(&'a self, out: &mut Vec<&'a Identifier>) {
        match self {
            Pattern::Identifier(id) => out.push(id),
            Pattern::Object { properties, rest, .. } => {
                for prop in properties {
                    prop.value.bound_names(out);
                }
                if let Some(rest) = rest {
                    out.push(rest);
                }
            }
            Pattern::Array { elements, rest, .. } => {
                for element in elements.iter().flatten() {
                    element.bound_names(out);
                }
                if let Some(rest) = rest {
                    rest.bound_names(out);
                }
            }
            Pattern::Assignment { target, .. } => target.bound_names(out),
        }
    }

    /// Whether the pattern is anything other than a plain identifier
    pub fn is_destructuring(&self) -> bool {
        !matches!(self, Pattern::Identifier(_))
    }
}

/// Object destructuring property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectPatternProperty {
    pub key: PropertyKey,
    pub value: Pattern,
    pub shorthand: bool,
    pub span: Span,
}

/// Identifier occurrence; the span keys the analyzer's binding map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

/// Literal values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Literal {
    String { value: String, span: Span },
    Number { value: f64, span: Span },
    Boolean { value: bool, span: Span },
    Null { span: Span },
    RegExp {
        pattern: String,
        flags: String,
        span: Span,
    },
}

impl Literal {
    pub fn span(&self) -> Span {
        match self {
            Literal::String { span, .. }
            | Literal::Number { span, .. }
            | Literal::Boolean { span, .. }
            | Literal::Null { span }
            | Literal::RegExp { span, .. } => *span,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Exponentiation,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    In,
    Instanceof,
}

/// Logical operators; these select an operand, not a boolean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    And,
    Or,
    NullishCoalescing,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    Plus,
    Minus,
    LogicalNot,
    BitwiseNot,
    Typeof,
    Void,
    Delete,
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentOperator {
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    RemainderAssign,
    ExponentiationAssign,
    LeftShiftAssign,
    RightShiftAssign,
    UnsignedRightShiftAssign,
    BitwiseAndAssign,
    BitwiseOrAssign,
    BitwiseXorAssign,
    LogicalAndAssign,
    LogicalOrAssign,
    NullishAssign,
}

impl AssignmentOperator {
    /// The binary operator a compound assignment lowers through, if any
    pub fn binary_op(self) -> Option<BinaryOperator> {
        match self {
            AssignmentOperator::Assign => None,
            AssignmentOperator::AddAssign => Some(BinaryOperator::Add),
            AssignmentOperator::SubtractAssign => Some(BinaryOperator::Subtract),
            AssignmentOperator::MultiplyAssign => Some(BinaryOperator::Multiply),
            AssignmentOperator::DivideAssign => Some(BinaryOperator::Divide),
            AssignmentOperator::RemainderAssign => Some(BinaryOperator::Remainder),
            AssignmentOperator::ExponentiationAssign => Some(BinaryOperator::Exponentiation),
            AssignmentOperator::LeftShiftAssign => Some(BinaryOperator::LeftShift),
            AssignmentOperator::RightShiftAssign => Some(BinaryOperator::RightShift),
            AssignmentOperator::UnsignedRightShiftAssign => {
                Some(BinaryOperator::UnsignedRightShift)
            }
            AssignmentOperator::BitwiseAndAssign => Some(BinaryOperator::BitwiseAnd),
            AssignmentOperator::BitwiseOrAssign => Some(BinaryOperator::BitwiseOr),
            AssignmentOperator::BitwiseXorAssign => Some(BinaryOperator::BitwiseXor),
            AssignmentOperator::LogicalAndAssign
            | AssignmentOperator::LogicalOrAssign
            | AssignmentOperator::NullishAssign => None,
        }
    }

    /// The logical operator behind &&=, ||= and ??=
    pub fn logical_op(self) -> Option<LogicalOperator> {
        match self {
            AssignmentOperator::LogicalAndAssign => Some(LogicalOperator::And),
            AssignmentOperator::LogicalOrAssign => Some(LogicalOperator::Or),
            AssignmentOperator::NullishAssign => Some(LogicalOperator::NullishCoalescing),
            _ => None,
        }
    }
}

/// Update operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::VariableDeclaration { span, .. }
            | Statement::ExpressionStatement { span, .. }
            | Statement::BlockStatement { span, .. }
            | Statement::ReturnStatement { span, .. }
            | Statement::IfStatement { span, .. }
            | Statement::ForStatement { span, .. }
            | Statement::ForInStatement { span, .. }
            | Statement::ForOfStatement { span, .. }
            | Statement::WhileStatement { span, .. }
            | Statement::DoWhileStatement { span, .. }
            | Statement::SwitchStatement { span, .. }
            | Statement::TryStatement { span, .. }
            | Statement::ThrowStatement { span, .. }
            | Statement::BreakStatement { span, .. }
            | Statement::ContinueStatement { span, .. }
            | Statement::LabeledStatement { span, .. }
            | Statement::EmptyStatement { span }
            | Statement::WithStatement { span, .. }
            | Statement::ImportDeclaration { span, .. }
            | Statement::ExportNamedDeclaration { span, .. }
            | Statement::ExportDefaultDeclaration { span, .. }
            | Statement::Unsupported { span, .. } => *span,
            Statement::FunctionDeclaration(function) => function.span,
            Statement::ClassDeclaration(class) => class.span,
        }
    }
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier(id) => id.span,
            Expression::Literal(literal) => literal.span(),
            Expression::This { span }
            | Expression::Binary { span, .. }
            | Expression::Logical { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Assignment { span, .. }
            | Expression::Update { span, .. }
            | Expression::Call { span, .. }
            | Expression::New { span, .. }
            | Expression::Member { span, .. }
            | Expression::Conditional { span, .. }
            | Expression::Sequence { span, .. }
            | Expression::Object { span, .. }
            | Expression::Array { span, .. }
            | Expression::TemplateLiteral { span, .. }
            | Expression::Unsupported { span, .. } => *span,
            Expression::FunctionExpression(function) => function.span,
            Expression::ArrowFunction(arrow) => arrow.span,
            Expression::ClassExpression(class) => class.span,
        }
    }

    /// The identifier name if this expression is a bare identifier
    pub fn as_identifier_name(&self) -> Option<&str> {
        match self {
            Expression::Identifier(id) => Some(&id.name),
            _ => None,
        }
    }
}

impl AssignTarget {
    pub fn span(&self) -> Span {
        match self {
            AssignTarget::Identifier(id) => id.span,
            AssignTarget::Member { span, .. } | AssignTarget::Unsupported { span, .. } => *span,
        }
    }
}

/// Conversion context: resolves byte offsets to line/column positions
pub struct AstBuilder<'a> {
    #[allow(dead_code)]
    source: &'a str,
    line_starts: Vec<u32>,
}

impl<'a> AstBuilder<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self { source, line_starts }
    }

    /// Line (1-based) and column (0-based) of a byte offset
    pub fn position(&self, offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line_idx as u32 + 1, offset - self.line_starts[line_idx])
    }

    pub fn span(&self, span: oxc_span::Span) -> Span {
        let (line, column) = self.position(span.start);
        let (end_line, end_column) = self.position(span.end);
        Span {
            start: span.start,
            end: span.end,
            line,
            column,
            end_line,
            end_column,
        }
    }
}

impl Program {
    /// Convert from the OXC program to the owned source AST
    pub fn from_oxc(program: &oxc::Program<'_>, cx: &AstBuilder) -> Self {
        let body = program
            .body
            .iter()
            .map(|stmt| Statement::from_oxc(stmt, cx))
            .collect();

        let source_type = if program.source_type.is_module() {
            ProgramSourceType::Module
        } else {
            ProgramSourceType::Script
        };

        Self {
            body,
            source_type,
            span: cx.span(program.span),
        }
    }
}

fn unsupported_stmt(construct: &str, span: oxc_span::Span, cx: &AstBuilder) -> Statement {
    Statement::Unsupported {
        construct: construct.to_string(),
        span: cx.span(span),
    }
}

fn unsupported_expr(construct: &str, span: oxc_span::Span, cx: &AstBuilder) -> Expression {
    Expression::Unsupported {
        construct: construct.to_string(),
        span: cx.span(span),
    }
}

fn convert_block(block: &oxc::BlockStatement<'_>, cx: &AstBuilder) -> Vec<Statement> {
    block.body.iter().map(|s| Statement::from_oxc(s, cx)).collect()
}

fn convert_body(body: &oxc::FunctionBody<'_>, cx: &AstBuilder) -> Vec<Statement> {
    body.statements
        .iter()
        .map(|s| Statement::from_oxc(s, cx))
        .collect()
}

fn convert_var_declaration(
    decl: &oxc::VariableDeclaration<'_>,
    cx: &AstBuilder,
) -> (Vec<VariableDeclarator>, VariableDeclarationKind) {
    let kind = match decl.kind {
        oxc::VariableDeclarationKind::Var => VariableDeclarationKind::Var,
        oxc::VariableDeclarationKind::Const => VariableDeclarationKind::Const,
        _ => VariableDeclarationKind::Let,
    };
    let declarations = decl
        .declarations
        .iter()
        .map(|d| VariableDeclarator {
            id: Pattern::from_oxc(&d.id, cx),
            init: d.init.as_ref().map(|e| Expression::from_oxc(e, cx)),
            span: cx.span(d.span),
        })
        .collect();
    (declarations, kind)
}

impl Statement {
    /// Convert from an OXC statement to the owned source AST
    pub fn from_oxc(stmt: &oxc::Statement<'_>, cx: &AstBuilder) -> Self {
        match stmt {
            oxc::Statement::VariableDeclaration(decl) => {
                let (declarations, kind) = convert_var_declaration(decl, cx);
                Statement::VariableDeclaration {
                    declarations,
                    kind,
                    span: cx.span(decl.span),
                }
            }
            oxc::Statement::FunctionDeclaration(func) => {
                Statement::FunctionDeclaration(Function::from_oxc(func, cx))
            }
            oxc::Statement::ClassDeclaration(class) => {
                Statement::ClassDeclaration(Class::from_oxc(class, cx))
            }
            oxc::Statement::ExpressionStatement(stmt) => Statement::ExpressionStatement {
                expression: Expression::from_oxc(&stmt.expression, cx),
                span: cx.span(stmt.span),
            },
            oxc::Statement::BlockStatement(block) => Statement::BlockStatement {
                body: convert_block(block, cx),
                span: cx.span(block.span),
            },
            oxc::Statement::ReturnStatement(stmt) => Statement::ReturnStatement {
                argument: stmt.argument.as_ref().map(|e| Expression::from_oxc(e, cx)),
                span: cx.span(stmt.span),
            },
            oxc::Statement::IfStatement(stmt) => Statement::IfStatement {
                test: Expression::from_oxc(&stmt.test, cx),
                consequent: Box::new(Statement::from_oxc(&stmt.consequent, cx)),
                alternate: stmt
                    .alternate
                    .as_ref()
                    .map(|s| Box::new(Statement::from_oxc(s, cx))),
                span: cx.span(stmt.span),
            },
            oxc::Statement::ForStatement(stmt) => {
                let init = stmt.init.as_ref().map(|init| match init {
                    oxc::ForStatementInit::VariableDeclaration(decl) => {
                        let (declarations, kind) = convert_var_declaration(decl, cx);
                        ForInit::VariableDeclaration {
                            declarations,
                            kind,
                            span: cx.span(decl.span),
                        }
                    }
                    _ => match init.as_expression() {
                        Some(expr) => ForInit::Expression(Expression::from_oxc(expr, cx)),
                        None => ForInit::Expression(unsupported_expr("for-init", stmt.span, cx)),
                    },
                });
                Statement::ForStatement {
                    init,
                    test: stmt.test.as_ref().map(|e| Expression::from_oxc(e, cx)),
                    update: stmt.update.as_ref().map(|e| Expression::from_oxc(e, cx)),
                    body: Box::new(Statement::from_oxc(&stmt.body, cx)),
                    span: cx.span(stmt.span),
                }
            }
            oxc::Statement::ForInStatement(stmt) => Statement::ForInStatement {
                left: ForHead::from_oxc(&stmt.left, cx),
                right: Expression::from_oxc(&stmt.right, cx),
                body: Box::new(Statement::from_oxc(&stmt.body, cx)),
                span: cx.span(stmt.span),
            },
            oxc::Statement::ForOfStatement(stmt) => Statement::ForOfStatement {
                left: ForHead::from_oxc(&stmt.left, cx),
                right: Expression::from_oxc(&stmt.right, cx),
                body: Box::new(Statement::from_oxc(&stmt.body, cx)),
                span: cx.span(stmt.span),
            },
            oxc::Statement::WhileStatement(stmt) => Statement::WhileStatement {
                test: Expression::from_oxc(&stmt.test, cx),
                body: Box::new(Statement::from_oxc(&stmt.body, cx)),
                span: cx.span(stmt.span),
            },
            oxc::Statement::DoWhileStatement(stmt) => Statement::DoWhileStatement {
                body: Box::new(Statement::from_oxc(&stmt.body, cx)),
                test: Expression::from_oxc(&stmt.test, cx),
                span: cx.span(stmt.span),
            },
            oxc::Statement::SwitchStatement(stmt) => Statement::SwitchStatement {
                discriminant: Expression::from_oxc(&stmt.discriminant, cx),
                cases: stmt
                    .cases
                    .iter()
                    .map(|case| SwitchCase {
                        test: case.test.as_ref().map(|e| Expression::from_oxc(e, cx)),
                        consequent: case
                            .consequent
                            .iter()
                            .map(|s| Statement::from_oxc(s, cx))
                            .collect(),
                        span: cx.span(case.span),
                    })
                    .collect(),
                span: cx.span(stmt.span),
            },
            oxc::Statement::TryStatement(stmt) => Statement::TryStatement {
                block: convert_block(&stmt.block, cx),
                handler: stmt.handler.as_ref().map(|handler| CatchClause {
                    param: handler
                        .param
                        .as_ref()
                        .map(|p| Pattern::from_oxc(&p.pattern, cx)),
                    body: convert_block(&handler.body, cx),
                    span: cx.span(handler.span),
                }),
                finalizer: stmt.finalizer.as_ref().map(|f| convert_block(f, cx)),
                span: cx.span(stmt.span),
            },
            oxc::Statement::ThrowStatement(stmt) => Statement::ThrowStatement {
                argument: Expression::from_oxc(&stmt.argument, cx),
                span: cx.span(stmt.span),
            },
            oxc::Statement::BreakStatement(stmt) => Statement::BreakStatement {
                label: stmt.label.as_ref().map(|l| l.name.to_string()),
                span: cx.span(stmt.span),
            },
            oxc::Statement::ContinueStatement(stmt) => Statement::ContinueStatement {
                label: stmt.label.as_ref().map(|l| l.name.to_string()),
                span: cx.span(stmt.span),
            },
            oxc::Statement::LabeledStatement(stmt) => Statement::LabeledStatement {
                label: stmt.label.name.to_string(),
                body: Box::new(Statement::from_oxc(&stmt.body, cx)),
                span: cx.span(stmt.span),
            },
            oxc::Statement::EmptyStatement(stmt) => Statement::EmptyStatement {
                span: cx.span(stmt.span),
            },
            oxc::Statement::DebuggerStatement(stmt) => Statement::EmptyStatement {
                span: cx.span(stmt.span),
            },
            oxc::Statement::WithStatement(stmt) => Statement::WithStatement {
                object: Expression::from_oxc(&stmt.object, cx),
                body: Box::new(Statement::from_oxc(&stmt.body, cx)),
                span: cx.span(stmt.span),
            },
            oxc::Statement::ImportDeclaration(decl) => {
                let specifiers = decl
                    .specifiers
                    .as_ref()
                    .map(|list| {
                        list.iter()
                            .map(|spec| match spec {
                                oxc::ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                                    ImportSpecifier::Default {
                                        local: Identifier::from_binding(&s.local, cx),
                                    }
                                }
                                oxc::ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                                    ImportSpecifier::Namespace {
                                        local: Identifier::from_binding(&s.local, cx),
                                    }
                                }
                                oxc::ImportDeclarationSpecifier::ImportSpecifier(s) => {
                                    ImportSpecifier::Named {
                                        imported: s.imported.name().to_string(),
                                        local: Identifier::from_binding(&s.local, cx),
                                    }
                                }
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                Statement::ImportDeclaration {
                    specifiers,
                    source: decl.source.value.to_string(),
                    span: cx.span(decl.span),
                }
            }
            oxc::Statement::ExportNamedDeclaration(decl) => Statement::ExportNamedDeclaration {
                declaration: decl.declaration.as_ref().map(|d| {
                    Box::new(match d {
                        oxc::Declaration::VariableDeclaration(var_decl) => {
                            let (declarations, kind) = convert_var_declaration(var_decl, cx);
                            Statement::VariableDeclaration {
                                declarations,
                                kind,
                                span: cx.span(var_decl.span),
                            }
                        }
                        oxc::Declaration::FunctionDeclaration(func) => {
                            Statement::FunctionDeclaration(Function::from_oxc(func, cx))
                        }
                        oxc::Declaration::ClassDeclaration(class) => {
                            Statement::ClassDeclaration(Class::from_oxc(class, cx))
                        }
                        _ => unsupported_stmt("export-declaration", decl.span, cx),
                    })
                }),
                specifiers: decl
                    .specifiers
                    .iter()
                    .map(|spec| ExportSpecifier {
                        local: spec.local.name().to_string(),
                        exported: spec.exported.name().to_string(),
                        span: cx.span(spec.span),
                    })
                    .collect(),
                source: decl.source.as_ref().map(|s| s.value.to_string()),
                span: cx.span(decl.span),
            },
            oxc::Statement::ExportDefaultDeclaration(decl) => {
                let declaration = match &decl.declaration {
                    oxc::ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                        ExportDefaultKind::Function(Function::from_oxc(func, cx))
                    }
                    oxc::ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                        ExportDefaultKind::Class(Class::from_oxc(class, cx))
                    }
                    other => match other.as_expression() {
                        Some(expr) => {
                            ExportDefaultKind::Expression(Box::new(Expression::from_oxc(expr, cx)))
                        }
                        None => ExportDefaultKind::Expression(Box::new(unsupported_expr(
                            "export-default",
                            decl.span,
                            cx,
                        ))),
                    },
                };
                Statement::ExportDefaultDeclaration {
                    declaration,
                    span: cx.span(decl.span),
                }
            }
            oxc::Statement::ExportAllDeclaration(decl) => {
                unsupported_stmt("export-all", decl.span, cx)
            }
            other => unsupported_stmt("statement", other.span(), cx),
        }
    }
}

impl ForHead {
    fn from_oxc(left: &oxc::ForStatementLeft<'_>, cx: &AstBuilder) -> Self {
        match left {
            oxc::ForStatementLeft::VariableDeclaration(decl) => {
                let kind = match decl.kind {
                    oxc::VariableDeclarationKind::Var => VariableDeclarationKind::Var,
                    oxc::VariableDeclarationKind::Const => VariableDeclarationKind::Const,
                    _ => VariableDeclarationKind::Let,
                };
                let id = decl
                    .declarations
                    .first()
                    .map(|d| Pattern::from_oxc(&d.id, cx))
                    .unwrap_or(Pattern::Identifier(Identifier {
                        name: "_".to_string(),
                        span: cx.span(decl.span),
                    }));
                ForHead::Declaration { kind, id }
            }
            other => ForHead::Target(AssignTarget::from_oxc_for_head(other, cx)),
        }
    }
}

impl Function {
    /// Convert from an OXC function (declaration, expression, or method body)
    pub fn from_oxc(func: &oxc::Function<'_>, cx: &AstBuilder) -> Self {
        let id = func.id.as_ref().map(|id| Identifier::from_binding(id, cx));
        let params = convert_params(&func.params, cx);
        let body = func
            .body
            .as_ref()
            .map(|b| convert_body(b, cx))
            .unwrap_or_default();
        Self {
            id,
            params,
            body,
            is_async: func.r#async,
            is_generator: func.generator,
            span: cx.span(func.span),
        }
    }
}

fn convert_params(params: &oxc::FormalParameters<'_>, cx: &AstBuilder) -> Vec<Param> {
    let mut out: Vec<Param> = params
        .items
        .iter()
        .map(|param| {
            let pattern = Pattern::from_oxc(&param.pattern, cx);
            // Default values surface as assignment patterns; split them out
            match pattern {
                Pattern::Assignment { target, default, span } => Param {
                    pattern: *target,
                    default: Some(default),
                    rest: false,
                    span,
                },
                other => Param {
                    span: other.span(),
                    pattern: other,
                    default: None,
                    rest: false,
                },
            }
        })
        .collect();
    if let Some(rest) = &params.rest {
        let pattern = Pattern::from_oxc(&rest.argument, cx);
        out.push(Param {
            span: cx.span(rest.span),
            pattern,
            default: None,
            rest: true,
        });
    }
    out
}

impl Class {
    pub fn from_oxc(class: &oxc::Class<'_>, cx: &AstBuilder) -> Self {
        let id = class.id.as_ref().map(|id| Identifier::from_binding(id, cx));
        let super_class = class
            .super_class
            .as_ref()
            .map(|e| Box::new(Expression::from_oxc(e, cx)));
        let body = class
            .body
            .body
            .iter()
            .filter_map(|element| ClassElement::from_oxc(element, cx))
            .collect();
        Self {
            id,
            super_class,
            body,
            span: cx.span(class.span),
        }
    }
}

impl ClassElement {
    fn from_oxc(element: &oxc::ClassElement<'_>, cx: &AstBuilder) -> Option<Self> {
        match element {
            oxc::ClassElement::MethodDefinition(method) => {
                let key = PropertyKey::from_oxc(&method.key, cx)?;
                let kind = match method.kind {
                    oxc::MethodDefinitionKind::Constructor => MethodKind::Constructor,
                    oxc::MethodDefinitionKind::Method => MethodKind::Method,
                    oxc::MethodDefinitionKind::Get => MethodKind::Get,
                    oxc::MethodDefinitionKind::Set => MethodKind::Set,
                };
                Some(ClassElement::MethodDefinition {
                    key,
                    value: Function::from_oxc(&method.value, cx),
                    kind,
                    is_static: method.r#static,
                    span: cx.span(method.span),
                })
            }
            oxc::ClassElement::PropertyDefinition(prop) => {
                let key = PropertyKey::from_oxc(&prop.key, cx)?;
                Some(ClassElement::PropertyDefinition {
                    key,
                    value: prop.value.as_ref().map(|e| Expression::from_oxc(e, cx)),
                    is_static: prop.r#static,
                    span: cx.span(prop.span),
                })
            }
            _ => None,
        }
    }
}

impl Expression {
    /// Convert from an OXC expression to the owned source AST
    pub fn from_oxc(expr: &oxc::Expression<'_>, cx: &AstBuilder) -> Self {
        match expr {
            oxc::Expression::Identifier(id) => Expression::Identifier(Identifier {
                name: id.name.to_string(),
                span: cx.span(id.span),
            }),
            oxc::Expression::NumericLiteral(lit) => Expression::Literal(Literal::Number {
                value: lit.value,
                span: cx.span(lit.span),
            }),
            oxc::Expression::StringLiteral(lit) => Expression::Literal(Literal::String {
                value: lit.value.to_string(),
                span: cx.span(lit.span),
            }),
            oxc::Expression::BooleanLiteral(lit) => Expression::Literal(Literal::Boolean {
                value: lit.value,
                span: cx.span(lit.span),
            }),
            oxc::Expression::NullLiteral(lit) => Expression::Literal(Literal::Null {
                span: cx.span(lit.span),
            }),
            oxc::Expression::RegExpLiteral(regex) => Expression::Literal(Literal::RegExp {
                pattern: regex.regex.pattern.to_string(),
                flags: regex.regex.flags.to_string(),
                span: cx.span(regex.span),
            }),
            oxc::Expression::ThisExpression(this) => Expression::This {
                span: cx.span(this.span),
            },
            oxc::Expression::TemplateLiteral(template) => Expression::TemplateLiteral {
                quasis: template
                    .quasis
                    .iter()
                    .map(|quasi| TemplateElement {
                        value: quasi
                            .value
                            .cooked
                            .as_ref()
                            .map(|c| c.to_string())
                            .unwrap_or_else(|| quasi.value.raw.to_string()),
                        tail: quasi.tail,
                        span: cx.span(quasi.span),
                    })
                    .collect(),
                expressions: template
                    .expressions
                    .iter()
                    .map(|e| Expression::from_oxc(e, cx))
                    .collect(),
                span: cx.span(template.span),
            },
            oxc::Expression::BinaryExpression(binary) => Expression::Binary {
                left: Box::new(Expression::from_oxc(&binary.left, cx)),
                operator: convert_binary_operator(binary.operator),
                right: Box::new(Expression::from_oxc(&binary.right, cx)),
                span: cx.span(binary.span),
            },
            oxc::Expression::LogicalExpression(logical) => Expression::Logical {
                left: Box::new(Expression::from_oxc(&logical.left, cx)),
                operator: match logical.operator {
                    oxc::LogicalOperator::And => LogicalOperator::And,
                    oxc::LogicalOperator::Or => LogicalOperator::Or,
                    oxc::LogicalOperator::Coalesce => LogicalOperator::NullishCoalescing,
                },
                right: Box::new(Expression::from_oxc(&logical.right, cx)),
                span: cx.span(logical.span),
            },
            oxc::Expression::UnaryExpression(unary) => Expression::Unary {
                operator: match unary.operator {
                    oxc::UnaryOperator::UnaryPlus => UnaryOperator::Plus,
                    oxc::UnaryOperator::UnaryNegation => UnaryOperator::Minus,
                    oxc::UnaryOperator::LogicalNot => UnaryOperator::LogicalNot,
                    oxc::UnaryOperator::BitwiseNot => UnaryOperator::BitwiseNot,
                    oxc::UnaryOperator::Typeof => UnaryOperator::Typeof,
                    oxc::UnaryOperator::Void => UnaryOperator::Void,
                    oxc::UnaryOperator::Delete => UnaryOperator::Delete,
                },
                argument: Box::new(Expression::from_oxc(&unary.argument, cx)),
                span: cx.span(unary.span),
            },
            oxc::Expression::AssignmentExpression(assign) => Expression::Assignment {
                target: AssignTarget::from_oxc(&assign.left, cx),
                operator: convert_assignment_operator(assign.operator),
                value: Box::new(Expression::from_oxc(&assign.right, cx)),
                span: cx.span(assign.span),
            },
            oxc::Expression::UpdateExpression(update) => Expression::Update {
                operator: match update.operator {
                    oxc::UpdateOperator::Increment => UpdateOperator::Increment,
                    oxc::UpdateOperator::Decrement => UpdateOperator::Decrement,
                },
                prefix: update.prefix,
                target: AssignTarget::from_oxc_simple(&update.argument, cx),
                span: cx.span(update.span),
            },
            oxc::Expression::CallExpression(call) => Expression::Call {
                callee: Box::new(Expression::from_oxc(&call.callee, cx)),
                arguments: call
                    .arguments
                    .iter()
                    .map(|arg| CallArg::from_oxc(arg, cx))
                    .collect(),
                span: cx.span(call.span),
            },
            oxc::Expression::NewExpression(new) => Expression::New {
                callee: Box::new(Expression::from_oxc(&new.callee, cx)),
                arguments: new
                    .arguments
                    .iter()
                    .map(|arg| CallArg::from_oxc(arg, cx))
                    .collect(),
                span: cx.span(new.span),
            },
            oxc::Expression::StaticMemberExpression(member) => Expression::Member {
                object: Box::new(Expression::from_oxc(&member.object, cx)),
                property: Box::new(Expression::Identifier(Identifier {
                    name: member.property.name.to_string(),
                    span: cx.span(member.property.span),
                })),
                computed: false,
                span: cx.span(member.span),
            },
            oxc::Expression::ComputedMemberExpression(member) => Expression::Member {
                object: Box::new(Expression::from_oxc(&member.object, cx)),
                property: Box::new(Expression::from_oxc(&member.expression, cx)),
                computed: true,
                span: cx.span(member.span),
            },
            oxc::Expression::ConditionalExpression(cond) => Expression::Conditional {
                test: Box::new(Expression::from_oxc(&cond.test, cx)),
                consequent: Box::new(Expression::from_oxc(&cond.consequent, cx)),
                alternate: Box::new(Expression::from_oxc(&cond.alternate, cx)),
                span: cx.span(cond.span),
            },
            oxc::Expression::SequenceExpression(seq) => Expression::Sequence {
                expressions: seq
                    .expressions
                    .iter()
                    .map(|e| Expression::from_oxc(e, cx))
                    .collect(),
                span: cx.span(seq.span),
            },
            oxc::Expression::FunctionExpression(func) => {
                Expression::FunctionExpression(Function::from_oxc(func, cx))
            }
            oxc::Expression::ArrowFunctionExpression(arrow) => {
                Expression::ArrowFunction(Arrow::from_oxc(arrow, cx))
            }
            oxc::Expression::ClassExpression(class) => {
                Expression::ClassExpression(Class::from_oxc(class, cx))
            }
            oxc::Expression::ObjectExpression(object) => Expression::Object {
                properties: object
                    .properties
                    .iter()
                    .map(|prop| ObjectProperty::from_oxc(prop, cx))
                    .collect(),
                span: cx.span(object.span),
            },
            oxc::Expression::ArrayExpression(array) => Expression::Array {
                elements: array
                    .elements
                    .iter()
                    .map(|element| match element {
                        oxc::ArrayExpressionElement::SpreadElement(spread) => ArrayElement::Spread {
                            argument: Expression::from_oxc(&spread.argument, cx),
                            span: cx.span(spread.span),
                        },
                        oxc::ArrayExpressionElement::Elision(elision) => ArrayElement::Hole {
                            span: cx.span(elision.span),
                        },
                        other => match other.as_expression() {
                            Some(expr) => ArrayElement::Expression(Expression::from_oxc(expr, cx)),
                            None => ArrayElement::Hole {
                                span: cx.span(array.span),
                            },
                        },
                    })
                    .collect(),
                span: cx.span(array.span),
            },
            oxc::Expression::ParenthesizedExpression(paren) => {
                Expression::from_oxc(&paren.expression, cx)
            }
            oxc::Expression::AwaitExpression(e) => unsupported_expr("await", e.span, cx),
            oxc::Expression::YieldExpression(e) => unsupported_expr("yield", e.span, cx),
            oxc::Expression::TaggedTemplateExpression(e) => {
                unsupported_expr("tagged-template", e.span, cx)
            }
            oxc::Expression::ChainExpression(e) => {
                unsupported_expr("optional-chaining", e.span, cx)
            }
            oxc::Expression::PrivateFieldExpression(e) => {
                unsupported_expr("private-field", e.span, cx)
            }
            oxc::Expression::Super(e) => unsupported_expr("super", e.span, cx),
            other => unsupported_expr("expression", other.span(), cx),
        }
    }
}

impl Arrow {
    fn from_oxc(arrow: &oxc::ArrowFunctionExpression<'_>, cx: &AstBuilder) -> Self {
        let params = convert_params(&arrow.params, cx);
        let body = if arrow.expression {
            // Single-expression arrow: the parser wraps the expression in an
            // expression statement inside the synthesized body
            match arrow.body.statements.first() {
                Some(oxc::Statement::ExpressionStatement(stmt)) => {
                    ArrowBody::Expression(Box::new(Expression::from_oxc(&stmt.expression, cx)))
                }
                _ => ArrowBody::Block(convert_body(&arrow.body, cx)),
            }
        } else {
            ArrowBody::Block(convert_body(&arrow.body, cx))
        };
        Self {
            params,
            body,
            is_async: arrow.r#async,
            span: cx.span(arrow.span),
        }
    }
}

impl ObjectProperty {
    fn from_oxc(prop: &oxc::ObjectPropertyKind<'_>, cx: &AstBuilder) -> Self {
        match prop {
            oxc::ObjectPropertyKind::ObjectProperty(prop) => {
                let key = PropertyKey::from_oxc(&prop.key, cx).unwrap_or(PropertyKey::String {
                    value: String::new(),
                    span: cx.span(prop.span),
                });
                ObjectProperty::Property {
                    key,
                    value: Expression::from_oxc(&prop.value, cx),
                    kind: match prop.kind {
                        oxc::PropertyKind::Init => PropertyKind::Init,
                        oxc::PropertyKind::Get => PropertyKind::Get,
                        oxc::PropertyKind::Set => PropertyKind::Set,
                    },
                    shorthand: prop.shorthand,
                    computed: prop.computed,
                    span: cx.span(prop.span),
                }
            }
            oxc::ObjectPropertyKind::SpreadProperty(spread) => ObjectProperty::Spread {
                argument: Expression::from_oxc(&spread.argument, cx),
                span: cx.span(spread.span),
            },
        }
    }
}

impl PropertyKey {
    fn from_oxc(key: &oxc::PropertyKey<'_>, cx: &AstBuilder) -> Option<Self> {
        match key {
            oxc::PropertyKey::StaticIdentifier(id) => Some(PropertyKey::Identifier {
                name: id.name.to_string(),
                span: cx.span(id.span),
            }),
            oxc::PropertyKey::PrivateIdentifier(_) => None,
            other => {
                let expr = other.as_expression()?;
                match expr {
                    oxc::Expression::StringLiteral(lit) => Some(PropertyKey::String {
                        value: lit.value.to_string(),
                        span: cx.span(lit.span),
                    }),
                    oxc::Expression::NumericLiteral(lit) => Some(PropertyKey::Number {
                        value: lit.value,
                        span: cx.span(lit.span),
                    }),
                    _ => Some(PropertyKey::Computed(Box::new(Expression::from_oxc(
                        expr, cx,
                    )))),
                }
            }
        }
    }
}

impl CallArg {
    fn from_oxc(arg: &oxc::Argument<'_>, cx: &AstBuilder) -> Self {
        match arg {
            oxc::Argument::SpreadElement(spread) => CallArg::Spread {
                argument: Expression::from_oxc(&spread.argument, cx),
                span: cx.span(spread.span),
            },
            other => match other.as_expression() {
                Some(expr) => CallArg::Expression(Expression::from_oxc(expr, cx)),
                None => CallArg::Expression(unsupported_expr("argument", arg.span(), cx)),
            },
        }
    }
}

impl AssignTarget {
    fn from_oxc(target: &oxc::AssignmentTarget<'_>, cx: &AstBuilder) -> Self {
        match target {
            oxc::AssignmentTarget::AssignmentTargetIdentifier(id) => {
                AssignTarget::Identifier(Identifier {
                    name: id.name.to_string(),
                    span: cx.span(id.span),
                })
            }
            oxc::AssignmentTarget::StaticMemberExpression(member) => AssignTarget::Member {
                object: Box::new(Expression::from_oxc(&member.object, cx)),
                property: Box::new(Expression::Identifier(Identifier {
                    name: member.property.name.to_string(),
                    span: cx.span(member.property.span),
                })),
                computed: false,
                span: cx.span(member.span),
            },
            oxc::AssignmentTarget::ComputedMemberExpression(member) => AssignTarget::Member {
                object: Box::new(Expression::from_oxc(&member.object, cx)),
                property: Box::new(Expression::from_oxc(&member.expression, cx)),
                computed: true,
                span: cx.span(member.span),
            },
            other => AssignTarget::Unsupported {
                construct: "destructuring-assignment".to_string(),
                span: cx.span(other.span()),
            },
        }
    }

    fn from_oxc_simple(target: &oxc::SimpleAssignmentTarget<'_>, cx: &AstBuilder) -> Self {
        match target {
            oxc::SimpleAssignmentTarget::AssignmentTargetIdentifier(id) => {
                AssignTarget::Identifier(Identifier {
                    name: id.name.to_string(),
                    span: cx.span(id.span),
                })
            }
            oxc::SimpleAssignmentTarget::StaticMemberExpression(member) => AssignTarget::Member {
                object: Box::new(Expression::from_oxc(&member.object, cx)),
                property: Box::new(Expression::Identifier(Identifier {
                    name: member.property.name.to_string(),
                    span: cx.span(member.property.span),
                })),
                computed: false,
                span: cx.span(member.span),
            },
            oxc::SimpleAssignmentTarget::ComputedMemberExpression(member) => AssignTarget::Member {
                object: Box::new(Expression::from_oxc(&member.object, cx)),
                property: Box::new(Expression::from_oxc(&member.expression, cx)),
                computed: true,
                span: cx.span(member.span),
            },
            other => AssignTarget::Unsupported {
                construct: "assignment-target".to_string(),
                span: cx.span(other.span()),
            },
        }
    }

    fn from_oxc_for_head(left: &oxc::ForStatementLeft<'_>, cx: &AstBuilder) -> Self {
        match left {
            oxc::ForStatementLeft::AssignmentTargetIdentifier(id) => {
                AssignTarget::Identifier(Identifier {
                    name: id.name.to_string(),
                    span: cx.span(id.span),
                })
            }
            oxc::ForStatementLeft::StaticMemberExpression(member) => AssignTarget::Member {
                object: Box::new(Expression::from_oxc(&member.object, cx)),
                property: Box::new(Expression::Identifier(Identifier {
                    name: member.property.name.to_string(),
                    span: cx.span(member.property.span),
                })),
                computed: false,
                span: cx.span(member.span),
            },
            oxc::ForStatementLeft::ComputedMemberExpression(member) => AssignTarget::Member {
                object: Box::new(Expression::from_oxc(&member.object, cx)),
                property: Box::new(Expression::from_oxc(&member.expression, cx)),
                computed: true,
                span: cx.span(member.span),
            },
            other => AssignTarget::Unsupported {
                construct: "for-head".to_string(),
                span: cx.span(other.span()),
            },
        }
    }
}

impl Pattern {
    /// Convert from an OXC binding pattern
    pub fn from_oxc(pattern: &oxc::BindingPattern<'_>, cx: &AstBuilder) -> Self {
        match &pattern.kind {
            oxc::BindingPatternKind::BindingIdentifier(id) => {
                Pattern::Identifier(Identifier::from_binding(id, cx))
            }
            oxc::BindingPatternKind::ObjectPattern(object) => Pattern::Object {
                properties: object
                    .properties
                    .iter()
                    .filter_map(|prop| {
                        let key = PropertyKey::from_oxc(&prop.key, cx)?;
                        Some(ObjectPatternProperty {
                            key,
                            value: Pattern::from_oxc(&prop.value, cx),
                            shorthand: prop.shorthand,
                            span: cx.span(prop.span),
                        })
                    })
                    .collect(),
                rest: object.rest.as_ref().and_then(|rest| {
                    match &rest.argument.kind {
                        oxc::BindingPatternKind::BindingIdentifier(id) => {
                            Some(Identifier::from_binding(id, cx))
                        }
                        _ => None,
                    }
                }),
                span: cx.span(object.span),
            },
            oxc::BindingPatternKind::ArrayPattern(array) => Pattern::Array {
                elements: array
                    .elements
                    .iter()
                    .map(|element| element.as_ref().map(|p| Pattern::from_oxc(p, cx)))
                    .collect(),
                rest: array
                    .rest
                    .as_ref()
                    .map(|rest| Box::new(Pattern::from_oxc(&rest.argument, cx))),
                span: cx.span(array.span),
            },
            oxc::BindingPatternKind::AssignmentPattern(assign) => Pattern::Assignment {
                target: Box::new(Pattern::from_oxc(&assign.left, cx)),
                default: Expression::from_oxc(&assign.right, cx),
                span: cx.span(assign.span),
            },
        }
    }
}

impl Identifier {
    fn from_binding(id: &oxc::BindingIdentifier<'_>, cx: &AstBuilder) -> Self {
        Self {
            name: id.name.to_string(),
            span: cx.span(id.span),
        }
    }
}

fn convert_binary_operator(op: oxc::BinaryOperator) -> BinaryOperator {
    match op {
        oxc::BinaryOperator::Addition => BinaryOperator::Add,
        oxc::BinaryOperator::Subtraction => BinaryOperator::Subtract,
        oxc::BinaryOperator::Multiplication => BinaryOperator::Multiply,
        oxc::BinaryOperator::Division => BinaryOperator::Divide,
        oxc::BinaryOperator::Remainder => BinaryOperator::Remainder,
        oxc::BinaryOperator::Exponential => BinaryOperator::Exponentiation,
        oxc::BinaryOperator::Equality => BinaryOperator::Equal,
        oxc::BinaryOperator::Inequality => BinaryOperator::NotEqual,
        oxc::BinaryOperator::StrictEquality => BinaryOperator::StrictEqual,
        oxc::BinaryOperator::StrictInequality => BinaryOperator::StrictNotEqual,
        oxc::BinaryOperator::LessThan => BinaryOperator::LessThan,
        oxc::BinaryOperator::LessEqualThan => BinaryOperator::LessThanEqual,
        oxc::BinaryOperator::GreaterThan => BinaryOperator::GreaterThan,
        oxc::BinaryOperator::GreaterEqualThan => BinaryOperator::GreaterThanEqual,
        oxc::BinaryOperator::ShiftLeft => BinaryOperator::LeftShift,
        oxc::BinaryOperator::ShiftRight => BinaryOperator::RightShift,
        oxc::BinaryOperator::ShiftRightZeroFill => BinaryOperator::UnsignedRightShift,
        oxc::BinaryOperator::BitwiseAnd => BinaryOperator::BitwiseAnd,
        oxc::BinaryOperator::BitwiseOR => BinaryOperator::BitwiseOr,
        oxc::BinaryOperator::BitwiseXOR => BinaryOperator::BitwiseXor,
        oxc::BinaryOperator::In => BinaryOperator::In,
        oxc::BinaryOperator::Instanceof => BinaryOperator::Instanceof,
    }
}

fn convert_assignment_operator(op: oxc::AssignmentOperator) -> AssignmentOperator {
    match op {
        oxc::AssignmentOperator::Assign => AssignmentOperator::Assign,
        oxc::AssignmentOperator::Addition => AssignmentOperator::AddAssign,
        oxc::AssignmentOperator::Subtraction => AssignmentOperator::SubtractAssign,
        oxc::AssignmentOperator::Multiplication => AssignmentOperator::MultiplyAssign,
        oxc::AssignmentOperator::Division => AssignmentOperator::DivideAssign,
        oxc::AssignmentOperator::Remainder => AssignmentOperator::RemainderAssign,
        oxc::AssignmentOperator::Exponential => AssignmentOperator::ExponentiationAssign,
        oxc::AssignmentOperator::ShiftLeft => AssignmentOperator::LeftShiftAssign,
        oxc::AssignmentOperator::ShiftRight => AssignmentOperator::RightShiftAssign,
        oxc::AssignmentOperator::ShiftRightZeroFill => AssignmentOperator::UnsignedRightShiftAssign,
        oxc::AssignmentOperator::BitwiseAnd => AssignmentOperator::BitwiseAndAssign,
        oxc::AssignmentOperator::BitwiseOR => AssignmentOperator::BitwiseOrAssign,
        oxc::AssignmentOperator::BitwiseXOR => AssignmentOperator::BitwiseXorAssign,
        oxc::AssignmentOperator::LogicalAnd => AssignmentOperator::LogicalAndAssign,
        oxc::AssignmentOperator::LogicalOr => AssignmentOperator::LogicalOrAssign,
        oxc::AssignmentOperator::LogicalNullish => AssignmentOperator::NullishAssign,
    }
}
