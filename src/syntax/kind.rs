//! Syntax kinds of the Go grammar that the analysis understands.

use std::fmt;

/// Kind of a lowered syntax node.
///
/// Variants mirror the named node kinds of tree-sitter-go. Kinds the
/// analysis never inspects are lowered as [`SyntaxKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    SourceFile,
    PackageClause,
    ImportDeclaration,
    ImportSpec,
    FunctionDeclaration,
    MethodDeclaration,
    ConstDeclaration,
    ConstSpec,
    VarDeclaration,
    VarSpec,
    TypeDeclaration,
    TypeSpec,
    TypeAlias,
    ParameterList,
    ParameterDeclaration,
    VariadicParameterDeclaration,
    FieldDeclarationList,
    FieldDeclaration,
    MethodElem,
    TypeElem,

    Block,
    ExpressionStatement,
    SendStatement,
    ReceiveStatement,
    IncStatement,
    DecStatement,
    AssignmentStatement,
    ShortVarDeclaration,
    LabeledStatement,
    FallthroughStatement,
    BreakStatement,
    ContinueStatement,
    GotoStatement,
    ReturnStatement,
    GoStatement,
    DeferStatement,
    IfStatement,
    ForStatement,
    ForClause,
    RangeClause,
    ExpressionSwitchStatement,
    TypeSwitchStatement,
    SelectStatement,
    ExpressionCase,
    DefaultCase,
    TypeCase,
    CommunicationCase,
    EmptyStatement,

    ExpressionList,
    ArgumentList,
    Identifier,
    FieldIdentifier,
    TypeIdentifier,
    PackageIdentifier,
    LabelName,
    BlankIdentifier,
    Dot,
    ParenthesizedExpression,
    CallExpression,
    SelectorExpression,
    IndexExpression,
    SliceExpression,
    TypeAssertionExpression,
    TypeConversionExpression,
    TypeInstantiationExpression,
    UnaryExpression,
    BinaryExpression,
    CompositeLiteral,
    LiteralValue,
    KeyedElement,
    FuncLiteral,
    InterpretedStringLiteral,
    RawStringLiteral,
    IntLiteral,
    FloatLiteral,
    ImaginaryLiteral,
    RuneLiteral,
    True,
    False,
    Nil,
    Iota,

    QualifiedType,
    PointerType,
    SliceType,
    ArrayType,
    ImplicitLengthArrayType,
    MapType,
    ChannelType,
    FunctionType,
    StructType,
    InterfaceType,
    ParenthesizedType,
    GenericType,
    TypeArguments,
    TypeParameterList,
    NegatedType,

    Error,
    Other,
}

/// Coarse grouping of syntax kinds, as used by comment association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    File,
    Declaration,
    Specifier,
    Statement,
    Field,
    FunctionLiteral,
    Expression,
    Type,
    Other,
}

impl SyntaxKind {
    /// Map a tree-sitter-go node kind onto a syntax kind.
    pub fn from_ts(kind: &str) -> Self {
        use SyntaxKind::*;
        match kind {
            "source_file" => SourceFile,
            "package_clause" => PackageClause,
            "import_declaration" => ImportDeclaration,
            "import_spec" => ImportSpec,
            "function_declaration" => FunctionDeclaration,
            "method_declaration" => MethodDeclaration,
            "const_declaration" => ConstDeclaration,
            "const_spec" => ConstSpec,
            "var_declaration" => VarDeclaration,
            "var_spec" => VarSpec,
            "type_declaration" => TypeDeclaration,
            "type_spec" => TypeSpec,
            "type_alias" => TypeAlias,
            "parameter_list" => ParameterList,
            "parameter_declaration" => ParameterDeclaration,
            "variadic_parameter_declaration" => VariadicParameterDeclaration,
            "field_declaration_list" => FieldDeclarationList,
            "field_declaration" => FieldDeclaration,
            "method_elem" | "method_spec" => MethodElem,
            "type_elem" => TypeElem,

            "block" => Block,
            "expression_statement" => ExpressionStatement,
            "send_statement" => SendStatement,
            "receive_statement" => ReceiveStatement,
            "inc_statement" => IncStatement,
            "dec_statement" => DecStatement,
            "assignment_statement" => AssignmentStatement,
            "short_var_declaration" => ShortVarDeclaration,
            "labeled_statement" => LabeledStatement,
            "fallthrough_statement" => FallthroughStatement,
            "break_statement" => BreakStatement,
            "continue_statement" => ContinueStatement,
            "goto_statement" => GotoStatement,
            "return_statement" => ReturnStatement,
            "go_statement" => GoStatement,
            "defer_statement" => DeferStatement,
            "if_statement" => IfStatement,
            "for_statement" => ForStatement,
            "for_clause" => ForClause,
            "range_clause" => RangeClause,
            "expression_switch_statement" => ExpressionSwitchStatement,
            "type_switch_statement" => TypeSwitchStatement,
            "select_statement" => SelectStatement,
            "expression_case" => ExpressionCase,
            "default_case" => DefaultCase,
            "type_case" => TypeCase,
            "communication_case" => CommunicationCase,
            "empty_statement" => EmptyStatement,

            "expression_list" => ExpressionList,
            "argument_list" | "special_argument_list" => ArgumentList,
            "identifier" => Identifier,
            "field_identifier" => FieldIdentifier,
            "type_identifier" => TypeIdentifier,
            "package_identifier" => PackageIdentifier,
            "label_name" => LabelName,
            "blank_identifier" => BlankIdentifier,
            "dot" => Dot,
            "parenthesized_expression" => ParenthesizedExpression,
            "call_expression" => CallExpression,
            "selector_expression" => SelectorExpression,
            "index_expression" => IndexExpression,
            "slice_expression" => SliceExpression,
            "type_assertion_expression" => TypeAssertionExpression,
            "type_conversion_expression" => TypeConversionExpression,
            "type_instantiation_expression" => TypeInstantiationExpression,
            "unary_expression" => UnaryExpression,
            "binary_expression" => BinaryExpression,
            "composite_literal" => CompositeLiteral,
            "literal_value" => LiteralValue,
            "keyed_element" => KeyedElement,
            "func_literal" => FuncLiteral,
            "interpreted_string_literal" => InterpretedStringLiteral,
            "raw_string_literal" => RawStringLiteral,
            "int_literal" => IntLiteral,
            "float_literal" => FloatLiteral,
            "imaginary_literal" => ImaginaryLiteral,
            "rune_literal" => RuneLiteral,
            "true" => True,
            "false" => False,
            "nil" => Nil,
            "iota" => Iota,

            "qualified_type" => QualifiedType,
            "pointer_type" => PointerType,
            "slice_type" => SliceType,
            "array_type" => ArrayType,
            "implicit_length_array_type" => ImplicitLengthArrayType,
            "map_type" => MapType,
            "channel_type" => ChannelType,
            "function_type" => FunctionType,
            "struct_type" => StructType,
            "interface_type" => InterfaceType,
            "parenthesized_type" => ParenthesizedType,
            "generic_type" => GenericType,
            "type_arguments" => TypeArguments,
            "type_parameter_list" => TypeParameterList,
            "negated_type" => NegatedType,

            "ERROR" => Error,
            _ => Other,
        }
    }

    /// Tree-sitter kinds whose children are spliced into the parent.
    ///
    /// They only exist in the concrete grammar; Go's own syntax tree has no
    /// counterpart for them.
    pub fn is_transparent(kind: &str) -> bool {
        matches!(
            kind,
            "statement_list"
                | "literal_element"
                | "var_spec_list"
                | "import_spec_list"
                | "field_name_list"
        )
    }

    /// Kinds lowered as leaves: their source text is kept, children dropped.
    pub fn is_leaf_text(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            Identifier
                | FieldIdentifier
                | TypeIdentifier
                | PackageIdentifier
                | LabelName
                | BlankIdentifier
                | Dot
                | InterpretedStringLiteral
                | RawStringLiteral
                | IntLiteral
                | FloatLiteral
                | ImaginaryLiteral
                | RuneLiteral
                | True
                | False
                | Nil
                | Iota
        )
    }

    pub fn category(self) -> Category {
        use SyntaxKind::*;
        match self {
            SourceFile => Category::File,
            FunctionDeclaration | MethodDeclaration | ConstDeclaration | VarDeclaration
            | TypeDeclaration | ImportDeclaration => Category::Declaration,
            ImportSpec | ConstSpec | VarSpec | TypeSpec | TypeAlias => Category::Specifier,
            ParameterDeclaration | VariadicParameterDeclaration | FieldDeclaration | MethodElem => {
                Category::Field
            }
            Block | ExpressionStatement | SendStatement | ReceiveStatement | IncStatement
            | DecStatement | AssignmentStatement | ShortVarDeclaration | LabeledStatement
            | FallthroughStatement | BreakStatement | ContinueStatement | GotoStatement
            | ReturnStatement | GoStatement | DeferStatement | IfStatement | ForStatement
            | ExpressionSwitchStatement | TypeSwitchStatement | SelectStatement
            | ExpressionCase | DefaultCase | TypeCase | CommunicationCase | EmptyStatement => {
                Category::Statement
            }
            FuncLiteral => Category::FunctionLiteral,
            Identifier | FieldIdentifier | ParenthesizedExpression | CallExpression
            | SelectorExpression | IndexExpression | SliceExpression
            | TypeAssertionExpression | TypeConversionExpression
            | TypeInstantiationExpression | UnaryExpression | BinaryExpression
            | CompositeLiteral | InterpretedStringLiteral | RawStringLiteral | IntLiteral
            | FloatLiteral | ImaginaryLiteral | RuneLiteral | True | False | Nil | Iota => {
                Category::Expression
            }
            TypeIdentifier | QualifiedType | PointerType | SliceType | ArrayType
            | ImplicitLengthArrayType | MapType | ChannelType | FunctionType | StructType
            | InterfaceType | ParenthesizedType | GenericType | NegatedType => Category::Type,
            _ => Category::Other,
        }
    }

    /// Whether comments can be attached to nodes of this kind.
    pub fn is_commentable(self) -> bool {
        matches!(
            self.category(),
            Category::File
                | Category::Declaration
                | Category::Specifier
                | Category::Statement
                | Category::Field
        )
    }

    /// Whether this is a function declaration, method declaration or literal.
    pub fn is_function(self) -> bool {
        matches!(
            self,
            SyntaxKind::FunctionDeclaration | SyntaxKind::MethodDeclaration | SyntaxKind::FuncLiteral
        )
    }

    /// Whether this is a case clause of a switch or select statement.
    pub fn is_case_clause(self) -> bool {
        matches!(
            self,
            SyntaxKind::ExpressionCase
                | SyntaxKind::DefaultCase
                | SyntaxKind::TypeCase
                | SyntaxKind::CommunicationCase
        )
    }

    /// Whether this kind denotes a type expression.
    pub fn is_type(self) -> bool {
        self.category() == Category::Type
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
