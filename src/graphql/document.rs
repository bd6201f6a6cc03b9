// Typed model of parsed GraphQL documents as clients submit them in JSON
// (the `kind`-tagged AST produced by graphql-js and compatible tooling),
// together with a printer that turns them back into query source text.
// Only executable definitions are modelled; schema definitions are never
// sent as queries.

use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Document {
    pub definitions: Vec<Definition>,
}

impl Document {
    // Renders the document as GraphQL source text
    pub fn print(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind")]
pub enum Definition {
    OperationDefinition(OperationDefinition),
    FragmentDefinition(FragmentDefinition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDefinition {
    pub operation: OperationKind,
    #[serde(default)]
    pub name: Option<Name>,
    #[serde(default)]
    pub variable_definitions: Vec<VariableDefinition>,
    #[serde(default)]
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentDefinition {
    pub name: Name,
    pub type_condition: NamedType,
    #[serde(default)]
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Name {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedType {
    pub name: Name,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Variable {
    pub name: Name,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDefinition {
    pub variable: Variable,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub default_value: Option<ValueNode>,
    #[serde(default)]
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind")]
pub enum TypeRef {
    NamedType { name: Name },
    ListType {
        #[serde(rename = "type")]
        ty: Box<TypeRef>,
    },
    NonNullType {
        #[serde(rename = "type")]
        ty: Box<TypeRef>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectionSet {
    pub selections: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind")]
pub enum Selection {
    Field(Field),
    FragmentSpread(FragmentSpread),
    InlineFragment(InlineFragment),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(default)]
    pub alias: Option<Name>,
    pub name: Name,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    #[serde(default)]
    pub directives: Vec<Directive>,
    #[serde(default)]
    pub selection_set: Option<SelectionSet>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FragmentSpread {
    pub name: Name,
    #[serde(default)]
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineFragment {
    #[serde(default)]
    pub type_condition: Option<NamedType>,
    #[serde(default)]
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Argument {
    pub name: Name,
    pub value: ValueNode,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Directive {
    pub name: Name,
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObjectField {
    pub name: Name,
    pub value: ValueNode,
}

// Int and float literals keep their source spelling
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind")]
pub enum ValueNode {
    Variable { name: Name },
    IntValue { value: String },
    FloatValue { value: String },
    StringValue {
        value: String,
        #[serde(default)]
        block: bool,
    },
    BooleanValue { value: bool },
    NullValue,
    EnumValue { value: String },
    ListValue { values: Vec<ValueNode> },
    ObjectValue { fields: Vec<ObjectField> },
}

// Joins displayable items with a separator
fn join<T: fmt::Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

// Writes " @a @b" for a non-empty directive list
fn write_directives(f: &mut fmt::Formatter<'_>, directives: &[Directive]) -> fmt::Result {
    for directive in directives {
        write!(f, " {}", directive)?;
    }
    Ok(())
}

fn write_arguments(f: &mut fmt::Formatter<'_>, arguments: &[Argument]) -> fmt::Result {
    if !arguments.is_empty() {
        write!(f, "({})", join(arguments, ", "))?;
    }
    Ok(())
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join(&self.definitions, "\n\n"))
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::OperationDefinition(op) => op.fmt(f),
            Definition::FragmentDefinition(fragment) => fragment.fmt(f),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        })
    }
}

impl fmt::Display for OperationDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Anonymous queries print in shorthand form
        let shorthand = self.operation == OperationKind::Query
            && self.name.is_none()
            && self.variable_definitions.is_empty()
            && self.directives.is_empty();
        if shorthand {
            return self.selection_set.fmt(f);
        }

        write!(f, "{}", self.operation)?;
        if let Some(name) = &self.name {
            write!(f, " {}", name.value)?;
        }
        if !self.variable_definitions.is_empty() {
            write!(f, "({})", join(&self.variable_definitions, ", "))?;
        }
        write_directives(f, &self.directives)?;
        write!(f, " {}", self.selection_set)
    }
}

impl fmt::Display for FragmentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fragment {} on {}",
            self.name.value, self.type_condition.name.value
        )?;
        write_directives(f, &self.directives)?;
        write!(f, " {}", self.selection_set)
    }
}

impl fmt::Display for VariableDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}: {}", self.variable.name.value, self.ty)?;
        if let Some(default) = &self.default_value {
            write!(f, " = {}", default)?;
        }
        write_directives(f, &self.directives)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::NamedType { name } => f.write_str(&name.value),
            TypeRef::ListType { ty } => write!(f, "[{}]", ty),
            TypeRef::NonNullType { ty } => write!(f, "{}!", ty),
        }
    }
}

impl fmt::Display for SelectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.selections.is_empty() {
            return f.write_str("{}");
        }
        let body = join(&self.selections, "\n").replace('\n', "\n  ");
        write!(f, "{{\n  {}\n}}", body)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Field(field) => field.fmt(f),
            Selection::FragmentSpread(spread) => {
                write!(f, "...{}", spread.name.value)?;
                write_directives(f, &spread.directives)
            }
            Selection::InlineFragment(fragment) => {
                f.write_str("...")?;
                if let Some(condition) = &fragment.type_condition {
                    write!(f, " on {}", condition.name.value)?;
                }
                write_directives(f, &fragment.directives)?;
                write!(f, " {}", fragment.selection_set)
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(alias) = &self.alias {
            write!(f, "{}: ", alias.value)?;
        }
        f.write_str(&self.name.value)?;
        write_arguments(f, &self.arguments)?;
        write_directives(f, &self.directives)?;
        if let Some(selection_set) = &self.selection_set {
            write!(f, " {}", selection_set)?;
        }
        Ok(())
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name.value, self.value)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name.value)?;
        write_arguments(f, &self.arguments)
    }
}

impl fmt::Display for ObjectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name.value, self.value)
    }
}

impl fmt::Display for ValueNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueNode::Variable { name } => write!(f, "${}", name.value),
            ValueNode::IntValue { value }
            | ValueNode::FloatValue { value }
            | ValueNode::EnumValue { value } => f.write_str(value),
            ValueNode::StringValue { value, block: true } => {
                write!(f, "\"\"\"{}\"\"\"", value.replace("\"\"\"", "\\\"\"\""))
            }
            // JSON string escapes are valid GraphQL string escapes
            ValueNode::StringValue { value, .. } => {
                let quoted = serde_json::to_string(value).map_err(|_| fmt::Error)?;
                f.write_str(&quoted)
            }
            ValueNode::BooleanValue { value } => write!(f, "{}", value),
            ValueNode::NullValue => f.write_str("null"),
            ValueNode::ListValue { values } => write!(f, "[{}]", join(values, ", ")),
            ValueNode::ObjectValue { fields } => write!(f, "{{{}}}", join(fields, ", ")),
        }
    }
}
