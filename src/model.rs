use std::fmt;

use indexmap::IndexMap;

/// The structure recovered from a single proto3 source file.
///
/// A `Model` is produced by [`parse()`](crate::parse()) or populated in place by a
/// [`Parser`](crate::Parser). Every container is present (possibly empty) after a successful
/// parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    pub(crate) syntax: String,
    pub(crate) package: String,
    pub(crate) options: IndexMap<String, String>,
    pub(crate) imports: Vec<String>,
    pub(crate) services: Vec<Service>,
    pub(crate) messages: Vec<Message>,
}

/// A `service` block and the RPC methods declared in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub(crate) name: String,
    pub(crate) rpcs: Vec<Rpc>,
}

/// A single `rpc Name(Request) returns (Response);` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rpc {
    pub(crate) name: String,
    pub(crate) request: String,
    pub(crate) response: String,
}

/// A `message` block.
///
/// Fields are keyed by name, in declaration order. Nested messages are stored alongside the
/// ordinary fields under the nested message's own name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub(crate) name: String,
    pub(crate) fields: IndexMap<String, FieldValue>,
}

/// The value stored for each key of [`Message::fields()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// An ordinary field declaration such as `repeated string names = 2;`.
    Scalar(FieldDescriptor),
    /// A message declared inside the body of another message.
    Message(Message),
}

/// The type and optional qualifier of a non-nested field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub(crate) ty: String,
    pub(crate) qualifier: Option<Qualifier>,
}

/// A field label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Qualifier {
    /// `optional`
    Optional,
    /// `required`
    Required,
    /// `repeated`
    Repeated,
}

impl Model {
    /// The declared syntax. Always `proto3` for a successfully parsed file.
    pub fn syntax(&self) -> &str {
        &self.syntax
    }

    /// The name given in the `package` declaration.
    pub fn package_name(&self) -> &str {
        &self.package
    }

    /// File-level options, with the quotes stripped from their values.
    pub fn options(&self) -> &IndexMap<String, String> {
        &self.options
    }

    /// Imported paths, in declaration order. Duplicates are preserved.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Services, in declaration order.
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Top-level messages, in declaration order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Finds the first service with the given name.
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|service| service.name == name)
    }

    /// Finds the first top-level message with the given name.
    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.name == name)
    }
}

impl Service {
    /// Creates a service with the given name and RPCs.
    pub fn new(name: impl Into<String>, rpcs: Vec<Rpc>) -> Self {
        Service {
            name: name.into(),
            rpcs,
        }
    }

    /// The service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The RPC methods of this service, in declaration order.
    pub fn rpcs(&self) -> &[Rpc] {
        &self.rpcs
    }

    /// Finds the first RPC with the given name.
    pub fn rpc(&self, name: &str) -> Option<&Rpc> {
        self.rpcs.iter().find(|rpc| rpc.name == name)
    }
}

impl Rpc {
    /// Creates an RPC declaration.
    pub fn new(
        name: impl Into<String>,
        request: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Rpc {
            name: name.into(),
            request: request.into(),
            response: response.into(),
        }
    }

    /// The method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The request type name.
    pub fn request(&self) -> &str {
        &self.request
    }

    /// The response type name.
    pub fn response(&self) -> &str {
        &self.response
    }
}

impl Message {
    /// Creates a message with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Message {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Adds a field or nested message, replacing any previous entry with the same name.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// The message name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields and nested messages, keyed by name.
    pub fn fields(&self) -> &IndexMap<String, FieldValue> {
        &self.fields
    }

    /// Looks up a field or nested message by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Iterates over the messages declared directly inside this one.
    pub fn nested_messages(&self) -> impl Iterator<Item = &Message> {
        self.fields.values().filter_map(FieldValue::as_message)
    }
}

impl FieldValue {
    /// Returns the descriptor if this is an ordinary field.
    pub fn as_scalar(&self) -> Option<&FieldDescriptor> {
        match self {
            FieldValue::Scalar(descriptor) => Some(descriptor),
            FieldValue::Message(_) => None,
        }
    }

    /// Returns the nested message if this entry is one.
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            FieldValue::Scalar(_) => None,
            FieldValue::Message(message) => Some(message),
        }
    }
}

impl From<FieldDescriptor> for FieldValue {
    fn from(descriptor: FieldDescriptor) -> Self {
        FieldValue::Scalar(descriptor)
    }
}

impl From<Message> for FieldValue {
    fn from(message: Message) -> Self {
        FieldValue::Message(message)
    }
}

impl FieldDescriptor {
    /// Creates a field descriptor.
    pub fn new(ty: impl Into<String>, qualifier: Option<Qualifier>) -> Self {
        FieldDescriptor {
            ty: ty.into(),
            qualifier,
        }
    }

    /// The declared type, e.g. `string` or `map<string, Foo>`.
    pub fn ty(&self) -> &str {
        &self.ty
    }

    /// The qualifier preceding the type, if any.
    pub fn qualifier(&self) -> Option<Qualifier> {
        self.qualifier
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qualifier {
            Some(qualifier) => write!(f, "{} {}", qualifier, self.ty),
            None => write!(f, "{}", self.ty),
        }
    }
}

impl Qualifier {
    /// Recognizes `optional`, `required` and `repeated`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "optional" => Some(Qualifier::Optional),
            "required" => Some(Qualifier::Required),
            "repeated" => Some(Qualifier::Repeated),
            _ => None,
        }
    }

    /// The keyword for this qualifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Qualifier::Optional => "optional",
            Qualifier::Required => "required",
            Qualifier::Repeated => "repeated",
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[test]
fn nested_messages_are_found_among_fields() {
    let message = Message::new("Outer")
        .with_field("id", FieldDescriptor::new("string", None))
        .with_field("Inner", Message::new("Inner"))
        .with_field(
            "tags",
            FieldDescriptor::new("string", Some(Qualifier::Repeated)),
        );

    let nested: Vec<&str> = message.nested_messages().map(Message::name).collect();
    assert_eq!(nested, vec!["Inner"]);
    assert_eq!(
        message.field("tags").and_then(FieldValue::as_scalar),
        Some(&FieldDescriptor::new("string", Some(Qualifier::Repeated)))
    );
    assert_eq!(message.field("missing"), None);
}

#[test]
fn field_descriptor_display() {
    assert_eq!(FieldDescriptor::new("string", None).to_string(), "string");
    assert_eq!(
        FieldDescriptor::new("Foo", Some(Qualifier::Repeated)).to_string(),
        "repeated Foo"
    );
    assert_eq!(Qualifier::from_keyword("required"), Some(Qualifier::Required));
    assert_eq!(Qualifier::from_keyword("stream"), None);
}
