//! View-model intermediate representation.
//!
//! This module defines the frozen model shared by all backends. Field numbers
//! are never stored: they are derived from declaration order through
//! [`ViewModelDescriptor::numbered_properties`] and
//! [`MessageDescriptor::numbered_fields`], so every backend numbers fields the
//! same way.

use serde::Serialize;

use crate::{TypeRef, WireType};

/// RPCs every generated service carries ahead of the command RPCs.
pub const FIXED_RPCS: [&str; 4] = [
    "GetState",
    "UpdatePropertyValue",
    "SubscribeToPropertyChanges",
    "Ping",
];

/// Schema types every generated file declares besides the state, command and
/// dependent messages.
pub const AUXILIARY_MESSAGES: [&str; 5] = [
    "UpdatePropertyValueRequest",
    "PropertyChangeNotification",
    "SubscribeRequest",
    "ConnectionStatus",
    "ConnectionStatusResponse",
];

/// Model IR - unified representation for code generation.
#[derive(Debug, Clone, Serialize)]
pub struct ModelIR {
    /// Generation metadata.
    pub meta: ModelMeta,
    /// The root view model.
    pub view_model: ViewModelDescriptor,
    /// Messages generated for dependent types, in discovery order.
    pub messages: Vec<MessageDescriptor>,
}

/// Generation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ModelMeta {
    /// Configured namespace for generated code.
    pub namespace: String,
    /// Schema package derived from the namespace.
    pub package: String,
}

impl ModelMeta {
    /// Namespace of the types generated from the schema (C# side).
    pub fn proto_namespace(&self) -> String {
        format!("{}.Protos", self.namespace)
    }
}

/// An observable property (or a field of a dependent message).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    /// Host property name (PascalCase).
    pub name: String,
    /// Source type.
    pub ty: TypeRef,
    /// Derived wire type.
    pub wire: WireType,
    /// Whether the host exposes a setter (remote updates are accepted).
    pub writable: bool,
}

/// A command parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub ty: TypeRef,
    pub wire: WireType,
}

/// A command exposed by the view model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandDescriptor {
    /// Declared method name (e.g., `SaveAsync`).
    pub method_name: String,
    /// Generated command property (e.g., `SaveCommand`).
    pub command_property: String,
    pub parameters: Vec<ParameterDescriptor>,
    pub is_async: bool,
}

impl CommandDescriptor {
    /// Name of the request message (`<MethodName>Request`).
    pub fn request_message(&self) -> String {
        format!("{}Request", self.method_name)
    }

    /// Name of the response message (`<MethodName>Response`).
    pub fn response_message(&self) -> String {
        format!("{}Response", self.method_name)
    }

    /// Parameters with their 1-based field numbers in the request message.
    pub fn numbered_parameters(&self) -> impl Iterator<Item = (u32, &ParameterDescriptor)> {
        number(&self.parameters)
    }
}

/// The root view model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModelDescriptor {
    pub name: String,
    pub namespace: String,
    /// Properties in declaration order.
    pub properties: Vec<PropertyDescriptor>,
    /// Commands in declaration order.
    pub commands: Vec<CommandDescriptor>,
}

impl ViewModelDescriptor {
    /// Fully-qualified host type name.
    pub fn full_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }

    /// Name of the state message (`<Name>State`).
    pub fn state_message(&self) -> String {
        format!("{}State", self.name)
    }

    /// Name of the generated service (`<Name>Service`).
    pub fn service_name(&self) -> String {
        format!("{}Service", self.name)
    }

    /// Properties with their 1-based field numbers in the state message.
    pub fn numbered_properties(&self) -> impl Iterator<Item = (u32, &PropertyDescriptor)> {
        number(&self.properties)
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Look up a command by method name.
    pub fn command(&self, method_name: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|c| c.method_name == method_name)
    }
}

/// A message generated for a dependent type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageDescriptor {
    /// Message name (the host type's simple name).
    pub name: String,
    /// Fully-qualified host type name.
    pub host_type: String,
    /// Whether the host type is a value type (never null).
    pub value_type: bool,
    pub fields: Vec<PropertyDescriptor>,
}

impl MessageDescriptor {
    /// Fields with their 1-based field numbers.
    pub fn numbered_fields(&self) -> impl Iterator<Item = (u32, &PropertyDescriptor)> {
        number(&self.fields)
    }
}

fn number<T>(items: &[T]) -> impl Iterator<Item = (u32, &T)> {
    (1u32..).zip(items.iter())
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScalarKind;

    fn property(name: &str, ty: &str, scalar: ScalarKind) -> PropertyDescriptor {
        PropertyDescriptor {
            name: name.into(),
            ty: TypeRef::primitive(ty),
            wire: WireType::Scalar(scalar),
            writable: true,
        }
    }

    fn make_view_model() -> ViewModelDescriptor {
        ViewModelDescriptor {
            name: "MainViewModel".into(),
            namespace: "Demo.ViewModels".into(),
            properties: vec![
                property("Name", "string", ScalarKind::String),
                property("Count", "int", ScalarKind::Int32),
                property("Active", "bool", ScalarKind::Bool),
            ],
            commands: vec![CommandDescriptor {
                method_name: "SaveAsync".into(),
                command_property: "SaveCommand".into(),
                parameters: vec![],
                is_async: true,
            }],
        }
    }

    #[test]
    fn test_numbered_properties_are_dense_and_ordered() {
        let vm = make_view_model();
        let numbered: Vec<(u32, &str)> = vm
            .numbered_properties()
            .map(|(n, p)| (n, p.name.as_str()))
            .collect();
        assert_eq!(numbered, vec![(1, "Name"), (2, "Count"), (3, "Active")]);
    }

    #[test]
    fn test_message_names() {
        let vm = make_view_model();
        assert_eq!(vm.state_message(), "MainViewModelState");
        assert_eq!(vm.service_name(), "MainViewModelService");
        assert_eq!(vm.full_name(), "Demo.ViewModels.MainViewModel");

        let cmd = vm.command("SaveAsync").unwrap();
        assert_eq!(cmd.request_message(), "SaveAsyncRequest");
        assert_eq!(cmd.response_message(), "SaveAsyncResponse");
    }

    #[test]
    fn test_proto_namespace() {
        let meta = ModelMeta {
            namespace: "Demo.ViewModels".into(),
            package: "demo.view_models".into(),
        };
        assert_eq!(meta.proto_namespace(), "Demo.ViewModels.Protos");
    }
}
