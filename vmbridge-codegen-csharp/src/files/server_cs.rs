//! gRPC service adapter over the host view model.

use std::path::{Path, PathBuf};

use vmbridge_codegen::{CodeBuilder, GENERATED_HEADER, wrappers::accepts_updates};
use vmbridge_core::{FileRules, GeneratedFile};
use vmbridge_ir::{
    CommandDescriptor, MessageDescriptor, ModelIR, PropertyDescriptor, WireType,
};

use crate::convert::{HostConversions, PROTOS, proto_member, proto_message};

/// `server/<Name>GrpcServiceImpl.cs`.
///
/// Property updates go through a name → setter table built in the
/// constructor; notifications through a name → packer table. Subscriber
/// queues are owned by the service instance and released on dispose.
pub struct ServerCs<'a> {
    ir: &'a ModelIR,
    conversions: HostConversions<'a>,
}

impl<'a> ServerCs<'a> {
    pub fn new(ir: &'a ModelIR) -> Self {
        Self {
            ir,
            conversions: HostConversions::new(ir),
        }
    }

    pub fn class_name(&self) -> String {
        format!("{}GrpcServiceImpl", self.ir.view_model.name)
    }

    fn host(&self) -> String {
        format!("global::{}", self.ir.view_model.full_name())
    }

    fn preamble(&self, b: &mut CodeBuilder) {
        b.push_line("#nullable enable")
            .push_blank()
            .push_lines([
                "using System;",
                "using System.Collections.Concurrent;",
                "using System.Collections.Generic;",
                "using System.ComponentModel;",
                "using System.Linq;",
                "using System.Threading.Channels;",
                "using System.Threading.Tasks;",
                "using Google.Protobuf;",
                "using Google.Protobuf.WellKnownTypes;",
                "using Grpc.Core;",
            ])
            .push_line(&format!(
                "using {} = {};",
                PROTOS,
                self.ir.meta.proto_namespace()
            ))
            .push_blank()
            .push_line(&format!("namespace {}.Server;", self.ir.meta.namespace))
            .push_blank();
    }

    fn fields_and_constructor(&self, b: &mut CodeBuilder) {
        let vm = &self.ir.view_model;
        b.push_line(&format!("private readonly {} _viewModel;", self.host()))
            .push_line(&format!(
                "private readonly ConcurrentDictionary<Guid, Channel<{}>> _subscribers = new();",
                proto_message("PropertyChangeNotification")
            ))
            .push_line("private readonly IReadOnlyDictionary<string, Action<Any>> _setters;")
            .push_line("private readonly IReadOnlyDictionary<string, Func<Any?>> _getters;")
            .push_blank();

        let setters: Vec<(String, String)> = vm
            .properties
            .iter()
            .filter(|p| accepts_updates(p))
            .filter_map(|p| {
                let value = self.conversions.unpack("value", &p.ty, &p.wire)?;
                Some((
                    p.name.clone(),
                    format!("value => _viewModel.{} = {}", p.name, value),
                ))
            })
            .collect();
        let getters: Vec<(String, String)> = vm
            .properties
            .iter()
            .filter_map(|p| {
                let packed =
                    self.conversions
                        .pack(&format!("_viewModel.{}", p.name), &p.ty, &p.wire)?;
                Some((p.name.clone(), format!("() => {}", packed)))
            })
            .collect();

        b.push_braced(
            &format!("public {}({} viewModel)", self.class_name(), self.host()),
            |b| {
                b.push_line("_viewModel = viewModel;");
                table(b, "_setters", "Action<Any>", &setters);
                table(b, "_getters", "Func<Any?>", &getters);
                b.push_line("_viewModel.PropertyChanged += OnViewModelPropertyChanged;");
            },
        );
    }

    fn get_state(&self, b: &mut CodeBuilder) {
        let vm = &self.ir.view_model;
        let state = proto_message(&vm.state_message());
        b.push_blank().push_braced(
            &format!(
                "public override Task<{}> GetState(Empty request, ServerCallContext context)",
                state
            ),
            |b| {
                self.populate(b, "state", &state, "_viewModel", &vm.properties);
                b.push_line("return Task.FromResult(state);");
            },
        );
    }

    /// Declare `var` as a new schema message filled from `source`'s members.
    fn populate(
        &self,
        b: &mut CodeBuilder,
        var: &str,
        class: &str,
        source: &str,
        fields: &[PropertyDescriptor],
    ) {
        let (collections, singles): (Vec<&PropertyDescriptor>, Vec<&PropertyDescriptor>) =
            fields.iter().partition(|f| f.wire.is_collection());

        if singles.is_empty() {
            b.push_line(&format!("var {} = new {}();", var, class));
        } else {
            b.push_line(&format!("var {} = new {}", var, class))
                .push_block("{", "};", |b| {
                    for field in &singles {
                        let value = self.conversions.to_wire(
                            &format!("{}.{}", source, field.name),
                            &field.ty,
                            &field.wire,
                        );
                        b.push_line(&format!("{} = {},", proto_member(&field.name), value));
                    }
                });
        }

        for field in collections {
            let value = self.conversions.to_wire(
                &format!("{}.{}", source, field.name),
                &field.ty,
                &field.wire,
            );
            let method = match field.wire {
                WireType::Map(..) => "Add",
                _ => "AddRange",
            };
            b.push_line(&format!(
                "{}.{}.{}({});",
                var,
                proto_member(&field.name),
                method,
                value
            ));
        }
    }

    fn update_property_value(&self, b: &mut CodeBuilder) {
        b.push_blank().push_braced(
            &format!(
                "public override Task<Empty> UpdatePropertyValue({} request, ServerCallContext context)",
                proto_message("UpdatePropertyValueRequest")
            ),
            |b| {
                b.push_braced(
                    "if (!_setters.TryGetValue(request.PropertyName, out var setter))",
                    |b| {
                        b.push_line("throw new RpcException(new Status(StatusCode.NotFound, $\"Property '{request.PropertyName}' cannot be updated remotely.\"));");
                    },
                )
                .push_braced("if (request.NewValue is null)", |b| {
                    b.push_line("throw new RpcException(new Status(StatusCode.InvalidArgument, \"A new value is required.\"));");
                })
                .push_blank()
                .push_braced("try", |b| {
                    b.push_line("setter(request.NewValue);");
                })
                .push_braced("catch (InvalidProtocolBufferException ex)", |b| {
                    b.push_line(
                        "throw new RpcException(new Status(StatusCode.InvalidArgument, ex.Message));",
                    );
                })
                .push_line("return Task.FromResult(new Empty());");
            },
        );
    }

    fn subscribe(&self, b: &mut CodeBuilder) {
        let notification = proto_message("PropertyChangeNotification");
        b.push_blank().push_braced(
            &format!(
                "public override async Task SubscribeToPropertyChanges({} request, IServerStreamWriter<{}> responseStream, ServerCallContext context)",
                proto_message("SubscribeRequest"),
                notification
            ),
            |b| {
                b.push_line("var id = Guid.NewGuid();")
                    .push_line(&format!(
                        "var channel = Channel.CreateUnbounded<{}>();",
                        notification
                    ))
                    .push_line("_subscribers[id] = channel;")
                    .push_braced("try", |b| {
                        b.push_braced(
                            "await foreach (var notification in channel.Reader.ReadAllAsync(context.CancellationToken))",
                            |b| {
                                b.push_line("await responseStream.WriteAsync(notification);");
                            },
                        );
                    })
                    .push_braced("catch (OperationCanceledException)", |_| {})
                    .push_braced("finally", |b| {
                        b.push_line("_subscribers.TryRemove(id, out _);")
                            .push_line("channel.Writer.TryComplete();");
                    });
            },
        );
    }

    fn ping(&self, b: &mut CodeBuilder) {
        b.push_blank()
            .push_line(&format!(
                "public override Task<{}> Ping(Empty request, ServerCallContext context) =>",
                proto_message("ConnectionStatusResponse")
            ))
            .push_indent()
            .push_line(&format!(
                "Task.FromResult(new {} {{ Status = {}.Connected }});",
                proto_message("ConnectionStatusResponse"),
                proto_message("ConnectionStatus")
            ))
            .push_dedent();
    }

    fn command(&self, b: &mut CodeBuilder, command: &CommandDescriptor) {
        let request = proto_message(&command.request_message());
        let response = proto_message(&command.response_message());
        let argument = match command.parameters.as_slice() {
            [] => "null".to_string(),
            [param] => self.conversions.from_wire(
                &format!("request.{}", proto_member(&param.name)),
                &param.ty,
                &param.wire,
            ),
            _ => "request".to_string(),
        };
        let target = format!("_viewModel.{}", command.command_property);

        b.push_blank();
        if command.is_async {
            b.push_braced(
                &format!(
                    "public override async Task<{}> {}({} request, ServerCallContext context)",
                    response, command.method_name, request
                ),
                |b| {
                    b.push_line(&format!("await {}.ExecuteAsync({});", target, argument))
                        .push_line(&format!("return new {}();", response));
                },
            );
        } else {
            b.push_braced(
                &format!(
                    "public override Task<{}> {}({} request, ServerCallContext context)",
                    response, command.method_name, request
                ),
                |b| {
                    b.push_line(&format!("{}.Execute({});", target, argument))
                        .push_line(&format!("return Task.FromResult(new {}());", response));
                },
            );
        }
    }

    fn notifications(&self, b: &mut CodeBuilder) {
        b.push_blank().push_braced(
            "private void OnViewModelPropertyChanged(object? sender, PropertyChangedEventArgs e)",
            |b| {
                b.push_braced(
                    "if (e.PropertyName is null || !_getters.TryGetValue(e.PropertyName, out var getter))",
                    |b| {
                        b.push_line("return;");
                    },
                )
                .push_blank()
                .push_line(&format!(
                    "var notification = new {}",
                    proto_message("PropertyChangeNotification")
                ))
                .push_block("{", "};", |b| {
                    b.push_line("PropertyName = e.PropertyName,")
                        .push_line("NewValue = getter(),");
                })
                .push_braced("foreach (var subscriber in _subscribers.Values)", |b| {
                    b.push_line("subscriber.Writer.TryWrite(notification);");
                });
            },
        );

        b.push_blank().push_braced("public void Dispose()", |b| {
            b.push_line("_viewModel.PropertyChanged -= OnViewModelPropertyChanged;")
                .push_braced("foreach (var subscriber in _subscribers.Values)", |b| {
                    b.push_line("subscriber.Writer.TryComplete();");
                })
                .push_line("_subscribers.Clear();");
        });

        b.push_blank().push_line(
            "private static Any? PackAny(object? value) => value is IMessage message ? Any.Pack(message) : null;",
        );
    }

    fn message_conversions(&self, b: &mut CodeBuilder, message: &MessageDescriptor) {
        let host = format!("global::{}", message.host_type);
        let proto = proto_message(&message.name);
        let nullable = if message.value_type { "" } else { "?" };

        b.push_blank().push_braced(
            &format!(
                "private static {}{} ToProto({}{} value)",
                proto, nullable, host, nullable
            ),
            |b| {
                if !message.value_type {
                    b.push_braced("if (value is null)", |b| {
                        b.push_line("return null;");
                    })
                    .push_blank();
                }
                self.populate(b, "message", &proto, "value", &message.fields);
                b.push_line("return message;");
            },
        );

        let writable: Vec<&PropertyDescriptor> =
            message.fields.iter().filter(|f| f.writable).collect();
        b.push_blank().push_braced(
            &format!("private static {}{} FromProto({}? message)", host, nullable, proto),
            |b| {
                b.push_braced("if (message is null)", |b| {
                    b.push_line(if message.value_type {
                        "return default;"
                    } else {
                        "return null;"
                    });
                })
                .push_blank();
                if writable.is_empty() {
                    b.push_line(&format!("return new {}();", host));
                    return;
                }
                b.push_line(&format!("return new {}", host))
                    .push_block("{", "};", |b| {
                        for field in &writable {
                            let value = self.conversions.from_wire(
                                &format!("message.{}", proto_member(&field.name)),
                                &field.ty,
                                &field.wire,
                            );
                            b.push_line(&format!("{} = {},", field.name, value));
                        }
                    });
            },
        );
    }
}

/// Assign a name-keyed dictionary literal to `field`.
fn table(b: &mut CodeBuilder, field: &str, value_type: &str, entries: &[(String, String)]) {
    if entries.is_empty() {
        b.push_line(&format!(
            "{} = new Dictionary<string, {}>();",
            field, value_type
        ));
        return;
    }
    b.push_line(&format!("{} = new Dictionary<string, {}>", field, value_type))
        .push_block("{", "};", |b| {
            for (name, body) in entries {
                b.push_line(&format!("[\"{}\"] = {},", name, body));
            }
        });
}

impl GeneratedFile for ServerCs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("server").join(format!("{}.cs", self.class_name()))
    }

    fn rules(&self) -> FileRules {
        FileRules::always_overwrite().with_header(GENERATED_HEADER)
    }

    fn render(&self) -> String {
        let vm = &self.ir.view_model;
        let mut b = CodeBuilder::csharp();
        self.preamble(&mut b);

        b.push_xml_doc(&format!(
            "Exposes <see cref=\"{}\"/> through {}.",
            self.host(),
            vm.service_name()
        ))
        .push_braced(
            &format!(
                "public sealed class {} : {}.{}Base, IDisposable",
                self.class_name(),
                proto_message(&vm.service_name()),
                vm.service_name()
            ),
            |b| {
                self.fields_and_constructor(b);
                self.get_state(b);
                self.update_property_value(b);
                self.subscribe(b);
                self.ping(b);
                for command in &vm.commands {
                    self.command(b, command);
                }
                self.notifications(b);
                for message in &self.ir.messages {
                    self.message_conversions(b, message);
                }
            },
        );
        b.build()
    }
}
