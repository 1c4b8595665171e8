//! Observable client proxy for the generated service.

use std::path::{Path, PathBuf};

use vmbridge_codegen::{CodeBuilder, GENERATED_HEADER, wrappers::accepts_updates};
use vmbridge_core::{FileRules, GeneratedFile, strip_async_suffix, to_camel_case};
use vmbridge_ir::{
    CommandDescriptor, ConnectionEvent, ConnectionState, ModelIR, PropertyDescriptor, TRANSITIONS,
    WireType,
};

use crate::convert::{
    PROTOS, client_default, client_from_wire, client_pack, client_to_wire, client_type,
    client_unpack, proto_member, proto_message,
};

/// `client/<Name>RemoteClient.cs`.
pub struct ClientCs<'a> {
    ir: &'a ModelIR,
}

impl<'a> ClientCs<'a> {
    pub fn new(ir: &'a ModelIR) -> Self {
        Self { ir }
    }

    pub fn class_name(&self) -> String {
        format!("{}RemoteClient", self.ir.view_model.name)
    }

    fn service_client(&self) -> String {
        let service = self.ir.view_model.service_name();
        format!("{}.{}Client", proto_message(&service), service)
    }

    fn preamble(&self, b: &mut CodeBuilder) {
        b.push_line("#nullable enable")
            .push_blank()
            .push_lines([
                "using System;",
                "using System.Collections.Generic;",
                "using System.Linq;",
                "using System.Threading;",
                "using System.Threading.Tasks;",
                "using CommunityToolkit.Mvvm.ComponentModel;",
                "using CommunityToolkit.Mvvm.Input;",
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
            .push_line(&format!("namespace {}.Client;", self.ir.meta.namespace))
            .push_blank();
    }

    fn state_machine_types(&self, b: &mut CodeBuilder) {
        b.push_braced("public enum ConnectionState", |b| {
            for state in ConnectionState::ALL {
                b.push_line(&format!("{},", state.as_str()));
            }
        })
        .push_blank()
        .push_braced("private enum ConnectionEvent", |b| {
            for event in ConnectionEvent::ALL {
                b.push_line(&format!("{},", event.as_str()));
            }
        })
        .push_blank();
    }

    fn fields(&self, b: &mut CodeBuilder) {
        b.push_lines([
            "private static readonly TimeSpan PingInterval = TimeSpan.FromSeconds(5);",
            "private static readonly TimeSpan ResubscribeDelay = TimeSpan.FromSeconds(2);",
        ])
        .push_blank()
        .push_line(&format!("private readonly {} _client;", self.service_client()))
        .push_lines([
            "private readonly CancellationTokenSource _cts = new();",
            "private readonly string _clientId = Guid.NewGuid().ToString();",
            "private Task? _pingLoop;",
            "private Task? _subscribeLoop;",
            "private bool _applyingRemote;",
            "private ConnectionState _connection = ConnectionState.Unknown;",
        ]);
        for property in &self.ir.view_model.properties {
            let field = backing_field(&property.name);
            let line = match client_default(&property.wire) {
                Some(default) => format!(
                    "private {} {} = {};",
                    client_type(&property.wire),
                    field,
                    default
                ),
                None => format!("private {} {};", client_type(&property.wire), field),
            };
            b.push_line(&line);
        }
    }

    fn constructor(&self, b: &mut CodeBuilder) {
        b.push_blank().push_braced(
            &format!("public {}(ChannelBase channel)", self.class_name()),
            |b| {
                b.push_line(&format!("_client = new {}(channel);", self.service_client()));
                for command in &self.ir.view_model.commands {
                    let method = wrapper_method(command);
                    match command.parameters.as_slice() {
                        [] => {
                            b.push_line(&format!(
                                "{} = new AsyncRelayCommand(() => {}());",
                                command.command_property, method
                            ));
                        }
                        [param] => {
                            b.push_line(&format!(
                                "{} = new AsyncRelayCommand<{}>(value => {}(value!));",
                                command.command_property,
                                client_type(&param.wire),
                                method
                            ));
                        }
                        _ => {}
                    }
                }
            },
        );
    }

    fn properties(&self, b: &mut CodeBuilder) {
        b.push_blank().push_braced("public ConnectionState Connection", |b| {
            b.push_line("get => _connection;")
                .push_line("private set => SetProperty(ref _connection, value);");
        });

        for property in &self.ir.view_model.properties {
            self.property(b, property);
        }

        for command in &self.ir.view_model.commands {
            let ty = match command.parameters.as_slice() {
                [] => "IAsyncRelayCommand".to_string(),
                [param] => format!("IAsyncRelayCommand<{}>", client_type(&param.wire)),
                _ => continue,
            };
            b.push_blank()
                .push_line(&format!("public {} {} {{ get; }}", ty, command.command_property));
        }
    }

    fn property(&self, b: &mut CodeBuilder, property: &PropertyDescriptor) {
        let field = backing_field(&property.name);
        let packed = client_pack("value", &property.wire).filter(|_| accepts_updates(property));

        b.push_blank().push_braced(
            &format!("public {} {}", client_type(&property.wire), property.name),
            |b| {
                b.push_line(&format!("get => {};", field));
                match packed {
                    Some(packed) => {
                        b.push_braced("set", |b| {
                            b.push_braced(
                                &format!(
                                    "if (SetProperty(ref {}, value) && !_applyingRemote)",
                                    field
                                ),
                                |b| {
                                    b.push_line(&format!(
                                        "_ = PushAsync(\"{}\", {});",
                                        property.name, packed
                                    ));
                                },
                            );
                        });
                    }
                    None => {
                        b.push_line(&format!("private set => SetProperty(ref {}, value);", field));
                    }
                }
            },
        );
    }

    fn lifecycle(&self, b: &mut CodeBuilder) {
        b.push_blank()
            .push_xml_doc("Starts the liveness probe and the notification subscription.")
            .push_braced("public void Start()", |b| {
                b.push_line("_pingLoop ??= RunPingLoopAsync(_cts.Token);")
                    .push_line("_subscribeLoop ??= RunSubscribeLoopAsync(_cts.Token);");
            });

        b.push_blank().push_braced(
            "public async Task RefreshStateAsync(CancellationToken cancellationToken = default)",
            |b| {
                b.push_line(
                    "var state = await _client.GetStateAsync(new Empty(), cancellationToken: cancellationToken);",
                )
                .push_line("_applyingRemote = true;")
                .push_braced("try", |b| {
                    for property in &self.ir.view_model.properties {
                        b.push_line(&format!(
                            "{} = {};",
                            property.name,
                            client_from_wire(
                                &format!("state.{}", proto_member(&property.name)),
                                &property.wire
                            )
                        ));
                    }
                })
                .push_braced("finally", |b| {
                    b.push_line("_applyingRemote = false;");
                });
            },
        );
    }

    fn command(&self, b: &mut CodeBuilder, command: &CommandDescriptor) {
        let mut params: Vec<String> = command
            .parameters
            .iter()
            .map(|p| format!("{} {}", client_type(&p.wire), p.name))
            .collect();
        params.push("CancellationToken cancellationToken = default".to_string());
        let request = proto_message(&command.request_message());

        b.push_blank().push_braced(
            &format!(
                "public async Task {}({})",
                wrapper_method(command),
                params.join(", ")
            ),
            |b| {
                let (collections, singles): (Vec<_>, Vec<_>) = command
                    .parameters
                    .iter()
                    .partition(|p| p.wire.is_collection());
                if singles.is_empty() {
                    b.push_line(&format!("var request = new {}();", request));
                } else {
                    b.push_line(&format!("var request = new {}", request))
                        .push_block("{", "};", |b| {
                            for param in &singles {
                                b.push_line(&format!(
                                    "{} = {},",
                                    proto_member(&param.name),
                                    client_to_wire(&param.name, &param.wire)
                                ));
                            }
                        });
                }
                for param in collections {
                    let method = match param.wire {
                        WireType::Map(..) => "Add",
                        _ => "AddRange",
                    };
                    b.push_line(&format!(
                        "request.{}.{}({});",
                        proto_member(&param.name),
                        method,
                        client_to_wire(&param.name, &param.wire)
                    ));
                }
                b.push_line(&format!(
                    "await _client.{}Async(request, cancellationToken: cancellationToken);",
                    command.method_name
                ));
            },
        );
    }

    /// The transition switch, one arm per edge of the connectivity table.
    fn transitions(&self, b: &mut CodeBuilder) {
        b.push_blank().push_braced("private bool Apply(ConnectionEvent connectionEvent)", |b| {
            b.push_line("var (next, resync) = (Connection, connectionEvent) switch")
                .push_block("{", "};", |b| {
                    for t in TRANSITIONS {
                        b.push_line(&format!(
                            "(ConnectionState.{}, ConnectionEvent.{}) => (ConnectionState.{}, {}),",
                            t.from.as_str(),
                            t.event.as_str(),
                            t.to.as_str(),
                            t.resync
                        ));
                    }
                    b.push_line("_ => (Connection, false),");
                })
                .push_line("Connection = next;")
                .push_line("return resync;");
        });
    }

    fn loops(&self, b: &mut CodeBuilder) {
        b.push_blank().push_braced(
            "private async Task RunPingLoopAsync(CancellationToken cancellationToken)",
            |b| {
                b.push_braced("while (!cancellationToken.IsCancellationRequested)", |b| {
                    b.push_line("bool resync;")
                        .push_braced("try", |b| {
                            b.push_line("var response = await _client.PingAsync(new Empty(), deadline: DateTime.UtcNow.Add(PingInterval), cancellationToken: cancellationToken);")
                                .push_line(&format!(
                                    "resync = Apply(response.Status == {}.{} ? ConnectionEvent.ProbeSucceeded : ConnectionEvent.ProbeFailed);",
                                    proto_message("ConnectionStatus"),
                                    ConnectionState::Connected.as_str()
                                ));
                        })
                        .push_braced("catch (RpcException)", |b| {
                            b.push_line("resync = Apply(ConnectionEvent.ProbeFailed);");
                        })
                        .push_blank()
                        .push_braced("if (resync)", |b| {
                            b.push_braced("try", |b| {
                                b.push_line("await RefreshStateAsync(cancellationToken);");
                            })
                            .push_braced("catch (RpcException)", |b| {
                                b.push_line("Apply(ConnectionEvent.ProbeFailed);");
                            });
                        })
                        .push_blank()
                        .push_braced("try", |b| {
                            b.push_line("await Task.Delay(PingInterval, cancellationToken);");
                        })
                        .push_braced("catch (OperationCanceledException)", |b| {
                            b.push_line("break;");
                        });
                });
            },
        );

        b.push_blank().push_braced(
            "private async Task RunSubscribeLoopAsync(CancellationToken cancellationToken)",
            |b| {
                b.push_braced("while (!cancellationToken.IsCancellationRequested)", |b| {
                    b.push_braced("try", |b| {
                        b.push_line(&format!(
                            "using var call = _client.SubscribeToPropertyChanges(new {} {{ ClientId = _clientId }}, cancellationToken: cancellationToken);",
                            proto_message("SubscribeRequest")
                        ))
                        .push_braced(
                            "await foreach (var notification in call.ResponseStream.ReadAllAsync(cancellationToken))",
                            |b| {
                                b.push_line("ApplyNotification(notification);");
                            },
                        );
                    })
                    .push_braced("catch (RpcException)", |_| {})
                    .push_braced("catch (OperationCanceledException)", |b| {
                        b.push_line("break;");
                    })
                    .push_blank()
                    .push_braced("if (cancellationToken.IsCancellationRequested)", |b| {
                        b.push_line("break;");
                    })
                    .push_line("Apply(ConnectionEvent.StreamTerminated);")
                    .push_braced("try", |b| {
                        b.push_line("await Task.Delay(ResubscribeDelay, cancellationToken);");
                    })
                    .push_braced("catch (OperationCanceledException)", |b| {
                        b.push_line("break;");
                    });
                });
            },
        );
    }

    fn notifications(&self, b: &mut CodeBuilder) {
        b.push_blank().push_braced(
            &format!(
                "private void ApplyNotification({} notification)",
                proto_message("PropertyChangeNotification")
            ),
            |b| {
                b.push_line("var value = notification.NewValue;")
                    .push_line("_applyingRemote = true;")
                    .push_braced("try", |b| {
                        b.push_braced("switch (notification.PropertyName)", |b| {
                            for property in &self.ir.view_model.properties {
                                let Some(unpacked) = client_unpack("value", &property.wire)
                                else {
                                    continue;
                                };
                                match property.wire {
                                    WireType::Message(_) => {
                                        b.push_line(&format!("case \"{}\":", property.name))
                                            .push_indent()
                                            .push_line(&format!(
                                                "{} = value is null ? null : {};",
                                                property.name, unpacked
                                            ))
                                    }
                                    _ => b
                                        .push_line(&format!(
                                            "case \"{}\" when value is not null:",
                                            property.name
                                        ))
                                        .push_indent()
                                        .push_line(&format!("{} = {};", property.name, unpacked)),
                                };
                                b.push_line("break;").push_dedent();
                            }
                        });
                    })
                    .push_braced("finally", |b| {
                        b.push_line("_applyingRemote = false;");
                    });
            },
        );

        b.push_blank().push_braced(
            "private async Task PushAsync(string propertyName, Any? value)",
            |b| {
                b.push_braced("if (value is null)", |b| {
                    b.push_line("return;");
                })
                .push_braced("try", |b| {
                    b.push_line(&format!(
                        "await _client.UpdatePropertyValueAsync(new {} {{ PropertyName = propertyName, NewValue = value }}, cancellationToken: _cts.Token);",
                        proto_message("UpdatePropertyValueRequest")
                    ));
                })
                .push_braced("catch (RpcException)", |b| {
                    b.push_comment("//", "Connectivity is reported by the next probe.");
                });
            },
        );

        b.push_blank().push_line(
            "private static Any? PackAny(IMessage? value) => value is null ? null : Any.Pack(value);",
        );
    }

    fn dispose(&self, b: &mut CodeBuilder) {
        b.push_blank().push_braced("public async ValueTask DisposeAsync()", |b| {
            b.push_line("_cts.Cancel();")
                .push_braced("foreach (var loop in new[] { _pingLoop, _subscribeLoop })", |b| {
                    b.push_braced("if (loop is null)", |b| {
                        b.push_line("continue;");
                    })
                    .push_braced("try", |b| {
                        b.push_line("await loop;");
                    })
                    .push_braced("catch (OperationCanceledException)", |_| {})
                    .push_braced("catch (RpcException)", |_| {});
                })
                .push_line("_cts.Dispose();");
        });
    }
}

/// `_camelCase` backing field for a property.
fn backing_field(name: &str) -> String {
    format!("_{}", to_camel_case(name))
}

/// Client method wrapping a command (`SaveAsync` -> `SaveAsync`, `Reset` -> `ResetAsync`).
fn wrapper_method(command: &CommandDescriptor) -> String {
    format!("{}Async", strip_async_suffix(&command.method_name))
}

impl GeneratedFile for ClientCs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("client").join(format!("{}.cs", self.class_name()))
    }

    fn rules(&self) -> FileRules {
        FileRules::always_overwrite().with_header(GENERATED_HEADER)
    }

    fn render(&self) -> String {
        let vm = &self.ir.view_model;
        let mut b = CodeBuilder::csharp();
        self.preamble(&mut b);

        b.push_xml_doc(&format!(
            "Remote proxy for {} served by {}.",
            vm.name,
            vm.service_name()
        ))
        .push_braced(
            &format!(
                "public sealed class {} : ObservableObject, IAsyncDisposable",
                self.class_name()
            ),
            |b| {
                self.state_machine_types(b);
                self.fields(b);
                self.constructor(b);
                self.properties(b);
                self.lifecycle(b);
                for command in &vm.commands {
                    self.command(b, command);
                }
                self.transitions(b);
                self.loops(b);
                self.notifications(b);
                self.dispose(b);
            },
        );
        b.build()
    }
}
