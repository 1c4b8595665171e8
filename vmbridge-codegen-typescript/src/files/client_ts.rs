//! grpc-web proxy for the generated service.

use std::path::{Path, PathBuf};

use vmbridge_codegen::{CodeBuilder, GENERATED_HEADER, wrappers::accepts_updates};
use vmbridge_core::{FileRules, GeneratedFile, to_snake_case};
use vmbridge_ir::{
    CommandDescriptor, ConnectionEvent, ConnectionState, ModelIR, PropertyDescriptor, TRANSITIONS,
};

use crate::{
    ast::Import,
    naming::{command_method, rpc_method, safe_name, service_client_module, state_key},
    types::{PB, Packing, default_value, read, ts_type, write},
};

/// Module-level helpers, emitted only when the class body calls them.
const HELPERS: &[(&str, &str)] = &[
    (
        "pack",
        "function pack(message: jspb.Message, typeName: string): Any {
  const any = new Any();
  any.pack(message.serializeBinary(), typeName);
  return any;
}",
    ),
    (
        "toDate",
        "function toDate(timestamp: Timestamp | undefined): Date {
  return timestamp ? timestamp.toDate() : new Date(0);
}",
    ),
    (
        "toMillis",
        "function toMillis(duration: Duration | undefined): number {
  return duration ? duration.getSeconds() * 1000 + Math.round(duration.getNanos() / 1e6) : 0;
}",
    ),
    (
        "fromMillis",
        "function fromMillis(millis: number): Duration {
  const duration = new Duration();
  duration.setSeconds(Math.trunc(millis / 1000));
  duration.setNanos(Math.round((millis % 1000) * 1e6));
  return duration;
}",
    ),
    (
        "toMap",
        "function toMap<K, W, V>(source: jspb.Map<K, W>, convert: (value: W) => V): Map<K, V> {
  const result = new Map<K, V>();
  source.forEach((value, key) => result.set(key, convert(value)));
  return result;
}",
    ),
    (
        "fillMap",
        "function fillMap<K, V, W>(target: jspb.Map<K, W>, source: ReadonlyMap<K, V>, convert: (item: V) => W): void {
  source.forEach((item, key) => target.set(key, convert(item)));
}",
    ),
];

const WELL_KNOWN: &[(&str, &str)] = &[
    ("Any", "any_pb"),
    ("Duration", "duration_pb"),
    ("Empty", "empty_pb"),
    ("Timestamp", "timestamp_pb"),
];

const WRAPPERS: &[&str] = &[
    "BoolValue",
    "BytesValue",
    "DoubleValue",
    "FloatValue",
    "Int32Value",
    "Int64Value",
    "StringValue",
    "UInt32Value",
    "UInt64Value",
];

/// `ts/<Name>RemoteClient.ts`.
pub struct ClientTs<'a> {
    ir: &'a ModelIR,
}

impl<'a> ClientTs<'a> {
    pub fn new(ir: &'a ModelIR) -> Self {
        Self { ir }
    }

    pub fn class_name(&self) -> String {
        format!("{}RemoteClient", self.ir.view_model.name)
    }

    fn properties_type(&self) -> String {
        format!("{}Properties", self.ir.view_model.name)
    }

    fn service_client(&self) -> String {
        format!("{}Client", self.ir.view_model.service_name())
    }

    fn packing(&self, property: &PropertyDescriptor) -> Option<Packing> {
        Packing::for_wire(&property.wire, &self.ir.meta.package)
    }

    fn declarations(&self, b: &mut CodeBuilder) {
        let props = self.properties_type();
        b.push_block(&format!("export interface {} {{", props), "}", |b| {
            for property in &self.ir.view_model.properties {
                b.push_line(&format!(
                    "{}: {};",
                    state_key(&property.name),
                    ts_type(&property.wire)
                ));
            }
        })
        .push_blank()
        .push_line(&format!("export type ChangeListener = (key: keyof {}) => void;", props))
        .push_line("export type ConnectionListener = (state: ConnectionState) => void;")
        .push_blank()
        .push_block("export enum ConnectionState {", "}", |b| {
            for state in ConnectionState::ALL {
                b.push_line(&format!("{s} = '{s}',", s = state.as_str()));
            }
        })
        .push_blank();

        let events: Vec<String> = ConnectionEvent::ALL
            .iter()
            .map(|e| format!("'{}'", e.as_str()))
            .collect();
        b.push_line(&format!("type ConnectionEvent = {};", events.join(" | ")))
            .push_blank()
            .push_block("interface Transition {", "}", |b| {
                b.push_lines([
                    "from: ConnectionState;",
                    "event: ConnectionEvent;",
                    "to: ConnectionState;",
                    "resync: boolean;",
                ]);
            })
            .push_blank()
            .push_block("const TRANSITIONS: ReadonlyArray<Transition> = [", "];", |b| {
                for t in TRANSITIONS {
                    b.push_line(&format!(
                        "{{ from: ConnectionState.{}, event: '{}', to: ConnectionState.{}, resync: {} }},",
                        t.from.as_str(),
                        t.event.as_str(),
                        t.to.as_str(),
                        t.resync
                    ));
                }
            })
            .push_blank()
            .push_line("const PING_INTERVAL_MS = 5000;")
            .push_line("const RESUBSCRIBE_DELAY_MS = 2000;")
            .push_blank();
    }

    fn fields_and_constructor(&self, b: &mut CodeBuilder) {
        let props = self.properties_type();
        b.push_line(&format!("private readonly client: {};", self.service_client()))
            .push_line("private readonly clientId = crypto.randomUUID();")
            .push_block(&format!("private readonly values: {} = {{", props), "};", |b| {
                for property in &self.ir.view_model.properties {
                    b.push_line(&format!(
                        "{}: {},",
                        state_key(&property.name),
                        default_value(&property.wire)
                    ));
                }
            })
            .push_lines([
                "private readonly listeners = new Set<ChangeListener>();",
                "private readonly connectionListeners = new Set<ConnectionListener>();",
                "private connectionState = ConnectionState.Unknown;",
                "private pingTimer?: ReturnType<typeof setInterval>;",
                "private resubscribeTimer?: ReturnType<typeof setTimeout>;",
            ])
            .push_line(&format!(
                "private stream?: ClientReadableStream<{}.PropertyChangeNotification>;",
                PB
            ))
            .push_line("private disposed = false;")
            .push_blank()
            .push_block(
                "constructor(hostname: string, options?: Record<string, unknown>) {",
                "}",
                |b| {
                    b.push_line(&format!(
                        "this.client = new {}(hostname, null, options ?? null);",
                        self.service_client()
                    ));
                },
            );
    }

    fn accessors(&self, b: &mut CodeBuilder) {
        let props = self.properties_type();
        b.push_blank()
            .push_block(&format!("get state(): Readonly<{}> {{", props), "}", |b| {
                b.push_line("return this.values;");
            })
            .push_blank()
            .push_block("get connection(): ConnectionState {", "}", |b| {
                b.push_line("return this.connectionState;");
            })
            .push_blank()
            .push_block("onChange(listener: ChangeListener): () => void {", "}", |b| {
                b.push_line("this.listeners.add(listener);")
                    .push_line("return () => this.listeners.delete(listener);");
            })
            .push_blank()
            .push_block(
                "onConnectionChange(listener: ConnectionListener): () => void {",
                "}",
                |b| {
                    b.push_line("this.connectionListeners.add(listener);")
                        .push_line("return () => this.connectionListeners.delete(listener);");
                },
            );
    }

    fn lifecycle(&self, b: &mut CodeBuilder) {
        b.push_blank()
            .push_jsdoc("Starts the liveness probe and the notification subscription.")
            .push_block("start(): void {", "}", |b| {
                b.push_block("if (this.pingTimer !== undefined || this.disposed) {", "}", |b| {
                    b.push_line("return;");
                })
                .push_line("void this.probe();")
                .push_line("this.pingTimer = setInterval(() => void this.probe(), PING_INTERVAL_MS);")
                .push_line("this.subscribe();");
            })
            .push_blank()
            .push_block("async refreshState(): Promise<void> {", "}", |b| {
                b.push_line(&format!(
                    "const state = await this.client.{}(new Empty());",
                    rpc_method("GetState")
                ));
                for property in &self.ir.view_model.properties {
                    b.push_line(&format!(
                        "this.assign('{}', {});",
                        state_key(&property.name),
                        read("state", &property.name, &property.wire)
                    ));
                }
            })
            .push_blank()
            .push_block("dispose(): void {", "}", |b| {
                b.push_lines([
                    "this.disposed = true;",
                    "clearInterval(this.pingTimer);",
                    "clearTimeout(this.resubscribeTimer);",
                    "this.stream?.cancel();",
                    "this.stream = undefined;",
                    "this.listeners.clear();",
                    "this.connectionListeners.clear();",
                ]);
            });
    }

    fn setters(&self, b: &mut CodeBuilder) {
        for property in &self.ir.view_model.properties {
            if !accepts_updates(property) {
                continue;
            }
            let Some(packing) = self.packing(property) else {
                continue;
            };
            let (statements, packed) = packing.pack("value");
            b.push_blank().push_block(
                &format!(
                    "async set{}(value: {}): Promise<void> {{",
                    property.name,
                    ts_type(&property.wire)
                ),
                "}",
                |b| {
                    b.push_line(&format!("this.assign('{}', value);", state_key(&property.name)))
                        .push_lines(&statements)
                        .push_line(&format!(
                            "await this.push('{}', {});",
                            property.name, packed
                        ));
                },
            );
        }
    }

    fn command(&self, b: &mut CodeBuilder, command: &CommandDescriptor) {
        let params: Vec<(String, String)> = command
            .parameters
            .iter()
            .map(|p| (safe_name(&p.name), ts_type(&p.wire)))
            .collect();
        let signature = params
            .iter()
            .map(|(name, ty)| format!("{}: {}", name, ty))
            .collect::<Vec<_>>()
            .join(", ");

        b.push_blank().push_block(
            &format!(
                "async {}({}): Promise<void> {{",
                command_method(&command.method_name),
                signature
            ),
            "}",
            |b| {
                b.push_line(&format!(
                    "const request = new {}.{}();",
                    PB,
                    command.request_message()
                ));
                for (param, (name, _)) in command.parameters.iter().zip(&params) {
                    b.push_line(&write("request", &param.name, &param.wire, name));
                }
                b.push_line(&format!(
                    "await this.client.{}(request);",
                    rpc_method(&command.method_name)
                ));
            },
        );
    }

    fn connectivity(&self, b: &mut CodeBuilder) {
        b.push_blank()
            .push_block("private apply(event: ConnectionEvent): boolean {", "}", |b| {
                b.push_line(
                    "const transition = TRANSITIONS.find((t) => t.from === this.connectionState && t.event === event);",
                )
                .push_block("if (!transition) {", "}", |b| {
                    b.push_line("return false;");
                })
                .push_line("this.connectionState = transition.to;")
                .push_line("this.connectionListeners.forEach((listener) => listener(transition.to));")
                .push_line("return transition.resync;");
            })
            .push_blank()
            .push_block("private async probe(): Promise<void> {", "}", |b| {
                b.push_line("let event: ConnectionEvent;");
                try_catch(
                    b,
                    |b| {
                        b.push_line("const deadline = String(Date.now() + PING_INTERVAL_MS);")
                            .push_line(&format!(
                                "const response = await this.client.{}(new Empty(), {{ deadline }});",
                                rpc_method("Ping")
                            ))
                            .push_line(&format!(
                                "event = response.getStatus() === {}.ConnectionStatus.{} ? '{}' : '{}';",
                                PB,
                                ConnectionState::Connected.wire_name(),
                                ConnectionEvent::ProbeSucceeded.as_str(),
                                ConnectionEvent::ProbeFailed.as_str()
                            ));
                    },
                    |b| {
                        b.push_line(&format!(
                            "event = '{}';",
                            ConnectionEvent::ProbeFailed.as_str()
                        ));
                    },
                );
                b.push_block("if (this.apply(event)) {", "}", |b| {
                    try_catch(
                        b,
                        |b| {
                            b.push_line("await this.refreshState();");
                        },
                        |b| {
                            b.push_line(&format!(
                                "this.apply('{}');",
                                ConnectionEvent::ProbeFailed.as_str()
                            ));
                        },
                    );
                });
            })
            .push_blank()
            .push_block("private subscribe(): void {", "}", |b| {
                b.push_block("if (this.disposed) {", "}", |b| {
                    b.push_line("return;");
                })
                .push_line(&format!("const request = new {}.SubscribeRequest();", PB))
                .push_line("request.setClientId(this.clientId);")
                .push_line(&format!(
                    "const stream = this.client.{}(request);",
                    rpc_method("SubscribeToPropertyChanges")
                ))
                .push_line("this.stream = stream;")
                .push_line("let ended = false;")
                .push_block("const restart = () => {", "};", |b| {
                    b.push_block("if (ended) {", "}", |b| {
                        b.push_line("return;");
                    })
                    .push_line("ended = true;")
                    .push_line("this.stream = undefined;")
                    .push_block("if (this.disposed) {", "}", |b| {
                        b.push_line("return;");
                    })
                    .push_line(&format!(
                        "this.apply('{}');",
                        ConnectionEvent::StreamTerminated.as_str()
                    ))
                    .push_line(
                        "this.resubscribeTimer = setTimeout(() => this.subscribe(), RESUBSCRIBE_DELAY_MS);",
                    );
                })
                .push_line("stream.on('data', (notification) => this.applyNotification(notification));")
                .push_line("stream.on('error', restart);")
                .push_line("stream.on('end', restart);");
            });
    }

    fn notifications(&self, b: &mut CodeBuilder) {
        let props = self.properties_type();
        b.push_blank().push_block(
            &format!(
                "private applyNotification(notification: {}.PropertyChangeNotification): void {{",
                PB
            ),
            "}",
            |b| {
                b.push_line("const value = notification.getNewValue();")
                    .push_block("if (!value) {", "}", |b| {
                        b.push_line("return;");
                    })
                    .push_block("switch (notification.getPropertyName()) {", "}", |b| {
                        for property in &self.ir.view_model.properties {
                            let Some(packing) = self.packing(property) else {
                                continue;
                            };
                            b.push_block(&format!("case '{}': {{", property.name), "}", |b| {
                                b.push_line(&format!(
                                    "const unpacked = {};",
                                    packing.unpack("value")
                                ))
                                .push_block("if (unpacked) {", "}", |b| {
                                    b.push_line(&format!(
                                        "this.assign('{}', {});",
                                        state_key(&property.name),
                                        packing.value_of("unpacked")
                                    ));
                                })
                                .push_line("break;");
                            });
                        }
                        b.push_line("default:").push_indent().push_line("break;").push_dedent();
                    });
            },
        );

        let needs_push = self.ir.view_model.properties.iter().any(accepts_updates);
        if needs_push {
            b.push_blank().push_block(
                "private async push(propertyName: string, value: Any | undefined): Promise<void> {",
                "}",
                |b| {
                    b.push_block("if (value === undefined) {", "}", |b| {
                        b.push_line("return;");
                    })
                    .push_line(&format!(
                        "const request = new {}.UpdatePropertyValueRequest();",
                        PB
                    ))
                    .push_line("request.setPropertyName(propertyName);")
                    .push_line("request.setNewValue(value);")
                    .push_line(&format!(
                        "await this.client.{}(request);",
                        rpc_method("UpdatePropertyValue")
                    ));
                },
            );
        }

        b.push_blank().push_block(
            &format!(
                "private assign<K extends keyof {p}>(key: K, value: {p}[K]): void {{",
                p = props
            ),
            "}",
            |b| {
                b.push_block("if (this.values[key] === value) {", "}", |b| {
                    b.push_line("return;");
                })
                .push_line("this.values[key] = value;")
                .push_line("this.listeners.forEach((listener) => listener(key));");
            },
        );
    }

    fn imports(&self, code: &str) -> Vec<Import> {
        let schema_stem = to_snake_case(&self.ir.view_model.name);
        let mut imports = vec![Import::new("grpc-web")
            .named("ClientReadableStream")
            .type_only()];
        if mentions(code, "jspb") {
            imports.push(Import::new("google-protobuf").namespace("jspb"));
        }
        for (symbol, module) in WELL_KNOWN {
            if mentions(code, symbol) {
                imports.push(
                    Import::new(format!("google-protobuf/google/protobuf/{}", module))
                        .named(*symbol),
                );
            }
        }
        let wrappers = WRAPPERS
            .iter()
            .filter(|w| mentions(code, w))
            .fold(
                Import::new("google-protobuf/google/protobuf/wrappers_pb"),
                |import, w| import.named(*w),
            );
        if !wrappers.is_empty() {
            imports.push(wrappers);
        }
        imports.push(
            Import::new(format!("./{}", service_client_module(&schema_stem)))
                .named(self.service_client()),
        );
        imports.push(Import::new(format!("./{}_pb", schema_stem)).namespace(PB));
        imports
    }
}

/// `try { .. } catch { .. }` with the braces joined.
fn try_catch(
    b: &mut CodeBuilder,
    body: impl FnOnce(&mut CodeBuilder),
    handler: impl FnOnce(&mut CodeBuilder),
) {
    b.push_line("try {").push_indent();
    body(b);
    b.push_dedent().push_line("} catch {").push_indent();
    handler(b);
    b.push_dedent().push_line("}");
}

/// Whether `code` uses `ident` as a whole identifier.
fn mentions(code: &str, ident: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$';
    code.match_indices(ident).any(|(start, _)| {
        let before = code[..start].chars().next_back();
        let after = code[start + ident.len()..].chars().next();
        !before.is_some_and(|c| is_ident(c) || c == '.') && !after.is_some_and(is_ident)
    })
}

impl GeneratedFile for ClientTs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("ts").join(format!("{}.ts", self.class_name()))
    }

    fn rules(&self) -> FileRules {
        FileRules::always_overwrite().with_header(GENERATED_HEADER)
    }

    fn render(&self) -> String {
        let vm = &self.ir.view_model;

        let mut body = CodeBuilder::typescript();
        self.declarations(&mut body);
        body.push_jsdoc(&format!(
            "Remote proxy for {} served by {}.",
            vm.name,
            vm.service_name()
        ))
        .push_block(&format!("export class {} {{", self.class_name()), "}", |b| {
            self.fields_and_constructor(b);
            self.accessors(b);
            self.lifecycle(b);
            self.setters(b);
            for command in &vm.commands {
                self.command(b, command);
            }
            self.connectivity(b);
            self.notifications(b);
        });
        let body = body.build();

        let helpers: Vec<&str> = HELPERS
            .iter()
            .filter(|(name, _)| mentions(&body, name))
            .map(|(_, code)| *code)
            .collect();
        let mut used = body.clone();
        for helper in &helpers {
            used.push_str(helper);
        }

        let mut b = CodeBuilder::typescript();
        for import in self.imports(&used) {
            import.render(&mut b);
        }
        b.push_blank().push_raw(&body);
        for helper in helpers {
            b.push_blank().push_raw(helper).push_raw("\n");
        }
        b.build()
    }
}
