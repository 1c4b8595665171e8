//! Snapshot tests for TypeScript generation.
//!
//! Run `cargo insta review` to update snapshots when making intentional changes.

use vmbridge_codegen::{Backend, testing};
use vmbridge_codegen_typescript::Generator;
use vmbridge_core::WriteResult;

/// Generate files for a view-model source and return them sorted by path.
fn generate_files(src: &str) -> Vec<(String, String)> {
    let ir = testing::model_from_source("Demo", src);
    let mut result: Vec<(String, String)> = Generator
        .preview(&ir)
        .into_iter()
        .map(|f| (f.path, f.content))
        .collect();
    result.sort_by(|a, b| a.0.cmp(&b.0));
    result
}

/// Get a specific file from the generated output.
fn get_file<'a>(files: &'a [(String, String)], path: &str) -> Option<&'a str> {
    files
        .iter()
        .find(|(p, _)| p == path)
        .map(|(_, c)| c.as_str())
}

const BASIC: &str = r#"
using CommunityToolkit.Mvvm.ComponentModel;
using CommunityToolkit.Mvvm.Input;

namespace Demo;

public partial class MainViewModel : ObservableObject
{
    [ObservableProperty] private string _name;
    [ObservableProperty] private int _count;
    [ObservableProperty] private bool _active;

    [RelayCommand]
    private void Reset() { }
}
"#;

const ORDERS: &str = r#"
using System;
using System.Collections.Generic;
using System.Threading;
using System.Threading.Tasks;
using CommunityToolkit.Mvvm.ComponentModel;
using CommunityToolkit.Mvvm.Input;

namespace Demo.Orders;

public class Order
{
    public Guid Id { get; set; }
    public DateTime PlacedAt { get; set; }
    public List<string> Lines { get; set; }
}

public partial class OrdersViewModel : ObservableObject
{
    [ObservableProperty] private Order _selected;
    [ObservableProperty] private Dictionary<string, int> _stock;
    [ObservableProperty] private TimeSpan? _elapsed;

    [RelayCommand]
    private async Task SubmitAsync(Order order, int priority, CancellationToken token) { }

    [RelayCommand]
    private void Select(string id) { }
}
"#;

#[test]
fn test_basic_imports() {
    let files = generate_files(BASIC);
    let client = get_file(&files, "ts/MainViewModelRemoteClient.ts").expect("client not found");

    assert!(client.starts_with("// <auto-generated>\n"));
    assert!(client.contains(
        "import type { ClientReadableStream } from 'grpc-web';\n\
         import * as jspb from 'google-protobuf';\n\
         import { Any } from 'google-protobuf/google/protobuf/any_pb';\n\
         import { Empty } from 'google-protobuf/google/protobuf/empty_pb';\n\
         import { BoolValue, Int32Value, StringValue } from 'google-protobuf/google/protobuf/wrappers_pb';\n\
         import { MainViewModelServiceClient } from './Main_view_modelServiceClientPb';\n\
         import * as pb from './main_view_model_pb';\n"
    ));
}

#[test]
fn test_basic_proxy() {
    let files = generate_files(BASIC);
    let client = get_file(&files, "ts/MainViewModelRemoteClient.ts").expect("client not found");

    assert!(client.contains(
        "export interface MainViewModelProperties {\n  name: string;\n  count: number;\n  active: boolean;\n}"
    ));
    assert!(client.contains("export class MainViewModelRemoteClient {"));
    assert!(client.contains("    this.assign('count', state.getCount());\n"));
    assert!(client.contains(
        "  async setName(value: string): Promise<void> {\n\
         \x20   this.assign('name', value);\n\
         \x20   const wrapper = new StringValue();\n\
         \x20   wrapper.setValue(value);\n\
         \x20   await this.push('Name', pack(wrapper, 'google.protobuf.StringValue'));\n\
         \x20 }\n"
    ));
    assert!(client.contains(
        "  async executeReset(): Promise<void> {\n\
         \x20   const request = new pb.ResetRequest();\n\
         \x20   await this.client.reset(request);\n\
         \x20 }\n"
    ));
    assert!(client.contains(
        "const unpacked = value.unpack(BoolValue.deserializeBinary, 'google.protobuf.BoolValue');"
    ));
    assert!(client.contains("this.assign('active', unpacked.getValue());"));
}

#[test]
fn test_connectivity_contract() {
    let files = generate_files(BASIC);
    let client = get_file(&files, "ts/MainViewModelRemoteClient.ts").expect("client not found");

    assert!(client.contains(
        "export enum ConnectionState {\n  Unknown = 'Unknown',\n  Connected = 'Connected',\n  Disconnected = 'Disconnected',\n}"
    ));
    assert!(client.contains(
        "type ConnectionEvent = 'ProbeSucceeded' | 'ProbeFailed' | 'StreamTerminated';"
    ));
    assert!(client.contains(
        "{ from: ConnectionState.Unknown, event: 'ProbeSucceeded', to: ConnectionState.Connected, resync: true },"
    ));
    assert!(client.contains(
        "event = response.getStatus() === pb.ConnectionStatus.CONNECTED ? 'ProbeSucceeded' : 'ProbeFailed';"
    ));
    assert!(client.contains("this.apply('StreamTerminated');"));
    assert!(client.contains(
        "this.resubscribeTimer = setTimeout(() => this.subscribe(), RESUBSCRIBE_DELAY_MS);"
    ));
    assert!(client.contains("const PING_INTERVAL_MS = 5000;"));
}

#[test]
fn test_messages_maps_and_durations() {
    let files = generate_files(ORDERS);
    let client = get_file(&files, "ts/OrdersViewModelRemoteClient.ts").expect("client not found");

    assert!(client.contains("  selected: pb.Order | undefined;\n"));
    assert!(client.contains("  stock: ReadonlyMap<string, number>;\n"));
    assert!(client.contains("  elapsed: number;\n"));
    assert!(client.contains(
        "this.assign('stock', toMap(state.getStockMap(), (value) => value));"
    ));
    assert!(client.contains("this.assign('elapsed', toMillis(state.getElapsed()));"));
    assert!(client.contains(
        "await this.push('Selected', value === undefined ? undefined : pack(value, 'demo.Order'));"
    ));
    assert!(client.contains(
        "await this.push('Elapsed', pack(fromMillis(value), 'google.protobuf.Duration'));"
    ));
    assert!(client.contains(
        "const unpacked = value.unpack(pb.Order.deserializeBinary, 'demo.Order');"
    ));
    assert!(!client.contains("async setStock("));

    assert!(client.contains("import { Duration } from 'google-protobuf/google/protobuf/duration_pb';"));
    assert!(!client.contains("timestamp_pb"));
    assert!(client.contains("function toMap<K, W, V>("));
    assert!(!client.contains("function fillMap<"));
}

#[test]
fn test_command_parameters() {
    let files = generate_files(ORDERS);
    let client = get_file(&files, "ts/OrdersViewModelRemoteClient.ts").expect("client not found");

    assert!(client.contains(
        "  async executeSubmit(order: pb.Order | undefined, priority: number): Promise<void> {\n\
         \x20   const request = new pb.SubmitAsyncRequest();\n\
         \x20   request.setOrder(order);\n\
         \x20   request.setPriority(priority);\n\
         \x20   await this.client.submitAsync(request);\n\
         \x20 }\n"
    ));
    assert!(client.contains("  async executeSelect(id: string): Promise<void> {\n"));
    assert!(client.contains("request.setId(id);"));
    assert!(!client.contains("token"));
}

#[test]
fn test_output_is_stable_across_runs() {
    assert_eq!(generate_files(ORDERS), generate_files(ORDERS));
}

#[test]
fn test_generate_writes_proxy() {
    let ir = testing::model_from_source("Demo", BASIC);
    let dir = tempfile::tempdir().unwrap();

    let written = Generator.generate(&ir, dir.path()).unwrap();
    assert_eq!(
        written[0].0,
        dir.path().join("ts").join("MainViewModelRemoteClient.ts")
    );
    assert_eq!(written[0].1, WriteResult::Written);

    let again = Generator.generate(&ir, dir.path()).unwrap();
    assert_eq!(again[0].1, WriteResult::Unchanged);
}
