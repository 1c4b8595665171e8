//! Snapshot tests for schema generation.
//!
//! Run `cargo insta review` to update snapshots when making intentional changes.

use vmbridge_codegen::{Backend, testing};
use vmbridge_codegen_proto::Generator;
use vmbridge_core::WriteResult;

/// Generate the schema for a view-model source and return files sorted by path.
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
fn test_basic_schema() {
    let files = generate_files(BASIC);
    let schema = get_file(&files, "main_view_model.proto").expect("schema not found");

    insta::assert_snapshot!(schema, @r#"
    // <auto-generated>
    //     Generated by vmbridge. Do not edit.
    // </auto-generated>
    syntax = "proto3";

    package demo;

    option csharp_namespace = "Demo.Protos";

    import "google/protobuf/any.proto";
    import "google/protobuf/empty.proto";

    message MainViewModelState {
      string name = 1;
      int32 count = 2;
      bool active = 3;
    }

    message UpdatePropertyValueRequest {
      string property_name = 1;
      google.protobuf.Any new_value = 2;
    }

    message PropertyChangeNotification {
      string property_name = 1;
      google.protobuf.Any new_value = 2;
    }

    message SubscribeRequest {
      string client_id = 1;
    }

    enum ConnectionStatus {
      UNKNOWN = 0;
      CONNECTED = 1;
      DISCONNECTED = 2;
    }

    message ConnectionStatusResponse {
      ConnectionStatus status = 1;
    }

    message ResetRequest {}

    message ResetResponse {}

    service MainViewModelService {
      rpc GetState(google.protobuf.Empty) returns (MainViewModelState);
      rpc UpdatePropertyValue(UpdatePropertyValueRequest) returns (google.protobuf.Empty);
      rpc SubscribeToPropertyChanges(SubscribeRequest) returns (stream PropertyChangeNotification);
      rpc Ping(google.protobuf.Empty) returns (ConnectionStatusResponse);
      rpc Reset(ResetRequest) returns (ResetResponse);
    }
    "#);
}

#[test]
fn test_dependent_messages_and_parameters() {
    let files = generate_files(ORDERS);
    let schema = get_file(&files, "orders_view_model.proto").expect("schema not found");

    assert!(schema.contains("package demo;"));
    assert!(schema.contains(
        "import \"google/protobuf/any.proto\";\n\
         import \"google/protobuf/duration.proto\";\n\
         import \"google/protobuf/empty.proto\";\n\
         import \"google/protobuf/timestamp.proto\";\n"
    ));
    assert!(schema.contains(
        "message OrdersViewModelState {\n  Order selected = 1;\n  map<string, int32> stock = 2;\n  google.protobuf.Duration elapsed = 3;\n}"
    ));
    assert!(schema.contains(
        "message Order {\n  string id = 1;\n  google.protobuf.Timestamp placed_at = 2;\n  repeated string lines = 3;\n}"
    ));
    assert!(schema.contains(
        "message SubmitAsyncRequest {\n  Order order = 1;\n  int32 priority = 2;\n}"
    ));
    assert!(schema.contains("message SelectRequest {\n  string id = 1;\n}"));
    assert!(schema.contains("rpc SubmitAsync(SubmitAsyncRequest) returns (SubmitAsyncResponse);"));
    assert!(schema.contains("rpc Select(SelectRequest) returns (SelectResponse);"));
}

#[test]
fn test_schema_is_stable_across_runs() {
    let first = generate_files(ORDERS);
    let second = generate_files(ORDERS);
    assert_eq!(first, second);
}

#[test]
fn test_generate_writes_schema() {
    let ir = testing::model_from_source("Demo", BASIC);
    let dir = tempfile::tempdir().unwrap();

    let written = Generator.generate(&ir, dir.path()).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].0, dir.path().join("main_view_model.proto"));
    assert_eq!(written[0].1, WriteResult::Written);

    let again = Generator.generate(&ir, dir.path()).unwrap();
    assert_eq!(again[0].1, WriteResult::Unchanged);
}
