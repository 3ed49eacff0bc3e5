//! Golden fixture tests against Sui node-shaped data.
//!
//! Normalized modules are served lazily from `fixtures/sui/abi/`; objects,
//! events, move calls and the BCS source value come from
//! `fixtures/sui/pool.json`.

use movecodec_core::{parse_move_type, ChainAdapter, MoveValue, TypeDescriptor, U256};
use movecodec_registry::AbiDirectory;
use movecodec_sui::{
    DevInspectResults, ExecutionResult, MoveCallTransaction, SuiChainAdapter, SuiCoder,
};
use serde_json::json;
use std::sync::Arc;

const POOL_TYPE: &str = "0x7a11::pool::Pool<0x2::sui::SUI>";

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn fixture_path(rel: &str) -> std::path::PathBuf {
    let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../../fixtures/sui");
    p.push(rel);
    p
}

fn load_fixture() -> serde_json::Value {
    let body = std::fs::read_to_string(fixture_path("pool.json")).expect("fixture not found");
    serde_json::from_str(&body).unwrap()
}

fn coder() -> SuiCoder {
    SuiCoder::new(Arc::new(AbiDirectory::new(fixture_path("abi"))))
}

fn full_address(short: &str) -> String {
    movecodec_core::account_address_string(short).unwrap()
}

fn big(n: u64) -> MoveValue {
    MoveValue::BigInt(U256::from(n))
}

// ─── Objects ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pool_object_golden() {
    let fixture = load_fixture();
    let pool = coder()
        .coder()
        .decoded_struct(&fixture["object"])
        .await
        .expect("decode failed");

    let decoded = &pool.data_decoded;
    assert_eq!(decoded.field("id").and_then(MoveValue::as_str), Some(full_address("0x5").as_str()));
    assert_eq!(decoded.field("name").and_then(MoveValue::as_str), Some("USDC-SUI"));
    assert_eq!(decoded.field("reserve"), Some(&big(1000)));
    assert_eq!(decoded.field("fee_bps"), Some(&big(30)));
    assert_eq!(decoded.field("owner").and_then(MoveValue::as_str), Some(full_address("0xa").as_str()));
    assert!(decoded.field("note").unwrap().is_null());
    assert_eq!(
        decoded.field("tags"),
        Some(&MoveValue::Vector(vec!["stable".into(), "main".into()]))
    );
    // enums pass through untouched
    assert_eq!(decoded.field("side").unwrap().to_json(), json!({"variant": "Buy", "fields": {}}));
    assert_eq!(pool.type_arguments, vec!["0x2::sui::SUI".to_string()]);
}

#[tokio::test]
async fn dynamic_fields_filter_by_key_type() {
    let fixture = load_fixture();
    let objects = fixture["dynamic_fields"].as_array().unwrap();
    let coder = coder();

    let by_u64 = coder
        .get_dynamic_fields(objects, Some(TypeDescriptor::new("u64")), None)
        .await;
    assert_eq!(by_u64.len(), 1);
    assert_eq!(by_u64[0].field("name"), Some(&big(1)));
    assert_eq!(
        by_u64[0].field("value").and_then(MoveValue::as_str),
        Some(full_address("0xb").as_str())
    );

    let all = coder.get_dynamic_fields(objects, None, None).await;
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].field("name").and_then(MoveValue::as_str), Some("fee"));
}

// ─── Events ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn swap_events_golden() {
    let fixture = load_fixture();
    let events = fixture["events"].as_array().unwrap();

    let swaps = coder()
        .filter_and_decode_events("0x7a11::pool::SwapEvent", events)
        .await
        .unwrap();

    assert_eq!(swaps.len(), 1);
    let swap = &swaps[0].data_decoded;
    assert_eq!(swap.field("amount_out"), Some(&big(498)));
    assert_eq!(swap.field("pool_id").and_then(MoveValue::as_str), Some(full_address("0x5").as_str()));
    assert_eq!(swaps[0].to_json()["sender"], "0xa");
}

#[tokio::test]
async fn copy_drop_structs_are_events() {
    let coder = coder();
    coder.registry().load_account("0x7a11").await.unwrap();
    let modules: Vec<_> = coder.registry().modules().iter().map(|m| (**m).clone()).collect();

    let events = SuiChainAdapter.event_structs(&modules);
    assert!(events.contains_key("0x7a11::pool::SwapEvent"));
    assert!(!events.contains_key("0x7a11::pool::Pool"));
    assert!(!events.contains_key("0x7a11::pool::PoolCap"));
}

// ─── Move calls ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn move_call_pure_inputs_only() {
    let fixture = load_fixture();
    let call: MoveCallTransaction = serde_json::from_value(fixture["move_call"].clone()).unwrap();
    let inputs = fixture["inputs"].as_array().unwrap();

    let typed = coder().decode_move_call(&call, inputs).await.unwrap();

    // the pool and coin are object inputs; the TxContext is not an argument
    assert_eq!(
        typed.arguments_decoded,
        vec![MoveValue::Null, MoveValue::Null, big(500)]
    );
    let out = serde_json::to_value(&typed).unwrap();
    assert_eq!(out["function"], "swap");
    assert_eq!(out["arguments_decoded"], json!([null, null, "500"]));
}

// ─── BCS ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn dev_inspect_bcs_round_trip() {
    let fixture = load_fixture();
    let coder = coder();
    let ty = parse_move_type(POOL_TYPE).unwrap();

    let bytes = coder
        .bcs()
        .encode_binary(&ty, &fixture["bcs_pool"])
        .await
        .unwrap();
    // the node-style JSON comes back with canonical addresses and string integers
    let json = coder.decode_bcs(&ty, &bytes).await.unwrap();
    assert_eq!(json["id"]["id"]["bytes"], full_address("0x5").as_str());
    assert_eq!(json["side"], json!({"@variant": "Sell", "limit": "7"}));

    let inspect = DevInspectResults {
        results: Some(vec![
            ExecutionResult {
                return_values: Some(vec![(bytes, POOL_TYPE.to_string())]),
            },
            ExecutionResult { return_values: None },
        ]),
        error: None,
    };
    let typed = coder.decode_dev_inspect_result(&inspect).await.unwrap();

    assert_eq!(typed.results_decoded.len(), 2);
    let pool = &typed.results_decoded[0];
    assert_eq!(pool.field("id").and_then(MoveValue::as_str), Some(full_address("0x5").as_str()));
    assert_eq!(pool.field("name").and_then(MoveValue::as_str), Some("USDC"));
    assert_eq!(pool.field("reserve"), Some(&big(1000)));
    assert_eq!(pool.field("note"), Some(&MoveValue::String("hi".into())));
    assert!(typed.results_decoded[1].is_null());
}

#[tokio::test]
async fn option_return_from_bcs() {
    let coder = coder();
    let ty = parse_move_type("0x1::option::Option<u64>").unwrap();

    // Some(9): one-element vector
    let mut bytes = vec![1u8];
    bytes.extend(9u64.to_le_bytes());
    let json = coder.decode_bcs(&ty, &bytes).await.unwrap();
    assert_eq!(json, json!({"vec": ["9"]}));
    assert_eq!(coder.decode(&json, &ty).await.unwrap(), big(9));

    let none = coder.decode_bcs(&ty, &[0u8]).await.unwrap();
    assert!(coder.decode(&none, &ty).await.unwrap().is_null());
}
