use std::process::Command;

use rust_decimal::Decimal;

const SCENARIO: &str = r#"{
    "ranges": [{"id": 1, "name": "Shirts", "included_product_ids": [1]}],
    "products": [{"id": 1, "title": "Shirt"}],
    "conditions": [{"id": 1, "proxy_class": "count", "range_id": 1, "value": "2"}],
    "benefits": [{"id": 1, "proxy_class": "percentage", "range_id": 1, "value": "10"}],
    "offers": [{
        "id": 1, "name": "10% off 2 shirts", "offer_type": "SITE",
        "condition_id": 1, "benefit_id": 1
    }],
    "basket": {"lines": [
        {"product_id": 1, "quantity": 2, "unit_price_excl_tax": "20.00", "unit_tax": "0.00"}
    ]},
    "now": 0
}"#;

fn bluelight() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_bluelight"));
    command.env("RUST_LOG", "error");
    command
}

fn write_scenario(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("scenario.json");
    std::fs::write(&path, SCENARIO).unwrap();
    path
}

#[test]
fn test_apply_prints_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_scenario(&dir);

    let output = bluelight().arg("apply").arg(&path).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let applications = report["applications"].as_array().unwrap();
    assert_eq!(applications.len(), 1);
    assert_eq!(applications[0]["offer_id"], 1);
    assert_eq!(report["lines"][0]["affected_quantity"], 2);
}

#[test]
fn test_cosmetic_price_prints_unit_price() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_scenario(&dir);

    let output = bluelight()
        .args(["cosmetic-price"])
        .arg(&path)
        .args(["1", "--price", "20.00", "--quantity", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let price: Decimal = String::from_utf8_lossy(&output.stdout).trim().parse().unwrap();
    assert_eq!(price, Decimal::from(18));
}

#[test]
fn test_missing_scenario_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = bluelight()
        .arg("apply")
        .arg(dir.path().join("missing.json"))
        .output()
        .unwrap();
    assert!(!output.status.success());
}
