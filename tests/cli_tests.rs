use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MASTER_ADDRESS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";
const MASTER_SEED: &str = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb";

/// Command with an isolated config file so the user's home is never read
fn localops(dir: &TempDir) -> Command {
    let config = dir.path().join("config.toml");
    if !config.exists() {
        std::fs::write(&config, "log_level = \"error\"\n").unwrap();
    }
    let mut cmd = Command::cargo_bin("localops").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn payment() -> Value {
    json!({
        "TransactionType": "Payment",
        "Account": MASTER_ADDRESS,
        "Destination": "rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe",
        "Amount": "1000000",
        "Fee": "12",
        "Sequence": 1,
    })
}

fn run_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn sign_for(dir: &TempDir, tx: &Path, passphrase: &str) -> Value {
    let wallet = run_json(
        localops(dir)
            .arg("wallet-propose")
            .arg("--passphrase")
            .arg(passphrase),
    );
    let account = wallet["result"]["account_id"].as_str().unwrap().to_string();
    run_json(
        localops(dir)
            .arg("sign-for")
            .arg("--tx")
            .arg(tx)
            .arg("--account")
            .arg(account)
            .arg("--passphrase")
            .arg(passphrase),
    )
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("localops").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("localops"))
        .stdout(predicate::str::contains("build:"));
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("localops").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Offline signing"))
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn test_sign_requires_key() {
    let dir = TempDir::new().unwrap();
    let tx = write_json(&dir, "tx.json", &payment());
    localops(&dir)
        .arg("sign")
        .arg("--tx")
        .arg(tx)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "required arguments were not provided",
        ));
}

#[test]
fn test_wallet_propose_master_passphrase() {
    let dir = TempDir::new().unwrap();
    let value = run_json(
        localops(&dir)
            .arg("wallet-propose")
            .arg("--passphrase")
            .arg("masterpassphrase"),
    );
    let result = &value["result"];
    assert_eq!(result["status"], "success");
    assert_eq!(result["account_id"], MASTER_ADDRESS);
    assert_eq!(result["master_seed"], MASTER_SEED);
    assert_eq!(result["key_type"], "secp256k1");
    assert_eq!(
        result["public_key_hex"],
        "0330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020"
    );
}

#[test]
fn test_wallet_propose_random_ed25519() {
    let dir = TempDir::new().unwrap();
    let value = run_json(
        localops(&dir)
            .arg("wallet-propose")
            .arg("--key-type")
            .arg("ed25519"),
    );
    let result = &value["result"];
    assert_eq!(result["key_type"], "ed25519");
    assert!(result["master_seed"].as_str().unwrap().starts_with("sEd"));
    assert!(result["public_key_hex"].as_str().unwrap().starts_with("ED"));
}

#[test]
fn test_sign_then_decode() {
    let dir = TempDir::new().unwrap();
    let tx = write_json(&dir, "tx.json", &payment());
    let signed = run_json(
        localops(&dir)
            .arg("sign")
            .arg("--tx")
            .arg(&tx)
            .arg("--secret")
            .arg(MASTER_SEED),
    );
    let result = &signed["result"];
    assert_eq!(result["status"], "success");
    assert!(result["tx_json"]["TxnSignature"].is_string());
    let blob = result["tx_blob"].as_str().unwrap();

    let decoded = run_json(localops(&dir).arg("decode").arg(blob));
    let tx_json = &decoded["result"]["tx_json"];
    assert_eq!(tx_json["Account"], MASTER_ADDRESS);
    assert_eq!(tx_json["Amount"], "1000000");
    assert_eq!(tx_json["hash"], result["tx_json"]["hash"]);
    assert_eq!(tx_json["TxnSignature"], result["tx_json"]["TxnSignature"]);
}

#[test]
fn test_sign_accepts_wrapped_tx_json() {
    let dir = TempDir::new().unwrap();
    let bare = write_json(&dir, "bare.json", &payment());
    let wrapped = write_json(&dir, "wrapped.json", &json!({ "tx_json": payment() }));

    let blob = |path: &Path| {
        run_json(
            localops(&dir)
                .arg("sign")
                .arg("--tx")
                .arg(path)
                .arg("--passphrase")
                .arg("masterpassphrase"),
        )["result"]["tx_blob"]
            .clone()
    };
    assert_eq!(blob(&bare), blob(&wrapped));
}

#[test]
fn test_sign_unknown_field_reports_error() {
    let dir = TempDir::new().unwrap();
    let mut tx = payment();
    tx["Bogus"] = json!(1);
    let tx = write_json(&dir, "tx.json", &tx);

    let output = localops(&dir)
        .arg("sign")
        .arg("--tx")
        .arg(tx)
        .arg("--secret")
        .arg(MASTER_SEED)
        .assert()
        .failure()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["result"]["status"], "error");
    assert_eq!(value["result"]["error"], "unknownField");
}

#[test]
fn test_decode_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    localops(&dir)
        .arg("decode")
        .arg("12000")
        .assert()
        .failure()
        .stdout(predicate::str::contains("encodingError"));
}

#[test]
fn test_multisign_and_combine() {
    let dir = TempDir::new().unwrap();
    let tx = write_json(&dir, "tx.json", &payment());

    let alice = sign_for(&dir, &tx, "alice");
    let bob = sign_for(&dir, &tx, "bob");
    assert_eq!(alice["result"]["tx_json"]["SigningPubKey"], "");
    assert!(alice["result"]["signer"]["Signer"]["TxnSignature"].is_string());

    let alice_file = write_json(&dir, "alice.json", &alice);
    let bob_file = write_json(&dir, "bob.json", &bob);

    let combined = run_json(localops(&dir).arg("combine").arg(&alice_file).arg(&bob_file));
    let reversed = run_json(localops(&dir).arg("combine").arg(&bob_file).arg(&alice_file));
    let signers = combined["result"]["tx_json"]["Signers"].as_array().unwrap();
    assert_eq!(signers.len(), 2);
    assert_eq!(combined["result"]["tx_blob"], reversed["result"]["tx_blob"]);
}

#[test]
fn test_combine_duplicate_signer() {
    let dir = TempDir::new().unwrap();
    let tx = write_json(&dir, "tx.json", &payment());
    let alice = write_json(&dir, "alice.json", &sign_for(&dir, &tx, "alice"));

    localops(&dir)
        .arg("combine")
        .arg(&alice)
        .arg(&alice)
        .assert()
        .failure()
        .stdout(predicate::str::contains("duplicateSigner"));
}
