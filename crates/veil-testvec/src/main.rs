//! Test vector generator for the Veil OPRF.
//!
//! Generates `test_vectors.json` from seeded randomness, so every key, blinding
//! factor and intermediate element is reproducible. Outputs are checked against
//! the unblinded reference computation before they are written.
//!
//! Usage:
//!   veil-testvec              # Generate test_vectors.json
//!   veil-testvec --verify     # Verify test vectors match expected values

use std::collections::BTreeMap;

use anyhow::{ensure, Context};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use veil_oprf::{finalize, KeyPair, Suite, DEFAULT_CONTEXT};

const VECTORS_PATH: &str = "tests/fixtures/test_vectors.json";

#[derive(Serialize, Deserialize)]
struct TestVectors {
    version: String,
    generated_by: String,
    vectors: BTreeMap<String, TestVector>,
}

#[derive(Serialize, Deserialize)]
struct TestVector {
    description: String,
    inputs: BTreeMap<String, String>,
    outputs: BTreeMap<String, String>,
}

/// One full protocol run with seeded key and blinding randomness.
fn protocol_vector(
    suite: &Suite,
    description: &str,
    key_seed: u64,
    blind_seed: u64,
    input: &[u8],
) -> anyhow::Result<TestVector> {
    let key: KeyPair = KeyPair::generate(&mut StdRng::seed_from_u64(key_seed))?;
    let (blind, blinded) = suite.blind(input, &mut StdRng::seed_from_u64(blind_seed))?;
    let blind_hex = hex::encode(blind.to_bytes());
    let evaluated = key.evaluate(&blinded);
    let output = finalize(blind, &evaluated)?;

    let direct = suite.evaluate_direct(&key.private, input)?;
    ensure!(
        output == direct,
        "{description}: protocol output differs from direct evaluation"
    );

    Ok(TestVector {
        description: description.to_string(),
        inputs: BTreeMap::from([
            ("context".to_string(), hex::encode(suite.context())),
            ("input".to_string(), hex::encode(input)),
            ("key_seed".to_string(), key_seed.to_string()),
            ("blind_seed".to_string(), blind_seed.to_string()),
        ]),
        outputs: BTreeMap::from([
            ("private_key".to_string(), hex::encode(key.private.to_bytes())),
            ("public_key".to_string(), hex::encode(key.public.to_bytes())),
            ("blind".to_string(), blind_hex),
            ("blinded_element".to_string(), hex::encode(blinded.to_bytes())),
            ("evaluated_element".to_string(), hex::encode(evaluated.to_bytes())),
            ("output".to_string(), output.to_hex()),
        ]),
    })
}

fn generate_protocol_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let suite = Suite::default();
    let mut vectors = BTreeMap::new();

    vectors.insert(
        "oprf_password123_k1".to_string(),
        protocol_vector(&suite, "F(K1, \"password123\")", 1, 101, b"password123")?,
    );
    vectors.insert(
        "oprf_password123_k2".to_string(),
        protocol_vector(&suite, "F(K2, \"password123\")", 2, 102, b"password123")?,
    );
    vectors.insert(
        "oprf_empty_input".to_string(),
        protocol_vector(&suite, "F(K1, \"\")", 1, 103, b"")?,
    );
    vectors.insert(
        "oprf_testinput".to_string(),
        protocol_vector(&suite, "F(K1, \"testinput\")", 1, 104, b"testinput")?,
    );
    vectors.insert(
        "oprf_long_input".to_string(),
        protocol_vector(&suite, "F(K1, 0x61 * 4096)", 1, 105, &[0x61u8; 4096])?,
    );

    let custom = Suite::with_context(b"Veil test vectors custom context".to_vec())?;
    vectors.insert(
        "oprf_custom_context".to_string(),
        protocol_vector(&custom, "F(K1, \"password123\") under a custom context", 1, 106, b"password123")?,
    );

    Ok(vectors)
}

fn generate_all_vectors() -> anyhow::Result<TestVectors> {
    let vectors = generate_protocol_vectors()?;

    let k1 = &vectors["oprf_password123_k1"].outputs["output"];
    let k2 = &vectors["oprf_password123_k2"].outputs["output"];
    ensure!(k1 != k2, "independent keys produced the same output");

    Ok(TestVectors {
        version: env!("CARGO_PKG_VERSION").to_string(),
        generated_by: format!(
            "veil-testvec (context {})",
            String::from_utf8_lossy(DEFAULT_CONTEXT)
        ),
        vectors,
    })
}

fn verify_vectors(vectors: &TestVectors) -> anyhow::Result<bool> {
    let regenerated = generate_all_vectors()?;
    let mut all_pass = true;

    for (name, expected) in &vectors.vectors {
        if let Some(actual) = regenerated.vectors.get(name) {
            if actual.outputs != expected.outputs {
                eprintln!("FAIL: {name}");
                eprintln!("  expected: {:?}", expected.outputs);
                eprintln!("  actual:   {:?}", actual.outputs);
                all_pass = false;
            } else {
                eprintln!("PASS: {name}");
            }
        } else {
            eprintln!("MISSING: {name}");
            all_pass = false;
        }
    }

    Ok(all_pass)
}

fn write_vectors(vectors: &TestVectors) -> anyhow::Result<()> {
    if let Some(parent) = std::path::Path::new(VECTORS_PATH).parent() {
        std::fs::create_dir_all(parent).context("create fixture directory")?;
    }
    let json = serde_json::to_string_pretty(vectors)?;
    std::fs::write(VECTORS_PATH, json).with_context(|| format!("write {VECTORS_PATH}"))?;
    eprintln!("Generated {} test vectors to {VECTORS_PATH}", vectors.vectors.len());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let vectors = if args.iter().any(|a| a == "--verify") {
        match std::fs::read_to_string(VECTORS_PATH) {
            Ok(content) => serde_json::from_str(&content).context("parse test vectors")?,
            Err(_) => {
                eprintln!("No existing test vectors found at {VECTORS_PATH}. Generating...");
                let vectors = generate_all_vectors()?;
                write_vectors(&vectors)?;
                vectors
            }
        }
    } else {
        let vectors = generate_all_vectors()?;
        write_vectors(&vectors)?;
        vectors
    };

    if verify_vectors(&vectors)? {
        eprintln!("All test vectors verified successfully.");
        Ok(())
    } else {
        eprintln!("Test vector verification FAILED.");
        std::process::exit(1);
    }
}
