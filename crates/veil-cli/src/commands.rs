//! Command handlers.
//!
//! Each handler plays one side of the protocol on hex-encoded values and
//! returns a JSON object for stdout.

use anyhow::Context;
use rand::rngs::OsRng;
use serde_json::json;
use tracing::info;
use veil_oprf::{
    finalize, BlindedElement, BlindingFactor, EvaluatedElement, KeyPair, PrivateKey,
};

use crate::config::CliConfig;

/// Decode a hex command-line argument.
pub fn decode_hex(label: &str, value: &str) -> anyhow::Result<Vec<u8>> {
    hex::decode(value.trim()).with_context(|| format!("{label} is not valid hex"))
}

/// Generate a server key pair.
pub fn keygen() -> anyhow::Result<serde_json::Value> {
    let key: KeyPair = KeyPair::generate(&mut OsRng)?;
    info!("generated server key pair");
    Ok(json!({
        "private_key": hex::encode(key.private.to_bytes()),
        "public_key": hex::encode(key.public.to_bytes()),
    }))
}

fn blind_input(
    config: &CliConfig,
    input: &[u8],
) -> anyhow::Result<(BlindingFactor, BlindedElement)> {
    let suite = config.suite()?;
    let blinded = if config.blinding.constant_time {
        suite.blind_constant_time(input, config.padding()?, &mut OsRng)?
    } else {
        suite.blind(input, &mut OsRng)?
    };
    Ok(blinded)
}

/// Client: blind an input.
pub fn blind(config: &CliConfig, input: &[u8]) -> anyhow::Result<serde_json::Value> {
    let (blind, blinded) = blind_input(config, input)?;
    Ok(json!({
        "blind": hex::encode(blind.to_bytes()),
        "blinded_element": hex::encode(blinded.to_bytes()),
    }))
}

/// Server: evaluate a blinded element.
pub fn evaluate(private_key_hex: &str, blinded_hex: &str) -> anyhow::Result<serde_json::Value> {
    let private: PrivateKey = PrivateKey::from_bytes(&decode_hex("private key", private_key_hex)?)?;
    let blinded: BlindedElement = BlindedElement::from_bytes(&decode_hex("blinded element", blinded_hex)?)?;
    let evaluated = veil_oprf::evaluate(&private, &blinded);
    Ok(json!({
        "evaluated_element": hex::encode(evaluated.to_bytes()),
    }))
}

/// Client: unblind an evaluated element.
pub fn finalize_output(blind_hex: &str, evaluated_hex: &str) -> anyhow::Result<serde_json::Value> {
    let blind: BlindingFactor = BlindingFactor::from_bytes(&decode_hex("blind", blind_hex)?)?;
    let evaluated: EvaluatedElement =
        EvaluatedElement::from_bytes(&decode_hex("evaluated element", evaluated_hex)?)?;
    let output = finalize(blind, &evaluated)?;
    Ok(json!({
        "output": output.to_hex(),
    }))
}

/// Run both sides locally with a fresh key pair.
pub fn run(config: &CliConfig, input: &[u8]) -> anyhow::Result<serde_json::Value> {
    let key: KeyPair = KeyPair::generate(&mut OsRng)?;
    let (blind, blinded) = blind_input(config, input)?;
    let evaluated = key.evaluate(&blinded);
    let output = finalize(blind, &evaluated)?;
    info!("completed local protocol run");
    Ok(json!({
        "public_key": hex::encode(key.public.to_bytes()),
        "blinded_element": hex::encode(blinded.to_bytes()),
        "evaluated_element": hex::encode(evaluated.to_bytes()),
        "output": output.to_hex(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(value: &serde_json::Value, name: &str) -> String {
        value[name].as_str().expect("string field").to_string()
    }

    #[test]
    fn test_keygen_fields() {
        let key = keygen().expect("keygen");
        assert_eq!(field(&key, "private_key").len(), 64);
        assert_eq!(field(&key, "public_key").len(), 64);
    }

    #[test]
    fn test_step_by_step_matches_direct() {
        let config = CliConfig::default();
        let key = keygen().expect("keygen");
        let blinded = blind(&config, b"password123").expect("blind");
        let evaluated = evaluate(
            &field(&key, "private_key"),
            &field(&blinded, "blinded_element"),
        )
        .expect("evaluate");
        let output = finalize_output(
            &field(&blinded, "blind"),
            &field(&evaluated, "evaluated_element"),
        )
        .expect("finalize");

        let private: PrivateKey =
            PrivateKey::from_bytes(&hex::decode(field(&key, "private_key")).expect("hex"))
                .expect("key");
        let direct = config
            .suite()
            .expect("suite")
            .evaluate_direct(&private, b"password123")
            .expect("direct");
        assert_eq!(field(&output, "output"), direct.to_hex());
    }

    #[test]
    fn test_variable_time_blinding() {
        let mut config = CliConfig::default();
        config.blinding.constant_time = false;
        let result = run(&config, b"").expect("run");
        assert_eq!(field(&result, "output").len(), 64);
    }

    #[test]
    fn test_run_reports_every_step() {
        let result = run(&CliConfig::default(), b"password123").expect("run");
        for name in ["public_key", "blinded_element", "evaluated_element", "output"] {
            assert_eq!(field(&result, name).len(), 64, "{name}");
        }
        let blinded = hex::decode(field(&result, "blinded_element")).expect("hex");
        assert!(BlindedElement::<veil_oprf::Ristretto255>::from_bytes(&blinded).is_ok());
        let evaluated = hex::decode(field(&result, "evaluated_element")).expect("hex");
        assert!(EvaluatedElement::<veil_oprf::Ristretto255>::from_bytes(&evaluated).is_ok());
    }

    #[test]
    fn test_run_rejects_bad_padding() {
        let mut config = CliConfig::default();
        config.blinding.min_padding_bucket = 0;
        assert!(run(&config, b"x").is_err());
        assert!(blind(&config, b"x").is_err());
    }

    #[test]
    fn test_binary_input_blinds() {
        let config = CliConfig::default();
        let input = decode_hex("input", "00ff80fe").expect("hex");
        assert_eq!(input, [0x00, 0xff, 0x80, 0xfe]);
        let result = blind(&config, &input).expect("blind");
        assert_eq!(field(&result, "blinded_element").len(), 64);
    }

    #[test]
    fn test_invalid_blinded_element_rejected() {
        let key = keygen().expect("keygen");
        let result = evaluate(&field(&key, "private_key"), &"00".repeat(32));
        assert!(result.is_err());
    }

    #[test]
    fn test_non_hex_rejected() {
        assert!(finalize_output("zz", "zz").is_err());
    }
}
