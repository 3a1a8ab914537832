/// Verification example: intact, manifest-warn and tampered containers
///
/// Run with: cargo run --example verify
use aifm_rs::manifest::sha256_hex;
use aifm_rs::{ContainerWriter, IntegrityDeclaration, VerificationEngine};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== aifm-rs Verification Example ===\n");

    let audio = b"ID3 example audio".repeat(32);

    // Declared digests match
    let mut integrity = IntegrityDeclaration::new();
    integrity.add_file("payload/track.mp3", &audio);
    write("example_intact.aifm", integrity.to_value(), &audio)?;

    // The manifest's own recorded hash has drifted
    let mut drifted = integrity.to_value();
    drifted["hashed_files"]["manifest.json"] =
        serde_json::json!({"sha256": sha256_hex(b"previous manifest")});
    write("example_warn.aifm", drifted, &audio)?;

    // The payload no longer matches its declaration
    let mut tampered = audio.clone();
    tampered[0] = b'X';
    write("example_tampered.aifm", integrity.to_value(), &tampered)?;

    let engine = VerificationEngine::builtin();
    for name in ["example_intact.aifm", "example_warn.aifm", "example_tampered.aifm"] {
        let outcome = engine.verify(Path::new(name));
        println!("{}: {}", name, outcome.status);
        for check in &outcome.details {
            let state = if check.ok { "OK" } else { "FAIL" };
            if check.reason.is_empty() {
                println!("   [{}] {}", state, check.path);
            } else {
                println!("   [{}] {} ({})", state, check.path, check.reason);
            }
        }
    }

    Ok(())
}

fn write(path: &str, integrity: serde_json::Value, audio: &[u8]) -> Result<(), Box<dyn Error>> {
    let mut writer = ContainerWriter::create(path)?;
    writer.add_manifest(&serde_json::json!({"integrity": integrity}))?;
    writer.add_member("payload/track.mp3", audio)?;
    writer.finalize()?;
    Ok(())
}
