//! Generate seed corpus for fuzzing

use aifm_rs::{ContainerWriter, IntegrityDeclaration};
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let corpus_dir = "fuzz/corpus/fuzz_container_verify";
    fs::create_dir_all(corpus_dir)?;

    println!("Generating seed corpus...");

    // Seed 1: Empty container (no members)
    {
        let path = format!("{}/seed_empty.aifm", corpus_dir);
        let writer = ContainerWriter::create(&path)?;
        writer.finalize()?;
        println!("✓ Generated: {}", path);
    }

    // Seed 2: Manifest only, no integrity block
    {
        let path = format!("{}/seed_manifest_only.aifm", corpus_dir);
        let mut writer = ContainerWriter::create(&path)?;
        writer.add_manifest(&serde_json::json!({"author": "seed"}))?;
        writer.finalize()?;
        println!("✓ Generated: {}", path);
    }

    // Seed 3: Intact container with assets
    {
        let path = format!("{}/seed_intact.aifm", corpus_dir);
        let audio = b"RIFF seed audio".repeat(16);
        let mut integrity = IntegrityDeclaration::new();
        integrity.add_file("payload/track.wav", &audio);

        let mut writer = ContainerWriter::create(&path)?;
        writer.add_manifest(&serde_json::json!({"integrity": integrity.to_value()}))?;
        writer.add_member("payload/track.wav", &audio)?;
        writer.add_member("metadata/cover.png", b"png")?;
        writer.add_member("metadata/lyrics.txt", b"words")?;
        writer.finalize()?;
        println!("✓ Generated: {}", path);
    }

    println!("\nSeed corpus generated in {}", corpus_dir);
    Ok(())
}
