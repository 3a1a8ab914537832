/// Basic example: author a container, then describe it
///
/// Run with: cargo run --example basic
use aifm_rs::{Container, ContainerWriter, IntegrityDeclaration, TrackDescriber};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== aifm-rs Basic Example ===\n");

    println!("1. Creating container...");
    create_container()?;

    println!("\n2. Reading container...");
    read_container()?;

    println!("\n3. Describing track...");
    describe_track()?;

    println!("\n✓ Example complete!");
    Ok(())
}

fn create_container() -> Result<(), Box<dyn Error>> {
    let audio = b"RIFF....WAVEfmt example audio".repeat(64);
    let cover = b"\x89PNG example cover".to_vec();
    let lyrics = b"first verse\nsecond verse\n".to_vec();

    let mut integrity = IntegrityDeclaration::new();
    integrity.add_file("payload/track.wav", &audio);
    integrity.add_file("metadata/cover.png", &cover);
    integrity.add_file("metadata/lyrics.txt", &lyrics);

    let manifest = serde_json::json!({
        "creator": {"name": "Example Artist"},
        "origin": {"ai_platform": "Suno", "primary_url": "https://example.com/tracks/1"},
        "verification": {"tier": "declared"},
        "mode": "assisted",
        "integrity": integrity.to_value(),
    });

    let mut writer = ContainerWriter::create("example_basic.aifm")?;
    writer.add_manifest(&manifest)?;
    writer.add_member("payload/track.wav", &audio)?;
    writer.add_member("metadata/cover.png", &cover)?;
    writer.add_member("metadata/lyrics.txt", &lyrics)?;
    writer.finalize()?;
    println!("   ✓ Container created: example_basic.aifm");

    Ok(())
}

fn read_container() -> Result<(), Box<dyn Error>> {
    let mut container = Container::open("example_basic.aifm")?;

    println!("   Members:");
    for member in container.members() {
        println!("     - {}", member);
    }

    let lyrics = container.read_member("metadata/lyrics.txt")?;
    println!("\n   Lyrics:\n     {}", String::from_utf8_lossy(&lyrics).trim());

    Ok(())
}

fn describe_track() -> Result<(), Box<dyn Error>> {
    let track = TrackDescriber::default().describe(Path::new("example_basic.aifm"));

    println!("   Author:    {}", track.fields.author);
    println!("   AI system: {}", track.fields.ai_system);
    println!("   Tier:      {}", track.fields.tier);
    println!("   Mode:      {}", track.fields.mode);
    println!("   Origin:    {}", track.fields.origin_url);
    println!("   Verify:    {}", track.verify.status);

    Ok(())
}
