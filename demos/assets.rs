/// Asset resolution example: inconsistent file names
///
/// Run with: cargo run --example assets
use aifm_rs::{AssetKind, Container, ContainerWriter};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== aifm-rs Asset Resolution Example ===\n");

    let mut writer = ContainerWriter::create("example_assets.aifm")?;
    writer.add_member("manifest.json", b"{}")?;
    writer.add_member("metadata/Front Art.JPG", b"jpeg bytes")?;
    writer.add_member("metadata/notes.txt", b"misc notes")?;
    writer.add_member("metadata/Legal Statement.pdf", b"%PDF-1.7")?;
    writer.add_member("metadata/udio_instructions.txt", b"lofi beat, rain")?;
    writer.add_member("metadata/song_words.txt", b"verse one")?;
    writer.finalize()?;

    let container = Container::open("example_assets.aifm")?;
    for kind in AssetKind::ALL {
        let asset = aifm_rs::assets::resolve(&container, kind);
        match &asset.member {
            Some(member) => println!("{:<12} -> {} ({})", kind, member, asset.extension),
            None => println!("{:<12} -> (none)", kind),
        }
    }

    Ok(())
}
