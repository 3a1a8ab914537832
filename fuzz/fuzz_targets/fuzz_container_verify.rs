#![no_main]

use aifm_rs::{assets, AssetKind, Container, Manifest, TrackFields, VerificationEngine};
use libfuzzer_sys::fuzz_target;
use std::io::{Cursor, Write};
use tempfile::NamedTempFile;

fuzz_target!(|data: &[u8]| {
    // Skip inputs smaller than an end-of-central-directory record
    if data.len() < 22 {
        return;
    }

    // In-memory path: open, resolve, parse, verify - should never panic
    if let Ok(mut container) = Container::from_reader(Cursor::new(data)).map(|c| c.with_member_limit(1 << 20)) {
        for kind in AssetKind::ALL {
            let _ = assets::resolve(&container, kind);
        }

        let manifest = Manifest::from_container(&mut container);
        let _ = TrackFields::from_manifest(&manifest, "-");

        let members: Vec<String> = container.members().to_vec();
        for member in &members {
            let _ = container.read_member(member);
        }

        let _ = VerificationEngine::builtin().verify_builtin(&mut container);
    }

    // On-disk path through the engine - must always produce an outcome
    let mut temp_file = match NamedTempFile::new() {
        Ok(f) => f,
        Err(_) => return,
    };
    if temp_file.write_all(data).is_err() || temp_file.flush().is_err() {
        return;
    }
    let _ = VerificationEngine::builtin().verify(temp_file.path());
});
