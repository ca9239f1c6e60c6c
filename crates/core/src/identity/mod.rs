//! Binary identity extraction.
//!
//! A library build is identified by its GNU build-id note. Extraction never
//! fails loudly: a file that cannot be read, is not ELF, or carries no
//! build-id simply has no identity.

use std::fs;
use std::path::Path;

use goblin::elf::note::NT_GNU_BUILD_ID;
use goblin::elf::Elf;
use tracing::debug;

use crate::model::BuildId;

const BUILD_ID_SECTION: &str = ".note.gnu.build-id";
const GNU_NOTE_NAME: &str = "GNU";

/// Produces the build identity of a file, if it has one.
pub trait IdentityExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Option<BuildId>;
}

/// Reads the `NT_GNU_BUILD_ID` note out of an ELF image with goblin.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElfBuildIdExtractor;

impl IdentityExtractor for ElfBuildIdExtractor {
    fn extract(&self, path: &Path) -> Option<BuildId> {
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot read file for build-id");
                return None;
            }
        };
        build_id_from_bytes(&bytes)
    }
}

/// Extract a build-id from an in-memory ELF image.
///
/// Section headers are consulted first, then program-header notes (stripped
/// images may have dropped their section table).
pub fn build_id_from_bytes(bytes: &[u8]) -> Option<BuildId> {
    let elf = match Elf::parse(bytes) {
        Ok(elf) => elf,
        Err(e) => {
            debug!(error = %e, "not an ELF image");
            return None;
        }
    };

    if let Some(notes) = elf.iter_note_sections(bytes, Some(BUILD_ID_SECTION)) {
        if let Some(id) = first_build_id(notes) {
            return Some(id);
        }
    }
    elf.iter_note_headers(bytes).and_then(first_build_id)
}

fn first_build_id<'a, I>(notes: I) -> Option<BuildId>
where
    I: Iterator<Item = goblin::error::Result<goblin::elf::note::Note<'a>>>,
{
    notes
        .filter_map(Result::ok)
        .filter(|note| {
            note.n_type == NT_GNU_BUILD_ID && note.name.trim_end_matches('\0') == GNU_NOTE_NAME
        })
        .find_map(|note| BuildId::from_digest(note.desc))
}
