//! Media asset extraction.
//!
//! Assets under `word/media/` become data-URI strings in container-listing
//! order. Reading the entries is sequential (one archive cursor), but the
//! base64 encoding fans out over rayon; the returned order is preserved
//! either way because image rendering consumes the sequence strictly FIFO.

use std::io::{Read, Seek};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::debug;
use rayon::prelude::*;
use zip::ZipArchive;

use crate::error::{Error, Result};

const MEDIA_PREFIX: &str = "word/media/";

/// Extract every media asset as a data URI.
pub(crate) fn extract<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    parallel: bool,
) -> Result<Vec<String>> {
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if !name.starts_with(MEDIA_PREFIX) {
            continue;
        }
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|e| Error::MediaExtract(format!("{name}: {e}")))?;
        files.push((name, data));
    }

    if files.is_empty() {
        return Ok(Vec::new());
    }
    debug!("encoding {} media asset(s)", files.len());

    let uris = if parallel {
        files
            .par_iter()
            .map(|(name, data)| data_uri(name, data))
            .collect()
    } else {
        files.iter().map(|(name, data)| data_uri(name, data)).collect()
    };
    Ok(uris)
}

/// Build a `data:image/...;base64,...` URI from a file name and payload.
fn data_uri(name: &str, data: &[u8]) -> String {
    let ext = name.rsplit('.').next().unwrap_or_default().to_lowercase();
    let subtype = if ext == "jpg" {
        "jpeg".to_string()
    } else {
        ext
    };
    format!("data:image/{subtype};base64,{}", STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_png() {
        let uri = data_uri("word/media/image1.png", &[1, 2, 3]);
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_data_uri_jpg_maps_to_jpeg() {
        let uri = data_uri("word/media/foto.JPG", &[0xFF, 0xD8]);
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_data_uri_payload_is_base64() {
        let uri = data_uri("word/media/a.gif", b"GIF8");
        let payload = uri.rsplit(',').next().unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), b"GIF8");
    }
}
