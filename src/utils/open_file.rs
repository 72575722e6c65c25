use crate::utils::error::{AeError, Result};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];
const BZIP2_MAGIC: &[u8] = b"BZh";

/// 依檔頭判斷壓縮格式並開啟檔案 (gzip 或純文字)
pub fn for_reading(path: &Path) -> Result<Box<dyn BufRead>> {
    let mut reader = BufReader::new(File::open(path)?);
    let head = reader.fill_buf()?.to_vec();

    if head.starts_with(GZIP_MAGIC) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else if head.starts_with(XZ_MAGIC) || head.starts_with(BZIP2_MAGIC) {
        Err(AeError::ProcessingError {
            message: format!(
                "{}: xz/bzip2 compressed input is not supported, decompress it first",
                path.display()
            ),
        })
    } else {
        Ok(Box::new(reader))
    }
}

pub fn read_to_string(path: &Path) -> Result<String> {
    let mut text = String::new();
    for_reading(path)?.read_to_string(&mut text)?;
    Ok(text)
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    for_reading(path)?.read_to_end(&mut data)?;
    Ok(data)
}

/// "-" 代表 stdout，副檔名 .gz 則以 gzip 寫出
pub fn for_writing(path: &Path) -> Result<Box<dyn Write>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(std::io::stdout()));
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(GzEncoder::new(file, Compression::default())))
    } else {
        Ok(Box::new(file))
    }
}

pub fn write_string(path: &Path, text: &str) -> Result<()> {
    let mut output = for_writing(path)?;
    output.write_all(text.as_bytes())?;
    output.flush()?;
    Ok(())
}
