use crate::utils::error::{AeError, Result};
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// 訊框標籤：4 個 ASCII 字元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Helo,
    Comd,
    Chrt,
    Pdfb,
    Json,
    Quit,
}

impl Tag {
    pub fn as_bytes(self) -> &'static [u8; 4] {
        match self {
            Tag::Helo => b"HELO",
            Tag::Comd => b"COMD",
            Tag::Chrt => b"CHRT",
            Tag::Pdfb => b"PDFB",
            Tag::Json => b"JSON",
            Tag::Quit => b"QUIT",
        }
    }

    pub fn from_bytes(bytes: &[u8; 4]) -> Option<Self> {
        match bytes {
            b"HELO" => Some(Tag::Helo),
            b"COMD" => Some(Tag::Comd),
            b"CHRT" => Some(Tag::Chrt),
            b"PDFB" => Some(Tag::Pdfb),
            b"JSON" => Some(Tag::Json),
            b"QUIT" => Some(Tag::Quit),
            _ => None,
        }
    }

    /// HELO 與 QUIT 之後沒有長度與內容
    pub fn has_payload(self) -> bool {
        !matches!(self, Tag::Helo | Tag::Quit)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub tag: Tag,
    pub payload: Vec<u8>,
}

/// 補齊到 4 的倍數所需的位元組數
pub fn padding(payload_length: usize) -> usize {
    (4 - payload_length % 4) % 4
}

pub fn encode(tag: Tag, payload: &[u8]) -> Result<Vec<u8>> {
    if !tag.has_payload() {
        return Ok(tag.as_bytes().to_vec());
    }
    let length = u32::try_from(payload.len()).map_err(|_| AeError::ProtocolError {
        message: format!("{} payload too large: {} bytes", tag, payload.len()),
    })?;
    let mut data = Vec::with_capacity(8 + payload.len() + 3);
    data.extend_from_slice(tag.as_bytes());
    data.extend_from_slice(&length.to_le_bytes());
    data.extend_from_slice(payload);
    data.resize(data.len() + padding(payload.len()), 0);
    Ok(data)
}

pub async fn write_frame<W>(writer: &mut W, tag: Tag, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_all(&encode(tag, payload)?).await?;
    writer.flush().await?;
    Ok(())
}

/// 讀取下一個訊框；對方關閉連線時回傳 None
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Frame>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut tag_bytes = [0u8; 4];
    if !read_exact_or_eof(reader, &mut tag_bytes).await? {
        return Ok(None);
    }
    let tag = Tag::from_bytes(&tag_bytes).ok_or_else(|| AeError::ProtocolError {
        message: format!("unrecognized tag \"{}\"", String::from_utf8_lossy(&tag_bytes)),
    })?;
    if !tag.has_payload() {
        return Ok(Some(Frame { tag, payload: Vec::new() }));
    }

    let mut length_bytes = [0u8; 4];
    reader.read_exact(&mut length_bytes).await?;
    let length = u32::from_le_bytes(length_bytes) as usize;
    let mut payload = vec![0u8; length + padding(length)];
    reader.read_exact(&mut payload).await?;
    payload.truncate(length);
    Ok(Some(Frame { tag, payload }))
}

/// 一開始就讀到 EOF 時回傳 false，讀到一半才 EOF 則為錯誤
async fn read_exact_or_eof<R>(reader: &mut R, buffer: &mut [u8]) -> Result<bool>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buffer.len() {
        let read = reader.read(&mut buffer[filled..]).await?;
        if read == 0 {
            if filled == 0 {
                return Ok(false);
            }
            return Err(AeError::ProtocolError {
                message: format!("connection closed after {} of {} bytes", filled, buffer.len()),
            });
        }
        filled += read;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pads_to_four_bytes() {
        let data = encode(Tag::Comd, b"{\"C\":1}").unwrap();
        assert_eq!(&data[..4], b"COMD");
        assert_eq!(&data[4..8], &7u32.to_le_bytes());
        assert_eq!(data.len(), 8 + 8);
        assert_eq!(data[15], 0);

        let aligned = encode(Tag::Json, b"1234").unwrap();
        assert_eq!(aligned.len(), 12);
        assert_eq!(encode(Tag::Quit, b"ignored").unwrap(), b"QUIT");
        assert_eq!(padding(0), 0);
        assert_eq!(padding(5), 3);
    }

    #[tokio::test]
    async fn test_read_frames() {
        let (mut client, mut server) = tokio::io::duplex(256);
        write_frame(&mut client, Tag::Helo, &[]).await.unwrap();
        client.write_all(b"HELO").await.unwrap();
        write_frame(&mut client, Tag::Pdfb, b"%PDF-").await.unwrap();
        drop(client);

        assert_eq!(read_frame(&mut server).await.unwrap().unwrap().tag, Tag::Helo);
        assert_eq!(read_frame(&mut server).await.unwrap().unwrap().tag, Tag::Helo);
        let pdf = read_frame(&mut server).await.unwrap().unwrap();
        assert_eq!(pdf.tag, Tag::Pdfb);
        assert_eq!(pdf.payload, b"%PDF-");
        assert!(read_frame(&mut server).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_tag_is_protocol_error() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(b"XXXX").await.unwrap();
        let error = read_frame(&mut server).await.unwrap_err();
        assert!(matches!(error, AeError::ProtocolError { .. }));
    }
}
