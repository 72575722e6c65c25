use crate::chart::Chart;
use crate::kateri::frame::{read_frame, write_frame, Tag};
use crate::utils::error::{AeError, Result};
use flate2::read::GzDecoder;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

type Writer = Box<dyn AsyncWrite + Send + Unpin>;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// 等待回應中的請求
struct Pending {
    tag: Tag,
    responder: oneshot::Sender<Vec<u8>>,
}

struct Shared {
    writer: tokio::sync::Mutex<Option<Writer>>,
    pending: Mutex<VecDeque<Pending>>,
    next_id: AtomicU64,
    connected: watch::Sender<bool>,
}

/// 與 kateri 檢視器之間的連線；clone 後共用同一條連線
#[derive(Clone)]
pub struct Communicator {
    shared: Arc<Shared>,
}

impl Default for Communicator {
    fn default() -> Self {
        Self::new()
    }
}

impl Communicator {
    pub fn new() -> Self {
        let (connected, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                writer: tokio::sync::Mutex::new(None),
                pending: Mutex::new(VecDeque::new()),
                next_id: AtomicU64::new(1),
                connected,
            }),
        }
    }

    pub fn is_connected(&self) -> bool {
        *self.shared.connected.borrow()
    }

    pub async fn wait_connected(&self, timeout: Duration) -> Result<()> {
        let mut connected = self.shared.connected.subscribe();
        let in_time = matches!(
            tokio::time::timeout(timeout, connected.wait_for(|connected| *connected)).await,
            Ok(Ok(_))
        );
        if in_time {
            Ok(())
        } else {
            Err(AeError::NotConnected)
        }
    }

    pub async fn attach<W>(&self, writer: W)
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        *self.shared.writer.lock().await = Some(Box::new(writer));
        self.shared.connected.send_replace(true);
        debug!("🔌 kateri connected");
    }

    /// 斷線後所有等待中的請求都會收到 NotConnected
    pub async fn detach(&self) {
        *self.shared.writer.lock().await = None;
        self.shared.connected.send_replace(false);
        self.pending().clear();
    }

    /// 讀取迴圈：處理對方送來的訊框直到 QUIT 或連線關閉
    pub async fn serve<R>(&self, mut reader: R) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let outcome = loop {
            match read_frame(&mut reader).await {
                Ok(None) => break Ok(()),
                Ok(Some(frame)) => match frame.tag {
                    Tag::Quit => break Ok(()),
                    Tag::Helo => debug!("👋 kateri: HELO"),
                    Tag::Comd => warn!("⚠️ kateri: unexpected COMD ({} bytes)", frame.payload.len()),
                    tag => self.resolve(tag, frame.payload),
                },
                Err(e) => break Err(e),
            }
        };
        info!("👋 kateri: quit");
        self.detach().await;
        outcome
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, VecDeque<Pending>> {
        self.shared.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 回應交給最早登記、標籤相同的請求
    fn resolve(&self, tag: Tag, payload: Vec<u8>) {
        let mut pending = self.pending();
        pending.retain(|request| !request.responder.is_closed());
        match pending.iter().position(|request| request.tag == tag) {
            Some(position) => {
                if let Some(request) = pending.remove(position) {
                    debug!("📨 kateri: {} {} bytes", tag, payload.len());
                    let _ = request.responder.send(payload);
                }
            }
            None => warn!("⚠️ kateri: unexpected {} ({} bytes)", tag, payload.len()),
        }
    }

    /// 登記一個等待 tag 的請求
    pub fn expect(&self, tag: Tag) -> oneshot::Receiver<Vec<u8>> {
        let (responder, receiver) = oneshot::channel();
        self.pending().push_back(Pending { tag, responder });
        receiver
    }

    pub async fn send(&self, tag: Tag, payload: &[u8]) -> Result<()> {
        let mut writer = self.shared.writer.lock().await;
        let writer = writer.as_mut().ok_or(AeError::NotConnected)?;
        write_frame(&mut **writer, tag, payload).await
    }

    /// 送出 COMD，回傳注入的 `_id`
    pub async fn send_command(&self, mut command: Value) -> Result<u64> {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        match command.as_object_mut() {
            Some(object) => {
                object.insert("_id".to_string(), Value::from(id));
            }
            None => {
                return Err(AeError::ProtocolError {
                    message: format!("command must be a JSON object: {}", command),
                })
            }
        }
        self.send(Tag::Comd, serde_json::to_string(&command)?.as_bytes()).await?;
        Ok(id)
    }

    async fn request(&self, tag: Tag, command: Value) -> Result<Vec<u8>> {
        let response = self.expect(tag);
        self.send_command(command).await?;
        response.await.map_err(|_| AeError::NotConnected)
    }

    pub async fn send_chart(&self, chart: &Chart) -> Result<()> {
        self.send(Tag::Chrt, chart.to_json_string()?.as_bytes()).await
    }

    pub async fn set_style(&self, style: &str) -> Result<()> {
        self.send_command(json!({"C": "set_style", "style": style})).await?;
        Ok(())
    }

    /// 要求檢視器輸出 PDF 並寫入 filename；open 時以系統預設程式開啟
    pub async fn pdf(&self, filename: &Path, style: Option<&str>, width: f64, open: bool) -> Result<PathBuf> {
        if let Some(style) = style {
            self.set_style(style).await?;
        }
        let data = self.request(Tag::Pdfb, json!({"C": "pdf", "width": width})).await?;
        info!("📄 kateri: writing pdf to {}", filename.display());
        tokio::fs::write(filename, &data).await?;
        if open {
            let status = tokio::process::Command::new("open").arg(filename).status().await?;
            if !status.success() {
                warn!("⚠️ open {} failed: {}", filename.display(), status);
            }
        }
        Ok(filename.to_path_buf())
    }

    pub async fn get_chart(&self) -> Result<Chart> {
        let data = self.request(Tag::Chrt, json!({"C": "get_chart"})).await?;
        Chart::from_json_str(&decode_chart(data)?)
    }

    pub async fn get_viewport(&self) -> Result<Value> {
        let data = self.request(Tag::Json, json!({"C": "get_viewport"})).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// 舊版 ace 格式的圖表內容
    pub async fn export_to_legacy(&self) -> Result<String> {
        let data = self.request(Tag::Chrt, json!({"C": "export_to_legacy"})).await?;
        decode_chart(data)
    }

    pub async fn quit(&self) -> Result<()> {
        self.send_command(json!({"C": "quit"})).await?;
        Ok(())
    }
}

/// 圖表可能以 gzip 壓縮傳送
fn decode_chart(data: Vec<u8>) -> Result<String> {
    let data = if data.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::new();
        GzDecoder::new(data.as_slice()).read_to_end(&mut decoded)?;
        decoded
    } else {
        data
    };
    String::from_utf8(data).map_err(|e| AeError::ProtocolError {
        message: format!("chart is not UTF-8: {}", e),
    })
}
