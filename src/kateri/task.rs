use crate::kateri::communicator::Communicator;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tokio::net::UnixListener;
use tokio::process::{Child, Command};
use tracing::{info, warn};

pub const KATERI_EXE: &str = "kateri";

/// 啟動並監看 kateri 檢視器程序
pub struct ViewerTask {
    executable: String,
    child: Option<Child>,
}

impl ViewerTask {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            child: None,
        }
    }

    pub fn start(&mut self, socket: &Path) -> Result<()> {
        let child = Command::new(&self.executable)
            .arg("--socket")
            .arg(socket)
            .kill_on_drop(true)
            .spawn()?;
        info!("🚀 [Kateri] started {} pid: {:?}", self.executable, child.id());
        self.child = Some(child);
        Ok(())
    }

    pub fn running(&self) -> bool {
        self.child.is_some()
    }

    /// 等待檢視器結束
    pub async fn wait(&mut self) -> Result<Option<ExitStatus>> {
        let Some(child) = self.child.as_mut() else {
            return Ok(None);
        };
        let status = child.wait().await?;
        info!("🏁 [Kateri] finished with {}", status);
        self.child = None;
        Ok(Some(status))
    }

    pub async fn terminate(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            child.kill().await?;
            warn!("🛑 [Kateri] terminated");
        }
        Ok(())
    }
}

/// Unix socket 伺服器：接受檢視器的連線並執行讀取迴圈
pub struct SocketServer {
    path: PathBuf,
    listener: UnixListener,
}

impl SocketServer {
    /// 殘留的 socket 檔案會先刪除
    pub fn bind(path: &Path) -> Result<Self> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        let listener = UnixListener::bind(path)?;
        info!("🔌 [server-for-kateri] pid: {} socket: {}", std::process::id(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            listener,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 只接受一個連線，連線結束後移除 socket 檔案
    pub async fn serve(self, communicator: Communicator) -> Result<()> {
        let (stream, _) = self.listener.accept().await?;
        let (reader, writer) = stream.into_split();
        communicator.attach(writer).await;
        let outcome = communicator.serve(reader).await;
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("⚠️ cannot remove {}: {}", self.path.display(), e);
        }
        info!("🏁 [server-for-kateri] completed");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kateri::frame::{read_frame, write_frame, Tag};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::net::UnixStream;

    #[tokio::test]
    async fn test_socket_server_round_trip() {
        let dir = TempDir::new().unwrap();
        let socket = dir.path().join("kateri.socket");
        let server = SocketServer::bind(&socket).unwrap();
        let communicator = Communicator::new();
        let serving = tokio::spawn(server.serve(communicator.clone()));

        let mut viewer = UnixStream::connect(&socket).await.unwrap();
        write_frame(&mut viewer, Tag::Helo, &[]).await.unwrap();
        communicator.wait_connected(Duration::from_secs(5)).await.unwrap();

        let viewport = communicator.clone();
        let request = tokio::spawn(async move { viewport.get_viewport().await });
        let command = read_frame(&mut viewer).await.unwrap().unwrap();
        assert_eq!(command.tag, Tag::Comd);
        write_frame(&mut viewer, Tag::Json, br#"{"viewport": [0, 0, 10]}"#).await.unwrap();
        let viewport = request.await.unwrap().unwrap();
        assert_eq!(viewport["viewport"][2], 10);

        write_frame(&mut viewer, Tag::Quit, &[]).await.unwrap();
        serving.await.unwrap().unwrap();
        assert!(!communicator.is_connected());
        assert!(!socket.exists());
    }

    #[tokio::test]
    async fn test_viewer_task_missing_executable() {
        let mut task = ViewerTask::new("kateri-does-not-exist-here");
        assert!(task.start(Path::new("/tmp/none.socket")).is_err());
        assert!(!task.running());
        assert!(task.wait().await.unwrap().is_none());
    }
}
