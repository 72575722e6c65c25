// kateri 檢視器的 IPC：訊框、請求與回應的對應、程序與 socket 的管理

pub mod communicator;
pub mod frame;
pub mod task;

pub use communicator::Communicator;
pub use frame::{Frame, Tag};
pub use task::{SocketServer, ViewerTask, KATERI_EXE};

use crate::utils::error::{AeError, Result};
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 一次檢視器工作階段：socket 伺服器、檢視器程序與共用的 Communicator
pub struct Kateri {
    communicator: Communicator,
    viewer: ViewerTask,
    server: JoinHandle<Result<()>>,
}

impl Kateri {
    /// 啟動檢視器並等待它連上 socket
    pub async fn start(executable: &str, socket: &Path, connect_timeout: Duration) -> Result<Self> {
        let communicator = Communicator::new();
        let server = SocketServer::bind(socket)?;
        let server = tokio::spawn(server.serve(communicator.clone()));
        let mut viewer = ViewerTask::new(executable);
        if let Err(e) = viewer.start(socket) {
            server.abort();
            return Err(e);
        }
        if let Err(e) = communicator.wait_connected(connect_timeout).await {
            error!("❌ kateri did not connect within {:?}", connect_timeout);
            server.abort();
            viewer.terminate().await?;
            return Err(e);
        }
        info!("✅ kateri ready");
        Ok(Self {
            communicator,
            viewer,
            server,
        })
    }

    pub fn communicator(&self) -> &Communicator {
        &self.communicator
    }

    /// 送出 quit 並等待檢視器與伺服器結束
    pub async fn shutdown(self) -> Result<()> {
        if self.communicator.is_connected() {
            self.communicator.quit().await?;
        }
        self.wait().await
    }

    /// 等待使用者關閉檢視器
    pub async fn wait(mut self) -> Result<()> {
        self.viewer.wait().await?;
        match self.server.await {
            Ok(outcome) => outcome,
            Err(e) => Err(AeError::ProtocolError {
                message: format!("socket server task failed: {}", e),
            }),
        }
    }
}
