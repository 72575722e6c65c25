use ae_tools::chart::Chart;
use ae_tools::kateri::frame::{read_frame, write_frame};
use ae_tools::kateri::{Communicator, SocketServer, Tag};
use serde_json::Value;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::UnixStream;

const ACE: &str = r#"{"c": {"i": {"V": "B", "l": "VIDRL"}, "a": [{"N": "B/AUSTRIA/1359417/2021"}], "s": []}}"#;

/// 模擬檢視器：回應 get_chart 與 export_to_legacy，收到 quit 時送出 QUIT
async fn fake_viewer(mut stream: UnixStream) -> Vec<String> {
    let mut commands = Vec::new();
    write_frame(&mut stream, Tag::Helo, &[]).await.unwrap();
    let mut chart = Vec::new();
    while let Some(frame) = read_frame(&mut stream).await.unwrap() {
        match frame.tag {
            Tag::Chrt => chart = frame.payload,
            Tag::Comd => {
                let command: Value = serde_json::from_slice(&frame.payload).unwrap();
                let name = command["C"].as_str().unwrap_or_default().to_string();
                commands.push(name.clone());
                match name.as_str() {
                    "get_chart" | "export_to_legacy" => write_frame(&mut stream, Tag::Chrt, &chart).await.unwrap(),
                    "quit" => {
                        write_frame(&mut stream, Tag::Quit, &[]).await.unwrap();
                        break;
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }
    commands
}

#[tokio::test]
async fn test_viewer_session() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let socket = dir.path().join("ae-kateri.socket");
    let server = SocketServer::bind(&socket)?;
    let communicator = Communicator::new();
    let serving = tokio::spawn(server.serve(communicator.clone()));
    let viewer = tokio::spawn(fake_viewer(UnixStream::connect(&socket).await?));
    communicator.wait_connected(Duration::from_secs(5)).await?;

    let chart = Chart::from_json_str(ACE)?;
    communicator.send_chart(&chart).await?;
    communicator.set_style("-pale").await?;
    let back = communicator.get_chart().await?;
    assert_eq!(back.antigens()[0].name, "B/AUSTRIA/1359417/2021");
    let legacy = communicator.export_to_legacy().await?;
    assert!(legacy.contains("VIDRL"));
    communicator.quit().await?;

    assert_eq!(viewer.await?, vec!["set_style", "get_chart", "export_to_legacy", "quit"]);
    serving.await??;
    assert!(!communicator.is_connected());
    Ok(())
}
