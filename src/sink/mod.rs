//! Stdout presentation sink
//!
//! Reference consumer for the tracker's line-change channel: one printed line
//! per distinct change. An overlay window would subscribe the same way.

use tokio::sync::mpsc;

pub async fn run(mut rx: mpsc::Receiver<String>) {
    while let Some(line) = rx.recv().await {
        println!("{line}");
    }
}
