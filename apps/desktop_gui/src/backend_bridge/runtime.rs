//! Backend worker: a dedicated thread running the REST client on a tokio
//! runtime, fed by the UI command queue.

use std::thread;

use client_core::DocChatClient;
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub server_url: String,
}

/// Spawn the worker thread. Commands run sequentially; the UI's own
/// `is_uploading`/`is_typing` flags already guarantee at most one upload
/// and one chat turn in flight. Delayed status polls are fire-and-forget
/// tasks, so they never block the command loop.
pub fn launch(config: WorkerConfig, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::WorkerStartupFailed(format!(
                    "failed to build backend worker runtime: {err}"
                )));
                return;
            }
        };

        runtime.block_on(async move {
            let client = DocChatClient::new(config.server_url);
            let _ = ui_tx.try_send(UiEvent::WorkerReady);

            while let Ok(cmd) = cmd_rx.recv() {
                debug!(command = cmd.name(), "processing ui->backend command");
                match cmd {
                    BackendCommand::UploadDocuments { files } => {
                        let result = client.upload_documents(&files).await;
                        let _ = ui_tx.try_send(UiEvent::UploadFinished(result));
                    }
                    BackendCommand::SendChat { request } => {
                        let result = client.send_chat(&request).await;
                        let _ = ui_tx.try_send(UiEvent::ChatFinished(result));
                    }
                    BackendCommand::FetchStatus { delay } => {
                        let client = client.clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            if let Some(delay) = delay {
                                tokio::time::sleep(delay).await;
                            }
                            match client.fetch_status().await {
                                Ok(status) => {
                                    let _ = ui_tx.try_send(UiEvent::StatusUpdated(status));
                                }
                                // Status display stays stale on failure; the
                                // event only resolves the startup splash.
                                Err(err) => {
                                    warn!("status poll failed: {err}");
                                    let _ = ui_tx.try_send(UiEvent::StatusUnavailable);
                                }
                            }
                        });
                    }
                    BackendCommand::ClearDocuments => {
                        let result = client.clear_documents().await;
                        let _ = ui_tx.try_send(UiEvent::DocumentsCleared(result));
                    }
                }
            }
        });
    });
}
