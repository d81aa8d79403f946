use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use common::model::file::{Batch, IngestedFile};
use common::requests::BatchMeta;
use futures_util::StreamExt;
use log::{info, warn};
use serde::Serialize;
use serde_json::from_slice;
use std::fs::File;
use std::io::{BufWriter, Write};
use uuid::Uuid;

use crate::config::Config;
use crate::session::SessionState;
use crate::workflow::state::WorkflowState;

#[derive(Serialize)]
pub struct BatchSummary {
    pub batch_id: Uuid,
    pub file_count: usize,
}

/// HTTP handler wrapper that converts the internal result to an
/// `HttpResponse`.
pub async fn process(
    payload: Multipart,
    config: web::Data<Config>,
    sessions: web::Data<SessionState>,
    workflow: web::Data<WorkflowState>,
) -> impl Responder {
    if sessions.current().await.is_none() {
        return HttpResponse::Unauthorized().body("Sign in to upload a batch");
    }
    match ingest_batch(payload, &config, &workflow).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => HttpResponse::BadRequest().body(format!("Error: {}", e)),
    }
}

/// Streams a multipart batch to the spool directory and installs it as the
/// active batch, replacing any previous one. The `json` metadata part must
/// arrive before the file parts so every file knows its modality.
async fn ingest_batch(
    mut payload: Multipart,
    config: &Config,
    workflow: &WorkflowState,
) -> Result<BatchSummary, Box<dyn std::error::Error>> {
    let batch_id = Uuid::new_v4();
    let spool_dir = config.spool_dir.join(batch_id.to_string());
    let mut meta: Option<BatchMeta> = None;
    let mut files: Vec<IngestedFile> = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let part_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match part_name.as_deref() {
            Some("json") => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    bytes.extend_from_slice(&chunk?);
                }
                meta = Some(from_slice(&bytes)?);
            }

            Some("file") => {
                let Some(meta) = meta.as_ref() else {
                    return Err("Batch metadata JSON must be sent before the files".into());
                };
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                if filename.is_empty() {
                    return Err("File part is missing a filename".into());
                }

                std::fs::create_dir_all(&spool_dir)?;
                let file_id = Uuid::new_v4();
                let spool_path = spool_dir.join(file_id.to_string());
                let mut size: u64 = 0;
                {
                    let mut writer = BufWriter::new(File::create(&spool_path)?);
                    while let Some(chunk) = field.next().await {
                        let chunk = chunk?;
                        size += chunk.len() as u64;
                        writer.write_all(&chunk)?;
                    }
                    writer.flush()?;
                }

                let mime_type = mime_guess::from_path(&filename)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string();
                files.push(IngestedFile {
                    id: file_id,
                    last_modified: meta.last_modified.get(&filename).copied(),
                    name: filename,
                    size,
                    mime_type,
                    modality: meta.modality,
                    clinical_note: None,
                    spool_path,
                });
            }

            _ => {}
        }
    }

    let meta = meta.ok_or("Missing batch metadata")?;
    let file_count = files.len();
    if file_count == 0 {
        warn!("ingesting an empty batch; classification will produce empty buckets");
    }

    let batch = Batch {
        id: batch_id,
        modality: meta.modality,
        spool_dir,
        files,
    };
    workflow
        .begin_batch(batch, config.stage_delay_ms, config.classify_delay_ms)
        .await;
    info!("ingested batch {} with {} file(s)", batch_id, file_count);

    Ok(BatchSummary {
        batch_id,
        file_count,
    })
}
