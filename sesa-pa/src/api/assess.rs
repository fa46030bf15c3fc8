//! Assessment submission endpoint
//!
//! POST /assess runs the full pipeline synchronously and returns the
//! persisted record. The request names exactly one audio source: an
//! uploaded file (base64), a video URL, or a drive share link.

use crate::models::TaskType;
use crate::services::{AssessmentRequest, AudioSource};
use crate::{ApiError, ApiResult, AppState};
use axum::{extract::State, routing::post, Json, Router};
use base64::Engine;
use serde::Deserialize;

pub fn assessment_routes() -> Router<AppState> {
    Router::new().route("/assess", post(submit_assessment))
}

#[derive(Debug, Deserialize)]
pub struct AssessRequest {
    pub student_id: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub class_group: String,
    /// UI task label; 音読課題 selects the reading weight vector
    #[serde(default)]
    pub task_type: String,
    #[serde(default)]
    pub task_name: String,
    #[serde(default)]
    pub target_text: String,
    #[serde(default)]
    pub upload: Option<UploadPayload>,
    #[serde(default)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub gdrive_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadPayload {
    pub filename: String,
    /// Base64-encoded audio bytes
    pub data_base64: String,
}

impl AssessRequest {
    fn into_parts(self) -> ApiResult<(AssessmentRequest, AudioSource)> {
        let student_id = self.student_id.trim().to_string();
        if student_id.is_empty() {
            return Err(ApiError::BadRequest("学籍番号を入力してください".to_string()));
        }

        let source_count = self.upload.is_some() as usize
            + self.youtube_url.is_some() as usize
            + self.gdrive_url.is_some() as usize;
        if source_count != 1 {
            return Err(ApiError::BadRequest(
                "音声ソースを1つだけ指定してください (upload / youtube_url / gdrive_url)".to_string(),
            ));
        }

        let source = if let Some(upload) = self.upload {
            let data = base64::engine::general_purpose::STANDARD
                .decode(upload.data_base64.trim())
                .map_err(|e| {
                    ApiError::BadRequest(format!("音声データのbase64デコードに失敗: {}", e))
                })?;
            AudioSource::Upload {
                filename: upload.filename,
                data,
            }
        } else if let Some(url) = self.youtube_url {
            AudioSource::YouTube { url }
        } else {
            AudioSource::GoogleDrive {
                // Exactly one branch remains when the count is 1
                url: self.gdrive_url.unwrap_or_default(),
            }
        };

        let request = AssessmentRequest {
            student_id,
            student_name: self.student_name.trim().to_string(),
            class_group: self.class_group.trim().to_string(),
            task_type: TaskType::from_label(&self.task_type),
            task_name: self.task_name.trim().to_string(),
            target_text: self.target_text,
        };

        Ok((request, source))
    }
}

async fn submit_assessment(
    State(state): State<AppState>,
    Json(body): Json<AssessRequest>,
) -> ApiResult<Json<crate::models::HistoryRecord>> {
    let (request, source) = body.into_parts()?;
    let record = state.runner.run(request, source).await?;
    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(upload: bool, youtube: bool, gdrive: bool) -> AssessRequest {
        AssessRequest {
            student_id: "02251234".to_string(),
            student_name: String::new(),
            class_group: String::new(),
            task_type: "音読課題".to_string(),
            task_name: String::new(),
            target_text: "Hello".to_string(),
            upload: upload.then(|| UploadPayload {
                filename: "a.wav".to_string(),
                data_base64: base64::engine::general_purpose::STANDARD.encode(b"RIFF"),
            }),
            youtube_url: youtube.then(|| "https://example.com/v".to_string()),
            gdrive_url: gdrive.then(|| "https://drive.google.com/file/d/x/view".to_string()),
        }
    }

    #[test]
    fn requires_exactly_one_source() {
        assert!(request_with(false, false, false).into_parts().is_err());
        assert!(request_with(true, true, false).into_parts().is_err());
        assert!(request_with(true, false, false).into_parts().is_ok());
        assert!(request_with(false, true, false).into_parts().is_ok());
        assert!(request_with(false, false, true).into_parts().is_ok());
    }

    #[test]
    fn requires_student_id() {
        let mut request = request_with(true, false, false);
        request.student_id = "  ".to_string();
        assert!(request.into_parts().is_err());
    }

    #[test]
    fn decodes_upload_payload() {
        let (req, source) = request_with(true, false, false).into_parts().unwrap();
        assert_eq!(req.task_type, TaskType::Reading);
        match source {
            AudioSource::Upload { filename, data } => {
                assert_eq!(filename, "a.wav");
                assert_eq!(data, b"RIFF");
            }
            other => panic!("unexpected source: {:?}", other),
        }
    }

    #[test]
    fn invalid_base64_is_a_bad_request() {
        let mut request = request_with(true, false, false);
        request.upload.as_mut().unwrap().data_base64 = "not base64 !!!".to_string();
        assert!(request.into_parts().is_err());
    }

    #[test]
    fn non_reading_label_maps_to_speech() {
        let mut request = request_with(false, true, false);
        request.task_type = "スピーチ課題".to_string();
        let (req, _) = request.into_parts().unwrap();
        assert_eq!(req.task_type, TaskType::Speech);
    }
}
