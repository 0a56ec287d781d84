//! Farm solution generation
//!
//! Sends the farmer's problem to a language model and archives every answer
//! as a text file named after the time it was produced.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use shared::{SolutionRequest, SolutionResponse};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, AppResult};

/// How many same-second archive names are tried before giving up
const MAX_ARCHIVE_SUFFIX: u32 = 100;

/// A language model that turns a prompt into text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

/// Solution service
#[derive(Clone)]
pub struct SolutionService {
    generator: Arc<dyn TextGenerator>,
    solutions_dir: PathBuf,
}

impl SolutionService {
    pub fn new(generator: Arc<dyn TextGenerator>, solutions_dir: impl Into<PathBuf>) -> Self {
        Self {
            generator,
            solutions_dir: solutions_dir.into(),
        }
    }

    /// Generate advice for a request and archive it
    pub async fn generate(&self, request: &SolutionRequest) -> AppResult<SolutionResponse> {
        tracing::info!(
            crop = %request.crop_type,
            season = %request.season,
            language = %request.language,
            "Generating farm solution"
        );

        let solution = self.generator.generate(&request.prompt()).await?;
        let path = self.archive(request, &solution, Local::now()).await?;

        tracing::info!(file = %path.display(), "Farm solution archived");
        Ok(SolutionResponse {
            solution,
            filename: path.display().to_string(),
        })
    }

    /// Write the archive file, never overwriting an earlier one from the same second
    async fn archive(
        &self,
        request: &SolutionRequest,
        solution: &str,
        at: DateTime<Local>,
    ) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(&self.solutions_dir)
            .await
            .map_err(AppError::Archive)?;

        let stem = format!("farm_solution_{}", at.format("%Y%m%d_%H%M%S"));
        let contents = request.archive_text(solution);

        for suffix in 0..MAX_ARCHIVE_SUFFIX {
            let name = match suffix {
                0 => format!("{}.txt", stem),
                n => format!("{}_{}.txt", stem, n),
            };
            let path = self.solutions_dir.join(name);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(AppError::Archive(e)),
            };

            file.write_all(contents.as_bytes())
                .await
                .map_err(AppError::Archive)?;
            file.flush().await.map_err(AppError::Archive)?;
            return Ok(path);
        }

        Err(AppError::Archive(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free archive name for {}", stem),
        )))
    }
}
