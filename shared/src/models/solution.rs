//! Farm problem requests and generated solutions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::DEFAULT_LANGUAGE;
use crate::validation::{numeric_value, required, text_value};

/// Fields a solution request must carry, in the order they are checked
pub const REQUIRED_SOLUTION_FIELDS: [&str; 5] =
    ["land_type", "season", "crop_type", "acres", "problem"];

/// A farmer's description of a problem on their land
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolutionRequest {
    pub land_type: String,
    pub season: String,
    pub crop_type: String,
    pub acres: f64,
    pub problem: String,
    /// Natural language the advice should be written in
    pub language: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("Missing required field: {0}")]
    Missing(&'static str),

    #[error("Invalid value for field {field}: {message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },
}

/// Response body of the generate-solution endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolutionResponse {
    pub solution: String,
    /// Path of the archived copy, relative to the server's working directory
    pub filename: String,
}

impl SolutionRequest {
    pub fn from_json(body: &Map<String, Value>) -> Result<Self, RequestError> {
        for field in REQUIRED_SOLUTION_FIELDS {
            if required(body, field).is_none() {
                return Err(RequestError::Missing(field));
            }
        }

        let text = |field: &'static str| {
            required(body, field)
                .and_then(text_value)
                .ok_or(RequestError::Invalid {
                    field,
                    message: "expected non-empty text",
                })
        };

        let acres = required(body, "acres")
            .and_then(numeric_value)
            .filter(|a| *a > 0.0)
            .ok_or(RequestError::Invalid {
                field: "acres",
                message: "expected a positive number",
            })?;

        let language = required(body, "language")
            .and_then(text_value)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(Self {
            land_type: text("land_type")?,
            season: text("season")?,
            crop_type: text("crop_type")?,
            acres,
            problem: text("problem")?,
            language,
        })
    }

    /// Prompt sent to the language model
    pub fn prompt(&self) -> String {
        format!(
            "As an agricultural expert, provide a detailed solution in {language} for the following farming situation:\n\
             \n\
             Land Type: {land_type}\n\
             Season: {season}\n\
             Crop Type: {crop_type}\n\
             Land Area: {acres} acres\n\
             Problem Description: {problem}\n\
             \n\
             Please provide:\n\
             1. Problem analysis\n\
             2. Recommended solutions\n\
             3. Preventive measures for the future\n\
             4. Additional tips specific to the land type, crop, and season\n",
            language = self.language,
            land_type = self.land_type,
            season = self.season,
            crop_type = self.crop_type,
            acres = self.acres,
            problem = self.problem,
        )
    }

    /// Human-readable archive of the request and the advice it produced
    pub fn archive_text(&self, solution: &str) -> String {
        let mut out = String::from("FARM PROBLEM DETAILS\n-------------------\n\n");
        for (label, value) in [
            ("Land_Type", self.land_type.clone()),
            ("Season", self.season.clone()),
            ("Crop_Type", self.crop_type.clone()),
            ("Acres", self.acres.to_string()),
            ("Problem", self.problem.clone()),
            ("Language", self.language.clone()),
        ] {
            out.push_str(label);
            out.push_str(": ");
            out.push_str(&value);
            out.push('\n');
        }
        out.push_str("\nRECOMMENDED SOLUTION\n-------------------\n\n");
        out.push_str(solution);
        out
    }
}
