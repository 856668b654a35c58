use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::WorkflowError;
use crate::utils::rut::{Rut, RutError};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 7,
        "rut": "12345678",
        "dv": "5",
        "given_name": "Ana",
        "paternal_surname": "Rojas",
        "maternal_surname": "Soto",
        "email": "ana.rojas@school.cl",
        "job_title": "Profesor"
    })
)]
pub struct Worker {
    pub id: u64,
    pub rut: String,
    pub dv: String,
    pub given_name: String,
    pub paternal_surname: String,
    pub maternal_surname: String,
    pub email: String,
    /// free-text job title, e.g. "Profesor" or "Inspector"
    pub job_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NewWorker {
    #[schema(example = "12345678")]
    pub rut: String,
    #[schema(example = "5")]
    pub dv: String,
    #[schema(example = "Ana")]
    pub given_name: String,
    #[schema(example = "Rojas")]
    pub paternal_surname: String,
    #[schema(example = "Soto")]
    pub maternal_surname: String,
    #[schema(example = "ana.rojas@school.cl", format = "email")]
    pub email: String,
    #[schema(example = "Profesor")]
    pub job_title: String,
}

fn required(value: &str, field: &'static str) -> Result<String, WorkflowError> {
    let value = value.trim();
    if value.is_empty() {
        Err(WorkflowError::validation(field, "must not be empty"))
    } else {
        Ok(value.to_string())
    }
}

impl NewWorker {
    /// Trims every field, validates the RUT and email, and returns the
    /// record in stored form (lowercase email and check character).
    pub fn normalized(&self) -> Result<NewWorker, WorkflowError> {
        let rut = required(&self.rut, "rut")?;
        let dv = required(&self.dv, "dv")?;
        let given_name = required(&self.given_name, "given_name")?;
        let paternal_surname = required(&self.paternal_surname, "paternal_surname")?;
        let maternal_surname = required(&self.maternal_surname, "maternal_surname")?;
        let email = required(&self.email, "email")?.to_lowercase();
        let job_title = required(&self.job_title, "job_title")?;

        if !EMAIL_PATTERN.is_match(&email) {
            return Err(WorkflowError::validation("email", "not a valid email address"));
        }

        let rut = Rut::new(&rut, &dv).map_err(|e| match e {
            RutError::Malformed => WorkflowError::validation("rut", e.to_string()),
            RutError::CheckMismatch => WorkflowError::validation("dv", e.to_string()),
        })?;

        Ok(NewWorker {
            rut: rut.body().to_string(),
            dv: rut.dv().to_string(),
            given_name,
            paternal_surname,
            maternal_surname,
            email,
            job_title,
        })
    }

    pub fn with_id(self, id: u64) -> Worker {
        Worker {
            id,
            rut: self.rut,
            dv: self.dv,
            given_name: self.given_name,
            paternal_surname: self.paternal_surname,
            maternal_surname: self.maternal_surname,
            email: self.email,
            job_title: self.job_title,
        }
    }
}

/// Partial update of a worker; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct WorkerUpdate {
    pub rut: Option<String>,
    pub dv: Option<String>,
    pub given_name: Option<String>,
    pub paternal_surname: Option<String>,
    pub maternal_surname: Option<String>,
    pub email: Option<String>,
    pub job_title: Option<String>,
}

fn changed(current: &str, next: String) -> Option<String> {
    (current != next).then_some(next)
}

impl WorkerUpdate {
    /// The update laid over `current`, not yet validated.
    pub fn merge(&self, current: &Worker) -> NewWorker {
        let pick = |value: &Option<String>, stored: &str| {
            value.clone().unwrap_or_else(|| stored.to_string())
        };

        NewWorker {
            rut: pick(&self.rut, &current.rut),
            dv: pick(&self.dv, &current.dv),
            given_name: pick(&self.given_name, &current.given_name),
            paternal_surname: pick(&self.paternal_surname, &current.paternal_surname),
            maternal_surname: pick(&self.maternal_surname, &current.maternal_surname),
            email: pick(&self.email, &current.email),
            job_title: pick(&self.job_title, &current.job_title),
        }
    }

    /// Only the fields of `next` that differ from `current`.
    pub fn diff(current: &Worker, next: NewWorker) -> WorkerUpdate {
        WorkerUpdate {
            rut: changed(&current.rut, next.rut),
            dv: changed(&current.dv, next.dv),
            given_name: changed(&current.given_name, next.given_name),
            paternal_surname: changed(&current.paternal_surname, next.paternal_surname),
            maternal_surname: changed(&current.maternal_surname, next.maternal_surname),
            email: changed(&current.email, next.email),
            job_title: changed(&current.job_title, next.job_title),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == WorkerUpdate::default()
    }

    pub fn apply(&self, current: &Worker) -> Worker {
        self.merge(current).with_id(current.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> NewWorker {
        NewWorker {
            rut: "12345678".to_string(),
            dv: "5".to_string(),
            given_name: "Ana".to_string(),
            paternal_surname: "Rojas".to_string(),
            maternal_surname: "Soto".to_string(),
            email: "Ana.Rojas@School.cl".to_string(),
            job_title: "Profesor".to_string(),
        }
    }

    #[test]
    fn normalizes_email_and_check_character() {
        let mut input = ana();
        input.rut = "12345670".to_string();
        input.dv = " K ".to_string();

        let worker = input.normalized().expect("valid worker");
        assert_eq!(worker.email, "ana.rojas@school.cl");
        assert_eq!(worker.dv, "k");
    }

    #[test]
    fn bad_check_character_is_reported_on_dv() {
        let mut input = ana();
        input.dv = "4".to_string();
        match input.normalized() {
            Err(WorkflowError::Validation { field, .. }) => assert_eq!(field, "dv"),
            other => panic!("expected dv validation error, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_rut_is_reported_on_rut() {
        let mut input = ana();
        input.rut = "12.345.678".to_string();
        match input.normalized() {
            Err(WorkflowError::Validation { field, .. }) => assert_eq!(field, "rut"),
            other => panic!("expected rut validation error, got {other:?}"),
        }
    }

    #[test]
    fn rut_is_stored_without_leading_zeros_and_at_most_eight_digits() {
        let mut input = ana();
        input.rut = "012345678".to_string();
        assert_eq!(input.normalized().unwrap().rut, "12345678");

        let mut input = ana();
        input.rut = "123456789012".to_string();
        input.dv = crate::utils::rut::check_character("123456789012").unwrap().to_string();
        assert!(matches!(
            input.normalized(),
            Err(WorkflowError::Validation { field: "rut", .. })
        ));
    }

    #[test]
    fn rejects_malformed_email_and_blank_fields() {
        let mut input = ana();
        input.email = "ana@school".to_string();
        assert!(matches!(
            input.normalized(),
            Err(WorkflowError::Validation { field: "email", .. })
        ));

        let mut input = ana();
        input.job_title = "   ".to_string();
        assert!(matches!(
            input.normalized(),
            Err(WorkflowError::Validation { field: "job_title", .. })
        ));
    }

    #[test]
    fn diff_keeps_only_changed_fields() {
        let current = ana().normalized().unwrap().with_id(7);
        let update = WorkerUpdate {
            email: Some("ana@school.cl".to_string()),
            given_name: Some("Ana".to_string()),
            ..Default::default()
        };

        let next = update.merge(&current).normalized().unwrap();
        let diff = WorkerUpdate::diff(&current, next);

        assert_eq!(diff.email.as_deref(), Some("ana@school.cl"));
        assert_eq!(diff.given_name, None);
        assert!(!diff.is_empty());
        assert_eq!(diff.apply(&current).email, "ana@school.cl");
    }
}
