#[cfg(test)]
pub mod fixtures {
    use crate::models::{
        domain::{Question, QuestionSelection, QuestionType},
        dto::request::SaveSessionRequest,
    };

    /// Creates a standard objective question
    pub fn objective_question(id: u64) -> Question {
        Question {
            id,
            text: "What is 2+2?".to_string(),
            options: vec!["2".into(), "3".into(), "4".into(), "5".into()],
            answer: "4".to_string(),
            explanation: "Basic arithmetic".to_string(),
            question_type: QuestionType::Objective,
        }
    }

    /// Creates a standard theory question
    pub fn theory_question(id: u64) -> Question {
        Question {
            id,
            text: "Explain X".to_string(),
            options: vec![],
            answer: "Y".to_string(),
            explanation: "Z".to_string(),
            question_type: QuestionType::Theory,
        }
    }

    pub fn save_session_request(filename: &str) -> SaveSessionRequest {
        SaveSessionRequest {
            filename: filename.to_string(),
            file_type: "application/pdf".to_string(),
            question_type: QuestionSelection::Both,
            num_objective_questions: 1,
            num_theory_questions: 1,
            questions: vec![objective_question(1), theory_question(2)],
        }
    }

    pub const MULTIPART_BOUNDARY: &str = "----studygen-test-boundary";

    /// A file part for [`multipart_body`]: (file name, content type, bytes).
    pub type FilePart<'a> = (&'a str, &'a str, &'a [u8]);

    /// Builds a `multipart/form-data` body with the given text fields and an
    /// optional `file` part.
    pub fn multipart_body(fields: &[(&str, &str)], file: Option<FilePart<'_>>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    MULTIPART_BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        if let Some((filename, content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    MULTIPART_BOUNDARY, filename, content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
        body
    }

    pub fn multipart_content_type() -> String {
        format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY)
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_questions() {
        assert_eq!(objective_question(3).id, 3);
        assert_eq!(objective_question(1).options.len(), 4);
        assert!(theory_question(2).options.is_empty());
    }

    #[test]
    fn test_multipart_body_contains_parts() {
        let body = multipart_body(
            &[("type", "objective")],
            Some(("notes.txt", "text/plain", b"hello")),
        );
        let text = String::from_utf8(body).unwrap();

        assert!(text.contains("name=\"type\"\r\n\r\nobjective\r\n"));
        assert!(text.contains("filename=\"notes.txt\""));
        assert!(text.contains("Content-Type: text/plain\r\n\r\nhello\r\n"));
        assert!(text.ends_with(&format!("--{}--\r\n", MULTIPART_BOUNDARY)));
    }
}
