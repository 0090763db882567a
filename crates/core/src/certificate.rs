use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use serde::Serialize;

/// Data printed on a course completion certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub course_title: String,
    pub student_name: String,
    pub completed_date: String,
    pub number: String,
}

impl Certificate {
    #[must_use]
    pub fn issue(course_title: &str, student_name: &str, completed_on: NaiveDate) -> Self {
        let completed_date = completed_on.format("%Y-%m-%d").to_string();
        let number = certificate_number(course_title, student_name, &completed_date);
        Self {
            course_title: course_title.to_owned(),
            student_name: student_name.to_owned(),
            completed_date,
            number,
        }
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        format!("Certificate - {}.pdf", self.course_title)
    }
}

/// Stable certificate number: `LWH-` plus the first eight alphanumerics of the
/// base64 encoding of title, student and date.
#[must_use]
pub fn certificate_number(course_title: &str, student_name: &str, completed_date: &str) -> String {
    let encoded = STANDARD.encode(format!("{course_title}{student_name}{completed_date}"));
    let raw_id: String = encoded
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(8)
        .collect::<String>()
        .to_ascii_uppercase();
    format!("LWH-{raw_id}")
}
