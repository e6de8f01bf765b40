use serde::{Deserialize, Serialize};

/// Smallest duration a finished burst is allowed to report, in seconds.
pub const MIN_SPURT_DURATION_SECS: f64 = 0.1;

/// A finished burst of typing that has not yet been placed into a stream.
///
/// Produced by the recorder; the registry assigns the id and the paragraph
/// flag when it appends the candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpurtCandidate {
    pub text: String,
    /// Completion time, epoch milliseconds.
    pub created_at: i64,
    /// Seconds from the first keystroke of the burst to its last one.
    pub duration: f64,
}

impl SpurtCandidate {
    /// Epoch milliseconds at which the typing in this candidate ended.
    pub fn end_ms(&self) -> i64 {
        end_ms(self.created_at, self.duration)
    }
}

/// A completed spurt stored in a stream. Never mutated after append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spurt {
    pub id: String,
    pub text: String,
    pub created_at: i64,
    pub duration: f64,
    pub is_paragraph_start: bool,
}

impl Spurt {
    pub fn from_candidate(id: String, candidate: SpurtCandidate, is_paragraph_start: bool) -> Self {
        Self {
            id,
            text: candidate.text,
            created_at: candidate.created_at,
            duration: candidate.duration,
            is_paragraph_start,
        }
    }

    /// `created_at + duration`, the reference point for gap measurements.
    pub fn end_ms(&self) -> i64 {
        end_ms(self.created_at, self.duration)
    }
}

fn end_ms(created_at: i64, duration_secs: f64) -> i64 {
    created_at + (duration_secs * 1000.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_adds_duration_to_creation_time() {
        let spurt = Spurt {
            id: "a".into(),
            text: "hello".into(),
            created_at: 1_000,
            duration: 2.5,
            is_paragraph_start: true,
        };
        assert_eq!(spurt.end_ms(), 3_500);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let candidate = SpurtCandidate {
            text: "hi".into(),
            created_at: 5,
            duration: 0.1,
        };
        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["createdAt"], 5);
        assert!(json.get("created_at").is_none());
    }
}
