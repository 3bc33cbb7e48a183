use serde::{Deserialize, Serialize};

/// Sentinel written in the `Word` column when no word label covers a token.
pub const WORD_NOT_FOUND: &str = "PROBLEM";

/// Column names of the output table, in order.
pub const COLUMNS: [&str; 10] = [
    "Filename",
    "Vowel",
    "Start",
    "Time",
    "Offset",
    "F1",
    "F2",
    "Participant",
    "Task",
    "Word",
];

/// Identity of one recording, derived from its file stem.
///
/// # Example
/// ```
/// use vt_core::row::FileId;
/// let id = FileId::from_stem("S012_reading", 4, "_");
/// assert_eq!(id.participant, "S012");
/// assert_eq!(id.task, "reading");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileId {
    /// Full file stem.
    pub stem: String,
    /// Fixed-length prefix of the stem.
    pub participant: String,
    /// Stem without the participant prefix and one following delimiter.
    pub task: String,
}

impl FileId {
    /// Split `stem` into participant and task.
    ///
    /// The prefix is counted in characters, not bytes. A stem shorter than
    /// `participant_len` becomes the participant id with an empty task. The
    /// delimiter is removed only when it directly follows the prefix.
    #[must_use]
    pub fn from_stem(stem: &str, participant_len: usize, delimiter: &str) -> Self {
        let split = stem
            .char_indices()
            .nth(participant_len)
            .map_or(stem.len(), |(byte, _)| byte);
        let (participant, rest) = stem.split_at(split);
        let task = if delimiter.is_empty() {
            rest
        } else {
            rest.strip_prefix(delimiter).unwrap_or(rest)
        };
        Self {
            stem: stem.to_string(),
            participant: participant.to_string(),
            task: task.to_string(),
        }
    }
}

/// One output row: a formant sample inside a vowel token, with its context.
///
/// Field order is the column order of the exported table.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct DatasetRow {
    /// Source file stem.
    #[serde(rename = "Filename")]
    pub file_id: String,
    /// First character of the vowel label.
    #[serde(rename = "Vowel")]
    pub vowel: String,
    /// Token start time (s).
    #[serde(rename = "Start")]
    pub token_start: f64,
    /// Absolute sample time (s).
    #[serde(rename = "Time")]
    pub time: f64,
    /// Sample time minus token start (s).
    #[serde(rename = "Offset")]
    pub offset: f64,
    /// First formant (Hz), NaN when undefined.
    #[serde(rename = "F1")]
    pub f1: f64,
    /// Second formant (Hz), NaN when undefined.
    #[serde(rename = "F2")]
    pub f2: f64,
    /// Participant id.
    #[serde(rename = "Participant")]
    pub participant: String,
    /// Task id.
    #[serde(rename = "Task")]
    pub task: String,
    /// Word covering the token midpoint, or [`WORD_NOT_FOUND`].
    #[serde(rename = "Word")]
    pub word: String,
}

impl DatasetRow {
    /// Equality that treats two NaN formant values as equal.
    ///
    /// Timing and formant fields are compared within `eps`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        let close = |a: f64, b: f64| (a.is_nan() && b.is_nan()) || (a - b).abs() <= eps;
        self.file_id == other.file_id
            && self.vowel == other.vowel
            && close(self.token_start, other.token_start)
            && close(self.time, other.time)
            && close(self.offset, other.offset)
            && close(self.f1, other.f1)
            && close(self.f2, other.f2)
            && self.participant == other.participant
            && self.task == other.task
            && self.word == other.word
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_split_removes_delimiter() {
        let id = FileId::from_stem("P001_map_task", 4, "_");
        assert_eq!(id.stem, "P001_map_task");
        assert_eq!(id.participant, "P001");
        assert_eq!(id.task, "map_task");
    }

    #[test]
    fn stem_split_without_delimiter_keeps_rest() {
        let id = FileId::from_stem("P001reading", 4, "_");
        assert_eq!(id.participant, "P001");
        assert_eq!(id.task, "reading");
    }

    #[test]
    fn short_stem_is_all_participant() {
        let id = FileId::from_stem("P1", 4, "_");
        assert_eq!(id.participant, "P1");
        assert_eq!(id.task, "");
    }

    #[test]
    fn prefix_counts_characters() {
        let id = FileId::from_stem("Zoë1-lecture", 4, "-");
        assert_eq!(id.participant, "Zoë1");
        assert_eq!(id.task, "lecture");
    }

    #[test]
    fn approx_eq_treats_nan_as_equal() {
        let row = DatasetRow {
            file_id: "f".into(),
            vowel: "o".into(),
            token_start: 0.19,
            time: 0.195,
            offset: 0.005,
            f1: f64::NAN,
            f2: 1200.0,
            participant: "f".into(),
            task: String::new(),
            word: WORD_NOT_FOUND.into(),
        };
        let mut other = row.clone();
        assert!(row.approx_eq(&other, 1e-9));
        other.f2 = 1200.1;
        assert!(!row.approx_eq(&other, 1e-9));
    }
}
